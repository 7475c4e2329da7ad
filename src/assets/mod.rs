/// Image and GIF decoding into premultiplied rasters.
pub mod decode;
/// Prebuilt asset manifest entries.
pub mod manifest;
/// Upload classification by file extension.
pub mod upload;
