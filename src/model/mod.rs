pub(crate) mod element;
pub(crate) mod ids;
pub(crate) mod layer;
pub(crate) mod raster;
