use super::*;

#[test]
fn classifies_supported_extensions() {
    assert_eq!(UploadKind::from_file_name("cat.GIF").unwrap(), UploadKind::Gif);
    for name in ["a.png", "b.JPG", "c.jpeg", "d.webp"] {
        assert_eq!(UploadKind::from_file_name(name).unwrap(), UploadKind::Image);
    }
}

#[test]
fn rejects_svg_and_unknown() {
    let err = UploadKind::from_file_name("logo.svg").unwrap_err();
    assert!(matches!(&err, CanvasError::UnsupportedExtension(e) if e == "svg"));
    assert_eq!(err.user_message(), "Files of type '.svg' are not supported.");
    assert!(UploadKind::from_file_name("README").is_err());
    assert!(UploadKind::from_file_name("clip.mp4").is_err());
}
