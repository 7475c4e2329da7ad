use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(CanvasError::setup("x").to_string().contains("setup error:"));
    assert!(CanvasError::asset("x").to_string().contains("asset error:"));
    assert!(
        CanvasError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        CanvasError::storage("x")
            .to_string()
            .contains("storage error:")
    );
    assert!(
        CanvasError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(CanvasError::encode("x").to_string().contains("encode error:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CanvasError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn user_messages_are_specific_for_known_cases() {
    assert!(
        CanvasError::unsupported_extension("svg")
            .user_message()
            .contains(".svg")
    );
    assert_eq!(
        CanvasError::storage("quota").user_message(),
        GENERIC_USER_MESSAGE
    );
    assert!(CanvasError::setup("no surface").is_fatal());
    assert!(!CanvasError::asset("bad gif").is_fatal());
}

#[test]
fn serde_json_errors_convert() {
    let err: CanvasError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, CanvasError::Serde(_)));
}
