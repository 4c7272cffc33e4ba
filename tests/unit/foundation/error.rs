use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CoverError::degenerate("x")
            .to_string()
            .contains("degenerate input:")
    );
    assert!(
        CoverError::allocation("x")
            .to_string()
            .contains("surface allocation failed:")
    );
    assert!(
        CoverError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(CoverError::draw("x").to_string().contains("draw error:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CoverError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_frame_level_failures_are_recoverable() {
    assert!(CoverError::degenerate("x").is_recoverable());
    assert!(CoverError::allocation("x").is_recoverable());
    assert!(!CoverError::validation("x").is_recoverable());
    assert!(!CoverError::draw("x").is_recoverable());
}
