use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(SplitError::init("x").to_string().contains("init error:"));
    assert!(
        SplitError::compositor("x")
            .to_string()
            .contains("compositor error:")
    );
    assert!(SplitError::render("x").to_string().contains("render error:"));
    assert!(SplitError::config("x").to_string().contains("config error:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SplitError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
