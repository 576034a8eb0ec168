use super::GeneratedArtifact;

#[test]
fn it_flags_sentinel_scripts_as_errors() {
    let artifact = GeneratedArtifact::new(
        "# Error: connection refused".to_string(),
        "a plan".to_string(),
    );
    assert!(artifact.is_error());
}

#[test]
fn it_does_not_flag_real_scripts() {
    let artifact = GeneratedArtifact::new(
        "import pygame\n\nprint('hi')".to_string(),
        "a plan".to_string(),
    );
    assert!(!artifact.is_error());
}

#[test]
fn it_keeps_error_feedback_on_corrections() {
    let artifact = GeneratedArtifact::corrected(
        "print('fixed')".to_string(),
        "a plan".to_string(),
        "NameError: name 'x' is not defined".to_string(),
    );
    assert!(!artifact.is_error());
    assert_eq!(
        artifact.error_feedback.unwrap(),
        "NameError: name 'x' is not defined"
    );
}
