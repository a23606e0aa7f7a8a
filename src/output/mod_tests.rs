use super::*;

#[test]
fn output_format_parses_case_insensitively() {
    assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text));
    assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
}

#[test]
fn unknown_output_format_is_rejected() {
    let err = "sarif".parse::<OutputFormat>().unwrap_err();
    assert_eq!(err, "Unknown output format: sarif");
}

#[test]
fn explicit_color_modes_ignore_the_terminal() {
    assert!(ColorMode::Always.use_colors());
    assert!(!ColorMode::Never.use_colors());
}
