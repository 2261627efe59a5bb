#![allow(non_snake_case)]

use super::*;

fn config(level: &str) -> GeneratorConfig {
    let mut config = GeneratorConfig::default();
    config.logging.level = level.to_string();
    config
}

#[test]
fn resolve_filter___flag_given___wins_over_env_and_config() {
    let source = resolve_filter(Some("debug"), Some("trace".to_string()), &config("warn")).unwrap();

    assert_eq!(source, FilterSource::Flag(LogLevel::Debug));
}

#[test]
fn resolve_filter___env_set___wins_over_config() {
    let source = resolve_filter(None, Some("isobridge_codegen=trace".to_string()), &config("warn")).unwrap();

    assert_eq!(source, FilterSource::Environment("isobridge_codegen=trace".to_string()));
}

#[test]
fn resolve_filter___blank_env___falls_back_to_config() {
    let source = resolve_filter(None, Some("  ".to_string()), &config("error")).unwrap();

    assert_eq!(source, FilterSource::Config(LogLevel::Error));
}

#[test]
fn resolve_filter___nothing_set___config_default_is_info() {
    let source = resolve_filter(None, None, &GeneratorConfig::default()).unwrap();

    assert_eq!(source, FilterSource::Config(LogLevel::Info));
}

#[test]
fn resolve_filter___unknown_flag___returns_error() {
    let err = resolve_filter(Some("loud"), None, &GeneratorConfig::default()).unwrap_err();

    assert!(err.to_string().contains("--log-level"));
}

#[test]
fn resolve_filter___unknown_config_level___returns_error() {
    let err = resolve_filter(None, None, &config("chatty")).unwrap_err();

    assert!(format!("{err:#}").contains("unknown log level: chatty"));
}
