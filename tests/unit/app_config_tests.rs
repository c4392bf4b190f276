/*!
 * Tests for configuration loading and validation
 */

use anyhow::Result;
use xliffwai::app_config::{AttemptPolicy, Config, LogLevel};

use crate::common;

#[test]
fn test_fromFile_withFullConfig_shouldReadEveryField() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        dir.path(),
        "xliffwai.json",
        r#"{
            "source_language": "German",
            "target_language": "it",
            "translation": {
                "endpoint": "https://api.example.com/v1/chat/completions",
                "model": "tower",
                "api_key": "secret",
                "system_prompt": "You translate UI strings.",
                "temperature": 0.2,
                "timeout_secs": 10,
                "attempts": [{"max_tokens": 512}, {"max_tokens": 128}, {"max_tokens": 32}]
            },
            "validation": {
                "leakage_markers": ["Translation:"],
                "short_source_max_chars": 10,
                "short_source_max_output_chars": 40
            },
            "processing": {
                "translate_if_target_same_as_source": false,
                "use_cache": false,
                "precount_units": false
            },
            "log_level": "debug"
        }"#,
    )?;

    let config = Config::from_file(&path)?;

    assert_eq!(config.source_language, "German");
    assert_eq!(config.target_language, "it");
    assert_eq!(config.translation.model, "tower");
    assert_eq!(config.translation.api_key, "secret");
    assert_eq!(config.translation.timeout_secs, 10);
    assert_eq!(
        config.translation.attempts,
        vec![AttemptPolicy::new(512), AttemptPolicy::new(128), AttemptPolicy::new(32)]
    );
    assert_eq!(config.validation.leakage_markers, vec!["Translation:".to_string()]);
    assert_eq!(config.validation.short_source_max_chars, 10);
    assert!(!config.processing.translate_if_target_same_as_source);
    assert!(!config.processing.use_cache);
    assert!(!config.processing.precount_units);
    assert_eq!(config.log_level, LogLevel::Debug);
    config.validate()?;
    Ok(())
}

#[test]
fn test_fromFile_withInvalidJson_shouldMentionPath() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "broken.json", "{ not json")?;

    let error = Config::from_file(&path).unwrap_err();
    assert!(format!("{:#}", error).contains("broken.json"));
    Ok(())
}

#[test]
fn test_loadOrDefault_withoutPath_shouldNeedTargetLanguage() -> Result<()> {
    let config = Config::load_or_default(None)?;
    assert!(config.target_language.is_empty());
    assert!(config.validate().is_err());
    Ok(())
}

#[test]
fn test_validate_withFtpEndpoint_shouldFail() {
    let mut config = common::test_config();
    config.translation.endpoint = "ftp://example.com/v1".to_string();
    let error = config.validate().unwrap_err();
    assert!(error.to_string().contains("http"));
}

#[test]
fn test_serialize_shouldRoundTripDefaults() -> Result<()> {
    let config = common::test_config();
    let json = serde_json::to_string_pretty(&config)?;
    let parsed: Config = serde_json::from_str(&json)?;
    assert_eq!(parsed, config);
    Ok(())
}
