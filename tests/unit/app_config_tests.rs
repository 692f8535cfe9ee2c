/*!
 * Tests for application configuration
 */

use talespeak::app_config::{Config, LogLevel, CHUNK_CHARS_RANGE, KNOWN_VOICES};

/// Test the default configuration values
#[test]
fn test_defaultConfig_shouldMatchDocumentedDefaults() {
    let config = Config::default();

    assert_eq!(config.synthesis.voice, "en-US-JennyNeural");
    assert_eq!(config.synthesis.rate, "+0%");
    assert_eq!(config.synthesis.pitch, "+0Hz");
    assert_eq!(config.synthesis.volume, "+0%");
    assert_eq!(config.synthesis.concurrent_chunks, 3);
    assert!(config.synthesis.generate_subtitles);

    assert_eq!(config.chunking.min_chars, 1500);
    assert_eq!(config.chunking.max_chars, 2000);

    assert!(config.output.merge_audio);
    assert!(!config.output.delete_chunks_after_merge);

    assert_eq!(config.engine.timeout_secs, 120);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test that the default configuration validates
#[test]
fn test_defaultConfig_shouldValidate() {
    assert!(Config::default().validate().is_ok());
}

/// Test chunk bound validation against the accepted range
#[test]
fn test_validate_withChunkBoundsOutOfRange_shouldFail() {
    let mut config = Config::default();
    config.chunking.min_chars = *CHUNK_CHARS_RANGE.start() - 1;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.chunking.max_chars = *CHUNK_CHARS_RANGE.end() + 1;
    assert!(config.validate().is_err());
}

/// Test that inverted chunk bounds are rejected
#[test]
fn test_validate_withMinAboveMax_shouldFail() {
    let mut config = Config::default();
    config.chunking.min_chars = 3000;
    config.chunking.max_chars = 2000;
    assert!(config.validate().is_err());
}

/// Test that zero concurrency is rejected
#[test]
fn test_validate_withZeroConcurrency_shouldFail() {
    let mut config = Config::default();
    config.synthesis.concurrent_chunks = 0;
    assert!(config.validate().is_err());
}

/// Test that an empty voice name is rejected
#[test]
fn test_validate_withEmptyVoice_shouldFail() {
    let mut config = Config::default();
    config.synthesis.voice = String::new();
    assert!(config.validate().is_err());
}

/// Test that an unknown voice passes validation (the engine decides)
#[test]
fn test_validate_withUnknownVoice_shouldPass() {
    let mut config = Config::default();
    config.synthesis.voice = "xx-XX-NobodyNeural".to_string();
    assert!(config.validate().is_ok());
}

/// Test partial JSON deserialization fills in defaults
#[test]
fn test_deserialize_withPartialJson_shouldUseDefaults() {
    let json = r#"{
        "synthesis": { "voice": "vi-VN-HoaiMyNeural" },
        "chunking": { "max_chars": 1800 }
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.synthesis.voice, "vi-VN-HoaiMyNeural");
    assert_eq!(config.synthesis.concurrent_chunks, 3);
    assert_eq!(config.chunking.min_chars, 1500);
    assert_eq!(config.chunking.max_chars, 1800);
    assert_eq!(config.engine.endpoint, "http://localhost:8000");
}

/// Test serialization round trip
#[test]
fn test_serializeDeserialize_shouldRoundTrip() {
    let mut config = Config::default();
    config.synthesis.voice = "en-GB-RyanNeural".to_string();
    config.log_level = LogLevel::Debug;

    let json = serde_json::to_string_pretty(&config).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.synthesis.voice, "en-GB-RyanNeural");
    assert_eq!(parsed.log_level, LogLevel::Debug);
}

/// Test that the voice catalog covers both default voices per language
#[test]
fn test_knownVoices_shouldIncludeDefaultVoice() {
    assert!(KNOWN_VOICES.iter().any(|(v, _)| *v == "en-US-JennyNeural"));
    assert!(KNOWN_VOICES.iter().any(|(v, _)| *v == "vi-VN-HoaiMyNeural"));
}

/// Test voice params derivation from the synthesis section
#[test]
fn test_voiceParams_shouldMirrorSynthesisSettings() {
    let mut config = Config::default();
    config.synthesis.rate = "+10%".to_string();

    let params = config.synthesis.voice_params();
    assert_eq!(params.voice, "en-US-JennyNeural");
    assert_eq!(params.rate, "+10%");
    assert_eq!(params.pitch, "+0Hz");
}
