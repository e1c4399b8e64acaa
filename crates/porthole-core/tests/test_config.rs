use approx::assert_relative_eq;

use porthole_core::config::{display_scale_for, EngineConfig};
use porthole_core::error::PortholeError;

// ---------------------------------------------------------------------------
// Defaults and validation
// ---------------------------------------------------------------------------

#[test]
fn test_default_config() {
    let config = EngineConfig::default();
    assert_eq!(config.viewport_width, 100);
    assert_eq!(config.viewport_height, 100);
    assert_relative_eq!(config.preview_quality, 4.0 / 9.0);
    assert_eq!(config.mask_color, 0x9000_0000);
}

#[test]
fn test_default_config_validates() {
    assert!(EngineConfig::default().validate().is_ok());
}

#[test]
fn test_validate_rejects_tiny_viewport() {
    let config = EngineConfig {
        viewport_width: 2,
        viewport_height: 2,
        ..EngineConfig::default()
    };
    assert!(matches!(
        config.validate().unwrap_err(),
        PortholeError::InvalidConfig(_)
    ));
}

#[test]
fn test_validate_rejects_quality_out_of_range() {
    let config = EngineConfig {
        preview_quality: 1.5,
        ..EngineConfig::default()
    };
    assert!(matches!(
        config.validate().unwrap_err(),
        PortholeError::InvalidConfig(_)
    ));
    let config = EngineConfig {
        preview_quality: -0.1,
        ..EngineConfig::default()
    };
    assert!(config.validate().is_err());
}

// ---------------------------------------------------------------------------
// Display scale mapping
// ---------------------------------------------------------------------------

#[test]
fn test_display_scale_spans_tenth_to_one() {
    assert_relative_eq!(display_scale_for(0.0), 0.1);
    assert_relative_eq!(display_scale_for(1.0), 1.0);
    assert_relative_eq!(display_scale_for(0.5), 0.55);
}

#[test]
fn test_display_scale_default_quality_is_half() {
    assert_relative_eq!(display_scale_for(4.0 / 9.0), 0.5);
}

#[test]
fn test_display_scale_clamps_quality() {
    assert_relative_eq!(display_scale_for(-2.0), 0.1);
    assert_relative_eq!(display_scale_for(7.0), 1.0);
}

// ---------------------------------------------------------------------------
// TOML round trip
// ---------------------------------------------------------------------------

#[test]
fn test_config_toml_round_trip() {
    let config = EngineConfig {
        viewport_width: 512,
        viewport_height: 384,
        preview_quality: 0.75,
        mask_color: 0xCC00_1122,
    };
    let text = toml::to_string(&config).unwrap();
    let back: EngineConfig = toml::from_str(&text).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_config_missing_fields_use_defaults() {
    let config: EngineConfig = toml::from_str("viewport_width = 640\n").unwrap();
    assert_eq!(config.viewport_width, 640);
    assert_eq!(config.viewport_height, 100);
    assert_relative_eq!(config.preview_quality, 4.0 / 9.0);
    assert_eq!(config.mask_color, 0x9000_0000);
}

#[test]
fn test_empty_config_is_default() {
    let config: EngineConfig = toml::from_str("").unwrap();
    assert_eq!(config, EngineConfig::default());
}
