use gesture_engine::mouse_gestures::{MatchingAlgorithm, PointerButton};
use gesture_engine::settings::{GestureSettings, SettingsError, SuppressionKey};
use tempfile::tempdir;

#[test]
fn defaults_are_valid() {
    let settings = GestureSettings::default();
    assert_eq!(settings.validate(), Ok(()));
    assert_eq!(settings.trigger_button, PointerButton::Secondary);
    assert_eq!(settings.matching_algorithm, MatchingAlgorithm::Proportional);
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().unwrap();
    let settings = GestureSettings::load(dir.path().join("absent.json")).unwrap();
    assert_eq!(settings, GestureSettings::default());
}

#[test]
fn camel_case_json_is_parsed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{
            "triggerButton": "auxiliary",
            "suppressionKey": "alt",
            "distanceThreshold": 15.5,
            "differenceThreshold": 0.2,
            "timeoutActive": true,
            "timeoutDuration": 750,
            "matchingAlgorithm": "legacyLetters",
            "deviationTolerance": 0.3
        }"#,
    )
    .unwrap();

    let settings = GestureSettings::load(&path).unwrap();
    assert_eq!(settings.trigger_button, PointerButton::Auxiliary);
    assert_eq!(settings.suppression_key, SuppressionKey::Alt);
    assert_eq!(settings.distance_threshold, 15.5);
    assert_eq!(settings.difference_threshold, 0.2);
    assert!(settings.timeout_active);
    assert_eq!(settings.timeout_duration, 750);
    assert_eq!(settings.matching_algorithm, MatchingAlgorithm::LegacyLetters);
    assert_eq!(settings.deviation_tolerance, 0.3);
    assert_eq!(settings.jitter_distance, GestureSettings::default().jitter_distance);
}

#[test]
fn unknown_enum_value_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{ "triggerButton": "thumb" }"#).unwrap();
    assert!(GestureSettings::load(&path).is_err());

    std::fs::write(&path, r#"{ "suppressionKey": "meta" }"#).unwrap();
    assert!(GestureSettings::load(&path).is_err());
}

#[test]
fn out_of_range_values_are_rejected_not_clamped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{ "jitterDistance": -2 }"#).unwrap();
    let err = GestureSettings::load(&path).unwrap_err();
    assert!(err.to_string().contains("jitterDistance"), "{err}");

    let cases = [
        (
            GestureSettings {
                distance_threshold: -0.5,
                ..GestureSettings::default()
            },
            SettingsError::NegativeThreshold {
                name: "distanceThreshold",
                value: -0.5,
            },
        ),
        (
            GestureSettings {
                difference_threshold: 0.0,
                ..GestureSettings::default()
            },
            SettingsError::DifferenceThresholdOutOfRange(0.0),
        ),
        (
            GestureSettings {
                difference_threshold: 1.0,
                ..GestureSettings::default()
            },
            SettingsError::DifferenceThresholdOutOfRange(1.0),
        ),
        (
            GestureSettings {
                deviation_tolerance: 1.5,
                ..GestureSettings::default()
            },
            SettingsError::DeviationToleranceOutOfRange(1.5),
        ),
        (
            GestureSettings {
                poll_interval_ms: 0,
                ..GestureSettings::default()
            },
            SettingsError::ZeroPollInterval,
        ),
    ];
    for (settings, expected) in cases {
        assert_eq!(settings.validate(), Err(expected));
    }
}

#[test]
fn nan_threshold_is_rejected() {
    let settings = GestureSettings {
        jitter_distance: f64::NAN,
        ..GestureSettings::default()
    };
    assert!(matches!(
        settings.validate(),
        Err(SettingsError::NegativeThreshold {
            name: "jitterDistance",
            ..
        })
    ));
}

#[test]
fn save_then_load_preserves_settings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let settings = GestureSettings {
        trigger_button: PointerButton::Primary,
        suppression_key: SuppressionKey::Ctrl,
        timeout_active: true,
        deviation_tolerance: 0.05,
        ..GestureSettings::default()
    };

    settings.save(&path).unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"triggerButton\": \"primary\""), "{raw}");

    assert_eq!(GestureSettings::load(&path).unwrap(), settings);
}
