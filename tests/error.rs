//! Tests for error module

use roadside::error::{GeocodeError, OptionExt};

#[test]
fn test_error_display() {
    let err = GeocodeError::MissingSnapshot {
        latitude: 47.61,
        longitude: -122.34,
    };
    assert!(err.to_string().contains("47.61"));
    assert!(err.to_string().contains("no spatial data"));

    let err = GeocodeError::MapData("duplicate road key r1".to_string());
    assert!(err.to_string().contains("r1"));
}

#[test]
fn test_option_ext_missing_snapshot() {
    let none: Option<i32> = None;
    let result = none.ok_or_missing_snapshot(1.0, 2.0);
    assert!(matches!(
        result,
        Err(GeocodeError::MissingSnapshot {
            latitude,
            longitude
        }) if latitude == 1.0 && longitude == 2.0
    ));

    assert_eq!(Some(5).ok_or_missing_snapshot(0.0, 0.0).unwrap(), 5);
}

#[test]
fn test_option_ext_map_data() {
    let none: Option<&str> = None;
    assert!(matches!(
        none.ok_or_map_data("no roads"),
        Err(GeocodeError::MapData(msg)) if msg == "no roads"
    ));
}

#[test]
fn test_json_error_converts() {
    let parse = serde_json::from_str::<serde_json::Value>("{not json");
    let err: GeocodeError = parse.unwrap_err().into();
    assert!(matches!(err, GeocodeError::Json(_)));
}
