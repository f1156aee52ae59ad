//! Configuration normalization.
//!
//! Turns raw, possibly partial or malformed input (a freshly loaded record,
//! a hand-edited file, a default) into a [`Configuration`] that satisfies
//! every invariant. Total and idempotent.

use serde_json::{Map, Value};

use super::{
    Configuration, CustomImages, DEFAULT_DISPLAY_TIME_SECS, MAX_DISPLAY_TIME_SECS,
    MIN_DISPLAY_TIME_SECS,
};

/// Field names owned by [`Configuration`]; everything else passes through.
const KNOWN_FIELDS: &[&str] = &[
    "theme",
    "display_time",
    "displayTime",
    "corner",
    "custom_images",
    "customImages",
];

/// Normalize a raw configuration value. Never fails.
pub fn normalize(raw: &Value) -> Configuration {
    let Some(obj) = raw.as_object() else {
        tracing::debug!("Configuration is not an object, using defaults");
        return Configuration::default();
    };

    let field = |snake: &str, camel: &str| obj.get(snake).or_else(|| obj.get(camel));

    Configuration {
        theme: parse_choice(obj.get("theme"), "theme"),
        display_time: coerce_display_time(field("display_time", "displayTime")),
        corner: parse_choice(obj.get("corner"), "corner"),
        custom_images: coerce_custom_images(field("custom_images", "customImages")),
        extra: obj
            .iter()
            .filter(|(key, _)| !KNOWN_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect::<Map<String, Value>>(),
    }
}

/// Clamp a whole number of seconds into the allowed display range.
pub fn clamp_display_time(secs: i64) -> u32 {
    let clamped = secs.clamp(MIN_DISPLAY_TIME_SECS.into(), MAX_DISPLAY_TIME_SECS.into());
    u32::try_from(clamped).unwrap_or(DEFAULT_DISPLAY_TIME_SECS)
}

fn coerce_display_time(value: Option<&Value>) -> u32 {
    let secs = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Bool(b)) => Some(f64::from(u8::from(*b))),
        _ => None,
    };

    match secs.filter(|s| s.is_finite()) {
        Some(s) => clamp_display_time(s.round() as i64),
        None => DEFAULT_DISPLAY_TIME_SECS,
    }
}

fn parse_choice<T>(value: Option<&Value>, name: &str) -> T
where
    T: std::str::FromStr + Default,
{
    match value.and_then(Value::as_str).filter(|s| !s.is_empty()) {
        Some(s) => s.parse().unwrap_or_else(|_| {
            tracing::debug!(field = name, value = s, "Unrecognized value, using default");
            T::default()
        }),
        None => T::default(),
    }
}

fn coerce_custom_images(value: Option<&Value>) -> CustomImages {
    let Some(images) = value.and_then(Value::as_object) else {
        return CustomImages::default();
    };
    let path = |key: &str| {
        images
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    CustomImages {
        copy: path("copy"),
        clear: path("clear"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Corner, Theme};
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_empty_object_uses_defaults() {
        let cfg = normalize(&json!({}));
        assert_eq!(cfg.theme, Theme::Dark);
        assert_eq!(cfg.corner, Corner::BottomRight);
        assert_eq!(cfg.display_time, 3);
        assert_eq!(cfg.custom_images.copy, "");
        assert_eq!(cfg.custom_images.clear, "");
    }

    #[test]
    fn test_display_time_is_clamped() {
        assert_eq!(normalize(&json!({"display_time": 0})).display_time, 1);
        assert_eq!(normalize(&json!({"display_time": 120})).display_time, 60);
        assert_eq!(normalize(&json!({"display_time": -4})).display_time, 1);
        assert_eq!(normalize(&json!({"display_time": 10})).display_time, 10);
    }

    #[test]
    fn test_display_time_coercion() {
        assert_eq!(normalize(&json!({"display_time": "7"})).display_time, 7);
        assert_eq!(normalize(&json!({"display_time": 4.6})).display_time, 5);
        assert_eq!(normalize(&json!({"display_time": "soon"})).display_time, 3);
        assert_eq!(normalize(&json!({"display_time": null})).display_time, 3);
        assert_eq!(normalize(&json!({"display_time": true})).display_time, 1);
        assert_eq!(normalize(&json!({"display_time": false})).display_time, 1);
        assert_eq!(normalize(&json!({"display_time": ""})).display_time, 3);
        assert_eq!(normalize(&json!({"display_time": [5]})).display_time, 3);
    }

    #[test]
    fn test_camel_case_fields_are_accepted() {
        let cfg = normalize(&json!({
            "displayTime": 12,
            "customImages": { "copy": "/img/copy.png" }
        }));
        assert_eq!(cfg.display_time, 12);
        assert_eq!(cfg.custom_images.copy, "/img/copy.png");
        assert!(cfg.extra.is_empty());
    }

    #[test]
    fn test_falsy_and_unknown_choices_fall_back() {
        let cfg = normalize(&json!({"theme": "", "corner": null}));
        assert_eq!(cfg.theme, Theme::Dark);
        assert_eq!(cfg.corner, Corner::BottomRight);

        let cfg = normalize(&json!({"theme": "neon", "corner": 3}));
        assert_eq!(cfg.theme, Theme::Dark);
        assert_eq!(cfg.corner, Corner::BottomRight);

        let cfg = normalize(&json!({"theme": "custom", "corner": "top_left"}));
        assert_eq!(cfg.theme, Theme::Custom);
        assert_eq!(cfg.corner, Corner::TopLeft);
    }

    #[test]
    fn test_custom_image_entries_default_to_empty() {
        let cfg = normalize(&json!({"custom_images": {"copy": null, "clear": false}}));
        assert_eq!(cfg.custom_images, CustomImages::default());

        let cfg = normalize(&json!({"custom_images": "nope"}));
        assert_eq!(cfg.custom_images, CustomImages::default());
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let cfg = normalize(&json!({"theme": "light", "window_opacity": 0.8}));
        assert_eq!(cfg.extra.get("window_opacity"), Some(&json!(0.8)));

        let written = serde_json::to_value(&cfg).unwrap();
        assert_eq!(written["window_opacity"], json!(0.8));
        assert_eq!(written["theme"], json!("light"));
    }

    #[test]
    fn test_non_object_input_uses_defaults() {
        assert_eq!(normalize(&json!(null)), Configuration::default());
        assert_eq!(normalize(&json!([1, 2])), Configuration::default());
        assert_eq!(normalize(&json!("dark")), Configuration::default());
    }

    #[test]
    fn test_typed_normalized_clamps() {
        let cfg = Configuration {
            display_time: 0,
            ..Configuration::default()
        };
        assert_eq!(cfg.normalized().display_time, 1);
    }

    fn arb_key() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("theme".to_string()),
            Just("display_time".to_string()),
            Just("displayTime".to_string()),
            Just("corner".to_string()),
            Just("custom_images".to_string()),
            Just("customImages".to_string()),
            Just("copy".to_string()),
            Just("clear".to_string()),
            "[a-z]{1,8}",
        ]
    }

    fn arb_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            any::<f64>().prop_map(|f| serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null)),
            Just(json!("custom")),
            Just(json!("top_left")),
            "[0-9]{0,4}".prop_map(Value::String),
            "[a-z_ ]{0,12}".prop_map(Value::String),
        ]
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        arb_leaf().prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map(arb_key(), inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_normalize_is_total_and_bounded(raw in arb_json()) {
            let cfg = normalize(&raw);
            prop_assert!((1..=60).contains(&cfg.display_time));
            for key in KNOWN_FIELDS {
                prop_assert!(!cfg.extra.contains_key(*key));
            }
        }

        #[test]
        fn prop_normalize_is_idempotent(raw in arb_json()) {
            let once = normalize(&raw);
            let twice = normalize(&serde_json::to_value(&once).unwrap());
            prop_assert_eq!(&twice, &once);
            prop_assert_eq!(once.clone().normalized(), once);
        }
    }
}
