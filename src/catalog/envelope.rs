use serde_json::{Map, Value};

const ENVELOPE_VALUE_KEY: &str = "value";
const ENVELOPE_META_KEYS: [&str; 3] = ["confidence", "sources", "consensus"];

/// True when `map` is a provenance envelope: a `value` key accompanied only
/// by sourcing metadata.
pub fn is_envelope_map(map: &Map<String, Value>) -> bool {
    map.contains_key(ENVELOPE_VALUE_KEY)
        && map
            .keys()
            .all(|key| key == ENVELOPE_VALUE_KEY || ENVELOPE_META_KEYS.contains(&key.as_str()))
}

pub fn is_envelope(value: &Value) -> bool {
    matches!(value, Value::Object(map) if is_envelope_map(map))
}

/// Peels provenance envelopes until a bare value remains.
pub fn unwrap_envelope(value: &Value) -> &Value {
    let mut current = value;
    while let Value::Object(map) = current
        && is_envelope_map(map)
        && let Some(inner) = map.get(ENVELOPE_VALUE_KEY)
    {
        current = inner;
    }
    current
}

/// Follows a dotted path through nested mappings, unwrapping envelopes on
/// the way. The returned value is unwrapped as well.
pub fn lookup_path<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.').filter(|segment| !segment.is_empty());
    let first = segments.next()?;
    let mut current = unwrap_envelope(root.get(first)?);

    for segment in segments {
        let Value::Object(map) = current else {
            return None;
        };
        current = unwrap_envelope(map.get(segment)?);
    }

    Some(current)
}

/// Text for scalar values; `None` for null, sequences and mappings.
pub fn scalar_text(value: &Value) -> Option<String> {
    match unwrap_envelope(value) {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn unwraps_nested_envelopes() {
        let value = json!({
            "value": {"value": 12, "confidence": 0.4},
            "sources": ["field guide"],
            "consensus": "high"
        });
        assert_eq!(unwrap_envelope(&value), &json!(12));
    }

    #[test]
    fn mappings_with_other_keys_are_not_envelopes() {
        let progress = json!({"value": 3, "max": 5});
        assert!(!is_envelope(&progress));
        assert_eq!(unwrap_envelope(&progress), &progress);
    }

    #[test]
    fn lookup_crosses_envelopes() {
        let record = json!({
            "taxonomy": {"value": {"family": {"value": "Amanitaceae", "confidence": 0.9}}}
        });
        let Value::Object(root) = record else {
            unreachable!()
        };
        assert_eq!(lookup_path(&root, "taxonomy.family"), Some(&json!("Amanitaceae")));
        assert_eq!(lookup_path(&root, "taxonomy.genus"), None);
        assert_eq!(lookup_path(&root, ""), None);
    }

    fn nested_envelope() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            any::<i64>().prop_map(|n| json!(n)),
            "[a-z]{0,12}".prop_map(Value::String),
            any::<bool>().prop_map(Value::Bool),
        ];
        leaf.prop_recursive(4, 16, 2, |inner| {
            (inner, proptest::option::of(0.0f64..1.0)).prop_map(|(value, confidence)| {
                match confidence {
                    Some(confidence) => json!({"value": value, "confidence": confidence}),
                    None => json!({"value": value}),
                }
            })
        })
    }

    proptest! {
        #[test]
        fn unwrapping_is_idempotent(value in nested_envelope()) {
            let once = unwrap_envelope(&value);
            prop_assert_eq!(unwrap_envelope(once), once);
            prop_assert!(!is_envelope(once));
        }
    }
}
