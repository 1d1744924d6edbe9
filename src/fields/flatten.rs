use serde::Serialize;
use serde_json::{Map, Value};

use crate::catalog::{Record, unwrap_envelope};
use crate::config::FlattenOptions;
use crate::error::LensWarning;

use super::{PROMOTED_BOOST, RepresentationKind, Resolver, priority};

/// One field, resolved and ranked, ready for a fixed layout to draw.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldDirective {
    pub path: String,
    pub kind: RepresentationKind,
    pub value: Value,
    pub priority: i32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Flattened {
    pub directives: Vec<FieldDirective>,
    pub warnings: Vec<LensWarning>,
}

impl Resolver {
    /// Resolves every top-level field of `fields`, lifting the visual content
    /// of nested groups one level up, and returns the best `max_fields`
    /// directives.
    pub fn flatten_fields(&self, fields: &Map<String, Value>, options: &FlattenOptions) -> Flattened {
        let mut flattened = Flattened::default();

        for (name, raw) in fields {
            if options.is_excluded(name) {
                continue;
            }
            self.flatten_entry(name, raw, 0, options, &mut flattened);
        }

        flattened.directives.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.path.cmp(&b.path))
        });
        flattened.directives.truncate(options.max_fields);
        flattened
    }

    pub fn flatten(&self, record: &Record, options: &FlattenOptions) -> Flattened {
        self.flatten_fields(record.fields(), options)
    }

    fn flatten_entry(
        &self,
        path: &str,
        raw: &Value,
        depth: usize,
        options: &FlattenOptions,
        flattened: &mut Flattened,
    ) {
        let value = unwrap_envelope(raw);
        let resolution = self.inspect(path, value);
        flattened.warnings.extend(resolution.warning);

        let children = match value {
            Value::Object(children)
                if resolution.kind == RepresentationKind::NestedGroup && depth < options.max_depth =>
            {
                children
            }
            _ => {
                flattened
                    .directives
                    .push(directive(path, resolution.kind, value, false));
                return;
            }
        };

        let mut kept_back = 0usize;
        for (child_name, child_raw) in children {
            if options.is_excluded(child_name) {
                continue;
            }

            let child_path = format!("{path}.{child_name}");
            let child_value = unwrap_envelope(child_raw);
            let child = self.inspect(&child_path, child_value);
            if child.kind.is_container() {
                kept_back += 1;
                continue;
            }

            flattened.warnings.extend(child.warning);
            flattened
                .directives
                .push(directive(&child_path, child.kind, child_value, true));
        }

        if kept_back > 0 {
            flattened
                .directives
                .push(directive(path, RepresentationKind::NestedGroup, value, false));
        }
    }
}

fn directive(path: &str, kind: RepresentationKind, value: &Value, promoted: bool) -> FieldDirective {
    let boost = if promoted { PROMOTED_BOOST } else { 0 };
    FieldDirective {
        path: path.to_owned(),
        kind,
        value: value.clone(),
        priority: priority(path, kind) + boost,
    }
}

/// Flattens a record with default thresholds.
pub fn flatten(record: &Record, options: &FlattenOptions) -> Vec<FieldDirective> {
    Resolver::default().flatten(record, options).directives
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(fields) => Record::new("test", fields),
            _ => Record::new("test", Map::new()),
        }
    }

    fn paths(directives: &[FieldDirective]) -> Vec<&str> {
        directives.iter().map(|d| d.path.as_str()).collect()
    }

    #[test]
    fn promotes_visual_children_of_nested_groups() {
        let record = record(json!({
            "id": "amanita-muscaria",
            "commonName": "Fly agaric",
            "growth": {
                "temperature": {"min": 8, "max": 20},
                "profile": {"flavor": 2, "potency": 9, "rarity": 4},
                "seasons": ["late summer", "autumn"],
                "substrate": {"primary": "soil", "partners": ["birch", "pine"], "pH": 5.5,
                               "moisture": "high", "notes": "mycorrhizal", "depth": 4}
            }
        }));

        let directives = flatten(&record, &FlattenOptions::default());
        let found = paths(&directives);

        assert!(found.contains(&"growth.temperature"));
        assert!(found.contains(&"growth.profile"));
        assert!(found.contains(&"growth.seasons"));
        assert!(found.contains(&"growth"), "nested child keeps the parent group");
        assert!(!found.contains(&"growth.substrate"));
        assert!(!found.contains(&"id"));

        let temperature = directives
            .iter()
            .find(|d| d.path == "growth.temperature")
            .map(|d| d.kind);
        assert_eq!(temperature, Some(RepresentationKind::BoundedRange));
    }

    #[test]
    fn fully_promoted_group_is_dropped() {
        let record = record(json!({
            "growth": {
                "temperature": {"min": 8, "max": 20},
                "seasons": ["spring"],
                "substrate": "wood",
                "humidity": {"value": 80, "max": 100},
                "light": "shade",
                "elevation": {"min": 0, "max": 900}
            }
        }));
        let directives = flatten(&record, &FlattenOptions::default());
        assert!(!paths(&directives).contains(&"growth"));
        assert_eq!(directives.len(), 6);
    }

    #[test]
    fn depth_zero_keeps_groups_closed() {
        let options = FlattenOptions {
            max_depth: 0,
            ..FlattenOptions::default()
        };
        let record = record(json!({
            "growth": {"a": [1], "b": 1, "c": 2, "d": 3, "e": 4, "f": 5}
        }));
        let directives = flatten(&record, &options);
        assert_eq!(paths(&directives), ["growth"]);
        assert_eq!(directives[0].kind, RepresentationKind::NestedGroup);
    }

    #[test]
    fn sorted_by_priority_and_truncated() {
        let options = FlattenOptions {
            max_fields: 3,
            ..FlattenOptions::default()
        };
        let record = record(json!({
            "updatedAt": "2024-01-02T10:00:00Z",
            "description": "A large red mushroom with white warts on the cap.",
            "edibility": "poisonous",
            "commonName": "Fly agaric",
            "capSize": {"min": 8, "max": 20, "unit": "cm"},
            "family": "Amanitaceae"
        }));

        let directives = flatten(&record, &options);
        assert_eq!(paths(&directives), ["edibility", "capSize", "commonName"]);
        assert!(directives.windows(2).all(|pair| pair[0].priority >= pair[1].priority));
    }

    #[test]
    fn unwraps_envelopes_in_directive_values() {
        let record = record(json!({
            "edibility": {"value": "choice", "confidence": 0.9, "sources": ["guide"]}
        }));
        let directives = flatten(&record, &FlattenOptions::default());
        assert_eq!(directives[0].value, json!("choice"));
        assert_eq!(directives[0].kind, RepresentationKind::TagSet);
    }

    #[test]
    fn only_promoted_children_get_the_promotion_boost() {
        let record = record(json!({
            "growth.seasons": ["spring", "autumn"],
            "growth": {"seasons": ["summer"], "substrate": "wood", "extra": [{"a": 1}]}
        }));
        let directives = flatten(&record, &FlattenOptions::default());
        let priorities = directives
            .iter()
            .filter(|d| d.path == "growth.seasons")
            .map(|d| d.priority)
            .collect::<Vec<_>>();

        let base = priority("growth.seasons", RepresentationKind::TagSet);
        assert_eq!(priorities.len(), 2);
        assert!(priorities.contains(&(base + PROMOTED_BOOST)));
        assert!(priorities.contains(&base));
    }

    #[test]
    fn excluded_children_are_skipped() {
        let record = record(json!({
            "meta": {"slug": "x", "colors": ["red", "white"], "extra": [{"a": 1}]}
        }));
        let directives = flatten(&record, &FlattenOptions::default());
        assert_eq!(paths(&directives), ["meta.colors", "meta"]);
    }

    #[test]
    fn malformed_range_is_reported_not_fatal() {
        let flattened = Resolver::default().flatten(
            &record(json!({"capSize": {"min": 20, "max": 8}})),
            &FlattenOptions::default(),
        );
        assert_eq!(flattened.directives.len(), 1);
        assert_eq!(flattened.directives[0].kind, RepresentationKind::KeyValueTable);
        assert_eq!(flattened.warnings.len(), 1);
    }

    fn record_fields() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            any::<bool>().prop_map(Value::Bool),
            any::<i16>().prop_map(|n| json!(n)),
            "[a-z ]{0,40}".prop_map(Value::String),
        ];
        let nested = leaf.prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..7).prop_map(Value::Array),
                prop::collection::btree_map("[a-zA-Z]{1,10}", inner, 0..7)
                    .prop_map(|map| Value::Object(map.into_iter().collect())),
            ]
        });
        prop::collection::btree_map("[a-zA-Z_]{1,12}", nested, 0..12)
            .prop_map(|map| Value::Object(map.into_iter().collect()))
    }

    proptest! {
        #[test]
        fn flatten_is_deterministic(fields in record_fields()) {
            let record = record(fields);
            let options = FlattenOptions::default();
            let first = flatten(&record, &options);
            let second = flatten(&record, &options);
            prop_assert!(first.len() <= options.max_fields);
            prop_assert_eq!(first, second);
        }
    }
}
