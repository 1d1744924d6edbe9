use std::collections::BTreeSet;

use serde_json::Value;

use crate::config::CatalogSchema;
use crate::fields::{RepresentationKind, Resolver};

use super::{Record, scalar_text, unwrap_envelope};

/// The parts of a record the similarity scorer compares, normalized to
/// lowercase once per catalog load.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordProfile {
    pub id: String,
    pub label: String,
    pub category: Option<String>,
    pub tags: BTreeSet<String>,
    pub lens_categories: BTreeSet<String>,
    pub family: Option<String>,
    pub genus: Option<String>,
    pub regions: BTreeSet<String>,
}

fn normalize(text: &str) -> Option<String> {
    let text = text.trim().to_lowercase();
    (!text.is_empty()).then_some(text)
}

fn collect_strings(value: &Value, into: &mut BTreeSet<String>) {
    match unwrap_envelope(value) {
        Value::String(text) => into.extend(normalize(text)),
        Value::Array(items) => {
            for item in items {
                if let Value::String(text) = unwrap_envelope(item) {
                    into.extend(normalize(text));
                }
            }
        }
        _ => {}
    }
}

fn first_text(record: &Record, paths: &[String]) -> Option<String> {
    paths
        .iter()
        .find_map(|path| record.lookup(path).and_then(scalar_text))
        .and_then(|text| normalize(&text))
}

impl RecordProfile {
    pub fn from_record(record: &Record, schema: &CatalogSchema, resolver: &Resolver) -> Self {
        let schema_fields = schema
            .id_fields
            .iter()
            .chain(&schema.label_fields)
            .chain(&schema.family_paths)
            .chain(&schema.genus_paths)
            .chain(&schema.scientific_name_paths)
            .chain(&schema.region_paths)
            .chain(&schema.category_paths)
            .map(String::as_str)
            .collect::<BTreeSet<_>>();

        let mut tags = BTreeSet::new();
        for (name, value) in record.fields() {
            if schema_fields.contains(name.as_str()) {
                continue;
            }
            if resolver.resolve(name, value) == RepresentationKind::TagSet {
                collect_strings(value, &mut tags);
            }
        }

        let mut categories = BTreeSet::new();
        for path in &schema.category_paths {
            if let Some(value) = record.lookup(path) {
                collect_strings(value, &mut categories);
            }
        }

        let mut regions = BTreeSet::new();
        for path in &schema.region_paths {
            if let Some(value) = record.lookup(path) {
                collect_strings(value, &mut regions);
            }
        }

        let genus = first_text(record, &schema.genus_paths).or_else(|| {
            first_text(record, &schema.scientific_name_paths)
                .and_then(|name| name.split_whitespace().next().map(str::to_owned))
        });

        let mut lens_categories = tags.clone();
        lens_categories.extend(categories.iter().cloned());

        Self {
            id: record.id().to_owned(),
            label: record.label(schema),
            category: categories.into_iter().next(),
            tags,
            lens_categories,
            family: first_text(record, &schema.family_paths),
            genus,
            regions,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, json};

    use super::*;

    fn profile(value: Value) -> RecordProfile {
        let fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        RecordProfile::from_record(
            &Record::new("subject", fields),
            &CatalogSchema::default(),
            &Resolver::default(),
        )
    }

    #[test]
    fn collects_tag_fields_and_skips_schema_fields() {
        let profile = profile(json!({
            "name": "Chanterelle",
            "uses": ["Edible", {"value": "Choice", "confidence": 0.7}],
            "color": "golden",
            "description": "Funnel shaped with false gills running down the stem.",
            "family": "Cantharellaceae",
            "regions": ["Europe", "north america"]
        }));

        let tags = profile.tags.iter().map(String::as_str).collect::<Vec<_>>();
        assert_eq!(tags, ["choice", "edible", "golden"]);
        assert_eq!(profile.family.as_deref(), Some("cantharellaceae"));
        assert!(profile.regions.contains("north america"));
        assert_eq!(profile.label, "Chanterelle");
    }

    #[test]
    fn genus_falls_back_to_scientific_name() {
        let inferred = profile(json!({"scientificName": "Boletus edulis"}));
        assert_eq!(inferred.genus.as_deref(), Some("boletus"));

        let explicit = profile(json!({
            "scientificName": "Boletus edulis",
            "taxonomy": {"genus": "Suillus"}
        }));
        assert_eq!(explicit.genus.as_deref(), Some("suillus"));
    }

    #[test]
    fn lens_categories_include_category_fields() {
        let profile = profile(json!({"kingdom": "Fungi", "uses": ["medicinal"]}));
        assert_eq!(profile.category.as_deref(), Some("fungi"));
        assert!(profile.lens_categories.contains("fungi"));
        assert!(profile.lens_categories.contains("medicinal"));
        assert!(!profile.tags.contains("fungi"));
    }
}
