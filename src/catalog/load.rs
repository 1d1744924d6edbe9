use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde_json::{Map, Value};

use crate::config::CatalogSchema;

use super::{Catalog, Record};

const WRAPPER_KEYS: [&str; 4] = ["records", "species", "items", "catalog"];

pub(super) fn load_catalog(path: &Path, schema: &CatalogSchema) -> Result<Catalog> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    let catalog = parse_catalog(&raw, schema)
        .with_context(|| format!("failed to parse catalog {}", path.display()))?;
    tracing::info!(path = %path.display(), records = catalog.len(), "catalog loaded");
    Ok(catalog)
}

pub(super) fn parse_catalog(raw: &str, schema: &CatalogSchema) -> Result<Catalog> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in catalog")?;

    let records = match parsed {
        Value::Array(items) => records_from_array(items, schema),
        Value::Object(mut object) => {
            let wrapped = WRAPPER_KEYS
                .iter()
                .find_map(|key| match object.get(*key) {
                    Some(Value::Array(_)) => Some(*key),
                    _ => None,
                });

            match wrapped.and_then(|key| object.remove(key)) {
                Some(Value::Array(items)) => records_from_array(items, schema),
                _ => records_from_keyed_map(object, schema),
            }
        }
        other => {
            return Err(anyhow!(
                "catalog must be an array or object of records, found {}",
                json_type_name(&other)
            ));
        }
    };

    Ok(Catalog::new(records))
}

fn records_from_array(items: Vec<Value>, schema: &CatalogSchema) -> Vec<Record> {
    let mut records = Vec::with_capacity(items.len());
    for (position, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(fields) => records.push(Record::from_fields(fields, position, schema)),
            other => {
                tracing::warn!(
                    position,
                    found = json_type_name(&other),
                    "skipping catalog entry that is not a mapping"
                );
            }
        }
    }
    records
}

fn records_from_keyed_map(object: Map<String, Value>, schema: &CatalogSchema) -> Vec<Record> {
    let mut records = Vec::with_capacity(object.len());
    for (position, (key, item)) in object.into_iter().enumerate() {
        let Value::Object(fields) = item else {
            tracing::warn!(key = %key, "skipping keyed catalog entry that is not a mapping");
            continue;
        };

        let has_own_id = schema.id_fields.iter().any(|field| fields.contains_key(field));
        if has_own_id {
            records.push(Record::from_fields(fields, position, schema));
        } else {
            records.push(Record::new(key, fields));
        }
    }
    records
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
