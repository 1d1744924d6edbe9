//! Records as supplied by the external data layer.
//!
//! A record is an opaque mapping with no fixed schema. The catalog only
//! guarantees an order and a unique id per record; everything else is read
//! through [`envelope`] helpers and [`profile::RecordProfile`].

mod envelope;
mod load;
mod profile;

use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use serde_json::{Map, Value};

use crate::config::CatalogSchema;

pub use envelope::{is_envelope, is_envelope_map, lookup_path, scalar_text, unwrap_envelope};
pub use profile::RecordProfile;

/// Id of the synthetic focus node; no record may carry it.
pub const RESERVED_ID: &str = "__focus__";

#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    id: String,
    fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Builds a record, taking its id from the first schema id field that
    /// holds a scalar, falling back to `record-{position}`.
    pub fn from_fields(fields: Map<String, Value>, position: usize, schema: &CatalogSchema) -> Self {
        let id = schema
            .id_fields
            .iter()
            .chain(schema.label_fields.iter())
            .find_map(|field| fields.get(field).and_then(scalar_text))
            .map(|id| id.trim().to_owned())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("record-{position}"));
        Self { id, fields }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Top-level field with provenance envelopes removed.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).map(unwrap_envelope)
    }

    pub fn lookup(&self, path: &str) -> Option<&Value> {
        lookup_path(&self.fields, path)
    }

    pub fn label(&self, schema: &CatalogSchema) -> String {
        schema
            .label_fields
            .iter()
            .find_map(|field| self.lookup(field).and_then(scalar_text))
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| self.id.clone())
    }
}

/// Ordered, replaceable set of records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    records: Vec<Record>,
}

impl Catalog {
    /// Keeps order; later duplicates of an id, and a record claiming
    /// [`RESERVED_ID`], get a `#n` suffix.
    pub fn new(records: Vec<Record>) -> Self {
        let mut seen = HashSet::with_capacity(records.len() + 1);
        seen.insert(RESERVED_ID.to_owned());
        let records = records
            .into_iter()
            .map(|mut record| {
                if !seen.insert(record.id.clone()) {
                    let mut suffix = 2usize;
                    let base = record.id.clone();
                    while !seen.insert(format!("{base}#{suffix}")) {
                        suffix += 1;
                    }
                    record.id = format!("{base}#{suffix}");
                    tracing::warn!(id = %base, renamed = %record.id, "duplicate record id in catalog");
                }
                record
            })
            .collect();
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(path: &Path, schema: &CatalogSchema) -> Result<Self> {
        load::load_catalog(path, schema)
    }

    pub fn from_json_str(raw: &str, schema: &CatalogSchema) -> Result<Self> {
        load::parse_catalog(raw, schema)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn find(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn id_falls_back_through_schema_fields() {
        let schema = CatalogSchema::default();
        let with_slug = Record::from_fields(fields(json!({"slug": "fly-agaric"})), 0, &schema);
        assert_eq!(with_slug.id(), "fly-agaric");

        let with_name = Record::from_fields(fields(json!({"name": {"value": "Morel"}})), 1, &schema);
        assert_eq!(with_name.id(), "Morel");

        let anonymous = Record::from_fields(fields(json!({"color": "red"})), 7, &schema);
        assert_eq!(anonymous.id(), "record-7");
    }

    #[test]
    fn duplicate_ids_are_suffixed_in_order() {
        let catalog = Catalog::new(vec![
            Record::new("oak", Map::new()),
            Record::new("oak", Map::new()),
            Record::new("oak", Map::new()),
        ]);
        let ids = catalog.iter().map(Record::id).collect::<Vec<_>>();
        assert_eq!(ids, ["oak", "oak#2", "oak#3"]);
    }

    #[test]
    fn reserved_focus_id_is_renamed() {
        let catalog = Catalog::new(vec![
            Record::new(RESERVED_ID, Map::new()),
            Record::new("porcini", Map::new()),
        ]);
        let ids = catalog.iter().map(Record::id).collect::<Vec<_>>();
        assert_eq!(ids, ["__focus__#2", "porcini"]);
        assert!(catalog.find(RESERVED_ID).is_none());
    }

    #[test]
    fn label_prefers_common_name() {
        let schema = CatalogSchema::default();
        let record = Record::new(
            "amanita-muscaria",
            fields(json!({"name": "Amanita muscaria", "commonName": "Fly agaric"})),
        );
        assert_eq!(record.label(&schema), "Fly agaric");
        assert_eq!(Record::new("x", Map::new()).label(&schema), "x");
    }
}
