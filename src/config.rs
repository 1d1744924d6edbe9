use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Every tunable policy of the resolver, scorer and simulation.
///
/// All sections fall back to their defaults field by field, so a config file
/// only needs to name the values it changes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensConfig {
    pub resolver: ResolverThresholds,
    pub flatten: FlattenOptions,
    pub scoring: ScoringWeights,
    pub physics: PhysicsConfig,
    pub schema: CatalogSchema,
}

impl LensConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("config is not valid JSON for LensConfig")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverThresholds {
    /// Strings shorter than this (in chars) read as a single tag.
    pub tag_max_chars: usize,
    /// Strings up to this length read as a short label; longer ones are paragraphs.
    pub short_label_max_chars: usize,
    pub tag_list_avg_chars: f64,
    pub tag_list_small_count: usize,
    pub tag_list_small_item_chars: usize,
    pub sparkline_min_items: usize,
    pub sparkline_max_items: usize,
    pub radar_min_items: usize,
    pub radar_max_items: usize,
    pub radar_max_value: f64,
    pub pie_min_items: usize,
    pub pie_max_items: usize,
    pub bar_min_items: usize,
    pub bar_max_items: usize,
    pub table_max_keys: usize,
}

impl Default for ResolverThresholds {
    fn default() -> Self {
        Self {
            tag_max_chars: 15,
            short_label_max_chars: 30,
            tag_list_avg_chars: 20.0,
            tag_list_small_count: 6,
            tag_list_small_item_chars: 40,
            sparkline_min_items: 5,
            sparkline_max_items: 15,
            radar_min_items: 3,
            radar_max_items: 12,
            radar_max_value: 10.0,
            pie_min_items: 2,
            pie_max_items: 8,
            bar_min_items: 3,
            bar_max_items: 15,
            table_max_keys: 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenOptions {
    pub max_depth: usize,
    pub max_fields: usize,
    pub excluded_fields: Vec<String>,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            max_depth: 1,
            max_fields: 12,
            excluded_fields: ["id", "_id", "uuid", "slug"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

impl FlattenOptions {
    pub fn is_excluded(&self, field: &str) -> bool {
        self.excluded_fields
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(field))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub tags: f32,
    pub lenses: f32,
    pub taxonomy: f32,
    pub regions: f32,
    pub family_bonus: f32,
    pub genus_bonus: f32,
    /// Record pairs scoring below this have no edge.
    pub edge_threshold: f32,
    pub focus_search: f32,
    pub focus_lenses: f32,
    pub focus_selection: f32,
    pub focus_baseline: f32,
    /// Connections lighter than this are not drawn.
    pub draw_threshold: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            tags: 0.40,
            lenses: 0.25,
            taxonomy: 0.20,
            regions: 0.15,
            family_bonus: 0.5,
            genus_bonus: 1.0,
            edge_threshold: 0.2,
            focus_search: 0.55,
            focus_lenses: 0.25,
            focus_selection: 0.15,
            focus_baseline: 0.05,
            draw_threshold: 0.01,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub intensity: f32,
    pub repulsion_scale: f32,
    pub spring_scale: f32,
    pub collision_scale: f32,
    pub velocity_damping: f32,
    pub focus_spring: f32,
    pub boundary_margin: f32,
    pub boundary_restitution: f32,
    /// Magnitude of the idle drift applied to record nodes each tick.
    pub drift: f32,
    pub rest_speed: f32,
    pub preferred_edge_length: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            repulsion_scale: 1.0,
            spring_scale: 1.0,
            collision_scale: 1.0,
            velocity_damping: 0.9,
            focus_spring: 0.045,
            boundary_margin: 24.0,
            boundary_restitution: 0.6,
            drift: 0.12,
            rest_speed: 0.02,
            preferred_edge_length: 150.0,
        }
    }
}

/// Where the scorer finds identity, taxonomy, regions and lens categories
/// inside otherwise schemaless records. Paths are dotted and may cross
/// provenance envelopes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSchema {
    pub id_fields: Vec<String>,
    pub label_fields: Vec<String>,
    pub family_paths: Vec<String>,
    pub genus_paths: Vec<String>,
    pub scientific_name_paths: Vec<String>,
    pub region_paths: Vec<String>,
    pub category_paths: Vec<String>,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

impl Default for CatalogSchema {
    fn default() -> Self {
        Self {
            id_fields: owned(&["id", "slug", "uuid"]),
            label_fields: owned(&["commonName", "common_name", "name", "title"]),
            family_paths: owned(&["family", "taxonomy.family", "classification.family"]),
            genus_paths: owned(&["genus", "taxonomy.genus", "classification.genus"]),
            scientific_name_paths: owned(&["scientificName", "scientific_name", "latinName"]),
            region_paths: owned(&["regions", "region", "distribution", "habitat.regions"]),
            category_paths: owned(&["category", "kingdom", "type", "group"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config =
            LensConfig::from_json(r#"{"scoring": {"edge_threshold": 0.35}, "flatten": {"max_fields": 4}}"#)
                .expect("config parses");

        assert_eq!(config.scoring.edge_threshold, 0.35);
        assert_eq!(config.scoring.tags, ScoringWeights::default().tags);
        assert_eq!(config.flatten.max_fields, 4);
        assert_eq!(config.flatten.max_depth, 1);
        assert_eq!(config.resolver, ResolverThresholds::default());
    }

    #[test]
    fn default_similarity_weights_sum_to_one() {
        let weights = ScoringWeights::default();
        let record = weights.tags + weights.lenses + weights.taxonomy + weights.regions;
        let focus = weights.focus_search
            + weights.focus_lenses
            + weights.focus_selection
            + weights.focus_baseline;
        assert!((record - 1.0).abs() < 1e-6);
        assert!((focus - 1.0).abs() < 1e-6);
    }

    #[test]
    fn excluded_fields_match_case_insensitively() {
        let options = FlattenOptions::default();
        assert!(options.is_excluded("ID"));
        assert!(options.is_excluded("slug"));
        assert!(!options.is_excluded("name"));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(LensConfig::from_json("{ not json").is_err());
    }
}
