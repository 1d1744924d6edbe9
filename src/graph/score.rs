use std::collections::BTreeSet;

use crate::catalog::RecordProfile;
use crate::config::ScoringWeights;

use super::ViewState;

/// Clamps into `[0, 1]`, mapping NaN to 0.
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f32 / union as f32
}

/// Intersection over the smaller set; 0 when either side is empty.
pub fn overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    let smaller = a.len().min(b.len());
    if smaller == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f32 / smaller as f32
}

fn same(a: Option<&str>, b: Option<&str>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

/// Similarity weights between records and toward the viewer's focus.
#[derive(Clone, Debug, Default)]
pub struct Scorer {
    weights: ScoringWeights,
}

impl Scorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Fraction of active lenses that both records satisfy.
    pub fn shared_lens_fraction(&self, a: &RecordProfile, b: &RecordProfile, view: &ViewState) -> f32 {
        if view.active_lenses.is_empty() {
            return 0.0;
        }
        let shared = view
            .active_lenses
            .iter()
            .filter(|lens| a.lens_categories.contains(*lens) && b.lens_categories.contains(*lens))
            .count();
        shared as f32 / view.active_lenses.len() as f32
    }

    /// Genus match wins over family match; the two never add up.
    pub fn taxonomy_bonus(&self, a: &RecordProfile, b: &RecordProfile) -> f32 {
        if same(a.genus.as_deref(), b.genus.as_deref()) {
            clamp_unit(self.weights.genus_bonus)
        } else if same(a.family.as_deref(), b.family.as_deref()) {
            clamp_unit(self.weights.family_bonus)
        } else {
            0.0
        }
    }

    pub fn pair(&self, a: &RecordProfile, b: &RecordProfile, view: &ViewState) -> f32 {
        let weights = &self.weights;
        let score = weights.tags * jaccard(&a.tags, &b.tags)
            + weights.lenses * self.shared_lens_fraction(a, b, view)
            + weights.taxonomy * self.taxonomy_bonus(a, b)
            + weights.regions * overlap(&a.regions, &b.regions);
        clamp_unit(score)
    }

    /// Weight between the focus node and a record. Never below the baseline,
    /// so every record stays attached to the focus.
    pub fn focus(&self, record: &RecordProfile, view: &ViewState) -> f32 {
        let weights = &self.weights;

        let search = if view.is_search_match(&record.id) { 1.0 } else { 0.0 };
        let lenses = if view.active_lenses.is_empty() {
            0.0
        } else {
            let satisfied = view
                .active_lenses
                .iter()
                .filter(|lens| record.lens_categories.contains(*lens))
                .count();
            satisfied as f32 / view.active_lenses.len() as f32
        };
        let selected = if view.is_selected(&record.id) { 1.0 } else { 0.0 };

        clamp_unit(
            weights.focus_search * search
                + weights.focus_lenses * lenses
                + weights.focus_selection * selected
                + weights.focus_baseline,
        )
    }

    pub fn is_edge(&self, weight: f32) -> bool {
        weight >= self.weights.edge_threshold
    }
}
