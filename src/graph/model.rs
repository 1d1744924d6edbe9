use std::collections::HashMap;

use eframe::egui::{Pos2, Rect, Vec2, vec2};

use crate::catalog::{Catalog, RESERVED_ID, Record, RecordProfile};
use crate::config::LensConfig;
use crate::fields::Resolver;
use crate::util::stable_pair;

use super::ViewState;
use super::score::Scorer;

pub const FOCUS_NODE_ID: &str = RESERVED_ID;
pub const FOCUS_INDEX: usize = 0;

const FOCUS_RADIUS: f32 = 22.0;
const MIN_NODE_RADIUS: f32 = 7.0;
const NODE_RADIUS_SPAN: f32 = 13.0;
const DEFAULT_SURFACE: Vec2 = vec2(1200.0, 800.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    Settling,
    Resting,
    /// Pinned under the pointer.
    Held,
}

#[derive(Clone, Debug)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub is_focus: bool,
    /// Index into the catalog; `None` for the focus node.
    pub payload: Option<usize>,
    /// Held by the pointer; the integrator leaves it where it is.
    pub pinned: bool,
}

impl GraphNode {
    pub fn motion(&self, rest_speed: f32) -> Motion {
        if self.pinned {
            Motion::Held
        } else if self.velocity.length_sq() > rest_speed * rest_speed {
            Motion::Settling
        } else {
            Motion::Resting
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightedEdge {
    pub from: usize,
    pub to: usize,
    pub weight: f32,
}

#[derive(Default)]
pub(super) struct PhysicsScratch {
    pub(super) forces: Vec<Vec2>,
    pub(super) positions: Vec<Vec2>,
    pub(super) radii: Vec<f32>,
}

pub(super) struct PhysicsParts<'a> {
    pub(super) bounds: Rect,
    pub(super) nodes: &'a mut [GraphNode],
    pub(super) edges: &'a [WeightedEdge],
    pub(super) focus_edges: &'a [WeightedEdge],
    pub(super) scratch: &'a mut PhysicsScratch,
}

/// Catalog records as nodes plus the synthetic focus node at index 0.
///
/// Weights are cached per revision and only recomputed after
/// [`GraphModel::mark_dirty`]; replacing the catalog rebuilds everything.
pub struct GraphModel {
    catalog: Catalog,
    profiles: Vec<RecordProfile>,
    nodes: Vec<GraphNode>,
    index_by_id: HashMap<String, usize>,
    edges: Vec<WeightedEdge>,
    focus_edges: Vec<WeightedEdge>,
    focus_weights: Vec<f32>,
    surface_size: Vec2,
    revision: u64,
    weights_dirty: bool,
    physics_scratch: PhysicsScratch,
}

fn normalize_log(value: usize, min: usize, max: usize) -> f32 {
    let min = min.max(1) as f64;
    let max = (max.max(1) as f64).max(min);
    let value = (value.max(1) as f64).clamp(min, max);

    let denominator = max.ln() - min.ln();
    if denominator.abs() < f64::EPSILON {
        return 0.5;
    }

    ((value.ln() - min.ln()) / denominator).clamp(0.0, 1.0) as f32
}

impl GraphModel {
    pub fn new(catalog: Catalog, config: &LensConfig) -> Self {
        let mut model = Self {
            catalog: Catalog::empty(),
            profiles: Vec::new(),
            nodes: Vec::new(),
            index_by_id: HashMap::new(),
            edges: Vec::new(),
            focus_edges: Vec::new(),
            focus_weights: Vec::new(),
            surface_size: DEFAULT_SURFACE,
            revision: 0,
            weights_dirty: true,
            physics_scratch: PhysicsScratch::default(),
        };
        model.replace_catalog(catalog, config);
        model
    }

    /// Discards every node, including in-flight physics state, and rebuilds
    /// from `catalog`.
    pub fn replace_catalog(&mut self, catalog: Catalog, config: &LensConfig) {
        let resolver = Resolver::new(config.resolver.clone());
        let profiles = catalog
            .iter()
            .map(|record| RecordProfile::from_record(record, &config.schema, &resolver))
            .collect::<Vec<_>>();

        let field_counts = catalog
            .iter()
            .map(|record| record.fields().len())
            .collect::<Vec<_>>();
        let min_fields = field_counts.iter().copied().min().unwrap_or(1);
        let max_fields = field_counts.iter().copied().max().unwrap_or(1);

        let spread = self.surface_size * 0.35;
        let mut nodes = Vec::with_capacity(catalog.len() + 1);
        nodes.push(GraphNode {
            id: FOCUS_NODE_ID.to_owned(),
            label: "focus".to_owned(),
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            radius: FOCUS_RADIUS,
            is_focus: true,
            payload: None,
            pinned: false,
        });

        for (index, (profile, field_count)) in profiles.iter().zip(&field_counts).enumerate() {
            let (jx, jy) = stable_pair(&profile.id);
            let mut direction = vec2(jx, jy);
            if direction.length_sq() <= 0.0001 {
                let angle = ((index as f32) * 0.618_034 + 0.11) * std::f32::consts::TAU;
                direction = vec2(angle.cos(), angle.sin());
            }

            nodes.push(GraphNode {
                id: profile.id.clone(),
                label: profile.label.clone(),
                position: vec2(direction.x * spread.x, direction.y * spread.y),
                velocity: direction.normalized() * 1.2,
                radius: MIN_NODE_RADIUS
                    + normalize_log(*field_count, min_fields, max_fields) * NODE_RADIUS_SPAN,
                is_focus: false,
                payload: Some(index),
                pinned: false,
            });
        }

        self.index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect();
        self.focus_weights = vec![0.0; nodes.len()];
        self.nodes = nodes;
        self.profiles = profiles;
        self.catalog = catalog;
        self.edges.clear();
        self.focus_edges.clear();
        self.weights_dirty = true;
        self.revision = self.revision.wrapping_add(1);

        tracing::debug!(
            records = self.catalog.len(),
            revision = self.revision,
            "graph model rebuilt"
        );
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub(super) fn nodes_mut(&mut self) -> &mut [GraphNode] {
        &mut self.nodes
    }

    pub(super) fn physics_parts(&mut self) -> PhysicsParts<'_> {
        PhysicsParts {
            bounds: self.bounds(),
            nodes: &mut self.nodes,
            edges: &self.edges,
            focus_edges: &self.focus_edges,
            scratch: &mut self.physics_scratch,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn record_count(&self) -> usize {
        self.profiles.len()
    }

    pub fn focus(&self) -> &GraphNode {
        &self.nodes[FOCUS_INDEX]
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn record(&self, node_index: usize) -> Option<&Record> {
        let payload = self.nodes.get(node_index)?.payload?;
        self.catalog.get(payload)
    }

    pub fn profile(&self, node_index: usize) -> Option<&RecordProfile> {
        let payload = self.nodes.get(node_index)?.payload?;
        self.profiles.get(payload)
    }

    /// Materialized record-to-record edges, strongest first.
    pub fn edges(&self) -> &[WeightedEdge] {
        &self.edges
    }

    /// One edge from the focus node to every record.
    pub fn focus_edges(&self) -> &[WeightedEdge] {
        &self.focus_edges
    }

    pub fn focus_weight(&self, node_index: usize) -> f32 {
        self.focus_weights.get(node_index).copied().unwrap_or(0.0)
    }

    pub fn weights_dirty(&self) -> bool {
        self.weights_dirty
    }

    pub fn mark_dirty(&mut self) {
        self.weights_dirty = true;
    }

    /// On-demand weight between two nodes by id; the focus id scores with
    /// the focus formula. Unknown ids weigh 0.
    pub fn weight(&self, a: &str, b: &str, view: &ViewState, scorer: &Scorer) -> f32 {
        let (Some(a), Some(b)) = (self.index_of(a), self.index_of(b)) else {
            return 0.0;
        };
        if a == b {
            return 0.0;
        }

        match (self.profile(a), self.profile(b)) {
            (Some(a), Some(b)) => scorer.pair(a, b, view),
            (Some(record), None) | (None, Some(record)) => scorer.focus(record, view),
            (None, None) => 0.0,
        }
    }

    pub fn recompute_weights(&mut self, view: &ViewState, scorer: &Scorer) {
        let mut edges = Vec::new();
        let mut focus_edges = Vec::with_capacity(self.profiles.len());
        let mut focus_weights = vec![0.0; self.nodes.len()];

        for from in 1..self.nodes.len() {
            let Some(from_profile) = self.profile(from) else {
                continue;
            };

            let focus_weight = scorer.focus(from_profile, view);
            focus_weights[from] = focus_weight;
            focus_edges.push(WeightedEdge {
                from: FOCUS_INDEX,
                to: from,
                weight: focus_weight,
            });

            for to in (from + 1)..self.nodes.len() {
                let Some(to_profile) = self.profile(to) else {
                    continue;
                };
                let weight = scorer.pair(from_profile, to_profile, view);
                if scorer.is_edge(weight) {
                    edges.push(WeightedEdge { from, to, weight });
                }
            }
        }

        self.edges = edges;
        self.focus_edges = focus_edges;
        self.focus_weights = focus_weights;
        self.edges.sort_by(|a, b| {
            b.weight
                .total_cmp(&a.weight)
                .then_with(|| (a.from, a.to).cmp(&(b.from, b.to)))
        });
        self.weights_dirty = false;
        self.revision = self.revision.wrapping_add(1);

        tracing::debug!(
            edges = self.edges.len(),
            revision = self.revision,
            "similarity weights recomputed"
        );
    }

    /// Puts every free node back into the settling state with a small,
    /// deterministic kick.
    pub fn perturb(&mut self, strength: f32) {
        for (index, node) in self.nodes.iter_mut().enumerate() {
            if node.pinned || node.is_focus {
                continue;
            }
            let (jx, jy) = crate::util::stable_pair_salted(&node.id, self.revision ^ index as u64);
            node.velocity += vec2(jx, jy) * strength;
        }
    }

    pub fn surface_size(&self) -> Vec2 {
        self.surface_size
    }

    /// World-space bounds, centered on the origin.
    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(Pos2::ZERO, self.surface_size)
    }

    pub fn set_surface_size(&mut self, size: Vec2) {
        if size.x.is_finite() && size.y.is_finite() && size.x > 1.0 && size.y > 1.0 {
            self.surface_size = size;
        }
    }

    pub fn drag(&mut self, id: &str, position: Vec2) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        if !position.is_finite() {
            return false;
        }
        let node = &mut self.nodes[index];
        node.pinned = true;
        node.position = position;
        node.velocity = Vec2::ZERO;
        true
    }

    pub fn release(&mut self, id: &str) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let node = &mut self.nodes[index];
        node.pinned = false;
        let (jx, jy) = stable_pair(&node.id);
        node.velocity += vec2(jx, jy) * 0.8;
        true
    }

    /// Closest node whose disc contains `world`.
    pub fn node_at(&self, world: Vec2, radius_scale: f32) -> Option<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let distance = (node.position - world).length();
                (distance <= node.radius * radius_scale).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    /// Lens categories across the catalog, most frequent first.
    pub fn available_lenses(&self, limit: usize) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for profile in &self.profiles {
            for category in &profile.lens_categories {
                *counts.entry(category.as_str()).or_insert(0) += 1;
            }
        }

        let mut ranked = counts
            .into_iter()
            .map(|(category, count)| (category.to_owned(), count))
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit);
        ranked
    }
}
