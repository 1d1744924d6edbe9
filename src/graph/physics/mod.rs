mod forces;
mod quadtree;

use eframe::egui::{Vec2, vec2};

use crate::config::PhysicsConfig;
use crate::util::{stable_pair, stable_pair_salted};

use super::model::{FOCUS_INDEX, GraphModel, GraphNode};
use forces::{Collision, Repulsion, spring};
use quadtree::Quadtree;

const BARNES_HUT_THETA: f32 = 0.72;
const SOFTENING: f32 = 620.0;
const COLLISION_SPACING: f32 = 1.8;
const FALLBACK_DT: f32 = 1.0 / 60.0;

/// Outcome of one integration step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepReport {
    /// Any node still settling after the step.
    pub moving: bool,
    /// Ids of nodes whose state went non-finite and was reset.
    pub unstable: Vec<String>,
}

fn reset_node(node: &mut GraphNode, bounds_half: Vec2) -> bool {
    let position_ok = node.position.is_finite();
    let velocity_ok = node.velocity.is_finite();
    if position_ok && velocity_ok {
        return false;
    }

    node.velocity = Vec2::ZERO;
    if !position_ok {
        node.position = if node.is_focus {
            Vec2::ZERO
        } else {
            let (x, y) = stable_pair(&node.id);
            vec2(x * bounds_half.x, y * bounds_half.y) * 0.5
        };
    }
    true
}

/// Advances every free node by `dt` seconds. `tick` seeds the idle drift so
/// identical inputs give identical layouts.
pub fn step(model: &mut GraphModel, dt: f32, tick: u64, config: &PhysicsConfig) -> StepReport {
    let parts = model.physics_parts();
    let nodes = parts.nodes;
    let node_count = nodes.len();
    let mut report = StepReport::default();
    if node_count == 0 {
        return report;
    }

    let half = parts.bounds.size() * 0.5;
    for node in nodes.iter_mut() {
        if reset_node(node, half) {
            report.unstable.push(node.id.clone());
        }
    }

    let dt = if dt.is_finite() && dt > 0.0 { dt } else { FALLBACK_DT };
    let time_step_scale = (dt * 60.0).clamp(0.25, 3.0);

    let intensity = config.intensity.clamp(0.2, 2.5);
    let repulsion = Repulsion {
        strength: 78_000.0 * intensity * config.repulsion_scale.clamp(0.25, 2.6),
        softening: SOFTENING,
        theta: BARNES_HUT_THETA,
    };
    let spring_strength = 0.016 * intensity * config.spring_scale.clamp(0.2, 2.2);
    let spring_damping = 0.22;
    let focus_pull = config.focus_spring.clamp(0.0, 0.5) * intensity;
    let center_pull = 0.0011 * intensity;
    let damping = (config.velocity_damping - intensity * 0.015).clamp(0.78, 0.97);
    let damping_factor = damping.powf(time_step_scale);
    let edge_length = config.preferred_edge_length.max(10.0);

    let scratch = parts.scratch;
    scratch.forces.clear();
    scratch.forces.resize(node_count, Vec2::ZERO);
    scratch.positions.clear();
    scratch.positions.extend(nodes.iter().map(|node| node.position));
    scratch.radii.clear();
    scratch.radii.extend(nodes.iter().map(|node| node.radius));
    let max_radius = scratch.radii.iter().copied().fold(0.0_f32, f32::max);

    let forces = &mut scratch.forces;
    let positions = &scratch.positions;

    if node_count > 1
        && let Some(tree) = Quadtree::new(positions)
    {
        for (index, force) in forces.iter_mut().enumerate() {
            *force += repulsion.accumulate(&tree, index, positions);
        }

        let reach = max_radius * 2.0 * COLLISION_SPACING;
        let collision = Collision {
            strength: 1.9 * intensity * config.collision_scale.clamp(0.2, 2.0),
            spacing: COLLISION_SPACING,
            reach_sq: reach * reach,
        };
        collision.accumulate(&tree, &tree, true, positions, &scratch.radii, forces);
    }

    for edge in parts.edges {
        if edge.from >= node_count || edge.to >= node_count || edge.from == edge.to {
            continue;
        }
        let (from, to) = (&nodes[edge.from], &nodes[edge.to]);
        let weight = edge.weight.clamp(0.0, 1.0);
        let rest = edge_length * (1.0 - 0.5 * weight) + (from.radius + to.radius) * 2.0;
        let force = spring(
            from.position - to.position,
            from.velocity - to.velocity,
            rest,
            spring_strength * weight,
            spring_damping,
        );
        forces[edge.from] += force;
        forces[edge.to] -= force;
    }

    // The focus node is an anchor: its edges only move the record end.
    let focus = nodes[FOCUS_INDEX].position;
    for edge in parts.focus_edges {
        let Some(record) = nodes.get(edge.to) else {
            continue;
        };
        let weight = edge.weight.clamp(0.0, 1.0);
        let rest = edge_length * (2.0 - 1.6 * weight);
        forces[edge.to] += spring(
            record.position - focus,
            record.velocity,
            rest,
            spring_strength * (0.2 + weight),
            spring_damping,
        );
    }

    for (force, node) in forces.iter_mut().zip(nodes.iter()) {
        *force -= node.position * center_pull;
    }
    forces[FOCUS_INDEX] -= nodes[FOCUS_INDEX].position * focus_pull;

    let max_force = 165.0 + intensity * 90.0;
    let max_speed = 11.0 + intensity * 15.0;
    let rest_speed_sq = config.rest_speed * config.rest_speed;
    let min_force_sq = 0.08 * 0.08;
    let inner = parts.bounds.shrink(config.boundary_margin.max(0.0));
    let restitution = config.boundary_restitution.clamp(0.0, 1.0);
    let drift = config.drift.max(0.0);

    for (index, node) in nodes.iter_mut().enumerate() {
        if node.pinned {
            node.velocity = Vec2::ZERO;
            continue;
        }

        let mut force = forces[index];
        if !force.is_finite() {
            force = Vec2::ZERO;
        }
        let force_sq = force.length_sq();
        if force_sq > max_force * max_force {
            force *= max_force / force_sq.sqrt();
        }

        let mut velocity = (node.velocity + force * (0.055 * time_step_scale)) * damping_factor;
        let speed_sq = velocity.length_sq();
        if speed_sq > max_speed * max_speed {
            velocity *= max_speed / speed_sq.sqrt();
        }
        if velocity.length_sq() < rest_speed_sq && force_sq < min_force_sq {
            velocity = Vec2::ZERO;
        }

        node.velocity = velocity;
        node.position += velocity * time_step_scale;

        if node.is_focus {
            continue;
        }

        if drift > 0.0 {
            let (x, y) = stable_pair_salted(&node.id, tick);
            node.position += vec2(x, y) * drift * time_step_scale;
        }

        if inner.is_positive() {
            if node.position.x < inner.min.x || node.position.x > inner.max.x {
                node.position.x = node.position.x.clamp(inner.min.x, inner.max.x);
                node.velocity.x = -node.velocity.x * restitution;
            }
            if node.position.y < inner.min.y || node.position.y > inner.max.y {
                node.position.y = node.position.y.clamp(inner.min.y, inner.max.y);
                node.velocity.y = -node.velocity.y * restitution;
            }
        }
    }

    for node in nodes.iter_mut() {
        if reset_node(node, half) && !report.unstable.contains(&node.id) {
            report.unstable.push(node.id.clone());
        }
        if node.velocity.length_sq() > rest_speed_sq {
            report.moving = true;
        }
    }

    if !report.unstable.is_empty() {
        tracing::warn!(nodes = ?report.unstable, "reset non-finite node state");
    }
    report
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, Value, json};

    use super::*;
    use crate::catalog::{Catalog, Record};
    use crate::config::LensConfig;
    use crate::graph::{Scorer, ViewState};
    use crate::graph::model::Motion;

    fn catalog(count: usize) -> Catalog {
        Catalog::new(
            (0..count)
                .map(|index| {
                    let fields = match json!({"uses": ["edible", format!("tag{}", index % 3)]}) {
                        Value::Object(map) => map,
                        _ => Map::new(),
                    };
                    Record::new(format!("record-{index}"), fields)
                })
                .collect(),
        )
    }

    fn model(count: usize) -> GraphModel {
        let mut model = GraphModel::new(catalog(count), &LensConfig::default());
        model.recompute_weights(&ViewState::default(), &Scorer::default());
        model
    }

    #[test]
    fn nodes_stay_inside_the_surface() {
        let mut model = model(40);
        let config = PhysicsConfig::default();
        let inner = model.bounds().shrink(config.boundary_margin);

        for tick in 0..240 {
            let report = step(&mut model, 1.0 / 60.0, tick, &config);
            assert!(report.unstable.is_empty());
        }

        for node in &model.nodes()[1..] {
            assert!(node.position.is_finite());
            assert!(inner.expand(0.001).contains(node.position.to_pos2()), "{}", node.id);
        }
    }

    #[test]
    fn focus_node_is_pulled_to_the_center() {
        let mut model = model(0);
        model.nodes_mut()[FOCUS_INDEX].position = vec2(200.0, -120.0);
        let config = PhysicsConfig::default();
        for tick in 0..400 {
            step(&mut model, 1.0 / 60.0, tick, &config);
        }
        assert!(model.focus().position.length() < 20.0);
    }

    #[test]
    fn pinned_nodes_do_not_integrate() {
        let mut model = model(5);
        assert!(model.drag("record-2", vec2(50.0, 60.0)));
        for tick in 0..30 {
            step(&mut model, 1.0 / 60.0, tick, &PhysicsConfig::default());
        }
        let index = model.index_of("record-2").unwrap_or_default();
        assert_eq!(model.nodes()[index].position, vec2(50.0, 60.0));
        assert_eq!(model.nodes()[index].velocity, Vec2::ZERO);
    }

    #[test]
    fn non_finite_state_is_reset_and_reported() {
        let mut model = model(3);
        model.nodes_mut()[1].position = vec2(f32::NAN, 0.0);
        model.nodes_mut()[2].velocity = vec2(f32::INFINITY, 1.0);

        let report = step(&mut model, 1.0 / 60.0, 0, &PhysicsConfig::default());

        assert_eq!(report.unstable, vec!["record-0".to_owned(), "record-1".to_owned()]);
        assert!(model.nodes().iter().all(|node| node.position.is_finite() && node.velocity.is_finite()));
    }

    #[test]
    fn garbage_delta_time_is_clamped() {
        let mut model = model(6);
        for dt in [f32::NAN, -1.0, 0.0, 1_000.0, f32::INFINITY] {
            let report = step(&mut model, dt, 0, &PhysicsConfig::default());
            assert!(report.unstable.is_empty());
        }
        assert!(model.nodes().iter().all(|node| node.position.is_finite()));
    }

    #[test]
    fn quiet_graph_comes_to_rest_without_drift() {
        let mut model = model(2);
        model.set_surface_size(vec2(4_000.0, 4_000.0));
        let config = PhysicsConfig {
            drift: 0.0,
            ..PhysicsConfig::default()
        };
        let mut report = StepReport::default();
        for tick in 0..4_000 {
            report = step(&mut model, 1.0 / 60.0, tick, &config);
        }
        assert!(!report.moving);
        assert!(
            model
                .nodes()
                .iter()
                .all(|node| node.motion(config.rest_speed) == Motion::Resting)
        );
    }

    #[test]
    fn same_inputs_give_same_layout() {
        let mut first = model(12);
        let mut second = model(12);
        for tick in 0..50 {
            step(&mut first, 1.0 / 60.0, tick, &PhysicsConfig::default());
            step(&mut second, 1.0 / 60.0, tick, &PhysicsConfig::default());
        }
        let positions = |model: &GraphModel| {
            model.nodes().iter().map(|node| node.position).collect::<Vec<_>>()
        };
        assert_eq!(positions(&first), positions(&second));
    }
}
