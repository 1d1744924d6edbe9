use eframe::egui::{Vec2, vec2};

use super::quadtree::Quadtree;

#[derive(Clone, Copy, Debug)]
pub(super) struct Repulsion {
    pub(super) strength: f32,
    pub(super) softening: f32,
    pub(super) theta: f32,
}

#[derive(Clone, Copy, Debug)]
pub(super) struct Collision {
    pub(super) strength: f32,
    pub(super) spacing: f32,
    pub(super) reach_sq: f32,
}

fn separation(a: Vec2, b: Vec2, seed_a: usize, seed_b: usize) -> (Vec2, f32) {
    let delta = a - b;
    let distance = delta.length();
    if distance > 0.0001 {
        return (delta / distance, distance);
    }
    let angle = ((seed_a as f32) * 0.618_034 + (seed_b as f32) * 0.414_214) * std::f32::consts::TAU;
    (vec2(angle.cos(), angle.sin()), distance)
}

impl Repulsion {
    fn between(self, a: Vec2, b: Vec2, mass: f32) -> Vec2 {
        let delta = a - b;
        let distance_sq = delta.length_sq();
        let direction = if distance_sq > 0.0001 * 0.0001 {
            delta / distance_sq.sqrt()
        } else {
            vec2(1.0, 0.0)
        };
        direction * (self.strength * mass / (distance_sq + self.softening))
    }

    pub(super) fn accumulate(self, tree: &Quadtree, index: usize, positions: &[Vec2]) -> Vec2 {
        if tree.mass <= 0.0 {
            return Vec2::ZERO;
        }
        let point = positions[index];

        if tree.is_leaf() {
            return tree
                .indices
                .iter()
                .filter(|&&other| other != index)
                .fold(Vec2::ZERO, |force, &other| {
                    force + self.between(point, positions[other], 1.0)
                });
        }

        let distance = (point - tree.center_of_mass).length().max(0.01);
        let far_enough = !tree.cell.contains(point) && tree.cell.side() / distance < self.theta;
        if far_enough && tree.mass > 1.0 {
            return self.between(point, tree.center_of_mass, tree.mass);
        }

        tree.children()
            .fold(Vec2::ZERO, |force, child| force + self.accumulate(child, index, positions))
    }
}

impl Collision {
    fn push_apart(self, from: usize, to: usize, positions: &[Vec2], radii: &[f32], forces: &mut [Vec2]) {
        let (direction, distance) = separation(positions[from], positions[to], from, to);
        let min_distance = (radii[from] + radii[to]) * self.spacing;
        if distance < min_distance {
            let push = direction * ((min_distance - distance) * self.strength);
            forces[from] += push;
            forces[to] -= push;
        }
    }

    pub(super) fn accumulate(
        self,
        a: &Quadtree,
        b: &Quadtree,
        same: bool,
        positions: &[Vec2],
        radii: &[f32],
        forces: &mut [Vec2],
    ) {
        if a.cell.gap_sq(b.cell) > self.reach_sq {
            return;
        }

        if a.is_leaf() && b.is_leaf() {
            if same {
                for (offset, &from) in a.indices.iter().enumerate() {
                    for &to in &a.indices[offset + 1..] {
                        self.push_apart(from, to, positions, radii, forces);
                    }
                }
            } else {
                for &from in &a.indices {
                    for &to in &b.indices {
                        self.push_apart(from, to, positions, radii, forces);
                    }
                }
            }
            return;
        }

        if same {
            let children = a.children().collect::<Vec<_>>();
            for (offset, first) in children.iter().enumerate() {
                self.accumulate(first, first, true, positions, radii, forces);
                for second in &children[offset + 1..] {
                    self.accumulate(first, second, false, positions, radii, forces);
                }
            }
            return;
        }

        let split_a = !a.is_leaf() && (b.is_leaf() || a.cell.half_extent >= b.cell.half_extent);
        if split_a {
            for child in a.children() {
                self.accumulate(child, b, false, positions, radii, forces);
            }
        } else {
            for child in b.children() {
                self.accumulate(a, child, false, positions, radii, forces);
            }
        }
    }
}

pub(super) fn spring(delta: Vec2, relative_velocity: Vec2, rest_length: f32, stiffness: f32, damping: f32) -> Vec2 {
    let distance = delta.length();
    if distance <= 0.0001 {
        return Vec2::ZERO;
    }
    let direction = delta / distance;
    let stretch = (distance - rest_length) * stiffness;
    let resist = relative_velocity.dot(direction) * damping;
    -direction * (stretch + resist)
}
