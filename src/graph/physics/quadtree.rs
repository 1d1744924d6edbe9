use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 10;

#[derive(Clone, Copy, Debug)]
pub(super) struct Cell {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl Cell {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for point in points.iter().filter(|point| point.is_finite()) {
            min = min.min(*point);
            max = max.max(*point);
        }

        if !min.is_finite() || !max.is_finite() {
            return None;
        }

        let span = (max - min).max(vec2(1.0, 1.0));
        Some(Self {
            center: (min + max) * 0.5,
            half_extent: span.max_elem() * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let offset = (point - self.center).abs();
        offset.x <= self.half_extent && offset.y <= self.half_extent
    }

    pub(super) fn side(self) -> f32 {
        self.half_extent * 2.0
    }

    pub(super) fn gap_sq(self, other: Self) -> f32 {
        let reach = self.half_extent + other.half_extent;
        let gap = ((self.center - other.center).abs() - vec2(reach, reach)).max(Vec2::ZERO);
        gap.length_sq()
    }

    fn quadrant(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }

    fn child(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let sign_x = if quadrant & 1 == 0 { -1.0 } else { 1.0 };
        let sign_y = if quadrant & 2 == 0 { -1.0 } else { 1.0 };
        Self {
            center: self.center + vec2(sign_x * quarter, sign_y * quarter),
            half_extent: quarter,
        }
    }
}

pub(super) struct Quadtree {
    pub(super) cell: Cell,
    pub(super) center_of_mass: Vec2,
    pub(super) mass: f32,
    pub(super) indices: Vec<usize>,
    pub(super) children: [Option<Box<Quadtree>>; 4],
}

impl Quadtree {
    pub(super) fn new(positions: &[Vec2]) -> Option<Self> {
        let cell = Cell::enclosing(positions)?;
        let indices = (0..positions.len())
            .filter(|&index| positions[index].is_finite())
            .collect();
        Some(Self::build(cell, indices, positions, 0))
    }

    fn build(cell: Cell, indices: Vec<usize>, positions: &[Vec2], depth: usize) -> Self {
        let mass = indices.len() as f32;
        let center_of_mass = if indices.is_empty() {
            cell.center
        } else {
            indices
                .iter()
                .fold(Vec2::ZERO, |sum, &index| sum + positions[index])
                / mass
        };

        let mut tree = Self {
            cell,
            center_of_mass,
            mass,
            indices,
            children: std::array::from_fn(|_| None),
        };
        if depth >= MAX_DEPTH || tree.indices.len() <= LEAF_CAPACITY {
            return tree;
        }

        let mut buckets: [Vec<usize>; 4] = std::array::from_fn(|_| Vec::new());
        for &index in &tree.indices {
            buckets[cell.quadrant(positions[index])].push(index);
        }
        // Coincident points would otherwise recurse to the depth limit.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return tree;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if !bucket.is_empty() {
                tree.children[quadrant] = Some(Box::new(Self::build(
                    cell.child(quadrant),
                    bucket,
                    positions,
                    depth + 1,
                )));
            }
        }
        tree.indices.clear();
        tree
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn children(&self) -> impl Iterator<Item = &Quadtree> {
        self.children.iter().filter_map(|child| child.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_count(tree: &Quadtree) -> usize {
        if tree.is_leaf() {
            tree.indices.len()
        } else {
            tree.children().map(leaf_count).sum()
        }
    }

    #[test]
    fn every_finite_point_lands_in_exactly_one_leaf() {
        let mut positions = (0..40)
            .map(|index| vec2((index % 7) as f32 * 31.0, (index / 7) as f32 * 17.0))
            .collect::<Vec<_>>();
        positions.push(vec2(f32::NAN, 3.0));

        let tree = Quadtree::new(&positions).expect("finite points present");
        assert_eq!(tree.mass, 40.0);
        assert_eq!(leaf_count(&tree), 40);
        assert!(!tree.is_leaf());
        assert!(positions[..40].iter().all(|point| tree.cell.contains(*point)));
    }

    #[test]
    fn coincident_points_stay_in_one_leaf() {
        let positions = vec![vec2(5.0, 5.0); 30];
        let tree = Quadtree::new(&positions).expect("finite points present");
        assert!(tree.is_leaf());
        assert_eq!(tree.center_of_mass, vec2(5.0, 5.0));
    }

    #[test]
    fn no_finite_points_means_no_tree() {
        assert!(Quadtree::new(&[]).is_none());
        assert!(Quadtree::new(&[vec2(f32::INFINITY, 0.0)]).is_none());
    }

    #[test]
    fn gap_between_cells() {
        let a = Cell { center: vec2(0.0, 0.0), half_extent: 1.0 };
        let b = Cell { center: vec2(5.0, 0.0), half_extent: 1.0 };
        assert_eq!(a.gap_sq(b), 9.0);
        assert_eq!(a.gap_sq(a), 0.0);
    }
}
