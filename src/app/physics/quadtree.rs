use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 12;
const MAX_DEPTH: usize = 10;

/// Square cell of the tree, stored as centre plus half side.
#[derive(Clone, Copy, Debug)]
pub(super) struct QuadBounds {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl QuadBounds {
    /// Smallest padded square around `points`; `None` when there are no
    /// finite points to cover.
    fn covering(points: &[Vec2]) -> Option<Self> {
        let (min, max) = points.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(min, max), point| (min.min(*point), max.max(*point)),
        );
        if !(min.is_finite() && max.is_finite()) {
            return None;
        }

        let span = (max - min).max_elem().max(1.0);
        Some(Self {
            center: (min + max) / 2.0,
            half_extent: span / 2.0 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let offset = (point - self.center).abs();
        offset.max_elem() <= self.half_extent
    }

    /// Quadrant `0..4` as a bit pair: bit 0 set on the right, bit 1 set below.
    fn quadrant_of(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }

    fn quadrant(self, quadrant: usize) -> Self {
        let half = self.half_extent / 2.0;
        let sign = |bit: usize| if quadrant & bit == 0 { -half } else { half };
        Self {
            center: self.center + vec2(sign(1), sign(2)),
            half_extent: half,
        }
    }

    pub(super) fn side_length(self) -> f32 {
        self.half_extent * 2.0
    }

    /// Squared gap between two cells, zero when they touch or overlap.
    pub(super) fn distance_sq_to(self, other: Self) -> f32 {
        let reach = Vec2::splat(self.half_extent + other.half_extent);
        ((self.center - other.center).abs() - reach)
            .max(Vec2::ZERO)
            .length_sq()
    }
}

/// Barnes-Hut cell. Every body has unit mass, so `mass` is the body count.
/// Only leaves keep body indices; inner cells keep their non-empty quadrants.
pub(super) struct QuadNode {
    pub(super) bounds: QuadBounds,
    pub(super) center_of_mass: Vec2,
    pub(super) mass: f32,
    pub(super) indices: Vec<usize>,
    quadrants: Vec<QuadNode>,
}

impl QuadNode {
    pub(super) fn build(positions: &[Vec2]) -> Option<Self> {
        let bounds = QuadBounds::covering(positions)?;
        Some(Self::subdivide(bounds, (0..positions.len()).collect(), positions, 0))
    }

    fn subdivide(bounds: QuadBounds, indices: Vec<usize>, positions: &[Vec2], depth: usize) -> Self {
        let mass = indices.len() as f32;
        let center_of_mass = if indices.is_empty() {
            bounds.center
        } else {
            indices
                .iter()
                .fold(Vec2::ZERO, |sum, &index| sum + positions[index])
                / mass
        };

        let mut node = Self {
            bounds,
            center_of_mass,
            mass,
            indices,
            quadrants: Vec::new(),
        };
        if depth >= MAX_DEPTH || node.indices.len() <= LEAF_CAPACITY {
            return node;
        }

        let mut buckets: [Vec<usize>; 4] = Default::default();
        for &index in &node.indices {
            buckets[bounds.quadrant_of(positions[index])].push(index);
        }
        // Coincident bodies would otherwise split forever.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() < 2 {
            return node;
        }

        node.quadrants = buckets
            .into_iter()
            .enumerate()
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(|(quadrant, bucket)| {
                Self::subdivide(bounds.quadrant(quadrant), bucket, positions, depth + 1)
            })
            .collect();
        node.indices = Vec::new();
        node
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.quadrants.is_empty()
    }

    pub(super) fn children(&self) -> impl Iterator<Item = &QuadNode> {
        self.quadrants.iter()
    }
}
