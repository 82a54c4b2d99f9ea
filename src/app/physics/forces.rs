use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

const DISTANCE_MIN_SQ: f32 = 1.0;

/// Tiny deterministic offset used when two bodies coincide.
pub(super) fn jiggle(seed: usize) -> Vec2 {
    let angle = ((seed as f32) * 0.618_034 + 0.37) * TAU;
    vec2(angle.cos(), angle.sin()) * 1e-6
}

fn charge_between(point: Vec2, other: Vec2, strength: f32, mass: f32, seed: usize) -> Vec2 {
    let mut delta = other - point;
    if delta == Vec2::ZERO {
        delta = jiggle(seed);
    }

    let mut distance_sq = delta.length_sq();
    if distance_sq < DISTANCE_MIN_SQ {
        distance_sq = (DISTANCE_MIN_SQ * distance_sq).sqrt();
    }
    delta * (strength * mass / distance_sq)
}

/// Velocity change on body `index` from every body under `node`. A negative
/// `strength` repels. Cells that look small enough from `index` act as one
/// body at their centre of mass.
pub(super) fn accumulate_charge(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    strength: f32,
    theta_sq: f32,
    velocity: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other in &node.indices {
            if other != index {
                *velocity += charge_between(point, positions[other], strength, 1.0, index + other);
            }
        }
        return;
    }

    let distance_sq = (node.center_of_mass - point).length_sq();
    let side = node.bounds.side_length();
    if !node.bounds.contains(point) && (side * side / theta_sq) < distance_sq {
        *velocity += charge_between(point, node.center_of_mass, strength, node.mass, index);
        return;
    }

    for child in node.children() {
        accumulate_charge(child, index, positions, strength, theta_sq, velocity);
    }
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) strength: f32,
    pub(super) max_collision_distance_sq: f32,
}

fn collide_pair(
    from: usize,
    to: usize,
    positions: &[Vec2],
    radii: &[f32],
    strength: f32,
    deltas: &mut [Vec2],
) {
    let reach = radii[from] + radii[to];
    let mut offset = positions[from] - positions[to];
    let distance_sq = offset.length_sq();
    if distance_sq >= reach * reach {
        return;
    }

    if offset == Vec2::ZERO {
        offset = jiggle(from * 31 + to);
    }
    let distance = offset.length();
    let push = offset * ((reach - distance) / distance * strength);

    let from_sq = radii[from] * radii[from];
    let to_sq = radii[to] * radii[to];
    let weight = to_sq / (from_sq + to_sq);
    deltas[from] += push * weight;
    deltas[to] -= push * (1.0 - weight);
}

/// Walks every pair of cells close enough to hold overlapping bodies and
/// pushes overlapping pairs apart, the smaller body moving further.
pub(super) fn accumulate_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    deltas: &mut [Vec2],
) {
    if node_a.bounds.distance_sq_to(node_b.bounds) > params.max_collision_distance_sq {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (position, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[position + 1..] {
                    collide_pair(from, to, positions, radii, params.strength, deltas);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    collide_pair(from, to, positions, radii, params.strength, deltas);
                }
            }
        }
        return;
    }

    if same_node {
        let children = node_a.children().collect::<Vec<_>>();
        for (position, child_a) in children.iter().enumerate() {
            accumulate_collision_pairs(child_a, child_a, true, positions, radii, params, deltas);
            for child_b in &children[position + 1..] {
                accumulate_collision_pairs(
                    child_a, child_b, false, positions, radii, params, deltas,
                );
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children() {
            accumulate_collision_pairs(child, node_b, false, positions, radii, params, deltas);
        }
    } else {
        for child in node_b.children() {
            accumulate_collision_pairs(node_a, child, false, positions, radii, params, deltas);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_charge_pushes_bodies_apart() {
        let positions = vec![vec2(0.0, 0.0), vec2(10.0, 0.0)];
        let tree = QuadNode::build(&positions).unwrap();

        let mut velocity = Vec2::ZERO;
        accumulate_charge(&tree, 0, &positions, -50.0, 0.81, &mut velocity);
        assert!(velocity.x < 0.0);
        assert!(velocity.y.abs() < 1e-6);
    }

    #[test]
    fn approximated_charge_matches_direct_sum_far_away() {
        let mut positions = (0..40)
            .map(|index| vec2((index % 8) as f32, (index / 8) as f32))
            .collect::<Vec<_>>();
        positions.push(vec2(500.0, 500.0));
        let probe = positions.len() - 1;
        let tree = QuadNode::build(&positions).unwrap();

        let mut approximated = Vec2::ZERO;
        accumulate_charge(&tree, probe, &positions, -30.0, 0.81, &mut approximated);

        let mut direct = Vec2::ZERO;
        for other in 0..probe {
            direct += charge_between(positions[probe], positions[other], -30.0, 1.0, other);
        }
        assert!((approximated - direct).length() < direct.length() * 0.05);
    }

    #[test]
    fn overlapping_bodies_are_separated_by_weight() {
        let positions = vec![vec2(0.0, 0.0), vec2(2.0, 0.0)];
        let radii = vec![2.0, 4.0];
        let tree = QuadNode::build(&positions).unwrap();
        let mut deltas = vec![Vec2::ZERO; 2];

        accumulate_collision_pairs(
            &tree,
            &tree,
            true,
            &positions,
            &radii,
            CollisionParams {
                strength: 1.0,
                max_collision_distance_sq: 64.0,
            },
            &mut deltas,
        );

        assert!(deltas[0].x < 0.0);
        assert!(deltas[1].x > 0.0);
        assert!(deltas[0].x.abs() > deltas[1].x.abs());
        assert!(((deltas[1].x - deltas[0].x) - 4.0).abs() < 1e-4);
    }

    #[test]
    fn distant_bodies_do_not_collide() {
        let positions = vec![vec2(0.0, 0.0), vec2(50.0, 0.0)];
        let radii = vec![2.0, 2.0];
        let tree = QuadNode::build(&positions).unwrap();
        let mut deltas = vec![Vec2::ZERO; 2];

        accumulate_collision_pairs(
            &tree,
            &tree,
            true,
            &positions,
            &radii,
            CollisionParams {
                strength: 1.0,
                max_collision_distance_sq: 16.0,
            },
            &mut deltas,
        );
        assert_eq!(deltas, vec![Vec2::ZERO; 2]);
    }
}
