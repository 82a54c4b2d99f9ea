mod forces;
mod quadtree;

use eframe::egui::{Vec2, vec2};

use forces::{CollisionParams, accumulate_charge, accumulate_collision_pairs, jiggle};
use quadtree::QuadNode;

const ALPHA_MIN: f32 = 0.001;
const VELOCITY_DECAY: f32 = 0.4;
const BARNES_HUT_THETA_SQ: f32 = 0.81;
const CHARGE_SCALE: f32 = -100.0;
const COLLIDE_ITERATIONS: usize = 3;
const CLUSTER_STRENGTH: f32 = 0.15;
const RADIAL_STRENGTH: f32 = 0.2;
const RADIAL_VIEWPORT_FRACTION: f32 = 0.8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum SimulationPhase {
    Idle,
    Running,
    Reheated,
}

#[derive(Clone, Copy, Debug)]
pub(in crate::app) struct ForceParams {
    pub repel_force: f32,
    pub center_force: f32,
    pub link_distance: f32,
    pub radial: bool,
}

pub(in crate::app) struct NodeSeed {
    pub position: Vec2,
    pub radius: f32,
    pub cluster_target: Vec2,
}

struct SimNode {
    position: Vec2,
    velocity: Vec2,
    pinned: Option<Vec2>,
    radius: f32,
    cluster_target: Vec2,
}

struct SimLink {
    source: usize,
    target: usize,
    strength: f32,
    /// Share of the correction applied to the target end.
    bias: f32,
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    radii: Vec<f32>,
    deltas: Vec<Vec2>,
}

/// Alpha-cooled force layout. Every tick decays `alpha` toward
/// `alpha_target`, accumulates each force into the velocities scaled by the
/// current alpha, then damps and integrates.
pub(in crate::app) struct Simulation {
    nodes: Vec<SimNode>,
    links: Vec<SimLink>,
    params: ForceParams,
    alpha: f32,
    alpha_target: f32,
    alpha_decay: f32,
    radial_radius: f32,
    phase: SimulationPhase,
    scratch: Scratch,
}

impl Simulation {
    pub(in crate::app) fn new(seeds: Vec<NodeSeed>, edges: &[(usize, usize)], params: ForceParams) -> Self {
        let nodes = seeds
            .into_iter()
            .map(|seed| SimNode {
                position: seed.position,
                velocity: Vec2::ZERO,
                pinned: None,
                radius: seed.radius,
                cluster_target: seed.cluster_target,
            })
            .collect::<Vec<_>>();

        let mut degree = vec![0usize; nodes.len()];
        for &(source, target) in edges {
            if source < nodes.len() && target < nodes.len() && source != target {
                degree[source] += 1;
                degree[target] += 1;
            }
        }

        let links = edges
            .iter()
            .filter(|(source, target)| {
                *source < nodes.len() && *target < nodes.len() && source != target
            })
            .map(|&(source, target)| {
                let (source_degree, target_degree) = (degree[source] as f32, degree[target] as f32);
                SimLink {
                    source,
                    target,
                    strength: 1.0 / source_degree.min(target_degree),
                    bias: source_degree / (source_degree + target_degree),
                }
            })
            .collect();

        Self {
            nodes,
            links,
            params,
            alpha: 1.0,
            alpha_target: 0.0,
            alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / 300.0),
            radial_radius: 0.0,
            phase: SimulationPhase::Idle,
            scratch: Scratch::default(),
        }
    }

    pub(in crate::app) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(in crate::app) fn position(&self, index: usize) -> Option<Vec2> {
        self.nodes.get(index).map(|node| node.position)
    }

    pub(in crate::app) fn alpha(&self) -> f32 {
        self.alpha
    }

    pub(in crate::app) fn phase(&self) -> SimulationPhase {
        self.phase
    }

    pub(in crate::app) fn is_settled(&self) -> bool {
        self.alpha < ALPHA_MIN && self.alpha_target < ALPHA_MIN
    }

    pub(in crate::app) fn set_params(&mut self, params: ForceParams) {
        self.params = params;
    }

    /// The radial ring follows the shorter side of the viewport.
    pub(in crate::app) fn set_viewport(&mut self, size: Vec2) {
        self.radial_radius = size.min_elem() * 0.5 * RADIAL_VIEWPORT_FRACTION;
    }

    pub(in crate::app) fn reheat(&mut self, alpha: f32) {
        self.alpha = alpha;
        self.phase = SimulationPhase::Reheated;
    }

    pub(in crate::app) fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target;
        if target > 0.0 {
            self.phase = SimulationPhase::Reheated;
        }
    }

    pub(in crate::app) fn pin(&mut self, index: usize, position: Vec2) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pinned = Some(position);
        }
    }

    pub(in crate::app) fn unpin(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pinned = None;
        }
    }

    /// Advances one step. Returns whether anything moved.
    pub(in crate::app) fn tick(&mut self) -> bool {
        if self.phase == SimulationPhase::Idle {
            self.phase = SimulationPhase::Running;
        }
        if self.is_settled() || self.nodes.is_empty() {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        let alpha = self.alpha;

        self.apply_charge(alpha);
        self.apply_center();
        self.apply_links(alpha);
        self.apply_collisions();
        self.apply_cluster(alpha);
        if self.params.radial {
            self.apply_radial(alpha);
        }

        for node in &mut self.nodes {
            if let Some(pinned) = node.pinned {
                node.position = pinned;
                node.velocity = Vec2::ZERO;
            } else {
                node.velocity *= 1.0 - VELOCITY_DECAY;
                node.position += node.velocity;
            }
        }

        if self.phase == SimulationPhase::Reheated && self.alpha_target <= 0.0 {
            self.phase = SimulationPhase::Running;
        }
        true
    }

    fn fill_positions(&mut self) {
        self.scratch.positions.clear();
        self.scratch
            .positions
            .extend(self.nodes.iter().map(|node| node.position));
    }

    fn apply_charge(&mut self, alpha: f32) {
        self.fill_positions();
        let Some(tree) = QuadNode::build(&self.scratch.positions) else {
            return;
        };

        let strength = CHARGE_SCALE * self.params.repel_force * alpha;
        for (index, node) in self.nodes.iter_mut().enumerate() {
            accumulate_charge(
                &tree,
                index,
                &self.scratch.positions,
                strength,
                BARNES_HUT_THETA_SQ,
                &mut node.velocity,
            );
        }
    }

    /// Shifts the whole layout so its centroid moves toward the origin.
    fn apply_center(&mut self) {
        let count = self.nodes.len() as f32;
        let centroid = self
            .nodes
            .iter()
            .fold(Vec2::ZERO, |sum, node| sum + node.position)
            / count;
        let shift = centroid * self.params.center_force;
        for node in &mut self.nodes {
            node.position -= shift;
        }
    }

    fn apply_links(&mut self, alpha: f32) {
        for (index, link) in self.links.iter().enumerate() {
            let source = &self.nodes[link.source];
            let target = &self.nodes[link.target];
            let mut delta =
                (target.position + target.velocity) - (source.position + source.velocity);
            if delta == Vec2::ZERO {
                delta = jiggle(index);
            }

            let distance = delta.length();
            let correction = delta
                * ((distance - self.params.link_distance) / distance * alpha * link.strength);

            self.nodes[link.target].velocity -= correction * link.bias;
            self.nodes[link.source].velocity += correction * (1.0 - link.bias);
        }
    }

    fn apply_collisions(&mut self) {
        let max_radius = self.nodes.iter().map(|node| node.radius).fold(0.0, f32::max);
        if max_radius <= 0.0 {
            return;
        }

        self.scratch.radii.clear();
        self.scratch
            .radii
            .extend(self.nodes.iter().map(|node| node.radius));
        let params = CollisionParams {
            strength: 1.0,
            max_collision_distance_sq: (max_radius * 2.0) * (max_radius * 2.0),
        };

        for _ in 0..COLLIDE_ITERATIONS {
            self.scratch.positions.clear();
            self.scratch.positions.extend(
                self.nodes
                    .iter()
                    .map(|node| node.position + node.velocity),
            );
            let Some(tree) = QuadNode::build(&self.scratch.positions) else {
                return;
            };

            self.scratch.deltas.clear();
            self.scratch.deltas.resize(self.nodes.len(), Vec2::ZERO);
            accumulate_collision_pairs(
                &tree,
                &tree,
                true,
                &self.scratch.positions,
                &self.scratch.radii,
                params,
                &mut self.scratch.deltas,
            );

            for (node, delta) in self.nodes.iter_mut().zip(&self.scratch.deltas) {
                node.velocity += *delta;
            }
        }
    }

    fn apply_cluster(&mut self, alpha: f32) {
        for node in &mut self.nodes {
            node.velocity += (node.cluster_target - node.position) * CLUSTER_STRENGTH * alpha;
        }
    }

    fn apply_radial(&mut self, alpha: f32) {
        for node in &mut self.nodes {
            let distance = node.position.length().max(1e-6);
            let pull = (self.radial_radius - distance) * RADIAL_STRENGTH * alpha / distance;
            node.velocity += node.position * pull;
        }
    }
}

/// Spreads nodes around the origin deterministically by slug so a page keeps
/// roughly the same starting spot across rebuilds.
pub(in crate::app) fn initial_position(slug: &str, node_count: usize) -> Vec2 {
    let (x, y) = crate::util::stable_pair(slug);
    vec2(x, y) * (10.0 * (node_count.max(1) as f32).sqrt())
}
