use std::collections::HashSet;

use eframe::egui::{Color32, Stroke};

use crate::config::Hsl;

use super::super::scene::EdgeStyle;
use super::palette::{Palette, hsl_color};
use super::tween::Tween;

const HOVER_FADE_SECS: f64 = 0.2;
const LABEL_FADE_SECS: f64 = 0.1;
const DIMMED_ALPHA: f32 = 0.2;
const ACTIVE_EDGE_WIDTH: f32 = 2.0;
const EDGE_WIDTH: f32 = 1.5;
const HOVERED_LABEL_SCALE: f32 = 1.1;
const TAG_STROKE_WIDTH: f32 = 2.0;

/// Labels stay hidden until the zoom (times `opacity_scale`) passes 1, then
/// fade in.
pub(in crate::app) fn label_opacity(zoom: f32, opacity_scale: f32) -> f32 {
    ((zoom * opacity_scale - 1.0) / 3.75).clamp(0.0, 1.0)
}

/// Where a node's fill comes from, highest priority first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum NodeFill {
    Focal,
    Category(Hsl),
    Source(Color32),
    Visited,
    Tag,
    Plain,
}

pub(in crate::app) struct FillInputs {
    pub is_focal: bool,
    pub category: Option<Hsl>,
    pub source: Option<Color32>,
    pub visited: bool,
    pub is_tag: bool,
}

impl NodeFill {
    pub(in crate::app) fn pick(inputs: FillInputs) -> Self {
        if inputs.is_focal {
            Self::Focal
        } else if let Some(color) = inputs.category {
            Self::Category(color)
        } else if let Some(color) = inputs.source {
            Self::Source(color)
        } else if inputs.visited {
            Self::Visited
        } else if inputs.is_tag {
            Self::Tag
        } else {
            Self::Plain
        }
    }

    pub(in crate::app) fn color(self, palette: &Palette) -> Color32 {
        match self {
            Self::Focal => palette.secondary,
            Self::Category(hsl) => hsl_color(hsl),
            Self::Source(color) => color,
            Self::Visited | Self::Tag => palette.tertiary,
            Self::Plain => palette.gray,
        }
    }
}

/// Tag nodes are hollow: filled with the background and ringed.
pub(in crate::app) fn tag_glyph_colors(palette: &Palette) -> (Color32, Stroke) {
    (palette.light, Stroke::new(TAG_STROKE_WIDTH, palette.tertiary))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct LabelState {
    pub alpha: f32,
    pub scale: f32,
}

/// Per-node and per-edge hover highlighting with its fade animations.
pub(in crate::app) struct VisualState {
    hovered: Option<usize>,
    active_nodes: HashSet<usize>,
    active_edges: Vec<bool>,
    node_alpha: Vec<Tween>,
    edge_alpha: Vec<Tween>,
    label_alpha: Vec<Tween>,
    label_scale: Vec<Tween>,
    base_label_scale: f32,
    focus_on_hover: bool,
}

impl VisualState {
    pub(in crate::app) fn new(
        node_count: usize,
        edge_count: usize,
        scale: f32,
        focus_on_hover: bool,
    ) -> Self {
        let base_label_scale = 1.0 / scale;
        Self {
            hovered: None,
            active_nodes: HashSet::new(),
            active_edges: vec![false; edge_count],
            node_alpha: vec![Tween::settled(1.0); node_count],
            edge_alpha: vec![Tween::settled(1.0); edge_count],
            label_alpha: vec![Tween::settled(0.0); node_count],
            label_scale: vec![Tween::settled(base_label_scale); node_count],
            base_label_scale,
            focus_on_hover,
        }
    }

    pub(in crate::app) fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Recomputes which nodes and edges touch `hovered` and starts the fades.
    /// `zoom_opacity` is the label alpha a node falls back to once unhovered.
    pub(in crate::app) fn set_hover(
        &mut self,
        hovered: Option<usize>,
        edges: &[(usize, usize)],
        now: f64,
        zoom_opacity: f32,
    ) {
        if hovered == self.hovered {
            return;
        }
        let previous = self.hovered;
        self.hovered = hovered;

        self.active_nodes.clear();
        for (index, &(source, target)) in edges.iter().enumerate() {
            let active = hovered.is_some_and(|node| node == source || node == target);
            self.active_edges[index] = active;
            if active {
                self.active_nodes.insert(source);
                self.active_nodes.insert(target);
            }
        }
        if let Some(node) = hovered {
            self.active_nodes.insert(node);
        }

        for (index, tween) in self.edge_alpha.iter_mut().enumerate() {
            let alpha = match hovered {
                Some(_) if !self.active_edges[index] => DIMMED_ALPHA,
                _ => 1.0,
            };
            tween.retarget(alpha, now, HOVER_FADE_SECS);
        }

        for (index, tween) in self.node_alpha.iter_mut().enumerate() {
            let alpha = match hovered {
                Some(_) if self.focus_on_hover && !self.active_nodes.contains(&index) => {
                    DIMMED_ALPHA
                }
                _ => 1.0,
            };
            tween.retarget(alpha, now, HOVER_FADE_SECS);
        }

        if let Some(node) = previous
            && let Some(alpha) = self.label_alpha.get_mut(node)
        {
            alpha.snap(zoom_opacity);
        }
        for (index, scale) in self.label_scale.iter_mut().enumerate() {
            let target = if hovered == Some(index) {
                self.base_label_scale * HOVERED_LABEL_SCALE
            } else {
                self.base_label_scale
            };
            scale.retarget(target, now, LABEL_FADE_SECS);
        }
        if let Some(node) = hovered
            && let Some(alpha) = self.label_alpha.get_mut(node)
        {
            alpha.snap(zoom_opacity);
            alpha.retarget(1.0, now, LABEL_FADE_SECS);
        }
    }

    pub(in crate::app) fn node_alpha(&self, node: usize, now: f64) -> f32 {
        self.node_alpha.get(node).map_or(1.0, |tween| tween.value(now))
    }

    pub(in crate::app) fn edge_style(&self, edge: usize, now: f64, palette: &Palette) -> EdgeStyle {
        let active = self.active_edges.get(edge).copied().unwrap_or(false);
        let alpha = self.edge_alpha.get(edge).map_or(1.0, |tween| tween.value(now));
        let (width, color) = if active {
            (ACTIVE_EDGE_WIDTH, palette.secondary)
        } else {
            (EDGE_WIDTH, palette.gray)
        };
        EdgeStyle {
            width,
            color: color.gamma_multiply(alpha),
        }
    }

    /// The hovered label animates on its own; every other label tracks the
    /// zoom-derived opacity directly.
    pub(in crate::app) fn label(&self, node: usize, now: f64, zoom_opacity: f32) -> LabelState {
        let alpha = if self.hovered == Some(node) {
            self.label_alpha.get(node).map_or(1.0, |tween| tween.value(now))
        } else {
            zoom_opacity
        };
        let scale = self
            .label_scale
            .get(node)
            .map_or(self.base_label_scale, |tween| tween.value(now));
        LabelState { alpha, scale }
    }

    pub(in crate::app) fn is_animating(&self, now: f64) -> bool {
        self.node_alpha
            .iter()
            .chain(&self.edge_alpha)
            .chain(&self.label_alpha)
            .chain(&self.label_scale)
            .any(|tween| tween.is_animating(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EDGES: [(usize, usize); 3] = [(0, 1), (1, 2), (2, 3)];

    #[test]
    fn label_opacity_fades_in_past_unit_zoom() {
        assert_eq!(label_opacity(1.0, 1.0), 0.0);
        assert_eq!(label_opacity(0.5, 1.0), 0.0);
        assert!((label_opacity(1.8, 1.0) - 0.8 / 3.75).abs() < 1e-6);
        assert_eq!(label_opacity(4.0, 3.0), 1.0);
    }

    #[test]
    fn fill_priority_prefers_focal_then_category_then_source() {
        let hsl = Hsl { h: 0.0, s: 70.0, l: 55.0 };
        let inputs = |is_focal, category, source, visited, is_tag| FillInputs {
            is_focal,
            category,
            source,
            visited,
            is_tag,
        };

        assert_eq!(
            NodeFill::pick(inputs(true, Some(hsl), None, true, false)),
            NodeFill::Focal
        );
        assert_eq!(
            NodeFill::pick(inputs(false, Some(hsl), Some(Color32::RED), true, false)),
            NodeFill::Category(hsl)
        );
        assert_eq!(
            NodeFill::pick(inputs(false, None, Some(Color32::RED), true, false)),
            NodeFill::Source(Color32::RED)
        );
        assert_eq!(NodeFill::pick(inputs(false, None, None, true, false)), NodeFill::Visited);
        assert_eq!(NodeFill::pick(inputs(false, None, None, false, true)), NodeFill::Tag);
        assert_eq!(NodeFill::pick(inputs(false, None, None, false, false)), NodeFill::Plain);

        let palette = Palette::for_dark_mode(false);
        assert_eq!(NodeFill::Plain.color(&palette), palette.gray);
        assert_eq!(NodeFill::Visited.color(&palette), palette.tertiary);
    }

    #[test]
    fn hover_highlights_incident_edges_and_dims_the_rest() {
        let palette = Palette::for_dark_mode(true);
        let mut visual = VisualState::new(4, EDGES.len(), 1.0, true);
        visual.set_hover(Some(1), &EDGES, 0.0, 0.0);

        assert!(visual.is_animating(0.1));

        let active = visual.edge_style(0, 1.0, &palette);
        assert_eq!(active.width, 2.0);
        assert_eq!(active.color, palette.secondary);
        let dimmed = visual.edge_style(2, 1.0, &palette);
        assert_eq!(dimmed.width, 1.5);
        assert_eq!(dimmed.color, palette.gray.gamma_multiply(0.2));

        assert_eq!(visual.node_alpha(3, 1.0), 0.2);
        assert_eq!(visual.node_alpha(2, 1.0), 1.0);
        assert!(!visual.is_animating(1.0));
    }

    #[test]
    fn nodes_keep_full_alpha_without_focus_on_hover() {
        let mut visual = VisualState::new(4, EDGES.len(), 1.0, false);
        visual.set_hover(Some(0), &EDGES, 0.0, 0.0);
        assert_eq!(visual.node_alpha(3, 1.0), 1.0);
    }

    #[test]
    fn hovered_label_fades_in_and_grows() {
        let mut visual = VisualState::new(4, EDGES.len(), 2.0, false);
        visual.set_hover(Some(2), &EDGES, 0.0, 0.1);

        let label = visual.label(2, 1.0, 0.1);
        assert_eq!(label.alpha, 1.0);
        assert!((label.scale - 0.55).abs() < 1e-6);

        let other = visual.label(3, 1.0, 0.1);
        assert_eq!(other.alpha, 0.1);
        assert_eq!(other.scale, 0.5);

        visual.set_hover(None, &EDGES, 2.0, 0.3);
        assert_eq!(visual.label(2, 2.0, 0.3).alpha, 0.3);
        assert_eq!(visual.edge_style(2, 3.0, &Palette::for_dark_mode(true)).width, 1.5);
        assert_eq!(visual.node_alpha(3, 3.0), 1.0);
    }
}
