use std::f32::consts::{FRAC_PI_2, PI};

use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, vec2};

use crate::config::NodeShape;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) struct NodeHandle(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) struct EdgeHandle(usize);

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct NodeGlyph {
    pub shape: NodeShape,
    pub fill: Color32,
    pub stroke: Option<Stroke>,
    pub label: String,
    pub label_color: Color32,
}

/// Screen-space placement of a node for the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct NodeTransform {
    pub center: Pos2,
    pub radius: f32,
    pub alpha: f32,
    pub label_alpha: f32,
    pub label_size: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct EdgeStyle {
    pub width: f32,
    pub color: Color32,
}

/// Drawing backend seen by the graph view. Handles stay valid until
/// `dispose`, after which the scene holds nothing.
pub(in crate::app) trait Scene {
    fn add_node(&mut self, glyph: NodeGlyph) -> NodeHandle;
    fn add_edge(&mut self) -> EdgeHandle;
    fn set_node_transform(&mut self, node: NodeHandle, transform: NodeTransform);
    fn set_edge_geometry(&mut self, edge: EdgeHandle, from: Pos2, to: Pos2, style: EdgeStyle);
    fn dispose(&mut self);
}

struct RetainedNode {
    glyph: NodeGlyph,
    transform: Option<NodeTransform>,
}

/// Keeps the latest state of every glyph and paints it through egui.
#[derive(Default)]
pub(in crate::app) struct RetainedScene {
    nodes: Vec<RetainedNode>,
    edges: Vec<Option<(Pos2, Pos2, EdgeStyle)>>,
}

impl Scene for RetainedScene {
    fn add_node(&mut self, glyph: NodeGlyph) -> NodeHandle {
        self.nodes.push(RetainedNode {
            glyph,
            transform: None,
        });
        NodeHandle(self.nodes.len() - 1)
    }

    fn add_edge(&mut self) -> EdgeHandle {
        self.edges.push(None);
        EdgeHandle(self.edges.len() - 1)
    }

    fn set_node_transform(&mut self, node: NodeHandle, transform: NodeTransform) {
        if let Some(entry) = self.nodes.get_mut(node.0) {
            entry.transform = Some(transform);
        }
    }

    fn set_edge_geometry(&mut self, edge: EdgeHandle, from: Pos2, to: Pos2, style: EdgeStyle) {
        if let Some(entry) = self.edges.get_mut(edge.0) {
            *entry = Some((from, to, style));
        }
    }

    fn dispose(&mut self) {
        self.nodes = Vec::new();
        self.edges = Vec::new();
    }
}

impl RetainedScene {
    /// Edges first, then glyphs, then labels on top.
    pub(in crate::app) fn paint(&self, painter: &Painter) {
        for (from, to, style) in self.edges.iter().flatten() {
            painter.line_segment([*from, *to], Stroke::new(style.width, style.color));
        }

        for node in &self.nodes {
            if let Some(transform) = node.transform {
                draw_glyph(painter, &node.glyph, transform);
            }
        }

        for node in &self.nodes {
            let Some(transform) = node.transform else {
                continue;
            };
            if transform.label_alpha <= 0.01 || transform.label_size < 1.0 {
                continue;
            }
            painter.text(
                transform.center - vec2(0.0, transform.radius + 2.0),
                Align2::CENTER_BOTTOM,
                &node.glyph.label,
                FontId::proportional(transform.label_size),
                node.glyph.label_color.gamma_multiply(transform.label_alpha),
            );
        }
    }
}

fn draw_glyph(painter: &Painter, glyph: &NodeGlyph, transform: NodeTransform) {
    let fill = glyph.fill.gamma_multiply(transform.alpha);
    let stroke = glyph.stroke.map_or(Stroke::NONE, |stroke| Stroke {
        width: stroke.width,
        color: stroke.color.gamma_multiply(transform.alpha),
    });
    let center = transform.center;
    let radius = transform.radius;

    match glyph.shape {
        NodeShape::Circle => {
            painter.circle(center, radius, fill, stroke);
        }
        NodeShape::Square => {
            let rect = Rect::from_center_size(center, vec2(radius * 2.0, radius * 2.0));
            painter.add(Shape::convex_polygon(
                vec![rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom()],
                fill,
                stroke,
            ));
        }
        NodeShape::Diamond => {
            let reach = radius * 1.2;
            painter.add(Shape::convex_polygon(
                vec![
                    center + vec2(0.0, -reach),
                    center + vec2(reach, 0.0),
                    center + vec2(0.0, reach),
                    center + vec2(-reach, 0.0),
                ],
                fill,
                stroke,
            ));
        }
        NodeShape::Hexagon => {
            painter.add(Shape::convex_polygon(
                regular_polygon(center, radius * 1.1, 6),
                fill,
                stroke,
            ));
        }
        NodeShape::Star => draw_star(painter, center, radius, fill, stroke),
        NodeShape::Home => {
            painter.extend(home_shapes(center, radius, fill, stroke));
        }
    }
}

/// Body first so the roof outline sits on top of it.
fn home_shapes(center: Pos2, radius: f32, fill: Color32, stroke: Stroke) -> [Shape; 2] {
    let reach = radius * 1.3;
    let body = Rect::from_min_size(
        center + vec2(-reach * 0.7, -reach * 0.2),
        vec2(reach * 1.4, reach * 1.1),
    );
    [
        Shape::convex_polygon(
            vec![body.left_top(), body.right_top(), body.right_bottom(), body.left_bottom()],
            fill,
            stroke,
        ),
        Shape::convex_polygon(
            vec![
                center + vec2(0.0, -reach),
                center + vec2(reach, -reach * 0.2),
                center + vec2(-reach, -reach * 0.2),
            ],
            fill,
            stroke,
        ),
    ]
}

fn regular_polygon(center: Pos2, radius: f32, sides: usize) -> Vec<Pos2> {
    (0..sides)
        .map(|side| {
            let angle = (2.0 * PI / sides as f32) * side as f32 - FRAC_PI_2;
            center + vec2(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

/// A five-pointed star is concave, so it is painted as an inner pentagon plus
/// one triangle per tip.
fn draw_star(painter: &Painter, center: Pos2, radius: f32, fill: Color32, stroke: Stroke) {
    let outline = (0..10)
        .map(|point| {
            let angle = (PI / 5.0) * point as f32 - FRAC_PI_2;
            let reach = if point % 2 == 0 { radius * 1.2 } else { radius * 0.5 };
            center + vec2(angle.cos(), angle.sin()) * reach
        })
        .collect::<Vec<_>>();

    let inner = outline.iter().skip(1).step_by(2).copied().collect::<Vec<_>>();
    painter.add(Shape::convex_polygon(inner, fill, Stroke::NONE));

    for tip in (0..10).step_by(2) {
        let left = outline[(tip + 9) % 10];
        let right = outline[tip + 1];
        painter.add(Shape::convex_polygon(
            vec![outline[tip], right, left],
            fill,
            Stroke::NONE,
        ));
    }

    if stroke != Stroke::NONE {
        painter.add(Shape::closed_line(outline, stroke));
    }
}

/// Glyph hit area, a little larger than the drawn radius.
pub(in crate::app) fn hit_radius(radius: f32) -> f32 {
    radius * 1.2
}

#[cfg(test)]
#[derive(Default)]
pub(in crate::app) struct RecordingScene {
    pub nodes: Vec<NodeGlyph>,
    pub node_transforms: Vec<Option<NodeTransform>>,
    pub edges: Vec<Option<(Pos2, Pos2, EdgeStyle)>>,
    pub disposed: usize,
}

#[cfg(test)]
impl Scene for RecordingScene {
    fn add_node(&mut self, glyph: NodeGlyph) -> NodeHandle {
        self.nodes.push(glyph);
        self.node_transforms.push(None);
        NodeHandle(self.nodes.len() - 1)
    }

    fn add_edge(&mut self) -> EdgeHandle {
        self.edges.push(None);
        EdgeHandle(self.edges.len() - 1)
    }

    fn set_node_transform(&mut self, node: NodeHandle, transform: NodeTransform) {
        self.node_transforms[node.0] = Some(transform);
    }

    fn set_edge_geometry(&mut self, edge: EdgeHandle, from: Pos2, to: Pos2, style: EdgeStyle) {
        self.edges[edge.0] = Some((from, to, style));
    }

    fn dispose(&mut self) {
        self.nodes.clear();
        self.node_transforms.clear();
        self.edges.clear();
        self.disposed += 1;
    }
}
