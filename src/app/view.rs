use std::cell::RefCell;
use std::rc::Rc;

use eframe::egui::{self, Align2, Button, CursorIcon, Pos2, Rect, Sense, Ui, Vec2, vec2};
use tracing::info;

use crate::config::GraphConfig;
use crate::content::{ContentRecord, SceneInputs};
use crate::graph::{CategoryClassifier, LinkDeriver, LinkOptions, select_neighborhood};
use crate::settings::{FilterSubscription, VisitedSet};
use crate::util::{TAG_SLUG_PREFIX, is_tag_slug};

use super::interaction::{Camera, PointerInput, PressTracker, hit_test};
use super::lifecycle::{Cleanup, StopFlag};
use super::physics::{ForceParams, NodeSeed, Simulation, SimulationPhase, initial_position};
use super::render::{
    FillInputs, NodeFill, Palette, VisualState, label_opacity, parse_color, tag_glyph_colors,
};
use super::scene::{EdgeHandle, NodeGlyph, NodeHandle, NodeTransform, RetainedScene, Scene};

const RESET_ALPHA: f32 = 0.3;
const LABEL_FONT_SCALE: f32 = 15.0;

/// Everything one scene construction reads, gathered up front so nothing is
/// looked up from shared state halfway through a build.
pub(in crate::app) struct SceneContext<'a> {
    pub inputs: &'a SceneInputs,
    pub config: &'a GraphConfig,
    pub focal: &'a str,
    pub visited: &'a VisitedSet,
    pub palette: Palette,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::app) enum ViewEvent {
    Navigate(String),
}

#[derive(Debug, Default, PartialEq)]
pub(in crate::app) struct FrameOutcome {
    pub event: Option<ViewEvent>,
    pub animating: bool,
}

struct ViewResources<S> {
    scene: S,
    subscription: Option<FilterSubscription>,
}

enum Gesture {
    Node { index: usize, grab_offset: Vec2 },
    Background,
}

/// One mounted graph: its simulation, visual state and the scene it draws
/// into. Built from a [`SceneContext`], torn down through [`Self::disposer`].
pub(in crate::app) struct GraphView<S: Scene> {
    resources: Rc<RefCell<ViewResources<S>>>,
    stop: StopFlag,
    slugs: Vec<String>,
    edges: Vec<(usize, usize)>,
    node_handles: Vec<NodeHandle>,
    edge_handles: Vec<EdgeHandle>,
    radii: Vec<f32>,
    simulation: Simulation,
    visual: VisualState,
    camera: Camera,
    press: PressTracker,
    gesture: Option<Gesture>,
    palette: Palette,
    drag_enabled: bool,
    opacity_scale: f32,
    label_font_size: f32,
    viewport: Option<Vec2>,
}

impl<S: Scene + 'static> GraphView<S> {
    pub(in crate::app) fn build(
        context: &SceneContext<'_>,
        mut scene: S,
        subscription: Option<FilterSubscription>,
    ) -> Self {
        let SceneContext {
            inputs,
            config,
            focal,
            visited,
            palette,
        } = context;

        let options = LinkOptions::from_config(config, &inputs.categories);
        let links = LinkDeriver::new(&inputs.index, &inputs.custom_links, &options)
            .with_sources(&inputs.sources)
            .derive();
        let neighborhood =
            select_neighborhood(&links, &inputs.index, focal, config.depth, config.show_tags);
        let classifier =
            CategoryClassifier::new(&inputs.categories, &inputs.index, &inputs.custom_links);

        let degree = neighborhood.degree();
        let node_count = neighborhood.len();
        let mut seeds = Vec::with_capacity(node_count);
        let mut radii = Vec::with_capacity(node_count);
        let mut node_handles = Vec::with_capacity(node_count);

        for (index, slug) in neighborhood.nodes.iter().enumerate() {
            let record = inputs.index.get(slug);
            let tags: &[String] = record.map_or(&[], |record| record.tags.as_slice());
            let classification = classifier.classify(slug, tags);
            let radius = 2.0 + (degree[index] as f32).sqrt();
            let is_tag = is_tag_slug(slug);

            let fill = NodeFill::pick(FillInputs {
                is_focal: slug == focal,
                category: classification.color,
                source: record.and_then(|record| source_color(record, inputs)),
                visited: visited.contains(slug),
                is_tag,
            });
            let (fill, stroke) = if is_tag {
                let (fill, stroke) = tag_glyph_colors(palette);
                (fill, Some(stroke))
            } else {
                (fill.color(palette), None)
            };

            node_handles.push(scene.add_node(NodeGlyph {
                shape: classification.shape,
                fill,
                stroke,
                label: node_label(slug, record),
                label_color: palette.dark,
            }));

            let (target_x, target_y) = classifier.cluster_target(classification.category);
            seeds.push(NodeSeed {
                position: initial_position(slug, node_count),
                radius,
                cluster_target: vec2(target_x, target_y),
            });
            radii.push(radius);
        }

        let edge_handles = neighborhood
            .edges
            .iter()
            .map(|_| scene.add_edge())
            .collect();
        let simulation = Simulation::new(seeds, &neighborhood.edges, force_params(config));

        info!(
            "graph view around {focal}: {} nodes, {} edges",
            node_count,
            neighborhood.edges.len()
        );

        Self {
            resources: Rc::new(RefCell::new(ViewResources {
                scene,
                subscription,
            })),
            stop: StopFlag::default(),
            visual: VisualState::new(
                node_count,
                neighborhood.edges.len(),
                config.scale,
                config.focus_on_hover,
            ),
            slugs: neighborhood.nodes,
            edges: neighborhood.edges,
            node_handles,
            edge_handles,
            radii,
            simulation,
            camera: Camera::new(config.zoom),
            press: PressTracker::default(),
            gesture: None,
            palette: *palette,
            drag_enabled: config.drag,
            opacity_scale: config.opacity_scale,
            label_font_size: config.font_size * LABEL_FONT_SCALE,
            viewport: None,
        }
    }

    pub(in crate::app) fn node_count(&self) -> usize {
        self.slugs.len()
    }

    pub(in crate::app) fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub(in crate::app) fn phase(&self) -> SimulationPhase {
        self.simulation.phase()
    }

    pub(in crate::app) fn alpha(&self) -> f32 {
        self.simulation.alpha()
    }

    pub(in crate::app) fn set_force_params(&mut self, config: &GraphConfig) {
        self.simulation.set_params(force_params(config));
        self.simulation.reheat(RESET_ALPHA);
    }

    /// True once per burst of filter-change notifications.
    pub(in crate::app) fn filter_changed(&self) -> bool {
        self.resources
            .borrow()
            .subscription
            .as_ref()
            .is_some_and(FilterSubscription::take_pending)
    }

    /// Stops the frame loop, empties the scene and drops the filter
    /// subscription.
    pub(in crate::app) fn disposer(&self) -> Cleanup {
        let resources = Rc::clone(&self.resources);
        let stop = self.stop.clone();
        Box::new(move || {
            stop.stop();
            let mut resources = resources.borrow_mut();
            resources.scene.dispose();
            resources.subscription = None;
        })
    }

    pub(in crate::app) fn reset(&mut self, now: f64) {
        self.camera.start_reset(now);
        self.simulation.reheat(RESET_ALPHA);
    }

    fn screen_positions(&self, rect: Rect) -> Vec<Pos2> {
        (0..self.slugs.len())
            .map(|index| {
                let world = self.simulation.position(index).unwrap_or_default();
                self.camera.world_to_screen(rect, world)
            })
            .collect()
    }

    fn screen_radii(&self) -> Vec<f32> {
        let zoom = self.camera.zoom();
        self.radii.iter().map(|radius| radius * zoom).collect()
    }

    fn is_dragging_node(&self) -> bool {
        matches!(self.gesture, Some(Gesture::Node { .. }))
    }

    /// Advances one frame: pointer handling against what was drawn last,
    /// one simulation tick, then fresh transforms pushed into the scene.
    pub(in crate::app) fn frame(&mut self, rect: Rect, input: &PointerInput) -> FrameOutcome {
        if self.stop.is_stopped() {
            return FrameOutcome::default();
        }
        let now = input.now;
        self.camera.update(now);
        if self.viewport != Some(rect.size()) {
            self.viewport = Some(rect.size());
            self.simulation.set_viewport(rect.size());
        }

        let centers = self.screen_positions(rect);
        let radii = self.screen_radii();
        let under_pointer = input
            .hover
            .and_then(|pointer| hit_test(pointer, &centers, &radii));

        if !self.is_dragging_node() {
            let zoom_opacity = label_opacity(self.camera.zoom(), self.opacity_scale);
            self.visual
                .set_hover(under_pointer, &self.edges, now, zoom_opacity);
        }

        let event = self.handle_pointer(rect, input, under_pointer);

        if let Some(factor) = input.zoom_factor() {
            let anchor = input.hover.unwrap_or_else(|| rect.center());
            self.camera.zoom_at(rect, anchor, factor);
        }

        let moving = self.simulation.tick();
        self.push_transforms(rect, now);

        FrameOutcome {
            event,
            animating: moving
                || self.gesture.is_some()
                || self.camera.is_animating()
                || self.visual.is_animating(now),
        }
    }

    fn handle_pointer(
        &mut self,
        rect: Rect,
        input: &PointerInput,
        under_pointer: Option<usize>,
    ) -> Option<ViewEvent> {
        let now = input.now;

        if input.pressed {
            self.gesture = Some(match under_pointer {
                Some(index) => {
                    self.press.press(index, now);
                    let world = self.simulation.position(index).unwrap_or_default();
                    let pointer = input.hover.map_or(world, |pointer| {
                        self.camera.screen_to_world(rect, pointer)
                    });
                    if self.drag_enabled {
                        self.simulation.set_alpha_target(1.0);
                        self.simulation.pin(index, world);
                    }
                    Gesture::Node {
                        index,
                        grab_offset: world - pointer,
                    }
                }
                None => Gesture::Background,
            });
        }

        if input.down && input.delta != Vec2::ZERO {
            match &self.gesture {
                Some(Gesture::Node { index, grab_offset }) => {
                    self.press.moved(input.delta);
                    if self.drag_enabled
                        && let Some(pointer) = input.hover
                    {
                        let target = self.camera.screen_to_world(rect, pointer) + *grab_offset;
                        self.simulation.pin(*index, target);
                    }
                }
                Some(Gesture::Background) => self.camera.pan_by(input.delta),
                None => {}
            }
        }

        if !input.released {
            return None;
        }
        let Some(Gesture::Node { index, .. }) = self.gesture.take() else {
            return None;
        };

        let clicked = if self.drag_enabled {
            self.simulation.set_alpha_target(0.0);
            self.simulation.unpin(index);
            self.press.release(now)
        } else {
            self.press.release(now);
            (under_pointer == Some(index)).then_some(index)
        };

        clicked
            .and_then(|index| self.slugs.get(index))
            .map(|slug| ViewEvent::Navigate(slug.clone()))
    }

    fn push_transforms(&self, rect: Rect, now: f64) {
        let centers = self.screen_positions(rect);
        let zoom = self.camera.zoom();
        let zoom_opacity = label_opacity(zoom, self.opacity_scale);

        let mut resources = self.resources.borrow_mut();
        for (index, handle) in self.node_handles.iter().enumerate() {
            let label = self.visual.label(index, now, zoom_opacity);
            resources.scene.set_node_transform(
                *handle,
                NodeTransform {
                    center: centers[index],
                    radius: self.radii[index] * zoom,
                    alpha: self.visual.node_alpha(index, now),
                    label_alpha: label.alpha,
                    label_size: self.label_font_size * label.scale * zoom,
                },
            );
        }
        for (edge_index, (handle, &(source, target))) in
            self.edge_handles.iter().zip(&self.edges).enumerate()
        {
            let style = self.visual.edge_style(edge_index, now, &self.palette);
            resources
                .scene
                .set_edge_geometry(*handle, centers[source], centers[target], style);
        }
    }
}

impl GraphView<RetainedScene> {
    /// Lays the view out in the remaining space of `ui`, drives one frame and
    /// paints it. Returns a navigation request when a node was clicked.
    pub(in crate::app) fn show(&mut self, ui: &mut Ui) -> Option<ViewEvent> {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let input = PointerInput::from_ui(ui, &response);
        let outcome = self.frame(rect, &input);

        if self.visual.hovered().is_some() {
            ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
        }

        let painter = ui.painter_at(rect);
        self.resources.borrow().scene.paint(&painter);

        let reset_rect = Rect::from_min_size(rect.right_top() + vec2(-36.0, 8.0), vec2(28.0, 28.0));
        if ui
            .put(reset_rect, Button::new("⟲"))
            .on_hover_text("Reset zoom")
            .clicked()
        {
            self.reset(input.now);
        }
        if self.simulation.len() == 0 {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No pages to show",
                egui::FontId::proportional(14.0),
                ui.visuals().weak_text_color(),
            );
        }

        if outcome.animating {
            ui.ctx().request_repaint();
        }
        outcome.event
    }
}

fn force_params(config: &GraphConfig) -> ForceParams {
    ForceParams {
        repel_force: config.repel_force,
        center_force: config.center_force,
        link_distance: config.link_distance,
        radial: config.enable_radial,
    }
}

fn node_label(slug: &str, record: Option<&ContentRecord>) -> String {
    if let Some(tag) = slug.strip_prefix(TAG_SLUG_PREFIX) {
        return format!("#{tag}");
    }
    record.map_or_else(|| slug.to_owned(), |record| record.label().to_owned())
}

fn source_color(record: &ContentRecord, inputs: &SceneInputs) -> Option<egui::Color32> {
    let source = record.source.as_ref()?;
    let instance = source.instance_id()?;
    inputs
        .sources
        .color_for(source.kind, instance)
        .and_then(parse_color)
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use crate::content::{ContentIndex, record};

    use super::super::scene::RecordingScene;
    use super::*;

    fn inputs() -> SceneInputs {
        SceneInputs {
            index: ContentIndex::from_records([
                record("index", &[], &["notes/a", "notes/b"]),
                record("notes/a", &[], &["notes/c"]),
                record("notes/b", &[], &[]),
                record("notes/c", &[], &[]),
            ]),
            ..SceneInputs::default()
        }
    }

    fn viewport() -> Rect {
        Rect::from_min_size(Pos2::ZERO, vec2(400.0, 300.0))
    }

    fn build(inputs: &SceneInputs, config: &GraphConfig) -> GraphView<RecordingScene> {
        let visited = VisitedSet::default();
        let context = SceneContext {
            inputs,
            config,
            focal: "index",
            visited: &visited,
            palette: Palette::for_dark_mode(false),
        };
        GraphView::build(&context, RecordingScene::default(), None)
    }

    fn idle(now: f64) -> PointerInput {
        PointerInput {
            now,
            ..PointerInput::default()
        }
    }

    fn node_on_screen(view: &GraphView<RecordingScene>, slug: &str) -> (usize, Pos2) {
        let index = view
            .slugs
            .iter()
            .position(|candidate| candidate == slug)
            .unwrap();
        (index, view.screen_positions(viewport())[index])
    }

    /// Presses on `slug`, releases `hold` seconds later without moving.
    fn click(view: &mut GraphView<RecordingScene>, slug: &str, hold: f64) -> FrameOutcome {
        view.frame(viewport(), &idle(0.0));
        let (_, at) = node_on_screen(view, slug);
        view.frame(
            viewport(),
            &PointerInput {
                hover: Some(at),
                pressed: true,
                down: true,
                now: 0.016,
                ..PointerInput::default()
            },
        );
        let (_, at) = node_on_screen(view, slug);
        view.frame(
            viewport(),
            &PointerInput {
                hover: Some(at),
                released: true,
                now: 0.016 + hold,
                ..PointerInput::default()
            },
        )
    }

    #[test]
    fn build_selects_neighborhood_and_fills_the_scene() {
        let inputs = inputs();
        let view = build(&inputs, &GraphConfig::local());
        assert_eq!(view.node_count(), 3);
        assert_eq!(view.edge_count(), 2);

        let scene = view.resources.borrow();
        assert_eq!(scene.scene.nodes.len(), 3);
        assert_eq!(scene.scene.edges.len(), 2);
        let palette = Palette::for_dark_mode(false);
        let focal = scene
            .scene
            .nodes
            .iter()
            .find(|glyph| glyph.label == "index")
            .unwrap();
        assert_eq!(focal.fill, palette.secondary);
    }

    #[test]
    fn frame_pushes_transforms_for_every_node_and_edge() {
        let inputs = inputs();
        let mut view = build(&inputs, &GraphConfig::global());
        let outcome = view.frame(viewport(), &idle(0.0));
        assert!(outcome.animating);
        assert_eq!(outcome.event, None);

        let resources = view.resources.borrow();
        assert!(resources.scene.node_transforms.iter().all(Option::is_some));
        assert!(resources.scene.edges.iter().all(Option::is_some));
        assert_eq!(resources.scene.node_transforms.len(), 4);
    }

    #[test]
    fn quick_click_navigates_and_long_hold_does_not() {
        let inputs = inputs();
        let mut view = build(&inputs, &GraphConfig::local());
        let outcome = click(&mut view, "notes/a", 0.3);
        assert_eq!(outcome.event, Some(ViewEvent::Navigate("notes/a".to_owned())));

        let mut view = build(&inputs, &GraphConfig::local());
        let outcome = click(&mut view, "notes/a", 0.6);
        assert_eq!(outcome.event, None);
    }

    #[test]
    fn click_navigates_when_drag_is_disabled() {
        let inputs = inputs();
        let config = GraphConfig {
            drag: false,
            ..GraphConfig::local()
        };
        let mut view = build(&inputs, &config);
        let outcome = click(&mut view, "notes/b", 0.1);
        assert_eq!(outcome.event, Some(ViewEvent::Navigate("notes/b".to_owned())));
    }

    #[test]
    fn dragging_moves_the_pinned_node_with_the_pointer() {
        let inputs = inputs();
        let mut view = build(&inputs, &GraphConfig::local());
        view.frame(viewport(), &idle(0.0));
        let (index, at) = node_on_screen(&view, "notes/b");
        view.frame(
            viewport(),
            &PointerInput {
                hover: Some(at),
                pressed: true,
                down: true,
                now: 0.02,
                ..PointerInput::default()
            },
        );
        let target = at + vec2(60.0, 0.0);
        view.frame(
            viewport(),
            &PointerInput {
                hover: Some(target),
                down: true,
                delta: vec2(60.0, 0.0),
                now: 0.04,
                ..PointerInput::default()
            },
        );
        let (_, moved_to) = node_on_screen(&view, "notes/b");
        assert!(moved_to.distance(target) < 1.0);
        assert_eq!(view.phase(), SimulationPhase::Reheated);

        let outcome = view.frame(
            viewport(),
            &PointerInput {
                hover: Some(target),
                released: true,
                now: 0.1,
                ..PointerInput::default()
            },
        );
        assert_eq!(outcome.event, None);
        assert!(view.simulation.position(index).is_some());
    }

    #[test]
    fn background_drag_pans_and_reset_returns_to_identity() {
        let inputs = inputs();
        let mut view = build(&inputs, &GraphConfig::local());
        let empty_corner = pos2(2.0, 2.0);
        view.frame(
            viewport(),
            &PointerInput {
                hover: Some(empty_corner),
                pressed: true,
                down: true,
                now: 0.0,
                ..PointerInput::default()
            },
        );
        view.frame(
            viewport(),
            &PointerInput {
                hover: Some(empty_corner + vec2(10.0, 5.0)),
                down: true,
                delta: vec2(10.0, 5.0),
                now: 0.02,
                ..PointerInput::default()
            },
        );
        assert_eq!(view.camera.pan(), vec2(10.0, 5.0));

        view.reset(1.0);
        view.frame(viewport(), &idle(1.6));
        assert_eq!(view.camera.pan(), Vec2::ZERO);
        assert_eq!(view.camera.zoom(), 1.0);
    }

    #[test]
    fn disposed_view_is_inert() {
        let inputs = inputs();
        let mut view = build(&inputs, &GraphConfig::local());
        let dispose = view.disposer();
        dispose();

        assert!(view.stop.is_stopped());
        assert_eq!(view.resources.borrow().scene.disposed, 1);
        assert!(view.resources.borrow().scene.nodes.is_empty());
        assert_eq!(view.frame(viewport(), &idle(0.0)), FrameOutcome::default());
    }
}
