use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use super::scene::hit_radius;

pub(in crate::app) const INITIAL_ZOOM: f32 = 1.8;
const MIN_ZOOM: f32 = 0.25;
const MAX_ZOOM: f32 = 4.0;
const RESET_SECS: f64 = 0.5;
const CLICK_WINDOW_SECS: f64 = 0.5;
const CLICK_SLOP: f32 = 2.0;

struct CameraAnimation {
    from_pan: Vec2,
    from_zoom: f32,
    start: f64,
}

/// Pan and zoom of a graph view. World coordinates map to screen
/// coordinates as `rect.center() + pan + world * zoom`.
pub(in crate::app) struct Camera {
    pan: Vec2,
    zoom: f32,
    zoom_enabled: bool,
    animation: Option<CameraAnimation>,
}

impl Camera {
    pub(in crate::app) fn new(zoom_enabled: bool) -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: if zoom_enabled { INITIAL_ZOOM } else { 1.0 },
            zoom_enabled,
            animation: None,
        }
    }

    pub(in crate::app) fn zoom(&self) -> f32 {
        self.zoom
    }

    #[cfg(test)]
    pub(in crate::app) fn pan(&self) -> Vec2 {
        self.pan
    }

    pub(in crate::app) fn world_to_screen(&self, rect: Rect, world: Vec2) -> Pos2 {
        rect.center() + self.pan + world * self.zoom
    }

    pub(in crate::app) fn screen_to_world(&self, rect: Rect, screen: Pos2) -> Vec2 {
        (screen - rect.center() - self.pan) / self.zoom
    }

    /// Scales by `factor` keeping the world point under `anchor` fixed.
    pub(in crate::app) fn zoom_at(&mut self, rect: Rect, anchor: Pos2, factor: f32) {
        if !self.zoom_enabled || factor <= 0.0 {
            return;
        }
        self.animation = None;
        let world_before = self.screen_to_world(rect, anchor);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = anchor - rect.center() - world_before * self.zoom;
    }

    pub(in crate::app) fn pan_by(&mut self, delta: Vec2) {
        if !self.zoom_enabled {
            return;
        }
        self.animation = None;
        self.pan += delta;
    }

    /// Eases back to the identity transform.
    pub(in crate::app) fn start_reset(&mut self, now: f64) {
        self.animation = Some(CameraAnimation {
            from_pan: self.pan,
            from_zoom: self.zoom,
            start: now,
        });
    }

    pub(in crate::app) fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub(in crate::app) fn update(&mut self, now: f64) {
        let Some(animation) = &self.animation else {
            return;
        };
        let progress = ((now - animation.start) / RESET_SECS).clamp(0.0, 1.0) as f32;
        let eased = ease_cubic_in_out(progress);
        self.pan = animation.from_pan * (1.0 - eased);
        self.zoom = animation.from_zoom + (1.0 - animation.from_zoom) * eased;
        if progress >= 1.0 {
            self.pan = Vec2::ZERO;
            self.zoom = 1.0;
            self.animation = None;
        }
    }
}

fn ease_cubic_in_out(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// The pointer facts one frame of a graph view reacts to.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(in crate::app) struct PointerInput {
    pub hover: Option<Pos2>,
    pub pressed: bool,
    pub down: bool,
    pub released: bool,
    pub delta: Vec2,
    pub scroll: f32,
    pub now: f64,
}

impl PointerInput {
    pub(in crate::app) fn from_ui(ui: &Ui, response: &egui::Response) -> Self {
        let hovering = response.hovered() || response.dragged();
        ui.input(|input| Self {
            hover: if hovering { input.pointer.hover_pos() } else { None },
            pressed: hovering && input.pointer.primary_pressed(),
            down: input.pointer.primary_down(),
            released: input.pointer.primary_released(),
            delta: input.pointer.delta(),
            scroll: if response.hovered() {
                input.raw_scroll_delta.y
            } else {
                0.0
            },
            now: input.time,
        })
    }

    /// Multiplicative zoom step for this frame's wheel movement.
    pub(in crate::app) fn zoom_factor(&self) -> Option<f32> {
        if self.scroll.abs() <= f32::EPSILON {
            return None;
        }
        Some((1.0 + self.scroll * 0.0018).clamp(0.85, 1.15))
    }
}

/// Tells a quick click on a node apart from a drag of it.
#[derive(Default)]
pub(in crate::app) struct PressTracker {
    press: Option<(usize, f64, f32)>,
}

impl PressTracker {
    pub(in crate::app) fn press(&mut self, node: usize, now: f64) {
        self.press = Some((node, now, 0.0));
    }

    pub(in crate::app) fn moved(&mut self, delta: Vec2) {
        if let Some((_, _, travelled)) = &mut self.press {
            *travelled += delta.length();
        }
    }

    /// Ends the press and returns the node when it counts as a click.
    pub(in crate::app) fn release(&mut self, now: f64) -> Option<usize> {
        let (node, start, travelled) = self.press.take()?;
        (now - start < CLICK_WINDOW_SECS && travelled <= CLICK_SLOP).then_some(node)
    }
}

/// The node whose hit area contains `pointer`, nearest centre first.
pub(in crate::app) fn hit_test(
    pointer: Pos2,
    centers: &[Pos2],
    radii: &[f32],
) -> Option<usize> {
    centers
        .iter()
        .zip(radii)
        .enumerate()
        .filter_map(|(index, (center, radius))| {
            let distance = center.distance(pointer);
            (distance <= hit_radius(*radius)).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}
