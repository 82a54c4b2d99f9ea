use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Key};
use tracing::info;

use crate::config::GraphConfig;
use crate::content::{DocumentSource, SceneInputs, collect_scene_inputs};
use crate::settings::{SettingsStore, SourceSettings, VisitedSet};

mod interaction;
mod lifecycle;
mod physics;
mod render;
mod scene;
mod ui;
mod view;

use lifecycle::{CleanupRegistry, ViewSlot};
use render::Palette;
use scene::RetainedScene;
use view::{GraphView, SceneContext, ViewEvent};

pub struct AppOptions {
    pub source: DocumentSource,
    pub settings: SettingsStore,
    pub focal: String,
    pub local_config: GraphConfig,
    pub global_config: GraphConfig,
}

pub struct GraphApp {
    source: DocumentSource,
    settings: SettingsStore,
    focal: String,
    visited: VisitedSet,
    local_config: GraphConfig,
    global_config: GraphConfig,
    dark_mode: bool,
    cleanups: CleanupRegistry,
    local: ViewState,
    global: Option<ViewState>,
    /// Merged source settings of the last local build, edited by the filter
    /// panel.
    sources: Option<SourceSettings>,
    jump_query: String,
}

enum ViewState {
    Loading {
        rx: Receiver<SceneInputs>,
    },
    Ready {
        view: Box<GraphView<RetainedScene>>,
        inputs: Arc<SceneInputs>,
    },
    Error(String),
}

impl GraphApp {
    pub fn new(cc: &eframe::CreationContext<'_>, options: AppOptions) -> Self {
        let visited = VisitedSet::load(options.settings.storage().as_ref());
        let mut app = Self {
            local: ViewState::Loading {
                rx: Self::spawn_load(&options.source, &options.settings),
            },
            source: options.source,
            settings: options.settings,
            focal: options.focal,
            visited,
            local_config: options.local_config,
            global_config: options.global_config,
            dark_mode: cc.egui_ctx.style().visuals.dark_mode,
            cleanups: CleanupRegistry::default(),
            global: None,
            sources: None,
            jump_query: String::new(),
        };
        app.visited.record(app.settings.storage(), &app.focal);
        app
    }

    fn spawn_load(source: &DocumentSource, settings: &SettingsStore) -> Receiver<SceneInputs> {
        let (tx, rx) = mpsc::channel();
        let source = source.clone();
        let settings = settings.clone();

        thread::spawn(move || {
            let inputs = collect_scene_inputs(&source, &settings);
            let _ = tx.send(inputs);
        });

        rx
    }

    fn config_for(&self, slot: ViewSlot) -> &GraphConfig {
        match slot {
            ViewSlot::Local => &self.local_config,
            ViewSlot::Global => &self.global_config,
        }
    }

    fn state_mut(&mut self, slot: ViewSlot) -> Option<&mut ViewState> {
        match slot {
            ViewSlot::Local => Some(&mut self.local),
            ViewSlot::Global => self.global.as_mut(),
        }
    }

    /// Disposes whatever the slot shows and starts loading a fresh scene.
    fn rebuild(&mut self, slot: ViewSlot) {
        self.cleanups.dispose(slot);
        let state = ViewState::Loading {
            rx: Self::spawn_load(&self.source, &self.settings),
        };
        match slot {
            ViewSlot::Local => self.local = state,
            ViewSlot::Global => self.global = Some(state),
        }
    }

    fn mount(&mut self, slot: ViewSlot, inputs: SceneInputs) -> ViewState {
        self.cleanups.dispose(slot);
        let subscription = (slot == ViewSlot::Local).then(|| self.settings.subscribe());
        let context = SceneContext {
            inputs: &inputs,
            config: self.config_for(slot),
            focal: &self.focal,
            visited: &self.visited,
            palette: Palette::for_dark_mode(self.dark_mode),
        };
        let view = GraphView::build(&context, RetainedScene::default(), subscription);
        self.cleanups.register(slot, view.disposer());

        if slot == ViewSlot::Local {
            self.sources = Some(inputs.sources.clone());
        }
        ViewState::Ready {
            view: Box::new(view),
            inputs: Arc::new(inputs),
        }
    }

    /// Moves finished loads into place.
    fn poll_loads(&mut self) {
        for slot in [ViewSlot::Local, ViewSlot::Global] {
            let Some(ViewState::Loading { rx }) = self.state_mut(slot) else {
                continue;
            };
            let next = match rx.try_recv() {
                Ok(inputs) => self.mount(slot, inputs),
                Err(TryRecvError::Empty) => continue,
                Err(TryRecvError::Disconnected) => {
                    ViewState::Error("Background load worker disconnected".to_owned())
                }
            };
            if let Some(state) = self.state_mut(slot) {
                *state = next;
            }
        }
    }

    fn navigate(&mut self, slug: String) {
        info!("navigating to {slug} ({})", self.source.page_url(&slug));
        self.visited.record(self.settings.storage(), &slug);
        self.focal = slug;
        self.close_global();
        self.rebuild(ViewSlot::Local);
    }

    fn open_global(&mut self) {
        if self.global.is_none() {
            self.rebuild(ViewSlot::Global);
        }
    }

    fn close_global(&mut self) {
        if self.global.take().is_some() {
            self.cleanups.dispose(ViewSlot::Global);
        }
    }

    fn toggle_global(&mut self) {
        if self.global.is_some() {
            self.close_global();
        } else {
            self.open_global();
        }
    }

    fn handle_shortcuts(&mut self, ctx: &Context) {
        let (toggle, escape) = ctx.input(|input| {
            (
                input.modifiers.command && !input.modifiers.shift && input.key_pressed(Key::G),
                input.key_pressed(Key::Escape),
            )
        });
        if toggle {
            self.toggle_global();
        } else if escape {
            self.close_global();
        }
    }

    /// Theme switches recolour every mounted view; filter changes only
    /// affect the local one.
    fn handle_external_changes(&mut self, ctx: &Context) {
        let dark_mode = ctx.style().visuals.dark_mode;
        if dark_mode != self.dark_mode {
            info!("theme changed, dark_mode={dark_mode}");
            self.dark_mode = dark_mode;
            self.rebuild(ViewSlot::Local);
            if self.global.is_some() {
                self.rebuild(ViewSlot::Global);
            }
            return;
        }

        let filter_changed = matches!(
            &self.local,
            ViewState::Ready { view, .. } if view.filter_changed()
        );
        if filter_changed {
            info!("source filters changed, rebuilding local graph");
            self.rebuild(ViewSlot::Local);
        }
    }

    fn page_count(&self) -> Option<usize> {
        match &self.local {
            ViewState::Ready { inputs, .. } => Some(inputs.index.len()),
            _ => None,
        }
    }
}

impl eframe::App for GraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.poll_loads();
        self.handle_shortcuts(ctx);
        self.handle_external_changes(ctx);

        let mut events = Vec::new();
        self.draw_top_bar(ctx, &mut events);

        egui::SidePanel::left("sources")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| self.draw_side_panel(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(event) = draw_slot(ui, &mut self.local, "Loading content index...") {
                events.push(event);
            }
        });

        if let Some(event) = self.draw_global_overlay(ctx) {
            events.push(event);
        }

        if matches!(self.local, ViewState::Loading { .. })
            || matches!(self.global, Some(ViewState::Loading { .. }))
        {
            ctx.request_repaint();
        }

        for event in events {
            match event {
                ViewEvent::Navigate(slug) => self.navigate(slug),
            }
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.cleanups.dispose_all();
    }
}

fn draw_slot(ui: &mut egui::Ui, state: &mut ViewState, loading_text: &str) -> Option<ViewEvent> {
    match state {
        ViewState::Loading { .. } => {
            ui.vertical_centered(|ui| {
                ui.add_space(120.0);
                ui.heading(loading_text);
                ui.add_space(8.0);
                ui.spinner();
            });
            None
        }
        ViewState::Error(error) => {
            ui.heading("Failed to build the graph");
            ui.add_space(6.0);
            ui.label(error.as_str());
            None
        }
        ViewState::Ready { view, .. } => view.show(ui),
    }
}
