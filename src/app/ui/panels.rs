use eframe::egui::{self, Align, Context, Layout, Ui};

use super::super::view::ViewEvent;
use super::super::{GraphApp, ViewState, draw_slot};
use super::jump::{MAX_JUMP_RESULTS, page_matches};

impl GraphApp {
    pub(in crate::app) fn draw_top_bar(&mut self, ctx: &Context, events: &mut Vec<ViewEvent>) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("skillgraph");
                    ui.separator();
                    ui.label(format!("page: {}", self.focal));
                    if let Some(pages) = self.page_count() {
                        ui.label(format!("pages: {pages}"));
                    }
                    if let ViewState::Ready { view, .. } = &self.local {
                        ui.label(format!("nodes: {}", view.node_count()));
                        ui.label(format!("edges: {}", view.edge_count()));
                    }

                    let global_open = self.global.is_some();
                    if ui
                        .selectable_label(global_open, "🌐 Global graph")
                        .on_hover_text("Show every page at once (Ctrl+G).")
                        .clicked()
                    {
                        self.toggle_global();
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(slug) = self.draw_page_jump(ui) {
                            events.push(ViewEvent::Navigate(slug));
                        }
                    });
                });
            });
    }

    fn draw_page_jump(&mut self, ui: &mut Ui) -> Option<String> {
        let response = ui
            .add(
                egui::TextEdit::singleline(&mut self.jump_query)
                    .hint_text("Jump to page...")
                    .desired_width(220.0),
            )
            .on_hover_text("Fuzzy search over page titles; pick a result to open it.");

        let ViewState::Ready { inputs, .. } = &self.local else {
            return None;
        };
        let matches = page_matches(&inputs.index, &self.jump_query, MAX_JUMP_RESULTS);
        if matches.is_empty() {
            return None;
        }

        let submitted =
            response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));
        let mut picked = submitted.then(|| matches[0].slug.clone());

        egui::Area::new(response.id.with("jump_results"))
            .order(egui::Order::Foreground)
            .fixed_pos(response.rect.left_bottom())
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    for entry in &matches {
                        if ui
                            .selectable_label(false, entry.label.as_str())
                            .on_hover_text(entry.slug.as_str())
                            .clicked()
                        {
                            picked = Some(entry.slug.clone());
                        }
                    }
                });
            });

        if picked.is_some() {
            self.jump_query.clear();
        }
        picked
    }

    pub(in crate::app) fn draw_side_panel(&mut self, ui: &mut Ui) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.heading("Sources");
            ui.separator();
            self.draw_source_filters(ui);

            ui.add_space(8.0);
            ui.collapsing("Simulation", |ui| self.draw_simulation_controls(ui));
        });
    }

    pub(in crate::app) fn draw_global_overlay(&mut self, ctx: &Context) -> Option<ViewEvent> {
        let state = self.global.as_mut()?;
        let mut open = true;
        let mut event = None;

        let screen = ctx.content_rect();
        egui::Window::new("Global graph")
            .open(&mut open)
            .collapsible(false)
            .default_rect(screen.shrink(48.0))
            .show(ctx, |ui| {
                event = draw_slot(ui, state, "Loading every page...");
            });

        if !open {
            self.close_global();
        }
        event
    }
}
