use eframe::egui::{self, Ui};

use super::super::{GraphApp, ViewState};

impl GraphApp {
    pub(in crate::app) fn draw_simulation_controls(&mut self, ui: &mut Ui) {
        let mut changed = false;

        changed |= ui
            .add(
                egui::Slider::new(&mut self.local_config.repel_force, 0.0..=3.0)
                    .text("Repel force")
                    .clamping(egui::SliderClamping::Always),
            )
            .on_hover_text("How strongly pages push away from each other.")
            .changed();

        changed |= ui
            .add(
                egui::Slider::new(&mut self.local_config.center_force, 0.0..=1.0)
                    .text("Center force")
                    .clamping(egui::SliderClamping::Always),
            )
            .on_hover_text("How strongly the layout is kept around the middle.")
            .changed();

        changed |= ui
            .add(
                egui::Slider::new(&mut self.local_config.link_distance, 5.0..=120.0)
                    .text("Link distance")
                    .clamping(egui::SliderClamping::Always),
            )
            .on_hover_text("Rest length of every link.")
            .changed();

        changed |= ui
            .checkbox(&mut self.local_config.enable_radial, "Radial layout")
            .on_hover_text("Pull every page toward a ring sized to the view.")
            .changed();

        if let ViewState::Ready { view, .. } = &mut self.local {
            if changed {
                view.set_force_params(&self.local_config);
            }
            ui.add_space(4.0);
            ui.weak(format!("simulation: {:?} (alpha {:.3})", view.phase(), view.alpha()));
        }
    }
}
