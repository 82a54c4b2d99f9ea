use eframe::egui::{self, Color32, Sense, Ui, vec2};
use tracing::warn;

use crate::content::SourceKind;

use super::super::GraphApp;
use super::super::render::parse_color;

const SWATCH_SIZE: f32 = 12.0;

impl GraphApp {
    /// One checkbox per source instance, grouped by kind. Toggling persists
    /// the choice and broadcasts a filter change.
    pub(in crate::app) fn draw_source_filters(&mut self, ui: &mut Ui) {
        let Some(sources) = self.sources.as_ref() else {
            ui.spinner();
            return;
        };

        let mut toggles = Vec::new();
        for kind in SourceKind::CONFIGURABLE {
            let entries = sources.instances(kind).into_iter().flatten().collect::<Vec<_>>();
            egui::CollapsingHeader::new(format!("{} ({})", kind.label(), entries.len()))
                .id_salt(kind.label())
                .default_open(!entries.is_empty())
                .show(ui, |ui| {
                    if entries.is_empty() {
                        ui.weak("No sources configured");
                        return;
                    }
                    for (id, entry) in entries {
                        ui.horizontal(|ui| {
                            let (rect, _) =
                                ui.allocate_exact_size(vec2(SWATCH_SIZE, SWATCH_SIZE), Sense::hover());
                            let color = parse_color(&entry.color).unwrap_or(Color32::GRAY);
                            ui.painter().rect_filled(rect, 2.0, color);

                            let name = if entry.name.is_empty() { id } else { &entry.name };
                            let mut enabled = entry.enabled;
                            if ui
                                .checkbox(&mut enabled, name.as_str())
                                .on_hover_text(id.as_str())
                                .changed()
                            {
                                toggles.push((kind, id.clone(), enabled));
                            }
                        });
                    }
                });
        }

        for (kind, id, enabled) in toggles {
            let Some(sources) = self.sources.as_mut() else {
                break;
            };
            if let Err(err) = self.settings.toggle(sources, kind, &id, enabled) {
                warn!("failed to update source {id}: {err:#}");
            }
        }
    }
}
