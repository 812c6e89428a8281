use std::path::Path;

use eframe::egui::{self, RichText, Ui};

use crate::engine::PanelViewModel;

use super::super::ViewModel;

fn screenshot_uri(asset_root: &Path, path: &str) -> String {
    format!("file://{}", asset_root.join(path).display())
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        let Some(view) = self.engine.panel().cloned() else {
            ui.heading("Node Details");
            ui.add_space(6.0);
            ui.label("Click a node in the graph to inspect it.");
            return;
        };

        ui.heading(view.title.as_str());
        if let Some(node) = self.engine.snapshot().node(&view.node_id) {
            ui.small(format!("{} | {}", node.kind.label(), node.id));
        }
        ui.add_space(6.0);

        egui::ScrollArea::vertical()
            .id_salt("details_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if let Some(description) = &view.description {
                    ui.label(RichText::new("Description").strong());
                    if description.trim().is_empty() {
                        ui.label(RichText::new("No description available").italics());
                    } else {
                        ui.label(description.as_str());
                    }
                    ui.add_space(6.0);
                }

                egui::Grid::new("node_fields")
                    .num_columns(2)
                    .striped(true)
                    .show(ui, |ui| {
                        for field in &view.fields {
                            ui.label(RichText::new(field.name.as_str()).strong());
                            ui.label(field.value.as_str());
                            ui.end_row();
                        }
                    });

                ui.separator();
                self.draw_screenshots(ui, &view);
            });
    }

    fn draw_screenshots(&mut self, ui: &mut Ui, view: &PanelViewModel) {
        ui.label(RichText::new("Screenshots").strong());
        if view.providers.is_empty() {
            ui.label("No screenshots from the bots currently shown.");
            return;
        }

        let selected_label = view
            .providers
            .iter()
            .find(|provider| view.selected_provider.as_deref() == Some(provider.id.as_str()))
            .map(|provider| provider.label.as_str())
            .unwrap_or("Select a bot");

        let mut choice = None;
        egui::ComboBox::from_id_salt("screenshot_provider")
            .selected_text(selected_label)
            .show_ui(ui, |ui| {
                for provider in &view.providers {
                    let selected = view.selected_provider.as_deref() == Some(provider.id.as_str());
                    if ui.selectable_label(selected, provider.label.as_str()).clicked() {
                        choice = Some(provider.id.clone());
                    }
                }
            });
        if let Some(bot_id) = choice {
            self.engine.select_provider(&bot_id);
        }

        let Some(path) = view.current_screenshot() else {
            return;
        };

        if view.can_cycle() {
            ui.horizontal(|ui| {
                if ui.button("Previous").clicked() {
                    self.engine.previous_screenshot();
                }
                ui.label(format!(
                    "{} / {}",
                    view.screenshot_index + 1,
                    view.screenshots.len()
                ));
                if ui.button("Next").clicked() {
                    self.engine.next_screenshot();
                }
            });
        }

        if path.starts_with("http") {
            ui.hyperlink(path);
            return;
        }

        ui.add(
            egui::Image::new(screenshot_uri(&self.asset_root, path))
                .max_width(ui.available_width())
                .maintain_aspect_ratio(true)
                .show_loading_spinner(true),
        );
        ui.small(path);
    }
}
