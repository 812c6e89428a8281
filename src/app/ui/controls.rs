use std::time::Instant;

use eframe::egui::{self, Color32, Ui};
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::engine::{FilterGroupKey, FilterToggle};
use crate::graph::{ClusterAlgorithm, NodeKind};
use crate::util::matches_query;

use super::super::ViewModel;

const ERROR_COLOR: Color32 = Color32::from_rgb(232, 98, 92);

/// Kinds governed by the type flag rather than by id filters.
const FLAGGED_KINDS: [NodeKind; 2] = [NodeKind::User, NodeKind::Unknown];

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        egui::ScrollArea::vertical()
            .id_salt("controls_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                self.draw_display_options(ui);
                ui.separator();
                self.draw_clustering(ui);
                ui.separator();
                self.draw_kind_flags(ui);
                self.draw_filter_groups(ui);
            });
    }

    fn draw_display_options(&mut self, ui: &mut Ui) {
        ui.heading("Display");

        let mut display = self.engine.display();
        let mut changed = false;
        changed |= ui
            .checkbox(&mut display.show_node_labels, "Node labels")
            .changed();
        changed |= ui
            .checkbox(&mut display.show_edge_labels, "Edge labels")
            .changed();
        changed |= ui
            .checkbox(&mut display.show_edges, "Edges")
            .on_hover_text("Hover highlighting needs edges to be shown.")
            .changed();

        if changed {
            self.engine.set_display(display, Instant::now());
        }
    }

    fn draw_clustering(&mut self, ui: &mut Ui) {
        ui.heading("Clustering");

        let selected_title = ClusterAlgorithm::find(&self.algorithm)
            .map(|algorithm| algorithm.title.to_owned())
            .unwrap_or_else(|| self.algorithm.clone());
        egui::ComboBox::from_id_salt("cluster_algorithm")
            .selected_text(selected_title)
            .show_ui(ui, |ui| {
                for algorithm in ClusterAlgorithm::KNOWN {
                    ui.selectable_value(
                        &mut self.algorithm,
                        algorithm.name.to_owned(),
                        algorithm.title,
                    );
                }
            });

        if let Some(algorithm) = ClusterAlgorithm::find(&self.algorithm) {
            ui.small(algorithm.description);
        }

        ui.horizontal(|ui| {
            let running = self.is_clustering();
            if ui
                .add_enabled(!running, egui::Button::new("Run clustering"))
                .clicked()
            {
                self.run_clustering();
            }
            let active = self.engine.overlay().is_active();
            if ui.add_enabled(active, egui::Button::new("Reset")).clicked() {
                self.reset_clustering();
            }
            if running {
                ui.spinner();
            }
        });

        if let Some(error) = &self.cluster_error {
            ui.colored_label(ERROR_COLOR, format!("Clustering failed: {error}"));
        }
    }

    fn draw_kind_flags(&mut self, ui: &mut Ui) {
        let present = FLAGGED_KINDS
            .into_iter()
            .filter(|kind| {
                self.engine
                    .snapshot()
                    .nodes()
                    .iter()
                    .any(|node| node.kind == *kind)
            })
            .collect::<Vec<_>>();
        if present.is_empty() {
            return;
        }

        ui.heading("Node types");
        ui.horizontal_wrapped(|ui| {
            for kind in present {
                let mut enabled = self.engine.filters().is_kind_enabled(kind);
                if ui.checkbox(&mut enabled, kind.label()).changed() {
                    self.engine.set_kind_enabled(kind, enabled, Instant::now());
                }
            }
        });
        ui.separator();
    }

    fn draw_filter_groups(&mut self, ui: &mut Ui) {
        ui.heading("Filters");

        if self.engine.overlay().is_active() {
            ui.label("Filters are hidden while clusters are shown. Reset clustering to edit them.");
            return;
        }

        ui.add(
            egui::TextEdit::singleline(&mut self.filter_query)
                .hint_text("Search filters")
                .desired_width(f32::INFINITY),
        );
        ui.add_space(4.0);

        let matcher = SkimMatcherV2::default();
        let searching = !self.filter_query.trim().is_empty();
        let mut pending = Vec::new();

        for group in self.engine.filter_groups() {
            let items = group
                .items
                .iter()
                .filter(|item| matches_query(&matcher, &item.label, &self.filter_query))
                .collect::<Vec<_>>();
            if items.is_empty() {
                continue;
            }

            let checked = group.items.iter().filter(|item| item.checked).count();
            let header = format!("{} ({checked}/{})", group.title, group.items.len());
            egui::CollapsingHeader::new(header)
                .id_salt(("filter_group", &group.key))
                .default_open(matches!(
                    group.key,
                    FilterGroupKey::Bots | FilterGroupKey::Domains
                ))
                .open(searching.then_some(true))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        if ui.small_button("All").clicked() {
                            pending.push(FilterToggle::Group(group.key.clone(), true));
                        }
                        if ui.small_button("None").clicked() {
                            pending.push(FilterToggle::Group(group.key.clone(), false));
                        }
                    });

                    for item in &items {
                        let mut checked = item.checked;
                        if ui.checkbox(&mut checked, item.label.as_str()).changed() {
                            pending.push(FilterToggle::Id(item.id.clone(), checked));
                        }
                    }
                });
        }

        let now = Instant::now();
        for toggle in pending {
            self.engine.toggle(toggle, now);
        }
    }
}
