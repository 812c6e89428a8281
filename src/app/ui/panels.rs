use std::path::Path;
use std::sync::mpsc::TryRecvError;
use std::time::Instant;

use eframe::egui::{self, Align, Context, Layout, Vec2};
use log::{debug, info, warn};

use crate::engine::Engine;
use crate::graph::{ClusterSource, GraphSnapshot};
use crate::layout::Placement;

use super::super::{ExplorerConfig, ViewModel, spawn_cluster_job};

impl ViewModel {
    pub(in crate::app) fn new(snapshot: GraphSnapshot, config: &ExplorerConfig) -> Self {
        Self {
            engine: Engine::new(snapshot, config.settings.clone()),
            cluster_source: ClusterSource::new(config.cluster_dir.clone()),
            asset_root: config.asset_root.clone(),
            algorithm: config.algorithm.clone(),
            cluster_rx: None,
            cluster_error: None,
            filter_query: String::new(),
            placement: Placement::default(),
            layout_dirty: true,
            fit_pending: true,
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        graph_path: &Path,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        let now = Instant::now();
        self.poll_cluster_job(now);
        if self.engine.poll(now) {
            debug!("detail panel refreshed");
        }
        if let Some(wait) = self.engine.next_refresh_in(now) {
            ctx.request_repaint_after(wait);
        }

        let status = self.visible_graph_text();
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Feature Graph Explorer");
                    ui.separator();
                    ui.label(format!("graph: {}", graph_path.display()));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload graph"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if ui.button("Fit view").clicked() {
                        self.fit_pending = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(status);
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading feature graph...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }

    fn visible_graph_text(&self) -> String {
        let snapshot = self.engine.snapshot();
        let visibility = self.engine.visibility();
        let mut text = format!(
            "nodes {}/{}  edges {}/{}",
            visibility.visible_node_count(),
            snapshot.node_count(),
            visibility.visible_edge_count(),
            snapshot.edge_count()
        );
        if self.engine.overlay().is_active() {
            text.push_str(&format!(
                "  clusters {}",
                self.engine.overlay().container_count()
            ));
        }
        text
    }

    pub(in crate::app) fn is_clustering(&self) -> bool {
        self.cluster_rx.is_some()
    }

    pub(in crate::app) fn run_clustering(&mut self) {
        if self.cluster_rx.is_some() {
            return;
        }
        info!("running clustering `{}`", self.algorithm);
        self.cluster_error = None;
        self.cluster_rx = Some(spawn_cluster_job(
            self.cluster_source.clone(),
            self.algorithm.clone(),
        ));
    }

    pub(in crate::app) fn reset_clustering(&mut self) {
        self.engine.reset_cluster(Instant::now());
        self.cluster_error = None;
        self.layout_dirty = true;
        self.fit_pending = true;
    }

    fn poll_cluster_job(&mut self, now: Instant) {
        let Some(rx) = self.cluster_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(Ok(assignment)) => {
                let created = self.engine.apply_cluster(&assignment, now);
                info!("cluster overlay built with {created} containers");
                self.layout_dirty = true;
                self.fit_pending = true;
            }
            Ok(Err(error)) => {
                warn!("clustering failed, keeping the current graph");
                self.cluster_error = Some(error);
            }
            Err(TryRecvError::Empty) => {
                self.cluster_rx = Some(rx);
            }
            Err(TryRecvError::Disconnected) => {
                self.cluster_error = Some("Clustering worker disconnected".to_owned());
            }
        }
    }
}
