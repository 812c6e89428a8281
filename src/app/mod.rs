use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};
use log::error;

use crate::engine::{Engine, EngineSettings};
use crate::graph::{ClusterAssignment, ClusterSource, GraphSnapshot, load_snapshot};
use crate::layout::Placement;

mod graph;
mod render_utils;
mod ui;

#[derive(Clone, Debug)]
pub struct ExplorerConfig {
    pub graph_path: PathBuf,
    pub cluster_dir: PathBuf,
    pub asset_root: PathBuf,
    pub algorithm: String,
    pub settings: EngineSettings,
}

pub struct ExplorerApp {
    config: ExplorerConfig,
    state: AppState,
    reload_rx: Option<Receiver<Result<GraphSnapshot, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<GraphSnapshot, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    engine: Engine,
    cluster_source: ClusterSource,
    asset_root: PathBuf,
    algorithm: String,
    cluster_rx: Option<Receiver<Result<ClusterAssignment, String>>>,
    cluster_error: Option<String>,
    filter_query: String,
    placement: Placement,
    layout_dirty: bool,
    fit_pending: bool,
    pan: Vec2,
    zoom: f32,
}

impl ExplorerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: ExplorerConfig) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let state = Self::start_load(&config);
        Self {
            config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(config: &ExplorerConfig) -> Receiver<Result<GraphSnapshot, String>> {
        let (tx, rx) = mpsc::channel();
        let path = config.graph_path.clone();

        thread::spawn(move || {
            let result = load_snapshot(&path).map_err(|error| {
                error!("graph load failed: {error:#}");
                format!("{error:#}")
            });
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(config: &ExplorerConfig) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(config),
        }
    }
}

pub(in crate::app) fn spawn_cluster_job(
    source: ClusterSource,
    algorithm: String,
) -> Receiver<Result<ClusterAssignment, String>> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let result = source.fetch(&algorithm).map_err(|error| {
            error!("clustering `{algorithm}` failed: {error:#}");
            format!("{error:#}")
        });
        let _ = tx.send(result);
    });

    rx
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => {
                        transition = Some(match result {
                            Ok(snapshot) => {
                                AppState::Ready(Box::new(ViewModel::new(snapshot, &self.config)))
                            }
                            Err(error) => AppState::Error(error),
                        });
                    }
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Error("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading feature graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the feature graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(&self.config));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(
                    ctx,
                    &self.config.graph_path,
                    &mut reload_requested,
                    is_reloading,
                );

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(&self.config));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(match result {
                                Ok(snapshot) => {
                                    AppState::Ready(Box::new(ViewModel::new(snapshot, &self.config)))
                                }
                                Err(error) => AppState::Error(error),
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
