mod app;
mod engine;
mod graph;
mod layout;
mod util;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use clap::builder::PossibleValuesParser;

use crate::app::{ExplorerApp, ExplorerConfig};
use crate::engine::EngineSettings;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph document with `nodes` and `edges`.
    #[arg(long, default_value = "data/static_graph.json")]
    graph: PathBuf,

    /// Directory holding one `<algorithm>.json` partition per clustering algorithm.
    #[arg(long, default_value = "data/clusters")]
    cluster_dir: PathBuf,

    /// Directory that screenshot references resolve against.
    #[arg(long, default_value = ".")]
    asset_root: PathBuf,

    #[arg(
        long,
        default_value = "domain",
        value_parser = PossibleValuesParser::new(["domain", "agglomerative", "spectral"])
    )]
    algorithm: String,

    /// Coalescing window for detail panel refreshes.
    #[arg(long, default_value_t = 50)]
    debounce_ms: u64,

    #[arg(long, short = 'v', conflicts_with = "quiet")]
    verbose: bool,

    #[arg(long, short = 'q')]
    quiet: bool,
}

fn init_logging(args: &Args) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    if !args.verbose {
        for noisy in ["eframe", "egui_glow", "winit"] {
            builder.filter_module(noisy, log::LevelFilter::Warn);
        }
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let config = ExplorerConfig {
        graph_path: args.graph,
        cluster_dir: args.cluster_dir,
        asset_root: args.asset_root,
        algorithm: args.algorithm,
        settings: EngineSettings {
            debounce_window: Duration::from_millis(args.debounce_ms),
            ..EngineSettings::default()
        },
    };
    log::info!("starting explorer for {}", config.graph_path.display());

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Feature Graph Explorer",
        options,
        Box::new(move |cc| Ok(Box::new(ExplorerApp::new(cc, config)))),
    )
}
