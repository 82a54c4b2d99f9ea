mod app;
mod config;
mod content;
mod graph;
mod settings;
mod util;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::GraphConfig;
use crate::content::DocumentSource;
use crate::settings::{FileStore, FilterBus, KeyValueStore, MemoryStore, SettingsStore};
use crate::util::normalize_slug;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Site directory or base URL holding the generated static documents.
    #[arg(long, default_value = "public")]
    site: String,
    /// Page to open first.
    #[arg(long, default_value = "index")]
    page: String,
    /// JSON overrides for the local graph.
    #[arg(long)]
    graph_config: Option<PathBuf>,
    /// JSON overrides for the global graph.
    #[arg(long)]
    global_config: Option<PathBuf>,
    /// Where visited pages and source filters are kept.
    #[arg(long)]
    state_dir: Option<PathBuf>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn load_graph_config(path: Option<&Path>, base: GraphConfig) -> GraphConfig {
    let Some(path) = path else {
        return base;
    };
    GraphConfig::from_file_with_base(path, &base).unwrap_or_else(|err| {
        warn!("using default graph settings: {err:#}");
        base
    })
}

fn open_storage(state_dir: Option<PathBuf>) -> Arc<dyn KeyValueStore> {
    let opened = state_dir
        .map_or_else(FileStore::default_dir, Ok)
        .and_then(|dir| FileStore::open(dir));
    match opened {
        Ok(store) => {
            debug!("keeping settings in {}", store.dir().display());
            Arc::new(store)
        }
        Err(err) => {
            warn!("keeping settings in memory for this session: {err:#}");
            Arc::new(MemoryStore::default())
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let source = DocumentSource::from_location(&args.site)
        .with_context(|| format!("invalid site location {}", args.site))?;
    let options = app::AppOptions {
        source,
        settings: SettingsStore::new(open_storage(args.state_dir), FilterBus::default()),
        focal: normalize_slug(&args.page),
        local_config: load_graph_config(args.graph_config.as_deref(), GraphConfig::local()),
        global_config: load_graph_config(args.global_config.as_deref(), GraphConfig::global()),
    };

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "skillgraph",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::GraphApp::new(cc, options)))),
    )
    .map_err(|err| anyhow::anyhow!("failed to run the viewer: {err}"))
}
