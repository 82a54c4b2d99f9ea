use std::thread;

use anyhow::{Context, Result};

use crate::config::{CategoryConfig, CustomLinkConfig};
use crate::settings::{SettingsStore, SourceSettings};

use super::fetch::{CONTENT_INDEX_PATH, DocumentSource};
use super::parse::parse_content_index;
use super::record::ContentIndex;

/// Every document one scene is built from, read fresh for each construction.
#[derive(Clone, Debug, Default)]
pub struct SceneInputs {
    pub index: ContentIndex,
    pub custom_links: CustomLinkConfig,
    pub categories: CategoryConfig,
    pub sources: SourceSettings,
}

pub fn load_content_index(source: &DocumentSource) -> Result<ContentIndex> {
    let raw = source
        .fetch_text(CONTENT_INDEX_PATH)
        .with_context(|| format!("failed to fetch content index from {}", source.describe()))?;
    parse_content_index(&raw)
}

/// Reads the independent documents concurrently. A document that cannot be
/// read is replaced by its empty or built-in default.
pub fn collect_scene_inputs(source: &DocumentSource, settings: &SettingsStore) -> SceneInputs {
    thread::scope(|scope| {
        let index = scope.spawn(|| load_content_index(source));
        let custom_links = scope.spawn(|| CustomLinkConfig::load(source));
        let categories = scope.spawn(|| CategoryConfig::load(source));
        let sources = settings.load(source);

        let index = match index.join() {
            Ok(Ok(index)) => index,
            Ok(Err(error)) => {
                tracing::warn!("showing an empty graph: {error:#}");
                ContentIndex::default()
            }
            Err(_) => {
                tracing::warn!("content index loader panicked");
                ContentIndex::default()
            }
        };

        let inputs = SceneInputs {
            index,
            custom_links: joined_or_default(custom_links.join(), "custom links"),
            categories: joined_or_default(categories.join(), "category config"),
            sources,
        };

        tracing::info!(
            "loaded {} pages, {} custom links, {} categories from {}",
            inputs.index.len(),
            inputs.custom_links.links.len(),
            inputs.categories.main_categories.len(),
            source.describe()
        );

        inputs
    })
}

fn joined_or_default<T: Default>(result: thread::Result<T>, what: &str) -> T {
    result.unwrap_or_else(|_| {
        tracing::warn!("{what} loader panicked, using defaults");
        T::default()
    })
}
