use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-view simulation and derivation settings. Keys follow the camelCase
/// names used by the site's graph component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphConfig {
    pub drag: bool,
    pub zoom: bool,
    pub depth: i32,
    pub scale: f32,
    pub repel_force: f32,
    pub center_force: f32,
    pub link_distance: f32,
    pub font_size: f32,
    pub opacity_scale: f32,
    pub remove_tags: Vec<String>,
    pub show_tags: bool,
    pub focus_on_hover: bool,
    pub enable_radial: bool,
    pub tag_links: bool,
    pub source_links: bool,
    pub auto_link_cap: usize,
    pub link_tags: Option<Vec<String>>,
}

impl GraphConfig {
    pub fn local() -> Self {
        Self {
            drag: true,
            zoom: true,
            depth: 1,
            scale: 1.1,
            repel_force: 0.5,
            center_force: 0.3,
            link_distance: 30.0,
            font_size: 0.6,
            opacity_scale: 1.0,
            remove_tags: Vec::new(),
            show_tags: true,
            focus_on_hover: false,
            enable_radial: false,
            tag_links: true,
            source_links: true,
            auto_link_cap: 4,
            link_tags: None,
        }
    }

    pub fn global() -> Self {
        Self {
            depth: -1,
            scale: 0.9,
            center_force: 0.2,
            focus_on_hover: true,
            enable_radial: true,
            ..Self::local()
        }
    }

    /// Overlays the keys present in `raw` on top of `base`.
    pub fn from_json_with_base(raw: &str, base: &Self) -> Result<Self> {
        let overrides: Value = serde_json::from_str(raw).context("invalid graph config JSON")?;
        let Value::Object(overrides) = overrides else {
            return Err(anyhow!("graph config must be a JSON object"));
        };

        let mut merged = serde_json::to_value(base).context("failed to encode base config")?;
        if let Value::Object(fields) = &mut merged {
            fields.extend(overrides);
        }

        let config: Self = serde_json::from_value(merged).context("invalid graph config")?;
        Ok(config.sanitized())
    }

    pub fn from_file_with_base(path: &Path, base: &Self) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read graph config at {}", path.display()))?;
        Self::from_json_with_base(&raw, base)
            .with_context(|| format!("failed to parse graph config at {}", path.display()))
    }

    fn sanitized(mut self) -> Self {
        self.scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        self.opacity_scale = self.opacity_scale.max(0.0);
        self.link_distance = self.link_distance.max(1.0);
        self.font_size = self.font_size.max(0.05);
        self.depth = self.depth.max(-1);
        self
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self::local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_only_present_keys() {
        let config = GraphConfig::from_json_with_base(
            r#"{"depth": 2, "showTags": false, "removeTags": ["misc"]}"#,
            &GraphConfig::local(),
        )
        .unwrap();

        assert_eq!(config.depth, 2);
        assert!(!config.show_tags);
        assert_eq!(config.remove_tags, vec!["misc"]);
        assert_eq!(config.link_distance, 30.0);
        assert_eq!(config.auto_link_cap, 4);
    }

    #[test]
    fn global_preset_is_unbounded_and_radial() {
        let global = GraphConfig::global();
        assert_eq!(global.depth, -1);
        assert!(global.enable_radial);
        assert!(global.focus_on_hover);
    }

    #[test]
    fn rejects_non_objects_and_clamps_depth() {
        assert!(GraphConfig::from_json_with_base("[1]", &GraphConfig::local()).is_err());
        let config =
            GraphConfig::from_json_with_base(r#"{"depth": -7}"#, &GraphConfig::local()).unwrap();
        assert_eq!(config.depth, -1);
    }
}
