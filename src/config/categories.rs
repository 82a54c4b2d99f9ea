use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::content::{CATEGORIES_PATH, DocumentSource};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    Circle,
    Square,
    Diamond,
    Hexagon,
    Star,
    Home,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MainCategory {
    pub id: String,
    pub name: String,
    #[serde(default = "default_shape")]
    pub shape: NodeShape,
    pub color: Hsl,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_shape() -> NodeShape {
    NodeShape::Circle
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryConfig {
    #[serde(default)]
    pub main_categories: Vec<MainCategory>,
    /// Folder under which each main category owns `<root>/<id>` pages.
    #[serde(default = "default_root")]
    pub root: String,
}

fn default_root() -> String {
    "skill-tree".to_owned()
}

impl Default for CategoryConfig {
    fn default() -> Self {
        let category = |id: &str, name: &str, shape, h, s, l| MainCategory {
            id: id.to_owned(),
            name: name.to_owned(),
            shape,
            color: Hsl { h, s, l },
            tags: vec![name.to_owned(), "skill-tree".to_owned()],
        };

        Self {
            main_categories: vec![
                category("chat-ai", "対話型AI", NodeShape::Circle, 0.0, 70.0, 55.0),
                category("generative-ai", "生成AI", NodeShape::Square, 270.0, 60.0, 55.0),
                category("automation", "自動化", NodeShape::Diamond, 30.0, 80.0, 55.0),
                category("development", "開発", NodeShape::Hexagon, 150.0, 60.0, 45.0),
                category("frontier", "先端技術", NodeShape::Star, 210.0, 70.0, 50.0),
            ],
            root: default_root(),
        }
    }
}

impl CategoryConfig {
    pub fn load(source: &DocumentSource) -> Self {
        let config: Self = source.fetch_json_or_default(CATEGORIES_PATH);
        if config.main_categories.is_empty() {
            tracing::warn!("{CATEGORIES_PATH} lists no categories, using the built-in set");
            return Self::default();
        }
        config
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.main_categories
            .iter()
            .position(|category| category.id == id)
    }

    /// Tags carried by every category. They mark membership of the tree as a
    /// whole and say nothing about which category a page belongs to.
    pub fn marker_tags(&self) -> HashSet<&str> {
        let mut categories = self.main_categories.iter();
        let Some(first) = categories.next() else {
            return HashSet::new();
        };
        if self.main_categories.len() < 2 {
            return HashSet::new();
        }

        let mut shared = first.tags.iter().map(String::as_str).collect::<HashSet<_>>();
        for category in categories {
            shared.retain(|tag| category.tags.iter().any(|other| other == tag));
        }
        shared
    }
}
