use std::collections::{HashMap, HashSet};
use std::f32::consts::{FRAC_PI_2, TAU};

use crate::config::{CategoryConfig, CustomLinkConfig, Hsl, NodeShape};
use crate::content::ContentIndex;
use crate::util::{HOME_SLUG, hash_bucket, is_tag_slug, leaf_name, normalize_slug};

const CLUSTER_RADIUS: f32 = 100.0;
const LIGHTNESS_STEP: f32 = 5.0;
const MIN_LIGHTNESS: f32 = 35.0;
const MAX_LIGHTNESS: f32 = 70.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CategoryId {
    Main(usize),
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    pub category: CategoryId,
    pub shape: NodeShape,
    pub color: Option<Hsl>,
}

pub struct CategoryClassifier<'a> {
    config: &'a CategoryConfig,
    marker_tags: HashSet<&'a str>,
    /// Child page -> the sub-category page it borrows its lightness from.
    parents: HashMap<String, String>,
    targets: Vec<(f32, f32)>,
}

impl<'a> CategoryClassifier<'a> {
    pub fn new(
        config: &'a CategoryConfig,
        index: &ContentIndex,
        custom: &CustomLinkConfig,
    ) -> Self {
        let count = config.main_categories.len();
        let targets = (0..count)
            .map(|position| {
                let angle = TAU * position as f32 / count as f32 - FRAC_PI_2;
                (
                    (angle.cos() * CLUSTER_RADIUS).round(),
                    (angle.sin() * CLUSTER_RADIUS).round(),
                )
            })
            .collect();

        Self {
            config,
            marker_tags: config.marker_tags(),
            parents: sub_category_parents(config, index, custom),
            targets,
        }
    }

    pub fn category_of(&self, slug: &str, tags: &[String]) -> CategoryId {
        let path = format!("/{slug}");
        for (position, category) in self.config.main_categories.iter().enumerate() {
            let segment = format!("/{}", category.id);
            if path.contains(&format!("{segment}/")) || path.ends_with(&segment) {
                return CategoryId::Main(position);
            }
        }

        for (position, category) in self.config.main_categories.iter().enumerate() {
            let matches = category
                .tags
                .iter()
                .filter(|tag| !self.marker_tags.contains(tag.as_str()))
                .any(|tag| tags.contains(tag));
            if matches {
                return CategoryId::Main(position);
            }
        }

        CategoryId::Other
    }

    pub fn classify(&self, slug: &str, tags: &[String]) -> Classification {
        if is_tag_slug(slug) {
            return Classification {
                category: CategoryId::Other,
                shape: NodeShape::Circle,
                color: None,
            };
        }

        let category = self.category_of(slug, tags);
        let main = match category {
            CategoryId::Main(position) => self.config.main_categories.get(position),
            CategoryId::Other => None,
        };

        let shape = if slug == HOME_SLUG {
            NodeShape::Home
        } else {
            main.map_or(NodeShape::Circle, |category| category.shape)
        };

        let color = main.map(|category| {
            let mut color = category.color;
            if !self.is_main_category_page(slug, &category.id) {
                let owner = self.parents.get(slug).map_or(slug, String::as_str);
                let bucket = self.sub_group_bucket(owner, &category.id);
                let offset = ((bucket % 5) as f32 - 2.0) * LIGHTNESS_STEP;
                color.l = (color.l + offset).clamp(MIN_LIGHTNESS, MAX_LIGHTNESS);
            }
            color
        });

        Classification {
            category,
            shape,
            color,
        }
    }

    /// Cluster centre for a category; categories sit evenly on a circle
    /// starting at the top, `Other` sits at the origin.
    pub fn cluster_target(&self, category: CategoryId) -> (f32, f32) {
        match category {
            CategoryId::Main(position) => self.targets.get(position).copied().unwrap_or((0.0, 0.0)),
            CategoryId::Other => (0.0, 0.0),
        }
    }

    fn category_root(&self, id: &str) -> String {
        format!("{}/{id}", self.config.root)
    }

    fn is_main_category_page(&self, slug: &str, id: &str) -> bool {
        let root = self.category_root(id);
        slug.ends_with("/index") || slug == root || slug == format!("{root}/index")
    }

    fn sub_group_bucket(&self, owner: &str, id: &str) -> u32 {
        if owner.ends_with("/index") || owner == self.category_root(id) {
            return 0;
        }
        hash_bucket(leaf_name(owner))
    }
}

fn is_category_index(config: &CategoryConfig, slug: &str) -> bool {
    if slug.ends_with("/index") {
        return true;
    }
    slug.strip_prefix(&config.root)
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
}

fn sub_category_parents(
    config: &CategoryConfig,
    index: &ContentIndex,
    custom: &CustomLinkConfig,
) -> HashMap<String, String> {
    let mut sub_categories = HashSet::new();
    for (slug, record) in index.iter() {
        if !is_category_index(config, slug) {
            continue;
        }
        for link in &record.links {
            let target = normalize_slug(link);
            if !target.ends_with("/index") && !is_tag_slug(&target) {
                sub_categories.insert(target);
            }
        }
    }

    let mut parents = HashMap::new();
    for pair in &custom.links {
        let source = normalize_slug(&pair.source);
        if sub_categories.contains(&source) {
            parents.insert(normalize_slug(&pair.target), source);
        }
    }
    parents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LinkPair;
    use crate::content::record;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|tag| (*tag).to_owned()).collect()
    }

    fn classifier_parts() -> (CategoryConfig, ContentIndex, CustomLinkConfig) {
        let index = ContentIndex::from_records([
            record("skill-tree/chat-ai/index", &["対話型AI", "skill-tree"], &["chat-ai/chatgpt"]),
            record("chat-ai/chatgpt", &[], &[]),
            record("notes/prompting", &[], &[]),
        ]);
        let custom = CustomLinkConfig {
            links: vec![LinkPair {
                source: "chat-ai/chatgpt".to_owned(),
                target: "notes/prompting".to_owned(),
            }],
            excluded_links: Vec::new(),
        };
        (CategoryConfig::default(), index, custom)
    }

    #[test]
    fn main_category_index_keeps_base_colour() {
        let (config, index, custom) = classifier_parts();
        let classifier = CategoryClassifier::new(&config, &index, &custom);

        let classification =
            classifier.classify("skill-tree/chat-ai/index", &tags(&["対話型AI", "skill-tree"]));
        assert_eq!(classification.category, CategoryId::Main(0));
        assert_eq!(classification.shape, NodeShape::Circle);
        assert_eq!(classification.color.map(|color| color.l), Some(55.0));
    }

    #[test]
    fn classification_is_idempotent() {
        let (config, index, custom) = classifier_parts();
        let classifier = CategoryClassifier::new(&config, &index, &custom);
        let page_tags = tags(&["開発"]);

        let first = classifier.classify("notes/rust", &page_tags);
        let second = classifier.classify("notes/rust", &page_tags);
        assert_eq!(first, second);
        assert_eq!(first.category, CategoryId::Main(3));
        assert_eq!(first.shape, NodeShape::Hexagon);
    }

    #[test]
    fn path_match_wins_over_tags() {
        let (config, index, custom) = classifier_parts();
        let classifier = CategoryClassifier::new(&config, &index, &custom);
        assert_eq!(
            classifier.category_of("automation/zapier", &tags(&["開発"])),
            CategoryId::Main(2)
        );
    }

    #[test]
    fn marker_tag_alone_is_not_a_category() {
        let (config, index, custom) = classifier_parts();
        let classifier = CategoryClassifier::new(&config, &index, &custom);
        let classification = classifier.classify("notes/misc", &tags(&["skill-tree"]));
        assert_eq!(classification.category, CategoryId::Other);
        assert_eq!(classification.color, None);
        assert_eq!(classification.shape, NodeShape::Circle);
    }

    #[test]
    fn home_and_tag_nodes_have_fixed_shapes() {
        let (config, index, custom) = classifier_parts();
        let classifier = CategoryClassifier::new(&config, &index, &custom);
        assert_eq!(classifier.classify("index", &[]).shape, NodeShape::Home);
        let tag = classifier.classify("tags/開発", &[]);
        assert_eq!(tag.shape, NodeShape::Circle);
        assert_eq!(tag.category, CategoryId::Other);
    }

    #[test]
    fn sub_category_children_share_their_parent_lightness() {
        let (config, index, custom) = classifier_parts();
        let classifier = CategoryClassifier::new(&config, &index, &custom);
        let parent = classifier.classify("chat-ai/chatgpt", &[]);
        let child = classifier.classify("notes/prompting", &tags(&["対話型AI"]));
        assert_eq!(child.category, CategoryId::Main(0));
        assert_eq!(parent.color, child.color);

        let lightness = parent.color.map(|color| color.l).unwrap();
        assert!((MIN_LIGHTNESS..=MAX_LIGHTNESS).contains(&lightness));
    }

    #[test]
    fn lightness_offset_follows_the_leaf_bucket() {
        let (config, index, custom) = classifier_parts();
        let classifier = CategoryClassifier::new(&config, &index, &custom);
        // hash_bucket("ab") == 1 -> offset -5
        let color = classifier.classify("chat-ai/ab", &[]).color.unwrap();
        assert_eq!(color.l, 50.0);
        // hash_bucket("abc") == 5 -> offset -10
        let color = classifier.classify("chat-ai/abc", &[]).color.unwrap();
        assert_eq!(color.l, 45.0);
    }

    #[test]
    fn cluster_targets_start_at_the_top() {
        let (config, index, custom) = classifier_parts();
        let classifier = CategoryClassifier::new(&config, &index, &custom);
        assert_eq!(classifier.cluster_target(CategoryId::Main(0)), (0.0, -100.0));
        assert_eq!(classifier.cluster_target(CategoryId::Other), (0.0, 0.0));
        let (x, y) = classifier.cluster_target(CategoryId::Main(1));
        assert_eq!((x, y), (95.0, -31.0));
    }
}
