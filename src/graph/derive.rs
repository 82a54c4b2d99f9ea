use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::{CategoryConfig, CustomLinkConfig, GraphConfig};
use crate::content::{ContentIndex, SourceKind};
use crate::settings::SourceSettings;
use crate::util::{normalize_slug, tag_slug};

use super::edge::{EdgeKey, EdgeOrigin, EdgeSet};

#[derive(Clone, Debug)]
pub struct LinkOptions {
    pub tag_links: bool,
    pub source_links: bool,
    pub auto_link_cap: usize,
    pub show_tags: bool,
    pub removed_tags: HashSet<String>,
    /// Tags that never produce page-to-page links (removed tags plus the
    /// category marker tags).
    pub unlinked_tags: HashSet<String>,
    pub link_tags: Option<HashSet<String>>,
}

impl LinkOptions {
    pub fn from_config(config: &GraphConfig, categories: &CategoryConfig) -> Self {
        let removed_tags = config.remove_tags.iter().cloned().collect::<HashSet<_>>();
        let mut unlinked_tags = removed_tags.clone();
        unlinked_tags.extend(categories.marker_tags().into_iter().map(str::to_owned));

        Self {
            tag_links: config.tag_links,
            source_links: config.source_links,
            auto_link_cap: config.auto_link_cap,
            show_tags: config.show_tags,
            removed_tags,
            unlinked_tags,
            link_tags: config
                .link_tags
                .as_ref()
                .map(|tags| tags.iter().cloned().collect()),
        }
    }

    fn links_tag(&self, tag: &str) -> bool {
        !self.unlinked_tags.contains(tag)
            && self
                .link_tags
                .as_ref()
                .is_none_or(|allowed| allowed.contains(tag))
    }
}

#[derive(Clone, Debug, Default)]
pub struct DerivedLinks {
    pub edges: Vec<EdgeKey>,
    pub tag_nodes: Vec<String>,
}

pub struct LinkDeriver<'a> {
    index: &'a ContentIndex,
    custom: &'a CustomLinkConfig,
    sources: Option<&'a SourceSettings>,
    options: &'a LinkOptions,
}

struct AutoLinkBudget<'a> {
    cap: usize,
    used: HashMap<&'a str, usize>,
}

impl<'a> AutoLinkBudget<'a> {
    fn has_room(&self, slug: &str) -> bool {
        self.used.get(slug).copied().unwrap_or(0) < self.cap
    }

    fn charge(&mut self, a: &'a str, b: &'a str) {
        *self.used.entry(a).or_insert(0) += 1;
        *self.used.entry(b).or_insert(0) += 1;
    }
}

impl<'a> LinkDeriver<'a> {
    pub fn new(
        index: &'a ContentIndex,
        custom: &'a CustomLinkConfig,
        options: &'a LinkOptions,
    ) -> Self {
        Self {
            index,
            custom,
            sources: None,
            options,
        }
    }

    /// Source-derived links are only drawn between pages whose source instance
    /// is enabled in `sources`.
    pub fn with_sources(mut self, sources: &'a SourceSettings) -> Self {
        self.sources = Some(sources);
        self
    }

    pub fn derive(&self) -> DerivedLinks {
        let (edges, tag_nodes) = self.derive_with_origins();
        DerivedLinks {
            edges: edges.into_keys(),
            tag_nodes,
        }
    }

    pub(super) fn derive_with_origins(&self) -> (EdgeSet, Vec<String>) {
        let mut edges = EdgeSet::default();

        for (slug, record) in self.index.iter() {
            for link in &record.links {
                if let Some(target) = self.index.resolve(link)
                    && let Some(key) = EdgeKey::new(slug, target)
                {
                    edges.insert(key, EdgeOrigin::Explicit);
                }
            }
        }

        let tag_nodes = if self.options.show_tags {
            self.add_tag_node_edges(&mut edges)
        } else {
            Vec::new()
        };

        let mut budget = AutoLinkBudget {
            cap: self.options.auto_link_cap,
            used: HashMap::new(),
        };

        if self.options.tag_links {
            for members in self.tag_groups().values() {
                connect_group(members, EdgeOrigin::TagDerived, &mut edges, &mut budget);
            }
        }

        if self.options.source_links {
            for members in self.source_groups().values() {
                connect_group(members, EdgeOrigin::SourceDerived, &mut edges, &mut budget);
            }
        }

        let excluded = self
            .custom
            .excluded_links
            .iter()
            .filter_map(|pair| {
                EdgeKey::new(
                    &self.resolve_or_raw(&pair.source),
                    &self.resolve_or_raw(&pair.target),
                )
            })
            .collect::<HashSet<_>>();
        if !excluded.is_empty() {
            let before = edges.len();
            edges.retain(|key| !excluded.contains(key));
            tracing::debug!("excluded {} derived links", before - edges.len());
        }

        for pair in &self.custom.links {
            if let (Some(source), Some(target)) =
                (self.index.resolve(&pair.source), self.index.resolve(&pair.target))
                && let Some(key) = EdgeKey::new(source, target)
            {
                edges.insert(key, EdgeOrigin::Custom);
            }
        }

        (edges, tag_nodes)
    }

    fn resolve_or_raw(&self, slug: &str) -> String {
        self.index
            .resolve(slug)
            .map(str::to_owned)
            .unwrap_or_else(|| normalize_slug(slug))
    }

    fn add_tag_node_edges(&self, edges: &mut EdgeSet) -> Vec<String> {
        let mut tag_nodes = Vec::new();
        let mut seen = HashSet::new();

        for (slug, record) in self.index.iter() {
            for tag in &record.tags {
                if self.options.removed_tags.contains(tag) {
                    continue;
                }

                let tag_node = tag_slug(tag);
                if let Some(key) = EdgeKey::new(slug, &tag_node) {
                    edges.insert(key, EdgeOrigin::TagNode);
                }
                if seen.insert(tag_node.clone()) {
                    tag_nodes.push(tag_node);
                }
            }
        }

        tag_nodes
    }

    fn tag_groups(&self) -> BTreeMap<&'a str, Vec<&'a str>> {
        let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (slug, record) in self.index.iter() {
            for tag in &record.tags {
                if self.options.links_tag(tag) {
                    groups.entry(tag.as_str()).or_default().push(slug);
                }
            }
        }
        groups
    }

    fn source_groups(&self) -> BTreeMap<(SourceKind, &'a str), Vec<&'a str>> {
        let mut groups: BTreeMap<(SourceKind, &str), Vec<&str>> = BTreeMap::new();
        for (slug, record) in self.index.iter() {
            let Some(source) = record.source.as_ref() else {
                continue;
            };
            let Some(instance) = source.instance_id() else {
                continue;
            };
            if self
                .sources
                .is_some_and(|sources| !sources.is_enabled(source.kind, instance))
            {
                continue;
            }
            groups.entry((source.kind, instance)).or_default().push(slug);
        }
        groups
    }
}

fn connect_group<'a>(
    members: &[&'a str],
    origin: EdgeOrigin,
    edges: &mut EdgeSet,
    budget: &mut AutoLinkBudget<'a>,
) {
    for (position, &from) in members.iter().enumerate() {
        for &to in &members[position + 1..] {
            if !budget.has_room(from) {
                break;
            }
            if !budget.has_room(to) {
                continue;
            }
            let Some(key) = EdgeKey::new(from, to) else {
                continue;
            };
            if edges.contains(&key) {
                continue;
            }
            edges.insert(key, origin);
            budget.charge(from, to);
        }
    }
}
