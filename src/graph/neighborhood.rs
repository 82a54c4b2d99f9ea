use std::collections::{HashMap, HashSet, VecDeque};

use crate::content::ContentIndex;
use crate::util::is_tag_slug;

use super::derive::DerivedLinks;

/// Visible working set: node slugs in discovery order and edges as index pairs
/// into `nodes`.
#[derive(Clone, Debug, Default)]
pub struct Neighborhood {
    pub nodes: Vec<String>,
    pub edges: Vec<(usize, usize)>,
    pub index_by_slug: HashMap<String, usize>,
}

impl Neighborhood {
    pub fn index_of(&self, slug: &str) -> Option<usize> {
        self.index_by_slug.get(slug).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn degree(&self) -> Vec<usize> {
        let mut degree = vec![0; self.nodes.len()];
        for &(source, target) in &self.edges {
            degree[source] += 1;
            degree[target] += 1;
        }
        degree
    }
}

/// Selects the nodes within `depth` hops of `focal`. A negative depth selects
/// every page, plus tag nodes when `show_tags` is set.
pub fn select_neighborhood(
    links: &DerivedLinks,
    index: &ContentIndex,
    focal: &str,
    depth: i32,
    show_tags: bool,
) -> Neighborhood {
    let visible = if depth < 0 {
        let mut all = index.slugs().collect::<Vec<_>>();
        if show_tags {
            all.extend(links.tag_nodes.iter().map(String::as_str));
        }
        all
    } else {
        expand_from(links, focal, depth.unsigned_abs())
    };

    let mut neighborhood = Neighborhood::default();
    for slug in visible {
        if !show_tags && is_tag_slug(slug) {
            continue;
        }
        if neighborhood.index_by_slug.contains_key(slug) {
            continue;
        }
        neighborhood
            .index_by_slug
            .insert(slug.to_owned(), neighborhood.nodes.len());
        neighborhood.nodes.push(slug.to_owned());
    }

    for key in &links.edges {
        let (a, b) = key.endpoints();
        if let (Some(source), Some(target)) = (neighborhood.index_of(a), neighborhood.index_of(b)) {
            neighborhood.edges.push((source, target));
        }
    }

    tracing::debug!(
        "selected {} nodes and {} edges around {focal} (depth {depth})",
        neighborhood.nodes.len(),
        neighborhood.edges.len()
    );

    neighborhood
}

fn expand_from<'a>(links: &'a DerivedLinks, focal: &'a str, depth: u32) -> Vec<&'a str> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for key in &links.edges {
        let (a, b) = key.endpoints();
        adjacency.entry(a).or_default().push(b);
        adjacency.entry(b).or_default().push(a);
    }

    // `None` separates one hop band from the next.
    let mut queue = VecDeque::from([Some(focal), None]);
    let mut queued = HashSet::from([focal]);
    let mut visible = Vec::new();
    let mut bands_left = depth;

    while let Some(entry) = queue.pop_front() {
        let Some(slug) = entry else {
            if bands_left == 0 || queue.is_empty() {
                break;
            }
            bands_left -= 1;
            queue.push_back(None);
            continue;
        };

        visible.push(slug);
        for &next in adjacency.get(slug).into_iter().flatten() {
            if queued.insert(next) {
                queue.push_back(Some(next));
            }
        }
    }

    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::record;
    use crate::graph::EdgeKey;

    fn links(pairs: &[(&str, &str)], tag_nodes: &[&str]) -> DerivedLinks {
        DerivedLinks {
            edges: pairs
                .iter()
                .filter_map(|(a, b)| EdgeKey::new(a, b))
                .collect(),
            tag_nodes: tag_nodes.iter().map(|tag| (*tag).to_owned()).collect(),
        }
    }

    fn chain_index() -> ContentIndex {
        ContentIndex::from_records([
            record("f", &[], &[]),
            record("a", &[], &[]),
            record("b", &[], &[]),
            record("c", &[], &[]),
            record("lonely", &[], &[]),
        ])
    }

    fn sorted(neighborhood: &Neighborhood) -> Vec<&str> {
        let mut nodes = neighborhood.nodes.iter().map(String::as_str).collect::<Vec<_>>();
        nodes.sort_unstable();
        nodes
    }

    #[test]
    fn depth_zero_is_only_the_focal_node() {
        let links = links(&[("f", "a"), ("b", "f")], &[]);
        let neighborhood = select_neighborhood(&links, &chain_index(), "f", 0, false);
        assert_eq!(neighborhood.nodes, vec!["f"]);
        assert!(neighborhood.edges.is_empty());
    }

    #[test]
    fn depth_one_follows_both_directions_and_filters_edges() {
        let links = links(&[("f", "a"), ("b", "f"), ("a", "c"), ("a", "b")], &[]);
        let neighborhood = select_neighborhood(&links, &chain_index(), "f", 1, false);
        assert_eq!(sorted(&neighborhood), vec!["a", "b", "f"]);
        assert_eq!(neighborhood.edges.len(), 3);
        assert!(neighborhood.index_of("c").is_none());
    }

    #[test]
    fn nodes_reached_twice_appear_once() {
        let links = links(&[("f", "a"), ("f", "b"), ("a", "c"), ("b", "c")], &[]);
        let neighborhood = select_neighborhood(&links, &chain_index(), "f", 5, false);
        assert_eq!(sorted(&neighborhood), vec!["a", "b", "c", "f"]);
    }

    #[test]
    fn unbounded_depth_selects_every_page_and_tag() {
        let links = links(&[("a", "tags/x")], &["tags/x"]);
        let with_tags = select_neighborhood(&links, &chain_index(), "f", -1, true);
        assert_eq!(
            sorted(&with_tags),
            vec!["a", "b", "c", "f", "lonely", "tags/x"]
        );
        assert_eq!(with_tags.edges.len(), 1);

        let without_tags = select_neighborhood(&links, &chain_index(), "missing", -1, false);
        assert_eq!(sorted(&without_tags), vec!["a", "b", "c", "f", "lonely"]);
        assert!(without_tags.edges.is_empty());
    }

    #[test]
    fn degree_counts_visible_edges() {
        let links = links(&[("f", "a"), ("f", "b")], &[]);
        let neighborhood = select_neighborhood(&links, &chain_index(), "f", 1, false);
        let degree = neighborhood.degree();
        assert_eq!(degree[neighborhood.index_of("f").unwrap()], 2);
        assert_eq!(degree[neighborhood.index_of("a").unwrap()], 1);
    }
}
