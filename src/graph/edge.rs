use std::collections::HashSet;

/// Undirected edge identity: the endpoint pair in sorted order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    low: String,
    high: String,
}

impl EdgeKey {
    /// Returns `None` for a self-loop.
    pub fn new(a: &str, b: &str) -> Option<Self> {
        match a.cmp(b) {
            std::cmp::Ordering::Less => Some(Self {
                low: a.to_owned(),
                high: b.to_owned(),
            }),
            std::cmp::Ordering::Greater => Some(Self {
                low: b.to_owned(),
                high: a.to_owned(),
            }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn endpoints(&self) -> (&str, &str) {
        (&self.low, &self.high)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeOrigin {
    Explicit,
    TagNode,
    TagDerived,
    SourceDerived,
    Custom,
}

impl EdgeOrigin {
    #[cfg(test)]
    pub fn is_automatic(self) -> bool {
        matches!(self, Self::TagDerived | Self::SourceDerived)
    }
}

/// Insertion-ordered edge collection that keeps the first origin seen per key.
#[derive(Clone, Debug, Default)]
pub struct EdgeSet {
    entries: Vec<(EdgeKey, EdgeOrigin)>,
    keys: HashSet<EdgeKey>,
}

impl EdgeSet {
    pub fn insert(&mut self, key: EdgeKey, origin: EdgeOrigin) -> bool {
        if !self.keys.insert(key.clone()) {
            return false;
        }
        self.entries.push((key, origin));
        true
    }

    pub fn contains(&self, key: &EdgeKey) -> bool {
        self.keys.contains(key)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&EdgeKey) -> bool) {
        let keys = &mut self.keys;
        self.entries.retain(|(key, _)| {
            let kept = keep(key);
            if !kept {
                keys.remove(key);
            }
            kept
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EdgeKey, EdgeOrigin)> {
        self.entries.iter().map(|(key, origin)| (key, *origin))
    }

    pub fn into_keys(self) -> Vec<EdgeKey> {
        self.entries.into_iter().map(|(key, _)| key).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_order_independent_and_rejects_self_loops() {
        assert_eq!(EdgeKey::new("b", "a"), EdgeKey::new("a", "b"));
        assert_eq!(EdgeKey::new("a", "a"), None);
        assert_eq!(EdgeKey::new("b", "a").unwrap().endpoints(), ("a", "b"));
    }

    #[test]
    fn set_keeps_first_origin_and_supports_removal() {
        let mut edges = EdgeSet::default();
        let key = EdgeKey::new("a", "b").unwrap();
        assert!(edges.insert(key.clone(), EdgeOrigin::Explicit));
        assert!(!edges.insert(key.clone(), EdgeOrigin::Custom));
        assert_eq!(edges.iter().next(), Some((&key, EdgeOrigin::Explicit)));

        edges.retain(|candidate| candidate != &key);
        assert!(edges.is_empty());
        assert!(!edges.contains(&key));
        assert!(edges.insert(key, EdgeOrigin::Custom));
    }
}
