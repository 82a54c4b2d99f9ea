use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::util::HOME_SLUG;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Youtube,
    Note,
    X,
    Blog,
    #[serde(other)]
    Other,
}

impl SourceKind {
    pub const CONFIGURABLE: [SourceKind; 4] = [Self::Youtube, Self::Note, Self::X, Self::Blog];

    pub fn label(self) -> &'static str {
        match self {
            Self::Youtube => "YouTube",
            Self::Note => "note",
            Self::X => "X",
            Self::Blog => "Blog",
            Self::Other => "Other",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub kind: SourceKind,
    pub url: Option<String>,
    pub channel_id: Option<String>,
    pub author_id: Option<String>,
    pub domain: Option<String>,
}

impl SourceDescriptor {
    /// The per-type instance key: channel for YouTube, author for note and X,
    /// domain for blogs (taken from the URL host when no domain was recorded).
    pub fn instance_id(&self) -> Option<&str> {
        let id = match self.kind {
            SourceKind::Youtube => self.channel_id.as_deref(),
            SourceKind::Note | SourceKind::X => self.author_id.as_deref(),
            SourceKind::Blog => self
                .domain
                .as_deref()
                .filter(|domain| !domain.is_empty())
                .or_else(|| self.url.as_deref().and_then(url_host)),
            SourceKind::Other => None,
        };
        id.filter(|id| !id.is_empty())
    }
}

fn url_host(url: &str) -> Option<&str> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let host = rest.split(['/', '?', '#']).next()?;
    let host = host.rsplit('@').next()?.split(':').next()?;
    Some(host.strip_prefix("www.").unwrap_or(host))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentRecord {
    pub slug: String,
    pub title: String,
    pub display_title: Option<String>,
    pub tags: Vec<String>,
    pub links: Vec<String>,
    pub source: Option<SourceDescriptor>,
}

impl ContentRecord {
    pub fn label(&self) -> &str {
        self.display_title
            .as_deref()
            .filter(|title| !title.is_empty())
            .or(Some(self.title.as_str()).filter(|title| !title.is_empty()))
            .unwrap_or(&self.slug)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ContentIndex {
    records: BTreeMap<String, ContentRecord>,
}

impl ContentIndex {
    pub fn from_records(records: impl IntoIterator<Item = ContentRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.slug.clone(), record))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, slug: &str) -> Option<&ContentRecord> {
        self.records.get(slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.records.contains_key(slug)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContentRecord)> {
        self.records
            .iter()
            .map(|(slug, record)| (slug.as_str(), record))
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Resolves a link target to a known slug. Folder links (`a/b`) fall back to
    /// their index page (`a/b/index`) and the empty link to the home page.
    pub fn resolve<'a>(&'a self, link: &str) -> Option<&'a str> {
        let link = link.trim().trim_matches('/');
        if link.is_empty() {
            return self
                .records
                .get_key_value(HOME_SLUG)
                .map(|(slug, _)| slug.as_str());
        }

        if let Some((slug, _)) = self.records.get_key_value(link) {
            return Some(slug.as_str());
        }

        self.records
            .get_key_value(&format!("{link}/index"))
            .map(|(slug, _)| slug.as_str())
    }
}

#[cfg(test)]
pub(crate) fn record(slug: &str, tags: &[&str], links: &[&str]) -> ContentRecord {
    ContentRecord {
        slug: slug.to_owned(),
        title: slug.to_owned(),
        display_title: None,
        tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
        links: links.iter().map(|link| (*link).to_owned()).collect(),
        source: None,
    }
}
