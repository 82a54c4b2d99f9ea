use std::collections::HashSet;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

use super::record::{ContentIndex, ContentRecord, SourceDescriptor, SourceKind};
use crate::util::normalize_slug;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContentDetails {
    #[serde(default)]
    title: String,
    #[serde(default)]
    display_title: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    links: Vec<String>,
    #[serde(default)]
    source: Option<RawSource>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSource {
    #[serde(rename = "type")]
    kind: SourceKind,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    channel_id: Option<String>,
    #[serde(default)]
    author_id: Option<String>,
    #[serde(default)]
    domain: Option<String>,
}

pub(super) fn parse_content_index(raw: &str) -> Result<ContentIndex> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in content index")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("content index must be a JSON object keyed by slug"))?;

    let mut records = Vec::with_capacity(object.len());
    for (key, value) in object {
        let Ok(details) = RawContentDetails::deserialize(value) else {
            tracing::debug!("skipping malformed content index entry {key}");
            continue;
        };
        records.push(into_record(normalize_slug(key), details));
    }

    Ok(ContentIndex::from_records(records))
}

fn into_record(slug: String, details: RawContentDetails) -> ContentRecord {
    let mut seen_tags = HashSet::new();
    let tags = details
        .tags
        .into_iter()
        .map(|tag| tag.trim().to_owned())
        .filter(|tag| !tag.is_empty() && seen_tags.insert(tag.clone()))
        .collect();

    let mut links = details
        .links
        .iter()
        .map(|link| normalize_slug(link))
        .filter(|link| link != &slug)
        .collect::<Vec<_>>();
    links.sort();
    links.dedup();

    let source = details.source.map(|raw| SourceDescriptor {
        kind: raw.kind,
        url: raw.url,
        channel_id: raw.channel_id,
        author_id: raw.author_id,
        domain: raw.domain,
    });

    ContentRecord {
        slug,
        title: details.title,
        display_title: details.display_title,
        tags,
        links,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "skill-tree/chat-ai/index": {
            "title": "対話型AI",
            "tags": ["対話型AI", "skill-tree", "対話型AI"],
            "links": ["skill-tree/chat-ai/chatgpt", "skill-tree/chat-ai/index"],
            "filePath": "content/skill-tree/chat-ai/index.md",
            "content": "..."
        },
        "skill-tree/chat-ai/chatgpt": {
            "title": "ChatGPT",
            "displayTitle": "ChatGPT 入門",
            "tags": ["ChatGPT"],
            "links": [],
            "source": {"type": "youtube", "url": "https://youtu.be/x", "channelId": "UC123"}
        },
        "notes/manual": {
            "title": "Manual",
            "source": {"type": "manual", "url": "https://example.com"}
        },
        "broken": "not an object"
    }"#;

    #[test]
    fn parses_records_and_skips_malformed_entries() {
        let index = parse_content_index(SAMPLE).unwrap();
        assert_eq!(index.len(), 3);
        assert!(!index.contains("broken"));

        let category = index.get("skill-tree/chat-ai/index").unwrap();
        assert_eq!(category.tags, vec!["対話型AI", "skill-tree"]);
        assert_eq!(category.links, vec!["skill-tree/chat-ai/chatgpt"]);

        let page = index.get("skill-tree/chat-ai/chatgpt").unwrap();
        assert_eq!(page.label(), "ChatGPT 入門");
        let source = page.source.as_ref().unwrap();
        assert_eq!(source.kind, SourceKind::Youtube);
        assert_eq!(source.instance_id(), Some("UC123"));

        let manual = index.get("notes/manual").unwrap();
        assert_eq!(manual.source.as_ref().unwrap().kind, SourceKind::Other);
    }

    #[test]
    fn rejects_non_object_documents() {
        assert!(parse_content_index("[]").is_err());
        assert!(parse_content_index("{").is_err());
    }
}
