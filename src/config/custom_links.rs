use serde::{Deserialize, Serialize};

use crate::content::{CUSTOM_LINKS_PATH, DocumentSource};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPair {
    pub source: String,
    pub target: String,
}

/// User-curated additions and removals applied on top of the derived links.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomLinkConfig {
    #[serde(default)]
    pub links: Vec<LinkPair>,
    #[serde(default)]
    pub excluded_links: Vec<LinkPair>,
}

impl CustomLinkConfig {
    pub fn load(source: &DocumentSource) -> Self {
        source.fetch_json_or_default(CUSTOM_LINKS_PATH)
    }
}
