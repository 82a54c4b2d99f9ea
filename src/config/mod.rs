mod categories;
mod custom_links;
mod graph;

pub use categories::{CategoryConfig, Hsl, NodeShape};
pub use custom_links::CustomLinkConfig;
#[cfg(test)]
pub use custom_links::LinkPair;
pub use graph::GraphConfig;
