mod collect;
mod fetch;
mod parse;
mod record;

pub use self::collect::{SceneInputs, collect_scene_inputs};
pub use self::fetch::{CATEGORIES_PATH, CUSTOM_LINKS_PATH, DocumentSource, SOURCES_PATH};
#[cfg(test)]
pub(crate) use self::record::{SourceDescriptor, record};
pub use self::record::{ContentIndex, ContentRecord, SourceKind};
