mod bus;
mod sources;
mod storage;
mod visited;

pub use self::bus::{FilterBus, FilterSubscription};
#[cfg(test)]
pub use self::sources::SourceEntry;
pub use self::sources::{SettingsStore, SourceSettings};
pub use self::storage::{FileStore, KeyValueStore, MemoryStore};
pub use self::visited::VisitedSet;
