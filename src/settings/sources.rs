use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::content::{DocumentSource, SOURCES_PATH, SourceKind};

use super::bus::{FilterBus, FilterSubscription};
use super::storage::KeyValueStore;

const SOURCE_SETTINGS_KEY: &str = "source-settings";

macro_rules! instance_group {
    ($name:ident, $field:ident) => {
        #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
        #[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
        pub struct $name<T> {
            #[serde(default)]
            pub $field: BTreeMap<String, T>,
        }

        impl<T> Default for $name<T> {
            fn default() -> Self {
                Self {
                    $field: BTreeMap::new(),
                }
            }
        }
    };
}

instance_group!(Channels, channels);
instance_group!(Authors, authors);
instance_group!(Users, users);
instance_group!(Domains, domains);

/// Per-type source instances, shaped like `sources.json`. Missing groups read
/// as empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: Deserialize<'de>"
))]
pub struct SourceGroups<T> {
    #[serde(default)]
    pub youtube: Channels<T>,
    #[serde(default)]
    pub note: Authors<T>,
    #[serde(default)]
    pub x: Users<T>,
    #[serde(default)]
    pub blog: Domains<T>,
}

impl<T> Default for SourceGroups<T> {
    fn default() -> Self {
        Self {
            youtube: Channels::default(),
            note: Authors::default(),
            x: Users::default(),
            blog: Domains::default(),
        }
    }
}

impl<T> SourceGroups<T> {
    pub fn instances(&self, kind: SourceKind) -> Option<&BTreeMap<String, T>> {
        match kind {
            SourceKind::Youtube => Some(&self.youtube.channels),
            SourceKind::Note => Some(&self.note.authors),
            SourceKind::X => Some(&self.x.users),
            SourceKind::Blog => Some(&self.blog.domains),
            SourceKind::Other => None,
        }
    }

    pub fn instances_mut(&mut self, kind: SourceKind) -> Option<&mut BTreeMap<String, T>> {
        match kind {
            SourceKind::Youtube => Some(&mut self.youtube.channels),
            SourceKind::Note => Some(&mut self.note.authors),
            SourceKind::X => Some(&mut self.x.users),
            SourceKind::Blog => Some(&mut self.blog.domains),
            SourceKind::Other => None,
        }
    }

    pub fn get(&self, kind: SourceKind, id: &str) -> Option<&T> {
        self.instances(kind).and_then(|instances| instances.get(id))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

pub type SourceSettings = SourceGroups<SourceEntry>;

impl SourceSettings {
    /// Instances missing from the settings are treated as enabled.
    pub fn is_enabled(&self, kind: SourceKind, id: &str) -> bool {
        self.get(kind, id).is_none_or(|entry| entry.enabled)
    }

    pub fn color_for(&self, kind: SourceKind, id: &str) -> Option<&str> {
        self.get(kind, id)
            .filter(|entry| entry.enabled && !entry.color.is_empty())
            .map(|entry| entry.color.as_str())
    }

    fn enabled_flags(&self) -> SourceGroups<bool> {
        let mut flags = SourceGroups::default();
        for kind in SourceKind::CONFIGURABLE {
            let (Some(entries), Some(target)) = (self.instances(kind), flags.instances_mut(kind))
            else {
                continue;
            };
            for (id, entry) in entries {
                target.insert(id.clone(), entry.enabled);
            }
        }
        flags
    }
}

/// Persisted overrides come either as plain booleans or as full entries
/// written by older builds.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
enum OverrideFlag {
    Flag(bool),
    Entry { enabled: bool },
}

impl OverrideFlag {
    fn enabled(self) -> bool {
        match self {
            Self::Flag(enabled) | Self::Entry { enabled } => enabled,
        }
    }
}

/// Source enablement: the build-time `sources.json` with the user's persisted
/// switches merged on top.
#[derive(Clone)]
pub struct SettingsStore {
    storage: Arc<dyn KeyValueStore>,
    bus: FilterBus,
}

impl SettingsStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, bus: FilterBus) -> Self {
        Self { storage, bus }
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    pub fn subscribe(&self) -> FilterSubscription {
        self.bus.subscribe()
    }

    pub fn load(&self, source: &DocumentSource) -> SourceSettings {
        let base = source.fetch_json_or_default::<SourceSettings>(SOURCES_PATH);
        self.load_from_base(base)
    }

    pub fn load_from_base(&self, mut base: SourceSettings) -> SourceSettings {
        let Some(overrides) = self.read_overrides() else {
            return base;
        };

        for kind in SourceKind::CONFIGURABLE {
            let (Some(entries), Some(flags)) = (base.instances_mut(kind), overrides.instances(kind))
            else {
                continue;
            };
            for (id, flag) in flags {
                if let Some(entry) = entries.get_mut(id) {
                    entry.enabled = flag.enabled();
                }
            }
        }
        base
    }

    /// Persists the enabled flags only; names and colours always come from the
    /// build-time document.
    pub fn save(&self, settings: &SourceSettings) -> Result<()> {
        let raw = serde_json::to_string(&settings.enabled_flags())
            .context("failed to encode source settings")?;
        self.storage
            .set(SOURCE_SETTINGS_KEY, &raw)
            .context("failed to persist source settings")
    }

    /// Flips one instance, persists the result and notifies subscribers.
    /// Returns `false` when the instance is unknown.
    pub fn toggle(
        &self,
        settings: &mut SourceSettings,
        kind: SourceKind,
        id: &str,
        enabled: bool,
    ) -> Result<bool> {
        let Some(entry) = settings
            .instances_mut(kind)
            .and_then(|entries| entries.get_mut(id))
        else {
            return Ok(false);
        };
        entry.enabled = enabled;

        self.save(settings)?;
        tracing::info!("source {} {id} enabled={enabled}", kind.label());
        self.bus.publish();
        Ok(true)
    }

    fn read_overrides(&self) -> Option<SourceGroups<OverrideFlag>> {
        let raw = match self.storage.get(SOURCE_SETTINGS_KEY) {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::warn!("failed to read source settings: {err:#}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(overrides) => Some(overrides),
            Err(err) => {
                tracing::warn!("ignoring corrupt source settings: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemoryStore;

    const BASE: &str = r##"{
        "youtube": {"channels": {
            "UC1": {"name": "First", "color": "#ff0000", "enabled": true},
            "UC2": {"name": "Second", "color": "#00ff00", "enabled": false}
        }},
        "note": {"authors": {"alice": {"name": "Alice", "color": "#0000ff", "enabled": true}}}
    }"##;

    fn base() -> SourceSettings {
        serde_json::from_str(BASE).unwrap()
    }

    fn store() -> SettingsStore {
        SettingsStore::new(Arc::new(MemoryStore::default()), FilterBus::default())
    }

    #[test]
    fn instance_groups_accept_values_without_default() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Flag(bool);

        let empty: Users<Flag> = serde_json::from_str("{}").unwrap();
        assert!(empty.users.is_empty());
        let users: Users<Flag> = serde_json::from_str(r#"{"users":{"alice":true}}"#).unwrap();
        assert_eq!(users.users.get("alice"), Some(&Flag(true)));
    }

    #[test]
    fn missing_groups_read_as_empty() {
        let settings = base();
        assert!(settings.x.users.is_empty());
        assert!(settings.blog.domains.is_empty());
        assert_eq!(settings.color_for(SourceKind::Youtube, "UC1"), Some("#ff0000"));
        assert_eq!(settings.color_for(SourceKind::Youtube, "UC2"), None);
        assert!(settings.is_enabled(SourceKind::Blog, "example.com"));
    }

    #[test]
    fn save_and_reload_keeps_flags_and_build_time_metadata() {
        let store = store();
        let mut settings = base();
        settings.youtube.channels.get_mut("UC1").unwrap().enabled = false;
        settings.youtube.channels.get_mut("UC1").unwrap().name = "stale".to_owned();
        settings.note.authors.get_mut("alice").unwrap().color = "#999999".to_owned();
        store.save(&settings).unwrap();

        let reloaded = store.load_from_base(base());
        for kind in SourceKind::CONFIGURABLE {
            for (id, entry) in settings.instances(kind).unwrap() {
                assert_eq!(reloaded.get(kind, id).unwrap().enabled, entry.enabled);
            }
        }
        let first = reloaded.get(SourceKind::Youtube, "UC1").unwrap();
        assert_eq!(first.name, "First");
        assert_eq!(
            reloaded.get(SourceKind::Note, "alice").unwrap().color,
            "#0000ff"
        );
    }

    #[test]
    fn saved_document_holds_booleans_only() {
        let store = store();
        store.save(&base()).unwrap();
        let raw = store.storage().get(SOURCE_SETTINGS_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["youtube"]["channels"]["UC2"], serde_json::json!(false));
        assert_eq!(value["note"]["authors"]["alice"], serde_json::json!(true));
    }

    #[test]
    fn reads_legacy_entry_overrides() {
        let store = store();
        store
            .storage()
            .set(
                SOURCE_SETTINGS_KEY,
                r##"{"youtube":{"channels":{"UC2":{"name":"x","color":"#000","enabled":true}}},"note":{"authors":{"alice":false}}}"##,
            )
            .unwrap();

        let settings = store.load_from_base(base());
        assert!(settings.is_enabled(SourceKind::Youtube, "UC2"));
        assert!(!settings.is_enabled(SourceKind::Note, "alice"));
        assert_eq!(settings.get(SourceKind::Youtube, "UC2").unwrap().name, "Second");
    }

    #[test]
    fn corrupt_overrides_are_ignored() {
        let store = store();
        store.storage().set(SOURCE_SETTINGS_KEY, "[1,2").unwrap();
        assert_eq!(store.load_from_base(base()), base());
    }

    #[test]
    fn toggle_persists_and_notifies() {
        let store = store();
        let subscription = store.subscribe();
        let mut settings = base();

        assert!(store.toggle(&mut settings, SourceKind::Youtube, "UC2", true).unwrap());
        assert!(subscription.take_pending());
        assert!(store.load_from_base(base()).is_enabled(SourceKind::Youtube, "UC2"));

        assert!(!store.toggle(&mut settings, SourceKind::X, "nobody", true).unwrap());
        assert!(!subscription.take_pending());
    }

    #[test]
    fn load_falls_back_to_empty_groups_without_a_document() {
        let dir = tempfile::tempdir().unwrap();
        let source = DocumentSource::Directory(dir.path().to_path_buf());
        let settings = store().load(&source);
        assert_eq!(settings, SourceSettings::default());
    }
}
