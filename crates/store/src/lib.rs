//! Client-side state synchronization for the subtitle editor.
//!
//! [`SubtitleStore`] keeps in-memory copies of projects, subtitle entries,
//! styles and exports consistent with the remote subtitle service. The
//! service is authoritative; the store applies its responses to local
//! collections and notifies subscribers through a broadcast channel.
//!
//! Local-only UI state (themes and settings) lives in [`ThemeStore`] and
//! [`SettingsStore`], persisted through a [`KeyValueStorage`].

pub mod backend;
pub mod collection;
pub mod config;
pub mod events;
pub mod generation;
pub mod operation;
pub mod options;
pub mod selectors;
pub mod settings_store;
pub mod state;
pub mod storage;
pub mod store;
pub mod theme_store;
pub mod watch;

pub use backend::SubtitleBackend;
pub use events::StoreEvent;
pub use options::{MergePolicy, RefetchPolicy, StoreOptions};
pub use settings_store::SettingsStore;
pub use state::StoreState;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{SubtitleStore, SyncOutcome, Synced};
pub use theme_store::ThemeStore;
