//! Change notifications published by [`SubtitleStore`](crate::SubtitleStore).
//!
//! Events carry no payload beyond what changed; subscribers read the new
//! values from the store. A lagging receiver only loses intermediate
//! notifications, never state.

/// Broadcast channel capacity for store events.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    ProjectsChanged,
    CurrentProjectChanged,
    SubtitlesChanged,
    StylesChanged,
    ExportsChanged,
    /// The loading indicator flipped.
    LoadingChanged(bool),
    /// The shared error slot was written or cleared.
    ErrorChanged(Option<String>),
    /// Fraction of the current upload sent so far, in `[0, 1]`.
    UploadProgress { fraction: f64 },
}
