//! Domain types shared by the subtitle client and state store.
//!
//! Everything here is a plain value received from (or sent to) the remote
//! subtitle service, plus the theme and settings documents the UI persists
//! locally. No I/O happens in this crate.

pub mod error;
pub mod export;
pub mod project;
pub mod settings;
pub mod style;
pub mod subtitle;
pub mod theme;
pub mod types;
