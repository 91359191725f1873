//! HTTP gateway to the subtitle service.
//!
//! [`ApiClient`] is the thin transport wrapper: it prefixes the configured
//! base URL, sends JSON, turns non-2xx responses into [`ApiError::Http`] and
//! reports upload progress. [`SubtitleApi`] layers typed endpoint methods on
//! top of it.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod paths;
pub mod upload;

pub use api::SubtitleApi;
pub use config::ClientConfig;
pub use error::ApiError;
pub use gateway::{ApiClient, Artifact};
pub use upload::{ProgressFn, UploadFile, UploadForm, UploadSource};
