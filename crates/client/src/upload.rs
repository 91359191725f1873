//! Multipart upload bodies with progress reporting.
//!
//! The file part is streamed to the transport in chunks; every chunk the
//! transport pulls advances the progress fraction. Progress is only ever
//! reported when the total size is known up front.

use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};
use reqwest::multipart::{Form, Part};

use crate::error::ApiError;

/// Progress callback, invoked with the transferred fraction in `[0, 1]`.
pub type ProgressFn = Arc<dyn Fn(f64) + Send + Sync>;

/// Where the bytes of an uploaded file come from.
pub enum UploadSource {
    /// Fully buffered content. The total size is always known.
    Bytes(Bytes),
    /// Streamed content, with its length if the caller knows it.
    Stream {
        stream: BoxStream<'static, Result<Bytes, std::io::Error>>,
        length: Option<u64>,
    },
}

impl UploadSource {
    pub fn length(&self) -> Option<u64> {
        match self {
            Self::Bytes(bytes) => Some(bytes.len() as u64),
            Self::Stream { length, .. } => *length,
        }
    }
}

/// The file part of a multipart upload.
pub struct UploadFile {
    /// Form field name, e.g. `video_file`.
    pub field: String,
    pub file_name: String,
    pub mime: Option<String>,
    pub source: UploadSource,
}

/// Multipart form data: text fields plus at most one file.
///
/// Built by the caller; the gateway does not validate file type or size.
#[derive(Default)]
pub struct UploadForm {
    fields: Vec<(String, String)>,
    file: Option<UploadFile>,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(mut self, file: UploadFile) -> Self {
        self.file = Some(file);
        self
    }

    /// Form for a new subtitle project: `video_file` plus `name` and
    /// `language`.
    pub fn video(
        name: impl Into<String>,
        language: impl Into<String>,
        file_name: impl Into<String>,
        content: Bytes,
    ) -> Self {
        Self::new()
            .text("name", name)
            .text("language", language)
            .file(UploadFile {
                field: "video_file".to_string(),
                file_name: file_name.into(),
                mime: None,
                source: UploadSource::Bytes(content),
            })
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Convert into a reqwest multipart form whose file part reports
    /// progress through `on_progress`.
    pub(crate) fn into_multipart(
        self,
        chunk_bytes: usize,
        on_progress: Option<ProgressFn>,
    ) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }

        if let Some(file) = self.file {
            let length = file.source.length();
            let stream = match file.source {
                UploadSource::Bytes(bytes) => chunked(bytes, chunk_bytes).boxed(),
                UploadSource::Stream { stream, .. } => stream,
            };
            let body = reqwest::Body::wrap_stream(track_progress(stream, length, on_progress));

            let mut part = match length {
                Some(len) => Part::stream_with_length(body, len),
                None => Part::stream(body),
            };
            part = part.file_name(file.file_name);
            if let Some(mime) = file.mime {
                part = part.mime_str(&mime)?;
            }
            form = form.part(file.field, part);
        }

        Ok(form)
    }
}

/// Split buffered content into chunks of at most `chunk_bytes`.
fn chunked(
    bytes: Bytes,
    chunk_bytes: usize,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
    let chunk_bytes = chunk_bytes.max(1);
    let len = bytes.len();
    stream::iter(
        (0..len)
            .step_by(chunk_bytes)
            .map(move |start| Ok(bytes.slice(start..(start + chunk_bytes).min(len)))),
    )
}

/// Report `sent / total` after every chunk the transport pulls.
///
/// Only the file part is counted: the text fields and multipart framing
/// are not part of `total`, so the fraction runs slightly ahead of the
/// bytes actually on the wire. Without a known, non-zero total the
/// callback is never invoked.
fn track_progress<S>(
    stream: S,
    total: Option<u64>,
    on_progress: Option<ProgressFn>,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static,
{
    let reporter = match (total, on_progress) {
        (Some(total), Some(callback)) if total > 0 => Some((total, callback)),
        _ => None,
    };
    let mut sent: u64 = 0;

    stream.inspect_ok(move |chunk| {
        if let Some((total, callback)) = &reporter {
            sent += chunk.len() as u64;
            callback((sent as f64 / *total as f64).min(1.0));
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn recorder() -> (ProgressFn, Arc<Mutex<Vec<f64>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ProgressFn = Arc::new(move |fraction: f64| sink.lock().unwrap().push(fraction));
        (callback, seen)
    }

    #[tokio::test]
    async fn chunked_covers_all_bytes() {
        let chunks: Vec<Bytes> = chunked(Bytes::from_static(b"abcdefghij"), 4)
            .try_collect()
            .await
            .unwrap();
        assert_eq!(chunks, vec![
            Bytes::from_static(b"abcd"),
            Bytes::from_static(b"efgh"),
            Bytes::from_static(b"ij"),
        ]);
    }

    #[tokio::test]
    async fn progress_reaches_one_when_total_known() {
        let (callback, seen) = recorder();
        let stream = track_progress(chunked(Bytes::from(vec![0u8; 10]), 4), Some(10), Some(callback));
        let _: Vec<Bytes> = stream.try_collect().await.unwrap();

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen, vec![0.4, 0.8, 1.0]);
    }

    #[tokio::test]
    async fn progress_silent_without_total() {
        let (callback, seen) = recorder();
        let stream = track_progress(chunked(Bytes::from(vec![0u8; 10]), 4), None, Some(callback));
        let _: Vec<Bytes> = stream.try_collect().await.unwrap();
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn progress_silent_for_empty_file() {
        let (callback, seen) = recorder();
        let stream = track_progress(chunked(Bytes::new(), 4), Some(0), Some(callback));
        let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();
        assert!(chunks.is_empty());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn video_form_has_expected_fields() {
        let form = UploadForm::video("Talk", "en", "talk.mp4", Bytes::from_static(b"x"));
        assert_eq!(form.fields(), &[
            ("name".to_string(), "Talk".to_string()),
            ("language".to_string(), "en".to_string()),
        ]);
        assert_eq!(form.file.as_ref().map(|f| f.field.as_str()), Some("video_file"));
    }
}
