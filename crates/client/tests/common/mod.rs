use axum::Router;
use subtitler_client::{ApiClient, ClientConfig, SubtitleApi};

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake API server");
    });
    format!("http://{addr}")
}

/// Build a typed API client against a fake server, with small upload chunks
/// so progress is reported several times.
pub fn api_for(base_url: &str) -> SubtitleApi {
    let config = ClientConfig {
        base_url: base_url.to_string(),
        request_timeout: None,
        upload_chunk_bytes: 1024,
    };
    SubtitleApi::new(ApiClient::new(&config).expect("client builds"))
}

pub fn project_json(id: i64, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": format!("Project {id}"),
        "description": "",
        "status": status,
        "language": "en",
        "subtitle_count": 0,
        "is_processing": status == "processing",
        "is_completed": status == "completed",
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-01T10:00:00Z"
    })
}

pub fn entry_json(id: i64, start: f64, end: f64, text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "project": 1,
        "project_name": "Project 1",
        "start_time": start,
        "end_time": end,
        "text": text,
        "language": "en",
        "confidence": 0.9,
        "is_edited": false
    })
}
