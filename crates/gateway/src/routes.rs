use crate::state::AppState;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::time::Instant;
use tower_http::{cors::CorsLayer, services::ServeDir};

const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

pub fn app(state: AppState) -> Router {
    let outputs = ServeDir::new(state.store.dir());

    Router::new()
        .route("/", get(health))
        .route("/api/depth", post(create_depth_map))
        .nest_service("/outputs", outputs)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "depth service is running",
    })
}

#[derive(Serialize)]
struct DepthResponse {
    depth_map_url: String,
    focal_length_px: f32,
    processing_time_ms: u64,
}

pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiError::Internal(detail) => (StatusCode::INTERNAL_SERVER_ERROR, detail),
        };
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

async fn create_depth_map(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<DepthResponse>, ApiError> {
    let start = Instant::now();

    let mut payload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        // Advisory content-type check; decoding is the real gate.
        if let Some(content_type) = field.content_type()
            && !content_type.starts_with("image/")
        {
            return Err(ApiError::BadRequest("File must be an image".to_string()));
        }
        payload = Some(
            field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        );
        break;
    }
    let payload = payload.ok_or_else(|| ApiError::BadRequest("Missing `file` field".to_string()))?;

    let pipeline = state.pipeline.clone();
    let store = state.store.clone();

    // Inference is CPU/accelerator bound; keep it off the async workers.
    let result = tokio::task::spawn_blocking(move || {
        let generated = pipeline.generate(&payload)?;
        let filename = store.save(&generated.image)?;
        Ok::<_, depth::DepthError>((generated, filename))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("depth task failed: {e}")))?;

    let (generated, filename) = match result {
        Ok(pair) => pair,
        Err(err @ depth::DepthError::Decode(_)) => {
            return Err(ApiError::BadRequest(err.to_string()));
        }
        Err(err) => {
            return Err(ApiError::Internal(format!(
                "Failed to generate depth map: {err}"
            )));
        }
    };

    tracing::info!(
        backend = generated.backend,
        filename = %filename,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "depth request served"
    );

    Ok(Json(DepthResponse {
        depth_map_url: format!("/outputs/{filename}"),
        focal_length_px: generated.focal_length_px,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header};
    use depth::backend::luminance::LuminanceBackend;
    use depth::{DepthPipeline, OutputStore};
    use http_body_util::BodyExt;
    use image::RgbImage;
    use std::io::Cursor;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app(outputs_dir: &std::path::Path) -> Router {
        let state = AppState {
            pipeline: Arc::new(DepthPipeline::new(vec![Arc::new(
                LuminanceBackend::default(),
            )])),
            store: Arc::new(OutputStore::open(outputs_dir).unwrap()),
        };
        app(state)
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, image::Rgb([255, 0, 0]));
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn multipart_request(
        field_name: &str,
        content_type: &str,
        payload: &[u8],
    ) -> Request<Body> {
        let boundary = "test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{field_name}\"; \
                 filename=\"input.png\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/depth")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn health_route_responds() {
        let tmp = tempfile::tempdir().unwrap();
        let response = test_app(tmp.path())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn upload_returns_depth_map_metadata() {
        let tmp = tempfile::tempdir().unwrap();
        let response = test_app(tmp.path())
            .oneshot(multipart_request("file", "image/png", &png_bytes(20, 20)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        let url = json["depth_map_url"].as_str().unwrap();
        assert!(url.starts_with("/outputs/depth_"));
        assert_eq!(json["focal_length_px"].as_f64().unwrap(), 10.0);

        let filename = url.strip_prefix("/outputs/").unwrap();
        assert!(tmp.path().join(filename).is_file());
    }

    #[tokio::test]
    async fn non_image_content_type_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let response = test_app(tmp.path())
            .oneshot(multipart_request("file", "text/plain", b"hello"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn undecodable_payload_is_a_bad_request() {
        let tmp = tempfile::tempdir().unwrap();
        let response = test_app(tmp.path())
            .oneshot(multipart_request("file", "image/png", b"not a png"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json["detail"].as_str().unwrap().contains("decode"));
    }

    #[tokio::test]
    async fn missing_file_field_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let response = test_app(tmp.path())
            .oneshot(multipart_request("other", "image/png", &png_bytes(4, 4)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
