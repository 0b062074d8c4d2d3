//! JSON HTTP API.
//!
//! API endpoints:
//! - POST /register - enroll `{username, email, embedding | image}`
//! - POST /login    - identify `{embedding | image}`
//! - GET  /healthz  - `{enrolled}`
//!
//! `embedding` is a float array. `image` is base64 of the bytes handed to
//! the embedder, optionally as a data URL (`data:...;base64,XXXX`).

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use base64::Engine as _;
use faceid_faceprint::{FaceGate, FaceprintError, NewIdentity};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

type AppState = Arc<FaceGate>;

/// Start the HTTP server.
pub async fn start_server(addr: &str, gate: FaceGate) -> Result<()> {
    let app = router(Arc::new(gate));

    let addr = parse_addr(addr)?;
    info!("Server started at http://{}", addr);
    info!("  - POST /register  Enroll a face");
    info!("  - POST /login     Identify a face");
    info!("  - GET  /healthz   Enrolled count");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn parse_addr(addr: &str) -> Result<SocketAddr> {
    let addr = if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    };
    Ok(addr.parse()?)
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    embedding: Option<Vec<f32>>,
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    embedding: Option<Vec<f32>>,
    image: Option<String>,
}

enum Face {
    Vector(Vec<f32>),
    Image(Vec<u8>),
}

/// JSON error response.
struct ApiError {
    status: StatusCode,
    body: serde_json::Value,
}

impl ApiError {
    fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: json!({ "error": msg }),
        }
    }

    fn internal(msg: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: json!({ "error": format!("server error: {msg}") }),
        }
    }
}

impl From<FaceprintError> for ApiError {
    fn from(e: FaceprintError) -> Self {
        match e {
            // The matched identity is logged by the engine, not shown to the registrant.
            FaceprintError::DuplicateFace { .. } => {
                Self::bad_request("this face is already registered to another user")
            }
            FaceprintError::AlreadyExists(_) => Self::bad_request("user already exists"),
            FaceprintError::DimensionMismatch { expected, got } => Self::bad_request(&format!(
                "embedding must have {expected} values, got {got}"
            )),
            FaceprintError::DegenerateVector => Self::bad_request("embedding is all zeros"),
            FaceprintError::NonFiniteVector => {
                Self::bad_request("embedding must contain only finite numbers")
            }
            FaceprintError::Embed(e) => Self::bad_request(&e.to_string()),
            FaceprintError::NotRecognized { closest } => Self {
                status: StatusCode::UNAUTHORIZED,
                body: json!({
                    "error": "face not recognized or confidence too low",
                    "distance": closest,
                }),
            },
            FaceprintError::NotFound(_) => Self {
                status: StatusCode::UNAUTHORIZED,
                body: json!({ "error": "face not recognized or confidence too low" }),
            },
            FaceprintError::Store(msg) => {
                error!(error = %msg, "storage failure");
                Self::internal(msg)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn decode_image(data: &str) -> Result<Vec<u8>, ApiError> {
    // Data URLs carry the payload after the first comma.
    let payload = match data.split_once(',') {
        Some((_, b64)) => b64,
        None => data,
    };
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| ApiError::bad_request(&format!("invalid image encoding: {e}")))
}

fn face_of(embedding: Option<Vec<f32>>, image: Option<String>) -> Result<Face, ApiError> {
    match (embedding, image) {
        (Some(v), _) => Ok(Face::Vector(v)),
        (None, Some(img)) if !img.is_empty() => Ok(Face::Image(decode_image(&img)?)),
        _ => Err(ApiError::bad_request("missing fields")),
    }
}

/// Runs the synchronous engine off the async runtime.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, FaceprintError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(ApiError::internal)?
        .map_err(ApiError::from)
}

async fn register(
    State(gate): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.username.is_empty() || req.email.is_empty() {
        return Err(ApiError::bad_request("missing fields"));
    }
    let face = face_of(req.embedding, req.image)?;
    let attrs = NewIdentity {
        username: req.username,
        email: req.email,
    };
    let id = blocking(move || match face {
        Face::Vector(v) => gate.register(&attrs, &v),
        Face::Image(bytes) => gate.register_image(&attrs, &bytes),
    })
    .await?;
    Ok(Json(json!({
        "success": "face registered",
        "identity": id,
    })))
}

async fn login(
    State(gate): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let face = face_of(req.embedding, req.image)?;
    let account = blocking(move || match face {
        Face::Vector(v) => gate.authenticate(&v),
        Face::Image(bytes) => gate.authenticate_image(&bytes),
    })
    .await?;
    Ok(Json(json!({
        "success": format!("welcome, {}!", account.username),
        "identity": account.id,
        "username": account.username,
    })))
}

async fn healthz(State(gate): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let enrolled = blocking(move || gate.enrolled()).await?;
    Ok(Json(json!({ "enrolled": enrolled })))
}
