use crate::http::{ApiError, AppState, Requester, UploadError};
use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use chrono::Utc;
use huddle_core::{Message, MessageId, RoomId, UserStatus};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub room: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub room: RoomId,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkReadResponse {
    pub ok: bool,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let room = match query.room.as_deref() {
        Some(raw) => RoomId::parse(raw)?,
        None => RoomId::global(),
    };

    Ok(Json(state.hub.history(&room, query.limit).await))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Requester(user): Requester,
) -> Result<Json<DeleteResponse>, ApiError> {
    state.hub.delete_message(&user, MessageId(id)).await?;

    Ok(Json(DeleteResponse {
        success: true,
        error: None,
    }))
}

/// Marks every message in `room` not sent by the requester as read.
///
/// The `x-huddle-user` header is trusted as given: the requester need not be
/// connected or a member of the room.
pub async fn mark_read(
    State(state): State<AppState>,
    Requester(user): Requester,
    Json(request): Json<MarkReadRequest>,
) -> Json<MarkReadResponse> {
    let count = state.hub.mark_read(&request.room, &user).await;
    Json(MarkReadResponse { ok: true, count })
}

pub async fn set_status(
    State(state): State<AppState>,
    Requester(user): Requester,
    Json(request): Json<SetStatusRequest>,
) -> Result<Json<UserStatus>, ApiError> {
    Ok(Json(state.hub.set_status(&user, &request.status).await?))
}

/// Statuses set in the last week, newest first.
pub async fn recent_statuses(State(state): State<AppState>) -> Json<Vec<UserStatus>> {
    Json(state.hub.statuses().recent(Utc::now()))
}

pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(UploadError::from)? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_owned)
            .ok_or(UploadError::MissingFilename)?;
        let data = field.bytes().await.map_err(UploadError::from)?;

        let url = state.blobs.store(&filename, &data).await?;
        info!("Upload '{}' available at {}", filename, url);
        return Ok(Json(UploadResponse { url }));
    }

    Err(UploadError::MissingFile.into())
}

pub async fn health() -> &'static str {
    "ok"
}
