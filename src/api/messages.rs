use crate::api::AppState;
use crate::api::middleware::AuthUser;
use crate::api::schemas::messaging::{Conversation, Message, SendMessage, UnreadCount};
use crate::error::{AppError, Result};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

/// Sends a direct message from the caller to `recipientId`.
///
/// # Errors
/// Returns `AppError::BadRequest` if the body is malformed, a field is missing or the content is blank.
/// Returns `AppError::NotFound` if the recipient does not exist.
pub async fn send_message(
    auth_user: AuthUser,
    State(state): State<AppState>,
    payload: std::result::Result<Json<SendMessage>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let (recipient_id, content) = payload.validate()?;

    let message = state.message_service.send_message(auth_user.user_id, recipient_id, content).await?;

    Ok((StatusCode::CREATED, Json(Message::from(message))))
}

/// Lists the caller's conversations, most recent first.
///
/// # Errors
/// Returns `AppError::Database` if the history cannot be loaded.
pub async fn list_conversations(auth_user: AuthUser, State(state): State<AppState>) -> Result<impl IntoResponse> {
    let conversations = state.message_service.list_conversations(auth_user.user_id).await?;

    Ok(Json(conversations.into_iter().map(Conversation::from).collect::<Vec<_>>()))
}

/// Lists the thread between the caller and `userId`, oldest first.
///
/// # Errors
/// Returns `AppError::BadRequest` if `userId` is not a valid id.
pub async fn list_thread(
    auth_user: AuthUser,
    State(state): State<AppState>,
    user_id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse> {
    let Path(other_user_id) = user_id.map_err(|_| AppError::BadRequest("Invalid user id".to_string()))?;

    let thread = state.message_service.list_thread(auth_user.user_id, other_user_id).await?;

    Ok(Json(thread.into_iter().map(Message::from).collect::<Vec<_>>()))
}

/// Counts unread messages addressed to the caller.
///
/// # Errors
/// Returns `AppError::Database` if the count fails.
pub async fn unread_count(auth_user: AuthUser, State(state): State<AppState>) -> Result<impl IntoResponse> {
    let count = state.message_service.unread_count(auth_user.user_id).await?;

    Ok(Json(UnreadCount { count }))
}
