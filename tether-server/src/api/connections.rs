use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use uuid::Uuid;

use crate::{
    api::{get_user_from_headers, ApiError, ApiResult},
    db::repositories::{ConnectionRepository, UserRepository},
    state::AppState,
};
use tether_types::{
    Connection, ConnectionAction, ConnectionStatus, CreateConnectionRequest,
    RespondConnectionRequest,
};

const MAX_MESSAGE_LENGTH: usize = 500;

/// POST /connections - Send a connection request
pub async fn create_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateConnectionRequest>,
) -> ApiResult<Json<Connection>> {
    let requester_id = get_user_from_headers(&state, &headers)?;

    if requester_id == payload.addressee_id {
        return Err(ApiError::BadRequest(
            "Cannot send a connection request to yourself".to_string(),
        ));
    }

    if let Some(message) = &payload.message {
        if message.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(ApiError::BadRequest(format!(
                "Message exceeds {} character limit",
                MAX_MESSAGE_LENGTH
            )));
        }
    }

    let user_repo = UserRepository::new(state.db.pool.clone());
    user_repo
        .get_by_id(&payload.addressee_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let connection_repo = ConnectionRepository::new(state.db.pool.clone());

    // One row per unordered pair: a request in either direction, in any
    // state, blocks a new one
    if connection_repo
        .find_between(&requester_id, &payload.addressee_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "A connection already exists between these users".to_string(),
        ));
    }

    let connection_id = connection_repo
        .create_request(&requester_id, &payload.addressee_id, payload.message.as_deref())
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    tracing::info!(
        "Connection request sent from {} to {}",
        requester_id,
        payload.addressee_id
    );

    let connection = connection_repo
        .get_by_id(&connection_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .ok_or_else(|| ApiError::InternalError("Connection vanished after insert".to_string()))?;

    Ok(Json(connection))
}

/// POST /connections/:id/respond - Accept or decline a pending request
pub async fn respond(
    State(state): State<AppState>,
    Path(connection_id_str): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<RespondConnectionRequest>,
) -> ApiResult<Json<Connection>> {
    let user_id = get_user_from_headers(&state, &headers)?;

    let connection_id = Uuid::parse_str(&connection_id_str)
        .map_err(|_| ApiError::BadRequest("Invalid connection ID".to_string()))?;

    let action = ConnectionAction::parse(&payload.action).ok_or_else(|| {
        ApiError::BadRequest("Invalid action. Use 'accept' or 'decline'".to_string())
    })?;

    let connection_repo = ConnectionRepository::new(state.db.pool.clone());

    let connection = connection_repo
        .get_by_id(&connection_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("Connection request not found".to_string()))?;

    // Only the addressee may answer
    if connection.addressee_id != user_id {
        return Err(ApiError::Forbidden(
            "Only the recipient can respond to a connection request".to_string(),
        ));
    }

    let new_status = match action {
        ConnectionAction::Accept => ConnectionStatus::Accepted,
        ConnectionAction::Decline => ConnectionStatus::Declined,
    };

    // The repository transition is guarded on status = pending, so a
    // request that was already answered cannot be flipped
    let updated = connection_repo
        .respond(&connection_id, new_status)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    if updated == 0 {
        return Err(ApiError::Conflict(
            "Connection request is no longer pending".to_string(),
        ));
    }

    tracing::info!(
        "Connection {} {} by user {}",
        connection_id,
        new_status.as_str(),
        user_id
    );

    let connection = connection_repo
        .get_by_id(&connection_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .ok_or_else(|| ApiError::InternalError("Connection vanished after update".to_string()))?;

    Ok(Json(connection))
}

/// GET /connections - List accepted connections for the current user
pub async fn list_connections(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Connection>>> {
    let user_id = get_user_from_headers(&state, &headers)?;

    let connection_repo = ConnectionRepository::new(state.db.pool.clone());
    let connections = connection_repo
        .list_accepted(&user_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(connections))
}

/// GET /connections/pending - List pending requests addressed to the current user
pub async fn list_pending(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Connection>>> {
    let user_id = get_user_from_headers(&state, &headers)?;

    let connection_repo = ConnectionRepository::new(state.db.pool.clone());
    let pending = connection_repo
        .pending_for(&user_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(pending))
}
