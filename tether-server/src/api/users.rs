use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{get_optional_user_from_headers, get_user_from_headers, ApiError, ApiResult},
    db::repositories::{ConnectionRepository, PostRepository, UserRepository},
    state::AppState,
};
use tether_types::{
    ConnectionStatus, RelationshipStatus, UpdateProfileRequest, User, UserProfileView,
};

const SEARCH_RESULT_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

/// GET /users/search?q= - Search users by name or email
pub async fn search_users(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<User>>> {
    let term = params.q.trim();
    if term.is_empty() {
        return Err(ApiError::BadRequest(
            "Search term cannot be empty".to_string(),
        ));
    }

    let user_repo = UserRepository::new(state.db.pool.clone());
    let users = user_repo
        .search(term, SEARCH_RESULT_LIMIT)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(users))
}

/// GET /users/:id - Profile view with relationship context for the viewer
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id_str): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<UserProfileView>> {
    let user_id = Uuid::parse_str(&user_id_str)
        .map_err(|_| ApiError::BadRequest("Invalid user ID".to_string()))?;

    let user_repo = UserRepository::new(state.db.pool.clone());
    let user = user_repo
        .get_by_id(&user_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let connection_repo = ConnectionRepository::new(state.db.pool.clone());
    let post_repo = PostRepository::new(state.db.pool.clone());

    let connection_count = connection_repo
        .count_accepted(&user_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    let post_count = post_repo
        .get_post_count(&user_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    let viewer_id = get_optional_user_from_headers(&state, &headers);
    let relationship = match viewer_id {
        Some(viewer_id) if viewer_id == user_id => RelationshipStatus::Self_,
        Some(viewer_id) => {
            let existing = connection_repo
                .find_between(&viewer_id, &user_id)
                .map_err(|e| ApiError::InternalError(e.to_string()))?;
            match existing {
                Some(c) if c.status == ConnectionStatus::Accepted => RelationshipStatus::Connected,
                Some(c) if c.status == ConnectionStatus::Pending => {
                    if c.requester_id == viewer_id {
                        RelationshipStatus::PendingOutgoing
                    } else {
                        RelationshipStatus::PendingIncoming
                    }
                }
                // Declined pairs read as unrelated to the viewer
                _ => RelationshipStatus::None,
            }
        }
        None => RelationshipStatus::None,
    };

    Ok(Json(UserProfileView {
        id: user.id,
        full_name: user.full_name(),
        headline: user.headline,
        summary: user.summary,
        location: user.location,
        join_date: user.created_at.format("%Y-%m-%d").to_string(),
        connection_count,
        post_count,
        relationship,
    }))
}

/// PUT /users/me - Update the caller's own profile
pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<User>> {
    let user_id = get_user_from_headers(&state, &headers)?;

    if let Some(first_name) = &payload.first_name {
        if first_name.trim().is_empty() {
            return Err(ApiError::BadRequest("Name cannot be empty".to_string()));
        }
    }
    if let Some(last_name) = &payload.last_name {
        if last_name.trim().is_empty() {
            return Err(ApiError::BadRequest("Name cannot be empty".to_string()));
        }
    }

    let user_repo = UserRepository::new(state.db.pool.clone());
    user_repo
        .update_profile(&user_id, &payload)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    let user = user_repo
        .get_by_id(&user_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// GET /users/me - The caller's own account record
pub async fn get_me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<User>> {
    let user_id = get_user_from_headers(&state, &headers)?;

    let user_repo = UserRepository::new(state.db.pool.clone());
    let user = user_repo
        .get_by_id(&user_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}
