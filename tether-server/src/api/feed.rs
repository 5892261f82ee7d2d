use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};

use crate::{
    api::{get_user_from_headers, ApiError, ApiResult, PaginationParams},
    db::repositories::{ConnectionRepository, LikeRepository, PostRepository},
    state::AppState,
};
use tether_types::Post;

/// GET /feed - Posts authored by the caller's accepted connections,
/// newest first
///
/// The caller's own posts are not part of the feed; they live on the
/// profile page instead.
pub async fn get_feed(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Json<Vec<Post>>> {
    let user_id = get_user_from_headers(&state, &headers)?;
    let (offset, limit) = pagination.clamped();

    let connection_repo = ConnectionRepository::new(state.db.pool.clone());
    let author_ids = connection_repo
        .accepted_counterpart_ids(&user_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    let post_repo = PostRepository::new(state.db.pool.clone());
    let mut posts = post_repo
        .get_feed(&author_ids, offset, limit)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    let like_repo = LikeRepository::new(state.db.pool.clone());
    for post in &mut posts {
        post.viewer_has_liked = Some(
            like_repo
                .has_liked(&user_id, &post.id)
                .map_err(|e| ApiError::InternalError(e.to_string()))?,
        );
    }

    tracing::debug!(
        "Assembled feed for user {}: {} posts from {} connections",
        user_id,
        posts.len(),
        author_ids.len()
    );

    Ok(Json(posts))
}
