use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    api::{
        get_optional_user_from_headers, get_user_from_headers, ApiError, ApiResult,
        PaginationParams,
    },
    db::repositories::{CommentRepository, LikeRepository, PostRepository},
    state::AppState,
};
use tether_types::{Comment, CreateCommentRequest, CreatePostRequest, Post};

const MAX_POST_LENGTH: usize = 3000;
const MAX_COMMENT_LENGTH: usize = 1000;

fn parse_post_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::BadRequest("Invalid post ID".to_string()))
}

/// POST /posts - Create a new post
pub async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreatePostRequest>,
) -> ApiResult<Json<Post>> {
    let author_id = get_user_from_headers(&state, &headers)?;

    let content = payload.content.trim();
    if content.is_empty() {
        return Err(ApiError::BadRequest("Post cannot be empty".to_string()));
    }
    // Character count, not byte count; multibyte content must get the
    // same limit the schema enforces
    if content.chars().count() > MAX_POST_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Post exceeds {} character limit",
            MAX_POST_LENGTH
        )));
    }

    let post = Post {
        id: Uuid::new_v4(),
        author_id,
        author_name: String::new(), // filled by the read below
        content: content.to_string(),
        created_at: Utc::now(),
        like_count: 0,
        comment_count: 0,
        viewer_has_liked: None,
    };

    let post_repo = PostRepository::new(state.db.pool.clone());
    post_repo
        .create(&post)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    tracing::info!("User {} created post {}", author_id, post.id);

    let post = post_repo
        .get_by_id(&post.id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .ok_or_else(|| ApiError::InternalError("Post vanished after insert".to_string()))?;

    Ok(Json(post))
}

/// GET /posts/:id - Fetch a single post
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id_str): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Post>> {
    let post_id = parse_post_id(&post_id_str)?;

    let post_repo = PostRepository::new(state.db.pool.clone());
    let mut post = post_repo
        .get_by_id(&post_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    if let Some(viewer_id) = get_optional_user_from_headers(&state, &headers) {
        let like_repo = LikeRepository::new(state.db.pool.clone());
        post.viewer_has_liked = Some(
            like_repo
                .has_liked(&viewer_id, &post_id)
                .map_err(|e| ApiError::InternalError(e.to_string()))?,
        );
    }

    Ok(Json(post))
}

/// DELETE /posts/:id - Delete a post (author only)
pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id_str): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    let user_id = get_user_from_headers(&state, &headers)?;
    let post_id = parse_post_id(&post_id_str)?;

    let post_repo = PostRepository::new(state.db.pool.clone());
    let post = post_repo
        .get_by_id(&post_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    if post.author_id != user_id {
        return Err(ApiError::Forbidden(
            "Only the author can delete a post".to_string(),
        ));
    }

    post_repo
        .delete(&post_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    tracing::info!("User {} deleted post {}", user_id, post_id);

    Ok(Json(serde_json::json!({ "success": true })))
}

/// POST /posts/:id/like - Toggle a like on a post
pub async fn toggle_like(
    State(state): State<AppState>,
    Path(post_id_str): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    let user_id = get_user_from_headers(&state, &headers)?;
    let post_id = parse_post_id(&post_id_str)?;

    let post_repo = PostRepository::new(state.db.pool.clone());
    post_repo
        .get_by_id(&post_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    let like_repo = LikeRepository::new(state.db.pool.clone());
    let liked = like_repo
        .toggle(&user_id, &post_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    let like_count = like_repo
        .count_for_post(&post_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "liked": liked,
        "like_count": like_count,
    })))
}

/// POST /posts/:id/comments - Comment on a post
pub async fn create_comment(
    State(state): State<AppState>,
    Path(post_id_str): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<CreateCommentRequest>,
) -> ApiResult<Json<Comment>> {
    let author_id = get_user_from_headers(&state, &headers)?;
    let post_id = parse_post_id(&post_id_str)?;

    let content = payload.content.trim();
    if content.is_empty() {
        return Err(ApiError::BadRequest("Comment cannot be empty".to_string()));
    }
    if content.chars().count() > MAX_COMMENT_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Comment exceeds {} character limit",
            MAX_COMMENT_LENGTH
        )));
    }

    let post_repo = PostRepository::new(state.db.pool.clone());
    post_repo
        .get_by_id(&post_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    let comment = Comment {
        id: Uuid::new_v4(),
        post_id,
        author_id,
        author_name: String::new(),
        content: content.to_string(),
        created_at: Utc::now(),
    };

    let comment_repo = CommentRepository::new(state.db.pool.clone());
    comment_repo
        .create(&comment)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    // Re-read through the join so author_name is populated
    let comments = comment_repo
        .get_by_post(&post_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    let comment = comments
        .into_iter()
        .find(|c| c.id == comment.id)
        .ok_or_else(|| ApiError::InternalError("Comment vanished after insert".to_string()))?;

    Ok(Json(comment))
}

/// GET /posts/:id/comments - List comments on a post, oldest first
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id_str): Path<String>,
) -> ApiResult<Json<Vec<Comment>>> {
    let post_id = parse_post_id(&post_id_str)?;

    let post_repo = PostRepository::new(state.db.pool.clone());
    post_repo
        .get_by_id(&post_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    let comment_repo = CommentRepository::new(state.db.pool.clone());
    let comments = comment_repo
        .get_by_post(&post_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(comments))
}

/// GET /users/:id/posts - List a user's posts, newest first
pub async fn list_user_posts(
    State(state): State<AppState>,
    Path(user_id_str): Path<String>,
    Query(pagination): Query<PaginationParams>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Post>>> {
    let user_id = Uuid::parse_str(&user_id_str)
        .map_err(|_| ApiError::BadRequest("Invalid user ID".to_string()))?;
    let (offset, limit) = pagination.clamped();

    let post_repo = PostRepository::new(state.db.pool.clone());
    let mut posts = post_repo
        .get_by_author(&user_id, offset, limit)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    if let Some(viewer_id) = get_optional_user_from_headers(&state, &headers) {
        let like_repo = LikeRepository::new(state.db.pool.clone());
        for post in &mut posts {
            post.viewer_has_liked = Some(
                like_repo
                    .has_liked(&viewer_id, &post.id)
                    .map_err(|e| ApiError::InternalError(e.to_string()))?,
            );
        }
    }

    Ok(Json(posts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use axum::http::HeaderValue;

    fn setup_state() -> (AppState, HeaderMap) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.seed_test_data().expect("Failed to seed test data");
        let state = AppState::new(db);

        let alice = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap();
        let token = state
            .session_manager
            .create_session(alice)
            .expect("Failed to create session");

        let mut headers = HeaderMap::new();
        headers.insert("X-Session-Token", HeaderValue::from_str(&token).unwrap());
        (state, headers)
    }

    #[tokio::test]
    async fn test_post_limit_counts_characters_not_bytes() {
        let (state, headers) = setup_state();

        // 1,500 three-byte characters: 4,500 bytes but well under the
        // 3,000-character limit
        let content = "語".repeat(1500);
        let result = create_post(
            State(state.clone()),
            headers.clone(),
            Json(CreatePostRequest { content }),
        )
        .await;
        assert!(result.is_ok());

        let content = "語".repeat(MAX_POST_LENGTH + 1);
        let result = create_post(State(state), headers, Json(CreatePostRequest { content })).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_comment_limit_counts_characters_not_bytes() {
        let (state, headers) = setup_state();
        let post_id = "770e8400-e29b-41d4-a716-446655440001".to_string();

        // 800 two-byte characters: over the limit in bytes, under it in
        // characters
        let content = "é".repeat(800);
        let result = create_comment(
            State(state.clone()),
            Path(post_id.clone()),
            headers.clone(),
            Json(CreateCommentRequest { content }),
        )
        .await;
        assert!(result.is_ok());

        let content = "é".repeat(MAX_COMMENT_LENGTH + 1);
        let result = create_comment(
            State(state),
            Path(post_id),
            headers,
            Json(CreateCommentRequest { content }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
