use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use uuid::Uuid;

use crate::{
    api::{get_user_from_headers, ApiError, ApiResult},
    db::repositories::{ProfileRepository, UserRepository},
    state::AppState,
};
use tether_types::{
    CreateEducationRequest, CreateExperienceRequest, CreateSkillRequest, Education, Experience,
    Skill,
};

fn parse_user_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::BadRequest("Invalid user ID".to_string()))
}

fn require_user(state: &AppState, user_id: &Uuid) -> Result<(), ApiError> {
    let user_repo = UserRepository::new(state.db.pool.clone());
    user_repo
        .get_by_id(user_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(())
}

/// POST /profile/experience - Add a work experience entry to the caller's profile
pub async fn add_experience(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateExperienceRequest>,
) -> ApiResult<Json<Experience>> {
    let user_id = get_user_from_headers(&state, &headers)?;

    if payload.company.trim().is_empty() || payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Company and title are required".to_string(),
        ));
    }
    if let Some(end_date) = payload.end_date {
        if end_date < payload.start_date {
            return Err(ApiError::BadRequest(
                "End date cannot precede start date".to_string(),
            ));
        }
    }

    let experience = Experience {
        id: Uuid::new_v4(),
        user_id,
        company: payload.company,
        title: payload.title,
        description: payload.description,
        location: payload.location,
        start_date: payload.start_date,
        // A current position has no end date
        end_date: if payload.is_current {
            None
        } else {
            payload.end_date
        },
        is_current: payload.is_current,
    };

    let profile_repo = ProfileRepository::new(state.db.pool.clone());
    profile_repo
        .add_experience(&experience)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(experience))
}

/// GET /users/:id/experience - List a user's experience, most recent first
pub async fn list_experience(
    State(state): State<AppState>,
    Path(user_id_str): Path<String>,
) -> ApiResult<Json<Vec<Experience>>> {
    let user_id = parse_user_id(&user_id_str)?;
    require_user(&state, &user_id)?;

    let profile_repo = ProfileRepository::new(state.db.pool.clone());
    let experiences = profile_repo
        .get_experiences(&user_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(experiences))
}

/// POST /profile/education - Add an education entry to the caller's profile
pub async fn add_education(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateEducationRequest>,
) -> ApiResult<Json<Education>> {
    let user_id = get_user_from_headers(&state, &headers)?;

    if payload.school.trim().is_empty() {
        return Err(ApiError::BadRequest("School is required".to_string()));
    }
    if let Some(end_date) = payload.end_date {
        if end_date < payload.start_date {
            return Err(ApiError::BadRequest(
                "End date cannot precede start date".to_string(),
            ));
        }
    }

    let education = Education {
        id: Uuid::new_v4(),
        user_id,
        school: payload.school,
        degree: payload.degree,
        field_of_study: payload.field_of_study,
        description: payload.description,
        start_date: payload.start_date,
        end_date: payload.end_date,
    };

    let profile_repo = ProfileRepository::new(state.db.pool.clone());
    profile_repo
        .add_education(&education)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(education))
}

/// GET /users/:id/education - List a user's education, most recent first
pub async fn list_education(
    State(state): State<AppState>,
    Path(user_id_str): Path<String>,
) -> ApiResult<Json<Vec<Education>>> {
    let user_id = parse_user_id(&user_id_str)?;
    require_user(&state, &user_id)?;

    let profile_repo = ProfileRepository::new(state.db.pool.clone());
    let entries = profile_repo
        .get_education(&user_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(entries))
}

/// POST /profile/skills - Add a skill to the caller's profile
///
/// Re-adding an existing skill (case-insensitive) returns the existing
/// row rather than an error.
pub async fn add_skill(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateSkillRequest>,
) -> ApiResult<Json<Skill>> {
    let user_id = get_user_from_headers(&state, &headers)?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Skill name is required".to_string()));
    }

    let profile_repo = ProfileRepository::new(state.db.pool.clone());
    let skill = profile_repo
        .add_skill(&user_id, name)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(skill))
}

/// GET /users/:id/skills - List a user's skills, most endorsed first
pub async fn list_skills(
    State(state): State<AppState>,
    Path(user_id_str): Path<String>,
) -> ApiResult<Json<Vec<Skill>>> {
    let user_id = parse_user_id(&user_id_str)?;
    require_user(&state, &user_id)?;

    let profile_repo = ProfileRepository::new(state.db.pool.clone());
    let skills = profile_repo
        .get_skills(&user_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(skills))
}
