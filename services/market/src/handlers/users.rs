use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use swampnotes_domain::id::UserId;

use crate::domain::types::{ProfileUpdate, User};
use crate::error::MarketServiceError;
use crate::handlers::current_user::CurrentUser;
use crate::state::AppState;
use crate::usecase::ledger::CreditPointsUseCase;
use crate::usecase::user::UpdateProfileUseCase;

#[derive(Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub sub: String,
    pub email: String,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub is_profile_public: bool,
    pub show_email: bool,
    pub is_admin: bool,
    pub points: i64,
    #[serde(serialize_with = "swampnotes_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "swampnotes_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl UserResponse {
    fn new(user: User, is_admin: bool) -> Self {
        Self {
            id: user.id,
            sub: user.subject,
            email: user.email,
            name: user.name,
            display_name: user.display_name,
            bio: user.bio,
            is_profile_public: user.is_profile_public,
            show_email: user.show_email,
            is_admin,
            points: user.points,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ── GET /users/me ────────────────────────────────────────────────────────────

pub async fn get_me(current: CurrentUser) -> Json<UserResponse> {
    let is_admin = current.is_admin();
    Json(UserResponse::new(current.user, is_admin))
}

// ── PATCH /users/me ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateMeRequest {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub is_profile_public: Option<bool>,
    pub show_email: Option<bool>,
}

pub async fn update_me(
    current: CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<UpdateMeRequest>,
) -> Result<Json<UserResponse>, MarketServiceError> {
    let is_admin = current.is_admin();
    let usecase = UpdateProfileUseCase {
        repo: state.user_repo(),
    };
    let user = usecase
        .execute(
            current.user.id,
            ProfileUpdate {
                display_name: body.display_name,
                bio: body.bio,
                is_profile_public: body.is_profile_public,
                show_email: body.show_email,
            },
        )
        .await?;
    Ok(Json(UserResponse::new(user, is_admin)))
}

// ── POST /users/{id}/points ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreditPointsRequest {
    pub amount: i64,
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub user_id: UserId,
    pub points: i64,
}

pub async fn credit_points(
    current: CurrentUser,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(body): Json<CreditPointsRequest>,
) -> Result<Json<BalanceResponse>, MarketServiceError> {
    current.require_admin()?;
    let usecase = CreditPointsUseCase {
        ledger: state.user_repo(),
    };
    let points = usecase.execute(user_id, body.amount).await?;
    Ok(Json(BalanceResponse { user_id, points }))
}
