use chrono::Utc;

use swampnotes_auth_types::token::Identity;
use swampnotes_domain::id::UserId;

use crate::domain::repository::UserRepository;
use crate::domain::types::{ProfileUpdate, User};
use crate::error::MarketServiceError;

// ── GetOrCreateUser ──────────────────────────────────────────────────────────

/// Resolves the account for a verified identity, creating it with the signup
/// balance on first contact.
pub struct GetOrCreateUserUseCase<R: UserRepository> {
    pub repo: R,
    pub signup_points: i64,
}

impl<R: UserRepository> GetOrCreateUserUseCase<R> {
    pub async fn execute(&self, identity: &Identity) -> Result<User, MarketServiceError> {
        if let Some(user) = self.repo.find_by_subject(&identity.subject).await? {
            return Ok(user);
        }

        let now = Utc::now();
        let candidate = User {
            id: UserId::generate(),
            subject: identity.subject.clone(),
            email: identity.email.clone().unwrap_or_default(),
            name: identity.name.clone(),
            display_name: None,
            bio: None,
            is_profile_public: true,
            show_email: false,
            is_admin: identity.is_admin,
            points: self.signup_points.max(0),
            created_at: now,
            updated_at: now,
        };
        // A concurrent first request may insert the same subject; re-read either way.
        if self.repo.insert_if_absent(&candidate).await? {
            tracing::info!(user_id = %candidate.id, points = candidate.points, "user created on first contact");
        }
        self.repo
            .find_by_subject(&identity.subject)
            .await?
            .ok_or_else(|| {
                MarketServiceError::Internal(anyhow::anyhow!(
                    "user {} missing after insert",
                    identity.subject
                ))
            })
    }
}

// ── UpdateProfile ────────────────────────────────────────────────────────────

pub struct UpdateProfileUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> UpdateProfileUseCase<R> {
    pub async fn execute(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> Result<User, MarketServiceError> {
        if update.is_empty() {
            return Err(MarketServiceError::MissingData);
        }
        self.repo
            .update_profile(user_id, &update)
            .await?
            .ok_or(MarketServiceError::UserNotFound)
    }
}
