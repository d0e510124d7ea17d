use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use swampnotes_auth_types::identity::BearerIdentity;
use swampnotes_auth_types::token::Identity;

use crate::domain::types::User;
use crate::error::MarketServiceError;
use crate::state::AppState;
use crate::usecase::user::GetOrCreateUserUseCase;

/// The authenticated caller's marketplace account, created on first contact.
pub struct CurrentUser {
    pub user: User,
    pub identity: Identity,
}

impl CurrentUser {
    /// Admin if either the token or the stored account says so.
    pub fn is_admin(&self) -> bool {
        self.identity.is_admin || self.user.is_admin
    }

    pub fn require_admin(&self) -> Result<(), MarketServiceError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(MarketServiceError::Forbidden)
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = MarketServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerIdentity(identity) = BearerIdentity::from_request_parts(parts, state).await?;
        let usecase = GetOrCreateUserUseCase {
            repo: state.user_repo(),
            signup_points: state.signup_points,
        };
        let user = usecase.execute(&identity).await?;
        Ok(Self { user, identity })
    }
}
