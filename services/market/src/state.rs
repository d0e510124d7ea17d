use std::sync::Arc;

use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use swampnotes_auth_types::token::TokenVerifier;

use crate::infra::db::{
    DbCourseRepository, DbNoteRepository, DbPurchaseRepository, DbPurchaseUnitOfWork,
    DbUserRepository,
};
use crate::infra::storage::FsContentStore;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub verifier: Arc<TokenVerifier>,
    pub content: FsContentStore,
    /// Balance granted to users created on first contact.
    pub signup_points: i64,
}

impl FromRef<AppState> for Arc<TokenVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn note_repo(&self) -> DbNoteRepository {
        DbNoteRepository {
            db: self.db.clone(),
        }
    }

    pub fn purchase_repo(&self) -> DbPurchaseRepository {
        DbPurchaseRepository {
            db: self.db.clone(),
        }
    }

    pub fn course_repo(&self) -> DbCourseRepository {
        DbCourseRepository {
            db: self.db.clone(),
        }
    }

    pub fn purchase_uow(&self) -> DbPurchaseUnitOfWork {
        DbPurchaseUnitOfWork {
            db: self.db.clone(),
        }
    }

    pub fn content_store(&self) -> FsContentStore {
        self.content.clone()
    }
}
