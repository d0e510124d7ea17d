use axum::{
    Json,
    extract::{Multipart, Path, Query, State, rejection::QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use swampnotes_domain::id::{CourseId, NoteId, PurchaseId, UserId};
use swampnotes_domain::pagination::PageRequest;
use swampnotes_domain::user::is_truthy;

use crate::domain::ownership::Ownership;
use crate::domain::types::{Note, NoteSearch};
use crate::error::MarketServiceError;
use crate::handlers::current_user::CurrentUser;
use crate::state::AppState;
use crate::usecase::catalog::{
    GetNoteUseCase, ListLibraryUseCase, ListUploadedUseCase, SearchNotesUseCase,
};
use crate::usecase::download::DownloadNoteUseCase;
use crate::usecase::ownership::ResolveOwnershipUseCase;
use crate::usecase::purchase::{PurchaseNoteUseCase, PurchaseReceipt};
use crate::usecase::upload::{UploadNoteInput, UploadNoteUseCase};

#[derive(Serialize)]
pub struct NoteResponse {
    pub id: NoteId,
    pub author_id: UserId,
    pub course_id: CourseId,
    pub title: String,
    pub description: Option<String>,
    pub course_name: String,
    pub semester: String,
    pub price: i64,
    pub is_free: bool,
    pub downloads: i64,
    pub views: i64,
    #[serde(serialize_with = "swampnotes_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            author_id: note.author_id,
            course_id: note.course_id,
            title: note.title,
            description: note.description,
            course_name: note.course_name,
            semester: note.semester,
            price: note.price,
            is_free: note.is_free,
            downloads: note.downloads,
            views: note.views,
            created_at: note.created_at,
        }
    }
}

pub(crate) fn note_list(notes: Vec<Note>) -> Json<Vec<NoteResponse>> {
    Json(notes.into_iter().map(NoteResponse::from).collect())
}

pub(crate) fn invalid_query(e: QueryRejection) -> MarketServiceError {
    MarketServiceError::InvalidQuery(e.body_text())
}

// ── GET /notes/search ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub course_id: Option<CourseId>,
    pub semester: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

pub async fn search_notes(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<NoteResponse>>, MarketServiceError> {
    let Query(query) = query.map_err(invalid_query)?;
    let usecase = SearchNotesUseCase {
        notes: state.note_repo(),
    };
    let notes = usecase
        .execute(NoteSearch {
            query: query.query,
            course_id: query.course_id,
            semester: query.semester,
            page: PageRequest::new(query.limit, query.offset),
        })
        .await?;
    Ok(note_list(notes))
}

// ── GET /notes/{id} ──────────────────────────────────────────────────────────

pub async fn get_note(
    State(state): State<AppState>,
    Path(note_id): Path<NoteId>,
) -> Result<Json<NoteResponse>, MarketServiceError> {
    let usecase = GetNoteUseCase {
        notes: state.note_repo(),
    };
    let note = usecase.execute(note_id).await?;
    Ok(Json(note.into()))
}

// ── GET /notes/library ───────────────────────────────────────────────────────

pub async fn get_library(
    current: CurrentUser,
    State(state): State<AppState>,
    page: Result<Query<PageRequest>, QueryRejection>,
) -> Result<Json<Vec<NoteResponse>>, MarketServiceError> {
    let Query(page) = page.map_err(invalid_query)?;
    let usecase = ListLibraryUseCase {
        notes: state.note_repo(),
    };
    let notes = usecase.execute(current.user.id, page).await?;
    Ok(note_list(notes))
}

// ── GET /notes/uploaded ──────────────────────────────────────────────────────

pub async fn get_uploaded(
    current: CurrentUser,
    State(state): State<AppState>,
    page: Result<Query<PageRequest>, QueryRejection>,
) -> Result<Json<Vec<NoteResponse>>, MarketServiceError> {
    let Query(page) = page.map_err(invalid_query)?;
    let usecase = ListUploadedUseCase {
        notes: state.note_repo(),
    };
    let notes = usecase.execute(current.user.id, page).await?;
    Ok(note_list(notes))
}

// ── GET /notes/{id}/owned ────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct OwnershipResponse {
    pub owned: bool,
    pub is_author: bool,
    pub can_download: bool,
}

impl From<Ownership> for OwnershipResponse {
    fn from(o: Ownership) -> Self {
        Self {
            owned: o.owned,
            is_author: o.is_author,
            can_download: o.can_download,
        }
    }
}

pub async fn get_ownership(
    current: CurrentUser,
    State(state): State<AppState>,
    Path(note_id): Path<NoteId>,
) -> Result<Json<OwnershipResponse>, MarketServiceError> {
    let usecase = ResolveOwnershipUseCase {
        notes: state.note_repo(),
        purchases: state.purchase_repo(),
    };
    let ownership = usecase.execute(current.user.id, note_id).await?;
    Ok(Json(ownership.into()))
}

// ── POST /notes/{id}/purchase ────────────────────────────────────────────────

#[derive(Serialize)]
pub struct PurchaseResponse {
    pub id: PurchaseId,
    pub user_id: UserId,
    pub note_id: NoteId,
    pub price_paid: i64,
    #[serde(serialize_with = "swampnotes_core::serde::to_rfc3339_ms")]
    pub purchased_at: chrono::DateTime<chrono::Utc>,
    /// Remaining balance, present when points were debited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<i64>,
}

impl From<PurchaseReceipt> for PurchaseResponse {
    fn from(receipt: PurchaseReceipt) -> Self {
        let PurchaseReceipt { purchase, balance } = receipt;
        Self {
            id: purchase.id,
            user_id: purchase.user_id,
            note_id: purchase.note_id,
            price_paid: purchase.price_paid,
            purchased_at: purchase.purchased_at,
            balance,
        }
    }
}

pub async fn purchase_note(
    current: CurrentUser,
    State(state): State<AppState>,
    Path(note_id): Path<NoteId>,
) -> Result<Json<PurchaseResponse>, MarketServiceError> {
    let usecase = PurchaseNoteUseCase {
        uow: state.purchase_uow(),
    };
    let receipt = usecase.execute(current.user.id, note_id).await?;
    Ok(Json(receipt.into()))
}

// ── GET /notes/{id}/download ─────────────────────────────────────────────────

pub async fn download_note(
    current: CurrentUser,
    State(state): State<AppState>,
    Path(note_id): Path<NoteId>,
) -> Result<Response, MarketServiceError> {
    let usecase = DownloadNoteUseCase {
        notes: state.note_repo(),
        purchases: state.purchase_repo(),
        content: state.content_store(),
    };
    let content = usecase.execute(current.user.id, note_id).await?;
    let content_type =
        HeaderValue::from_str(&content.content_type).context("note content type header")?;
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        content.filename
    ))
    .context("content disposition header")?;
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        content.bytes,
    )
        .into_response())
}

// ── POST /notes/upload ───────────────────────────────────────────────────────

#[derive(Default)]
struct UploadForm {
    title: Option<String>,
    description: Option<String>,
    course_id: Option<String>,
    course_name: Option<String>,
    semester: Option<String>,
    price: Option<String>,
    is_free: Option<String>,
    content_type: Option<String>,
    bytes: Option<bytes::Bytes>,
}

fn invalid_upload(e: axum::extract::multipart::MultipartError) -> MarketServiceError {
    MarketServiceError::InvalidUpload(e.body_text())
}

pub async fn upload_note(
    current: CurrentUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<NoteResponse>), MarketServiceError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(invalid_upload)? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "file" => {
                form.content_type = field.content_type().map(str::to_owned);
                form.bytes = Some(field.bytes().await.map_err(invalid_upload)?);
            }
            "title" => form.title = Some(field.text().await.map_err(invalid_upload)?),
            "description" => form.description = Some(field.text().await.map_err(invalid_upload)?),
            "course_id" => form.course_id = Some(field.text().await.map_err(invalid_upload)?),
            "course_name" => form.course_name = Some(field.text().await.map_err(invalid_upload)?),
            "semester" => form.semester = Some(field.text().await.map_err(invalid_upload)?),
            "price" => form.price = Some(field.text().await.map_err(invalid_upload)?),
            "is_free" => form.is_free = Some(field.text().await.map_err(invalid_upload)?),
            _ => {}
        }
    }

    let bytes = form
        .bytes
        .ok_or_else(|| MarketServiceError::InvalidUpload("missing file".into()))?;
    let course_id: CourseId = form
        .course_id
        .ok_or(MarketServiceError::MissingData)?
        .trim()
        .parse()
        .map_err(|_| MarketServiceError::InvalidUpload("invalid course_id".into()))?;
    let price = match form.price.as_deref().map(str::trim) {
        None | Some("") => 0,
        Some(raw) => raw.parse().map_err(|_| MarketServiceError::InvalidPrice)?,
    };

    let usecase = UploadNoteUseCase {
        notes: state.note_repo(),
        courses: state.course_repo(),
        content: state.content_store(),
    };
    let note = usecase
        .execute(UploadNoteInput {
            author_id: current.user.id,
            title: form.title.ok_or(MarketServiceError::MissingData)?,
            description: form.description,
            course_id,
            course_name: form.course_name.ok_or(MarketServiceError::MissingData)?,
            semester: form.semester.ok_or(MarketServiceError::MissingData)?,
            price,
            is_free: form.is_free.as_deref().is_some_and(is_truthy),
            content_type: form.content_type,
            bytes,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(note.into())))
}
