use std::sync::Arc;

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection,
    DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    TransactionError, TransactionTrait,
    sea_query::{Expr, Func, LikeExpr, OnConflict},
};

use swampnotes_domain::id::{CourseId, NoteId, UserId};
use swampnotes_domain::pagination::PageRequest;
use swampnotes_domain::points;
use swampnotes_market_schema::{courses, notes, purchases, users};

use crate::domain::repository::{
    CourseRepository, NoteRepository, PointsLedger, PurchaseRepository, PurchaseTransaction,
    PurchaseUnitOfWork, UserRepository,
};
use crate::domain::types::{Course, Note, NoteSearch, ProfileUpdate, Purchase, User};
use crate::error::MarketServiceError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: Arc<DatabaseConnection>,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, MarketServiceError> {
        let model = users::Entity::find_by_id(id.as_uuid())
            .one(&*self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_subject(&self, subject: &str) -> Result<Option<User>, MarketServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Subject.eq(subject))
            .one(&*self.db)
            .await
            .context("find user by subject")?;
        Ok(model.map(user_from_model))
    }

    async fn insert_if_absent(&self, user: &User) -> Result<bool, MarketServiceError> {
        let rows = users::Entity::insert(users::ActiveModel {
            id: Set(user.id.as_uuid()),
            subject: Set(user.subject.clone()),
            email: Set(user.email.clone()),
            name: Set(user.name.clone()),
            display_name: Set(user.display_name.clone()),
            bio: Set(user.bio.clone()),
            is_profile_public: Set(user.is_profile_public),
            show_email: Set(user.show_email),
            is_admin: Set(user.is_admin),
            points: Set(user.points),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        })
        .on_conflict(
            OnConflict::column(users::Column::Subject)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&*self.db)
        .await
        .context("insert user")?;
        Ok(rows == 1)
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, MarketServiceError> {
        let mut query = users::Entity::update_many()
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()));
        if let Some(ref display_name) = update.display_name {
            query = query.col_expr(users::Column::DisplayName, Expr::value(display_name.clone()));
        }
        if let Some(ref bio) = update.bio {
            query = query.col_expr(users::Column::Bio, Expr::value(bio.clone()));
        }
        if let Some(is_public) = update.is_profile_public {
            query = query.col_expr(users::Column::IsProfilePublic, Expr::value(is_public));
        }
        if let Some(show_email) = update.show_email {
            query = query.col_expr(users::Column::ShowEmail, Expr::value(show_email));
        }
        let result = query
            .filter(users::Column::Id.eq(id.as_uuid()))
            .exec(&*self.db)
            .await
            .context("update user profile")?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }
}

impl PointsLedger for DbUserRepository {
    async fn credit(&self, user_id: UserId, amount: i64) -> Result<i64, MarketServiceError> {
        self.db
            .transaction::<_, i64, MarketServiceError>(move |txn| {
                Box::pin(async move {
                    let user = users::Entity::find_by_id(user_id.as_uuid())
                        .lock_exclusive()
                        .one(txn)
                        .await
                        .context("lock user for credit")?
                        .ok_or(MarketServiceError::UserNotFound)?;
                    let balance = points::credit(user.points, amount)?;
                    set_balance(txn, user_id, balance).await?;
                    Ok(balance)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(e) => anyhow::Error::new(e)
                    .context("credit transaction")
                    .into(),
                TransactionError::Transaction(e) => e,
            })
    }
}

async fn set_balance(
    txn: &DatabaseTransaction,
    user_id: UserId,
    balance: i64,
) -> Result<(), MarketServiceError> {
    users::Entity::update_many()
        .col_expr(users::Column::Points, Expr::value(balance))
        .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(users::Column::Id.eq(user_id.as_uuid()))
        .exec(txn)
        .await
        .context("write user balance")?;
    Ok(())
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: UserId(model.id),
        subject: model.subject,
        email: model.email,
        name: model.name,
        display_name: model.display_name,
        bio: model.bio,
        is_profile_public: model.is_profile_public,
        show_email: model.show_email,
        is_admin: model.is_admin,
        points: model.points,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Note repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbNoteRepository {
    pub db: Arc<DatabaseConnection>,
}

impl NoteRepository for DbNoteRepository {
    async fn find_by_id(&self, id: NoteId) -> Result<Option<Note>, MarketServiceError> {
        let model = notes::Entity::find_by_id(id.as_uuid())
            .one(&*self.db)
            .await
            .context("find note by id")?;
        Ok(model.map(note_from_model))
    }

    async fn create(&self, note: &Note) -> Result<(), MarketServiceError> {
        notes::ActiveModel {
            id: Set(note.id.as_uuid()),
            author_id: Set(note.author_id.as_uuid()),
            course_id: Set(note.course_id.as_uuid()),
            title: Set(note.title.clone()),
            description: Set(note.description.clone()),
            course_name: Set(note.course_name.clone()),
            semester: Set(note.semester.clone()),
            price: Set(note.price),
            is_free: Set(note.is_free),
            content_handle: Set(note.content_handle.clone()),
            content_type: Set(note.content_type.clone()),
            downloads: Set(note.downloads),
            views: Set(note.views),
            created_at: Set(note.created_at),
        }
        .insert(&*self.db)
        .await
        .context("create note")?;
        Ok(())
    }

    async fn search(&self, search: &NoteSearch) -> Result<Vec<Note>, MarketServiceError> {
        let mut filter = Condition::all();
        if let Some(ref query) = search.query {
            let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
            let text = Condition::any()
                .add(lower_like(notes::Column::Title, &pattern))
                .add(lower_like(notes::Column::Description, &pattern))
                .add(lower_like(notes::Column::CourseName, &pattern));
            filter = filter.add(text);
        }
        if let Some(course_id) = search.course_id {
            filter = filter.add(notes::Column::CourseId.eq(course_id.as_uuid()));
        }
        if let Some(ref semester) = search.semester {
            filter = filter.add(notes::Column::Semester.eq(semester.as_str()));
        }
        let page = search.page.clamped();
        let models = notes::Entity::find()
            .filter(filter)
            .order_by_desc(notes::Column::CreatedAt)
            .order_by_desc(notes::Column::Id)
            .limit(u64::from(page.limit))
            .offset(u64::from(page.offset))
            .all(&*self.db)
            .await
            .context("search notes")?;
        Ok(models.into_iter().map(note_from_model).collect())
    }

    async fn list_by_author(
        &self,
        author_id: UserId,
        page: PageRequest,
    ) -> Result<Vec<Note>, MarketServiceError> {
        let page = page.clamped();
        let models = notes::Entity::find()
            .filter(notes::Column::AuthorId.eq(author_id.as_uuid()))
            .order_by_desc(notes::Column::CreatedAt)
            .order_by_desc(notes::Column::Id)
            .limit(u64::from(page.limit))
            .offset(u64::from(page.offset))
            .all(&*self.db)
            .await
            .context("list notes by author")?;
        Ok(models.into_iter().map(note_from_model).collect())
    }

    async fn list_purchased(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Vec<Note>, MarketServiceError> {
        let page = page.clamped();
        let models = notes::Entity::find()
            .join(
                sea_orm::JoinType::InnerJoin,
                notes::Relation::Purchases.def(),
            )
            .filter(purchases::Column::UserId.eq(user_id.as_uuid()))
            .order_by_desc(purchases::Column::PurchasedAt)
            .order_by_desc(notes::Column::Id)
            .limit(u64::from(page.limit))
            .offset(u64::from(page.offset))
            .all(&*self.db)
            .await
            .context("list purchased notes")?;
        Ok(models.into_iter().map(note_from_model).collect())
    }

    async fn increment_downloads(&self, id: NoteId) -> Result<(), MarketServiceError> {
        notes::Entity::update_many()
            .col_expr(
                notes::Column::Downloads,
                Expr::col(notes::Column::Downloads).add(1),
            )
            .filter(notes::Column::Id.eq(id.as_uuid()))
            .exec(&*self.db)
            .await
            .context("increment note downloads")?;
        Ok(())
    }

    async fn increment_views(&self, id: NoteId) -> Result<(), MarketServiceError> {
        notes::Entity::update_many()
            .col_expr(notes::Column::Views, Expr::col(notes::Column::Views).add(1))
            .filter(notes::Column::Id.eq(id.as_uuid()))
            .exec(&*self.db)
            .await
            .context("increment note views")?;
        Ok(())
    }
}

/// `LOWER(column) LIKE pattern ESCAPE '\'`.
fn lower_like(column: notes::Column, pattern: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\'))
}

/// Escape LIKE metacharacters so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn note_from_model(model: notes::Model) -> Note {
    Note {
        id: NoteId(model.id),
        author_id: UserId(model.author_id),
        course_id: CourseId(model.course_id),
        title: model.title,
        description: model.description,
        course_name: model.course_name,
        semester: model.semester,
        price: model.price,
        is_free: model.is_free,
        content_handle: model.content_handle,
        content_type: model.content_type,
        downloads: model.downloads,
        views: model.views,
        created_at: model.created_at,
    }
}

// ── Purchase repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPurchaseRepository {
    pub db: Arc<DatabaseConnection>,
}

impl PurchaseRepository for DbPurchaseRepository {
    async fn exists(&self, user_id: UserId, note_id: NoteId) -> Result<bool, MarketServiceError> {
        let model = purchases::Entity::find()
            .filter(purchases::Column::UserId.eq(user_id.as_uuid()))
            .filter(purchases::Column::NoteId.eq(note_id.as_uuid()))
            .one(&*self.db)
            .await
            .context("check purchase exists")?;
        Ok(model.is_some())
    }
}

// ── Purchase transaction ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPurchaseUnitOfWork {
    pub db: Arc<DatabaseConnection>,
}

impl PurchaseUnitOfWork for DbPurchaseUnitOfWork {
    type Tx = DbPurchaseTransaction;

    async fn begin(&self) -> Result<DbPurchaseTransaction, MarketServiceError> {
        let txn = self
            .db
            .begin()
            .await
            .context("begin purchase transaction")?;
        Ok(DbPurchaseTransaction { txn })
    }
}

/// One purchase attempt inside a database transaction. sea-orm rolls the
/// transaction back when it is dropped uncommitted.
pub struct DbPurchaseTransaction {
    txn: DatabaseTransaction,
}

impl PurchaseTransaction for DbPurchaseTransaction {
    async fn find_note(&mut self, id: NoteId) -> Result<Option<Note>, MarketServiceError> {
        let model = notes::Entity::find_by_id(id.as_uuid())
            .one(&self.txn)
            .await
            .context("find note for purchase")?;
        Ok(model.map(note_from_model))
    }

    async fn purchase_exists(
        &mut self,
        user_id: UserId,
        note_id: NoteId,
    ) -> Result<bool, MarketServiceError> {
        let model = purchases::Entity::find()
            .filter(purchases::Column::UserId.eq(user_id.as_uuid()))
            .filter(purchases::Column::NoteId.eq(note_id.as_uuid()))
            .one(&self.txn)
            .await
            .context("check purchase exists")?;
        Ok(model.is_some())
    }

    async fn debit(&mut self, user_id: UserId, amount: i64) -> Result<i64, MarketServiceError> {
        // FOR UPDATE holds the user row until commit/rollback, serialising
        // concurrent debits of the same balance.
        let user = users::Entity::find_by_id(user_id.as_uuid())
            .lock_exclusive()
            .one(&self.txn)
            .await
            .context("lock user for debit")?
            .ok_or(MarketServiceError::UserNotFound)?;
        let balance = points::debit(user.points, amount)?;
        set_balance(&self.txn, user_id, balance).await?;
        Ok(balance)
    }

    async fn insert_purchase(&mut self, purchase: &Purchase) -> Result<bool, MarketServiceError> {
        let rows = purchases::Entity::insert(purchases::ActiveModel {
            id: Set(purchase.id.as_uuid()),
            user_id: Set(purchase.user_id.as_uuid()),
            note_id: Set(purchase.note_id.as_uuid()),
            price_paid: Set(purchase.price_paid),
            purchased_at: Set(purchase.purchased_at),
        })
        .on_conflict(
            OnConflict::columns([purchases::Column::UserId, purchases::Column::NoteId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.txn)
        .await
        .context("insert purchase")?;
        Ok(rows == 1)
    }

    async fn commit(self) -> Result<(), MarketServiceError> {
        self.txn.commit().await.context("commit purchase")?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), MarketServiceError> {
        self.txn.rollback().await.context("roll back purchase")?;
        Ok(())
    }
}

// ── Course repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCourseRepository {
    pub db: Arc<DatabaseConnection>,
}

impl CourseRepository for DbCourseRepository {
    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>, MarketServiceError> {
        let model = courses::Entity::find_by_id(id.as_uuid())
            .one(&*self.db)
            .await
            .context("find course by id")?;
        Ok(model.map(course_from_model))
    }

    async fn list(&self) -> Result<Vec<Course>, MarketServiceError> {
        let models = courses::Entity::find()
            .order_by_asc(courses::Column::Code)
            .order_by_asc(courses::Column::School)
            .all(&*self.db)
            .await
            .context("list courses")?;
        Ok(models.into_iter().map(course_from_model).collect())
    }

    async fn create(&self, course: &Course) -> Result<(), MarketServiceError> {
        let rows = courses::Entity::insert(courses::ActiveModel {
            id: Set(course.id.as_uuid()),
            code: Set(course.code.clone()),
            title: Set(course.title.clone()),
            school: Set(course.school.clone()),
            created_at: Set(course.created_at),
        })
        .on_conflict(
            OnConflict::columns([courses::Column::Code, courses::Column::School])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&*self.db)
        .await
        .context("create course")?;
        if rows == 0 {
            return Err(MarketServiceError::CourseAlreadyExists);
        }
        Ok(())
    }
}

fn course_from_model(model: courses::Model) -> Course {
    Course {
        id: CourseId(model.id),
        code: model.code,
        title: model.title,
        school: model.school,
        created_at: model.created_at,
    }
}
