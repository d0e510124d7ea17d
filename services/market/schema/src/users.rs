use sea_orm::entity::prelude::*;

/// Marketplace account, created on first authenticated contact.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Identity-provider subject (`sub` claim).
    #[sea_orm(unique)]
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub is_profile_public: bool,
    pub show_email: bool,
    pub is_admin: bool,
    /// Point balance; the database enforces `points >= 0`.
    pub points: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::notes::Entity")]
    Notes,
    #[sea_orm(has_many = "super::purchases::Entity")]
    Purchases,
}

impl Related<super::notes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notes.def()
    }
}

impl Related<super::purchases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
