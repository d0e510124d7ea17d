use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Notes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Notes::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(Notes::CourseId).uuid().not_null())
                    .col(ColumnDef::new(Notes::Title).string().not_null())
                    .col(ColumnDef::new(Notes::Description).text().null())
                    .col(ColumnDef::new(Notes::CourseName).string().not_null())
                    .col(ColumnDef::new(Notes::Semester).string().not_null())
                    .col(
                        ColumnDef::new(Notes::Price)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Notes::Price).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Notes::IsFree)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Notes::ContentHandle).string().not_null())
                    .col(
                        ColumnDef::new(Notes::ContentType)
                            .string()
                            .not_null()
                            .default("application/pdf"),
                    )
                    .col(
                        ColumnDef::new(Notes::Downloads)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Notes::Views)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Notes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Notes::Table, Notes::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Notes::Table, Notes::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Notes::Table)
                    .col(Notes::AuthorId)
                    .name("idx_notes_author_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Notes::Table)
                    .col(Notes::CourseId)
                    .name("idx_notes_course_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Notes::Table)
                    .col(Notes::CreatedAt)
                    .name("idx_notes_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Notes {
    Table,
    Id,
    AuthorId,
    CourseId,
    Title,
    Description,
    CourseName,
    Semester,
    Price,
    IsFree,
    ContentHandle,
    ContentType,
    Downloads,
    Views,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Courses {
    Table,
    Id,
}
