use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContactInquiries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContactInquiries::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ContactInquiries::Name).string().not_null())
                    .col(ColumnDef::new(ContactInquiries::Email).string().not_null())
                    .col(
                        ColumnDef::new(ContactInquiries::Subject)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ContactInquiries::Message).text().not_null())
                    .col(
                        ColumnDef::new(ContactInquiries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContactInquiries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ContactInquiries {
    Table,
    Id,
    Name,
    Email,
    Subject,
    Message,
    CreatedAt,
}
