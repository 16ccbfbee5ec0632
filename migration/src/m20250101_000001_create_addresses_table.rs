use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Addresses::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Addresses::Id)
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key()
                )
                .col(ColumnDef::new(Addresses::Street).string_len(255).not_null())
                .col(ColumnDef::new(Addresses::City).string_len(100).not_null())
                .col(ColumnDef::new(Addresses::State).string_len(100).null())
                .col(ColumnDef::new(Addresses::Country).string_len(100).not_null())
                .col(ColumnDef::new(Addresses::PostalCode).string_len(20).null())
                .col(ColumnDef::new(Addresses::Latitude).double().not_null())
                .col(ColumnDef::new(Addresses::Longitude).double().not_null())
                .col(ColumnDef::new(Addresses::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(Addresses::UpdatedAt).timestamp_with_time_zone().not_null())
                .to_owned()
        ).await?;

        // Lookup aid only; the nearby scan does not depend on it
        manager.create_index(
            Index::create()
                .name("idx_addresses_lat_lon")
                .table(Addresses::Table)
                .col(Addresses::Latitude)
                .col(Addresses::Longitude)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Addresses::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Addresses {
    Table,
    Id,
    Street,
    City,
    State,
    Country,
    PostalCode,
    Latitude,
    Longitude,
    CreatedAt,
    UpdatedAt,
}
