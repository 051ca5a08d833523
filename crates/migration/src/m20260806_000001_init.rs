//! Initial schema migration - creates all tables from scratch.
//!
//! Complete schema for the Souq vendor capital ledger:
//!
//! - `users`: staff authentication for the HTTP surface
//! - `vendors`: vendor identity rows
//! - `capital_accounts`: one running-balance account per vendor
//! - `ledger_entries`: append-only log of capital-affecting events
//! - `products`: inventory batches (owned / consignment)

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum Vendors {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum CapitalAccounts {
    Table,
    VendorId,
    InitialCapitalMinor,
    CurrentBalanceMinor,
    Currency,
    CreatedAt,
}

#[derive(Iden)]
enum LedgerEntries {
    Table,
    Id,
    VendorId,
    Kind,
    AmountMinor,
    BalanceBeforeMinor,
    BalanceAfterMinor,
    Currency,
    Description,
    ReferenceKind,
    ReferenceId,
    CreatedAt,
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
    VendorId,
    Name,
    SourceType,
    UnitCostMinor,
    QuantityOnHand,
    QuantitySold,
    QuantitySettled,
    Archived,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Vendors
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Vendors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vendors::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vendors::Name).string().not_null())
                    .col(ColumnDef::new(Vendors::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Capital accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CapitalAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CapitalAccounts::VendorId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CapitalAccounts::InitialCapitalMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CapitalAccounts::CurrentBalanceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CapitalAccounts::Currency)
                            .string()
                            .not_null()
                            .default("EGP"),
                    )
                    .col(
                        ColumnDef::new(CapitalAccounts::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-capital_accounts-vendor_id")
                            .from(CapitalAccounts::Table, CapitalAccounts::VendorId)
                            .to(Vendors::Table, Vendors::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Ledger entries
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerEntries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LedgerEntries::VendorId).string().not_null())
                    .col(ColumnDef::new(LedgerEntries::Kind).string().not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::BalanceBeforeMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::BalanceAfterMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::Currency)
                            .string()
                            .not_null()
                            .default("EGP"),
                    )
                    .col(ColumnDef::new(LedgerEntries::Description).string())
                    .col(ColumnDef::new(LedgerEntries::ReferenceKind).string())
                    .col(ColumnDef::new(LedgerEntries::ReferenceId).string())
                    .col(
                        ColumnDef::new(LedgerEntries::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ledger_entries-vendor_id")
                            .from(LedgerEntries::Table, LedgerEntries::VendorId)
                            .to(CapitalAccounts::Table, CapitalAccounts::VendorId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-vendor_id-created_at")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::VendorId)
                    .col(LedgerEntries::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Dedup key for retry safety: one entry per (vendor, kind, reference).
        // NULL references never collide.
        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-reference-unique")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::VendorId)
                    .col(LedgerEntries::Kind)
                    .col(LedgerEntries::ReferenceKind)
                    .col(LedgerEntries::ReferenceId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Products
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::VendorId).string().not_null())
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(ColumnDef::new(Products::SourceType).string().not_null())
                    .col(
                        ColumnDef::new(Products::UnitCostMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Products::QuantityOnHand)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Products::QuantitySold)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Products::QuantitySettled)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Products::Archived).boolean().not_null())
                    .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-products-vendor_id")
                            .from(Products::Table, Products::VendorId)
                            .to(Vendors::Table, Vendors::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-products-vendor_id-archived")
                    .table(Products::Table)
                    .col(Products::VendorId)
                    .col(Products::Archived)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CapitalAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vendors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
