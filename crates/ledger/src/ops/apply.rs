//! The single write path to a capital account.
//!
//! Every balance-affecting event goes through [`Ledger::apply`] (directly or
//! via a flow operation): one ledger entry insert plus one guarded balance
//! update, both inside the same database transaction. A ledger entry without
//! a matching balance mutation, or vice versa, is structurally impossible.

use chrono::Utc;
use sea_orm::{DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr};

use crate::util::model_currency;
use crate::{
    ApplyCmd, EntryKind, EntryRef, LedgerEntry, LedgerError, ResultLedger, accounts, entries,
};

use super::{Ledger, with_tx};

/// Non-fatal overdraw notice.
///
/// An owned-stock purchase is recorded even when it drives the balance
/// negative; the caller gets this value back to display, and the entry still
/// commits. Never raised as an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InsufficientCapital {
    pub balance_after_minor: i64,
    pub shortfall_minor: i64,
}

/// Result of a successful apply.
#[derive(Clone, Debug)]
pub struct Applied {
    pub entry: LedgerEntry,
    pub warning: Option<InsufficientCapital>,
}

impl Ledger {
    /// Posts a single ledger entry and moves the balance accordingly.
    ///
    /// The sign is derived from the command's kind; callers supply only
    /// non-negative magnitudes. A reference acts as a dedup key: retrying
    /// with a `(vendor, kind, reference)` that already landed fails with
    /// [`LedgerError::DuplicateReference`] instead of double-posting.
    pub async fn apply(&self, cmd: ApplyCmd) -> ResultLedger<Applied> {
        with_tx!(self, |db_tx| {
            let applied = self.apply_in_tx(&db_tx, &cmd).await?;
            Ok(applied)
        })
    }

    pub(super) async fn find_entry_by_reference(
        &self,
        db: &DatabaseTransaction,
        vendor_id: &str,
        kind: EntryKind,
        reference: &EntryRef,
    ) -> ResultLedger<Option<entries::Model>> {
        entries::Entity::find()
            .filter(entries::Column::VendorId.eq(vendor_id.to_string()))
            .filter(entries::Column::Kind.eq(kind.as_str().to_string()))
            .filter(entries::Column::ReferenceKind.eq(reference.kind.as_str().to_string()))
            .filter(entries::Column::ReferenceId.eq(reference.id.clone()))
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn apply_in_tx(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: &ApplyCmd,
    ) -> ResultLedger<Applied> {
        if cmd.amount_minor <= 0 {
            return Err(LedgerError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }

        let duplicate = |reference: &EntryRef| {
            LedgerError::DuplicateReference(format!(
                "{} {} already has a {} entry for vendor {}",
                reference.kind.as_str(),
                reference.id,
                cmd.kind.as_str(),
                cmd.vendor_id
            ))
        };

        if let Some(reference) = &cmd.reference
            && self
                .find_entry_by_reference(db_tx, &cmd.vendor_id, cmd.kind, reference)
                .await?
                .is_some()
        {
            return Err(duplicate(reference));
        }

        let account = self.require_account(db_tx, &cmd.vendor_id).await?;
        let currency = model_currency(&account.currency)?;
        let entry = LedgerEntry::new(
            cmd.vendor_id.clone(),
            cmd.kind,
            cmd.amount_minor,
            account.current_balance_minor,
            currency,
            cmd.description.clone(),
            cmd.reference.clone(),
            Utc::now(),
        )?;

        if let Err(err) = entries::ActiveModel::from(&entry).insert(db_tx).await {
            // The unique dedup index may have raced the precheck; resolve to
            // the dedup error rather than a bare DB failure.
            if let Some(reference) = &cmd.reference
                && self
                    .find_entry_by_reference(db_tx, &cmd.vendor_id, cmd.kind, reference)
                    .await?
                    .is_some()
            {
                return Err(duplicate(reference));
            }
            return Err(err.into());
        }

        // Guarded update: zero rows means another writer moved the balance
        // between our read and this write. Nothing commits in that case.
        let update = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::CurrentBalanceMinor,
                Expr::value(entry.balance_after_minor),
            )
            .filter(accounts::Column::VendorId.eq(cmd.vendor_id.clone()))
            .filter(accounts::Column::CurrentBalanceMinor.eq(entry.balance_before_minor))
            .exec(db_tx)
            .await?;
        if update.rows_affected != 1 {
            return Err(LedgerError::Conflict(format!(
                "concurrent balance update for vendor {}",
                cmd.vendor_id
            )));
        }

        let warning = (entry.signed_amount_minor() < 0 && entry.balance_after_minor < 0).then(|| {
            InsufficientCapital {
                balance_after_minor: entry.balance_after_minor,
                shortfall_minor: -entry.balance_after_minor,
            }
        });

        Ok(Applied { entry, warning })
    }
}
