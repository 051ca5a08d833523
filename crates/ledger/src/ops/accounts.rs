use chrono::Utc;
use sea_orm::{DatabaseTransaction, TransactionTrait, prelude::*};

use crate::{CapitalAccount, LedgerError, OpenAccountCmd, ResultLedger, accounts};

use super::{Ledger, with_tx};

impl Ledger {
    pub(super) async fn require_account(
        &self,
        db: &DatabaseTransaction,
        vendor_id: &str,
    ) -> ResultLedger<accounts::Model> {
        accounts::Entity::find_by_id(vendor_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(vendor_id.to_string()))
    }

    /// Onboards a vendor's capital account.
    ///
    /// `initial_capital` is set here once and is immutable afterwards; the
    /// running balance starts equal to it. No ledger entry is written: the
    /// initial capital is the base term of the account invariant, not an
    /// event.
    pub async fn open_account(&self, cmd: OpenAccountCmd) -> ResultLedger<CapitalAccount> {
        if cmd.initial_capital_minor < 0 {
            return Err(LedgerError::InvalidAmount(
                "initial_capital_minor must be >= 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_vendor(&db_tx, &cmd.vendor_id).await?;
            if accounts::Entity::find_by_id(cmd.vendor_id.clone())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(LedgerError::AccountExists(cmd.vendor_id.clone()));
            }

            let account = CapitalAccount {
                vendor_id: cmd.vendor_id.clone(),
                initial_capital_minor: cmd.initial_capital_minor,
                current_balance_minor: cmd.initial_capital_minor,
                currency: cmd.currency.unwrap_or_default(),
                created_at: Utc::now(),
            };
            accounts::ActiveModel::from(&account).insert(&db_tx).await?;
            Ok(account)
        })
    }

    /// Snapshot of the stored account.
    ///
    /// `current_balance` here is the materialized value; callers that need
    /// certainty about a vendor's true position go through
    /// [`Ledger::reconcile`] instead of trusting this field.
    pub async fn account(&self, vendor_id: &str) -> ResultLedger<CapitalAccount> {
        let model = accounts::Entity::find_by_id(vendor_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(vendor_id.to_string()))?;
        CapitalAccount::try_from(model)
    }
}
