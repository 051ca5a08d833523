//! Audit listing of the entry log.

use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sea_orm::{Condition, QueryFilter, QueryOrder, QuerySelect, prelude::*};

use crate::{EntryKind, LedgerEntry, LedgerError, ResultLedger, entries};

use super::Ledger;

/// Filters for listing ledger entries.
#[derive(Clone, Debug, Default)]
pub struct EntryListFilter {
    /// If present, acts as an allow-list of kinds to return.
    pub kinds: Option<Vec<EntryKind>>,
    /// `from` is inclusive and `to` is exclusive (`[from, to)`), both in UTC.
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

fn validate_list_filter(filter: &EntryListFilter) -> ResultLedger<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from >= to
    {
        return Err(LedgerError::InvalidAmount(
            "invalid range: from must be < to".to_string(),
        ));
    }
    if filter.kinds.as_ref().is_some_and(|k| k.is_empty()) {
        return Err(LedgerError::InvalidAmount(
            "kinds must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct EntriesCursor {
    created_at: DateTime<Utc>,
    entry_id: String,
}

impl EntriesCursor {
    fn encode(&self) -> ResultLedger<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| LedgerError::InvalidCursor("invalid entries cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultLedger<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| LedgerError::InvalidCursor("invalid entries cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| LedgerError::InvalidCursor("invalid entries cursor".to_string()))
    }
}

impl Ledger {
    /// Lists a vendor's ledger entries in replay order (oldest first), with
    /// cursor-based pagination.
    ///
    /// Pagination is keyset over `(created_at ASC, id ASC)`; pass the
    /// returned cursor back to fetch the next page.
    pub async fn list_entries(
        &self,
        vendor_id: &str,
        limit: u64,
        cursor: Option<&str>,
        filter: &EntryListFilter,
    ) -> ResultLedger<(Vec<LedgerEntry>, Option<String>)> {
        validate_list_filter(filter)?;

        let mut query = entries::Entity::find()
            .filter(entries::Column::VendorId.eq(vendor_id.to_string()))
            .order_by_asc(entries::Column::CreatedAt)
            .order_by_asc(entries::Column::Id)
            .limit(limit + 1);

        if let Some(from) = filter.from {
            query = query.filter(entries::Column::CreatedAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(entries::Column::CreatedAt.lt(to));
        }
        if let Some(kinds) = &filter.kinds {
            let kinds: Vec<String> = kinds.iter().map(|k| k.as_str().to_string()).collect();
            query = query.filter(entries::Column::Kind.is_in(kinds));
        }
        if let Some(cursor) = cursor {
            let cursor = EntriesCursor::decode(cursor)?;
            query = query.filter(
                Condition::any()
                    .add(entries::Column::CreatedAt.gt(cursor.created_at))
                    .add(
                        Condition::all()
                            .add(entries::Column::CreatedAt.eq(cursor.created_at))
                            .add(entries::Column::Id.gt(cursor.entry_id)),
                    ),
            );
        }

        let mut models = query.all(&self.database).await?;
        let next_cursor = if models.len() as u64 > limit {
            models.truncate(limit as usize);
            models.last().map(|m| {
                EntriesCursor {
                    created_at: m.created_at,
                    entry_id: m.id.clone(),
                }
                .encode()
            })
        } else {
            None
        };

        let out = models
            .into_iter()
            .map(LedgerEntry::try_from)
            .collect::<ResultLedger<Vec<_>>>()?;
        Ok((out, next_cursor.transpose()?))
    }
}
