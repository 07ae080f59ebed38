use std::sync::Arc;

use thiserror::Error;

use crate::domain::entities::currency::currency;
use crate::domain::entities::edit::{CellId, ColumnKey, PendingEdits};
use crate::domain::entities::price::{MoneyAmount, PriceListId, Product};
use crate::domain::grid::OriginalValues;
use crate::domain::session::EditorSession;
use crate::usecase::ports::repo::{NewPriceList, PriceListRepository, RepoError, VariantPriceUpdate};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    #[error("invalid amount {value:?} for {cell}")]
    InvalidAmount { cell: CellId, value: String },
    #[error("unsupported currency column {0}")]
    UnknownCurrency(ColumnKey),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub struct EditService {
    repo: Arc<dyn PriceListRepository>,
}

impl EditService {
    pub fn new(repo: Arc<dyn PriceListRepository>) -> Self {
        Self { repo }
    }

    /// Shapes the cell-keyed overlay into one update per variant.
    pub fn build_updates(edits: &PendingEdits) -> Result<Vec<VariantPriceUpdate>, CommitError> {
        let mut updates = Vec::new();
        for (row, columns) in edits.by_row() {
            let mut prices = Vec::with_capacity(columns.len());
            for (column, value) in columns {
                let known = currency(column.as_str())
                    .ok_or_else(|| CommitError::UnknownCurrency(column.clone()))?;
                let amount =
                    known
                        .parse_amount(value)
                        .ok_or_else(|| CommitError::InvalidAmount {
                            cell: CellId {
                                row: row.clone(),
                                column: column.clone(),
                            },
                            value: value.to_string(),
                        })?;
                prices.push(MoneyAmount {
                    currency_code: known.code.to_ascii_lowercase(),
                    amount,
                });
            }
            updates.push(VariantPriceUpdate {
                variant_id: row.as_str().to_string(),
                prices,
            });
        }
        Ok(updates)
    }

    /// Persists the session's pending edits and returns how many variants changed.
    ///
    /// The session is only reset after the repository accepted every update;
    /// on error its overlay is exactly as before so the user can retry.
    pub fn commit<U: OriginalValues>(
        &self,
        price_list_id: PriceListId,
        session: &mut EditorSession<U>,
    ) -> Result<usize, CommitError> {
        let snapshot = session.snapshot_pending_edits();
        if snapshot.is_empty() {
            return Ok(0);
        }

        let updates = Self::build_updates(&snapshot)?;
        if let Err(err) = self.repo.apply_price_updates(price_list_id, &updates) {
            tracing::warn!(
                price_list_id = price_list_id.0,
                edits = snapshot.len(),
                "saving price edits failed: {err}"
            );
            return Err(err.into());
        }

        session.complete_commit();
        tracing::info!(
            price_list_id = price_list_id.0,
            edits = snapshot.len(),
            variants = updates.len(),
            "saved price edits"
        );
        Ok(updates.len())
    }

    pub fn create_price_list(
        &self,
        meta: NewPriceList,
        products: &[Product],
    ) -> Result<PriceListId, RepoError> {
        self.repo.create_price_list(meta, products)
    }

    pub fn rename_price_list(&self, id: PriceListId, name: String) -> Result<(), RepoError> {
        self.repo.rename_price_list(id, name)
    }

    pub fn delete_price_list(&self, id: PriceListId) -> Result<(), RepoError> {
        self.repo.delete_price_list(id)
    }
}
