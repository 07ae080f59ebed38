use thiserror::Error;

use crate::domain::entities::price::{
    MoneyAmount, PriceList, PriceListId, Product, ProductPage, ProductQuery,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    #[error("{0}")]
    Message(String),
    #[error("price list #{0} not found")]
    PriceListNotFound(i64),
    #[error("variant {variant_id} is not in price list #{price_list_id}")]
    VariantNotFound {
        price_list_id: i64,
        variant_id: String,
    },
}

impl From<anyhow::Error> for RepoError {
    fn from(err: anyhow::Error) -> Self {
        RepoError::Message(format!("{err:#}"))
    }
}

pub trait PriceListRepository: Send + Sync {
    fn init(&self) -> Result<(), RepoError>;

    fn list_price_lists(&self) -> Result<Vec<PriceList>, RepoError>;
    fn query_products(&self, query: ProductQuery) -> Result<ProductPage, RepoError>;

    fn create_price_list(
        &self,
        meta: NewPriceList,
        products: &[Product],
    ) -> Result<PriceListId, RepoError>;
    fn rename_price_list(&self, id: PriceListId, name: String) -> Result<(), RepoError>;
    fn delete_price_list(&self, id: PriceListId) -> Result<(), RepoError>;

    /// Applies all updates atomically: either every row is written or none.
    fn apply_price_updates(
        &self,
        id: PriceListId,
        updates: &[VariantPriceUpdate],
    ) -> Result<(), RepoError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPriceList {
    pub name: String,
    pub source_path: String,
}

/// New amounts for one variant; currencies not listed are left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantPriceUpdate {
    pub variant_id: String,
    pub prices: Vec<MoneyAmount>,
}
