use std::sync::Arc;

use crate::domain::entities::currency::CurrencyFields;
use crate::domain::entities::price::{PriceList, ProductPage, ProductQuery};
use crate::domain::grid::PriceGrid;
use crate::usecase::ports::repo::{PriceListRepository, RepoError};

pub struct QueryService {
    repo: Arc<dyn PriceListRepository>,
}

impl QueryService {
    pub fn new(repo: Arc<dyn PriceListRepository>) -> Self {
        Self { repo }
    }

    pub fn list_price_lists(&self) -> Result<Vec<PriceList>, RepoError> {
        self.repo.list_price_lists()
    }

    pub fn query_products(&self, query: ProductQuery) -> Result<ProductPage, RepoError> {
        self.repo.query_products(query)
    }

    /// Loads a page and lays it out for the chosen currency columns.
    pub fn load_grid(
        &self,
        query: ProductQuery,
        fields: &CurrencyFields,
    ) -> Result<(PriceGrid, i64), RepoError> {
        let page = self.repo.query_products(query)?;
        Ok((PriceGrid::new(&page.products, fields), page.total))
    }
}
