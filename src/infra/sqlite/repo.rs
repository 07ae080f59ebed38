use std::path::PathBuf;

use crate::domain::entities::price::{PriceList, PriceListId, Product, ProductPage, ProductQuery};
use crate::infra::sqlite::queries::{
    apply_price_updates, create_price_list, delete_price_list, list_price_lists, query_products,
    rename_price_list, ApplyOutcome,
};
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::repo::{
    NewPriceList, PriceListRepository, RepoError, VariantPriceUpdate,
};

pub struct SqliteRepo {
    pub db_path: PathBuf,
}

impl SqliteRepo {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }
}

impl PriceListRepository for SqliteRepo {
    fn init(&self) -> Result<(), RepoError> {
        init_db(&self.db_path).map_err(RepoError::from)
    }

    fn list_price_lists(&self) -> Result<Vec<PriceList>, RepoError> {
        list_price_lists(&self.db_path).map_err(RepoError::from)
    }

    fn query_products(&self, query: ProductQuery) -> Result<ProductPage, RepoError> {
        let (products, total) = query_products(
            &self.db_path,
            query.price_list_id.0,
            &query.search,
            query.offset,
            query.limit,
        )?;

        Ok(ProductPage { products, total })
    }

    fn create_price_list(
        &self,
        meta: NewPriceList,
        products: &[Product],
    ) -> Result<PriceListId, RepoError> {
        let price_list_id =
            create_price_list(&self.db_path, &meta.name, &meta.source_path, products)?;

        Ok(PriceListId(price_list_id))
    }

    fn rename_price_list(&self, id: PriceListId, name: String) -> Result<(), RepoError> {
        match rename_price_list(&self.db_path, id.0, &name)? {
            0 => Err(RepoError::PriceListNotFound(id.0)),
            _ => Ok(()),
        }
    }

    fn delete_price_list(&self, id: PriceListId) -> Result<(), RepoError> {
        match delete_price_list(&self.db_path, id.0)? {
            0 => Err(RepoError::PriceListNotFound(id.0)),
            _ => Ok(()),
        }
    }

    fn apply_price_updates(
        &self,
        id: PriceListId,
        updates: &[VariantPriceUpdate],
    ) -> Result<(), RepoError> {
        match apply_price_updates(&self.db_path, id.0, updates)? {
            ApplyOutcome::Applied { changed } => {
                tracing::debug!("price list #{}: {changed} amount(s) changed", id.0);
                Ok(())
            }
            ApplyOutcome::MissingPriceList => Err(RepoError::PriceListNotFound(id.0)),
            ApplyOutcome::MissingVariant(variant_id) => Err(RepoError::VariantNotFound {
                price_list_id: id.0,
                variant_id,
            }),
        }
    }
}
