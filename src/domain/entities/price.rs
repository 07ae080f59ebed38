#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PriceListId(pub i64);

impl From<i64> for PriceListId {
    fn from(value: i64) -> Self {
        PriceListId(value)
    }
}

impl From<PriceListId> for i64 {
    fn from(value: PriceListId) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceList {
    pub id: PriceListId,
    pub name: String,
    pub source_path: String,
    pub created_at: String,
}

/// An amount in the currency's minor unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyAmount {
    pub currency_code: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub id: String,
    pub title: String,
    pub sku: String,
    pub prices: Vec<MoneyAmount>,
}

impl Variant {
    pub fn price_in(&self, currency_code: &str) -> Option<&MoneyAmount> {
        let code = currency_code.trim();
        self.prices
            .iter()
            .find(|price| price.currency_code.eq_ignore_ascii_case(code))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub variants: Vec<Variant>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub price_list_id: PriceListId,
    pub search: String,
    pub offset: i64,
    pub limit: i64,
}

impl ProductQuery {
    pub fn all(price_list_id: PriceListId) -> Self {
        Self {
            price_list_id,
            search: String::new(),
            offset: 0,
            limit: i64::MAX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: i64,
}
