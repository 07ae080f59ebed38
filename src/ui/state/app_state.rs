use dioxus::prelude::{use_signal, Signal};

use price_bulk_editor::domain::entities::currency::CurrencyFields;
use price_bulk_editor::domain::entities::price::{PriceList, Product};
use price_bulk_editor::domain::grid::PriceGrid;
use price_bulk_editor::domain::session::EditorSession;

const DEFAULT_CURRENCY_FIELDS: [&str; 2] = ["EUR", "USD"];

pub struct AppState {
    pub price_lists: Signal<Vec<PriceList>>,
    pub selected_price_list_id: Signal<Option<i64>>,
    pub products: Signal<Vec<Product>>,
    pub currency_fields: Signal<CurrencyFields>,
    pub search: Signal<String>,
    pub name_input: Signal<String>,
    pub session: Signal<EditorSession>,
    pub busy: Signal<bool>,
    pub status: Signal<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            price_lists: use_signal(Vec::<PriceList>::new),
            selected_price_list_id: use_signal(|| None::<i64>),
            products: use_signal(Vec::<Product>::new),
            currency_fields: use_signal(|| {
                CurrencyFields::from_codes(DEFAULT_CURRENCY_FIELDS).unwrap_or_default()
            }),
            search: use_signal(String::new),
            name_input: use_signal(String::new),
            session: use_signal(|| EditorSession::new(PriceGrid::default())),
            busy: use_signal(|| false),
            status: use_signal(|| "就緒".to_string()),
        }
    }
}
