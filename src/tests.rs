use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::Connection;

use crate::config::{default_db_path, ensure_webview_data_dir};
use crate::domain::entities::currency::CurrencyFields;
use crate::domain::entities::edit::{CellId, PendingEdits};
use crate::domain::entities::price::{MoneyAmount, PriceListId, Product, ProductQuery, Variant};
use crate::domain::session::EditorSession;
use crate::infra::import::xlsx::read_xlsx_price_sheet;
use crate::infra::sqlite::queries::{load_price_changes, query_products};
use crate::infra::sqlite::repo::SqliteRepo;
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::repo::{NewPriceList, PriceListRepository, RepoError, VariantPriceUpdate};
use crate::usecase::services::edit_service::{CommitError, EditService};
use crate::usecase::services::import_service::ImportService;
use crate::usecase::services::query_service::QueryService;

fn unique_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("price-bulk-editor-{prefix}-{nanos}"))
}

fn variant(id: &str, sku: &str, prices: &[(&str, i64)]) -> Variant {
    Variant {
        id: id.to_string(),
        title: format!("Variant {id}"),
        sku: sku.to_string(),
        prices: prices
            .iter()
            .map(|(code, amount)| MoneyAmount {
                currency_code: code.to_string(),
                amount: *amount,
            })
            .collect(),
    }
}

fn sample_products() -> Vec<Product> {
    vec![
        Product {
            id: "prod_shirt".to_string(),
            title: "Linen Shirt".to_string(),
            thumbnail: None,
            variants: vec![
                variant("R1", "SHIRT-S", &[("eur", 900), ("usd", 1000)]),
                variant("R2", "SHIRT-M", &[("eur", 950), ("usd", 1100)]),
            ],
        },
        Product {
            id: "prod_mug".to_string(),
            title: "Enamel Mug".to_string(),
            thumbnail: Some("https://cdn.example/mug.png".to_string()),
            variants: vec![variant("R3", "MUG-1", &[("usd", 500)])],
        },
        Product {
            id: "prod_cap".to_string(),
            title: "Cap".to_string(),
            thumbnail: None,
            variants: vec![variant("R4", "CAP-RED", &[])],
        },
    ]
}

struct Fixture {
    temp_dir: PathBuf,
    repo: Arc<SqliteRepo>,
    price_list_id: PriceListId,
}

impl Fixture {
    fn new(prefix: &str) -> Self {
        let temp_dir = unique_test_dir(prefix);
        fs::create_dir_all(&temp_dir).expect("should create temp dir");
        let repo = Arc::new(SqliteRepo::new(temp_dir.join("app.sqlite")));
        repo.init().expect("init should succeed");
        let price_list_id = repo
            .create_price_list(
                NewPriceList {
                    name: "Spring".to_string(),
                    source_path: "spring.csv".to_string(),
                },
                &sample_products(),
            )
            .expect("price list should be created");
        Self {
            temp_dir,
            repo,
            price_list_id,
        }
    }

    fn session(&self, codes: &[&str]) -> EditorSession {
        let fields = CurrencyFields::from_codes(codes.iter().copied()).expect("codes should be known");
        let (grid, _total) = QueryService::new(self.repo.clone())
            .load_grid(ProductQuery::all(self.price_list_id), &fields)
            .expect("grid should load");
        EditorSession::new(grid)
    }

    fn amount(&self, variant_id: &str, currency_code: &str) -> Option<i64> {
        let page = self
            .repo
            .query_products(ProductQuery::all(self.price_list_id))
            .expect("products should load");
        page.products
            .iter()
            .flat_map(|product| product.variants.iter())
            .find(|variant| variant.id == variant_id)
            .and_then(|variant| variant.price_in(currency_code))
            .map(|price| price.amount)
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.temp_dir);
    }
}

#[test]
fn init_db_creates_required_tables() {
    let temp_dir = unique_test_dir("init-db");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("app.sqlite");

    let result = init_db(&db_path);

    assert!(result.is_ok(), "init_db should succeed: {result:?}");

    let conn = Connection::open(&db_path).expect("should open sqlite db");
    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('price_list','product','variant','price','price_change')",
            [],
            |row| row.get(0),
        )
        .expect("table count query should succeed");

    assert_eq!(table_count, 5, "required tables should exist");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn created_price_list_loads_in_original_order() {
    let fixture = Fixture::new("create-load");

    let lists = fixture.repo.list_price_lists().expect("lists should load");
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].name, "Spring");
    assert!(!lists[0].created_at.is_empty());

    let page = fixture
        .repo
        .query_products(ProductQuery::all(fixture.price_list_id))
        .expect("products should load");
    assert_eq!(page.total, 3);
    assert_eq!(page.products, sample_products());
}

#[test]
fn query_products_supports_search_and_paging() {
    let fixture = Fixture::new("query");
    let db_path = &fixture.repo.db_path;

    let (by_sku, total) =
        query_products(db_path, fixture.price_list_id.0, "shirt-m", 0, 10).expect("query should run");
    assert_eq!(total, 1);
    assert_eq!(by_sku[0].id, "prod_shirt");
    assert_eq!(by_sku[0].variants.len(), 2, "matching product keeps all variants");

    let (by_title, _) =
        query_products(db_path, fixture.price_list_id.0, "MUG", 0, 10).expect("query should run");
    assert_eq!(by_title.len(), 1);

    let (second_page, total) =
        query_products(db_path, fixture.price_list_id.0, "", 1, 1).expect("query should run");
    assert_eq!(total, 3);
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].id, "prod_mug");

    assert!(query_products(db_path, fixture.price_list_id.0, "", 0, 0).is_err());
}

#[test]
fn rename_and_delete_report_missing_lists() {
    let fixture = Fixture::new("rename-delete");
    let service = EditService::new(fixture.repo.clone());

    service
        .rename_price_list(fixture.price_list_id, "Summer".to_string())
        .expect("rename should succeed");
    let lists = fixture.repo.list_price_lists().expect("lists should load");
    assert_eq!(lists[0].name, "Summer");

    service
        .delete_price_list(fixture.price_list_id)
        .expect("delete should succeed");
    assert!(fixture.repo.list_price_lists().expect("lists should load").is_empty());

    assert_eq!(
        service.delete_price_list(fixture.price_list_id),
        Err(RepoError::PriceListNotFound(fixture.price_list_id.0))
    );
    assert_eq!(
        service.rename_price_list(fixture.price_list_id, "x".to_string()),
        Err(RepoError::PriceListNotFound(fixture.price_list_id.0))
    );
}

#[test]
fn import_csv_creates_price_list() {
    let temp_dir = unique_test_dir("import-csv");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let repo = Arc::new(SqliteRepo::new(temp_dir.join("app.sqlite")));
    repo.init().expect("init should succeed");
    let csv_path = temp_dir.join("autumn.csv");
    fs::write(
        &csv_path,
        "product_id,product_title,variant_id,variant_title,sku,USD,EUR\n\
         p1,Shirt,v1,S,SH-S,10.00,9\n\
         p1,Shirt,v2,M,SH-M,11.5,\n\
         p2,Mug,v3,Default,MUG,5,4.25\n",
    )
    .expect("should write csv fixture");

    let result = ImportService::new(repo.clone())
        .import_file(&csv_path)
        .expect("import should succeed");

    assert_eq!(result.product_count, 2);
    assert_eq!(result.variant_count, 3);

    let lists = repo.list_price_lists().expect("lists should load");
    assert_eq!(lists[0].name, "autumn");

    let page = repo
        .query_products(ProductQuery::all(result.price_list_id))
        .expect("products should load");
    let v2 = &page.products[0].variants[1];
    assert_eq!(v2.price_in("usd").map(|p| p.amount), Some(1150));
    assert_eq!(v2.price_in("eur"), None);
    let v3 = &page.products[1].variants[0];
    assert_eq!(v3.price_in("EUR").map(|p| p.amount), Some(425));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn import_rejects_unknown_currency_without_creating_list() {
    let temp_dir = unique_test_dir("import-bad");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let repo = Arc::new(SqliteRepo::new(temp_dir.join("app.sqlite")));
    repo.init().expect("init should succeed");
    let csv_path = temp_dir.join("bad.csv");
    fs::write(
        &csv_path,
        "product_id,product_title,variant_id,variant_title,sku,DOGE\np1,Shirt,v1,S,SH-S,1\n",
    )
    .expect("should write csv fixture");

    let result = ImportService::new(repo.clone()).import_csv(&csv_path);

    assert!(result.is_err(), "unknown currency column should be rejected");
    assert!(repo.list_price_lists().expect("lists should load").is_empty());

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn import_xlsx_creates_price_list() {
    let temp_dir = unique_test_dir("import-xlsx");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let repo = Arc::new(SqliteRepo::new(temp_dir.join("app.sqlite")));
    repo.init().expect("init should succeed");

    let result = ImportService::new(repo.clone())
        .import_xlsx(&fixture_path("price_sheet.xlsx"))
        .expect("xlsx import should succeed");

    assert_eq!(result.product_count, 2);
    assert_eq!(result.variant_count, 3);
    let lists = repo.list_price_lists().expect("lists should load");
    assert_eq!(lists[0].name, "price_sheet");

    let page = repo
        .query_products(ProductQuery::all(result.price_list_id))
        .expect("products should load");
    let shirt = &page.products[0];
    assert_eq!(shirt.title, "Shirt");
    assert_eq!(shirt.variants[0].sku, "SH-S");
    assert_eq!(shirt.variants[0].price_in("USD").map(|p| p.amount), Some(1250));
    assert_eq!(shirt.variants[0].price_in("JPY").map(|p| p.amount), Some(1500));
    assert_eq!(shirt.variants[1].price_in("USD").map(|p| p.amount), Some(1000));
    assert_eq!(shirt.variants[1].price_in("JPY"), None);
    let mug = &page.products[1].variants[0];
    assert_eq!(mug.price_in("USD"), None);
    assert_eq!(mug.price_in("JPY").map(|p| p.amount), Some(800));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn xlsx_blank_header_column_does_not_shift_currencies() {
    let temp_dir = unique_test_dir("import-xlsx-spacer");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let repo = Arc::new(SqliteRepo::new(temp_dir.join("app.sqlite")));
    repo.init().expect("init should succeed");

    let sheet_path = fixture_path("spacer_header.xlsx");
    let err = read_xlsx_price_sheet(&sheet_path).expect_err("spacer header should be rejected");
    assert!(format!("{err:#}").contains("column 6"), "unexpected error: {err:#}");

    assert!(ImportService::new(repo.clone()).import_xlsx(&sheet_path).is_err());
    assert!(repo.list_price_lists().expect("lists should load").is_empty());

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn build_updates_shapes_one_request_per_variant() {
    let fixture = Fixture::new("build-updates");
    let mut session = fixture.session(&["USD", "EUR", "JPY"]);
    session.set_modifier(true);
    for cell in [CellId::new("R1", "USD"), CellId::new("R1", "EUR"), CellId::new("R3", "USD")] {
        let _ = session.focus_cell(&cell).expect("cell should exist");
    }
    session
        .change_value(&CellId::new("R3", "USD"), "12.5")
        .expect("cell should exist");

    let updates =
        EditService::build_updates(&session.snapshot_pending_edits()).expect("amounts should parse");

    assert_eq!(
        updates,
        vec![
            VariantPriceUpdate {
                variant_id: "R1".to_string(),
                prices: vec![
                    MoneyAmount { currency_code: "eur".to_string(), amount: 1250 },
                    MoneyAmount { currency_code: "usd".to_string(), amount: 1250 },
                ],
            },
            VariantPriceUpdate {
                variant_id: "R3".to_string(),
                prices: vec![MoneyAmount { currency_code: "usd".to_string(), amount: 1250 }],
            },
        ]
    );
}

#[test]
fn commit_persists_edits_and_resets_session() {
    let fixture = Fixture::new("commit");
    let service = EditService::new(fixture.repo.clone());
    let mut session = fixture.session(&["USD", "EUR"]);
    let r1_usd = CellId::new("R1", "USD");
    let r4_eur = CellId::new("R4", "EUR");

    let _ = session.focus_cell(&r1_usd).expect("cell should exist");
    session.change_value(&r1_usd, "15").expect("cell should exist");
    let _ = session.blur_cell(&r1_usd);
    let _ = session.focus_cell(&r4_eur).expect("cell should exist");
    session.change_value(&r4_eur, "3.99").expect("cell should exist");

    let changed_variants = service
        .commit(fixture.price_list_id, &mut session)
        .expect("commit should succeed");

    assert_eq!(changed_variants, 2);
    assert!(!session.has_pending_edits());
    assert_eq!(session.active_len(), 0);
    assert_eq!(session.transient_value(), None);
    assert_eq!(fixture.amount("R1", "usd"), Some(1500));
    assert_eq!(fixture.amount("R4", "eur"), Some(399));
    assert_eq!(fixture.amount("R1", "eur"), Some(900));

    let changes = load_price_changes(&fixture.repo.db_path, fixture.price_list_id.0)
        .expect("audit log should load");
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].old_amount, Some(1000));
    assert_eq!(changes[0].new_amount, 1500);
    assert_eq!(changes[1].old_amount, None);

    let reloaded = fixture.session(&["USD", "EUR"]);
    assert_eq!(reloaded.display_value(&r1_usd).as_deref(), Some("15.00"));
}

#[test]
fn commit_with_nothing_pending_is_a_no_op() {
    let fixture = Fixture::new("commit-empty");
    let service = EditService::new(fixture.repo.clone());
    let mut session = fixture.session(&["USD"]);

    let changed = service
        .commit(fixture.price_list_id, &mut session)
        .expect("empty commit should succeed");

    assert_eq!(changed, 0);
    let changes = load_price_changes(&fixture.repo.db_path, fixture.price_list_id.0)
        .expect("audit log should load");
    assert!(changes.is_empty());
}

#[test]
fn invalid_amount_fails_commit_and_keeps_overlay() {
    let fixture = Fixture::new("commit-invalid");
    let service = EditService::new(fixture.repo.clone());
    let mut session = fixture.session(&["USD", "EUR"]);
    let r2_usd = CellId::new("R2", "USD");
    let r2_eur = CellId::new("R2", "EUR");
    let _ = session.focus_cell(&r2_eur).expect("cell should exist");
    session.change_value(&r2_eur, "8").expect("cell should exist");
    let _ = session.focus_cell(&r2_usd).expect("cell should exist");
    session.change_value(&r2_usd, "12,00").expect("cell should exist");
    let before = session.snapshot_pending_edits();

    let err = service
        .commit(fixture.price_list_id, &mut session)
        .expect_err("malformed amount should fail");

    assert_eq!(
        err,
        CommitError::InvalidAmount {
            cell: r2_usd.clone(),
            value: "12,00".to_string(),
        }
    );
    assert_eq!(session.snapshot_pending_edits(), before);
    assert!(session.is_active(&r2_usd));
    assert_eq!(fixture.amount("R2", "eur"), Some(950), "no partial write");
}

#[test]
fn repository_failure_keeps_overlay_for_retry() {
    let fixture = Fixture::new("commit-retry");
    let service = EditService::new(fixture.repo.clone());
    let mut session = fixture.session(&["USD"]);
    let r3_usd = CellId::new("R3", "USD");
    let _ = session.focus_cell(&r3_usd).expect("cell should exist");
    session.change_value(&r3_usd, "6").expect("cell should exist");
    let before = session.snapshot_pending_edits();

    let missing = PriceListId(fixture.price_list_id.0 + 100);
    let err = service
        .commit(missing, &mut session)
        .expect_err("missing price list should fail");
    assert_eq!(err, CommitError::Repo(RepoError::PriceListNotFound(missing.0)));
    assert_eq!(session.snapshot_pending_edits(), before);

    let changed = service
        .commit(fixture.price_list_id, &mut session)
        .expect("retry should succeed");
    assert_eq!(changed, 1);
    assert_eq!(fixture.amount("R3", "usd"), Some(600));
}

#[test]
fn unknown_variant_rolls_back_whole_batch() {
    let fixture = Fixture::new("rollback");
    let updates = vec![
        VariantPriceUpdate {
            variant_id: "R1".to_string(),
            prices: vec![MoneyAmount { currency_code: "usd".to_string(), amount: 1 }],
        },
        VariantPriceUpdate {
            variant_id: "ghost".to_string(),
            prices: vec![MoneyAmount { currency_code: "usd".to_string(), amount: 2 }],
        },
    ];

    let result = fixture
        .repo
        .apply_price_updates(fixture.price_list_id, &updates);

    assert_eq!(
        result,
        Err(RepoError::VariantNotFound {
            price_list_id: fixture.price_list_id.0,
            variant_id: "ghost".to_string(),
        })
    );
    assert_eq!(fixture.amount("R1", "usd"), Some(1000));
}

#[test]
fn empty_overlay_builds_no_updates() {
    let updates = EditService::build_updates(&PendingEdits::new()).expect("empty should build");
    assert!(updates.is_empty());
}

#[test]
fn default_db_path_uses_app_directory() {
    let db_path = default_db_path().expect("default db path should resolve");

    assert_eq!(
        db_path.file_name().and_then(|name| name.to_str()),
        Some("price_lists.sqlite")
    );
    assert!(
        db_path.to_string_lossy().contains("price-bulk-editor"),
        "db path should live under the app directory: {}",
        db_path.display()
    );
}

#[test]
fn ensure_webview_data_dir_creates_webview2_subdir() {
    let temp_dir = unique_test_dir("webview");

    let webview_dir = ensure_webview_data_dir(&temp_dir).expect("webview dir should be created");

    assert!(webview_dir.ends_with("webview2"));
    assert!(webview_dir.is_dir());

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}
