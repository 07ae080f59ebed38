use std::sync::Arc;

use dioxus::prelude::*;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

use price_bulk_editor::config::default_db_path;
use price_bulk_editor::domain::entities::currency::{self, CurrencyFields};
use price_bulk_editor::domain::entities::edit::{CellId, ColumnKey};
use price_bulk_editor::domain::entities::price::{PriceListId, Product, ProductQuery};
use price_bulk_editor::domain::grid::{filter_products, GridRow, PriceGrid};
use price_bulk_editor::domain::session::EditorSession;
use price_bulk_editor::infra::sqlite::repo::SqliteRepo;
use price_bulk_editor::usecase::ports::repo::{PriceListRepository, RepoError};
use price_bulk_editor::usecase::services::edit_service::EditService;
use price_bulk_editor::usecase::services::import_service::ImportService;
use price_bulk_editor::usecase::services::query_service::QueryService;

use crate::ui::state::app_state::AppState;

const TILE_STYLE: &str = "border: 1px solid #ddd; border-radius: 8px; background: #fafafa; height: 40px; min-width: 220px; display: flex; align-items: center; padding-left: 12px;";
const HEADER_CELL_STYLE: &str = "min-width: 220px; font-size: 13px; font-weight: 600; color: #888;";

fn price_cell_style(is_active: bool, is_edited: bool) -> String {
    let border = if is_active { "2px solid #7c6ff0" } else { "1px solid #ddd" };
    let background = if is_active { "#f3f1ff" } else { "#fff" };
    let weight = if is_edited { 600 } else { 400 };
    format!(
        "border: {border}; border-radius: 8px; background: {background}; height: 40px; min-width: 220px; display: flex; align-items: center; padding: 0 12px; font-weight: {weight};"
    )
}

fn confirm_drop_pending_edits(description: &str) -> bool {
    MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title("未儲存變更")
        .set_description(description)
        .set_buttons(MessageButtons::YesNo)
        .show()
        == MessageDialogResult::Yes
}

fn rebuild_grid(products: &[Product], fields: &CurrencyFields, search: &str) -> PriceGrid {
    PriceGrid::new(&filter_products(products, search), fields)
}

fn load_products(
    query_service: &QueryService,
    price_list_id: Option<i64>,
) -> Result<Vec<Product>, RepoError> {
    match price_list_id {
        Some(id) => Ok(query_service
            .query_products(ProductQuery::all(PriceListId(id)))?
            .products),
        None => Ok(Vec::new()),
    }
}

/// Loads a price list and starts a fresh editing session on it.
fn open_price_list(
    query_service: &QueryService,
    price_list_id: Option<i64>,
    mut selected_price_list_id: Signal<Option<i64>>,
    mut products: Signal<Vec<Product>>,
    mut session: Signal<EditorSession>,
    fields: &CurrencyFields,
    search: &str,
) -> Result<(), RepoError> {
    let loaded = load_products(query_service, price_list_id)?;
    let grid = rebuild_grid(&loaded, fields, search);
    selected_price_list_id.set(price_list_id);
    products.set(loaded);
    session.set(EditorSession::new(grid));
    Ok(())
}

/// Re-lays the matrix after the visible columns or the search changed.
fn refresh_grid(
    products: Signal<Vec<Product>>,
    currency_fields: Signal<CurrencyFields>,
    search: Signal<String>,
    mut session: Signal<EditorSession>,
) {
    let grid = rebuild_grid(&products.peek(), &currency_fields.peek(), &search.peek());
    session.write().replace_universe(grid);
}

#[component]
pub fn App() -> Element {
    let AppState {
        mut price_lists,
        selected_price_list_id,
        mut products,
        mut currency_fields,
        mut search,
        mut name_input,
        mut session,
        mut busy,
        mut status,
    } = AppState::new();

    let db_path = match default_db_path() {
        Ok(path) => path,
        Err(err) => {
            return rsx! {
                div {
                    p { "無法取得資料庫路徑：{err}" }
                }
            };
        }
    };

    let repo = Arc::new(SqliteRepo::new(db_path));
    let query_service = Arc::new(QueryService::new(repo.clone()));
    let edit_service = Arc::new(EditService::new(repo.clone()));
    let import_service = Arc::new(ImportService::new(repo.clone()));

    let repo_for_init = repo.clone();
    let query_service_for_init = query_service.clone();
    use_effect(move || {
        *busy.write() = true;
        match repo_for_init
            .init()
            .and_then(|_| query_service_for_init.list_price_lists())
        {
            Ok(available) => {
                let first = available.first().map(|list| list.id.0);
                *price_lists.write() = available;
                let opened = open_price_list(
                    &query_service_for_init,
                    first,
                    selected_price_list_id,
                    products,
                    session,
                    &currency_fields.peek(),
                    &search.peek(),
                );
                *status.write() = match opened {
                    Ok(()) => "已載入價目表".to_string(),
                    Err(err) => format!("載入價目表失敗：{err}"),
                };
            }
            Err(err) => {
                *price_lists.write() = Vec::new();
                *status.write() = format!("初始化資料庫失敗：{err}");
            }
        }
        *busy.write() = false;
    });

    let session_snapshot = session.read();
    let pending_count = session_snapshot.pending_len();
    let has_pending_changes = pending_count > 0;
    let active_count = session_snapshot.active_len();
    let grid = session_snapshot.universe().clone();
    drop(session_snapshot);

    let query_service_for_switch = query_service.clone();
    let query_service_for_import = query_service.clone();
    let query_service_for_save = query_service.clone();
    let query_service_for_rename = query_service.clone();
    let query_service_for_delete = query_service.clone();
    let edit_service_for_rename = edit_service.clone();
    let edit_service_for_delete = edit_service.clone();

    rsx! {
        div {
            tabindex: "-1",
            style: "min-height: 100vh; outline: none; font-family: sans-serif; padding: 0 24px;",
            onkeydown: move |event| {
                let held = event.modifiers().shift();
                if session.peek().modifier_held() != held {
                    session.write().set_modifier(held);
                }
            },
            onkeyup: move |event| {
                let held = event.modifiers().shift();
                if session.peek().modifier_held() != held {
                    session.write().set_modifier(held);
                }
            },

            nav {
                style: "display: flex; gap: 12px; align-items: center; flex-wrap: wrap; padding: 12px 0; border-bottom: 1px solid #eee;",
                span { style: "font-weight: 600; font-size: 18px;", "批次編輯價格" }

                span { "價目表：" }
                select {
                    disabled: busy(),
                    onchange: move |event| {
                        let Ok(next_id) = event.value().parse::<i64>() else {
                            return;
                        };
                        if session.peek().has_pending_edits()
                            && !confirm_drop_pending_edits("切換價目表會放棄未儲存的價格變更，確定嗎？")
                        {
                            return;
                        }
                        let opened = open_price_list(
                            &query_service_for_switch,
                            Some(next_id),
                            selected_price_list_id,
                            products,
                            session,
                            &currency_fields.peek(),
                            &search.peek(),
                        );
                        if let Err(err) = opened {
                            *status.write() = format!("載入價目表失敗：{err}");
                        }
                    },
                    {price_lists().into_iter().map(|list| {
                        let is_selected = selected_price_list_id() == Some(list.id.0);
                        rsx!(
                            option {
                                value: "{list.id.0}",
                                selected: is_selected,
                                "{list.name}"
                            }
                        )
                    })}
                }

                input {
                    placeholder: "新名稱",
                    value: "{name_input}",
                    oninput: move |event| name_input.set(event.value()),
                }
                button {
                    disabled: busy() || selected_price_list_id().is_none(),
                    onclick: move |_| {
                        let Some(price_list_id) = selected_price_list_id() else {
                            *status.write() = "請先選擇價目表".to_string();
                            return;
                        };
                        let name = name_input().trim().to_string();
                        if name.is_empty() {
                            *status.write() = "價目表名稱不可空白".to_string();
                            return;
                        }
                        *busy.write() = true;
                        match edit_service_for_rename.rename_price_list(PriceListId(price_list_id), name) {
                            Ok(()) => {
                                if let Ok(available) = query_service_for_rename.list_price_lists() {
                                    *price_lists.write() = available;
                                }
                                name_input.set(String::new());
                                *status.write() = "已重新命名".to_string();
                            }
                            Err(err) => {
                                *status.write() = format!("重新命名失敗：{err}");
                            }
                        }
                        *busy.write() = false;
                    },
                    "重新命名"
                }
                button {
                    disabled: busy() || selected_price_list_id().is_none(),
                    onclick: move |_| {
                        let Some(price_list_id) = selected_price_list_id() else {
                            *status.write() = "請先選擇價目表".to_string();
                            return;
                        };
                        let confirmed = MessageDialog::new()
                            .set_level(MessageLevel::Warning)
                            .set_title("刪除價目表")
                            .set_description("確定要刪除這份價目表及其所有價格？未儲存的變更也會一併放棄。")
                            .set_buttons(MessageButtons::YesNo)
                            .show();
                        if confirmed != MessageDialogResult::Yes {
                            return;
                        }
                        *busy.write() = true;
                        let deleted = edit_service_for_delete
                            .delete_price_list(PriceListId(price_list_id))
                            .and_then(|_| query_service_for_delete.list_price_lists());
                        match deleted {
                            Ok(available) => {
                                let next = available.first().map(|list| list.id.0);
                                *price_lists.write() = available;
                                let opened = open_price_list(
                                    &query_service_for_delete,
                                    next,
                                    selected_price_list_id,
                                    products,
                                    session,
                                    &currency_fields.peek(),
                                    &search.peek(),
                                );
                                *status.write() = match opened {
                                    Ok(()) => "已刪除價目表".to_string(),
                                    Err(err) => format!("已刪除，但載入價目表失敗：{err}"),
                                };
                            }
                            Err(err) => {
                                *status.write() = format!("刪除價目表失敗：{err}");
                            }
                        }
                        *busy.write() = false;
                    },
                    "刪除"
                }

                button {
                    disabled: busy(),
                    onclick: move |_| {
                        if busy() {
                            return;
                        }
                        if session.peek().has_pending_edits()
                            && !confirm_drop_pending_edits("匯入後會切換到新價目表並放棄未儲存的變更，確定嗎？")
                        {
                            return;
                        }
                        let Some(file_path) = FileDialog::new()
                            .add_filter("價目表", &["csv", "xlsx"])
                            .pick_file() else {
                            *status.write() = "已取消匯入".to_string();
                            return;
                        };

                        *busy.write() = true;
                        *status.write() = format!("正在匯入 {}", file_path.display());
                        match import_service.import_file(&file_path) {
                            Ok(imported) => {
                                match query_service_for_import.list_price_lists() {
                                    Ok(available) => *price_lists.write() = available,
                                    Err(err) => {
                                        *status.write() = format!("匯入成功，但刷新價目表失敗：{err}");
                                    }
                                }
                                let opened = open_price_list(
                                    &query_service_for_import,
                                    Some(imported.price_list_id.0),
                                    selected_price_list_id,
                                    products,
                                    session,
                                    &currency_fields.peek(),
                                    &search.peek(),
                                );
                                *status.write() = match opened {
                                    Ok(()) => format!(
                                        "已匯入 {} 項商品、{} 個款式",
                                        imported.product_count, imported.variant_count
                                    ),
                                    Err(err) => format!("匯入成功，但載入失敗：{err}"),
                                };
                            }
                            Err(err) => {
                                *status.write() = format!("匯入失敗：{err:#}");
                            }
                        }
                        *busy.write() = false;
                    },
                    "匯入 CSV/XLSX"
                }

                input {
                    placeholder: "搜尋商品、款式或 SKU",
                    value: "{search}",
                    oninput: move |event| {
                        search.set(event.value());
                        refresh_grid(products, currency_fields, search, session);
                    },
                }

                div { style: "flex: 1;" }

                button {
                    disabled: !has_pending_changes,
                    onclick: move |_| {
                        if !confirm_drop_pending_edits("確定要放棄所有未儲存的價格變更？") {
                            return;
                        }
                        session.write().discard();
                        *status.write() = "已放棄變更".to_string();
                    },
                    "放棄變更"
                }
                button {
                    disabled: busy() || !has_pending_changes,
                    onclick: move |_| {
                        let Some(price_list_id) = selected_price_list_id() else {
                            *status.write() = "請先選擇價目表".to_string();
                            return;
                        };
                        *busy.write() = true;
                        let committed = {
                            let mut editing = session.write();
                            edit_service.commit(PriceListId(price_list_id), &mut *editing)
                        };
                        match committed {
                            Ok(changed) => {
                                match load_products(&query_service_for_save, Some(price_list_id)) {
                                    Ok(loaded) => {
                                        let grid = rebuild_grid(&loaded, &currency_fields.peek(), &search.peek());
                                        products.set(loaded);
                                        session.write().replace_universe(grid);
                                        *status.write() = format!("已儲存 {changed} 個款式的價格");
                                    }
                                    Err(err) => {
                                        *status.write() = format!("已儲存，但重新載入失敗：{err}");
                                    }
                                }
                            }
                            Err(err) => {
                                *status.write() = format!("儲存失敗：{err}");
                            }
                        }
                        *busy.write() = false;
                    },
                    "儲存"
                }
            }

            div {
                style: "display: flex; gap: 16px; align-items: center; flex-wrap: wrap; padding: 8px 0; font-size: 13px;",
                span { style: "color: #888;", "幣別：" }
                {currency::all().iter().map(|known| {
                    let code = known.code;
                    let checked = currency_fields.read().contains(&ColumnKey::new(code));
                    rsx!(
                        label {
                            key: "{code}",
                            title: "{known.name}",
                            style: "display: inline-flex; align-items: center; gap: 4px; cursor: pointer;",
                            input {
                                r#type: "checkbox",
                                checked: checked,
                                onclick: move |_| {
                                    let toggled = currency_fields.write().toggle(code);
                                    if let Err(err) = toggled {
                                        *status.write() = format!("{err}");
                                        return;
                                    }
                                    refresh_grid(products, currency_fields, search, session);
                                }
                            }
                            span { "{code}" }
                        }
                    )
                })}
            }

            div {
                style: "padding: 4px 0 12px; font-size: 13px; color: #666;",
                "按住 Shift 點選可同時編輯多個價格 · 已選取 {active_count} 格 · 待儲存 {pending_count} 筆 · {status}"
            }

            if grid.row_count() == 0 {
                p { style: "color: #888;", "沒有可編輯的款式" }
            } else {
                div {
                    style: "display: flex; gap: 8px; margin-bottom: 8px;",
                    div { style: HEADER_CELL_STYLE, "商品 / 款式" }
                    div { style: HEADER_CELL_STYLE, "SKU" }
                    {grid.columns().iter().map(|column| rsx!(
                        div { key: "{column}", style: HEADER_CELL_STYLE, "{column}" }
                    ))}
                }
                {grid.sections().iter().map(|section| {
                    let columns = grid.columns().to_vec();
                    rsx!(
                        div {
                            key: "{section.product_id}",
                            style: "margin-bottom: 16px;",
                            div {
                                style: "display: flex; gap: 8px; margin-bottom: 8px;",
                                div {
                                    style: TILE_STYLE,
                                    if let Some(thumbnail) = section.thumbnail.clone() {
                                        img {
                                            src: "{thumbnail}",
                                            style: "width: 18px; height: 24px; object-fit: cover; border-radius: 4px; margin-right: 8px;",
                                        }
                                    }
                                    span { "{section.title}" }
                                }
                                div { style: TILE_STYLE, "-" }
                            }
                            {section.rows.iter().map(|row| rsx!(
                                VariantRow {
                                    key: "{row.key}",
                                    row: row.clone(),
                                    columns: columns.clone(),
                                    session: session,
                                    status: status,
                                }
                            ))}
                        }
                    )
                })}
            }
        }
    }
}

#[component]
fn VariantRow(
    row: GridRow,
    columns: Vec<ColumnKey>,
    mut session: Signal<EditorSession>,
    mut status: Signal<String>,
) -> Element {
    let session_snapshot = session.read();
    let cells: Vec<(CellId, bool, bool, String)> = columns
        .iter()
        .map(|column| {
            let cell = CellId {
                row: row.key.clone(),
                column: column.clone(),
            };
            let is_active = session_snapshot.is_active(&cell);
            let is_edited = session_snapshot.is_edited(&cell);
            let amount = session_snapshot.display_value(&cell).unwrap_or_default();
            (cell, is_active, is_edited, amount)
        })
        .collect();
    drop(session_snapshot);

    rsx! {
        div {
            style: "display: flex; gap: 8px; margin-bottom: 8px;",
            div { style: "{TILE_STYLE} padding-left: 36px;", "{row.title}" }
            div { style: TILE_STYLE, "{row.sku}" }
            {cells.into_iter().map(|(cell, is_active, is_edited, amount)| {
                let symbol = currency::currency(cell.column.as_str())
                    .map(|known| known.symbol)
                    .unwrap_or("");
                let label = cell.column.to_string();
                let focus_target = cell.clone();
                let blur_target = cell.clone();
                let input_target = cell;
                rsx!(
                    div {
                        key: "{label}",
                        style: price_cell_style(is_active, is_edited),
                        span { style: "color: #999; margin-right: 8px; font-size: 12px;", "{label} {symbol}" }
                        input {
                            r#type: "text",
                            inputmode: "decimal",
                            style: "border: none; outline: none; background: transparent; flex: 1; font: inherit;",
                            value: "{amount}",
                            onfocus: move |_| {
                                if let Err(err) = session.write().focus_cell(&focus_target) {
                                    *status.write() = format!("{err}");
                                }
                            },
                            onblur: move |_| {
                                let _ = session.write().blur_cell(&blur_target);
                            },
                            oninput: move |event| {
                                if let Err(err) = session.write().change_value(&input_target, &event.value()) {
                                    *status.write() = format!("{err}");
                                }
                            },
                        }
                    }
                )
            })}
        }
    }
}
