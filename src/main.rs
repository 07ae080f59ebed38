#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

mod app;
mod ui;

use tracing::info;
use tracing_subscriber::EnvFilter;

use price_bulk_editor::config::default_webview_data_dir;

const LOG_FILTER_ENV: &str = "PRICE_EDITOR_LOG";

fn main() {
    // 日誌等級由 PRICE_EDITOR_LOG 控制，例如 `price_bulk_editor=debug`
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_FILTER_ENV)
                .unwrap_or_else(|_| EnvFilter::new("price_bulk_editor=info")),
        )
        .init();

    let webview_data_dir =
        default_webview_data_dir().expect("should resolve and create WebView2 data directory");
    info!(data_dir = %webview_data_dir.display(), "starting price bulk editor");

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(dioxus::desktop::WindowBuilder::new().with_title("價目表批次編輯"))
                .with_data_directory(webview_data_dir),
        )
        .launch(app::App);
}
