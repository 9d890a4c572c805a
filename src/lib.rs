// Learn more about Tauri commands at https://tauri.app/develop/calling-rust/

// Declare the modules
pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod preview;
pub mod state;
pub mod storage;

use crate::api::{LLMApiProvider, OpenAICompatibleProvider};
use commands::{
    build_preview, copy_code, generate_app, get_endpoint, list_messages, reset_endpoint,
    save_code_to_file, save_endpoint,
};
use state::AppState;
use std::sync::Arc;
use storage::StorageManager;
use tauri::Manager;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging
    env_logger::init();

    tauri::Builder::default()
        .setup(|app| {
            // Initialize the StorageManager and create the AppState.
            // Setup is synchronous but StorageManager::new is async; blocking
            // here is fine for one-time startup work.
            let app_handle = app.handle().clone();
            let storage_manager =
                tauri::async_runtime::block_on(async { StorageManager::new(&app_handle).await })?;

            // Create the API provider instance
            let api_provider: Arc<dyn LLMApiProvider> = Arc::new(OpenAICompatibleProvider::new());

            let app_state = AppState::new(storage_manager, api_provider, app_handle);

            // Add the AppState to Tauri's managed state
            app.manage(app_state);

            Ok(())
        })
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_clipboard_manager::init())
        // Register the command(s) with the handler
        .invoke_handler(tauri::generate_handler![
            generate_app,
            list_messages,
            get_endpoint,
            save_endpoint,
            reset_endpoint,
            build_preview,
            save_code_to_file,
            copy_code
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
