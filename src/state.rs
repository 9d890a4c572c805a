use crate::api::LLMApiProvider;
use crate::models::{ChatMessage, Role};
use crate::storage::StorageManager;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tauri::AppHandle;
use tokio::sync::Mutex;

const GREETING: &str = "Hello! I'm your AI coding assistant. Describe the application you want to build, and I'll generate the code for you.";

// Core application state accessible by Tauri commands
#[derive(Clone)] // Allow cloning for background tasks
pub struct AppState {
    // StorageManager behind a Mutex for safe concurrent access from
    // async Tauri commands.
    pub storage: Arc<Mutex<StorageManager>>,
    pub api_provider: Arc<dyn LLMApiProvider>,
    // Session transcript. In-memory only; dies with the process.
    pub messages: Arc<Mutex<Vec<ChatMessage>>>,
    // One generation at a time. The UI disables the input as well; this
    // flag is the authoritative guard.
    pub generation_in_flight: Arc<AtomicBool>,
    pub app_handle: AppHandle, // Store AppHandle for event emitting
}

impl AppState {
    pub fn new(
        storage_manager: StorageManager,
        api_provider: Arc<dyn LLMApiProvider>,
        app_handle: AppHandle,
    ) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage_manager)),
            api_provider,
            messages: Arc::new(Mutex::new(vec![ChatMessage::new(Role::Assistant, GREETING)])),
            generation_in_flight: Arc::new(AtomicBool::new(false)),
            app_handle,
        }
    }
}
