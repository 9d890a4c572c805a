use crate::config;
use crate::extract;
use crate::models::{ChatMessage, CodeLanguage, EndpointConfig, GenerationResponse, Role};
use crate::preview;
use crate::state::AppState;
use serde::Serialize;
use std::sync::atomic::Ordering;
use tauri::Emitter; // For app_handle.emit
use tauri::State;
use tauri_plugin_clipboard_manager::ClipboardExt;
use tauri_plugin_dialog::{DialogExt, FilePath};

// What the generate command hands the webview. `error` carries the toast
// text when the generation degraded to a fallback payload; the code
// fields are always populated either way.
#[derive(Serialize, Debug)]
pub struct GenerationOutcome {
    #[serde(flatten)]
    pub response: GenerationResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// Tauri command driving one full generation turn: record the user
// message, call the endpoint, extract, record a synthetic assistant
// acknowledgment. Never leaves the preview blank: every failure path
// returns a fallback payload plus the message to toast.
#[tauri::command]
pub async fn generate_app(
    state: State<'_, AppState>,
    prompt: String,
) -> Result<GenerationOutcome, String> {
    let prompt = prompt.trim().to_string();
    if prompt.is_empty() {
        return Err("Prompt cannot be empty.".to_string());
    }

    // One generation at a time; the input is disabled in the UI but this
    // flag is the guard that actually holds.
    if state.generation_in_flight.swap(true, Ordering::SeqCst) {
        return Err("A generation is already in progress.".to_string());
    }

    log::info!("Starting generation for prompt ({} chars)", prompt.len());
    let outcome = run_generation(&state, &prompt).await;
    state.generation_in_flight.store(false, Ordering::SeqCst);
    Ok(outcome)
}

async fn run_generation(state: &State<'_, AppState>, prompt: &str) -> GenerationOutcome {
    {
        let mut messages = state.messages.lock().await;
        messages.push(ChatMessage::new(Role::User, prompt));
    }

    let endpoint = {
        let storage = state.storage.lock().await;
        match storage.load_endpoint().await {
            Ok(url) => url,
            Err(e) => {
                log::error!("Failed to load endpoint, using default: {:?}", e);
                config::DEFAULT_ENDPOINT.to_string()
            }
        }
    };

    let (response, error) = match state.api_provider.generate(&endpoint, prompt).await {
        Ok(raw) => (extract::extract_response(&raw), None),
        Err(e) => {
            log::error!("Generation failed: {:?}", e);
            let message = e.user_message();
            (extract::error_fallback(&message), Some(message))
        }
    };

    let acknowledgment = match &error {
        None => format!(
            "Here's your generated application ({}). Check the preview panel.",
            response.file_name
        ),
        Some(message) => format!("I couldn't generate that. {}", message),
    };
    {
        let mut messages = state.messages.lock().await;
        messages.push(ChatMessage::new(Role::Assistant, acknowledgment));
    }

    GenerationOutcome { response, error }
}

// Tauri command to fetch the session transcript (greeting included).
#[tauri::command]
pub async fn list_messages(state: State<'_, AppState>) -> Result<Vec<ChatMessage>, String> {
    let messages = state.messages.lock().await;
    Ok(messages.clone())
}

// Tauri command to read the configured endpoint (default if never saved).
#[tauri::command]
pub async fn get_endpoint(state: State<'_, AppState>) -> Result<EndpointConfig, String> {
    let storage = state.storage.lock().await;
    let url = storage
        .load_endpoint()
        .await
        .map_err(|e| format!("Failed to load endpoint: {}", e))?;
    Ok(EndpointConfig { url })
}

// Tauri command to validate and persist a new endpoint. Invalid input is
// rejected without touching stored state.
#[tauri::command]
pub async fn save_endpoint(
    state: State<'_, AppState>,
    url: String,
) -> Result<EndpointConfig, String> {
    log::info!("Frontend requested to save endpoint: {}", url);

    let validated = config::validate_endpoint(&url).map_err(|e| e.to_string())?;

    {
        let storage = state.storage.lock().await;
        storage
            .save_endpoint(&validated)
            .await
            .map_err(|e| format!("Failed to save endpoint: {}", e))?;
    }

    // Fires on every successful save, identical value or not.
    if let Err(e) = state.app_handle.emit("endpoint_changed", &validated) {
        log::error!("Failed to emit endpoint_changed event: {:?}", e);
    }

    Ok(EndpointConfig { url: validated })
}

// Tauri command to restore the built-in default endpoint.
#[tauri::command]
pub async fn reset_endpoint(state: State<'_, AppState>) -> Result<EndpointConfig, String> {
    log::info!("Frontend requested to reset endpoint to default");

    {
        let storage = state.storage.lock().await;
        storage
            .save_endpoint(config::DEFAULT_ENDPOINT)
            .await
            .map_err(|e| format!("Failed to reset endpoint: {}", e))?;
    }

    if let Err(e) = state.app_handle.emit("endpoint_changed", config::DEFAULT_ENDPOINT) {
        log::error!("Failed to emit endpoint_changed event: {:?}", e);
    }

    Ok(EndpointConfig {
        url: config::DEFAULT_ENDPOINT.to_string(),
    })
}

// Tauri command building the document the preview iframe displays. Total:
// a language the frame can't run comes back as an inline error banner
// document, never as a command failure.
#[tauri::command]
pub fn build_preview(code: String, language: CodeLanguage) -> String {
    match preview::build_preview_document(&code, language) {
        Ok(doc) => doc,
        Err(e) => {
            log::warn!("Preview construction failed: {}", e);
            preview::error_document(&e.to_string())
        }
    }
}

// Tauri command behind the Download button: save dialog, then write.
// Returns the chosen path, or None when the user cancelled.
#[tauri::command]
pub async fn save_code_to_file(
    app: tauri::AppHandle,
    code: String,
    file_name: String,
) -> Result<Option<String>, String> {
    log::info!("Frontend requested to save code as {}", file_name);

    let (tx, rx) = tokio::sync::oneshot::channel();
    app.dialog()
        .file()
        .set_file_name(&file_name)
        .save_file(move |path| {
            let _ = tx.send(path);
        });

    let Some(file_path) = rx
        .await
        .map_err(|_| "Save dialog closed unexpectedly".to_string())?
    else {
        log::info!("Save dialog cancelled");
        return Ok(None);
    };

    let path = match file_path {
        FilePath::Path(p) => p,
        FilePath::Url(u) => u
            .to_file_path()
            .map_err(|_| "Unsupported save location".to_string())?,
    };

    tokio::fs::write(&path, code.as_bytes())
        .await
        .map_err(|e| format!("Failed to write file: {}", e))?;

    log::info!("Code saved to {}", path.display());
    Ok(Some(path.to_string_lossy().into_owned()))
}

// Tauri command behind the Copy button.
#[tauri::command]
pub fn copy_code(app: tauri::AppHandle, code: String) -> Result<(), String> {
    app.clipboard()
        .write_text(code)
        .map_err(|e| format!("Failed to copy code: {}", e))
}
