use crate::error::GenerateError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

// Fixed generation parameters. Local models drift badly above 0.5 when
// asked for runnable code.
const TEMPERATURE: f32 = 0.5;
const MAX_TOKENS: u32 = 4000;

// The output conventions the extractor and preview wrapper depend on:
// a component named App, no module syntax, Tailwind classes, and an
// explicit render call at the end.
const SYSTEM_PROMPT: &str = "You are an expert React developer specializing in creating modern, production-ready React applications. You'll be generating complete code for a responsive application based on the user's description.

IMPORTANT GUIDELINES:
1. Write React code that can run directly in the browser with Babel.
2. DO NOT include any import or export statements.
3. DO NOT use modules - the code must work directly in a browser environment.
4. Define a component named App and render it with ReactDOM.createRoot().
5. Use proper JavaScript or TypeScript for the component.
6. Always end your code with: const root = ReactDOM.createRoot(document.getElementById('root')); root.render(<App />);
7. Use Tailwind CSS for styling (available in the browser).
8. Return fully functional React code with actual UI components and content, not placeholders.
9. The code must render in a browser without any build step.

FORMAT YOUR RESPONSE AS CLEAN CODE WITHOUT ANY WRAPPERS:
Just provide the complete React code that can run directly in the browser.";

fn build_user_prompt(prompt: &str) -> String {
    format!(
        "Create a modern, responsive React application that can run directly in the browser based on this description: \"{prompt}\".

Technical Requirements:
- NO import statements
- NO export statements
- Define a component named App
- End with ReactDOM.createRoot and render call
- Use Tailwind CSS for styling (it's available)
- Implement actual functionality, not just placeholders
- DO NOT use any external libraries that would need to be imported

IMPORTANT:
- Return ONLY the code, not wrapped in markdown or anything else.
- Must run directly in browser with Babel transform.
- Include the root.render(<App />) line at the end."
    )
}

/// Sibling list-models URL for a chat-completion endpoint. None when the
/// endpoint doesn't follow the `/chat/completions` convention, in which
/// case discovery is skipped and the server default model applies.
pub fn models_endpoint(chat_endpoint: &str) -> Option<String> {
    if chat_endpoint.contains("/chat/completions") {
        Some(chat_endpoint.replacen("/chat/completions", "/models", 1))
    } else {
        None
    }
}

// --- Wire types (OpenAI-compatible) ---

#[derive(Serialize, Debug)]
pub struct ChatCompletionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<ApiMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiMessage {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    content: String,
}

#[derive(Deserialize, Debug)]
struct ModelsResponse {
    data: Vec<ModelEntry>,
}

#[derive(Deserialize, Debug)]
struct ModelEntry {
    id: String,
}

/// Pulls the assistant text out of a completion body. Kept separate from
/// the HTTP plumbing so the failure branches are testable.
fn parse_completion(body: &str) -> Result<String, GenerateError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| GenerateError::MalformedResponse(e.to_string()))?;
    let choice = parsed.choices.into_iter().next().ok_or(GenerateError::EmptyChoices)?;
    Ok(choice.message.content)
}

// Trait defining the interface for LLM API providers
#[async_trait]
pub trait LLMApiProvider: Send + Sync {
    /// Sends one prompt and returns the assistant's raw message text.
    async fn generate(&self, endpoint: &str, prompt: &str) -> Result<String, GenerateError>;
}

// --- OpenAI Compatible Provider Implementation ---

pub struct OpenAICompatibleProvider {
    client: Client,
}

impl OpenAICompatibleProvider {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    /// Asks the server which models it has loaded and takes the first one.
    /// Every failure path degrades to None: the completion request then
    /// simply omits the model field.
    async fn fetch_available_model(&self, chat_endpoint: &str) -> Option<String> {
        let models_url = models_endpoint(chat_endpoint)?;
        log::debug!("Attempting to fetch models from: {}", models_url);

        let response = match self.client.get(&models_url).send().await {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Failed to reach models endpoint {}: {}", models_url, e);
                return None;
            }
        };

        if !response.status().is_success() {
            log::warn!(
                "Models endpoint {} returned status {}",
                models_url,
                response.status()
            );
            return None;
        }

        let listing: ModelsResponse = match response.json().await {
            Ok(l) => l,
            Err(e) => {
                log::warn!("Failed to parse models listing: {}", e);
                return None;
            }
        };

        let model = listing.data.into_iter().next().map(|m| m.id);
        match &model {
            Some(id) => log::info!("Using model: {}", id),
            None => log::warn!("No models available from LLM server, using server default"),
        }
        model
    }
}

impl Default for OpenAICompatibleProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMApiProvider for OpenAICompatibleProvider {
    async fn generate(&self, endpoint: &str, prompt: &str) -> Result<String, GenerateError> {
        // Best-effort model discovery; the request works without it.
        let model = self.fetch_available_model(endpoint).await;

        let request_body = ChatCompletionRequest {
            model,
            messages: vec![
                ApiMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ApiMessage {
                    role: "user".to_string(),
                    content: build_user_prompt(prompt),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        log::info!("Sending chat completion request to {}", endpoint);
        let response = self
            .client
            .post(endpoint)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read error body>".to_string());
            log::error!("Chat completion request failed with status {}: {}", status, body);
            return Err(GenerateError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let content = parse_completion(&body)?;
        log::info!("Received completion, {} chars", content.len());
        Ok(content)
    }
}
