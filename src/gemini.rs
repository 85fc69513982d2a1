// Клиент генеративной модели Gemini (REST generateContent).
// Один запрос без повторов и без внутреннего таймаута: дедлайны
// навешивает вызывающая сторона, если они ей нужны.

use async_trait::async_trait;
use dotenv::dotenv;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request to the text service failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("text service returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("text service returned no completion text")]
    EmptyCompletion,
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,
}

// Тела запроса и ответа generateContent (только нужные поля)
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

// У части ответа может не быть текста (например, вызов функции),
// поэтому поле по умолчанию пустое
#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

// Стандартный конверт ошибки Google API
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

// Шов для тестов и для замены провайдера: отчёту всё равно,
// откуда берётся текст
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    // Ключ берётся из .env / окружения; отсутствие ключа видно сразу,
    // а не при первом запросе
    pub fn from_env() -> Result<Self, GenerationError> {
        dotenv().ok();
        match std::env::var("GEMINI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key)),
            _ => Err(GenerationError::MissingApiKey),
        }
    }

    async fn generate_content(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, self.model);
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        debug!("Запрашиваю дополнение у Gemini, модель: {}", self.model);

        let response = match self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                error!("Ошибка сетевого запроса к Gemini: {}", e);
                return Err(GenerationError::Http(e));
            }
        };

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body_text = match response.text().await {
                Ok(text) => text,
                Err(_) => String::new(),
            };
            let message = extract_error_message(&body_text);

            error!("Gemini вернул ошибку: {} - {}", status, message);
            return Err(GenerationError::Api { status, message });
        }

        let data = match response.json::<GenerateResponse>().await {
            Ok(data) => data,
            Err(e) => {
                error!("Ошибка парсинга ответа Gemini: {}", e);
                return Err(GenerationError::Http(e));
            }
        };

        match extract_completion(data) {
            Some(text) => {
                debug!("Gemini ответил, {} символов", text.chars().count());
                Ok(text)
            }
            None => {
                error!("Gemini ответил без текста (кандидаты пустые или заблокированы)");
                Err(GenerationError::EmptyCompletion)
            }
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.generate_content(prompt).await
    }
}

// Первый непустой текст среди кандидатов
fn extract_completion(data: GenerateResponse) -> Option<String> {
    data.candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .map(|part| part.text)
        .find(|text| !text.is_empty())
}

// Достаём человекочитаемое сообщение из конверта ошибки,
// иначе отдаём тело как есть
fn extract_error_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return envelope.error.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "unknown error".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_has_expected_wire_shape() {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: "hello".to_string(),
                }],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn completion_comes_from_first_nonempty_part() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": ""}, {"text": "ответ модели"}]}}
            ]
        }"#;
        let data: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(extract_completion(data).as_deref(), Some("ответ модели"));
    }

    #[test]
    fn empty_candidates_give_no_completion() {
        let data: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert_eq!(extract_completion(data), None);

        let data: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(extract_completion(data), None);
    }

    #[test]
    fn candidate_without_text_gives_no_completion() {
        let raw = r#"{"candidates": [{"content": {"parts": [{}]}}, {"content": null}]}"#;
        let data: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(extract_completion(data), None);
    }

    #[test]
    fn error_message_prefers_google_envelope() {
        let body = r#"{"error": {"message": "API key not valid", "code": 400}}"#;
        assert_eq!(extract_error_message(body), "API key not valid");
    }

    #[test]
    fn error_message_falls_back_to_raw_body() {
        assert_eq!(extract_error_message("Service Unavailable"), "Service Unavailable");
        assert_eq!(extract_error_message("  "), "unknown error");
    }

    #[test]
    fn client_uses_default_model_until_overridden() {
        let client = GeminiClient::new("key".to_string());
        assert_eq!(client.model, DEFAULT_MODEL);

        let client = client.with_model("gemini-2.5-pro");
        assert_eq!(client.model, "gemini-2.5-pro");
    }

    #[test]
    fn from_env_fails_fast_without_usable_key() {
        // Пробельное значение перекрывает возможный .env:
        // dotenv не переписывает уже установленные переменные
        std::env::set_var("GEMINI_API_KEY", "   ");
        assert!(matches!(
            GeminiClient::from_env(),
            Err(GenerationError::MissingApiKey)
        ));
    }
}
