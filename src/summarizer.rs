// Резервный отчёт при сбое пайплайна скачивания или транскрипции.
// Само видео уже недоступно, сюда приходят только его метаданные:
// заголовок с описанием и статус сбоя.

use log::{error, info};

use crate::gemini::TextGenerator;
use crate::markdown::escape_markdown_v2;
use crate::prompts;

const SEARCH_BASE_URL: &str = "https://www.google.com/search?q=";
const FACTS_PREVIEW_LIMIT: usize = 150;
const REPORT_ERROR_MARKER: &str = "⚠️ Critical error: failed to generate report - ";

const BRONZE_LABEL: &str = "🥉 Bronze tier: source access denied";
const SILVER_LABEL: &str = "🥈 Silver tier: limited transcription quality";

// Статус сбоя, который сообщает пайплайн
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackStatus {
    DownloadFailed,
    TranscriptionFailed,
}

// Строковые теги пайплайна: точно распознаётся только DOWNLOAD_FAILED,
// любой другой тег считается ограниченной транскрипцией
impl From<&str> for FallbackStatus {
    fn from(tag: &str) -> Self {
        if tag == "DOWNLOAD_FAILED" {
            FallbackStatus::DownloadFailed
        } else {
            FallbackStatus::TranscriptionFailed
        }
    }
}

// Итог генерации: полный отчёт либо однострочная диагностика.
// Наружу в любом случае уходит строка, но вызывающая сторона может
// различить исходы без разбора текста.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReport {
    Complete(String),
    Diagnostic(String),
}

impl FallbackReport {
    pub fn text(&self) -> &str {
        match self {
            FallbackReport::Complete(text) => text,
            FallbackReport::Diagnostic(text) => text,
        }
    }

    pub fn into_message(self) -> String {
        match self {
            FallbackReport::Complete(text) => text,
            FallbackReport::Diagnostic(text) => text,
        }
    }
}

pub struct FallbackReporter<G: TextGenerator> {
    generator: G,
}

impl<G: TextGenerator> FallbackReporter<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    // Ровно один внешний вызов на отчёт, без повторов.
    // Любая ошибка генерации превращается в диагностику, наружу не летит.
    pub async fn get_fallback_report(
        &self,
        title: &str,
        description: &str,
        status: FallbackStatus,
    ) -> FallbackReport {
        info!("Создаю резервный отчёт ({:?}): {}", status, title);

        let status_label = if status == FallbackStatus::DownloadFailed {
            BRONZE_LABEL
        } else {
            SILVER_LABEL
        };

        let search_link = build_search_link(title);
        let prompt = build_summary_prompt(title, description);

        match self.generator.generate(&prompt).await {
            Ok(supplement) => FallbackReport::Complete(compose_report(
                title,
                description,
                status_label,
                &supplement,
                &search_link,
            )),
            Err(e) => {
                error!("Не удалось получить AI-дополнение: {}", e);
                FallbackReport::Diagnostic(format!("{}{}", REPORT_ERROR_MARKER, e))
            }
        }
    }
}

// Ссылка ручного поиска, вставляется в отчёт уже готовой разметкой
fn build_search_link(title: &str) -> String {
    let query = format!("{} content summary", title);
    format!(
        "[🔍 Search external data]({}{})",
        SEARCH_BASE_URL,
        urlencoding::encode(&query)
    )
}

fn build_summary_prompt(title: &str, description: &str) -> String {
    let facts = if description.is_empty() {
        "no data"
    } else {
        description
    };
    format!(
        "{}\nVideo title: {}\nKnown facts (description): {}\nUsing the title and the known facts, add a speculative supplement from your knowledge base.",
        prompts::SUMMARY_SILVER,
        title,
        facts
    )
}

fn compose_report(
    title: &str,
    description: &str,
    status_label: &str,
    supplement: &str,
    search_link: &str,
) -> String {
    let preview: String = description.chars().take(FACTS_PREVIEW_LIMIT).collect();
    // Многоточие ставится всегда, даже если описание короче лимита или пустое,
    // и экранируется вместе с текстом
    let facts = escape_markdown_v2(&format!("{}...", preview));

    format!(
        "🚨 *{}*\n{}\n\n📊 *Basic facts*\n{}\n\n🧠 *AI knowledge supplement*\n{}\n\n🌐 *Advanced search*\n{}",
        escape_markdown_v2(title),
        status_label,
        facts,
        escape_markdown_v2(supplement),
        search_link
    )
    .trim()
    .to_string()
}
