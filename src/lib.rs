// Утилиты для Telegram-бота вокруг пайплайна скачивания и транскрипции.
// Здесь живёт экранирование MarkdownV2 со сборкой сообщений
// и резервный отчёт по метаданным на случай, когда сам пайплайн упал.
// Доставка в Telegram и пайплайн живут снаружи, сюда приходят только строки.

pub mod gemini;
pub mod markdown;
pub mod prompts;
pub mod summarizer;

pub use gemini::{GeminiClient, GenerationError, TextGenerator};
pub use markdown::{build_final_message, escape_markdown_v2, Reference};
pub use summarizer::{FallbackReport, FallbackReporter, FallbackStatus};
