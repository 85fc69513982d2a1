// Утилиты для работы с Telegram MarkdownV2

// Функция экранирования специальных символов Markdown V2
pub fn escape_markdown_v2(text: &str) -> String {
    let special_chars = ['_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!'];
    let mut result = String::with_capacity(text.len() * 2); // Предварительное выделение памяти

    for ch in text.chars() {
        if special_chars.contains(&ch) {
            result.push('\\');
        }
        result.push(ch);
    }

    result
}

// Внешний источник, на который ссылается сгенерированный текст.
// Собирается вызывающей стороной и используется один раз при сборке сообщения.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub title: String,
    pub link: String,
}

// Сборка итогового сообщения: текст от модели плюс блок источников.
// Текст экранируется внутри. Экранировать его заранее нельзя, иначе
// обратные слэши задвоятся. URL остаётся сырым: Telegram требует
// неэкранированную ссылку внутри [...](...).
pub fn build_final_message(content: &str, references: &[Reference]) -> String {
    let body = escape_markdown_v2(content);

    let mut ref_section = String::new();
    if !references.is_empty() {
        ref_section.push_str("\n\n📚 *References*\n");
        for item in references {
            let safe_title = escape_markdown_v2(&item.title);
            ref_section.push_str(&format!("• [{}]({})\n", safe_title, item.link));
        }
    }

    body + &ref_section
}
