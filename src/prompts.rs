// Шаблоны промптов для генеративной модели

// Инструкция "серебряного" уровня: транскрипта нет, резюме восстанавливается
// только по метаданным. Ответ просим плоским текстом, потому что перед
// отправкой он будет экранирован целиком.
pub const SUMMARY_SILVER: &str = "You are reconstructing a summary of a video or podcast from its metadata alone. \
The recording itself could not be processed, so the title and description below are the only confirmed facts. \
Describe what the material is most likely about. Keep confirmed facts apart from your own inference \
and mark anything speculative as a guess. \
Answer with a few short plain-text lines without any markdown formatting.";
