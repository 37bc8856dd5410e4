use thiserror::Error;

/// Общий тип ошибки для утилит `utils_crate`.
///
/// Агрегирует ошибки ввода-вывода, конфигурации и логирования, которые
/// возникают вне самой модели.
#[derive(Error, Debug)]
pub enum UtilsError {
    /// Ошибка ввода-вывода (I/O).
    ///
    /// Содержит исходную ошибку `std::io::Error` и опционально путь к файлу/директории,
    /// с которым возникла проблема.
    #[error("Ошибка ввода-вывода: {source}")]
    Io {
        /// Исходная ошибка I/O.
        #[source] // Путь задается через `UtilsError::io_with_path`.
        source: std::io::Error,
        /// Опциональный путь, связанный с ошибкой I/O.
        path: Option<String>,
    },

    /// Ошибка, связанная с конфигурацией приложения.
    ///
    /// Например, неверный формат TOML или значение неподходящего типа.
    #[error("Ошибка конфигурации: {0}")]
    Config(String),

    /// В утилитарную функцию был передан неверный параметр.
    #[error("Неверный параметр: {0}")]
    InvalidParameter(String),

    /// Общая ошибка утилиты для случаев, не покрытых другими вариантами.
    #[error("Произошла общая ошибка утилиты: {0}")]
    Generic(String),
}

impl UtilsError {
    /// Вспомогательный конструктор для создания `UtilsError::Io` с указанием пути.
    ///
    /// # Аргументы
    ///
    /// * `source` - Исходная ошибка `std::io::Error`.
    /// * `path` - Строка или любой тип, который можно преобразовать в `String`, представляющий путь.
    pub fn io_with_path(source: std::io::Error, path: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: Some(path.into()),
        }
    }
}
