// core_burn/src/error.rs

//! Типы ошибок крейта `core_burn`.

/// Перечисление всех возможных ошибок, которые могут возникнуть в крейте `core_burn`.
///
/// Отдельно выделена только ошибка сетки патчей (`PatchGridMismatch`): это единственное
/// предусловие, которое модель проверяет явно. Остальные несовпадения форм
/// сводятся к общему варианту `IncompatibleShape`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)] // Clone/PartialEq/Eq для удобства тестирования.
pub enum BurnCoreError {
    /// Ошибка, связанная с некорректной конфигурацией модели.
    /// Например, нулевые размерности или число патчей, не являющееся полным квадратом.
    #[error("Некорректная конфигурация: {0}")]
    InvalidConfig(String),

    /// Размер изображения по одной из осей не делится на сторону сетки патчей
    /// (`sqrt(patches)`): изображение несовместимо с запрошенным числом патчей.
    #[error(
        "Размеры изображения несовместимы с числом патчей: {dimension}={size} не делится на sqrt(patches)={side}"
    )]
    PatchGridMismatch {
        /// Имя оси, нарушившей условие (`"height"` или `"width"`).
        dimension: &'static str,
        /// Фактический размер по этой оси.
        size: usize,
        /// Сторона сетки патчей.
        side: usize,
    },

    /// Ошибка, указывающая на несовместимые размеры тензоров при операциях.
    #[error("Несовместимые размеры или форма тензора: {0}")]
    IncompatibleShape(String),
}
