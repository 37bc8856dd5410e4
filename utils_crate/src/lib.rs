#![warn(
    missing_docs, // Предупреждать, если публичные элементы не документированы.
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used, // Предупреждать об использовании .unwrap()
    clippy::expect_used  // Предупреждать об использовании .expect()
)]
#![deny(
    unsafe_code,        // Запретить использование unsafe блоков.
    unused_mut,         // Запретить неиспользуемые изменяемые переменные.
    unused_imports,     // Запретить неиспользуемые импорты.
    unused_attributes   // Запретить неиспользуемые атрибуты.
)]

//! `utils_crate` предоставляет общую обработку ошибок, инициализацию логирования
//! и конфигурацию приложения для проекта img2seq.
//!
//! # Основные модули:
//!
//! - [`error`]: Определяет общий тип ошибки `UtilsError` для всего крейта.
//! - [`config`]: (активируется фичей `config_toml`) Предоставляет `AppConfig` для
//!   загрузки конфигурации приложения из TOML-файлов.
//! - [`logger`]: (активируется фичей `logger_utils_feature`) Утилиты для
//!   инициализации системы логирования на базе `tracing`.
//!
//! Фича `default` включает оба утилитарных модуля.

// --- Модуль для общих ошибок ---
pub mod error;
pub use error::UtilsError; // Реэкспорт для удобства использования.

// --- Утилитарные модули (управляются фичами) ---

/// Модуль с утилитами для инициализации логирования.
///
/// Активируется фичей `logger_utils_feature`.
#[cfg(feature = "logger_utils_feature")]
pub mod logger;
#[cfg(feature = "logger_utils_feature")]
pub use logger::{init_tracing_logger, parse_level}; // Реэкспорт.

/// Модуль для загрузки конфигурации приложения.
///
/// Активируется фичей `config_toml`.
#[cfg(feature = "config_toml")]
pub mod config;
#[cfg(feature = "config_toml")]
pub use config::AppConfig; // Реэкспорт.
