use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::error::UtilsError;

/// Конфигурация приложения `img2seq-cli`.
///
/// Любая секция и любое поле могут отсутствовать в TOML: тогда берется значение по умолчанию.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Гиперпараметры модели.
    pub model: ModelConfigSub,
    /// Параметры тестового входа.
    pub input: InputConfigSub,
    /// Конфигурация логирования.
    pub logging: LoggingConfigSub,
}

/// Гиперпараметры модели (под-конфигурация для `AppConfig`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModelConfigSub {
    /// Число патчей (полный квадрат).
    pub patches: usize,
    /// Сторона патча в пикселях.
    pub patch_size: usize,
    /// Размерность эмбеддинга патча.
    pub transformer_dim: usize,
    /// Число каналов изображения.
    pub img_channels: usize,
    /// Длина выходной последовательности.
    pub seq_len: usize,
    /// Размерность после снижения.
    pub reduced_dim: usize,
    /// Прибавлять ли позиционное кодирование.
    pub apply_positional_encoding: bool,
}

impl Default for ModelConfigSub {
    fn default() -> Self {
        Self {
            patches: 16,
            patch_size: 16,
            transformer_dim: 512,
            img_channels: 3,
            seq_len: 128,
            reduced_dim: 128,
            apply_positional_encoding: true,
        }
    }
}

/// Параметры тестового входа (под-конфигурация для `AppConfig`).
///
/// Если `height`/`width` не заданы, берется сторона, которую покрывает сетка патчей.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InputConfigSub {
    /// Размер батча.
    pub batch: usize,
    /// Высота изображения.
    pub height: Option<usize>,
    /// Ширина изображения.
    pub width: Option<usize>,
}

impl Default for InputConfigSub {
    fn default() -> Self {
        Self { batch: 1, height: None, width: None }
    }
}

/// Конфигурация логирования (под-конфигурация для `AppConfig`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfigSub {
    /// Уровень логирования для консоли.
    pub level: String,
    /// Уровень логирования для файла.
    pub file_level: String,
    /// Директория для файлов логов (опционально).
    pub log_dir: Option<String>,
}

impl Default for LoggingConfigSub {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_level: "debug".to_string(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Загружает конфигурацию приложения из TOML файла.
    /// Если файл не найден, возвращается конфигурация по умолчанию.
    ///
    /// # Arguments
    /// * `file_path` - Путь к TOML файлу конфигурации.
    ///
    /// # Errors
    /// Возвращает `UtilsError::Io` при ошибках чтения файла или `UtilsError::Config`
    /// при ошибках парсинга TOML.
    pub fn load_from_toml(file_path: &Path) -> Result<Self, UtilsError> {
        if !file_path.exists() {
            warn!(
                "AppConfig file not found at {:?}, using default configuration.",
                file_path
            );
            return Ok(Self::default());
        }
        let config_str = std::fs::read_to_string(file_path)
            .map_err(|e| UtilsError::io_with_path(e, file_path.display().to_string()))?;
        Self::from_toml_str(&config_str).map_err(|e| match e {
            UtilsError::Config(msg) => UtilsError::Config(format!("{} ({})", msg, file_path.display())),
            other => other,
        })
    }

    /// Разбирает конфигурацию из строки TOML.
    ///
    /// # Errors
    /// `UtilsError::Config` при ошибках парсинга.
    pub fn from_toml_str(content: &str) -> Result<Self, UtilsError> {
        toml::from_str(content)
            .map_err(|e| UtilsError::Config(format!("Failed to parse AppConfig from TOML: {e}")))
    }
}
