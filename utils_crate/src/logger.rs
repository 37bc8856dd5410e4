//! Модуль для инициализации глобального логгера на основе `tracing`.
//!
//! Функциональность этого модуля активируется фичей `logger_utils_feature`.

use std::{fs, io, path::Path, str::FromStr};

use tracing::Level;
use tracing_subscriber::{
    filter::Directive, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
    Registry,
};

use crate::error::UtilsError;

/// Разбирает уровень логирования из строки (`"info"`, `"DEBUG"`, ...).
///
/// # Ошибки
/// `UtilsError::InvalidParameter`, если строка не является уровнем `tracing`.
pub fn parse_level(value: &str) -> Result<Level, UtilsError> {
    Level::from_str(value.trim())
        .map_err(|_| UtilsError::InvalidParameter(format!("неизвестный уровень логирования: {value:?}")))
}

/// Строит фильтр: `RUST_LOG` (или `info`) плюс явный уровень для целей приложения.
///
/// Дефисы в имени приложения заменяются на подчеркивания, как в именах крейтов.
///
/// # Ошибки
/// `UtilsError::Config`, если директива не разбирается (например, из-за имени приложения).
pub fn build_env_filter(app_name: &str, level: Level) -> Result<EnvFilter, UtilsError> {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let directive = format!("{}={}", app_name.replace('-', "_"), level.as_str().to_ascii_lowercase());
    let directive = directive
        .parse::<Directive>()
        .map_err(|e| UtilsError::Config(format!("неверная директива логирования {directive:?}: {e}")))?;
    Ok(base.add_directive(directive))
}

/// Инициализирует глобальный подписчик `tracing`.
///
/// Настраивает вывод в консоль (stderr) и, опционально, в файл с ежедневной ротацией.
///
/// # Аргументы
/// * `app_name` - Имя приложения (для фильтров и имени файла лога).
/// * `console_level` - Уровень для консоли.
/// * `file_level` - Уровень для файла.
/// * `log_dir` - Опциональная директория для файлов логов.
///
/// # Ошибки
/// Возвращает `UtilsError::Generic` при сбое инициализации `tracing`
/// (например, если глобальный подписчик уже установлен).
/// Проблема с созданием директории лога не является ошибкой: выводится
/// предупреждение, и логирование продолжается только в консоль.
#[allow(clippy::module_name_repetitions)]
pub fn init_tracing_logger(
    app_name: &str,
    console_level: Level,
    file_level: Level,
    log_dir: Option<&Path>,
) -> Result<(), UtilsError> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync + 'static>> = Vec::new();

    // Слой для вывода в консоль (stderr).
    let console_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(true)
        .with_filter(build_env_filter(app_name, console_level)?);
    layers.push(console_layer.boxed());

    let mut file_dir = None;
    if let Some(dir) = log_dir {
        match fs::create_dir_all(dir) {
            Ok(()) => {
                let file_appender = tracing_appender::rolling::daily(dir, format!("{app_name}.log"));
                let file_layer = fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false) // Выключаем ANSI цвета для файлов
                    .with_filter(build_env_filter(app_name, file_level)?);
                layers.push(file_layer.boxed());
                file_dir = Some(dir);
            }
            Err(e) => {
                // tracing еще не инициализирован.
                eprintln!(
                    "[ПРЕДУПРЕЖДЕНИЕ] Не удалось создать директорию логов {}: {e}. Логирование в файл отключено.",
                    dir.display()
                );
            }
        }
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| UtilsError::Generic(format!("Не удалось инициализировать логгер: {e}")))?;

    match file_dir {
        Some(dir) => tracing::info!(
            %console_level,
            %file_level,
            log_dir = %dir.display(),
            "Логгер инициализирован (консоль и файл)."
        ),
        None => tracing::info!(%console_level, "Логгер инициализирован. Только вывод в консоль."),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_accepts_any_case() {
        assert_eq!(parse_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_level(" WARN ").unwrap(), Level::WARN);
    }

    #[test]
    fn test_parse_level_rejects_unknown() {
        let err = parse_level("verbose").unwrap_err();
        assert!(matches!(err, UtilsError::InvalidParameter(msg) if msg.contains("verbose")));
    }

    #[test]
    fn test_build_env_filter_sanitizes_app_name() {
        let filter = build_env_filter("img2seq-cli", Level::TRACE).unwrap();
        assert!(filter.to_string().to_lowercase().contains("img2seq_cli=trace"));
    }
}
