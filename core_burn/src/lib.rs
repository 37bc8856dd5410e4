// core_burn/src/lib.rs

// Включаем строгие правила линтинга для всего крейта.
#![warn(
    missing_docs, // Предупреждать об отсутствующей документации для публичных элементов.
    clippy::all, // Все стандартные проверки Clippy.
    clippy::pedantic, // Более строгие ("педантичные") проверки Clippy.
    clippy::nursery // Экспериментальные проверки Clippy (могут быть нестабильны).
)]
// Запрещаем использование небезопасных конструкций и потенциально проблемных методов.
#![deny(
    unsafe_code, // Запрет `unsafe` блоков без явного `allow`.
    clippy::unwrap_used, // Запрет использования `.unwrap()`.
    clippy::expect_used // Запрет использования `.expect()`.
)]

//! # `core_burn`
//!
//! Этот крейт (`core_burn`) содержит модуль `ImgToTransformer`, построенный на
//! фреймворке [Burn](https://burn.dev/). Модуль превращает батч изображений
//! `[batch, channels, height, width]` в последовательность эмбеддингов
//! `[batch, seq_len, reduced_dim]`, пригодную для подачи в трансформер.
//!
//! ## Структура
//!
//! - `architectures`: Определения архитектур (`img2seq`).
//! - `error`: Тип ошибки крейта.
//!
//! ## Пример
//!
//! ```ignore
//! use core_burn::ImgToTransformerConfig;
//!
//! let model = ImgToTransformerConfig::new(16, 16, 512, 3, 128, 128).init::<B>(&device)?;
//! let sequence = model.forward(images)?; // [batch, 128, 128]
//! ```
//!
//! Обучение, сохранение весов и выбор устройства делегированы Burn:
//! модуль является обычным `burn::module::Module`.

pub mod architectures;
pub mod error;

// Ошибки
pub use error::BurnCoreError;

// Архитектура и ее конфигурация
pub use architectures::img2seq::{
    check_patch_grid,
    extract_patches,
    ImgToTransformer,
    ImgToTransformerConfig,
    ImgToTransformerRecord, // Record-структура для сериализации/десериализации весов
};
