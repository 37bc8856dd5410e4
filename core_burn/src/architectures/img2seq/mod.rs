// core_burn/src/architectures/img2seq/mod.rs

//! Модуль `img2seq`: преобразование изображения в последовательность эмбеддингов.
//!
//! - `patch`: нарезка изображения на плоские патчи и проверка сетки.
//! - `model`: конфигурация и сам модуль `ImgToTransformer`.

pub mod model; // Конфигурация и прямой проход
pub mod patch; // Нарезка на патчи

pub use model::{ImgToTransformer, ImgToTransformerConfig, ImgToTransformerRecord};
pub use patch::{check_patch_grid, extract_patches};
