// core_burn/src/architectures/mod.rs

//! Корневой модуль для определения архитектур моделей.
//!
//! Каждая архитектура живет в своем подмодуле.

pub mod img2seq;
