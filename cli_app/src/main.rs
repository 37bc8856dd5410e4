//! `img2seq-cli`: строит `ImgToTransformer`, прогоняет случайное изображение
//! через прямой проход и печатает форму выхода.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use burn::{
    config::Config,
    tensor::{backend::Backend, Distribution, Tensor},
};
use clap::Parser;
use core_burn::ImgToTransformerConfig;
use tracing::info;
use utils_crate::{config::ModelConfigSub, init_tracing_logger, parse_level, AppConfig};

#[cfg(feature = "wgpu_backend_cli")]
type SelectedBackend = burn_wgpu::Wgpu;
#[cfg(all(feature = "ndarray_backend_cli", not(feature = "wgpu_backend_cli")))]
type SelectedBackend = burn_ndarray::NdArray<f32>;
#[cfg(not(any(feature = "ndarray_backend_cli", feature = "wgpu_backend_cli")))]
compile_error!("Нужно включить фичу бэкенда: `ndarray_backend_cli` или `wgpu_backend_cli`.");

const APP_NAME: &str = "img2seq-cli";

/// Аргументы командной строки. Явно заданные флаги перекрывают значения из `--config`.
#[derive(Debug, Parser)]
#[command(name = APP_NAME, version, about = "Image -> sequence embedder (Burn)")]
struct Cli {
    /// TOML-конфигурация приложения.
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON-конфигурация модели (`ImgToTransformerConfig::save`). Несовместима с флагами модели.
    #[arg(
        long,
        conflicts_with_all = [
            "patches",
            "patch_size",
            "transformer_dim",
            "img_channels",
            "seq_len",
            "reduced_dim",
            "no_positional_encoding",
        ]
    )]
    model_config: Option<PathBuf>,

    /// Число патчей (полный квадрат).
    #[arg(long)]
    patches: Option<usize>,
    /// Сторона патча в пикселях.
    #[arg(long)]
    patch_size: Option<usize>,
    /// Размерность эмбеддинга патча.
    #[arg(long)]
    transformer_dim: Option<usize>,
    /// Число каналов изображения.
    #[arg(long)]
    img_channels: Option<usize>,
    /// Длина выходной последовательности.
    #[arg(long)]
    seq_len: Option<usize>,
    /// Размерность после снижения.
    #[arg(long)]
    reduced_dim: Option<usize>,
    /// Не прибавлять позиционное кодирование.
    #[arg(long)]
    no_positional_encoding: bool,

    /// Размер батча.
    #[arg(long)]
    batch: Option<usize>,
    /// Высота изображения (по умолчанию сторона сетки патчей).
    #[arg(long)]
    height: Option<usize>,
    /// Ширина изображения (по умолчанию сторона сетки патчей).
    #[arg(long)]
    width: Option<usize>,

    /// Уровень логирования консоли (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
    /// Директория для файлов логов.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Cli {
    /// Накладывает флаги поверх конфигурации приложения.
    fn merge_into(&self, mut app: AppConfig) -> AppConfig {
        let model = &mut app.model;
        model.patches = self.patches.unwrap_or(model.patches);
        model.patch_size = self.patch_size.unwrap_or(model.patch_size);
        model.transformer_dim = self.transformer_dim.unwrap_or(model.transformer_dim);
        model.img_channels = self.img_channels.unwrap_or(model.img_channels);
        model.seq_len = self.seq_len.unwrap_or(model.seq_len);
        model.reduced_dim = self.reduced_dim.unwrap_or(model.reduced_dim);
        if self.no_positional_encoding {
            model.apply_positional_encoding = false;
        }

        app.input.batch = self.batch.unwrap_or(app.input.batch);
        app.input.height = self.height.or(app.input.height);
        app.input.width = self.width.or(app.input.width);

        if let Some(level) = &self.log_level {
            app.logging.level.clone_from(level);
        }
        if let Some(dir) = &self.log_dir {
            app.logging.log_dir = Some(dir.display().to_string());
        }
        app
    }
}

fn model_config_from(section: &ModelConfigSub) -> ImgToTransformerConfig {
    ImgToTransformerConfig::new(
        section.patches,
        section.patch_size,
        section.transformer_dim,
        section.img_channels,
        section.seq_len,
        section.reduced_dim,
    )
    .with_apply_positional_encoding(section.apply_positional_encoding)
}

fn load_model_config(path: &Path) -> Result<ImgToTransformerConfig> {
    ImgToTransformerConfig::load(path)
        .map_err(|e| anyhow!("не удалось загрузить конфигурацию модели {}: {e}", path.display()))
}

fn run<B: Backend>(app: &AppConfig, model_config: &ImgToTransformerConfig, device: &B::Device) -> Result<()> {
    let model = model_config.init::<B>(device)?;

    let height = app.input.height.unwrap_or_else(|| model_config.image_size());
    let width = app.input.width.unwrap_or_else(|| model_config.image_size());
    let shape = [app.input.batch, model_config.img_channels, height, width];
    info!(?shape, "Прямой проход на случайном изображении");

    let images = Tensor::<B, 4>::random(shape, Distribution::Normal(0.0, 1.0), device);
    let output = model.forward(images)?;

    println!("input shape:  {shape:?}");
    println!("output shape: {:?}", output.dims());
    println!("parameters:   {}", model.num_learnable_params());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let app = match &cli.config {
        Some(path) => AppConfig::load_from_toml(path)?,
        None => AppConfig::default(),
    };
    let app = cli.merge_into(app);

    let console_level = parse_level(&app.logging.level)?;
    let file_level = parse_level(&app.logging.file_level)?;
    init_tracing_logger(
        APP_NAME,
        console_level,
        file_level,
        app.logging.log_dir.as_deref().map(Path::new),
    )?;

    let model_config = match &cli.model_config {
        Some(path) => load_model_config(path)?,
        None => model_config_from(&app.model),
    };
    info!(%model_config, "Конфигурация модели");

    let device = <SelectedBackend as Backend>::Device::default();
    run::<SelectedBackend>(&app, &model_config, &device).context("прямой проход не выполнен")
}
