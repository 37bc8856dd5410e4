// core_burn/src/architectures/img2seq/model.rs

//! Модель `ImgToTransformer`: батч изображений -> последовательность эмбеддингов.
//!
//! Порядок вычислений фиксирован:
//! патчи -> эмбеддинг патчей -> снижение размерности -> `BatchNorm` -> `ReLU`
//! -> позиционное кодирование -> смешивание токенов -> расширение последовательности.

use burn::{
    config::Config,
    module::{Module, Param},
    nn::{BatchNorm, BatchNormConfig, Linear, LinearConfig, Relu},
    tensor::{backend::Backend, Tensor},
};
use tracing::{debug, trace};

use super::patch::extract_patches;
use crate::BurnCoreError;

/// Конфигурация для `ImgToTransformer`.
///
/// Сериализуется в JSON стандартным механизмом `Config` из Burn (`save`/`load`).
#[derive(Config, Debug)]
pub struct ImgToTransformerConfig {
    /// Число патчей. Должно быть полным квадратом: сторона сетки равна `sqrt(patches)`.
    pub patches: usize,
    /// Сторона патча в пикселях.
    pub patch_size: usize,
    /// Размерность эмбеддинга патча (ширина трансформера).
    pub transformer_dim: usize,
    /// Число каналов входного изображения.
    pub img_channels: usize,
    /// Длина выходной последовательности.
    pub seq_len: usize,
    /// Размерность эмбеддинга после снижения.
    pub reduced_dim: usize,
    /// Прибавлять ли обучаемое позиционное кодирование перед смешиванием токенов.
    #[config(default = true)]
    pub apply_positional_encoding: bool,
    /// Эпсилон нормализации по батчу.
    #[config(default = 1e-5)]
    pub norm_epsilon: f64,
    /// Момент обновления бегущих статистик нормализации.
    #[config(default = 0.1)]
    pub norm_momentum: f64,
}

/// Число параметров полносвязного слоя со смещением.
const fn linear_params(d_input: usize, d_output: usize) -> usize {
    (d_input + 1) * d_output
}

impl ImgToTransformerConfig {
    /// Сторона сетки патчей (`sqrt(patches)`, округленный вниз).
    pub const fn num_patches_side(&self) -> usize {
        self.patches.isqrt()
    }

    /// Число значений в одном плоском патче: `img_channels * patch_size^2`.
    pub const fn patch_pixels(&self) -> usize {
        self.img_channels * self.patch_size * self.patch_size
    }

    /// Сторона квадратного изображения, которое покрывает сетка патчей.
    pub const fn image_size(&self) -> usize {
        self.num_patches_side() * self.patch_size
    }

    /// Ожидаемое число обучаемых параметров модели.
    ///
    /// Четыре полносвязных слоя `(in + 1) * out`, позиционный тензор
    /// `patches * reduced_dim` и аффинные параметры нормализации `2 * patches`.
    /// Бегущие статистики нормализации параметрами не считаются.
    pub const fn expected_num_params(&self) -> usize {
        let flat = self.patches * self.reduced_dim;
        linear_params(self.patch_pixels(), self.transformer_dim)
            + linear_params(self.transformer_dim, self.reduced_dim)
            + linear_params(flat, flat)
            + linear_params(flat, self.seq_len * self.reduced_dim)
            + flat
            + 2 * self.patches
    }

    /// Проверяет конфигурацию.
    ///
    /// # Ошибки
    /// `BurnCoreError::InvalidConfig`, если какая-либо размерность равна нулю
    /// или `patches` не является полным квадратом.
    pub fn validate(&self) -> Result<(), BurnCoreError> {
        let dims = [
            ("patches", self.patches),
            ("patch_size", self.patch_size),
            ("transformer_dim", self.transformer_dim),
            ("img_channels", self.img_channels),
            ("seq_len", self.seq_len),
            ("reduced_dim", self.reduced_dim),
        ];
        if let Some((name, _)) = dims.iter().find(|(_, value)| *value == 0) {
            return Err(BurnCoreError::InvalidConfig(format!("{name} должно быть больше нуля")));
        }

        let side = self.num_patches_side();
        if side * side != self.patches {
            return Err(BurnCoreError::InvalidConfig(format!(
                "patches={} не является полным квадратом",
                self.patches
            )));
        }
        Ok(())
    }

    /// Создает новый экземпляр `ImgToTransformer`.
    ///
    /// # Аргументы
    /// * `device`: Устройство Burn, на котором будут инициализированы веса.
    ///
    /// # Ошибки
    /// `BurnCoreError::InvalidConfig`, если конфигурация не прошла `validate`.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<ImgToTransformer<B>, BurnCoreError> {
        self.validate()?;

        let flat = self.patches * self.reduced_dim;

        let patch_embedding = LinearConfig::new(self.patch_pixels(), self.transformer_dim).init(device);
        let dim_reduction = LinearConfig::new(self.transformer_dim, self.reduced_dim).init(device);

        // Каналами нормализации служат позиции патчей: вход имеет форму [batch, patches, reduced_dim].
        let norm = BatchNormConfig::new(self.patches)
            .with_epsilon(self.norm_epsilon)
            .with_momentum(self.norm_momentum)
            .init(device);

        let positional_encoding =
            Param::from_tensor(Tensor::zeros([1, self.patches, self.reduced_dim], device));

        let token_mixer = LinearConfig::new(flat, flat).init(device);
        let seq_expansion = LinearConfig::new(flat, self.seq_len * self.reduced_dim).init(device);

        debug!(
            patches = self.patches,
            side = self.num_patches_side(),
            image_size = self.image_size(),
            patch_pixels = self.patch_pixels(),
            num_params = self.expected_num_params(),
            "ImgToTransformer инициализирован"
        );

        Ok(ImgToTransformer {
            patch_embedding,
            dim_reduction,
            norm,
            activation: Relu::new(),
            positional_encoding,
            token_mixer,
            seq_expansion,
            num_patches: self.patches,
            num_patches_side: self.num_patches_side(),
            patch_size: self.patch_size,
            img_channels: self.img_channels,
            seq_len: self.seq_len,
            reduced_dim: self.reduced_dim,
            apply_positional_encoding: self.apply_positional_encoding,
        })
    }
}

/// Преобразует батч изображений в последовательность эмбеддингов для трансформера.
///
/// Вход: `[batch, channels, height, width]`, выход: `[batch, seq_len, reduced_dim]`.
///
/// Нормализация по батчу зависит от бэкенда: под `Autodiff<B>` используются
/// статистики текущего батча (режим обучения), на внутреннем бэкенде — бегущие
/// статистики (режим инференса), и тогда результат детерминирован.
#[derive(Debug, Module)]
pub struct ImgToTransformer<B: Backend> {
    /// Проекция плоского патча в `transformer_dim`.
    patch_embedding: Linear<B>,
    /// Проекция `transformer_dim` -> `reduced_dim`.
    dim_reduction: Linear<B>,
    /// Нормализация по батчу для каждой позиции патча.
    norm: BatchNorm<B, 1>,
    activation: Relu,
    /// Позиционное кодирование `[1, patches, reduced_dim]`, инициализируется нулями.
    positional_encoding: Param<Tensor<B, 3>>,
    /// Смешивание по всем патчам сразу: `patches * reduced_dim` -> `patches * reduced_dim`.
    token_mixer: Linear<B>,
    /// Расширение до `seq_len * reduced_dim`.
    seq_expansion: Linear<B>,
    num_patches: usize,
    num_patches_side: usize,
    patch_size: usize,
    img_channels: usize,
    seq_len: usize,
    reduced_dim: usize,
    apply_positional_encoding: bool,
}

impl<B: Backend> ImgToTransformer<B> {
    /// Выполняет прямой проход.
    ///
    /// # Аргументы
    /// * `images`: Батч изображений `[batch, channels, height, width]`.
    ///
    /// # Возвращает
    /// Тензор `[batch, seq_len, reduced_dim]`.
    ///
    /// # Ошибки
    /// * `PatchGridMismatch`, если высота или ширина не делится на `sqrt(patches)`.
    ///   Проверяется до любой линейной проекции.
    /// * `IncompatibleShape` при прочих несовпадениях формы входа.
    pub fn forward(&self, images: Tensor<B, 4>) -> Result<Tensor<B, 3>, BurnCoreError> {
        let patches = extract_patches(images, self.img_channels, self.patch_size, self.num_patches_side)?;
        trace!(shape = ?patches.dims(), "патчи извлечены");

        let embedded = self.embed_patches(patches);
        let mixed = self.mix_tokens(embedded);
        let output = self.expand_sequence(mixed);
        trace!(shape = ?output.dims(), "последовательность построена");

        Ok(output)
    }

    /// Эмбеддинг патчей: `[batch, patches, patch_pixels]` -> `[batch, patches, reduced_dim]`.
    fn embed_patches(&self, patches: Tensor<B, 3>) -> Tensor<B, 3> {
        let x = self.patch_embedding.forward(patches);
        let x = self.dim_reduction.forward(x);
        let x = self.norm.forward(x);
        let x = self.activation.forward(x);

        if self.apply_positional_encoding {
            // [1, patches, reduced_dim] транслируется по батчу.
            x.add(self.positional_encoding.val())
        } else {
            x
        }
    }

    /// Смешивание токенов по плоскому вектору всех патчей.
    fn mix_tokens(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let [batch, _, _] = x.dims();
        let x = x.reshape([batch, self.num_patches * self.reduced_dim]);
        self.token_mixer
            .forward(x)
            .reshape([batch, self.num_patches, self.reduced_dim])
    }

    /// Расширение `[batch, patches, reduced_dim]` -> `[batch, seq_len, reduced_dim]`.
    fn expand_sequence(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let [batch, _, _] = x.dims();
        let x = x.reshape([batch, self.num_patches * self.reduced_dim]);
        self.seq_expansion
            .forward(x)
            .reshape([batch, self.seq_len, self.reduced_dim])
    }

    /// Число патчей.
    pub const fn num_patches(&self) -> usize {
        self.num_patches
    }

    /// Сторона патча в пикселях.
    pub const fn patch_size(&self) -> usize {
        self.patch_size
    }

    /// Длина выходной последовательности.
    pub const fn seq_len(&self) -> usize {
        self.seq_len
    }

    /// Размерность выходных эмбеддингов.
    pub const fn reduced_dim(&self) -> usize {
        self.reduced_dim
    }

    /// Число обучаемых параметров.
    ///
    /// `Module::num_params` считает и бегущие среднее/дисперсию `BatchNorm`
    /// (`RunningState`, по `patches` значений каждое), их вычитаем.
    pub fn num_learnable_params(&self) -> usize {
        self.num_params() - 2 * self.num_patches
    }

    /// Текущее значение позиционного кодирования `[1, patches, reduced_dim]`.
    pub fn positional_encoding(&self) -> Tensor<B, 3> {
        self.positional_encoding.val()
    }
}
