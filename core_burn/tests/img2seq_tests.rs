use burn::config::Config;
use burn::module::Module;
use burn::tensor::{backend::Backend, Distribution, Tensor};
use burn_ndarray::NdArray;
use core_burn::{BurnCoreError, ImgToTransformer, ImgToTransformerConfig};
use tempfile::tempdir;

type TestBackend = NdArray<f32>;

fn random_images<B: Backend>(shape: [usize; 4], device: &B::Device) -> Tensor<B, 4> {
    Tensor::random(shape, Distribution::Normal(0.0, 1.0), device)
}

fn build(config: &ImgToTransformerConfig) -> ImgToTransformer<TestBackend> {
    config.init::<TestBackend>(&Default::default()).unwrap()
}

#[test]
fn test_reference_configuration_output_shape() {
    let device = Default::default();
    // Сетка 4x4 патчей 16x16 покрывает изображение 64x64.
    let config = ImgToTransformerConfig::new(16, 16, 512, 3, 128, 128);
    let model = build(&config);

    let output = model.forward(random_images([1, 3, 64, 64], &device)).unwrap();
    assert_eq!(output.dims(), [1, 128, 128]);
}

#[test]
fn test_batched_output_shape() {
    let device = Default::default();
    let config = ImgToTransformerConfig::new(9, 4, 32, 3, 20, 8);
    let model = build(&config);

    let output = model.forward(random_images([5, 3, 12, 12], &device)).unwrap();
    assert_eq!(output.dims(), [5, 20, 8]);
}

#[test]
fn test_large_vocab_geometry_with_short_sequence() {
    let device = Default::default();
    // Геометрия (16, 16, 512, 3, _, 256) на входе 64x64; seq_len уменьшен,
    // чтобы слой расширения помещался в память тестов.
    let config = ImgToTransformerConfig::new(16, 16, 512, 3, 8, 256);
    let model = build(&config);

    let output = model.forward(random_images([1, 3, 64, 64], &device)).unwrap();
    assert_eq!(output.dims(), [1, 8, 256]);
}

#[test]
fn test_height_not_divisible_by_grid_side() {
    let device = Default::default();
    let config = ImgToTransformerConfig::new(16, 16, 512, 3, 128, 128);
    let model = build(&config);

    let err = model.forward(random_images([1, 3, 65, 64], &device)).unwrap_err();
    assert_eq!(err, BurnCoreError::PatchGridMismatch { dimension: "height", size: 65, side: 4 });
    assert!(err.to_string().contains("несовместимы с числом патчей"));
}

#[test]
fn test_width_not_divisible_by_grid_side() {
    let device = Default::default();
    let config = ImgToTransformerConfig::new(4, 2, 8, 1, 4, 2);
    let model = build(&config);

    let err = model.forward(random_images([1, 1, 4, 5], &device)).unwrap_err();
    assert_eq!(err, BurnCoreError::PatchGridMismatch { dimension: "width", size: 5, side: 2 });
}

#[test]
fn test_divisible_but_uncovered_image_is_shape_mismatch() {
    let device = Default::default();
    let config = ImgToTransformerConfig::new(16, 16, 512, 3, 128, 128);
    let model = build(&config);

    // 256 делится на 4, но сетка 4x4 патчей 16x16 покрывает только 64x64.
    let err = model.forward(random_images([1, 3, 256, 256], &device)).unwrap_err();
    assert!(matches!(err, BurnCoreError::IncompatibleShape(_)));
}

#[test]
fn test_wrong_channel_count_is_shape_mismatch() {
    let device = Default::default();
    let config = ImgToTransformerConfig::new(4, 2, 8, 3, 4, 2);
    let model = build(&config);

    let err = model.forward(random_images([1, 1, 4, 4], &device)).unwrap_err();
    assert!(matches!(err, BurnCoreError::IncompatibleShape(msg) if msg.contains('3')));
}

#[test]
fn test_init_rejects_non_square_patch_count() {
    let config = ImgToTransformerConfig::new(12, 2, 8, 1, 4, 2);
    let err = config.init::<TestBackend>(&Default::default()).unwrap_err();
    assert!(matches!(err, BurnCoreError::InvalidConfig(_)));
}

#[test]
fn test_num_params_for_reference_configuration() {
    let config = ImgToTransformerConfig::new(16, 16, 512, 3, 128, 128);
    let model = build(&config);

    let flat = 16 * 128;
    let expected = (768 + 1) * 512 // эмбеддинг патчей
        + (512 + 1) * 128 // снижение размерности
        + (flat + 1) * flat // смешивание токенов
        + (flat + 1) * 128 * 128 // расширение последовательности
        + flat // позиционное кодирование
        + 2 * 16; // аффинные параметры нормализации
    assert_eq!(config.expected_num_params(), expected);
    assert_eq!(model.num_learnable_params(), expected);
    assert_eq!(model.num_params(), expected + 2 * 16); // + бегущие среднее и дисперсия
}

#[test]
fn test_record_round_trip_preserves_output() {
    let device = Default::default();
    let config = ImgToTransformerConfig::new(4, 2, 8, 1, 6, 3);
    let model = build(&config);
    let images = random_images::<TestBackend>([2, 1, 4, 4], &device);

    let expected = model.forward(images.clone()).unwrap().into_data().to_vec::<f32>().unwrap();

    let restored = build(&config).load_record(model.into_record());
    let actual = restored.forward(images).unwrap().into_data().to_vec::<f32>().unwrap();

    assert_eq!(expected, actual);
}

#[test]
fn test_config_json_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("img2seq.json");

    let config = ImgToTransformerConfig::new(16, 16, 512, 3, 50_000, 256)
        .with_apply_positional_encoding(false)
        .with_norm_epsilon(1e-3);
    config.save(&path).unwrap();

    let loaded = ImgToTransformerConfig::load(&path).unwrap();
    assert_eq!(loaded.patches, 16);
    assert_eq!(loaded.seq_len, 50_000);
    assert_eq!(loaded.reduced_dim, 256);
    assert!(!loaded.apply_positional_encoding);
    approx::assert_relative_eq!(loaded.norm_epsilon, 1e-3);
    approx::assert_relative_eq!(loaded.norm_momentum, 0.1);
}
