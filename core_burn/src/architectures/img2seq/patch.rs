// core_burn/src/architectures/img2seq/patch.rs

//! Нарезка изображения на непересекающиеся квадратные патчи.

use burn::tensor::{backend::Backend, Tensor};

use crate::BurnCoreError;

/// Проверяет, что высота и ширина изображения делятся на сторону сетки патчей.
///
/// # Ошибки
/// `BurnCoreError::PatchGridMismatch` с именем первой оси, нарушившей условие.
pub const fn check_patch_grid(height: usize, width: usize, side: usize) -> Result<(), BurnCoreError> {
    if side == 0 || height % side != 0 {
        return Err(BurnCoreError::PatchGridMismatch { dimension: "height", size: height, side });
    }
    if width % side != 0 {
        return Err(BurnCoreError::PatchGridMismatch { dimension: "width", size: width, side });
    }
    Ok(())
}

/// Разворачивает изображения в последовательность плоских патчей.
///
/// `[batch, channels, side * patch_size, side * patch_size]` ->
/// `[batch, side * side, channels * patch_size * patch_size]`.
///
/// Патчи идут построчно по сетке. Внутри патча внешней осью является канал,
/// затем строка пикселя, затем столбец.
///
/// # Аргументы
/// * `images`: Батч изображений.
/// * `img_channels`: Ожидаемое число каналов.
/// * `patch_size`: Сторона патча в пикселях.
/// * `side`: Сторона сетки патчей (`sqrt(patches)`).
///
/// # Ошибки
/// * `PatchGridMismatch`, если высота или ширина не делится на `side`.
///   Проверяется до любых операций над тензором.
/// * `IncompatibleShape`, если число каналов не совпадает или сетка
///   `side x side` патчей размера `patch_size` не покрывает изображение целиком.
pub fn extract_patches<B: Backend>(
    images: Tensor<B, 4>,
    img_channels: usize,
    patch_size: usize,
    side: usize,
) -> Result<Tensor<B, 3>, BurnCoreError> {
    let [batch, channels, height, width] = images.dims();

    check_patch_grid(height, width, side)?;

    if channels != img_channels {
        return Err(BurnCoreError::IncompatibleShape(format!(
            "ожидалось {img_channels} каналов, получено {channels}"
        )));
    }
    let covered = side * patch_size;
    if height != covered || width != covered {
        return Err(BurnCoreError::IncompatibleShape(format!(
            "сетка {side}x{side} патчей {patch_size}x{patch_size} покрывает {covered}x{covered}, изображение {height}x{width}"
        )));
    }

    // [B, C, s*p, s*p] -> [B, C, s, p, s, p]
    let patches = images.reshape([batch, channels, side, patch_size, side, patch_size]);
    // [B, C, s, p, s, p] -> [B, s, s, C, p, p]
    let patches = patches.permute([0, 2, 4, 1, 3, 5]);
    // [B, s, s, C, p, p] -> [B, s*s, C*p*p]
    Ok(patches.reshape([batch, side * side, channels * patch_size * patch_size]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::Int;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_check_patch_grid_names_height_first() {
        let err = check_patch_grid(65, 65, 4).unwrap_err();
        assert_eq!(err, BurnCoreError::PatchGridMismatch { dimension: "height", size: 65, side: 4 });

        let err = check_patch_grid(64, 66, 4).unwrap_err();
        assert_eq!(err, BurnCoreError::PatchGridMismatch { dimension: "width", size: 66, side: 4 });

        assert!(check_patch_grid(64, 128, 4).is_ok());
    }

    #[test]
    fn test_extract_patches_layout() {
        let device = Default::default();
        // Одноканальное изображение 4x4 со значениями 0..16, сетка 2x2 патчей 2x2.
        let images = Tensor::<TestBackend, 1, Int>::arange(0..16, &device)
            .float()
            .reshape([1, 1, 4, 4]);

        let patches = extract_patches(images, 1, 2, 2).unwrap();
        assert_eq!(patches.dims(), [1, 4, 4]);

        let values = patches.into_data().to_vec::<f32>().unwrap();
        assert_eq!(
            values,
            vec![
                0.0, 1.0, 4.0, 5.0, // верхний левый
                2.0, 3.0, 6.0, 7.0, // верхний правый
                8.0, 9.0, 12.0, 13.0, // нижний левый
                10.0, 11.0, 14.0, 15.0, // нижний правый
            ]
        );
    }

    #[test]
    fn test_extract_patches_channel_outermost() {
        let device = Default::default();
        // Два канала 2x2, одна клетка сетки: патч = [канал 0..., канал 1...].
        let images = Tensor::<TestBackend, 1, Int>::arange(0..8, &device)
            .float()
            .reshape([1, 2, 2, 2]);

        let patches = extract_patches(images, 2, 2, 1).unwrap();
        assert_eq!(patches.dims(), [1, 1, 8]);
        let values = patches.into_data().to_vec::<f32>().unwrap();
        assert_eq!(values, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_extract_patches_rejects_channel_mismatch() {
        let device = Default::default();
        let images = Tensor::<TestBackend, 4>::zeros([1, 1, 4, 4], &device);
        let err = extract_patches(images, 3, 2, 2).unwrap_err();
        assert!(matches!(err, BurnCoreError::IncompatibleShape(_)));
    }

    #[test]
    fn test_extract_patches_rejects_uncovered_image() {
        let device = Default::default();
        // 8x8 делится на сторону 2, но сетка 2x2 патчей 2x2 покрывает только 4x4.
        let images = Tensor::<TestBackend, 4>::zeros([1, 1, 8, 8], &device);
        let err = extract_patches(images, 1, 2, 2).unwrap_err();
        assert!(matches!(err, BurnCoreError::IncompatibleShape(msg) if msg.contains("4x4")));
    }
}
