use crate::encode::DepthMatrix;
use fast_image_resize::{
    FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer,
    images::{Image, ImageRef},
};
use image::RgbImage;
use ndarray::{Array, ArrayViewD, Axis, Ix2, IxDyn};

/// Resize to the model's square input and normalize into an NCHW f32 tensor.
pub(crate) fn to_nchw(
    image: &RgbImage,
    side: u32,
    mean: [f32; 3],
    std: [f32; 3],
) -> anyhow::Result<Array<f32, IxDyn>> {
    let (width, height) = image.dimensions();
    let src = ImageRef::new(width, height, image.as_raw(), PixelType::U8x3)?;
    let mut resized = Image::new(side, side, PixelType::U8x3);
    Resizer::new().resize(
        &src,
        &mut resized,
        &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
    )?;

    let spatial = (side * side) as usize;
    let mut data = vec![0.0f32; 3 * spatial];
    for (i, px) in resized.buffer().chunks_exact(3).enumerate() {
        for c in 0..3 {
            data[c * spatial + i] = (px[c] as f32 / 255.0 - mean[c]) / std[c];
        }
    }

    Ok(Array::from_shape_vec(
        IxDyn(&[1, 3, side as usize, side as usize]),
        data,
    )?)
}

/// Strip leading batch/channel axes of length 1 until the model output is a
/// plain [H, W] matrix.
pub(crate) fn squeeze_to_matrix(view: ArrayViewD<'_, f32>) -> anyhow::Result<DepthMatrix> {
    let mut owned = view.to_owned();
    while owned.ndim() > 2 {
        if owned.shape()[0] != 1 {
            anyhow::bail!("unexpected depth output shape {:?}", owned.shape());
        }
        owned = owned.index_axis_move(Axis(0), 0);
    }
    if owned.ndim() != 2 {
        anyhow::bail!("unexpected depth output shape {:?}", owned.shape());
    }
    Ok(owned.into_dimensionality::<Ix2>()?)
}

/// Resample a depth matrix from the model's native resolution to the source
/// image's width/height. Catmull-Rom (bicubic family) is the documented
/// interpolation contract.
pub(crate) fn resample_to(
    matrix: &DepthMatrix,
    width: u32,
    height: u32,
) -> anyhow::Result<DepthMatrix> {
    let (native_h, native_w) = matrix.dim();
    if (native_w, native_h) == (width as usize, height as usize) {
        return Ok(matrix.clone());
    }

    let src_vec: Vec<f32> = matrix.iter().copied().collect();
    let src = ImageRef::new(
        native_w as u32,
        native_h as u32,
        bytemuck::cast_slice(&src_vec),
        PixelType::F32,
    )?;
    let mut dst = Image::new(width, height, PixelType::F32);
    Resizer::new().resize(
        &src,
        &mut dst,
        &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::CatmullRom)),
    )?;

    let resampled: &[f32] = bytemuck::cast_slice(dst.buffer());
    Ok(DepthMatrix::from_shape_vec(
        (height as usize, width as usize),
        resampled.to_vec(),
    )?)
}
