use ndarray::Array3;

use crate::shared::error::RegionError;

/// 1D Gaussian kernel of the given (odd) size.
///
/// Sigma follows the usual "derive from size" convention:
/// `0.3 * ((k - 1) / 2 - 1) + 0.8`.
pub fn gaussian_kernel_1d(kernel_size: usize) -> Vec<f32> {
    debug_assert!(kernel_size >= 1 && kernel_size % 2 == 1);
    let sigma = 0.3 * ((kernel_size as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let half = (kernel_size / 2) as f64;
    let weights: Vec<f64> = (0..kernel_size)
        .map(|i| {
            let x = i as f64 - half;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.iter().map(|&w| (w / sum) as f32).collect()
}

/// Mirrors an out-of-range coordinate back into `[0, len)` without
/// repeating the edge pixel (`dcb|abcd|cba`).
fn reflect_101(pos: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let p = pos.rem_euclid(period);
    if p >= len as isize {
        (period - p) as usize
    } else {
        p as usize
    }
}

/// Source index for every (output position, tap) pair along one axis.
fn tap_offsets(len: usize, kernel_size: usize) -> Vec<usize> {
    let half = (kernel_size / 2) as isize;
    let mut taps = Vec::with_capacity(len * kernel_size);
    for i in 0..len as isize {
        for k in 0..kernel_size as isize {
            taps.push(reflect_101(i + k - half, len));
        }
    }
    taps
}

/// Separable Gaussian blur of an `(h, w, c)` block, returning a new block.
pub fn blur(roi: &Array3<u8>, kernel: &[f32]) -> Result<Array3<u8>, RegionError> {
    let (h, w, c) = roi.dim();
    let ks = kernel.len();
    if ks <= 1 || h == 0 || w == 0 {
        return Ok(roi.clone());
    }

    let src: Vec<u8> = roi.iter().copied().collect();
    let mut temp = vec![0.0f32; h * w * c];

    // Horizontal pass: src -> temp
    let x_taps = tap_offsets(w, ks);
    for y in 0..h {
        let row = y * w;
        for x in 0..w {
            let taps = &x_taps[x * ks..(x + 1) * ks];
            for ch in 0..c {
                let mut sum = 0.0f32;
                for (&sx, &weight) in taps.iter().zip(kernel) {
                    sum += src[(row + sx) * c + ch] as f32 * weight;
                }
                temp[(row + x) * c + ch] = sum;
            }
        }
    }

    // Vertical pass: temp -> out
    let y_taps = tap_offsets(h, ks);
    let mut out = vec![0u8; h * w * c];
    for y in 0..h {
        let taps = &y_taps[y * ks..(y + 1) * ks];
        for x in 0..w {
            for ch in 0..c {
                let mut sum = 0.0f32;
                for (&sy, &weight) in taps.iter().zip(kernel) {
                    sum += temp[(sy * w + x) * c + ch] * weight;
                }
                out[(y * w + x) * c + ch] = sum.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    Array3::from_shape_vec((h, w, c), out).map_err(|_| RegionError::ShapeMismatch {
        expected: h * w * c,
        actual: src.len(),
    })
}

/// Applies [`blur`] `passes` times with the same kernel.
pub fn blur_passes(
    roi: &Array3<u8>,
    kernel_size: usize,
    passes: usize,
) -> Result<Array3<u8>, RegionError> {
    let kernel = gaussian_kernel_1d(kernel_size | 1);
    let mut current = blur(roi, &kernel)?;
    for _ in 1..passes {
        current = blur(&current, &kernel)?;
    }
    Ok(current)
}
