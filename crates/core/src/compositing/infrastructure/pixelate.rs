use ndarray::Array3;

use crate::shared::error::RegionError;

/// Mosaic effect: area-average down to `floor(w/b) x floor(h/b)` cells
/// (at least 1x1), then blow back up with nearest-neighbour sampling.
pub fn pixelate(roi: &Array3<u8>, block_size: usize) -> Result<Array3<u8>, RegionError> {
    let (h, w, c) = roi.dim();
    if h == 0 || w == 0 {
        return Ok(roi.clone());
    }
    let block = block_size.max(1);
    let sw = (w / block).max(1);
    let sh = (h / block).max(1);

    let src: Vec<u8> = roi.iter().copied().collect();
    let small = area_downscale(&src, w, h, c, sw, sh);

    let mut out = vec![0u8; h * w * c];
    for y in 0..h {
        let sy = (y * sh / h).min(sh - 1);
        for x in 0..w {
            let sx = (x * sw / w).min(sw - 1);
            let dst = (y * w + x) * c;
            let from = (sy * sw + sx) * c;
            out[dst..dst + c].copy_from_slice(&small[from..from + c]);
        }
    }

    Array3::from_shape_vec((h, w, c), out).map_err(|_| RegionError::ShapeMismatch {
        expected: h * w * c,
        actual: src.len(),
    })
}

/// Averages each output cell over the source pixels it covers.
fn area_downscale(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    target_w: usize,
    target_h: usize,
) -> Vec<u8> {
    let mut out = vec![0u8; target_w * target_h * channels];
    for ty in 0..target_h {
        let y0 = ty * height / target_h;
        let y1 = ((ty + 1) * height / target_h).max(y0 + 1);
        for tx in 0..target_w {
            let x0 = tx * width / target_w;
            let x1 = ((tx + 1) * width / target_w).max(x0 + 1);
            let count = ((y1 - y0) * (x1 - x0)) as u32;
            for ch in 0..channels {
                let mut sum = 0u32;
                for sy in y0..y1 {
                    for sx in x0..x1 {
                        sum += data[(sy * width + sx) * channels + ch] as u32;
                    }
                }
                out[(ty * target_w + tx) * channels + ch] = ((sum + count / 2) / count) as u8;
            }
        }
    }
    out
}
