use crate::config::BlurParams;
use crate::foundation::core::PixelSize;
use crate::foundation::error::{CoverError, CoverResult};

/// Normalized Gaussian weights in Q16 fixed point (they sum to exactly `1 << 16`).
#[derive(Clone, Debug, PartialEq)]
pub struct GaussianKernel {
    params: BlurParams,
    weights: Vec<u32>,
}

impl GaussianKernel {
    pub fn new(params: BlurParams) -> CoverResult<Self> {
        params.validate()?;
        let weights = gaussian_kernel_q16(params.radius_px, params.sigma)?;
        Ok(Self { params, weights })
    }

    /// Pass-through kernel (radius 0) that allocates nothing.
    pub(crate) fn identity() -> Self {
        Self {
            params: BlurParams {
                radius_px: 0,
                sigma: 1.0,
            },
            weights: Vec::new(),
        }
    }

    pub fn params(&self) -> BlurParams {
        self.params
    }

    pub fn is_identity(&self) -> bool {
        self.params.radius_px == 0
    }
}

/// One-shot blur returning a fresh buffer.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    params: BlurParams,
) -> CoverResult<Vec<u8>> {
    let kernel = GaussianKernel::new(params)?;
    let mut tmp = vec![0u8; src.len()];
    let mut out = vec![0u8; src.len()];
    blur_rgba8_premul_into(src, &mut tmp, &mut out, PixelSize::new(width, height), &kernel)?;
    Ok(out)
}

/// Separable blur of `src` into `out`, using `tmp` for the horizontal pass.
///
/// All three buffers must be `width * height * 4` bytes. Edges clamp.
pub fn blur_rgba8_premul_into(
    src: &[u8],
    tmp: &mut [u8],
    out: &mut [u8],
    size: PixelSize,
    kernel: &GaussianKernel,
) -> CoverResult<()> {
    let expected_len = size.rgba8_len()?;
    if src.len() != expected_len || tmp.len() != expected_len || out.len() != expected_len {
        return Err(CoverError::draw(
            "blur expects src/tmp/out matching width*height*4",
        ));
    }
    if kernel.is_identity() || size.is_empty() {
        out.copy_from_slice(src);
        return Ok(());
    }

    horizontal_pass(src, tmp, size.width, size.height, &kernel.weights);
    vertical_pass(tmp, out, size.width, size.height, &kernel.weights);
    Ok(())
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> CoverResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(CoverError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(CoverError::draw("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Rounding drift goes to the center tap.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let new_mid = (i64::from(weights[mid]) + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }

    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    v.min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
