use crate::error::{WordscapeError, WordscapeResult};

/// Separable box blur over a straight RGBA8 buffer.
///
/// Box, not Gaussian: the flat kernel approximates the soft look at a
/// fraction of the cost, and the slightly boxy falloff is part of the
/// intended aesthetic. Edges clamp; `radius == 0` is the identity.
pub fn box_blur_rgba8(src: &[u8], width: u32, height: u32, radius: u32) -> WordscapeResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| WordscapeError::composite("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(WordscapeError::composite(
            "box_blur_rgba8 expects src matching width*height*4",
        ));
    }
    if radius == 0 || width == 0 || height == 0 {
        return Ok(src.to_vec());
    }

    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    horizontal_pass(src, &mut tmp, width, height, radius);
    vertical_pass(&tmp, &mut out, width, height, radius);
    Ok(out)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, radius: u32) {
    let r = radius as i32;
    let w = width as i32;
    let window = u64::from(2 * radius + 1);
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for dx in -r..=r {
                let sx = (x + dx).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = div_round(acc[c], window);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, radius: u32) {
    let r = radius as i32;
    let w = width as i32;
    let h = height as i32;
    let window = u64::from(2 * radius + 1);
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for dy in -r..=r {
                let sy = (y + dy).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = div_round(acc[c], window);
            }
        }
    }
}

fn div_round(acc: u64, window: u64) -> u8 {
    (((acc + window / 2) / window).min(255)) as u8
}
