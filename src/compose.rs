use crate::{
    blur::box_blur_rgba8,
    core::{Raster, Rgb8},
    error::{WordscapeError, WordscapeResult},
};

/// One composited display frame plus the fill color the display surface
/// should use outside the image bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeFrame {
    pub raster: Raster,
    pub fill: Rgb8,
}

/// Combines the two rendered cloud layers and the interpolated background
/// color into one blurred frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameCompositor {
    pub blur_radius: u32,
}

impl Default for FrameCompositor {
    fn default() -> Self {
        // Deployed radius; large enough to melt the background layer into
        // the fill without erasing its color structure.
        Self { blur_radius: 10 }
    }
}

impl FrameCompositor {
    pub fn new(blur_radius: u32) -> Self {
        Self { blur_radius }
    }

    /// Composite `fg` and `bg` over an opaque `fill` canvas.
    ///
    /// The step order is a visual-effect invariant: fill, paste foreground,
    /// paste background, blur everything, then re-paste the unblurred
    /// foreground so the sharp text survives the blur of the softer layer
    /// beneath it.
    #[tracing::instrument(skip_all, level = "debug")]
    pub fn composite(
        &self,
        fg: &Raster,
        bg: &Raster,
        fill: Rgb8,
    ) -> WordscapeResult<CompositeFrame> {
        if fg.width == 0 || fg.height == 0 {
            return Err(WordscapeError::composite(
                "foreground layer must be non-empty",
            ));
        }

        let mut canvas = Raster::filled(fg.width, fg.height, fill);
        paste_over(&mut canvas, fg)?;
        paste_over(&mut canvas, bg)?;

        let blurred = box_blur_rgba8(&canvas.data, canvas.width, canvas.height, self.blur_radius)?;
        let mut frame = Raster::from_data(canvas.width, canvas.height, blurred)?;
        paste_over(&mut frame, fg)?;

        Ok(CompositeFrame {
            raster: frame,
            fill,
        })
    }
}

/// Paste `src` onto `dst` at the origin using the source's own alpha as the
/// mask, clipping to the destination bounds.
///
/// Straight-alpha blend per channel, alpha included: fully transparent
/// source pixels leave the destination untouched.
pub fn paste_over(dst: &mut Raster, src: &Raster) -> WordscapeResult<()> {
    if src.data.len() != src.width as usize * src.height as usize * 4 {
        return Err(WordscapeError::composite(
            "paste_over expects src matching width*height*4",
        ));
    }

    let w = src.width.min(dst.width) as usize;
    let h = src.height.min(dst.height) as usize;
    for y in 0..h {
        let src_row = y * src.width as usize * 4;
        let dst_row = y * dst.width as usize * 4;
        for x in 0..w {
            let si = src_row + x * 4;
            let di = dst_row + x * 4;
            let sa = u16::from(src.data[si + 3]);
            if sa == 0 {
                continue;
            }
            let inv = 255 - sa;
            for c in 0..4 {
                let s = u16::from(src.data[si + c]);
                let d = u16::from(dst.data[di + c]);
                dst.data[di + c] = mul_div255(s, sa).saturating_add(mul_div255(d, inv));
            }
        }
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paste_transparent_src_is_noop() {
        let mut dst = Raster::filled(2, 2, Rgb8::new(9, 9, 9));
        let before = dst.clone();
        let src = Raster::new(2, 2);
        paste_over(&mut dst, &src).unwrap();
        assert_eq!(dst, before);
    }

    #[test]
    fn paste_opaque_src_replaces_dst() {
        let mut dst = Raster::filled(1, 1, Rgb8::new(1, 2, 3));
        let mut src = Raster::new(1, 1);
        src.data.copy_from_slice(&[200, 100, 50, 255]);
        paste_over(&mut dst, &src).unwrap();
        assert_eq!(dst.pixel(0, 0), [200, 100, 50, 255]);
    }

    #[test]
    fn paste_half_alpha_blends() {
        let mut dst = Raster::filled(1, 1, Rgb8::new(0, 0, 0));
        let mut src = Raster::new(1, 1);
        src.data.copy_from_slice(&[255, 255, 255, 128]);
        paste_over(&mut dst, &src).unwrap();
        let px = dst.pixel(0, 0);
        assert_eq!(px[0], 128);
        // Alpha is masked like the color channels, so a half-alpha paste
        // lowers the destination alpha below opaque.
        assert_eq!(px[3], 191);
    }

    #[test]
    fn paste_clips_larger_src() {
        let mut dst = Raster::filled(2, 2, Rgb8::BLACK);
        let mut src = Raster::new(4, 4);
        for px in src.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[10, 20, 30, 255]);
        }
        paste_over(&mut dst, &src).unwrap();
        assert_eq!(dst.pixel(1, 1), [10, 20, 30, 255]);
    }

    #[test]
    fn composite_size_matches_foreground() {
        let fg = Raster::new(8, 6);
        let bg = Raster::new(3, 3);
        let frame = FrameCompositor::default()
            .composite(&fg, &bg, Rgb8::new(1, 2, 3))
            .unwrap();
        assert_eq!(frame.raster.width, 8);
        assert_eq!(frame.raster.height, 6);
    }

    #[test]
    fn transparent_layers_yield_fill_everywhere() {
        let fg = Raster::new(5, 5);
        let bg = Raster::new(5, 5);
        let fill = Rgb8::new(40, 80, 120);
        let frame = FrameCompositor::default().composite(&fg, &bg, fill).unwrap();
        for px in frame.raster.data.chunks_exact(4) {
            assert_eq!(px, [fill.r, fill.g, fill.b, 255]);
        }
        assert_eq!(frame.fill, fill);
    }

    #[test]
    fn foreground_survives_blur_unchanged() {
        let mut fg = Raster::new(9, 9);
        let center = ((4 * 9 + 4) * 4) as usize;
        fg.data[center..center + 4].copy_from_slice(&[255, 0, 0, 255]);
        let bg = Raster::new(9, 9);

        let frame = FrameCompositor::new(2)
            .composite(&fg, &bg, Rgb8::BLACK)
            .unwrap();
        // The re-paste puts the sharp foreground pixel back on top of the
        // blurred composite.
        assert_eq!(frame.raster.pixel(4, 4), [255, 0, 0, 255]);
    }
}
