use crate::error::{WordscapeError, WordscapeResult};

pub use kurbo::{Point, Vec2};

/// Straight (non-premultiplied) RGB color with 8-bit channels.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a 6-digit lowercase/uppercase hex triplet such as `"48cae4"`.
    pub fn from_hex(hex: &str) -> WordscapeResult<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(WordscapeError::validation(format!(
                "color '{hex}' must be a 6-digit hex triplet"
            )));
        }
        let parse = |s: &str| {
            u8::from_str_radix(s, 16).map_err(|_| {
                WordscapeError::validation(format!("color '{hex}' has a non-hex digit"))
            })
        };
        Ok(Self {
            r: parse(&hex[0..2])?,
            g: parse(&hex[2..4])?,
            b: parse(&hex[4..6])?,
        })
    }

    /// Arithmetic complement per channel (255 - c).
    pub fn complement(self) -> Self {
        Self {
            r: 255 - self.r,
            g: 255 - self.g,
            b: 255 - self.b,
        }
    }

    /// CSS color function form, e.g. `rgb(72,202,228)`.
    pub fn to_css(self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }

    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 400,
            height: 200,
        }
    }
}

/// Orientation of a placed word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Orientation {
    #[default]
    Horizontal,
    Rotated90,
}

/// Straight RGBA8 raster, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Raster {
    /// Fully transparent raster.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; byte_len(width, height)],
        }
    }

    /// Opaque raster filled with a solid color.
    pub fn filled(width: u32, height: u32, fill: Rgb8) -> Self {
        let mut data = Vec::with_capacity(byte_len(width, height));
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&[fill.r, fill.g, fill.b, 255]);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn from_data(width: u32, height: u32, data: Vec<u8>) -> WordscapeResult<Self> {
        if data.len() != byte_len(width, height) {
            return Err(WordscapeError::validation(
                "raster data must be width*height*4 bytes",
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y as usize * self.width as usize) + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }
}

fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parses_and_rejects() {
        let c = Rgb8::from_hex("48cae4").unwrap();
        assert_eq!(c, Rgb8::new(0x48, 0xca, 0xe4));
        assert_eq!(Rgb8::from_hex("#d00000").unwrap(), Rgb8::new(0xd0, 0, 0));
        assert!(Rgb8::from_hex("48cae").is_err());
        assert!(Rgb8::from_hex("48cag4").is_err());
    }

    #[test]
    fn complement_is_involutive() {
        let c = Rgb8::new(10, 200, 255);
        assert_eq!(c.complement(), Rgb8::new(245, 55, 0));
        assert_eq!(c.complement().complement(), c);
    }

    #[test]
    fn css_form_has_no_spaces() {
        assert_eq!(Rgb8::new(1, 2, 3).to_css(), "rgb(1,2,3)");
    }

    #[test]
    fn raster_constructors_size_buffers() {
        let r = Raster::new(3, 2);
        assert_eq!(r.data.len(), 24);
        assert_eq!(r.pixel(2, 1), [0, 0, 0, 0]);

        let f = Raster::filled(2, 2, Rgb8::new(5, 6, 7));
        assert_eq!(f.pixel(1, 1), [5, 6, 7, 255]);

        assert!(Raster::from_data(2, 2, vec![0u8; 15]).is_err());
    }
}
