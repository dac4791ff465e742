use crate::{
    core::{Canvas, Orientation, Point, Raster, Rgb8},
    error::{WordscapeError, WordscapeResult},
    plan::FrequencyTable,
};

/// One placed word as produced by the layout engine.
///
/// Position is the top-left of the word's ink box in unscaled layout units;
/// the exporter alone applies the layout's `scale`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GlyphPlacement {
    pub text: String,
    pub font_size_px: f64,
    pub position: Point,
    #[serde(default)]
    pub orientation: Orientation,
    pub color: Rgb8,
}

/// A fully resolved word-cloud layout.
///
/// Placement order is the z-order: later entries draw on top. Produced once
/// by an external layout engine and consumed once by the exporter or the
/// raster renderer.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Layout {
    pub canvas: Canvas,
    /// Dimensions of the placement mask, when one was used. Takes precedence
    /// over `canvas` for the exported document size.
    #[serde(default)]
    pub mask_size: Option<Canvas>,
    pub scale: f64,
    #[serde(default)]
    pub max_font_size: Option<f64>,
    #[serde(default)]
    pub background: Option<Rgb8>,
    pub placements: Vec<GlyphPlacement>,
    /// Raster rendering of this layout, when the engine produced one.
    /// Not part of the serialized form.
    #[serde(skip)]
    pub raster: Option<Raster>,
}

impl Layout {
    pub fn validate(&self) -> WordscapeResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(WordscapeError::validation(
                "layout canvas width/height must be > 0",
            ));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(WordscapeError::validation(
                "layout scale must be finite and > 0",
            ));
        }
        if let Some(m) = self.max_font_size
            && (!m.is_finite() || m <= 0.0)
        {
            return Err(WordscapeError::validation(
                "layout max_font_size must be finite and > 0",
            ));
        }
        for p in &self.placements {
            if p.text.is_empty() {
                return Err(WordscapeError::validation(
                    "placement text must be non-empty",
                ));
            }
            if !p.font_size_px.is_finite() || p.font_size_px <= 0.0 {
                return Err(WordscapeError::validation(format!(
                    "placement '{}' font size must be finite and > 0",
                    p.text
                )));
            }
            if !p.position.x.is_finite() || !p.position.y.is_finite() {
                return Err(WordscapeError::validation(format!(
                    "placement '{}' has a non-finite position",
                    p.text
                )));
            }
        }
        Ok(())
    }

    /// The document size in unscaled layout units: mask dimensions when a
    /// placement mask was used, the explicit canvas otherwise.
    pub fn document_size(&self) -> Canvas {
        self.mask_size.unwrap_or(self.canvas)
    }
}

/// Configuration handed to the external layout engine alongside a frequency
/// table.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CloudConfig {
    pub canvas: Canvas,
    pub scale: f64,
    pub max_font_size: Option<f64>,
    pub min_font_size: f64,
    pub font_step: f64,
    pub background: Option<Rgb8>,
    /// Placement mask; opaque pixels exclude placement. Not serialized.
    #[serde(skip)]
    pub mask: Option<Raster>,
    /// Seed for the engine's placement tie-breaks, for reproducibility.
    pub seed: u64,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            scale: 1.0,
            max_font_size: Some(90.0),
            min_font_size: 4.0,
            font_step: 1.0,
            background: None,
            mask: None,
            seed: 0,
        }
    }
}

impl CloudConfig {
    /// Deployed foreground cloud: masked, finely stepped, scaled up 8x.
    pub fn foreground(mask: Option<Raster>) -> Self {
        Self {
            scale: 8.0,
            mask,
            ..Self::default()
        }
    }

    /// Deployed background cloud: tiny canvas blown up 16x with a coarse
    /// font step, so a handful of words reads as soft texture.
    pub fn background() -> Self {
        Self {
            canvas: Canvas {
                width: 60,
                height: 60,
            },
            scale: 16.0,
            min_font_size: 2.0,
            font_step: 8.0,
            ..Self::default()
        }
    }
}

/// The external greedy-spiral placement engine.
///
/// `color` is invoked once per placed word with that word's label and must
/// be pure with respect to layout state; it re-enters the interpolator's
/// color computation.
pub trait CloudLayoutEngine {
    fn generate(
        &mut self,
        frequencies: &FrequencyTable,
        config: &CloudConfig,
        color: &dyn Fn(&str) -> Rgb8,
    ) -> WordscapeResult<Layout>;
}
