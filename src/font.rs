use std::path::Path;

use anyhow::Context as _;

use crate::error::{WordscapeError, WordscapeResult};

/// Metrics for one shaped string at a given pixel size.
///
/// `offset` is the ink origin: x measured from the pen origin (left side
/// bearing), y measured down from the ascent line to the first ink row. The
/// exporter uses these to convert ink-box placements into baseline-anchored
/// text coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StringMetrics {
    /// Shaped advance width in pixels.
    pub advance: f64,
    /// Ink bounding box size in pixels.
    pub size: (f64, f64),
    /// Ink origin relative to the pen origin / ascent line, in pixels.
    pub offset: (f64, f64),
    pub ascent: f64,
    pub descent: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontMetadata {
    pub family: String,
    /// Subfamily style string from the font's name table, e.g. "Bold Italic".
    pub style_name: String,
}

/// Contract of the external font engine: per-string pixel metrics plus
/// family/style metadata for a single active font face.
pub trait FontMetrics {
    fn string_metrics(&mut self, text: &str, size_px: f64) -> WordscapeResult<StringMetrics>;
    fn metadata(&self) -> FontMetadata;
    fn font_bytes(&self) -> &[u8];
}

/// CSS font weight derived from a style string: `bold` iff it mentions bold.
pub fn weight_from_style(style_name: &str) -> &'static str {
    if style_name.to_ascii_lowercase().contains("bold") {
        "bold"
    } else {
        "normal"
    }
}

/// CSS font style derived from a style string by substring match.
pub fn slant_from_style(style_name: &str) -> &'static str {
    let style = style_name.to_ascii_lowercase();
    if style.contains("italic") {
        "italic"
    } else if style.contains("oblique") {
        "oblique"
    } else {
        "normal"
    }
}

/// Glyph ids for every character of `text` that the face can map.
///
/// Characters without a glyph are skipped; subsetting is lenient by
/// contract and a missing glyph must never abort an export.
pub fn glyph_ids_for_chars(font_bytes: &[u8], text: &str) -> WordscapeResult<Vec<u16>> {
    let face = ttf_parser::Face::parse(font_bytes, 0)
        .map_err(|e| WordscapeError::validation(format!("parse font face: {e}")))?;
    let mut ids: Vec<u16> = text
        .chars()
        .filter_map(|c| face.glyph_index(c))
        .map(|g| g.0)
        .collect();
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct MetricsBrush;

/// Font engine backed by Parley shaping and a ttf-parser face.
///
/// Parley supplies the shaped advance and line ascent/descent; the name
/// table and per-glyph ink boxes come from ttf-parser, which shaping does
/// not expose. Construction fails fast on unreadable or unparseable fonts.
pub struct ParleyFontEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<MetricsBrush>,
    font_bytes: Vec<u8>,
    family: String,
    style_name: String,
}

impl std::fmt::Debug for ParleyFontEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParleyFontEngine")
            .field("font_bytes_len", &self.font_bytes.len())
            .field("family", &self.family)
            .field("style_name", &self.style_name)
            .finish()
    }
}

impl ParleyFontEngine {
    pub fn from_path(path: impl AsRef<Path>) -> WordscapeResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font '{}'", path.display()))?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(font_bytes: Vec<u8>) -> WordscapeResult<Self> {
        let mut font_ctx = parley::FontContext::default();

        let families = font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font_bytes.clone()),
            None,
        );
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            WordscapeError::validation("no font families registered from font bytes")
        })?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| WordscapeError::validation("registered font family has no name"))?
            .to_string();

        let style_name = read_subfamily_name(&font_bytes)?;

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            font_bytes,
            family,
            style_name,
        })
    }

    fn shape(&mut self, text: &str, size_px: f32) -> parley::Layout<MetricsBrush> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        let mut layout: parley::Layout<MetricsBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

impl FontMetrics for ParleyFontEngine {
    fn string_metrics(&mut self, text: &str, size_px: f64) -> WordscapeResult<StringMetrics> {
        if text.is_empty() {
            return Err(WordscapeError::validation(
                "cannot measure an empty string",
            ));
        }
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(WordscapeError::validation(
                "font size must be finite and > 0",
            ));
        }

        let layout = self.shape(text, size_px as f32);
        let line = layout.lines().next().ok_or_else(|| {
            WordscapeError::validation("shaping produced no lines")
        })?;
        let m = line.metrics();
        let (advance, ascent, descent) = (
            f64::from(m.advance),
            f64::from(m.ascent),
            f64::from(m.descent),
        );

        let ink = ink_extents(&self.font_bytes, text, size_px)?;
        let (size, offset) = match ink {
            Some(ink) => (
                (ink.max_x - ink.min_x, ink.max_y - ink.min_y),
                (ink.min_x, ascent - ink.max_y),
            ),
            // Whitespace-only strings have no ink; fall back to the shaped
            // box so the exporter still gets usable numbers.
            None => ((advance, ascent + descent), (0.0, 0.0)),
        };

        Ok(StringMetrics {
            advance,
            size,
            offset,
            ascent,
            descent,
        })
    }

    fn metadata(&self) -> FontMetadata {
        FontMetadata {
            family: self.family.clone(),
            style_name: self.style_name.clone(),
        }
    }

    fn font_bytes(&self) -> &[u8] {
        &self.font_bytes
    }
}

struct InkExtents {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

/// Walk the string's glyph boxes in font units, scaled to pixels.
/// Y grows upward from the baseline. Returns `None` when nothing inks.
fn ink_extents(font_bytes: &[u8], text: &str, size_px: f64) -> WordscapeResult<Option<InkExtents>> {
    let face = ttf_parser::Face::parse(font_bytes, 0)
        .map_err(|e| WordscapeError::validation(format!("parse font face: {e}")))?;
    let scale = size_px / f64::from(face.units_per_em());

    let mut pen = 0.0f64;
    let mut ink: Option<InkExtents> = None;
    for ch in text.chars() {
        let Some(gid) = face.glyph_index(ch) else {
            continue;
        };
        if let Some(bbox) = face.glyph_bounding_box(gid) {
            let gx0 = pen + f64::from(bbox.x_min) * scale;
            let gx1 = pen + f64::from(bbox.x_max) * scale;
            let gy0 = f64::from(bbox.y_min) * scale;
            let gy1 = f64::from(bbox.y_max) * scale;
            ink = Some(match ink {
                None => InkExtents {
                    min_x: gx0,
                    max_x: gx1,
                    min_y: gy0,
                    max_y: gy1,
                },
                Some(prev) => InkExtents {
                    min_x: prev.min_x.min(gx0),
                    max_x: prev.max_x.max(gx1),
                    min_y: prev.min_y.min(gy0),
                    max_y: prev.max_y.max(gy1),
                },
            });
        }
        if let Some(adv) = face.glyph_hor_advance(gid) {
            pen += f64::from(adv) * scale;
        }
    }
    Ok(ink)
}

fn read_subfamily_name(font_bytes: &[u8]) -> WordscapeResult<String> {
    let face = ttf_parser::Face::parse(font_bytes, 0)
        .map_err(|e| WordscapeError::validation(format!("parse font face: {e}")))?;

    let pick = |id: u16| {
        face.names()
            .into_iter()
            .filter(|n| n.name_id == id && n.is_unicode())
            .find_map(|n| n.to_string())
    };

    Ok(pick(ttf_parser::name_id::TYPOGRAPHIC_SUBFAMILY)
        .or_else(|| pick(ttf_parser::name_id::SUBFAMILY))
        .unwrap_or_else(|| "Regular".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_and_slant_derivation() {
        assert_eq!(weight_from_style("Bold"), "bold");
        assert_eq!(weight_from_style("Bold Italic"), "bold");
        assert_eq!(weight_from_style("SemiBold"), "bold");
        assert_eq!(weight_from_style("Regular"), "normal");

        assert_eq!(slant_from_style("Bold Italic"), "italic");
        assert_eq!(slant_from_style("Oblique"), "oblique");
        assert_eq!(slant_from_style("Medium"), "normal");
    }

    #[test]
    fn engine_rejects_garbage_font_bytes() {
        assert!(ParleyFontEngine::from_bytes(vec![0u8; 16]).is_err());
    }

    #[test]
    fn glyph_ids_reject_garbage_font_bytes() {
        assert!(glyph_ids_for_chars(&[0u8; 4], "abc").is_err());
    }
}
