use std::collections::BTreeSet;
use std::io::Cursor;

use base64::Engine as _;

use crate::{
    core::Orientation,
    error::{WordscapeError, WordscapeResult},
    font::{FontMetrics, glyph_ids_for_chars, slant_from_style, weight_from_style},
    layout::Layout,
};

/// Options for [`export_svg`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SvgExportOptions {
    /// Embed a base64 `@font-face` for the active font.
    pub embed_font: bool,
    /// Subset the embedded font to the characters actually used. Off embeds
    /// the full face unmodified.
    pub optimize_embedded_font: bool,
    /// Embed the layout's externally rendered raster as a debug backdrop.
    pub embed_raster_preview: bool,
}

impl Default for SvgExportOptions {
    fn default() -> Self {
        Self {
            embed_font: false,
            optimize_embedded_font: true,
            embed_raster_preview: false,
        }
    }
}

/// Serialize a finished layout to an SVG document.
///
/// Deterministic: identical layout, engine, and options produce a
/// byte-identical document. Placement order becomes text-node z-order.
/// Drawing a contour around the placement mask is not supported.
#[tracing::instrument(skip_all, level = "debug")]
pub fn export_svg(
    layout: &Layout,
    engine: &mut dyn FontMetrics,
    options: &SvgExportOptions,
) -> WordscapeResult<String> {
    layout.validate()?;

    let doc = layout.document_size();
    let scale = layout.scale;

    let dominant_font_size = match layout.max_font_size {
        Some(m) => m,
        None => layout
            .placements
            .iter()
            .map(|p| p.font_size_px)
            .fold(f64::NEG_INFINITY, f64::max),
    };
    if !dominant_font_size.is_finite() {
        return Err(WordscapeError::export(
            "layout has no placements and no max_font_size",
        ));
    }
    tracing::debug!(dominant_font_size, "exporting layout");

    let meta = engine.metadata();
    let font_family = format!("'{}'", meta.family);
    let font_weight = weight_from_style(&meta.style_name);
    let font_style = slant_from_style(&meta.style_name);

    let mut result = Vec::<String>::new();

    result.push(format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\">",
        f64::from(doc.width) * scale,
        f64::from(doc.height) * scale,
    ));

    if options.embed_font {
        let data = embedded_font_data(layout, engine, options.optimize_embedded_font)?;
        result.push(format!(
            "<style>@font-face{{font-family:{font_family};font-weight:{font_weight};\
             font-style:{font_style};src:url(\"data:font/ttf;charset=utf-8;base64,{data}\")\
             format(\"truetype\");}}</style>"
        ));
    }

    result.push(format!(
        "<style>text{{font-family:{font_family};font-weight:{font_weight};\
         font-style:{font_style};}}</style>"
    ));

    if let Some(bg) = layout.background {
        result.push(format!(
            "<rect width=\"100%\" height=\"100%\" style=\"fill:{}\"></rect>",
            bg.to_css()
        ));
    }

    if options.embed_raster_preview {
        let raster = layout.raster.as_ref().ok_or_else(|| {
            WordscapeError::export("layout has no rendered raster to embed")
        })?;
        let data = png_base64(raster)?;
        result.push(format!(
            "<image width=\"100%\" height=\"100%\" href=\"data:image/png;base64,{data}\"/>"
        ));
    }

    for placement in &layout.placements {
        let mut x = placement.position.x * scale;
        let mut y = placement.position.y * scale;

        let m = engine.string_metrics(&placement.text, placement.font_size_px * scale)?;
        let min_x = -m.offset.0;
        let max_x = m.size.0 - m.offset.0;
        let max_y = m.ascent - m.offset.1;

        let transform = match placement.orientation {
            Orientation::Rotated90 => {
                x += max_y;
                y += max_x - min_x;
                format!("translate({x},{y}) rotate(-90)")
            }
            Orientation::Horizontal => {
                x += min_x;
                y += max_y;
                format!("translate({x},{y})")
            }
        };

        let css = placement.color.to_css();
        result.push(format!(
            "<text transform=\"{transform}\" font-size=\"{}\" fill=\"{css}\" \
             stroke=\"{css}\">{}</text>",
            placement.font_size_px * scale,
            escape_markup(&placement.text),
        ));
    }

    result.push("</svg>".to_string());
    Ok(result.join("\n"))
}

/// Base64 payload for the `@font-face` rule.
///
/// Subsetting is lenient: characters the face cannot map are dropped, and a
/// subsetter failure degrades to embedding the full face instead of
/// aborting the export.
fn embedded_font_data(
    layout: &Layout,
    engine: &mut dyn FontMetrics,
    optimize: bool,
) -> WordscapeResult<String> {
    let bytes = engine.font_bytes();

    let payload: Vec<u8> = if optimize {
        let characters: BTreeSet<char> = layout
            .placements
            .iter()
            .flat_map(|p| p.text.chars())
            .collect();
        let text: String = characters.into_iter().collect();
        let subset = || -> WordscapeResult<Vec<u8>> {
            let ids = glyph_ids_for_chars(bytes, &text)?;
            subsetter::subset(bytes, 0, subsetter::Profile::pdf(&ids))
                .map_err(|e| WordscapeError::export(format!("subset font: {e}")))
        };
        match subset() {
            Ok(sub) => sub,
            Err(e) => {
                tracing::warn!("font subsetting failed ({e}), embedding full face");
                bytes.to_vec()
            }
        }
    } else {
        bytes.to_vec()
    };

    Ok(base64::engine::general_purpose::STANDARD.encode(payload))
}

fn png_base64(raster: &crate::core::Raster) -> WordscapeResult<String> {
    let img = image::RgbaImage::from_raw(raster.width, raster.height, raster.data.clone())
        .ok_or_else(|| WordscapeError::export("layout raster has inconsistent dimensions"))?;
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| WordscapeError::export(format!("encode raster preview: {e}")))?;
    Ok(base64::engine::general_purpose::STANDARD.encode(buf))
}

/// Escape the characters that would break out of a text node.
fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Canvas, Orientation, Point, Raster, Rgb8};
    use crate::font::{FontMetadata, StringMetrics};
    use crate::layout::GlyphPlacement;

    /// Deterministic stand-in for the external font engine.
    struct FixedFontEngine;

    impl FontMetrics for FixedFontEngine {
        fn string_metrics(&mut self, text: &str, size_px: f64) -> WordscapeResult<StringMetrics> {
            let advance = 0.6 * size_px * text.chars().count() as f64;
            let ascent = 0.8 * size_px;
            let descent = 0.2 * size_px;
            Ok(StringMetrics {
                advance,
                size: (advance, ascent + descent),
                offset: (0.0, 0.0),
                ascent,
                descent,
            })
        }

        fn metadata(&self) -> FontMetadata {
            FontMetadata {
                family: "Testa".to_string(),
                style_name: "Bold Italic".to_string(),
            }
        }

        fn font_bytes(&self) -> &[u8] {
            &[]
        }
    }

    fn layout_with(placements: Vec<GlyphPlacement>) -> Layout {
        Layout {
            canvas: Canvas {
                width: 100,
                height: 50,
            },
            scale: 2.0,
            max_font_size: Some(90.0),
            background: Some(Rgb8::new(0, 0, 0)),
            placements,
            ..Layout::default()
        }
    }

    fn word(text: &str, x: f64, y: f64, orientation: Orientation) -> GlyphPlacement {
        GlyphPlacement {
            text: text.to_string(),
            font_size_px: 10.0,
            position: Point::new(x, y),
            orientation,
            color: Rgb8::new(1, 2, 3),
        }
    }

    fn assert_balanced(doc: &str) {
        let opens = doc.matches('<').count();
        let closes = doc.matches('>').count();
        assert_eq!(opens, closes);
        assert!(doc.starts_with("<svg"));
        assert!(doc.ends_with("</svg>"));
    }

    #[test]
    fn one_text_node_per_placement_in_order() {
        let layout = layout_with(vec![
            word("first", 0.0, 0.0, Orientation::Horizontal),
            word("second", 5.0, 5.0, Orientation::Horizontal),
        ]);
        let doc = export_svg(&layout, &mut FixedFontEngine, &SvgExportOptions::default()).unwrap();

        assert_balanced(&doc);
        assert_eq!(doc.matches("<text").count(), 2);
        let first = doc.find("first").unwrap();
        let second = doc.find("second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn export_is_byte_deterministic() {
        let layout = layout_with(vec![
            word("alpha", 1.0, 2.0, Orientation::Horizontal),
            word("beta", 3.0, 4.0, Orientation::Rotated90),
        ]);
        let a = export_svg(&layout, &mut FixedFontEngine, &SvgExportOptions::default()).unwrap();
        let b = export_svg(&layout, &mut FixedFontEngine, &SvgExportOptions::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn header_scales_document_size() {
        let layout = layout_with(vec![]);
        let doc = export_svg(&layout, &mut FixedFontEngine, &SvgExportOptions::default()).unwrap();
        assert!(doc.contains("width=\"200\""));
        assert!(doc.contains("height=\"100\""));
    }

    #[test]
    fn mask_size_overrides_canvas() {
        let mut layout = layout_with(vec![]);
        layout.mask_size = Some(Canvas {
            width: 32,
            height: 16,
        });
        let doc = export_svg(&layout, &mut FixedFontEngine, &SvgExportOptions::default()).unwrap();
        assert!(doc.contains("width=\"64\""));
        assert!(doc.contains("height=\"32\""));
    }

    #[test]
    fn rotated_placement_emits_rotate_transform() {
        let layout = layout_with(vec![word("tall", 0.0, 0.0, Orientation::Rotated90)]);
        let doc = export_svg(&layout, &mut FixedFontEngine, &SvgExportOptions::default()).unwrap();
        assert!(doc.contains("rotate(-90)"));
    }

    #[test]
    fn styles_carry_derived_weight_and_slant() {
        let layout = layout_with(vec![]);
        let doc = export_svg(&layout, &mut FixedFontEngine, &SvgExportOptions::default()).unwrap();
        assert!(doc.contains("font-family:'Testa'"));
        assert!(doc.contains("font-weight:bold"));
        assert!(doc.contains("font-style:italic"));
    }

    #[test]
    fn background_rect_precedes_text() {
        let layout = layout_with(vec![word("w", 0.0, 0.0, Orientation::Horizontal)]);
        let doc = export_svg(&layout, &mut FixedFontEngine, &SvgExportOptions::default()).unwrap();
        let rect = doc.find("<rect").unwrap();
        let text = doc.find("<text").unwrap();
        assert!(rect < text);
        assert!(doc.contains("style=\"fill:rgb(0,0,0)\""));
    }

    #[test]
    fn fill_and_stroke_are_the_placement_color() {
        let layout = layout_with(vec![word("w", 0.0, 0.0, Orientation::Horizontal)]);
        let doc = export_svg(&layout, &mut FixedFontEngine, &SvgExportOptions::default()).unwrap();
        assert!(doc.contains("fill=\"rgb(1,2,3)\""));
        assert!(doc.contains("stroke=\"rgb(1,2,3)\""));
    }

    #[test]
    fn markup_unsafe_text_is_escaped() {
        let layout = layout_with(vec![word("a<b&c>", 0.0, 0.0, Orientation::Horizontal)]);
        let doc = export_svg(&layout, &mut FixedFontEngine, &SvgExportOptions::default()).unwrap();
        assert!(doc.contains(">a&lt;b&amp;c&gt;</text>"));
        assert!(!doc.contains("a<b"));
    }

    #[test]
    fn empty_layout_without_max_font_size_fails_atomically() {
        let mut layout = layout_with(vec![]);
        layout.max_font_size = None;
        let err = export_svg(&layout, &mut FixedFontEngine, &SvgExportOptions::default());
        assert!(err.is_err());
    }

    #[test]
    fn raster_preview_requires_a_raster() {
        let options = SvgExportOptions {
            embed_raster_preview: true,
            ..SvgExportOptions::default()
        };

        let layout = layout_with(vec![]);
        assert!(export_svg(&layout, &mut FixedFontEngine, &options).is_err());

        let mut layout = layout_with(vec![]);
        layout.raster = Some(Raster::filled(4, 4, Rgb8::new(9, 9, 9)));
        let doc = export_svg(&layout, &mut FixedFontEngine, &options).unwrap();
        assert!(doc.contains("data:image/png;base64,"));
        let image = doc.find("<image").unwrap();
        assert!(image < doc.find("</svg>").unwrap());
    }
}
