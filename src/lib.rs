//! Wordscape renders a continuous 2-D "concept space" as a live visual.
//!
//! A pointer position maps to (a) a blended background color and (b) two
//! layered word clouds whose word choice and sizing reflect proximity to a
//! fixed set of labeled concept coordinates.
//!
//! # Pipeline overview
//!
//! 1. **Interpolate**: `ConceptSpace + Point -> {color, ranked concepts}`
//!    via inverse-distance weighting ([`Interpolator`])
//! 2. **Plan**: ranking -> foreground/background frequency tables
//!    ([`CloudFrequencyPlanner`])
//! 3. **Lay out** (external): frequency tables -> [`Layout`] through the
//!    [`CloudLayoutEngine`] seam
//! 4. **Render**: [`export_svg`] for the vector path, or
//!    [`FrameCompositor`] for the blurred raster path
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: identical inputs yield identical colors, rankings,
//!   and byte-identical SVG documents.
//! - **No IO in the per-frame path**: datasets and fonts load once at
//!   startup and fail fast; interpolation, planning, compositing, and
//!   export are pure transforms over in-memory data.
//! - **Degenerate geometry never faults**: zero distances saturate, NaN
//!   sanitizes to zero.
#![forbid(unsafe_code)]

mod blur;
mod compose;
mod core;
mod error;
mod font;
mod interp;
mod layout;
mod plan;
mod space;
mod svg;

pub use crate::core::{Canvas, Orientation, Point, Raster, Rgb8, Vec2};
pub use blur::box_blur_rgba8;
pub use compose::{CompositeFrame, FrameCompositor, paste_over};
pub use error::{WordscapeError, WordscapeResult};
pub use font::{
    FontMetadata, FontMetrics, ParleyFontEngine, StringMetrics, glyph_ids_for_chars,
    slant_from_style, weight_from_style,
};
pub use interp::{Interpolator, RelevanceEntry, WEIGHT_CEILING, inverse_distance_weight};
pub use layout::{CloudConfig, CloudLayoutEngine, GlyphPlacement, Layout};
pub use plan::{CloudFrequencyPlanner, DEFAULT_BG_WORDS, DEFAULT_FG_WORDS, FrequencyTable};
pub use space::{AnchorColor, Concept, ConceptSpace};
pub use svg::{SvgExportOptions, export_svg};
