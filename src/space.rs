use std::collections::HashSet;
use std::path::Path;

use anyhow::Context as _;

use crate::{
    core::{Point, Rgb8},
    error::{WordscapeError, WordscapeResult},
};

/// A reference RGB value tied to a fixed position, used as a color
/// interpolation endpoint.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnchorColor {
    pub rgb: Rgb8,
    pub position: Point,
}

/// A labeled coordinate in the visualized space.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Concept {
    pub label: String,
    pub position: Point,
}

/// Immutable lookup from concept labels and anchor colors to 2-D coordinates.
///
/// Constructed once at startup and passed by shared reference to every
/// component. Concept order is the dataset load order and drives the
/// deterministic tie-break in ranking, so it is preserved as-is.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ConceptSpace {
    pub anchors: Vec<AnchorColor>,
    pub concepts: Vec<Concept>,
}

impl ConceptSpace {
    pub fn new(anchors: Vec<AnchorColor>, concepts: Vec<Concept>) -> WordscapeResult<Self> {
        let space = Self { anchors, concepts };
        space.validate()?;
        Ok(space)
    }

    /// The deployed anchor palette: four colors pinned just inside the
    /// corners of the 0..100 square.
    pub fn default_anchors() -> Vec<AnchorColor> {
        const PALETTE: [(&str, (f64, f64)); 4] = [
            ("48cae4", (25.001, 25.001)),
            ("ffb703", (75.001, 25.001)),
            ("06d6a0", (25.001, 75.001)),
            ("d00000", (75.001, 75.001)),
        ];
        PALETTE
            .iter()
            .map(|&(hex, (x, y))| AnchorColor {
                // Palette literals are compile-time constants; from_hex
                // cannot fail on them.
                rgb: Rgb8::from_hex(hex).unwrap_or(Rgb8::BLACK),
                position: Point::new(x, y),
            })
            .collect()
    }

    /// Load a concept dataset (JSON object mapping `label` to `[x, y]`) and
    /// pair it with the default anchor palette.
    ///
    /// A missing or malformed dataset is fatal; the per-frame pipeline never
    /// starts without a valid space.
    pub fn load(path: impl AsRef<Path>) -> WordscapeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read concept dataset '{}'", path.display()))?;
        Self::from_json(&text)
    }

    /// Parse a concept dataset from JSON, preserving entry order.
    pub fn from_json(text: &str) -> WordscapeResult<Self> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| WordscapeError::serde(format!("parse concept dataset: {e}")))?;
        let obj = value
            .as_object()
            .ok_or_else(|| WordscapeError::serde("concept dataset must be a JSON object"))?;

        let mut concepts = Vec::with_capacity(obj.len());
        for (label, coords) in obj {
            let pair = coords.as_array().filter(|a| a.len() == 2).ok_or_else(|| {
                WordscapeError::serde(format!("concept '{label}' must map to [x, y]"))
            })?;
            let x = pair[0].as_f64();
            let y = pair[1].as_f64();
            let (Some(x), Some(y)) = (x, y) else {
                return Err(WordscapeError::serde(format!(
                    "concept '{label}' coordinates must be numbers"
                )));
            };
            concepts.push(Concept {
                label: label.clone(),
                position: Point::new(x, y),
            });
        }

        Self::new(Self::default_anchors(), concepts)
    }

    pub fn validate(&self) -> WordscapeResult<()> {
        if self.anchors.is_empty() {
            return Err(WordscapeError::validation("anchor set must be non-empty"));
        }
        if self.concepts.is_empty() {
            return Err(WordscapeError::validation(
                "concept dataset must contain at least one entry",
            ));
        }

        for anchor in &self.anchors {
            if !anchor.position.x.is_finite() || !anchor.position.y.is_finite() {
                return Err(WordscapeError::validation(
                    "anchor positions must be finite",
                ));
            }
        }

        let mut seen = HashSet::new();
        for concept in &self.concepts {
            if concept.label.trim().is_empty() {
                return Err(WordscapeError::validation(
                    "concept labels must be non-empty",
                ));
            }
            if !concept.position.x.is_finite() || !concept.position.y.is_finite() {
                return Err(WordscapeError::validation(format!(
                    "concept '{}' has a non-finite position",
                    concept.label
                )));
            }
            if !seen.insert(concept.label.as_str()) {
                return Err(WordscapeError::validation(format!(
                    "duplicate concept label '{}'",
                    concept.label
                )));
            }
        }

        Ok(())
    }

    pub fn concept_position(&self, label: &str) -> Option<Point> {
        self.concepts
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.position)
    }
}
