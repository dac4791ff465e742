use crate::{
    core::{Point, Rgb8},
    error::{WordscapeError, WordscapeResult},
    space::ConceptSpace,
};

/// Saturation ceiling for inverse-distance weights.
///
/// Large enough to make an exact coordinate hit dominate every other
/// reference point, small enough that its square stays finite through the
/// L2 normalization step.
pub const WEIGHT_CEILING: f64 = 1e12;

/// Inverse-distance weight with saturating arithmetic.
///
/// Zero distance saturates to [`WEIGHT_CEILING`] instead of raising a
/// division fault; NaN from degenerate distance arithmetic is coerced to 0.
/// Shared by the color and ranking paths.
pub fn inverse_distance_weight(distance: f64) -> f64 {
    let w = distance.recip();
    if w.is_nan() {
        0.0
    } else {
        w.clamp(0.0, WEIGHT_CEILING)
    }
}

/// Maps a query point to a blended anchor color and a ranked concept
/// relevance table over an immutable [`ConceptSpace`].
#[derive(Clone, Copy, Debug)]
pub struct Interpolator<'a> {
    space: &'a ConceptSpace,
}

/// One ranked entry: concept label and its inverse-distance score.
pub type RelevanceEntry = (String, f64);

impl<'a> Interpolator<'a> {
    pub fn new(space: &'a ConceptSpace) -> Self {
        Self { space }
    }

    pub fn space(&self) -> &'a ConceptSpace {
        self.space
    }

    /// Blended RGB at `point`: inverse-distance weights over the anchor set,
    /// L2-normalized, multiplied against the anchor color matrix, clipped to
    /// [0,255] and truncated per channel.
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn color_at(&self, point: Point) -> Rgb8 {
        let weights: Vec<f64> = self
            .space
            .anchors
            .iter()
            .map(|a| inverse_distance_weight(a.position.distance(point)))
            .collect();

        // Normalizing the raw reciprocal weights is the observed deployed
        // behavior; a zero norm degrades to an all-zero weight vector rather
        // than a division fault.
        let norm = weights.iter().map(|w| w * w).sum::<f64>().sqrt();
        let inv_norm = if norm > 0.0 { norm.recip() } else { 0.0 };

        let mut channels = [0.0f64; 3];
        for (anchor, w) in self.space.anchors.iter().zip(&weights) {
            let wn = w * inv_norm;
            for (acc, c) in channels.iter_mut().zip(anchor.rgb.channels()) {
                *acc += wn * f64::from(c);
            }
        }

        Rgb8 {
            r: channels[0].clamp(0.0, 255.0) as u8,
            g: channels[1].clamp(0.0, 255.0) as u8,
            b: channels[2].clamp(0.0, 255.0) as u8,
        }
    }

    /// Display background at `point`: the exact per-channel complement of
    /// [`Self::color_at`]. A contrast rule, not a neutral default.
    pub fn background_at(&self, point: Point) -> Rgb8 {
        self.color_at(point).complement()
    }

    /// Rank every concept by inverse distance from `point`.
    ///
    /// Returns one entry per concept (zero scores included), sorted by
    /// descending score; exact ties keep the dataset load order.
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn rank_concepts_at(&self, point: Point) -> Vec<RelevanceEntry> {
        let mut ranked: Vec<RelevanceEntry> = self
            .space
            .concepts
            .iter()
            .map(|c| {
                (
                    c.label.clone(),
                    inverse_distance_weight(c.position.distance(point)),
                )
            })
            .collect();

        // Stable sort: equal scores preserve concept order.
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Color for a placed word: the blended color at the word's own concept
    /// coordinate. Pure, so it is safe to hand to a layout engine as the
    /// per-word color callback.
    pub fn word_color(&self, label: &str) -> WordscapeResult<Rgb8> {
        let position = self.space.concept_position(label).ok_or_else(|| {
            WordscapeError::validation(format!("unknown concept label '{label}'"))
        })?;
        Ok(self.color_at(position))
    }
}
