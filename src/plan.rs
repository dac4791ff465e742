use crate::{core::Point, interp::Interpolator};

/// Deployed foreground table size.
pub const DEFAULT_FG_WORDS: usize = 15;
/// Deployed background table size.
pub const DEFAULT_BG_WORDS: usize = 7;

/// Ranked `label -> weight` input for a word-cloud layout engine.
///
/// Entry order is rank order; the table is always a strict prefix of the
/// relevance ranking it was cut from. Weights carry absolute magnitude so
/// the layout engine can derive font sizes from them; no renormalization
/// happens here.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrequencyTable {
    entries: Vec<(String, f64)>,
}

impl FrequencyTable {
    pub fn from_entries(entries: Vec<(String, f64)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn weight(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|&(_, w)| w)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, f64)> {
        self.entries.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }
}

/// Turns the interpolator's concept ranking into the foreground and
/// background frequency tables consumed by the layout engine.
#[derive(Clone, Copy, Debug)]
pub struct CloudFrequencyPlanner<'a> {
    interp: Interpolator<'a>,
}

impl<'a> CloudFrequencyPlanner<'a> {
    pub fn new(interp: Interpolator<'a>) -> Self {
        Self { interp }
    }

    /// Top-`fg_size` and top-`bg_size` prefixes of the concept ranking at
    /// `point`. Both tables are cut from the same ranking; a zero size
    /// yields an empty table.
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn plan_frequencies(
        &self,
        point: Point,
        fg_size: usize,
        bg_size: usize,
    ) -> (FrequencyTable, FrequencyTable) {
        let ranked = self.interp.rank_concepts_at(point);
        let cut = |k: usize| FrequencyTable::from_entries(ranked[..k.min(ranked.len())].to_vec());
        (cut(fg_size), cut(bg_size))
    }
}
