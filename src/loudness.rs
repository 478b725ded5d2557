use crate::model::{CaptionLine, LoudnessTable};

/// Loudness normalized when a range collapses (`max <= min`).
pub const FLAT_LOUDNESS: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoudnessRange {
    pub min: f64,
    pub max: f64,
}

impl LoudnessRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn global(table: &LoudnessTable) -> Self {
        Self::new(table.rms_min(), table.rms_max())
    }

    /// Line-local range when the line has matched words with a real spread,
    /// otherwise `global`.
    pub fn for_line(line: &CaptionLine, table: &LoudnessTable, global: Self) -> Self {
        let mut matched = line.words.iter().filter_map(|word| table.rms(word.index));
        let Some(first) = matched.next() else {
            return global;
        };
        let (local_min, local_max) =
            matched.fold((first, first), |(lo, hi), rms| (lo.min(rms), hi.max(rms)));
        if local_max > local_min {
            Self::new(local_min, local_max)
        } else {
            global
        }
    }

    pub fn is_flat(&self) -> bool {
        self.max <= self.min
    }

    pub fn normalize(&self, rms: f64) -> f64 {
        normalize(rms, *self)
    }
}

/// Maps `rms` into `[0, 1]` over `range`.
pub fn normalize(rms: f64, range: LoudnessRange) -> f64 {
    if range.is_flat() {
        return FLAT_LOUDNESS;
    }
    let normalized = (rms - range.min) / (range.max - range.min);
    if normalized.is_nan() {
        return FLAT_LOUDNESS;
    }
    normalized.clamp(0.0, 1.0)
}
