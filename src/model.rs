use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub index: i64,
    pub text: String,
    pub start: f64,
    pub end: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

impl Word {
    pub fn new(index: i64, text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            index,
            text: text.into(),
            start,
            end: end.max(start),
            probability: None,
        }
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub index: i64,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub text: String,
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    pub audio_path: PathBuf,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub language: Option<String>,
    pub segments: Vec<Segment>,
}

impl Transcript {
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            ..Self::default()
        }
    }

    pub fn flatten_words(&self) -> Vec<Word> {
        self.segments
            .iter()
            .flat_map(|segment| segment.words.iter().cloned())
            .collect()
    }

    pub fn word_count(&self) -> usize {
        self.segments.iter().map(|segment| segment.words.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WordLoudness {
    pub word_index: i64,
    pub rms: f64,
    pub peak: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoudnessStats {
    pub words: usize,
    pub rms_min: f64,
    pub rms_max: f64,
    pub peak_min: f64,
    pub peak_max: f64,
}

/// Per-word loudness keyed by word index. Sparse: a word may have no entry.
#[derive(Debug, Clone, Default)]
pub struct LoudnessTable {
    by_index: HashMap<i64, WordLoudness>,
}

impl LoudnessTable {
    pub fn new(entries: impl IntoIterator<Item = WordLoudness>) -> Self {
        let by_index = entries
            .into_iter()
            .map(|entry| (entry.word_index, entry))
            .collect();
        Self { by_index }
    }

    pub fn get(&self, word_index: i64) -> Option<&WordLoudness> {
        self.by_index.get(&word_index)
    }

    pub fn rms(&self, word_index: i64) -> Option<f64> {
        self.get(word_index).map(|entry| entry.rms)
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    pub fn rms_min(&self) -> f64 {
        fold_min(self.by_index.values().map(|entry| entry.rms))
    }

    pub fn rms_max(&self) -> f64 {
        fold_max(self.by_index.values().map(|entry| entry.rms))
    }

    pub fn peak_min(&self) -> f64 {
        fold_min(self.by_index.values().map(|entry| entry.peak))
    }

    pub fn peak_max(&self) -> f64 {
        fold_max(self.by_index.values().map(|entry| entry.peak))
    }

    pub fn stats(&self) -> LoudnessStats {
        LoudnessStats {
            words: self.len(),
            rms_min: self.rms_min(),
            rms_max: self.rms_max(),
            peak_min: self.peak_min(),
            peak_max: self.peak_max(),
        }
    }
}

fn fold_min(values: impl Iterator<Item = f64>) -> f64 {
    values.reduce(f64::min).unwrap_or(0.0)
}

fn fold_max(values: impl Iterator<Item = f64>) -> f64 {
    values.reduce(f64::max).unwrap_or(0.0)
}

/// A group of words shown together, before sub-line wrapping.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionLine {
    pub start: f64,
    pub end: f64,
    pub words: Vec<Word>,
    pub segment_id: Option<i64>,
}

impl CaptionLine {
    pub fn char_count(&self) -> usize {
        self.words.iter().map(Word::char_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::{LoudnessTable, Segment, Transcript, Word, WordLoudness};

    #[test]
    fn word_new_clamps_end_to_start() {
        let word = Word::new(0, "hi", 2.0, 1.5);
        assert_eq!(word.end, 2.0);
    }

    #[test]
    fn empty_loudness_table_reports_zero_stats() {
        let table = LoudnessTable::default();
        let stats = table.stats();
        assert_eq!(stats.words, 0);
        assert_eq!(stats.rms_min, 0.0);
        assert_eq!(stats.peak_max, 0.0);
    }

    #[test]
    fn loudness_table_tracks_min_and_max() {
        let table = LoudnessTable::new([
            WordLoudness {
                word_index: 0,
                rms: 0.3,
                peak: 0.9,
            },
            WordLoudness {
                word_index: 4,
                rms: 0.1,
                peak: 0.2,
            },
        ]);
        assert_eq!(table.rms_min(), 0.1);
        assert_eq!(table.rms_max(), 0.3);
        assert_eq!(table.peak_min(), 0.2);
        assert_eq!(table.peak_max(), 0.9);
        assert_eq!(table.rms(4), Some(0.1));
        assert_eq!(table.rms(1), None);
    }

    #[test]
    fn flatten_words_keeps_segment_order() {
        let transcript = Transcript::from_segments(vec![
            Segment {
                index: 0,
                start: 0.0,
                end: 1.0,
                text: "a b".to_owned(),
                words: vec![Word::new(0, "a", 0.0, 0.5), Word::new(1, "b", 0.5, 1.0)],
            },
            Segment {
                index: 1,
                start: 1.0,
                end: 2.0,
                text: "c".to_owned(),
                words: vec![Word::new(2, "c", 1.0, 2.0)],
            },
        ]);
        let indices = transcript
            .flatten_words()
            .iter()
            .map(|word| word.index)
            .collect::<Vec<_>>();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(transcript.word_count(), 3);
    }
}
