use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::model::{LoudnessTable, Segment, Transcript, Word, WordLoudness};

#[derive(Debug, Deserialize)]
struct RawTranscript {
    #[serde(default)]
    audio_path: PathBuf,
    #[serde(default)]
    model_name: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    segments: Vec<RawSegment>,
}

#[derive(Debug, Deserialize)]
struct RawSegment {
    index: Option<i64>,
    #[serde(default)]
    start: f64,
    #[serde(default)]
    end: f64,
    #[serde(default)]
    text: String,
    #[serde(default)]
    words: Vec<RawWord>,
}

#[derive(Debug, Deserialize)]
struct RawWord {
    index: Option<i64>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    start: f64,
    #[serde(default)]
    end: f64,
    #[serde(default)]
    probability: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    words: Vec<RawDynamics>,
}

#[derive(Debug, Deserialize)]
struct RawDynamics {
    word_index: Option<i64>,
    #[serde(default)]
    rms: f64,
    #[serde(default)]
    peak: f64,
}

pub fn load_transcript(path: &Path) -> Result<Transcript> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read transcript {}", path.display()))?;
    let transcript = parse_transcript(&contents)
        .with_context(|| format!("failed to parse transcript {}", path.display()))?;
    debug!(
        path = %path.display(),
        segments = transcript.segments.len(),
        words = transcript.word_count(),
        "loaded transcript"
    );
    Ok(transcript)
}

pub fn parse_transcript(contents: &str) -> Result<Transcript> {
    let raw: RawTranscript = serde_json::from_str(contents).map_err(json_error)?;
    let mut indexer = WordIndexer::default();
    let mut segments = Vec::with_capacity(raw.segments.len());

    for (position, segment) in raw.segments.into_iter().enumerate() {
        let mut words = Vec::with_capacity(segment.words.len());
        for word in segment.words {
            let mut parsed = Word::new(
                indexer.assign(word.index),
                word.text,
                word.start,
                word.end,
            );
            parsed.probability = word.probability;
            words.push(parsed);
        }
        segments.push(Segment {
            index: segment.index.unwrap_or(position as i64),
            start: segment.start,
            end: segment.end.max(segment.start),
            text: segment.text,
            words,
        });
    }

    Ok(Transcript {
        audio_path: raw.audio_path,
        model_name: raw.model_name,
        language: raw.language,
        segments,
    })
}

/// Word indices are unique across the whole transcript. A missing index
/// defaults to the word's position in the flattened word list, and an index
/// already taken moves past the highest one seen so far.
#[derive(Debug, Default)]
struct WordIndexer {
    position: i64,
    highest: Option<i64>,
    used: HashSet<i64>,
}

impl WordIndexer {
    fn assign(&mut self, explicit: Option<i64>) -> i64 {
        let wanted = explicit.unwrap_or(self.position);
        self.position += 1;

        let index = if self.used.contains(&wanted) {
            let renumbered = self.highest.map_or(0, |highest| highest + 1);
            warn!(wanted, renumbered, "duplicate word index renumbered");
            renumbered
        } else {
            wanted
        };
        self.used.insert(index);
        self.highest = Some(self.highest.map_or(index, |highest| highest.max(index)));
        index
    }
}

pub fn load_loudness(path: &Path) -> Result<LoudnessTable> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read loudness analysis {}", path.display()))?;
    let table = parse_loudness(&contents)
        .with_context(|| format!("failed to parse loudness analysis {}", path.display()))?;
    debug!(path = %path.display(), words = table.len(), "loaded loudness analysis");
    Ok(table)
}

pub fn parse_loudness(contents: &str) -> Result<LoudnessTable> {
    let raw: RawAnalysis = serde_json::from_str(contents).map_err(json_error)?;
    Ok(LoudnessTable::new(raw.words.into_iter().enumerate().map(
        |(position, item)| WordLoudness {
            word_index: item.word_index.unwrap_or(position as i64),
            rms: non_negative(item.rms),
            peak: non_negative(item.peak),
        },
    )))
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

fn json_error(error: serde_json::Error) -> anyhow::Error {
    anyhow!(
        "invalid json at line {}, column {}: {}",
        error.line(),
        error.column(),
        error
    )
}
