use std::collections::HashSet;

use crate::config::ManualWindow;
use crate::model::{CaptionLine, Transcript, Word};

pub const MIN_INTERVAL_SECONDS: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub enum GroupingMode {
    Segment,
    FixedCount(usize),
    FixedInterval(f64),
    Rolling(usize),
    ManualWindows(Vec<ManualWindow>),
}

impl GroupingMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Segment => "segment",
            Self::FixedCount(_) => "fixed_count",
            Self::FixedInterval(_) => "fixed_interval",
            Self::Rolling(_) => "rolling",
            Self::ManualWindows(_) => "manual_windows",
        }
    }
}

/// Partition the transcript into caption lines. Empty lines are never emitted.
pub fn group_lines(transcript: &Transcript, mode: &GroupingMode) -> Vec<CaptionLine> {
    match mode {
        GroupingMode::Segment => group_by_segment(transcript),
        GroupingMode::FixedCount(count) => group_fixed_count(&transcript.flatten_words(), *count),
        GroupingMode::FixedInterval(interval) => {
            group_fixed_interval(&transcript.flatten_words(), *interval)
        }
        GroupingMode::Rolling(window) => group_rolling(&transcript.flatten_words(), *window),
        GroupingMode::ManualWindows(windows) if windows.is_empty() => group_by_segment(transcript),
        GroupingMode::ManualWindows(windows) => {
            group_manual_windows(&transcript.flatten_words(), windows)
        }
    }
}

pub fn group_by_segment(transcript: &Transcript) -> Vec<CaptionLine> {
    transcript
        .segments
        .iter()
        .filter(|segment| !segment.words.is_empty())
        .map(|segment| CaptionLine {
            start: segment.start,
            end: segment.end.max(segment.start),
            words: segment.words.clone(),
            segment_id: Some(segment.index),
        })
        .collect()
}

pub fn group_fixed_count(words: &[Word], count: usize) -> Vec<CaptionLine> {
    words
        .chunks(count.max(1))
        .filter_map(span_line)
        .collect()
}

pub fn group_fixed_interval(words: &[Word], interval: f64) -> Vec<CaptionLine> {
    let interval = if interval.is_finite() {
        interval.max(MIN_INTERVAL_SECONDS)
    } else {
        MIN_INTERVAL_SECONDS
    };
    let Some(first) = words.first() else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    let mut window_end = first.start + interval;
    let mut chunk_start = 0;
    for (position, word) in words.iter().enumerate() {
        if word.start < window_end {
            continue;
        }
        lines.extend(span_line(&words[chunk_start..position]));
        chunk_start = position;
        window_end = word.start + interval;
    }
    lines.extend(span_line(&words[chunk_start..]));
    lines
}

pub fn group_rolling(words: &[Word], window: usize) -> Vec<CaptionLine> {
    let window = window.max(1);
    words
        .iter()
        .enumerate()
        .map(|(position, word)| {
            let first = (position + 1).saturating_sub(window);
            let end = match words.get(position + 1) {
                Some(next) => next.start.max(word.start),
                None => word.end,
            };
            CaptionLine {
                start: word.start,
                end,
                words: words[first..=position].to_vec(),
                segment_id: None,
            }
        })
        .collect()
}

/// Single forward cursor over `words`: each word lands in at most one
/// overlap-matched window and skipped words are never revisited. Windows with
/// explicit `word_ids` select by id and leave the cursor alone.
pub fn group_manual_windows(words: &[Word], windows: &[ManualWindow]) -> Vec<CaptionLine> {
    let mut lines = Vec::new();
    let mut cursor = 0;

    for window in windows {
        if !(window.end > window.start) {
            continue;
        }

        let chunk = match window.word_ids.as_deref() {
            // Explicit ids leave the cursor alone, so their words can recur in overlap windows.
            Some(ids) if !ids.is_empty() => {
                let wanted = ids.iter().copied().collect::<HashSet<_>>();
                words
                    .iter()
                    .filter(|word| wanted.contains(&word.index))
                    .cloned()
                    .collect::<Vec<_>>()
            }
            _ => {
                while cursor < words.len() && words[cursor].end <= window.start {
                    cursor += 1;
                }
                let first = cursor;
                while cursor < words.len() && words[cursor].start < window.end {
                    cursor += 1;
                }
                words[first..cursor].to_vec()
            }
        };

        if chunk.is_empty() {
            continue;
        }
        lines.push(CaptionLine {
            start: window.start,
            end: window.end,
            words: chunk,
            segment_id: window.id,
        });
    }
    lines
}

fn span_line(chunk: &[Word]) -> Option<CaptionLine> {
    let (first, last) = (chunk.first()?, chunk.last()?);
    Some(CaptionLine {
        start: first.start,
        end: last.end.max(first.start),
        words: chunk.to_vec(),
        segment_id: None,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        group_fixed_count, group_fixed_interval, group_lines, group_manual_windows,
        group_rolling, GroupingMode,
    };
    use crate::config::ManualWindow;
    use crate::model::{Segment, Transcript, Word};

    fn words(count: usize, step: f64) -> Vec<Word> {
        (0..count)
            .map(|index| {
                let start = index as f64 * step;
                Word::new(index as i64, format!("w{index}"), start, start + step * 0.8)
            })
            .collect()
    }

    fn indices(words: &[Word]) -> Vec<i64> {
        words.iter().map(|word| word.index).collect()
    }

    #[test]
    fn fixed_count_splits_evenly_and_keeps_remainder() {
        let lines = group_fixed_count(&words(12, 0.5), 6);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|line| line.words.len() == 6));
        assert_eq!(lines[0].start, 0.0);
        assert_eq!(lines[0].end, lines[0].words[5].end);

        let lines = group_fixed_count(&words(14, 0.5), 6);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2].words.len(), 2);
    }

    #[test]
    fn fixed_count_zero_behaves_like_one() {
        assert_eq!(group_fixed_count(&words(3, 1.0), 0).len(), 3);
    }

    #[test]
    fn fixed_interval_opens_new_window_at_boundary_word() {
        // starts: 0.0, 0.5, 1.0, 1.5, 2.0, 2.5
        let lines = group_fixed_interval(&words(6, 0.5), 1.0);
        assert_eq!(lines.len(), 3);
        assert_eq!(indices(&lines[0].words), vec![0, 1]);
        assert_eq!(indices(&lines[1].words), vec![2, 3]);
        assert_eq!(indices(&lines[2].words), vec![4, 5]);
        assert_eq!(lines[1].start, 1.0);
    }

    #[test]
    fn fixed_interval_clamps_tiny_intervals() {
        let lines = group_fixed_interval(&words(3, 0.05), 0.0);
        assert_eq!(lines.len(), 2, "0.1s minimum window groups 0.0 and 0.05");
        assert!(group_fixed_interval(&[], 1.0).is_empty());
    }

    #[test]
    fn rolling_emits_trailing_window_per_word() {
        let source = words(4, 1.0);
        let lines = group_rolling(&source, 2);
        assert_eq!(lines.len(), 4);
        assert_eq!(indices(&lines[0].words), vec![0]);
        assert_eq!(indices(&lines[3].words), vec![2, 3]);
        assert_eq!(lines[1].end, 2.0, "ends at next word start");
        assert_eq!(lines[3].end, source[3].end, "last line ends at word end");
    }

    #[test]
    fn manual_window_without_words_is_dropped() {
        let source = vec![Word::new(0, "a", 3.0, 3.5)];
        let lines = group_manual_windows(&source, &[ManualWindow::new(1.0, 2.0)]);
        assert!(lines.is_empty());
    }

    #[test]
    fn manual_windows_consume_words_once_in_order() {
        let source = words(6, 1.0);
        let windows = vec![
            ManualWindow::new(0.5, 2.5),
            ManualWindow::new(1.0, 4.0),
            ManualWindow::new(0.0, 10.0),
        ];
        let lines = group_manual_windows(&source, &windows);
        assert_eq!(lines.len(), 3);
        assert_eq!(indices(&lines[0].words), vec![0, 1, 2]);
        assert_eq!(indices(&lines[1].words), vec![3]);
        assert_eq!(indices(&lines[2].words), vec![4, 5]);
        assert_eq!((lines[1].start, lines[1].end), (1.0, 4.0), "bounds verbatim");
    }

    #[test]
    fn word_id_windows_bypass_cursor_and_may_share_words() {
        let source = words(4, 1.0);
        let mut pinned = ManualWindow::new(10.0, 12.0);
        pinned.word_ids = Some(vec![3, 1]);
        pinned.id = Some(42);
        let windows = vec![pinned, ManualWindow::new(0.0, 1.5)];
        let lines = group_manual_windows(&source, &windows);
        assert_eq!(lines.len(), 2);
        assert_eq!(indices(&lines[0].words), vec![1, 3]);
        assert_eq!(lines[0].segment_id, Some(42));
        // word 1 is pinned above and still claimed by the overlap window
        assert_eq!(indices(&lines[1].words), vec![0, 1]);
    }

    #[test]
    fn segment_mode_skips_empty_segments_and_keeps_bounds() {
        let transcript = Transcript::from_segments(vec![
            Segment {
                index: 0,
                start: 0.0,
                end: 2.0,
                text: "a".to_owned(),
                words: vec![Word::new(0, "a", 0.2, 0.6)],
            },
            Segment {
                index: 1,
                start: 2.0,
                end: 3.0,
                text: String::new(),
                words: Vec::new(),
            },
        ]);
        let lines = group_lines(&transcript, &GroupingMode::Segment);
        assert_eq!(lines.len(), 1);
        assert_eq!((lines[0].start, lines[0].end), (0.0, 2.0));
        assert_eq!(lines[0].segment_id, Some(0));

        let fallback = group_lines(&transcript, &GroupingMode::ManualWindows(Vec::new()));
        assert_eq!(fallback, lines);
    }
}
