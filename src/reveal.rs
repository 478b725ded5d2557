use crate::config::{RenderConfig, RevealMode, SegmentStyleOverride, WriteOnKeyframe};
use crate::markup::{
    apply_position, partial_word_markup, word_separator, DialogueEntry, LINE_BREAK,
};
use crate::model::{CaptionLine, Word};
use crate::style::LineStyles;
use crate::timeline::Placement;
use crate::wrap::{wrap_words, SubLine};

/// Shortest dialogue entry ever emitted.
pub const MIN_ENTRY_SECONDS: f64 = 0.01;
/// Keyframes and reveal events closer than this collapse into one.
pub const KEYFRAME_TOLERANCE: f64 = 0.001;
/// Progress slack so a count landing exactly on a keyframe value counts as reached.
/// Subtracted, not added: `(count + ε) / N` exceeds 1.0 for the last character,
/// so a curve ending at 1.0 would never show it.
pub const WRITE_ON_EPSILON: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RevealPolicy<'a> {
    Block,
    PerWord,
    WriteOn(&'a [WriteOnKeyframe]),
}

impl<'a> RevealPolicy<'a> {
    /// Write-on keyframes from the active override beat the configured mode.
    pub fn select(mode: RevealMode, style_override: Option<&'a SegmentStyleOverride>) -> Self {
        match style_override {
            Some(style) if !style.write_on.is_empty() => Self::WriteOn(&style.write_on),
            _ => match mode {
                RevealMode::Block => Self::Block,
                RevealMode::PerWord => Self::PerWord,
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::PerWord => "per_word",
            Self::WriteOn(_) => "write_on",
        }
    }
}

/// Expand one caption line into timed dialogue entries.
pub fn reveal_line(
    line: &CaptionLine,
    styles: &LineStyles,
    policy: RevealPolicy<'_>,
    config: &RenderConfig,
) -> Vec<DialogueEntry> {
    match policy {
        RevealPolicy::Block => reveal_block(line, styles, config),
        RevealPolicy::PerWord => reveal_per_word(line, styles, config),
        RevealPolicy::WriteOn(keyframes) => reveal_write_on(line, styles, keyframes, config),
    }
}

pub fn reveal_block(
    line: &CaptionLine,
    styles: &LineStyles,
    config: &RenderConfig,
) -> Vec<DialogueEntry> {
    let start = line.start;
    let end = line.end.max(start + MIN_ENTRY_SECONDS);
    let placement = config.placements.resolve(line.segment_id, start);
    let words = line.words.iter().collect::<Vec<_>>();
    compose(&words, None, styles, config, placement, start, end)
}

/// One cumulative entry per word. The visible buffer restarts whenever the
/// resolved placement moves.
pub fn reveal_per_word(
    line: &CaptionLine,
    styles: &LineStyles,
    config: &RenderConfig,
) -> Vec<DialogueEntry> {
    let mut entries = Vec::new();
    let mut visible: Vec<&Word> = Vec::new();
    let mut previous: Option<Placement> = None;

    for (position, word) in line.words.iter().enumerate() {
        let start = line.start.max(word.start);
        let boundary = match line.words.get(position + 1) {
            Some(next) => line.end.min(next.start.max(word.end)),
            None => line.end.max(word.end),
        };
        let end = boundary.max(start + MIN_ENTRY_SECONDS);

        let placement = config.placements.resolve(line.segment_id, start);
        if previous.is_some_and(|last| last != placement) {
            visible.clear();
        }
        previous = Some(placement);
        visible.push(word);

        entries.extend(compose(&visible, None, styles, config, placement, start, end));
    }
    entries
}

pub fn reveal_write_on(
    line: &CaptionLine,
    styles: &LineStyles,
    keyframes: &[WriteOnKeyframe],
    config: &RenderConfig,
) -> Vec<DialogueEntry> {
    let curve = monotonize_keyframes(keyframes, line.start, line.end);
    let total_chars = line.char_count();
    if curve.is_empty() || total_chars == 0 {
        return reveal_block(line, styles, config);
    }

    let events = reveal_events(&curve, total_chars, line.start);
    let placement = config.placements.resolve(line.segment_id, line.start);
    let mut entries = Vec::new();

    for (position, &(time, count)) in events.iter().enumerate() {
        let next = events.get(position + 1).map_or(line.end, |(next, _)| *next);
        let end = next.max(time + MIN_ENTRY_SECONDS);
        let (words, partial) = words_for_count(&line.words, count);
        entries.extend(compose(&words, partial, styles, config, placement, time, end));
    }
    entries
}

/// Clamp into the line, sort, collapse near-identical times keeping the
/// later keyframe, then take the running maximum so reveal never regresses.
pub fn monotonize_keyframes(
    keyframes: &[WriteOnKeyframe],
    line_start: f64,
    line_end: f64,
) -> Vec<WriteOnKeyframe> {
    let line_end = line_end.max(line_start);
    let mut clamped = keyframes
        .iter()
        .filter(|frame| frame.time.is_finite() && frame.value.is_finite())
        .map(|frame| WriteOnKeyframe {
            time: frame.time.max(line_start).min(line_end),
            value: frame.value.clamp(0.0, 1.0),
        })
        .collect::<Vec<_>>();
    clamped.sort_by(|left, right| left.time.total_cmp(&right.time));

    let mut curve: Vec<WriteOnKeyframe> = Vec::with_capacity(clamped.len());
    for frame in clamped {
        match curve.last_mut() {
            Some(last) if frame.time - last.time < KEYFRAME_TOLERANCE => *last = frame,
            _ => curve.push(frame),
        }
    }

    let mut running = 0.0_f64;
    for frame in &mut curve {
        running = running.max(frame.value);
        frame.value = running;
    }
    curve
}

/// Inverse of the keyframe curve: when does reveal progress reach `progress`?
pub fn reveal_time(curve: &[WriteOnKeyframe], progress: f64, line_start: f64) -> Option<f64> {
    let first = curve.first()?;
    if progress <= first.value {
        return Some(line_start);
    }
    curve.windows(2).find_map(|pair| {
        let (from, to) = (pair[0], pair[1]);
        if progress > to.value {
            return None;
        }
        let ratio = (progress - from.value) / (to.value - from.value);
        Some(from.time + ratio * (to.time - from.time))
    })
}

/// `(time, revealed_chars)` pairs, merged when closer than the tolerance.
fn reveal_events(
    curve: &[WriteOnKeyframe],
    total_chars: usize,
    line_start: f64,
) -> Vec<(f64, usize)> {
    let mut events: Vec<(f64, usize)> = Vec::new();
    for count in 1..=total_chars {
        let progress = count as f64 / total_chars as f64 - WRITE_ON_EPSILON;
        let Some(time) = reveal_time(curve, progress, line_start) else {
            break;
        };
        match events.last_mut() {
            Some(last) if time - last.0 < KEYFRAME_TOLERANCE => last.1 = last.1.max(count),
            _ => events.push((time, count)),
        }
    }
    events
}

fn words_for_count(words: &[Word], count: usize) -> (Vec<&Word>, Option<(&Word, usize)>) {
    let mut remaining = count;
    let mut shown = Vec::new();
    let mut partial = None;
    for word in words {
        if remaining == 0 {
            break;
        }
        let chars = word.char_count();
        shown.push(word);
        if chars > remaining {
            partial = Some((word, remaining));
            remaining = 0;
        } else {
            remaining -= chars;
        }
    }
    (shown, partial)
}

fn compose(
    words: &[&Word],
    partial: Option<(&Word, usize)>,
    styles: &LineStyles,
    config: &RenderConfig,
    placement: Placement,
    start: f64,
    end: f64,
) -> Vec<DialogueEntry> {
    let separator = word_separator(styles.word_spacing);
    let rows = wrap_words(words.iter().copied(), styles, &config.display.line_word_limits);
    let rendered = rows
        .iter()
        .map(|row| (row, render_row(row, partial, styles, &separator)))
        .filter(|(_, text)| !text.is_empty())
        .collect::<Vec<_>>();

    if styles.line_spacing > 0.0 && rendered.len() > 1 {
        let rows = rendered.iter().map(|(row, _)| *row).collect::<Vec<_>>();
        let anchors = stack_rows(&rows, styles.line_spacing, placement, config.alignment);
        return rendered
            .iter()
            .zip(anchors)
            .map(|((_, text), (anchor, alignment))| DialogueEntry {
                start,
                end,
                text: apply_position(text, anchor, Some(alignment)),
            })
            .collect();
    }

    let text = rendered
        .iter()
        .map(|(_, text)| text.as_str())
        .collect::<Vec<_>>()
        .join(LINE_BREAK);
    if text.is_empty() {
        return Vec::new();
    }
    vec![DialogueEntry {
        start,
        end,
        text: apply_position(&text, placement, None),
    }]
}

fn render_row(
    row: &SubLine<'_>,
    partial: Option<(&Word, usize)>,
    styles: &LineStyles,
    separator: &str,
) -> String {
    row.words
        .iter()
        .filter_map(|word| {
            let resolved = styles.get(word.index)?;
            Some(match partial {
                Some((target, visible)) if std::ptr::eq(target, *word) => {
                    partial_word_markup(&resolved.style, &word.text, visible)
                }
                _ => resolved.markup.clone(),
            })
        })
        .collect::<Vec<_>>()
        .join(separator)
}

/// Per-row anchors for a vertically stacked block. Each row is top-anchored
/// (`\an7..9`, column kept from `alignment`) and the block as a whole hangs
/// from, centers on, or sits above the placement's y by alignment row.
pub fn stack_rows(
    rows: &[&SubLine<'_>],
    line_spacing: f64,
    placement: Placement,
    alignment: u8,
) -> Vec<(Placement, u8)> {
    let alignment = alignment.clamp(1, 9);
    let column = (alignment - 1) % 3;
    let row_alignment = 7 + column;

    let heights = rows.iter().map(|row| row.max_size).collect::<Vec<_>>();
    let gaps = line_spacing * heights.len().saturating_sub(1) as f64;
    let block_height = heights.iter().sum::<f64>() + gaps;
    let anchor_y = f64::from(placement.y);
    let top = match alignment {
        7..=9 => anchor_y,
        4..=6 => anchor_y - block_height / 2.0,
        _ => anchor_y - block_height,
    };

    let mut offset = 0.0;
    heights
        .iter()
        .map(|height| {
            let y = (top + offset).round() as i32;
            offset += height + line_spacing;
            (Placement { x: placement.x, y }, row_alignment)
        })
        .collect()
}
