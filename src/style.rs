use std::collections::HashMap;

use crate::config::{HexColor, RenderConfig, SegmentStyleOverride, SizeMapping};
use crate::loudness::LoudnessRange;
use crate::markup::word_markup;
use crate::model::{CaptionLine, LoudnessTable, Word};

/// Concrete visual attributes of one word.
#[derive(Debug, Clone, PartialEq)]
pub struct WordStyle {
    pub font: String,
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub color: HexColor,
    pub outline_color: HexColor,
    pub shadow_color: HexColor,
    pub letter_spacing: f64,
}

/// Renderer-ready markup for one word with the size threaded alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWordStyle {
    pub markup: String,
    pub size: f64,
    pub style: WordStyle,
}

/// Styles for every word of one caption line plus the line-level spacing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineStyles {
    words: HashMap<i64, ResolvedWordStyle>,
    pub word_spacing: f64,
    pub line_spacing: f64,
}

impl LineStyles {
    pub fn get(&self, word_index: i64) -> Option<&ResolvedWordStyle> {
        self.words.get(&word_index)
    }

    pub fn size_of(&self, word_index: i64) -> f64 {
        self.get(word_index).map_or(0.0, |resolved| resolved.size)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Override bounds win; a single overridden bound pairs with the base one.
pub fn effective_size_range(
    base: SizeMapping,
    style_override: Option<&SegmentStyleOverride>,
) -> SizeMapping {
    match style_override.map(|style| (style.size_min, style.size_max)) {
        Some((Some(min), Some(max))) => SizeMapping::new(min, max),
        Some((Some(min), None)) => SizeMapping::new(min, base.max_size),
        Some((None, Some(max))) => SizeMapping::new(base.min_size, max),
        _ => base,
    }
}

pub fn size_for(normalized: f64, range: SizeMapping) -> f64 {
    range.clamp(range.min_size + normalized * range.span())
}

pub fn resolve_line_styles(
    line: &CaptionLine,
    loudness: &LoudnessTable,
    global: LoudnessRange,
    config: &RenderConfig,
    style_override: Option<&SegmentStyleOverride>,
) -> LineStyles {
    let range = LoudnessRange::for_line(line, loudness, global);
    let sizes = effective_size_range(config.size_mapping, style_override);

    let words = line
        .words
        .iter()
        .map(|word| {
            let style = match loudness.rms(word.index) {
                Some(rms) => {
                    let size = size_for(range.normalize(rms), sizes);
                    resolve_word_style(word, size, config, style_override, false)
                }
                None => resolve_word_style(word, sizes.min_size, config, style_override, true),
            };
            let resolved = ResolvedWordStyle {
                markup: word_markup(&style, &word.text),
                size: style.size,
                style,
            };
            (word.index, resolved)
        })
        .collect();

    LineStyles {
        words,
        word_spacing: style_override
            .and_then(|style| style.word_spacing)
            .unwrap_or(config.word_spacing),
        line_spacing: style_override
            .and_then(|style| style.line_spacing)
            .unwrap_or(config.line_spacing),
    }
}

fn resolve_word_style(
    word: &Word,
    size: f64,
    config: &RenderConfig,
    style_override: Option<&SegmentStyleOverride>,
    fallback: bool,
) -> WordStyle {
    let font = match style_override.and_then(|style| style.font.as_deref()) {
        Some(font) => font.to_owned(),
        None if fallback => config.default_font.clone(),
        None => config.choose_font(size).to_owned(),
    };
    let font_style = style_override
        .and_then(|style| style.font_style)
        .unwrap_or(config.font_style);
    let timed = config.colors.lookup(word.start);
    let color = style_override
        .and_then(|style| style.font_color.clone())
        .or_else(|| timed.map(|entry| entry.color.clone()))
        .unwrap_or_else(|| config.font_color.clone());
    let shadow_color = style_override
        .and_then(|style| style.shadow_color.clone())
        .or_else(|| timed.map(|entry| entry.shadow.clone()))
        .unwrap_or_else(|| config.shadow_color.clone());

    WordStyle {
        font,
        size,
        bold: font_style.bold,
        italic: font_style.italic,
        color,
        outline_color: config.outline_color.clone(),
        shadow_color,
        letter_spacing: style_override
            .and_then(|style| style.letter_spacing)
            .unwrap_or(config.letter_spacing),
    }
}

#[cfg(test)]
mod tests {
    use super::{effective_size_range, resolve_line_styles, size_for};
    use crate::config::{
        FontBand, FontStyle, HexColor, OverrideKey, RenderConfig, SegmentStyleOverride,
        SizeMapping,
    };
    use crate::loudness::LoudnessRange;
    use crate::model::{CaptionLine, LoudnessTable, Word, WordLoudness};
    use crate::timeline::{ColorOverride, ColorTimeline};

    fn loudness(entries: &[(i64, f64)]) -> LoudnessTable {
        LoudnessTable::new(entries.iter().map(|(word_index, rms)| WordLoudness {
            word_index: *word_index,
            rms: *rms,
            peak: 0.0,
        }))
    }

    fn two_word_line() -> CaptionLine {
        CaptionLine {
            start: 0.0,
            end: 1.0,
            words: vec![Word::new(0, "a", 0.0, 0.5), Word::new(1, "b", 0.5, 1.0)],
            segment_id: None,
        }
    }

    fn config_20_40() -> RenderConfig {
        RenderConfig {
            size_mapping: SizeMapping::new(20.0, 40.0),
            ..RenderConfig::default()
        }
    }

    #[test]
    fn loudest_and_quietest_words_hit_the_size_bounds() {
        let table = loudness(&[(0, 0.1), (1, 0.3)]);
        let config = config_20_40();
        let styles = resolve_line_styles(
            &two_word_line(),
            &table,
            LoudnessRange::global(&table),
            &config,
            None,
        );
        assert_eq!(styles.size_of(0), 20.0);
        assert_eq!(styles.size_of(1), 40.0);
        let loud = styles.get(1).expect("word 1 should resolve");
        assert!(loud.markup.contains("\\fs40"));
        assert!(loud.markup.ends_with('b'));
    }

    #[test]
    fn flat_loudness_lands_mid_range() {
        let table = loudness(&[(0, 0.2), (1, 0.2)]);
        let config = config_20_40();
        let styles = resolve_line_styles(
            &two_word_line(),
            &table,
            LoudnessRange::global(&table),
            &config,
            None,
        );
        assert_eq!(styles.size_of(0), 30.0);
        assert_eq!(styles.size_of(1), 30.0);
    }

    #[test]
    fn unmatched_words_use_fallback_minimum_size() {
        let table = loudness(&[(1, 0.3)]);
        let mut config = config_20_40();
        config.font_bands = vec![FontBand {
            min_size: 0.0,
            max_size: 100.0,
            font: "Banded".to_owned(),
        }];
        let styles = resolve_line_styles(
            &two_word_line(),
            &table,
            LoudnessRange::global(&table),
            &config,
            None,
        );
        let fallback = styles.get(0).expect("fallback word should still resolve");
        assert_eq!(fallback.size, 20.0);
        assert_eq!(fallback.style.font, "Arial");
        assert_eq!(styles.get(1).expect("word 1").style.font, "Banded");
        assert_eq!(styles.len(), 2);
    }

    #[test]
    fn font_bands_pick_first_containing_band() {
        let table = loudness(&[(0, 0.1), (1, 0.3)]);
        let mut config = config_20_40();
        config.font_bands = vec![
            FontBand {
                min_size: 20.0,
                max_size: 30.0,
                font: "Quiet".to_owned(),
            },
            FontBand {
                min_size: 30.0,
                max_size: 40.0,
                font: "Loud".to_owned(),
            },
        ];
        let styles = resolve_line_styles(
            &two_word_line(),
            &table,
            LoudnessRange::global(&table),
            &config,
            None,
        );
        assert_eq!(styles.get(0).expect("word 0").style.font, "Quiet");
        assert_eq!(styles.get(1).expect("word 1").style.font, "Loud");
    }

    #[test]
    fn single_overridden_bound_is_ordered_against_base() {
        let base = SizeMapping::new(20.0, 40.0);
        let mut style = SegmentStyleOverride::keyed(OverrideKey::Segment(0));
        style.size_min = Some(50.0);
        let range = effective_size_range(base, Some(&style));
        assert_eq!(range, SizeMapping::new(40.0, 50.0));

        style.size_min = Some(10.0);
        style.size_max = Some(12.0);
        assert_eq!(
            effective_size_range(base, Some(&style)),
            SizeMapping::new(10.0, 12.0)
        );
        assert_eq!(effective_size_range(base, None), base);
    }

    #[test]
    fn size_always_within_range() {
        let range = SizeMapping::new(18.0, 72.0);
        for step in 0..=20 {
            let normalized = step as f64 / 20.0;
            let size = size_for(normalized, range);
            assert!(size >= 18.0 && size <= 72.0);
        }
    }

    #[test]
    fn override_beats_color_timeline_beats_default() {
        let table = loudness(&[(0, 0.1), (1, 0.3)]);
        let mut config = config_20_40();
        let red = HexColor::parse("#FF0000").expect("color");
        let blue = HexColor::parse("#0000FF").expect("color");
        config.colors = ColorTimeline::new(vec![ColorOverride {
            start: 0.0,
            end: 0.4,
            color: red.clone(),
            shadow: red.clone(),
        }]);

        let styles = resolve_line_styles(
            &two_word_line(),
            &table,
            LoudnessRange::global(&table),
            &config,
            None,
        );
        assert_eq!(styles.get(0).expect("word 0").style.color, red);
        assert_eq!(
            styles.get(1).expect("word 1").style.color,
            HexColor::white()
        );

        let mut style = SegmentStyleOverride::keyed(OverrideKey::Segment(0));
        style.font_color = Some(blue.clone());
        style.font_style = Some(FontStyle {
            bold: true,
            italic: false,
        });
        style.font = Some("Impact".to_owned());
        style.line_spacing = Some(8.0);
        let styles = resolve_line_styles(
            &two_word_line(),
            &table,
            LoudnessRange::global(&table),
            &config,
            Some(&style),
        );
        let first = styles.get(0).expect("word 0");
        assert_eq!(first.style.color, blue);
        assert_eq!(first.style.shadow_color, red, "shadow still follows timeline");
        assert!(first.style.bold);
        assert_eq!(first.style.font, "Impact");
        assert_eq!(styles.line_spacing, 8.0);
    }
}
