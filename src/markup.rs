use std::fmt::Write as _;

use crate::config::{HexColor, RenderConfig};
use crate::style::WordStyle;
use crate::timeline::Placement;

pub const LINE_BREAK: &str = "\\N";
pub const HIDDEN_ALPHA_TAG: &str = "\\alpha&HFF&";

/// `H:MM:SS.CC`, rounded to the nearest centisecond and floored at zero.
pub fn format_timestamp(seconds: f64) -> String {
    let centiseconds = if seconds.is_finite() {
        (seconds * 100.0).round().max(0.0) as u64
    } else {
        0
    };
    let cs = centiseconds % 100;
    let total_seconds = centiseconds / 100;
    let s = total_seconds % 60;
    let total_minutes = total_seconds / 60;
    let m = total_minutes % 60;
    let h = total_minutes / 60;
    format!("{h}:{m:02}:{s:02}.{cs:02}")
}

pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '{' => escaped.push_str("\\{"),
            '}' => escaped.push_str("\\}"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Override-tag color: `&HBBGGRR&`.
pub fn color_tag(color: &HexColor) -> String {
    let (r, g, b) = color.channels();
    format!("&H{b:02X}{g:02X}{r:02X}&")
}

/// Style-line color with alpha: `&HAABBGGRR`.
pub fn style_color(color: &HexColor, alpha: u8) -> String {
    let (r, g, b) = color.channels();
    format!("&H{alpha:02X}{b:02X}{g:02X}{r:02X}")
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        let mut rendered = format!("{value:.2}");
        while rendered.ends_with('0') {
            rendered.pop();
        }
        if rendered.ends_with('.') {
            rendered.pop();
        }
        rendered
    }
}

pub fn tag_block(style: &WordStyle) -> String {
    let mut block = String::from("{");
    let _ = write!(
        block,
        "\\fn{}\\fs{}\\b{}\\i{}\\1c{}\\3c{}\\4c{}\\fsp{}",
        style.font,
        style.size.round() as i64,
        u8::from(style.bold),
        u8::from(style.italic),
        color_tag(&style.color),
        color_tag(&style.outline_color),
        color_tag(&style.shadow_color),
        format_number(style.letter_spacing),
    );
    block.push('}');
    block
}

pub fn word_markup(style: &WordStyle, text: &str) -> String {
    format!("{}{}", tag_block(style), escape_text(text))
}

/// A partially revealed word: `visible_chars` in full style, the rest kept in
/// layout but fully transparent.
pub fn partial_word_markup(style: &WordStyle, text: &str, visible_chars: usize) -> String {
    let split = text
        .char_indices()
        .nth(visible_chars)
        .map_or(text.len(), |(offset, _)| offset);
    let (visible, hidden) = text.split_at(split);
    let mut markup = word_markup(style, visible);
    if !hidden.is_empty() {
        let _ = write!(markup, "{{{HIDDEN_ALPHA_TAG}}}{}", escape_text(hidden));
    }
    markup
}

pub fn word_separator(word_spacing: f64) -> String {
    if word_spacing > 0.0 {
        format!("{{\\fsp{}}} ", format_number(word_spacing))
    } else {
        " ".to_owned()
    }
}

pub fn position_tag(placement: Placement, alignment: Option<u8>) -> String {
    match alignment {
        Some(alignment) => format!(
            "{{\\an{alignment}\\pos({},{})}}",
            placement.x, placement.y
        ),
        None => format!("{{\\pos({},{})}}", placement.x, placement.y),
    }
}

pub fn apply_position(text: &str, placement: Placement, alignment: Option<u8>) -> String {
    if text.is_empty() {
        return String::new();
    }
    format!("{}{text}", position_tag(placement, alignment))
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogueEntry {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl DialogueEntry {
    pub fn to_event_line(&self) -> String {
        format!(
            "Dialogue: 0,{},{},Default,,0,0,0,,{}",
            format_timestamp(self.start),
            format_timestamp(self.end),
            self.text
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptHeader {
    pub width: u32,
    pub height: u32,
    pub font: String,
    pub font_size: f64,
    pub primary: HexColor,
    pub outline_color: HexColor,
    pub shadow_color: HexColor,
    pub bold: bool,
    pub italic: bool,
    pub letter_spacing: f64,
    pub outline: u32,
    pub shadow: u32,
    pub alignment: u8,
}

impl ScriptHeader {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            width: config.resolution.width,
            height: config.resolution.height,
            font: config.default_font.clone(),
            font_size: config.size_mapping.min_size,
            primary: config.font_color.clone(),
            outline_color: config.outline_color.clone(),
            shadow_color: config.shadow_color.clone(),
            bold: config.font_style.bold,
            italic: config.font_style.italic,
            letter_spacing: config.letter_spacing,
            outline: config.outline,
            shadow: config.shadow,
            alignment: config.alignment,
        }
    }

    pub fn render(&self) -> String {
        let flag = |on: bool| if on { "-1" } else { "0" };
        [
            "[Script Info]".to_owned(),
            "ScriptType: v4.00+".to_owned(),
            "WrapStyle: 0".to_owned(),
            "Collisions: Normal".to_owned(),
            format!("PlayResX: {}", self.width),
            format!("PlayResY: {}", self.height),
            "Timer: 100.0000".to_owned(),
            String::new(),
            "[V4+ Styles]".to_owned(),
            "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, \
Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, \
Alignment, MarginL, MarginR, MarginV, Encoding"
                .to_owned(),
            format!(
                "Style: Default,{},{},{},&H000000FF,{},{},{},{},0,0,100,100,{},0,1,{},{},{},80,80,80,1",
                self.font,
                self.font_size.round() as i64,
                style_color(&self.primary, 0),
                style_color(&self.outline_color, 0),
                style_color(&self.shadow_color, 0x64),
                flag(self.bold),
                flag(self.italic),
                format_number(self.letter_spacing),
                self.outline,
                self.shadow,
                self.alignment,
            ),
            String::new(),
            "[Events]".to_owned(),
            "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text".to_owned(),
        ]
        .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleDocument {
    pub header: ScriptHeader,
    pub events: Vec<DialogueEntry>,
}

impl SubtitleDocument {
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.events.len() + 1);
        lines.push(self.header.render());
        lines.extend(self.events.iter().map(DialogueEntry::to_event_line));
        let mut document = lines.join("\n");
        document.push('\n');
        document
    }
}

#[cfg(test)]
mod tests {
    use super::{
        apply_position, color_tag, escape_text, format_timestamp, partial_word_markup,
        style_color, word_markup, word_separator, DialogueEntry, ScriptHeader, SubtitleDocument,
    };
    use crate::config::{HexColor, RenderConfig};
    use crate::style::WordStyle;
    use crate::timeline::Placement;

    fn style() -> WordStyle {
        WordStyle {
            font: "Arial".to_owned(),
            size: 39.6,
            bold: true,
            italic: false,
            color: HexColor::parse("#112233").expect("color"),
            outline_color: HexColor::black(),
            shadow_color: HexColor::black(),
            letter_spacing: 1.5,
        }
    }

    #[test]
    fn timestamps_round_to_centiseconds() {
        assert_eq!(format_timestamp(0.0), "0:00:00.00");
        assert_eq!(format_timestamp(1.234), "0:00:01.23");
        assert_eq!(format_timestamp(1.235_1), "0:00:01.24");
        assert_eq!(format_timestamp(59.999), "0:01:00.00");
        assert_eq!(format_timestamp(3725.5), "1:02:05.50");
        assert_eq!(format_timestamp(40_000.0), "11:06:40.00");
        assert_eq!(format_timestamp(-3.0), "0:00:00.00");
    }

    #[test]
    fn escaping_covers_backslash_and_braces() {
        assert_eq!(escape_text(r"a\b{c}"), r"a\\b\{c\}");
        assert_eq!(escape_text("plain"), "plain");
    }

    #[test]
    fn colors_are_bgr_ordered() {
        let color = HexColor::parse("#112233").expect("color");
        assert_eq!(color_tag(&color), "&H332211&");
        assert_eq!(style_color(&color, 0x64), "&H64332211");
    }

    #[test]
    fn word_markup_carries_all_tags() {
        let markup = word_markup(&style(), "{hi}");
        assert_eq!(
            markup,
            "{\\fnArial\\fs40\\b1\\i0\\1c&H332211&\\3c&H000000&\\4c&H000000&\\fsp1.5}\\{hi\\}"
        );
    }

    #[test]
    fn partial_word_hides_the_suffix() {
        let markup = partial_word_markup(&style(), "héllo", 2);
        assert!(markup.ends_with("hé{\\alpha&HFF&}llo"));
        let full = partial_word_markup(&style(), "hi", 5);
        assert_eq!(full, word_markup(&style(), "hi"));
    }

    #[test]
    fn separator_only_tags_positive_spacing() {
        assert_eq!(word_separator(0.0), " ");
        assert_eq!(word_separator(4.0), "{\\fsp4} ");
    }

    #[test]
    fn position_prefix_is_skipped_for_empty_text() {
        let placement = Placement { x: 10, y: 20 };
        assert_eq!(apply_position("", placement, None), "");
        assert_eq!(apply_position("x", placement, None), "{\\pos(10,20)}x");
        assert_eq!(apply_position("x", placement, Some(8)), "{\\an8\\pos(10,20)}x");
    }

    #[test]
    fn document_renders_header_and_events() {
        let document = SubtitleDocument {
            header: ScriptHeader::from_config(&RenderConfig::default()),
            events: vec![DialogueEntry {
                start: 1.0,
                end: 2.5,
                text: "hello".to_owned(),
            }],
        };
        let rendered = document.render();
        assert!(rendered.starts_with("[Script Info]\n"));
        assert!(rendered.contains("PlayResX: 1920\nPlayResY: 1080\n"));
        assert!(rendered.contains(
            "Style: Default,Arial,24,&H00FFFFFF,&H000000FF,&H00000000,&H64000000,0,0,0,0,100,100,0,0,1,2,0,7,80,80,80,1"
        ));
        assert!(rendered.ends_with("Dialogue: 0,0:00:01.00,0:00:02.50,Default,,0,0,0,,hello\n"));
    }
}
