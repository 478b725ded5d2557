use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::error_codes::CodedError;
use crate::grouping::GroupingMode;
use crate::timeline::{ColorOverride, ColorTimeline, PlacementEntry, PlacementTimeline};

pub const DEFAULT_FONT: &str = "Arial";
pub const DEFAULT_ALIGNMENT: u8 = 7;

/// `#RRGGBB`, always uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HexColor(String);

impl HexColor {
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if digits.len() != 6 || !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self(format!("#{}", digits.to_ascii_uppercase())))
    }

    pub fn white() -> Self {
        Self("#FFFFFF".to_owned())
    }

    pub fn black() -> Self {
        Self("#000000".to_owned())
    }

    pub fn channels(&self) -> (u8, u8, u8) {
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&self.0[range], 16).unwrap_or(0)
        };
        (channel(1..3), channel(3..5), channel(5..7))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizeMapping {
    pub min_size: f64,
    pub max_size: f64,
}

impl SizeMapping {
    /// Orders the bounds so `min_size <= max_size` always holds.
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            min_size: a.min(b),
            max_size: a.max(b),
        }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min_size, self.max_size)
    }

    pub fn span(&self) -> f64 {
        self.max_size - self.min_size
    }
}

impl Default for SizeMapping {
    fn default() -> Self {
        Self::new(24.0, 48.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontBand {
    pub min_size: f64,
    pub max_size: f64,
    pub font: String,
}

impl FontBand {
    pub fn matches(&self, size: f64) -> bool {
        self.min_size <= size && size <= self.max_size
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
}

impl FontStyle {
    pub fn parse(value: &str) -> Option<Self> {
        let lowered = value.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "" => None,
            "regular" | "normal" | "plain" => Some(Self::default()),
            other => {
                let bold = other.contains("bold");
                let italic = other.contains("italic") || other.contains("oblique");
                (bold || italic).then_some(Self { bold, italic })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealMode {
    #[default]
    Block,
    PerWord,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    Segment,
    FixedCount,
    FixedInterval,
    Rolling,
    ManualWindows,
}

impl DisplayMode {
    pub fn from_keyword(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "segment" => Some(Self::Segment),
            "fixed_count" => Some(Self::FixedCount),
            "fixed_interval" => Some(Self::FixedInterval),
            "rolling" => Some(Self::Rolling),
            "manual_windows" => Some(Self::ManualWindows),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManualWindow {
    pub start: f64,
    pub end: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_ids: Option<Vec<i64>>,
}

impl ManualWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            id: None,
            word_ids: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayConfig {
    pub mode: DisplayMode,
    pub words_per_caption: usize,
    pub interval_seconds: f64,
    pub rolling_window: usize,
    pub windows: Vec<ManualWindow>,
    pub reveal_mode: RevealMode,
    pub line_word_limits: Vec<usize>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Segment,
            words_per_caption: 6,
            interval_seconds: 3.0,
            rolling_window: 6,
            windows: Vec::new(),
            reveal_mode: RevealMode::Block,
            line_word_limits: Vec::new(),
        }
    }
}

impl DisplayConfig {
    /// Manual windows win whenever any are configured.
    pub fn grouping(&self) -> GroupingMode {
        if !self.windows.is_empty() {
            return GroupingMode::ManualWindows(self.windows.clone());
        }
        match self.mode {
            DisplayMode::Segment | DisplayMode::ManualWindows => GroupingMode::Segment,
            DisplayMode::FixedCount => GroupingMode::FixedCount(self.words_per_caption),
            DisplayMode::FixedInterval => GroupingMode::FixedInterval(self.interval_seconds),
            DisplayMode::Rolling => GroupingMode::Rolling(self.rolling_window),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WriteOnKeyframe {
    pub time: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideKey {
    Segment(i64),
    Window { start: f64, end: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentStyleOverride {
    pub key: OverrideKey,
    pub size_min: Option<f64>,
    pub size_max: Option<f64>,
    pub letter_spacing: Option<f64>,
    pub word_spacing: Option<f64>,
    pub line_spacing: Option<f64>,
    pub font: Option<String>,
    pub font_style: Option<FontStyle>,
    pub font_color: Option<HexColor>,
    pub shadow_color: Option<HexColor>,
    pub write_on: Vec<WriteOnKeyframe>,
}

impl SegmentStyleOverride {
    pub fn keyed(key: OverrideKey) -> Self {
        Self {
            key,
            size_min: None,
            size_max: None,
            letter_spacing: None,
            word_spacing: None,
            line_spacing: None,
            font: None,
            font_style: None,
            font_color: None,
            shadow_color: None,
            write_on: Vec::new(),
        }
    }

    pub fn matches_segment(&self, segment_id: i64) -> bool {
        matches!(self.key, OverrideKey::Segment(id) if id == segment_id)
    }

    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        match self.key {
            OverrideKey::Segment(_) => false,
            OverrideKey::Window {
                start: window_start,
                end: window_end,
            } => window_start <= end && window_end >= start,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub size_mapping: SizeMapping,
    pub font_bands: Vec<FontBand>,
    pub default_font: String,
    pub font_style: FontStyle,
    pub font_color: HexColor,
    pub outline_color: HexColor,
    pub shadow_color: HexColor,
    pub outline: u32,
    pub shadow: u32,
    pub letter_spacing: f64,
    pub word_spacing: f64,
    pub line_spacing: f64,
    pub alignment: u8,
    pub resolution: Resolution,
    pub display: DisplayConfig,
    pub placements: PlacementTimeline,
    pub colors: ColorTimeline,
    pub segment_styles: Vec<SegmentStyleOverride>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let resolution = Resolution::default();
        Self {
            size_mapping: SizeMapping::default(),
            font_bands: Vec::new(),
            default_font: DEFAULT_FONT.to_owned(),
            font_style: FontStyle::default(),
            font_color: HexColor::white(),
            outline_color: HexColor::black(),
            shadow_color: HexColor::black(),
            outline: 2,
            shadow: 0,
            letter_spacing: 0.0,
            word_spacing: 0.0,
            line_spacing: 0.0,
            alignment: DEFAULT_ALIGNMENT,
            resolution,
            display: DisplayConfig::default(),
            placements: PlacementTimeline::centered(resolution),
            colors: ColorTimeline::default(),
            segment_styles: Vec::new(),
        }
    }
}

impl RenderConfig {
    pub fn choose_font(&self, size: f64) -> &str {
        self.font_bands
            .iter()
            .find(|band| band.matches(size))
            .map_or(self.default_font.as_str(), |band| band.font.as_str())
    }

    /// Segment id match first, then the first time window overlapping the line.
    pub fn style_override_for(
        &self,
        segment_id: Option<i64>,
        start: f64,
        end: f64,
    ) -> Option<&SegmentStyleOverride> {
        segment_id
            .and_then(|id| {
                self.segment_styles
                    .iter()
                    .find(|style| style.matches_segment(id))
            })
            .or_else(|| {
                self.segment_styles
                    .iter()
                    .find(|style| style.overlaps(start, end))
            })
    }

    /// Builds a validated config from an already-parsed document. Malformed
    /// values fall back to defaults; only unreadable referenced files fail.
    pub fn from_value(payload: &Value, base_dir: Option<&Path>) -> Result<Self> {
        let object = payload.as_object().ok_or_else(|| {
            anyhow!(CodedError::usage(
                "CONFIG_NOT_OBJECT",
                "configuration must define an object at the top level",
            )
            .with_details(json!({ "found": value_kind(payload) })))
        })?;

        let defaults = Self::default();
        let size_mapping = object
            .get("size_mapping")
            .and_then(Value::as_object)
            .map_or(defaults.size_mapping, |size| {
                SizeMapping::new(
                    number(size.get("min")).unwrap_or(defaults.size_mapping.min_size),
                    number(size.get("max")).unwrap_or(defaults.size_mapping.max_size),
                )
            });

        let default_font =
            font_name(object.get("default_font")).unwrap_or(defaults.default_font);
        let font_bands = array(object.get("font_bands"))
            .iter()
            .filter_map(Value::as_object)
            .map(|band| FontBand {
                min_size: number(band.get("min_size")).unwrap_or(size_mapping.min_size),
                max_size: number(band.get("max_size")).unwrap_or(size_mapping.max_size),
                font: font_name(band.get("font")).unwrap_or_else(|| default_font.clone()),
            })
            .collect();

        let font_color = color(object.get("font_color"), &defaults.font_color);
        let shadow_color = color(object.get("shadow_color"), &defaults.shadow_color);
        let resolution = object
            .get("resolution")
            .and_then(Value::as_object)
            .map_or(defaults.resolution, |res| Resolution {
                width: positive_u32(res.get("width")).unwrap_or(defaults.resolution.width),
                height: positive_u32(res.get("height")).unwrap_or(defaults.resolution.height),
            });

        let alignment = integer(object.get("alignment"))
            .filter(|value| (1..=9).contains(value))
            .map_or(DEFAULT_ALIGNMENT, |value| value as u8);

        let display = match object.get("display").and_then(Value::as_object) {
            Some(display) => parse_display(display, base_dir)?,
            None => DisplayConfig::default(),
        };

        let placements = PlacementTimeline::new(
            collect_placements(object, base_dir, resolution),
            resolution,
        );
        let colors = ColorTimeline::new(
            array(object.get("color_overrides"))
                .iter()
                .filter_map(|item| parse_color_override(item, &font_color, &shadow_color))
                .collect(),
        );
        let segment_styles = array(object.get("segment_styles"))
            .iter()
            .filter_map(parse_segment_style)
            .collect();

        Ok(Self {
            size_mapping,
            font_bands,
            default_font,
            font_style: text(object.get("font_style"))
                .and_then(|value| FontStyle::parse(&value))
                .unwrap_or_default(),
            font_color,
            outline_color: color(object.get("outline_color"), &defaults.outline_color),
            shadow_color,
            outline: non_negative_u32(object.get("outline")).unwrap_or(defaults.outline),
            shadow: non_negative_u32(object.get("shadow")).unwrap_or(defaults.shadow),
            letter_spacing: number(object.get("letter_spacing")).unwrap_or(0.0),
            word_spacing: number(object.get("word_spacing"))
                .unwrap_or(0.0)
                .max(0.0),
            line_spacing: number(object.get("line_spacing"))
                .unwrap_or(0.0)
                .max(0.0),
            alignment,
            resolution,
            display,
            placements,
            colors,
            segment_styles,
        })
    }
}

pub fn load_render_config(path: &Path) -> Result<RenderConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let payload = parse_config_document(path, &contents)?;
    let base_dir = path
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let config = RenderConfig::from_value(&payload, Some(&base_dir))
        .with_context(|| format!("failed validating config {}", path.display()))?;
    debug!(
        path = %path.display(),
        mode = ?config.display.mode,
        reveal = ?config.display.reveal_mode,
        segment_styles = config.segment_styles.len(),
        "loaded render config"
    );
    Ok(config)
}

fn parse_config_document(path: &Path, contents: &str) -> Result<Value> {
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "yaml" | "yml"));

    if is_yaml {
        serde_yaml::from_str::<Value>(contents).map_err(|error| {
            let location = error
                .location()
                .map(|location| format!("line {}, column {}", location.line(), location.column()))
                .unwrap_or_else(|| "unknown location".to_owned());
            anyhow!(
                "failed to parse yaml in {} at {}: {}",
                path.display(),
                location,
                error
            )
        })
    } else {
        serde_json::from_str::<Value>(contents).map_err(|error| {
            anyhow!(
                "failed to parse json in {} at line {}, column {}: {}",
                path.display(),
                error.line(),
                error.column(),
                error
            )
        })
    }
}

fn parse_display(display: &Map<String, Value>, base_dir: Option<&Path>) -> Result<DisplayConfig> {
    let defaults = DisplayConfig::default();
    let mode = text(display.get("mode"))
        .and_then(|value| DisplayMode::from_keyword(&value))
        .unwrap_or(defaults.mode);
    let mut words_per_caption = integer(display.get("words_per_caption"))
        .unwrap_or(defaults.words_per_caption as i64)
        .max(1) as usize;
    let interval_seconds = number(display.get("interval_seconds"))
        .unwrap_or(defaults.interval_seconds)
        .max(0.1);
    let mut rolling_window = integer(display.get("rolling_window"))
        .unwrap_or(words_per_caption as i64)
        .max(1) as usize;

    let mut windows_payload = array(display.get("windows")).to_vec();
    if let Some(windows_path) = text(display.get("windows_path")) {
        let resolved = resolve_relative(base_dir, Path::new(&windows_path));
        let document = read_json_document(&resolved).map_err(|error| {
            anyhow!(CodedError::usage(
                "WINDOWS_FILE_UNREADABLE",
                format!("windows file {} could not be loaded: {error:#}", resolved.display()),
            ))
        })?;
        if let Some(windows) = document.get("windows").and_then(Value::as_array) {
            windows_payload = windows.clone();
        }
    }
    let windows = windows_payload
        .iter()
        .filter_map(parse_manual_window)
        .collect::<Vec<_>>();

    let line_word_limits = array(display.get("line_word_limits"))
        .iter()
        .filter_map(|value| integer(Some(value)))
        .filter(|limit| *limit > 0)
        .map(|limit| limit as usize)
        .collect::<Vec<_>>();
    if !line_word_limits.is_empty() {
        let total = line_word_limits.iter().sum::<usize>();
        words_per_caption = words_per_caption.max(total);
        rolling_window = rolling_window.max(total);
    }

    let reveal_mode = text(display.get("reveal_mode").or_else(|| display.get("reveal")))
        .map(|value| value.to_ascii_lowercase())
        .map_or(RevealMode::Block, |value| match value.as_str() {
            "per_word" => RevealMode::PerWord,
            _ => RevealMode::Block,
        });

    Ok(DisplayConfig {
        mode,
        words_per_caption,
        interval_seconds,
        rolling_window,
        windows,
        reveal_mode,
        line_word_limits,
    })
}

fn parse_manual_window(value: &Value) -> Option<ManualWindow> {
    let object = value.as_object()?;
    let start = number(object.get("start"))?;
    let end = number(object.get("end"))?;
    if end <= start {
        warn!(start, end, "skipping manual window with end <= start");
        return None;
    }
    let word_ids = object
        .get("word_ids")
        .and_then(Value::as_array)
        .map(|ids| {
            ids.iter()
                .filter_map(|id| integer(Some(id)))
                .collect::<Vec<_>>()
        })
        .filter(|ids| !ids.is_empty());
    Some(ManualWindow {
        start,
        end,
        id: integer(object.get("id").or_else(|| object.get("segment_id"))),
        word_ids,
    })
}

fn collect_placements(
    object: &Map<String, Value>,
    base_dir: Option<&Path>,
    resolution: Resolution,
) -> Vec<PlacementEntry> {
    let mut rows = array(object.get("placements")).to_vec();

    if let Some(path_value) = text(object.get("placements_path")) {
        let resolved = resolve_relative(base_dir, Path::new(&path_value));
        match read_json_document(&resolved) {
            Ok(document) => match document.get("placements").and_then(Value::as_array) {
                Some(entries) => rows.extend(entries.iter().cloned()),
                None => warn!(
                    path = %resolved.display(),
                    "placements file must contain a list under 'placements'"
                ),
            },
            Err(error) => warn!(
                path = %resolved.display(),
                "ignoring placements file: {error:#}"
            ),
        }
    }

    rows.iter()
        .filter_map(|row| parse_placement(row, resolution))
        .collect()
}

fn parse_placement(value: &Value, resolution: Resolution) -> Option<PlacementEntry> {
    let object = value.as_object()?;
    let segment_id = integer(object.get("segment_id"));
    let end = match (number(object.get("end")), segment_id) {
        (Some(end), _) => end,
        (None, Some(_)) => f64::INFINITY,
        (None, None) => {
            debug!("skipping placement without a usable end");
            return None;
        }
    };

    let x = resolve_axis(object, ["width", "x"], "x_px", resolution.width);
    let y = resolve_axis(object, ["height", "y"], "y_px", resolution.height);
    Some(PlacementEntry {
        end,
        x,
        y,
        segment_id,
    })
}

fn resolve_axis(
    object: &Map<String, Value>,
    relative_keys: [&str; 2],
    pixel_key: &str,
    dimension: u32,
) -> i32 {
    relative_keys
        .iter()
        .find_map(|key| resolve_position(object.get(*key), dimension, true))
        .or_else(|| resolve_position(object.get(pixel_key), dimension, false))
        .unwrap_or((dimension / 2) as i32)
}

/// Accepts `"NN%"`, fractions in `[0, 1]` (when `allow_unit`), or pixels;
/// the result is clamped to the canvas.
pub fn resolve_position(value: Option<&Value>, dimension: u32, allow_unit: bool) -> Option<i32> {
    let dimension_f = f64::from(dimension);
    let numeric = match value? {
        Value::String(raw) => {
            let stripped = raw.trim();
            if let Some(percent) = stripped.strip_suffix('%') {
                let fraction = (percent.trim().parse::<f64>().ok()? / 100.0).clamp(0.0, 1.0);
                return Some((fraction * dimension_f).round() as i32);
            }
            if allow_unit {
                stripped.parse::<f64>().ok()?
            } else {
                stripped.parse::<i64>().ok()? as f64
            }
        }
        Value::Number(number) => number.as_f64()?,
        _ => return None,
    };
    if !numeric.is_finite() {
        return None;
    }
    let scaled = if allow_unit && (0.0..=1.0).contains(&numeric) {
        numeric * dimension_f
    } else {
        numeric
    };
    Some(scaled.clamp(0.0, dimension_f).round() as i32)
}

fn parse_color_override(
    value: &Value,
    default_color: &HexColor,
    default_shadow: &HexColor,
) -> Option<ColorOverride> {
    let object = value.as_object()?;
    let start = number(object.get("start"))?;
    let end = number(object.get("end"))?;
    if end < start {
        warn!(start, end, "skipping color override with end < start");
        return None;
    }
    Some(ColorOverride {
        start,
        end,
        color: color(object.get("color"), default_color),
        shadow: color(object.get("shadow"), default_shadow),
    })
}

fn parse_segment_style(value: &Value) -> Option<SegmentStyleOverride> {
    let object = value.as_object()?;
    let key = match integer(object.get("segment_id")) {
        Some(id) => OverrideKey::Segment(id),
        None => {
            let start = number(object.get("start"))?;
            let end = number(object.get("end"))?;
            if end < start {
                warn!(start, end, "skipping segment style with end < start");
                return None;
            }
            OverrideKey::Window { start, end }
        }
    };

    let write_on = array(object.get("write_on"))
        .iter()
        .filter_map(|frame| {
            let frame = frame.as_object()?;
            Some(WriteOnKeyframe {
                time: number(frame.get("time"))?,
                value: number(frame.get("value"))?.clamp(0.0, 1.0),
            })
        })
        .collect();

    Some(SegmentStyleOverride {
        key,
        size_min: number(object.get("size_min")),
        size_max: number(object.get("size_max")),
        letter_spacing: number(object.get("letter_spacing")),
        word_spacing: number(object.get("word_spacing")).map(|value| value.max(0.0)),
        line_spacing: number(object.get("line_spacing")).map(|value| value.max(0.0)),
        font: font_name(object.get("font")),
        font_style: text(object.get("font_style")).and_then(|value| FontStyle::parse(&value)),
        font_color: text(object.get("font_color")).and_then(|value| HexColor::parse(&value)),
        shadow_color: text(object.get("shadow_color")).and_then(|value| HexColor::parse(&value)),
        write_on,
    })
}

fn read_json_document(path: &Path) -> Result<Value> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

fn resolve_relative(base_dir: Option<&Path>, path: &Path) -> PathBuf {
    match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}

fn array(value: Option<&Value>) -> &[Value] {
    value
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

fn integer(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|v| v.is_finite()).map(|v| v.trunc() as i64)),
        Value::String(raw) => raw.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn positive_u32(value: Option<&Value>) -> Option<u32> {
    integer(value)
        .filter(|value| *value > 0)
        .and_then(|value| u32::try_from(value).ok())
}

fn non_negative_u32(value: Option<&Value>) -> Option<u32> {
    number(value)
        .filter(|value| *value >= 0.0)
        .map(|value| value.round().min(f64::from(u32::MAX)) as u32)
}

fn text(value: Option<&Value>) -> Option<String> {
    let raw = match value? {
        Value::String(raw) => raw.trim().to_owned(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    (!raw.is_empty()).then_some(raw)
}

/// Font names land inside `{\fn..}` and the comma-separated style line.
fn font_name(value: Option<&Value>) -> Option<String> {
    let name = text(value)?
        .chars()
        .filter(|ch| !matches!(ch, '{' | '}' | '\\' | ','))
        .collect::<String>();
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_owned())
}

fn color(value: Option<&Value>, fallback: &HexColor) -> HexColor {
    text(value)
        .and_then(|raw| HexColor::parse(&raw))
        .unwrap_or_else(|| fallback.clone())
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
