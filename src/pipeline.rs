use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::RenderConfig;
use crate::grouping::group_lines;
use crate::loudness::LoudnessRange;
use crate::markup::{ScriptHeader, SubtitleDocument};
use crate::model::{LoudnessTable, Transcript};
use crate::reveal::{reveal_line, RevealPolicy};
use crate::style::resolve_line_styles;

/// Group, style, wrap and reveal every caption line, in transcript order.
pub fn build_document(
    transcript: &Transcript,
    loudness: &LoudnessTable,
    config: &RenderConfig,
) -> SubtitleDocument {
    let global = LoudnessRange::global(loudness);
    let grouping = config.display.grouping();
    let lines = group_lines(transcript, &grouping);
    debug!(
        mode = grouping.label(),
        lines = lines.len(),
        words = transcript.word_count(),
        rms_min = global.min,
        rms_max = global.max,
        "grouped caption lines"
    );

    let mut events = Vec::new();
    for line in &lines {
        let style_override = config.style_override_for(line.segment_id, line.start, line.end);
        let styles = resolve_line_styles(line, loudness, global, config, style_override);
        let policy = RevealPolicy::select(config.display.reveal_mode, style_override);
        let entries = reveal_line(line, &styles, policy, config);
        debug!(
            start = line.start,
            end = line.end,
            segment_id = ?line.segment_id,
            policy = policy.label(),
            entries = entries.len(),
            "revealed caption line"
        );
        events.extend(entries);
    }

    SubtitleDocument {
        header: ScriptHeader::from_config(config),
        events,
    }
}

pub fn write_document(document: &SubtitleDocument, output: &Path) -> Result<()> {
    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {}", parent.display()))?;
    }
    fs::write(output, document.render())
        .with_context(|| format!("failed to write subtitles {}", output.display()))?;
    info!(
        path = %output.display(),
        events = document.events.len(),
        "wrote subtitle document"
    );
    Ok(())
}
