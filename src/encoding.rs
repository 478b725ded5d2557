use std::fs;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{anyhow, bail, Context, Result};
use tracing::{debug, info};

use crate::error_codes::CodedError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FfmpegMode {
    #[default]
    Auto,
    System,
    Sidecar,
}

impl FfmpegMode {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "system" => Ok(Self::System),
            "sidecar" => Ok(Self::Sidecar),
            other => Err(anyhow!(CodedError::usage(
                "UNKNOWN_FFMPEG_MODE",
                format!("unknown ffmpeg mode '{other}' (expected auto, system or sidecar)"),
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnOptions {
    pub mode: FfmpegMode,
    /// Explicit binary for system mode; `ffmpeg` from PATH otherwise.
    pub ffmpeg_binary: Option<PathBuf>,
}

impl Default for BurnOptions {
    fn default() -> Self {
        Self {
            mode: FfmpegMode::Auto,
            ffmpeg_binary: None,
        }
    }
}

trait FfmpegBackend {
    fn mode_label(&self) -> &'static str;
    fn resolve_binary(&self) -> Result<PathBuf>;
}

struct SystemFfmpegBackend {
    binary: PathBuf,
}

#[cfg(feature = "sidecar_ffmpeg")]
struct SidecarFfmpegBackend;

fn select_backend(options: &BurnOptions) -> Result<Box<dyn FfmpegBackend>> {
    match options.mode {
        FfmpegMode::Auto | FfmpegMode::System => Ok(Box::new(SystemFfmpegBackend {
            binary: options
                .ffmpeg_binary
                .clone()
                .unwrap_or_else(|| PathBuf::from("ffmpeg")),
        })),
        FfmpegMode::Sidecar => {
            #[cfg(feature = "sidecar_ffmpeg")]
            {
                Ok(Box::new(SidecarFfmpegBackend))
            }
            #[cfg(not(feature = "sidecar_ffmpeg"))]
            {
                Err(anyhow!(
                    "ffmpeg sidecar mode requested but onesub was built without `sidecar_ffmpeg`. Rebuild with `--features sidecar_ffmpeg`."
                ))
            }
        }
    }
}

impl FfmpegBackend for SystemFfmpegBackend {
    fn mode_label(&self) -> &'static str {
        "system"
    }

    fn resolve_binary(&self) -> Result<PathBuf> {
        Ok(self.binary.clone())
    }
}

#[cfg(feature = "sidecar_ffmpeg")]
impl FfmpegBackend for SidecarFfmpegBackend {
    fn mode_label(&self) -> &'static str {
        "sidecar"
    }

    fn resolve_binary(&self) -> Result<PathBuf> {
        let path = ffmpeg_sidecar::paths::ffmpeg_path();
        if !path.exists() {
            ffmpeg_sidecar::download::auto_download()
                .context("failed to auto-download ffmpeg sidecar binary")?;
        }
        Ok(path)
    }
}

/// Burn `ass_path` into `input`, writing `output`. Audio is stream-copied.
pub fn burn_subtitles(
    input: &Path,
    ass_path: &Path,
    output: &Path,
    options: &BurnOptions,
) -> Result<()> {
    if !input.is_file() {
        bail!("input video {} does not exist", input.display());
    }
    if !ass_path.is_file() {
        bail!("subtitle file {} does not exist", ass_path.display());
    }
    let output_str = output.to_string_lossy();
    if output_str.chars().any(|c| c.is_control()) {
        bail!("output path contains invalid control characters");
    }
    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {}", parent.display()))?;
    }

    let backend = select_backend(options)?;
    let mode_label = backend.mode_label();
    let ffmpeg_path = backend.resolve_binary()?;
    let args = burn_args(input, ass_path, output);
    debug!(mode = mode_label, ffmpeg = %ffmpeg_path.display(), args = %args.join(" "), "running ffmpeg");

    let mut child = Command::new(&ffmpeg_path)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|error| {
            if error.kind() == ErrorKind::NotFound {
                anyhow!(
                    "ffmpeg executable not found (mode={mode_label}, resolved_path={}). Install ffmpeg (system mode) or use sidecar mode with `--features sidecar_ffmpeg`.",
                    ffmpeg_path.display()
                )
            } else {
                anyhow!(
                    "failed to spawn ffmpeg process (mode={mode_label}, resolved_path={}, args='{}'): {error}",
                    ffmpeg_path.display(),
                    args.join(" ")
                )
            }
        })?;

    let mut stderr_pipe = child.stderr.take();
    let stderr_tail = read_stderr_tail(&mut stderr_pipe)?;
    let status = child.wait().context("failed waiting for ffmpeg process")?;
    if !status.success() {
        return Err(anyhow!(
            "ffmpeg failed with status {status} (mode={mode_label}, resolved_path={}, args='{}', stderr_tail='{}')",
            ffmpeg_path.display(),
            args.join(" "),
            stderr_tail
        ));
    }

    info!(mode = mode_label, output = %output.display(), "burned subtitles into video");
    Ok(())
}

pub fn burn_args(input: &Path, ass_path: &Path, output: &Path) -> Vec<String> {
    vec![
        "-hide_banner".to_owned(),
        "-loglevel".to_owned(),
        "error".to_owned(),
        "-y".to_owned(),
        "-i".to_owned(),
        input.to_string_lossy().into_owned(),
        "-vf".to_owned(),
        format!("ass={}", filter_path(ass_path)),
        "-c:a".to_owned(),
        "copy".to_owned(),
        output.to_string_lossy().into_owned(),
    ]
}

/// Escapes a path for use inside an ffmpeg filter argument.
pub fn filter_path(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | ':' | '\'' | ' ') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn read_stderr_tail(stderr: &mut Option<std::process::ChildStderr>) -> Result<String> {
    let Some(mut pipe) = stderr.take() else {
        return Ok(String::new());
    };
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf)
        .context("failed reading ffmpeg stderr")?;
    let text = String::from_utf8_lossy(&buf).to_string();
    Ok(last_n_chars(&text, 500))
}

fn last_n_chars(s: &str, max_chars: usize) -> String {
    let mut chars = s.chars().collect::<Vec<_>>();
    if chars.len() > max_chars {
        chars = chars[chars.len().saturating_sub(max_chars)..].to_vec();
    }
    chars.into_iter().collect::<String>().trim().to_owned()
}
