//! `.env` files consumed by Docker Compose build args and container runtime
//!
//! Values are read with `dotenvy`. Lines the crate never touches (comments,
//! blank lines, `export` prefixes, the operator's own quoting) are written
//! back exactly as they were read.

use crate::hardware::HardwareProfile;
use crate::utils::Confirm;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: dotenvy::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub const KEY_MODEL: &str = "JETSON_MODEL";
pub const KEY_FAMILY: &str = "JETSON_FAMILY";
pub const KEY_CUDA_ARCH: &str = "CUDA_ARCH_BIN";
pub const KEY_MAX_PERF: &str = "MAX_PERFORMANCE_MODE";
pub const KEY_TENSOR_CORES: &str = "ENABLE_TENSOR_CORES";
pub const KEY_MALLOC_ARENA: &str = "MALLOC_ARENA_MAX";
pub const KEY_TRT_PRECISION: &str = "TENSORRT_PRECISION";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    /// Comment, blank line or anything else kept byte-for-byte
    Verbatim(String),
    /// `raw` is the original text, dropped once the value changes
    Entry {
        key: String,
        value: String,
        raw: Option<String>,
    },
}

/// Ordered `.env` contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    lines: Vec<Line>,
}

impl EnvFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hardware keys for a resolved profile
    pub fn from_profile(profile: &HardwareProfile) -> Self {
        let mut env = Self::new();
        env.set(KEY_MODEL, profile.model.as_str());
        env.set(KEY_FAMILY, profile.family.as_str());
        env.set(KEY_CUDA_ARCH, profile.cuda_compute_capability.to_string());
        env.set(KEY_MAX_PERF, profile.max_performance_mode.to_string());
        env.set(KEY_TENSOR_CORES, profile.tensor_cores_enabled.to_string());
        env.set(KEY_MALLOC_ARENA, profile.malloc_arena_max.to_string());
        env.set(KEY_TRT_PRECISION, profile.tensorrt_precision.to_string());
        env
    }

    /// Value of `key`; the last definition wins, as in Compose
    pub fn get(&self, key: &str) -> Option<&str> {
        self.iter().filter(|(k, _)| *k == key).map(|(_, v)| v).last()
    }

    /// Set a key, replacing its last definition in place
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        let existing = self.lines.iter_mut().rev().find_map(|line| match line {
            Line::Entry { key: k, value, raw } if *k == key => Some((value, raw)),
            _ => None,
        });

        match existing {
            Some((current, _)) if *current == value => {}
            Some((current, raw)) => {
                *current = value;
                *raw = None;
            }
            None => self.lines.push(Line::Entry {
                key,
                value,
                raw: None,
            }),
        }
    }

    /// Overlay the entries of `other` onto this file
    pub fn merge(&mut self, other: EnvFile) {
        for line in other.lines {
            if let Line::Entry { key, value, .. } = line {
                self.set(key, value);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines.iter().filter_map(|line| match line {
            Line::Entry { key, value, .. } => Some((key.as_str(), value.as_str())),
            Line::Verbatim(_) => None,
        })
    }

    pub fn parse(content: &str) -> Result<Self, EnvError> {
        let mut env = Self::new();
        let mut lines = content.lines().enumerate();

        while let Some((idx, line)) = lines.next() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                env.lines.push(Line::Verbatim(line.to_string()));
                continue;
            }

            // A quoted value may continue over several lines
            let mut raw = line.to_string();
            if let Some(quote) = open_quote(trimmed) {
                for (_, next) in lines.by_ref() {
                    raw.push('\n');
                    raw.push_str(next);
                    if closes_quote(next, quote) {
                        break;
                    }
                }
            }

            let line_no = idx + 1;
            for item in dotenvy::from_read_iter(raw.as_bytes()) {
                let (key, value) = item.map_err(|source| EnvError::Parse {
                    line: line_no,
                    source,
                })?;
                env.lines.push(Line::Entry {
                    key,
                    value,
                    raw: Some(raw.clone()),
                });
            }
        }

        Ok(env)
    }

    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EnvError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Write through a sibling temp file so readers never see a partial file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), EnvError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".env".to_string());
        let tmp = path.with_file_name(format!(".{}.tmp", file_name));

        fs::write(&tmp, self.render())?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

/// Outcome of [`write_profile_env`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvUpdate {
    Created,
    Updated,
    Skipped,
}

/// Write the profile's hardware keys into the `.env` at `path`
///
/// An existing file keeps every other line as written; updating it
/// requires `confirm`.
pub fn write_profile_env(
    path: &Path,
    profile: &HardwareProfile,
    confirm: &dyn Confirm,
) -> Result<EnvUpdate, EnvError> {
    let hardware = EnvFile::from_profile(profile);

    if !path.exists() {
        hardware.save(path)?;
        tracing::info!("Created {}", path.display());
        return Ok(EnvUpdate::Created);
    }

    let mut existing = EnvFile::load(path)?;
    let question = format!("Update hardware settings in {}?", path.display());
    if !confirm.confirm(&question, true) {
        tracing::info!("Left {} unchanged", path.display());
        return Ok(EnvUpdate::Skipped);
    }

    existing.merge(hardware);
    existing.save(path)?;
    tracing::info!("Updated {}", path.display());
    Ok(EnvUpdate::Updated)
}

impl fmt::Display for EnvFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            match line {
                Line::Verbatim(text) => writeln!(f, "{}", text)?,
                Line::Entry { raw: Some(raw), .. } => writeln!(f, "{}", raw)?,
                Line::Entry {
                    key,
                    value,
                    raw: None,
                } => writeln!(f, "{}={}", key, quote_value(value))?,
            }
        }
        Ok(())
    }
}

/// Quote character of a value left open on its first line
fn open_quote(line: &str) -> Option<char> {
    let (_, value) = line.split_once('=')?;
    let value = value.trim_start();
    let quote = value.chars().next().filter(|c| matches!(c, '"' | '\''))?;
    if closes_quote(&value[1..], quote) {
        None
    } else {
        Some(quote)
    }
}

fn closes_quote(text: &str, quote: char) -> bool {
    let mut escaped = false;
    for c in text.chars() {
        if escaped {
            escaped = false;
        } else if c == '\\' && quote == '"' {
            escaped = true;
        } else if c == quote {
            return true;
        }
    }
    false
}

fn quote_value(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '#' | '"' | '\'' | '\\' | '$' | '`'));

    if !needs_quotes {
        return value.to_string();
    }

    // Single quotes are literal for both dotenvy and Compose: no `$` expansion
    if !value.contains('\'') && !value.contains('\n') {
        return format!("'{}'", value);
    }

    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '$' => out.push_str("\\$"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
