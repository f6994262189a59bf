//! Loader for the line-oriented `repos.conf` file.
//!
//! ```text
//! # base path, either bare on the first line or as base_path=...
//! /home/me/src
//! api:main,develop
//! web:main
//! title
//! week_end=saturday
//! ```

use crate::error::{ReportError, Result};
use crate::week::{parse_weekday, DEFAULT_WEEK_END};
use chrono::Weekday;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "repos.conf";

/// How much of each commit message goes into the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetailLevel {
    Title,
    #[default]
    Full,
}

impl FromStr for DetailLevel {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(DetailLevel::Title),
            "full" => Ok(DetailLevel::Full),
            other => Err(ReportError::Config(format!(
                "Unknown detail level '{other}', expected 'title' or 'full'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoEntry {
    pub name: String,
    pub branches: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_path: PathBuf,
    pub repos: Vec<RepoEntry>,
    pub detail: DetailLevel,
    pub week_end: Weekday,
    pub author: Option<String>,
    /// Non-fatal problems found while parsing, one message per line.
    pub warnings: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            repos: Vec::new(),
            detail: DetailLevel::default(),
            week_end: DEFAULT_WEEK_END,
            author: None,
            warnings: Vec::new(),
        }
    }
}

// `key=value` only when the key is an option-like word, so paths such as
// `/srv/a=b` still count as plain lines.
fn option_pair(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let is_option = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphabetic() || c == '_');
    is_option.then(|| (key, value.trim()))
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ReportError::ConfigNotFound(path.display().to_string()),
            _ => ReportError::Io(e),
        })?;
        debug!(config_path = %path.display(), "read configuration");
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config = Config::default();
        let mut base_path: Option<PathBuf> = None;
        let mut plain: Vec<(usize, &str)> = Vec::new();

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = option_pair(line) {
                match key.to_ascii_lowercase().as_str() {
                    "base_path" | "base" => {
                        base_path = Some(PathBuf::from(if value.is_empty() { "." } else { value }));
                    }
                    "detail" | "detail_level" => config.detail = value.parse()?,
                    "week_end" => config.week_end = parse_weekday(value)?,
                    "author" => {
                        if !value.is_empty() {
                            config.author = Some(value.to_string());
                        }
                    }
                    other => config
                        .warnings
                        .push(format!("line {line_no}: unknown key '{other}' ignored")),
                }
                continue;
            }

            if let Ok(detail) = line.parse::<DetailLevel>() {
                config.detail = detail;
                continue;
            }

            plain.push((line_no, line));
        }

        let mut entries = plain.into_iter();
        if base_path.is_none() {
            base_path = entries.next().map(|(_, line)| PathBuf::from(line));
        }

        for (line_no, line) in entries {
            match parse_repo_entry(line) {
                Some(entry) => config.repos.push(entry),
                None => config
                    .warnings
                    .push(format!("line {line_no}: expected 'name:branch[,branch...]', got '{line}'")),
            }
        }

        if let Some(base) = base_path {
            config.base_path = base;
        }
        debug!(
            base_path = %config.base_path.display(),
            repos = config.repos.len(),
            detail = ?config.detail,
            "parsed configuration"
        );
        Ok(config)
    }

    /// Directory of a configured repository, relative paths taken from `cwd`.
    pub fn repo_path(&self, cwd: &Path, name: &str) -> PathBuf {
        cwd.join(&self.base_path).join(name)
    }
}

fn parse_repo_entry(line: &str) -> Option<RepoEntry> {
    let (name, branches) = line.rsplit_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let branches: Vec<String> = branches
        .split(',')
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(String::from)
        .collect();
    if branches.is_empty() {
        return None;
    }
    Some(RepoEntry {
        name: name.to_string(),
        branches,
    })
}
