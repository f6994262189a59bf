mod writer;

pub use writer::{render_report, write_report};

use crate::config::{Config, DetailLevel, RepoEntry};
use crate::error::{ReportError, Result};
use crate::git::GitRepo;
use crate::identity::IdentityResolver;
use crate::model::{BranchSection, DateRange};
use crate::week::WeekWindow;
use anyhow::Context;
use chrono::{Local, NaiveDate};
use console::style;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything one run needs besides the config file contents.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config_path: PathBuf,
    pub output_dir: PathBuf,
    pub date: Option<NaiveDate>,
    pub author: Option<String>,
    pub detail: Option<DetailLevel>,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<PathBuf>,
    pub warnings: usize,
}

pub fn exec(options: RunOptions) -> anyhow::Result<RunSummary> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;

    let mut config = Config::load(&options.config_path)?;
    if let Some(detail) = options.detail {
        config.detail = detail;
    }

    let mut summary = RunSummary::default();
    for warning in &config.warnings {
        warn(&mut summary, format!("{}: {warning}", options.config_path.display()));
    }

    let author = match options.author.clone().or_else(|| config.author.clone()) {
        Some(author) => author,
        None => IdentityResolver::from_environment(&cwd).resolve()?,
    };

    let today = options.date.unwrap_or_else(|| Local::now().date_naive());
    let window = WeekWindow::containing(today, config.week_end);
    let range = window.range()?;

    println!("{}", style("Weekly Commits").bold());
    println!("Author: {}", style(&author).cyan());
    println!(
        "Week: {} to {}",
        window.start.format("%Y-%m-%d"),
        window.end.format("%Y-%m-%d")
    );

    let out_dir = options.output_dir.join(today.format("%Y-%m-%d").to_string());
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create report directory {}", out_dir.display()))?;

    for entry in &config.repos {
        let path = config.repo_path(&cwd, &entry.name);
        println!("{}", style(format!("Processing: {}", path.display())).bold());

        let sections = match collect_sections(&path, entry, &author, &range, &mut summary) {
            Ok(sections) => sections,
            Err(e) if e.is_skippable() => {
                warn(&mut summary, e);
                continue;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read history of {}", path.display()))
            }
        };

        if sections.is_empty() {
            debug!(repository = %entry.name, "no branch processed, skipping report");
            continue;
        }

        let generated = Local::now();
        let report = write_report(&out_dir, &entry.name, &author, generated, &sections, config.detail)
            .with_context(|| format!("Failed to write report for {}", entry.name))?;
        println!("Report written: {}", style(report.display()).green());
        summary.reports.push(report);
    }

    println!(
        "\n{} {} report(s), {} warning(s)",
        style("Done:").bold(),
        summary.reports.len(),
        summary.warnings
    );
    Ok(summary)
}

fn collect_sections(
    path: &Path,
    entry: &RepoEntry,
    author: &str,
    range: &DateRange,
    summary: &mut RunSummary,
) -> Result<Vec<BranchSection>> {
    let repo = GitRepo::open(path)?;
    let mut sections = Vec::with_capacity(entry.branches.len());

    for branch in &entry.branches {
        println!("  Checking branch: {branch}");
        if !repo.has_branch(branch) {
            warn(summary, ReportError::BranchNotFound(branch.clone()));
            continue;
        }

        let commits = repo.commits_by_author(&entry.name, branch, author, range)?;
        println!("  Found {} commits", commits.len());
        sections.push(BranchSection::new(branch.as_str(), commits));
    }

    Ok(sections)
}

fn warn(summary: &mut RunSummary, message: impl Display) {
    summary.warnings += 1;
    println!("{} {message}", style("warning:").yellow().bold());
}
