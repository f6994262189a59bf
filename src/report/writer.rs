use crate::config::DetailLevel;
use crate::error::Result;
use crate::model::BranchSection;
use crate::util::{format_message, report_file_name};
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

pub fn render_report(
    repository: &str,
    author: &str,
    generated: DateTime<Local>,
    sections: &[BranchSection],
    detail: DetailLevel,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Weekly Commits Report");
    let _ = writeln!(out, "Repository: {repository}");
    let _ = writeln!(out, "Author: {author}");
    let _ = writeln!(out, "Generated: {}", generated.format("%Y-%m-%d %H:%M:%S"));

    for section in sections {
        let _ = writeln!(out, "\n## Branch: {}", section.branch);
        for commit in &section.commits {
            // wall-clock time of the committer, independent of this machine's zone
            let _ = writeln!(
                out,
                "{} | {}",
                commit.timestamp.format("%Y-%m-%d %H:%M"),
                format_message(&commit.message, detail)
            );
        }
    }
    out
}

/// Write `<dir>/<repository>.txt`, replacing any report from an earlier run.
pub fn write_report(
    dir: &Path,
    repository: &str,
    author: &str,
    generated: DateTime<Local>,
    sections: &[BranchSection],
    detail: DetailLevel,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(report_file_name(repository));
    fs::write(&path, render_report(repository, author, generated, sections, detail))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CommitRecord;
    use chrono::{FixedOffset, TimeZone};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn commit(branch: &str, message: &str, ts: DateTime<FixedOffset>) -> CommitRecord {
        CommitRecord {
            id: "0".repeat(40),
            author_email: "dev@example.com".into(),
            message: message.into(),
            timestamp: ts,
            branch: branch.into(),
            repository: "api".into(),
        }
    }

    fn generated() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 16, 17, 5, 9).unwrap()
    }

    #[test]
    fn renders_header_and_sections() {
        let ts = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 12, 10, 0, 0)
            .unwrap();
        let sections = vec![
            BranchSection::new("main", vec![commit("main", "Fix login\n\nDetails", ts)]),
            BranchSection::new("dev", Vec::new()),
        ];

        let text = render_report("api", "dev@example.com", generated(), &sections, DetailLevel::Title);
        assert_eq!(
            text,
            "# Weekly Commits Report\n\
             Repository: api\n\
             Author: dev@example.com\n\
             Generated: 2026-10-16 17:05:09\n\
             \n\
             ## Branch: main\n\
             2026-10-12 10:00 | Fix login\n\
             \n\
             ## Branch: dev\n"
        );
    }

    #[test]
    fn full_detail_keeps_one_line_per_commit() {
        let ts = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2026, 10, 13, 9, 0, 0).unwrap();
        let sections = vec![BranchSection::new(
            "main",
            vec![
                commit("main", "Second\n\nwith body\nover lines", ts),
                commit("main", "First", ts),
            ],
        )];
        let text = render_report("api", "dev@example.com", generated(), &sections, DetailLevel::Full);
        let lines: Vec<&str> = text.lines().skip_while(|l| !l.starts_with("## Branch")).collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with("| Second with body over lines"));
        assert!(lines[2].ends_with("| First"));
    }

    #[test]
    fn commit_time_uses_committer_offset() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let new_york = FixedOffset::west_opt(4 * 3600).unwrap();
        // both are 2026-10-14 00:30 UTC
        let sections = vec![BranchSection::new(
            "main",
            vec![
                commit("main", "From Tokyo", tokyo.with_ymd_and_hms(2026, 10, 14, 9, 30, 0).unwrap()),
                commit("main", "From New York", new_york.with_ymd_and_hms(2026, 10, 13, 20, 30, 0).unwrap()),
            ],
        )];
        let text = render_report("api", "dev@example.com", generated(), &sections, DetailLevel::Title);
        assert!(text.contains("2026-10-14 09:30 | From Tokyo\n"));
        assert!(text.contains("2026-10-13 20:30 | From New York\n"));
    }

    #[test]
    fn rewrites_existing_report() {
        let dir = tempdir().unwrap();
        let old = dir.path().join("api.txt");
        fs::write(&old, "stale content that must disappear\n".repeat(10)).unwrap();

        let path = write_report(dir.path(), "api", "dev@example.com", generated(), &[], DetailLevel::Full).unwrap();
        assert_eq!(path, old);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# Weekly Commits Report\n"));
        assert!(!text.contains("stale"));
    }
}
