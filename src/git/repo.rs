use crate::error::{ReportError, Result};
use crate::model::{CommitRecord, DateRange};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use gix::{ObjectId, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open the repository rooted exactly at `path`; parents are not searched.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_dir() {
            return Err(ReportError::RepoNotFound(path));
        }

        let repo = gix::open(&path).map_err(|e| {
            debug!(path = %path.display(), error = %e, "failed to open repository");
            ReportError::NotARepository(path.clone())
        })?;

        Ok(Self { repo, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_branch(&self, branch: &str) -> bool {
        self.branch_ref(branch).is_some()
    }

    /// Full name of the branch: a local `refs/heads/<name>`, else a
    /// remote-tracking `refs/remotes/<name>`. Tags and other revisions never count.
    fn branch_ref(&self, branch: &str) -> Option<String> {
        [format!("refs/heads/{branch}"), format!("refs/remotes/{branch}")]
            .into_iter()
            .find(|name| match self.repo.try_find_reference(name.as_str()) {
                Ok(found) => found.is_some(),
                Err(e) => {
                    debug!(reference = %name, error = %e, "reference lookup failed");
                    false
                }
            })
    }

    fn branch_tip(&self, branch: &str) -> Result<ObjectId> {
        let not_found = || ReportError::BranchNotFound(branch.to_string());
        let name = self.branch_ref(branch).ok_or_else(not_found)?;
        let id = self
            .repo
            .rev_parse_single(name.as_str())
            .map_err(|_| not_found())?;

        let commit = id.object()?.try_into_commit().map_err(|_| not_found())?;
        Ok(commit.id)
    }

    /// Commits on `branch` authored by `author_email` and committed within `range`,
    /// newest first by committer time. Equal times keep discovery order.
    pub fn commits_by_author(
        &self,
        repository: &str,
        branch: &str,
        author_email: &str,
        range: &DateRange,
    ) -> Result<Vec<CommitRecord>> {
        let tip = self.branch_tip(branch)?;

        let mut commits = Vec::new();
        let mut seen: HashSet<ObjectId> = HashSet::new();
        let mut queue: BinaryHeap<(i64, Reverse<u64>, ObjectId)> = BinaryHeap::new();
        let mut discovered = 0u64;

        let tip_time = self.repo.find_commit(tip)?.time()?.seconds;
        queue.push((tip_time, Reverse(discovered), tip));
        seen.insert(tip);

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Walking {branch}..."));

        while let Some((secs, _, commit_id)) = queue.pop() {
            let utc = DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| ReportError::InvalidDate(format!("Invalid timestamp: {secs}")))?;

            // everything left in the queue is at least this old
            if range.is_before(&utc) {
                break;
            }

            let commit = self.repo.find_commit(commit_id)?;
            let parents: Vec<ObjectId> = commit.parent_ids().map(|id| id.into()).collect();

            if range.contains(&utc) {
                let offset = FixedOffset::east_opt(commit.time()?.offset).unwrap_or(Utc.fix());
                let author = commit.author()?;
                let email = author.email.to_string();
                if email.trim().eq_ignore_ascii_case(author_email.trim()) {
                    commits.push(CommitRecord {
                        id: commit_id.to_string(),
                        author_email: email,
                        message: commit.message_raw()?.to_string(),
                        timestamp: utc.with_timezone(&offset),
                        branch: branch.to_string(),
                        repository: repository.to_string(),
                    });
                }
            }

            for pid in parents {
                // shallow clones end at commits whose parents were never fetched
                if !self.repo.has_object(pid) {
                    debug!(commit = %commit_id, parent = %pid, "parent missing, treating as end of history");
                    continue;
                }
                if seen.insert(pid) {
                    discovered += 1;
                    let parent_time = self.repo.find_commit(pid)?.time()?.seconds;
                    queue.push((parent_time, Reverse(discovered), pid));
                }
            }

            pb.inc(1);
        }

        pb.finish_and_clear();
        debug!(
            repository,
            branch,
            visited = seen.len(),
            matched = commits.len(),
            "history walk complete"
        );
        Ok(commits)
    }
}
