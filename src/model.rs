use chrono::{DateTime, FixedOffset, Utc};

/// A commit selected for the report, in the order the history walk yielded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub id: String,
    pub author_email: String,
    pub message: String,
    /// Committer time in the committer's own offset, as `git log` shows it.
    pub timestamp: DateTime<FixedOffset>,
    pub branch: String,
    pub repository: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchSection {
    pub branch: String,
    pub commits: Vec<CommitRecord>,
}

impl BranchSection {
    pub fn new(branch: impl Into<String>, commits: Vec<CommitRecord>) -> Self {
        Self {
            branch: branch.into(),
            commits,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new() -> Self {
        Self { since: None, until: None }
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        if let Some(since) = self.since {
            if timestamp < &since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if timestamp > &until {
                return false;
            }
        }
        true
    }

    /// True when `timestamp` lies before the lower bound.
    pub fn is_before(&self, timestamp: &DateTime<Utc>) -> bool {
        self.since.map_or(false, |since| timestamp < &since)
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::new()
    }
}
