use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Configuration file '{0}' not found")]
    ConfigNotFound(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Git user.email not set")]
    IdentityNotSet,
    #[error("Git config error: {0}")]
    GitConfig(String),
    #[error("Repository not found: {}", .0.display())]
    RepoNotFound(PathBuf),
    #[error("Not a git repository: {}", .0.display())]
    NotARepository(PathBuf),
    #[error("Branch '{0}' not found")]
    BranchNotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Object find error: {0}")]
    ObjectFind(#[from] Box<gix::object::find::existing::Error>),
    #[error("Commit error: {0}")]
    Commit(#[from] Box<gix::object::commit::Error>),
    #[error("Object find with conversion error: {0}")]
    ObjectFindConv(#[from] Box<gix::object::find::existing::with_conversion::Error>),
    #[error("Object decode error: {0}")]
    ObjectDecode(#[from] Box<gix::objs::decode::Error>),
}

impl ReportError {
    /// Whether the error only affects a single repository or branch.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            ReportError::RepoNotFound(_)
                | ReportError::NotARepository(_)
                | ReportError::BranchNotFound(_)
        )
    }
}

// gix errors are large, box them on the way in
impl From<gix::object::find::existing::Error> for ReportError {
    fn from(err: gix::object::find::existing::Error) -> Self {
        ReportError::ObjectFind(Box::new(err))
    }
}

impl From<gix::object::commit::Error> for ReportError {
    fn from(err: gix::object::commit::Error) -> Self {
        ReportError::Commit(Box::new(err))
    }
}

impl From<gix::object::find::existing::with_conversion::Error> for ReportError {
    fn from(err: gix::object::find::existing::with_conversion::Error) -> Self {
        ReportError::ObjectFindConv(Box::new(err))
    }
}

impl From<gix::objs::decode::Error> for ReportError {
    fn from(err: gix::objs::decode::Error) -> Self {
        ReportError::ObjectDecode(Box::new(err))
    }
}
