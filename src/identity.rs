//! Resolution of the operator's `user.email`.
//!
//! Lookup order is an explicit list of config files rather than whatever the
//! ambient git installation would merge, so callers (and tests) decide which
//! scopes participate and in what order.

use crate::error::{ReportError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    /// `.git/config` of the repository around the working directory.
    Local,
    /// The user's own git config.
    Global,
}

/// Local configuration wins over global.
pub const DEFAULT_PRECEDENCE: [ConfigScope; 2] = [ConfigScope::Local, ConfigScope::Global];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySource {
    pub scope: ConfigScope,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct IdentityResolver {
    sources: Vec<IdentitySource>,
    /// Expands `~/` in include paths.
    home: Option<PathBuf>,
    /// Matched against `includeIf "gitdir:..."` conditions.
    git_dir: Option<PathBuf>,
}

impl IdentityResolver {
    pub fn new(sources: Vec<IdentitySource>) -> Self {
        Self {
            sources,
            ..Default::default()
        }
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    pub fn with_git_dir(mut self, git_dir: impl Into<PathBuf>) -> Self {
        self.git_dir = Some(git_dir.into());
        self
    }

    /// Build the source list for `cwd`, scopes visited in `precedence` order.
    pub fn discover<F>(cwd: &Path, precedence: &[ConfigScope], env: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let git_dir = discover_git_dir(cwd);
        let mut sources = Vec::new();
        for scope in precedence {
            let paths: Vec<PathBuf> = match scope {
                ConfigScope::Local => git_dir
                    .iter()
                    .map(|dirs| dirs.common.join("config"))
                    .collect(),
                ConfigScope::Global => global_config_paths(&env),
            };
            sources.extend(paths.into_iter().map(|path| IdentitySource {
                scope: *scope,
                path,
            }));
        }
        Self {
            sources,
            home: env("HOME").filter(|h| !h.is_empty()).map(PathBuf::from),
            git_dir: git_dir.map(|dirs| dirs.git),
        }
    }

    pub fn from_environment(cwd: &Path) -> Self {
        Self::discover(cwd, &DEFAULT_PRECEDENCE, |key| std::env::var_os(key))
    }

    pub fn sources(&self) -> &[IdentitySource] {
        &self.sources
    }

    /// First `user.email` found in source order.
    pub fn resolve(&self) -> Result<String> {
        for source in &self.sources {
            if let Some(email) = self.read_email(&source.path)? {
                debug!(scope = ?source.scope, path = %source.path.display(), "resolved user.email");
                return Ok(email);
            }
        }
        Err(ReportError::IdentityNotSet)
    }

    // Includes are followed the way git does, so an email kept in an
    // `[include]` or matching `[includeIf]` file is found too.
    fn read_email(&self, path: &Path) -> Result<Option<String>> {
        if !path.is_file() {
            return Ok(None);
        }
        let config_error = |e: &dyn std::fmt::Display| ReportError::GitConfig(format!("{}: {e}", path.display()));

        let mut file = gix::config::File::from_path_no_includes(path.to_path_buf(), gix::config::Source::Local)
            .map_err(|e| config_error(&e))?;

        let mut includes = gix::config::file::includes::Options::follow_without_conditional(self.home.as_deref());
        includes.conditional = gix::config::file::includes::conditional::Context {
            git_dir: self.git_dir.as_deref(),
            branch_name: None,
        };
        file.resolve_includes(gix::config::file::init::Options {
            includes,
            ..Default::default()
        })
        .map_err(|e| config_error(&e))?;

        Ok(file
            .string("user.email")
            .map(|value| value.to_string().trim().to_string())
            .filter(|email| !email.is_empty()))
    }
}

struct GitDirs {
    /// `.git` of the worktree, what `gitdir:` conditions see.
    git: PathBuf,
    /// Shared directory holding `config`, differs from `git` in linked worktrees.
    common: PathBuf,
}

fn discover_git_dir(cwd: &Path) -> Option<GitDirs> {
    match gix::discover(cwd) {
        Ok(repo) => Some(GitDirs {
            git: repo.git_dir().to_path_buf(),
            common: repo.common_dir().to_path_buf(),
        }),
        Err(e) => {
            debug!(cwd = %cwd.display(), error = %e, "no repository around working directory");
            None
        }
    }
}

// Mirrors git: GIT_CONFIG_GLOBAL replaces everything, otherwise ~/.gitconfig
// takes precedence over the XDG file.
fn global_config_paths<F>(env: &F) -> Vec<PathBuf>
where
    F: Fn(&str) -> Option<OsString>,
{
    if let Some(path) = env("GIT_CONFIG_GLOBAL").filter(|p| !p.is_empty()) {
        return vec![PathBuf::from(path)];
    }

    let home = env("HOME").filter(|h| !h.is_empty()).map(PathBuf::from);
    let mut paths = Vec::new();
    if let Some(home) = &home {
        paths.push(home.join(".gitconfig"));
    }
    match env("XDG_CONFIG_HOME").filter(|x| !x.is_empty()) {
        Some(xdg) => paths.push(PathBuf::from(xdg).join("git").join("config")),
        None => {
            if let Some(home) = &home {
                paths.push(home.join(".config").join("git").join("config"));
            }
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    fn write_config(path: &Path, email: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, format!("[user]\n\tname = Someone\n\temail = {email}\n")).unwrap();
    }

    fn env_from(vars: HashMap<&'static str, PathBuf>) -> impl Fn(&str) -> Option<OsString> {
        move |key| vars.get(key).map(|p| p.clone().into_os_string())
    }

    #[test]
    fn first_source_with_email_wins() {
        let dir = tempdir().unwrap();
        let local = dir.path().join("local");
        let global = dir.path().join("global");
        write_config(&local, "local@example.com");
        write_config(&global, "global@example.com");

        let resolver = IdentityResolver::new(vec![
            IdentitySource { scope: ConfigScope::Local, path: local.clone() },
            IdentitySource { scope: ConfigScope::Global, path: global.clone() },
        ]);
        assert_eq!(resolver.resolve().unwrap(), "local@example.com");

        let reversed = IdentityResolver::new(vec![
            IdentitySource { scope: ConfigScope::Global, path: global },
            IdentitySource { scope: ConfigScope::Local, path: local },
        ]);
        assert_eq!(reversed.resolve().unwrap(), "global@example.com");
    }

    #[test]
    fn falls_through_missing_files_and_missing_keys() {
        let dir = tempdir().unwrap();
        let no_email = dir.path().join("no_email");
        fs::write(&no_email, "[core]\n\tbare = false\n").unwrap();
        let global = dir.path().join("global");
        write_config(&global, "global@example.com");

        let resolver = IdentityResolver::new(vec![
            IdentitySource { scope: ConfigScope::Local, path: dir.path().join("absent") },
            IdentitySource { scope: ConfigScope::Local, path: no_email },
            IdentitySource { scope: ConfigScope::Global, path: global },
        ]);
        assert_eq!(resolver.resolve().unwrap(), "global@example.com");
    }

    #[test]
    fn unset_identity_is_an_error() {
        let dir = tempdir().unwrap();
        let resolver = IdentityResolver::new(vec![IdentitySource {
            scope: ConfigScope::Global,
            path: dir.path().join("missing"),
        }]);
        assert!(matches!(resolver.resolve(), Err(ReportError::IdentityNotSet)));
        assert!(matches!(IdentityResolver::default().resolve(), Err(ReportError::IdentityNotSet)));
    }

    #[test]
    fn git_config_global_overrides_home() {
        let dir = tempdir().unwrap();
        let explicit = dir.path().join("explicit.gitconfig");
        let env = env_from(HashMap::from([
            ("GIT_CONFIG_GLOBAL", explicit.clone()),
            ("HOME", dir.path().to_path_buf()),
        ]));
        let resolver = IdentityResolver::discover(dir.path(), &[ConfigScope::Global], env);
        assert_eq!(
            resolver.sources(),
            &[IdentitySource { scope: ConfigScope::Global, path: explicit }]
        );
    }

    #[test]
    fn email_from_included_file() {
        let dir = tempdir().unwrap();
        let global = dir.path().join("global");
        fs::write(&global, "[user]\n\tname = Someone\n[include]\n\tpath = identity.inc\n").unwrap();
        write_config(&dir.path().join("identity.inc"), "included@example.com");

        let resolver = IdentityResolver::new(vec![IdentitySource { scope: ConfigScope::Global, path: global }]);
        assert_eq!(resolver.resolve().unwrap(), "included@example.com");
    }

    #[test]
    fn include_paths_expand_home() {
        let dir = tempdir().unwrap();
        let home = dir.path().join("home");
        let global = dir.path().join("global");
        fs::write(&global, "[include]\n\tpath = ~/identity.inc\n").unwrap();
        write_config(&home.join("identity.inc"), "home-include@example.com");

        let resolver = IdentityResolver::new(vec![IdentitySource { scope: ConfigScope::Global, path: global }])
            .with_home(&home);
        assert_eq!(resolver.resolve().unwrap(), "home-include@example.com");
    }

    #[test]
    fn conditional_include_matches_git_dir() {
        let dir = tempdir().unwrap();
        let work = dir.path().join("work");
        fs::create_dir_all(work.join(".git")).unwrap();
        write_config(&dir.path().join("work.inc"), "work@example.com");

        let global = dir.path().join("global");
        fs::write(
            &global,
            format!(
                "[user]\n\temail = personal@example.com\n[includeIf \"gitdir:{}/\"]\n\tpath = work.inc\n",
                work.display()
            ),
        )
        .unwrap();
        let sources = vec![IdentitySource { scope: ConfigScope::Global, path: global }];

        let inside = IdentityResolver::new(sources.clone()).with_git_dir(work.join(".git"));
        assert_eq!(inside.resolve().unwrap(), "work@example.com");

        let other = dir.path().join("other").join(".git");
        fs::create_dir_all(&other).unwrap();
        let outside = IdentityResolver::new(sources).with_git_dir(other);
        assert_eq!(outside.resolve().unwrap(), "personal@example.com");
    }

    #[test]
    fn home_gitconfig_precedes_xdg() {
        let dir = tempdir().unwrap();
        let home = dir.path().join("home");
        let xdg = dir.path().join("xdg");
        write_config(&home.join(".gitconfig"), "home@example.com");
        write_config(&xdg.join("git").join("config"), "xdg@example.com");

        let env = env_from(HashMap::from([("HOME", home.clone()), ("XDG_CONFIG_HOME", xdg)]));
        let resolver = IdentityResolver::discover(dir.path(), &[ConfigScope::Global], env);
        assert_eq!(resolver.sources().len(), 2);
        assert_eq!(resolver.resolve().unwrap(), "home@example.com");

        fs::remove_file(home.join(".gitconfig")).unwrap();
        assert_eq!(resolver.resolve().unwrap(), "xdg@example.com");
    }
}
