//! Read-only inspection of the local git checkout.

use anyhow::{Context, Result, anyhow, bail};
use log::debug;
use std::collections::BTreeSet;
use std::process::Command;

/// What the commands need to know about the repository. Mocked in tests so
/// command flows run without a real checkout.
#[cfg_attr(test, mockall::automock)]
pub trait GitInfo: Send + Sync {
    fn current_branch(&self) -> Result<String>;
    fn repository_name(&self) -> Result<String>;
    fn changed_files(&self, base_branch: &str) -> Result<BTreeSet<String>>;
}

/// Shells out to the `git` binary in the current working directory.
pub struct GitCli;

impl GitCli {
    fn run(&self, args: &[&str]) -> Result<String> {
        debug!("Running git {}", args.join(" "));

        let output = Command::new("git")
            .args(args)
            .output()
            .context("Failed to run git; is it installed?")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("git {} failed: {}", args.join(" "), stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl GitInfo for GitCli {
    #[tracing::instrument(skip(self))]
    fn current_branch(&self) -> Result<String> {
        let branch = self.run(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        Ok(branch.trim().to_string())
    }

    #[tracing::instrument(skip(self))]
    fn repository_name(&self) -> Result<String> {
        let url = self.run(&["remote", "get-url", "origin"])?;
        repo_name_from_url(url.trim())
    }

    /// Union of locally edited files (worktree and index) and everything the
    /// branch changed relative to `base_branch`.
    #[tracing::instrument(skip(self))]
    fn changed_files(&self, base_branch: &str) -> Result<BTreeSet<String>> {
        let status = self.run(&["status", "--porcelain"])?;
        let mut files = parse_porcelain_status(&status);

        let range = format!("{}...", base_branch);
        let diff = self.run(&["diff", &range, "--name-only"])?;
        files.extend(parse_name_only(&diff));

        debug!("Found {} changed file(s)", files.len());
        Ok(files)
    }
}

/// Extracts the repository name from a remote URL, for both
/// `git@host:owner/repo.git` and `https://host/owner/repo.git` shapes.
fn repo_name_from_url(url: &str) -> Result<String> {
    let name = url
        .rsplit('/')
        .next()
        .map(|last| last.trim_end_matches(".git"))
        .filter(|name| !name.is_empty())
        .ok_or_else(|| anyhow!("Could not determine repository name from remote URL"))?;

    if name.is_empty() || name.contains(':') {
        bail!("Could not determine repository name from remote URL");
    }

    Ok(name.to_string())
}

/// Parses `git status --porcelain` output into the set of touched paths.
/// Rename entries ("R  old -> new") contribute the new path.
fn parse_porcelain_status(output: &str) -> BTreeSet<String> {
    output
        .lines()
        .filter(|line| line.len() > 3)
        .map(|line| {
            let path = line[3..].trim();
            match path.split_once(" -> ") {
                Some((_, renamed_to)) => renamed_to,
                None => path,
            }
        })
        .filter(|path| !path.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_name_only(output: &str) -> BTreeSet<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_name_from_https_url() {
        assert_eq!(
            repo_name_from_url("https://github.com/acme/webapp.git").unwrap(),
            "webapp"
        );
    }

    #[test]
    fn test_repo_name_from_ssh_url() {
        assert_eq!(
            repo_name_from_url("git@github.com:acme/webapp.git").unwrap(),
            "webapp"
        );
    }

    #[test]
    fn test_repo_name_without_git_suffix() {
        assert_eq!(
            repo_name_from_url("https://github.com/acme/webapp").unwrap(),
            "webapp"
        );
    }

    #[test]
    fn test_repo_name_from_empty_url_fails() {
        assert!(repo_name_from_url("").is_err());
        assert!(repo_name_from_url("https://github.com/acme/").is_err());
    }

    #[test]
    fn test_parse_porcelain_status() {
        let output = " M locales/en.json\n\
                      A  locales/de.json\n\
                      ?? locales/it.json\n\
                      R  locales/old.json -> locales/new.json\n\
                      D  locales/gone.json\n";

        let files = parse_porcelain_status(output);
        let expected: BTreeSet<String> = [
            "locales/en.json",
            "locales/de.json",
            "locales/it.json",
            "locales/new.json",
            "locales/gone.json",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(files, expected);
    }

    #[test]
    fn test_parse_porcelain_status_empty() {
        assert!(parse_porcelain_status("").is_empty());
        assert!(parse_porcelain_status("\n\n").is_empty());
    }

    #[test]
    fn test_parse_name_only() {
        let output = "locales/en.json\nlocales/fr.json\n\n";
        let files = parse_name_only(output);
        assert_eq!(files.len(), 2);
        assert!(files.contains("locales/fr.json"));
    }
}
