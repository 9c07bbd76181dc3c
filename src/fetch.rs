//! Fetches a schema folder out of a git repository.
//!
//! The repository is cloned shallow and sparse, only the requested subfolder
//! is checked out, and its files are flattened into the destination
//! directory. The clone itself is removed afterwards.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use crate::error::{Error, Result};

const CHECKOUT_DIR: &str = ".drizzle2typeorm-checkout";

/// Clone `repo`, sparse-checkout `subfolder` and flatten its files into
/// `dest`.
///
/// Returns the flattened file paths, sorted. Fails with
/// [`Error::SubfolderMissing`] when the subfolder does not exist in the
/// checkout.
pub fn fetch_subfolder(repo: &str, subfolder: &str, dest: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dest)?;
    let checkout = dest.join(CHECKOUT_DIR);
    if checkout.exists() {
        fs::remove_dir_all(&checkout)?;
    }

    let result = clone_and_flatten(repo, subfolder, &checkout, dest);
    if checkout.exists() {
        if let Err(e) = fs::remove_dir_all(&checkout) {
            warn!(path = %checkout.display(), "failed to remove checkout: {e}");
        }
    }
    result
}

fn clone_and_flatten(repo: &str, subfolder: &str, checkout: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    run_git([
        OsStr::new("clone"),
        OsStr::new("--depth"),
        OsStr::new("1"),
        OsStr::new("--filter=blob:none"),
        OsStr::new("--sparse"),
        OsStr::new(repo),
        checkout.as_os_str(),
    ])?;
    run_git([
        OsStr::new("-C"),
        checkout.as_os_str(),
        OsStr::new("sparse-checkout"),
        OsStr::new("set"),
        OsStr::new(subfolder),
    ])?;

    let source = checkout.join(subfolder.trim_matches('/'));
    if !source.is_dir() {
        return Err(Error::SubfolderMissing {
            subfolder: subfolder.to_string(),
            checkout: checkout.to_path_buf(),
        });
    }

    flatten_into(&source, dest)
}

fn run_git<I, S>(args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<S> = args.into_iter().collect();
    let rendered = args
        .iter()
        .map(|a| a.as_ref().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    debug!("+ git {rendered}");

    let output = Command::new("git").args(&args).output()?;
    if output.status.success() {
        Ok(())
    } else {
        Err(Error::Git {
            args: rendered,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Copy every file below `source` directly into `dest`, dropping the
/// directory structure.
///
/// Files are visited in sorted path order; when two files share a name the
/// later one wins.
pub fn flatten_into(source: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dest)?;

    let mut files = Vec::new();
    collect_files(source, &mut files)?;
    files.sort();

    let mut written: Vec<PathBuf> = Vec::new();
    for file in files {
        let Some(name) = file.file_name() else {
            continue;
        };
        let target = dest.join(name);
        if written.contains(&target) {
            warn!(file = %file.display(), "flattening overwrites a file with the same name");
        } else {
            written.push(target.clone());
        }
        fs::copy(&file, &target)?;
    }

    written.sort();
    Ok(written)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if path.file_name().is_some_and(|n| n == ".git") {
                continue;
            }
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_path(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("{prefix}_{nanos}"))
    }

    #[test]
    fn flatten_into_drops_directory_structure() {
        let source = unique_path("d2t_flatten_src");
        let dest = unique_path("d2t_flatten_dest");
        fs::create_dir_all(source.join("nested/deeper")).unwrap();
        fs::write(source.join("users.ts"), "users").unwrap();
        fs::write(source.join("nested/posts.ts"), "posts").unwrap();
        fs::write(source.join("nested/deeper/tags.ts"), "tags").unwrap();

        let written = flatten_into(&source, &dest).expect("flatten should succeed");

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["posts.ts", "tags.ts", "users.ts"]);
        assert_eq!(fs::read_to_string(dest.join("tags.ts")).unwrap(), "tags");
        assert!(!dest.join("nested").exists());
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(args)
            .status()
            .expect("git should be installed");
        assert!(status.success(), "git {args:?} failed");
    }

    /// A committed local repository holding `db/schema/users.ts`.
    fn local_repository(prefix: &str) -> PathBuf {
        let repo = unique_path(prefix);
        fs::create_dir_all(repo.join("db/schema")).unwrap();
        fs::write(repo.join("db/schema/users.ts"), "export const x = 1;").unwrap();
        fs::write(repo.join("README.md"), "readme").unwrap();
        git(&repo, &["init", "--quiet"]);
        git(&repo, &["add", "."]);
        git(
            &repo,
            &["-c", "user.name=test", "-c", "user.email=test@example.com", "commit", "--quiet", "-m", "init"],
        );
        repo
    }

    #[test]
    fn fetch_flattens_the_requested_subfolder_only() {
        let repo = local_repository("d2t_fetch_repo_ok");
        let dest = unique_path("d2t_fetch_ok");

        let files = fetch_subfolder(&format!("file://{}", repo.display()), "db/schema", &dest)
            .expect("fetch should succeed");

        assert_eq!(files, vec![dest.join("users.ts")]);
        assert!(!dest.join("README.md").exists());
        assert!(!dest.join(CHECKOUT_DIR).exists());
    }

    #[test]
    fn missing_subfolder_is_a_fatal_error() {
        let repo = local_repository("d2t_fetch_repo_missing");
        let dest = unique_path("d2t_fetch_missing_subfolder");

        let err = fetch_subfolder(&format!("file://{}", repo.display()), "nope/here", &dest)
            .expect_err("an absent subfolder should fail");

        assert!(matches!(err, Error::SubfolderMissing { .. }), "got {err:?}");
        assert!(!dest.join(CHECKOUT_DIR).exists());
    }

    #[test]
    fn fetch_from_a_missing_repository_fails() {
        let dest = unique_path("d2t_fetch_missing");
        let repo = unique_path("d2t_no_such_repo");
        let result = fetch_subfolder(&repo.to_string_lossy(), "schema", &dest);
        assert!(result.is_err());
        assert!(!dest.join(CHECKOUT_DIR).exists());
    }
}
