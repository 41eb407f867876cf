use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::DATA_DIR;

/// What `init` did, for the output layer.
#[derive(Debug, PartialEq, Eq)]
pub enum InitResult {
    Created {
        path: PathBuf,
        excluded_in: Option<&'static str>,
    },
    AlreadyInitialized(PathBuf),
}

pub fn run(stealth: bool) -> Result<InitResult> {
    let data_dir = PathBuf::from(DATA_DIR);

    if data_dir.exists() {
        return Ok(InitResult::AlreadyInitialized(data_dir));
    }

    fs::create_dir_all(&data_dir).context("Failed to create .shelfwise directory")?;

    info!(path = %data_dir.display(), "initialized data directory");

    let excluded_in = if stealth { add_to_git_exclusions()? } else { None };

    Ok(InitResult::Created {
        path: data_dir,
        excluded_in,
    })
}

/// Adds `.shelfwise` to git exclusions and returns the file it went into.
/// Prefers `.git/info/exclude` if it exists (truly local), otherwise uses `.gitignore`.
fn add_to_git_exclusions() -> Result<Option<&'static str>> {
    let exclude_path = Path::new(".git/info/exclude");
    let gitignore_path = Path::new(".gitignore");

    let (target_path, label) = if exclude_path.exists() {
        (exclude_path, ".git/info/exclude")
    } else if gitignore_path.exists() || Path::new(".git").is_dir() {
        (gitignore_path, ".gitignore")
    } else {
        // Not a git repo, skip
        return Ok(None);
    };

    let content = fs::read_to_string(target_path).unwrap_or_default();
    if content
        .lines()
        .any(|line| line.trim() == DATA_DIR || line.trim() == format!("{DATA_DIR}/"))
    {
        return Ok(None);
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(target_path)
        .context("Failed to open git exclusion file")?;

    if !content.is_empty() && !content.ends_with('\n') {
        writeln!(file)?;
    }
    writeln!(file, "{DATA_DIR}")?;

    Ok(Some(label))
}
