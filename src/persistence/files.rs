use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Resolve the data directory: the nearest `.taskboard` above the working
/// directory wins, otherwise `~/.taskboard`
pub fn get_data_dir() -> Result<PathBuf> {
    let current_dir = env::current_dir().context("Could not determine current directory")?;

    if let Some(local) = find_local_dir(&current_dir) {
        return Ok(local);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".taskboard"))
}

/// Walk from `start_dir` toward the filesystem root looking for a
/// `.taskboard` directory
fn find_local_dir(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;

    loop {
        let data_dir = current.join(".taskboard");
        if data_dir.exists() && data_dir.is_dir() {
            return Some(data_dir);
        }
        current = current.parent()?;
    }
}

/// Resolve the data directory, creating it when it is missing
pub fn ensure_data_dir() -> Result<PathBuf> {
    let dir = get_data_dir()?;
    if !dir.exists() {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    Ok(dir)
}

/// Create a fresh `.taskboard` under the working directory; refuses to
/// touch one that already exists
pub fn init_local_dir() -> Result<PathBuf> {
    let current_dir = env::current_dir().context("Could not determine current directory")?;
    let data_dir = current_dir.join(".taskboard");

    if data_dir.exists() {
        anyhow::bail!("Taskboard directory already exists: {}", data_dir.display());
    }

    fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create directory: {}", data_dir.display()))?;

    Ok(data_dir)
}

/// Where the task collection lives (`tasks.json`)
pub fn tasks_file() -> Result<PathBuf> {
    Ok(ensure_data_dir()?.join("tasks.json"))
}

/// Where the session state lives (`session.json`)
pub fn session_file() -> Result<PathBuf> {
    Ok(ensure_data_dir()?.join("session.json"))
}

/// Where the user list seed resource lives (`users.json`)
pub fn users_file() -> Result<PathBuf> {
    Ok(ensure_data_dir()?.join("users.json"))
}

/// Where the initial task seed resource lives (`tasks.seed.json`)
pub fn tasks_seed_file() -> Result<PathBuf> {
    Ok(ensure_data_dir()?.join("tasks.seed.json"))
}

/// Write `content` through a temp file in the target's directory, fsync it
/// and rename it into place, so readers never observe a partial file
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();
    let dir = path
        .parent()
        .context("File path has no parent directory")?;

    // Same directory as the target, so the rename stays on one filesystem
    let mut temp_file = NamedTempFile::new_in(dir)
        .context("Failed to create temporary file")?;

    temp_file
        .write_all(content.as_bytes())
        .context("Failed to write to temporary file")?;

    temp_file
        .as_file()
        .sync_all()
        .context("Failed to sync temporary file")?;

    temp_file
        .persist(path)
        .with_context(|| format!("Failed to persist file: {}", path.display()))?;

    Ok(())
}

/// Read a file to a string; a missing file reads as empty
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(String::new());
    }
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))
}
