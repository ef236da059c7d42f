use crate::error::{AppError, Result};
use byte_unit::Byte;
use log;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const IGNORE_FILENAME: &str = ".gptignore";
pub const DEFAULT_OUTPUT_FILENAME: &str = "output.txt";
/// Files above this many bytes are dropped when large-file exclusion is on.
pub const LARGE_FILE_SIZE: u64 = 1_000_000;
/// Target upper bound for each chunk produced by the splitter.
pub const SPLIT_SIZE: u64 = 4_000_000;
pub const DEFAULT_TREE_DEPTH: usize = 3;
pub const DEFAULT_TREE_LENGTH_LIMIT: usize = 1000;

/// Settings threaded through a single run of the concatenator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub verbose: bool,
    pub exclude_large_files: bool,
    pub large_file_size: u64,
    pub split_size: u64,
    /// The file being written, so a run never reads its own output.
    pub output_path: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            exclude_large_files: false,
            large_file_size: LARGE_FILE_SIZE,
            split_size: SPLIT_SIZE,
            output_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeOptions {
    /// Maximum depth to descend; `None` walks everything.
    pub level: Option<usize>,
    pub limit_to_directories: bool,
    pub length_limit: usize,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_TREE_DEPTH),
            limit_to_directories: false,
            length_limit: DEFAULT_TREE_LENGTH_LIMIT,
        }
    }
}

/// Locate the ignore file for `repo_root`.
///
/// Lookup order: an explicit override, `<repo_root>/.gptignore`, then a
/// `.gptignore` sitting next to the running executable. Returns `None` when
/// none of them exist, which callers treat as an empty pattern list.
pub fn resolve_ignore_path(
    repo_root: &Path,
    explicit: Option<&Path>,
    fallback_dir: Option<&Path>,
) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(AppError::Config(format!(
                "Specified ignore file not found at path: {}",
                path.display()
            )));
        }
        log::debug!("Using specified ignore file: {}", path.display());
        return Ok(Some(path.to_path_buf()));
    }

    let in_repo = repo_root.join(IGNORE_FILENAME);
    if in_repo.is_file() {
        log::debug!("Using repository ignore file: {}", in_repo.display());
        return Ok(Some(in_repo));
    }

    if let Some(dir) = fallback_dir {
        let beside_tool = dir.join(IGNORE_FILENAME);
        if beside_tool.is_file() {
            log::debug!("Using fallback ignore file: {}", beside_tool.display());
            return Ok(Some(beside_tool));
        }
    }

    log::debug!(
        "No {} found for {}, ignoring nothing",
        IGNORE_FILENAME,
        repo_root.display()
    );
    Ok(None)
}

/// Directory holding the running executable, used as the ignore-file fallback.
pub fn executable_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// Parse a human-readable byte size such as `4MB`, `512KiB` or `1000000`.
pub fn parse_byte_size(size_str: &str) -> Result<u64> {
    let byte_value = Byte::from_str(size_str).map_err(|e| {
        AppError::InvalidArgument(format!(
            "Invalid size format '{}': {}. Use KB, MB, etc.",
            size_str, e
        ))
    })?;
    let bytes_u128: u128 = byte_value.into();
    let bytes = u64::try_from(bytes_u128).map_err(|_| {
        AppError::InvalidArgument(format!("Size '{}' exceeds the maximum u64 value", size_str))
    })?;
    if bytes == 0 {
        return Err(AppError::InvalidArgument(format!(
            "Size '{}' must be greater than 0 bytes",
            size_str
        )));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn prefers_repo_ignore_file() {
        let repo = tempdir().unwrap();
        let tool = tempdir().unwrap();
        fs::write(repo.path().join(IGNORE_FILENAME), "target\n").unwrap();
        fs::write(tool.path().join(IGNORE_FILENAME), "node_modules\n").unwrap();

        let found = resolve_ignore_path(repo.path(), None, Some(tool.path())).unwrap();
        assert_eq!(found, Some(repo.path().join(IGNORE_FILENAME)));
    }

    #[test]
    fn falls_back_to_tool_directory() {
        let repo = tempdir().unwrap();
        let tool = tempdir().unwrap();
        fs::write(tool.path().join(IGNORE_FILENAME), "node_modules\n").unwrap();

        let found = resolve_ignore_path(repo.path(), None, Some(tool.path())).unwrap();
        assert_eq!(found, Some(tool.path().join(IGNORE_FILENAME)));
    }

    #[test]
    fn missing_ignore_file_is_not_an_error() {
        let repo = tempdir().unwrap();
        let found = resolve_ignore_path(repo.path(), None, None).unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn explicit_ignore_file_must_exist() {
        let repo = tempdir().unwrap();
        let missing = repo.path().join("nope.ignore");
        let err = resolve_ignore_path(repo.path(), Some(&missing), None).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn parses_human_sizes() {
        assert_eq!(parse_byte_size("1000000").unwrap(), 1_000_000);
        assert_eq!(parse_byte_size("4MB").unwrap(), 4_000_000);
        assert_eq!(parse_byte_size("1KiB").unwrap(), 1024);
        assert!(parse_byte_size("lots").is_err());
        assert!(parse_byte_size("0").is_err());
    }
}
