use crate::chunking::is_chunk_path;
use crate::config::RunConfig;
use crate::error::{AppError, Result};
use crate::ignore_list::IgnoreList;
use crate::output_formats::Record;
use log;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Included,
    Ignored { pattern: String },
    TooLarge { size: u64 },
    /// Skipped because it could not be read or stat'ed.
    Unreadable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub relative_path: String,
    pub status: FileStatus,
}

#[derive(Debug, Clone, Default)]
pub struct GatherSummary {
    pub outcomes: Vec<FileOutcome>,
    pub bytes_written: u64,
}

impl GatherSummary {
    pub fn included(&self) -> impl Iterator<Item = &str> {
        self.with_status(|s| matches!(s, FileStatus::Included))
    }

    pub fn ignored(&self) -> impl Iterator<Item = &str> {
        self.with_status(|s| matches!(s, FileStatus::Ignored { .. }))
    }

    pub fn too_large(&self) -> impl Iterator<Item = &str> {
        self.with_status(|s| matches!(s, FileStatus::TooLarge { .. }))
    }

    pub fn unreadable(&self) -> impl Iterator<Item = &str> {
        self.with_status(|s| matches!(s, FileStatus::Unreadable { .. }))
    }

    fn with_status<F>(&self, pred: F) -> impl Iterator<Item = &str>
    where
        F: Fn(&FileStatus) -> bool,
    {
        self.outcomes
            .iter()
            .filter(move |o| pred(&o.status))
            .map(|o| o.relative_path.as_str())
    }
}

/// Write one record per included file under `repo_root` to `out`.
///
/// Entries are visited depth-first, sorted by file name within each
/// directory. The sink is left open; the caller owns its lifecycle. When
/// `config.verbose` is set, `report` sees every file's outcome as it happens.
pub fn process_repository<W, F>(
    repo_root: &Path,
    ignore_list: &IgnoreList,
    out: &mut W,
    config: &RunConfig,
    mut report: F,
) -> Result<GatherSummary>
where
    W: Write + ?Sized,
    F: FnMut(&FileOutcome),
{
    log::info!("Walking repository: {}", repo_root.display());
    let output_canonical = config
        .output_path
        .as_deref()
        .and_then(|p| p.canonicalize().ok());

    let mut summary = GatherSummary::default();
    let walker = WalkDir::new(repo_root)
        .follow_links(false)
        .sort_by_file_name();

    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                let err = AppError::from(e);
                log::warn!("Error walking directory: {}", err);
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let relative_path = relative_display(path, repo_root);

        if !entry.file_type().is_file() && !path.is_file() {
            log::debug!("Skipping non-regular entry: {}", relative_path);
            continue;
        }
        if let Some(output) = &output_canonical {
            if let Ok(canonical) = path.canonicalize() {
                if &canonical == output {
                    log::debug!("Skipping the output file itself: {}", relative_path);
                    continue;
                }
                if is_chunk_path(output, &canonical) {
                    log::debug!("Skipping a chunk of the output file: {}", relative_path);
                    continue;
                }
            }
        }

        let outcome = match classify(path, &relative_path, ignore_list, config) {
            Some(status) => FileOutcome {
                relative_path,
                status,
            },
            None => match read_lossy(path) {
                Ok(contents) => {
                    let record = Record {
                        path: &relative_path,
                        contents: &contents,
                    };
                    record.write_to(out)?;
                    summary.bytes_written += record.encoded_len() as u64;
                    log::trace!("Included: {}", relative_path);
                    FileOutcome {
                        relative_path,
                        status: FileStatus::Included,
                    }
                }
                Err(e) => {
                    log::warn!("Skipping unreadable file: {}", e);
                    FileOutcome {
                        relative_path,
                        status: FileStatus::Unreadable {
                            reason: e.to_string(),
                        },
                    }
                }
            },
        };

        if config.verbose {
            report(&outcome);
        }
        summary.outcomes.push(outcome);
    }

    log::info!(
        "Repository walk complete: {} included, {} ignored, {} too large, {} unreadable.",
        summary.included().count(),
        summary.ignored().count(),
        summary.too_large().count(),
        summary.unreadable().count()
    );
    Ok(summary)
}

/// Decide whether a file is excluded before reading it. `None` means include.
fn classify(
    path: &Path,
    relative_path: &str,
    ignore_list: &IgnoreList,
    config: &RunConfig,
) -> Option<FileStatus> {
    if config.exclude_large_files {
        match fs::metadata(path) {
            Ok(meta) if meta.len() > config.large_file_size => {
                log::debug!(
                    "Excluding {} ({} bytes > {} bytes)",
                    relative_path,
                    meta.len(),
                    config.large_file_size
                );
                return Some(FileStatus::TooLarge { size: meta.len() });
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!("Could not stat {}: {}", relative_path, e);
                return Some(FileStatus::Unreadable {
                    reason: e.to_string(),
                });
            }
        }
    }

    ignore_list.first_match(relative_path).map(|pattern| {
        if config.verbose {
            log::info!(
                "ignoring {} because it matches {}",
                relative_path,
                pattern
            );
        }
        FileStatus::Ignored {
            pattern: pattern.to_string(),
        }
    })
}

/// Read a file as text, replacing invalid UTF-8 sequences.
fn read_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| AppError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let text = String::from_utf8(bytes).unwrap_or_else(|e| {
        log::debug!("Lossy UTF-8 decoding applied to {}", path.display());
        String::from_utf8_lossy(e.as_bytes()).into_owned()
    });
    Ok(text)
}

fn relative_display(path: &Path, root: &Path) -> String {
    pathdiff::diff_paths(path, root)
        .unwrap_or_else(|| PathBuf::from(path))
        .to_string_lossy()
        .into_owned()
}
