use crate::error::{AppError, Result};
use crate::output_formats::RECORD_DELIMITER;
use log;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

const DEFAULT_CHUNK_EXTENSION: &str = "txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFile {
    pub index: usize,
    pub path: PathBuf,
    pub size: u64,
}

/// Split a previously written output file into record-aligned chunk files.
///
/// Chunk `i` is written next to the input as `<stem>_<i>.<ext>`. At least one
/// chunk is always produced, even for an empty input.
pub fn split_file(file_path: &Path, split_size: u64) -> Result<Vec<ChunkFile>> {
    log::info!(
        "Splitting {} into chunks of at most {} bytes",
        file_path.display(),
        split_size
    );
    let file = File::open(file_path).map_err(|e| AppError::FileRead {
        path: file_path.to_path_buf(),
        source: e,
    })?;
    let chunks = split_into_chunks(BufReader::new(file), split_size).map_err(|e| match e {
        AppError::Io(source) => AppError::FileRead {
            path: file_path.to_path_buf(),
            source,
        },
        other => other,
    })?;

    let mut written = Vec::with_capacity(chunks.len());
    for (index, chunk) in chunks.into_iter().enumerate() {
        let path = chunk_path(file_path, index)?;
        fs::write(&path, &chunk).map_err(|e| AppError::FileWrite {
            path: path.clone(),
            source: e,
        })?;
        log::debug!("Chunk {} ({} bytes) -> {}", index, chunk.len(), path.display());
        written.push(ChunkFile {
            index,
            path,
            size: chunk.len() as u64,
        });
    }
    log::info!("Split output into {} chunks.", written.len());
    Ok(written)
}

/// Group the lines of `reader` into chunks whose boundaries fall only on
/// record delimiter lines.
///
/// Text before the first delimiter travels with the first record, and
/// anything after the last record (the end marker) stays with it. A new chunk
/// starts before any record that would bring the current one to
/// `split_size` or beyond, so every chunk stays under it; a record that alone
/// reaches `split_size` gets a chunk to itself. Concatenating the chunks reproduces the input byte for byte.
pub fn split_into_chunks<R: BufRead>(mut reader: R, split_size: u64) -> Result<Vec<Vec<u8>>> {
    if split_size == 0 {
        return Err(AppError::Chunking(
            "Split size must be greater than 0 bytes".to_string(),
        ));
    }
    let limit = usize::try_from(split_size).unwrap_or(usize::MAX);

    let mut packer = ChunkPacker {
        limit,
        chunks: Vec::new(),
        current: Vec::new(),
    };
    let mut segment: Vec<u8> = Vec::new();
    let mut line: Vec<u8> = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if line.starts_with(RECORD_DELIMITER.as_bytes()) {
            packer.add(std::mem::take(&mut segment));
        }
        segment.extend_from_slice(&line);
    }
    packer.add(segment);
    Ok(packer.finish())
}

struct ChunkPacker {
    limit: usize,
    chunks: Vec<Vec<u8>>,
    current: Vec<u8>,
}

impl ChunkPacker {
    fn add(&mut self, segment: Vec<u8>) {
        if segment.is_empty() {
            return;
        }
        if !self.current.is_empty() && self.current.len().saturating_add(segment.len()) >= self.limit
        {
            log::trace!(
                "Chunk {} full at {} bytes, starting a new one",
                self.chunks.len(),
                self.current.len()
            );
            self.chunks.push(std::mem::take(&mut self.current));
        }
        if segment.len() >= self.limit {
            log::trace!(
                "Record of {} bytes reaches split size ({}), placing in its own chunk",
                segment.len(),
                self.limit
            );
        }
        self.current.extend_from_slice(&segment);
    }

    fn finish(mut self) -> Vec<Vec<u8>> {
        self.chunks.push(self.current);
        self.chunks
    }
}

/// Path of chunk `index` for `file_path`: the extension is kept (or `txt`
/// when there is none) and `_<index>` is appended to the stem.
pub fn chunk_path(file_path: &Path, index: usize) -> Result<PathBuf> {
    let stem = file_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AppError::Chunking(format!(
                "Cannot derive chunk names from '{}'",
                file_path.display()
            ))
        })?;
    let extension = file_path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_CHUNK_EXTENSION.to_string());
    Ok(file_path.with_file_name(format!("{}_{}.{}", stem, index, extension)))
}

/// Whether `candidate` is named like a chunk of `file_path`, i.e.
/// `chunk_path(file_path, i)` for some `i`. Both paths are compared as given.
pub fn is_chunk_path(file_path: &Path, candidate: &Path) -> bool {
    if file_path.parent() != candidate.parent() {
        return false;
    }
    let (Some(stem), Some(name)) = (
        file_path.file_stem().and_then(|s| s.to_str()),
        candidate.file_name().and_then(|n| n.to_str()),
    ) else {
        return false;
    };
    let extension = file_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or(DEFAULT_CHUNK_EXTENSION);

    name.strip_prefix(stem)
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|rest| rest.strip_suffix(extension))
        .and_then(|rest| rest.strip_suffix('.'))
        .is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
}
