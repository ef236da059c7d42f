use crate::error::{AppError, Result};
use log;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Line that opens every record. Exactly four hyphens at the start of a line.
pub const RECORD_DELIMITER: &str = "----";
/// Marker closing the repository section of the output.
pub const END_MARKER: &str = "--END--";

pub const DEFAULT_PREAMBLE: &str = "The following text is a Git repository with code. The structure of the text are sections that begin with ----, followed by a single line containing the file path and file name, followed by a variable amount of lines containing the file contents. The text representing the Git repository ends when the symbols --END-- are encounted. Any further text beyond --END-- are meant to be interpreted as instructions using the aforementioned Git repository as context.";

/// One file's entry in the output: delimiter line, path line, contents.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<'a> {
    pub path: &'a str,
    pub contents: &'a str,
}

impl Record<'_> {
    /// Bytes this record occupies once written.
    pub fn encoded_len(&self) -> usize {
        RECORD_DELIMITER.len() + 1 + self.path.len() + 1 + self.contents.len() + 1
    }

    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "{}", RECORD_DELIMITER)?;
        writeln!(out, "{}", self.path)?;
        writeln!(out, "{}", self.contents)
    }
}

/// Text placed before the first record: the user's preamble file verbatim, or
/// the default description of the format.
pub fn load_preamble(preamble_file: Option<&Path>) -> Result<String> {
    match preamble_file {
        Some(path) => {
            log::debug!("Reading preamble from: {}", path.display());
            fs::read_to_string(path).map_err(|e| AppError::FileRead {
                path: path.to_path_buf(),
                source: e,
            })
        }
        None => Ok(DEFAULT_PREAMBLE.to_string()),
    }
}

pub fn write_preamble<W: Write + ?Sized>(out: &mut W, preamble: &str) -> std::io::Result<()> {
    writeln!(out, "{}", preamble)
}

/// Reopen `output_path` for appending and close it with [`END_MARKER`].
pub fn append_end_marker(output_path: &Path) -> Result<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .open(output_path)
        .map_err(|e| AppError::FileWrite {
            path: output_path.to_path_buf(),
            source: e,
        })?;
    file.write_all(END_MARKER.as_bytes())
        .map_err(|e| AppError::FileWrite {
            path: output_path.to_path_buf(),
            source: e,
        })?;
    log::trace!("End marker appended to {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn record_layout_is_three_parts() {
        let record = Record {
            path: "src/main.rs",
            contents: "fn main() {}",
        };
        let mut buf = Vec::new();
        record.write_to(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf.clone()).unwrap(),
            "----\nsrc/main.rs\nfn main() {}\n"
        );
        assert_eq!(record.encoded_len(), buf.len());
    }

    #[test]
    fn default_preamble_mentions_markers() {
        let preamble = load_preamble(None).unwrap();
        assert!(preamble.contains(RECORD_DELIMITER));
        assert!(preamble.contains(END_MARKER));
    }

    #[test]
    fn preamble_file_is_used_verbatim() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preamble.txt");
        fs::write(&path, "Review this code.\nBe terse.").unwrap();
        assert_eq!(
            load_preamble(Some(&path)).unwrap(),
            "Review this code.\nBe terse."
        );
    }

    #[test]
    fn missing_preamble_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_preamble(Some(&dir.path().join("absent.txt"))).unwrap_err();
        assert!(matches!(err, AppError::FileRead { .. }));
    }

    #[test]
    fn end_marker_is_appended() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.txt");
        fs::write(&path, "preamble\n").unwrap();
        append_end_marker(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "preamble\n--END--");
    }
}
