use colored::*;
use std::path::Path;
use gptrepo_core::{ChunkFile, FileOutcome, FileStatus, TreeListing};

// --- Public Output Functions ---

pub fn print_tree(listing: &TreeListing) {
    println!("{}", listing.root_name);
    for line in &listing.lines {
        if line.ignored {
            println!("{}{}{}", line.prefix, line.pointer, line.name.bright_black());
        } else {
            println!("{}", line.plain());
        }
    }
    if let Some(notice) = listing.truncation_notice() {
        println!("{}", notice);
    }
    println!("\n{}", listing.summary_line());
}

/// One line of the verbose listing; anything left out of the output is gray.
pub fn print_file_outcome(outcome: &FileOutcome) {
    println!("{}", format_file_outcome(outcome));
}

pub fn print_output_written(path: &Path) {
    println!(
        "Repository contents written to {}.",
        path.display().to_string().blue()
    );
}

pub fn print_chunk_written(chunk: &ChunkFile) {
    println!(
        "Chunk {} written to {}",
        chunk.index,
        chunk.path.display().to_string().dimmed()
    );
}

pub fn print_all_chunks_written() {
    println!("{}", "All chunks written.".green());
}

// --- Internal Helpers ---

fn format_file_outcome(outcome: &FileOutcome) -> String {
    let path = outcome.relative_path.as_str();
    match &outcome.status {
        FileStatus::Included => path.to_string(),
        FileStatus::Ignored { .. } => path.bright_black().to_string(),
        FileStatus::TooLarge { .. } => format!("{} (excluded because it is too large)", path)
            .bright_black()
            .to_string(),
        FileStatus::Unreadable { reason } => format!("{} (unreadable: {})", path, reason)
            .bright_black()
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_large_outcome_mentions_reason() {
        colored::control::set_override(false);
        let outcome = FileOutcome {
            relative_path: "big.bin".to_string(),
            status: FileStatus::TooLarge { size: 2_000_000 },
        };
        assert_eq!(
            format_file_outcome(&outcome),
            "big.bin (excluded because it is too large)"
        );
    }

    #[test]
    fn included_outcome_is_plain_path() {
        colored::control::set_override(false);
        let outcome = FileOutcome {
            relative_path: "src/main.rs".to_string(),
            status: FileStatus::Included,
        };
        assert_eq!(format_file_outcome(&outcome), "src/main.rs");
    }
}
