pub mod chunking;
pub mod config;
pub mod error;
pub mod gather;
pub mod ignore_list;
pub mod output_formats;
pub mod tree;

pub use chunking::{ChunkFile, chunk_path, is_chunk_path, split_file, split_into_chunks};
pub use config::{
    DEFAULT_OUTPUT_FILENAME, IGNORE_FILENAME, LARGE_FILE_SIZE, RunConfig, SPLIT_SIZE, TreeOptions,
    executable_dir, parse_byte_size, resolve_ignore_path,
};
pub use error::{AppError, Result};
pub use gather::{FileOutcome, FileStatus, GatherSummary, process_repository};
pub use ignore_list::IgnoreList;
pub use output_formats::{
    DEFAULT_PREAMBLE, END_MARKER, RECORD_DELIMITER, Record, append_end_marker, load_preamble,
    write_preamble,
};
pub use tree::{TreeLine, TreeListing, build_tree};
