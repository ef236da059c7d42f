use crate::cli_args::Cli;
use crate::output;
use anyhow::{Context, Result};
use gptrepo_core::{
    self as core, AppError, FileStatus, IgnoreList, RunConfig, TreeOptions,
    config::DEFAULT_TREE_LENGTH_LIMIT,
};
use log;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub fn handle_generate_command(args: &Cli, repo_path: &Path, quiet: bool) -> Result<()> {
    let repo_root = expand_path(repo_path);
    if !repo_root.is_dir() {
        anyhow::bail!(AppError::InvalidArgument(format!(
            "Repository path '{}' is not a directory",
            repo_root.display()
        )));
    }
    log::info!("Repository root: {}", repo_root.display());

    let explicit_ignore = args.ignore_file.as_deref().map(expand_path);
    let ignore_path = core::resolve_ignore_path(
        &repo_root,
        explicit_ignore.as_deref(),
        core::executable_dir().as_deref(),
    )
    .context("Failed to locate ignore file")?;
    let ignore_list = IgnoreList::load_optional(ignore_path.as_deref())
        .context("Failed to load ignore patterns")?;
    if ignore_list.is_empty() {
        log::info!("No active ignore patterns, every file is included");
    } else {
        log::debug!("Ignore file lines: {:?}", ignore_list.patterns());
    }

    if args.list {
        let options = TreeOptions {
            level: Some(args.tree_depth),
            limit_to_directories: false,
            length_limit: DEFAULT_TREE_LENGTH_LIMIT,
        };
        let listing = core::build_tree(&repo_root, &ignore_list, &options)
            .context("Failed to build directory tree")?;
        output::print_tree(&listing);
    }

    let output_path = expand_path(&args.output);
    let config = build_run_config(args, &output_path)?;
    log::debug!("Run configuration: {:?}", config);

    let preamble_file = args.preamble.as_deref().map(expand_path);
    let preamble =
        core::load_preamble(preamble_file.as_deref()).context("Failed to read preamble file")?;

    write_output(&repo_root, &ignore_list, &output_path, &preamble, &config)?;
    core::append_end_marker(&output_path).context("Failed to finish output file")?;

    if args.split {
        let chunks = core::split_file(&output_path, config.split_size)
            .with_context(|| format!("Failed to split {}", output_path.display()))?;
        if !quiet {
            for chunk in &chunks {
                log::debug!("Chunk {} is {} bytes", chunk.index, chunk.size);
                output::print_chunk_written(chunk);
            }
            output::print_all_chunks_written();
        }
    } else if !quiet {
        output::print_output_written(&output_path);
    }
    Ok(())
}

fn build_run_config(args: &Cli, output_path: &Path) -> Result<RunConfig> {
    let mut config = RunConfig {
        verbose: args.verbose,
        exclude_large_files: args.exclude_large,
        output_path: Some(output_path.to_path_buf()),
        ..RunConfig::default()
    };
    if let Some(size) = args.max_file_size.as_deref() {
        config.large_file_size =
            core::parse_byte_size(size).context("Invalid --max-file-size value")?;
    }
    if let Some(size) = args.split_size.as_deref() {
        config.split_size = core::parse_byte_size(size).context("Invalid --split-size value")?;
    }
    Ok(config)
}

/// Create (truncating) the output file and write the preamble plus every
/// record. The file is flushed and closed before returning.
fn write_output(
    repo_root: &Path,
    ignore_list: &IgnoreList,
    output_path: &Path,
    preamble: &str,
    config: &RunConfig,
) -> Result<()> {
    let file = File::create(output_path).map_err(|e| AppError::FileWrite {
        path: output_path.to_path_buf(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);

    core::write_preamble(&mut writer, preamble).map_err(|e| AppError::FileWrite {
        path: output_path.to_path_buf(),
        source: e,
    })?;
    let summary =
        core::process_repository(repo_root, ignore_list, &mut writer, config, |outcome| {
            output::print_file_outcome(outcome)
        })
        .context("Failed to process repository")?;
    writer.flush().map_err(|e| AppError::FileWrite {
        path: output_path.to_path_buf(),
        source: e,
    })?;

    for outcome in &summary.outcomes {
        if let FileStatus::TooLarge { size } = outcome.status {
            log::info!(
                "Left out {} ({} bytes, limit {} bytes)",
                outcome.relative_path,
                size,
                config.large_file_size
            );
        }
    }
    log::info!(
        "Wrote {} records ({} bytes) to {}",
        summary.included().count(),
        summary.bytes_written,
        output_path.display()
    );
    Ok(())
}

fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn expand_path_leaves_plain_paths_alone() {
        assert_eq!(
            expand_path(Path::new("some/repo")),
            PathBuf::from("some/repo")
        );
    }

    #[test]
    fn run_config_reads_size_overrides() {
        let args = Cli::parse_from([
            "gptrepo",
            "repo",
            "-x",
            "--max-file-size",
            "2KB",
            "--split-size",
            "1MB",
        ]);
        let config = build_run_config(&args, Path::new("output.txt")).unwrap();
        assert!(config.exclude_large_files);
        assert_eq!(config.large_file_size, 2_000);
        assert_eq!(config.split_size, 1_000_000);
        assert_eq!(config.output_path, Some(PathBuf::from("output.txt")));
    }

    #[test]
    fn run_config_rejects_bad_size() {
        let args = Cli::parse_from(["gptrepo", "repo", "--split-size", "huge"]);
        let err = build_run_config(&args, Path::new("output.txt")).unwrap_err();
        assert!(err.downcast_ref::<AppError>().is_some());
    }
}
