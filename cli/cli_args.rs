use clap::{ArgAction, Parser};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "gptrepo",
    author,
    version,
    about = "Concatenate a repository into a single text file for language models.",
    long_about = "gptrepo walks a repository, drops paths matching .gptignore patterns, and writes \nevery remaining file as a '----' delimited record into one text file, optionally \nprinting a tree view first and splitting the result into size-bounded chunks.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  gptrepo ./my-repo\n  gptrepo ./my-repo -o context.txt -l -v\n  gptrepo ./my-repo -p preamble.txt -x -s"
)]
pub struct Cli {
    #[arg(
        value_name = "REPO_PATH",
        help = "Path to the repository root to concatenate."
    )]
    pub repo_path: Option<PathBuf>,

    #[arg(
        short = 'p',
        long = "preamble",
        value_name = "PATH",
        help = "Text file whose contents replace the default preamble.",
        help_heading = "Output"
    )]
    pub preamble: Option<PathBuf>,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        default_value = gptrepo_core::DEFAULT_OUTPUT_FILENAME,
        help = "Output file path.",
        help_heading = "Output"
    )]
    pub output: PathBuf,

    #[arg(
        short = 's',
        long = "split",
        help = "Split the output into record-aligned chunk files.",
        help_heading = "Output"
    )]
    pub split: bool,

    #[arg(
        long,
        value_name = "SIZE",
        help = "Maximum chunk size when splitting (e.g. '4MB', '512KiB') [default: 4000000].",
        help_heading = "Output"
    )]
    pub split_size: Option<String>,

    #[arg(
        short = 'l',
        long = "list",
        help = "Print a tree of the repository, ignored entries in gray.",
        help_heading = "Listing"
    )]
    pub list: bool,

    #[arg(
        long,
        value_name = "N",
        default_value_t = gptrepo_core::config::DEFAULT_TREE_DEPTH,
        help = "Depth of the tree printed by --list.",
        help_heading = "Listing"
    )]
    pub tree_depth: usize,

    #[arg(
        short = 'x',
        long = "exclude-large",
        help = "Exclude files larger than the size limit.",
        help_heading = "Filtering"
    )]
    pub exclude_large: bool,

    #[arg(
        long,
        value_name = "SIZE",
        help = "Size limit used by --exclude-large (e.g. '1MB') [default: 1000000].",
        help_heading = "Filtering"
    )]
    pub max_file_size: Option<String>,

    #[arg(
        long,
        value_name = "PATH",
        help = "Ignore file to use instead of <REPO_PATH>/.gptignore.",
        help_heading = "Filtering"
    )]
    pub ignore_file: Option<PathBuf>,

    #[arg(
        short = 'v',
        long,
        help = "List every included and skipped file (skipped ones in gray)."
    )]
    pub verbose: bool,

    #[arg(
        short,
        long,
        conflicts_with = "verbose",
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,

    #[arg(long, action = ArgAction::Count, help = "Increase diagnostic logging (--debug, --debug --debug).")]
    pub debug: u8,

    #[arg(
        long,
        value_name = "SHELL",
        value_enum,
        help = "Print a shell completion script and exit."
    )]
    pub completions: Option<Shell>,
}
