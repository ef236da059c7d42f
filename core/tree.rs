//! Indented directory listing with box-drawing prefixes.

use crate::config::TreeOptions;
use crate::error::{AppError, Result};
use crate::ignore_list::IgnoreList;
use log;
use std::fs;
use std::path::{Path, PathBuf};

const SPACE: &str = "    ";
const BRANCH: &str = "│   ";
const TEE: &str = "├── ";
const LAST: &str = "└── ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine {
    /// Continuation columns inherited from ancestor directories.
    pub prefix: String,
    pub pointer: &'static str,
    pub name: String,
    pub is_dir: bool,
    pub ignored: bool,
}

impl TreeLine {
    pub fn plain(&self) -> String {
        format!("{}{}{}", self.prefix, self.pointer, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeListing {
    pub root_name: String,
    pub lines: Vec<TreeLine>,
    /// More entries existed past `length_limit`.
    pub truncated: bool,
    pub length_limit: usize,
    pub directories: usize,
    pub files: usize,
}

impl TreeListing {
    pub fn truncation_notice(&self) -> Option<String> {
        self.truncated.then(|| {
            format!(
                "... length_limit, {}, reached, counted:",
                self.length_limit
            )
        })
    }

    pub fn summary_line(&self) -> String {
        let mut line = format!("{} directories", self.directories);
        if self.files > 0 {
            line.push_str(&format!(", {} files", self.files));
        }
        line
    }
}

/// Walk `root` and produce at most `options.length_limit` entry lines.
///
/// Entries are sorted by name within each directory. Symlinked directories are
/// listed but not descended into.
pub fn build_tree(
    root: &Path,
    ignore_list: &IgnoreList,
    options: &TreeOptions,
) -> Result<TreeListing> {
    log::debug!(
        "Building tree for {} (level: {:?}, limit: {})",
        root.display(),
        options.level,
        options.length_limit
    );
    let mut builder = TreeBuilder {
        root,
        ignore_list,
        options,
        listing: TreeListing {
            root_name: root_name(root),
            lines: Vec::new(),
            truncated: false,
            length_limit: options.length_limit,
            directories: 0,
            files: 0,
        },
    };
    let entries = read_sorted(root, options.limit_to_directories).map_err(|e| {
        AppError::FileRead {
            path: root.to_path_buf(),
            source: e,
        }
    })?;
    builder.walk(entries, "", options.level);
    log::debug!(
        "Tree built: {} lines, truncated: {}",
        builder.listing.lines.len(),
        builder.listing.truncated
    );
    Ok(builder.listing)
}

struct TreeBuilder<'a> {
    root: &'a Path,
    ignore_list: &'a IgnoreList,
    options: &'a TreeOptions,
    listing: TreeListing,
}

struct Entry {
    path: PathBuf,
    name: String,
    is_dir: bool,
    /// False for symlinked directories, which are listed but not walked.
    descend: bool,
}

impl TreeBuilder<'_> {
    /// Returns `false` once the line budget is spent.
    fn push(&mut self, line: TreeLine) -> bool {
        if self.listing.lines.len() >= self.options.length_limit {
            self.listing.truncated = true;
            return false;
        }
        self.listing.lines.push(line);
        true
    }

    fn walk(&mut self, entries: Vec<Entry>, prefix: &str, level: Option<usize>) {
        if level == Some(0) {
            return;
        }
        let count = entries.len();
        for (idx, entry) in entries.into_iter().enumerate() {
            if self.listing.truncated {
                return;
            }
            let pointer = if idx + 1 == count { LAST } else { TEE };
            let line = TreeLine {
                prefix: prefix.to_string(),
                pointer,
                name: entry.name.clone(),
                is_dir: entry.is_dir,
                ignored: self.is_ignored(&entry.path),
            };
            if !self.push(line) {
                return;
            }

            if entry.is_dir {
                self.listing.directories += 1;
                let extension = if pointer == TEE { BRANCH } else { SPACE };
                if !entry.descend {
                    log::debug!("Not following symlinked directory {}", entry.path.display());
                    continue;
                }
                let children = match read_sorted(&entry.path, self.options.limit_to_directories)
                {
                    Ok(children) => children,
                    Err(e) => {
                        log::warn!("Cannot read directory {}: {}", entry.path.display(), e);
                        Vec::new()
                    }
                };
                self.walk(
                    children,
                    &format!("{}{}", prefix, extension),
                    level.map(|l| l - 1),
                );
            } else {
                self.listing.files += 1;
            }
        }
    }

    fn is_ignored(&self, path: &Path) -> bool {
        pathdiff::diff_paths(path, self.root)
            .is_some_and(|rel| self.ignore_list.is_path_ignored(&rel))
    }
}

fn read_sorted(dir: &Path, limit_to_directories: bool) -> std::io::Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for dir_entry in fs::read_dir(dir)? {
        let dir_entry = dir_entry?;
        let path = dir_entry.path();
        let file_type = dir_entry.file_type()?;
        let is_symlink = file_type.is_symlink();
        let is_dir = file_type.is_dir() || (is_symlink && path.is_dir());
        if limit_to_directories && !is_dir {
            continue;
        }
        entries.push(Entry {
            name: dir_entry.file_name().to_string_lossy().into_owned(),
            path,
            is_dir,
            descend: is_dir && !is_symlink,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn root_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            root.canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| root.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    fn plain_lines(listing: &TreeListing) -> Vec<String> {
        listing.lines.iter().map(TreeLine::plain).collect()
    }

    fn unlimited() -> TreeOptions {
        TreeOptions {
            level: None,
            ..TreeOptions::default()
        }
    }

    #[test]
    fn renders_box_drawing_prefixes() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "a.txt");
        touch(temp.path(), "src/lib.rs");
        touch(temp.path(), "src/main.rs");
        touch(temp.path(), "z.md");

        let listing = build_tree(temp.path(), &IgnoreList::empty(), &unlimited()).unwrap();
        assert_eq!(
            plain_lines(&listing),
            vec![
                "├── a.txt",
                "├── src",
                "│   ├── lib.rs",
                "│   └── main.rs",
                "└── z.md",
            ]
        );
        assert_eq!(listing.directories, 1);
        assert_eq!(listing.files, 4);
        assert!(!listing.truncated);
        assert_eq!(listing.summary_line(), "1 directories, 4 files");
    }

    #[test]
    fn last_directory_children_use_space_prefix() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "docs/guide.md");

        let listing = build_tree(temp.path(), &IgnoreList::empty(), &unlimited()).unwrap();
        assert_eq!(plain_lines(&listing), vec!["└── docs", "    └── guide.md"]);
    }

    #[test]
    fn depth_limit_stops_recursion() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "a/b/c/deep.txt");

        let options = TreeOptions {
            level: Some(2),
            ..TreeOptions::default()
        };
        let listing = build_tree(temp.path(), &IgnoreList::empty(), &options).unwrap();
        assert_eq!(plain_lines(&listing), vec!["└── a", "    └── b"]);
        assert_eq!(listing.directories, 2);
        assert_eq!(listing.summary_line(), "2 directories");
    }

    #[test]
    fn length_limit_truncates_with_notice() {
        let temp = tempdir().unwrap();
        for name in ["a", "b", "c", "d", "e"] {
            touch(temp.path(), &format!("{}.txt", name));
        }

        let options = TreeOptions {
            length_limit: 3,
            ..unlimited()
        };
        let listing = build_tree(temp.path(), &IgnoreList::empty(), &options).unwrap();
        assert_eq!(listing.lines.len(), 3);
        assert!(listing.truncated);
        assert_eq!(listing.files, 3);
        assert_eq!(
            listing.truncation_notice().unwrap(),
            "... length_limit, 3, reached, counted:"
        );
    }

    #[test]
    fn exact_fit_is_not_truncated() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "a.txt");
        touch(temp.path(), "b.txt");

        let options = TreeOptions {
            length_limit: 2,
            ..unlimited()
        };
        let listing = build_tree(temp.path(), &IgnoreList::empty(), &options).unwrap();
        assert_eq!(listing.lines.len(), 2);
        assert!(!listing.truncated);
        assert!(listing.truncation_notice().is_none());
    }

    #[test]
    fn directories_only_mode() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "src/lib.rs");
        touch(temp.path(), "README.md");

        let options = TreeOptions {
            limit_to_directories: true,
            ..unlimited()
        };
        let listing = build_tree(temp.path(), &IgnoreList::empty(), &options).unwrap();
        assert_eq!(plain_lines(&listing), vec!["└── src"]);
        assert_eq!(listing.files, 0);
    }

    #[test]
    fn marks_ignored_entries() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "target/debug/app");
        touch(temp.path(), "src/main.rs");

        let ignore = IgnoreList::from_lines(["target"]);
        let listing = build_tree(temp.path(), &ignore, &unlimited()).unwrap();
        let flagged: Vec<(&str, bool)> = listing
            .lines
            .iter()
            .map(|l| (l.name.as_str(), l.ignored))
            .collect();
        assert_eq!(
            flagged,
            vec![
                ("src", false),
                ("main.rs", false),
                ("target", true),
                ("debug", true),
                ("app", true),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_is_listed_but_not_walked() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "real/inner.txt");
        std::os::unix::fs::symlink(temp.path().join("real"), temp.path().join("link")).unwrap();

        let listing = build_tree(temp.path(), &IgnoreList::empty(), &unlimited()).unwrap();
        assert_eq!(
            plain_lines(&listing),
            vec!["├── link", "└── real", "    └── inner.txt"]
        );
        assert!(listing.lines[0].is_dir);
        assert_eq!(listing.directories, 2);
        assert_eq!(listing.files, 1);

        let options = TreeOptions {
            limit_to_directories: true,
            ..unlimited()
        };
        let listing = build_tree(temp.path(), &IgnoreList::empty(), &options).unwrap();
        assert_eq!(plain_lines(&listing), vec!["├── link", "└── real"]);
    }

    #[test]
    fn root_name_uses_final_component() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("myrepo");
        fs::create_dir(&root).unwrap();
        let listing = build_tree(&root, &IgnoreList::empty(), &unlimited()).unwrap();
        assert_eq!(listing.root_name, "myrepo");
        assert_eq!(listing.summary_line(), "0 directories");
    }

    #[test]
    fn missing_root_is_an_error() {
        let temp = tempdir().unwrap();
        let err = build_tree(
            &temp.path().join("absent"),
            &IgnoreList::empty(),
            &unlimited(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::FileRead { .. }));
    }
}
