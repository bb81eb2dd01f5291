use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use serde_yaml::Value as YamlValue;
use tracing::warn;

use crate::error::{Error, Result};

pub const IGNORE_FILE: &str = ".recqlignore";

pub fn collect_markdown_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let walker = WalkBuilder::new(dir)
        .hidden(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(false)
        .add_custom_ignore_filename(IGNORE_FILE)
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping directory entry");
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    files
}

pub fn read_paths_from_stdin() -> Vec<PathBuf> {
    read_paths(io::stdin().lock())
}

fn read_paths(input: impl BufRead) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                warn!(error = %err, "skipping path that is not valid UTF-8");
                continue;
            }
            Err(err) => {
                warn!(error = %err, "stopped reading paths");
                break;
            }
        };
        let line = line.trim();
        if !line.is_empty() {
            paths.push(PathBuf::from(line));
        }
    }
    paths
}

/// Loads a YAML file holding a sequence of records.
pub fn load_records(path: &Path) -> Result<Vec<YamlValue>> {
    let content = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| Error::Yaml {
        path: path.to_path_buf(),
        source,
    })
}
