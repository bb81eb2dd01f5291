use std::fs;
use std::path::Path;

use serde_yaml::Value;
use tracing::debug;

/// Reads `path` and returns its frontmatter, or `None` when the file cannot
/// be read or has no parseable frontmatter block.
pub fn parse_frontmatter(path: &Path) -> Option<Value> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "skipping unreadable file");
            return None;
        }
    };
    extract_and_parse(&content)
}

fn extract_and_parse(content: &str) -> Option<Value> {
    let trimmed = content.trim_start();
    let after_first = trimmed.strip_prefix("---")?;
    let end_idx = after_first.find("\n---")?;
    let yaml_str = &after_first[..end_idx];

    let value: Value = serde_yaml::from_str(yaml_str).ok()?;
    value.is_mapping().then_some(value)
}
