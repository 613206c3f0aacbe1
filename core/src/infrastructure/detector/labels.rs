use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::common::entities::app_errors::CoreError;

static NAMES_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\d+)\s*:\s*(?:'([^']*)'|"([^"]*)")"#).expect("names pattern is valid")
});

/// Reads one class name per line. Blank lines and `#` comments are skipped.
pub fn read_labels_file(path: &Path) -> Result<Vec<String>, CoreError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CoreError::ModelUnavailable(format!("labels file {}: {}", path.display(), e))
    })?;

    let labels = parse_labels(&content);
    if labels.is_empty() {
        return Err(CoreError::ModelUnavailable(format!(
            "labels file {} is empty",
            path.display()
        )));
    }

    Ok(labels)
}

pub fn parse_labels(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Parses the `names` metadata YOLO exporters embed in ONNX files, e.g.
/// `{0: 'apple', 1: 'banana'}`. Gaps in the class ids get generic names.
pub fn parse_names_metadata(raw: &str) -> Vec<String> {
    let mut entries: Vec<(usize, String)> = NAMES_ENTRY
        .captures_iter(raw)
        .filter_map(|caps| {
            let id = caps.get(1)?.as_str().parse().ok()?;
            let name = caps.get(2).or_else(|| caps.get(3))?.as_str().to_string();
            Some((id, name))
        })
        .collect();
    entries.sort_by_key(|(id, _)| *id);

    let Some((last, _)) = entries.last() else {
        return Vec::new();
    };

    let mut labels: Vec<String> = (0..=*last).map(|id| format!("class_{id}")).collect();
    for (id, name) in entries {
        labels[id] = name;
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_file_skips_blanks_and_comments() {
        let labels = parse_labels("# food classes\napple\n\n  banana \nnasi goreng\n");
        assert_eq!(labels, vec!["apple", "banana", "nasi goreng"]);
    }

    #[test]
    fn names_metadata_is_ordered_by_class_id() {
        let labels = parse_names_metadata("{1: 'banana', 0: 'apple', 3: \"soto ayam\"}");
        assert_eq!(labels, vec!["apple", "banana", "class_2", "soto ayam"]);
    }

    #[test]
    fn unparseable_metadata_yields_nothing() {
        assert!(parse_names_metadata("not a dict").is_empty());
    }

    #[test]
    fn missing_labels_file_is_model_unavailable() {
        let error = read_labels_file(Path::new("/nonexistent/labels.txt")).unwrap_err();
        assert!(matches!(error, CoreError::ModelUnavailable(_)));
    }
}
