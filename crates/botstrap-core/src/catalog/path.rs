use std::path::Path;

use crate::error::PathViolation;

/// Validate a manifest-supplied relative path and return its canonical
/// forward-slash form.
///
/// `.` and `..` segments are resolved. The result may not climb out of the
/// directory it is joined to, and the input may not contain empty segments.
pub fn normalize_relative_path(value: &str) -> Result<String, PathViolation> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PathViolation::Empty);
    }
    if is_absolute(trimmed) {
        return Err(PathViolation::Absolute);
    }

    let canonical = trimmed.replace('\\', "/");
    if canonical.contains("//") {
        return Err(PathViolation::EmptySegment);
    }

    let normalized = normalize(&canonical);
    if normalized == ".." || normalized.starts_with("../") {
        return Err(PathViolation::TraversesUpwards);
    }

    Ok(normalized)
}

fn is_absolute(value: &str) -> bool {
    if value.starts_with('/') || value.starts_with('\\') {
        return true;
    }
    // Drive-letter paths count as absolute on every platform.
    let bytes = value.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return true;
    }
    Path::new(value).is_absolute()
}

fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(last) if *last != ".." => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}
