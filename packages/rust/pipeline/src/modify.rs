//! Dotted-path mutation of stage outputs.
//!
//! The single set-by-path utility behind `apply_user_modifications`:
//! walks path segments, creating intermediate objects where a segment is
//! absent, overwrites the leaf, and errors on attempting to descend
//! through a non-container.

use serde_json::{Map, Value};

use siteforge_shared::{Result, SiteForgeError};

/// Set `value` at the dotted `path` inside `target`.
///
/// `"business_info.name"` walks (or creates) `business_info` and sets its
/// `name` key. Intermediate containers are created only when a segment is
/// absent; an existing non-object segment is an error.
pub fn set_by_path(target: &mut Value, path: &str, value: Value) -> Result<()> {
    if path.is_empty() || path.split('.').any(|s| s.is_empty()) {
        return Err(SiteForgeError::validation(format!(
            "invalid modification path: {path:?}"
        )));
    }

    let segments: Vec<&str> = path.split('.').collect();
    let (leaf, parents) = segments.split_last().unwrap();

    let mut current = target;
    for segment in parents {
        let Some(obj) = current.as_object_mut() else {
            return Err(SiteForgeError::validation(format!(
                "cannot descend into non-object at segment {segment:?} of path {path:?}"
            )));
        };
        current = obj
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    let Some(obj) = current.as_object_mut() else {
        return Err(SiteForgeError::validation(format!(
            "cannot set key {leaf:?}: parent in path {path:?} is a non-object"
        )));
    };
    obj.insert(leaf.to_string(), value);
    Ok(())
}
