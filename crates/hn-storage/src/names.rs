use crate::error::{StorageError, StorageResult};

/// Accept only a single, non-traversing path component.
pub(crate) fn check_component(what: &'static str, name: &str) -> StorageResult<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(StorageError::InvalidName {
            what,
            name: name.to_string(),
        });
    }
    Ok(())
}
