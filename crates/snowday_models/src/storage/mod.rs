//! Object stores for narration audio.

mod gcs;
mod local;

pub use gcs::GcsObjectStore;
pub use local::LocalObjectStore;

use snowday_error::{StorageError, StorageErrorKind};

/// Reject absolute paths and parent-directory segments.
fn check_object_path(path: &str) -> Result<(), StorageError> {
    if path.is_empty()
        || path.starts_with('/')
        || path.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(StorageError::new(StorageErrorKind::InvalidPath(path.to_string())));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_paths() {
        assert!(check_object_path("snow_day/audio/story_1_para_0.mp3").is_ok());
        assert!(check_object_path("/etc/passwd").is_err());
        assert!(check_object_path("snow_day/../secrets").is_err());
        assert!(check_object_path("snow_day//x.mp3").is_err());
        assert!(check_object_path("").is_err());
    }
}
