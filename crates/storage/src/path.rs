//! Path validation for untrusted relative paths.
//!
//! Archive entry names come from whoever built the archive. Before an entry
//! is written anywhere it goes through [`validate`], so that a name like
//! `../../.bashrc` can't escape the folder it's being extracted into.

use crate::error::{ErrorKind, Result};
use std::path::{Component, Path, PathBuf};

/// Validate an untrusted relative path, returning it normalized.
///
/// Backslashes are treated as separators (archives built on Windows use
/// them), `.` segments and repeated separators are dropped, and `..` may only
/// cancel a segment that came before it. Leading separators are ignored, so
/// an absolute-looking name is kept inside the root. Null bytes, drive
/// prefixes and names that normalize to nothing are rejected with
/// [`InvalidPath`](ErrorKind::InvalidPath).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use mapshelf_storage::validate_path;
/// assert_eq!(validate_path("Song/Info.dat").unwrap(), Path::new("Song/Info.dat"));
/// assert_eq!(validate_path("Song\\Hard.dat").unwrap(), Path::new("Song/Hard.dat"));
/// assert_eq!(validate_path("Song/../cover.jpg").unwrap(), Path::new("cover.jpg"));
/// assert!(validate_path("../outside.dat").is_err());
/// assert!(validate_path("Song/../../outside.dat").is_err());
/// ```
pub fn validate(path: impl AsRef<str>) -> Result<PathBuf> {
    let raw = path.as_ref();
    let invalid = || exn::Exn::from(ErrorKind::InvalidPath(PathBuf::from(raw)));
    if raw.contains('\0') {
        return Err(invalid());
    }
    let normalized = raw.replace('\\', "/");

    let mut components = Vec::new();
    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(segment) => components.push(segment),
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => return Err(invalid()),
            Component::ParentDir => {
                components.pop().ok_or_else(invalid)?;
            },
        }
    }
    if components.is_empty() {
        return Err(invalid());
    }
    Ok(components.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Info.dat", "Info.dat")]
    #[case("Pack/Song/Info.dat", "Pack/Song/Info.dat")]
    #[case("Pack\\Song\\Hard.dat", "Pack/Song/Hard.dat")]
    #[case("Pack//./Song/", "Pack/Song")]
    #[case("/Song/Info.dat", "Song/Info.dat")]
    #[case("Song/sub/../Info.dat", "Song/Info.dat")]
    fn test_valid(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate(input).unwrap(), Path::new(expected));
    }

    #[rstest]
    #[case::parent("../Info.dat")]
    #[case::backslash_parent("Song\\..\\..\\evil.dat")]
    #[case::escape_after_descend("a/../../b")]
    #[case::only_parents("../..")]
    #[case::null_byte("Song/In\0fo.dat")]
    #[case::empty("")]
    #[case::dots_and_slashes("././/")]
    fn test_invalid(#[case] input: &str) {
        let err = validate(input).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidPath(PathBuf::from(input)));
    }
}
