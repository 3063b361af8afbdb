//! Map manifest parsing and content hashing.
//!
//! Every map folder carries an `Info.dat` manifest naming its audio, cover
//! and per-difficulty chart files. This crate turns the raw manifest into an
//! [`AssetManifest`] and derives the folder's content hash from it: the SHA-1
//! of the raw manifest bytes followed by every referenced chart and
//! lightshow file, in declaration order. That hash is the map's identity, the
//! same one remote map registries publish, and does not depend on where the
//! folder lives on disk.

pub mod error;
mod hash;
mod models;
mod parse;

pub use crate::hash::compute_hash;
pub use crate::models::{AssetManifest, Schema, Variant};
pub use crate::parse::parse;

/// Canonical manifest filename. Matched case-insensitively on disk and in
/// archives.
pub const MANIFEST_FILENAME: &str = "info.dat";

/// Returns `true` if `name` (a bare filename, not a path) is a manifest.
pub fn is_manifest_name(name: impl AsRef<str>) -> bool {
    name.as_ref().eq_ignore_ascii_case(MANIFEST_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Info.dat", true)]
    #[case("info.dat", true)]
    #[case("INFO.DAT", true)]
    #[case("Info.dat.bak", false)]
    #[case("ExpertPlus.dat", false)]
    fn test_is_manifest_name(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_manifest_name(name), expected);
    }
}
