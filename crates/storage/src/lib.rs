//! Filesystem access for map folders.
//!
//! - [`backend`]: the [`StorageBackend`] seam every pipeline reads through.
//! - [`Resolver`]: where each game version keeps its maps, and whether it's
//!   linked to the shared pool.
//! - [`FolderLinker`]: swaps a version's maps folder for a link to the pool.

pub mod backend;
mod copy;
pub mod error;
mod link;
mod path;
mod resolver;

pub use crate::backend::StorageBackend;
pub use crate::copy::{copy_dir, copy_dir_all};
pub use crate::link::{FolderLinker, LinkOptions, SymlinkLinker};
pub use crate::path::validate as validate_path;
pub use crate::resolver::{Resolver, Version};
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
