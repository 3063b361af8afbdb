use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use mapshelf_library::Library;
use mapshelf_storage::{LinkOptions, Version};

pub async fn link(library: &Library, version: &Version, keep_contents: bool, folder: Option<String>) -> Result<()> {
    let options = LinkOptions { keep_contents, intermediate_folder: folder };
    library.link_version(version, &options).await.or_raise(|| ErrorKind::Command("link"))
}

pub async fn unlink(library: &Library, version: &Version, keep_contents: bool) -> Result<()> {
    let options = LinkOptions { keep_contents, intermediate_folder: None };
    library.unlink_version(version, &options).await.or_raise(|| ErrorKind::Command("unlink"))
}
