use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use mapshelf_library::Library;

pub async fn run(library: &Library) -> Result<()> {
    let resolver = library.resolver();
    println!("installations: {}", resolver.installations().display());
    println!("shared pool:   {}", resolver.shared_pool().display());

    let versions = library.list_versions().await.or_raise(|| ErrorKind::Command("status"))?;
    if versions.is_empty() {
        tracing::warn!(path = %resolver.installations().display(), "No game versions installed");
    }
    for version in versions {
        let state = match library.is_linked(&version).await {
            true => "linked",
            false => "separate",
        };
        println!("{version:<20} {state}");
    }
    Ok(())
}
