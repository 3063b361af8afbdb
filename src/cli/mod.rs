mod delete;
#[cfg(feature = "http")]
mod download;
mod export;
mod import;
mod link;
mod scan;
mod status;

use crate::error::{ErrorKind, Result};
use clap::{Parser, Subcommand};
use exn::ResultExt;
use mapshelf_cache::MetadataCache;
use mapshelf_config::Config;
use mapshelf_library::{Context, Library};
use mapshelf_storage::backend::{LocalBackend, ReadOnlyBackend};
use mapshelf_storage::{BackendHandle, Resolver, SymlinkLinker, Version};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "mapshelf",
    version,
    about = "Manage custom maps across parallel game installations",
    long_about = "Scans, imports, exports and deletes map folders for every installed game version, \
                  and links versions to a shared pool of maps instead of duplicating them."
)]
pub struct Cli {
    /// Config file (TOML, YAML or JSON) layered over the platform config
    #[arg(long, global = true, env = "MAPSHELF_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the maps installed for a game version
    Scan {
        /// Game version; the shared pool if omitted
        #[arg(short, long)]
        game_version: Option<String>,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Unpack map archives into a game version's maps folder
    Import {
        #[arg(value_name = "ARCHIVE", required = true)]
        archives: Vec<PathBuf>,

        #[arg(short, long)]
        game_version: Option<String>,
    },
    /// Bundle maps into a zip archive
    Export {
        /// Archive to write
        output: PathBuf,

        #[arg(short, long)]
        game_version: Option<String>,

        /// Map folders to include; everything if omitted
        #[arg(value_name = "FOLDER")]
        folders: Vec<PathBuf>,
    },
    /// Delete maps by content hash
    Delete {
        #[arg(value_name = "HASH", required = true)]
        hashes: Vec<String>,

        #[arg(short, long)]
        game_version: Option<String>,

        /// Report what would be deleted without deleting anything
        #[arg(long)]
        dry_run: bool,
    },
    /// List installed game versions and whether they use the shared pool
    Status,
    /// Replace a version's maps folder with a link to the shared pool
    Link {
        game_version: String,

        /// Move the version's maps into the shared pool first
        #[arg(long)]
        keep_contents: bool,

        /// Link to this subfolder of the shared pool
        #[arg(long)]
        intermediate_folder: Option<String>,
    },
    /// Turn a linked version's maps folder back into a real folder
    Unlink {
        game_version: String,

        /// Copy the shared pool's maps into the new folder
        #[arg(long)]
        keep_contents: bool,
    },
    /// Download a map described by a registry JSON file
    #[cfg(feature = "http")]
    Download {
        descriptor: PathBuf,

        #[arg(short, long)]
        game_version: Option<String>,

        /// Also copy the map into every other version and the shared pool
        #[arg(long)]
        one_click: bool,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    tracing::debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Scan { game_version, json } => {
            let library = build(&config, false);
            scan::run(&library, parse_version(game_version)?.as_ref(), json).await
        },
        Commands::Import { archives, game_version } => {
            let library = build(&config, false);
            import::run(&library, &archives, parse_version(game_version)?.as_ref()).await
        },
        Commands::Export { output, game_version, folders } => {
            let library = build(&config, false);
            export::run(&library, &folders, parse_version(game_version)?.as_ref(), &output).await
        },
        Commands::Delete { hashes, game_version, dry_run } => {
            let library = build(&config, dry_run);
            delete::run(&library, &hashes, parse_version(game_version)?.as_ref()).await
        },
        Commands::Status => status::run(&build(&config, false)).await,
        Commands::Link { game_version, keep_contents, intermediate_folder } => {
            link::link(&build(&config, false), &parse_one(game_version)?, keep_contents, intermediate_folder).await
        },
        Commands::Unlink { game_version, keep_contents } => {
            link::unlink(&build(&config, false), &parse_one(game_version)?, keep_contents).await
        },
        #[cfg(feature = "http")]
        Commands::Download { descriptor, game_version, one_click } => {
            let library = build(&config, false);
            let temp_suffix_len = config.download.temp_suffix_len;
            download::run(&library, &descriptor, parse_version(game_version)?.as_ref(), one_click, temp_suffix_len)
                .await
        },
    }
}

/// Wire the library together from configuration. A read-only library logs
/// every change it would make instead of making it.
fn build(config: &Config, read_only: bool) -> Library {
    let local: BackendHandle = Arc::new(LocalBackend::new("local"));
    let backend: BackendHandle = match read_only {
        true => Arc::new(ReadOnlyBackend::new(local)),
        false => local,
    };
    let ctx = Context::new(backend, Arc::new(MetadataCache::new()))
        .with_chunk_size(config.scan.chunk_size)
        .with_enrichment_timeout(config.scan.enrichment_timeout());
    let linker = Arc::new(SymlinkLinker::new(&config.shared_pool));
    Library::new(ctx, Resolver::new(&config.installations, &config.shared_pool, linker))
}

fn parse_version(name: Option<String>) -> Result<Option<Version>> {
    name.map(parse_one).transpose()
}

fn parse_one(name: String) -> Result<Version> {
    Version::new(name.clone()).or_raise(|| ErrorKind::InvalidVersion(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(&["mapshelf", "scan"])]
    #[case(&["mapshelf", "scan", "-g", "1.29.1", "--json"])]
    #[case(&["mapshelf", "import", "a.zip", "b.zip", "--game-version", "1.29.1"])]
    #[case(&["mapshelf", "export", "out.zip", "1a (One)", "2b (Two)"])]
    #[case(&["mapshelf", "delete", "--dry-run", "abc123"])]
    #[case(&["mapshelf", "link", "1.29.1", "--keep-contents", "--intermediate-folder", "Pool"])]
    #[case(&["mapshelf", "--config", "mapshelf.toml", "status"])]
    fn test_parses(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_ok());
    }

    #[rstest]
    #[case(&["mapshelf", "import"])]
    #[case(&["mapshelf", "delete", "-g", "1.29.1"])]
    #[case(&["mapshelf", "unlink"])]
    fn test_rejects(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some("1.29.1"), true)]
    #[case(Some("../escape"), false)]
    fn test_parse_version(#[case] name: Option<&str>, #[case] valid: bool) {
        assert_eq!(parse_version(name.map(str::to_string)).is_ok(), valid);
    }
}
