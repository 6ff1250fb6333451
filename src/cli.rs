// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API: the CLI structure is declared as Rust structs and
// enums, and clap generates the parsing, --help and --version for us.
//
// Layout:
//   showcase [GLOBAL OPTIONS] <COMMAND>
//     build <PAGE> [--out FILE]   fill the host page and write it out
//     repos [--json] [--all ...]  print the repositories
//     gists [--json] [...]        print the gists
//
// The global options override the config file, field by field.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ApiSource;
use crate::github::{RepoSort, RepoType, SortDirection};

#[derive(Parser, Debug)]
#[command(
    name = "showcase",
    version,
    about = "Build a portfolio page from a GitHub user's pinned repos and gists",
    long_about = "showcase fetches a GitHub user's featured repositories and recent gists and \
                  fills them into the card templates of a hand-written HTML page. \
                  If either list cannot be loaded, its section is hidden and its alert shows why."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// JSON config file (any field may be omitted)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// GitHub user to show
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// GitHub token (required for --source graphql)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// API to fetch from
    #[arg(long, value_enum, global = true)]
    pub source: Option<ApiSource>,

    /// Number of gists to show
    #[arg(long, global = true)]
    pub gist_limit: Option<u32>,

    /// Number of pinned repositories to show (GraphQL)
    #[arg(long, global = true)]
    pub pinned_limit: Option<u32>,

    /// Repository to feature (REST); repeat for several
    ///
    /// Example: --repo mini-pomodoro --repo SteamCMD-JS-Interface
    #[arg(long = "repo", global = true)]
    pub repos: Vec<String>,

    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fill the host page's templates and write the finished page
    ///
    /// Example: showcase build index.html --out dist/index.html
    Build {
        /// Host HTML page containing the card templates
        page: PathBuf,

        /// Where to write the page (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print the featured repositories
    Repos {
        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,

        /// List every public repository instead (REST only)
        #[arg(long)]
        all: bool,

        /// Which repositories to list with --all
        #[arg(long = "type", value_enum, requires = "all")]
        kind: Option<RepoType>,

        #[arg(long, value_enum, requires = "all")]
        sort: Option<RepoSort>,

        #[arg(long, value_enum, requires = "all")]
        direction: Option<SortDirection>,

        /// Page of results to fetch with --all
        #[arg(long, requires = "all")]
        page: Option<u32>,
    },

    /// Print the most recent gists
    Gists {
        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Only gists updated after this ISO 8601 timestamp (REST only)
        #[arg(long)]
        since: Option<String>,

        /// Page of results to fetch (REST only)
        #[arg(long)]
        page: Option<u32>,
    },
}
