// src/main.rs
// =============================================================================
// This is the entry point of the showcase CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, to stderr)
// 3. Build the PageConfig: defaults < config file < flags
// 4. Dispatch to the subcommand handler
// 5. Exit with a proper code (0 = success, 1 = a section failed, 2 = error)
// =============================================================================

mod bootstrap;
mod cli;
mod config;
mod github;
mod page;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, GlobalArgs};
use config::{ApiSource, PageConfig};
use github::{Gist, GistListParams, GithubClient, RepoListParams, Repository};
use page::HostPage;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {e:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so stdout stays clean for the page or JSON output
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "showcase=debug" } else { "showcase=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Returns:
//   Ok(0) = everything loaded
//   Ok(1) = a section (or listing) failed to load
//   Err   = bad config, unreadable page, ...
async fn run(cli: Cli) -> Result<i32> {
    let config = resolve_config(&cli.global)?;
    let client = GithubClient::new(&config.api, config.token.clone())?;

    match cli.command {
        Commands::Build { page, out } => handle_build(&client, &config, &page, out.as_deref()).await,
        Commands::Repos {
            json,
            all,
            kind,
            sort,
            direction,
            page,
        } => {
            let params = all.then_some(RepoListParams {
                kind,
                sort,
                direction,
                per_page: Some(config::MAX_PAGE_SIZE),
                page,
            });
            handle_repos(&client, &config, params, json).await
        }
        Commands::Gists { json, since, page } => {
            let params = GistListParams {
                since,
                per_page: Some(config.gist_limit),
                page,
            };
            handle_gists(&client, &config, params, json).await
        }
    }
}

// Applies the global flags on top of the config file
fn resolve_config(global: &GlobalArgs) -> Result<PageConfig> {
    let mut config = match &global.config {
        Some(path) => PageConfig::load(path)?,
        None => PageConfig::default(),
    };

    if let Some(username) = &global.username {
        config.username = username.clone();
    }
    if let Some(token) = &global.token {
        config.token = Some(token.clone());
    }
    if let Some(source) = global.source {
        config.source = source;
    }
    if let Some(limit) = global.gist_limit {
        config.gist_limit = limit;
    }
    if let Some(limit) = global.pinned_limit {
        config.pinned_limit = limit;
    }
    if !global.repos.is_empty() {
        config.repo_names = global.repos.clone();
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

// Handles the 'build' subcommand
async fn handle_build(
    client: &GithubClient,
    config: &PageConfig,
    page_path: &Path,
    out: Option<&Path>,
) -> Result<i32> {
    let source = std::fs::read_to_string(page_path)
        .with_context(|| format!("failed to read host page {}", page_path.display()))?;
    let page = HostPage::parse(source, &config.dom)
        .with_context(|| format!("{} does not fit the page layout", page_path.display()))?;

    eprintln!("🔍 Loading repositories and gists for {}", config.username);

    let sections = bootstrap::load_page(client, config, &page).await;

    for section in [&sections.repos, &sections.gists] {
        match section.alert() {
            Some(message) => eprintln!("   ❌ {}: {}", section.kind(), message),
            None => eprintln!("   ✅ {}: {} card(s)", section.kind(), section.populated_count()),
        }
    }

    let html = page.render(&sections);

    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(path, html).with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("📄 Wrote {}", path.display());
        }
        None => print!("{html}"),
    }

    Ok(if sections.any_failed() { 1 } else { 0 })
}

// Handles the 'repos' subcommand
// With params (--all) every public repo is listed, otherwise the featured ones
async fn handle_repos(
    client: &GithubClient,
    config: &PageConfig,
    params: Option<RepoListParams>,
    json: bool,
) -> Result<i32> {
    let result = match params {
        Some(params) => {
            if config.source != ApiSource::Rest {
                bail!("--all is only available with the REST API");
            }
            github::list_user_repos(client, &config.username, &params).await
        }
        None => bootstrap::fetch_repos(client, config).await,
    };

    let repos = match result {
        Ok(repos) => repos,
        Err(e) => {
            eprintln!("❌ {e}");
            return Ok(1);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&repos)?);
    } else {
        print_repo_table(&repos);
    }
    Ok(0)
}

// Handles the 'gists' subcommand
async fn handle_gists(
    client: &GithubClient,
    config: &PageConfig,
    params: GistListParams,
    json: bool,
) -> Result<i32> {
    let result = match config.source {
        ApiSource::Rest => github::list_user_gists(client, &config.username, &params).await,
        ApiSource::Graphql => {
            if params.since.is_some() || params.page.is_some() {
                bail!("--since and --page are only available with the REST API");
            }
            github::recent_gists(client, &config.username, config.gist_limit).await
        }
    };

    let gists = match result {
        Ok(gists) => gists,
        Err(e) => {
            eprintln!("❌ {e}");
            return Ok(1);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&gists)?);
    } else {
        print_gist_table(&gists);
    }
    Ok(0)
}

fn print_repo_table(repos: &[Repository]) {
    println!("{:<30} {:<50} {:<40}", "NAME", "DESCRIPTION", "URL");
    println!("{}", "=".repeat(120));

    for repo in repos {
        println!(
            "{:<30} {:<50} {:<40}",
            truncate(&repo.name, 30),
            truncate(&repo.description, 50),
            repo.url
        );
    }

    println!();
    println!("📋 Total: {}", repos.len());
}

fn print_gist_table(gists: &[Gist]) {
    println!("{:<30} {:<12} {:<40} {:<40}", "FILE", "LANGUAGE", "DESCRIPTION", "URL");
    println!("{}", "=".repeat(124));

    for gist in gists {
        println!(
            "{:<30} {:<12} {:<40} {:<40}",
            truncate(&gist.file.filename, 30),
            gist.file.language.as_deref().unwrap_or("-"),
            truncate(&gist.description, 40),
            gist.url
        );
    }

    println!();
    println!("📋 Total: {}", gists.len());
}

// Shortens text to at most `width` characters, ending in "..." when cut
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}
