// src/bootstrap.rs
// =============================================================================
// The two load flows of the page, and the function that runs them together.
//
// Each flow:
// 1. Clones its card template N times (all cards start in the loading state)
// 2. Fetches its records from GitHub
// 3. Binds cards to records, dropping cards that got no record
// 4. On any fetch error: hides its container and shows the error message
//
// The flows share nothing but the HTTP client, so load_page simply starts
// both and waits for both. One failing never affects the other.
// =============================================================================

use tracing::{info, warn};

use crate::config::{ApiSource, PageConfig};
use crate::github::{
    self, FetchError, Gist, GistListParams, GithubClient, RepoListParams, Repository,
};
use crate::page::{fill_cards, CardContent, CardTemplate, HostPage, PageSections, Section, SectionKind};

/// Builds the content of a repository card
pub fn repo_card(username: &str, repo: &Repository) -> CardContent {
    CardContent::new()
        .slot("name", repo.name.as_str())
        .slot("url", repo.url.as_str())
        .slot("description", repo.description.as_str())
        .slot(
            "language_shield",
            format!("https://img.shields.io/github/languages/top/{username}/{}", repo.name),
        )
}

/// Builds the content of a gist card
pub fn gist_card(gist: &Gist) -> CardContent {
    CardContent::new()
        .slot("title", gist.file.filename.as_str())
        .slot("description", gist.description.as_str())
        .slot("url", gist.url.as_str())
        .slot("language", gist.file.language_class())
        .slot("code_src", gist.file.raw_url.clone().unwrap_or_default())
        .slot("code", gist.file.code.clone().unwrap_or_default())
}

/// Fetches the repositories to feature, in display order
pub async fn fetch_repos(client: &GithubClient, config: &PageConfig) -> Result<Vec<Repository>, FetchError> {
    match config.source {
        ApiSource::Rest => {
            let params = RepoListParams {
                per_page: Some(crate::config::MAX_PAGE_SIZE),
                ..Default::default()
            };
            let repos = github::list_user_repos(client, &config.username, &params).await?;
            Ok(repos
                .into_iter()
                .filter(|repo| config.repo_names.contains(&repo.name))
                .collect())
        }
        ApiSource::Graphql => {
            github::pinned_repositories(client, &config.username, config.pinned_limit).await
        }
    }
}

/// Fetches the gists to show, each with its preview text when available
pub async fn fetch_gists(client: &GithubClient, config: &PageConfig) -> Result<Vec<Gist>, FetchError> {
    match config.source {
        ApiSource::Rest => {
            let params = GistListParams {
                per_page: Some(config.gist_limit),
                ..Default::default()
            };
            let gists = github::list_user_gists(client, &config.username, &params).await?;
            Ok(github::load_gist_code(client, gists).await)
        }
        ApiSource::Graphql => github::recent_gists(client, &config.username, config.gist_limit).await,
    }
}

/// Number of repo cards to put up while loading
fn repo_card_count(config: &PageConfig) -> usize {
    match config.source {
        ApiSource::Rest => config.repo_names.len(),
        ApiSource::Graphql => config.pinned_limit as usize,
    }
}

pub async fn load_repos(client: &GithubClient, config: &PageConfig, template: &CardTemplate) -> Section {
    let cards = template.instantiate(repo_card_count(config), &config.animation);
    let mut section = Section::new(SectionKind::Repos, cards);

    match fetch_repos(client, config).await {
        Ok(repos) => {
            let report = fill_cards(&mut section, &repos, |repo| repo_card(&config.username, repo));
            info!(populated = report.populated, removed = report.removed, "repositories loaded");
        }
        Err(e) => {
            warn!(status = ?e.status(), error = ?e, "repositories failed to load");
            section.fail(&e);
        }
    }

    section
}

pub async fn load_gists(client: &GithubClient, config: &PageConfig, template: &CardTemplate) -> Section {
    let cards = template.instantiate(config.gist_limit as usize, &config.animation);
    let mut section = Section::new(SectionKind::Gists, cards);

    match fetch_gists(client, config).await {
        Ok(gists) => {
            let report = fill_cards(&mut section, &gists, gist_card);
            info!(populated = report.populated, removed = report.removed, "gists loaded");
        }
        Err(e) => {
            warn!(status = ?e.status(), error = ?e, "gists failed to load");
            section.fail(&e);
        }
    }

    section
}

/// Runs both flows concurrently and returns their sections
pub async fn load_page(client: &GithubClient, config: &PageConfig, page: &HostPage) -> PageSections {
    info!(username = %config.username, source = ?config.source, "loading page data");

    let (repos, gists) = tokio::join!(
        load_repos(client, config, page.repo_template()),
        load_gists(client, config, page.gist_template()),
    );

    PageSections { repos, gists }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><body>
<template id="repo-card-template"><div class="card {{state}}"><a href="{{url}}">{{name}}</a><img src="{{language_shield}}"></div></template>
<template id="gist-card-template"><div class="card {{state}}"><h5>{{title}}</h5><pre class="language-{{language}}" data-src="{{code_src}}">{{code}}</pre></div></template>
<div id="my-pinned-repos"></div><div id="pinned-repos-errors" hidden></div>
<div id="my-gists"></div><div id="gists-errors" hidden></div>
</body></html>"#;

    fn config_for(rest_base: String) -> PageConfig {
        PageConfig {
            username: "jens1101".to_string(),
            repo_names: vec!["SteamCMD-JS-Interface".to_string(), "mini-pomodoro".to_string()],
            api: ApiConfig {
                rest_base,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn gist_json(name: &str, raw_url: &str) -> serde_json::Value {
        json!({
            "description": format!("{name} snippet"),
            "html_url": format!("https://gist.github.com/{name}"),
            "files": { name: { "filename": name, "language": "Rust", "raw_url": raw_url } }
        })
    }

    #[test]
    fn test_repo_card_slots() {
        let repo = Repository {
            name: "mini-pomodoro".to_string(),
            description: "A tiny timer".to_string(),
            url: "https://github.com/jens1101/mini-pomodoro".to_string(),
        };
        let content = repo_card("jens1101", &repo);
        assert_eq!(content.get("name"), Some("mini-pomodoro"));
        assert_eq!(
            content.get("language_shield"),
            Some("https://img.shields.io/github/languages/top/jens1101/mini-pomodoro")
        );
    }

    #[tokio::test]
    async fn test_six_gist_cards_four_gists() {
        let server = MockServer::start().await;
        let gists: Vec<_> = (1..=4)
            .map(|i| gist_json(&format!("g{i}.rs"), &format!("{}/raw/g{i}.rs", server.uri())))
            .collect();
        Mock::given(method("GET"))
            .and(path("/users/jens1101/gists"))
            .and(query_param("per_page", "6"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(gists)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/raw/g2.rs"))
            .respond_with(ResponseTemplate::new(200).set_body_string("fn two() {}"))
            .mount(&server)
            .await;

        let config = config_for(server.uri());
        let client = GithubClient::new(&config.api, None).unwrap();
        let page = HostPage::parse(PAGE, &config.dom).unwrap();

        let section = load_gists(&client, &config, page.gist_template()).await;

        assert!(!section.is_hidden());
        assert!(section.alert().is_none());
        assert_eq!(section.cards().len(), 4);
        let titles: Vec<&str> = section
            .cards()
            .iter()
            .filter_map(|c| c.content().and_then(|c| c.get("title")))
            .collect();
        assert_eq!(titles, vec!["g1.rs", "g2.rs", "g3.rs", "g4.rs"]);

        // only g2's raw body was served; the others keep an empty preview
        let codes: Vec<&str> = section
            .cards()
            .iter()
            .filter_map(|c| c.content().and_then(|c| c.get("code")))
            .collect();
        assert_eq!(codes, vec!["", "fn two() {}", "", ""]);
    }

    #[tokio::test]
    async fn test_repos_are_filtered_by_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/jens1101/repos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "name": "dotfiles", "description": "", "html_url": "https://github.com/jens1101/dotfiles" },
                { "name": "mini-pomodoro", "description": "A tiny timer", "html_url": "https://github.com/jens1101/mini-pomodoro" }
            ])))
            .mount(&server)
            .await;

        let config = config_for(server.uri());
        let client = GithubClient::new(&config.api, None).unwrap();
        let page = HostPage::parse(PAGE, &config.dom).unwrap();

        let section = load_repos(&client, &config, page.repo_template()).await;

        // two cards were put up, one repo matched
        assert_eq!(section.cards().len(), 1);
        assert_eq!(
            section.cards()[0].content().and_then(|c| c.get("name")),
            Some("mini-pomodoro")
        );
    }

    #[tokio::test]
    async fn test_non_success_hides_only_that_section() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/jens1101/gists"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/jens1101/repos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "name": "SteamCMD-JS-Interface", "description": "wrapper", "html_url": "https://github.com/jens1101/SteamCMD-JS-Interface" }
            ])))
            .mount(&server)
            .await;

        let config = config_for(server.uri());
        let client = GithubClient::new(&config.api, None).unwrap();
        let page = HostPage::parse(PAGE, &config.dom).unwrap();

        let sections = load_page(&client, &config, &page).await;

        assert!(sections.gists.is_hidden());
        assert_eq!(sections.gists.alert(), Some("Could not retrieve gists"));
        assert!(!sections.repos.is_hidden());
        assert_eq!(sections.repos.populated_count(), 1);
        assert!(sections.any_failed());

        let html = page.render(&sections);
        assert!(html.contains(r#"<div id="my-gists" hidden>"#));
        assert!(html.contains(r#"<div id="gists-errors">Could not retrieve gists</div>"#));
        assert!(html.contains(r#"<div id="pinned-repos-errors" hidden></div>"#));
    }

    #[tokio::test]
    async fn test_network_failure_shows_default_gist_message() {
        // nothing listens on port 1
        let config = config_for("http://127.0.0.1:1/".to_string());
        let client = GithubClient::new(&config.api, None).unwrap();
        let page = HostPage::parse(PAGE, &config.dom).unwrap();

        let sections = load_page(&client, &config, &page).await;

        assert!(sections.gists.is_hidden());
        assert_eq!(sections.gists.alert(), Some("Could not retrieve gists"));
        assert!(sections.repos.is_hidden());
        assert_eq!(sections.repos.alert(), Some("Could not retrieve repositories"));
        // the loading cards stay behind the hidden container
        assert_eq!(sections.gists.cards().len(), 6);
        assert_eq!(sections.gists.populated_count(), 0);
    }

    #[tokio::test]
    async fn test_graphql_flows_use_their_limits() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({ "variables": { "login": "jens1101", "first": 3 } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "user": { "pinnedItems": { "edges": [
                    { "node": { "name": "mini-pomodoro", "description": "A tiny timer", "url": "https://github.com/jens1101/mini-pomodoro" } },
                    { "node": { "name": "SteamCMD-JS-Interface", "description": null, "url": "https://github.com/jens1101/SteamCMD-JS-Interface" } }
                ] } } }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({ "variables": { "login": "jens1101", "first": 4 } })))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = PageConfig {
            source: ApiSource::Graphql,
            token: Some("ghp_test".to_string()),
            pinned_limit: 3,
            gist_limit: 4,
            api: ApiConfig {
                graphql_endpoint: format!("{}/graphql", server.uri()),
                ..Default::default()
            },
            ..config_for(server.uri())
        };
        let client = GithubClient::new(&config.api, config.token.clone()).unwrap();
        let page = HostPage::parse(PAGE, &config.dom).unwrap();

        let sections = load_page(&client, &config, &page).await;

        // three pinned cards were put up, two repos came back
        assert!(!sections.repos.is_hidden());
        assert_eq!(sections.repos.cards().len(), 2);
        assert_eq!(sections.repos.populated_count(), 2);
        assert_eq!(
            sections.repos.cards()[1].content().and_then(|c| c.get("name")),
            Some("SteamCMD-JS-Interface")
        );

        assert!(sections.gists.is_hidden());
        assert_eq!(sections.gists.alert(), Some("Could not retrieve gists"));
        assert_eq!(sections.gists.cards().len(), 4);
    }
}
