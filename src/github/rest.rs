// src/github/rest.rs
// =============================================================================
// GitHub REST v3 endpoints used by the page.
//
// - GET users/{username}/repos  -> Vec<Repository>
// - GET users/{username}/gists  -> Vec<Gist>
// - GET {raw_url}               -> the body of a gist's first file
//
// The REST API needs no token, but it does not know which repos are pinned,
// so the caller filters the repo list by name.
// =============================================================================

use futures::future::join_all;
use serde::de::{Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use tracing::warn;

use super::client::{GithubClient, SearchParams};
use super::error::FetchError;
use super::model::{Gist, GistFile, Repository};

pub const REPOS_ERROR: &str = "Could not retrieve repositories";
pub const GISTS_ERROR: &str = "Could not retrieve gists";

/// Which of the user's repositories to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RepoType {
    All,
    Owner,
    Member,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RepoSort {
    Created,
    Updated,
    Pushed,
    #[value(name = "full_name")]
    FullName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for RepoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RepoType::All => "all",
            RepoType::Owner => "owner",
            RepoType::Member => "member",
        })
    }
}

impl fmt::Display for RepoSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RepoSort::Created => "created",
            RepoSort::Updated => "updated",
            RepoSort::Pushed => "pushed",
            RepoSort::FullName => "full_name",
        })
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        })
    }
}

/// Query parameters of `users/{username}/repos`. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoListParams {
    pub kind: Option<RepoType>,
    pub sort: Option<RepoSort>,
    pub direction: Option<SortDirection>,
    /// Results per page (max 100)
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

impl RepoListParams {
    fn search_params(&self) -> SearchParams {
        SearchParams::new()
            .with("type", self.kind)
            .with("sort", self.sort)
            .with("direction", self.direction)
            .with("per_page", self.per_page)
            .with("page", self.page)
    }
}

/// Query parameters of `users/{username}/gists`. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GistListParams {
    /// Only gists updated after this ISO 8601 timestamp
    pub since: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

impl GistListParams {
    fn search_params(&self) -> SearchParams {
        SearchParams::new()
            .with("since", self.since.as_deref())
            .with("per_page", self.per_page)
            .with("page", self.page)
    }
}

// Raw payloads: only the fields we read are declared, serde ignores the rest

#[derive(Debug, Deserialize)]
struct RestRepository {
    name: String,
    description: Option<String>,
    html_url: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RestGist {
    description: Option<String>,
    html_url: Option<String>,
    url: Option<String>,
    // `files` is keyed by filename; only the first entry is kept
    #[serde(default, deserialize_with = "first_file")]
    files: Option<RestGistFile>,
}

#[derive(Debug, Deserialize)]
struct RestGistFile {
    filename: String,
    language: Option<String>,
    raw_url: Option<String>,
}

// Keeps the first value of a JSON object in document order, skipping the rest
fn first_file<'de, D>(deserializer: D) -> Result<Option<RestGistFile>, D::Error>
where
    D: Deserializer<'de>,
{
    struct FirstEntry;

    impl<'de> Visitor<'de> for FirstEntry {
        type Value = Option<RestGistFile>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of gist files")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let first = map
                .next_entry::<IgnoredAny, RestGistFile>()?
                .map(|(_, file)| file);
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(first)
        }
    }

    deserializer.deserialize_map(FirstEntry)
}

fn map_repository(raw: RestRepository) -> Repository {
    Repository {
        name: raw.name,
        description: raw.description.unwrap_or_default(),
        url: raw.html_url.or(raw.url).unwrap_or_default(),
    }
}

// A gist without files has nothing to preview and is dropped
fn map_gist(raw: RestGist) -> Option<Gist> {
    let file = raw.files?;
    Some(Gist {
        description: raw.description.unwrap_or_default(),
        url: raw.html_url.or(raw.url).unwrap_or_default(),
        file: GistFile {
            filename: file.filename,
            language: file.language,
            raw_url: file.raw_url,
            code: None,
        },
    })
}

/// Lists the public repositories of a user
pub async fn list_user_repos(
    client: &GithubClient,
    username: &str,
    params: &RepoListParams,
) -> Result<Vec<Repository>, FetchError> {
    let raw: Vec<RestRepository> = client
        .rest_get(
            &format!("users/{username}/repos"),
            &params.search_params(),
            Some(REPOS_ERROR),
        )
        .await?;

    Ok(raw.into_iter().map(map_repository).collect())
}

/// Lists the public gists of a user, newest first
pub async fn list_user_gists(
    client: &GithubClient,
    username: &str,
    params: &GistListParams,
) -> Result<Vec<Gist>, FetchError> {
    let raw: Vec<RestGist> = client
        .rest_get(
            &format!("users/{username}/gists"),
            &params.search_params(),
            Some(GISTS_ERROR),
        )
        .await?;

    Ok(raw.into_iter().filter_map(map_gist).collect())
}

/// Downloads the body of every gist's first file concurrently.
///
/// A failed download only costs that gist its preview: `code` stays `None`
/// and the card falls back to the raw URL. Order is preserved.
pub async fn load_gist_code(client: &GithubClient, gists: Vec<Gist>) -> Vec<Gist> {
    let downloads = gists.into_iter().map(|mut gist| async move {
        if let Some(raw_url) = gist.file.raw_url.clone() {
            match client.fetch_raw(&raw_url).await {
                Ok(code) => gist.file.code = Some(code),
                Err(e) => warn!(url = %raw_url, error = ?e, "could not load gist preview"),
            }
        }
        gist
    });

    join_all(downloads).await
}
