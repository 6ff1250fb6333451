// src/github/graphql.rs
// =============================================================================
// GitHub GraphQL v4 queries used by the page.
//
// Unlike REST, GraphQL knows which repositories the user pinned on their
// profile, and it can return a gist file's text in the same response, so no
// per-file downloads are needed. It always requires a token.
//
// Response shape:
//   { data: { user: { pinnedItems | gists: { edges: [{ node: {...} }] } } } }
// =============================================================================

use serde::Deserialize;
use serde_json::json;

use super::client::GithubClient;
use super::error::FetchError;
use super::model::{Gist, GistFile, Repository};
use super::rest::{GISTS_ERROR, REPOS_ERROR};

const PINNED_REPOSITORIES_QUERY: &str = r#"
query PinnedRepositories($login: String!, $first: Int!) {
  user(login: $login) {
    pinnedItems(first: $first, types: REPOSITORY) {
      edges {
        node {
          ... on Repository {
            name
            description
            url
          }
        }
      }
    }
  }
}
"#;

const RECENT_GISTS_QUERY: &str = r#"
query RecentGists($login: String!, $first: Int!) {
  user(login: $login) {
    gists(first: $first, privacy: PUBLIC, orderBy: { field: UPDATED_AT, direction: DESC }) {
      edges {
        node {
          description
          url
          files {
            name
            language {
              name
            }
            text
          }
        }
      }
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
struct UserData<T> {
    user: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PinnedUser {
    pinned_items: Connection<GraphqlRepository>,
}

#[derive(Debug, Deserialize)]
struct GistsUser {
    gists: Connection<GraphqlGist>,
}

#[derive(Debug, Deserialize)]
struct Connection<T> {
    #[serde(default = "Vec::new")]
    edges: Vec<Edge<T>>,
}

#[derive(Debug, Deserialize)]
struct Edge<T> {
    node: Option<T>,
}

#[derive(Debug, Deserialize)]
struct GraphqlRepository {
    name: String,
    description: Option<String>,
    url: String,
}

#[derive(Debug, Deserialize)]
struct GraphqlGist {
    description: Option<String>,
    url: String,
    #[serde(default)]
    files: Vec<GraphqlGistFile>,
}

#[derive(Debug, Deserialize)]
struct GraphqlGistFile {
    name: Option<String>,
    language: Option<GraphqlLanguage>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphqlLanguage {
    name: String,
}

impl<T> Connection<T> {
    fn into_nodes(self) -> impl Iterator<Item = T> {
        self.edges.into_iter().filter_map(|edge| edge.node)
    }
}

fn map_repository(raw: GraphqlRepository) -> Repository {
    Repository {
        name: raw.name,
        description: raw.description.unwrap_or_default(),
        url: raw.url,
    }
}

fn map_gist(raw: GraphqlGist) -> Option<Gist> {
    let file = raw.files.into_iter().next()?;
    Some(Gist {
        description: raw.description.unwrap_or_default(),
        url: raw.url,
        file: GistFile {
            filename: file.name.unwrap_or_default(),
            language: file.language.map(|l| l.name),
            raw_url: None,
            code: file.text,
        },
    })
}

// A null user means the login does not exist
fn user_or_error<T>(data: UserData<T>, message: &str) -> Result<T, FetchError> {
    data.user.ok_or_else(|| FetchError::Api {
        message: message.to_string(),
        errors: vec!["user not found".to_string()],
    })
}

/// The repositories pinned on a user's profile, in profile order
pub async fn pinned_repositories(
    client: &GithubClient,
    username: &str,
    first: u32,
) -> Result<Vec<Repository>, FetchError> {
    let data: UserData<PinnedUser> = client
        .graphql(
            PINNED_REPOSITORIES_QUERY,
            json!({ "login": username, "first": first }),
            Some(REPOS_ERROR),
        )
        .await?;

    let user = user_or_error(data, REPOS_ERROR)?;
    Ok(user.pinned_items.into_nodes().map(map_repository).collect())
}

/// A user's most recently updated public gists, with file text included
pub async fn recent_gists(
    client: &GithubClient,
    username: &str,
    first: u32,
) -> Result<Vec<Gist>, FetchError> {
    let data: UserData<GistsUser> = client
        .graphql(
            RECENT_GISTS_QUERY,
            json!({ "login": username, "first": first }),
            Some(GISTS_ERROR),
        )
        .await?;

    let user = user_or_error(data, GISTS_ERROR)?;
    Ok(user.gists.into_nodes().filter_map(map_gist).collect())
}
