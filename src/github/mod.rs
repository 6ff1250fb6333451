// src/github/mod.rs
// =============================================================================
// This module fetches the page data from GitHub.
//
// Submodules:
// - client: shared reqwest client, REST GET / GraphQL POST, status checks
// - rest: users/{username}/repos and users/{username}/gists (v3)
// - graphql: pinned items and recent gists (v4, needs a token)
// - model: the display records every endpoint is mapped into
// - error: FetchError, the one way a fetch can fail
// =============================================================================

mod client;
mod error;
mod graphql;
mod model;
mod rest;

pub use client::GithubClient;
pub use error::FetchError;
pub use graphql::{pinned_repositories, recent_gists};
pub use model::{Gist, Repository};
pub use rest::{
    list_user_gists, list_user_repos, load_gist_code, GistListParams, RepoListParams, RepoSort,
    RepoType, SortDirection,
};
