//! GitHub Gists API client.
//!
//! All requests authenticate with HTTP Basic auth (username plus personal
//! access token) and carry the headers GitHub's REST API expects. Responses
//! are checked for a success status before their bodies are parsed, so a
//! failed request always surfaces the server's own error text.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{FileEdit, FileEdits, Gist, GistResponse};

const API_ENDPOINT: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const ACCEPT: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!("gists/", env!("CARGO_PKG_VERSION"));

/// Layout for the `since` query parameter. The API accepts any ISO 8601
/// timestamp; sending UTC with a `Z` suffix keeps the parameter unambiguous.
const SINCE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Client for the gists endpoints of the GitHub REST API.
pub struct GistClient {
    client: Client,
    endpoint: String,
    username: String,
    token: String,
}

impl GistClient {
    /// Create a client for `api.github.com`, resolving the token from the
    /// first available source: the explicit value, a token file, the
    /// `GITHUB_TOKEN` or `GH_TOKEN` environment variables, or the gh CLI's
    /// saved credentials.
    pub fn new(username: &str, token: Option<String>, token_file: Option<&Path>) -> Result<Self> {
        let token = Self::resolve_token(token, token_file)?;
        Self::with_endpoint(username, &token, API_ENDPOINT)
    }

    /// Create a client against an explicit endpoint. Used directly by tests;
    /// `new` delegates here after resolving credentials.
    pub fn with_endpoint(username: &str, token: &str, endpoint: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            username: username.to_string(),
            token: token.to_string(),
        })
    }

    fn resolve_token(token: Option<String>, token_file: Option<&Path>) -> Result<String> {
        if let Some(token) = token {
            return Ok(token);
        }
        if let Some(path) = token_file {
            return Self::read_token_file(path);
        }
        for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
            if let Ok(value) = std::env::var(var) {
                if !value.is_empty() {
                    debug!("using token from {}", var);
                    return Ok(value);
                }
            }
        }
        Self::read_gh_token()
    }

    fn read_token_file(path: &Path) -> Result<String> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let token = contents.trim();
        if token.is_empty() {
            return Err(Error::validation(format!(
                "token file {} is empty",
                path.display()
            )));
        }
        Ok(token.to_string())
    }

    /// Read the token the gh CLI stores after `gh auth login`.
    fn read_gh_token() -> Result<String> {
        let config_path = Self::gh_config_path()?;
        if !config_path.exists() {
            return Err(Error::validation(format!(
                "no GitHub token found; pass --token, set GITHUB_TOKEN or run `gh auth login` (checked {})",
                config_path.display()
            )));
        }
        let contents = std::fs::read_to_string(&config_path).map_err(|source| Error::Io {
            path: config_path.clone(),
            source,
        })?;
        let hosts: serde_json::Value = serde_yaml::from_str(&contents).map_err(|e| {
            Error::validation(format!("could not parse {}: {e}", config_path.display()))
        })?;
        hosts
            .get("github.com")
            .and_then(|host| host.get("oauth_token"))
            .and_then(|token| token.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::validation(format!(
                    "no oauth_token for github.com in {}",
                    config_path.display()
                ))
            })
    }

    fn gh_config_path() -> Result<PathBuf> {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            if !xdg.is_empty() {
                return Ok(PathBuf::from(xdg).join("gh").join("hosts.yml"));
            }
        }
        dirs::home_dir()
            .map(|home| home.join(".config").join("gh").join("hosts.yml"))
            .ok_or_else(|| Error::validation("could not determine home directory"))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!("{} {}", method, path);
        self.client
            .request(method, format!("{}{}", self.endpoint, path))
            .basic_auth(&self.username, Some(&self.token))
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    /// Create a gist from in-memory file contents.
    ///
    /// `names` and `contents` are matched pairwise and must have equal
    /// lengths; nothing is sent when they do not. File order in the request
    /// follows the order of `names`.
    pub async fn create_gist(
        &self,
        names: &[String],
        contents: &[String],
        description: &str,
        public: bool,
    ) -> Result<Gist> {
        if names.len() != contents.len() {
            return Err(Error::validation(format!(
                "got {} names for {} contents; lengths must match",
                names.len(),
                contents.len()
            )));
        }
        let files: FileEdits = names
            .iter()
            .zip(contents)
            .map(|(name, content)| {
                (
                    name.clone(),
                    FileEdit::Add {
                        content: content.clone(),
                    },
                )
            })
            .collect();
        let body = CreateRequest {
            files,
            description,
            public,
        };
        let response = self
            .request(Method::POST, "/gists")
            .json(&body)
            .send()
            .await?;
        self.parse_gist(response).await
    }

    /// Create a gist from local files, named after their basenames.
    pub async fn create_gist_from_files(
        &self,
        paths: &[PathBuf],
        description: &str,
        public: bool,
    ) -> Result<Gist> {
        let mut names = Vec::with_capacity(paths.len());
        let mut contents = Vec::with_capacity(paths.len());
        for path in paths {
            names.push(basename(path)?);
            contents.push(read_file(path)?);
        }
        self.create_gist(&names, &contents, description, public)
            .await
    }

    /// List the authenticated user's gists, newest first.
    ///
    /// When `since` is given, only gists updated at or after that instant
    /// are returned. List responses omit file contents.
    pub async fn list_user_gists(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Gist>> {
        let mut request = self.request(Method::GET, &format!("/users/{}/gists", self.username));
        if let Some(since) = since {
            request = request.query(&[("since", since.format(SINCE_FORMAT).to_string())]);
        }
        let response = request.send().await?;
        let text = Self::success_body(response).await?;
        let raw: Vec<GistResponse> = serde_json::from_str(&text)
            .map_err(|e| Error::parse(format!("{e} | raw: {}", excerpt(&text))))?;
        raw.into_iter().map(Gist::from_response).collect()
    }

    /// Fetch a single gist, including file contents.
    pub async fn get_gist(&self, id: &str) -> Result<Gist> {
        require_id(id)?;
        let response = self
            .request(Method::GET, &format!("/gists/{id}"))
            .send()
            .await?;
        self.parse_gist(response).await
    }

    /// Edit a gist's files and/or description.
    ///
    /// An empty set of file edits counts as absent; at least one of `files`
    /// or `new_description` must be provided.
    pub async fn edit_gist(
        &self,
        id: &str,
        files: Option<FileEdits>,
        new_description: Option<&str>,
    ) -> Result<Gist> {
        require_id(id)?;
        let files = files.filter(|edits| !edits.is_empty());
        if files.is_none() && new_description.is_none() {
            return Err(Error::validation(
                "nothing to update; provide files or a new description",
            ));
        }
        let body = EditRequest {
            files,
            description: new_description,
        };
        let response = self
            .request(Method::PATCH, &format!("/gists/{id}"))
            .json(&body)
            .send()
            .await?;
        self.parse_gist(response).await
    }

    /// Edit a gist from local files.
    ///
    /// `to_add` uploads each path under its basename, `to_delete` removes
    /// files by name, and `to_modify` pairs an existing filename with a
    /// local path whose basename becomes the new name.
    pub async fn edit_gist_from_files(
        &self,
        id: &str,
        to_add: &[PathBuf],
        to_delete: &[String],
        to_modify: &[(String, PathBuf)],
        new_description: Option<&str>,
    ) -> Result<Gist> {
        let mut edits = FileEdits::new();
        for path in to_add {
            edits.insert(
                basename(path)?,
                FileEdit::Add {
                    content: read_file(path)?,
                },
            );
        }
        for name in to_delete {
            edits.insert(name.clone(), FileEdit::Delete);
        }
        for (old_name, path) in to_modify {
            edits.insert(
                old_name.clone(),
                FileEdit::Rename {
                    content: read_file(path)?,
                    filename: basename(path)?,
                },
            );
        }
        let files = if edits.is_empty() { None } else { Some(edits) };
        self.edit_gist(id, files, new_description).await
    }

    /// Delete a gist. Fails with [`Error::Api`] when the server refuses,
    /// including deletions of ids that do not exist.
    pub async fn delete_gist(&self, id: &str) -> Result<()> {
        require_id(id)?;
        let response = self
            .request(Method::DELETE, &format!("/gists/{id}"))
            .send()
            .await?;
        Self::success_body(response).await?;
        Ok(())
    }

    /// Return the user's existing gist whose filenames match `names`
    /// exactly, or create one from `names` and `contents` if none does.
    pub async fn get_or_create_gist(
        &self,
        names: &[String],
        contents: &[String],
        description: &str,
        public: bool,
    ) -> Result<Gist> {
        if names.len() != contents.len() {
            return Err(Error::validation(format!(
                "got {} names for {} contents; lengths must match",
                names.len(),
                contents.len()
            )));
        }
        let mut wanted: Vec<&str> = names.iter().map(String::as_str).collect();
        wanted.sort_unstable();
        for gist in self.list_user_gists(None).await? {
            let mut have: Vec<&str> = gist.files.iter().map(|f| f.filename.as_str()).collect();
            have.sort_unstable();
            if have == wanted {
                return Ok(gist);
            }
        }
        self.create_gist(names, contents, description, public).await
    }

    async fn parse_gist(&self, response: Response) -> Result<Gist> {
        let text = Self::success_body(response).await?;
        let raw: GistResponse = serde_json::from_str(&text)
            .map_err(|e| Error::parse(format!("{e} | raw: {}", excerpt(&text))))?;
        Gist::from_response(raw)
    }

    /// Return the response body, or [`Error::Api`] for non-success statuses.
    async fn success_body(response: Response) -> Result<String> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}

#[derive(Serialize)]
struct CreateRequest<'a> {
    files: FileEdits,
    description: &'a str,
    public: bool,
}

#[derive(Serialize)]
struct EditRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    files: Option<FileEdits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

fn basename(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| Error::validation(format!("{} has no usable filename", path.display())))
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn require_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::validation("gist id must not be empty"));
    }
    Ok(())
}

/// First 200 bytes of `text`, cut on a char boundary.
fn excerpt(text: &str) -> &str {
    let mut end = text.len().min(200);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn gh_config_path_points_at_hosts_yml() {
        let path = GistClient::gh_config_path().unwrap();
        assert!(path.ends_with("gh/hosts.yml"));
    }

    #[test]
    fn token_file_contents_are_trimmed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  ghp_s3kr1t  ").unwrap();
        let token = GistClient::read_token_file(file.path()).unwrap();
        assert_eq!(token, "ghp_s3kr1t");
    }

    #[test]
    fn empty_token_file_is_a_validation_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "   ").unwrap();
        let err = GistClient::read_token_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn missing_token_file_is_an_io_error() {
        let err = GistClient::read_token_file(Path::new("/nonexistent/token")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn basename_takes_the_last_component() {
        assert_eq!(basename(Path::new("/tmp/dir/script.py")).unwrap(), "script.py");
        assert_eq!(basename(Path::new("plain.txt")).unwrap(), "plain.txt");
        assert!(matches!(
            basename(Path::new("/")).unwrap_err(),
            Error::Validation(_)
        ));
    }

    #[test]
    fn blank_ids_are_rejected() {
        assert!(require_id("abc123").is_ok());
        assert!(matches!(require_id("").unwrap_err(), Error::Validation(_)));
        assert!(matches!(require_id("   ").unwrap_err(), Error::Validation(_)));
    }

    #[test]
    fn excerpt_respects_char_boundaries() {
        let short = "tiny";
        assert_eq!(excerpt(short), "tiny");
        // 100 two-byte chars put a char boundary right at the cutoff area.
        let long: String = "é".repeat(150);
        let cut = excerpt(&long);
        assert!(cut.len() <= 200);
        assert!(long.starts_with(cut));
    }
}
