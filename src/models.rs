//! Gist data model.
//!
//! The API returns gists as JSON objects keyed by filename. [`GistResponse`]
//! mirrors that wire shape loosely; [`Gist`] is the typed form handed to
//! callers, built through [`Gist::from_response`] so that timestamps are
//! parsed and the embed URL is derived exactly once.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Error, Result};

/// Timestamp layout used for human-readable output.
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single file within a gist, as returned by the API.
///
/// List responses omit `content`; fetching a single gist includes it unless
/// the file is large enough that the API truncates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GistFile {
    pub filename: String,
    #[serde(rename = "type")]
    pub file_type: Option<String>,
    pub language: Option<String>,
    pub raw_url: Option<String>,
    pub size: u64,
    #[serde(default)]
    pub truncated: bool,
    pub content: Option<String>,
}

/// The account that owns a gist.
///
/// Only `login` is required; the remaining fields default so that trimmed
/// payloads still deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GistOwner {
    pub login: String,
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub node_id: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(rename = "type", default)]
    pub account_type: String,
    #[serde(default)]
    pub site_admin: bool,
}

/// Raw gist payload as deserialized from the API.
///
/// `files` stays an untyped map here; [`Gist::from_response`] converts each
/// entry and reports which filename failed if one does not parse.
#[derive(Debug, Deserialize)]
pub struct GistResponse {
    pub id: String,
    #[serde(default)]
    pub node_id: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub git_pull_url: String,
    #[serde(default)]
    pub git_push_url: String,
    #[serde(default)]
    pub commits_url: String,
    #[serde(default)]
    pub forks_url: String,
    #[serde(default)]
    pub comments_url: String,
    #[serde(default)]
    pub public: bool,
    pub created_at: String,
    pub updated_at: String,
    pub description: Option<String>,
    #[serde(default)]
    pub comments: u64,
    pub owner: GistOwner,
    pub files: serde_json::Map<String, Value>,
}

/// A gist with parsed timestamps and typed files.
///
/// Values are only constructed through [`Gist::from_response`], which
/// guarantees at least one file and valid RFC 3339 timestamps.
#[derive(Debug, Clone, Serialize)]
pub struct Gist {
    pub id: String,
    pub node_id: String,
    pub html_url: String,
    pub git_pull_url: String,
    pub git_push_url: String,
    pub commits_url: String,
    pub forks_url: String,
    pub comments_url: String,
    pub public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub description: Option<String>,
    pub comments: u64,
    pub owner: GistOwner,
    /// Files in the order the server sent them.
    pub files: Vec<GistFile>,
    /// URL of the `<script>` embed for this gist.
    pub script_url: String,
}

impl Gist {
    /// Convert a raw API payload into a typed gist.
    ///
    /// Fails with [`Error::Parse`] when a timestamp is not RFC 3339, a file
    /// entry does not match [`GistFile`], or the gist has no files at all.
    pub fn from_response(raw: GistResponse) -> Result<Self> {
        let created_at = parse_timestamp("created_at", &raw.created_at)?;
        let updated_at = parse_timestamp("updated_at", &raw.updated_at)?;

        let mut files = Vec::with_capacity(raw.files.len());
        for (name, value) in raw.files {
            let file: GistFile = serde_json::from_value(value)
                .map_err(|e| Error::parse(format!("file `{name}`: {e}")))?;
            files.push(file);
        }
        if files.is_empty() {
            return Err(Error::parse(format!("gist `{}` has no files", raw.id)));
        }

        let script_url = format!("https://gist.github.com/{}/{}.js", raw.owner.login, raw.id);

        Ok(Self {
            id: raw.id,
            node_id: raw.node_id,
            html_url: raw.html_url,
            git_pull_url: raw.git_pull_url,
            git_push_url: raw.git_push_url,
            commits_url: raw.commits_url,
            forks_url: raw.forks_url,
            comments_url: raw.comments_url,
            public: raw.public,
            created_at,
            updated_at,
            description: raw.description,
            comments: raw.comments,
            owner: raw.owner,
            files,
            script_url,
        })
    }

    /// Multi-line human-readable summary of this gist.
    pub fn human_summary(&self, show_content: bool) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}'s GitHub Gist: {}\n", self.owner.login, self.id));
        if let Some(description) = &self.description {
            out.push_str(&format!("'{description}'\n"));
        }
        out.push_str(&format!(
            "Created: {}\n",
            self.created_at.format(DISPLAY_FORMAT)
        ));
        out.push_str(&format!(
            "Updated: {}\n",
            self.updated_at.format(DISPLAY_FORMAT)
        ));
        out.push_str(&format!("Embed: {}\n", self.script_url));
        out.push_str("File | Size (chars)\n");
        for file in &self.files {
            out.push_str(&format!("{} | {}\n", file.filename, file.size));
            if show_content {
                if let Some(content) = &file.content {
                    out.push_str(content);
                    if !content.ends_with('\n') {
                        out.push('\n');
                    }
                }
            }
        }
        out
    }

    /// JSON summary of this gist, with per-file entries keyed by filename.
    pub fn json_summary(&self, show_content: bool) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("gist_id".into(), Value::String(self.id.clone()));
        map.insert("username".into(), Value::String(self.owner.login.clone()));
        map.insert(
            "created".into(),
            Value::String(self.created_at.format(DISPLAY_FORMAT).to_string()),
        );
        map.insert(
            "updated".into(),
            Value::String(self.updated_at.format(DISPLAY_FORMAT).to_string()),
        );
        map.insert("embed_url".into(), Value::String(self.script_url.clone()));
        for file in &self.files {
            let mut entry = serde_json::Map::new();
            entry.insert("filename".into(), Value::String(file.filename.clone()));
            entry.insert("size".into(), Value::Number(file.size.into()));
            if show_content {
                if let Some(content) = &file.content {
                    entry.insert("content".into(), Value::String(content.clone()));
                }
            }
            map.insert(file.filename.clone(), Value::Object(entry));
        }
        Value::Object(map)
    }

    /// Print this gist to stdout, either as JSON or human-readable text.
    pub fn describe(&self, as_json: bool, show_content: bool) {
        if as_json {
            println!("{}", self.json_summary(show_content));
        } else {
            // Trailing newline separates gists in list output.
            println!("{}", self.human_summary(show_content));
        }
    }
}

fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::parse(format!("bad `{field}` timestamp `{value}`: {e}")))
}

/// One edit to a file within a gist.
///
/// Serializes to the exact shapes the PATCH endpoint expects: content only
/// for updates, content plus filename for renames, and `null` for deletions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEdit {
    /// Create the file, or replace its content if it already exists.
    Add { content: String },
    /// Replace the file's content and rename it.
    Rename { content: String, filename: String },
    /// Remove the file from the gist.
    Delete,
}

impl Serialize for FileEdit {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FileEdit::Add { content } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("content", content)?;
                map.end()
            }
            FileEdit::Rename { content, filename } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("content", content)?;
                map.serialize_entry("filename", filename)?;
                map.end()
            }
            FileEdit::Delete => serializer.serialize_none(),
        }
    }
}

/// Filename-keyed edits, serialized in insertion order.
///
/// The API keys request files by name, so this acts as a small ordered map:
/// inserting an existing filename replaces the edit in place rather than
/// moving it to the back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileEdits {
    entries: Vec<(String, FileEdit)>,
}

impl FileEdits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an edit, replacing any existing edit for the same filename.
    pub fn insert(&mut self, filename: impl Into<String>, edit: FileEdit) {
        let filename = filename.into();
        if let Some(existing) = self.entries.iter_mut().find(|(name, _)| *name == filename) {
            existing.1 = edit;
        } else {
            self.entries.push((filename, edit));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileEdit)> {
        self.entries.iter().map(|(name, edit)| (name.as_str(), edit))
    }
}

impl Serialize for FileEdits {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, edit) in &self.entries {
            map.serialize_entry(name, edit)?;
        }
        map.end()
    }
}

impl FromIterator<(String, FileEdit)> for FileEdits {
    fn from_iter<I: IntoIterator<Item = (String, FileEdit)>>(iter: I) -> Self {
        let mut edits = Self::new();
        for (name, edit) in iter {
            edits.insert(name, edit);
        }
        edits
    }
}
