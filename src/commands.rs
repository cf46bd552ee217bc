//! Handlers behind each CLI subcommand.
//!
//! Each handler drives the client and prints results; argument parsing and
//! credential resolution happen before these are called.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::api::GistClient;

/// List the user's gists, newest first.
pub async fn ls(
    client: &GistClient,
    since: Option<DateTime<Utc>>,
    as_json: bool,
    show_content: bool,
) -> anyhow::Result<()> {
    let gists = client.list_user_gists(since).await?;
    for gist in &gists {
        gist.describe(as_json, show_content);
    }
    Ok(())
}

/// Fetch one gist and print it.
pub async fn get(
    client: &GistClient,
    id: &str,
    as_json: bool,
    show_content: bool,
) -> anyhow::Result<()> {
    let gist = client.get_gist(id).await?;
    gist.describe(as_json, show_content);
    Ok(())
}

/// Create a gist from local files and print the result.
pub async fn create(
    client: &GistClient,
    files: &[PathBuf],
    description: &str,
    public: bool,
    as_json: bool,
    show_content: bool,
) -> anyhow::Result<()> {
    let gist = client.create_gist_from_files(files, description, public).await?;
    gist.describe(as_json, show_content);
    Ok(())
}

/// Apply additions, deletions, renames and a description change to a gist.
pub async fn update(
    client: &GistClient,
    id: &str,
    add: &[PathBuf],
    delete: &[String],
    modify: &[String],
    description: Option<&str>,
    as_json: bool,
    show_content: bool,
) -> anyhow::Result<()> {
    let to_modify = parse_modify_specs(modify)?;
    let gist = client
        .edit_gist_from_files(id, add, delete, &to_modify, description)
        .await?;
    gist.describe(as_json, show_content);
    Ok(())
}

/// Delete a gist.
pub async fn delete(client: &GistClient, id: &str) -> anyhow::Result<()> {
    client.delete_gist(id).await?;
    println!("Deleted gist: {id}");
    Ok(())
}

/// Split `OLD_NAME=NEW_FILE` specs into (existing filename, local path) pairs.
pub fn parse_modify_specs(specs: &[String]) -> anyhow::Result<Vec<(String, PathBuf)>> {
    let mut pairs = Vec::with_capacity(specs.len());
    for spec in specs {
        match spec.split_once('=') {
            Some((old_name, new_file)) if !old_name.is_empty() && !new_file.is_empty() => {
                pairs.push((old_name.to_string(), PathBuf::from(new_file)));
            }
            _ => anyhow::bail!("invalid modify spec `{spec}`, expected OLD_NAME=NEW_FILE"),
        }
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modify_specs_split_on_the_first_equals() {
        let pairs = parse_modify_specs(&[
            "old_name.py=snippets/new_name.py".to_string(),
            "notes.md=docs/notes=v2.md".to_string(),
        ])
        .unwrap();
        assert_eq!(
            pairs,
            vec![
                ("old_name.py".to_string(), PathBuf::from("snippets/new_name.py")),
                ("notes.md".to_string(), PathBuf::from("docs/notes=v2.md")),
            ]
        );
    }

    #[test]
    fn modify_specs_without_equals_are_rejected() {
        let err = parse_modify_specs(&["just_a_name.py".to_string()]).unwrap_err();
        assert!(err.to_string().contains("just_a_name.py"));
    }

    #[test]
    fn modify_specs_with_empty_halves_are_rejected() {
        assert!(parse_modify_specs(&["=path.py".to_string()]).is_err());
        assert!(parse_modify_specs(&["old.py=".to_string()]).is_err());
    }

    #[test]
    fn empty_spec_list_yields_no_pairs() {
        assert!(parse_modify_specs(&[]).unwrap().is_empty());
    }
}
