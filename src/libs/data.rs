use std::{collections::HashMap, fs::File, io, path::Path};

use super::severity::Severity;

#[derive(serde::Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct PullversDataGitHub
{
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub token_env: Option<String>,
    pub base_uri: Option<String>,
}

#[derive(serde::Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct PullversData
{
    /// Replaces the built-in label table when present.
    pub labels: Option<HashMap<String, Severity>>,
    pub require_labels: bool,
    pub github: PullversDataGitHub,
}

#[derive(Debug, thiserror::Error)]
pub enum DataError
{
    #[error("failed to read {path}")]
    Read
    {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}")]
    Parse
    {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PullversData
{
    // Load
    pub fn load(path: &Path) -> Result<PullversData, DataError>
    {
        let display = path.display().to_string();
        let file = File::open(path).map_err(|source| DataError::Read { path: display.clone(), source })?;
        let reader = io::BufReader::new(file);
        serde_json::from_reader(reader).map_err(|source| DataError::Parse { path: display, source })
    }
}

#[test]
fn test_parse()
{
    let data: PullversData = serde_json::from_str(r#"
    {
        "labels": { "Breaking Change": "major", "Feature": "minor", "Chore": "none" },
        "require_labels": true,
        "github": { "owner": "foo", "repo": "bar", "token_env": "PULLVERS_TOKEN" }
    }"#).unwrap();

    let labels = data.labels.unwrap();
    assert_eq!(labels.len(), 3);
    assert_eq!(labels["Feature"], Severity::Minor);
    assert_eq!(labels["Chore"], Severity::None);
    assert!(data.require_labels);
    assert_eq!(data.github.owner.as_deref(), Some("foo"));
    assert_eq!(data.github.token_env.as_deref(), Some("PULLVERS_TOKEN"));
    assert_eq!(data.github.base_uri, None);
}

#[test]
fn test_parse_empty()
{
    let data: PullversData = serde_json::from_str("{}").unwrap();
    assert_eq!(data, PullversData::default());
    assert!(data.labels.is_none());
    assert!(!data.require_labels);
}

#[test]
fn test_parse_rejects_unknown_severity()
{
    let result = serde_json::from_str::<PullversData>(r#"{ "labels": { "Feature": "huge" } }"#);
    assert!(result.is_err());
}

#[test]
fn test_load()
{
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "require_labels": true, "labels": {{ "Patch": "patch" }} }}"#).unwrap();

    let data = PullversData::load(file.path()).unwrap();
    assert!(data.require_labels);
    assert_eq!(data.labels.unwrap()["Patch"], Severity::Patch);
}

#[test]
fn test_load_missing_file()
{
    let directory = tempfile::tempdir().unwrap();
    let result = PullversData::load(&directory.path().join(".pullvers.json"));
    assert!(matches!(result, Err(DataError::Read { .. })));
}

#[test]
fn test_load_invalid_json()
{
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();

    let result = PullversData::load(file.path());
    assert!(matches!(result, Err(DataError::Parse { .. })));
}
