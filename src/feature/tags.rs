use log::{debug, info};

use crate::libs::version::SemanticVersion;

/// The highest version any tag in the repository names, by semver precedence.
///
/// Tags that are not versions (`nightly`, `release-candidate`, ...) are skipped.
pub fn latest_version(repository: &git2::Repository) -> Result<Option<SemanticVersion>, git2::Error>
{
    let tags = repository.tag_names(None)?;

    let mut latest: Option<SemanticVersion> = None;
    for tag_name in tags.iter().flatten()
    {
        let version = match SemanticVersion::parse(tag_name)
        {
            Ok(version) => version,
            Err(_) =>
            {
                debug!("Tag: {} - not a version", tag_name);
                continue;
            }
        };

        debug!("Tag: {} - {}", tag_name, version.version());
        if latest.as_ref().map_or(true, |latest| version.version() > latest.version())
        {
            latest = Some(version);
        }
    }

    if let Some(latest) = &latest
    {
        info!("Latest Tag: {}", latest);
    }
    Ok(latest)
}

#[cfg(test)]
fn repository_with_tags(tags: &[&str]) -> (tempfile::TempDir, git2::Repository)
{
    let directory = tempfile::tempdir().unwrap();
    let repository = git2::Repository::init(directory.path()).unwrap();
    {
        let signature = git2::Signature::now("Name", "test@email.com").unwrap();
        let tree_id = repository.index().unwrap().write_tree().unwrap();
        let tree = repository.find_tree(tree_id).unwrap();
        let commit_id = repository.commit(Some("HEAD"), &signature, &signature, "Initial Commit", &tree, &[]).unwrap();
        let commit = repository.find_object(commit_id, None).unwrap();

        for (index, tag) in tags.iter().enumerate()
        {
            // Mix annotated and lightweight tags.
            if index % 2 == 0
            {
                repository.tag(tag, &commit, &signature, &format!("Release: {}", tag), false).unwrap();
            }
            else
            {
                repository.tag_lightweight(tag, &commit, false).unwrap();
            }
        }
    }
    (directory, repository)
}

#[test]
fn test_latest_version()
{
    let (_directory, repository) = repository_with_tags(&["v1.2.3", "v1.10.0", "nightly", "v1.9.9", "v1.10.0-rc.1"]);

    let latest = latest_version(&repository).unwrap().unwrap();
    assert_eq!(latest.to_string(), "v1.10.0");
}

#[test]
fn test_latest_version_without_prefix()
{
    let (_directory, repository) = repository_with_tags(&["0.1.0", "0.2", "release"]);

    let latest = latest_version(&repository).unwrap().unwrap();
    assert_eq!(latest.to_string(), "0.2");
}

#[test]
fn test_latest_version_no_tags()
{
    let (_directory, repository) = repository_with_tags(&["nightly"]);
    assert!(latest_version(&repository).unwrap().is_none());

    let (_directory, repository) = repository_with_tags(&[]);
    assert!(latest_version(&repository).unwrap().is_none());
}
