use super::severity::Severity;

/// Any error a [`LabelFetcher`](crate::feature::pulls::LabelFetcher) reports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum Error
{
    /// The label fetcher failed; the batch was abandoned at `id`.
    #[error("error from label fetcher for pull request #{id}")]
    Fetch
    {
        id: u64,
        #[source]
        source: BoxError,
    },

    /// Every pull request, in ascending order, that has none of the configured labels.
    #[error("one or more pull requests have no configured labels: {ids:?}")]
    MissingLabels
    {
        ids: Vec<u64>,
    },

    #[error("could not parse semver from {version:?}")]
    MalformedVersion
    {
        version: String,
    },

    /// The version component a change would increment is already at its maximum.
    #[error("a {change} change overflows version {version:?}")]
    VersionOverflow
    {
        version: String,
        change: Severity,
    },
}

#[test]
fn test_fetch_error_keeps_source()
{
    use std::error::Error as _;

    let cause = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
    let error = Error::Fetch { id: 7, source: Box::new(cause) };

    assert_eq!(error.to_string(), "error from label fetcher for pull request #7");
    let source = error.source().expect("source is kept");
    assert_eq!(source.to_string(), "connection refused");
    assert!(source.downcast_ref::<std::io::Error>().is_some());
}

#[test]
fn test_display()
{
    let error = Error::MissingLabels { ids: vec![3, 4] };
    assert_eq!(error.to_string(), "one or more pull requests have no configured labels: [3, 4]");

    let error = Error::MalformedVersion { version: "limabeans".to_string() };
    assert_eq!(error.to_string(), "could not parse semver from \"limabeans\"");

    let error = Error::VersionOverflow { version: "1.2.18446744073709551615".to_string(), change: Severity::Patch };
    assert_eq!(error.to_string(), "a Patch change overflows version \"1.2.18446744073709551615\"");
}
