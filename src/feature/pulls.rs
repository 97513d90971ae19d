use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::libs::{error::{BoxError, Error}, labels::{normalize, LabelTable}, severity::Severity, version};

/// Normalized labels of every pull request in a release, keyed by pull request number.
pub type Batch = BTreeMap<u64, Vec<String>>;

/// Fetches the labels of a pull request from GitHub (or wherever).
#[cfg_attr(test, mockall::automock)]
pub trait LabelFetcher
{
    fn fetch_labels(&self, id: u64) -> Result<Vec<String>, BoxError>;
}

impl<F: LabelFetcher + ?Sized> LabelFetcher for Box<F>
{
    fn fetch_labels(&self, id: u64) -> Result<Vec<String>, BoxError>
    {
        (**self).fetch_labels(id)
    }
}

/// Everything needed to turn a set of pull requests into a version change.
pub struct Config<F: LabelFetcher>
{
    labels: LabelTable,
    require_labels: bool,
    fetcher: F,
}

impl<F: LabelFetcher> Config<F>
{
    // Ctor
    pub fn new(fetcher: F) -> Config<F>
    {
        Config { labels: LabelTable::default(), require_labels: false, fetcher }
    }

    pub fn with_labels(mut self, labels: LabelTable) -> Config<F>
    {
        self.labels = labels;
        self
    }

    pub fn require_labels(mut self, require_labels: bool) -> Config<F>
    {
        self.require_labels = require_labels;
        self
    }

    pub fn labels(&self) -> &LabelTable
    {
        &self.labels
    }

    /// Fetches and normalizes the labels of every requested pull request.
    ///
    /// Stops at the first fetch failure; nothing fetched so far is returned.
    pub fn fetch_batch(&self, ids: &[u64]) -> Result<Batch, Error>
    {
        let mut batch = Batch::new();
        for &id in ids
        {
            if batch.contains_key(&id)
            {
                continue;
            }

            let labels = self.fetcher.fetch_labels(id).map_err(|source| Error::Fetch { id, source })?;
            debug!("Pull Request: #{} - {:?}", id, labels);
            batch.insert(id, normalize(labels));
        }
        Ok(batch)
    }

    /// The greatest change required by any of the given pull requests.
    pub fn compute_severity(&self, ids: &[u64]) -> Result<Severity, Error>
    {
        let batch = self.fetch_batch(ids)?;
        validate(&batch, &self.labels, self.require_labels)?;

        let severity = aggregate(batch.values().map(Vec::as_slice), &self.labels);
        info!("Version Change: {} ({} pull requests)", severity, batch.len());
        Ok(severity)
    }

    /// The version to release after `previous` once the given pull requests are included.
    pub fn next_version(&self, previous: &str, ids: &[u64]) -> Result<String, Error>
    {
        let severity = self.compute_severity(ids)?;
        let next = version::bump(previous, severity)?;
        info!("Next Version: {} -> {}", previous, next);
        Ok(next)
    }
}

/// Fails with every pull request that has no configured label, when labels are required.
pub fn validate(batch: &Batch, labels: &LabelTable, require_labels: bool) -> Result<(), Error>
{
    if !require_labels
    {
        return Ok(());
    }

    // BTreeMap iterates in ascending pull request order.
    let ids: Vec<u64> = batch
        .iter()
        .filter(|(_, pull_labels)| !labels.contains_any(pull_labels.as_slice()))
        .map(|(id, _)| *id)
        .collect();

    if ids.is_empty()
    {
        return Ok(());
    }

    warn!("Pull Requests missing a configured label: {:?}", ids);
    Err(Error::MissingLabels { ids })
}

/// Greatest severity across the label sets of several pull requests.
pub fn aggregate<'a, I>(label_sets: I, labels: &LabelTable) -> Severity
where
    I: IntoIterator<Item = &'a [String]>,
{
    label_sets
        .into_iter()
        .fold(Severity::None, |change, pull_labels| labels.max_severity(pull_labels).max(change))
}

#[cfg(test)]
fn fetcher(responses: Vec<(u64, Vec<&str>)>) -> MockLabelFetcher
{
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();

    let mut fetcher = MockLabelFetcher::new();
    for (id, labels) in responses
    {
        let labels: Vec<String> = labels.into_iter().map(String::from).collect();
        fetcher
            .expect_fetch_labels()
            .with(mockall::predicate::eq(id))
            .times(1)
            .returning(move |_| Ok(labels.clone()));
    }
    fetcher
}

#[cfg(test)]
fn batch(pulls: Vec<(u64, Vec<&str>)>) -> Batch
{
    pulls
        .into_iter()
        .map(|(id, labels)| (id, normalize(labels.into_iter().map(String::from).collect())))
        .collect()
}

#[test]
fn test_fetch_batch()
{
    let config = Config::new(fetcher(vec![
        (1, vec!["foo", "bar"]),
        (2, vec!["Baz", "QUX"]),
        (3, vec![]),
    ]));

    let got = config.fetch_batch(&[1, 2, 3]).unwrap();
    assert_eq!(got, batch(vec![(1, vec!["foo", "bar"]), (2, vec!["baz", "qux"]), (3, vec![])]));
}

#[test]
fn test_fetch_batch_fetches_duplicates_once()
{
    let config = Config::new(fetcher(vec![(5, vec!["Patch"])]));

    let got = config.fetch_batch(&[5, 5, 5]).unwrap();
    assert_eq!(got.len(), 1);
    assert_eq!(got[&5], vec!["patch"]);
}

#[test]
fn test_fetch_batch_error()
{
    let mut fetcher = fetcher(vec![(1, vec!["foo", "bar"])]);
    fetcher
        .expect_fetch_labels()
        .with(mockall::predicate::eq(2))
        .times(1)
        .returning(|_| Err("pull request not found".into()));
    fetcher.expect_fetch_labels().with(mockall::predicate::eq(3)).never();
    let config = Config::new(fetcher);

    match config.fetch_batch(&[1, 2, 3])
    {
        Err(Error::Fetch { id, source }) =>
        {
            assert_eq!(id, 2);
            assert_eq!(source.to_string(), "pull request not found");
        }
        other => panic!("expected a fetch error, got {:?}", other),
    }
}

#[test]
fn test_validate()
{
    let labels = LabelTable::default();
    let pulls = batch(vec![
        (1, vec!["foo", "bar", "minor change"]),
        (2, vec!["Baz", "QUX", "Patch"]),
        (3, vec![]),
        (4, vec!["a"]),
    ]);

    match validate(&pulls, &labels, true)
    {
        Err(Error::MissingLabels { ids }) => assert_eq!(ids, vec![3, 4]),
        other => panic!("expected missing labels, got {:?}", other),
    }
    assert!(validate(&pulls, &labels, false).is_ok());
}

#[test]
fn test_validate_accepts_none_severity_label()
{
    let pulls = batch(vec![(1, vec!["Non-Production Change"]), (2, vec!["docs", "NON-PRODUCTION CHANGE"])]);
    assert!(validate(&pulls, &LabelTable::default(), true).is_ok());
}

#[test]
fn test_validate_empty_batch()
{
    assert!(validate(&Batch::new(), &LabelTable::default(), true).is_ok());
}

#[test]
fn test_aggregate()
{
    let labels = LabelTable::default();
    let pulls = batch(vec![
        (1, vec!["foo", "bar", "minor change"]),
        (2, vec!["Baz", "QUX", "Patch"]),
        (3, vec![]),
    ]);

    assert_eq!(aggregate(pulls.values().map(Vec::as_slice), &labels), Severity::Minor);
    assert_eq!(aggregate(pulls.values().rev().map(Vec::as_slice), &labels), Severity::Minor);
    assert_eq!(aggregate(std::iter::empty(), &labels), Severity::None);
}

#[test]
fn test_compute_severity_no_labels_required()
{
    let config = Config::new(fetcher(vec![
        (1, vec!["foo", "bar", "minor change"]),
        (2, vec!["Baz", "QUX", "Patch"]),
        (3, vec![]),
    ]));

    assert_eq!(config.compute_severity(&[1, 2, 3]).unwrap(), Severity::Minor);
}

#[test]
fn test_compute_severity_labels_required()
{
    let config = Config::new(fetcher(vec![
        (1, vec!["foo", "bar", "minor change"]),
        (2, vec!["Baz", "QUX", "Patch"]),
        (3, vec!["non-production change"]),
    ]))
    .require_labels(true);

    assert_eq!(config.compute_severity(&[1, 2, 3]).unwrap(), Severity::Minor);
}

#[test]
fn test_compute_severity_missing_required_labels()
{
    let config = Config::new(fetcher(vec![
        (1, vec!["foo", "bar", "minor change"]),
        (2, vec!["Baz", "QUX", "Patch"]),
        (3, vec![]),
        (4, vec!["a"]),
    ]))
    .require_labels(true);

    let error = config.compute_severity(&[3, 1, 4, 2]).unwrap_err();
    assert_eq!(error.to_string(), "one or more pull requests have no configured labels: [3, 4]");
    assert!(matches!(error, Error::MissingLabels { ids } if ids == vec![3, 4]));
}

#[test]
fn test_compute_severity_fetcher_error()
{
    let mut fetcher = fetcher(vec![(1, vec!["breaking change"]), (2, vec!["Patch"])]);
    fetcher.expect_fetch_labels().with(mockall::predicate::eq(3)).returning(|_| Err("rate limited".into()));
    let config = Config::new(fetcher);

    let error = config.compute_severity(&[1, 2, 3]).unwrap_err();
    assert!(matches!(error, Error::Fetch { id: 3, .. }));
}

#[test]
fn test_compute_severity_custom_labels()
{
    use maplit::hashmap;

    let config = Config::new(fetcher(vec![(1, vec!["Feature"]), (2, vec!["breaking change"])]))
        .with_labels(LabelTable::new(hashmap! { "feature".to_string() => Severity::Minor }))
        .require_labels(true);

    match config.compute_severity(&[1, 2])
    {
        Err(Error::MissingLabels { ids }) => assert_eq!(ids, vec![2]),
        other => panic!("expected missing labels, got {:?}", other),
    }
}

#[test]
fn test_next_version()
{
    let cases = vec![
        ("non-production change", "v1.2.3"),
        ("Patch", "v1.2.4"),
        ("Minor Change", "v1.3.0"),
        ("breaking change", "v2.0.0"),
    ];
    for (label, want) in cases
    {
        let config = Config::new(fetcher(vec![
            (1, vec!["foo", "bar", "non-production change"]),
            (2, vec!["Baz", "QUX", label]),
            (3, vec!["non-production change"]),
        ]))
        .require_labels(true);

        assert_eq!(config.next_version("v1.2.3", &[1, 2, 3]).unwrap(), want, "label: {}", label);
    }
}

#[test]
fn test_next_version_invalid_current_version()
{
    let config = Config::new(fetcher(vec![(1, vec!["breaking change"])])).require_labels(true);

    match config.next_version("limabeans", &[1])
    {
        Err(Error::MalformedVersion { version }) => assert_eq!(version, "limabeans"),
        other => panic!("expected a malformed version, got {:?}", other),
    }
}

#[test]
fn test_next_version_missing_label()
{
    let config = Config::new(fetcher(vec![
        (1, vec!["foo", "bar"]),
        (2, vec!["Baz", "QUX", "Patch"]),
        (3, vec!["non-production change"]),
    ]))
    .require_labels(true);

    let error = config.next_version("v1.2.3", &[1, 2, 3]).unwrap_err();
    assert!(matches!(error, Error::MissingLabels { ids } if ids == vec![1]));
}

#[test]
fn test_boxed_fetcher()
{
    let fetcher: Box<dyn LabelFetcher> = Box::new(fetcher(vec![(9, vec!["Patch"])]));
    let config = Config::new(fetcher);
    assert_eq!(config.next_version("0.1.0", &[9]).unwrap(), "0.1.1");
}
