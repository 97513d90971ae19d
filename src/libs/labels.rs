use std::collections::HashMap;

use maplit::hashmap;

use super::severity::Severity;

/// Labels and the severity they carry when no table is configured.
pub fn default_labels() -> HashMap<String, Severity>
{
    hashmap! {
        "Non-Production Change".to_string() => Severity::None,
        "Patch".to_string() => Severity::Patch,
        "Minor Change".to_string() => Severity::Minor,
        "Breaking Change".to_string() => Severity::Major,
    }
}

/// Case-insensitive mapping from a label to the severity it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable
{
    values: HashMap<String, Severity>,
}

impl LabelTable
{
    // Ctor
    pub fn new(values: HashMap<String, Severity>) -> LabelTable
    {
        let values = values
            .into_iter()
            .map(|(label, severity)| (label.to_lowercase(), severity))
            .collect();
        LabelTable { values }
    }

    /// Uses `values` when given, the built-in table otherwise. The two are never merged.
    pub fn or_default(values: Option<HashMap<String, Severity>>) -> LabelTable
    {
        match values
        {
            Some(values) => LabelTable::new(values),
            None => LabelTable::default(),
        }
    }

    /// Severity of a single label; unknown labels carry [`Severity::None`].
    pub fn resolve(&self, label: &str) -> Severity
    {
        self.values.get(&label.to_lowercase()).copied().unwrap_or_default()
    }

    /// True when at least one label is present in the table, whatever its severity.
    pub fn contains_any<S: AsRef<str>>(&self, labels: &[S]) -> bool
    {
        labels.iter().any(|label| self.values.contains_key(&label.as_ref().to_lowercase()))
    }

    /// Greatest severity among one pull request's labels.
    pub fn max_severity<S: AsRef<str>>(&self, labels: &[S]) -> Severity
    {
        labels
            .iter()
            .map(|label| self.resolve(label.as_ref()))
            .fold(Severity::None, |change, label_change| label_change.max(change))
    }

    pub fn len(&self) -> usize
    {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.values.is_empty()
    }
}

impl Default for LabelTable
{
    fn default() -> Self
    {
        LabelTable::new(default_labels())
    }
}

/// Lower-cases the labels of one pull request. Order and duplicates are kept.
pub fn normalize(labels: Vec<String>) -> Vec<String>
{
    labels.into_iter().map(|label| label.to_lowercase()).collect()
}

#[test]
fn test_default_table()
{
    let table = LabelTable::default();
    assert_eq!(table.len(), 4);
    assert_eq!(table.resolve("non-production change"), Severity::None);
    assert_eq!(table.resolve("Patch"), Severity::Patch);
    assert_eq!(table.resolve("MINOR CHANGE"), Severity::Minor);
    assert_eq!(table.resolve("breaking change"), Severity::Major);
}

#[test]
fn test_resolve_is_case_insensitive()
{
    let table = LabelTable::default();
    for label in ["Breaking Change", "breaking change", "BREAKING CHANGE"]
    {
        assert_eq!(table.resolve(label), Severity::Major, "label: {}", label);
    }

    let table = LabelTable::new(hashmap! { "SemVer-Major".to_string() => Severity::Major });
    assert_eq!(table.resolve("semver-major"), Severity::Major);
    assert_eq!(table.resolve("SEMVER-MAJOR"), Severity::Major);
}

#[test]
fn test_resolve_unknown()
{
    let table = LabelTable::default();
    assert_eq!(table.resolve("documentation"), Severity::None);
    assert_eq!(table.resolve(""), Severity::None);
}

#[test]
fn test_custom_table_replaces_default()
{
    let table = LabelTable::or_default(Some(hashmap! { "b".to_string() => Severity::Minor }));
    assert_eq!(table.len(), 1);
    assert_eq!(table.resolve("B"), Severity::Minor);
    assert_eq!(table.resolve("breaking change"), Severity::None);
    assert!(!table.contains_any(&["Patch"]));

    assert_eq!(LabelTable::or_default(None), LabelTable::default());
}

#[test]
fn test_empty_custom_table()
{
    let table = LabelTable::or_default(Some(HashMap::new()));
    assert!(table.is_empty());
    assert!(!table.contains_any(&["A"]));
    assert_eq!(table.max_severity(&["breaking change"]), Severity::None);
}

#[test]
fn test_contains_any()
{
    let table = LabelTable::new(hashmap! { "b".to_string() => Severity::None });
    assert!(table.contains_any(&["A", "B", "C"]));
    assert!(!table.contains_any(&["A", "C"]));
    assert!(!table.contains_any::<&str>(&[]));
}

#[test]
fn test_max_severity()
{
    let table = LabelTable::new(hashmap! {
        "a".to_string() => Severity::None,
        "b".to_string() => Severity::Major,
        "c".to_string() => Severity::Minor,
    });
    assert_eq!(table.max_severity(&["A", "B", "C", "D"]), Severity::Major);
    assert_eq!(table.max_severity(&["c", "a"]), Severity::Minor);
    assert_eq!(table.max_severity(&["X", "Y"]), Severity::None);
    assert_eq!(table.max_severity::<&str>(&[]), Severity::None);
}

#[test]
#[should_panic(expected = "not a valid severity")]
fn test_max_severity_rejects_invalid_table_entry()
{
    let table = LabelTable::new(hashmap! { "broken".to_string() => Severity::Invalid });
    table.max_severity(&["broken"]);
}

#[test]
fn test_normalize()
{
    let labels = vec!["Baz".to_string(), "QUX".to_string(), "qux".to_string()];
    assert_eq!(normalize(labels), vec!["baz", "qux", "qux"]);
    assert!(normalize(Vec::new()).is_empty());
}
