//! Property-based tests for the severity algebra and version bumps.

use proptest::prelude::*;
use pullvers::{aggregate, bump, LabelTable, Severity};

fn severity_strategy() -> impl Strategy<Value = Severity>
{
    prop::sample::select(Severity::ALL.to_vec())
}

/// Label sets for a handful of pull requests, mixing known labels in any casing with unknown ones.
fn label_sets_strategy() -> impl Strategy<Value = Vec<Vec<String>>>
{
    let label = prop::sample::select(vec![
        "Patch",
        "patch",
        "Minor Change",
        "BREAKING CHANGE",
        "non-production change",
        "documentation",
        "dependencies",
    ])
    .prop_map(String::from);
    prop::collection::vec(prop::collection::vec(label, 0..4), 0..8)
}

fn version_strategy() -> impl Strategy<Value = String>
{
    (any::<bool>(), 0u64..1000, prop::option::of(0u64..1000), prop::option::of(0u64..1000)).prop_map(|(prefix, major, minor, patch)| {
        let mut version = format!("{}{}", if prefix { "v" } else { "" }, major);
        if let Some(minor) = minor
        {
            version.push_str(&format!(".{}", minor));
            if let Some(patch) = patch
            {
                version.push_str(&format!(".{}", patch));
            }
        }
        version
    })
}

proptest! {
    #[test]
    fn max_is_commutative(a in severity_strategy(), b in severity_strategy())
    {
        prop_assert_eq!(a.max(b), b.max(a));
    }

    #[test]
    fn max_is_idempotent(a in severity_strategy())
    {
        prop_assert_eq!(a.max(a), a);
    }

    #[test]
    fn max_is_associative(a in severity_strategy(), b in severity_strategy(), c in severity_strategy())
    {
        prop_assert_eq!(a.max(b).max(c), a.max(b.max(c)));
    }

    #[test]
    fn aggregate_ignores_order(
        (label_sets, shuffled) in label_sets_strategy().prop_flat_map(|label_sets| (Just(label_sets.clone()), Just(label_sets).prop_shuffle()))
    )
    {
        let labels = LabelTable::default();
        prop_assert_eq!(
            aggregate(label_sets.iter().map(Vec::as_slice), &labels),
            aggregate(shuffled.iter().map(Vec::as_slice), &labels)
        );
    }

    #[test]
    fn aggregate_is_the_greatest_label(label_sets in label_sets_strategy())
    {
        let labels = LabelTable::default();
        let severity = aggregate(label_sets.iter().map(Vec::as_slice), &labels);
        for label in label_sets.iter().flatten()
        {
            prop_assert_eq!(labels.resolve(label).max(severity), severity);
        }
    }

    #[test]
    fn bump_none_is_identity(version in version_strategy())
    {
        prop_assert_eq!(bump(&version, Severity::None).unwrap(), version);
    }

    #[test]
    fn bump_keeps_prefix(version in version_strategy(), severity in severity_strategy())
    {
        let next = bump(&version, severity).unwrap();
        prop_assert_eq!(next.starts_with('v'), version.starts_with('v'));
    }
}

#[test]
fn increment_laws()
{
    assert_eq!(bump("v1.2.3", Severity::None).unwrap(), "v1.2.3");
    assert_eq!(bump("v1.2.3", Severity::Patch).unwrap(), "v1.2.4");
    assert_eq!(bump("v1.2.3", Severity::Minor).unwrap(), "v1.3.0");
    assert_eq!(bump("v1.2.3", Severity::Major).unwrap(), "v2.0.0");
    assert_eq!(bump("v1", Severity::Minor).unwrap(), "v1.1.0");
    assert_eq!(bump("v0", Severity::Minor).unwrap(), "v0.1.0");
}
