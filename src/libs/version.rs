use std::{fmt::Display, str::FromStr, sync::OnceLock};

use log::debug;
use regex::Regex;
use semver::{BuildMetadata, Prerelease, Version};

use super::{error::Error, severity::Severity};

// [v]MAJOR[.MINOR][.PATCH][-PRERELEASE][+BUILD]
const VERSION_PATTERN: &str = r"^(v)?(0|[1-9][0-9]*)(?:\.(0|[1-9][0-9]*))?(?:\.(0|[1-9][0-9]*))?(?:-([0-9A-Za-z\-]+(?:\.[0-9A-Za-z\-]+)*))?(?:\+([0-9A-Za-z\-]+(?:\.[0-9A-Za-z\-]+)*))?$";

fn version_regex() -> &'static Regex
{
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(VERSION_PATTERN).expect("version pattern is a valid regex"))
}

/// A semantic version as it was written, e.g. `v1.2`.
///
/// Comparison and arithmetic go through [`semver::Version`]; the text the
/// version was parsed from is kept so an unchanged version prints exactly as
/// it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticVersion
{
    version: Version,
    prefix: Option<String>,
    original: String,
}

impl SemanticVersion
{
    // Ctor
    pub fn new() -> SemanticVersion
    {
        SemanticVersion::from_version(Version::new(0, 0, 0), None)
    }

    fn from_version(version: Version, prefix: Option<String>) -> SemanticVersion
    {
        let original = format!("{}{}", prefix.as_deref().unwrap_or_default(), version);
        SemanticVersion { version, prefix, original }
    }

    // Parse
    pub fn parse(text: &str) -> Result<SemanticVersion, Error>
    {
        let malformed = || Error::MalformedVersion { version: text.to_string() };

        let captures = version_regex().captures(text).ok_or_else(malformed)?;
        let component = |index: usize| -> Result<u64, Error>
        {
            match captures.get(index)
            {
                Some(digits) => digits.as_str().parse::<u64>().map_err(|_| malformed()),
                None => Ok(0),
            }
        };

        let mut version = Version::new(component(2)?, component(3)?, component(4)?);
        if let Some(pre) = captures.get(5)
        {
            version.pre = Prerelease::new(pre.as_str()).map_err(|_| malformed())?;
        }
        if let Some(build) = captures.get(6)
        {
            version.build = BuildMetadata::new(build.as_str()).map_err(|_| malformed())?;
        }

        let prefix = captures.get(1).map(|prefix| prefix.as_str().to_string());
        debug!("Parsed Version: {} -> {}", text, version);
        Ok(SemanticVersion { version, prefix, original: text.to_string() })
    }

    /// The next version after a change of the given severity.
    ///
    /// Incrementing always drops prerelease and build metadata. A patch
    /// change on a prerelease releases that version instead of moving past it.
    ///
    /// # Panics
    ///
    /// Panics on [`Severity::Invalid`].
    pub fn increment(&self, change: Severity) -> Result<SemanticVersion, Error>
    {
        change.must_be_valid();
        let current = &self.version;
        let overflow = || Error::VersionOverflow { version: self.original.clone(), change };
        let next = match change
        {
            Severity::None => return Ok(self.clone()),
            Severity::Patch if !current.pre.is_empty() => Version::new(current.major, current.minor, current.patch),
            Severity::Patch => Version::new(current.major, current.minor, current.patch.checked_add(1).ok_or_else(overflow)?),
            Severity::Minor => Version::new(current.major, current.minor.checked_add(1).ok_or_else(overflow)?, 0),
            Severity::Major => Version::new(current.major.checked_add(1).ok_or_else(overflow)?, 0, 0),
            Severity::Invalid => unreachable!("checked above"),
        };
        Ok(SemanticVersion::from_version(next, self.prefix.clone()))
    }

    pub fn version(&self) -> &Version
    {
        &self.version
    }

    pub fn original(&self) -> &str
    {
        &self.original
    }
}

impl Default for SemanticVersion
{
    fn default() -> Self
    {
        SemanticVersion::new()
    }
}

impl FromStr for SemanticVersion
{
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err>
    {
        SemanticVersion::parse(text)
    }
}

impl Display for SemanticVersion
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        write!(f, "{}", self.original)
    }
}

/// Applies `change` to `previous` and returns the next version's text.
///
/// # Panics
///
/// Panics on [`Severity::Invalid`]; only a broken aggregation can produce one here.
pub fn bump(previous: &str, change: Severity) -> Result<String, Error>
{
    change.must_be_valid();
    let previous = SemanticVersion::parse(previous)?;
    Ok(previous.increment(change)?.to_string())
}

#[test]
fn test_bump()
{
    assert_eq!(bump("v1.2.2", Severity::Patch).unwrap(), "v1.2.3");
    assert_eq!(bump("v1.2.2", Severity::None).unwrap(), "v1.2.2");
    assert_eq!(bump("v1.2.2", Severity::Minor).unwrap(), "v1.3.0");
    assert_eq!(bump("v1.2.2", Severity::Major).unwrap(), "v2.0.0");
    assert_eq!(bump("v1", Severity::Major).unwrap(), "v2.0.0");
    assert_eq!(bump("v1", Severity::Minor).unwrap(), "v1.1.0");
    assert_eq!(bump("v0", Severity::Minor).unwrap(), "v0.1.0");
}

#[test]
fn test_bump_without_prefix()
{
    assert_eq!(bump("1.2.3", Severity::Patch).unwrap(), "1.2.4");
    assert_eq!(bump("0.9.9", Severity::Major).unwrap(), "1.0.0");
    assert_eq!(bump("4.2", Severity::Patch).unwrap(), "4.2.1");
}

#[test]
fn test_bump_none_keeps_text()
{
    for version in ["v1.2.3", "1.2.3", "v1", "1.2", "v2.0.0-rc.1+build.5"]
    {
        assert_eq!(bump(version, Severity::None).unwrap(), version);
    }
}

#[test]
fn test_bump_prerelease()
{
    assert_eq!(bump("v1.2.3-beta.1", Severity::Patch).unwrap(), "v1.2.3");
    assert_eq!(bump("v1.2.3-beta.1", Severity::Minor).unwrap(), "v1.3.0");
    assert_eq!(bump("1.2.3-beta.1+sha.5114f85", Severity::Major).unwrap(), "2.0.0");
    assert_eq!(bump("1.2.3+sha.5114f85", Severity::Patch).unwrap(), "1.2.4");
}

#[test]
fn test_bump_malformed()
{
    for version in ["limabeans", "", "v", "1.2.3.4", "V1.2.3", "1..2", "1.2.3-", "1.2.3-01", "99999999999999999999", "v01.02.03", "1.00", "1.2.007"]
    {
        match bump(version, Severity::Patch)
        {
            Err(Error::MalformedVersion { version: offending }) => assert_eq!(offending, version),
            other => panic!("expected a malformed version for {:?}, got {:?}", version, other),
        }
    }
}

#[test]
fn test_bump_overflow()
{
    let cases = [
        ("v18446744073709551615.0.0", Severity::Major),
        ("1.18446744073709551615.3", Severity::Minor),
        ("1.2.18446744073709551615", Severity::Patch),
    ];
    for (version, change) in cases
    {
        match bump(version, change)
        {
            Err(Error::VersionOverflow { version: offending, change: offending_change }) =>
            {
                assert_eq!(offending, version);
                assert_eq!(offending_change, change);
            }
            other => panic!("expected an overflow for {:?}, got {:?}", version, other),
        }
    }

    // The largest versions are still usable when nothing overflows.
    assert_eq!(bump("v18446744073709551615.0.0", Severity::None).unwrap(), "v18446744073709551615.0.0");
    assert_eq!(bump("v18446744073709551615.0.0", Severity::Patch).unwrap(), "v18446744073709551615.0.1");
    assert_eq!(bump("1.2.18446744073709551615-rc.1", Severity::Patch).unwrap(), "1.2.18446744073709551615");
}

#[test]
fn test_bump_zero_components()
{
    assert_eq!(bump("v0.0.0", Severity::Patch).unwrap(), "v0.0.1");
    assert_eq!(bump("0.10.0", Severity::Minor).unwrap(), "0.11.0");
}

#[test]
#[should_panic(expected = "not a valid severity")]
fn test_bump_rejects_invalid_severity()
{
    let _ = bump("v1.2.3", Severity::Invalid);
}

#[test]
fn test_parse()
{
    let version: SemanticVersion = "v1.2".parse().unwrap();
    assert_eq!(version.version(), &Version::new(1, 2, 0));
    assert_eq!(version.original(), "v1.2");

    let version = SemanticVersion::parse("3.4.5-alpha+exp").unwrap();
    assert_eq!(version.version().pre.as_str(), "alpha");
    assert_eq!(version.version().build.as_str(), "exp");
    assert_eq!(version.to_string(), "3.4.5-alpha+exp");

    assert_eq!(SemanticVersion::new().to_string(), "0.0.0");
}

#[test]
fn test_ordering_follows_semver()
{
    let older = SemanticVersion::parse("v1.9.0").unwrap();
    let newer = SemanticVersion::parse("v1.10.0").unwrap();
    let release = SemanticVersion::parse("v1.10.0-rc.1").unwrap();
    assert!(newer.version() > older.version());
    assert!(newer.version() > release.version());
}
