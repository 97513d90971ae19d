use std::fmt::Display;

/// How far a release moves the version forward.
///
/// Variants are declared in ascending order: `None < Patch < Minor < Major`.
/// `Invalid` sits past the end of that range and only ever marks a value that
/// could not be mapped; it never takes part in comparisons.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity
{
    #[default]
    None,
    Patch,
    Minor,
    Major,
    #[serde(skip)]
    Invalid,
}

impl Severity
{
    pub const ALL: [Severity; 4] = [Severity::None, Severity::Patch, Severity::Minor, Severity::Major];

    // Raw
    pub fn from_raw(raw: i64) -> Severity
    {
        match raw
        {
            0 => Severity::None,
            1 => Severity::Patch,
            2 => Severity::Minor,
            3 => Severity::Major,
            _ => Severity::Invalid,
        }
    }

    pub fn is_valid(self) -> bool
    {
        !matches!(self, Severity::Invalid)
    }

    /// Returns whichever of `self` and `other` is greater.
    ///
    /// # Panics
    ///
    /// Panics if either operand is [`Severity::Invalid`]. An invalid severity
    /// here means a malformed label table or a broken fold, so it is never
    /// clamped into range.
    pub fn max(self, other: Severity) -> Severity
    {
        self.must_be_valid();
        other.must_be_valid();
        if other.rank() > self.rank()
        {
            return other;
        }
        self
    }

    pub fn name(self) -> &'static str
    {
        match self
        {
            Severity::None => "None",
            Severity::Patch => "Patch",
            Severity::Minor => "Minor",
            Severity::Major => "Major",
            Severity::Invalid => "Invalid",
        }
    }

    pub(crate) fn must_be_valid(self)
    {
        assert!(self.is_valid(), "{} is not a valid severity", self.name());
    }

    fn rank(self) -> u8
    {
        match self
        {
            Severity::None => 0,
            Severity::Patch => 1,
            Severity::Minor => 2,
            Severity::Major => 3,
            Severity::Invalid => u8::MAX,
        }
    }
}

impl Display for Severity
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        write!(f, "{}", self.name())
    }
}

#[test]
fn test_name()
{
    assert_eq!(Severity::Invalid.name(), "Invalid");
    for severity in Severity::ALL
    {
        assert!(!severity.name().is_empty());
        assert_ne!(severity.name(), Severity::Invalid.name());
    }
    assert_eq!(Severity::from_raw(-1).name(), "Invalid");
    assert_eq!(Severity::from_raw(4).to_string(), "Invalid");
    assert_eq!(Severity::Minor.to_string(), "Minor");
}

#[test]
fn test_is_valid()
{
    assert!(Severity::Major.is_valid());
    assert!(Severity::None.is_valid());
    assert!(!Severity::Invalid.is_valid());
    assert!(!Severity::from_raw(-1).is_valid());
    assert!(!Severity::from_raw(4).is_valid());
    assert_eq!(Severity::from_raw(2), Severity::Minor);
}

#[test]
fn test_max()
{
    assert_eq!(Severity::Major.max(Severity::Major), Severity::Major);
    assert_eq!(Severity::Major.max(Severity::Minor), Severity::Major);
    assert_eq!(Severity::Minor.max(Severity::Major), Severity::Major);
    assert_eq!(Severity::None.max(Severity::Patch), Severity::Patch);
    assert_eq!(Severity::None.max(Severity::None), Severity::None);
}

#[test]
#[should_panic(expected = "Invalid is not a valid severity")]
fn test_max_rejects_invalid_argument()
{
    Severity::Major.max(Severity::Invalid);
}

#[test]
#[should_panic(expected = "Invalid is not a valid severity")]
fn test_max_rejects_invalid_receiver()
{
    Severity::Invalid.max(Severity::None);
}

#[test]
fn test_deserialize()
{
    let severity: Severity = serde_json::from_str("\"major\"").unwrap();
    assert_eq!(severity, Severity::Major);

    assert!(serde_json::from_str::<Severity>("\"invalid\"").is_err());
    assert!(serde_json::from_str::<Severity>("\"huge\"").is_err());
    assert_eq!(serde_json::to_string(&Severity::Patch).unwrap(), "\"patch\"");
}
