//! Version specifier types.
//!
//! A specifier is the `<op><version>` part of a requirement line such as
//! `numpy>=1.21,<2`. Versions are kept as the literal text from the manifest;
//! the packaging tool owns full version semantics. Comparison helpers only look
//! at the epoch and the numeric release segments, which is what marker
//! evaluation and `--python` checks need.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Comparison operator of a version clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Compatible, // ~=1.4.2
    Exact,      // ==1.4.2
    NotEqual,   // !=1.4.2
    LessEq,     // <=1.4.2
    GreaterEq,  // >=1.4.2
    Less,       // <1.4.2
    Greater,    // >1.4.2
    Arbitrary,  // ===1.4.2
}

/// One `<op><version>` clause
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionSpecifier {
    op: Op,
    version: String,
}

/// Comma-separated list of clauses, in manifest order
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VersionSpecifiers(Vec<VersionSpecifier>);

/// Specifier parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecifierError {
    #[error("expected a comparison operator (~=, ==, !=, <=, >=, <, >, ===) before {clause:?}")]
    MissingOperator { clause: String },

    #[error("missing version after '{op}'")]
    MissingVersion { op: &'static str },

    #[error("invalid character {found:?} in version {version:?}")]
    InvalidVersion { version: String, found: char },

    #[error("wildcard version {version:?} is only allowed with == or !=")]
    MisplacedWildcard { version: String },

    #[error("'~=' needs at least two release segments, got {version:?}")]
    CompatibleTooShort { version: String },

    #[error("empty clause in version specifier {input:?}")]
    EmptyClause { input: String },

    #[error("unbalanced parentheses in version specifier {input:?}")]
    UnbalancedParens { input: String },
}

impl Op {
    /// Operator text as written in a manifest
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Compatible => "~=",
            Op::Exact => "==",
            Op::NotEqual => "!=",
            Op::LessEq => "<=",
            Op::GreaterEq => ">=",
            Op::Less => "<",
            Op::Greater => ">",
            Op::Arbitrary => "===",
        }
    }

    /// Split a leading operator off `input`. Longest operators are tried first.
    pub fn strip_from(input: &str) -> Option<(Op, &str)> {
        if let Some(stripped) = input.strip_prefix("===") {
            Some((Op::Arbitrary, stripped))
        } else if let Some(stripped) = input.strip_prefix("~=") {
            Some((Op::Compatible, stripped))
        } else if let Some(stripped) = input.strip_prefix("==") {
            Some((Op::Exact, stripped))
        } else if let Some(stripped) = input.strip_prefix("!=") {
            Some((Op::NotEqual, stripped))
        } else if let Some(stripped) = input.strip_prefix("<=") {
            Some((Op::LessEq, stripped))
        } else if let Some(stripped) = input.strip_prefix(">=") {
            Some((Op::GreaterEq, stripped))
        } else if let Some(stripped) = input.strip_prefix("<") {
            Some((Op::Less, stripped))
        } else {
            input.strip_prefix(">").map(|stripped| (Op::Greater, stripped))
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl VersionSpecifier {
    /// Build a clause from already validated parts
    pub fn new(op: Op, version: impl Into<String>) -> Self {
        Self {
            op,
            version: version.into(),
        }
    }

    /// Parse a single clause such as `>=2.0`
    pub fn parse(input: &str) -> Result<Self, SpecifierError> {
        let input = input.trim();
        let (op, version) = Op::strip_from(input).ok_or_else(|| SpecifierError::MissingOperator {
            clause: input.to_string(),
        })?;
        let version = version.trim();

        if version.is_empty() {
            return Err(SpecifierError::MissingVersion { op: op.as_str() });
        }

        if let Some(found) = version
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '*' | '+' | '!' | '-' | '_')))
        {
            return Err(SpecifierError::InvalidVersion {
                version: version.to_string(),
                found,
            });
        }

        if op != Op::Arbitrary {
            if version.contains('*') {
                let well_formed = version.ends_with(".*") && version.matches('*').count() == 1;
                if !well_formed || !matches!(op, Op::Exact | Op::NotEqual) {
                    return Err(SpecifierError::MisplacedWildcard {
                        version: version.to_string(),
                    });
                }
            }

            if op == Op::Compatible && ReleaseVersion::parse(version).release.len() < 2 {
                return Err(SpecifierError::CompatibleTooShort {
                    version: version.to_string(),
                });
            }
        }

        Ok(Self::new(op, version))
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Check if this is a `.*` prefix match
    pub fn is_wildcard(&self) -> bool {
        self.version.ends_with(".*")
    }

    /// Check whether `candidate` satisfies this clause.
    ///
    /// Ordering uses the epoch and numeric release segments only; pre-release,
    /// post-release and local suffixes do not take part.
    pub fn contains(&self, candidate: &str) -> bool {
        let raw = candidate.trim();
        let candidate = ReleaseVersion::parse(raw);
        if self.is_wildcard() && self.op != Op::Arbitrary {
            let prefix = ReleaseVersion::parse(self.version.trim_end_matches(".*"));
            let matched = candidate.starts_with(&prefix);
            return if self.op == Op::Exact { matched } else { !matched };
        }

        let target = ReleaseVersion::parse(&self.version);
        let ordering = candidate.cmp(&target);
        match self.op {
            Op::Exact => ordering == Ordering::Equal,
            Op::NotEqual => ordering != Ordering::Equal,
            Op::LessEq => ordering != Ordering::Greater,
            Op::GreaterEq => ordering != Ordering::Less,
            Op::Less => ordering == Ordering::Less,
            Op::Greater => ordering == Ordering::Greater,
            Op::Compatible => {
                // ~=1.4.2 means >=1.4.2 and ==1.4.*
                let mut prefix = target.clone();
                prefix.release.pop();
                ordering != Ordering::Less && candidate.starts_with(&prefix)
            },
            Op::Arbitrary => raw == self.version,
        }
    }
}

impl fmt::Display for VersionSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.version)
    }
}

impl VersionSpecifiers {
    /// Parse `>=1.0,<2` or `(>=1.0, <2)`. An empty string is an empty set.
    pub fn parse(input: &str) -> Result<Self, SpecifierError> {
        let trimmed = input.trim();
        let inner = match (trimmed.starts_with('('), trimmed.ends_with(')')) {
            (true, true) => &trimmed[1..trimmed.len() - 1],
            (false, false) => trimmed,
            _ => {
                return Err(SpecifierError::UnbalancedParens {
                    input: trimmed.to_string(),
                })
            },
        };

        if inner.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut clauses = Vec::new();
        for clause in inner.split(',') {
            if clause.trim().is_empty() {
                return Err(SpecifierError::EmptyClause {
                    input: trimmed.to_string(),
                });
            }
            clauses.push(VersionSpecifier::parse(clause)?);
        }

        Ok(Self(clauses))
    }

    /// Clauses in the order they were written
    pub fn iter(&self) -> impl Iterator<Item = &VersionSpecifier> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The pinned version if this is exactly one non-wildcard `==` clause
    pub fn exact_version(&self) -> Option<&str> {
        match self.0.as_slice() {
            [only] if only.op == Op::Exact && !only.is_wildcard() => Some(&only.version),
            _ => None,
        }
    }

    /// Check whether `candidate` satisfies every clause
    pub fn contains(&self, candidate: &str) -> bool {
        self.0.iter().all(|clause| clause.contains(candidate))
    }
}

impl From<Vec<VersionSpecifier>> for VersionSpecifiers {
    fn from(clauses: Vec<VersionSpecifier>) -> Self {
        Self(clauses)
    }
}

/// Normalized form: clauses sorted by their text and joined with commas
impl fmt::Display for VersionSpecifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendered: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        rendered.sort();
        f.write_str(&rendered.join(","))
    }
}

impl Serialize for VersionSpecifiers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionSpecifiers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Epoch plus numeric release segments of a version string
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReleaseVersion {
    epoch: u64,
    release: Vec<u64>,
}

impl ReleaseVersion {
    /// Lenient parse: a leading `v` is skipped and parsing stops at the first
    /// segment that is not a plain number.
    pub(crate) fn parse(input: &str) -> Self {
        let input = input.trim();
        let input = input.strip_prefix(|c| c == 'v' || c == 'V').unwrap_or(input);

        let (epoch, rest) = match input.split_once('!') {
            Some((epoch, rest)) => (epoch.parse().unwrap_or(0), rest),
            None => (0, input),
        };

        let mut release = Vec::new();
        for segment in rest.split('.') {
            let digits: String = segment.chars().take_while(|c| c.is_ascii_digit()).collect();
            match digits.parse() {
                Ok(number) => release.push(number),
                Err(_) => break,
            }
            if digits.len() != segment.len() {
                break;
            }
        }

        Self { epoch, release }
    }

    fn starts_with(&self, prefix: &ReleaseVersion) -> bool {
        self.epoch == prefix.epoch
            && prefix
                .release
                .iter()
                .enumerate()
                .all(|(i, segment)| self.release.get(i).copied().unwrap_or(0) == *segment)
    }

    /// Check if the input looked like a version at all
    pub(crate) fn is_numeric(input: &str) -> bool {
        !Self::parse(input).release.is_empty()
    }
}

impl PartialOrd for ReleaseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReleaseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch.cmp(&other.epoch).then_with(|| {
            let len = self.release.len().max(other.release.len());
            (0..len)
                .map(|i| {
                    let a = self.release.get(i).copied().unwrap_or(0);
                    let b = other.release.get(i).copied().unwrap_or(0);
                    a.cmp(&b)
                })
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exact_pin() {
        let spec = VersionSpecifier::parse("==1.2.3").unwrap();
        assert_eq!(spec.op(), Op::Exact);
        assert_eq!(spec.version(), "1.2.3");
        assert_eq!(spec.to_string(), "==1.2.3");
    }

    #[test]
    fn test_longest_operator_wins() {
        assert_eq!(VersionSpecifier::parse("===foo").unwrap().op(), Op::Arbitrary);
        assert_eq!(VersionSpecifier::parse("<=1.0").unwrap().op(), Op::LessEq);
        assert_eq!(VersionSpecifier::parse(">= 1.0").unwrap().version(), "1.0");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            VersionSpecifier::parse("1.0"),
            Err(SpecifierError::MissingOperator { .. })
        ));
        assert!(matches!(
            VersionSpecifier::parse("=="),
            Err(SpecifierError::MissingVersion { op: "==" })
        ));
        assert!(matches!(
            VersionSpecifier::parse(">=1.*"),
            Err(SpecifierError::MisplacedWildcard { .. })
        ));
        assert!(matches!(
            VersionSpecifier::parse("~=1"),
            Err(SpecifierError::CompatibleTooShort { .. })
        ));
        assert!(matches!(
            VersionSpecifier::parse("==1.0 beta"),
            Err(SpecifierError::InvalidVersion { found: ' ', .. })
        ));
    }

    #[test]
    fn test_specifier_set() {
        let set = VersionSpecifiers::parse(">=1.0, <2").unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().next().unwrap().op(), Op::GreaterEq);
        assert_eq!(set.to_string(), "<2,>=1.0");

        let parens = VersionSpecifiers::parse("(>=1.0)").unwrap();
        assert_eq!(parens.to_string(), ">=1.0");

        assert!(VersionSpecifiers::parse("").unwrap().is_empty());
        assert!(VersionSpecifiers::parse(">=1.0,").is_err());
        assert!(VersionSpecifiers::parse("(>=1.0").is_err());
    }

    #[test]
    fn test_exact_version() {
        assert_eq!(VersionSpecifiers::parse("==1.21.0").unwrap().exact_version(), Some("1.21.0"));
        assert_eq!(VersionSpecifiers::parse("==1.*").unwrap().exact_version(), None);
        assert_eq!(VersionSpecifiers::parse(">=1.0").unwrap().exact_version(), None);
    }

    #[test]
    fn test_contains() {
        let req = VersionSpecifiers::parse(">=3.6").unwrap();
        assert!(req.contains("3.6"));
        assert!(req.contains("3.10"));
        assert!(!req.contains("3.5"));
        assert!(!req.contains("2.7.18"));

        let compatible = VersionSpecifier::parse("~=1.4.2").unwrap();
        assert!(compatible.contains("1.4.5"));
        assert!(!compatible.contains("1.5.0"));
        assert!(!compatible.contains("1.4.1"));

        let wildcard = VersionSpecifier::parse("==3.6.*").unwrap();
        assert!(wildcard.contains("3.6.15"));
        assert!(!wildcard.contains("3.7.0"));
        assert!(VersionSpecifier::parse("!=3.6.*").unwrap().contains("3.7"));

        assert!(VersionSpecifier::parse("==1.0").unwrap().contains("1.0.0"));
        assert!(VersionSpecifier::parse("===1.0").unwrap().contains("1.0"));
        assert!(!VersionSpecifier::parse("===1.0").unwrap().contains("1.0.0"));
    }

    #[test]
    fn test_release_ordering() {
        assert!(ReleaseVersion::parse("1.10") > ReleaseVersion::parse("1.9"));
        assert!(ReleaseVersion::parse("1!0.1") > ReleaseVersion::parse("2.0"));
        assert_eq!(ReleaseVersion::parse("2.0"), ReleaseVersion::parse("v2.0"));
        assert!(ReleaseVersion::is_numeric("3.8"));
        assert!(!ReleaseVersion::is_numeric("linux"));
    }
}
