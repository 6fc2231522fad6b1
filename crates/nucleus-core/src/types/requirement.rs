//! Requirement (dependency specification) types.
//!
//! One `Requirement` is parsed from one logical line of a requirements
//! manifest:
//!
//! ```text
//! name [extras] (version_spec | @ url)? (; marker)?
//! requests[security]>=2.0,<3 ; python_version >= "3.6"
//! ```

use super::marker::{Marker, MarkerEnvironment, MarkerError};
use super::specifier::{SpecifierError, VersionSpecifiers};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Dependency specification parsed from one manifest line
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Requirement {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<String>,
    #[serde(default, skip_serializing_if = "VersionSpecifiers::is_empty")]
    pub specifiers: VersionSpecifiers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

/// Requirement parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequirementError {
    #[error("empty requirement")]
    Empty,

    #[error("expected a package name, found {found:?}")]
    ExpectedName { found: String },

    #[error("invalid package name {name:?}: names must start and end with a letter or digit")]
    InvalidName { name: String },

    #[error("missing closing ']' in extras")]
    UnclosedExtras,

    #[error("invalid extra name {extra:?}")]
    InvalidExtra { extra: String },

    #[error("missing URL after '@'")]
    MissingUrl,

    #[error("unexpected text after URL: {rest:?} (markers must be separated by ' ;')")]
    TrailingAfterUrl { rest: String },

    #[error("invalid version specifier: {0}")]
    Specifier(#[from] SpecifierError),

    #[error("invalid environment marker: {0}")]
    Marker(#[from] MarkerError),
}

impl Requirement {
    /// Create a requirement with no constraints
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extras: Vec::new(),
            specifiers: VersionSpecifiers::default(),
            url: None,
            marker: None,
        }
    }

    /// Parse one requirement. Comments must already be stripped.
    pub fn parse(input: &str) -> Result<Self, RequirementError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RequirementError::Empty);
        }

        let name_len = input
            .find(|c: char| !is_name_char(c))
            .unwrap_or(input.len());
        let name = &input[..name_len];
        if name.is_empty() {
            return Err(RequirementError::ExpectedName {
                found: input.to_string(),
            });
        }
        if !is_valid_name(name) {
            return Err(RequirementError::InvalidName {
                name: name.to_string(),
            });
        }

        let mut requirement = Requirement::new(name);
        let mut rest = input[name_len..].trim_start();

        if let Some(after_bracket) = rest.strip_prefix('[') {
            let close = after_bracket
                .find(']')
                .ok_or(RequirementError::UnclosedExtras)?;
            requirement.extras = parse_extras(&after_bracket[..close])?;
            rest = after_bracket[close + 1..].trim_start();
        }

        if let Some(after_at) = rest.strip_prefix('@') {
            let after_at = after_at.trim_start();
            let url_len = after_at
                .find(char::is_whitespace)
                .unwrap_or(after_at.len());
            if url_len == 0 {
                return Err(RequirementError::MissingUrl);
            }
            requirement.url = Some(after_at[..url_len].to_string());

            let trailing = after_at[url_len..].trim_start();
            if !trailing.is_empty() {
                let marker = trailing
                    .strip_prefix(';')
                    .ok_or_else(|| RequirementError::TrailingAfterUrl {
                        rest: trailing.to_string(),
                    })?;
                requirement.marker = Some(Marker::parse(marker)?);
            }
            return Ok(requirement);
        }

        let (spec_part, marker_part) = match rest.split_once(';') {
            Some((spec, marker)) => (spec, Some(marker)),
            None => (rest, None),
        };
        requirement.specifiers = VersionSpecifiers::parse(spec_part)?;
        if let Some(marker) = marker_part {
            requirement.marker = Some(Marker::parse(marker)?);
        }

        Ok(requirement)
    }

    /// Lowercased name with runs of `-`, `_` and `.` collapsed to `-`
    pub fn key(&self) -> String {
        let mut key = String::with_capacity(self.name.len());
        let mut in_separator = false;
        for c in self.name.chars() {
            if matches!(c, '-' | '_' | '.') {
                if !in_separator {
                    key.push('-');
                }
                in_separator = true;
            } else {
                key.push(c.to_ascii_lowercase());
                in_separator = false;
            }
        }
        key
    }

    /// The pinned version for a plain `name==X` requirement
    pub fn exact_version(&self) -> Option<&str> {
        self.specifiers.exact_version()
    }

    /// Check whether this requirement applies on the given interpreter
    pub fn applies_to(&self, env: &MarkerEnvironment) -> bool {
        self.marker.as_ref().map_or(true, |marker| marker.evaluate(env))
    }

    /// The requirement without its marker, as written into `requires.txt` sections
    pub fn without_marker(&self) -> Requirement {
        Requirement {
            marker: None,
            ..self.clone()
        }
    }
}

/// Check if this is a valid distribution name
pub fn is_valid_name(name: &str) -> bool {
    let starts_ok = name.chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
    let ends_ok = name.chars().last().is_some_and(|c| c.is_ascii_alphanumeric());
    starts_ok && ends_ok && name.chars().all(is_name_char)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

/// Extras come back sorted and de-duplicated, the form packaging tools emit
fn parse_extras(inner: &str) -> Result<Vec<String>, RequirementError> {
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    let extras = inner
        .split(',')
        .map(|extra| {
            let extra = extra.trim();
            if is_valid_name(extra) {
                Ok(extra.to_string())
            } else {
                Err(RequirementError::InvalidExtra {
                    extra: extra.to_string(),
                })
            }
        })
        .collect::<Result<BTreeSet<String>, _>>()?;

    Ok(extras.into_iter().collect())
}

/// Normalized form handed to the packaging tool
impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;

        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }

        match &self.url {
            Some(url) => {
                write!(f, " @ {}", url)?;
                if let Some(marker) = &self.marker {
                    write!(f, " ; {}", marker)?;
                }
            },
            None => {
                write!(f, "{}", self.specifiers)?;
                if let Some(marker) = &self.marker {
                    write!(f, "; {}", marker)?;
                }
            },
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::specifier::Op;

    #[test]
    fn test_exact_pin() {
        let req = Requirement::parse("name==1.2.3").unwrap();
        assert_eq!(req.name, "name");
        assert_eq!(req.exact_version(), Some("1.2.3"));
        assert_eq!(req.marker, None);
        assert_eq!(req.to_string(), "name==1.2.3");
    }

    #[test]
    fn test_marker_is_separate() {
        let req = Requirement::parse(r#"name>=1.0; python_version>="3.6""#).unwrap();
        assert_eq!(req.specifiers.to_string(), ">=1.0");
        assert_eq!(req.specifiers.iter().next().unwrap().op(), Op::GreaterEq);
        assert_eq!(req.marker.as_ref().unwrap().as_str(), r#"python_version>="3.6""#);
        assert_eq!(req.to_string(), r#"name>=1.0; python_version>="3.6""#);
    }

    #[test]
    fn test_bare_name_and_spacing() {
        let req = Requirement::parse("  flask  ").unwrap();
        assert_eq!(req.name, "flask");
        assert!(req.specifiers.is_empty());

        let req = Requirement::parse("boto3 >= 1.17 , < 2").unwrap();
        assert_eq!(req.to_string(), "boto3<2,>=1.17");

        let req = Requirement::parse("dill (==0.3.4)").unwrap();
        assert_eq!(req.exact_version(), Some("0.3.4"));
    }

    #[test]
    fn test_extras() {
        let req = Requirement::parse("uvicorn[standard, watch]==0.14.0").unwrap();
        assert_eq!(req.extras, vec!["standard".to_string(), "watch".to_string()]);
        assert_eq!(req.to_string(), "uvicorn[standard,watch]==0.14.0");

        let req = Requirement::parse("uvicorn[watch,standard,watch]==0.14.0").unwrap();
        assert_eq!(req.extras, vec!["standard".to_string(), "watch".to_string()]);
        assert_eq!(req.to_string(), "uvicorn[standard,watch]==0.14.0");

        assert_eq!(
            Requirement::parse("uvicorn[standard").unwrap_err(),
            RequirementError::UnclosedExtras
        );
        assert!(matches!(
            Requirement::parse("uvicorn[-bad]"),
            Err(RequirementError::InvalidExtra { .. })
        ));
    }

    #[test]
    fn test_url_requirement() {
        let req = Requirement::parse(
            r#"pip @ https://github.com/pypa/pip/archive/22.0.zip ; python_version < "3.8""#,
        )
        .unwrap();
        assert_eq!(req.url.as_deref(), Some("https://github.com/pypa/pip/archive/22.0.zip"));
        assert!(req.marker.is_some());
        assert_eq!(
            req.to_string(),
            r#"pip @ https://github.com/pypa/pip/archive/22.0.zip ; python_version < "3.8""#
        );

        assert_eq!(Requirement::parse("pip @ ").unwrap_err(), RequirementError::MissingUrl);
        assert!(matches!(
            Requirement::parse("pip @ https://x.invalid/p.zip extra"),
            Err(RequirementError::TrailingAfterUrl { .. })
        ));
    }

    #[test]
    fn test_malformed_lines() {
        assert!(matches!(
            Requirement::parse("==="),
            Err(RequirementError::ExpectedName { .. })
        ));
        assert!(matches!(
            Requirement::parse("-r other.txt"),
            Err(RequirementError::InvalidName { .. })
        ));
        assert!(matches!(
            Requirement::parse("requests 2.0"),
            Err(RequirementError::Specifier(SpecifierError::MissingOperator { .. }))
        ));
        assert!(matches!(
            Requirement::parse("requests>=2.0;"),
            Err(RequirementError::Marker(MarkerError::Empty))
        ));
        assert_eq!(Requirement::parse("   ").unwrap_err(), RequirementError::Empty);
    }

    #[test]
    fn test_key_normalization() {
        assert_eq!(Requirement::new("Flask_SocketIO").key(), "flask-socketio");
        assert_eq!(Requirement::new("zope.interface").key(), "zope-interface");
        assert_eq!(Requirement::new("a-_.b").key(), "a-b");
    }

    #[test]
    fn test_applies_to() {
        let env = MarkerEnvironment::linux_cpython("3.6");
        let req = Requirement::parse(r#"dataclasses; python_version < "3.7""#).unwrap();
        assert!(req.applies_to(&env));
        assert!(!req.applies_to(&MarkerEnvironment::linux_cpython("3.8")));
        assert!(Requirement::new("numpy").applies_to(&env));
        assert_eq!(req.without_marker().to_string(), "dataclasses");
    }

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("nucleus-internal"));
        assert!(is_valid_name("zope.interface"));
        assert!(is_valid_name("a"));

        assert!(!is_valid_name(""));
        assert!(!is_valid_name("-invalid"));
        assert!(!is_valid_name("invalid-"));
        assert!(!is_valid_name("invalid@name"));
    }
}
