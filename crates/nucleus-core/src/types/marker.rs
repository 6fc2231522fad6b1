//! Environment markers.
//!
//! A marker is the clause after `;` on a requirement line, e.g.
//! `python_version >= "3.6" and sys_platform == "linux"`. The text is kept
//! verbatim (that is what gets written back out); the parsed expression tree is
//! used for validation and for evaluating a requirement against a target
//! interpreter.

use super::specifier::{Op, ReleaseVersion, VersionSpecifier};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Parsed environment marker with its source text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Marker {
    raw: String,
    expr: MarkerExpr,
}

/// Marker expression tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarkerExpr {
    Compare {
        lhs: MarkerValue,
        op: MarkerOp,
        rhs: MarkerValue,
    },
    And(Box<MarkerExpr>, Box<MarkerExpr>),
    Or(Box<MarkerExpr>, Box<MarkerExpr>),
}

/// Operand of a marker comparison
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarkerValue {
    Variable(MarkerVariable),
    Literal(String),
}

/// Environment variables a marker may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerVariable {
    PythonVersion,
    PythonFullVersion,
    OsName,
    SysPlatform,
    PlatformRelease,
    PlatformSystem,
    PlatformVersion,
    PlatformMachine,
    PlatformPythonImplementation,
    ImplementationName,
    ImplementationVersion,
    Extra,
}

/// Marker comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerOp {
    Version(Op),
    In,
    NotIn,
}

/// Marker parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkerError {
    #[error("empty environment marker")]
    Empty,

    #[error("unknown marker variable '{name}'")]
    UnknownVariable { name: String },

    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },

    #[error("expected {expected}, found {found}")]
    Unexpected { expected: &'static str, found: String },

    #[error("parentheses nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// Values of the marker variables for one target interpreter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerEnvironment {
    pub python_version: String,
    pub python_full_version: String,
    pub os_name: String,
    pub sys_platform: String,
    pub platform_release: String,
    pub platform_system: String,
    pub platform_version: String,
    pub platform_machine: String,
    pub platform_python_implementation: String,
    pub implementation_name: String,
    pub implementation_version: String,
    pub extra: Option<String>,
}

impl MarkerVariable {
    /// Look up a variable by name, accepting the legacy dotted spellings
    pub fn from_name(name: &str) -> Option<Self> {
        let variable = match name {
            "python_version" => Self::PythonVersion,
            "python_full_version" => Self::PythonFullVersion,
            "os_name" | "os.name" => Self::OsName,
            "sys_platform" | "sys.platform" => Self::SysPlatform,
            "platform_release" => Self::PlatformRelease,
            "platform_system" => Self::PlatformSystem,
            "platform_version" | "platform.version" => Self::PlatformVersion,
            "platform_machine" | "platform.machine" => Self::PlatformMachine,
            "platform_python_implementation"
            | "platform.python_implementation"
            | "python_implementation" => Self::PlatformPythonImplementation,
            "implementation_name" => Self::ImplementationName,
            "implementation_version" => Self::ImplementationVersion,
            "extra" => Self::Extra,
            _ => return None,
        };
        Some(variable)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PythonVersion => "python_version",
            Self::PythonFullVersion => "python_full_version",
            Self::OsName => "os_name",
            Self::SysPlatform => "sys_platform",
            Self::PlatformRelease => "platform_release",
            Self::PlatformSystem => "platform_system",
            Self::PlatformVersion => "platform_version",
            Self::PlatformMachine => "platform_machine",
            Self::PlatformPythonImplementation => "platform_python_implementation",
            Self::ImplementationName => "implementation_name",
            Self::ImplementationVersion => "implementation_version",
            Self::Extra => "extra",
        }
    }
}

impl MarkerEnvironment {
    /// A CPython on Linux/x86_64 environment for the given `X.Y` or `X.Y.Z`
    pub fn linux_cpython(python_version: &str) -> Self {
        let full = if python_version.matches('.').count() >= 2 {
            python_version.to_string()
        } else {
            format!("{}.0", python_version)
        };
        let short = full.splitn(3, '.').take(2).collect::<Vec<_>>().join(".");

        Self {
            python_version: short,
            python_full_version: full.clone(),
            os_name: "posix".to_string(),
            sys_platform: "linux".to_string(),
            platform_release: String::new(),
            platform_system: "Linux".to_string(),
            platform_version: String::new(),
            platform_machine: "x86_64".to_string(),
            platform_python_implementation: "CPython".to_string(),
            implementation_name: "cpython".to_string(),
            implementation_version: full,
            extra: None,
        }
    }

    fn get(&self, variable: MarkerVariable) -> &str {
        match variable {
            MarkerVariable::PythonVersion => &self.python_version,
            MarkerVariable::PythonFullVersion => &self.python_full_version,
            MarkerVariable::OsName => &self.os_name,
            MarkerVariable::SysPlatform => &self.sys_platform,
            MarkerVariable::PlatformRelease => &self.platform_release,
            MarkerVariable::PlatformSystem => &self.platform_system,
            MarkerVariable::PlatformVersion => &self.platform_version,
            MarkerVariable::PlatformMachine => &self.platform_machine,
            MarkerVariable::PlatformPythonImplementation => &self.platform_python_implementation,
            MarkerVariable::ImplementationName => &self.implementation_name,
            MarkerVariable::ImplementationVersion => &self.implementation_version,
            MarkerVariable::Extra => self.extra.as_deref().unwrap_or(""),
        }
    }
}

impl Marker {
    /// Parse marker text. The trimmed input is kept as the marker's text.
    pub fn parse(input: &str) -> Result<Self, MarkerError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(MarkerError::Empty);
        }

        let tokens = tokenize(raw)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.parse_or()?;
        if let Some(token) = parser.peek() {
            return Err(MarkerError::Unexpected {
                expected: "end of marker",
                found: token.describe(),
            });
        }

        Ok(Self {
            raw: raw.to_string(),
            expr,
        })
    }

    /// Marker text exactly as written in the manifest
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn expr(&self) -> &MarkerExpr {
        &self.expr
    }

    /// Evaluate against a target environment
    pub fn evaluate(&self, env: &MarkerEnvironment) -> bool {
        self.expr.evaluate(env)
    }
}

impl MarkerExpr {
    pub fn evaluate(&self, env: &MarkerEnvironment) -> bool {
        match self {
            MarkerExpr::And(left, right) => left.evaluate(env) && right.evaluate(env),
            MarkerExpr::Or(left, right) => left.evaluate(env) || right.evaluate(env),
            MarkerExpr::Compare { lhs, op, rhs } => {
                let left = lhs.resolve(env);
                let right = rhs.resolve(env);
                compare(left, *op, right)
            },
        }
    }
}

impl MarkerValue {
    fn resolve<'a>(&'a self, env: &'a MarkerEnvironment) -> &'a str {
        match self {
            MarkerValue::Variable(variable) => env.get(*variable),
            MarkerValue::Literal(text) => text,
        }
    }
}

/// Version comparison when both sides look like versions, string comparison
/// otherwise. Comparisons that have no string meaning (`~=`, `===` on
/// non-versions) are false.
fn compare(left: &str, op: MarkerOp, right: &str) -> bool {
    match op {
        MarkerOp::In => right.contains(left),
        MarkerOp::NotIn => !right.contains(left),
        MarkerOp::Version(op) => {
            if ReleaseVersion::is_numeric(left) && ReleaseVersion::is_numeric(right) {
                if let Ok(spec) = VersionSpecifier::parse(&format!("{}{}", op, right)) {
                    return spec.contains(left);
                }
            }
            match op {
                Op::Exact => left == right,
                Op::NotEqual => left != right,
                Op::Less => left < right,
                Op::LessEq => left <= right,
                Op::Greater => left > right,
                Op::GreaterEq => left >= right,
                Op::Compatible | Op::Arbitrary => false,
            }
        },
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for Marker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Marker {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    And,
    Or,
    Not,
    In,
    Op(Op),
    Ident(String),
    Str(String),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::And => "'and'".to_string(),
            Token::Or => "'or'".to_string(),
            Token::Not => "'not'".to_string(),
            Token::In => "'in'".to_string(),
            Token::Op(op) => format!("'{}'", op),
            Token::Ident(name) => format!("'{}'", name),
            Token::Str(text) => format!("{:?}", text),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, MarkerError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            },
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            },
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            },
            '"' | '\'' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                for (_, next) in chars.by_ref() {
                    if next == c {
                        closed = true;
                        break;
                    }
                    text.push(next);
                }
                if !closed {
                    return Err(MarkerError::UnterminatedString { offset });
                }
                tokens.push(Token::Str(text));
            },
            '=' | '!' | '<' | '>' | '~' => {
                let (op, rest) = Op::strip_from(&input[offset..])
                    .ok_or(MarkerError::UnexpectedChar { found: c, offset })?;
                let consumed = input.len() - offset - rest.len();
                for _ in 0..consumed {
                    chars.next();
                }
                tokens.push(Token::Op(op));
            },
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut word = String::new();
                while let Some(&(_, next)) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' || next == '.' {
                        word.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(match word.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "in" => Token::In,
                    _ => Token::Ident(word),
                });
            },
            other => return Err(MarkerError::UnexpectedChar { found: other, offset }),
        }
    }

    Ok(tokens)
}

/// Deepest parenthesis nesting a marker may use
const MAX_NESTING: usize = 32;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn found(token: Option<&Token>) -> String {
        token.map_or_else(|| "end of marker".to_string(), Token::describe)
    }

    fn parse_or(&mut self) -> Result<MarkerExpr, MarkerError> {
        let mut expr = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let right = self.parse_and()?;
            expr = MarkerExpr::Or(Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<MarkerExpr, MarkerError> {
        let mut expr = self.parse_atom()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let right = self.parse_atom()?;
            expr = MarkerExpr::And(Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn parse_atom(&mut self) -> Result<MarkerExpr, MarkerError> {
        if self.peek() == Some(&Token::LParen) {
            if self.depth == MAX_NESTING {
                return Err(MarkerError::TooDeep { limit: MAX_NESTING });
            }
            self.pos += 1;
            self.depth += 1;
            let expr = self.parse_or()?;
            self.depth -= 1;
            return match self.next() {
                Some(Token::RParen) => Ok(expr),
                other => Err(MarkerError::Unexpected {
                    expected: "')'",
                    found: Self::found(other.as_ref()),
                }),
            };
        }

        let lhs = self.parse_value()?;
        let op = self.parse_op()?;
        let rhs = self.parse_value()?;
        Ok(MarkerExpr::Compare { lhs, op, rhs })
    }

    fn parse_value(&mut self) -> Result<MarkerValue, MarkerError> {
        match self.next() {
            Some(Token::Str(text)) => Ok(MarkerValue::Literal(text)),
            Some(Token::Ident(name)) => MarkerVariable::from_name(&name)
                .map(MarkerValue::Variable)
                .ok_or(MarkerError::UnknownVariable { name }),
            other => Err(MarkerError::Unexpected {
                expected: "a marker variable or quoted string",
                found: Self::found(other.as_ref()),
            }),
        }
    }

    fn parse_op(&mut self) -> Result<MarkerOp, MarkerError> {
        match self.next() {
            Some(Token::Op(op)) => Ok(MarkerOp::Version(op)),
            Some(Token::In) => Ok(MarkerOp::In),
            Some(Token::Not) => match self.next() {
                Some(Token::In) => Ok(MarkerOp::NotIn),
                other => Err(MarkerError::Unexpected {
                    expected: "'in' after 'not'",
                    found: Self::found(other.as_ref()),
                }),
            },
            other => Err(MarkerError::Unexpected {
                expected: "a comparison operator",
                found: Self::found(other.as_ref()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_keeps_text() {
        let marker = Marker::parse(r#" python_version>="3.6" "#).unwrap();
        assert_eq!(marker.as_str(), r#"python_version>="3.6""#);
        assert_eq!(
            marker.expr(),
            &MarkerExpr::Compare {
                lhs: MarkerValue::Variable(MarkerVariable::PythonVersion),
                op: MarkerOp::Version(Op::GreaterEq),
                rhs: MarkerValue::Literal("3.6".to_string()),
            }
        );
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let marker =
            Marker::parse(r#"os_name == "nt" or python_version < "3.7" and sys_platform == 'linux'"#)
                .unwrap();
        assert!(matches!(marker.expr(), MarkerExpr::Or(_, right) if matches!(**right, MarkerExpr::And(_, _))));
    }

    #[test]
    fn test_evaluate_python_version() {
        let marker = Marker::parse(r#"python_version >= "3.8""#).unwrap();
        assert!(marker.evaluate(&MarkerEnvironment::linux_cpython("3.10")));
        assert!(!marker.evaluate(&MarkerEnvironment::linux_cpython("3.6")));
    }

    #[test]
    fn test_evaluate_strings_and_membership() {
        let env = MarkerEnvironment::linux_cpython("3.6");
        assert!(Marker::parse(r#"sys_platform == "linux""#).unwrap().evaluate(&env));
        assert!(Marker::parse(r#"platform_system != "Windows""#).unwrap().evaluate(&env));
        assert!(Marker::parse(r#""linux" in sys_platform"#).unwrap().evaluate(&env));
        assert!(Marker::parse(r#"os_name not in "nt java""#).unwrap().evaluate(&env));
        assert!(Marker::parse(r#"(os_name == "nt" or os.name == "posix") and extra == """#)
            .unwrap()
            .evaluate(&env));
    }

    #[test]
    fn test_environment_from_short_version() {
        let env = MarkerEnvironment::linux_cpython("3.6");
        assert_eq!(env.python_version, "3.6");
        assert_eq!(env.python_full_version, "3.6.0");

        let env = MarkerEnvironment::linux_cpython("3.9.7");
        assert_eq!(env.python_version, "3.9");
    }

    #[test]
    fn test_marker_errors() {
        assert_eq!(Marker::parse("  "), Err(MarkerError::Empty));
        assert!(matches!(
            Marker::parse(r#"python_versoin >= "3.6""#),
            Err(MarkerError::UnknownVariable { .. })
        ));
        assert!(matches!(
            Marker::parse(r#"python_version >= "3.6"#),
            Err(MarkerError::UnterminatedString { .. })
        ));
        assert!(matches!(
            Marker::parse(r#"python_version "3.6""#),
            Err(MarkerError::Unexpected { .. })
        ));
        assert!(matches!(
            Marker::parse(r#"(python_version >= "3.6""#),
            Err(MarkerError::Unexpected { expected: "')'", .. })
        ));
        assert!(matches!(
            Marker::parse(r#"python_version = "3.6""#),
            Err(MarkerError::UnexpectedChar { found: '=', .. })
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |levels: usize| {
            format!("{}python_version >= \"3.6\"{}", "(".repeat(levels), ")".repeat(levels))
        };

        let marker = Marker::parse(&nested(MAX_NESTING)).unwrap();
        assert!(marker.evaluate(&MarkerEnvironment::linux_cpython("3.8")));

        assert_eq!(
            Marker::parse(&nested(MAX_NESTING + 1)),
            Err(MarkerError::TooDeep { limit: MAX_NESTING })
        );
        assert_eq!(
            Marker::parse(&nested(100_000)),
            Err(MarkerError::TooDeep { limit: MAX_NESTING })
        );
    }
}
