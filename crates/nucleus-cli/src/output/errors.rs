//! Error message formatting with actionable suggestions.
//!
//! Manifest parse errors additionally point at the offending line:
//!
//! ```text
//! error: Invalid requirement at reqs.txt:3: "numpy=>1.0": ...
//!  --> reqs.txt:3
//!   |
//! 3 | numpy=>1.0
//!   |
//! ```

use super::colors::ColorSupport;
use nucleus_core::error::NucleusError;
use std::error::Error;
use std::fmt::Write as _;

/// Error formatter with suggestions
pub struct ErrorFormatter {
    colors: ColorSupport,
}

impl ErrorFormatter {
    /// Create a new error formatter
    pub fn new() -> Self {
        Self {
            colors: ColorSupport::detect(),
        }
    }

    #[cfg(test)]
    pub fn with_colors(colors: ColorSupport) -> Self {
        Self { colors }
    }

    /// Format an error with context and suggestions
    pub fn format_error(&self, error: &NucleusError) -> String {
        let mut output = String::new();

        output.push_str(&self.colors.red("error"));
        output.push_str(": ");
        output.push_str(&error.to_string());
        output.push('\n');

        if let NucleusError::Parse { path, line, content, .. } = error {
            output.push_str(&self.format_location(&path.display().to_string(), *line, content));
        }

        if let Some(suggestion) = error.suggestion() {
            output.push('\n');
            output.push_str(&self.colors.dim("help"));
            output.push_str(": ");
            output.push_str(suggestion);
            output.push('\n');
        }

        let mut source = error.source();
        while let Some(err) = source {
            output.push('\n');
            output.push_str(&self.colors.dim("caused by"));
            output.push_str(": ");
            output.push_str(&err.to_string());
            source = err.source();
        }

        output
    }

    /// Format the file location and source line of a manifest error
    pub fn format_location(&self, file: &str, line: usize, content: &str) -> String {
        let number = line.to_string();
        let pad = " ".repeat(number.len());
        let gutter = self.colors.blue("|");

        let mut output = String::new();
        let _ = writeln!(output, "{}{} {}:{}", pad, self.colors.blue("-->"), file, line);
        let _ = writeln!(output, "{} {}", pad, gutter);
        let _ = writeln!(output, "{} {} {}", self.colors.blue(&number), gutter, content);
        let _ = writeln!(output, "{} {}", pad, gutter);
        output
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}
