//! Turns Rhai errors into located, human readable reports.

use rhai::{EvalAltResult, ParseError, Position};
use std::fmt::Write;
use std::path::Path;

/// An error reduced to its message, location and call chain.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Located {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
    /// Outermost call first.
    pub trace: Vec<String>,
}

fn location(pos: Position) -> String {
    match (pos.line(), pos.position()) {
        (Some(line), Some(col)) => format!(" at line {}, column {}", line, col),
        (Some(line), None) => format!(" at line {}", line),
        _ => String::new(),
    }
}

impl Located {
    pub fn from_parse(err: &ParseError) -> Self {
        let pos = err.position();
        Self {
            message: err.to_string(),
            line: pos.line(),
            column: pos.position(),
            trace: Vec::new(),
        }
    }

    /// Unwraps nested function-call errors down to the one that was raised.
    pub fn from_eval(err: &EvalAltResult) -> Self {
        let mut trace = Vec::new();
        let mut current = err;
        while let EvalAltResult::ErrorInFunctionCall(name, _, inner, pos) = current {
            trace.push(format!("in call to '{}'{}", name, location(*pos)));
            current = inner.as_ref();
        }
        let pos = current.position();
        Self {
            message: current.to_string(),
            line: pos.line(),
            column: pos.position(),
            trace,
        }
    }

    /// Header, message, the offending source line with a caret, then the
    /// call chain.
    pub fn report(&self, phase: &str, path: &Path, source: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} failed: {}", phase, path.display());
        let _ = writeln!(out, "{}", self.message);
        if let Some(line) = self.line {
            if let Some(text) = source.lines().nth(line.saturating_sub(1)) {
                let gutter = line.to_string();
                let _ = writeln!(out, "{} | {}", gutter, text);
                if let Some(col) = self.column {
                    let _ = writeln!(
                        out,
                        "{} | {}^",
                        " ".repeat(gutter.len()),
                        " ".repeat(col.saturating_sub(1))
                    );
                }
            }
        }
        for frame in &self.trace {
            let _ = writeln!(out, "  {}", frame);
        }
        out.trim_end().to_string()
    }
}
