use cu::pre::*;

use crate::TranslationUnit;

/// What the upstream parser hands back: either the AST, or a structured
/// diagnostic when the source did not parse
///
/// The envelope is the JSON interface between the analyzer and whichever
/// parser frontend produced the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseOutput {
    Ast(TranslationUnit),
    Error(ParseDiagnostic),
}

/// A parse diagnostic from the upstream parser
///
/// Line numbers are 1-based positions into the prepared source, i.e.
/// including the injected typedef line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseDiagnostic {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl ParseOutput {
    /// Unwrap the AST, turning a diagnostic into a rendered syntax error
    ///
    /// `source` is the prepared source the parser saw; it supplies the
    /// offending line for the message. Reported line numbers are
    /// decremented by one to undo the injected typedef line.
    pub fn into_ast(self, source: &str) -> cu::Result<TranslationUnit> {
        let diag = match self {
            Self::Ast(unit) => return Ok(unit),
            Self::Error(diag) => diag,
        };
        let mut posstr = String::new();
        if let Some(line) = diag.line {
            let line = line.saturating_sub(1);
            posstr = format!(" at line {line}");
            if let Some(column) = diag.column {
                posstr.push_str(&format!(", column {column}"));
            }
            match source.split('\n').nth(line as usize) {
                Some(text) => {
                    posstr.push_str("\n\n");
                    posstr.push_str(text.trim_end());
                }
                None => posstr.push_str("(out of bounds?)"),
            }
        }
        cu::bail!("Syntax error when parsing C context.\n{}{posstr}", diag.message);
    }
}
