use std::{fmt, path::PathBuf};

/// A non-fatal finding, reported alongside a successful result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: u32,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(line: u32, kind: DiagnosticKind) -> Diagnostic {
        Diagnostic { line, kind }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    EnumSentinelInserted {
        enum_name: String,
        sentinel: String,
    },
    MissingUuid {
        interface: String,
    },
    UnresolvedImport {
        path: PathBuf,
        reason: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: warning: ", self.line)?;
        match &self.kind {
            DiagnosticKind::EnumSentinelInserted {
                enum_name,
                sentinel,
            } => write!(
                f,
                "enum `{enum_name}` has no member equal to 0x7FFFFFFF, inserted `{sentinel}`"
            ),
            DiagnosticKind::MissingUuid { interface } => write!(
                f,
                "interface `{interface}` has no uuid, its identifier is derived from an empty string"
            ),
            DiagnosticKind::UnresolvedImport { path, reason } => {
                write!(f, "cannot import `{}`: {reason}", path.display())
            }
        }
    }
}
