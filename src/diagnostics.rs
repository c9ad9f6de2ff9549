//! Diagnostics reported while resolving definitions.
//!
//! Field-level failures never abort a definition and definition-level
//! failures never abort a batch: each one is recorded here and resolution
//! continues with the offending field dropped or replaced by a zero-sized
//! placeholder.

use thiserror::Error;

/// Machine-readable failure codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCode {
    /// A remainder-sized byte range appeared before the final field.
    MisplacedRemainder,
    /// A field is sized by a later field that has no constant position.
    ForwardSizeReference,
    /// A field is sized by a field that does not exist or was not resolved.
    UnknownSizeField,
    /// A field is sized by a field that cannot produce a numeric value.
    NonNumericSizeField,
    /// Explicit size constant is negative.
    NegativeSize,
    /// A custom type supplies no width and the field spec none either.
    MissingCustomWidth,
    /// Numeric width is not 1, 2, 4 or 8 bytes.
    InvalidWidth,
    /// Union members disagree on the backing slot width, so the slot size
    /// cannot be statically determined.
    UnsizedUnion,
    /// Bitmask is zero or does not fit the backing slot.
    InvalidMask,
    /// Bitmask members of one slot overlap.
    OverlappingMasks,
    /// Unexpected fault while resolving one definition.
    Internal,
}

/// One recorded failure: code, definition, offending field, human message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub definition: String,
    pub field: Option<String>,
    pub message: String,
}

/// Collecting sink for [Diagnostic]s, passed through one resolution run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Diagnostics {
    pub entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn report(
        &mut self,
        code: DiagnosticCode,
        definition: &str,
        field: Option<&str>,
        message: String,
    ) {
        self.entries.push(Diagnostic {
            code,
            definition: definition.to_string(),
            field: field.map(str::to_string),
            message,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Codes in report order, for asserting on outcomes.
    pub fn codes(&self) -> Vec<DiagnosticCode> {
        self.entries.iter().map(|d| d.code).collect()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

/// Structural errors on a whole definition. These stop the one definition
/// instead of producing a partial plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("duplicate field name `{0}`")]
    DuplicateFieldName(String),
}
