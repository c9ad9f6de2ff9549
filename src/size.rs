//! Size resolution: computes a field's length expression or the remainder
//! marker.
//!
//! Defaulting precedence: explicit constant, then the kind's intrinsic
//! width, then a custom type's self-reported width, then an explicit size
//! function, then size-by-reference-field, then remainder (byte ranges
//! only). Runtime-computed sizes are trusted as-is; only generation-time
//! constants are range-checked.

use std::collections::HashMap;

use crate::{
    codec::{Width, uint_read},
    diagnostics::{DiagnosticCode, Diagnostics},
    expr::{OffsetExpr, SizeExpr},
    field::{CustomWidth, FieldKind, FieldSpec, SizeOverride},
};

/// Outcome of sizing one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Size(SizeExpr),
    /// The field is omitted from the plan; accumulation continues as if it
    /// had zero size.
    Dropped,
}

/// Offset and kind of an already-emitted field, for back references.
pub type EmittedFields = HashMap<String, (OffsetExpr, FieldKind)>;

/// Sizes `fields[index]`, walking the defaulting ladder top to bottom.
pub fn resolve(
    definition: &str,
    fields: &[FieldSpec],
    index: usize,
    emitted: &EmittedFields,
    diags: &mut Diagnostics,
) -> Resolution {
    let field = &fields[index];
    let is_last = index + 1 == fields.len();

    if let SizeOverride::Const(size) = field.size {
        if size < 0 {
            diags.report(
                DiagnosticCode::NegativeSize,
                definition,
                Some(&field.name),
                format!("explicit size {} of `{}` is negative", size, field.name),
            );
            return Resolution::Dropped;
        }
        return Resolution::Size(SizeExpr::Const(size as usize));
    }

    match &field.kind {
        FieldKind::Uint { width } | FieldKind::Int { width } => {
            return Resolution::Size(SizeExpr::Const(*width));
        }
        FieldKind::Byte => return Resolution::Size(SizeExpr::Const(1)),
        FieldKind::Enum {
            natural_width,
            backing,
            ..
        } => {
            return Resolution::Size(SizeExpr::Const(backing.unwrap_or(*natural_width)));
        }
        FieldKind::Custom {
            width: Some(CustomWidth::Const(width)),
            ..
        } => return Resolution::Size(SizeExpr::Const(*width)),
        FieldKind::Custom {
            width: Some(CustomWidth::Function(function)),
            ..
        } => {
            // The type reads its own bytes to report its width.
            return Resolution::Size(SizeExpr::Call {
                function: function.clone(),
                arity: crate::field::SizeArity::BufferAndOffset,
            });
        }
        FieldKind::Custom { width: None, .. } | FieldKind::Bytes { .. } => {}
        // Bit-packed members are sized by their union slot.
        FieldKind::Bits { .. } => return Resolution::Dropped,
    }

    match &field.size {
        SizeOverride::Function { name, arity } => {
            return Resolution::Size(SizeExpr::Call {
                function: name.clone(),
                arity: *arity,
            });
        }
        SizeOverride::Field(target) => {
            return reference(definition, fields, index, target, emitted, diags);
        }
        SizeOverride::None | SizeOverride::Const(_) => {}
    }

    match &field.kind {
        FieldKind::Bytes { .. } if is_last => Resolution::Size(SizeExpr::Remainder),
        FieldKind::Bytes { .. } => {
            diags.report(
                DiagnosticCode::MisplacedRemainder,
                definition,
                Some(&field.name),
                format!(
                    "byte range `{}` has no size and is not the final field",
                    field.name
                ),
            );
            Resolution::Dropped
        }
        _ => {
            diags.report(
                DiagnosticCode::MissingCustomWidth,
                definition,
                Some(&field.name),
                format!(
                    "custom type of `{}` reports no width and the field declares none",
                    field.name
                ),
            );
            Resolution::Dropped
        }
    }
}

/// Sizes a field by the numeric value of another field. A later reference
/// is an ordering hazard unless that field has a constant position; every
/// rejection falls back to size 0 with the field still emitted.
fn reference(
    definition: &str,
    fields: &[FieldSpec],
    index: usize,
    target: &str,
    emitted: &EmittedFields,
    diags: &mut Diagnostics,
) -> Resolution {
    if let Some((offset, kind)) = emitted.get(target) {
        match numeric_read(kind, offset) {
            Some(read) => {
                return Resolution::Size(SizeExpr::Field {
                    name: target.to_string(),
                    read,
                });
            }
            None => {
                diags.report(
                    DiagnosticCode::NonNumericSizeField,
                    definition,
                    Some(&fields[index].name),
                    format!("size field `{}` cannot produce a numeric value", target),
                );
                return Resolution::Size(SizeExpr::Const(0));
            }
        }
    }

    match fields.iter().position(|f| f.name == target) {
        Some(later) if later > index => {
            if let crate::field::PositionOverride::Const(at) = fields[later].position {
                match numeric_read(&fields[later].kind, &OffsetExpr::Const(at)) {
                    Some(read) => {
                        return Resolution::Size(SizeExpr::Field {
                            name: target.to_string(),
                            read,
                        });
                    }
                    None => {
                        diags.report(
                            DiagnosticCode::NonNumericSizeField,
                            definition,
                            Some(&fields[index].name),
                            format!("size field `{}` cannot produce a numeric value", target),
                        );
                    }
                }
            } else {
                diags.report(
                    DiagnosticCode::ForwardSizeReference,
                    definition,
                    Some(&fields[index].name),
                    format!(
                        "size field `{}` comes later in the layout and has no constant position",
                        target
                    ),
                );
            }
        }
        _ => {
            diags.report(
                DiagnosticCode::UnknownSizeField,
                definition,
                Some(&fields[index].name),
                format!("size field `{}` does not exist or was not resolved", target),
            );
        }
    }

    Resolution::Size(SizeExpr::Const(0))
}

/// Read expression for a field's raw numeric value, as a length.
fn numeric_read(kind: &FieldKind, offset: &OffsetExpr) -> Option<String> {
    let at = offset.render();
    let width = match kind {
        FieldKind::Uint { width } | FieldKind::Int { width } => Width::from_bytes(*width)?,
        FieldKind::Byte => Width::W1,
        FieldKind::Enum {
            natural_width,
            backing,
            ..
        } => Width::from_bytes(backing.unwrap_or(*natural_width))?,
        FieldKind::Custom { .. } | FieldKind::Bytes { .. } | FieldKind::Bits { .. } => return None,
    };

    Some(format!("{} as usize", uint_read(width, &at)))
}
