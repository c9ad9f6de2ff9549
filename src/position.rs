//! Position resolution: computes a field's start-offset expression from its
//! own spec and the previously resolved field.

use crate::{
    expr::{OffsetExpr, SizeExpr},
    field::PositionOverride,
};

/// Resolves the offset of one field. `prev` is the previous field's resolved
/// offset and size, or `None` at the start of the definition.
///
/// An explicit position affects only its own field: accumulation for the
/// next field resumes relative to the override.
pub fn resolve(
    position: &PositionOverride,
    prev: Option<&(OffsetExpr, SizeExpr)>,
) -> OffsetExpr {
    let automatic = || match prev {
        None => OffsetExpr::Const(0),
        Some((offset, size)) => OffsetExpr::after(offset, size),
    };

    match position {
        PositionOverride::None => automatic(),
        PositionOverride::Const(offset) => OffsetExpr::Const(*offset),
        PositionOverride::Function { name, base } => OffsetExpr::Call {
            function: name.clone(),
            base: Box::new(match base {
                Some(offset) => OffsetExpr::Const(*offset),
                None => automatic(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_field_starts_at_zero() {
        let offset = resolve(&PositionOverride::None, None);
        assert_eq!(offset, OffsetExpr::Const(0));
    }

    #[test]
    fn test_automatic_accumulation() {
        let prev = (OffsetExpr::Const(2), SizeExpr::Const(4));
        let offset = resolve(&PositionOverride::None, Some(&prev));
        assert_eq!(offset, OffsetExpr::Const(6));
    }

    #[test]
    fn test_constant_override_ignores_previous_field() {
        let prev = (OffsetExpr::Const(2), SizeExpr::Const(4));
        let offset = resolve(&PositionOverride::Const(20), Some(&prev));
        assert_eq!(offset, OffsetExpr::Const(20));
    }

    #[test]
    fn test_function_defaults_to_automatic_base() {
        let prev = (OffsetExpr::Const(0), SizeExpr::Const(14));
        let position = PositionOverride::Function {
            name: "payload_offset".to_string(),
            base: None,
        };
        let offset = resolve(&position, Some(&prev));
        assert_eq!(offset.render(), "payload_offset({buf}, 14)");
    }

    #[test]
    fn test_function_with_explicit_base() {
        let prev = (OffsetExpr::Const(0), SizeExpr::Const(14));
        let position = PositionOverride::Function {
            name: "payload_offset".to_string(),
            base: Some(40),
        };
        let offset = resolve(&position, Some(&prev));
        assert_eq!(offset.render(), "payload_offset({buf}, 40)");
    }
}
