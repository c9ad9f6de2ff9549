//! Symbolic offset and size expressions.
//!
//! A resolved layout does not hold plain numbers: a field's position or
//! length may depend on buffer contents (a length field, a runtime size
//! function). Expressions render to accessor template strings parameterized
//! by the buffer token; constant expressions fold to literals.

/// Token the renderer replaces with the buffer binding.
pub const BUF: &str = "{buf}";
/// Token the renderer replaces with the value being written.
pub const VAL: &str = "{val}";

/// Starting byte offset of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum OffsetExpr {
    /// Statically known offset.
    Const(usize),
    /// End of the previous field: its offset plus its size.
    After(Box<OffsetExpr>, Box<SizeExpr>),
    /// Runtime position function `function(buffer, base)`.
    Call { function: String, base: Box<OffsetExpr> },
}

impl OffsetExpr {
    /// Offset immediately after a field with the given offset and size.
    /// Folds to a constant when both are constants.
    pub fn after(offset: &OffsetExpr, size: &SizeExpr) -> OffsetExpr {
        match (offset.const_value(), size.const_value()) {
            (Some(o), Some(s)) => OffsetExpr::Const(o + s),
            _ => OffsetExpr::After(Box::new(offset.clone()), Box::new(size.clone())),
        }
    }

    pub fn const_value(&self) -> Option<usize> {
        match self {
            OffsetExpr::Const(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_const(&self) -> bool {
        self.const_value().is_some()
    }

    pub fn render(&self) -> String {
        match self {
            OffsetExpr::Const(n) => n.to_string(),
            OffsetExpr::After(offset, size) => {
                let at = offset.render();
                format!("{} + {}", at, size.render_at(&at))
            }
            OffsetExpr::Call { function, base } => {
                format!("{}({}, {})", function, BUF, base.render())
            }
        }
    }
}

/// Byte length of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum SizeExpr {
    /// Statically known size.
    Const(usize),
    /// Runtime size function.
    Call {
        function: String,
        arity: crate::field::SizeArity,
    },
    /// Size is the numeric value of another field; `read` is that field's
    /// rendered read expression.
    Field { name: String, read: String },
    /// Everything left in the buffer. Legal only on the final field.
    Remainder,
}

impl SizeExpr {
    pub fn const_value(&self) -> Option<usize> {
        match self {
            SizeExpr::Const(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_const(&self) -> bool {
        self.const_value().is_some()
    }

    /// Renders this size for a field starting at the rendered offset `at`.
    pub fn render_at(&self, at: &str) -> String {
        match self {
            SizeExpr::Const(n) => n.to_string(),
            SizeExpr::Call { function, arity } => match arity {
                crate::field::SizeArity::Buffer => format!("{}({})", function, BUF),
                crate::field::SizeArity::BufferAndOffset => {
                    format!("{}({}, {})", function, BUF, at)
                }
            },
            SizeExpr::Field { read, .. } => read.clone(),
            SizeExpr::Remainder => format!("{}.len() - {}", BUF, group(at)),
        }
    }
}

/// Parenthesizes a rendered sub-expression unless it is a bare literal or a
/// single call.
pub(crate) fn group(rendered: &str) -> String {
    if rendered.contains(' ') {
        format!("({})", rendered)
    } else {
        rendered.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::SizeArity;

    #[test]
    fn test_after_folds_constants() {
        let offset = OffsetExpr::after(&OffsetExpr::Const(2), &SizeExpr::Const(4));
        assert_eq!(offset, OffsetExpr::Const(6));
    }

    #[test]
    fn test_after_keeps_dynamic_chain() {
        let options_len = SizeExpr::Call {
            function: "options_len".to_string(),
            arity: SizeArity::BufferAndOffset,
        };
        let offset = OffsetExpr::after(&OffsetExpr::Const(20), &options_len);
        assert!(!offset.is_const());
        assert_eq!(offset.render(), "20 + options_len({buf}, 20)");
    }

    #[test]
    fn test_position_function_renders_base() {
        let offset = OffsetExpr::Call {
            function: "payload_offset".to_string(),
            base: Box::new(OffsetExpr::Const(14)),
        };
        assert_eq!(offset.render(), "payload_offset({buf}, 14)");
    }

    #[test]
    fn test_remainder_renders_buffer_tail() {
        let size = SizeExpr::Remainder;
        assert_eq!(size.render_at("8"), "{buf}.len() - 8");

        let chained = OffsetExpr::After(
            Box::new(OffsetExpr::Const(2)),
            Box::new(SizeExpr::Field {
                name: "len".to_string(),
                read: "read_u16_be({buf}, 0) as usize".to_string(),
            }),
        );
        assert_eq!(
            size.render_at(&chained.render()),
            "{buf}.len() - (2 + read_u16_be({buf}, 0) as usize)"
        );
    }
}
