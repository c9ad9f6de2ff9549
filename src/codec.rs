//! Value codec assignment: maps a field kind to get/set accessor templates
//! over a resolved byte range.
//!
//! Templates are strings parameterized by [crate::expr::BUF] and
//! [crate::expr::VAL]; offsets and lengths are rendered expressions. Numeric
//! codecs call the helpers in [crate::bytes] by name; the single-byte codec
//! indexes the buffer directly with no byte order conversion.

use crate::{
    expr::{BUF, OffsetExpr, SizeExpr, VAL, group},
    field::FieldKind,
    mask,
};

/// Validated numeric width in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    W1,
    W2,
    W4,
    W8,
}

impl Width {
    pub fn from_bytes(n: usize) -> Option<Width> {
        match n {
            1 => Some(Width::W1),
            2 => Some(Width::W2),
            4 => Some(Width::W4),
            8 => Some(Width::W8),
            _ => None,
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            Width::W1 => 1,
            Width::W2 => 2,
            Width::W4 => 4,
            Width::W8 => 8,
        }
    }

    pub fn bits(self) -> usize {
        self.bytes() * 8
    }
}

/// Get/set accessor templates for one resolved field. `set` is absent for
/// read-only byte ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codec {
    pub get: String,
    pub set: Option<String>,
}

impl Codec {
    pub fn settable(&self) -> bool {
        self.set.is_some()
    }
}

/// Unsigned read expression of `width` bytes at the rendered offset `at`.
pub(crate) fn uint_read(width: Width, at: &str) -> String {
    match width {
        Width::W1 => format!("{}[{}]", BUF, at),
        Width::W2 => format!("read_u16_be({}, {})", BUF, at),
        Width::W4 => format!("read_u32_be({}, {})", BUF, at),
        Width::W8 => format!("read_u64_be({}, {})", BUF, at),
    }
}

fn uint_write(width: Width, at: &str, value: &str) -> String {
    match width {
        Width::W1 => format!("{}[{}] = {}", BUF, at, value),
        Width::W2 => format!("write_u16_be({}, {}, {})", BUF, at, value),
        Width::W4 => format!("write_u32_be({}, {}, {})", BUF, at, value),
        Width::W8 => format!("write_u64_be({}, {}, {})", BUF, at, value),
    }
}

fn int_read(width: Width, at: &str) -> String {
    match width {
        Width::W1 => format!("{}[{}] as i8", BUF, at),
        Width::W2 => format!("read_i16_be({}, {})", BUF, at),
        Width::W4 => format!("read_i32_be({}, {})", BUF, at),
        Width::W8 => format!("read_i64_be({}, {})", BUF, at),
    }
}

fn int_write(width: Width, at: &str, value: &str) -> String {
    match width {
        Width::W1 => format!("{}[{}] = {} as u8", BUF, at, value),
        Width::W2 => format!("write_i16_be({}, {}, {})", BUF, at, value),
        Width::W4 => format!("write_i32_be({}, {}, {})", BUF, at, value),
        Width::W8 => format!("write_i64_be({}, {}, {})", BUF, at, value),
    }
}

/// Rendered end of a byte range: `offset + length`.
fn range_end(at: &str, size: &SizeExpr) -> String {
    format!("{} + {}", at, group(&size.render_at(at)))
}

/// Assigns the codec for a non-bit-packed field. Numeric widths must have
/// been validated before this runs.
pub fn assign(kind: &FieldKind, offset: &OffsetExpr, size: &SizeExpr) -> Codec {
    let at = offset.render();

    match kind {
        FieldKind::Uint { width } => {
            let width = Width::from_bytes(*width).unwrap_or(Width::W1);
            Codec {
                get: uint_read(width, &at),
                set: Some(uint_write(width, &at, VAL)),
            }
        }
        FieldKind::Int { width } => {
            let width = Width::from_bytes(*width).unwrap_or(Width::W1);
            Codec {
                get: int_read(width, &at),
                set: Some(int_write(width, &at, VAL)),
            }
        }
        FieldKind::Byte => Codec {
            get: format!("{}[{}]", BUF, at),
            set: Some(format!("{}[{}] = {}", BUF, at, VAL)),
        },
        FieldKind::Enum {
            type_name,
            natural_width,
            backing,
        } => {
            let width = Width::from_bytes(backing.unwrap_or(*natural_width)).unwrap_or(Width::W1);
            Codec {
                get: format!("{}::from({})", type_name, uint_read(width, &at)),
                set: Some(uint_write(
                    width,
                    &at,
                    &format!("u{}::from({})", width.bits(), VAL),
                )),
            }
        }
        FieldKind::Bytes { writable } => match size {
            SizeExpr::Remainder => Codec {
                get: format!("&{}[{}..]", BUF, at),
                set: writable.then(|| format!("{}[{}..].copy_from_slice({})", BUF, at, VAL)),
            },
            _ => {
                let end = range_end(&at, size);
                Codec {
                    get: format!("&{}[{}..{}]", BUF, at, end),
                    set: writable
                        .then(|| format!("{}[{}..{}].copy_from_slice({})", BUF, at, end, VAL)),
                }
            }
        },
        FieldKind::Custom { type_name, .. } => {
            let end = range_end(&at, size);
            Codec {
                get: format!("{}::read(&{}[{}..{}])", type_name, BUF, at, end),
                set: Some(format!("{}.write(&mut {}[{}..{}])", VAL, BUF, at, end)),
            }
        }
        // Bit-packed members are wrapped through `packed` by the union
        // resolver and never reach plain assignment.
        FieldKind::Bits { mask, slot_width } => {
            let width = Width::from_bytes(*slot_width).unwrap_or(Width::W1);
            packed(*mask, width, offset)
        }
    }
}

/// Narrows the numeric codec of a backing slot to the masked bit range.
///
/// get: `(backing & mask) >> low_bit`
/// set: `backing = (backing & !mask) | ((value << low_bit) & mask)`
pub fn packed(mask: u64, slot_width: Width, offset: &OffsetExpr) -> Codec {
    let at = offset.render();
    let low = mask::low_bit(mask);
    let mask_hex = format!("{:#x}", mask);
    let backing = uint_read(slot_width, &at);

    let get = if low == 0 {
        format!("{} & {}", backing, mask_hex)
    } else {
        format!("({} & {}) >> {}", backing, mask_hex, low)
    };

    let shifted = if low == 0 {
        VAL.to_string()
    } else {
        format!("({} << {})", VAL, low)
    };
    let updated = format!("({} & !{}) | ({} & {})", backing, mask_hex, shifted, mask_hex);

    Codec {
        get,
        set: Some(uint_write(slot_width, &at, &updated)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::CustomWidth;

    #[test]
    fn test_wide_uint_uses_big_endian_helpers() {
        let codec = assign(
            &FieldKind::Uint { width: 2 },
            &OffsetExpr::Const(4),
            &SizeExpr::Const(2),
        );
        assert_eq!(codec.get, "read_u16_be({buf}, 4)");
        assert_eq!(codec.set.as_deref(), Some("write_u16_be({buf}, 4, {val})"));
    }

    #[test]
    fn test_single_byte_indexes_directly() {
        let codec = assign(&FieldKind::Byte, &OffsetExpr::Const(0), &SizeExpr::Const(1));
        assert_eq!(codec.get, "{buf}[0]");
        assert_eq!(codec.set.as_deref(), Some("{buf}[0] = {val}"));
    }

    #[test]
    fn test_enum_backing_narrows_the_codec() {
        let kind = FieldKind::Enum {
            type_name: "EtherType".to_string(),
            natural_width: 4,
            backing: Some(2),
        };
        let codec = assign(&kind, &OffsetExpr::Const(12), &SizeExpr::Const(2));
        assert_eq!(codec.get, "EtherType::from(read_u16_be({buf}, 12))");
        assert_eq!(
            codec.set.as_deref(),
            Some("write_u16_be({buf}, 12, u16::from({val}))")
        );
    }

    #[test]
    fn test_read_only_byte_range_has_no_setter() {
        let codec = assign(
            &FieldKind::Bytes { writable: false },
            &OffsetExpr::Const(8),
            &SizeExpr::Remainder,
        );
        assert_eq!(codec.get, "&{buf}[8..]");
        assert!(!codec.settable());
    }

    #[test]
    fn test_sized_byte_range() {
        let codec = assign(
            &FieldKind::Bytes { writable: true },
            &OffsetExpr::Const(0),
            &SizeExpr::Const(6),
        );
        assert_eq!(codec.get, "&{buf}[0..0 + 6]");
        assert_eq!(
            codec.set.as_deref(),
            Some("{buf}[0..0 + 6].copy_from_slice({val})")
        );
    }

    #[test]
    fn test_custom_type_round_trips_through_ranges() {
        let kind = FieldKind::Custom {
            type_name: "MacAddr".to_string(),
            width: Some(CustomWidth::Const(6)),
        };
        let codec = assign(&kind, &OffsetExpr::Const(6), &SizeExpr::Const(6));
        assert_eq!(codec.get, "MacAddr::read(&{buf}[6..6 + 6])");
        assert_eq!(
            codec.set.as_deref(),
            Some("{val}.write(&mut {buf}[6..6 + 6])")
        );
    }

    #[test]
    fn test_packed_member_templates() {
        let codec = packed(0b1111_0000, Width::W1, &OffsetExpr::Const(0));
        assert_eq!(codec.get, "({buf}[0] & 0xf0) >> 4");
        assert_eq!(
            codec.set.as_deref(),
            Some("{buf}[0] = ({buf}[0] & !0xf0) | (({val} << 4) & 0xf0)")
        );
    }
}
