//! Declared field model used to build a [crate::plan::LayoutPlan].

/// A single named field in a record definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Name used for the generated accessor pair.
    pub name: String,
    /// Value kind; drives codec assignment and intrinsic sizing.
    pub kind: FieldKind,
    /// Optional explicit byte position. [PositionOverride::None] means the
    /// field starts where the previous one ends.
    pub position: PositionOverride,
    /// Optional explicit byte size, consulted after the kind's intrinsic width.
    pub size: SizeOverride,
    /// Visibility of the generated accessors.
    pub access: Access,
    /// Documentation text forwarded to the renderer.
    pub doc: Option<String>,
    /// True if the value type brings its own string rendering.
    pub self_display: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        FieldSpec {
            name: name.into(),
            kind,
            position: PositionOverride::None,
            size: SizeOverride::None,
            access: Access::Public,
            doc: None,
            self_display: false,
        }
    }
}

/// Value kind of a field. The set is closed: every resolver matches on it
/// exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Unsigned big-endian integer of `width` bytes (1, 2, 4 or 8).
    Uint { width: usize },
    /// Signed big-endian integer of `width` bytes (1, 2, 4 or 8).
    Int { width: usize },
    /// Single raw byte, no byte order conversion.
    Byte,
    /// Enum type read through a numeric codec. `backing` overrides the
    /// natural width when the wire field is narrower than the type.
    Enum {
        type_name: String,
        natural_width: usize,
        backing: Option<usize>,
    },
    /// Opaque type constructed from and written back to a byte range. The
    /// width is self-reported unless the field spec supplies one.
    Custom {
        type_name: String,
        width: Option<CustomWidth>,
    },
    /// Raw byte range; length comes from the size override or, on the final
    /// field, the remainder of the buffer.
    Bytes { writable: bool },
    /// Bit-packed member of a shared backing slot of `slot_width` bytes.
    /// Contiguous runs of these fields form one union slot.
    Bits { mask: u64, slot_width: usize },
}

/// How a [FieldKind::Custom] type reports its own byte width.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomWidth {
    /// Constant width known at generation time.
    Const(usize),
    /// Pure function `(buffer, offset) -> width`, evaluated at runtime.
    Function(String),
}

/// Explicit position of a field, overriding automatic accumulation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PositionOverride {
    /// Start where the previous field ends (offset 0 for the first field).
    #[default]
    None,
    /// Literal byte offset, independent of buffer contents.
    Const(usize),
    /// Pure function `(buffer, base) -> offset`. `base` is the explicit
    /// literal when given, otherwise the automatic offset.
    Function { name: String, base: Option<usize> },
}

/// Explicit size of a field, consulted after the kind's intrinsic width.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SizeOverride {
    #[default]
    None,
    /// Literal byte size. Carried signed so that negative generation-time
    /// constants can be rejected with a diagnostic.
    Const(i64),
    /// Pure size function evaluated at runtime.
    Function { name: String, arity: SizeArity },
    /// Size is the numeric value of another field.
    Field(String),
}

/// Call shape of a runtime size function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeArity {
    /// `name(buffer)`
    #[default]
    Buffer,
    /// `name(buffer, offset)` where `offset` is the sized field's own start.
    BufferAndOffset,
}

/// Visibility of the generated accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    #[default]
    Public,
    Crate,
}

/// An ordered record definition handed to the resolver. The name doubles as
/// the identity for layout memoization.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub name: String,
    /// Also emit a read-only accessor variant for this definition.
    pub read_only: bool,
    /// Fields in declared order.
    pub fields: Vec<FieldSpec>,
}

impl Definition {
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Definition {
            name: name.into(),
            read_only: false,
            fields,
        }
    }
}
