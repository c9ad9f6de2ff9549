//! JSON‑deserializable definition shapes.
//!
//! These types describe record definitions as a front end would hand them
//! over (for example a definition file shipped with the generator) and
//! convert into the core field model before resolution. The engine has no
//! opinion on how a declarative source produces them.

use serde::{Deserialize, Serialize};

use crate::field;

/// Top‑level definition: a named, ordered list of fields.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DefinitionDef {
    pub name: String,
    /// Also generate a read‑only accessor variant.
    #[serde(default)]
    pub read_only: bool,
    pub fields: Vec<FieldDef>,
}

/// Description of a single field.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FieldDef {
    /// Accessor name.
    pub name: String,
    /// Value kind.
    pub kind: FieldKindDef,
    /// Optional explicit byte position.
    #[serde(default)]
    pub position: Option<PositionDef>,
    /// Optional explicit byte size.
    #[serde(default)]
    pub size: Option<SizeDef>,
    #[serde(default)]
    pub access: AccessDef,
    /// Documentation text forwarded to the renderer.
    #[serde(default)]
    pub doc: Option<String>,
    /// The value type brings its own string rendering.
    #[serde(default)]
    pub display: bool,
}

/// Value kind of a field.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "type")]
pub enum FieldKindDef {
    /// Unsigned big‑endian integer of `width` bytes.
    Uint { width: usize },
    /// Signed big‑endian integer of `width` bytes.
    Int { width: usize },
    /// Single raw byte.
    Byte,
    /// Enum read through a numeric codec, optionally narrowed to `backing`.
    Enum {
        type_name: String,
        natural_width: usize,
        #[serde(default)]
        backing: Option<usize>,
    },
    /// Opaque type with an optional self‑reported width.
    Custom {
        type_name: String,
        #[serde(default)]
        width: Option<CustomWidthDef>,
    },
    /// Raw byte range.
    Bytes {
        #[serde(default)]
        writable: bool,
    },
    /// Bit‑packed member of a shared backing slot.
    Bits { mask: u64, slot_width: usize },
}

/// Self‑reported width of a custom type.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "type")]
pub enum CustomWidthDef {
    Const { width: usize },
    Function { name: String },
}

/// Explicit field position.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "type")]
pub enum PositionDef {
    Const {
        offset: usize,
    },
    Function {
        name: String,
        #[serde(default)]
        base: Option<usize>,
    },
}

/// Explicit field size.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "type")]
pub enum SizeDef {
    Const {
        size: i64,
    },
    Function {
        name: String,
        #[serde(default)]
        arity: SizeArityDef,
    },
    Field {
        name: String,
    },
}

/// Call shape of a runtime size function.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub enum SizeArityDef {
    #[default]
    Buffer,
    BufferAndOffset,
}

/// Accessor visibility.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub enum AccessDef {
    #[default]
    Public,
    Crate,
}

impl From<DefinitionDef> for field::Definition {
    fn from(value: DefinitionDef) -> Self {
        field::Definition {
            name: value.name,
            read_only: value.read_only,
            fields: value.fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<FieldDef> for field::FieldSpec {
    fn from(value: FieldDef) -> Self {
        field::FieldSpec {
            name: value.name,
            kind: value.kind.into(),
            position: match value.position {
                None => field::PositionOverride::None,
                Some(PositionDef::Const { offset }) => field::PositionOverride::Const(offset),
                Some(PositionDef::Function { name, base }) => {
                    field::PositionOverride::Function { name, base }
                }
            },
            size: match value.size {
                None => field::SizeOverride::None,
                Some(SizeDef::Const { size }) => field::SizeOverride::Const(size),
                Some(SizeDef::Function { name, arity }) => field::SizeOverride::Function {
                    name,
                    arity: arity.into(),
                },
                Some(SizeDef::Field { name }) => field::SizeOverride::Field(name),
            },
            access: value.access.into(),
            doc: value.doc,
            self_display: value.display,
        }
    }
}

impl From<FieldKindDef> for field::FieldKind {
    fn from(value: FieldKindDef) -> Self {
        match value {
            FieldKindDef::Uint { width } => field::FieldKind::Uint { width },
            FieldKindDef::Int { width } => field::FieldKind::Int { width },
            FieldKindDef::Byte => field::FieldKind::Byte,
            FieldKindDef::Enum {
                type_name,
                natural_width,
                backing,
            } => field::FieldKind::Enum {
                type_name,
                natural_width,
                backing,
            },
            FieldKindDef::Custom { type_name, width } => field::FieldKind::Custom {
                type_name,
                width: width.map(Into::into),
            },
            FieldKindDef::Bytes { writable } => field::FieldKind::Bytes { writable },
            FieldKindDef::Bits { mask, slot_width } => {
                field::FieldKind::Bits { mask, slot_width }
            }
        }
    }
}

impl From<CustomWidthDef> for field::CustomWidth {
    fn from(value: CustomWidthDef) -> Self {
        match value {
            CustomWidthDef::Const { width } => field::CustomWidth::Const(width),
            CustomWidthDef::Function { name } => field::CustomWidth::Function(name),
        }
    }
}

impl From<SizeArityDef> for field::SizeArity {
    fn from(value: SizeArityDef) -> Self {
        match value {
            SizeArityDef::Buffer => field::SizeArity::Buffer,
            SizeArityDef::BufferAndOffset => field::SizeArity::BufferAndOffset,
        }
    }
}

impl From<AccessDef> for field::Access {
    fn from(value: AccessDef) -> Self {
        match value {
            AccessDef::Public => field::Access::Public,
            AccessDef::Crate => field::Access::Crate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{diagnostics::Diagnostics, plan};

    #[test]
    fn test_definition_round_trips_from_json() {
        let json = r#"{
            "name": "Udp",
            "fields": [
                { "name": "source_port", "kind": { "type": "Uint", "width": 2 } },
                { "name": "destination_port", "kind": { "type": "Uint", "width": 2 } },
                { "name": "length", "kind": { "type": "Uint", "width": 2 } },
                { "name": "checksum", "kind": { "type": "Uint", "width": 2 } },
                { "name": "payload", "kind": { "type": "Bytes", "writable": true } }
            ]
        }"#;

        let def: DefinitionDef = serde_json::from_str(json).unwrap();
        let def: crate::field::Definition = def.into();

        let mut diags = Diagnostics::default();
        let plan = plan::resolve(&def, &mut diags).unwrap();
        assert!(diags.is_empty());
        assert_eq!(plan.min_static_size(), 8);
        assert_eq!(plan.total_size(), "{buf}.len()");
    }

    #[test]
    fn test_overrides_deserialize() {
        let json = r#"{
            "name": "value",
            "kind": { "type": "Bytes" },
            "position": { "type": "Function", "name": "value_offset" },
            "size": { "type": "Field", "name": "length" },
            "doc": "Variable payload."
        }"#;

        let field: crate::field::FieldSpec = serde_json::from_str::<FieldDef>(json).unwrap().into();
        assert_eq!(
            field.position,
            crate::field::PositionOverride::Function {
                name: "value_offset".to_string(),
                base: None,
            }
        );
        assert_eq!(
            field.size,
            crate::field::SizeOverride::Field("length".to_string())
        );
        assert_eq!(field.doc.as_deref(), Some("Variable payload."));
    }
}
