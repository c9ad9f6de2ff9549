//! Layout plan assembly: one sequential pass over a definition's fields.
//!
//! Each field's automatic position depends on the fully resolved previous
//! field, so fields are processed strictly in declared order. Failures are
//! reported to the diagnostics sink and the pass continues; the plan handed
//! onward is best-effort, never suppressed.

use std::collections::HashSet;

use crate::{
    codec::{self, Codec, Width},
    diagnostics::{DefinitionError, DiagnosticCode, Diagnostics},
    expr::{BUF, OffsetExpr, SizeExpr},
    field::{Access, Definition, FieldKind, FieldSpec},
    position,
    size::{self, EmittedFields, Resolution},
    union::{self, Item},
};

/// One fully resolved field of a layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    pub name: String,
    pub access: Access,
    pub doc: Option<String>,
    pub offset: OffsetExpr,
    pub size: SizeExpr,
    pub codec: Codec,
    pub self_display: bool,
}

/// Placeholder for a union of bit-packed fields: one slot in the main
/// sequence, with every member independently addressable at its offset.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionSlot {
    pub offset: OffsetExpr,
    pub size: SizeExpr,
    pub members: Vec<ResolvedField>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanEntry {
    Field(ResolvedField),
    Union(UnionSlot),
}

impl PlanEntry {
    /// Offset and size this entry contributes to accumulation.
    pub fn bounds(&self) -> (&OffsetExpr, &SizeExpr) {
        match self {
            PlanEntry::Field(field) => (&field.offset, &field.size),
            PlanEntry::Union(slot) => (&slot.offset, &slot.size),
        }
    }
}

/// The fully resolved, ordered byte layout of one definition.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub name: String,
    /// The host also renders a read-only accessor variant from this plan.
    pub read_only: bool,
    pub entries: Vec<PlanEntry>,
    min_static_size: usize,
    total_size: String,
}

impl LayoutPlan {
    /// Byte length every conforming buffer has at least: the furthest end of
    /// the statically-known prefix of the layout.
    pub fn min_static_size(&self) -> usize {
        self.min_static_size
    }

    /// Rendered expression for the true total record length, including
    /// variable trailing data.
    pub fn total_size(&self) -> &str {
        &self.total_size
    }

    /// All accessor-bearing fields, with union members flattened in.
    pub fn fields(&self) -> impl Iterator<Item = &ResolvedField> {
        self.entries
            .iter()
            .flat_map(|entry| match entry {
                PlanEntry::Field(field) => std::slice::from_ref(field),
                PlanEntry::Union(slot) => slot.members.as_slice(),
            })
    }

    pub fn field(&self, name: &str) -> Option<&ResolvedField> {
        self.fields().find(|field| field.name == name)
    }

    pub(crate) fn empty(name: &str, read_only: bool) -> LayoutPlan {
        LayoutPlan {
            name: name.to_string(),
            read_only,
            entries: Vec::new(),
            min_static_size: 0,
            total_size: "0".to_string(),
        }
    }
}

/// Resolves one definition into a [LayoutPlan].
///
/// Field-level failures are reported to `diags` and the offending field is
/// dropped or replaced by a placeholder; only structural errors abort the
/// definition.
pub fn resolve(def: &Definition, diags: &mut Diagnostics) -> Result<LayoutPlan, DefinitionError> {
    let mut seen = HashSet::new();
    for field in &def.fields {
        if !seen.insert(field.name.as_str()) {
            return Err(DefinitionError::DuplicateFieldName(field.name.clone()));
        }
    }

    let mut entries: Vec<PlanEntry> = Vec::with_capacity(def.fields.len());
    let mut prev: Option<(OffsetExpr, SizeExpr)> = None;
    let mut emitted = EmittedFields::new();

    for item in union::group(&def.fields) {
        match item {
            Item::Single(index) => {
                let field = &def.fields[index];

                if !numeric_width_ok(field) {
                    diags.report(
                        DiagnosticCode::InvalidWidth,
                        &def.name,
                        Some(&field.name),
                        format!("numeric width of `{}` is not 1, 2, 4 or 8 bytes", field.name),
                    );
                    continue;
                }

                let Resolution::Size(size) =
                    size::resolve(&def.name, &def.fields, index, &emitted, diags)
                else {
                    continue;
                };

                let offset = position::resolve(&field.position, prev.as_ref());
                let codec = codec::assign(&field.kind, &offset, &size);

                emitted.insert(field.name.clone(), (offset.clone(), field.kind.clone()));
                entries.push(PlanEntry::Field(ResolvedField {
                    name: field.name.clone(),
                    access: field.access,
                    doc: field.doc.clone(),
                    offset: offset.clone(),
                    size: size.clone(),
                    codec,
                    self_display: field.self_display,
                }));
                prev = Some((offset, size));
            }
            Item::Union(range) => {
                let members = &def.fields[range];
                let offset = position::resolve(&members[0].position, prev.as_ref());
                let slot = union::slot(&def.name, members, &offset, diags);

                for member in members {
                    emitted.insert(member.name.clone(), (offset.clone(), member.kind.clone()));
                }
                prev = Some((slot.offset.clone(), slot.size.clone()));
                entries.push(PlanEntry::Union(slot));
            }
        }
    }

    let mut min_static_size = 0;
    for entry in &entries {
        let (offset, size) = entry.bounds();
        match (offset.const_value(), size.const_value()) {
            (Some(offset), Some(size)) => min_static_size = min_static_size.max(offset + size),
            _ => break,
        }
    }

    let total_size = match entries.last() {
        None => "0".to_string(),
        Some(entry) => {
            let (offset, size) = entry.bounds();
            match size {
                SizeExpr::Remainder => format!("{}.len()", BUF),
                _ => OffsetExpr::after(offset, size).render(),
            }
        }
    };

    Ok(LayoutPlan {
        name: def.name.clone(),
        read_only: def.read_only,
        entries,
        min_static_size,
        total_size,
    })
}

fn numeric_width_ok(field: &FieldSpec) -> bool {
    match &field.kind {
        FieldKind::Uint { width } | FieldKind::Int { width } => Width::from_bytes(*width).is_some(),
        FieldKind::Enum {
            natural_width,
            backing,
            ..
        } => Width::from_bytes(backing.unwrap_or(*natural_width)).is_some(),
        _ => true,
    }
}
