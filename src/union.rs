//! Union grouping: collapses a contiguous run of bit-packed fields sharing
//! one backing slot into a single placeholder for offset accumulation.
//!
//! Members overlap inside one slot, so the placeholder contributes the slot
//! width to accumulation, never the sum of member widths.

use std::ops::Range;

use crate::{
    codec::{self, Width},
    diagnostics::{DiagnosticCode, Diagnostics},
    expr::{OffsetExpr, SizeExpr},
    field::{FieldKind, FieldSpec},
    plan::{ResolvedField, UnionSlot},
};

/// One step of the resolution sequence: a single field or a union run,
/// indexing into the definition's field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Single(usize),
    Union(Range<usize>),
}

/// Splits a field list into resolution items. Every maximal run of
/// [FieldKind::Bits] fields becomes one union.
pub fn group(fields: &[FieldSpec]) -> Vec<Item> {
    let mut items = Vec::new();
    let mut index = 0;

    while index < fields.len() {
        if matches!(fields[index].kind, FieldKind::Bits { .. }) {
            let start = index;
            while index < fields.len() && matches!(fields[index].kind, FieldKind::Bits { .. }) {
                index += 1;
            }
            items.push(Item::Union(start..index));
        } else {
            items.push(Item::Single(index));
            index += 1;
        }
    }

    items
}

/// Resolves one union run into a slot anchored at `offset`.
///
/// The slot width must be statically determined: all members have to agree
/// on a valid backing width. Otherwise the whole run is replaced by a
/// zero-sized placeholder so the rest of the definition still resolves.
pub fn slot(
    definition: &str,
    members: &[FieldSpec],
    offset: &OffsetExpr,
    diags: &mut Diagnostics,
) -> UnionSlot {
    let width = match agreed_width(members) {
        Some(width) => width,
        None => {
            diags.report(
                DiagnosticCode::UnsizedUnion,
                definition,
                members.first().map(|m| m.name.as_str()),
                format!(
                    "union starting at `{}` has no statically determined slot width",
                    members.first().map(|m| m.name.as_str()).unwrap_or("?")
                ),
            );
            return UnionSlot {
                offset: offset.clone(),
                size: SizeExpr::Const(0),
                members: Vec::new(),
            };
        }
    };

    let mut resolved = Vec::with_capacity(members.len());
    let mut used_bits = 0u64;
    let mut overlapping = false;

    for member in members {
        let FieldKind::Bits { mask, .. } = member.kind else {
            continue;
        };

        if !mask_fits(mask, width) {
            diags.report(
                DiagnosticCode::InvalidMask,
                definition,
                Some(&member.name),
                format!(
                    "mask {:#x} of `{}` is zero or exceeds the {}-byte slot",
                    mask,
                    member.name,
                    width.bytes()
                ),
            );
            continue;
        }

        if used_bits & mask != 0 {
            overlapping = true;
        }
        used_bits |= mask;

        resolved.push(ResolvedField {
            name: member.name.clone(),
            access: member.access,
            doc: member.doc.clone(),
            offset: offset.clone(),
            size: SizeExpr::Const(width.bytes()),
            codec: codec::packed(mask, width, offset),
            self_display: member.self_display,
        });
    }

    if overlapping {
        diags.report(
            DiagnosticCode::OverlappingMasks,
            definition,
            members.first().map(|m| m.name.as_str()),
            format!(
                "bitmask members of the union starting at `{}` overlap",
                members.first().map(|m| m.name.as_str()).unwrap_or("?")
            ),
        );
    }

    UnionSlot {
        offset: offset.clone(),
        size: SizeExpr::Const(width.bytes()),
        members: resolved,
    }
}

fn agreed_width(members: &[FieldSpec]) -> Option<Width> {
    let mut agreed = None;
    for member in members {
        let FieldKind::Bits { slot_width, .. } = member.kind else {
            continue;
        };
        let width = Width::from_bytes(slot_width)?;
        match agreed {
            None => agreed = Some(width),
            Some(previous) if previous != width => return None,
            Some(_) => {}
        }
    }
    agreed
}

fn mask_fits(mask: u64, width: Width) -> bool {
    if mask == 0 {
        return false;
    }
    match width {
        Width::W8 => true,
        _ => mask >> width.bits() == 0,
    }
}
