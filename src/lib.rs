//! # bytecraft
//!
//! A byte-layout resolution engine for zero-copy accessor generation.
//!
//! Describe the fields of a binary record declaratively — a value kind, an
//! optional explicit position, an optional explicit size — and resolve the
//! description into a [plan::LayoutPlan]: per field, an offset expression, a
//! length expression and a get/set accessor template, plus the minimum
//! static size and the total dynamic size of the record. Positions and sizes
//! may depend on buffer contents; bit-packed fields share one backing slot.
//! Rendering the plan into accessor source is the host's business.
//!
//! Invalid fields never abort a definition: each failure is reported to the
//! [diagnostics::Diagnostics] sink and the remaining fields still resolve.
//!
//! ## Example
//!
//! ```
//! use bytecraft::diagnostics::Diagnostics;
//! use bytecraft::field::{Definition, FieldKind, FieldSpec};
//! use bytecraft::plan;
//!
//! let def = Definition::new("Udp", vec![
//!     FieldSpec::new("source_port", FieldKind::Uint { width: 2 }),
//!     FieldSpec::new("destination_port", FieldKind::Uint { width: 2 }),
//!     FieldSpec::new("length", FieldKind::Uint { width: 2 }),
//!     FieldSpec::new("checksum", FieldKind::Uint { width: 2 }),
//!     FieldSpec::new("payload", FieldKind::Bytes { writable: true }),
//! ]);
//!
//! let mut diagnostics = Diagnostics::default();
//! let plan = plan::resolve(&def, &mut diagnostics).unwrap();
//!
//! assert!(diagnostics.is_empty());
//! assert_eq!(plan.min_static_size(), 8);
//! assert_eq!(plan.field("checksum").unwrap().codec.get, "read_u16_be({buf}, 6)");
//! assert_eq!(plan.total_size(), "{buf}.len()");
//! ```

pub mod bytes;
pub mod codec;
pub mod context;
pub mod diagnostics;
pub mod expr;
pub mod field;
pub mod mask;
pub mod plan;
pub mod position;
pub mod size;
pub mod union;

#[cfg(feature = "serde")]
pub mod serde;
