//! Per-run engine context: layout memoization and the per-definition fault
//! boundary.
//!
//! Resolution is pure and deterministic, so the cache only guards against
//! wasted work: a mutable and a read-only accessor variant share one
//! definition and must not resolve it twice. Hosts may resolve definitions
//! concurrently; a race that resolves the same definition twice keeps the
//! first inserted result.

use std::{
    collections::HashMap,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{Arc, Mutex, PoisonError},
};

use crate::{
    diagnostics::{Diagnostic, DiagnosticCode, Diagnostics, DefinitionError},
    field::Definition,
    plan::{self, LayoutPlan},
};

/// Host-supplied knobs for one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Memoize resolved layouts by definition name.
    pub cache_layouts: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options { cache_layouts: true }
    }
}

/// A resolved definition: the plan plus everything reported while building
/// it. Diagnostics are reproducible, so cached results keep theirs.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub plan: LayoutPlan,
    pub diagnostics: Vec<Diagnostic>,
}

/// The resolution engine for one generation run.
#[derive(Debug, Default)]
pub struct Engine {
    options: Options,
    cache: Mutex<HashMap<String, Arc<Resolved>>>,
}

impl Engine {
    pub fn new(options: Options) -> Self {
        Engine {
            options,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves one definition, consulting the cache first.
    pub fn resolve(&self, def: &Definition) -> Result<Arc<Resolved>, DefinitionError> {
        if self.options.cache_layouts {
            let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = cache.get(&def.name) {
                return Ok(hit.clone());
            }
        }

        let mut diags = Diagnostics::default();
        let plan = plan::resolve(def, &mut diags)?;
        let resolved = Arc::new(Resolved {
            plan,
            diagnostics: diags.into_vec(),
        });

        if self.options.cache_layouts {
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            return Ok(cache
                .entry(def.name.clone())
                .or_insert(resolved)
                .clone());
        }

        Ok(resolved)
    }

    /// Resolves a batch of definitions. A structural error or an unexpected
    /// fault in one definition never stops the others; faults surface as a
    /// single internal diagnostic on an empty plan.
    pub fn resolve_batch(
        &self,
        defs: &[Definition],
    ) -> Vec<Result<Arc<Resolved>, DefinitionError>> {
        defs.iter()
            .map(|def| match catch_unwind(AssertUnwindSafe(|| self.resolve(def))) {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let mut diags = Diagnostics::default();
                    diags.report(
                        DiagnosticCode::Internal,
                        &def.name,
                        None,
                        format!(
                            "internal fault while resolving `{}`: {}",
                            def.name,
                            payload_text(&payload)
                        ),
                    );
                    Ok(Arc::new(Resolved {
                        plan: LayoutPlan::empty(&def.name, def.read_only),
                        diagnostics: diags.into_vec(),
                    }))
                }
            })
            .collect()
    }
}

fn payload_text(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text
    } else {
        "unknown panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldKind, FieldSpec};

    fn definition(name: &str) -> Definition {
        Definition::new(
            name,
            vec![
                FieldSpec::new("kind", FieldKind::Byte),
                FieldSpec::new("length", FieldKind::Uint { width: 2 }),
            ],
        )
    }

    #[test]
    fn test_both_accessor_variants_share_one_resolution() {
        let engine = Engine::new(Options::default());
        let def = Definition {
            read_only: true,
            ..definition("Frame")
        };

        let first = engine.resolve(&def).unwrap();
        let second = engine.resolve(&def).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_cache_can_be_disabled() {
        let engine = Engine::new(Options { cache_layouts: false });
        let def = definition("Frame");

        let first = engine.resolve(&def).unwrap();
        let second = engine.resolve(&def).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
    }

    #[test]
    fn test_one_bad_definition_does_not_stop_the_batch() {
        let engine = Engine::new(Options::default());
        let bad = Definition::new(
            "Dup",
            vec![
                FieldSpec::new("x", FieldKind::Byte),
                FieldSpec::new("x", FieldKind::Byte),
            ],
        );
        let defs = [definition("A"), bad, definition("B")];

        let outcomes = engine.resolve_batch(&defs);
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_ok());
        assert_eq!(
            outcomes[1],
            Err(DefinitionError::DuplicateFieldName("x".to_string()))
        );
        assert!(outcomes[2].is_ok());
    }
}
