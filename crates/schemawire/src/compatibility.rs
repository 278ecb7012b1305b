// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use crate::descriptor::TypeDescriptor;
use crate::resolve::Resolution;

// ---------------------------------------------------------------------------
// Compatibility level
// ---------------------------------------------------------------------------

/// Describes how two schema versions relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    /// Each version can read data written by the other.
    Full,
    /// New schema can read data written by old schema.
    Backward,
    /// Old schema can read data written by new schema.
    Forward,
    /// Neither version can read the other's data.
    Breaking,
}

impl Compatibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Backward => "backward",
            Self::Forward => "forward",
            Self::Breaking => "breaking",
        }
    }
}

impl std::fmt::Display for Compatibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CompatibilityResult
// ---------------------------------------------------------------------------

/// Detailed result of a compatibility check between two schemas.
#[derive(Debug, Clone)]
pub struct CompatibilityResult {
    /// Overall compatibility level.
    pub compatibility: Compatibility,
    /// Human-readable details about what changed.
    pub details: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Check compatibility between an old and a new schema version.
///
/// Both directions are resolved with the same rules the decoder uses, so
/// the verdict is exactly "would decoding succeed". With the current rules
/// every accepted change is accepted in both directions, so the result is
/// `Full` or `Breaking`; the one-way levels are kept for callers that
/// compare against a registry vocabulary.
pub fn check_compatibility(old: &TypeDescriptor, new: &TypeDescriptor) -> CompatibilityResult {
    if old == new {
        return CompatibilityResult {
            compatibility: Compatibility::Full,
            details: vec!["schemas are identical".to_string()],
        };
    }

    let mut details = Vec::new();
    diff(old, new, "$", &mut details);

    let backward = Resolution::new(old, new);
    let forward = Resolution::new(new, old);
    if let Err(e) = &backward {
        details.push(format!("new cannot read old: {}", e));
    }
    if let Err(e) = &forward {
        details.push(format!("old cannot read new: {}", e));
    }

    let compatibility = match (backward.is_ok(), forward.is_ok()) {
        (true, true) => Compatibility::Full,
        (true, false) => Compatibility::Backward,
        (false, true) => Compatibility::Forward,
        (false, false) => Compatibility::Breaking,
    };

    log::debug!(
        "[COMPAT] {} ({} change(s))",
        compatibility,
        details.len()
    );

    CompatibilityResult {
        compatibility,
        details,
    }
}

// ---------------------------------------------------------------------------
// Structural diff
// ---------------------------------------------------------------------------

fn diff(old: &TypeDescriptor, new: &TypeDescriptor, path: &str, details: &mut Vec<String>) {
    match (old, new) {
        (TypeDescriptor::Record(o), TypeDescriptor::Record(n)) => {
            let mut matched = vec![false; n.fields.len()];
            for of in &o.fields {
                let found = n
                    .fields
                    .iter()
                    .enumerate()
                    .find(|(i, nf)| !matched[*i] && nf.shares_name_with(of));
                match found {
                    Some((i, nf)) => {
                        matched[i] = true;
                        if of.name != nf.name {
                            details.push(format!(
                                "field '{}.{}' renamed to '{}'",
                                path, of.name, nf.name
                            ));
                        }
                        diff(
                            &of.type_desc,
                            &nf.type_desc,
                            &format!("{}.{}", path, nf.name),
                            details,
                        );
                    }
                    None => details.push(format!("field '{}.{}' removed", path, of.name)),
                }
            }
            for (nf, _) in n.fields.iter().zip(&matched).filter(|(_, m)| !**m) {
                details.push(format!(
                    "field '{}.{}' added ({})",
                    path,
                    nf.name,
                    nf.type_desc.kind_name()
                ));
            }
        }
        (TypeDescriptor::Sequence(o), TypeDescriptor::Sequence(n)) => {
            diff(o, n, &format!("{}[]", path), details)
        }
        (TypeDescriptor::Optional(o), TypeDescriptor::Optional(n)) => diff(o, n, path, details),
        (TypeDescriptor::Primitive(o), TypeDescriptor::Primitive(n)) if o == n => {}
        _ => details.push(format!(
            "'{}' type changed from {} to {}",
            path,
            old.kind_name(),
            new.kind_name()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::RecordBuilder;
    use crate::descriptor::PrimitiveKind;

    fn v1() -> TypeDescriptor {
        RecordBuilder::new("V1")
            .sequence_field("readings", PrimitiveKind::F32)
            .build()
            .expect("v1")
    }

    fn v2() -> TypeDescriptor {
        RecordBuilder::new("V2")
            .string_field("Header")
            .sequence_field("RawReadings", PrimitiveKind::F64)
            .sequence_field("FilteredReadings", PrimitiveKind::F64)
            .alias("readings")
            .build()
            .expect("v2")
    }

    #[test]
    fn test_identical_schemas() {
        let result = check_compatibility(&v1(), &v1());
        assert_eq!(result.compatibility, Compatibility::Full);
    }

    #[test]
    fn test_alias_rename_is_full() {
        let result = check_compatibility(&v1(), &v2());
        assert_eq!(result.compatibility, Compatibility::Full);
        assert!(result
            .details
            .iter()
            .any(|d| d.contains("renamed to 'FilteredReadings'")));
        assert!(result.details.iter().any(|d| d.contains("'$.Header' added")));
    }

    #[test]
    fn test_kind_change_is_breaking() {
        let old = RecordBuilder::new("A").string_field("x").build().expect("old");
        let new = RecordBuilder::new("A")
            .field("x", PrimitiveKind::I32)
            .build()
            .expect("new");
        let result = check_compatibility(&old, &new);
        assert_eq!(result.compatibility, Compatibility::Breaking);
        assert!(result.details.iter().any(|d| d.contains("type changed")));
    }

    #[test]
    fn test_optional_wrapping() {
        let old = TypeDescriptor::primitive(PrimitiveKind::U8);
        let new = TypeDescriptor::optional(TypeDescriptor::primitive(PrimitiveKind::U8));
        assert_eq!(
            check_compatibility(&old, &new).compatibility,
            Compatibility::Full
        );

        let old = TypeDescriptor::sequence(TypeDescriptor::primitive(PrimitiveKind::U8));
        let new = TypeDescriptor::optional(TypeDescriptor::sequence(TypeDescriptor::primitive(
            PrimitiveKind::U8,
        )));
        assert_eq!(
            check_compatibility(&old, &new).compatibility,
            Compatibility::Full
        );
    }
}
