//! Canonical display names for resolved types.
//!
//! Pointer indirection is invisible in documented types, slices get the `[]` prefix and
//! named types are qualified with their package *name* (not the import path).

use crate::types::Type;

/// Prefix marking a sequence of the following element type.
pub const SEQUENCE_PREFIX: &str = "[]";

/// Resolves a type into its display name. Never fails.
pub fn resolve(ty: &Type) -> String {
    match ty {
        Type::Pointer(inner) => resolve(inner),
        Type::Slice(elem) => format!("{}{}", SEQUENCE_PREFIX, resolve(elem)),
        Type::Named {
            package: Some(package),
            name,
        } => format!("{}.{}", package.name, name),
        Type::Named {
            package: None,
            name,
        } => name.clone(),
        other => other.to_string(),
    }
}

/// Like [`resolve`], with an unknown type resolving to the empty string.
pub fn resolve_opt(ty: Option<&Type>) -> String {
    ty.map(resolve).unwrap_or_default()
}
