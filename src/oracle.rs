//! The Type Oracle seam between type checking and extraction.

use crate::syntax::{Expr, NodeId};
use crate::type_name;
use crate::types::Type;
use std::collections::HashMap;

/// Answers static-type queries for syntax nodes.
///
/// Extractors depend only on this trait, so they can be driven by the built-in
/// [`Checker`](crate::checker::Checker) output or by a hand-built table in tests.
pub trait TypeOracle {
    /// Resolved type of the expression or parameter with this id.
    fn type_of(&self, id: NodeId) -> Option<&Type>;

    fn expr_type(&self, expr: &Expr) -> Option<&Type> {
        self.type_of(expr.id)
    }

    /// Display name of the expression's type, empty when unknown.
    fn type_name_of(&self, expr: &Expr) -> String {
        type_name::resolve_opt(self.expr_type(expr))
    }

    /// Bare name of the type declaring the method a selector node refers to.
    ///
    /// For a method promoted through embedded fields this is the embedded type, not the
    /// type of the selector operand.
    fn method_owner(&self, id: NodeId) -> Option<&str>;
}

/// Node-id keyed type table.
#[derive(Debug, Default, Clone)]
pub struct TypeInfo {
    types: HashMap<NodeId, Type>,
    method_owners: HashMap<NodeId, String>,
}

impl TypeInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: NodeId, ty: Type) {
        self.types.insert(id, ty);
    }

    pub fn record_method_owner(&mut self, id: NodeId, owner: &str) {
        self.method_owners.insert(id, owner.to_string());
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeOracle for TypeInfo {
    fn type_of(&self, id: NodeId) -> Option<&Type> {
        self.types.get(&id)
    }

    fn method_owner(&self, id: NodeId) -> Option<&str> {
        self.method_owners.get(&id).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::ExprKind;

    #[test]
    fn test_type_info_lookup() {
        let expr = Expr {
            id: NodeId(7),
            kind: ExprKind::Ident("req".to_string()),
        };
        let mut info = TypeInfo::new();
        assert!(info.is_empty());
        assert_eq!(info.type_name_of(&expr), "");

        info.record(NodeId(7), Type::pointer(Type::builtin("string")));

        assert_eq!(info.len(), 1);
        assert_eq!(info.type_name_of(&expr), "string");
        assert_eq!(info.type_of(NodeId(8)), None);
    }

    #[test]
    fn test_method_owner_lookup() {
        let mut info = TypeInfo::new();
        info.record_method_owner(NodeId(3), "BaseApi");

        assert_eq!(info.method_owner(NodeId(3)), Some("BaseApi"));
        assert_eq!(info.method_owner(NodeId(4)), None);
        assert!(info.is_empty());
    }
}
