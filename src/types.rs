//! Static types as resolved by the [`checker`](crate::checker).

use std::fmt;

/// Go's predeclared type names.
pub const BUILTIN_TYPES: &[&str] = &[
    "bool",
    "byte",
    "complex64",
    "complex128",
    "error",
    "float32",
    "float64",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "rune",
    "string",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
    "any",
];

/// The package that owns a named type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageRef {
    /// Package name as it appears in the `package` clause
    pub name: String,
    /// Full import path
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// Defined type; `package` is `None` for predeclared types
    Named {
        package: Option<PackageRef>,
        name: String,
    },
    Pointer(Box<Type>),
    Slice(Box<Type>),
    Array { len: String, elem: Box<Type> },
    Map { key: Box<Type>, value: Box<Type> },
    Func { params: Vec<Type>, results: Vec<Type> },
    /// Multiple call results
    Tuple(Vec<Type>),
    /// Anything the checker models only textually (interfaces, channels, struct literals)
    Other(String),
}

impl Type {
    pub fn builtin(name: &str) -> Self {
        Type::Named {
            package: None,
            name: name.to_string(),
        }
    }

    pub fn named(package: PackageRef, name: &str) -> Self {
        Type::Named {
            package: Some(package),
            name: name.to_string(),
        }
    }

    pub fn pointer(inner: Type) -> Self {
        Type::Pointer(Box::new(inner))
    }

    pub fn slice(elem: Type) -> Self {
        Type::Slice(Box::new(elem))
    }

    pub fn is_builtin_name(name: &str) -> bool {
        BUILTIN_TYPES.contains(&name)
    }

    /// Strips every level of pointer indirection.
    pub fn deref(&self) -> &Type {
        let mut current = self;
        while let Type::Pointer(inner) = current {
            current = inner;
        }
        current
    }

    /// `package.Name` of a named type after dereferencing, or the bare name of a builtin.
    pub fn qualified_name(&self) -> Option<String> {
        match self.deref() {
            Type::Named {
                package: Some(package),
                name,
            } => Some(format!("{}.{}", package.name, name)),
            Type::Named {
                package: None,
                name,
            } => Some(name.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named {
                package: Some(package),
                name,
            } => write!(f, "{}.{}", package.path, name),
            Type::Named {
                package: None,
                name,
            } => write!(f, "{}", name),
            Type::Pointer(inner) => write!(f, "*{}", inner),
            Type::Slice(elem) => write!(f, "[]{}", elem),
            Type::Array { len, elem } => write!(f, "[{}]{}", len, elem),
            Type::Map { key, value } => write!(f, "map[{}]{}", key, value),
            Type::Func { params, results } => {
                write!(f, "func({})", join(params))?;
                match results.len() {
                    0 => Ok(()),
                    1 => write!(f, " {}", results[0]),
                    _ => write!(f, " ({})", join(results)),
                }
            }
            Type::Tuple(items) => write!(f, "({})", join(items)),
            Type::Other(text) => write!(f, "{}", text),
        }
    }
}

fn join(items: &[Type]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
