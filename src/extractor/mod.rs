//! Extraction of route topology and handler signatures from type checked Go functions.
//!
//! Two extractors work over the same declarations and are selected by parameter shape:
//!
//! - **Router functions** take a single router or route group parameter (`*gin.Engine`,
//!   `*gin.RouterGroup`). See [`router::RouterExtractor`].
//! - **Handlers** take a single per-request context parameter (`*gin.Context`). See
//!   [`handler::HandlerExtractor`].
//!
//! The router pass fills a run-wide [`RouteMap`]; the handler pass produces one
//! [`HandlerDetail`] per handler, which is later joined with its [`RouteRecord`].
//!
//! # Example
//!
//! ```no_run
//! use gin_swag_from_source::config::AnalyzerConfig;
//! use gin_swag_from_source::extractor::{FunctionExtractor, RouteMap, router::RouterExtractor};
//! use gin_swag_from_source::loader;
//! use std::path::Path;
//!
//! let config = AnalyzerConfig::default();
//! let loaded = loader::load(Path::new("./my-project"), &config).unwrap();
//! let extractor = RouterExtractor::new(&loaded.types, &config);
//! let mut routes = RouteMap::new();
//! for file in &loaded.program.files {
//!     for func in file.functions().filter(|f| extractor.accepts(f)) {
//!         extractor.extract(func, &mut routes);
//!     }
//! }
//! println!("Found {} routes", routes.len());
//! ```

pub mod handler;
pub mod router;

use crate::oracle::TypeOracle;
use crate::syntax::FuncDecl;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Trait for extractors that apply to functions of one parameter shape.
pub trait FunctionExtractor {
    /// Whether `func` has the parameter shape this extractor handles.
    fn accepts(&self, func: &FuncDecl) -> bool;
}

/// Resolved type name of a function's only parameter.
pub(crate) fn sole_param_type(func: &FuncDecl, oracle: &dyn TypeOracle) -> Option<String> {
    match func.params.as_slice() {
        [param] => oracle.type_of(param.id).map(crate::type_name::resolve),
        _ => None,
    }
}

/// Identity of a handler: its bare receiver type name (for methods) and function name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerKey {
    pub receiver: Option<String>,
    pub name: String,
}

impl HandlerKey {
    pub fn function(name: &str) -> Self {
        Self {
            receiver: None,
            name: name.to_string(),
        }
    }

    pub fn method(receiver: &str, name: &str) -> Self {
        Self {
            receiver: Some(receiver.to_string()),
            name: name.to_string(),
        }
    }

    /// The same name without receiver qualification.
    pub fn unqualified(&self) -> Self {
        Self::function(&self.name)
    }
}

impl fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.receiver {
            Some(receiver) => write!(f, "{}.{}", receiver, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl Serialize for HandlerKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// HTTP methods recognized as route registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    /// Maps a registration method name (`GET`, `POST`, ...) to its HTTP method.
    pub fn from_selector(name: &str) -> Option<Self> {
        match name {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            "PATCH" => Some(HttpMethod::Patch),
            "OPTIONS" => Some(HttpMethod::Options),
            "HEAD" => Some(HttpMethod::Head),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Absolute route of a registered handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteRecord {
    pub absolute_path: String,
    pub http_method: HttpMethod,
}

/// Run-wide mapping from handler identity to its (last) registration.
pub type RouteMap = HashMap<HandlerKey, RouteRecord>;

/// Where a request binding reads its data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingLocation {
    Body,
    Query,
    Header,
    Form,
    Unknown,
}

impl BindingLocation {
    /// Location of a `ShouldBind*` / `Bind*` call from the name remainder.
    pub fn from_bind_suffix(suffix: &str) -> Self {
        match suffix {
            "JSON" => BindingLocation::Body,
            "Query" => BindingLocation::Query,
            "Header" => BindingLocation::Header,
            _ => BindingLocation::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BindingLocation::Body => "body",
            BindingLocation::Query => "query",
            BindingLocation::Header => "header",
            BindingLocation::Form => "formData",
            BindingLocation::Unknown => "",
        }
    }
}

impl Serialize for BindingLocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestBinding {
    pub payload_type: String,
    pub location: BindingLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseBinding {
    pub payload_type: String,
    pub display_kind: String,
}

impl ResponseBinding {
    pub const OBJECT: &'static str = "object";

    pub fn object(payload_type: String) -> Self {
        Self {
            payload_type,
            display_kind: Self::OBJECT.to_string(),
        }
    }
}

/// Position of a handler declaration in its source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    /// 1-based line of the `func` keyword
    pub line: usize,
    /// Byte offset of the start of that line, where directives are inserted
    #[serde(skip)]
    pub insert_offset: usize,
}

/// Everything extracted about one handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerDetail {
    pub key: HandlerKey,
    pub summary: String,
    pub requests: Vec<RequestBinding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseBinding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteRecord>,
    pub location: SourceLocation,
    /// Number of lines of the existing doc comment
    #[serde(skip)]
    pub doc_lines: usize,
    /// The existing doc comment already carries a `@Router` directive
    #[serde(skip)]
    pub has_router_directive: bool,
}

impl HandlerDetail {
    /// Attaches the joined route.
    pub fn attach_route(&mut self, route: RouteRecord) {
        self.route = Some(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_key_display_and_unqualified() {
        let key = HandlerKey::method("accountApi", "GetAccountInfo");
        assert_eq!(key.to_string(), "accountApi.GetAccountInfo");
        assert_eq!(key.unqualified(), HandlerKey::function("GetAccountInfo"));
        assert_eq!(key.unqualified().to_string(), "GetAccountInfo");
    }

    #[test]
    fn test_http_method_from_selector_is_exact() {
        assert_eq!(HttpMethod::from_selector("GET"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::from_selector("OPTIONS"), Some(HttpMethod::Options));
        assert_eq!(HttpMethod::from_selector("Get"), None);
        assert_eq!(HttpMethod::from_selector("Any"), None);
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_binding_location_from_suffix() {
        assert_eq!(BindingLocation::from_bind_suffix("JSON"), BindingLocation::Body);
        assert_eq!(BindingLocation::from_bind_suffix("Query"), BindingLocation::Query);
        assert_eq!(BindingLocation::from_bind_suffix("Header"), BindingLocation::Header);
        assert_eq!(BindingLocation::from_bind_suffix("Uri"), BindingLocation::Unknown);
        assert_eq!(BindingLocation::from_bind_suffix(""), BindingLocation::Unknown);
        assert_eq!(BindingLocation::Form.as_str(), "formData");
        assert_eq!(BindingLocation::Unknown.as_str(), "");
    }

    #[test]
    fn test_serialized_forms() {
        let route = RouteRecord {
            absolute_path: "/account/getUserInfo".to_string(),
            http_method: HttpMethod::Get,
        };
        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json["http_method"], "GET");

        let key = serde_json::to_value(HandlerKey::method("baseApi", "Login")).unwrap();
        assert_eq!(key, "baseApi.Login");
    }
}
