use super::{
    sole_param_type, BindingLocation, FunctionExtractor, HandlerDetail, HandlerKey,
    RequestBinding, ResponseBinding, SourceLocation,
};
use crate::config::AnalyzerConfig;
use crate::oracle::TypeOracle;
use crate::syntax::{walk_expr, Expr, ExprKind, FuncDecl, Stmt, Visit};
use log::debug;
use std::path::Path;

/// Handler signature extractor.
///
/// Applies to functions whose only parameter is the per-request context (`*gin.Context`).
/// Binding calls on the context are collected in source order, the response is taken from
/// the handler's last statement and the summary from the first doc comment line.
pub struct HandlerExtractor<'a> {
    oracle: &'a dyn TypeOracle,
    config: &'a AnalyzerConfig,
}

impl<'a> HandlerExtractor<'a> {
    pub fn new(oracle: &'a dyn TypeOracle, config: &'a AnalyzerConfig) -> Self {
        Self { oracle, config }
    }

    /// Extracts the handler detail of `func`, declared in `file`. The route stays unset.
    pub fn extract(&self, func: &FuncDecl, file: &Path) -> HandlerDetail {
        let key = match &func.receiver {
            Some(receiver) => HandlerKey::method(&receiver.type_name, &func.name),
            None => HandlerKey::function(&func.name),
        };

        let body = func.body.as_deref().unwrap_or_default();
        let mut collector = BindingCollector {
            oracle: self.oracle,
            context_type: &self.config.context_type,
            requests: Vec::new(),
        };
        collector.visit_block(body);
        let response = self.response(body);

        debug!(
            "Handler {}: {} bindings, response {:?}",
            key,
            collector.requests.len(),
            response.as_ref().map(|r| r.payload_type.as_str())
        );

        HandlerDetail {
            key,
            summary: extract_summary(&func.doc),
            requests: collector.requests,
            response,
            route: None,
            location: SourceLocation {
                file: file.to_path_buf(),
                line: func.span.line,
                insert_offset: func.span.line_start_byte,
            },
            doc_lines: func.doc.iter().map(|comment| comment.lines().count()).sum(),
            has_router_directive: func.doc.iter().any(|comment| comment.contains("@Router")),
        }
    }

    /// Response of the last top-level statement, if it is a call with at least two arguments.
    fn response(&self, body: &[Stmt]) -> Option<ResponseBinding> {
        let Stmt::Expr(last) = body.last()? else {
            return None;
        };
        let (_, args) = last.as_call()?;
        let payload = args.get(1)?;
        Some(ResponseBinding::object(self.oracle.type_name_of(payload)))
    }
}

impl FunctionExtractor for HandlerExtractor<'_> {
    fn accepts(&self, func: &FuncDecl) -> bool {
        sole_param_type(func, self.oracle).is_some_and(|name| name == self.config.context_type)
    }
}

struct BindingCollector<'c> {
    oracle: &'c dyn TypeOracle,
    context_type: &'c str,
    requests: Vec<RequestBinding>,
}

impl BindingCollector<'_> {
    fn binding(&self, method: &str, args: &[Expr]) -> Option<RequestBinding> {
        if let Some(rest) = method
            .strip_prefix("ShouldBind")
            .or_else(|| method.strip_prefix("Bind"))
        {
            return Some(RequestBinding {
                payload_type: args
                    .first()
                    .map(|arg| self.oracle.type_name_of(arg))
                    .unwrap_or_default(),
                location: BindingLocation::from_bind_suffix(rest),
                variable_name: None,
            });
        }

        let location = if method.starts_with("Query") {
            BindingLocation::Query
        } else if method.starts_with("PostForm") {
            BindingLocation::Form
        } else {
            return None;
        };
        let variable_name = match &args.first()?.kind {
            ExprKind::StringLit(value) => value.clone(),
            ExprKind::Ident(name) => name.clone(),
            _ => return None,
        };
        Some(RequestBinding {
            payload_type: "string".to_string(),
            location,
            variable_name: Some(variable_name),
        })
    }
}

impl Visit for BindingCollector<'_> {
    fn visit_expr(&mut self, expr: &Expr) {
        if let Some((receiver, method, args)) = expr.as_method_call() {
            if self.oracle.type_name_of(receiver) == self.context_type {
                if let Some(binding) = self.binding(method, args) {
                    self.requests.push(binding);
                }
            }
        }
        walk_expr(self, expr);
    }
}

/// First line of a doc comment with comment markers and surrounding whitespace removed.
pub fn extract_summary(doc: &[String]) -> String {
    let Some(first) = doc.first() else {
        return String::new();
    };
    let first = first.trim();

    if let Some(line) = first.strip_prefix("//") {
        return line.trim().to_string();
    }

    let inner = first.strip_prefix("/*").unwrap_or(first);
    let inner = inner.strip_suffix("*/").unwrap_or(inner);
    inner
        .lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}
