use super::{sole_param_type, FunctionExtractor, HandlerKey, HttpMethod, RouteMap, RouteRecord};
use crate::config::AnalyzerConfig;
use crate::oracle::TypeOracle;
use crate::syntax::{
    walk_block, walk_expr, walk_stmt, Expr, ExprKind, FuncDecl, Stmt, VarSpec, Visit,
};
use crate::type_name;
use crate::types::Type;
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;

/// Route topology extractor for router setup functions.
///
/// Walks a function whose only parameter is a router (`*gin.Engine`) or route group
/// (`*gin.RouterGroup`), resolves nested `Group(...)` prefixes into absolute paths and
/// records every `GET` / `POST` / ... registration into a [`RouteMap`].
///
/// ```go
/// func InitRouter(e *gin.Engine) {
///     g := e.Group("/account")
///     {
///         g.GET("/getUserInfo", account.AccountApi.GetAccountInfo)
///     }
/// }
/// ```
///
/// registers `accountApi.GetAccountInfo -> GET /account/getUserInfo`.
pub struct RouterExtractor<'a> {
    oracle: &'a dyn TypeOracle,
    config: &'a AnalyzerConfig,
}

impl<'a> RouterExtractor<'a> {
    pub fn new(oracle: &'a dyn TypeOracle, config: &'a AnalyzerConfig) -> Self {
        Self { oracle, config }
    }

    /// Records the routes registered by `func` into `routes`, returning how many were found.
    ///
    /// Registrations of a handler already present in `routes` replace the earlier entry.
    pub fn extract(&self, func: &FuncDecl, routes: &mut RouteMap) -> usize {
        let Some(body) = &func.body else {
            return 0;
        };
        debug!("Extracting routes from router function {}", func.name);

        let mut walker = TopologyWalker {
            oracle: self.oracle,
            config: self.config,
            groups: vec![RouteGroup {
                absolute_path: "/".to_string(),
            }],
            scopes: vec![HashMap::new()],
            current: GroupId::ROOT,
            routes,
            registered: 0,
        };
        if let Some(name) = func.params.first().and_then(|p| p.name.as_deref()) {
            walker.declare(name, Some(GroupId::ROOT));
        }

        walker.visit_block(body);
        walker.registered
    }
}

impl FunctionExtractor for RouterExtractor<'_> {
    fn accepts(&self, func: &FuncDecl) -> bool {
        sole_param_type(func, self.oracle).is_some_and(|name| self.config.is_router_type(&name))
    }
}

/// Synthesized route group identifier, `group{n}` with `n` the group count at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(usize);

impl GroupId {
    pub const ROOT: GroupId = GroupId(0);
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct RouteGroup {
    absolute_path: String,
}

/// Joins a group path and a relative path.
///
/// One trailing `/` of `parent` and one leading `/` of `child` are dropped before joining
/// with a single `/`. The result always starts with `/`.
pub fn join_path(parent: &str, child: &str) -> String {
    let parent = parent.strip_suffix('/').unwrap_or(parent);
    let child = child.strip_prefix('/').unwrap_or(child);
    let joined = format!("{}/{}", parent, child);
    if joined.starts_with('/') {
        joined
    } else {
        format!("/{}", joined)
    }
}

struct TopologyWalker<'w> {
    oracle: &'w dyn TypeOracle,
    config: &'w AnalyzerConfig,
    groups: Vec<RouteGroup>,
    /// Lexical scopes of local names; `None` marks a name holding no group
    scopes: Vec<HashMap<String, Option<GroupId>>>,
    current: GroupId,
    routes: &'w mut RouteMap,
    registered: usize,
}

impl TopologyWalker<'_> {
    fn new_group(&mut self, parent: GroupId, relative: &str) -> GroupId {
        let absolute_path = join_path(&self.groups[parent.0].absolute_path, relative);
        let id = GroupId(self.groups.len());
        debug!("{} = {} (parent {})", id, absolute_path, parent);
        self.groups.push(RouteGroup { absolute_path });
        id
    }

    /// Group a router receiver expression stands for; `None` when it is not a router.
    fn receiver_group(&mut self, receiver: &Expr) -> Option<GroupId> {
        if let Some(name) = receiver.as_ident() {
            if let Some(id) = self.lookup(name) {
                return Some(id);
            }
        }
        if let ExprKind::Paren(inner) = &receiver.kind {
            return self.receiver_group(inner);
        }
        if let Some(id) = self.group_call(receiver) {
            return Some(id);
        }
        let is_router = self
            .oracle
            .expr_type(receiver)
            .is_some_and(|ty| self.config.is_router_type(&type_name::resolve(ty)));
        is_router.then_some(self.current)
    }

    /// Creates the group for a `router.Group("/path")` call.
    fn group_call(&mut self, expr: &Expr) -> Option<GroupId> {
        let (receiver, method, args) = expr.as_method_call()?;
        if method != "Group" {
            return None;
        }
        let parent = self.receiver_group(receiver)?;
        let relative = literal_path(args.first(), "group");
        Some(self.new_group(parent, &relative))
    }

    fn lookup(&self, name: &str) -> Option<GroupId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .copied()
            .flatten()
    }

    fn declare(&mut self, name: &str, group: Option<GroupId>) {
        if name == "_" {
            return;
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), group);
        }
    }

    /// `=` updates the innermost scope declaring `name`; undeclared names are function-wide.
    fn assign(&mut self, name: &str, group: Option<GroupId>) {
        if name == "_" {
            return;
        }
        let index = self
            .scopes
            .iter()
            .rposition(|scope| scope.contains_key(name))
            .unwrap_or(0);
        if let Some(scope) = self.scopes.get_mut(index) {
            scope.insert(name.to_string(), group);
        }
    }

    fn bind(&mut self, target: Option<&str>, group: Option<GroupId>, define: bool) {
        match target {
            Some(name) if define => self.declare(name, group),
            Some(name) => self.assign(name, group),
            None => {}
        }
    }

    /// Group held by the value at `index` of a one-to-one assignment.
    fn copied_group(&self, count: usize, values: &[Expr], index: usize) -> Option<GroupId> {
        if count != values.len() {
            return None;
        }
        values[index].as_ident().and_then(|name| self.lookup(name))
    }

    /// `x := router.Group(...)` creates a group that becomes current; other values rebind.
    fn assignment(&mut self, lhs: &[Expr], rhs: &[Expr], define: bool) {
        if let ([target], [value]) = (lhs, rhs) {
            if let Some(id) = self.group_call(value) {
                self.current = id;
                self.bind(target.as_ident(), Some(id), define);
                return;
            }
        }

        for expr in lhs.iter().chain(rhs) {
            self.visit_expr(expr);
        }
        for (index, target) in lhs.iter().enumerate() {
            let group = self.copied_group(lhs.len(), rhs, index);
            self.bind(target.as_ident(), group, define);
        }
    }

    fn var_spec(&mut self, spec: &VarSpec) {
        if let ([name], [value]) = (spec.names.as_slice(), spec.values.as_slice()) {
            if let Some(id) = self.group_call(value) {
                self.current = id;
                self.declare(name, Some(id));
                return;
            }
        }

        for value in &spec.values {
            self.visit_expr(value);
        }
        for (index, name) in spec.names.iter().enumerate() {
            let group = self.copied_group(spec.names.len(), &spec.values, index);
            self.declare(name, group);
        }
    }

    fn registration(&mut self, receiver: &Expr, method: HttpMethod, args: &[Expr]) {
        let Some(group) = self.receiver_group(receiver) else {
            return;
        };
        let [path, handler, ..] = args else {
            return;
        };

        let relative = literal_path(Some(path), "route");
        let absolute_path = join_path(&self.groups[group.0].absolute_path, &relative);
        let Some(key) = self.handler_key(handler) else {
            debug!(
                "Skipping {} {}: handler is not a named function",
                method, absolute_path
            );
            return;
        };

        debug!("{} {} -> {}", method, absolute_path, key);
        let record = RouteRecord {
            absolute_path,
            http_method: method,
        };
        if let Some(previous) = self.routes.insert(key.clone(), record) {
            debug!(
                "{} re-registered, replacing {} {}",
                key, previous.http_method, previous.absolute_path
            );
        }
        self.registered += 1;
    }

    /// Identity of the handler referenced by a registration argument.
    fn handler_key(&self, expr: &Expr) -> Option<HandlerKey> {
        match &expr.kind {
            ExprKind::Ident(name) => Some(HandlerKey::function(name)),
            ExprKind::Selector { operand, field } => {
                // the declaring type, so promoted methods key like their handler
                let receiver = self
                    .oracle
                    .method_owner(expr.id)
                    .map(str::to_string)
                    .or_else(|| {
                        self.oracle
                            .expr_type(operand)
                            .and_then(|ty| match ty.deref() {
                                Type::Named { name, .. } => Some(name.clone()),
                                _ => None,
                            })
                    });
                Some(HandlerKey {
                    receiver,
                    name: field.clone(),
                })
            }
            ExprKind::Paren(inner) => self.handler_key(inner),
            _ => None,
        }
    }
}

impl Visit for TopologyWalker<'_> {
    fn visit_block(&mut self, block: &[Stmt]) {
        let saved_current = self.current;
        self.scopes.push(HashMap::new());
        walk_block(self, block);
        self.scopes.pop();
        self.current = saved_current;
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign { lhs, rhs, define } => self.assignment(lhs, rhs, *define),
            Stmt::Var(specs) => {
                for spec in specs {
                    self.var_spec(spec);
                }
            }
            Stmt::Range { lhs, define, .. } => {
                walk_stmt(self, stmt);
                for target in lhs {
                    self.bind(target.as_ident(), None, *define);
                }
            }
            // names from the init or header statement are scoped to the statement
            Stmt::If { .. } | Stmt::For { .. } | Stmt::Switch { .. } => {
                self.scopes.push(HashMap::new());
                walk_stmt(self, stmt);
                self.scopes.pop();
            }
            _ => walk_stmt(self, stmt),
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        if let Some((receiver, method, args)) = expr.as_method_call() {
            if let Some(method) = HttpMethod::from_selector(method) {
                self.registration(receiver, method, args);
            }
        }
        walk_expr(self, expr);
    }
}

/// String value of a path argument; anything but a literal yields an empty path.
fn literal_path(arg: Option<&Expr>, what: &str) -> String {
    match arg.and_then(Expr::as_string_lit) {
        Some(value) => value.to_string(),
        None => {
            warn!("Non-literal {} path argument, using empty path", what);
            String::new()
        }
    }
}
