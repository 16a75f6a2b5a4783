//! Best-effort static type checker for Go sources.
//!
//! The checker never rejects a program. It resolves what it can from the parsed
//! declarations of the analyzed project and records one [`Type`] per expression or
//! parameter node into a [`TypeInfo`] table; anything it cannot type (members of
//! external packages, generics, channel operations) simply has no entry.
//!
//! Resolution happens in four phases:
//!
//! 1. files are grouped into packages by directory and every import is bound to either a
//!    local package or an external [`PackageRef`];
//! 2. function, method and explicitly typed package variable signatures are collected;
//! 3. package variables without a declared type are inferred from their initializer;
//! 4. every function body is walked with a lexical scope stack.

use crate::loader::ProjectLayout;
use crate::oracle::TypeInfo;
use crate::syntax::{
    Block, Decl, Expr, ExprKind, FieldSpec, FuncDecl, LitKind, Param, Program, SourceFile, Stmt,
    TypeExpr, VarSpec,
};
use crate::types::{PackageRef, Type};
use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Limit on embedded-field promotion when looking up members.
const MAX_EMBED_DEPTH: usize = 4;

/// Limit on `type A = B` chains, which only a cyclic program exceeds.
const MAX_ALIAS_DEPTH: usize = 8;

const COMPARISON_OPS: &[&str] = &["==", "!=", "<", "<=", ">", ">=", "&&", "||"];

#[derive(Debug, Clone)]
struct FuncSig {
    params: Vec<Type>,
    results: Vec<Type>,
}

impl FuncSig {
    fn as_type(&self) -> Type {
        Type::Func {
            params: self.params.clone(),
            results: self.results.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TypeDef<'p> {
    /// Index of the declaring file, whose imports scope `ty`
    file: usize,
    ty: &'p TypeExpr,
    alias: bool,
}

#[derive(Debug)]
struct Package<'p> {
    reference: PackageRef,
    types: HashMap<String, TypeDef<'p>>,
    funcs: HashMap<String, FuncSig>,
    /// Keyed by (receiver type name, method name)
    methods: HashMap<(String, String), FuncSig>,
    vars: HashMap<String, Type>,
}

#[derive(Debug, Clone)]
enum ImportTarget {
    Local(usize),
    External(PackageRef),
}

#[derive(Debug)]
struct FileScope {
    package: usize,
    imports: HashMap<String, ImportTarget>,
}

/// Resolves static types across all packages of a [`Program`].
pub struct Checker<'p> {
    program: &'p Program,
    packages: Vec<Package<'p>>,
    files: Vec<FileScope>,
    by_path: HashMap<String, usize>,
}

impl<'p> Checker<'p> {
    /// Indexes the packages, type declarations and imports of `program`.
    pub fn new(program: &'p Program, layout: &ProjectLayout) -> Self {
        let mut packages: Vec<Package<'p>> = Vec::new();
        let mut by_dir: HashMap<PathBuf, usize> = HashMap::new();
        let mut file_package = Vec::with_capacity(program.files.len());

        for file in &program.files {
            let dir = file.path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
            let index = *by_dir.entry(dir.clone()).or_insert_with(|| {
                packages.push(Package {
                    reference: PackageRef {
                        name: file.package.clone(),
                        path: layout.import_path(&dir),
                    },
                    types: HashMap::new(),
                    funcs: HashMap::new(),
                    methods: HashMap::new(),
                    vars: HashMap::new(),
                });
                packages.len() - 1
            });
            file_package.push(index);
        }

        for (file_index, file) in program.files.iter().enumerate() {
            let package = &mut packages[file_package[file_index]];
            for decl in &file.decls {
                if let Decl::Type(specs) = decl {
                    for spec in specs {
                        package.types.insert(
                            spec.name.clone(),
                            TypeDef {
                                file: file_index,
                                ty: &spec.ty,
                                alias: spec.alias,
                            },
                        );
                    }
                }
            }
        }

        let by_path: HashMap<String, usize> = packages
            .iter()
            .enumerate()
            .map(|(index, package)| (package.reference.path.clone(), index))
            .collect();

        let files = program
            .files
            .iter()
            .zip(&file_package)
            .map(|(file, &package)| FileScope {
                package,
                imports: bind_imports(file, &packages, layout),
            })
            .collect();

        debug!(
            "Indexed {} packages from {} files",
            packages.len(),
            program.files.len()
        );

        Self {
            program,
            packages,
            files,
            by_path,
        }
    }

    /// Runs signature collection and body checking, returning the type table.
    pub fn check(mut self) -> TypeInfo {
        let mut info = TypeInfo::new();

        self.collect_signatures();
        self.infer_package_vars(&mut info);

        let program = self.program;
        for (file_index, file) in program.files.iter().enumerate() {
            for func in file.functions() {
                let mut body = BodyChecker::new(&self, &mut info, file_index);
                body.function(func);
            }
        }

        info!(
            "Type checked {} packages, {} typed nodes",
            self.packages.len(),
            info.len()
        );
        info
    }

    fn collect_signatures(&mut self) {
        let program = self.program;
        let mut funcs = Vec::new();
        let mut methods = Vec::new();
        let mut vars = Vec::new();

        for (file_index, file) in program.files.iter().enumerate() {
            let package = self.files[file_index].package;
            for decl in &file.decls {
                match decl {
                    Decl::Func(func) => {
                        let sig = FuncSig {
                            params: func
                                .params
                                .iter()
                                .map(|param| self.resolve_type(file_index, &param.ty))
                                .collect(),
                            results: func
                                .results
                                .iter()
                                .map(|result| self.resolve_type(file_index, result))
                                .collect(),
                        };
                        match &func.receiver {
                            Some(receiver) => methods.push((
                                package,
                                (receiver.type_name.clone(), func.name.clone()),
                                sig,
                            )),
                            None => funcs.push((package, func.name.clone(), sig)),
                        }
                    }
                    Decl::Var(specs) => {
                        for spec in specs {
                            if let Some(ty) = &spec.ty {
                                let resolved = self.resolve_type(file_index, ty);
                                for name in &spec.names {
                                    vars.push((package, name.clone(), resolved.clone()));
                                }
                            }
                        }
                    }
                    Decl::Type(_) => {}
                }
            }
        }

        for (package, name, sig) in funcs {
            self.packages[package].funcs.insert(name, sig);
        }
        for (package, key, sig) in methods {
            self.packages[package].methods.insert(key, sig);
        }
        for (package, name, ty) in vars {
            self.packages[package].vars.insert(name, ty);
        }
    }

    fn infer_package_vars(&mut self, info: &mut TypeInfo) {
        let program = self.program;
        for (file_index, file) in program.files.iter().enumerate() {
            let package = self.files[file_index].package;
            for decl in &file.decls {
                let Decl::Var(specs) = decl else {
                    continue;
                };
                for spec in specs.iter().filter(|spec| spec.ty.is_none()) {
                    let inferred = {
                        let mut body = BodyChecker::new(self, info, file_index);
                        body.infer_spec(spec)
                    };
                    for (name, ty) in inferred {
                        self.packages[package].vars.insert(name, ty);
                    }
                }
            }
        }
    }

    fn resolve_type(&self, file: usize, expr: &TypeExpr) -> Type {
        self.resolve_type_at(file, expr, 0)
    }

    /// `depth` counts the aliases followed so far.
    fn resolve_type_at(&self, file: usize, expr: &TypeExpr, depth: usize) -> Type {
        match expr {
            TypeExpr::Name(name) => self.named_at(self.files[file].package, name, depth),
            TypeExpr::Qualified { package, name } => match self.files[file].imports.get(package) {
                Some(ImportTarget::Local(index)) => self.named_at(*index, name, depth),
                Some(ImportTarget::External(reference)) => Type::named(reference.clone(), name),
                None => Type::named(
                    PackageRef {
                        name: package.clone(),
                        path: package.clone(),
                    },
                    name,
                ),
            },
            TypeExpr::Pointer(inner) => Type::pointer(self.resolve_type_at(file, inner, depth)),
            TypeExpr::Slice(elem) => Type::slice(self.resolve_type_at(file, elem, depth)),
            TypeExpr::Array { len, elem } => Type::Array {
                len: len.clone(),
                elem: Box::new(self.resolve_type_at(file, elem, depth)),
            },
            TypeExpr::Map { key, value } => Type::Map {
                key: Box::new(self.resolve_type_at(file, key, depth)),
                value: Box::new(self.resolve_type_at(file, value, depth)),
            },
            TypeExpr::Func { params, results } => Type::Func {
                params: params.iter().map(|p| self.resolve_type_at(file, p, depth)).collect(),
                results: results.iter().map(|r| self.resolve_type_at(file, r, depth)).collect(),
            },
            TypeExpr::Struct(_) => Type::Other(expr.to_string()),
            TypeExpr::Other(text) => Type::Other(text.clone()),
        }
    }

    /// Type named `name` as seen from inside `package`, with alias chains followed.
    fn named_in(&self, package: usize, name: &str) -> Type {
        self.named_at(package, name, 0)
    }

    fn named_at(&self, package: usize, name: &str, depth: usize) -> Type {
        match self.packages[package].types.get(name) {
            Some(def) if def.alias && depth < MAX_ALIAS_DEPTH => {
                self.resolve_type_at(def.file, def.ty, depth + 1)
            }
            Some(_) => Type::named(self.packages[package].reference.clone(), name),
            None => Type::builtin(name),
        }
    }

    fn package_member(&self, package: usize, name: &str) -> Option<Type> {
        let package = &self.packages[package];
        package
            .vars
            .get(name)
            .cloned()
            .or_else(|| package.funcs.get(name).map(FuncSig::as_type))
    }

    fn declares_type(&self, package: usize, name: &str) -> bool {
        self.packages[package].types.contains_key(name)
    }

    /// Field or method `field` of a value of type `ty`.
    fn member(&self, ty: &Type, field: &str, depth: usize) -> Option<Member> {
        if depth > MAX_EMBED_DEPTH {
            return None;
        }
        let Type::Named {
            package: Some(reference),
            name,
        } = ty.deref()
        else {
            return None;
        };
        let package = &self.packages[*self.by_path.get(&reference.path)?];

        if let Some(sig) = package.methods.get(&(name.clone(), field.to_string())) {
            return Some(Member {
                ty: sig.as_type(),
                method_of: Some(name.clone()),
            });
        }

        let def = package.types.get(name)?;
        match def.ty {
            TypeExpr::Struct(fields) => {
                if let Some(found) = fields.iter().find(|f| f.name == field) {
                    return Some(Member {
                        ty: self.resolve_type(def.file, &found.ty),
                        method_of: None,
                    });
                }
                fields.iter().filter(|f| is_embedded(f)).find_map(|embedded| {
                    let embedded_ty = self.resolve_type(def.file, &embedded.ty);
                    self.member(&embedded_ty, field, depth + 1)
                })
            }
            other => {
                let underlying = self.resolve_type(def.file, other);
                if &underlying == ty.deref() {
                    None
                } else {
                    self.member(&underlying, field, depth + 1)
                }
            }
        }
    }
}

/// A resolved field or method.
struct Member {
    ty: Type,
    /// Declaring type of a method, after embedded promotion
    method_of: Option<String>,
}

fn is_embedded(field: &FieldSpec) -> bool {
    let base = match &field.ty {
        TypeExpr::Pointer(inner) => inner.base_name(),
        other => other.base_name(),
    };
    base == Some(field.name.as_str())
}

fn bind_imports(
    file: &SourceFile,
    packages: &[Package<'_>],
    layout: &ProjectLayout,
) -> HashMap<String, ImportTarget> {
    let mut imports = HashMap::new();

    for import in &file.imports {
        if matches!(import.alias.as_deref(), Some("_") | Some(".")) {
            continue;
        }
        let local = packages
            .iter()
            .position(|package| layout.matches_import(&package.reference.path, &import.path));

        let (name, target) = match local {
            Some(index) => (
                import
                    .alias
                    .clone()
                    .unwrap_or_else(|| packages[index].reference.name.clone()),
                ImportTarget::Local(index),
            ),
            None => {
                let package_name = external_package_name(&import.path);
                (
                    import.alias.clone().unwrap_or_else(|| package_name.clone()),
                    ImportTarget::External(PackageRef {
                        name: package_name,
                        path: import.path.clone(),
                    }),
                )
            }
        };
        imports.insert(name, target);
    }

    imports
}

/// Conventional package name of an import path: `gopkg.in/yaml.v3` → `yaml`,
/// `github.com/jackc/pgx/v5` → `pgx`.
fn external_package_name(path: &str) -> String {
    let mut segments = path.rsplit('/');
    let mut last = segments.next().unwrap_or(path);

    let is_major_version =
        |s: &str| s.len() > 1 && s.starts_with('v') && s[1..].chars().all(|c| c.is_ascii_digit());
    if is_major_version(last) {
        if let Some(previous) = segments.next() {
            last = previous;
        }
    }
    if let Some((base, version)) = last.rsplit_once('.') {
        if is_major_version(version) {
            last = base;
        }
    }

    last.to_string()
}

struct BodyChecker<'c, 'p> {
    checker: &'c Checker<'p>,
    info: &'c mut TypeInfo,
    file: usize,
    scopes: Vec<HashMap<String, Type>>,
}

impl<'c, 'p> BodyChecker<'c, 'p> {
    fn new(checker: &'c Checker<'p>, info: &'c mut TypeInfo, file: usize) -> Self {
        Self {
            checker,
            info,
            file,
            scopes: Vec::new(),
        }
    }

    fn package(&self) -> usize {
        self.checker.files[self.file].package
    }

    fn resolve(&self, ty: &TypeExpr) -> Type {
        self.checker.resolve_type(self.file, ty)
    }

    fn lookup_local(&self, name: &str) -> Option<&Type> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn declare(&mut self, name: &str, ty: Type) {
        if name == "_" {
            return;
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), ty);
        }
    }

    fn function(&mut self, func: &FuncDecl) {
        self.scopes.push(HashMap::new());

        if let Some(receiver) = &func.receiver {
            if let Some(name) = &receiver.name {
                let base = self
                    .checker
                    .named_in(self.package(), &receiver.type_name);
                let ty = if receiver.pointer {
                    Type::pointer(base)
                } else {
                    base
                };
                self.declare(name, ty);
            }
        }
        self.bind_params(&func.params);
        if let Some(body) = &func.body {
            self.stmts(body);
        }

        self.scopes.pop();
    }

    fn bind_params(&mut self, params: &[Param]) -> Vec<Type> {
        params
            .iter()
            .map(|param| {
                let ty = self.resolve(&param.ty);
                self.info.record(param.id, ty.clone());
                if let Some(name) = &param.name {
                    self.declare(name, ty.clone());
                }
                ty
            })
            .collect()
    }

    /// Types a package-level `var` spec without a declared type.
    fn infer_spec(&mut self, spec: &VarSpec) -> Vec<(String, Type)> {
        let values: Vec<Option<Type>> = spec.values.iter().map(|v| self.expr(v)).collect();
        spec.names
            .iter()
            .zip(spread(values, spec.names.len(), &spec.values))
            .filter_map(|(name, ty)| Some((name.clone(), ty?)))
            .collect()
    }

    fn scoped_block(&mut self, block: &Block) {
        self.scopes.push(HashMap::new());
        self.stmts(block);
        self.scopes.pop();
    }

    fn stmts(&mut self, block: &Block) {
        for stmt in block {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) | Stmt::Go(expr) | Stmt::Defer(expr) => {
                self.expr(expr);
            }
            Stmt::Assign { lhs, rhs, define } => self.assign(lhs, rhs, *define),
            Stmt::Var(specs) => {
                for spec in specs {
                    self.local_var(spec);
                }
            }
            Stmt::If {
                init,
                cond,
                then,
                els,
            } => {
                self.scopes.push(HashMap::new());
                if let Some(init) = init {
                    self.stmt(init);
                }
                self.expr(cond);
                self.scoped_block(then);
                if let Some(els) = els {
                    self.stmt(els);
                }
                self.scopes.pop();
            }
            Stmt::For { header, cond, body } => {
                self.scopes.push(HashMap::new());
                for stmt in header {
                    self.stmt(stmt);
                }
                if let Some(cond) = cond {
                    self.expr(cond);
                }
                self.scoped_block(body);
                self.scopes.pop();
            }
            Stmt::Range { lhs, define, value } => self.range(lhs, *define, value),
            Stmt::Switch { init, tag, cases } => {
                self.scopes.push(HashMap::new());
                if let Some(init) = init {
                    self.stmt(init);
                }
                if let Some(tag) = tag {
                    self.expr(tag);
                }
                for case in cases {
                    for value in &case.values {
                        self.expr(value);
                    }
                    self.scoped_block(&case.body);
                }
                self.scopes.pop();
            }
            Stmt::Return(exprs) | Stmt::Other(exprs) => {
                for expr in exprs {
                    self.expr(expr);
                }
            }
            Stmt::Block(block) => self.scoped_block(block),
        }
    }

    fn assign(&mut self, lhs: &[Expr], rhs: &[Expr], define: bool) {
        let values: Vec<Option<Type>> = rhs.iter().map(|e| self.expr(e)).collect();

        for (target, ty) in lhs.iter().zip(spread(values, lhs.len(), rhs)) {
            match (define, target.as_ident()) {
                (true, Some(name)) => {
                    if let Some(ty) = ty {
                        self.info.record(target.id, ty.clone());
                        self.declare(name, ty);
                    }
                }
                _ => {
                    self.expr(target);
                }
            }
        }
    }

    fn local_var(&mut self, spec: &VarSpec) {
        let values: Vec<Option<Type>> = spec.values.iter().map(|v| self.expr(v)).collect();
        let types = match &spec.ty {
            Some(declared) => vec![Some(self.resolve(declared)); spec.names.len()],
            None => spread(values, spec.names.len(), &spec.values),
        };

        for (name, ty) in spec.names.iter().zip(types) {
            if let Some(ty) = ty {
                self.declare(name, ty);
            }
        }
    }

    fn range(&mut self, lhs: &[Expr], define: bool, value: &Expr) {
        let ranged = self.expr(value);
        let int = || Some(Type::builtin("int"));

        let (key, elem) = match ranged.as_ref().map(Type::deref) {
            Some(Type::Slice(elem)) | Some(Type::Array { elem, .. }) => {
                (int(), Some(elem.as_ref().clone()))
            }
            Some(Type::Map { key, value }) => {
                (Some(key.as_ref().clone()), Some(value.as_ref().clone()))
            }
            Some(Type::Named {
                package: None,
                name,
            }) if name == "string" => (int(), Some(Type::builtin("rune"))),
            Some(Type::Named { package: None, .. }) => (int(), None),
            _ => (None, None),
        };

        for (target, ty) in lhs.iter().zip([key, elem]) {
            match (define, target.as_ident()) {
                (true, Some(name)) => {
                    if let Some(ty) = ty {
                        self.info.record(target.id, ty.clone());
                        self.declare(name, ty);
                    }
                }
                _ => {
                    self.expr(target);
                }
            }
        }
    }

    /// Types `expr` and its sub-expressions, recording every resolved node.
    fn expr(&mut self, expr: &Expr) -> Option<Type> {
        let ty = self.infer(expr);
        if let Some(ty) = &ty {
            self.info.record(expr.id, ty.clone());
        }
        ty
    }

    fn infer(&mut self, expr: &Expr) -> Option<Type> {
        match &expr.kind {
            ExprKind::Ident(name) => self.ident(name),
            ExprKind::Selector { operand, field } => self.selector(expr, operand, field),
            ExprKind::Call { func, args } => self.call(func, args),
            ExprKind::StringLit(_) => Some(Type::builtin("string")),
            ExprKind::BasicLit { kind, .. } => Some(Type::builtin(match kind {
                LitKind::Int => "int",
                LitKind::Float => "float64",
                LitKind::Imaginary => "complex128",
                LitKind::Rune => "rune",
            })),
            ExprKind::Unary { op, operand } => {
                let inner = self.expr(operand);
                match op.as_str() {
                    "&" => inner.map(Type::pointer),
                    "*" => match inner {
                        Some(Type::Pointer(pointee)) => Some(*pointee),
                        _ => None,
                    },
                    "!" => Some(Type::builtin("bool")),
                    "<-" => None,
                    _ => inner,
                }
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.expr(left);
                let right = self.expr(right);
                if COMPARISON_OPS.contains(&op.as_str()) {
                    Some(Type::builtin("bool"))
                } else if op == "<<" || op == ">>" {
                    left
                } else {
                    left.or(right)
                }
            }
            ExprKind::CompositeLit { ty, elements } => {
                for element in elements {
                    self.expr(element);
                }
                ty.as_ref().map(|ty| self.resolve(ty))
            }
            ExprKind::FuncLit {
                params,
                results,
                body,
            } => {
                self.scopes.push(HashMap::new());
                let params = self.bind_params(params);
                self.stmts(body);
                self.scopes.pop();
                Some(Type::Func {
                    params,
                    results: results.iter().map(|r| self.resolve(r)).collect(),
                })
            }
            ExprKind::Index { operand, index } => {
                let indexed = self.expr(operand);
                self.expr(index);
                match indexed.as_ref().map(Type::deref) {
                    Some(Type::Slice(elem)) | Some(Type::Array { elem, .. }) => {
                        Some(elem.as_ref().clone())
                    }
                    Some(Type::Map { value, .. }) => Some(value.as_ref().clone()),
                    Some(Type::Named {
                        package: None,
                        name,
                    }) if name == "string" => Some(Type::builtin("byte")),
                    _ => None,
                }
            }
            ExprKind::Paren(inner) => self.expr(inner),
            ExprKind::TypeAssert { operand, ty } | ExprKind::Conversion { ty, operand } => {
                self.expr(operand);
                Some(self.resolve(ty))
            }
            ExprKind::TypeArg(_) => None,
            ExprKind::Other(children) => {
                for child in children {
                    self.expr(child);
                }
                None
            }
        }
    }

    fn ident(&self, name: &str) -> Option<Type> {
        if let Some(ty) = self.lookup_local(name) {
            return Some(ty.clone());
        }
        if let Some(ty) = self.checker.package_member(self.package(), name) {
            return Some(ty);
        }
        match name {
            "true" | "false" => Some(Type::builtin("bool")),
            _ => None,
        }
    }

    /// Import bound to `operand` when it names a package rather than a value.
    fn package_qualifier(&self, operand: &Expr) -> Option<ImportTarget> {
        let name = operand.as_ident()?;
        if self.lookup_local(name).is_some() {
            return None;
        }
        self.checker.files[self.file].imports.get(name).cloned()
    }

    fn selector(&mut self, expr: &Expr, operand: &Expr, field: &str) -> Option<Type> {
        if let Some(target) = self.package_qualifier(operand) {
            return match target {
                ImportTarget::Local(package) => self.checker.package_member(package, field),
                ImportTarget::External(_) => None,
            };
        }
        let base = self.expr(operand)?;
        let member = self.checker.member(&base, field, 0)?;
        if let Some(owner) = &member.method_of {
            self.info.record_method_owner(expr.id, owner);
        }
        Some(member.ty)
    }

    fn call(&mut self, func: &Expr, args: &[Expr]) -> Option<Type> {
        if let Some(target) = self.conversion_target(func) {
            for arg in args {
                self.expr(arg);
            }
            return Some(target);
        }

        if let Some(name) = func.as_ident() {
            if self.ident(name).is_none() {
                match name {
                    "new" => return args.first().and_then(|a| self.type_operand(a)).map(Type::pointer),
                    "make" => {
                        for arg in args.iter().skip(1) {
                            self.expr(arg);
                        }
                        return args.first().and_then(|a| self.type_operand(a));
                    }
                    "len" | "cap" | "copy" => {
                        for arg in args {
                            self.expr(arg);
                        }
                        return Some(Type::builtin("int"));
                    }
                    "append" => {
                        let appended = args.first().and_then(|a| self.expr(a));
                        for arg in args.iter().skip(1) {
                            self.expr(arg);
                        }
                        return appended;
                    }
                    _ => {}
                }
            }
        }

        let callee = self.expr(func);
        for arg in args {
            self.expr(arg);
        }
        match callee? {
            Type::Func { mut results, .. } => match results.len() {
                0 => None,
                1 => results.pop(),
                _ => Some(Type::Tuple(results)),
            },
            _ => None,
        }
    }

    /// Target type when the callee of a call expression is a type (a conversion).
    fn conversion_target(&self, func: &Expr) -> Option<Type> {
        match &func.kind {
            ExprKind::TypeArg(ty) => Some(self.resolve(ty)),
            ExprKind::Paren(inner) => self.conversion_target(inner),
            ExprKind::Ident(name) => {
                if self.lookup_local(name).is_some() {
                    return None;
                }
                let declared = self.checker.declares_type(self.package(), name);
                (declared || (Type::is_builtin_name(name) && name != "error"))
                    .then(|| self.resolve(&TypeExpr::Name(name.clone())))
            }
            ExprKind::Selector { operand, field } => match self.package_qualifier(operand)? {
                ImportTarget::Local(package) if self.checker.declares_type(package, field) => {
                    Some(self.checker.named_in(package, field))
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// Reads an argument of `new` / `make` as a type.
    fn type_operand(&self, arg: &Expr) -> Option<Type> {
        match &arg.kind {
            ExprKind::TypeArg(ty) => Some(self.resolve(ty)),
            ExprKind::Ident(name) => Some(self.resolve(&TypeExpr::Name(name.clone()))),
            ExprKind::Selector { operand, field } => {
                let package = operand.as_ident()?;
                Some(self.resolve(&TypeExpr::Qualified {
                    package: package.to_string(),
                    name: field.clone(),
                }))
            }
            ExprKind::Unary { op, operand } if op == "*" => {
                self.type_operand(operand).map(Type::pointer)
            }
            _ => None,
        }
    }
}

/// Distributes right-hand side types over `count` targets: a single multi-result call
/// splits its tuple, a single comma-ok form yields `(T, bool)`.
fn spread(values: Vec<Option<Type>>, count: usize, rhs: &[Expr]) -> Vec<Option<Type>> {
    if values.len() == 1 && count > 1 {
        let single = values.into_iter().next().flatten();
        let mut types = match (single, &rhs[0].kind) {
            (Some(Type::Tuple(items)), _) => items.into_iter().map(Some).collect(),
            (
                value,
                ExprKind::Index { .. } | ExprKind::TypeAssert { .. } | ExprKind::Unary { .. },
            ) => vec![value, Some(Type::builtin("bool"))],
            _ => Vec::new(),
        };
        types.resize(count, None);
        return types;
    }

    let mut types = values;
    types.resize(count, None);
    types
}
