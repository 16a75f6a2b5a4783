use crate::error::{Error, Result};
use crate::syntax::{
    Block, Case, Decl, Expr, ExprKind, FieldSpec, FuncDecl, Import, LitKind, NodeId, Param,
    Receiver, SourceFile, Span, Stmt, TypeExpr, TypeSpec, VarSpec,
};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser};

/// Go source parser.
///
/// The `GoParser` uses `tree-sitter-go` to build a concrete syntax tree and lowers it into the
/// closed [`syntax`](crate::syntax) model consumed by the checker and the extractors. Node ids
/// are allocated from a counter owned by the parser, so every file parsed by the same
/// `GoParser` shares one id space.
///
/// # Example
///
/// ```no_run
/// use gin_swag_from_source::parser::GoParser;
/// use std::path::Path;
///
/// let mut parser = GoParser::new().unwrap();
/// let parsed = parser.parse_file(Path::new("router/account.go")).unwrap();
/// println!("Parsed {} declarations", parsed.decls.len());
/// ```
pub struct GoParser {
    parser: Parser,
    next_id: u32,
}

impl GoParser {
    /// Creates a parser with the Go grammar loaded.
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_go::LANGUAGE.into())?;
        Ok(Self { parser, next_id: 0 })
    }

    /// Parses a single Go source file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The file contains invalid Go syntax
    pub fn parse_file(&mut self, path: &Path) -> Result<SourceFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path).map_err(|e| {
            warn!("Failed to read {}: {}", path.display(), e);
            Error::IoError(e)
        })?;

        self.parse_source(path, &content)
    }

    /// Parses Go source text attributed to `path`.
    pub fn parse_source(&mut self, path: &Path, content: &str) -> Result<SourceFile> {
        let tree = self
            .parser
            .parse(content, None)
            .ok_or_else(|| Error::ParseError {
                file: path.to_path_buf(),
                message: "tree-sitter 未返回语法树".to_string(),
            })?;

        let root = tree.root_node();
        if let Some(bad) = first_error(root) {
            let position = bad.start_position();
            return Err(Error::ParseError {
                file: path.to_path_buf(),
                message: format!(
                    "语法错误，位于第 {} 行第 {} 列",
                    position.row + 1,
                    position.column + 1
                ),
            });
        }

        let mut lowering = Lowering {
            src: content.as_bytes(),
            next_id: &mut self.next_id,
        };
        let file = lowering.source_file(path.to_path_buf(), root);

        debug!(
            "Parsed {}: package {}, {} declarations",
            path.display(),
            file.package,
            file.decls.len()
        );
        Ok(file)
    }

    /// Parses multiple files, stopping at the first failure.
    pub fn parse_files(&mut self, paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
        debug!("Parsing {} files", paths.len());
        paths.iter().map(|path| self.parse_file(path)).collect()
    }
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect();
    children
}

fn field_children<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.children_by_field_name(field, &mut cursor).collect();
    children
}

fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|child| child.kind() == token);
    found
}

fn unquote(text: &str) -> String {
    let quoted = text.len() >= 2
        && ((text.starts_with('"') && text.ends_with('"'))
            || (text.starts_with('`') && text.ends_with('`')));
    if quoted {
        text[1..text.len() - 1].to_string()
    } else {
        text.to_string()
    }
}

fn is_type_node(kind: &str) -> bool {
    matches!(
        kind,
        "type_identifier"
            | "qualified_type"
            | "pointer_type"
            | "slice_type"
            | "array_type"
            | "implicit_length_array_type"
            | "map_type"
            | "struct_type"
            | "interface_type"
            | "function_type"
            | "channel_type"
            | "generic_type"
            | "parenthesized_type"
    )
}

struct Lowering<'a> {
    src: &'a [u8],
    next_id: &'a mut u32,
}

impl<'a> Lowering<'a> {
    fn text(&self, node: Node<'_>) -> String {
        node.utf8_text(self.src).unwrap_or_default().to_string()
    }

    fn fresh(&mut self) -> NodeId {
        let id = NodeId(*self.next_id);
        *self.next_id += 1;
        id
    }

    fn node(&mut self, kind: ExprKind) -> Expr {
        Expr {
            id: self.fresh(),
            kind,
        }
    }

    fn source_file(&mut self, path: PathBuf, root: Node<'_>) -> SourceFile {
        let mut file = SourceFile {
            path,
            package: String::new(),
            imports: Vec::new(),
            decls: Vec::new(),
        };

        for child in named_children(root) {
            match child.kind() {
                "package_clause" => {
                    if let Some(name) = named_children(child).first() {
                        file.package = self.text(*name);
                    }
                }
                "import_declaration" => self.imports(child, &mut file.imports),
                "function_declaration" | "method_declaration" => {
                    file.decls.push(Decl::Func(self.func_decl(child)));
                }
                "type_declaration" => file.decls.push(Decl::Type(self.type_specs(child))),
                "var_declaration" | "const_declaration" => {
                    file.decls.push(Decl::Var(self.var_specs(child)));
                }
                _ => {}
            }
        }

        file
    }

    fn imports(&self, node: Node<'_>, out: &mut Vec<Import>) {
        for child in named_children(node) {
            match child.kind() {
                "import_spec" => out.extend(self.import_spec(child)),
                "import_spec_list" => {
                    for spec in named_children(child) {
                        if spec.kind() == "import_spec" {
                            out.extend(self.import_spec(spec));
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn import_spec(&self, node: Node<'_>) -> Option<Import> {
        let path = unquote(&self.text(node.child_by_field_name("path")?));
        let alias = node.child_by_field_name("name").map(|name| self.text(name));
        Some(Import { alias, path })
    }

    fn func_decl(&mut self, node: Node<'_>) -> FuncDecl {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .unwrap_or_default();
        let receiver = node
            .child_by_field_name("receiver")
            .and_then(|list| self.receiver(list));
        let params = node
            .child_by_field_name("parameters")
            .map(|list| self.params(list))
            .unwrap_or_default();
        let results = node
            .child_by_field_name("result")
            .map(|result| self.results(result))
            .unwrap_or_default();
        let body = node
            .child_by_field_name("body")
            .map(|body| self.block(body));
        let position = node.start_position();

        FuncDecl {
            name,
            receiver,
            params,
            results,
            body,
            doc: self.doc_comment(node),
            span: Span {
                start_byte: node.start_byte(),
                line_start_byte: node.start_byte() - position.column,
                line: position.row + 1,
            },
        }
    }

    /// Comment group ending on the line right above `node`, oldest line first.
    fn doc_comment(&self, node: Node<'_>) -> Vec<String> {
        let mut lines = Vec::new();
        let mut next_row = node.start_position().row;
        let mut current = node.prev_named_sibling();

        while let Some(prev) = current {
            if prev.kind() != "comment" || prev.end_position().row + 1 != next_row {
                break;
            }
            lines.push(self.text(prev));
            next_row = prev.start_position().row;
            current = prev.prev_named_sibling();
        }

        lines.reverse();
        lines
    }

    fn receiver(&self, list: Node<'_>) -> Option<Receiver> {
        let decl = named_children(list)
            .into_iter()
            .find(|n| n.kind() == "parameter_declaration")?;
        let name = decl.child_by_field_name("name").map(|n| self.text(n));
        let (pointer, base) = match self.type_expr(decl.child_by_field_name("type")?) {
            TypeExpr::Pointer(inner) => (true, *inner),
            other => (false, other),
        };

        Some(Receiver {
            name,
            type_name: base.base_name()?.to_string(),
            pointer,
        })
    }

    fn params(&mut self, list: Node<'_>) -> Vec<Param> {
        let mut params = Vec::new();

        for decl in named_children(list) {
            let variadic = decl.kind() == "variadic_parameter_declaration";
            if !variadic && decl.kind() != "parameter_declaration" {
                continue;
            }
            let Some(ty_node) = decl.child_by_field_name("type") else {
                continue;
            };
            let mut ty = self.type_expr(ty_node);
            if variadic {
                ty = TypeExpr::Slice(Box::new(ty));
            }

            let names = field_children(decl, "name");
            if names.is_empty() {
                params.push(Param {
                    id: self.fresh(),
                    name: None,
                    ty,
                });
            } else {
                for name in names {
                    params.push(Param {
                        id: self.fresh(),
                        name: Some(self.text(name)),
                        ty: ty.clone(),
                    });
                }
            }
        }

        params
    }

    fn param_types(&self, list: Node<'_>) -> Vec<TypeExpr> {
        let mut types = Vec::new();
        for decl in named_children(list) {
            let Some(ty_node) = decl.child_by_field_name("type") else {
                continue;
            };
            let ty = self.type_expr(ty_node);
            let count = field_children(decl, "name").len().max(1);
            types.extend(std::iter::repeat(ty).take(count));
        }
        types
    }

    fn results(&self, result: Node<'_>) -> Vec<TypeExpr> {
        if result.kind() == "parameter_list" {
            self.param_types(result)
        } else {
            vec![self.type_expr(result)]
        }
    }

    fn type_expr(&self, node: Node<'_>) -> TypeExpr {
        let field = |name: &str| node.child_by_field_name(name);
        let boxed = |child: Option<Node<'_>>| {
            Box::new(
                child
                    .map(|c| self.type_expr(c))
                    .unwrap_or_else(|| TypeExpr::Other(String::new())),
            )
        };

        match node.kind() {
            "type_identifier" => TypeExpr::Name(self.text(node)),
            "qualified_type" => TypeExpr::Qualified {
                package: field("package").map(|n| self.text(n)).unwrap_or_default(),
                name: field("name").map(|n| self.text(n)).unwrap_or_default(),
            },
            "pointer_type" => TypeExpr::Pointer(boxed(named_children(node).first().copied())),
            "slice_type" => TypeExpr::Slice(boxed(field("element"))),
            "array_type" | "implicit_length_array_type" => TypeExpr::Array {
                len: field("length")
                    .map(|n| self.text(n))
                    .unwrap_or_else(|| "...".to_string()),
                elem: boxed(field("element")),
            },
            "map_type" => TypeExpr::Map {
                key: boxed(field("key")),
                value: boxed(field("value")),
            },
            "generic_type" => field("type")
                .map(|base| self.type_expr(base))
                .unwrap_or_else(|| TypeExpr::Other(self.text(node))),
            "parenthesized_type" => named_children(node)
                .first()
                .map(|inner| self.type_expr(*inner))
                .unwrap_or_else(|| TypeExpr::Other(self.text(node))),
            "struct_type" => TypeExpr::Struct(self.struct_fields(node)),
            "function_type" => TypeExpr::Func {
                params: field("parameters")
                    .map(|list| self.param_types(list))
                    .unwrap_or_default(),
                results: field("result")
                    .map(|result| self.results(result))
                    .unwrap_or_default(),
            },
            _ => TypeExpr::Other(self.text(node)),
        }
    }

    fn struct_fields(&self, node: Node<'_>) -> Vec<FieldSpec> {
        let Some(list) = named_children(node)
            .into_iter()
            .find(|n| n.kind() == "field_declaration_list")
        else {
            return Vec::new();
        };

        let mut fields = Vec::new();
        for decl in named_children(list) {
            if decl.kind() != "field_declaration" {
                continue;
            }
            let Some(ty_node) = decl.child_by_field_name("type") else {
                continue;
            };
            let ty = self.type_expr(ty_node);
            let names = field_children(decl, "name");

            if names.is_empty() {
                let Some(embedded) = ty.base_name().map(str::to_string) else {
                    continue;
                };
                let ty = if self.text(decl).trim_start().starts_with('*') {
                    TypeExpr::Pointer(Box::new(ty))
                } else {
                    ty
                };
                fields.push(FieldSpec { name: embedded, ty });
            } else {
                for name in names {
                    fields.push(FieldSpec {
                        name: self.text(name),
                        ty: ty.clone(),
                    });
                }
            }
        }
        fields
    }

    fn type_specs(&self, node: Node<'_>) -> Vec<TypeSpec> {
        let mut specs = Vec::new();
        let mut collect = |spec: Node<'_>| {
            let alias = spec.kind() == "type_alias";
            if !alias && spec.kind() != "type_spec" {
                return;
            }
            if let (Some(name), Some(ty)) = (
                spec.child_by_field_name("name"),
                spec.child_by_field_name("type"),
            ) {
                specs.push(TypeSpec {
                    name: self.text(name),
                    ty: self.type_expr(ty),
                    alias,
                });
            }
        };

        for child in named_children(node) {
            if child.kind() == "type_spec_list" {
                named_children(child).into_iter().for_each(&mut collect);
            } else {
                collect(child);
            }
        }
        specs
    }

    fn var_specs(&mut self, node: Node<'_>) -> Vec<VarSpec> {
        let mut specs = Vec::new();
        for child in named_children(node) {
            match child.kind() {
                "var_spec" | "const_spec" => specs.push(self.var_spec(child)),
                "var_spec_list" | "const_spec_list" => {
                    for spec in named_children(child) {
                        if matches!(spec.kind(), "var_spec" | "const_spec") {
                            specs.push(self.var_spec(spec));
                        }
                    }
                }
                _ => {}
            }
        }
        specs
    }

    fn var_spec(&mut self, node: Node<'_>) -> VarSpec {
        let names = field_children(node, "name")
            .into_iter()
            .map(|name| self.text(name))
            .collect();
        let ty = node.child_by_field_name("type").map(|ty| self.type_expr(ty));
        let values = node
            .child_by_field_name("value")
            .map(|list| self.expr_list(list))
            .unwrap_or_default();
        VarSpec { names, ty, values }
    }

    fn block(&mut self, node: Node<'_>) -> Block {
        self.statements(node, &[])
    }

    /// Statements directly under `node`, flattening `statement_list` wrappers and skipping
    /// the header nodes listed in `skip`.
    fn statements(&mut self, node: Node<'_>, skip: &[usize]) -> Block {
        let mut stmts = Vec::new();
        for child in named_children(node) {
            if skip.contains(&child.id()) {
                continue;
            }
            if child.kind() == "statement_list" {
                for inner in named_children(child) {
                    stmts.extend(self.stmt(inner));
                }
            } else {
                stmts.extend(self.stmt(child));
            }
        }
        stmts
    }

    fn stmt(&mut self, node: Node<'_>) -> Option<Stmt> {
        let field = |name: &str| node.child_by_field_name(name);

        let stmt = match node.kind() {
            "empty_statement" | "type_declaration" => return None,
            "expression_statement" => Stmt::Expr(self.first_expr(node)),
            "short_var_declaration" | "assignment_statement" => Stmt::Assign {
                lhs: field("left").map(|l| self.expr_list(l)).unwrap_or_default(),
                rhs: field("right").map(|r| self.expr_list(r)).unwrap_or_default(),
                define: node.kind() == "short_var_declaration",
            },
            "var_declaration" | "const_declaration" => Stmt::Var(self.var_specs(node)),
            "return_statement" => Stmt::Return(
                named_children(node)
                    .first()
                    .map(|list| self.expr_list(*list))
                    .unwrap_or_default(),
            ),
            "if_statement" => {
                let init = field("initializer")
                    .and_then(|init| self.stmt(init))
                    .map(Box::new);
                let cond = match field("condition") {
                    Some(cond) => self.expr(cond),
                    None => self.node(ExprKind::Other(Vec::new())),
                };
                let then = field("consequence")
                    .map(|block| self.block(block))
                    .unwrap_or_default();
                let els = field("alternative").and_then(|alt| {
                    if alt.kind() == "block" {
                        Some(Box::new(Stmt::Block(self.block(alt))))
                    } else {
                        self.stmt(alt).map(Box::new)
                    }
                });
                Stmt::If {
                    init,
                    cond,
                    then,
                    els,
                }
            }
            "for_statement" => self.for_stmt(node),
            "expression_switch_statement" | "type_switch_statement" | "select_statement" => {
                self.switch_stmt(node)
            }
            "go_statement" => Stmt::Go(self.first_expr(node)),
            "defer_statement" => Stmt::Defer(self.first_expr(node)),
            "block" => Stmt::Block(self.block(node)),
            "labeled_statement" => {
                let inner = named_children(node)
                    .into_iter()
                    .find(|child| child.kind() != "label_name")?;
                return self.stmt(inner);
            }
            "inc_statement" | "dec_statement" | "send_statement" | "receive_statement" => {
                Stmt::Other(
                    named_children(node)
                        .into_iter()
                        .map(|child| self.expr(child))
                        .collect(),
                )
            }
            _ => Stmt::Other(Vec::new()),
        };

        Some(stmt)
    }

    fn for_stmt(&mut self, node: Node<'_>) -> Stmt {
        let body_node = node.child_by_field_name("body");
        let body = body_node.map(|b| self.block(b)).unwrap_or_default();
        let body_id = body_node.map(|b| b.id());

        let mut header = Vec::new();
        let mut cond = None;
        for child in named_children(node) {
            if Some(child.id()) == body_id {
                continue;
            }
            match child.kind() {
                "for_clause" => {
                    if let Some(init) = child.child_by_field_name("initializer") {
                        header.extend(self.stmt(init));
                    }
                    if let Some(condition) = child.child_by_field_name("condition") {
                        cond = Some(self.expr(condition));
                    }
                    if let Some(update) = child.child_by_field_name("update") {
                        header.extend(self.stmt(update));
                    }
                }
                "range_clause" => {
                    let lhs = child
                        .child_by_field_name("left")
                        .map(|left| self.expr_list(left))
                        .unwrap_or_default();
                    let value = match child.child_by_field_name("right") {
                        Some(right) => self.expr(right),
                        None => self.node(ExprKind::Other(Vec::new())),
                    };
                    header.push(Stmt::Range {
                        lhs,
                        define: has_token(child, ":="),
                        value,
                    });
                }
                _ => cond = Some(self.expr(child)),
            }
        }

        Stmt::For { header, cond, body }
    }

    fn switch_stmt(&mut self, node: Node<'_>) -> Stmt {
        let init = node
            .child_by_field_name("initializer")
            .and_then(|init| self.stmt(init))
            .map(Box::new);
        let tag = node.child_by_field_name("value").map(|value| self.expr(value));

        let mut cases = Vec::new();
        for child in named_children(node) {
            if matches!(
                child.kind(),
                "expression_case" | "type_case" | "default_case" | "communication_case"
            ) {
                cases.push(self.case(child));
            }
        }

        Stmt::Switch { init, tag, cases }
    }

    fn case(&mut self, node: Node<'_>) -> Case {
        let mut skip = Vec::new();
        let mut values = Vec::new();
        let mut body = Vec::new();

        for value in field_children(node, "value") {
            skip.push(value.id());
            values.extend(self.expr_list(value));
        }
        for ty in field_children(node, "type") {
            skip.push(ty.id());
        }
        for comm in field_children(node, "communication") {
            skip.push(comm.id());
            body.extend(self.stmt(comm));
        }

        body.extend(self.statements(node, &skip));
        Case { values, body }
    }

    fn first_expr(&mut self, node: Node<'_>) -> Expr {
        match named_children(node).first() {
            Some(child) => self.expr(*child),
            None => self.node(ExprKind::Other(Vec::new())),
        }
    }

    fn expr_list(&mut self, node: Node<'_>) -> Vec<Expr> {
        if node.kind() == "expression_list" {
            named_children(node)
                .into_iter()
                .map(|child| self.expr(child))
                .collect()
        } else {
            vec![self.expr(node)]
        }
    }

    fn boxed_expr(&mut self, node: Option<Node<'_>>) -> Box<Expr> {
        Box::new(match node {
            Some(node) => self.expr(node),
            None => self.node(ExprKind::Other(Vec::new())),
        })
    }

    fn expr(&mut self, node: Node<'_>) -> Expr {
        let field = |name: &str| node.child_by_field_name(name);

        let kind = match node.kind() {
            "identifier" | "field_identifier" | "package_identifier" | "true" | "false"
            | "nil" | "iota" => ExprKind::Ident(self.text(node)),
            "selector_expression" => ExprKind::Selector {
                operand: self.boxed_expr(field("operand")),
                field: field("field").map(|f| self.text(f)).unwrap_or_default(),
            },
            "call_expression" => {
                let func = self.boxed_expr(field("function"));
                let args = field("arguments")
                    .map(|list| {
                        named_children(list)
                            .into_iter()
                            .map(|arg| self.expr(arg))
                            .collect()
                    })
                    .unwrap_or_default();
                ExprKind::Call { func, args }
            }
            "interpreted_string_literal" | "raw_string_literal" => {
                ExprKind::StringLit(unquote(&self.text(node)))
            }
            "int_literal" => self.basic_lit(node, LitKind::Int),
            "float_literal" => self.basic_lit(node, LitKind::Float),
            "imaginary_literal" => self.basic_lit(node, LitKind::Imaginary),
            "rune_literal" => self.basic_lit(node, LitKind::Rune),
            "unary_expression" => ExprKind::Unary {
                op: field("operator").map(|op| self.text(op)).unwrap_or_default(),
                operand: self.boxed_expr(field("operand")),
            },
            "binary_expression" => ExprKind::Binary {
                op: field("operator").map(|op| self.text(op)).unwrap_or_default(),
                left: self.boxed_expr(field("left")),
                right: self.boxed_expr(field("right")),
            },
            "composite_literal" => ExprKind::CompositeLit {
                ty: field("type").map(|ty| self.type_expr(ty)),
                elements: field("body")
                    .map(|body| {
                        named_children(body)
                            .into_iter()
                            .map(|element| self.expr(element))
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            "func_literal" => ExprKind::FuncLit {
                params: field("parameters")
                    .map(|list| self.params(list))
                    .unwrap_or_default(),
                results: field("result")
                    .map(|result| self.results(result))
                    .unwrap_or_default(),
                body: field("body").map(|body| self.block(body)).unwrap_or_default(),
            },
            "index_expression" => ExprKind::Index {
                operand: self.boxed_expr(field("operand")),
                index: self.boxed_expr(field("index")),
            },
            "parenthesized_expression" => {
                ExprKind::Paren(self.boxed_expr(named_children(node).first().copied()))
            }
            "type_assertion_expression" => ExprKind::TypeAssert {
                operand: self.boxed_expr(field("operand")),
                ty: field("type")
                    .map(|ty| self.type_expr(ty))
                    .unwrap_or_else(|| TypeExpr::Other(String::new())),
            },
            "type_conversion_expression" => ExprKind::Conversion {
                ty: field("type")
                    .map(|ty| self.type_expr(ty))
                    .unwrap_or_else(|| TypeExpr::Other(String::new())),
                operand: self.boxed_expr(field("operand")),
            },
            kind if is_type_node(kind) => ExprKind::TypeArg(self.type_expr(node)),
            _ => ExprKind::Other(
                named_children(node)
                    .into_iter()
                    .map(|child| self.expr(child))
                    .collect(),
            ),
        };

        self.node(kind)
    }

    fn basic_lit(&self, node: Node<'_>, kind: LitKind) -> ExprKind {
        ExprKind::BasicLit {
            kind,
            text: self.text(node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::ExprKind;
    use std::io::Write;
    use tempfile::TempDir;

    fn parse(code: &str) -> SourceFile {
        let mut parser = GoParser::new().expect("Failed to load Go grammar");
        parser
            .parse_source(Path::new("test.go"), code)
            .expect("Failed to parse test code")
    }

    fn only_func(file: &SourceFile) -> &FuncDecl {
        file.functions().next().expect("no function declared")
    }

    #[test]
    fn test_parse_package_and_imports() {
        let file = parse(
            r#"
package account

import (
	"github.com/gin-gonic/gin"
	commonResp "example.com/app/model/common/response"
	_ "embed"
)
"#,
        );

        assert_eq!(file.package, "account");
        assert_eq!(file.imports.len(), 3);
        assert_eq!(file.imports[0].path, "github.com/gin-gonic/gin");
        assert_eq!(file.imports[0].alias, None);
        assert_eq!(file.imports[1].alias.as_deref(), Some("commonResp"));
        assert_eq!(file.imports[1].path, "example.com/app/model/common/response");
        assert_eq!(file.imports[2].alias.as_deref(), Some("_"));
    }

    #[test]
    fn test_parse_method_with_receiver_and_doc() {
        let file = parse(
            r#"package account

import "github.com/gin-gonic/gin"

type accountApi struct{}

// GetAccountInfo 获取账户信息
// second line
func (*accountApi) GetAccountInfo(c *gin.Context) {
}
"#,
        );

        let func = only_func(&file);
        assert_eq!(func.name, "GetAccountInfo");
        let receiver = func.receiver.as_ref().unwrap();
        assert_eq!(receiver.type_name, "accountApi");
        assert!(receiver.pointer);
        assert_eq!(receiver.name, None);

        assert_eq!(func.params.len(), 1);
        assert_eq!(func.params[0].name.as_deref(), Some("c"));
        assert_eq!(
            func.params[0].ty,
            TypeExpr::Pointer(Box::new(TypeExpr::Qualified {
                package: "gin".to_string(),
                name: "Context".to_string(),
            }))
        );

        assert_eq!(
            func.doc,
            vec!["// GetAccountInfo 获取账户信息", "// second line"]
        );
        assert_eq!(func.span.line, 9);
        assert_eq!(func.span.line_start_byte, func.span.start_byte);
    }

    #[test]
    fn test_doc_comment_must_be_adjacent() {
        let file = parse(
            r#"package main

// detached comment

func handler() {}
"#,
        );

        assert!(only_func(&file).doc.is_empty());
    }

    #[test]
    fn test_parse_results_and_grouped_params() {
        let file = parse(
            r#"package service

func (accountService) GetAccountInfo(a, b int, req request.GetAccountInfoReq) (*response.AccountInfo, error) {
	return nil, nil
}
"#,
        );

        let func = only_func(&file);
        assert_eq!(func.params.len(), 3);
        assert_eq!(func.params[0].ty, TypeExpr::Name("int".to_string()));
        assert_eq!(func.params[1].ty, TypeExpr::Name("int".to_string()));
        assert_ne!(func.params[0].id, func.params[1].id);
        assert_eq!(func.results.len(), 2);
        assert_eq!(func.results[0].to_string(), "*response.AccountInfo");
        assert_eq!(func.results[1], TypeExpr::Name("error".to_string()));
    }

    #[test]
    fn test_parse_handler_body_statements() {
        let file = parse(
            r#"package account

func (*accountApi) GetAccountInfo(c *gin.Context) {
	var req request.GetAccountInfoReq

	if err := c.ShouldBindJSON(&req); err != nil {
		c.JSON(200, gin.H{"code": 0, "msg": err.Error()})
	}

	accountInfo, err := service.AccountService.GetAccountInfo(req)
	if err != nil {
		return
	}

	c.JSON(200, accountInfo)
}
"#,
        );

        let body = only_func(&file).body.as_ref().unwrap();
        assert_eq!(body.len(), 5);

        match &body[0] {
            Stmt::Var(specs) => {
                assert_eq!(specs[0].names, vec!["req"]);
                assert_eq!(
                    specs[0].ty.as_ref().map(ToString::to_string).as_deref(),
                    Some("request.GetAccountInfoReq")
                );
            }
            other => panic!("expected var declaration, got {:?}", other),
        }

        match &body[1] {
            Stmt::If { init: Some(init), then, .. } => {
                let Stmt::Assign { rhs, define, .. } = init.as_ref() else {
                    panic!("expected assignment in if initializer");
                };
                assert!(define);
                let (receiver, method, args) = rhs[0].as_method_call().unwrap();
                assert_eq!(receiver.as_ident(), Some("c"));
                assert_eq!(method, "ShouldBindJSON");
                assert!(matches!(&args[0].kind, ExprKind::Unary { op, .. } if op == "&"));
                assert_eq!(then.len(), 1);
            }
            other => panic!("expected if statement, got {:?}", other),
        }

        match &body[2] {
            Stmt::Assign { lhs, rhs, define } => {
                assert!(define);
                assert_eq!(lhs.len(), 2);
                let (receiver, method, _) = rhs[0].as_method_call().unwrap();
                assert_eq!(method, "GetAccountInfo");
                let (package, member) = receiver.as_selector().unwrap();
                assert_eq!(package.as_ident(), Some("service"));
                assert_eq!(member, "AccountService");
            }
            other => panic!("expected short var declaration, got {:?}", other),
        }

        let Stmt::Expr(last) = &body[4] else {
            panic!("expected expression statement");
        };
        let (_, method, args) = last.as_method_call().unwrap();
        assert_eq!(method, "JSON");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_parse_router_groups_and_nested_block() {
        let file = parse(
            r#"package router

func InitRouter(e *gin.Engine) {
	g := e.Group("/account")
	{
		g.GET("/getUserInfo", account.AccountApi.GetAccountInfo)
	}
}
"#,
        );

        let body = only_func(&file).body.as_ref().unwrap();
        assert_eq!(body.len(), 2);
        let Stmt::Assign { rhs, .. } = &body[0] else {
            panic!("expected group assignment");
        };
        let (_, method, args) = rhs[0].as_method_call().unwrap();
        assert_eq!(method, "Group");
        assert_eq!(args[0].as_string_lit(), Some("/account"));

        let Stmt::Block(inner) = &body[1] else {
            panic!("expected nested block");
        };
        let Stmt::Expr(call) = &inner[0] else {
            panic!("expected registration call");
        };
        let (_, method, args) = call.as_method_call().unwrap();
        assert_eq!(method, "GET");
        assert_eq!(args[1].as_selector().map(|(_, name)| name), Some("GetAccountInfo"));
    }

    #[test]
    fn test_parse_struct_and_var_declarations() {
        let file = parse(
            r#"package account

type accountApi struct {
	Name, Alias string
	*Base
	Items []response.Item `json:"items"`
}

type Alias = accountApi

var AccountApi = &accountApi{}

var (
	Count int
	Flag  = true
)
"#,
        );

        let Decl::Type(types) = &file.decls[0] else {
            panic!("expected type declaration");
        };
        let TypeExpr::Struct(fields) = &types[0].ty else {
            panic!("expected struct type");
        };
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Name", "Alias", "Base", "Items"]);
        assert_eq!(fields[2].ty.to_string(), "*Base");
        assert_eq!(fields[3].ty.to_string(), "[]response.Item");

        let Decl::Type(aliases) = &file.decls[1] else {
            panic!("expected alias declaration");
        };
        assert!(aliases[0].alias);

        let Decl::Var(vars) = &file.decls[2] else {
            panic!("expected var declaration");
        };
        assert_eq!(vars[0].names, vec!["AccountApi"]);
        assert!(matches!(vars[0].values[0].kind, ExprKind::Unary { .. }));

        let Decl::Var(grouped) = &file.decls[3] else {
            panic!("expected grouped var declaration");
        };
        assert_eq!(grouped.len(), 2);
    }

    #[test]
    fn test_parse_invalid_go_file() {
        let mut parser = GoParser::new().unwrap();
        let result = parser.parse_source(Path::new("broken.go"), "package main\nfunc broken( {\n");

        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("broken.go"));
    }

    #[test]
    fn test_parse_nonexistent_file() {
        let mut parser = GoParser::new().unwrap();
        let result = parser.parse_file(Path::new("/nonexistent/file.go"));

        assert!(matches!(result, Err(Error::IoError(_))));
    }

    #[test]
    fn test_parse_files_batch_shares_id_space() {
        let temp_dir = TempDir::new().unwrap();
        let mut paths = Vec::new();
        for (name, code) in [
            ("a.go", "package a\nfunc A(x int) {}\n"),
            ("b.go", "package a\nfunc B(y int) {}\n"),
        ] {
            let path = temp_dir.path().join(name);
            let mut file = fs::File::create(&path).unwrap();
            file.write_all(code.as_bytes()).unwrap();
            paths.push(path);
        }

        let mut parser = GoParser::new().unwrap();
        let files = parser.parse_files(&paths).unwrap();

        assert_eq!(files.len(), 2);
        let a = files[0].functions().next().unwrap().params[0].id;
        let b = files[1].functions().next().unwrap().params[0].id;
        assert_ne!(a, b);
    }
}
