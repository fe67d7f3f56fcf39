//! The semantic analyzer: a single depth-first pass over the AST that
//! produces a type for every expression, a diagnostic log, and a
//! pass/fail verdict.
//!
//! The pass never short-circuits; the whole tree is traversed and the
//! caller inspects the ERROR count afterwards. Any ERROR means code
//! generation must not run.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::ast::{
    BlockExpression, Crate, Expression, Function, IfExpression, Item, LetStatement, LiteralKind,
    Pattern, Statement, TypeNode, UseDecl,
};

use super::{
    diagnostics::{Diagnostics, SemanticError},
    scope::ScopeStack,
    types::{ExprResult, TypeDescriptor},
};

fn integer_primitives() -> Vec<TypeDescriptor> {
    let mut types = vec![];
    for signed in [false, true] {
        for width in [8u8, 16, 32, 64] {
            types.push(TypeDescriptor::primitive(width, signed));
        }
    }
    types
}

fn integer_operand_pairs() -> Vec<(TypeDescriptor, TypeDescriptor)> {
    integer_primitives()
        .into_iter()
        .map(|ty| (ty.clone(), ty))
        .collect()
}

lazy_static! {
    static ref ALLOWED_UNARY_OP_TYPES: HashMap<&'static str, Vec<TypeDescriptor>> = {
        let mut map = HashMap::new();
        map.insert("!", integer_primitives());
        map.insert(
            "-",
            [8u8, 16, 32, 64]
                .iter()
                .map(|width| TypeDescriptor::primitive(*width, true))
                .collect(),
        );
        map
    };
    static ref ALLOWED_BINARY_OP_TYPES: HashMap<&'static str, Vec<(TypeDescriptor, TypeDescriptor)>> = {
        let mut map = HashMap::new();
        for op in [
            "+", "-", "*", "/", "%", "<", ">", "<=", ">=", "==", "!=", "&&", "||",
        ] {
            map.insert(op, integer_operand_pairs());
        }
        map
    };
}

pub struct Analyzer {
    pub scopes: ScopeStack,
    pub diags: Diagnostics,
}

/// Runs a fresh analyzer over one compilation unit.
pub fn analyze(krate: &Crate) -> Analyzer {
    let mut analyzer = Analyzer::new();
    analyzer.visit_crate(krate);
    analyzer
}

impl Analyzer {
    pub fn new() -> Self {
        Analyzer {
            scopes: ScopeStack::new(),
            diags: Diagnostics::new(),
        }
    }

    pub fn visit_crate(&mut self, krate: &Crate) {
        self.scopes.enter(&mut self.diags);
        self.preseed();

        for item in &krate.items {
            self.visit_item(item);
        }

        self.scopes.leave(&mut self.diags);
        debug_assert_eq!(self.scopes.depth(), 0);
    }

    /// Installs the built-in vocabulary into the crate-root scope:
    /// integer primitives, the standard aliases, and the runtime's
    /// writer intrinsics.
    fn preseed(&mut self) {
        for width in [8u8, 16, 32, 64] {
            self.scopes.declare(
                &format!("u{}", width),
                TypeDescriptor::primitive(width, false),
                &mut self.diags,
            );
            self.scopes.declare(
                &format!("i{}", width),
                TypeDescriptor::primitive(width, true),
                &mut self.diags,
            );
        }

        let aliases = [
            ("isize", "i64"),
            ("usize", "u64"),
            ("char", "i8"),
            ("bool", "u8"),
        ];
        for (alias, target) in aliases {
            let target_ty = self.builtin(target);
            self.scopes.declare(
                alias,
                TypeDescriptor::Typedef(Box::new(target_ty)),
                &mut self.diags,
            );
        }

        let char_ty = self.builtin("char");
        self.scopes.declare(
            "str",
            TypeDescriptor::Pointer {
                mutable: false,
                inner: Box::new(char_ty),
            },
            &mut self.diags,
        );

        self.scopes.declare(
            "oxide::writeln_i64",
            TypeDescriptor::Function {
                params: vec![TypeDescriptor::primitive(64, true)],
                return_type: Box::new(TypeDescriptor::Void),
            },
            &mut self.diags,
        );
        self.scopes.declare(
            "oxide::writeln_char",
            TypeDescriptor::Function {
                params: vec![TypeDescriptor::primitive(8, true)],
                return_type: Box::new(TypeDescriptor::Void),
            },
            &mut self.diags,
        );
    }

    fn builtin(&self, name: &str) -> TypeDescriptor {
        self.scopes
            .lookup(name)
            .cloned()
            .unwrap_or(TypeDescriptor::Void)
    }

    fn visit_item(&mut self, item: &Item) {
        match item {
            Item::Function(function) => self.visit_function(function),
            Item::Use(decl) => self.visit_use(decl),
        }
    }

    fn visit_use(&mut self, decl: &UseDecl) {
        let Some(last) = decl.path.last() else {
            return;
        };
        self.scopes.declare(
            last,
            TypeDescriptor::Namespace(decl.path.join("::")),
            &mut self.diags,
        );
    }

    /// The signature is declared in the enclosing scope before the body
    /// is visited, so a function may call itself but not a later
    /// sibling.
    fn visit_function(&mut self, function: &Function) {
        let mut call_params = Vec::with_capacity(function.params.len());
        for param in &function.params {
            let ty = self
                .visit_type(&param.var_type)
                .unwrap_or(TypeDescriptor::Void);
            call_params.push(ty.resolve().clone());
        }

        let return_type = match &function.return_type {
            Some(node) => self.visit_type(node).unwrap_or(TypeDescriptor::Void),
            None => TypeDescriptor::Void,
        };

        self.scopes.declare(
            &function.id,
            TypeDescriptor::Function {
                params: call_params.clone(),
                return_type: Box::new(return_type.clone()),
            },
            &mut self.diags,
        );

        self.scopes.enter(&mut self.diags);
        for (param, ty) in function.params.iter().zip(&call_params) {
            self.scopes.declare(&param.id, ty.clone(), &mut self.diags);
        }

        let body_type = self.visit_block(&function.body).resolved();
        let declared = return_type.resolve();
        if *declared != body_type {
            self.diags.error(SemanticError::ReturnTypeContradiction {
                name: function.id.clone(),
                declared: declared.to_string(),
                body: body_type.to_string(),
            });
        }

        self.scopes.leave(&mut self.diags);
    }

    fn visit_statement(&mut self, statement: &Statement) -> Option<ExprResult> {
        match statement {
            Statement::Let(decl) => {
                self.visit_let(decl);
                None
            }
            Statement::Item(item) => {
                self.visit_item(item);
                None
            }
            Statement::Expression(expression) => self.visit_expression(expression),
        }
    }

    /// Exactly one of {annotation, initializer} may be missing; when
    /// both are present their resolved types must agree. The resolved
    /// type is what gets declared.
    fn visit_let(&mut self, decl: &LetStatement) {
        let Pattern::Identifier { id: name, .. } = &decl.assignee else {
            // non-identifier binding patterns get no binding in this subset
            return;
        };

        if decl.var_type.is_none() && decl.expr.is_none() {
            self.diags.error(SemanticError::CannotDetermineType {
                name: name.clone(),
            });
            return;
        }

        let inferred = decl
            .expr
            .as_ref()
            .and_then(|expression| self.visit_expression(expression))
            .map(|result| result.resolved());
        let declared = decl
            .var_type
            .as_ref()
            .and_then(|node| self.visit_type(node))
            .map(|ty| ty.resolve().clone());

        if let (Some(declared), Some(inferred)) = (&declared, &inferred) {
            if declared != inferred {
                self.diags.error(SemanticError::LetTypeContradiction {
                    name: name.clone(),
                    declared: declared.to_string(),
                    inferred: inferred.to_string(),
                });
                return;
            }
        }

        let Some(ty) = declared.or(inferred) else {
            return;
        };
        self.scopes.declare(name, ty, &mut self.diags);
    }

    /// Statements that transfer control contribute pending-return types;
    /// the trailing expression contributes its own type; more than one
    /// distinct resolved contributor is an error.
    fn visit_block(&mut self, block: &BlockExpression) -> ExprResult {
        self.scopes.enter(&mut self.diags);

        let mut contributors: Vec<TypeDescriptor> = vec![];
        for statement in &block.statements {
            if let Some(result) = self.visit_statement(statement) {
                if result.is_pending() {
                    contributors.push(result.resolved());
                }
            }
        }
        if let Some(trailing) = &block.expr {
            if let Some(result) = self.visit_expression(trailing) {
                contributors.push(result.resolved());
            }
        }
        if contributors.is_empty() {
            contributors.push(TypeDescriptor::Void);
        }

        self.scopes.leave(&mut self.diags);

        let mut distinct: Vec<&TypeDescriptor> = vec![];
        for ty in &contributors {
            if !distinct.contains(&ty) {
                distinct.push(ty);
            }
        }
        if distinct.len() > 1 {
            let listing = distinct
                .iter()
                .map(|ty| ty.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            self.diags.error(SemanticError::BlockTypeContradiction {
                types: format!("{{ {} }}", listing),
            });
        }

        ExprResult::Value(contributors.last().cloned().unwrap_or(TypeDescriptor::Void))
    }

    pub fn visit_expression(&mut self, expression: &Expression) -> Option<ExprResult> {
        match expression {
            Expression::Literal { kind, value } => {
                Some(ExprResult::Value(self.literal_type(*kind, value)))
            }
            Expression::Path { segments } => {
                let name = segments.join("::");
                match self.scopes.lookup(&name) {
                    Some(descriptor) => Some(ExprResult::Value(descriptor.clone())),
                    None => {
                        self.diags.error(SemanticError::UndeclaredName { name });
                        None
                    }
                }
            }
            Expression::Call { callee, params } => self.visit_call(callee, params),
            Expression::Binary { op, lhs, rhs } => self.visit_binary(op, lhs, rhs),
            Expression::Unary { op, value } => self.visit_unary(op, value),
            Expression::Assignment { assignee, value } => self.visit_assignment(assignee, value),
            Expression::Cast { expr, ty } => {
                self.visit_expression(expr);
                let target = self.visit_type(ty)?;
                Some(ExprResult::Value(target))
            }
            Expression::Borrow { is_mut, expr } => {
                let inner = self.visit_expression(expr)?.resolved();
                Some(ExprResult::Reference {
                    mutable: *is_mut,
                    inner,
                })
            }
            Expression::ArrayIndex { object, index } => self.visit_array_index(object, index),
            Expression::Block(block) => Some(self.visit_block(block)),
            Expression::If(if_expr) => self.visit_if(if_expr),
            Expression::InfiniteLoop { body } => Some(self.visit_block(body)),
            Expression::PredicateLoop { expr, body } => {
                self.scopes.enter(&mut self.diags);
                self.visit_expression(expr);
                let result = self.visit_block(body);
                self.scopes.leave(&mut self.diags);
                Some(result)
            }
            Expression::IteratorLoop {
                pattern,
                expr,
                body,
            } => {
                self.scopes.enter(&mut self.diags);
                let iterated = self
                    .visit_expression(expr)
                    .map(|result| result.resolved())
                    .unwrap_or(TypeDescriptor::Void);
                if let Pattern::Identifier { id, .. } = pattern {
                    self.scopes.declare(id, iterated, &mut self.diags);
                }
                let result = self.visit_block(body);
                self.scopes.leave(&mut self.diags);
                Some(result)
            }
            Expression::Return { expr } => {
                let ty = match expr {
                    Some(inner) => self
                        .visit_expression(inner)
                        .map(|result| result.resolved())
                        .unwrap_or(TypeDescriptor::Void),
                    None => TypeDescriptor::Void,
                };
                Some(ExprResult::Pending(ty))
            }
            Expression::Break { expr } => {
                let ty = match expr {
                    Some(inner) => self
                        .visit_expression(inner)
                        .map(|result| result.resolved())
                        .unwrap_or(TypeDescriptor::Void),
                    None => TypeDescriptor::Void,
                };
                Some(ExprResult::Pending(ty))
            }
            Expression::Continue => Some(ExprResult::Pending(TypeDescriptor::Void)),
            // Explicitly unsupported in this subset: defined neutral
            // results, no invented semantics
            Expression::MethodCall { .. }
            | Expression::TupleIndex { .. }
            | Expression::Match { .. } => None,
        }
    }

    fn literal_type(&self, kind: LiteralKind, value: &str) -> TypeDescriptor {
        match kind {
            LiteralKind::Str => TypeDescriptor::Array {
                elem: Box::new(self.builtin("i8")),
                len: value.len(),
            },
            LiteralKind::Boolean => self.builtin("bool"),
            LiteralKind::Char => self.builtin("char"),
            LiteralKind::Integer => self.builtin("i64"),
        }
    }

    fn visit_if(&mut self, if_expr: &IfExpression) -> Option<ExprResult> {
        self.scopes.enter(&mut self.diags);

        // condition is visited for side effects only
        self.visit_expression(&if_expr.expr);

        let then_type = self.visit_block(&if_expr.if_true).resolved();
        let else_type = match if_expr.if_false.as_deref() {
            Some(Expression::Block(block)) => Some(self.visit_block(block).resolved()),
            Some(Expression::If(nested)) => {
                self.visit_if(nested).map(|result| result.resolved())
            }
            Some(other) => self
                .visit_expression(other)
                .map(|result| result.resolved()),
            None => None,
        };

        if let Some(else_type) = else_type {
            if then_type != else_type {
                self.diags.error(SemanticError::BranchTypeContradiction {
                    then_type: then_type.to_string(),
                    else_type: else_type.to_string(),
                });
            }
        }

        self.scopes.leave(&mut self.diags);
        Some(ExprResult::Value(then_type))
    }

    fn visit_unary(&mut self, op: &str, value: &Expression) -> Option<ExprResult> {
        let result = self.visit_expression(value)?;

        let Some(allowed) = ALLOWED_UNARY_OP_TYPES.get(op) else {
            self.diags.error(SemanticError::UnknownOperator {
                op: op.to_string(),
            });
            return None;
        };

        if matches!(result, ExprResult::Value(_)) {
            let resolved = result.resolved();
            if allowed.iter().any(|ty| *ty == resolved) {
                return Some(result);
            }
        }

        self.diags.error(SemanticError::UnaryOperandUnsupported {
            op: op.to_string(),
            operand: result.to_string(),
        });
        None
    }

    fn visit_binary(&mut self, op: &str, lhs: &Expression, rhs: &Expression) -> Option<ExprResult> {
        let lhs_result = self.visit_expression(lhs)?;
        let rhs_result = self.visit_expression(rhs)?;

        let Some(allowed) = ALLOWED_BINARY_OP_TYPES.get(op) else {
            self.diags.error(SemanticError::UnknownOperator {
                op: op.to_string(),
            });
            return None;
        };

        let plain_values = matches!(
            (&lhs_result, &rhs_result),
            (ExprResult::Value(_), ExprResult::Value(_))
        );
        let left = lhs_result.resolved();
        let right = rhs_result.resolved();
        if plain_values
            && allowed
                .iter()
                .any(|(allowed_l, allowed_r)| *allowed_l == left && *allowed_r == right)
        {
            // result type is the left operand's
            return Some(lhs_result);
        }

        self.diags.error(SemanticError::BinaryOperandsUnsupported {
            op: op.to_string(),
            lhs: left.to_string(),
            rhs: right.to_string(),
        });
        None
    }

    fn visit_assignment(&mut self, assignee: &Expression, value: &Expression) -> Option<ExprResult> {
        let value_type = self.visit_expression(value)?.resolved();

        let target_type = match assignee {
            Expression::Path { .. } | Expression::ArrayIndex { .. } => {
                self.visit_expression(assignee)?.resolved()
            }
            _ => {
                self.diags.error(SemanticError::AssignmentTargetInvalid);
                return None;
            }
        };

        if target_type != value_type {
            self.diags.error(SemanticError::AssignmentTypeContradiction {
                assignee: target_type.to_string(),
                value: value_type.to_string(),
            });
            return None;
        }

        Some(ExprResult::Value(value_type))
    }

    /// The callee must be a path naming a function; the argument list
    /// must equal the declared parameter list element-wise, after
    /// resolution.
    fn visit_call(&mut self, callee: &Expression, params: &[Expression]) -> Option<ExprResult> {
        let Expression::Path { segments } = callee else {
            self.diags.error(SemanticError::EmptyCallee);
            return None;
        };
        let name = segments.join("::");

        let mut arg_types = Vec::with_capacity(params.len());
        for param in params {
            arg_types.push(
                self.visit_expression(param)
                    .map(|result| result.resolved())
                    .unwrap_or(TypeDescriptor::Void),
            );
        }

        let Some(found) = self.scopes.lookup(&name).cloned() else {
            self.diags.error(SemanticError::MissingFunction { name });
            return None;
        };

        let TypeDescriptor::Function {
            params: declared_params,
            return_type,
        } = &found
        else {
            self.diags.error(SemanticError::NotAFunction {
                name,
                descriptor: found.to_string(),
            });
            return None;
        };

        if declared_params.len() != arg_types.len() {
            self.diags.error(SemanticError::CallArityMismatch {
                name,
                expected: declared_params.len(),
                received: arg_types.len(),
            });
            return None;
        }

        let declared_resolved: Vec<TypeDescriptor> = declared_params
            .iter()
            .map(|ty| ty.resolve().clone())
            .collect();
        if declared_resolved != arg_types {
            self.diags.error(SemanticError::CallParameterMismatch {
                name,
                received: type_listing(&arg_types),
                declared: type_listing(&declared_resolved),
            });
            return None;
        }

        Some(ExprResult::Value((**return_type).clone()))
    }

    fn visit_array_index(&mut self, object: &Expression, index: &Expression) -> Option<ExprResult> {
        let object_result = self.visit_expression(object)?;
        let index_type = self.visit_expression(index)?.resolved();

        if !matches!(index_type, TypeDescriptor::Primitive { .. }) {
            self.diags.error(SemanticError::InvalidIndexType {
                descriptor: index_type.to_string(),
            });
            return None;
        }

        match object_result.resolved() {
            TypeDescriptor::Array { elem, .. } => Some(ExprResult::Value(*elem)),
            other => {
                self.diags.error(SemanticError::NotAnArray {
                    descriptor: other.to_string(),
                });
                None
            }
        }
    }

    /// Maps a syntactic type form onto a descriptor through scope
    /// lookup. Forms outside the subset yield no descriptor.
    fn visit_type(&mut self, node: &TypeNode) -> Option<TypeDescriptor> {
        match node {
            TypeNode::Path(segments) => {
                let name = segments.join("::");
                match self.scopes.lookup(&name) {
                    Some(descriptor) => Some(descriptor.clone()),
                    None => {
                        self.diags.error(SemanticError::UnknownType { name });
                        None
                    }
                }
            }
            TypeNode::Pointer { is_mut, inner } => Some(TypeDescriptor::Pointer {
                mutable: *is_mut,
                inner: Box::new(self.visit_type(inner)?),
            }),
            TypeNode::Array { elem, len } => Some(TypeDescriptor::Array {
                elem: Box::new(self.visit_type(elem)?),
                len: *len,
            }),
            TypeNode::Tuple(elements) => {
                let mut types = Vec::with_capacity(elements.len());
                for element in elements {
                    types.push(self.visit_type(element)?);
                }
                Some(TypeDescriptor::Tuple(types))
            }
            TypeNode::Function { inputs, output } => {
                let mut params = Vec::with_capacity(inputs.len());
                for input in inputs {
                    params.push(self.visit_type(input)?);
                }
                let return_type = match output {
                    Some(node) => self.visit_type(node)?,
                    None => TypeDescriptor::Void,
                };
                Some(TypeDescriptor::Function {
                    params,
                    return_type: Box::new(return_type),
                })
            }
            // not typed in this subset
            TypeNode::Reference { .. }
            | TypeNode::Slice(_)
            | TypeNode::Never
            | TypeNode::Inferred => None,
        }
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Analyzer::new()
    }
}

fn type_listing(types: &[TypeDescriptor]) -> String {
    types
        .iter()
        .map(|ty| ty.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
