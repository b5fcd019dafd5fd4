//! Semantic analysis pass
//!
//! Registers declarations in the scoped symbol table, resolves
//! identifier and call references (user overloads and intrinsics),
//! computes the type denoter of every expression, and validates
//! statement-level rules. Diagnoses through a `ReportHandler`; a report
//! returned as `Err` aborts the enclosing statement or declaration and
//! analysis continues with the next one.

use std::cell::RefCell;
use std::rc::Rc;

use super::overload::{FuncSymbol, SymbolOverload, SymbolRef, TypeSymbol, VarSymbol};
use super::scope::SymbolTable;
use super::types::{common_data_type, common_scalar, scalar_rank, StructRef, TypeDenoter};
use crate::ast::{
    vector_data_type, vector_subscript_data_type, AssignOp, BinaryOp, CtrlTransfer, DataType,
    Decl, DeclKind, Expr, ExprKind, FunctionDecl, Intrinsic, Program, Stmt, StmtKind, TypeName,
    TypeNameKind, UnaryOp, VarDecl,
};
use crate::errors::{CompileError, CompileResult, Log, Report, ReportHandler, SourceArea};
use crate::source::SourceCode;

/// A resolved struct declaration
#[derive(Debug, Clone)]
pub struct StructInfo {
    pub ident: String,
    pub fields: Vec<(String, TypeDenoter)>,
}

impl StructInfo {
    pub fn field_type(&self, name: &str) -> Option<&TypeDenoter> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, ty)| ty)
    }
}

/// A resolved typedef declaration
#[derive(Debug, Clone)]
pub struct AliasInfo {
    pub ident: String,
    pub target: TypeDenoter,
}

/// The analyzed module: the struct registry backing `StructRef` indices
/// plus the resolved typedefs (the generator substitutes their targets)
#[derive(Debug, Default)]
pub struct Module {
    pub structs: Vec<StructInfo>,
    pub aliases: Vec<AliasInfo>,
}

impl Module {
    pub fn struct_info(&self, index: StructRef) -> Option<&StructInfo> {
        self.structs.get(index)
    }

    pub fn alias_target(&self, ident: &str) -> Option<&TypeDenoter> {
        self.aliases
            .iter()
            .find(|alias| alias.ident == ident)
            .map(|alias| &alias.target)
    }
}

type OverloadPtr = Rc<RefCell<SymbolOverload>>;

/// Run semantic analysis over the program. Reports are submitted to the
/// log as they occur; the pass fails if any error was reported.
pub fn analyze(program: &Program, source: &SourceCode, log: &mut dyn Log) -> CompileResult<Module> {
    let mut analyzer = Analyzer {
        source,
        reports: ReportHandler::new("context error", log),
        symbols: SymbolTable::new(),
        module: Module::default(),
        current_return: None,
        loop_depth: 0,
    };

    // pass 1: register all top-level declarations
    let mut functions = Vec::new();
    for decl in &program.decls {
        let resolved = match analyzer.collect_decl(decl) {
            Ok(resolved) => resolved,
            Err(report) => {
                analyzer.reports.submit(&report);
                None
            }
        };
        functions.push(resolved);
    }

    // pass 2: analyze function bodies
    for (decl, resolved) in program.decls.iter().zip(&functions) {
        if let (DeclKind::Function(func), Some(symbol)) = (&decl.kind, resolved) {
            analyzer.analyze_function(func, symbol);
        }
    }

    if analyzer.reports.has_errors() {
        return Err(CompileError::analyzer(
            "semantic analysis failed",
            SourceArea::IGNORE,
        ));
    }
    Ok(analyzer.module)
}

struct Analyzer<'a> {
    source: &'a SourceCode,
    reports: ReportHandler<'a>,
    symbols: SymbolTable<OverloadPtr>,
    module: Module,
    /// Return type of the function currently being analyzed
    current_return: Option<TypeDenoter>,
    loop_depth: usize,
}

impl<'a> Analyzer<'a> {
    /* ----- Declaration collection ----- */

    /// Register one top-level declaration; returns the resolved function
    /// symbol for function definitions (needed for body analysis).
    fn collect_decl(&mut self, decl: &Decl) -> Result<Option<Rc<FuncSymbol>>, Report> {
        match &decl.kind {
            DeclKind::Struct(s) => {
                let mut fields = Vec::new();
                for field in &s.fields {
                    let ty = self.var_denoter(field)?;
                    if fields.iter().any(|(name, _)| *name == field.name.name) {
                        self.reports.error(
                            &format!(
                                "field '{}' already declared in struct '{}'",
                                field.name.name, s.name.name
                            ),
                            Some(self.source),
                            field.name.area,
                        );
                        continue;
                    }
                    fields.push((field.name.name.clone(), ty));
                }
                let index = self.module.structs.len();
                self.module.structs.push(StructInfo {
                    ident: s.name.name.clone(),
                    fields,
                });
                let symbol = SymbolRef::Type(Rc::new(TypeSymbol {
                    ident: s.name.name.clone(),
                    denoter: TypeDenoter::Struct {
                        ident: s.name.name.clone(),
                        index,
                    },
                    area: s.name.area,
                }));
                self.register_symbol(&s.name.name, symbol, s.name.area);
                Ok(None)
            }
            DeclKind::Alias(alias) => {
                let target = self.resolve_type_name(&alias.ty)?;
                self.module.aliases.push(AliasInfo {
                    ident: alias.name.name.clone(),
                    target: target.clone(),
                });
                let symbol = SymbolRef::Type(Rc::new(TypeSymbol {
                    ident: alias.name.name.clone(),
                    denoter: TypeDenoter::Alias {
                        ident: alias.name.name.clone(),
                        target: Box::new(target),
                    },
                    area: alias.name.area,
                }));
                self.register_symbol(&alias.name.name, symbol, alias.name.area);
                Ok(None)
            }
            DeclKind::ConstBuffer(cb) => {
                let symbol = SymbolRef::Var(Rc::new(VarSymbol {
                    ident: cb.name.name.clone(),
                    ty: TypeDenoter::Buffer {
                        ident: cb.name.name.clone(),
                    },
                    is_const: true,
                    area: cb.name.area,
                }));
                self.register_symbol(&cb.name.name, symbol, cb.name.area);

                // cbuffer fields live in the global namespace
                for field in &cb.fields {
                    let ty = self.var_denoter(field)?;
                    let symbol = SymbolRef::Var(Rc::new(VarSymbol {
                        ident: field.name.name.clone(),
                        ty,
                        is_const: true,
                        area: field.name.area,
                    }));
                    self.register_symbol(&field.name.name, symbol, field.name.area);
                }
                Ok(None)
            }
            DeclKind::Texture(tex) => {
                let symbol = SymbolRef::Var(Rc::new(VarSymbol {
                    ident: tex.name.name.clone(),
                    ty: TypeDenoter::Texture { dim: tex.dim },
                    is_const: true,
                    area: tex.name.area,
                }));
                self.register_symbol(&tex.name.name, symbol, tex.name.area);
                Ok(None)
            }
            DeclKind::Sampler(smp) => {
                let symbol = SymbolRef::Var(Rc::new(VarSymbol {
                    ident: smp.name.name.clone(),
                    ty: TypeDenoter::Sampler,
                    is_const: true,
                    area: smp.name.area,
                }));
                self.register_symbol(&smp.name.name, symbol, smp.name.area);
                Ok(None)
            }
            DeclKind::Variable(var) => {
                self.collect_variable(var)?;
                Ok(None)
            }
            DeclKind::Function(func) => {
                let ret = match &func.return_type.kind {
                    TypeNameKind::Void => TypeDenoter::Void,
                    _ => self.resolve_type_name(&func.return_type)?,
                };
                let mut params = Vec::new();
                for param in &func.params {
                    let inner = self.resolve_type_name(&param.ty)?;
                    if param.array_dims.is_empty() {
                        params.push(inner);
                    } else {
                        params.push(TypeDenoter::Array {
                            inner: Box::new(inner),
                            dims: param.array_dims.clone(),
                        });
                    }
                }
                let symbol = Rc::new(FuncSymbol {
                    ident: func.name.name.clone(),
                    params,
                    ret,
                    area: func.name.area,
                });
                self.register_symbol(
                    &func.name.name,
                    SymbolRef::Func(Rc::clone(&symbol)),
                    func.name.area,
                );
                Ok(Some(symbol))
            }
        }
    }

    /// Resolve and register a variable declaration (global or local)
    fn collect_variable(&mut self, var: &VarDecl) -> Result<(), Report> {
        let ty = self.var_denoter(var)?;

        if let Some(init) = &var.initializer {
            let init_ty = self.expr_type(init)?;
            if !init_ty.is_castable_to(&ty) {
                self.reports.error(
                    &format!(
                        "cannot initialize variable '{}' of type '{}' with '{}'",
                        var.name.name, ty, init_ty
                    ),
                    Some(self.source),
                    init.area,
                );
            }
        }

        let symbol = SymbolRef::Var(Rc::new(VarSymbol {
            ident: var.name.name.clone(),
            ty,
            is_const: var.is_const,
            area: var.name.area,
        }));
        self.register_symbol(&var.name.name, symbol, var.name.area);
        Ok(())
    }

    /// The type denoter of a variable declaration, arrays included
    fn var_denoter(&mut self, var: &VarDecl) -> Result<TypeDenoter, Report> {
        let inner = self.resolve_type_name(&var.ty)?;
        if var.array_dims.is_empty() {
            Ok(inner)
        } else {
            Ok(TypeDenoter::Array {
                inner: Box::new(inner),
                dims: var.array_dims.clone(),
            })
        }
    }

    /// Resolve a spelled type into its denoter
    fn resolve_type_name(&mut self, ty: &TypeName) -> Result<TypeDenoter, Report> {
        match &ty.kind {
            TypeNameKind::Void => Ok(TypeDenoter::Void),
            TypeNameKind::Base(data_type) => Ok(TypeDenoter::Base(*data_type)),
            TypeNameKind::Ident(name) => {
                let Some(overload) = self.symbols.fetch(&name.name).cloned() else {
                    return Err(self.reports.error_break(
                        &format!("undefined type '{}'", name.name),
                        Some(self.source),
                        name.area,
                    ));
                };
                let fetched = overload.borrow().fetch_type();
                match fetched {
                    Ok(ty) => Ok(ty.denoter.clone()),
                    Err(err) => Err(self.reports.error_break(
                        &err.to_string(),
                        Some(self.source),
                        name.area,
                    )),
                }
            }
        }
    }

    /// Register a declaration under its identifier, merging function
    /// overloads declared at the same scope level
    fn register_symbol(&mut self, ident: &str, symbol: SymbolRef, area: SourceArea) {
        if let Some((overload, level)) = self.symbols.fetch_entry(ident) {
            if level == self.symbols.scope_level() {
                let overload = Rc::clone(overload);
                let added = overload.borrow_mut().add_symbol_ref(symbol);
                if !added {
                    self.reports.error(
                        &format!("identifier '{}' already declared in this scope", ident),
                        Some(self.source),
                        area,
                    );
                }
                return;
            }
        }

        let overload = Rc::new(RefCell::new(SymbolOverload::new(ident)));
        overload.borrow_mut().add_symbol_ref(symbol);
        if let Err(err) = self.symbols.register(ident, overload) {
            self.reports
                .error(&err.to_string(), Some(self.source), area);
        }
    }

    /* ----- Function bodies ----- */

    fn analyze_function(&mut self, func: &FunctionDecl, symbol: &Rc<FuncSymbol>) {
        self.current_return = Some(symbol.ret.clone());
        self.symbols.open_scope();

        for (param, ty) in func.params.iter().zip(&symbol.params) {
            if ty.is_void() {
                self.reports.error(
                    &format!("parameter '{}' cannot have void type", param.name.name),
                    Some(self.source),
                    param.area,
                );
                continue;
            }
            let var = SymbolRef::Var(Rc::new(VarSymbol {
                ident: param.name.name.clone(),
                ty: ty.clone(),
                is_const: false,
                area: param.area,
            }));
            self.register_symbol(&param.name.name, var, param.area);
        }

        self.analyze_block_stmts(&func.body.stmts);

        self.symbols.close_scope();
        self.current_return = None;
    }

    /// Analyze a statement list; a report aborts only its own statement
    fn analyze_block_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            if let Err(report) = self.analyze_stmt(stmt) {
                self.reports.submit(&report);
            }
        }
    }

    fn analyze_stmt(&mut self, stmt: &Stmt) -> Result<(), Report> {
        match &stmt.kind {
            StmtKind::Block(block) => {
                self.symbols.open_scope();
                self.analyze_block_stmts(&block.stmts);
                self.symbols.close_scope();
                Ok(())
            }
            StmtKind::VarDecl(var) => {
                if matches!(var.ty.kind, TypeNameKind::Void) {
                    return Err(self.reports.error_break(
                        &format!("variable '{}' cannot have void type", var.name.name),
                        Some(self.source),
                        var.area,
                    ));
                }
                self.collect_variable(var)
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.check_condition(cond)?;
                if let Err(report) = self.analyze_stmt(then_branch) {
                    self.reports.submit(&report);
                }
                if let Some(else_branch) = else_branch {
                    if let Err(report) = self.analyze_stmt(else_branch) {
                        self.reports.submit(&report);
                    }
                }
                Ok(())
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                self.symbols.open_scope();
                if let Some(init) = init {
                    if let Err(report) = self.analyze_stmt(init) {
                        self.reports.submit(&report);
                    }
                }
                if let Some(cond) = cond {
                    if let Err(report) = self.check_condition(cond) {
                        self.reports.submit(&report);
                    }
                }
                if let Some(step) = step {
                    if let Err(report) = self.expr_type(step) {
                        self.reports.submit(&report);
                    }
                }
                self.loop_depth += 1;
                if let Err(report) = self.analyze_stmt(body) {
                    self.reports.submit(&report);
                }
                self.loop_depth -= 1;
                self.symbols.close_scope();
                Ok(())
            }
            StmtKind::While { cond, body } | StmtKind::DoWhile { body, cond } => {
                if let Err(report) = self.check_condition(cond) {
                    self.reports.submit(&report);
                }
                self.loop_depth += 1;
                if let Err(report) = self.analyze_stmt(body) {
                    self.reports.submit(&report);
                }
                self.loop_depth -= 1;
                Ok(())
            }
            StmtKind::Return(value) => {
                let expected = self
                    .current_return
                    .clone()
                    .unwrap_or(TypeDenoter::Void);
                match value {
                    None => {
                        if !expected.is_void() {
                            self.reports.error(
                                &format!("return statement requires a value of type '{}'", expected),
                                Some(self.source),
                                stmt.area,
                            );
                        }
                    }
                    Some(expr) => {
                        let actual = self.expr_type(expr)?;
                        if expected.is_void() {
                            self.reports.error(
                                "void function cannot return a value",
                                Some(self.source),
                                expr.area,
                            );
                        } else if !actual.is_castable_to(&expected) {
                            self.reports.error(
                                &format!(
                                    "cannot convert return value from '{}' to '{}'",
                                    actual, expected
                                ),
                                Some(self.source),
                                expr.area,
                            );
                        }
                    }
                }
                Ok(())
            }
            StmtKind::CtrlTransfer(ctrl) => {
                match ctrl {
                    CtrlTransfer::Break | CtrlTransfer::Continue => {
                        if self.loop_depth == 0 {
                            self.reports.error(
                                &format!("'{}' statement outside of a loop", ctrl),
                                Some(self.source),
                                stmt.area,
                            );
                        }
                    }
                    CtrlTransfer::Discard | CtrlTransfer::Undefined => {}
                }
                Ok(())
            }
            StmtKind::Expr(expr) => {
                self.expr_type(expr)?;
                Ok(())
            }
        }
    }

    /// A condition expression must convert to a scalar boolean
    fn check_condition(&mut self, cond: &Expr) -> Result<(), Report> {
        let ty = self.expr_type(cond)?;
        if !ty.is_castable_to(&TypeDenoter::Base(DataType::Bool)) {
            self.reports.error(
                &format!("condition of type '{}' is not convertible to bool", ty),
                Some(self.source),
                cond.area,
            );
        }
        Ok(())
    }

    /* ----- Expressions ----- */

    fn expr_type(&mut self, expr: &Expr) -> Result<TypeDenoter, Report> {
        match &expr.kind {
            ExprKind::IntLiteral(_) => Ok(TypeDenoter::Base(DataType::Int)),
            ExprKind::FloatLiteral(_) => Ok(TypeDenoter::Base(DataType::Float)),
            ExprKind::BoolLiteral(_) => Ok(TypeDenoter::Base(DataType::Bool)),
            ExprKind::StringLiteral(_) => Ok(TypeDenoter::Base(DataType::String)),
            ExprKind::Ident(ident) => {
                let var = self.fetch_var(&ident.name, ident.area)?;
                Ok(var.ty.clone())
            }
            ExprKind::Assign { lhs, op, rhs } => self.assign_type(lhs, *op, rhs),
            ExprKind::Binary { lhs, op, rhs } => self.binary_type(expr, lhs, *op, rhs),
            ExprKind::Unary { op, operand } | ExprKind::PostUnary { op, operand } => {
                self.unary_type(expr, *op, operand)
            }
            ExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                self.check_condition(cond)?;
                let then_ty = self.expr_type(then_expr)?;
                let else_ty = self.expr_type(else_expr)?;
                if then_ty.is_equal(&else_ty) {
                    return Ok(then_ty);
                }
                if let (Some(a), Some(b)) = (then_ty.base_type(), else_ty.base_type()) {
                    if let Some(common) = common_data_type(a, b) {
                        return Ok(TypeDenoter::Base(common));
                    }
                }
                Err(self.reports.error_break(
                    &format!(
                        "incompatible branches of conditional expression: '{}' and '{}'",
                        then_ty, else_ty
                    ),
                    Some(self.source),
                    expr.area,
                ))
            }
            ExprKind::Call { callee, args } => self.call_type(callee.clone(), args),
            ExprKind::Constructor { ty, args } => self.constructor_type(expr, *ty, args),
            ExprKind::Member { object, member } => {
                let object_ty = self.expr_type(object)?;
                self.member_type(&object_ty, member.clone())
            }
            ExprKind::Index { object, index } => {
                let index_ty = self.expr_type(index)?;
                if !index_ty.is_castable_to(&TypeDenoter::Base(DataType::Int)) {
                    self.reports.error(
                        &format!("array index of type '{}' is not an integer", index_ty),
                        Some(self.source),
                        index.area,
                    );
                }
                let object_ty = self.expr_type(object)?;
                self.index_type(&object_ty, expr.area)
            }
            ExprKind::Cast { ty, expr: inner } => {
                let target = self.resolve_type_name(ty)?;
                let source_ty = self.expr_type(inner)?;
                let both_numeric = target
                    .base_type()
                    .and_then(scalar_rank_of)
                    .is_some()
                    && source_ty.base_type().and_then(scalar_rank_of).is_some();
                if !both_numeric && !source_ty.is_castable_to(&target) {
                    return Err(self.reports.error_break(
                        &format!("cannot cast from '{}' to '{}'", source_ty, target),
                        Some(self.source),
                        expr.area,
                    ));
                }
                Ok(target)
            }
            ExprKind::Paren(inner) => self.expr_type(inner),
        }
    }

    fn fetch_var(&mut self, name: &str, area: SourceArea) -> Result<Rc<VarSymbol>, Report> {
        let Some(overload) = self.symbols.fetch(name).cloned() else {
            return Err(self.reports.error_break(
                &format!("undefined identifier '{}'", name),
                Some(self.source),
                area,
            ));
        };
        let fetched = overload.borrow().fetch_var();
        fetched.map_err(|err| {
            self.reports
                .error_break(&err.to_string(), Some(self.source), area)
        })
    }

    fn assign_type(&mut self, lhs: &Expr, op: AssignOp, rhs: &Expr) -> Result<TypeDenoter, Report> {
        let lhs_ty = self.expr_type(lhs)?;
        let rhs_ty = self.expr_type(rhs)?;

        if !is_lvalue(lhs) {
            self.reports.error(
                "left-hand side of assignment is not assignable",
                Some(self.source),
                lhs.area,
            );
        } else if let Some(var) = self.root_var(lhs) {
            if var.is_const {
                self.reports.error(
                    &format!("cannot assign to constant '{}'", var.ident),
                    Some(self.source),
                    lhs.area,
                );
            }
        }

        if op.is_bitwise_op() {
            self.require_integer_base(&lhs_ty, lhs.area);
            self.require_integer_base(&rhs_ty, rhs.area);
        }

        if !rhs_ty.is_castable_to(&lhs_ty) {
            self.reports.error(
                &format!("cannot assign '{}' to '{}'", rhs_ty, lhs_ty),
                Some(self.source),
                rhs.area,
            );
        }
        Ok(lhs_ty)
    }

    fn binary_type(
        &mut self,
        expr: &Expr,
        lhs: &Expr,
        op: BinaryOp,
        rhs: &Expr,
    ) -> Result<TypeDenoter, Report> {
        let lhs_ty = self.expr_type(lhs)?;
        let rhs_ty = self.expr_type(rhs)?;

        if op.is_logical() {
            for (ty, operand) in [(&lhs_ty, lhs), (&rhs_ty, rhs)] {
                if !ty.is_castable_to(&TypeDenoter::Base(DataType::Bool)) {
                    self.reports.error(
                        &format!("operand of '{}' has non-boolean type '{}'", op, ty),
                        Some(self.source),
                        operand.area,
                    );
                }
            }
            return Ok(TypeDenoter::Base(DataType::Bool));
        }

        let (Some(a), Some(b)) = (lhs_ty.base_type(), rhs_ty.base_type()) else {
            return Err(self.reports.error_break(
                &format!(
                    "invalid operands '{}' and '{}' to binary '{}'",
                    lhs_ty, rhs_ty, op
                ),
                Some(self.source),
                expr.area,
            ));
        };

        let Some(common) = common_data_type(a, b) else {
            return Err(self.reports.error_break(
                &format!(
                    "incompatible operands '{}' and '{}' to binary '{}'",
                    lhs_ty, rhs_ty, op
                ),
                Some(self.source),
                expr.area,
            ));
        };

        if op.is_bitwise_op() {
            self.require_integer_base(&lhs_ty, lhs.area);
            self.require_integer_base(&rhs_ty, rhs.area);
        }

        if op.is_comparison() {
            // component-wise comparison yields a boolean of the same shape
            let dims = common.matrix_dim();
            let result = crate::ast::matrix_data_type(DataType::Bool, dims.0, dims.1);
            return Ok(TypeDenoter::Base(result));
        }

        Ok(TypeDenoter::Base(common))
    }

    fn unary_type(&mut self, expr: &Expr, op: UnaryOp, operand: &Expr) -> Result<TypeDenoter, Report> {
        let ty = self.expr_type(operand)?;
        let Some(base) = ty.base_type() else {
            return Err(self.reports.error_break(
                &format!("invalid operand '{}' to unary '{}'", ty, op),
                Some(self.source),
                expr.area,
            ));
        };

        match op {
            UnaryOp::LogicalNot => {
                let dims = base.matrix_dim();
                Ok(TypeDenoter::Base(crate::ast::matrix_data_type(
                    DataType::Bool,
                    dims.0,
                    dims.1,
                )))
            }
            UnaryOp::Not => {
                self.require_integer_base(&ty, operand.area);
                Ok(ty)
            }
            UnaryOp::Inc | UnaryOp::Dec => {
                if !is_lvalue(operand) {
                    self.reports.error(
                        &format!("operand of '{}' is not assignable", op),
                        Some(self.source),
                        operand.area,
                    );
                }
                Ok(ty)
            }
            UnaryOp::Nop | UnaryOp::Negate | UnaryOp::Undefined => Ok(ty),
        }
    }

    fn call_type(&mut self, callee: crate::ast::Ident, args: &[Expr]) -> Result<TypeDenoter, Report> {
        let mut arg_types = Vec::new();
        for arg in args {
            arg_types.push(self.expr_type(arg)?);
        }

        // user-declared functions take precedence over intrinsics
        if let Some(overload) = self.symbols.fetch(&callee.name).cloned() {
            let resolved = overload.borrow().fetch_function_decl(&arg_types);
            return match resolved {
                Ok(func) => Ok(func.ret.clone()),
                Err(err) => Err(self.reports.error_break(
                    &err.to_string(),
                    Some(self.source),
                    callee.area,
                )),
            };
        }

        if let Some(intrinsic) = Intrinsic::lookup(&callee.name, args.len()) {
            return Ok(self.intrinsic_return_type(intrinsic, &arg_types));
        }

        Err(self.reports.error_break(
            &format!("undefined function '{}'", callee.name),
            Some(self.source),
            callee.area,
        ))
    }

    /// Result type of an intrinsic call, derived from the argument types
    fn intrinsic_return_type(&mut self, intrinsic: Intrinsic, args: &[TypeDenoter]) -> TypeDenoter {
        use Intrinsic::*;

        let first = args.first().cloned().unwrap_or(TypeDenoter::Void);
        let first_base = first.base_type().unwrap_or(DataType::Undefined);

        match intrinsic {
            // scalar results
            Length | Distance | Determinant => TypeDenoter::Base(first_base.base_data_type()),
            Dot => TypeDenoter::Base(first_base.base_data_type()),
            // boolean results
            All | Any | CheckAccessFullyMapped | IsFinite | IsInf | IsNaN => {
                TypeDenoter::Base(DataType::Bool)
            }
            // fixed results
            Cross => TypeDenoter::Base(DataType::Float3),
            D3DCOLORtoUBYTE4 => TypeDenoter::Base(DataType::Int4),
            F32toF16 | CountBits | FirstBitHigh | FirstBitLow | ReverseBits => {
                TypeDenoter::Base(DataType::UInt)
            }
            F16toF32 => TypeDenoter::Base(DataType::Float),
            GetRenderTargetSampleCount => TypeDenoter::Base(DataType::UInt),
            GetRenderTargetSamplePosition => TypeDenoter::Base(DataType::Float2),
            Lit => TypeDenoter::Base(DataType::Float4),
            Noise => TypeDenoter::Base(DataType::Float),
            AsDouble => TypeDenoter::Base(DataType::Double),
            // reinterpretation keeps the shape
            AsFloat => self.reinterpret(first_base, DataType::Float),
            AsInt => self.reinterpret(first_base, DataType::Int),
            AsUInt => self.reinterpret(first_base, DataType::UInt),
            AsUInt_2 => TypeDenoter::Void,
            // texture sampling
            _ if intrinsic.is_texture_fetch() => TypeDenoter::Base(DataType::Float4),
            // matrix products
            Mul => self.mul_return_type(args),
            Transpose => {
                let (rows, cols) = first_base.matrix_dim();
                TypeDenoter::Base(crate::ast::matrix_data_type(
                    first_base.base_data_type(),
                    cols,
                    rows,
                ))
            }
            // no result
            Abort | Clip | ErrorF | PrintF | SinCos | AllMemoryBarrier
            | AllMemoryBarrierWithGroupSync | DeviceMemoryBarrier
            | DeviceMemoryBarrierWithGroupSync | GroupMemoryBarrier
            | GroupMemoryBarrierWithGroupSync | InterlockedAdd | InterlockedAnd
            | InterlockedCompareExchange | InterlockedCompareStore | InterlockedExchange
            | InterlockedMax | InterlockedMin | InterlockedOr | InterlockedXor
            | Process2DQuadTessFactorsAvg | Process2DQuadTessFactorsMax
            | Process2DQuadTessFactorsMin | ProcessIsolineTessFactors
            | ProcessQuadTessFactorsAvg | ProcessQuadTessFactorsMax | ProcessQuadTessFactorsMin
            | ProcessTriTessFactorsAvg | ProcessTriTessFactorsMax | ProcessTriTessFactorsMin => {
                TypeDenoter::Void
            }
            // binary component-wise intrinsics follow the common shape
            ATan2 | FMod | Max | Min | Pow | Step | LdExp | Reflect => {
                let second = args
                    .get(1)
                    .and_then(|t| t.base_type())
                    .unwrap_or(first_base);
                match common_data_type(first_base, second) {
                    Some(common) => TypeDenoter::Base(common),
                    None => first,
                }
            }
            // everything else is component-wise over its first argument
            _ => first,
        }
    }

    /// Bit reinterpretation: same shape, new base scalar
    fn reinterpret(&self, from: DataType, to: DataType) -> TypeDenoter {
        let (rows, cols) = from.matrix_dim();
        let result = crate::ast::matrix_data_type(to, rows, cols);
        if result == DataType::Undefined {
            TypeDenoter::Base(to)
        } else {
            TypeDenoter::Base(result)
        }
    }

    /// `mul` combines scalars, vectors, and matrices
    fn mul_return_type(&self, args: &[TypeDenoter]) -> TypeDenoter {
        let (Some(a), Some(b)) = (
            args.first().and_then(|t| t.base_type()),
            args.get(1).and_then(|t| t.base_type()),
        ) else {
            return args.first().cloned().unwrap_or(TypeDenoter::Void);
        };

        let base = common_scalar(a.base_data_type(), b.base_data_type())
            .unwrap_or(DataType::Float);
        let result = if a.is_matrix() && b.is_matrix() {
            let (rows, _) = a.matrix_dim();
            let (_, cols) = b.matrix_dim();
            crate::ast::matrix_data_type(base, rows, cols)
        } else if a.is_matrix() && b.is_vector() {
            vector_data_type(base, a.matrix_dim().0)
        } else if a.is_vector() && b.is_matrix() {
            vector_data_type(base, b.matrix_dim().1)
        } else {
            common_data_type(a, b).unwrap_or(DataType::Undefined)
        };

        if result == DataType::Undefined {
            TypeDenoter::Base(base)
        } else {
            TypeDenoter::Base(result)
        }
    }

    fn constructor_type(
        &mut self,
        expr: &Expr,
        ty: DataType,
        args: &[Expr],
    ) -> Result<TypeDenoter, Report> {
        let mut components = 0;
        for arg in args {
            let arg_ty = self.expr_type(arg)?;
            let Some(base) = arg_ty.base_type() else {
                return Err(self.reports.error_break(
                    &format!("invalid argument of type '{}' in '{}' constructor", arg_ty, ty),
                    Some(self.source),
                    arg.area,
                ));
            };
            let (rows, cols) = base.matrix_dim();
            components += rows * cols;
        }

        let (rows, cols) = ty.matrix_dim();
        let expected = rows * cols;

        // a single scalar broadcasts; otherwise components must fill up
        let is_broadcast = components == 1;
        if !is_broadcast && components != expected {
            self.reports.error(
                &format!(
                    "'{}' constructor requires {} components, found {}",
                    ty, expected, components
                ),
                Some(self.source),
                expr.area,
            );
        }
        Ok(TypeDenoter::Base(ty))
    }

    fn member_type(
        &mut self,
        object_ty: &TypeDenoter,
        member: crate::ast::Ident,
    ) -> Result<TypeDenoter, Report> {
        match object_ty.peel_alias() {
            TypeDenoter::Base(data_type) => {
                match vector_subscript_data_type(*data_type, &member.name) {
                    Ok(result) => Ok(TypeDenoter::Base(result)),
                    Err(err) => Err(self.reports.error_break(
                        &err.to_string(),
                        Some(self.source),
                        member.area,
                    )),
                }
            }
            TypeDenoter::Struct { ident, index } => {
                let field = self
                    .module
                    .struct_info(*index)
                    .and_then(|info| info.field_type(&member.name))
                    .cloned();
                match field {
                    Some(ty) => Ok(ty),
                    None => Err(self.reports.error_break(
                        &format!("struct '{}' has no field '{}'", ident, member.name),
                        Some(self.source),
                        member.area,
                    )),
                }
            }
            other => Err(self.reports.error_break(
                &format!("type '{}' has no members", other),
                Some(self.source),
                member.area,
            )),
        }
    }

    fn index_type(&mut self, object_ty: &TypeDenoter, area: SourceArea) -> Result<TypeDenoter, Report> {
        match object_ty.peel_alias() {
            TypeDenoter::Array { inner, dims } => {
                if dims.len() == 1 {
                    Ok((**inner).clone())
                } else {
                    Ok(TypeDenoter::Array {
                        inner: inner.clone(),
                        dims: dims[1..].to_vec(),
                    })
                }
            }
            TypeDenoter::Base(data_type) if data_type.is_vector() => {
                Ok(TypeDenoter::Base(data_type.base_data_type()))
            }
            TypeDenoter::Base(data_type) if data_type.is_matrix() => {
                // indexing a matrix yields a row vector
                let (_, cols) = data_type.matrix_dim();
                Ok(TypeDenoter::Base(vector_data_type(
                    data_type.base_data_type(),
                    cols,
                )))
            }
            other => Err(self.reports.error_break(
                &format!("type '{}' cannot be indexed", other),
                Some(self.source),
                area,
            )),
        }
    }

    /// Report when a bitwise operand is not integer-based
    fn require_integer_base(&mut self, ty: &TypeDenoter, area: SourceArea) {
        let is_integer = matches!(
            ty.base_type().map(|t| t.base_data_type()),
            Some(DataType::Int | DataType::UInt | DataType::Bool)
        );
        if !is_integer {
            self.reports.error(
                &format!("bitwise operand of type '{}' is not an integer", ty),
                Some(self.source),
                area,
            );
        }
    }

    /// The variable a chain of member/index accesses roots in, if any
    fn root_var(&mut self, expr: &Expr) -> Option<Rc<VarSymbol>> {
        match &expr.kind {
            ExprKind::Ident(ident) => {
                let overload = self.symbols.fetch(&ident.name)?;
                overload.borrow().fetch_var().ok()
            }
            ExprKind::Member { object, .. } | ExprKind::Index { object, .. } => {
                self.root_var(object)
            }
            ExprKind::Paren(inner) => self.root_var(inner),
            _ => None,
        }
    }
}

fn scalar_rank_of(ty: DataType) -> Option<u32> {
    scalar_rank(ty.base_data_type())
}

/// True if the expression can stand on the left of an assignment
fn is_lvalue(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Ident(_) => true,
        ExprKind::Member { object, .. } | ExprKind::Index { object, .. } => is_lvalue(object),
        ExprKind::Paren(inner) => is_lvalue(inner),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{MemoryLog, Severity};
    use crate::parser::Parser;

    fn analyze_src(src: &str) -> (CompileResult<Module>, MemoryLog) {
        let program = Parser::new(src).parse().expect("parsing should succeed");
        let source = SourceCode::new("test.hlsl", src);
        let mut log = MemoryLog::new();
        let result = analyze(&program, &source, &mut log);
        (result, log)
    }

    fn assert_ok(src: &str) {
        let (result, log) = analyze_src(src);
        assert!(
            result.is_ok(),
            "expected success, got reports: {:?}",
            log.reports()
        );
    }

    fn first_error(src: &str) -> String {
        let (result, log) = analyze_src(src);
        assert!(result.is_err(), "expected analysis to fail");
        log.reports()
            .iter()
            .find(|r| r.severity() == Severity::Error)
            .expect("an error report")
            .message()
            .to_string()
    }

    #[test]
    fn test_valid_shader_analyzes() {
        assert_ok(
            r#"
            struct Light {
                float3 direction;
                float intensity;
            };
            cbuffer PerFrame : register(b0) {
                float4x4 viewProj;
                float3 cameraPos;
            };
            float lambert(float3 normal, float3 lightDir) {
                return max(dot(normal, lightDir), 0.0);
            }
            float4 main(float3 normal : NORMAL) : SV_Target {
                float3 lightDir = normalize(cameraPos);
                float d = lambert(normalize(normal), lightDir);
                return float4(d, d, d, 1.0);
            }
            "#,
        );
    }

    #[test]
    fn test_undefined_identifier() {
        let msg = first_error("void f() { float x = missing; }");
        assert!(msg.contains("undefined identifier 'missing'"), "{msg}");
    }

    #[test]
    fn test_duplicate_declaration() {
        let msg = first_error("void f() { float x; int x; }");
        assert!(msg.contains("already declared in this scope"), "{msg}");
    }

    #[test]
    fn test_shadowing_across_blocks_is_allowed() {
        assert_ok("void f() { float x = 1.0; { int x = 2; x = 3; } x = 4.0; }");
    }

    #[test]
    fn test_overload_resolution_prefers_exact() {
        assert_ok(
            r#"
            float pick(int a) { return 1.0; }
            float pick(float a) { return 2.0; }
            void f() { float r = pick(3); }
            "#,
        );
    }

    #[test]
    fn test_ambiguous_call() {
        let msg = first_error(
            r#"
            float pick(int a, float b) { return 1.0; }
            float pick(float a, int b) { return 2.0; }
            void f() { float r = pick(1, 2); }
            "#,
        );
        assert!(msg.contains("ambiguous call"), "{msg}");
    }

    #[test]
    fn test_no_matching_function() {
        let msg = first_error(
            r#"
            float pick(float a) { return a; }
            void f() { float r = pick(1.0, 2.0); }
            "#,
        );
        assert!(msg.contains("no matching function"), "{msg}");
    }

    #[test]
    fn test_duplicate_function_signature() {
        let msg = first_error(
            r#"
            float pick(float a) { return a; }
            float pick(float b) { return b; }
            void f() {}
            "#,
        );
        assert!(msg.contains("already declared"), "{msg}");
    }

    #[test]
    fn test_invalid_swizzle() {
        let msg = first_error("void f() { float2 v; float z = v.z; }");
        assert!(msg.contains("exceeds dimension"), "{msg}");

        let msg = first_error("void f() { float4 v; float2 m = v.xr; }");
        assert!(msg.contains("mixes component families"), "{msg}");
    }

    #[test]
    fn test_struct_field_access() {
        assert_ok(
            r#"
            struct Light { float3 direction; };
            void f(Light light) { float3 d = light.direction; }
            "#,
        );
        let msg = first_error(
            r#"
            struct Light { float3 direction; };
            void f(Light light) { float3 d = light.color; }
            "#,
        );
        assert!(msg.contains("no field 'color'"), "{msg}");
    }

    #[test]
    fn test_break_outside_loop() {
        let msg = first_error("void f() { break; }");
        assert!(msg.contains("outside of a loop"), "{msg}");
    }

    #[test]
    fn test_break_inside_loop_is_valid() {
        assert_ok("void f() { for (int i = 0; i < 4; ++i) { if (i == 2) break; } }");
    }

    #[test]
    fn test_return_type_mismatch() {
        let msg = first_error(
            r#"
            struct S { float x; };
            float f(S s) { return s; }
            "#,
        );
        assert!(msg.contains("cannot convert return value"), "{msg}");
    }

    #[test]
    fn test_void_function_returning_value() {
        let msg = first_error("void f() { return 1; }");
        assert!(msg.contains("void function cannot return a value"), "{msg}");
    }

    #[test]
    fn test_assignment_to_constant() {
        let msg = first_error(
            r#"
            static const float threshold = 0.5;
            void f() { threshold = 1.0; }
            "#,
        );
        assert!(msg.contains("cannot assign to constant"), "{msg}");
    }

    #[test]
    fn test_non_boolean_condition() {
        let msg = first_error(
            r#"
            struct S { float x; };
            void f(S s) { if (s) { } }
            "#,
        );
        assert!(msg.contains("not convertible to bool"), "{msg}");
    }

    #[test]
    fn test_intrinsic_calls_resolve() {
        assert_ok(
            r#"
            Texture2D albedo : register(t0);
            SamplerState samp : register(s0);
            float4 main(float2 uv : TEXCOORD0) : SV_Target {
                float4 c = tex2D(samp, uv);
                float3 n = normalize(c.rgb);
                return lerp(c, float4(n, 1.0), 0.5);
            }
            "#,
        );
    }

    #[test]
    fn test_undefined_function() {
        let msg = first_error("void f() { float x = not_declared(1.0); }");
        assert!(msg.contains("undefined function"), "{msg}");
    }

    #[test]
    fn test_constructor_component_count() {
        let msg = first_error("void f() { float4 v = float4(1.0, 2.0); }");
        assert!(msg.contains("requires 4 components"), "{msg}");
        assert_ok("void f() { float4 v = float4(0.0); }");
        assert_ok("void f() { float2 a; float4 v = float4(a, 1.0, 2.0); }");
    }

    #[test]
    fn test_typedef_is_transparent() {
        assert_ok(
            r#"
            typedef float4 color4;
            color4 blend(color4 a, color4 b) { return (a + b) * 0.5; }
            void f() { float4 x = blend(float4(0.0), float4(1.0)); }
            "#,
        );
    }

    #[test]
    fn test_matrix_vector_mul() {
        assert_ok(
            r#"
            cbuffer PerFrame { float4x4 viewProj; };
            float4 transform(float4 position) {
                return mul(viewProj, position);
            }
            "#,
        );
    }
}
