//! Recursive descent parser for HLSL
//!
//! Consumes the token stream and builds the AST. Operator tokens are
//! mapped into the shared operator enums; type names are resolved into
//! the data type grid where possible and kept as identifiers otherwise.

use crate::ast::{
    from_type_name, AliasDecl, AssignOp, BinaryOp, Block, ConstBufferDecl, CtrlTransfer, Decl,
    DeclKind, Expr, ExprKind, FunctionDecl, Ident, Param, ParamQualifier, Program, SamplerDecl,
    Stmt, StmtKind, StructDecl, TextureDecl, TextureDim, TypeName, TypeNameKind, UnaryOp, VarDecl,
};
use crate::errors::{CompileError, CompileResult, SourceArea};
use crate::lexer::{Keyword, Lexer, Token, TokenKind};

/// The parser for HLSL source code
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'src> Parser<'src> {
    /// Create a new parser for the given source code
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            pos: 0,
        }
    }

    /// Tokenize and parse the source into a program
    pub fn parse(mut self) -> CompileResult<Program> {
        self.tokens = Lexer::new(self.source).tokenize()?;

        let mut decls = Vec::new();
        while !self.at_end() {
            decls.push(self.parse_decl()?);
        }
        Ok(Program { decls })
    }

    /* ----- Token cursor ----- */

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn peek_next_kind(&self) -> &TokenKind {
        let index = (self.pos + 1).min(self.tokens.len() - 1);
        &self.tokens[index].kind
    }

    fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.at_end() {
            self.pos += 1;
        }
        token
    }

    fn check(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check_keyword(&mut self, kw: Keyword) -> bool {
        self.check(&TokenKind::Keyword(kw))
    }

    fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        if self.peek_kind() == &kind {
            Ok(self.advance())
        } else {
            Err(self.error_here(format!(
                "expected {}, found {}",
                kind.describe(),
                self.peek_kind().describe()
            )))
        }
    }

    fn error_here(&self, message: impl Into<String>) -> CompileError {
        CompileError::parser(message, self.peek().area)
    }

    fn current_area(&self) -> SourceArea {
        self.peek().area
    }

    /// Consume an identifier token
    fn expect_ident(&mut self) -> CompileResult<Ident> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                let token = self.advance();
                Ok(Ident::new(name, token.area))
            }
            other => Err(self.error_here(format!("expected identifier, found {}", other.describe()))),
        }
    }

    /* ----- Declarations ----- */

    fn parse_decl(&mut self) -> CompileResult<Decl> {
        let start = self.current_area();

        if self.check_keyword(Keyword::Struct) {
            let decl = self.parse_struct_decl()?;
            return Ok(Decl {
                area: start.merge(self.prev_area()),
                kind: DeclKind::Struct(decl),
            });
        }
        if self.check_keyword(Keyword::Typedef) {
            let decl = self.parse_alias_decl()?;
            return Ok(Decl {
                area: start.merge(self.prev_area()),
                kind: DeclKind::Alias(decl),
            });
        }
        if self.check_keyword(Keyword::CBuffer) {
            let decl = self.parse_cbuffer_decl()?;
            return Ok(Decl {
                area: start.merge(self.prev_area()),
                kind: DeclKind::ConstBuffer(decl),
            });
        }
        if let TokenKind::Keyword(kw) = self.peek_kind() {
            if let Some(dim) = texture_dim(*kw) {
                self.advance();
                let decl = self.parse_texture_decl(dim)?;
                return Ok(Decl {
                    area: start.merge(self.prev_area()),
                    kind: DeclKind::Texture(decl),
                });
            }
        }
        if self.check_keyword(Keyword::SamplerState) {
            let decl = self.parse_sampler_decl()?;
            return Ok(Decl {
                area: start.merge(self.prev_area()),
                kind: DeclKind::Sampler(decl),
            });
        }

        // global variable or function definition
        let is_const = self.parse_decl_qualifiers();
        let ty = self.parse_type_name()?;
        let name = self.expect_ident()?;

        if matches!(self.peek_kind(), TokenKind::LParen) {
            let func = self.parse_function_decl(ty, name)?;
            Ok(Decl {
                area: start.merge(self.prev_area()),
                kind: DeclKind::Function(func),
            })
        } else {
            let var = self.parse_var_decl_rest(ty, name, is_const)?;
            Ok(Decl {
                area: start.merge(self.prev_area()),
                kind: DeclKind::Variable(var),
            })
        }
    }

    fn prev_area(&self) -> SourceArea {
        if self.pos == 0 {
            return self.current_area();
        }
        self.tokens[self.pos - 1].area
    }

    /// Consume `const` / `static` / `uniform` qualifiers; true if const
    fn parse_decl_qualifiers(&mut self) -> bool {
        let mut is_const = false;
        loop {
            if self.check_keyword(Keyword::Const) || self.check_keyword(Keyword::Static) {
                is_const = true;
            } else if self.check_keyword(Keyword::Uniform) {
                // uniforms keep their storage meaning, nothing to record
            } else {
                return is_const;
            }
        }
    }

    fn parse_struct_decl(&mut self) -> CompileResult<StructDecl> {
        let name = self.expect_ident()?;
        self.expect(TokenKind::LBrace)?;

        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.at_end() {
                return Err(self.error_here("unterminated struct declaration"));
            }
            fields.push(self.parse_field_decl()?);
        }
        self.expect(TokenKind::Semicolon)?;

        Ok(StructDecl { name, fields })
    }

    /// A struct or cbuffer field: `type name [dims] [: semantic] ;`
    fn parse_field_decl(&mut self) -> CompileResult<VarDecl> {
        let start = self.current_area();
        let ty = self.parse_type_name()?;
        let name = self.expect_ident()?;
        let array_dims = self.parse_array_dims()?;
        let semantic = self.parse_semantic()?;
        self.expect(TokenKind::Semicolon)?;

        Ok(VarDecl {
            name,
            ty,
            array_dims,
            semantic,
            initializer: None,
            is_const: false,
            area: start.merge(self.prev_area()),
        })
    }

    fn parse_alias_decl(&mut self) -> CompileResult<AliasDecl> {
        let ty = self.parse_type_name()?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(AliasDecl { name, ty })
    }

    fn parse_cbuffer_decl(&mut self) -> CompileResult<ConstBufferDecl> {
        let name = self.expect_ident()?;
        let register = self.parse_register()?;
        self.expect(TokenKind::LBrace)?;

        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.at_end() {
                return Err(self.error_here("unterminated cbuffer declaration"));
            }
            fields.push(self.parse_field_decl()?);
        }
        // the trailing semicolon is optional for cbuffers
        self.check(&TokenKind::Semicolon);

        Ok(ConstBufferDecl {
            name,
            register,
            fields,
        })
    }

    fn parse_texture_decl(&mut self, dim: TextureDim) -> CompileResult<TextureDecl> {
        let name = self.expect_ident()?;
        let register = self.parse_register()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(TextureDecl {
            name,
            dim,
            register,
        })
    }

    fn parse_sampler_decl(&mut self) -> CompileResult<SamplerDecl> {
        let name = self.expect_ident()?;
        let register = self.parse_register()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(SamplerDecl { name, register })
    }

    /// Parse an optional `: register(x0)` binding
    fn parse_register(&mut self) -> CompileResult<Option<String>> {
        if !matches!(self.peek_kind(), TokenKind::Colon) {
            return Ok(None);
        }
        self.advance();
        self.expect(TokenKind::Keyword(Keyword::Register))?;
        self.expect(TokenKind::LParen)?;
        let slot = self.expect_ident()?;
        self.expect(TokenKind::RParen)?;
        Ok(Some(slot.name))
    }

    /// Parse an optional `: SEMANTIC` suffix
    fn parse_semantic(&mut self) -> CompileResult<Option<Ident>> {
        if !matches!(self.peek_kind(), TokenKind::Colon) {
            return Ok(None);
        }
        self.advance();
        Ok(Some(self.expect_ident()?))
    }

    /// Parse trailing `[N]` array dimensions
    fn parse_array_dims(&mut self) -> CompileResult<Vec<u32>> {
        let mut dims = Vec::new();
        while self.check(&TokenKind::LBracket) {
            match self.peek_kind().clone() {
                TokenKind::Integer(value) if value > 0 => {
                    self.advance();
                    dims.push(value as u32);
                }
                other => {
                    return Err(self.error_here(format!(
                        "expected array dimension, found {}",
                        other.describe()
                    )))
                }
            }
            self.expect(TokenKind::RBracket)?;
        }
        Ok(dims)
    }

    fn parse_type_name(&mut self) -> CompileResult<TypeName> {
        let area = self.current_area();
        if self.check_keyword(Keyword::Void) {
            return Ok(TypeName {
                kind: TypeNameKind::Void,
                area,
            });
        }
        let name = self.expect_ident()?;
        let kind = match from_type_name(&name.name) {
            Some(data_type) => TypeNameKind::Base(data_type),
            None => TypeNameKind::Ident(name),
        };
        Ok(TypeName { kind, area })
    }

    fn parse_function_decl(&mut self, return_type: TypeName, name: Ident) -> CompileResult<FunctionDecl> {
        self.expect(TokenKind::LParen)?;

        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.parse_param()?);
                if !self.check(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen)?;
        }

        let return_semantic = self.parse_semantic()?;
        let body = self.parse_block()?;

        Ok(FunctionDecl {
            name,
            return_type,
            return_semantic,
            params,
            body,
        })
    }

    fn parse_param(&mut self) -> CompileResult<Param> {
        let start = self.current_area();

        let qualifier = if self.check_keyword(Keyword::In) {
            ParamQualifier::In
        } else if self.check_keyword(Keyword::Out) {
            ParamQualifier::Out
        } else if self.check_keyword(Keyword::InOut) {
            ParamQualifier::InOut
        } else {
            ParamQualifier::In
        };

        let ty = self.parse_type_name()?;
        let name = self.expect_ident()?;
        let array_dims = self.parse_array_dims()?;
        let semantic = self.parse_semantic()?;

        Ok(Param {
            name,
            ty,
            qualifier,
            array_dims,
            semantic,
            area: start.merge(self.prev_area()),
        })
    }

    /// Parse `type name [dims] [: semantic] [= init] ;` after the name
    fn parse_var_decl_rest(
        &mut self,
        ty: TypeName,
        name: Ident,
        is_const: bool,
    ) -> CompileResult<VarDecl> {
        let start = ty.area;
        let array_dims = self.parse_array_dims()?;
        let semantic = self.parse_semantic()?;
        let initializer = if self.check(&TokenKind::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon)?;

        Ok(VarDecl {
            name,
            ty,
            array_dims,
            semantic,
            initializer,
            is_const,
            area: start.merge(self.prev_area()),
        })
    }

    /* ----- Statements ----- */

    fn parse_block(&mut self) -> CompileResult<Block> {
        let start = self.current_area();
        self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.at_end() {
                return Err(self.error_here("unterminated block"));
            }
            stmts.push(self.parse_stmt()?);
        }
        Ok(Block {
            stmts,
            area: start.merge(self.prev_area()),
        })
    }

    fn parse_stmt(&mut self) -> CompileResult<Stmt> {
        let start = self.current_area();

        if matches!(self.peek_kind(), TokenKind::LBrace) {
            let block = self.parse_block()?;
            return Ok(Stmt {
                area: block.area,
                kind: StmtKind::Block(block),
            });
        }

        if self.check_keyword(Keyword::If) {
            return self.parse_if_stmt(start);
        }
        if self.check_keyword(Keyword::For) {
            return self.parse_for_stmt(start);
        }
        if self.check_keyword(Keyword::While) {
            return self.parse_while_stmt(start);
        }
        if self.check_keyword(Keyword::Do) {
            return self.parse_do_while_stmt(start);
        }
        if self.check_keyword(Keyword::Return) {
            let value = if matches!(self.peek_kind(), TokenKind::Semicolon) {
                None
            } else {
                Some(self.parse_expr()?)
            };
            self.expect(TokenKind::Semicolon)?;
            return Ok(Stmt {
                area: start.merge(self.prev_area()),
                kind: StmtKind::Return(value),
            });
        }
        if self.check_keyword(Keyword::Break) {
            self.expect(TokenKind::Semicolon)?;
            return Ok(Stmt {
                area: start.merge(self.prev_area()),
                kind: StmtKind::CtrlTransfer(CtrlTransfer::Break),
            });
        }
        if self.check_keyword(Keyword::Continue) {
            self.expect(TokenKind::Semicolon)?;
            return Ok(Stmt {
                area: start.merge(self.prev_area()),
                kind: StmtKind::CtrlTransfer(CtrlTransfer::Continue),
            });
        }
        if self.check_keyword(Keyword::Discard) {
            self.expect(TokenKind::Semicolon)?;
            return Ok(Stmt {
                area: start.merge(self.prev_area()),
                kind: StmtKind::CtrlTransfer(CtrlTransfer::Discard),
            });
        }

        if self.starts_var_decl() {
            let is_const = self.parse_decl_qualifiers();
            let ty = self.parse_type_name()?;
            let name = self.expect_ident()?;
            let var = self.parse_var_decl_rest(ty, name, is_const)?;
            return Ok(Stmt {
                area: start.merge(self.prev_area()),
                kind: StmtKind::VarDecl(var),
            });
        }

        let expr = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt {
            area: start.merge(self.prev_area()),
            kind: StmtKind::Expr(expr),
        })
    }

    /// A statement starts a variable declaration if it begins with a
    /// qualifier keyword, or with two consecutive identifiers
    /// (`float3 normal`, `Light light`)
    fn starts_var_decl(&self) -> bool {
        match self.peek_kind() {
            TokenKind::Keyword(Keyword::Const | Keyword::Static | Keyword::Uniform) => true,
            TokenKind::Ident(_) => matches!(self.peek_next_kind(), TokenKind::Ident(_)),
            _ => false,
        }
    }

    fn parse_if_stmt(&mut self, start: SourceArea) -> CompileResult<Stmt> {
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let then_branch = Box::new(self.parse_stmt()?);
        let else_branch = if self.check_keyword(Keyword::Else) {
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };
        Ok(Stmt {
            area: start.merge(self.prev_area()),
            kind: StmtKind::If {
                cond,
                then_branch,
                else_branch,
            },
        })
    }

    fn parse_for_stmt(&mut self, start: SourceArea) -> CompileResult<Stmt> {
        self.expect(TokenKind::LParen)?;

        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else if self.starts_var_decl() {
            let is_const = self.parse_decl_qualifiers();
            let ty = self.parse_type_name()?;
            let name = self.expect_ident()?;
            let decl_start = ty.area;
            let var = self.parse_var_decl_rest(ty, name, is_const)?;
            Some(Box::new(Stmt {
                area: decl_start.merge(self.prev_area()),
                kind: StmtKind::VarDecl(var),
            }))
        } else {
            let expr = self.parse_expr()?;
            let area = expr.area;
            self.expect(TokenKind::Semicolon)?;
            Some(Box::new(Stmt {
                area,
                kind: StmtKind::Expr(expr),
            }))
        };

        let cond = if matches!(self.peek_kind(), TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon)?;

        let step = if matches!(self.peek_kind(), TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::RParen)?;

        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt {
            area: start.merge(self.prev_area()),
            kind: StmtKind::For {
                init,
                cond,
                step,
                body,
            },
        })
    }

    fn parse_while_stmt(&mut self, start: SourceArea) -> CompileResult<Stmt> {
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt {
            area: start.merge(self.prev_area()),
            kind: StmtKind::While { cond, body },
        })
    }

    fn parse_do_while_stmt(&mut self, start: SourceArea) -> CompileResult<Stmt> {
        let body = Box::new(self.parse_stmt()?);
        self.expect(TokenKind::Keyword(Keyword::While))?;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt {
            area: start.merge(self.prev_area()),
            kind: StmtKind::DoWhile { body, cond },
        })
    }

    /* ----- Expressions ----- */

    pub(crate) fn parse_expr(&mut self) -> CompileResult<Expr> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> CompileResult<Expr> {
        let lhs = self.parse_ternary()?;

        let op = match self.peek_kind() {
            TokenKind::Eq => AssignOp::Set,
            TokenKind::PlusEq => AssignOp::Add,
            TokenKind::MinusEq => AssignOp::Sub,
            TokenKind::StarEq => AssignOp::Mul,
            TokenKind::SlashEq => AssignOp::Div,
            TokenKind::PercentEq => AssignOp::Mod,
            TokenKind::LtLtEq => AssignOp::LShift,
            TokenKind::GtGtEq => AssignOp::RShift,
            TokenKind::PipeEq => AssignOp::Or,
            TokenKind::AmpEq => AssignOp::And,
            TokenKind::CaretEq => AssignOp::Xor,
            _ => return Ok(lhs),
        };
        self.advance();

        let rhs = self.parse_assignment()?;
        Ok(Expr {
            area: lhs.area.merge(rhs.area),
            kind: ExprKind::Assign {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            },
        })
    }

    fn parse_ternary(&mut self) -> CompileResult<Expr> {
        let cond = self.parse_binary(0)?;
        if !self.check(&TokenKind::Question) {
            return Ok(cond);
        }
        let then_expr = self.parse_expr()?;
        self.expect(TokenKind::Colon)?;
        let else_expr = self.parse_assignment()?;
        Ok(Expr {
            area: cond.area.merge(else_expr.area),
            kind: ExprKind::Ternary {
                cond: Box::new(cond),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            },
        })
    }

    /// Binary operator of the given precedence level, or `None`
    fn binary_op_at(&self, level: usize) -> Option<BinaryOp> {
        let op = match (level, self.peek_kind()) {
            (0, TokenKind::PipePipe) => BinaryOp::LogicalOr,
            (1, TokenKind::AmpAmp) => BinaryOp::LogicalAnd,
            (2, TokenKind::Pipe) => BinaryOp::Or,
            (3, TokenKind::Caret) => BinaryOp::Xor,
            (4, TokenKind::Amp) => BinaryOp::And,
            (5, TokenKind::EqEq) => BinaryOp::Equal,
            (5, TokenKind::BangEq) => BinaryOp::NotEqual,
            (6, TokenKind::Lt) => BinaryOp::Less,
            (6, TokenKind::Gt) => BinaryOp::Greater,
            (6, TokenKind::LtEq) => BinaryOp::LessEqual,
            (6, TokenKind::GtEq) => BinaryOp::GreaterEqual,
            (7, TokenKind::LtLt) => BinaryOp::LShift,
            (7, TokenKind::GtGt) => BinaryOp::RShift,
            (8, TokenKind::Plus) => BinaryOp::Add,
            (8, TokenKind::Minus) => BinaryOp::Sub,
            (9, TokenKind::Star) => BinaryOp::Mul,
            (9, TokenKind::Slash) => BinaryOp::Div,
            (9, TokenKind::Percent) => BinaryOp::Mod,
            _ => return None,
        };
        Some(op)
    }

    const MAX_BINARY_LEVEL: usize = 9;

    fn parse_binary(&mut self, level: usize) -> CompileResult<Expr> {
        if level > Self::MAX_BINARY_LEVEL {
            return self.parse_unary();
        }

        let mut lhs = self.parse_binary(level + 1)?;
        while let Some(op) = self.binary_op_at(level) {
            self.advance();
            let rhs = self.parse_binary(level + 1)?;
            lhs = Expr {
                area: lhs.area.merge(rhs.area),
                kind: ExprKind::Binary {
                    lhs: Box::new(lhs),
                    op,
                    rhs: Box::new(rhs),
                },
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> CompileResult<Expr> {
        let start = self.current_area();

        let op = match self.peek_kind() {
            TokenKind::Bang => Some(UnaryOp::LogicalNot),
            TokenKind::Tilde => Some(UnaryOp::Not),
            TokenKind::Plus => Some(UnaryOp::Nop),
            TokenKind::Minus => Some(UnaryOp::Negate),
            TokenKind::PlusPlus => Some(UnaryOp::Inc),
            TokenKind::MinusMinus => Some(UnaryOp::Dec),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr {
                area: start.merge(operand.area),
                kind: ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
            });
        }

        // cast expression: `(type) unary`
        if matches!(self.peek_kind(), TokenKind::LParen) {
            if let TokenKind::Ident(name) = self.peek_next_kind() {
                if from_type_name(name).is_some()
                    && self.tokens.get(self.pos + 2).map(|t| &t.kind) == Some(&TokenKind::RParen)
                {
                    self.advance();
                    let ty = self.parse_type_name()?;
                    self.advance(); // closing paren
                    let expr = self.parse_unary()?;
                    return Ok(Expr {
                        area: start.merge(expr.area),
                        kind: ExprKind::Cast {
                            ty,
                            expr: Box::new(expr),
                        },
                    });
                }
            }
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> CompileResult<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let member = self.expect_ident()?;
                    expr = Expr {
                        area: expr.area.merge(member.area),
                        kind: ExprKind::Member {
                            object: Box::new(expr),
                            member,
                        },
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket)?;
                    expr = Expr {
                        area: expr.area.merge(self.prev_area()),
                        kind: ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                    };
                }
                TokenKind::PlusPlus => {
                    self.advance();
                    expr = Expr {
                        area: expr.area.merge(self.prev_area()),
                        kind: ExprKind::PostUnary {
                            op: UnaryOp::Inc,
                            operand: Box::new(expr),
                        },
                    };
                }
                TokenKind::MinusMinus => {
                    self.advance();
                    expr = Expr {
                        area: expr.area.merge(self.prev_area()),
                        kind: ExprKind::PostUnary {
                            op: UnaryOp::Dec,
                            operand: Box::new(expr),
                        },
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> CompileResult<Expr> {
        let area = self.current_area();

        match self.peek_kind().clone() {
            TokenKind::Integer(value) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::IntLiteral(value),
                    area,
                })
            }
            TokenKind::Float(value) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::FloatLiteral(value),
                    area,
                })
            }
            TokenKind::String(value) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::StringLiteral(value),
                    area,
                })
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::BoolLiteral(true),
                    area,
                })
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::BoolLiteral(false),
                    area,
                })
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr {
                    area: area.merge(self.prev_area()),
                    kind: ExprKind::Paren(Box::new(inner)),
                })
            }
            TokenKind::Ident(name) => {
                let ident_token = self.advance();
                let ident = Ident::new(name.clone(), ident_token.area);

                if matches!(self.peek_kind(), TokenKind::LParen) {
                    let args = self.parse_call_args()?;
                    let call_area = area.merge(self.prev_area());

                    // `float3(...)` is a constructor, `foo(...)` a call
                    if let Some(data_type) = from_type_name(&name) {
                        return Ok(Expr {
                            kind: ExprKind::Constructor {
                                ty: data_type,
                                args,
                            },
                            area: call_area,
                        });
                    }
                    return Ok(Expr {
                        kind: ExprKind::Call { callee: ident, args },
                        area: call_area,
                    });
                }

                Ok(Expr {
                    kind: ExprKind::Ident(ident),
                    area,
                })
            }
            other => Err(self.error_here(format!(
                "expected expression, found {}",
                other.describe()
            ))),
        }
    }

    fn parse_call_args(&mut self) -> CompileResult<Vec<Expr>> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if self.check(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if !self.check(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }
}

fn texture_dim(kw: Keyword) -> Option<TextureDim> {
    match kw {
        Keyword::Texture1D => Some(TextureDim::Tex1D),
        Keyword::Texture2D => Some(TextureDim::Tex2D),
        Keyword::Texture3D => Some(TextureDim::Tex3D),
        Keyword::TextureCube => Some(TextureDim::Cube),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::DataType;

    fn parse(source: &str) -> Program {
        Parser::new(source).parse().expect("parsing should succeed")
    }

    fn parse_err(source: &str) -> CompileError {
        Parser::new(source).parse().expect_err("parsing should fail")
    }

    #[test]
    fn test_parse_struct() {
        let program = parse(
            r#"
            struct VertexInput {
                float3 position : POSITION;
                float2 uv : TEXCOORD0;
            };
            "#,
        );
        assert_eq!(program.decls.len(), 1);
        let DeclKind::Struct(s) = &program.decls[0].kind else {
            panic!("expected struct");
        };
        assert_eq!(s.name.name, "VertexInput");
        assert_eq!(s.fields.len(), 2);
        assert_eq!(s.fields[0].semantic.as_ref().unwrap().name, "POSITION");
        assert!(matches!(
            s.fields[0].ty.kind,
            TypeNameKind::Base(DataType::Float3)
        ));
    }

    #[test]
    fn test_parse_typedef() {
        let program = parse("typedef float4 color4;");
        let DeclKind::Alias(alias) = &program.decls[0].kind else {
            panic!("expected alias");
        };
        assert_eq!(alias.name.name, "color4");
        assert!(matches!(
            alias.ty.kind,
            TypeNameKind::Base(DataType::Float4)
        ));
    }

    #[test]
    fn test_parse_cbuffer_and_resources() {
        let program = parse(
            r#"
            cbuffer PerFrame : register(b0) {
                float4x4 viewProj;
                float3 cameraPos;
            };
            Texture2D albedo : register(t0);
            SamplerState linearSampler : register(s0);
            "#,
        );
        assert_eq!(program.decls.len(), 3);
        let DeclKind::ConstBuffer(cb) = &program.decls[0].kind else {
            panic!("expected cbuffer");
        };
        assert_eq!(cb.register.as_deref(), Some("b0"));
        assert_eq!(cb.fields.len(), 2);
        assert!(matches!(&program.decls[1].kind, DeclKind::Texture(t) if t.dim == TextureDim::Tex2D));
        assert!(matches!(&program.decls[2].kind, DeclKind::Sampler(_)));
    }

    #[test]
    fn test_parse_function() {
        let program = parse(
            r#"
            float4 main(float2 uv : TEXCOORD0, out float depth) : SV_Target {
                return float4(uv, 0.0, 1.0);
            }
            "#,
        );
        let DeclKind::Function(f) = &program.decls[0].kind else {
            panic!("expected function");
        };
        assert_eq!(f.name.name, "main");
        assert_eq!(f.params.len(), 2);
        assert_eq!(f.params[1].qualifier, ParamQualifier::Out);
        assert_eq!(f.return_semantic.as_ref().unwrap().name, "SV_Target");
        assert_eq!(f.body.stmts.len(), 1);
    }

    #[test]
    fn test_parse_statements() {
        let program = parse(
            r#"
            void update(int n) {
                int acc = 0;
                for (int i = 0; i < n; ++i) {
                    if (i == 3)
                        continue;
                    acc += i;
                }
                while (acc > 10) {
                    acc = acc - 1;
                }
                do {
                    acc++;
                } while (acc < 5);
                discard;
            }
            "#,
        );
        let DeclKind::Function(f) = &program.decls[0].kind else {
            panic!("expected function");
        };
        assert_eq!(f.body.stmts.len(), 5);
        assert!(matches!(f.body.stmts[1].kind, StmtKind::For { .. }));
        assert!(matches!(f.body.stmts[2].kind, StmtKind::While { .. }));
        assert!(matches!(f.body.stmts[3].kind, StmtKind::DoWhile { .. }));
        assert!(matches!(
            f.body.stmts[4].kind,
            StmtKind::CtrlTransfer(CtrlTransfer::Discard)
        ));
    }

    #[test]
    fn test_parse_expression_precedence() {
        let program = parse("void f() { int x = 1 + 2 * 3; }");
        let DeclKind::Function(f) = &program.decls[0].kind else {
            panic!("expected function");
        };
        let StmtKind::VarDecl(var) = &f.body.stmts[0].kind else {
            panic!("expected var decl");
        };
        // 1 + (2 * 3)
        let ExprKind::Binary { op, rhs, .. } = &var.initializer.as_ref().unwrap().kind else {
            panic!("expected binary expr");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(
            rhs.kind,
            ExprKind::Binary {
                op: BinaryOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_swizzle_and_index() {
        let program = parse("void f() { color.rgb = colors[2].xyz; }");
        let DeclKind::Function(f) = &program.decls[0].kind else {
            panic!("expected function");
        };
        let StmtKind::Expr(expr) = &f.body.stmts[0].kind else {
            panic!("expected expr stmt");
        };
        let ExprKind::Assign { lhs, op, rhs } = &expr.kind else {
            panic!("expected assignment");
        };
        assert_eq!(*op, AssignOp::Set);
        assert!(matches!(lhs.kind, ExprKind::Member { .. }));
        let ExprKind::Member { object, member } = &rhs.kind else {
            panic!("expected member access");
        };
        assert_eq!(member.name, "xyz");
        assert!(matches!(object.kind, ExprKind::Index { .. }));
    }

    #[test]
    fn test_parse_constructor_and_cast() {
        let program = parse("void f() { float3 v = (float3)0; float4 w = float4(v, 1.0); }");
        let DeclKind::Function(f) = &program.decls[0].kind else {
            panic!("expected function");
        };
        let StmtKind::VarDecl(v) = &f.body.stmts[0].kind else {
            panic!("expected var decl");
        };
        assert!(matches!(
            v.initializer.as_ref().unwrap().kind,
            ExprKind::Cast { .. }
        ));
        let StmtKind::VarDecl(w) = &f.body.stmts[1].kind else {
            panic!("expected var decl");
        };
        assert!(matches!(
            w.initializer.as_ref().unwrap().kind,
            ExprKind::Constructor {
                ty: DataType::Float4,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_ternary() {
        let program = parse("void f() { float x = a > b ? a : b; }");
        let DeclKind::Function(f) = &program.decls[0].kind else {
            panic!("expected function");
        };
        let StmtKind::VarDecl(var) = &f.body.stmts[0].kind else {
            panic!("expected var decl");
        };
        assert!(matches!(
            var.initializer.as_ref().unwrap().kind,
            ExprKind::Ternary { .. }
        ));
    }

    #[test]
    fn test_parse_global_with_array() {
        let program = parse("static const float weights[4] = 0.25;");
        let DeclKind::Variable(var) = &program.decls[0].kind else {
            panic!("expected variable");
        };
        assert!(var.is_const);
        assert_eq!(var.array_dims, vec![4]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_err("struct Broken {"),
            CompileError::Parser { .. }
        ));
        assert!(matches!(
            parse_err("void f() { return 1 + ; }"),
            CompileError::Parser { .. }
        ));
        assert!(matches!(
            parse_err("float4 main( {"),
            CompileError::Parser { .. }
        ));
    }
}
