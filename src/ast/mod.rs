//! Abstract syntax tree for HLSL programs
//!
//! Node definitions produced by the parser, plus the operator, data
//! type, and intrinsic catalogs shared by all passes.

mod data_type;
mod intrinsic;
mod ops;

pub use data_type::{
    from_type_name, matrix_data_type, vector_data_type, vector_subscript_data_type, DataType,
    SwizzleError,
};
pub use intrinsic::Intrinsic;
pub use ops::{AssignOp, BinaryOp, CtrlTransfer, UnaryOp, UnknownOp};

use crate::errors::SourceArea;

/// A complete translation unit
#[derive(Debug, Clone)]
pub struct Program {
    pub decls: Vec<Decl>,
}

/// A top-level declaration
#[derive(Debug, Clone)]
pub struct Decl {
    pub kind: DeclKind,
    pub area: SourceArea,
}

#[derive(Debug, Clone)]
pub enum DeclKind {
    /// Struct declaration: `struct Name { fields };`
    Struct(StructDecl),
    /// Type alias: `typedef float4 color4;`
    Alias(AliasDecl),
    /// Constant buffer: `cbuffer Name : register(b0) { fields };`
    ConstBuffer(ConstBufferDecl),
    /// Texture object: `Texture2D tex : register(t0);`
    Texture(TextureDecl),
    /// Sampler state: `SamplerState smp : register(s0);`
    Sampler(SamplerDecl),
    /// Global variable declaration
    Variable(VarDecl),
    /// Function definition
    Function(FunctionDecl),
}

/// An identifier with its source location
#[derive(Debug, Clone)]
pub struct Ident {
    pub name: String,
    pub area: SourceArea,
}

impl Ident {
    pub fn new(name: impl Into<String>, area: SourceArea) -> Self {
        Self {
            name: name.into(),
            area,
        }
    }
}

/// A type as spelled in the source
#[derive(Debug, Clone)]
pub struct TypeName {
    pub kind: TypeNameKind,
    pub area: SourceArea,
}

#[derive(Debug, Clone)]
pub enum TypeNameKind {
    /// `void` (function return types only)
    Void,
    /// A base data type: scalar, vector, or matrix
    Base(DataType),
    /// A named type: struct or alias reference
    Ident(Ident),
}

/// A struct declaration
#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: Ident,
    pub fields: Vec<VarDecl>,
}

/// A typedef declaration
#[derive(Debug, Clone)]
pub struct AliasDecl {
    pub name: Ident,
    pub ty: TypeName,
}

/// A constant buffer declaration
#[derive(Debug, Clone)]
pub struct ConstBufferDecl {
    pub name: Ident,
    pub register: Option<String>,
    pub fields: Vec<VarDecl>,
}

/// Texture dimensionality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureDim {
    Tex1D,
    Tex2D,
    Tex3D,
    Cube,
}

/// A texture object declaration
#[derive(Debug, Clone)]
pub struct TextureDecl {
    pub name: Ident,
    pub dim: TextureDim,
    pub register: Option<String>,
}

/// A sampler state declaration
#[derive(Debug, Clone)]
pub struct SamplerDecl {
    pub name: Ident,
    pub register: Option<String>,
}

/// A variable declaration: global, local, struct field, or cbuffer field
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub name: Ident,
    pub ty: TypeName,
    /// Array dimensions, outermost first; empty for non-arrays
    pub array_dims: Vec<u32>,
    /// Shader semantic, e.g. `: SV_Position`
    pub semantic: Option<Ident>,
    pub initializer: Option<Expr>,
    pub is_const: bool,
    pub area: SourceArea,
}

/// Parameter passing qualifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamQualifier {
    #[default]
    In,
    Out,
    InOut,
}

/// A function parameter
#[derive(Debug, Clone)]
pub struct Param {
    pub name: Ident,
    pub ty: TypeName,
    pub qualifier: ParamQualifier,
    /// Array dimensions, outermost first; empty for non-arrays
    pub array_dims: Vec<u32>,
    pub semantic: Option<Ident>,
    pub area: SourceArea,
}

/// A function definition
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: Ident,
    pub return_type: TypeName,
    pub return_semantic: Option<Ident>,
    pub params: Vec<Param>,
    pub body: Block,
}

/// A brace-delimited statement list
#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub area: SourceArea,
}

/// A statement
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub area: SourceArea,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Block(Block),
    VarDecl(VarDecl),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Box<Stmt>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    Return(Option<Expr>),
    /// `break`, `continue`, or `discard`
    CtrlTransfer(CtrlTransfer),
    Expr(Expr),
}

/// An expression
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub area: SourceArea,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    IntLiteral(i64),
    FloatLiteral(f64),
    BoolLiteral(bool),
    StringLiteral(String),
    Ident(Ident),
    Assign {
        lhs: Box<Expr>,
        op: AssignOp,
        rhs: Box<Expr>,
    },
    Binary {
        lhs: Box<Expr>,
        op: BinaryOp,
        rhs: Box<Expr>,
    },
    /// Prefix unary expression, e.g. `-x`, `++x`
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// Postfix `x++` / `x--`
    PostUnary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    /// Function or intrinsic call
    Call {
        callee: Ident,
        args: Vec<Expr>,
    },
    /// Type constructor call, e.g. `float3(x, y, z)`
    Constructor {
        ty: DataType,
        args: Vec<Expr>,
    },
    /// Member access: struct field or vector swizzle
    Member {
        object: Box<Expr>,
        member: Ident,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Cast {
        ty: TypeName,
        expr: Box<Expr>,
    },
    Paren(Box<Expr>),
}
