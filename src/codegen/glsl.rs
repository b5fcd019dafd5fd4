//! GLSL code generator
//!
//! Traverses the analyzed AST and emits GLSL source through the code
//! writer: HLSL type spellings become their GLSL counterparts, cbuffers
//! become uniform blocks, texture/sampler pairs collapse into sampler
//! uniforms, and intrinsics are renamed or rewritten.

use super::writer::{CodeWriter, WriterOptions};
use super::CodeGenerator;
use crate::analysis::{Module, TypeDenoter};
use crate::ast::{
    DataType, Decl, DeclKind, Expr, ExprKind, FunctionDecl, Intrinsic, ParamQualifier, Program,
    Stmt, StmtKind, TextureDim, TypeName, TypeNameKind, VarDecl,
};
use crate::errors::{CompileError, CompileResult};

/// GLSL code generator
pub struct GlslGenerator {
    writer: CodeWriter,
    /// `#version` directive to emit, e.g. 330
    version: u32,
}

impl GlslGenerator {
    pub fn new() -> Self {
        Self {
            writer: CodeWriter::new("    "),
            version: 330,
        }
    }

    /// Set the GLSL version directive
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    fn generate_program(&mut self, program: &Program, module: &Module) -> CompileResult<()> {
        self.writer
            .write_line(&format!("#version {} core", self.version));
        self.writer.write_line("");

        for decl in &program.decls {
            self.generate_decl(decl, module)?;
        }
        Ok(())
    }

    fn generate_decl(&mut self, decl: &Decl, module: &Module) -> CompileResult<()> {
        match &decl.kind {
            DeclKind::Struct(s) => {
                self.writer.write_line(&format!("struct {} {{", s.name.name));
                self.writer.push_indent();
                for field in &s.fields {
                    let text = self.var_decl_text(field, module)?;
                    self.writer.write_line(&format!("{};", text));
                }
                self.writer.pop_indent();
                self.writer.write_line("};");
                self.writer.write_line("");
            }
            // typedefs are substituted at their use sites
            DeclKind::Alias(_) => {}
            DeclKind::ConstBuffer(cb) => {
                self.writer
                    .write_line(&format!("layout(std140) uniform {} {{", cb.name.name));
                self.writer.push_indent();
                for field in &cb.fields {
                    let text = self.var_decl_text(field, module)?;
                    self.writer.write_line(&format!("{};", text));
                }
                self.writer.pop_indent();
                self.writer.write_line("};");
                self.writer.write_line("");
            }
            DeclKind::Texture(tex) => {
                let sampler = match tex.dim {
                    TextureDim::Tex1D => "sampler1D",
                    TextureDim::Tex2D => "sampler2D",
                    TextureDim::Tex3D => "sampler3D",
                    TextureDim::Cube => "samplerCube",
                };
                self.writer
                    .write_line(&format!("uniform {} {};", sampler, tex.name.name));
            }
            // GLSL combines sampler state into the sampler uniform
            DeclKind::Sampler(_) => {}
            DeclKind::Variable(var) => {
                let text = self.var_decl_text(var, module)?;
                if var.is_const && var.initializer.is_some() {
                    self.writer.write_line(&format!("const {};", text));
                } else {
                    self.writer.write_line(&format!("{};", text));
                }
            }
            DeclKind::Function(func) => {
                self.generate_function(func, module)?;
                self.writer.write_line("");
            }
        }
        Ok(())
    }

    fn generate_function(&mut self, func: &FunctionDecl, module: &Module) -> CompileResult<()> {
        let ret = self.type_text(&func.return_type, module)?;

        let mut params = Vec::new();
        for param in &func.params {
            let qualifier = match param.qualifier {
                ParamQualifier::In => "",
                ParamQualifier::Out => "out ",
                ParamQualifier::InOut => "inout ",
            };
            let ty = self.type_text(&param.ty, module)?;
            let mut text = format!("{}{} {}", qualifier, ty, param.name.name);
            for dim in &param.array_dims {
                text.push_str(&format!("[{}]", dim));
            }
            params.push(text);
        }

        self.writer.write_line(&format!(
            "{} {}({}) {{",
            ret,
            func.name.name,
            params.join(", ")
        ));
        self.writer.push_indent();
        for stmt in &func.body.stmts {
            self.generate_stmt(stmt, module)?;
        }
        self.writer.pop_indent();
        self.writer.write_line("}");
        Ok(())
    }

    fn generate_stmt(&mut self, stmt: &Stmt, module: &Module) -> CompileResult<()> {
        match &stmt.kind {
            StmtKind::Block(block) => {
                self.writer.write_line("{");
                self.writer.push_indent();
                for stmt in &block.stmts {
                    self.generate_stmt(stmt, module)?;
                }
                self.writer.pop_indent();
                self.writer.write_line("}");
            }
            StmtKind::VarDecl(var) => {
                let text = self.var_decl_text(var, module)?;
                if var.is_const {
                    self.writer.write_line(&format!("const {};", text));
                } else {
                    self.writer.write_line(&format!("{};", text));
                }
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = self.expr_text(cond, module)?;
                self.writer.write_line(&format!("if ({}) {{", cond));
                self.generate_body(then_branch, module)?;
                match else_branch {
                    Some(else_branch) => {
                        self.writer.write_line("} else {");
                        self.generate_body(else_branch, module)?;
                        self.writer.write_line("}");
                    }
                    None => self.writer.write_line("}"),
                }
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                self.writer.begin_line();
                self.writer.write("for (");

                // the init statement is written inline, without its
                // usual indent and newline
                self.writer
                    .push_options(WriterOptions::new(false, false));
                match init {
                    Some(init) => self.generate_stmt(init, module)?,
                    None => self.writer.write(";"),
                }
                self.writer.write(" ");
                if let Some(cond) = cond {
                    let cond = self.expr_text(cond, module)?;
                    self.writer.write(&cond);
                }
                self.writer.write("; ");
                if let Some(step) = step {
                    let step = self.expr_text(step, module)?;
                    self.writer.write(&step);
                }
                self.writer.pop_options();

                self.writer.write(") {");
                self.writer.end_line();
                self.generate_body(body, module)?;
                self.writer.write_line("}");
            }
            StmtKind::While { cond, body } => {
                let cond = self.expr_text(cond, module)?;
                self.writer.write_line(&format!("while ({}) {{", cond));
                self.generate_body(body, module)?;
                self.writer.write_line("}");
            }
            StmtKind::DoWhile { body, cond } => {
                self.writer.write_line("do {");
                self.generate_body(body, module)?;
                let cond = self.expr_text(cond, module)?;
                self.writer.write_line(&format!("}} while ({});", cond));
            }
            StmtKind::Return(value) => match value {
                Some(expr) => {
                    let text = self.expr_text(expr, module)?;
                    self.writer.write_line(&format!("return {};", text));
                }
                None => self.writer.write_line("return;"),
            },
            StmtKind::CtrlTransfer(ctrl) => {
                self.writer.write_line(&format!("{};", ctrl));
            }
            StmtKind::Expr(expr) => {
                let text = self.expr_text(expr, module)?;
                self.writer.write_line(&format!("{};", text));
            }
        }
        Ok(())
    }

    /// Emit a statement as an indented body; blocks are flattened into
    /// the braces the caller already wrote
    fn generate_body(&mut self, stmt: &Stmt, module: &Module) -> CompileResult<()> {
        self.writer.push_indent();
        match &stmt.kind {
            StmtKind::Block(block) => {
                for stmt in &block.stmts {
                    self.generate_stmt(stmt, module)?;
                }
            }
            _ => self.generate_stmt(stmt, module)?,
        }
        self.writer.pop_indent();
        Ok(())
    }

    /// The declaration text `type name[dims] (= init)`, without the
    /// trailing semicolon
    fn var_decl_text(&self, var: &VarDecl, module: &Module) -> CompileResult<String> {
        let mut text = format!(
            "{} {}",
            self.type_text(&var.ty, module)?,
            var.name.name
        );
        for dim in &var.array_dims {
            text.push_str(&format!("[{}]", dim));
        }
        if let Some(init) = &var.initializer {
            text.push_str(" = ");
            text.push_str(&self.expr_text(init, module)?);
        }
        Ok(text)
    }

    /// GLSL spelling of a type as written in a declaration
    fn type_text(&self, ty: &TypeName, module: &Module) -> CompileResult<String> {
        match &ty.kind {
            TypeNameKind::Void => Ok("void".to_string()),
            TypeNameKind::Base(data_type) => glsl_type_name(*data_type),
            TypeNameKind::Ident(name) => match module.alias_target(&name.name) {
                Some(target) => self.denoter_text(target),
                None => Ok(name.name.clone()),
            },
        }
    }

    /// GLSL spelling of a resolved type denoter
    fn denoter_text(&self, denoter: &TypeDenoter) -> CompileResult<String> {
        match denoter.peel_alias() {
            TypeDenoter::Void => Ok("void".to_string()),
            TypeDenoter::Base(data_type) => glsl_type_name(*data_type),
            TypeDenoter::Struct { ident, .. } => Ok(ident.clone()),
            other => Err(CompileError::codegen(format!(
                "type '{}' has no GLSL spelling",
                other
            ))),
        }
    }

    fn expr_text(&self, expr: &Expr, module: &Module) -> CompileResult<String> {
        match &expr.kind {
            ExprKind::IntLiteral(value) => Ok(value.to_string()),
            ExprKind::FloatLiteral(value) => Ok(float_literal(*value)),
            ExprKind::BoolLiteral(value) => Ok(value.to_string()),
            ExprKind::StringLiteral(value) => Ok(format!("\"{}\"", value)),
            ExprKind::Ident(ident) => Ok(ident.name.clone()),
            ExprKind::Assign { lhs, op, rhs } => Ok(format!(
                "{} {} {}",
                self.expr_text(lhs, module)?,
                op,
                self.expr_text(rhs, module)?
            )),
            ExprKind::Binary { lhs, op, rhs } => Ok(format!(
                "{} {} {}",
                self.expr_text(lhs, module)?,
                op,
                self.expr_text(rhs, module)?
            )),
            ExprKind::Unary { op, operand } => {
                Ok(format!("{}{}", op, self.expr_text(operand, module)?))
            }
            ExprKind::PostUnary { op, operand } => {
                Ok(format!("{}{}", self.expr_text(operand, module)?, op))
            }
            ExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => Ok(format!(
                "{} ? {} : {}",
                self.expr_text(cond, module)?,
                self.expr_text(then_expr, module)?,
                self.expr_text(else_expr, module)?
            )),
            ExprKind::Call { callee, args } => self.call_text(&callee.name, args, module),
            ExprKind::Constructor { ty, args } => {
                let mut parts = Vec::new();
                for arg in args {
                    parts.push(self.expr_text(arg, module)?);
                }
                Ok(format!("{}({})", glsl_type_name(*ty)?, parts.join(", ")))
            }
            ExprKind::Member { object, member } => Ok(format!(
                "{}.{}",
                self.expr_text(object, module)?,
                member.name
            )),
            ExprKind::Index { object, index } => Ok(format!(
                "{}[{}]",
                self.expr_text(object, module)?,
                self.expr_text(index, module)?
            )),
            ExprKind::Cast { ty, expr } => Ok(format!(
                "{}({})",
                self.type_text(ty, module)?,
                self.expr_text(expr, module)?
            )),
            ExprKind::Paren(inner) => Ok(format!("({})", self.expr_text(inner, module)?)),
        }
    }

    /// Emit a call, renaming or rewriting HLSL intrinsics
    fn call_text(&self, name: &str, args: &[Expr], module: &Module) -> CompileResult<String> {
        let mut parts = Vec::new();
        for arg in args {
            parts.push(self.expr_text(arg, module)?);
        }

        let Some(intrinsic) = Intrinsic::lookup(name, args.len()) else {
            return Ok(format!("{}({})", name, parts.join(", ")));
        };

        use Intrinsic::*;
        let rewritten = match intrinsic {
            Mul if parts.len() == 2 => format!("(({}) * ({}))", parts[0], parts[1]),
            Saturate if parts.len() == 1 => format!("clamp({}, 0.0, 1.0)", parts[0]),
            Rcp if parts.len() == 1 => format!("(1.0 / ({}))", parts[0]),
            _ => format!("{}({})", glsl_intrinsic_name(intrinsic), parts.join(", ")),
        };
        Ok(rewritten)
    }
}

impl Default for GlslGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator for GlslGenerator {
    fn generate(&mut self, program: &Program, module: &Module) -> CompileResult<String> {
        self.generate_program(program, module)?;
        let writer = std::mem::replace(&mut self.writer, CodeWriter::new("    "));
        Ok(writer.into_output())
    }

    fn file_extension(&self) -> &'static str {
        "glsl"
    }

    fn language_name(&self) -> &'static str {
        "GLSL"
    }
}

/// Format a float literal so it stays a float in the output
fn float_literal(value: f64) -> String {
    let text = format!("{}", value);
    if text.contains('.') || text.contains('e') {
        text
    } else {
        format!("{}.0", text)
    }
}

/// GLSL spelling of an HLSL data type
fn glsl_type_name(ty: DataType) -> CompileResult<String> {
    let base = ty.base_data_type();
    let (rows, cols) = ty.matrix_dim();

    if ty.is_scalar() {
        let name = match base {
            DataType::Bool => "bool",
            DataType::Int => "int",
            DataType::UInt => "uint",
            // GLSL has no half scalar type
            DataType::Half | DataType::Float => "float",
            DataType::Double => "double",
            _ => unreachable!(),
        };
        return Ok(name.to_string());
    }

    if ty.is_vector() {
        let prefix = match base {
            DataType::Bool => "b",
            DataType::Int => "i",
            DataType::UInt => "u",
            DataType::Half | DataType::Float => "",
            DataType::Double => "d",
            _ => unreachable!(),
        };
        return Ok(format!("{}vec{}", prefix, rows));
    }

    if ty.is_matrix() {
        let prefix = match base {
            DataType::Half | DataType::Float => "",
            DataType::Double => "d",
            _ => {
                return Err(CompileError::codegen(format!(
                    "matrix type '{}' has no GLSL equivalent",
                    ty
                )))
            }
        };
        if rows == cols {
            return Ok(format!("{}mat{}", prefix, rows));
        }
        return Ok(format!("{}mat{}x{}", prefix, rows, cols));
    }

    Err(CompileError::codegen(format!(
        "type '{}' has no GLSL spelling",
        ty
    )))
}

/// GLSL name for an HLSL intrinsic; identity for the shared ones
fn glsl_intrinsic_name(intrinsic: Intrinsic) -> &'static str {
    use Intrinsic::*;
    match intrinsic {
        Lerp => "mix",
        Frac => "fract",
        RSqrt => "inversesqrt",
        ATan2 => "atan",
        FMod => "mod",
        DDX => "dFdx",
        DDXCoarse => "dFdxCoarse",
        DDXFine => "dFdxFine",
        DDY => "dFdy",
        DDYCoarse => "dFdyCoarse",
        DDYFine => "dFdyFine",
        CountBits => "bitCount",
        FirstBitHigh => "findMSB",
        FirstBitLow => "findLSB",
        ReverseBits => "bitfieldReverse",
        AsFloat => "uintBitsToFloat",
        AsInt => "floatBitsToInt",
        AsUInt => "floatBitsToUint",
        InterlockedAdd => "atomicAdd",
        InterlockedAnd => "atomicAnd",
        InterlockedOr => "atomicOr",
        InterlockedXor => "atomicXor",
        InterlockedMin => "atomicMin",
        InterlockedMax => "atomicMax",
        InterlockedExchange => "atomicExchange",
        InterlockedCompareExchange => "atomicCompSwap",
        Tex1D | Tex2D | Tex3D | TexCube | Tex1DBias | Tex2DBias | Tex3DBias | TexCubeBias => {
            "texture"
        }
        Tex1D_2 | Tex2D_2 | Tex3D_2 | TexCube_2 | Tex1DGrad | Tex2DGrad | Tex3DGrad
        | TexCubeGrad => "textureGrad",
        Tex1DLod | Tex2DLod | Tex3DLod | TexCubeLod => "textureLod",
        Tex1DProj | Tex2DProj | Tex3DProj | TexCubeProj => "textureProj",
        other => other.ident(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::errors::MemoryLog;
    use crate::parser::Parser;
    use crate::source::SourceCode;

    fn translate(src: &str) -> String {
        let program = Parser::new(src).parse().expect("parsing should succeed");
        let source = SourceCode::new("test.hlsl", src);
        let mut log = MemoryLog::new();
        let module = analyze(&program, &source, &mut log)
            .unwrap_or_else(|_| panic!("analysis should succeed: {:?}", log.reports()));
        GlslGenerator::new()
            .generate(&program, &module)
            .expect("generation should succeed")
    }

    #[test]
    fn test_glsl_type_names() {
        assert_eq!(glsl_type_name(DataType::Float4).unwrap(), "vec4");
        assert_eq!(glsl_type_name(DataType::Int3).unwrap(), "ivec3");
        assert_eq!(glsl_type_name(DataType::UInt2).unwrap(), "uvec2");
        assert_eq!(glsl_type_name(DataType::Bool4).unwrap(), "bvec4");
        assert_eq!(glsl_type_name(DataType::Half3).unwrap(), "vec3");
        assert_eq!(glsl_type_name(DataType::Float4x4).unwrap(), "mat4");
        assert_eq!(glsl_type_name(DataType::Float2x3).unwrap(), "mat2x3");
        assert_eq!(glsl_type_name(DataType::Double2x2).unwrap(), "dmat2");
        assert_eq!(glsl_type_name(DataType::UInt).unwrap(), "uint");
        assert!(glsl_type_name(DataType::Int2x2).is_err());
        assert!(glsl_type_name(DataType::String).is_err());
    }

    #[test]
    fn test_intrinsic_renames() {
        assert_eq!(glsl_intrinsic_name(Intrinsic::Lerp), "mix");
        assert_eq!(glsl_intrinsic_name(Intrinsic::Frac), "fract");
        assert_eq!(glsl_intrinsic_name(Intrinsic::RSqrt), "inversesqrt");
        assert_eq!(glsl_intrinsic_name(Intrinsic::DDX), "dFdx");
        assert_eq!(glsl_intrinsic_name(Intrinsic::Tex2D), "texture");
        assert_eq!(glsl_intrinsic_name(Intrinsic::Tex2D_2), "textureGrad");
        // shared names pass through
        assert_eq!(glsl_intrinsic_name(Intrinsic::Dot), "dot");
        assert_eq!(glsl_intrinsic_name(Intrinsic::Normalize), "normalize");
    }

    #[test]
    fn test_translate_function() {
        let glsl = translate(
            r#"
            float4 shade(float3 normal, float3 lightDir) {
                float d = max(dot(normal, lightDir), 0.0);
                return float4(d, d, d, 1.0);
            }
            "#,
        );
        assert!(glsl.starts_with("#version 330 core\n"), "{glsl}");
        assert!(glsl.contains("vec4 shade(vec3 normal, vec3 lightDir) {"), "{glsl}");
        assert!(glsl.contains("    float d = max(dot(normal, lightDir), 0.0);"), "{glsl}");
        assert!(glsl.contains("    return vec4(d, d, d, 1.0);"), "{glsl}");
    }

    #[test]
    fn test_translate_struct_and_cbuffer() {
        let glsl = translate(
            r#"
            struct Light {
                float3 direction;
                float intensity;
            };
            cbuffer PerFrame : register(b0) {
                float4x4 viewProj;
            };
            "#,
        );
        assert!(glsl.contains("struct Light {"), "{glsl}");
        assert!(glsl.contains("    vec3 direction;"), "{glsl}");
        assert!(glsl.contains("layout(std140) uniform PerFrame {"), "{glsl}");
        assert!(glsl.contains("    mat4 viewProj;"), "{glsl}");
    }

    #[test]
    fn test_translate_texture_sampling() {
        let glsl = translate(
            r#"
            Texture2D albedo : register(t0);
            SamplerState samp : register(s0);
            float4 main(float2 uv : TEXCOORD0) : SV_Target {
                return tex2D(samp, uv);
            }
            "#,
        );
        assert!(glsl.contains("uniform sampler2D albedo;"), "{glsl}");
        // sampler state declarations are dropped
        assert!(!glsl.contains("SamplerState"), "{glsl}");
        assert!(glsl.contains("return texture(samp, uv);"), "{glsl}");
    }

    #[test]
    fn test_translate_intrinsic_rewrites() {
        let glsl = translate(
            r#"
            cbuffer M { float4x4 world; };
            float4 f(float4 v, float t) {
                float4 a = mul(world, v);
                float s = saturate(t);
                float r = rcp(t);
                return lerp(a, v, frac(s + r));
            }
            "#,
        );
        assert!(glsl.contains("vec4 a = ((world) * (v));"), "{glsl}");
        assert!(glsl.contains("float s = clamp(t, 0.0, 1.0);"), "{glsl}");
        assert!(glsl.contains("float r = (1.0 / (t));"), "{glsl}");
        assert!(glsl.contains("return mix(a, v, fract(s + r));"), "{glsl}");
    }

    #[test]
    fn test_translate_control_flow() {
        let glsl = translate(
            r#"
            float f(int n) {
                float acc = 0.0;
                for (int i = 0; i < n; ++i) {
                    if (i == 3) {
                        continue;
                    }
                    acc += 1.0;
                }
                while (acc > 10.0) {
                    acc -= 1.0;
                }
                return acc;
            }
            "#,
        );
        assert!(glsl.contains("    for (int i = 0; i < n; ++i) {"), "{glsl}");
        assert!(glsl.contains("        if (i == 3) {"), "{glsl}");
        assert!(glsl.contains("            continue;"), "{glsl}");
        assert!(glsl.contains("    while (acc > 10.0) {"), "{glsl}");
    }

    #[test]
    fn test_translate_discard_and_cast() {
        let glsl = translate(
            r#"
            float4 f(float a) {
                if (a < 0.5) {
                    discard;
                }
                int i = (int)a;
                return float4((float)i, 0.0, 0.0, 1.0);
            }
            "#,
        );
        assert!(glsl.contains("discard;"), "{glsl}");
        assert!(glsl.contains("int i = int(a);"), "{glsl}");
        assert!(glsl.contains("vec4(float(i), 0.0, 0.0, 1.0)"), "{glsl}");
    }

    #[test]
    fn test_translate_typedef_substitution() {
        let glsl = translate(
            r#"
            typedef float4 color4;
            color4 invert(color4 c) {
                return float4(1.0, 1.0, 1.0, 1.0) - c;
            }
            "#,
        );
        // the alias is resolved into its GLSL target
        assert!(glsl.contains("vec4 invert(vec4 c) {"), "{glsl}");
        assert!(!glsl.contains("color4"), "{glsl}");
    }

    #[test]
    fn test_translate_const_global_and_array() {
        let glsl = translate(
            r#"
            static const float weight = 0.25;
            float sum(float4 values[2]) {
                return values[0].x * weight;
            }
            "#,
        );
        assert!(glsl.contains("const float weight = 0.25;"), "{glsl}");
        assert!(glsl.contains("vec4 values[2]"), "{glsl}");
        assert!(glsl.contains("return values[0].x * weight;"), "{glsl}");
    }
}
