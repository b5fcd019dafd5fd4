//! The HLSL intrinsic function catalog
//!
//! A closed enumeration of the built-ins an HLSL source may call. Names
//! with a `_2` suffix are alternative signatures of the same HLSL
//! identifier; `lookup` selects between them by call arity.

/// Intrinsic function enumeration (HLSL built-ins)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum Intrinsic {
    Undefined,

    Abort,
    Abs,
    ACos,
    All,
    AllMemoryBarrier,
    AllMemoryBarrierWithGroupSync,
    Any,
    AsDouble,
    AsFloat,
    ASin,
    AsInt,
    AsUInt,
    AsUInt_2,
    ATan,
    ATan2,
    Ceil,
    CheckAccessFullyMapped,
    Clamp,
    Clip,
    Cos,
    CosH,
    CountBits,
    Cross,
    D3DCOLORtoUBYTE4,
    DDX,
    DDXCoarse,
    DDXFine,
    DDY,
    DDYCoarse,
    DDYFine,
    Degrees,
    Determinant,
    DeviceMemoryBarrier,
    DeviceMemoryBarrierWithGroupSync,
    Distance,
    Dot,
    Dst,
    ErrorF,
    EvaluateAttributeAtCentroid,
    EvaluateAttributeAtSample,
    EvaluateAttributeSnapped,
    Exp,
    Exp2,
    F16toF32,
    F32toF16,
    FaceForward,
    FirstBitHigh,
    FirstBitLow,
    Floor,
    FMA,
    FMod,
    Frac,
    FrExp,
    FWidth,
    GetRenderTargetSampleCount,
    GetRenderTargetSamplePosition,
    GroupMemoryBarrier,
    GroupMemoryBarrierWithGroupSync,
    InterlockedAdd,
    InterlockedAnd,
    InterlockedCompareExchange,
    InterlockedCompareStore,
    InterlockedExchange,
    InterlockedMax,
    InterlockedMin,
    InterlockedOr,
    InterlockedXor,
    IsFinite,
    IsInf,
    IsNaN,
    LdExp,
    Length,
    Lerp,
    Lit,
    Log,
    Log10,
    Log2,
    MAD,
    Max,
    Min,
    ModF,
    MSAD4,
    Mul,
    Noise,
    Normalize,
    Pow,
    PrintF,
    Process2DQuadTessFactorsAvg,
    Process2DQuadTessFactorsMax,
    Process2DQuadTessFactorsMin,
    ProcessIsolineTessFactors,
    ProcessQuadTessFactorsAvg,
    ProcessQuadTessFactorsMax,
    ProcessQuadTessFactorsMin,
    ProcessTriTessFactorsAvg,
    ProcessTriTessFactorsMax,
    ProcessTriTessFactorsMin,
    Radians,
    Rcp,
    Reflect,
    Refract,
    ReverseBits,
    Round,
    RSqrt,
    Saturate,
    Sign,
    Sin,
    SinCos,
    SinH,
    SmoothStep,
    Sqrt,
    Step,
    Tan,
    TanH,
    Tex1D,
    Tex1D_2,
    Tex1DBias,
    Tex1DGrad,
    Tex1DLod,
    Tex1DProj,
    Tex2D,
    Tex2D_2,
    Tex2DBias,
    Tex2DGrad,
    Tex2DLod,
    Tex2DProj,
    Tex3D,
    Tex3D_2,
    Tex3DBias,
    Tex3DGrad,
    Tex3DLod,
    Tex3DProj,
    TexCube,
    TexCube_2,
    TexCubeBias,
    TexCubeGrad,
    TexCubeLod,
    TexCubeProj,
    Transpose,
    Trunc,
}

impl Intrinsic {
    /// The HLSL identifier this intrinsic is called by. Alternative
    /// signatures (`_2`) share the identifier of their base form.
    pub fn ident(&self) -> &'static str {
        use Intrinsic::*;
        match self {
            Undefined => "<undefined>",
            Abort => "abort",
            Abs => "abs",
            ACos => "acos",
            All => "all",
            AllMemoryBarrier => "AllMemoryBarrier",
            AllMemoryBarrierWithGroupSync => "AllMemoryBarrierWithGroupSync",
            Any => "any",
            AsDouble => "asdouble",
            AsFloat => "asfloat",
            ASin => "asin",
            AsInt => "asint",
            AsUInt | AsUInt_2 => "asuint",
            ATan => "atan",
            ATan2 => "atan2",
            Ceil => "ceil",
            CheckAccessFullyMapped => "CheckAccessFullyMapped",
            Clamp => "clamp",
            Clip => "clip",
            Cos => "cos",
            CosH => "cosh",
            CountBits => "countbits",
            Cross => "cross",
            D3DCOLORtoUBYTE4 => "D3DCOLORtoUBYTE4",
            DDX => "ddx",
            DDXCoarse => "ddx_coarse",
            DDXFine => "ddx_fine",
            DDY => "ddy",
            DDYCoarse => "ddy_coarse",
            DDYFine => "ddy_fine",
            Degrees => "degrees",
            Determinant => "determinant",
            DeviceMemoryBarrier => "DeviceMemoryBarrier",
            DeviceMemoryBarrierWithGroupSync => "DeviceMemoryBarrierWithGroupSync",
            Distance => "distance",
            Dot => "dot",
            Dst => "dst",
            ErrorF => "errorf",
            EvaluateAttributeAtCentroid => "EvaluateAttributeAtCentroid",
            EvaluateAttributeAtSample => "EvaluateAttributeAtSample",
            EvaluateAttributeSnapped => "EvaluateAttributeSnapped",
            Exp => "exp",
            Exp2 => "exp2",
            F16toF32 => "f16tof32",
            F32toF16 => "f32tof16",
            FaceForward => "faceforward",
            FirstBitHigh => "firstbithigh",
            FirstBitLow => "firstbitlow",
            Floor => "floor",
            FMA => "fma",
            FMod => "fmod",
            Frac => "frac",
            FrExp => "frexp",
            FWidth => "fwidth",
            GetRenderTargetSampleCount => "GetRenderTargetSampleCount",
            GetRenderTargetSamplePosition => "GetRenderTargetSamplePosition",
            GroupMemoryBarrier => "GroupMemoryBarrier",
            GroupMemoryBarrierWithGroupSync => "GroupMemoryBarrierWithGroupSync",
            InterlockedAdd => "InterlockedAdd",
            InterlockedAnd => "InterlockedAnd",
            InterlockedCompareExchange => "InterlockedCompareExchange",
            InterlockedCompareStore => "InterlockedCompareStore",
            InterlockedExchange => "InterlockedExchange",
            InterlockedMax => "InterlockedMax",
            InterlockedMin => "InterlockedMin",
            InterlockedOr => "InterlockedOr",
            InterlockedXor => "InterlockedXor",
            IsFinite => "isfinite",
            IsInf => "isinf",
            IsNaN => "isnan",
            LdExp => "ldexp",
            Length => "length",
            Lerp => "lerp",
            Lit => "lit",
            Log => "log",
            Log10 => "log10",
            Log2 => "log2",
            MAD => "mad",
            Max => "max",
            Min => "min",
            ModF => "modf",
            MSAD4 => "msad4",
            Mul => "mul",
            Noise => "noise",
            Normalize => "normalize",
            Pow => "pow",
            PrintF => "printf",
            Process2DQuadTessFactorsAvg => "Process2DQuadTessFactorsAvg",
            Process2DQuadTessFactorsMax => "Process2DQuadTessFactorsMax",
            Process2DQuadTessFactorsMin => "Process2DQuadTessFactorsMin",
            ProcessIsolineTessFactors => "ProcessIsolineTessFactors",
            ProcessQuadTessFactorsAvg => "ProcessQuadTessFactorsAvg",
            ProcessQuadTessFactorsMax => "ProcessQuadTessFactorsMax",
            ProcessQuadTessFactorsMin => "ProcessQuadTessFactorsMin",
            ProcessTriTessFactorsAvg => "ProcessTriTessFactorsAvg",
            ProcessTriTessFactorsMax => "ProcessTriTessFactorsMax",
            ProcessTriTessFactorsMin => "ProcessTriTessFactorsMin",
            Radians => "radians",
            Rcp => "rcp",
            Reflect => "reflect",
            Refract => "refract",
            ReverseBits => "reversebits",
            Round => "round",
            RSqrt => "rsqrt",
            Saturate => "saturate",
            Sign => "sign",
            Sin => "sin",
            SinCos => "sincos",
            SinH => "sinh",
            SmoothStep => "smoothstep",
            Sqrt => "sqrt",
            Step => "step",
            Tan => "tan",
            TanH => "tanh",
            Tex1D | Tex1D_2 => "tex1D",
            Tex1DBias => "tex1Dbias",
            Tex1DGrad => "tex1Dgrad",
            Tex1DLod => "tex1Dlod",
            Tex1DProj => "tex1Dproj",
            Tex2D | Tex2D_2 => "tex2D",
            Tex2DBias => "tex2Dbias",
            Tex2DGrad => "tex2Dgrad",
            Tex2DLod => "tex2Dlod",
            Tex2DProj => "tex2Dproj",
            Tex3D | Tex3D_2 => "tex3D",
            Tex3DBias => "tex3Dbias",
            Tex3DGrad => "tex3Dgrad",
            Tex3DLod => "tex3Dlod",
            Tex3DProj => "tex3Dproj",
            TexCube | TexCube_2 => "texCUBE",
            TexCubeBias => "texCUBEbias",
            TexCubeGrad => "texCUBEgrad",
            TexCubeLod => "texCUBElod",
            TexCubeProj => "texCUBEproj",
            Transpose => "transpose",
            Trunc => "trunc",
        }
    }

    /// Resolve an HLSL call identifier and its arity to an intrinsic.
    /// Identifiers with alternative signatures (`asuint`, `tex1D`,
    /// `tex2D`, `tex3D`, `texCUBE`) are disambiguated by the number of
    /// call arguments, never by name alone.
    pub fn lookup(name: &str, num_args: usize) -> Option<Intrinsic> {
        use Intrinsic::*;
        let intrinsic = match name {
            "abort" => Abort,
            "abs" => Abs,
            "acos" => ACos,
            "all" => All,
            "AllMemoryBarrier" => AllMemoryBarrier,
            "AllMemoryBarrierWithGroupSync" => AllMemoryBarrierWithGroupSync,
            "any" => Any,
            "asdouble" => AsDouble,
            "asfloat" => AsFloat,
            "asin" => ASin,
            "asint" => AsInt,
            // asuint(x) reinterprets; asuint(double, out lo, out hi) splits
            "asuint" => {
                if num_args == 3 {
                    AsUInt_2
                } else {
                    AsUInt
                }
            }
            "atan" => ATan,
            "atan2" => ATan2,
            "ceil" => Ceil,
            "CheckAccessFullyMapped" => CheckAccessFullyMapped,
            "clamp" => Clamp,
            "clip" => Clip,
            "cos" => Cos,
            "cosh" => CosH,
            "countbits" => CountBits,
            "cross" => Cross,
            "D3DCOLORtoUBYTE4" => D3DCOLORtoUBYTE4,
            "ddx" => DDX,
            "ddx_coarse" => DDXCoarse,
            "ddx_fine" => DDXFine,
            "ddy" => DDY,
            "ddy_coarse" => DDYCoarse,
            "ddy_fine" => DDYFine,
            "degrees" => Degrees,
            "determinant" => Determinant,
            "DeviceMemoryBarrier" => DeviceMemoryBarrier,
            "DeviceMemoryBarrierWithGroupSync" => DeviceMemoryBarrierWithGroupSync,
            "distance" => Distance,
            "dot" => Dot,
            "dst" => Dst,
            "errorf" => ErrorF,
            "EvaluateAttributeAtCentroid" => EvaluateAttributeAtCentroid,
            "EvaluateAttributeAtSample" => EvaluateAttributeAtSample,
            "EvaluateAttributeSnapped" => EvaluateAttributeSnapped,
            "exp" => Exp,
            "exp2" => Exp2,
            "f16tof32" => F16toF32,
            "f32tof16" => F32toF16,
            "faceforward" => FaceForward,
            "firstbithigh" => FirstBitHigh,
            "firstbitlow" => FirstBitLow,
            "floor" => Floor,
            "fma" => FMA,
            "fmod" => FMod,
            "frac" => Frac,
            "frexp" => FrExp,
            "fwidth" => FWidth,
            "GetRenderTargetSampleCount" => GetRenderTargetSampleCount,
            "GetRenderTargetSamplePosition" => GetRenderTargetSamplePosition,
            "GroupMemoryBarrier" => GroupMemoryBarrier,
            "GroupMemoryBarrierWithGroupSync" => GroupMemoryBarrierWithGroupSync,
            "InterlockedAdd" => InterlockedAdd,
            "InterlockedAnd" => InterlockedAnd,
            "InterlockedCompareExchange" => InterlockedCompareExchange,
            "InterlockedCompareStore" => InterlockedCompareStore,
            "InterlockedExchange" => InterlockedExchange,
            "InterlockedMax" => InterlockedMax,
            "InterlockedMin" => InterlockedMin,
            "InterlockedOr" => InterlockedOr,
            "InterlockedXor" => InterlockedXor,
            "isfinite" => IsFinite,
            "isinf" => IsInf,
            "isnan" => IsNaN,
            "ldexp" => LdExp,
            "length" => Length,
            "lerp" => Lerp,
            "lit" => Lit,
            "log" => Log,
            "log10" => Log10,
            "log2" => Log2,
            "mad" => MAD,
            "max" => Max,
            "min" => Min,
            "modf" => ModF,
            "msad4" => MSAD4,
            "mul" => Mul,
            "noise" => Noise,
            "normalize" => Normalize,
            "pow" => Pow,
            "printf" => PrintF,
            "Process2DQuadTessFactorsAvg" => Process2DQuadTessFactorsAvg,
            "Process2DQuadTessFactorsMax" => Process2DQuadTessFactorsMax,
            "Process2DQuadTessFactorsMin" => Process2DQuadTessFactorsMin,
            "ProcessIsolineTessFactors" => ProcessIsolineTessFactors,
            "ProcessQuadTessFactorsAvg" => ProcessQuadTessFactorsAvg,
            "ProcessQuadTessFactorsMax" => ProcessQuadTessFactorsMax,
            "ProcessQuadTessFactorsMin" => ProcessQuadTessFactorsMin,
            "ProcessTriTessFactorsAvg" => ProcessTriTessFactorsAvg,
            "ProcessTriTessFactorsMax" => ProcessTriTessFactorsMax,
            "ProcessTriTessFactorsMin" => ProcessTriTessFactorsMin,
            "radians" => Radians,
            "rcp" => Rcp,
            "reflect" => Reflect,
            "refract" => Refract,
            "reversebits" => ReverseBits,
            "round" => Round,
            "rsqrt" => RSqrt,
            "saturate" => Saturate,
            "sign" => Sign,
            "sin" => Sin,
            "sincos" => SinCos,
            "sinh" => SinH,
            "smoothstep" => SmoothStep,
            "sqrt" => Sqrt,
            "step" => Step,
            "tan" => Tan,
            "tanh" => TanH,
            // tex*(sampler, coord) samples; the 4-argument forms add
            // explicit gradients
            "tex1D" => {
                if num_args == 4 {
                    Tex1D_2
                } else {
                    Tex1D
                }
            }
            "tex1Dbias" => Tex1DBias,
            "tex1Dgrad" => Tex1DGrad,
            "tex1Dlod" => Tex1DLod,
            "tex1Dproj" => Tex1DProj,
            "tex2D" => {
                if num_args == 4 {
                    Tex2D_2
                } else {
                    Tex2D
                }
            }
            "tex2Dbias" => Tex2DBias,
            "tex2Dgrad" => Tex2DGrad,
            "tex2Dlod" => Tex2DLod,
            "tex2Dproj" => Tex2DProj,
            "tex3D" => {
                if num_args == 4 {
                    Tex3D_2
                } else {
                    Tex3D
                }
            }
            "tex3Dbias" => Tex3DBias,
            "tex3Dgrad" => Tex3DGrad,
            "tex3Dlod" => Tex3DLod,
            "tex3Dproj" => Tex3DProj,
            "texCUBE" => {
                if num_args == 4 {
                    TexCube_2
                } else {
                    TexCube
                }
            }
            "texCUBEbias" => TexCubeBias,
            "texCUBEgrad" => TexCubeGrad,
            "texCUBElod" => TexCubeLod,
            "texCUBEproj" => TexCubeProj,
            "transpose" => Transpose,
            "trunc" => Trunc,
            _ => return None,
        };
        Some(intrinsic)
    }

    /// True for the legacy `tex*` sampling family
    pub fn is_texture_fetch(&self) -> bool {
        use Intrinsic::*;
        matches!(
            self,
            Tex1D | Tex1D_2
                | Tex1DBias
                | Tex1DGrad
                | Tex1DLod
                | Tex1DProj
                | Tex2D
                | Tex2D_2
                | Tex2DBias
                | Tex2DGrad
                | Tex2DLod
                | Tex2DProj
                | Tex3D
                | Tex3D_2
                | Tex3DBias
                | Tex3DGrad
                | Tex3DLod
                | Tex3DProj
                | TexCube
                | TexCube_2
                | TexCubeBias
                | TexCubeGrad
                | TexCubeLod
                | TexCubeProj
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_plain() {
        assert_eq!(Intrinsic::lookup("dot", 2), Some(Intrinsic::Dot));
        assert_eq!(Intrinsic::lookup("lerp", 3), Some(Intrinsic::Lerp));
        assert_eq!(
            Intrinsic::lookup("GroupMemoryBarrier", 0),
            Some(Intrinsic::GroupMemoryBarrier)
        );
        assert_eq!(Intrinsic::lookup("not_a_builtin", 1), None);
    }

    #[test]
    fn test_lookup_disambiguates_by_arity() {
        assert_eq!(Intrinsic::lookup("asuint", 1), Some(Intrinsic::AsUInt));
        assert_eq!(Intrinsic::lookup("asuint", 3), Some(Intrinsic::AsUInt_2));
        assert_eq!(Intrinsic::lookup("tex2D", 2), Some(Intrinsic::Tex2D));
        assert_eq!(Intrinsic::lookup("tex2D", 4), Some(Intrinsic::Tex2D_2));
        assert_eq!(Intrinsic::lookup("texCUBE", 2), Some(Intrinsic::TexCube));
        assert_eq!(Intrinsic::lookup("texCUBE", 4), Some(Intrinsic::TexCube_2));
    }

    #[test]
    fn test_alternative_signatures_share_ident() {
        assert_eq!(Intrinsic::AsUInt.ident(), Intrinsic::AsUInt_2.ident());
        assert_eq!(Intrinsic::Tex1D.ident(), Intrinsic::Tex1D_2.ident());
    }

    #[test]
    fn test_texture_fetch_family() {
        assert!(Intrinsic::Tex2D.is_texture_fetch());
        assert!(Intrinsic::TexCubeLod.is_texture_fetch());
        assert!(!Intrinsic::Dot.is_texture_fetch());
        assert!(!Intrinsic::Undefined.is_texture_fetch());
    }
}
