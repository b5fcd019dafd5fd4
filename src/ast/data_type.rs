//! The HLSL data type grid
//!
//! Scalar, vector, and matrix types over bool/int/uint/half/float/double,
//! with the dimensional queries and swizzle typing used by the analyzer.

use std::fmt;
use thiserror::Error;

/// Base data type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Undefined,

    // String type
    String,

    // Scalar types
    Bool,
    Int,
    UInt,
    Half,
    Float,
    Double,

    // Vector types
    Bool2,
    Bool3,
    Bool4,
    Int2,
    Int3,
    Int4,
    UInt2,
    UInt3,
    UInt4,
    Half2,
    Half3,
    Half4,
    Float2,
    Float3,
    Float4,
    Double2,
    Double3,
    Double4,

    // Matrix types
    Bool2x2,
    Bool2x3,
    Bool2x4,
    Bool3x2,
    Bool3x3,
    Bool3x4,
    Bool4x2,
    Bool4x3,
    Bool4x4,
    Int2x2,
    Int2x3,
    Int2x4,
    Int3x2,
    Int3x3,
    Int3x4,
    Int4x2,
    Int4x3,
    Int4x4,
    UInt2x2,
    UInt2x3,
    UInt2x4,
    UInt3x2,
    UInt3x3,
    UInt3x4,
    UInt4x2,
    UInt4x3,
    UInt4x4,
    Half2x2,
    Half2x3,
    Half2x4,
    Half3x2,
    Half3x3,
    Half3x4,
    Half4x2,
    Half4x3,
    Half4x4,
    Float2x2,
    Float2x3,
    Float2x4,
    Float3x2,
    Float3x3,
    Float3x4,
    Float4x2,
    Float4x3,
    Float4x4,
    Double2x2,
    Double2x3,
    Double2x4,
    Double3x2,
    Double3x3,
    Double3x4,
    Double4x2,
    Double4x3,
    Double4x4,
}

/// Error for an invalid vector subscript (swizzle)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwizzleError {
    #[error("empty vector subscript")]
    Empty,
    #[error("vector subscript '{0}' has too many components (max. 4)")]
    TooLong(String),
    #[error("vector subscript '{0}' mixes component families")]
    MixedFamilies(String),
    #[error("invalid character '{ch}' in vector subscript '{subscript}'")]
    InvalidChar { subscript: String, ch: char },
    #[error("vector subscript '{subscript}' exceeds dimension of type '{ty}'")]
    OutOfRange { subscript: String, ty: String },
    #[error("type '{0}' has no vector subscript")]
    NotSubscriptable(String),
}

impl DataType {
    /// Split a numeric type into its scalar base and (rows, cols).
    /// Scalars are `(1, 1)`, vectors `(N, 1)`, matrices `(M, N)`.
    /// Returns `None` for `Undefined` and `String`.
    fn decompose(&self) -> Option<(DataType, u32, u32)> {
        use DataType::*;
        let parts = match self {
            Bool => (Bool, 1, 1),
            Int => (Int, 1, 1),
            UInt => (UInt, 1, 1),
            Half => (Half, 1, 1),
            Float => (Float, 1, 1),
            Double => (Double, 1, 1),

            Bool2 => (Bool, 2, 1),
            Bool3 => (Bool, 3, 1),
            Bool4 => (Bool, 4, 1),
            Int2 => (Int, 2, 1),
            Int3 => (Int, 3, 1),
            Int4 => (Int, 4, 1),
            UInt2 => (UInt, 2, 1),
            UInt3 => (UInt, 3, 1),
            UInt4 => (UInt, 4, 1),
            Half2 => (Half, 2, 1),
            Half3 => (Half, 3, 1),
            Half4 => (Half, 4, 1),
            Float2 => (Float, 2, 1),
            Float3 => (Float, 3, 1),
            Float4 => (Float, 4, 1),
            Double2 => (Double, 2, 1),
            Double3 => (Double, 3, 1),
            Double4 => (Double, 4, 1),

            Bool2x2 => (Bool, 2, 2),
            Bool2x3 => (Bool, 2, 3),
            Bool2x4 => (Bool, 2, 4),
            Bool3x2 => (Bool, 3, 2),
            Bool3x3 => (Bool, 3, 3),
            Bool3x4 => (Bool, 3, 4),
            Bool4x2 => (Bool, 4, 2),
            Bool4x3 => (Bool, 4, 3),
            Bool4x4 => (Bool, 4, 4),
            Int2x2 => (Int, 2, 2),
            Int2x3 => (Int, 2, 3),
            Int2x4 => (Int, 2, 4),
            Int3x2 => (Int, 3, 2),
            Int3x3 => (Int, 3, 3),
            Int3x4 => (Int, 3, 4),
            Int4x2 => (Int, 4, 2),
            Int4x3 => (Int, 4, 3),
            Int4x4 => (Int, 4, 4),
            UInt2x2 => (UInt, 2, 2),
            UInt2x3 => (UInt, 2, 3),
            UInt2x4 => (UInt, 2, 4),
            UInt3x2 => (UInt, 3, 2),
            UInt3x3 => (UInt, 3, 3),
            UInt3x4 => (UInt, 3, 4),
            UInt4x2 => (UInt, 4, 2),
            UInt4x3 => (UInt, 4, 3),
            UInt4x4 => (UInt, 4, 4),
            Half2x2 => (Half, 2, 2),
            Half2x3 => (Half, 2, 3),
            Half2x4 => (Half, 2, 4),
            Half3x2 => (Half, 3, 2),
            Half3x3 => (Half, 3, 3),
            Half3x4 => (Half, 3, 4),
            Half4x2 => (Half, 4, 2),
            Half4x3 => (Half, 4, 3),
            Half4x4 => (Half, 4, 4),
            Float2x2 => (Float, 2, 2),
            Float2x3 => (Float, 2, 3),
            Float2x4 => (Float, 2, 4),
            Float3x2 => (Float, 3, 2),
            Float3x3 => (Float, 3, 3),
            Float3x4 => (Float, 3, 4),
            Float4x2 => (Float, 4, 2),
            Float4x3 => (Float, 4, 3),
            Float4x4 => (Float, 4, 4),
            Double2x2 => (Double, 2, 2),
            Double2x3 => (Double, 2, 3),
            Double2x4 => (Double, 2, 4),
            Double3x2 => (Double, 3, 2),
            Double3x3 => (Double, 3, 3),
            Double3x4 => (Double, 3, 4),
            Double4x2 => (Double, 4, 2),
            Double4x3 => (Double, 4, 3),
            Double4x4 => (Double, 4, 4),

            Undefined | String => return None,
        };
        Some(parts)
    }

    /// True if this is one of the six scalar types
    pub fn is_scalar(&self) -> bool {
        matches!(self.decompose(), Some((_, 1, 1)))
    }

    /// True if this is a vector type
    pub fn is_vector(&self) -> bool {
        matches!(self.decompose(), Some((_, rows, 1)) if rows > 1)
    }

    /// True if this is a matrix type
    pub fn is_matrix(&self) -> bool {
        matches!(self.decompose(), Some((_, _, cols)) if cols > 1)
    }

    /// The dimension of this type interpreted as a vector: 1 for scalars,
    /// N for vectors, 0 for matrices and non-numeric types.
    pub fn vector_dim(&self) -> u32 {
        match self.decompose() {
            Some((_, rows, 1)) => rows,
            _ => 0,
        }
    }

    /// The dimensions MxN of this type interpreted as a matrix:
    /// `(1,1)` for scalars, `(N,1)` for vectors, `(M,N)` for matrices
    /// (row-major spelling: `float2x3` has 2 rows and 3 columns),
    /// `(0,0)` for non-numeric types.
    pub fn matrix_dim(&self) -> (u32, u32) {
        match self.decompose() {
            Some((_, rows, cols)) => (rows, cols),
            None => (0, 0),
        }
    }

    /// The scalar element type, or `Undefined` if inapplicable
    pub fn base_data_type(&self) -> DataType {
        match self.decompose() {
            Some((base, _, _)) => base,
            None => DataType::Undefined,
        }
    }

    /// The HLSL spelling of the scalar base, e.g. `"float"`
    fn base_name(&self) -> &'static str {
        match self {
            DataType::Bool => "bool",
            DataType::Int => "int",
            DataType::UInt => "uint",
            DataType::Half => "half",
            DataType::Float => "float",
            DataType::Double => "double",
            _ => "<undefined>",
        }
    }

    /// Descriptive HLSL type string: `float4`, `float4x4`, or with
    /// template syntax `vector<float,4>`, `matrix<float,4,4>`.
    pub fn to_type_string(&self, use_template_syntax: bool) -> String {
        match self.decompose() {
            None => match self {
                DataType::String => "string".to_string(),
                _ => "<undefined>".to_string(),
            },
            Some((base, 1, 1)) => base.base_name().to_string(),
            Some((base, rows, 1)) => {
                if use_template_syntax {
                    format!("vector<{},{}>", base.base_name(), rows)
                } else {
                    format!("{}{}", base.base_name(), rows)
                }
            }
            Some((base, rows, cols)) => {
                if use_template_syntax {
                    format!("matrix<{},{},{}>", base.base_name(), rows, cols)
                } else {
                    format!("{}{}x{}", base.base_name(), rows, cols)
                }
            }
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_type_string(false))
    }
}

/// Construct the vector type for the given scalar base and size.
/// A size of 1 yields the scalar itself; anything else than a scalar
/// base or a size in 1..=4 yields `Undefined`.
pub fn vector_data_type(base: DataType, size: u32) -> DataType {
    use DataType::*;
    match (base, size) {
        (b, 1) if b.is_scalar() => b,
        (Bool, 2) => Bool2,
        (Bool, 3) => Bool3,
        (Bool, 4) => Bool4,
        (Int, 2) => Int2,
        (Int, 3) => Int3,
        (Int, 4) => Int4,
        (UInt, 2) => UInt2,
        (UInt, 3) => UInt3,
        (UInt, 4) => UInt4,
        (Half, 2) => Half2,
        (Half, 3) => Half3,
        (Half, 4) => Half4,
        (Float, 2) => Float2,
        (Float, 3) => Float3,
        (Float, 4) => Float4,
        (Double, 2) => Double2,
        (Double, 3) => Double3,
        (Double, 4) => Double4,
        _ => Undefined,
    }
}

/// Construct the matrix type for the given scalar base and dimensions.
/// Degenerate dimensions collapse: `(1,1)` is the scalar, `(N,1)` and
/// `(1,N)` are vectors. Invalid input yields `Undefined`.
pub fn matrix_data_type(base: DataType, rows: u32, cols: u32) -> DataType {
    use DataType::*;
    if !base.is_scalar() {
        return Undefined;
    }
    match (rows, cols) {
        (1, 1) => base,
        (n, 1) => vector_data_type(base, n),
        (1, n) => vector_data_type(base, n),
        (r, c) if (2..=4).contains(&r) && (2..=4).contains(&c) => {
            let matrices = match base {
                Bool => [
                    Bool2x2, Bool2x3, Bool2x4, Bool3x2, Bool3x3, Bool3x4, Bool4x2, Bool4x3,
                    Bool4x4,
                ],
                Int => [
                    Int2x2, Int2x3, Int2x4, Int3x2, Int3x3, Int3x4, Int4x2, Int4x3, Int4x4,
                ],
                UInt => [
                    UInt2x2, UInt2x3, UInt2x4, UInt3x2, UInt3x3, UInt3x4, UInt4x2, UInt4x3,
                    UInt4x4,
                ],
                Half => [
                    Half2x2, Half2x3, Half2x4, Half3x2, Half3x3, Half3x4, Half4x2, Half4x3,
                    Half4x4,
                ],
                Float => [
                    Float2x2, Float2x3, Float2x4, Float3x2, Float3x3, Float3x4, Float4x2,
                    Float4x3, Float4x4,
                ],
                Double => [
                    Double2x2, Double2x3, Double2x4, Double3x2, Double3x3, Double3x4, Double4x2,
                    Double4x3, Double4x4,
                ],
                _ => return Undefined,
            };
            matrices[((r - 2) * 3 + (c - 2)) as usize]
        }
        _ => Undefined,
    }
}

/// The component families a swizzle may use: one of `xyzw`, `rgba`, `stpq`
fn swizzle_component(ch: char) -> Option<(usize, u32)> {
    let family = ["xyzw", "rgba", "stpq"];
    for (fam, letters) in family.iter().enumerate() {
        if let Some(index) = letters.find(ch) {
            return Some((fam, index as u32));
        }
    }
    None
}

/// The data type a swizzle subscript yields on the given type.
/// `Float4.xyz` is `Float3`, `Float4.x` is `Float`. Fails on mixed
/// component families, empty or over-long subscripts, and components
/// beyond the source dimension.
pub fn vector_subscript_data_type(ty: DataType, subscript: &str) -> Result<DataType, SwizzleError> {
    let base = ty.base_data_type();
    if base == DataType::Undefined || ty.is_matrix() {
        return Err(SwizzleError::NotSubscriptable(ty.to_string()));
    }

    if subscript.is_empty() {
        return Err(SwizzleError::Empty);
    }
    let len = subscript.chars().count();
    if len > 4 {
        return Err(SwizzleError::TooLong(subscript.to_string()));
    }

    let dim = ty.vector_dim();
    let mut family = None;
    for ch in subscript.chars() {
        let (fam, index) = swizzle_component(ch).ok_or_else(|| SwizzleError::InvalidChar {
            subscript: subscript.to_string(),
            ch,
        })?;
        match family {
            None => family = Some(fam),
            Some(f) if f != fam => {
                return Err(SwizzleError::MixedFamilies(subscript.to_string()));
            }
            _ => {}
        }
        if index >= dim {
            return Err(SwizzleError::OutOfRange {
                subscript: subscript.to_string(),
                ty: ty.to_string(),
            });
        }
    }

    Ok(vector_data_type(base, len as u32))
}

/// Parse an HLSL type name (`float`, `float4`, `float4x4`, `string`)
/// into a data type. Returns `None` for unknown names.
pub fn from_type_name(name: &str) -> Option<DataType> {
    if name == "string" {
        return Some(DataType::String);
    }

    let scalars = [
        ("bool", DataType::Bool),
        ("int", DataType::Int),
        ("uint", DataType::UInt),
        ("dword", DataType::UInt),
        ("half", DataType::Half),
        ("float", DataType::Float),
        ("double", DataType::Double),
    ];

    for (prefix, base) in scalars {
        if let Some(suffix) = name.strip_prefix(prefix) {
            if suffix.is_empty() {
                return Some(base);
            }
            let digits: Vec<u32> = suffix
                .split('x')
                .map(|d| d.parse::<u32>().ok().filter(|n| (1..=4).contains(n)))
                .collect::<Option<_>>()?;
            return match digits[..] {
                [n] => Some(vector_data_type(base, n)).filter(|t| *t != DataType::Undefined),
                [r, c] => Some(matrix_data_type(base, r, c)).filter(|t| *t != DataType::Undefined),
                _ => None,
            };
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use DataType::*;

    const SCALARS: [DataType; 6] = [Bool, Int, UInt, Half, Float, Double];

    #[test]
    fn test_predicates_are_mutually_exclusive() {
        let samples = [
            Undefined, String, Bool, UInt, Float, Double, Int3, Half4, Float2, Bool2x2, Float2x3,
            Double4x4,
        ];
        for t in samples {
            let count = [t.is_scalar(), t.is_vector(), t.is_matrix()]
                .iter()
                .filter(|b| **b)
                .count();
            if t == Undefined || t == String {
                assert_eq!(count, 0, "{t:?}");
            } else {
                assert_eq!(count, 1, "{t:?}");
            }
        }
    }

    #[test]
    fn test_vector_construction_round_trip() {
        for base in SCALARS {
            for n in 1..=4 {
                let v = vector_data_type(base, n);
                assert_eq!(v.base_data_type(), base);
                assert_eq!(v.vector_dim(), n);
            }
        }
    }

    #[test]
    fn test_vector_dim() {
        assert_eq!(Float.vector_dim(), 1);
        assert_eq!(Float3.vector_dim(), 3);
        assert_eq!(Int4.vector_dim(), 4);
        // matrices report 0, not a silent coercion
        assert_eq!(Float4x4.vector_dim(), 0);
        assert_eq!(Undefined.vector_dim(), 0);
        assert_eq!(String.vector_dim(), 0);
    }

    #[test]
    fn test_matrix_dim_is_row_major() {
        assert_eq!(Float2x3.matrix_dim(), (2, 3));
        assert_eq!(Double4x2.matrix_dim(), (4, 2));
        assert_eq!(Float.matrix_dim(), (1, 1));
        assert_eq!(Float3.matrix_dim(), (3, 1));
        assert_eq!(String.matrix_dim(), (0, 0));
    }

    #[test]
    fn test_matrix_dim_matches_spelling() {
        for base in SCALARS {
            for rows in 2..=4 {
                for cols in 2..=4 {
                    let m = matrix_data_type(base, rows, cols);
                    assert_eq!(m.matrix_dim(), (rows, cols));
                    assert_eq!(
                        m.to_string(),
                        format!("{}{}x{}", base.to_string(), rows, cols)
                    );
                }
            }
        }
    }

    #[test]
    fn test_matrix_degenerate_dimensions() {
        assert_eq!(matrix_data_type(Float, 1, 1), Float);
        assert_eq!(matrix_data_type(Float, 3, 1), Float3);
        assert_eq!(matrix_data_type(Float, 1, 3), Float3);
        assert_eq!(matrix_data_type(Float, 5, 2), Undefined);
        assert_eq!(matrix_data_type(Float3, 2, 2), Undefined);
    }

    #[test]
    fn test_type_strings() {
        assert_eq!(Float4.to_type_string(false), "float4");
        assert_eq!(Float4.to_type_string(true), "vector<float,4>");
        assert_eq!(Float4x4.to_type_string(false), "float4x4");
        assert_eq!(Float4x4.to_type_string(true), "matrix<float,4,4>");
        assert_eq!(UInt.to_type_string(false), "uint");
        assert_eq!(String.to_type_string(false), "string");
    }

    #[test]
    fn test_from_type_name() {
        assert_eq!(from_type_name("float"), Some(Float));
        assert_eq!(from_type_name("float3"), Some(Float3));
        assert_eq!(from_type_name("float1"), Some(Float));
        assert_eq!(from_type_name("float4x4"), Some(Float4x4));
        assert_eq!(from_type_name("float2x3"), Some(Float2x3));
        assert_eq!(from_type_name("uint2"), Some(UInt2));
        assert_eq!(from_type_name("dword"), Some(UInt));
        assert_eq!(from_type_name("half3"), Some(Half3));
        assert_eq!(from_type_name("string"), Some(String));
        assert_eq!(from_type_name("float5"), None);
        assert_eq!(from_type_name("quux"), None);
        assert_eq!(from_type_name("float4x"), None);
    }

    #[test]
    fn test_swizzle_typing() {
        assert_eq!(vector_subscript_data_type(Float4, "xyz"), Ok(Float3));
        assert_eq!(vector_subscript_data_type(Float4, "x"), Ok(Float));
        assert_eq!(vector_subscript_data_type(Float4, "xyzw"), Ok(Float4));
        assert_eq!(vector_subscript_data_type(Float4, "xy"), Ok(Float2));
        assert_eq!(vector_subscript_data_type(Float4, "rgba"), Ok(Float4));
        assert_eq!(vector_subscript_data_type(Int3, "stp"), Ok(Int3));
        // repetition is allowed
        assert_eq!(vector_subscript_data_type(Float2, "xxyy"), Ok(Float4));
        // scalars behave as single-component vectors
        assert_eq!(vector_subscript_data_type(Float, "xx"), Ok(Float2));
    }

    #[test]
    fn test_swizzle_errors() {
        assert!(matches!(
            vector_subscript_data_type(Float4, "xr"),
            Err(SwizzleError::MixedFamilies(_))
        ));
        assert!(matches!(
            vector_subscript_data_type(Float4, "xyzwx"),
            Err(SwizzleError::TooLong(_))
        ));
        assert!(matches!(
            vector_subscript_data_type(Float2, "z"),
            Err(SwizzleError::OutOfRange { .. })
        ));
        assert!(matches!(
            vector_subscript_data_type(Float4, ""),
            Err(SwizzleError::Empty)
        ));
        assert!(matches!(
            vector_subscript_data_type(Float4, "xk"),
            Err(SwizzleError::InvalidChar { .. })
        ));
        assert!(matches!(
            vector_subscript_data_type(Float4x4, "x"),
            Err(SwizzleError::NotSubscriptable(_))
        ));
        assert!(matches!(
            vector_subscript_data_type(String, "x"),
            Err(SwizzleError::NotSubscriptable(_))
        ));
    }
}
