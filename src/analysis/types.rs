//! Structural types for semantic analysis
//!
//! A `TypeDenoter` describes the type of an expression or declaration.
//! Struct types reference the analyzed module's struct registry by index,
//! so the type graph carries no owning links even when structs nest.

use std::fmt;

use crate::ast::{DataType, TextureDim};

/// Index into the analyzed module's struct registry
pub type StructRef = usize;

/// The structural type attached to expressions and declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDenoter {
    Void,
    /// Scalar, vector, or matrix type
    Base(DataType),
    /// Buffer resource, identified by its declaration name
    Buffer { ident: String },
    /// Sampler state object
    Sampler,
    /// Texture object of the given dimensionality
    Texture { dim: TextureDim },
    /// Struct type; equality follows the registry index
    Struct { ident: String, index: StructRef },
    /// Type alias; the target is resolved at construction (aliases are
    /// acyclic), the name is kept for diagnostics
    Alias {
        ident: String,
        target: Box<TypeDenoter>,
    },
    /// Array type with its dimensions, outermost first
    Array {
        inner: Box<TypeDenoter>,
        dims: Vec<u32>,
    },
    /// Function type, used for overload diagnostics
    Function {
        params: Vec<TypeDenoter>,
        ret: Box<TypeDenoter>,
    },
}

/// Conversion rank of a scalar type; higher rank means more precision.
/// `Int` and `UInt` share a rank: mixing them converts, it never
/// makes a call ambiguous.
pub fn scalar_rank(ty: DataType) -> Option<u32> {
    match ty {
        DataType::Bool => Some(0),
        DataType::Int | DataType::UInt => Some(1),
        DataType::Half => Some(2),
        DataType::Float => Some(3),
        DataType::Double => Some(4),
        _ => None,
    }
}

/// The base type a mixed binary expression evaluates in: the scalar with
/// the higher conversion rank; a signed/unsigned tie promotes to `UInt`.
pub fn common_scalar(a: DataType, b: DataType) -> Option<DataType> {
    let (ra, rb) = (scalar_rank(a)?, scalar_rank(b)?);
    if a == b {
        return Some(a);
    }
    if ra == rb {
        // Int vs UInt
        return Some(DataType::UInt);
    }
    Some(if ra > rb { a } else { b })
}

/// The data type a binary arithmetic expression over `a` and `b` yields:
/// dimensions must agree or one side must be a scalar (broadcast), and
/// the base follows `common_scalar`.
pub fn common_data_type(a: DataType, b: DataType) -> Option<DataType> {
    use crate::ast::matrix_data_type;

    let base = common_scalar(a.base_data_type(), b.base_data_type())?;
    let (ar, ac) = a.matrix_dim();
    let (br, bc) = b.matrix_dim();

    if (ar, ac) == (br, bc) {
        return Some(matrix_data_type(base, ar, ac)).filter(|t| *t != DataType::Undefined);
    }
    if a.is_scalar() {
        return Some(matrix_data_type(base, br, bc)).filter(|t| *t != DataType::Undefined);
    }
    if b.is_scalar() {
        return Some(matrix_data_type(base, ar, ac)).filter(|t| *t != DataType::Undefined);
    }
    // dimension mismatch between two non-scalars
    None
}

impl TypeDenoter {
    /// Resolve through type aliases to the underlying denoter
    pub fn peel_alias(&self) -> &TypeDenoter {
        let mut current = self;
        while let TypeDenoter::Alias { target, .. } = current {
            current = target;
        }
        current
    }

    /// The base data type if this denotes a scalar/vector/matrix
    pub fn base_type(&self) -> Option<DataType> {
        match self.peel_alias() {
            TypeDenoter::Base(t) => Some(*t),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self.peel_alias(), TypeDenoter::Void)
    }

    /// True if this denotes a scalar boolean
    pub fn is_bool(&self) -> bool {
        self.base_type() == Some(DataType::Bool)
    }

    /// Structural equality modulo type aliases
    pub fn is_equal(&self, other: &TypeDenoter) -> bool {
        let (a, b) = (self.peel_alias(), other.peel_alias());
        match (a, b) {
            (TypeDenoter::Array { inner: ia, dims: da }, TypeDenoter::Array { inner: ib, dims: db }) => {
                da == db && ia.is_equal(ib)
            }
            (
                TypeDenoter::Function { params: pa, ret: ra },
                TypeDenoter::Function { params: pb, ret: rb },
            ) => {
                pa.len() == pb.len()
                    && pa.iter().zip(pb).all(|(x, y)| x.is_equal(y))
                    && ra.is_equal(rb)
            }
            (TypeDenoter::Struct { index: ia, .. }, TypeDenoter::Struct { index: ib, .. }) => {
                ia == ib
            }
            _ => a == b,
        }
    }

    /// True if a value of this type implicitly converts to `other`:
    /// scalars interconvert across the six scalar types (bool becomes 0
    /// or 1, narrowing is allowed), scalars broadcast to vectors and
    /// matrices, and same-shaped vectors/matrices convert when their
    /// bases do. Everything else requires equality.
    pub fn is_castable_to(&self, other: &TypeDenoter) -> bool {
        if self.is_equal(other) {
            return true;
        }
        let (from, to) = (self.peel_alias(), other.peel_alias());
        match (from, to) {
            (TypeDenoter::Base(a), TypeDenoter::Base(b)) => {
                if scalar_rank(a.base_data_type()).is_none()
                    || scalar_rank(b.base_data_type()).is_none()
                {
                    return false;
                }
                if a.is_scalar() {
                    // scalar to scalar, or broadcast to vector/matrix
                    return true;
                }
                if a.is_vector() && b.is_vector() {
                    return a.vector_dim() == b.vector_dim();
                }
                if a.is_matrix() && b.is_matrix() {
                    return a.matrix_dim() == b.matrix_dim();
                }
                false
            }
            _ => false,
        }
    }
}

impl fmt::Display for TypeDenoter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDenoter::Void => write!(f, "void"),
            TypeDenoter::Base(t) => write!(f, "{}", t),
            TypeDenoter::Buffer { ident } => write!(f, "buffer '{}'", ident),
            TypeDenoter::Sampler => write!(f, "sampler"),
            TypeDenoter::Texture { dim } => {
                let name = match dim {
                    TextureDim::Tex1D => "Texture1D",
                    TextureDim::Tex2D => "Texture2D",
                    TextureDim::Tex3D => "Texture3D",
                    TextureDim::Cube => "TextureCube",
                };
                write!(f, "{}", name)
            }
            TypeDenoter::Struct { ident, .. } => write!(f, "struct {}", ident),
            TypeDenoter::Alias { ident, .. } => write!(f, "{}", ident),
            TypeDenoter::Array { inner, dims } => {
                write!(f, "{}", inner)?;
                for dim in dims {
                    write!(f, "[{}]", dim)?;
                }
                Ok(())
            }
            TypeDenoter::Function { params, ret } => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") -> {}", ret)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use DataType::*;

    fn base(t: DataType) -> TypeDenoter {
        TypeDenoter::Base(t)
    }

    fn alias(name: &str, target: TypeDenoter) -> TypeDenoter {
        TypeDenoter::Alias {
            ident: name.to_string(),
            target: Box::new(target),
        }
    }

    #[test]
    fn test_equality_modulo_aliases() {
        let color = alias("color4", base(Float4));
        assert!(color.is_equal(&base(Float4)));
        assert!(base(Float4).is_equal(&color));
        assert!(!color.is_equal(&base(Float3)));

        let nested = alias("rgba", color.clone());
        assert!(nested.is_equal(&base(Float4)));
    }

    #[test]
    fn test_struct_equality_is_by_index() {
        let a = TypeDenoter::Struct {
            ident: "Light".to_string(),
            index: 0,
        };
        let b = TypeDenoter::Struct {
            ident: "Light".to_string(),
            index: 1,
        };
        assert!(!a.is_equal(&b));
        assert!(a.is_equal(&a.clone()));
    }

    #[test]
    fn test_scalar_conversions() {
        assert!(base(Int).is_castable_to(&base(Float)));
        assert!(base(Float).is_castable_to(&base(Int))); // narrowing allowed
        assert!(base(Bool).is_castable_to(&base(UInt)));
        assert!(base(Double).is_castable_to(&base(Half)));
        assert!(!base(String).is_castable_to(&base(Float)));
        assert!(!base(Float).is_castable_to(&base(String)));
    }

    #[test]
    fn test_broadcast_and_vector_conversions() {
        assert!(base(Float).is_castable_to(&base(Float3)));
        assert!(base(Int).is_castable_to(&base(Float4x4)));
        assert!(base(Int3).is_castable_to(&base(Float3)));
        assert!(!base(Int3).is_castable_to(&base(Float4)));
        assert!(!base(Float3).is_castable_to(&base(Float))); // no implicit truncation
        assert!(base(Float2x2).is_castable_to(&base(Int2x2)));
        assert!(!base(Float2x2).is_castable_to(&base(Int3x3)));
    }

    #[test]
    fn test_non_value_types_require_equality() {
        assert!(TypeDenoter::Sampler.is_castable_to(&TypeDenoter::Sampler));
        assert!(!TypeDenoter::Sampler.is_castable_to(&base(Float)));
        let tex = TypeDenoter::Texture {
            dim: TextureDim::Tex2D,
        };
        assert!(tex.is_castable_to(&tex.clone()));
        assert!(!tex.is_castable_to(&TypeDenoter::Texture {
            dim: TextureDim::Tex3D
        }));
        assert!(!TypeDenoter::Void.is_castable_to(&base(Float)));
    }

    #[test]
    fn test_scalar_rank_ordering() {
        assert!(scalar_rank(Bool) < scalar_rank(Int));
        assert_eq!(scalar_rank(Int), scalar_rank(UInt));
        assert!(scalar_rank(UInt) < scalar_rank(Half));
        assert!(scalar_rank(Half) < scalar_rank(Float));
        assert!(scalar_rank(Float) < scalar_rank(Double));
        assert_eq!(scalar_rank(Float3), None);
    }

    #[test]
    fn test_common_data_type() {
        assert_eq!(common_data_type(Int, Float), Some(Float));
        assert_eq!(common_data_type(Int, UInt), Some(UInt));
        assert_eq!(common_data_type(Float3, Float), Some(Float3));
        assert_eq!(common_data_type(Int, Float3), Some(Float3));
        assert_eq!(common_data_type(Int3, Float3), Some(Float3));
        assert_eq!(common_data_type(Float2x2, Float), Some(Float2x2));
        assert_eq!(common_data_type(Float3, Float4), None);
        assert_eq!(common_data_type(Float, String), None);
    }

    #[test]
    fn test_array_equality() {
        let a = TypeDenoter::Array {
            inner: Box::new(base(Float4)),
            dims: vec![16],
        };
        let b = TypeDenoter::Array {
            inner: Box::new(alias("color4", base(Float4))),
            dims: vec![16],
        };
        assert!(a.is_equal(&b));
        let c = TypeDenoter::Array {
            inner: Box::new(base(Float4)),
            dims: vec![8],
        };
        assert!(!a.is_equal(&c));
    }
}
