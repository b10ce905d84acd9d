// primitive_type.rs
//
// Builtin primitive types shared across all compiler crates.

/// Enumeration of the builtin primitive types.
///
/// Primitive names are reserved: no struct, trait or alias may use them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Int,
    Uint,
    Uintptr,
    F32,
    F64,
    Bool,
    Str,
    Any,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 16] = [
        PrimitiveType::I8,
        PrimitiveType::I16,
        PrimitiveType::I32,
        PrimitiveType::I64,
        PrimitiveType::U8,
        PrimitiveType::U16,
        PrimitiveType::U32,
        PrimitiveType::U64,
        PrimitiveType::Int,
        PrimitiveType::Uint,
        PrimitiveType::Uintptr,
        PrimitiveType::F32,
        PrimitiveType::F64,
        PrimitiveType::Bool,
        PrimitiveType::Str,
        PrimitiveType::Any,
    ];

    /// Get the source spelling of this primitive type.
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveType::I8 => "i8",
            PrimitiveType::I16 => "i16",
            PrimitiveType::I32 => "i32",
            PrimitiveType::I64 => "i64",
            PrimitiveType::U8 => "u8",
            PrimitiveType::U16 => "u16",
            PrimitiveType::U32 => "u32",
            PrimitiveType::U64 => "u64",
            PrimitiveType::Int => "int",
            PrimitiveType::Uint => "uint",
            PrimitiveType::Uintptr => "uintptr",
            PrimitiveType::F32 => "f32",
            PrimitiveType::F64 => "f64",
            PrimitiveType::Bool => "bool",
            PrimitiveType::Str => "str",
            PrimitiveType::Any => "any",
        }
    }

    /// Look up a primitive by its source spelling.
    pub fn from_name(name: &str) -> Option<PrimitiveType> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

impl std::fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
