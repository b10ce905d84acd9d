//! Resolved type printing.

use pretty::{Arena, DocAllocator, DocBuilder};

use wren_identity::PrimitiveType;
use wren_sema::TypeKind;

use super::Names;

/// Native spelling of a builtin primitive
pub(crate) fn primitive_name(prim: PrimitiveType) -> &'static str {
    match prim {
        PrimitiveType::I8 => "std::int8_t",
        PrimitiveType::I16 => "std::int16_t",
        PrimitiveType::I32 => "std::int32_t",
        PrimitiveType::I64 => "std::int64_t",
        PrimitiveType::U8 => "std::uint8_t",
        PrimitiveType::U16 => "std::uint16_t",
        PrimitiveType::U32 => "std::uint32_t",
        PrimitiveType::U64 => "std::uint64_t",
        PrimitiveType::Int => "std::ptrdiff_t",
        PrimitiveType::Uint => "std::size_t",
        PrimitiveType::Uintptr => "std::uintptr_t",
        PrimitiveType::F32 => "float",
        PrimitiveType::F64 => "double",
        PrimitiveType::Bool => "bool",
        PrimitiveType::Str => "std::string",
        PrimitiveType::Any => "std::any",
    }
}

/// Print a closed type (e.g. `std::vector<Pair_1*>`).
pub(crate) fn print_type<'a>(arena: &'a Arena<'a>, kind: &TypeKind, names: &Names) -> DocBuilder<'a, Arena<'a>> {
    match kind {
        TypeKind::Prim(prim) => arena.text(primitive_name(*prim)),
        TypeKind::Struct(ins) => arena.text(names.name(ins).to_string()),
        TypeKind::Native(ins, args) if args.is_empty() => arena.text(names.name(ins).to_string()),
        // One declaration serves every use site, so the arguments travel with the use
        TypeKind::Native(ins, args) => arena
            .text(names.name(ins).to_string())
            .append(arena.text("<"))
            .append(arena.intersperse(args.iter().map(|arg| print_type(arena, arg, names)), arena.text(", ")))
            .append(arena.text(">")),
        TypeKind::Ptr(inner) => print_type(arena, inner, names).append(arena.text("*")),
        TypeKind::Ref(inner) => print_type(arena, inner, names).append(arena.text("&")),
        TypeKind::Slice(inner) => arena
            .text("std::vector<")
            .append(print_type(arena, inner, names))
            .append(arena.text(">")),
        // Only native fields mention opaque parameters, and those are never emitted
        TypeKind::Opaque(name) => panic!("opaque type parameter '{name}' reached the emitter"),
        TypeKind::Invalid => panic!("unresolved type reached the emitter"),
    }
}
