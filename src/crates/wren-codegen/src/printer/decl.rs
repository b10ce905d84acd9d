//! Struct definition printing.

use pretty::{Arena, DocAllocator, DocBuilder};

use wren_sema::{FieldIns, StructIns};

use super::types::print_type;
use super::{Names, print_doc};

/// Print one instance as a struct definition, with its canonical key as a
/// trailing comment.
pub(crate) fn print_struct_def<'a>(
    arena: &'a Arena<'a>,
    ins: &StructIns,
    names: &Names,
    nest: isize,
) -> DocBuilder<'a, Arena<'a>> {
    let header = print_doc(arena, &ins.decl.doc)
        .append(arena.text("struct "))
        .append(arena.text(names.name(ins).to_string()))
        .append(arena.text(" {"));
    let trailer = arena.text(format!("}};  // {}", ins.key));

    if ins.fields().is_empty() {
        return header.append(trailer);
    }

    let fields: Vec<_> = ins
        .fields()
        .iter()
        .map(|f| print_field(arena, f, names))
        .collect();

    header
        .append(arena.hardline().append(arena.intersperse(fields, arena.hardline())).nest(nest))
        .append(arena.hardline())
        .append(trailer)
}

/// Print a field definition.
fn print_field<'a>(arena: &'a Arena<'a>, field: &FieldIns, names: &Names) -> DocBuilder<'a, Arena<'a>> {
    let decl = field.field();
    let mutable = if decl.mutable { arena.text("mutable ") } else { arena.nil() };
    print_doc(arena, &decl.doc)
        .append(mutable)
        .append(print_type(arena, &field.kind, names))
        .append(arena.text(" "))
        .append(arena.text(field.ident().to_string()))
        .append(arena.text(";"))
}
