// type_kind.rs
//
// Resolved, closed types and the struct instances they point at.

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId};

use smallvec::SmallVec;
use wren_identity::PrimitiveType;

use crate::decls::{Field, Struct, canonical_name};

/// Type arguments of one instantiation (inline up to four)
pub type TypeKindVec = SmallVec<[TypeKind; 4]>;

/// A fully resolved type. Never mentions an unsubstituted generic parameter.
#[derive(Clone)]
pub enum TypeKind {
    Prim(PrimitiveType),
    /// A canonical struct instance; equality is instance identity
    Struct(Arc<StructIns>),
    /// A use of a native-linked struct: its single identity instance plus
    /// the arguments written at the use site
    Native(Arc<StructIns>, Box<TypeKindVec>),
    Ptr(Box<TypeKind>),
    Ref(Box<TypeKind>),
    Slice(Box<TypeKind>),
    /// Generic parameter of a native-linked struct, left to the native side
    Opaque(String),
    /// A reference that failed to resolve (already reported)
    Invalid,
}

impl TypeKind {
    pub fn is_invalid(&self) -> bool {
        matches!(self, TypeKind::Invalid)
    }

    /// The type of a use of `ins` with `args` written at the use site
    pub fn instance(ins: Arc<StructIns>, args: TypeKindVec) -> Self {
        if ins.is_native() {
            TypeKind::Native(ins, Box::new(args))
        } else {
            TypeKind::Struct(ins)
        }
    }

    pub fn as_struct(&self) -> Option<&Arc<StructIns>> {
        match self {
            TypeKind::Struct(ins) | TypeKind::Native(ins, _) => Some(ins),
            _ => None,
        }
    }

    /// Canonical text used inside instance keys, e.g. `Pair[*Box[int],str]`
    pub fn canonical_text(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for TypeKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeKind::Prim(a), TypeKind::Prim(b)) => a == b,
            (TypeKind::Struct(a), TypeKind::Struct(b)) => Arc::ptr_eq(a, b),
            (TypeKind::Native(a, a_args), TypeKind::Native(b, b_args)) => Arc::ptr_eq(a, b) && a_args == b_args,
            (TypeKind::Ptr(a), TypeKind::Ptr(b))
            | (TypeKind::Ref(a), TypeKind::Ref(b))
            | (TypeKind::Slice(a), TypeKind::Slice(b)) => a == b,
            (TypeKind::Opaque(a), TypeKind::Opaque(b)) => a == b,
            (TypeKind::Invalid, TypeKind::Invalid) => true,
            _ => false,
        }
    }
}

impl Eq for TypeKind {}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Prim(p) => f.write_str(p.as_str()),
            TypeKind::Struct(ins) => f.write_str(&ins.key),
            TypeKind::Native(ins, args) => {
                let args: Vec<String> = args.iter().map(ToString::to_string).collect();
                f.write_str(&canonical_name(&ins.key, &args))
            }
            TypeKind::Ptr(inner) => write!(f, "*{inner}"),
            TypeKind::Ref(inner) => write!(f, "&{inner}"),
            TypeKind::Slice(inner) => write!(f, "[]{inner}"),
            TypeKind::Opaque(name) => f.write_str(name),
            TypeKind::Invalid => f.write_str("{error}"),
        }
    }
}

// Struct instances can reach themselves through pointer fields, so Debug
// prints instances by key only.
impl fmt::Debug for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Prim(p) => write!(f, "Prim({p})"),
            TypeKind::Struct(ins) => write!(f, "Struct({})", ins.key),
            TypeKind::Native(ins, args) => write!(f, "Native({}, {args:?})", ins.key),
            TypeKind::Ptr(inner) => write!(f, "Ptr({inner:?})"),
            TypeKind::Ref(inner) => write!(f, "Ref({inner:?})"),
            TypeKind::Slice(inner) => write!(f, "Slice({inner:?})"),
            TypeKind::Opaque(name) => write!(f, "Opaque({name})"),
            TypeKind::Invalid => f.write_str("Invalid"),
        }
    }
}

/// One field of a concrete instance
#[derive(Debug, Clone)]
pub struct FieldIns {
    decl: Arc<Struct>,
    index: usize,
    pub kind: TypeKind,
}

impl FieldIns {
    pub(crate) fn new(decl: Arc<Struct>, index: usize, kind: TypeKind) -> Self {
        Self { decl, index, kind }
    }

    /// The declaring field
    pub fn field(&self) -> &Field {
        &self.decl.fields[self.index]
    }

    pub fn ident(&self) -> &str {
        &self.field().ident
    }
}

/// One concrete instantiation of a struct. Created by the instance cache,
/// which guarantees a single live instance per canonical key.
pub struct StructIns {
    pub decl: Arc<Struct>,
    pub type_args: TypeKindVec,
    pub key: String,
    fields: OnceLock<Vec<FieldIns>>,
    /// The thread resolving the fields
    builder: ThreadId,
}

impl StructIns {
    /// An instance whose fields are published later by the calling thread
    pub(crate) fn shell(decl: Arc<Struct>, type_args: TypeKindVec, key: String) -> Self {
        Self {
            decl,
            type_args,
            key,
            fields: OnceLock::new(),
            builder: thread::current().id(),
        }
    }

    /// Publish the resolved fields. Publishing twice is an engine defect.
    pub(crate) fn publish_fields(&self, fields: Vec<FieldIns>) {
        if self.fields.set(fields).is_err() {
            panic!("fields of instance '{}' published twice", self.key);
        }
    }

    /// Resolved fields in declaration order. Empty until published; the
    /// cache only hands out unpublished instances to the thread building
    /// them, or to a thread whose builder is waiting on it.
    pub fn fields(&self) -> &[FieldIns] {
        self.fields.get().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_published(&self) -> bool {
        self.fields.get().is_some()
    }

    pub(crate) fn builder(&self) -> ThreadId {
        self.builder
    }

    /// Block until the builder publishes the fields
    pub(crate) fn wait_published(&self) -> &[FieldIns] {
        self.fields.wait()
    }

    pub fn ident(&self) -> &str {
        &self.decl.ident
    }

    pub fn is_native(&self) -> bool {
        self.decl.native
    }
}

impl fmt::Debug for StructIns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructIns")
            .field("key", &self.key)
            .field("type_args", &self.type_args)
            .field(
                "fields",
                &self
                    .fields()
                    .iter()
                    .map(|fi| (fi.ident(), &fi.kind))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_canonical_text() {
        let ty = TypeKind::Ptr(Box::new(TypeKind::Slice(Box::new(TypeKind::Prim(
            PrimitiveType::U8,
        )))));
        assert_eq!(ty.canonical_text(), "*[]u8");
        assert_eq!(TypeKind::Opaque("T".into()).to_string(), "T");
    }

    #[test]
    fn primitive_kinds_compare_by_value() {
        assert_eq!(
            TypeKind::Ref(Box::new(TypeKind::Prim(PrimitiveType::Int))),
            TypeKind::Ref(Box::new(TypeKind::Prim(PrimitiveType::Int)))
        );
        assert_ne!(
            TypeKind::Prim(PrimitiveType::Int),
            TypeKind::Prim(PrimitiveType::Uint)
        );
    }
}
