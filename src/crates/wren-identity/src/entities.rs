//! First-class identity types for declarations.
//!
//! Ids index the declaration arenas of a compilation and keep structs,
//! traits and files from being mixed up in lookups.

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $vis:vis struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis struct $name(u32);

        impl $name {
            pub fn new(index: u32) -> Self {
                Self(index)
            }

            pub fn index(self) -> u32 {
                self.0
            }
        }
    };
}

define_entity_id! {
    /// Identity for a source file of one compilation (order of the input list)
    pub struct FileId;
}

define_entity_id! {
    /// Identity for a struct declaration
    pub struct StructId;
}

define_entity_id! {
    /// Identity for a trait declaration
    pub struct TraitId;
}

define_entity_id! {
    /// Identity for a type alias declaration
    pub struct AliasId;
}

define_entity_id! {
    /// Identity for a field, relative to its declaring struct
    pub struct FieldId;
}

define_entity_id! {
    /// Identity for a method, relative to its declaring struct
    pub struct FnId;
}
