// decl_table/mod.rs
//
// The global declaration table: the union of every file's declarations,
// built once after all files are parsed.

mod build;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use rustc_hash::FxHashMap;
use wren_frontend::Program;
use wren_identity::{AliasId, FileId, StructId, TraitId};

use crate::decls::{Alias, Fn, Struct, Trait};

/// One parsed source file
#[derive(Debug, Clone)]
pub struct FileUnit {
    pub file: FileId,
    pub program: Program,
}

impl FileUnit {
    pub fn new(file: FileId, program: Program) -> Self {
        Self { file, program }
    }
}

/// What a global type-level name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclRef {
    Struct(StructId),
    Trait(TraitId),
    Alias(AliasId),
}

/// Read-only after construction; shared by every Phase 2 task.
#[derive(Debug, Default)]
pub struct DeclTable {
    structs: Vec<Arc<Struct>>,
    traits: Vec<Arc<Trait>>,
    aliases: Vec<Arc<Alias>>,
    functions: Vec<Arc<Fn>>,
    names: FxHashMap<String, DeclRef>,
}

impl DeclTable {
    pub fn lookup(&self, ident: &str) -> Option<DeclRef> {
        self.names.get(ident).copied()
    }

    pub fn lookup_struct(&self, ident: &str) -> Option<&Arc<Struct>> {
        match self.lookup(ident)? {
            DeclRef::Struct(id) => Some(self.get_struct(id)),
            _ => None,
        }
    }

    pub fn lookup_trait(&self, ident: &str) -> Option<&Arc<Trait>> {
        match self.lookup(ident)? {
            DeclRef::Trait(id) => Some(self.get_trait(id)),
            _ => None,
        }
    }

    pub fn lookup_alias(&self, ident: &str) -> Option<&Arc<Alias>> {
        match self.lookup(ident)? {
            DeclRef::Alias(id) => Some(self.get_alias(id)),
            _ => None,
        }
    }

    pub fn get_struct(&self, id: StructId) -> &Arc<Struct> {
        &self.structs[id.index() as usize]
    }

    pub fn get_trait(&self, id: TraitId) -> &Arc<Trait> {
        &self.traits[id.index() as usize]
    }

    pub fn get_alias(&self, id: AliasId) -> &Arc<Alias> {
        &self.aliases[id.index() as usize]
    }

    /// Structs in declaration order (file order, then source order)
    pub fn structs(&self) -> &[Arc<Struct>] {
        &self.structs
    }

    pub fn traits(&self) -> &[Arc<Trait>] {
        &self.traits
    }

    pub fn aliases(&self) -> &[Arc<Alias>] {
        &self.aliases
    }

    /// Free functions
    pub fn functions(&self) -> &[Arc<Fn>] {
        &self.functions
    }
}
