//! The declaration arena and the file/module structure around it.

use crate::arena::Arena;
use crate::decl::{Decl, DeclKind};
use crate::ids::DeclId;
use quill_common::{Ident, Interner};
use quill_source::FileId;
use std::collections::BTreeMap;
use std::ops::Index;

/// Every declaration of one compilation, plus the name interner.
///
/// Built up front by the front end and read-only afterwards; requests share it
/// through an `Arc`.
#[derive(Default)]
pub struct AstContext {
    decls: Arena<DeclId, Decl>,
    interner: Interner,
    file_modules: BTreeMap<FileId, DeclId>,
    file_decls: BTreeMap<FileId, Vec<DeclId>>,
}

impl AstContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// The name interner.
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Interns `name`.
    pub fn intern(&self, name: &str) -> Ident {
        self.interner.intern(name)
    }

    /// The text of a declaration's name.
    pub fn name(&self, decl: DeclId) -> &str {
        self.interner.text(self.decls[decl].name)
    }

    /// Returns the declaration for `id`.
    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id]
    }

    /// Returns the declaration for `id`, or `None` for a foreign id.
    pub fn try_decl(&self, id: DeclId) -> Option<&Decl> {
        self.decls.try_get(id)
    }

    /// Returns the declaration for `id` mutably, for setting attributes while
    /// the context is being built.
    pub fn decl_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id]
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Whether no declarations exist.
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Adds a module declaration.
    pub fn add_module(&mut self, name: &str) -> DeclId {
        let name = self.intern(name);
        self.decls.alloc(Decl::new(DeclKind::Module, name, None, None))
    }

    /// Registers `file` as a member of `module`.
    pub fn add_file(&mut self, file: FileId, module: DeclId) {
        self.file_modules.insert(file, module);
        self.file_decls.entry(file).or_default();
    }

    /// Adds a declaration at the top level of `file`.
    ///
    /// Its parent is the file's module if the file was registered with
    /// [`add_file`](Self::add_file).
    pub fn add_top_level(&mut self, file: FileId, kind: DeclKind, name: &str) -> DeclId {
        let name = self.intern(name);
        let module = self.file_modules.get(&file).copied();
        let id = self.decls.alloc(Decl::new(kind, name, module, Some(file)));
        if let Some(module) = module {
            self.decls[module].members.push(id);
        }
        self.file_decls.entry(file).or_default().push(id);
        id
    }

    /// Adds a declaration nested in `parent`, in the parent's file.
    pub fn add_member(&mut self, parent: DeclId, kind: DeclKind, name: &str) -> DeclId {
        let name = self.intern(name);
        let file = self.decls[parent].file;
        let id = self.decls.alloc(Decl::new(kind, name, Some(parent), file));
        self.decls[parent].members.push(id);
        id
    }

    /// The module `file` belongs to.
    pub fn module_of_file(&self, file: FileId) -> Option<DeclId> {
        self.file_modules.get(&file).copied()
    }

    /// Top-level declarations of `file`, in source order.
    pub fn top_level_decls(&self, file: FileId) -> &[DeclId] {
        self.file_decls.get(&file).map_or(&[], Vec::as_slice)
    }

    /// Every registered file, in id order.
    pub fn files(&self) -> impl Iterator<Item = FileId> + '_ {
        self.file_decls.keys().copied()
    }

    /// The module enclosing `decl`, or `decl` itself if it is a module.
    pub fn module_of(&self, decl: DeclId) -> Option<DeclId> {
        let mut current = Some(decl);
        while let Some(id) = current {
            if self.decls[id].kind == DeclKind::Module {
                return Some(id);
            }
            current = self.decls[id].parent;
        }
        None
    }

    /// Members of `container` named `name` that lookup can see.
    pub fn members_named(&self, container: DeclId, name: Ident) -> Vec<DeclId> {
        self.decls[container]
            .members
            .iter()
            .copied()
            .filter(|&m| {
                let decl = &self.decls[m];
                decl.name == name && decl.kind.is_value_or_type()
            })
            .collect()
    }

    /// Members of `container` of the given kind.
    pub fn members_of_kind(&self, container: DeclId, kind: DeclKind) -> Vec<DeclId> {
        self.decls[container]
            .members
            .iter()
            .copied()
            .filter(|&m| self.decls[m].kind == kind)
            .collect()
    }

    /// Every declaration, in allocation order.
    pub fn decls(&self) -> impl Iterator<Item = (DeclId, &Decl)> {
        self.decls.iter()
    }
}

impl Index<DeclId> for AstContext {
    type Output = Decl;

    fn index(&self, id: DeclId) -> &Decl {
        &self.decls[id]
    }
}
