//! Declaration identity.

use crate::error::RequestError;
use crate::evaluator::Evaluator;
use crate::request::Request;
use quill_ast::{AstContext, DeclId, DeclKind};
use quill_common::StablePath;
use std::sync::Arc;

/// The [`StablePath`] of a declaration.
///
/// A declaration's path folds in its parent's, so two declarations share a
/// path only if their whole lexical chains agree. Extensions carry no name
/// of their own, so each folds in its ordinal among the same-named
/// extensions of its parent; members of two extensions of one type stay
/// apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StablePathRequest(pub DeclId);

impl Request for StablePathRequest {
    type Output = StablePath;
    const NAME: &'static str = "StablePathRequest";

    fn evaluate(&self, ev: &mut Evaluator) -> Result<StablePath, RequestError> {
        let ast = Arc::clone(ev.ast());
        let Some(decl) = ast.try_decl(self.0) else {
            return Err(RequestError::Failed {
                request: Self::NAME,
                message: format!("unknown declaration {:?}", self.0),
            });
        };
        let name = ast.interner().text(decl.name);

        if decl.kind == DeclKind::Module {
            return Ok(StablePath::root(name));
        }

        let parent = match decl.parent {
            Some(parent) => ev.evaluate_or_default(StablePathRequest(parent), StablePath::root(&())),
            None => StablePath::root(&()),
        };

        let path = match decl.kind {
            DeclKind::Enum | DeclKind::Struct | DeclKind::Class | DeclKind::Protocol => {
                StablePath::container(parent, &(decl.kind, name))
            }
            DeclKind::Extension => {
                let ordinal = extension_ordinal(&ast, self.0);
                StablePath::container(parent, &(decl.kind, name, ordinal))
            }
            DeclKind::TopLevelCode | DeclKind::IfConfig => parent,
            DeclKind::Accessor => StablePath::name(parent, &(decl.kind, name, decl.discriminator, decl.accessor_kind)),
            _ => StablePath::name(parent, &(decl.kind, name, decl.discriminator)),
        };
        Ok(path)
    }
}

/// Position of `ext` among the extensions of the same type declared in its
/// parent, in declaration order.
fn extension_ordinal(ast: &AstContext, ext: DeclId) -> u32 {
    let decl = &ast[ext];
    let Some(parent) = decl.parent else {
        return 0;
    };
    let earlier = ast[parent]
        .members
        .iter()
        .take_while(|&&sibling| sibling != ext)
        .filter(|&&sibling| ast[sibling].kind == DeclKind::Extension && ast[sibling].name == decl.name)
        .count();
    earlier as u32
}
