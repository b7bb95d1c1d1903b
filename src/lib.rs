//! Canonical C declarator flattening and kind-dispatching AST traversal.
//!
//! An external parser produces the [`ast::Ast`]; this crate provides two
//! independent passes over it. [`flatten::flatten_declarator`] rewrites a
//! declarator chain (pointer to array of function returning ...) into a
//! canonical nested value with one fixed shape per kind, and
//! [`visitor::Walker`] runs a preorder traversal with per-kind dispatch
//! and tracking of the visited node's direct parent.

/// Contains the AST data model shared by both passes.
pub mod ast;
/// Contains the error types.
pub mod diagnostic;
/// Contains the declarator flattener.
pub mod flatten;
/// Contains source location types.
pub mod source;
/// Contains the AST walker.
pub mod visitor;

mod tests_flatten;
mod tests_visitor;

pub use ast::{Ast, NameId, Node, NodeKind, NodeRef};
pub use diagnostic::FlattenError;
pub use flatten::{flatten_declarator, CanonicalDeclarator};
pub use source::{FileId, SourceLocation, SourceSpan};
pub use visitor::{child_nodes, Visitor, Walker};
