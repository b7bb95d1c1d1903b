//! Declarator flattening.
//!
//! C builds the type of an identifier by wrapping a base type in pointer,
//! array, and function layers. This module unwinds such a declarator chain
//! into [`CanonicalDeclarator`], a nested value with exactly one shape per
//! kind, suitable for structural comparison, hashing, and serialization.

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::ast::{Ast, NodeKind, NodeRef};
use crate::diagnostic::FlattenError;

/// Canonical form of a declarator subtree.
///
/// Built bottom-up by [`flatten_declarator`] and immutable afterwards.
/// Every variant carries a fixed set of fields: qualifier lists are always
/// present (possibly empty) so consumers never have to sniff arities, and
/// a missing array dimension is the empty string, distinct from `"0"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum CanonicalDeclarator {
    /// Base of a declarator chain.
    TypeDecl(Box<CanonicalDeclarator>),
    /// Specifier words in source order, never deduplicated.
    IdentifierType(Vec<String>),
    /// A bare name reference.
    Ident(String),
    /// A struct. `members` is empty for an occurrence without a body;
    /// forward references are recognizable by a present `tag`.
    Struct {
        tag: Option<String>,
        members: Vec<CanonicalDeclarator>,
    },
    /// A union; same shape as [`CanonicalDeclarator::Struct`].
    Union {
        tag: Option<String>,
        members: Vec<CanonicalDeclarator>,
    },
    Declaration {
        quals: Vec<String>,
        name: Option<String>,
        inner: Box<CanonicalDeclarator>,
    },
    /// An unnamed parameter type.
    TypeName {
        quals: Vec<String>,
        inner: Box<CanonicalDeclarator>,
    },
    /// `dim` is the dimension's literal text, `""` when none was written.
    Array {
        dim: String,
        inner: Box<CanonicalDeclarator>,
    },
    Pointer(Box<CanonicalDeclarator>),
    Typedef {
        name: String,
        inner: Box<CanonicalDeclarator>,
    },
    /// `params` is empty for `()`.
    Function {
        params: Vec<CanonicalDeclarator>,
        inner: Box<CanonicalDeclarator>,
    },
}

/// Flatten a declarator subtree into its canonical form.
///
/// Recurses structurally, one case per node kind; wrapper kinds flatten
/// their inner declarator first and apply the wrapper on the way out, so
/// the result nests inside-out. The input tree is only borrowed and never
/// mutated. Node kinds outside the declarator subset are reported as
/// [`FlattenError::UnsupportedNode`] rather than silently skipped.
pub fn flatten_declarator(ast: &Ast, node_ref: NodeRef) -> Result<CanonicalDeclarator, FlattenError> {
    let node = ast.get_node(node_ref);
    debug!("flatten_declarator: {} at {:?}", node.kind.name(), node.span);

    match &node.kind {
        NodeKind::TypeDecl(inner) => {
            let nested = flatten_declarator(ast, *inner)?;
            Ok(CanonicalDeclarator::TypeDecl(Box::new(nested)))
        }
        NodeKind::IdentifierType(names) => Ok(CanonicalDeclarator::IdentifierType(
            names.iter().map(|name| name.to_string()).collect(),
        )),
        NodeKind::Ident(name) => Ok(CanonicalDeclarator::Ident(name.to_string())),
        NodeKind::Record(record) => {
            // A body-less occurrence flattens to an empty member list.
            let members = record
                .members
                .as_deref()
                .unwrap_or(&[])
                .iter()
                .map(|&member| flatten_declarator(ast, member))
                .collect::<Result<Vec<_>, _>>()?;
            let tag = record.tag.map(|tag| tag.to_string());
            if record.is_union {
                Ok(CanonicalDeclarator::Union { tag, members })
            } else {
                Ok(CanonicalDeclarator::Struct { tag, members })
            }
        }
        NodeKind::Declaration(decl) => {
            let nested = flatten_declarator(ast, decl.inner)?;
            Ok(CanonicalDeclarator::Declaration {
                quals: decl.quals.iter().map(|qual| qual.to_string()).collect(),
                name: decl.name.map(|name| name.to_string()),
                inner: Box::new(nested),
            })
        }
        NodeKind::TypeName(type_name) => {
            let nested = flatten_declarator(ast, type_name.inner)?;
            Ok(CanonicalDeclarator::TypeName {
                quals: type_name.quals.iter().map(|qual| qual.to_string()).collect(),
                inner: Box::new(nested),
            })
        }
        NodeKind::ArrayDeclarator(array) => {
            let nested = flatten_declarator(ast, array.inner)?;
            let dim = match array.dim {
                Some(dim_ref) => dimension_text(ast, dim_ref)?,
                None => String::new(),
            };
            Ok(CanonicalDeclarator::Array {
                dim,
                inner: Box::new(nested),
            })
        }
        NodeKind::PointerDeclarator(inner) => {
            let nested = flatten_declarator(ast, *inner)?;
            Ok(CanonicalDeclarator::Pointer(Box::new(nested)))
        }
        NodeKind::TypedefDeclarator(name, inner) => {
            let nested = flatten_declarator(ast, *inner)?;
            Ok(CanonicalDeclarator::Typedef {
                name: name.to_string(),
                inner: Box::new(nested),
            })
        }
        NodeKind::FunctionDeclarator(func) => {
            let nested = flatten_declarator(ast, func.inner)?;
            let params = func
                .params
                .iter()
                .map(|&param| flatten_declarator(ast, param))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(CanonicalDeclarator::Function {
                params,
                inner: Box::new(nested),
            })
        }
        kind @ (NodeKind::TranslationUnit(_) | NodeKind::Constant(_) | NodeKind::FunctionCall(..)) => {
            Err(FlattenError::UnsupportedNode {
                kind: kind.name(),
                location: node.span,
            })
        }
    }
}

/// Literal text of an array dimension node.
fn dimension_text(ast: &Ast, dim_ref: NodeRef) -> Result<String, FlattenError> {
    match ast.get_kind(dim_ref) {
        NodeKind::Constant(value) => Ok(value.to_string()),
        other => Err(FlattenError::MalformedNode {
            message: format!(
                "array dimension must be a constant, found {}",
                other.name()
            ),
            location: ast.get_span(dim_ref),
        }),
    }
}

impl fmt::Display for CanonicalDeclarator {
    /// Renders a declarator chain the way a human would read it aloud,
    /// e.g. `f: function(x: int) -> pointer to int`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalDeclarator::TypeDecl(inner) => write!(f, "{}", inner),
            CanonicalDeclarator::IdentifierType(names) => write!(f, "{}", names.join(" ")),
            CanonicalDeclarator::Ident(name) => write!(f, "{}", name),
            CanonicalDeclarator::Struct { tag, .. } => match tag {
                Some(tag) => write!(f, "struct {}", tag),
                None => write!(f, "anonymous struct"),
            },
            CanonicalDeclarator::Union { tag, .. } => match tag {
                Some(tag) => write!(f, "union {}", tag),
                None => write!(f, "anonymous union"),
            },
            CanonicalDeclarator::Declaration { quals, name, inner } => {
                if let Some(name) = name {
                    write!(f, "{}: ", name)?;
                }
                for qual in quals {
                    write!(f, "{} ", qual)?;
                }
                write!(f, "{}", inner)
            }
            CanonicalDeclarator::TypeName { quals, inner } => {
                for qual in quals {
                    write!(f, "{} ", qual)?;
                }
                write!(f, "{}", inner)
            }
            CanonicalDeclarator::Array { dim, inner } => {
                if dim.is_empty() {
                    write!(f, "array of {}", inner)
                } else {
                    write!(f, "array[{}] of {}", dim, inner)
                }
            }
            CanonicalDeclarator::Pointer(inner) => write!(f, "pointer to {}", inner),
            CanonicalDeclarator::Typedef { name, inner } => {
                write!(f, "typedef {}: {}", name, inner)
            }
            CanonicalDeclarator::Function { params, inner } => {
                write!(f, "function(")?;
                for (idx, param) in params.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ") -> {}", inner)
            }
        }
    }
}
