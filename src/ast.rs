//! Abstract Syntax Tree for C declarations.
//!
//! The tree is produced by an external parser and consumed read-only by the
//! passes in this crate. Storage is flattened: all nodes live in one
//! contiguous vector and children are referenced by index, so a pass
//! borrows subtrees instead of owning them.

use std::num::NonZeroU32;

use thin_vec::ThinVec;

use crate::source::SourceSpan;

/// Represents an interned string using symbol_table crate.
/// Alias for GlobalSymbol from symbol_table crate with global feature.
pub type NameId = symbol_table::GlobalSymbol;

/// The flattened AST storage.
#[derive(Clone, Default)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    /// Create a new empty AST
    pub fn new() -> Self {
        Ast::default()
    }

    /// Add a node to the AST and return its reference
    pub fn push_node(&mut self, kind: NodeKind, span: SourceSpan) -> NodeRef {
        let index = self.nodes.len() as u32 + 1; // Start from 1 for NonZeroU32
        self.nodes.push(Node { kind, span });
        NodeRef::new(index).expect("NodeRef overflow")
    }

    /// Get node by reference
    pub fn get_node(&self, node_ref: NodeRef) -> &Node {
        &self.nodes[node_ref.index()]
    }

    /// Get node kind by reference
    pub fn get_kind(&self, node_ref: NodeRef) -> &NodeKind {
        &self.nodes[node_ref.index()].kind
    }

    /// Get node span by reference
    pub fn get_span(&self, node_ref: NodeRef) -> SourceSpan {
        self.nodes[node_ref.index()].span
    }

    /// Number of nodes stored in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Node reference type for referencing child nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct NodeRef(NonZeroU32);

impl NodeRef {
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    pub fn index(self) -> usize {
        (self.get() - 1) as usize
    }
}

/// A single AST node: its kind tag plus the source range it came from.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: SourceSpan,
}

impl Node {
    pub fn new(kind: NodeKind, span: SourceSpan) -> Self {
        Node { kind, span }
    }
}

/// The closed set of node kinds this crate understands.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A whole source file: the ordered top-level items.
    TranslationUnit(Vec<NodeRef>),

    /// A literal constant kept as its source text (array dimensions).
    Constant(NameId),

    /// A bare reference to a previously declared name.
    Ident(NameId),

    /// The base of a declarator chain, wrapping the declared type.
    TypeDecl(NodeRef),

    /// A built-in type written as one or more specifier words, in source
    /// order (e.g. `unsigned long`).
    IdentifierType(ThinVec<NameId>),

    /// A struct or union. `members` is `None` for a reference without a
    /// body (a forward reference), as opposed to an empty definition.
    Record(RecordData),

    /// A declaration: qualifiers, the declared name, and the declarator
    /// chain describing its type.
    Declaration(DeclarationData),

    /// A type name without a declared identifier, as used for unnamed
    /// function parameters.
    TypeName(TypeNameData),

    /// An array layer of a declarator chain. `dim` is absent for `[]`.
    ArrayDeclarator(ArrayDeclaratorData),

    /// A pointer layer of a declarator chain.
    PointerDeclarator(NodeRef),

    /// A typedef binding a name to the wrapped declarator chain.
    TypedefDeclarator(NameId, NodeRef),

    /// A function layer of a declarator chain: the ordered parameters and
    /// the declarator for the return side.
    FunctionDeclarator(FunctionDeclaratorData),

    /// A call expression: callee and ordered arguments.
    FunctionCall(NodeRef, Vec<NodeRef>),
}

impl NodeKind {
    /// Stable kind name used in diagnostics and logs.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::TranslationUnit(_) => "TranslationUnit",
            NodeKind::Constant(_) => "Constant",
            NodeKind::Ident(_) => "Ident",
            NodeKind::TypeDecl(_) => "TypeDecl",
            NodeKind::IdentifierType(_) => "IdentifierType",
            NodeKind::Record(record) => {
                if record.is_union {
                    "Union"
                } else {
                    "Struct"
                }
            }
            NodeKind::Declaration(_) => "Declaration",
            NodeKind::TypeName(_) => "TypeName",
            NodeKind::ArrayDeclarator(_) => "ArrayDeclarator",
            NodeKind::PointerDeclarator(_) => "PointerDeclarator",
            NodeKind::TypedefDeclarator(..) => "TypedefDeclarator",
            NodeKind::FunctionDeclarator(_) => "FunctionDeclarator",
            NodeKind::FunctionCall(..) => "FunctionCall",
        }
    }
}

/// Struct or union payload.
#[derive(Debug, Clone)]
pub struct RecordData {
    pub is_union: bool,
    pub tag: Option<NameId>,
    /// Member declarations in source order. `None` when this occurrence
    /// has no body.
    pub members: Option<Vec<NodeRef>>,
}

/// Declaration payload.
#[derive(Debug, Clone)]
pub struct DeclarationData {
    /// Type qualifiers in source order. Duplicates are kept as written.
    pub quals: ThinVec<NameId>,
    /// The declared name, absent for abstract declarations.
    pub name: Option<NameId>,
    pub inner: NodeRef,
}

/// Type name payload (unnamed function parameter).
#[derive(Debug, Clone)]
pub struct TypeNameData {
    pub quals: ThinVec<NameId>,
    pub inner: NodeRef,
}

/// Array declarator payload.
#[derive(Debug, Clone)]
pub struct ArrayDeclaratorData {
    pub inner: NodeRef,
    /// The dimension expression, expected to be a [`NodeKind::Constant`].
    /// Absent for `[]`.
    pub dim: Option<NodeRef>,
}

/// Function declarator payload.
#[derive(Debug, Clone)]
pub struct FunctionDeclaratorData {
    pub inner: NodeRef,
    /// Parameters in source order; each is a `Declaration` or `TypeName`.
    pub params: Vec<NodeRef>,
}
