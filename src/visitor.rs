//! Kind-dispatching AST traversal.
//!
//! [`Walker`] drives a preorder traversal over the arena, dispatching each
//! node to the [`Visitor`] method matching its kind. Every method defaults
//! to descending into the node's children, so implementors override only
//! the kinds they care about. An override replaces the traversal for that
//! kind: it may call [`Walker::walk_children`] to keep descending, or stop
//! there to prune the subtree.
//!
//! The walker keeps an explicit ancestor stack, so a handler can ask for
//! the direct parent of the node it is visiting even though the parent's
//! traversal frame is further up the call stack.

use log::debug;

use crate::ast::{
    ArrayDeclaratorData, Ast, DeclarationData, FunctionDeclaratorData, NameId, Node, NodeKind,
    NodeRef, RecordData, TypeNameData,
};

/// Trait for visiting AST nodes.
///
/// One method per node kind; dispatch is total, with no unknown-kind
/// failure mode. Errors returned by overridden methods propagate out of
/// [`Walker::walk`] unmodified.
pub trait Visitor<'ast> {
    /// Error type produced by overridden handlers. The built-in traversal
    /// itself never fails.
    type Error;

    /// Visit a translation unit node
    fn visit_translation_unit(
        &mut self,
        walker: &mut Walker<'ast>,
        node: NodeRef,
        _items: &'ast [NodeRef],
    ) -> Result<(), Self::Error> {
        walker.walk_children(self, node)
    }

    /// Visit a literal constant node
    fn visit_constant(
        &mut self,
        walker: &mut Walker<'ast>,
        node: NodeRef,
        _value: NameId,
    ) -> Result<(), Self::Error> {
        walker.walk_children(self, node)
    }

    /// Visit an identifier reference node
    fn visit_ident(
        &mut self,
        walker: &mut Walker<'ast>,
        node: NodeRef,
        _name: NameId,
    ) -> Result<(), Self::Error> {
        walker.walk_children(self, node)
    }

    /// Visit a type declaration node
    fn visit_type_decl(
        &mut self,
        walker: &mut Walker<'ast>,
        node: NodeRef,
        _inner: NodeRef,
    ) -> Result<(), Self::Error> {
        walker.walk_children(self, node)
    }

    /// Visit an identifier type node
    fn visit_identifier_type(
        &mut self,
        walker: &mut Walker<'ast>,
        node: NodeRef,
        _names: &'ast [NameId],
    ) -> Result<(), Self::Error> {
        walker.walk_children(self, node)
    }

    /// Visit a struct or union node
    fn visit_record(
        &mut self,
        walker: &mut Walker<'ast>,
        node: NodeRef,
        _record: &'ast RecordData,
    ) -> Result<(), Self::Error> {
        walker.walk_children(self, node)
    }

    /// Visit a declaration node
    fn visit_declaration(
        &mut self,
        walker: &mut Walker<'ast>,
        node: NodeRef,
        _decl: &'ast DeclarationData,
    ) -> Result<(), Self::Error> {
        walker.walk_children(self, node)
    }

    /// Visit a type name node
    fn visit_type_name(
        &mut self,
        walker: &mut Walker<'ast>,
        node: NodeRef,
        _type_name: &'ast TypeNameData,
    ) -> Result<(), Self::Error> {
        walker.walk_children(self, node)
    }

    /// Visit an array declarator node
    fn visit_array_declarator(
        &mut self,
        walker: &mut Walker<'ast>,
        node: NodeRef,
        _array: &'ast ArrayDeclaratorData,
    ) -> Result<(), Self::Error> {
        walker.walk_children(self, node)
    }

    /// Visit a pointer declarator node
    fn visit_pointer_declarator(
        &mut self,
        walker: &mut Walker<'ast>,
        node: NodeRef,
        _inner: NodeRef,
    ) -> Result<(), Self::Error> {
        walker.walk_children(self, node)
    }

    /// Visit a typedef declarator node
    fn visit_typedef_declarator(
        &mut self,
        walker: &mut Walker<'ast>,
        node: NodeRef,
        _name: NameId,
        _inner: NodeRef,
    ) -> Result<(), Self::Error> {
        walker.walk_children(self, node)
    }

    /// Visit a function declarator node
    fn visit_function_declarator(
        &mut self,
        walker: &mut Walker<'ast>,
        node: NodeRef,
        _func: &'ast FunctionDeclaratorData,
    ) -> Result<(), Self::Error> {
        walker.walk_children(self, node)
    }

    /// Visit a function call node
    fn visit_function_call(
        &mut self,
        walker: &mut Walker<'ast>,
        node: NodeRef,
        _callee: NodeRef,
        _args: &'ast [NodeRef],
    ) -> Result<(), Self::Error> {
        walker.walk_children(self, node)
    }
}

/// Drives one traversal of an AST.
///
/// One walker serves one traversal at a time; concurrent traversals over
/// the same tree each need their own walker so the ancestor stacks stay
/// independent.
pub struct Walker<'ast> {
    ast: &'ast Ast,
    ancestors: Vec<NodeRef>,
}

impl<'ast> Walker<'ast> {
    pub fn new(ast: &'ast Ast) -> Self {
        Walker {
            ast,
            ancestors: Vec::new(),
        }
    }

    /// The tree being traversed.
    pub fn ast(&self) -> &'ast Ast {
        self.ast
    }

    /// Direct parent of the node currently being visited, `None` at the
    /// tree root. Valid inside visitor methods, including overrides.
    pub fn parent(&self) -> Option<NodeRef> {
        self.ancestors.last().copied()
    }

    /// Visit one node, dispatching on its kind.
    pub fn walk<V>(&mut self, visitor: &mut V, node_ref: NodeRef) -> Result<(), V::Error>
    where
        V: Visitor<'ast> + ?Sized,
    {
        let ast = self.ast;
        let node = ast.get_node(node_ref);
        debug!("walk: {} at {:?}", node.kind.name(), node.span);

        match &node.kind {
            NodeKind::TranslationUnit(items) => {
                visitor.visit_translation_unit(self, node_ref, items)
            }
            NodeKind::Constant(value) => visitor.visit_constant(self, node_ref, *value),
            NodeKind::Ident(name) => visitor.visit_ident(self, node_ref, *name),
            NodeKind::TypeDecl(inner) => visitor.visit_type_decl(self, node_ref, *inner),
            NodeKind::IdentifierType(names) => {
                visitor.visit_identifier_type(self, node_ref, names)
            }
            NodeKind::Record(record) => visitor.visit_record(self, node_ref, record),
            NodeKind::Declaration(decl) => visitor.visit_declaration(self, node_ref, decl),
            NodeKind::TypeName(type_name) => visitor.visit_type_name(self, node_ref, type_name),
            NodeKind::ArrayDeclarator(array) => {
                visitor.visit_array_declarator(self, node_ref, array)
            }
            NodeKind::PointerDeclarator(inner) => {
                visitor.visit_pointer_declarator(self, node_ref, *inner)
            }
            NodeKind::TypedefDeclarator(name, inner) => {
                visitor.visit_typedef_declarator(self, node_ref, *name, *inner)
            }
            NodeKind::FunctionDeclarator(func) => {
                visitor.visit_function_declarator(self, node_ref, func)
            }
            NodeKind::FunctionCall(callee, args) => {
                visitor.visit_function_call(self, node_ref, *callee, args)
            }
        }
    }

    /// Visit every direct child of `node_ref` in order.
    ///
    /// Pushes `node_ref` on the ancestor stack for the duration, so
    /// children observe it via [`Walker::parent`]. The stack is restored
    /// even when a child's handler returns an error.
    pub fn walk_children<V>(&mut self, visitor: &mut V, node_ref: NodeRef) -> Result<(), V::Error>
    where
        V: Visitor<'ast> + ?Sized,
    {
        let children = child_nodes(self.ast.get_node(node_ref));

        self.ancestors.push(node_ref);
        let mut result = Ok(());
        for child in children {
            result = self.walk(visitor, child);
            if result.is_err() {
                break;
            }
        }
        self.ancestors.pop();

        result
    }
}

/// Get the child nodes for a given node that should be visited in
/// traversal order. The order is the declaration order of the variant's
/// fields; leaf kinds return an empty vector.
pub fn child_nodes(node: &Node) -> Vec<NodeRef> {
    match &node.kind {
        NodeKind::TranslationUnit(items) => items.clone(),
        NodeKind::TypeDecl(inner) | NodeKind::PointerDeclarator(inner) => vec![*inner],
        NodeKind::Record(record) => record.members.clone().unwrap_or_default(),
        NodeKind::Declaration(decl) => vec![decl.inner],
        NodeKind::TypeName(type_name) => vec![type_name.inner],
        NodeKind::ArrayDeclarator(array) => {
            let mut children = vec![array.inner];
            if let Some(dim) = array.dim {
                children.push(dim);
            }
            children
        }
        NodeKind::TypedefDeclarator(_, inner) => vec![*inner],
        NodeKind::FunctionDeclarator(func) => {
            let mut children = vec![func.inner];
            children.extend(&func.params);
            children
        }
        NodeKind::FunctionCall(callee, args) => {
            let mut children = vec![*callee];
            children.extend(args);
            children
        }
        // Leaf nodes
        NodeKind::Constant(_) | NodeKind::Ident(_) | NodeKind::IdentifierType(_) => vec![],
    }
}
