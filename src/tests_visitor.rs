#![cfg(test)]
use std::convert::Infallible;

use thin_vec::thin_vec;

use crate::ast::{
    ArrayDeclaratorData, Ast, DeclarationData, FunctionDeclaratorData, NameId, NodeKind, NodeRef,
};
use crate::source::SourceSpan;
use crate::visitor::{child_nodes, Visitor, Walker};

fn name(text: &str) -> NameId {
    NameId::new(text)
}

fn push(ast: &mut Ast, kind: NodeKind) -> NodeRef {
    ast.push_node(kind, SourceSpan::empty())
}

/// Node handles for the sample tree, so tests can assert on identity.
struct SampleUnit {
    ast: Ast,
    unit: NodeRef,
    decl: NodeRef,
    base: NodeRef,
    words: NodeRef,
    call: NodeRef,
    callee: NodeRef,
    arg: NodeRef,
    inner_call: NodeRef,
    inner_callee: NodeRef,
}

/// Roughly `int x; foo(1, bar());` as the external parser would shape it.
fn sample_unit() -> SampleUnit {
    let mut ast = Ast::new();
    let words = push(&mut ast, NodeKind::IdentifierType(thin_vec![name("int")]));
    let base = push(&mut ast, NodeKind::TypeDecl(words));
    let decl = push(
        &mut ast,
        NodeKind::Declaration(DeclarationData {
            quals: thin_vec![],
            name: Some(name("x")),
            inner: base,
        }),
    );
    let callee = push(&mut ast, NodeKind::Ident(name("foo")));
    let arg = push(&mut ast, NodeKind::Constant(name("1")));
    let inner_callee = push(&mut ast, NodeKind::Ident(name("bar")));
    let inner_call = push(&mut ast, NodeKind::FunctionCall(inner_callee, vec![]));
    let call = push(
        &mut ast,
        NodeKind::FunctionCall(callee, vec![arg, inner_call]),
    );
    let unit = push(&mut ast, NodeKind::TranslationUnit(vec![decl, call]));

    SampleUnit {
        ast,
        unit,
        decl,
        base,
        words,
        call,
        callee,
        arg,
        inner_call,
        inner_callee,
    }
}

/// Records every visited node in visit order without changing traversal.
#[derive(Default)]
struct RecordingVisitor {
    visited: Vec<NodeRef>,
}

impl<'ast> Visitor<'ast> for RecordingVisitor {
    type Error = Infallible;

    fn visit_translation_unit(
        &mut self,
        walker: &mut Walker<'ast>,
        node: NodeRef,
        _items: &'ast [NodeRef],
    ) -> Result<(), Infallible> {
        self.visited.push(node);
        walker.walk_children(self, node)
    }

    fn visit_constant(
        &mut self,
        walker: &mut Walker<'ast>,
        node: NodeRef,
        _value: NameId,
    ) -> Result<(), Infallible> {
        self.visited.push(node);
        walker.walk_children(self, node)
    }

    fn visit_ident(
        &mut self,
        walker: &mut Walker<'ast>,
        node: NodeRef,
        _name: NameId,
    ) -> Result<(), Infallible> {
        self.visited.push(node);
        walker.walk_children(self, node)
    }

    fn visit_type_decl(
        &mut self,
        walker: &mut Walker<'ast>,
        node: NodeRef,
        _inner: NodeRef,
    ) -> Result<(), Infallible> {
        self.visited.push(node);
        walker.walk_children(self, node)
    }

    fn visit_identifier_type(
        &mut self,
        walker: &mut Walker<'ast>,
        node: NodeRef,
        _names: &'ast [NameId],
    ) -> Result<(), Infallible> {
        self.visited.push(node);
        walker.walk_children(self, node)
    }

    fn visit_declaration(
        &mut self,
        walker: &mut Walker<'ast>,
        node: NodeRef,
        _decl: &'ast DeclarationData,
    ) -> Result<(), Infallible> {
        self.visited.push(node);
        walker.walk_children(self, node)
    }

    fn visit_function_call(
        &mut self,
        walker: &mut Walker<'ast>,
        node: NodeRef,
        _callee: NodeRef,
        _args: &'ast [NodeRef],
    ) -> Result<(), Infallible> {
        self.visited.push(node);
        walker.walk_children(self, node)
    }
}

#[test]
fn test_default_traversal_visits_every_node_once_in_preorder() {
    let sample = sample_unit();
    let mut visitor = RecordingVisitor::default();
    let mut walker = Walker::new(&sample.ast);

    walker.walk(&mut visitor, sample.unit).unwrap();

    assert_eq!(visitor.visited.len(), sample.ast.len());
    assert_eq!(
        visitor.visited,
        vec![
            sample.unit,
            sample.decl,
            sample.base,
            sample.words,
            sample.call,
            sample.callee,
            sample.arg,
            sample.inner_call,
            sample.inner_callee,
        ]
    );
}

#[test]
fn test_traversal_order_is_deterministic() {
    let sample = sample_unit();

    let mut first = RecordingVisitor::default();
    Walker::new(&sample.ast).walk(&mut first, sample.unit).unwrap();
    let mut second = RecordingVisitor::default();
    Walker::new(&sample.ast).walk(&mut second, sample.unit).unwrap();

    assert_eq!(first.visited, second.visited);
}

/// Records the ancestor slot observed while visiting calls and idents.
#[derive(Default)]
struct ParentSpy {
    observed: Vec<(NodeRef, Option<NodeRef>)>,
}

impl<'ast> Visitor<'ast> for ParentSpy {
    type Error = Infallible;

    fn visit_function_call(
        &mut self,
        walker: &mut Walker<'ast>,
        node: NodeRef,
        _callee: NodeRef,
        _args: &'ast [NodeRef],
    ) -> Result<(), Infallible> {
        self.observed.push((node, walker.parent()));
        walker.walk_children(self, node)
    }

    fn visit_ident(
        &mut self,
        walker: &mut Walker<'ast>,
        node: NodeRef,
        _name: NameId,
    ) -> Result<(), Infallible> {
        self.observed.push((node, walker.parent()));
        walker.walk_children(self, node)
    }
}

#[test]
fn test_handler_observes_direct_parent() {
    let sample = sample_unit();
    let mut visitor = ParentSpy::default();
    let mut walker = Walker::new(&sample.ast);

    walker.walk(&mut visitor, sample.unit).unwrap();

    // Each handler sees exactly the direct parent: the callee's parent is
    // the call, not the translation unit two levels up.
    assert_eq!(
        visitor.observed,
        vec![
            (sample.call, Some(sample.unit)),
            (sample.callee, Some(sample.call)),
            (sample.inner_call, Some(sample.call)),
            (sample.inner_callee, Some(sample.inner_call)),
        ]
    );
}

#[test]
fn test_parent_is_absent_at_traversal_root() {
    let sample = sample_unit();
    let mut visitor = ParentSpy::default();
    let mut walker = Walker::new(&sample.ast);

    // Start the traversal at the call itself rather than the unit.
    walker.walk(&mut visitor, sample.call).unwrap();

    assert_eq!(visitor.observed.first(), Some(&(sample.call, None)));
}

/// Collects call nodes without descending into their arguments.
#[derive(Default)]
struct CallCollector {
    calls: Vec<NodeRef>,
    constants: Vec<NodeRef>,
}

impl<'ast> Visitor<'ast> for CallCollector {
    type Error = Infallible;

    fn visit_function_call(
        &mut self,
        _walker: &mut Walker<'ast>,
        node: NodeRef,
        _callee: NodeRef,
        _args: &'ast [NodeRef],
    ) -> Result<(), Infallible> {
        self.calls.push(node);
        Ok(())
    }

    fn visit_constant(
        &mut self,
        walker: &mut Walker<'ast>,
        node: NodeRef,
        _value: NameId,
    ) -> Result<(), Infallible> {
        self.constants.push(node);
        walker.walk_children(self, node)
    }
}

#[test]
fn test_override_can_prune_a_subtree() {
    let sample = sample_unit();
    let mut visitor = CallCollector::default();
    let mut walker = Walker::new(&sample.ast);

    walker.walk(&mut visitor, sample.unit).unwrap();

    // The outer call is seen; its arguments are never traversed, so the
    // nested call and the constant argument stay invisible.
    assert_eq!(visitor.calls, vec![sample.call]);
    assert_eq!(visitor.constants, vec![]);
}

/// Fails on the first constant encountered.
struct FailOnConstant;

impl<'ast> Visitor<'ast> for FailOnConstant {
    type Error = String;

    fn visit_constant(
        &mut self,
        _walker: &mut Walker<'ast>,
        _node: NodeRef,
        value: NameId,
    ) -> Result<(), String> {
        Err(format!("constant {} not allowed", value))
    }
}

#[test]
fn test_handler_error_propagates_and_stack_unwinds() {
    let sample = sample_unit();
    let mut visitor = FailOnConstant;
    let mut walker = Walker::new(&sample.ast);

    let err = walker.walk(&mut visitor, sample.unit).unwrap_err();
    assert_eq!(err, "constant 1 not allowed");

    // The ancestor stack is restored even on the error path.
    assert_eq!(walker.parent(), None);
}

#[test]
fn test_child_order_follows_field_order() {
    let mut ast = Ast::new();
    let words = push(&mut ast, NodeKind::IdentifierType(thin_vec![name("int")]));
    let base = push(&mut ast, NodeKind::TypeDecl(words));
    let dim = push(&mut ast, NodeKind::Constant(name("4")));
    let array = push(
        &mut ast,
        NodeKind::ArrayDeclarator(ArrayDeclaratorData {
            inner: base,
            dim: Some(dim),
        }),
    );
    let param_words = push(&mut ast, NodeKind::IdentifierType(thin_vec![name("int")]));
    let param_base = push(&mut ast, NodeKind::TypeDecl(param_words));
    let param = push(
        &mut ast,
        NodeKind::Declaration(DeclarationData {
            quals: thin_vec![],
            name: Some(name("n")),
            inner: param_base,
        }),
    );
    let func = push(
        &mut ast,
        NodeKind::FunctionDeclarator(FunctionDeclaratorData {
            inner: array,
            params: vec![param],
        }),
    );

    assert_eq!(child_nodes(ast.get_node(array)), vec![base, dim]);
    assert_eq!(child_nodes(ast.get_node(func)), vec![array, param]);
    assert_eq!(child_nodes(ast.get_node(words)), vec![]);
}
