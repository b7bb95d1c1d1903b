#![cfg(test)]
use std::collections::HashSet;

use thin_vec::thin_vec;

use crate::ast::{
    ArrayDeclaratorData, Ast, DeclarationData, FunctionDeclaratorData, NameId, NodeKind, NodeRef,
    RecordData, TypeNameData,
};
use crate::diagnostic::FlattenError;
use crate::flatten::{flatten_declarator, CanonicalDeclarator};
use crate::source::{FileId, SourceLocation, SourceSpan};

fn name(text: &str) -> NameId {
    NameId::new(text)
}

/// Creates a span the way a parser would stamp it on a node.
fn span_at(offset: u32) -> SourceSpan {
    let start = SourceLocation::new(FileId(1), offset);
    let end = SourceLocation::new(FileId(1), offset + 1);
    SourceSpan::new(start, end)
}

fn push(ast: &mut Ast, kind: NodeKind) -> NodeRef {
    let offset = ast.len() as u32;
    ast.push_node(kind, span_at(offset))
}

/// `int` as a declarator base: a TypeDecl wrapping an IdentifierType.
fn int_base(ast: &mut Ast) -> NodeRef {
    let words = push(ast, NodeKind::IdentifierType(thin_vec![name("int")]));
    push(ast, NodeKind::TypeDecl(words))
}

fn canonical_int() -> CanonicalDeclarator {
    CanonicalDeclarator::TypeDecl(Box::new(CanonicalDeclarator::IdentifierType(vec![
        "int".to_string(),
    ])))
}

#[test]
fn test_pointer_to_int() {
    let mut ast = Ast::new();
    let base = int_base(&mut ast);
    let pointer = push(&mut ast, NodeKind::PointerDeclarator(base));

    let canonical = flatten_declarator(&ast, pointer).unwrap();
    insta::assert_yaml_snapshot!(&canonical, @r"
    Pointer:
      TypeDecl:
        IdentifierType:
          - int
    ");
}

#[test]
fn test_flattening_is_deterministic() {
    let mut ast = Ast::new();
    let base = int_base(&mut ast);
    let pointer = push(&mut ast, NodeKind::PointerDeclarator(base));

    let first = flatten_declarator(&ast, pointer).unwrap();
    let second = flatten_declarator(&ast, pointer).unwrap();
    assert_eq!(first, second);

    // Structurally equal values are usable as set keys.
    let mut set = HashSet::new();
    set.insert(first);
    set.insert(second);
    assert_eq!(set.len(), 1);
}

#[test]
fn test_subtree_shape_is_independent_of_context() {
    let mut ast = Ast::new();
    let base = int_base(&mut ast);
    let pointer = push(&mut ast, NodeKind::PointerDeclarator(base));
    push(
        &mut ast,
        NodeKind::Declaration(DeclarationData {
            quals: thin_vec![],
            name: Some(name("p")),
            inner: pointer,
        }),
    );

    // Flattening the pointer subtree ignores the declaration around it.
    let canonical = flatten_declarator(&ast, pointer).unwrap();
    assert_eq!(
        canonical,
        CanonicalDeclarator::Pointer(Box::new(canonical_int()))
    );
}

#[test]
fn test_array_without_dimension_yields_empty_string() {
    let mut ast = Ast::new();
    let base = int_base(&mut ast);
    let array = push(
        &mut ast,
        NodeKind::ArrayDeclarator(ArrayDeclaratorData {
            inner: base,
            dim: None,
        }),
    );

    match flatten_declarator(&ast, array).unwrap() {
        CanonicalDeclarator::Array { dim, .. } => assert_eq!(dim, ""),
        other => panic!("Expected Array, got {:?}", other),
    }
}

#[test]
fn test_array_dimension_zero_is_distinct_from_absent() {
    let mut ast = Ast::new();
    let base = int_base(&mut ast);
    let zero = push(&mut ast, NodeKind::Constant(name("0")));
    let sized = push(
        &mut ast,
        NodeKind::ArrayDeclarator(ArrayDeclaratorData {
            inner: base,
            dim: Some(zero),
        }),
    );
    let base2 = int_base(&mut ast);
    let r#unsized = push(
        &mut ast,
        NodeKind::ArrayDeclarator(ArrayDeclaratorData {
            inner: base2,
            dim: None,
        }),
    );

    let sized = flatten_declarator(&ast, sized).unwrap();
    let r#unsized = flatten_declarator(&ast, r#unsized).unwrap();
    match &sized {
        CanonicalDeclarator::Array { dim, .. } => assert_eq!(dim, "0"),
        other => panic!("Expected Array, got {:?}", other),
    }
    assert_ne!(sized, r#unsized);
}

#[test]
fn test_array_with_literal_dimension() {
    let mut ast = Ast::new();
    let base = int_base(&mut ast);
    let ten = push(&mut ast, NodeKind::Constant(name("10")));
    let array = push(
        &mut ast,
        NodeKind::ArrayDeclarator(ArrayDeclaratorData {
            inner: base,
            dim: Some(ten),
        }),
    );

    let canonical = flatten_declarator(&ast, array).unwrap();
    assert_eq!(
        canonical,
        CanonicalDeclarator::Array {
            dim: "10".to_string(),
            inner: Box::new(canonical_int()),
        }
    );
}

#[test]
fn test_qualifiers_keep_source_order_and_duplicates() {
    let mut ast = Ast::new();
    let base = int_base(&mut ast);
    let decl = push(
        &mut ast,
        NodeKind::Declaration(DeclarationData {
            quals: thin_vec![name("volatile"), name("const"), name("const")],
            name: Some(name("x")),
            inner: base,
        }),
    );

    match flatten_declarator(&ast, decl).unwrap() {
        CanonicalDeclarator::Declaration { quals, .. } => {
            assert_eq!(quals, vec!["volatile", "const", "const"]);
        }
        other => panic!("Expected Declaration, got {:?}", other),
    }
}

#[test]
fn test_unqualified_declaration_has_empty_qualifier_list() {
    let mut ast = Ast::new();
    let base = int_base(&mut ast);
    let decl = push(
        &mut ast,
        NodeKind::Declaration(DeclarationData {
            quals: thin_vec![],
            name: Some(name("x")),
            inner: base,
        }),
    );

    let canonical = flatten_declarator(&ast, decl).unwrap();
    insta::assert_yaml_snapshot!(&canonical, @r"
    Declaration:
      quals: []
      name: x
      inner:
        TypeDecl:
          IdentifierType:
            - int
    ");
    assert_ne!(
        canonical,
        CanonicalDeclarator::Declaration {
            quals: vec!["const".to_string()],
            name: Some("x".to_string()),
            inner: Box::new(canonical_int()),
        }
    );
}

#[test]
fn test_unsigned_long_specifier_words_keep_source_order() {
    let mut ast = Ast::new();
    let words = push(
        &mut ast,
        NodeKind::IdentifierType(thin_vec![name("unsigned"), name("long")]),
    );
    let base = push(&mut ast, NodeKind::TypeDecl(words));

    let canonical = flatten_declarator(&ast, base).unwrap();
    assert_eq!(
        canonical,
        CanonicalDeclarator::TypeDecl(Box::new(CanonicalDeclarator::IdentifierType(vec![
            "unsigned".to_string(),
            "long".to_string(),
        ])))
    );
}

#[test]
fn test_struct_with_members() {
    let mut ast = Ast::new();
    let x_base = int_base(&mut ast);
    let x_decl = push(
        &mut ast,
        NodeKind::Declaration(DeclarationData {
            quals: thin_vec![],
            name: Some(name("x")),
            inner: x_base,
        }),
    );
    let y_base = int_base(&mut ast);
    let y_decl = push(
        &mut ast,
        NodeKind::Declaration(DeclarationData {
            quals: thin_vec![],
            name: Some(name("y")),
            inner: y_base,
        }),
    );
    let record = push(
        &mut ast,
        NodeKind::Record(RecordData {
            is_union: false,
            tag: Some(name("Point")),
            members: Some(vec![x_decl, y_decl]),
        }),
    );

    let canonical = flatten_declarator(&ast, record).unwrap();
    insta::assert_yaml_snapshot!(&canonical, @r"
    Struct:
      tag: Point
      members:
        - Declaration:
            quals: []
            name: x
            inner:
              TypeDecl:
                IdentifierType:
                  - int
        - Declaration:
            quals: []
            name: y
            inner:
              TypeDecl:
                IdentifierType:
                  - int
    ");
}

#[test]
fn test_forward_struct_reference_keeps_tag_and_empty_members() {
    let mut ast = Ast::new();
    let record = push(
        &mut ast,
        NodeKind::Record(RecordData {
            is_union: false,
            tag: Some(name("Node")),
            members: None,
        }),
    );

    let canonical = flatten_declarator(&ast, record).unwrap();
    assert_eq!(
        canonical,
        CanonicalDeclarator::Struct {
            tag: Some("Node".to_string()),
            members: vec![],
        }
    );
}

#[test]
fn test_union_shares_struct_shape() {
    let mut ast = Ast::new();
    let v_base = int_base(&mut ast);
    let v_decl = push(
        &mut ast,
        NodeKind::Declaration(DeclarationData {
            quals: thin_vec![],
            name: Some(name("v")),
            inner: v_base,
        }),
    );
    let record = push(
        &mut ast,
        NodeKind::Record(RecordData {
            is_union: true,
            tag: None,
            members: Some(vec![v_decl]),
        }),
    );

    match flatten_declarator(&ast, record).unwrap() {
        CanonicalDeclarator::Union { tag, members } => {
            assert_eq!(tag, None);
            assert_eq!(members.len(), 1);
        }
        other => panic!("Expected Union, got {:?}", other),
    }
}

#[test]
fn test_function_with_no_parameters() {
    let mut ast = Ast::new();
    let base = int_base(&mut ast);
    let func = push(
        &mut ast,
        NodeKind::FunctionDeclarator(FunctionDeclaratorData {
            inner: base,
            params: vec![],
        }),
    );

    let canonical = flatten_declarator(&ast, func).unwrap();
    assert_eq!(
        canonical,
        CanonicalDeclarator::Function {
            params: vec![],
            inner: Box::new(canonical_int()),
        }
    );
}

#[test]
fn test_function_with_named_int_parameter() {
    let mut ast = Ast::new();
    let param_base = int_base(&mut ast);
    let param = push(
        &mut ast,
        NodeKind::Declaration(DeclarationData {
            quals: thin_vec![],
            name: Some(name("x")),
            inner: param_base,
        }),
    );
    let ret_base = int_base(&mut ast);
    let func = push(
        &mut ast,
        NodeKind::FunctionDeclarator(FunctionDeclaratorData {
            inner: ret_base,
            params: vec![param],
        }),
    );

    let canonical = flatten_declarator(&ast, func).unwrap();
    insta::assert_yaml_snapshot!(&canonical, @r"
    Function:
      params:
        - Declaration:
            quals: []
            name: x
            inner:
              TypeDecl:
                IdentifierType:
                  - int
      inner:
        TypeDecl:
          IdentifierType:
            - int
    ");
}

#[test]
fn test_unnamed_parameter_uses_type_name() {
    let mut ast = Ast::new();
    let param_base = int_base(&mut ast);
    let param = push(
        &mut ast,
        NodeKind::TypeName(TypeNameData {
            quals: thin_vec![name("const")],
            inner: param_base,
        }),
    );
    let ret_base = int_base(&mut ast);
    let func = push(
        &mut ast,
        NodeKind::FunctionDeclarator(FunctionDeclaratorData {
            inner: ret_base,
            params: vec![param],
        }),
    );

    match flatten_declarator(&ast, func).unwrap() {
        CanonicalDeclarator::Function { params, .. } => {
            assert_eq!(
                params,
                vec![CanonicalDeclarator::TypeName {
                    quals: vec!["const".to_string()],
                    inner: Box::new(canonical_int()),
                }]
            );
        }
        other => panic!("Expected Function, got {:?}", other),
    }
}

#[test]
fn test_typedef() {
    let mut ast = Ast::new();
    let base = int_base(&mut ast);
    let typedef = push(&mut ast, NodeKind::TypedefDeclarator(name("myint"), base));

    let canonical = flatten_declarator(&ast, typedef).unwrap();
    insta::assert_yaml_snapshot!(&canonical, @r"
    Typedef:
      name: myint
      inner:
        TypeDecl:
          IdentifierType:
            - int
    ");
}

#[test]
fn test_deep_declarator_chain() {
    // char *(*(**foo[][8])())[];
    let mut ast = Ast::new();
    let words = push(&mut ast, NodeKind::IdentifierType(thin_vec![name("char")]));
    let base = push(&mut ast, NodeKind::TypeDecl(words));
    let p1 = push(&mut ast, NodeKind::PointerDeclarator(base));
    let a1 = push(
        &mut ast,
        NodeKind::ArrayDeclarator(ArrayDeclaratorData {
            inner: p1,
            dim: None,
        }),
    );
    let p2 = push(&mut ast, NodeKind::PointerDeclarator(a1));
    let func = push(
        &mut ast,
        NodeKind::FunctionDeclarator(FunctionDeclaratorData {
            inner: p2,
            params: vec![],
        }),
    );
    let pp1 = push(&mut ast, NodeKind::PointerDeclarator(func));
    let pp2 = push(&mut ast, NodeKind::PointerDeclarator(pp1));
    let eight = push(&mut ast, NodeKind::Constant(name("8")));
    let a8 = push(
        &mut ast,
        NodeKind::ArrayDeclarator(ArrayDeclaratorData {
            inner: pp2,
            dim: Some(eight),
        }),
    );
    let outer = push(
        &mut ast,
        NodeKind::ArrayDeclarator(ArrayDeclaratorData {
            inner: a8,
            dim: None,
        }),
    );
    let decl = push(
        &mut ast,
        NodeKind::Declaration(DeclarationData {
            quals: thin_vec![],
            name: Some(name("foo")),
            inner: outer,
        }),
    );

    let char_base = CanonicalDeclarator::TypeDecl(Box::new(CanonicalDeclarator::IdentifierType(
        vec!["char".to_string()],
    )));
    let expected = CanonicalDeclarator::Declaration {
        quals: vec![],
        name: Some("foo".to_string()),
        inner: Box::new(CanonicalDeclarator::Array {
            dim: String::new(),
            inner: Box::new(CanonicalDeclarator::Array {
                dim: "8".to_string(),
                inner: Box::new(CanonicalDeclarator::Pointer(Box::new(
                    CanonicalDeclarator::Pointer(Box::new(CanonicalDeclarator::Function {
                        params: vec![],
                        inner: Box::new(CanonicalDeclarator::Pointer(Box::new(
                            CanonicalDeclarator::Array {
                                dim: String::new(),
                                inner: Box::new(CanonicalDeclarator::Pointer(Box::new(char_base))),
                            },
                        ))),
                    })),
                ))),
            }),
        }),
    };

    let canonical = flatten_declarator(&ast, decl).unwrap();
    assert_eq!(canonical, expected);
    assert_eq!(
        canonical.to_string(),
        "foo: array of array[8] of pointer to pointer to \
         function() -> pointer to array of pointer to char"
    );
}

#[test]
fn test_unsupported_kind_is_reported() {
    let mut ast = Ast::new();
    let callee = push(&mut ast, NodeKind::Ident(name("f")));
    let call = push(&mut ast, NodeKind::FunctionCall(callee, vec![]));

    let err = flatten_declarator(&ast, call).unwrap_err();
    match err {
        FlattenError::UnsupportedNode { kind, location } => {
            assert_eq!(kind, "FunctionCall");
            assert_eq!(location, ast.get_span(call));
        }
        other => panic!("Expected UnsupportedNode, got {:?}", other),
    }
}

#[test]
fn test_unsupported_kind_error_message() {
    let mut ast = Ast::new();
    let constant = push(&mut ast, NodeKind::Constant(name("1")));

    let err = flatten_declarator(&ast, constant).unwrap_err();
    assert_eq!(err.to_string(), "Cannot flatten Constant node");
    assert_eq!(err.location(), ast.get_span(constant));
}

#[test]
fn test_translation_unit_is_not_a_declarator() {
    let mut ast = Ast::new();
    let base = int_base(&mut ast);
    let decl = push(
        &mut ast,
        NodeKind::Declaration(DeclarationData {
            quals: thin_vec![],
            name: Some(name("x")),
            inner: base,
        }),
    );
    let unit = push(&mut ast, NodeKind::TranslationUnit(vec![decl]));

    assert!(matches!(
        flatten_declarator(&ast, unit),
        Err(FlattenError::UnsupportedNode {
            kind: "TranslationUnit",
            ..
        })
    ));
}

#[test]
fn test_malformed_array_dimension_is_reported() {
    let mut ast = Ast::new();
    let base = int_base(&mut ast);
    let dim = push(&mut ast, NodeKind::Ident(name("n")));
    let array = push(
        &mut ast,
        NodeKind::ArrayDeclarator(ArrayDeclaratorData {
            inner: base,
            dim: Some(dim),
        }),
    );

    let err = flatten_declarator(&ast, array).unwrap_err();
    match err {
        FlattenError::MalformedNode { message, location } => {
            assert_eq!(message, "array dimension must be a constant, found Ident");
            assert_eq!(location, ast.get_span(dim));
        }
        other => panic!("Expected MalformedNode, got {:?}", other),
    }
}

#[test]
fn test_display_function_with_named_parameter() {
    let canonical = CanonicalDeclarator::Function {
        params: vec![CanonicalDeclarator::Declaration {
            quals: vec![],
            name: Some("x".to_string()),
            inner: Box::new(canonical_int()),
        }],
        inner: Box::new(canonical_int()),
    };
    assert_eq!(canonical.to_string(), "function(x: int) -> int");
}

#[test]
fn test_display_qualified_pointer_declaration() {
    let canonical = CanonicalDeclarator::Declaration {
        quals: vec!["const".to_string()],
        name: Some("p".to_string()),
        inner: Box::new(CanonicalDeclarator::Pointer(Box::new(canonical_int()))),
    };
    assert_eq!(canonical.to_string(), "p: const pointer to int");
}

#[test]
fn test_display_array_and_records() {
    let array = CanonicalDeclarator::Pointer(Box::new(CanonicalDeclarator::Array {
        dim: "10".to_string(),
        inner: Box::new(canonical_int()),
    }));
    assert_eq!(array.to_string(), "pointer to array[10] of int");

    let forward = CanonicalDeclarator::Struct {
        tag: Some("Node".to_string()),
        members: vec![],
    };
    assert_eq!(forward.to_string(), "struct Node");

    let anonymous = CanonicalDeclarator::Union {
        tag: None,
        members: vec![],
    };
    assert_eq!(anonymous.to_string(), "anonymous union");
}
