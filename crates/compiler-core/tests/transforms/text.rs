use crate::test_utils::{compile, compile_with};
use template_compiler_core::{CompilerOptions, Node};

#[test]
fn no_consecutive_text() {
    let result = compile_with("{{ foo }}", CompilerOptions::default());
    let ast = &result.ast;
    assert_eq!(ast.root_node().children.len(), 1);
    assert!(matches!(ast[ast.root_node().children[0]], Node::Interpolation(_)));
}

#[test]
fn consecutive_text_is_merged() {
    let result = compile_with("{{ foo }} bar {{ baz }}", CompilerOptions::default());
    let ast = &result.ast;
    let children = &ast.root_node().children;
    assert_eq!(children.len(), 1);
    let Node::Compound(compound) = &ast[children[0]] else {
        panic!("expected a compound expression");
    };
    assert_eq!(compound.children.len(), 5);
    assert!(result.code.contains(r#"return _toDisplayString(foo) + " bar " + _toDisplayString(baz)"#));
}

#[test]
fn text_between_elements() {
    let code = compile("<div/>{{ foo }} bar {{ baz }}<div/>");
    assert!(code.contains(
        r#"_createTextVNode(_toDisplayString(foo) + " bar " + _toDisplayString(baz), 1)"#
    ));
}

#[test]
fn static_text_needs_no_flag() {
    let code = compile("<div/>hello<div/>");
    assert!(code.contains(r#"_createTextVNode("hello")"#));
}

#[test]
fn single_space_is_an_empty_call() {
    let code = compile_with(
        "<div/> <div/>",
        CompilerOptions {
            whitespace: template_compiler_core::WhitespaceStrategy::Preserve,
            ..Default::default()
        },
    )
    .code;
    assert!(code.contains("_createTextVNode()"));
}

#[test]
fn single_text_child_uses_fast_path() {
    let code = compile("<div>{{ foo }} bar</div>");
    assert!(code.contains(r#"_createElementBlock("div", null, _toDisplayString(foo) + " bar", 1)"#));
    assert!(!code.contains("_createTextVNode"));
}

#[test]
fn custom_directive_disables_fast_path() {
    let code = compile(r#"<p v-foo>{{ foo }}</p>"#);
    assert!(code.contains("_createTextVNode(_toDisplayString(foo), 1)"));
}

#[test]
fn dev_text_flag() {
    let code = compile_with(
        "<div/>{{ foo }}",
        CompilerOptions {
            dev: true,
            ..Default::default()
        },
    )
    .code;
    assert!(code.contains("_createTextVNode(_toDisplayString(foo), 1 /* TEXT */)"));
}
