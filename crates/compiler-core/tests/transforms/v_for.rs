use crate::test_utils::{compile, compile_errors, compile_prefixed, compile_with, element};
use template_compiler_core::{CompilerOptions, ErrorCodes, ForNode, Node};

fn alias(exp: &Option<template_compiler_core::ExpressionNode>) -> Option<String> {
    exp.as_ref().map(|exp| exp.stringify())
}

fn for_node(template: &str) -> (template_compiler_core::Ast, ForNode) {
    let ast = compile_with(template, CompilerOptions::default()).ast;
    let node = match &ast[ast.root_node().children[0]] {
        Node::For(node) => node.clone(),
        node => panic!("expected a for node, got {:?}", node.type_()),
    };
    (ast, node)
}

mod for_transform {
    use super::*;

    #[test]
    fn number_expression() {
        let (_, node) = for_node(r#"<span v-for="index in 5" />"#);
        assert_eq!(node.source.stringify(), "5");
        assert_eq!(alias(&node.value_alias).as_deref(), Some("index"));
        assert_eq!(node.key_alias, None);
        assert_eq!(node.object_index_alias, None);
    }

    #[test]
    fn value_key_and_index() {
        let (ast, node) = for_node(r#"<span v-for="(item, key, index) in items" />"#);
        assert_eq!(node.source.stringify(), "items");
        assert_eq!(alias(&node.value_alias).as_deref(), Some("item"));
        assert_eq!(alias(&node.key_alias).as_deref(), Some("key"));
        assert_eq!(alias(&node.object_index_alias).as_deref(), Some("index"));
        assert_eq!(element(&ast, node.children[0]).tag, "span");
    }

    #[test]
    fn of_separator() {
        let (_, node) = for_node(r#"<span v-for="item of items" />"#);
        assert_eq!(node.source.stringify(), "items");
        assert_eq!(alias(&node.value_alias).as_deref(), Some("item"));
    }

    #[test]
    fn template_v_for_children() {
        let (ast, node) = for_node(r#"<template v-for="item in items">hello<span/></template>"#);
        assert_eq!(node.children.len(), 2);
        assert_eq!(element(&ast, node.children[1]).tag, "span");
    }
}

mod errors {
    use super::*;

    #[test]
    fn missing_expression() {
        let errors = compile_errors("<span v-for />", CompilerOptions::default());
        assert_eq!(errors, vec![ErrorCodes::XVForNoExpression]);
    }

    #[test]
    fn malformed_expression() {
        let errors = compile_errors(r#"<span v-for="items" />"#, CompilerOptions::default());
        assert_eq!(errors, vec![ErrorCodes::XVForMalformedExpression]);
    }

    #[test]
    fn template_key_on_child() {
        let errors = compile_errors(
            r#"<template v-for="item in items"><div :key="item.id"/></template>"#,
            CompilerOptions::default(),
        );
        assert_eq!(errors, vec![ErrorCodes::XVForTemplateKeyPlacement]);
    }
}

mod codegen {
    use super::*;

    #[test]
    fn basic_loop() {
        let code = compile(r#"<span v-for="(item) in items" />"#);
        assert!(code.contains(
            "(_openBlock(true), _createElementBlock(_Fragment, null, _renderList(items, (item) => {"
        ));
        assert!(code.contains(r#"return (_openBlock(), _createElementBlock("span"))"#));
        assert!(code.contains("}), 256))"));
    }

    #[test]
    fn destructured_value() {
        let code = compile_prefixed(r#"<span v-for="({ id, value }, i) in items">{{ id }}</span>"#);
        assert!(code.contains("_renderList(_ctx.items, ({ id, value }, i) => {"));
        assert!(code.contains("_toDisplayString(id)"));
    }

    #[test]
    fn keyed_template_loop() {
        let code = compile_prefixed(
            r#"<template v-for="item in items" :key="item.id"><div/><p/></template>"#,
        );
        assert!(code.contains(
            "return (_openBlock(), _createElementBlock(_Fragment, { key: item.id }, ["
        ));
        assert!(code.contains("], 64))"));
        assert!(code.contains("}), 128))"));
    }

    #[test]
    fn template_with_single_element() {
        let code = compile(r#"<template v-for="item in items"><div/></template>"#);
        assert!(code.contains(r#"return (_openBlock(), _createElementBlock("div"))"#));
        assert!(!code.contains("64))"));
    }

    #[test]
    fn slot_outlet_in_loop() {
        let code = compile(r#"<slot v-for="item in items"/>"#);
        assert!(code.contains(r#"return _renderSlot($slots, "default")"#));
        assert!(!code.contains(r#""slot""#));
    }

    #[test]
    fn v_if_takes_priority() {
        let code = compile(r#"<div v-if="ok" v-for="item in items"/>"#);
        assert!(code.starts_with("const _Vue = Vue"));
        assert!(code.contains("ok\n"));
        assert!(code.contains("_createElementBlock(_Fragment, { key: 0 }, _renderList(items, (item) => {"));
    }

    #[test]
    fn component_in_loop() {
        let code = compile(r#"<Comp v-for="item in items" :key="item"/>"#);
        assert!(code.contains("return (_openBlock(), _createBlock(_component_Comp, { key: item }))"));
    }
}
