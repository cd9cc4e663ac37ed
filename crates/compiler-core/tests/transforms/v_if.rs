use crate::test_utils::{compile, compile_errors, element, text};
use template_compiler_core::{
    Ast, CompilerOptions, ErrorCodes, IfBranchNode, IfNode, Node, NodeId, NodeTransform,
    base_parse, transform,
    transforms::{transform_element::TransformElement, v_if::TransformIf},
};

fn parse_with_if_transform(template: &str, options: CompilerOptions) -> Ast {
    let (parser_options, mut transform_options, _) = options.into();
    let mut ast = base_parse(template, Some(parser_options)).expect("template should parse");
    let node_transforms: Vec<Box<dyn NodeTransform>> =
        vec![Box::new(TransformIf), Box::new(TransformElement)];
    transform_options.node_transforms = node_transforms;
    transform(&mut ast, transform_options).expect("template should transform");
    ast
}

fn if_node(ast: &Ast, index: usize) -> &IfNode {
    match &ast[ast.root_node().children[index]] {
        Node::If(node) => node,
        node => panic!("expected an if node, got {:?}", node.type_()),
    }
}

fn branch(ast: &Ast, id: NodeId) -> &IfBranchNode {
    match &ast[id] {
        Node::IfBranch(branch) => branch,
        node => panic!("expected an if branch, got {:?}", node.type_()),
    }
}

fn condition(branch: &IfBranchNode) -> Option<&str> {
    branch
        .condition
        .as_ref()
        .and_then(|exp| exp.as_simple())
        .map(|exp| exp.content.as_str())
}

mod if_transform {
    use super::*;

    #[test]
    fn basic_v_if() {
        let ast = parse_with_if_transform(r#"<div v-if="ok"/>"#, CompilerOptions::default());
        let node = if_node(&ast, 0);
        assert_eq!(node.branches.len(), 1);
        let branch = branch(&ast, node.branches[0]);
        assert_eq!(condition(branch), Some("ok"));
        assert_eq!(branch.children.len(), 1);
        assert_eq!(element(&ast, branch.children[0]).tag, "div");
    }

    #[test]
    fn template_v_if() {
        let ast = parse_with_if_transform(
            r#"<template v-if="ok"><div/>hello<p/></template>"#,
            CompilerOptions::default(),
        );
        let node = if_node(&ast, 0);
        let branch = branch(&ast, node.branches[0]);
        assert!(branch.is_template_if);
        assert_eq!(branch.children.len(), 3);
        assert_eq!(element(&ast, branch.children[0]).tag, "div");
        assert_eq!(text(&ast, branch.children[1]), "hello");
        assert_eq!(element(&ast, branch.children[2]).tag, "p");
    }

    #[test]
    fn if_else_if_else_chain() {
        let ast = parse_with_if_transform(
            r#"<div v-if="ok"/><p v-else-if="orNot"/><template v-else>fine</template>"#,
            CompilerOptions::default(),
        );
        assert_eq!(ast.root_node().children.len(), 1);
        let node = if_node(&ast, 0);
        assert_eq!(node.branches.len(), 3);

        let first = branch(&ast, node.branches[0]);
        assert_eq!(condition(first), Some("ok"));
        assert_eq!(element(&ast, first.children[0]).tag, "div");

        let second = branch(&ast, node.branches[1]);
        assert_eq!(condition(second), Some("orNot"));
        assert_eq!(element(&ast, second.children[0]).tag, "p");

        let third = branch(&ast, node.branches[2]);
        assert_eq!(condition(third), None);
        assert_eq!(third.children.len(), 1);
        assert_eq!(text(&ast, third.children[0]), "fine");
    }

    #[test]
    fn whitespace_between_branches_is_dropped() {
        let ast = parse_with_if_transform(
            "<div v-if=\"a\"/>\n  <p v-else/>",
            CompilerOptions::default(),
        );
        assert_eq!(ast.root_node().children.len(), 1);
        assert_eq!(if_node(&ast, 0).branches.len(), 2);
    }

    #[test]
    fn comments_between_branches_move_into_the_branch_in_dev() {
        let options = || CompilerOptions {
            comments: true,
            dev: true,
            ..Default::default()
        };
        let ast = parse_with_if_transform(r#"<div v-if="a"/><!--foo--><p v-else/>"#, options());
        let node = if_node(&ast, 0);
        let else_branch = branch(&ast, node.branches[1]);
        assert_eq!(else_branch.children.len(), 2);
        assert!(matches!(&ast[else_branch.children[0]], Node::Comment(c) if c.content == "foo"));

        let ast = parse_with_if_transform(
            r#"<div v-if="a"/><!--foo--><p v-else/>"#,
            CompilerOptions {
                comments: true,
                ..Default::default()
            },
        );
        let node = if_node(&ast, 0);
        assert_eq!(branch(&ast, node.branches[1]).children.len(), 1);
    }

    #[test]
    fn user_key_is_recorded() {
        let ast = parse_with_if_transform(
            r#"<div v-if="a" :key="k"/>"#,
            CompilerOptions::default(),
        );
        let node = if_node(&ast, 0);
        let branch = branch(&ast, node.branches[0]);
        assert_eq!(branch.user_key.as_ref().map(|k| k.name()), Some("bind"));
    }
}

mod errors {
    use super::*;

    #[test]
    fn missing_expression() {
        let errors = compile_errors("<div v-if/>", CompilerOptions::default());
        assert_eq!(errors, vec![ErrorCodes::XVIfNoExpression]);
    }

    #[test]
    fn else_without_adjacent_if() {
        let errors = compile_errors("<div v-else/>", CompilerOptions::default());
        assert_eq!(errors, vec![ErrorCodes::XVElseNoAdjacentIf]);

        let errors = compile_errors(
            r#"<div v-if="a"/><span/><div v-else/>"#,
            CompilerOptions::default(),
        );
        assert_eq!(errors, vec![ErrorCodes::XVElseNoAdjacentIf]);
    }

    #[test]
    fn else_if_after_else() {
        let errors = compile_errors(
            r#"<div v-if="a"/><div v-else/><div v-else-if="b"/>"#,
            CompilerOptions::default(),
        );
        assert_eq!(errors, vec![ErrorCodes::XVElseNoAdjacentIf]);
    }

    #[test]
    fn same_key_on_branches() {
        let errors = compile_errors(
            r#"<div v-if="a" key="x"/><div v-else key="x"/>"#,
            CompilerOptions::default(),
        );
        assert_eq!(errors, vec![ErrorCodes::XVIfSameKey]);

        let errors = compile_errors(
            r#"<div v-if="a" key="x"/><div v-else key="y"/>"#,
            CompilerOptions::default(),
        );
        assert!(errors.is_empty());
    }
}

mod codegen {
    use super::*;

    #[test]
    fn branch_keys_continue_across_chains() {
        let code = compile(r#"<div v-if="a"/><div v-else/><p v-if="b"/>"#);
        assert!(code.contains(r#"_createElementBlock("div", { key: 0 })"#));
        assert!(code.contains(r#"_createElementBlock("div", { key: 1 })"#));
        assert!(code.contains(r#"_createElementBlock("p", { key: 2 })"#));
    }

    #[test]
    fn key_is_merged_into_v_on_object() {
        let code = compile(r#"<div v-if="ok" v-on="handlers"/>"#);
        assert!(code.contains(
            r#"_createElementBlock("div", _mergeProps({ key: 0 }, _toHandlers(handlers, true)), null, 16)"#
        ));
    }

    #[test]
    fn user_key_wins() {
        let code = compile(r#"<div v-if="a" :key="k"/>"#);
        assert!(code.contains("{ key: k }"));
        assert!(!code.contains("key: 0"));
    }

    #[test]
    fn template_with_multiple_children_is_a_fragment() {
        let code = compile(r#"<template v-if="ok"><div/>hello<p/></template>"#);
        assert!(code.contains("_createElementBlock(_Fragment, { key: 0 }, ["));
        assert!(code.contains("], 64))"));
    }

    #[test]
    fn component_branch() {
        let code = compile(r#"<Comp v-if="ok"/>"#);
        assert!(code.contains("(_openBlock(), _createBlock(_component_Comp, { key: 0 }))"));
    }

    #[test]
    fn nested_conditions() {
        let code = compile(r#"<div v-if="a"/><p v-else-if="b"/><span v-else/>"#);
        assert!(code.contains("a\n"));
        assert!(code.contains(": b\n"));
        assert!(code.contains(r#"_createElementBlock("span", { key: 2 })"#));
    }
}
