#![allow(dead_code)]

use std::rc::Rc;
use template_compiler_core::{
    Ast, CodegenResult, CollectErrors, CompilerOptions, ElementNode, ErrorCodes, Node, NodeId,
    ParserOptions, base_compile, base_parse,
};

pub fn compile(template: &str) -> String {
    compile_with(template, CompilerOptions::default()).code
}

pub fn compile_prefixed(template: &str) -> String {
    compile_with(
        template,
        CompilerOptions {
            prefix_identifiers: Some(true),
            ..Default::default()
        },
    )
    .code
}

pub fn compile_with(template: &str, options: CompilerOptions) -> CodegenResult {
    match base_compile(template, options) {
        Ok(result) => result,
        Err(err) => panic!("failed to compile {template:?}: {err}"),
    }
}

/// Compiles with a collecting sink and returns the reported codes.
pub fn compile_errors(template: &str, mut options: CompilerOptions) -> Vec<ErrorCodes> {
    let errors = Rc::new(CollectErrors::default());
    options.error_handling_options = errors.clone();
    base_compile(template, options).expect("collecting sink never raises");
    errors.codes()
}

pub fn parse(template: &str) -> Ast {
    base_parse(template, None).expect("template should parse")
}

pub fn parse_with_errors(template: &str) -> (Ast, Vec<ErrorCodes>) {
    let errors = Rc::new(CollectErrors::default());
    let ast = base_parse(
        template,
        Some(ParserOptions {
            error_handling_options: errors.clone(),
            ..Default::default()
        }),
    )
    .expect("collecting sink never raises");
    (ast, errors.codes())
}

pub fn root_children(ast: &Ast) -> Vec<NodeId> {
    ast.root_node().children.clone()
}

pub fn element(ast: &Ast, id: NodeId) -> &ElementNode {
    match &ast[id] {
        Node::Element(el) => el,
        node => panic!("expected an element, got {:?}", node.type_()),
    }
}

pub fn text(ast: &Ast, id: NodeId) -> &str {
    match &ast[id] {
        Node::Text(text) => &text.content,
        node => panic!("expected a text node, got {:?}", node.type_()),
    }
}
