mod parser_options;
pub mod transforms;

use std::collections::HashMap;

use template_compiler_core::{
    Ast, CodegenResult, CompilerError, CompilerOptions, DirectiveTransform, NodeTransform,
    ParserOptions, base_compile, base_parse,
};

pub use crate::parser_options::{
    get_namespace, get_text_mode, is_built_in_component, is_native_tag, parser_options,
};
use crate::transforms::{
    ignore_side_effect_tags::IgnoreSideEffectTags, v_html::TransformVHtml, v_show::TransformShow,
    v_text::TransformVText,
};

pub fn dom_node_transforms() -> Vec<Box<dyn NodeTransform>> {
    vec![Box::new(IgnoreSideEffectTags)]
}

pub fn dom_directive_transforms() -> HashMap<String, Box<dyn DirectiveTransform>> {
    HashMap::from([
        ("html".to_string(), Box::new(TransformVHtml) as Box<dyn DirectiveTransform>),
        ("text".to_string(), Box::new(TransformVText)),
        ("show".to_string(), Box::new(TransformShow)),
    ])
}

/// Compiles a template with the browser's tag rules and the DOM directives.
/// User supplied transforms run after, and override, the DOM ones.
pub fn compile(
    template: &str,
    mut options: CompilerOptions,
) -> Result<CodegenResult, CompilerError> {
    let dom = parser_options();
    options.is_native_tag = dom.is_native_tag;
    options.is_void_tag = dom.is_void_tag;
    options.is_pre_tag = dom.is_pre_tag;
    options.is_built_in_component = dom.is_built_in_component;
    options.get_namespace = dom.get_namespace;
    options.get_text_mode = dom.get_text_mode;

    let mut node_transforms = dom_node_transforms();
    node_transforms.append(&mut options.node_transforms);
    options.node_transforms = node_transforms;

    let mut directive_transforms = dom_directive_transforms();
    directive_transforms.extend(std::mem::take(&mut options.directive_transforms));
    options.directive_transforms = directive_transforms;

    tracing::debug!(filename = %options.filename, "compiling dom template");
    base_compile(template, options)
}

pub fn parse(template: &str, options: Option<ParserOptions>) -> Result<Ast, CompilerError> {
    base_parse(template, Some(options.unwrap_or_else(parser_options)))
}
