use std::collections::HashMap;

use crate::{
    ast::Ast,
    codegen::{CodegenResult, generate},
    errors::{CompilerError, ErrorCodes},
    options::CompilerOptions,
    parser::base_parse,
    transform::{DirectiveTransform, NodeTransform, transform},
    transforms::{
        transform_element::TransformElement, transform_expression::TransformExpression,
        transform_slot_outlet::TransformSlotOutlet, transform_text::TransformText,
        transform_v_bind_shorthand::TransformVBindShorthand, v_bind::TransformBind,
        v_for::TransformFor, v_if::TransformIf, v_memo::TransformMemo, v_model::TransformModel,
        v_on::TransformOn, v_once::TransformOnce,
        v_slot::{TrackSlotScopes, TrackVForSlotScopes},
    },
};

pub type TransformPreset = (
    Vec<Box<dyn NodeTransform>>,
    HashMap<String, Box<dyn DirectiveTransform>>,
);

pub fn get_base_transform_preset(prefix_identifiers: bool) -> TransformPreset {
    let mut node_transforms: Vec<Box<dyn NodeTransform>> = vec![
        Box::new(TransformVBindShorthand),
        Box::new(TransformOnce),
        Box::new(TransformIf),
        Box::new(TransformMemo::default()),
        Box::new(TransformFor),
    ];
    if prefix_identifiers {
        // order is important
        node_transforms.push(Box::new(TrackVForSlotScopes));
        node_transforms.push(Box::new(TransformExpression));
    }
    node_transforms.push(Box::new(TransformSlotOutlet));
    node_transforms.push(Box::new(TransformElement));
    node_transforms.push(Box::new(TrackSlotScopes));
    node_transforms.push(Box::new(TransformText));

    let directive_transforms: HashMap<String, Box<dyn DirectiveTransform>> = HashMap::from([
        ("on".to_string(), Box::new(TransformOn) as Box<dyn DirectiveTransform>),
        ("bind".to_string(), Box::new(TransformBind)),
        ("model".to_string(), Box::new(TransformModel)),
    ]);
    (node_transforms, directive_transforms)
}

pub enum BaseCompileSource {
    String(String),
    Ast(Ast),
}

impl From<&str> for BaseCompileSource {
    fn from(source: &str) -> Self {
        Self::String(source.to_string())
    }
}

impl From<String> for BaseCompileSource {
    fn from(source: String) -> Self {
        Self::String(source)
    }
}

impl From<Ast> for BaseCompileSource {
    fn from(ast: Ast) -> Self {
        Self::Ast(ast)
    }
}

// we name it `baseCompile` so that higher order compilers like
// @vue/compiler-dom can export `compile` while re-exporting everything else.
pub fn base_compile(
    source: impl Into<BaseCompileSource>,
    mut options: CompilerOptions,
) -> Result<CodegenResult, CompilerError> {
    let error_handling = options.error_handling_options.clone();
    // module output is strict mode code and cannot fall back to `with`
    if options.is_module_mode() && options.prefix_identifiers == Some(false) {
        error_handling.on_error(CompilerError::new(ErrorCodes::XModuleModeNotSupported, None))?;
    }
    let prefix_identifiers = options.resolved_prefix_identifiers();
    if !prefix_identifiers && options.cache_handlers {
        error_handling.on_error(CompilerError::new(
            ErrorCodes::XCacheHandlerNotSupported,
            None,
        ))?;
    }

    let (mut node_transforms, mut directive_transforms) =
        get_base_transform_preset(prefix_identifiers);
    // user transforms
    node_transforms.append(&mut options.node_transforms);
    directive_transforms.extend(std::mem::take(&mut options.directive_transforms));

    let (parser_options, mut transform_options, codegen_options) = options.into();
    let mut ast = match source.into() {
        BaseCompileSource::String(source) => base_parse(&source, Some(parser_options))?,
        BaseCompileSource::Ast(ast) => ast,
    };

    transform_options.node_transforms = node_transforms;
    transform_options.directive_transforms = directive_transforms;
    transform(&mut ast, transform_options)?;

    Ok(generate(ast, codegen_options))
}
