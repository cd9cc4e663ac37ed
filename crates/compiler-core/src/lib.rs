mod ast;
mod codegen;
mod compile;
mod errors;
mod expression;
mod options;
mod parser;
mod runtime_helpers;
mod scanner;
mod source_map;
pub mod transform;
pub mod transforms;
pub mod utils;

pub use ast::*;
pub use codegen::{CodegenResult, generate};
pub use compile::{BaseCompileSource, TransformPreset, base_compile, get_base_transform_preset};

// Also expose lower level APIs & types
pub use crate::errors::{CollectErrors, CompilerError, DefaultErrorHandlingOptions, ErrorCodes};
pub use crate::options::{
    BetweenElements, BuiltInComponentResolver, CodegenMode, CodegenOptions, CompilerOptions,
    ErrorHandlingOptions, NamespaceResolver, ParserOptions, TagPredicate, TextModeResolver,
    TransformOptions, WhitespaceStrategy,
};
pub use crate::parser::{TextModes, base_parse, condense_whitespace};
pub use crate::runtime_helpers::RuntimeHelper;
pub use crate::source_map::{SourceMap, SourceMapGenerator};
pub use crate::transform::{
    DirectiveTransform, DirectiveTransformResult, ExitFn, NeedRuntime, NodeTransform,
    StructuralDirectiveTransform, TransformContext, transform,
};
