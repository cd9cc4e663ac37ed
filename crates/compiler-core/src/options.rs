use crate::{
    ast::{ElementNode, Namespace, Namespaces},
    errors::{CompilerError, DefaultErrorHandlingOptions},
    parser::TextModes,
    runtime_helpers::RuntimeHelper,
    transform::{DirectiveTransform, NodeTransform},
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, rc::Rc};

pub trait ErrorHandlingOptions: std::fmt::Debug {
    fn on_warn(&self, warning: CompilerError) {
        tracing::warn!(code = ?warning.code, "{}", warning.message);
    }

    /// Returning `Err` aborts the compile with that error.
    fn on_error(&self, error: CompilerError) -> Result<(), CompilerError> {
        Err(error)
    }
}

pub type TagPredicate = Rc<dyn Fn(&str) -> bool>;
pub type BuiltInComponentResolver = Rc<dyn Fn(&str) -> Option<RuntimeHelper>>;
pub type NamespaceResolver = Rc<dyn Fn(&str, Option<&ElementNode>, Namespace) -> Namespace>;
pub type TextModeResolver = Rc<dyn Fn(&str, Namespace, Option<&ElementNode>) -> TextModes>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhitespaceStrategy {
    #[default]
    Condense,
    Preserve,
}

/// When whitespace-only text between two elements is dropped while condensing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BetweenElements {
    /// only when the whitespace contains a newline
    #[default]
    WithNewline,
    Always,
    Never,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodegenMode {
    /// Helpers are destructured from the runtime global and the render
    /// function is returned.
    #[default]
    Function,
    /// Helpers are imported and the render function is exported.
    Module,
}

pub struct ParserOptions {
    /// Specify the root namespace to use when parsing a template.
    /// Defaults to `Namespaces::HTML`.
    pub ns: Namespaces,
    /// e.g. platform native elements, e.g. `<div>` for browsers
    pub is_native_tag: Option<TagPredicate>,
    /// e.g. native elements that can self-close, e.g. `<img>`, `<br>`, `<hr>`
    pub is_void_tag: TagPredicate,
    /// e.g. elements that should preserve whitespace inside, e.g. `<pre>`
    pub is_pre_tag: TagPredicate,
    /// Platform-specific built-in components e.g. `<Transition>`
    pub is_built_in_component: Option<BuiltInComponentResolver>,
    /// Separate option for end users to extend the native elements list
    pub is_custom_element: Option<TagPredicate>,
    /// Get tag namespace
    pub get_namespace: NamespaceResolver,
    /// Get text parsing mode for this element
    pub get_text_mode: TextModeResolver,
    /// Interpolation delimiters, `{{` and `}}` by default.
    pub delimiters: (String, String),
    pub whitespace: WhitespaceStrategy,
    pub drop_whitespace_between_elements: BetweenElements,
    /// Whether to keep comments in the templates AST.
    pub comments: bool,

    pub error_handling_options: Rc<dyn ErrorHandlingOptions>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            ns: Namespaces::HTML,
            is_native_tag: None,
            is_void_tag: Rc::new(|_| false),
            is_pre_tag: Rc::new(|_| false),
            is_built_in_component: None,
            is_custom_element: None,
            get_namespace: Rc::new(|_, _, ns| ns),
            get_text_mode: Rc::new(|_, _, _| TextModes::Data),
            delimiters: ("{{".to_string(), "}}".to_string()),
            whitespace: WhitespaceStrategy::Condense,
            drop_whitespace_between_elements: BetweenElements::WithNewline,
            comments: false,

            error_handling_options: Rc::new(DefaultErrorHandlingOptions),
        }
    }
}

impl std::fmt::Debug for ParserOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserOptions")
            .field("ns", &self.ns)
            .field("is_native_tag", &self.is_native_tag.as_ref().map(|_| "<Fn(&str) -> bool>"))
            .field("is_void_tag", &"<Fn(&str) -> bool>")
            .field("is_pre_tag", &"<Fn(&str) -> bool>")
            .field(
                "is_custom_element",
                &self.is_custom_element.as_ref().map(|_| "<Fn(&str) -> bool>"),
            )
            .field("delimiters", &self.delimiters)
            .field("whitespace", &self.whitespace)
            .field(
                "drop_whitespace_between_elements",
                &self.drop_whitespace_between_elements,
            )
            .field("comments", &self.comments)
            .field("error_handling_options", &self.error_handling_options)
            .finish()
    }
}

pub struct TransformOptions {
    /// An array of node transforms to be applied to every AST node.
    pub node_transforms: Vec<Box<dyn NodeTransform>>,
    /// An object of { name: transform } to be applied to every directive attribute
    /// node found on element nodes.
    pub directive_transforms: HashMap<String, Box<dyn DirectiveTransform>>,
    pub is_built_in_component: Option<BuiltInComponentResolver>,
    pub is_custom_element: Option<TagPredicate>,
    /// Transform expressions like {{ foo }} to `_ctx.foo`.
    /// If this option is false, the generated code will be wrapped in a
    /// `with (this) { ... }` block.
    pub prefix_identifiers: bool,
    /// Hoist static VNodes and props objects to `_hoisted_x` constants
    pub hoist_static: bool,
    /// Minimum number of nodes a static subtree must hold before it is hoisted.
    pub hoist_static_threshold: usize,
    /// Cache v-on handlers to avoid creating new inline functions on each render,
    /// also avoids the need for dynamically patching the handlers by wrapping it.
    pub cache_handlers: bool,
    /// The component's own name, used to resolve self references.
    pub self_name: Option<String>,
    pub filename: String,
    pub dev: bool,

    pub error_handling_options: Rc<dyn ErrorHandlingOptions>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            node_transforms: Vec::new(),
            directive_transforms: HashMap::new(),
            is_built_in_component: None,
            is_custom_element: None,
            prefix_identifiers: false,
            hoist_static: false,
            hoist_static_threshold: 1,
            cache_handlers: false,
            self_name: None,
            filename: "template.vue.html".to_string(),
            dev: false,

            error_handling_options: Rc::new(DefaultErrorHandlingOptions),
        }
    }
}

impl std::fmt::Debug for TransformOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformOptions")
            .field("node_transforms", &self.node_transforms)
            .field("directive_transforms", &self.directive_transforms)
            .field("prefix_identifiers", &self.prefix_identifiers)
            .field("hoist_static", &self.hoist_static)
            .field("hoist_static_threshold", &self.hoist_static_threshold)
            .field("cache_handlers", &self.cache_handlers)
            .field("self_name", &self.self_name)
            .field("filename", &self.filename)
            .field("dev", &self.dev)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CodegenOptions {
    /// - `Module` mode will generate ES module import statements for helpers
    ///   and export the render function as the default export.
    /// - `Function` mode will generate a single `const { helpers... } = Vue`
    ///   statement and return the render function. It expects `Vue` to be globally
    ///   available (or passed by wrapping the code with an IIFE).
    pub mode: CodegenMode,
    pub prefix_identifiers: bool,
    /// Generate source map?
    pub source_map: bool,
    /// Filename, e.g. `foo.vue`
    pub filename: String,
    /// Option to optimize helper import bindings via variable assignment
    /// (only used for webpack code-split)
    pub optimize_imports: bool,
    /// Customize where to import runtime helpers from.
    pub runtime_module_name: String,
    /// Customize the global variable name of `Vue` to get helpers from
    /// in function mode
    pub runtime_global_name: String,
    /// Generate the render function body only; the preamble is returned
    /// separately.
    pub inline: bool,
    /// Indicates that transforms and codegen should try to output valid TS code
    pub is_ts: bool,
    pub dev: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            mode: CodegenMode::Function,
            prefix_identifiers: false,
            source_map: false,
            filename: "template.vue.html".to_string(),
            optimize_imports: false,
            runtime_module_name: "vue".to_string(),
            runtime_global_name: "Vue".to_string(),
            inline: false,
            is_ts: false,
            dev: false,
        }
    }
}

/// Flat option set accepted by `base_compile`; split into the per-stage
/// options with `From`.
pub struct CompilerOptions {
    pub mode: CodegenMode,
    /// Defaults to `true` in module mode.
    pub prefix_identifiers: Option<bool>,
    pub hoist_static: bool,
    pub hoist_static_threshold: usize,
    pub cache_handlers: bool,
    pub whitespace: WhitespaceStrategy,
    pub drop_whitespace_between_elements: BetweenElements,
    pub comments: bool,
    pub delimiters: (String, String),
    pub ns: Namespaces,
    pub is_native_tag: Option<TagPredicate>,
    pub is_void_tag: TagPredicate,
    pub is_pre_tag: TagPredicate,
    pub is_built_in_component: Option<BuiltInComponentResolver>,
    pub is_custom_element: Option<TagPredicate>,
    pub get_namespace: NamespaceResolver,
    pub get_text_mode: TextModeResolver,
    pub node_transforms: Vec<Box<dyn NodeTransform>>,
    pub directive_transforms: HashMap<String, Box<dyn DirectiveTransform>>,
    pub self_name: Option<String>,
    pub filename: String,
    pub source_map: bool,
    pub optimize_imports: bool,
    pub runtime_module_name: String,
    pub runtime_global_name: String,
    pub inline: bool,
    pub is_ts: bool,
    pub dev: bool,
    pub error_handling_options: Rc<dyn ErrorHandlingOptions>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        let parser = ParserOptions::default();
        let transform = TransformOptions::default();
        let codegen = CodegenOptions::default();
        Self {
            mode: codegen.mode,
            prefix_identifiers: None,
            hoist_static: transform.hoist_static,
            hoist_static_threshold: transform.hoist_static_threshold,
            cache_handlers: transform.cache_handlers,
            whitespace: parser.whitespace,
            drop_whitespace_between_elements: parser.drop_whitespace_between_elements,
            comments: parser.comments,
            delimiters: parser.delimiters,
            ns: parser.ns,
            is_native_tag: parser.is_native_tag,
            is_void_tag: parser.is_void_tag,
            is_pre_tag: parser.is_pre_tag,
            is_built_in_component: parser.is_built_in_component,
            is_custom_element: parser.is_custom_element,
            get_namespace: parser.get_namespace,
            get_text_mode: parser.get_text_mode,
            node_transforms: transform.node_transforms,
            directive_transforms: transform.directive_transforms,
            self_name: transform.self_name,
            filename: codegen.filename,
            source_map: codegen.source_map,
            optimize_imports: codegen.optimize_imports,
            runtime_module_name: codegen.runtime_module_name,
            runtime_global_name: codegen.runtime_global_name,
            inline: codegen.inline,
            is_ts: codegen.is_ts,
            dev: codegen.dev,
            error_handling_options: parser.error_handling_options,
        }
    }
}

impl CompilerOptions {
    pub fn is_module_mode(&self) -> bool {
        self.mode == CodegenMode::Module
    }

    /// Prefixing is forced on in module mode, since modules are strict and
    /// cannot use `with`.
    pub fn resolved_prefix_identifiers(&self) -> bool {
        self.prefix_identifiers == Some(true) || self.is_module_mode()
    }
}

impl From<CompilerOptions> for (ParserOptions, TransformOptions, CodegenOptions) {
    fn from(options: CompilerOptions) -> Self {
        let prefix_identifiers = options.resolved_prefix_identifiers();
        let parser = ParserOptions {
            ns: options.ns,
            is_native_tag: options.is_native_tag,
            is_void_tag: options.is_void_tag,
            is_pre_tag: options.is_pre_tag,
            is_built_in_component: options.is_built_in_component.clone(),
            is_custom_element: options.is_custom_element.clone(),
            get_namespace: options.get_namespace,
            get_text_mode: options.get_text_mode,
            delimiters: options.delimiters,
            whitespace: options.whitespace,
            drop_whitespace_between_elements: options.drop_whitespace_between_elements,
            comments: options.comments,
            error_handling_options: options.error_handling_options.clone(),
        };
        let transform = TransformOptions {
            node_transforms: options.node_transforms,
            directive_transforms: options.directive_transforms,
            is_built_in_component: options.is_built_in_component,
            is_custom_element: options.is_custom_element,
            prefix_identifiers,
            hoist_static: options.hoist_static,
            hoist_static_threshold: options.hoist_static_threshold,
            cache_handlers: options.cache_handlers,
            self_name: options.self_name,
            filename: options.filename.clone(),
            dev: options.dev,
            error_handling_options: options.error_handling_options,
        };
        let codegen = CodegenOptions {
            mode: options.mode,
            prefix_identifiers,
            source_map: options.source_map,
            filename: options.filename,
            optimize_imports: options.optimize_imports,
            runtime_module_name: options.runtime_module_name,
            runtime_global_name: options.runtime_global_name,
            inline: options.inline,
            is_ts: options.is_ts,
            dev: options.dev,
        };
        (parser, transform, codegen)
    }
}
