use crate::{
    ast::{
        ArrayExpression, Ast, BlockStatement, CacheExpression, CallArgument, CallCallee,
        CallExpression, CommentNode, CompoundExpressionNode, CompoundExpressionNodeChild,
        ConditionalExpression, ExpressionNode, FunctionExpression, FunctionReturns,
        InterpolationNode, JSChildNode, Node, NodeId, ObjectExpression, Position, RootCodegenNode,
        SimpleExpressionNode, SourceLocation, TextNode, VNodeCall, VNodeCallChildren,
        VNodeCallTag, get_vnode_block_helper, get_vnode_helper,
    },
    options::{CodegenMode, CodegenOptions},
    runtime_helpers::RuntimeHelper,
    source_map::{LineColumn, SourceMap, SourceMapGenerator},
    utils::{AssetType, is_simple_identifier, to_valid_asset_id},
};
use template_compiler_shared::PatchFlag;

const PURE_ANNOTATION: &str = "/*#__PURE__*/";

fn alias_helper(helper: &RuntimeHelper) -> String {
    format!("{helper}: _{helper}")
}

#[derive(Debug)]
pub struct CodegenResult {
    pub code: String,
    /// Imports and hoisted constants of an inline render function.
    ///
    /// Empty unless `inline` is set; otherwise the preamble is emitted at the
    /// top of `code`.
    pub preamble: String,
    pub ast: Ast,
    pub map: Option<SourceMap>,
}

struct CodegenContext<'a> {
    ast: &'a Ast,
    mode: CodegenMode,
    prefix_identifiers: bool,
    optimize_imports: bool,
    runtime_module_name: String,
    runtime_global_name: String,
    is_ts: bool,
    dev: bool,

    code: String,
    /// zero-based generated position, tracked for source maps
    line: usize,
    column: usize,
    indent_level: usize,
    pure: bool,
    map: Option<SourceMapGenerator>,
}

impl<'a> CodegenContext<'a> {
    fn new(ast: &'a Ast, options: &CodegenOptions) -> Self {
        let map = options.source_map.then(|| {
            SourceMapGenerator::new(options.filename.clone(), ast.root_node().source.clone())
        });
        Self {
            ast,
            mode: options.mode,
            prefix_identifiers: options.prefix_identifiers,
            optimize_imports: options.optimize_imports,
            runtime_module_name: options.runtime_module_name.clone(),
            runtime_global_name: options.runtime_global_name.clone(),
            is_ts: options.is_ts,
            dev: options.dev,

            code: String::new(),
            line: 0,
            column: 0,
            indent_level: 0,
            pure: false,
            map,
        }
    }

    fn helper(&self, key: RuntimeHelper) -> String {
        key.alias()
    }

    fn push(&mut self, code: &str) {
        self.code.push_str(code);
        if self.map.is_some() {
            for c in code.chars() {
                if c == '\n' {
                    self.line += 1;
                    self.column = 0;
                } else {
                    // generated columns count UTF-16 units like JS engines do
                    self.column += c.len_utf16();
                }
            }
        }
    }

    /// Pushes code generated from a template location and records its
    /// mappings.
    fn push_mapped(&mut self, code: &str, loc: &SourceLocation, name: Option<&str>) {
        let mapped = self.map.is_some() && !loc.is_stub();
        if mapped {
            self.add_mapping(loc.start, name);
        }
        self.push(code);
        if mapped {
            self.add_mapping(loc.end, None);
        }
    }

    fn add_mapping(&mut self, original: Position, name: Option<&str>) {
        let generated = LineColumn {
            line: self.line,
            column: self.column,
        };
        if let Some(map) = &mut self.map {
            map.add_mapping(
                generated,
                LineColumn {
                    line: original.line.saturating_sub(1),
                    column: original.column.saturating_sub(1),
                },
                name,
            );
        }
    }

    fn indent(&mut self) {
        self.indent_level += 1;
        self.newline();
    }

    fn deindent(&mut self, without_new_line: bool) {
        self.indent_level = self.indent_level.saturating_sub(1);
        if !without_new_line {
            self.newline();
        }
    }

    fn newline(&mut self) {
        let code = format!("\n{}", "  ".repeat(self.indent_level));
        self.push(&code);
    }
}

pub fn generate(ast: Ast, options: CodegenOptions) -> CodegenResult {
    let (code, preamble, map) = {
        let mut context = CodegenContext::new(&ast, &options);
        let root = ast.root_node();
        let use_with_block = !context.prefix_identifiers && context.mode != CodegenMode::Module;

        // preambles
        // in setup() inline mode, the preamble is generated in a sub context
        // and returned separately.
        let preamble = if options.inline {
            let mut preamble_context = CodegenContext::new(&ast, &options);
            preamble_context.map = None;
            gen_preamble(&mut preamble_context, options.inline);
            preamble_context.code
        } else {
            gen_preamble(&mut context, options.inline);
            String::new()
        };

        // enter render function
        let args = ["_ctx", "_cache"];
        let signature = if context.is_ts {
            args.map(|arg| format!("{arg}: any")).join(",")
        } else {
            args.join(", ")
        };
        if options.inline {
            context.push(&format!("({signature}) => {{"));
        } else {
            context.push(&format!("function render({signature}) {{"));
        }
        context.indent();

        if use_with_block {
            context.push("with (_ctx) {");
            context.indent();
            // function mode const declarations should be inside with block
            // also they should be renamed to avoid collision with user properties
            if !root.helpers.is_empty() {
                let helpers = root
                    .helpers
                    .iter()
                    .map(alias_helper)
                    .collect::<Vec<_>>()
                    .join(", ");
                context.push(&format!("const {{ {helpers} }} = _Vue\n"));
                context.newline();
            }
        }

        // generate asset resolution statements
        if !root.components.is_empty() {
            gen_assets(&root.components, AssetType::Component, &mut context);
            if !root.directives.is_empty() || root.temps > 0 {
                context.newline();
            }
        }
        if !root.directives.is_empty() {
            gen_assets(&root.directives, AssetType::Directive, &mut context);
            if root.temps > 0 {
                context.newline();
            }
        }
        if root.temps > 0 {
            context.push("let ");
            for i in 0..root.temps {
                context.push(&format!("{}_temp{i}", if i > 0 { ", " } else { "" }));
            }
        }
        if !root.components.is_empty() || !root.directives.is_empty() || root.temps > 0 {
            context.push("\n");
            context.newline();
        }

        // generate the VNode tree expression
        context.push("return ");
        match &root.codegen_node {
            Some(RootCodegenNode::TemplateChild(child)) => gen_template_node(*child, &mut context),
            Some(RootCodegenNode::JSChild(node)) => gen_node(node, &mut context),
            None => context.push("null"),
        }

        if use_with_block {
            context.deindent(false);
            context.push("}");
        }
        context.deindent(false);
        context.push("}");

        let map = context
            .map
            .as_ref()
            .map(|map| map.to_source_map(Some(options.filename.clone())));
        (context.code, preamble, map)
    };

    tracing::debug!(
        code_len = code.len(),
        preamble_len = preamble.len(),
        mapped = map.is_some(),
        "codegen finished"
    );
    CodegenResult {
        code,
        preamble,
        ast,
        map,
    }
}

fn gen_preamble(context: &mut CodegenContext, inline: bool) {
    if context.mode == CodegenMode::Module {
        gen_module_preamble(context, inline);
    } else {
        gen_function_preamble(context);
    }
}

fn gen_function_preamble(context: &mut CodegenContext) {
    let root = context.ast.root_node();
    let vue_binding = context.runtime_global_name.clone();

    // Generate const declaration for helpers
    // In prefix mode, we place the const declaration at top so it's done
    // only once; But if we not prefixing, we place the declaration inside the
    // with block so it doesn't incur the `in` check cost for every helper access.
    if !root.helpers.is_empty() {
        if context.prefix_identifiers {
            let helpers = root
                .helpers
                .iter()
                .map(alias_helper)
                .collect::<Vec<_>>()
                .join(", ");
            context.push(&format!("const {{ {helpers} }} = {vue_binding}\n"));
        } else {
            // "with" mode.
            // save Vue in a separate variable to avoid collision
            context.push(&format!("const _Vue = {vue_binding}\n"));
            // in "with" mode, helpers are declared inside the with block to avoid
            // has check cost, but hoists are lifted out of the function - we need
            // to provide the helper here.
            if !root.hoists.is_empty() {
                let static_helpers = [
                    RuntimeHelper::CreateVNode,
                    RuntimeHelper::CreateElementVNode,
                    RuntimeHelper::CreateComment,
                    RuntimeHelper::CreateText,
                ]
                .iter()
                .filter(|helper| root.helpers.contains(*helper))
                .map(alias_helper)
                .collect::<Vec<_>>()
                .join(", ");
                context.push(&format!("const {{ {static_helpers} }} = _Vue\n"));
            }
        }
    }
    gen_hoists(&root.hoists, context);
    context.newline();
    context.push("return ");
}

fn gen_module_preamble(context: &mut CodegenContext, inline: bool) {
    let root = context.ast.root_node();
    let runtime_module_name = serde_json::to_string(&context.runtime_module_name)
        .unwrap_or_else(|_| format!("\"{}\"", context.runtime_module_name));

    if !root.helpers.is_empty() {
        if context.optimize_imports {
            // when bundled with webpack with code-split, calling an import binding
            // as a function leads to it being wrapped with `Object(a.b)` or `(0,a.b)`,
            // incurring both payload size increase and potential perf overhead.
            // therefore we assign the imports to variables (which is a constant ~50b
            // cost per-component instead of scaling with template size)
            let helpers = root
                .helpers
                .iter()
                .map(RuntimeHelper::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            context.push(&format!("import {{ {helpers} }} from {runtime_module_name}\n"));
            let bindings = root
                .helpers
                .iter()
                .map(|helper| format!("_{helper} = {helper}"))
                .collect::<Vec<_>>()
                .join(", ");
            context.push(&format!(
                "\n// Binding optimization for webpack code-split\nconst {bindings}\n"
            ));
        } else {
            let helpers = root
                .helpers
                .iter()
                .map(|helper| format!("{helper} as _{helper}"))
                .collect::<Vec<_>>()
                .join(", ");
            context.push(&format!("import {{ {helpers} }} from {runtime_module_name}\n"));
        }
    }

    gen_hoists(&root.hoists, context);
    context.newline();

    if !inline {
        context.push("export ");
    }
}

fn gen_assets(assets: &[String], asset_type: AssetType, context: &mut CodegenContext) {
    let resolver = context.helper(match asset_type {
        AssetType::Component => RuntimeHelper::ResolveComponent,
        AssetType::Directive => RuntimeHelper::ResolveDirective,
    });
    for (i, id) in assets.iter().enumerate() {
        // potential component implicit self-reference inferred from SFC filename
        let (id, maybe_self_reference) = match id.strip_suffix("__self") {
            Some(id) => (id, true),
            None => (id.as_str(), false),
        };
        let name = serde_json::to_string(id).unwrap_or_else(|_| format!("\"{id}\""));
        context.push(&format!(
            "const {} = {resolver}({name}{}){}",
            to_valid_asset_id(id, asset_type),
            if maybe_self_reference { ", true" } else { "" },
            if context.is_ts { "!" } else { "" },
        ));
        if i < assets.len() - 1 {
            context.newline();
        }
    }
}

fn gen_hoists(hoists: &[JSChildNode], context: &mut CodegenContext) {
    if hoists.is_empty() {
        return;
    }
    context.pure = true;
    context.newline();
    for (i, exp) in hoists.iter().enumerate() {
        context.push(&format!("const _hoisted_{} = ", i + 1));
        gen_node(exp, context);
        context.newline();
    }
    context.pure = false;
}

/// One entry of a generated argument or element list.
enum ListItem<'a> {
    Code(String),
    Js(&'a JSChildNode),
    Call(&'a CallExpression),
    Expression(&'a ExpressionNode),
    Template(NodeId),
    TemplateList(&'a [NodeId]),
}

impl<'a> From<&'a CallArgument> for ListItem<'a> {
    fn from(argument: &'a CallArgument) -> Self {
        match argument {
            CallArgument::String(code) => Self::Code(code.clone()),
            CallArgument::JSChild(node) => Self::Js(node),
            CallArgument::TemplateChild(node) => Self::Template(*node),
            CallArgument::TemplateChildren(nodes) => Self::TemplateList(nodes),
        }
    }
}

impl ListItem<'_> {
    fn is_text(&self, ast: &Ast) -> bool {
        match self {
            Self::Code(_) | Self::Expression(_) => true,
            Self::Js(node) => matches!(node, JSChildNode::Simple(_) | JSChildNode::Compound(_)),
            Self::Template(id) => matches!(
                ast[*id],
                Node::Text(_) | Node::Interpolation(_) | Node::Compound(_)
            ),
            Self::Call(_) | Self::TemplateList(_) => false,
        }
    }
}

/// Drops trailing absent arguments. Interior ones stay and render as `null`.
pub(crate) fn gen_nullable_args<T>(mut args: Vec<Option<T>>) -> Vec<Option<T>> {
    while matches!(args.last(), Some(None)) {
        args.pop();
    }
    args
}

fn gen_node_list_as_array(nodes: Vec<ListItem>, context: &mut CodegenContext) {
    let multilines = nodes.len() > 3 || nodes.iter().any(|n| !n.is_text(context.ast));
    context.push("[");
    if multilines {
        context.indent();
    }
    gen_node_list(nodes, context, multilines, true);
    if multilines {
        context.deindent(false);
    }
    context.push("]");
}

fn gen_node_list(
    nodes: Vec<ListItem>,
    context: &mut CodegenContext,
    multilines: bool,
    comma: bool,
) {
    let len = nodes.len();
    for (i, node) in nodes.into_iter().enumerate() {
        match node {
            ListItem::Code(code) => context.push(&code),
            ListItem::Js(node) => gen_node(node, context),
            ListItem::Call(node) => gen_call_expression(node, context),
            ListItem::Expression(node) => gen_expression_node(node, context),
            ListItem::Template(node) => gen_template_node(node, context),
            ListItem::TemplateList(nodes) => gen_template_list(nodes, context),
        }
        if i + 1 < len {
            if multilines {
                if comma {
                    context.push(",");
                }
                context.newline();
            } else if comma {
                context.push(", ");
            }
        }
    }
}

fn gen_template_list(nodes: &[NodeId], context: &mut CodegenContext) {
    gen_node_list_as_array(nodes.iter().map(|n| ListItem::Template(*n)).collect(), context);
}

fn gen_template_node(id: NodeId, context: &mut CodegenContext) {
    let ast = context.ast;
    match &ast[id] {
        Node::Element(_) | Node::If(_) | Node::For(_) => match ast[id].codegen_node() {
            Some(codegen) => gen_node(codegen, context),
            None => {
                tracing::warn!(
                    node = ?ast[id].type_(),
                    "codegen node is missing for element/if/for node, apply appropriate transforms first"
                );
            }
        },
        Node::Text(node) => gen_text(node, context),
        Node::Comment(node) => gen_comment(node, context),
        Node::Interpolation(node) => gen_interpolation(node, context),
        Node::Compound(node) => gen_compound_expression(node, context),
        Node::TextCall(node) => gen_node(&node.codegen_node, context),
        // branches are generated through their parent's conditional
        Node::IfBranch(_) => {}
        Node::Root(_) => unreachable!("the root is generated through its codegen node"),
    }
}

fn gen_node(node: &JSChildNode, context: &mut CodegenContext) {
    match node {
        JSChildNode::VNodeCall(node) => gen_vnode_call(node, context),
        JSChildNode::Call(node) => gen_call_expression(node, context),
        JSChildNode::Object(node) => gen_object_expression(node, context),
        JSChildNode::Array(node) => gen_array_expression(node, context),
        JSChildNode::Function(node) => gen_function_expression(node, context),
        JSChildNode::Conditional(node) => gen_conditional_expression(node, context),
        JSChildNode::Cache(node) => gen_cache_expression(node, context),
        JSChildNode::Simple(node) => gen_expression(node, context),
        JSChildNode::Compound(node) => gen_compound_expression(node, context),
        JSChildNode::Node(id) => gen_template_node(*id, context),
    }
}

fn gen_expression_node(node: &ExpressionNode, context: &mut CodegenContext) {
    match node {
        ExpressionNode::Simple(node) => gen_expression(node, context),
        ExpressionNode::Compound(node) => gen_compound_expression(node, context),
    }
}

fn gen_text(node: &TextNode, context: &mut CodegenContext) {
    let code = serde_json::to_string(&node.content).unwrap_or_else(|_| node.content.clone());
    context.push_mapped(&code, &node.loc, None);
}

fn gen_expression(node: &SimpleExpressionNode, context: &mut CodegenContext) {
    if node.is_static {
        let code = serde_json::to_string(&node.content).unwrap_or_else(|_| node.content.clone());
        context.push_mapped(&code, &node.loc, None);
        return;
    }
    // expressions rewritten with a `_ctx.` prefix keep the original name
    let name = node
        .content
        .strip_prefix("_ctx.")
        .filter(|original| is_simple_identifier(original));
    context.push_mapped(&node.content, &node.loc, name);
}

fn gen_interpolation(node: &InterpolationNode, context: &mut CodegenContext) {
    if context.pure {
        context.push(PURE_ANNOTATION);
    }
    let helper = context.helper(RuntimeHelper::ToDisplayString);
    context.push(&format!("{helper}("));
    gen_expression_node(&node.content, context);
    context.push(")");
}

fn gen_compound_expression(node: &CompoundExpressionNode, context: &mut CodegenContext) {
    for child in &node.children {
        match child {
            CompoundExpressionNodeChild::Simple(node) => gen_expression(node, context),
            CompoundExpressionNodeChild::Compound(node) => gen_compound_expression(node, context),
            CompoundExpressionNodeChild::Interpolation(node) => gen_interpolation(node, context),
            CompoundExpressionNodeChild::Text(node) => gen_text(node, context),
            CompoundExpressionNodeChild::String(code) => context.push(code),
            CompoundExpressionNodeChild::Symbol(helper) => {
                let helper = context.helper(*helper);
                context.push(&helper);
            }
            CompoundExpressionNodeChild::JSChild(node) => gen_node(node, context),
        }
    }
}

fn gen_expression_as_property_key(node: &ExpressionNode, context: &mut CodegenContext) {
    match node {
        ExpressionNode::Compound(node) => {
            context.push("[");
            gen_compound_expression(node, context);
            context.push("]");
        }
        ExpressionNode::Simple(node) if node.is_static => {
            // only quote keys if necessary
            let text = if is_simple_identifier(&node.content) {
                node.content.clone()
            } else {
                serde_json::to_string(&node.content).unwrap_or_else(|_| node.content.clone())
            };
            context.push_mapped(&text, &node.loc, None);
        }
        ExpressionNode::Simple(node) => {
            context.push_mapped(&format!("[{}]", node.content), &node.loc, None);
        }
    }
}

fn gen_comment(node: &CommentNode, context: &mut CodegenContext) {
    if context.pure {
        context.push(PURE_ANNOTATION);
    }
    let helper = context.helper(RuntimeHelper::CreateComment);
    let content = serde_json::to_string(&node.content).unwrap_or_else(|_| node.content.clone());
    context.push_mapped(&format!("{helper}({content})"), &node.loc, None);
}

fn patch_flag_string(patch_flag: PatchFlag, dev: bool) -> String {
    // add dev annotations to patch flags
    if dev {
        format!("{patch_flag} /* {} */", patch_flag.names())
    } else {
        patch_flag.to_string()
    }
}

fn gen_vnode_call(node: &VNodeCall, context: &mut CodegenContext) {
    if node.directives.is_some() {
        let helper = context.helper(RuntimeHelper::WithDirectives);
        context.push(&format!("{helper}("));
    }
    if node.is_block {
        let helper = context.helper(RuntimeHelper::OpenBlock);
        context.push(&format!(
            "({helper}({}), ",
            if node.disable_tracking { "true" } else { "" }
        ));
    }
    if context.pure {
        context.push(PURE_ANNOTATION);
    }
    let call_helper = if node.is_block {
        get_vnode_block_helper(node.is_component)
    } else {
        get_vnode_helper(node.is_component)
    };
    let helper = context.helper(call_helper);
    context.push_mapped(&format!("{helper}("), &node.loc, None);

    let tag = match &node.tag {
        VNodeCallTag::String(tag) => ListItem::Code(tag.clone()),
        VNodeCallTag::Symbol(helper) => ListItem::Code(context.helper(*helper)),
        VNodeCallTag::Call(call) => ListItem::Call(call),
    };
    let children = node.children.as_ref().map(|children| match children {
        VNodeCallChildren::TemplateChildNodeList(nodes) => ListItem::TemplateList(nodes),
        VNodeCallChildren::TemplateTextChildNode(node) => ListItem::Template(*node),
        VNodeCallChildren::JSChild(node) => ListItem::Js(node),
    });
    let args = gen_nullable_args(vec![
        Some(tag),
        node.props.as_ref().map(ListItem::Js),
        children,
        node.patch_flag
            .map(|flag| ListItem::Code(patch_flag_string(flag, context.dev))),
        node.dynamic_props.clone().map(ListItem::Code),
    ]);
    let args = args
        .into_iter()
        .map(|arg| arg.unwrap_or_else(|| ListItem::Code("null".to_string())))
        .collect();
    gen_node_list(args, context, false, true);
    context.push(")");
    if node.is_block {
        context.push(")");
    }
    if let Some(directives) = &node.directives {
        context.push(", ");
        gen_array_expression(directives, context);
        context.push(")");
    }
}

// JavaScript
fn gen_call_expression(node: &CallExpression, context: &mut CodegenContext) {
    let callee = match &node.callee {
        CallCallee::String(callee) => callee.clone(),
        CallCallee::Symbol(helper) => context.helper(*helper),
    };
    if context.pure {
        context.push(PURE_ANNOTATION);
    }
    context.push_mapped(&format!("{callee}("), &node.loc, None);
    gen_node_list(
        node.arguments.iter().map(ListItem::from).collect(),
        context,
        false,
        true,
    );
    context.push(")");
}

fn gen_object_expression(node: &ObjectExpression, context: &mut CodegenContext) {
    let properties = &node.properties;
    if properties.is_empty() {
        context.push_mapped("{}", &node.loc, None);
        return;
    }
    let multilines = properties.len() > 1
        || properties
            .iter()
            .any(|p| !matches!(p.value, JSChildNode::Simple(_)));
    context.push(if multilines { "{" } else { "{ " });
    if multilines {
        context.indent();
    }
    for (i, property) in properties.iter().enumerate() {
        // key
        gen_expression_as_property_key(&property.key, context);
        context.push(": ");
        // value
        gen_node(&property.value, context);
        if i + 1 < properties.len() {
            // will only reach this if it's multilines
            context.push(",");
            context.newline();
        }
    }
    if multilines {
        context.deindent(false);
    }
    context.push(if multilines { "}" } else { " }" });
}

fn gen_array_expression(node: &ArrayExpression, context: &mut CodegenContext) {
    gen_node_list_as_array(node.elements.iter().map(ListItem::Js).collect(), context);
}

fn gen_function_expression(node: &FunctionExpression, context: &mut CodegenContext) {
    let FunctionExpression {
        params,
        returns,
        body,
        newline,
        is_slot,
        loc,
    } = node;
    if *is_slot {
        // wrap slot functions with owner context
        let helper = context.helper(RuntimeHelper::WithCtx);
        context.push(&format!("{helper}("));
    }
    context.push_mapped("(", loc, None);
    gen_node_list(
        params.iter().map(ListItem::Expression).collect(),
        context,
        false,
        true,
    );
    context.push(") => ");
    if *newline || body.is_some() {
        context.push("{");
        context.indent();
    }
    match (returns, body) {
        (Some(returns), _) => {
            if *newline {
                context.push("return ");
            }
            match returns {
                FunctionReturns::TemplateChildren(children) => gen_template_list(children, context),
                FunctionReturns::JSChild(node) => gen_node(node, context),
            }
        }
        (None, Some(body)) => gen_block_statement(body, context),
        (None, None) => {}
    }
    if *newline || body.is_some() {
        context.deindent(false);
        context.push("}");
    }
    if *is_slot {
        context.push(")");
    }
}

fn gen_block_statement(node: &BlockStatement, context: &mut CodegenContext) {
    gen_node_list(node.body.iter().map(ListItem::Js).collect(), context, true, false);
}

fn gen_conditional_expression(node: &ConditionalExpression, context: &mut CodegenContext) {
    let ConditionalExpression {
        test,
        consequent,
        alternate,
        newline: need_newline,
    } = node;
    if let JSChildNode::Simple(test) = test {
        let needs_parens = !is_simple_identifier(&test.content);
        if needs_parens {
            context.push("(");
        }
        gen_expression(test, context);
        if needs_parens {
            context.push(")");
        }
    } else {
        context.push("(");
        gen_node(test, context);
        context.push(")");
    }
    if *need_newline {
        context.indent();
    }
    context.indent_level += 1;
    if !need_newline {
        context.push(" ");
    }
    context.push("? ");
    gen_node(consequent, context);
    context.indent_level -= 1;
    if *need_newline {
        context.newline();
    } else {
        context.push(" ");
    }
    context.push(": ");
    let is_nested = matches!(alternate, JSChildNode::Conditional(_));
    if !is_nested {
        context.indent_level += 1;
    }
    gen_node(alternate, context);
    if !is_nested {
        context.indent_level -= 1;
    }
    if *need_newline {
        context.deindent(true /* without newline */);
    }
}

fn gen_cache_expression(node: &CacheExpression, context: &mut CodegenContext) {
    let CacheExpression {
        index,
        value,
        need_pause_tracking,
        in_v_once,
        ..
    } = node;
    context.push(&format!("_cache[{index}] || ("));
    if *need_pause_tracking {
        context.indent();
        let helper = context.helper(RuntimeHelper::SetBlockTracking);
        context.push(&format!(
            "{helper}(-1{}),",
            if *in_v_once { ", true" } else { "" }
        ));
        context.newline();
    }
    context.push(&format!("_cache[{index}] = "));
    gen_node(value, context);
    if *need_pause_tracking {
        context.push(",");
        context.newline();
        let helper = context.helper(RuntimeHelper::SetBlockTracking);
        context.push(&format!("{helper}(1),"));
        context.newline();
        context.push(&format!("_cache[{index}]"));
        context.deindent(false);
    }
    context.push(")");
}
