use crate::{
    runtime_helpers::RuntimeHelper,
    transform::TransformContext,
};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};
use template_compiler_shared::PatchFlag;

/// Template is a platform-agnostic superset of HTML (syntax only).
/// Platform compilers decide when the namespace switches.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespaces {
    #[default]
    HTML,
    SVG,
    MathML,
}

pub type Namespace = Namespaces;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum NodeTypes {
    Root,
    Element,
    Text,
    Comment,
    SimpleExpression,
    Interpolation,
    Attribute,
    Directive,
    // containers
    CompoundExpression,
    If,
    IfBranch,
    For,
    TextCall,
    // codegen
    VNodeCall,
    JsCallExpression,
    JsObjectExpression,
    JsArrayExpression,
    JsFunctionExpression,
    JsConditionalExpression,
    JsCacheExpression,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ElementTypes {
    Element,
    Component,
    Slot,
    Template,
}

/// Static types have several levels.
/// Higher levels implies lower levels. e.g. a node that can be stringified
/// can always be hoisted and skipped for patch.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub enum ConstantTypes {
    #[default]
    NotConstant,
    CanSkipPatch,
    CanHoist,
    CanStringify,
}

/// The node's range. The `start` is inclusive and `end` is exclusive.
/// [start, end)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
    pub source: String,
}

impl SourceLocation {
    /// Some expressions, e.g. sequence and conditional expressions, are never
    /// associated with template nodes, so their source locations are just a stub.
    /// Container types like CompoundExpression also don't need a real location.
    pub fn loc_stub() -> Self {
        Self {
            start: Position::default(),
            end: Position::default(),
            source: String::new(),
        }
    }

    pub fn is_stub(&self) -> bool {
        self == &Self::loc_stub()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// byte offset from start of file
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

/// Index of a template node inside an [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Arena holding every template node of one compile. The root always lives
/// at index 0; nodes detached during transforms stay allocated but are no
/// longer reachable from it.
#[derive(Debug, Clone)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Default for Ast {
    fn default() -> Self {
        Self::new(RootNode::default())
    }
}

impl Ast {
    pub fn new(root: RootNode) -> Self {
        Self {
            nodes: vec![Node::Root(root)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn root_node(&self) -> &RootNode {
        let Node::Root(root) = &self.nodes[0] else {
            unreachable!();
        };
        root
    }

    pub fn root_node_mut(&mut self) -> &mut RootNode {
        let Node::Root(root) = &mut self.nodes[0] else {
            unreachable!();
        };
        root
    }

    pub fn alloc(&mut self, node: impl Into<Node>) -> NodeId {
        self.nodes.push(node.into());
        NodeId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementNode> {
        match self.get(id) {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementNode> {
        match self.get_mut(id) {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Children of container nodes; leaves have none.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).children().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn children_mut(&mut self, id: NodeId) -> Option<&mut Vec<NodeId>> {
        self.get_mut(id).children_mut()
    }

    /// Number of nodes reachable from the root.
    pub fn reachable_count(&self) -> usize {
        let mut stack = vec![self.root()];
        let mut count = 0;
        while let Some(id) = stack.pop() {
            count += 1;
            match self.get(id) {
                Node::If(node) => stack.extend(node.branches.iter().copied()),
                Node::TextCall(node) => stack.push(node.content),
                node => stack.extend(node.children().into_iter().flatten().copied()),
            }
        }
        count
    }
}

impl Index<NodeId> for Ast {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Self::Output {
        self.get(id)
    }
}

impl IndexMut<NodeId> for Ast {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        self.get_mut(id)
    }
}

/// Template-structure nodes stored in the arena.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Root(RootNode),
    Element(ElementNode),
    Text(TextNode),
    Comment(CommentNode),
    Interpolation(InterpolationNode),
    Compound(CompoundExpressionNode),
    If(IfNode),
    IfBranch(IfBranchNode),
    For(ForNode),
    TextCall(TextCallNode),
}

impl Node {
    pub fn type_(&self) -> NodeTypes {
        match self {
            Self::Root(_) => NodeTypes::Root,
            Self::Element(_) => NodeTypes::Element,
            Self::Text(_) => NodeTypes::Text,
            Self::Comment(_) => NodeTypes::Comment,
            Self::Interpolation(_) => NodeTypes::Interpolation,
            Self::Compound(_) => NodeTypes::CompoundExpression,
            Self::If(_) => NodeTypes::If,
            Self::IfBranch(_) => NodeTypes::IfBranch,
            Self::For(_) => NodeTypes::For,
            Self::TextCall(_) => NodeTypes::TextCall,
        }
    }

    pub fn loc(&self) -> &SourceLocation {
        match self {
            Self::Root(node) => &node.loc,
            Self::Element(node) => &node.loc,
            Self::Text(node) => &node.loc,
            Self::Comment(node) => &node.loc,
            Self::Interpolation(node) => &node.loc,
            Self::Compound(node) => &node.loc,
            Self::If(node) => &node.loc,
            Self::IfBranch(node) => &node.loc,
            Self::For(node) => &node.loc,
            Self::TextCall(node) => &node.loc,
        }
    }

    pub fn children(&self) -> Option<&Vec<NodeId>> {
        match self {
            Self::Root(node) => Some(&node.children),
            Self::Element(node) => Some(&node.children),
            Self::IfBranch(node) => Some(&node.children),
            Self::For(node) => Some(&node.children),
            Self::Text(_)
            | Self::Comment(_)
            | Self::Interpolation(_)
            | Self::Compound(_)
            | Self::If(_)
            | Self::TextCall(_) => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match self {
            Self::Root(node) => Some(&mut node.children),
            Self::Element(node) => Some(&mut node.children),
            Self::IfBranch(node) => Some(&mut node.children),
            Self::For(node) => Some(&mut node.children),
            Self::Text(_)
            | Self::Comment(_)
            | Self::Interpolation(_)
            | Self::Compound(_)
            | Self::If(_)
            | Self::TextCall(_) => None,
        }
    }

    /// The codegen node attached during the exit phase of element, `v-if` and
    /// `v-for` processing.
    pub fn codegen_node(&self) -> Option<&JSChildNode> {
        match self {
            Self::Element(node) => node.codegen_node.as_ref(),
            Self::If(node) => node.codegen_node.as_ref(),
            Self::For(node) => node.codegen_node.as_ref(),
            _ => None,
        }
    }

    pub fn codegen_node_mut(&mut self) -> Option<&mut Option<JSChildNode>> {
        match self {
            Self::Element(node) => Some(&mut node.codegen_node),
            Self::If(node) => Some(&mut node.codegen_node),
            Self::For(node) => Some(&mut node.codegen_node),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_) | Self::Interpolation(_))
    }
}

impl From<ElementNode> for Node {
    fn from(node: ElementNode) -> Self {
        Self::Element(node)
    }
}

impl From<TextNode> for Node {
    fn from(node: TextNode) -> Self {
        Self::Text(node)
    }
}

impl From<CommentNode> for Node {
    fn from(node: CommentNode) -> Self {
        Self::Comment(node)
    }
}

impl From<InterpolationNode> for Node {
    fn from(node: InterpolationNode) -> Self {
        Self::Interpolation(node)
    }
}

impl From<IfNode> for Node {
    fn from(node: IfNode) -> Self {
        Self::If(node)
    }
}

impl From<IfBranchNode> for Node {
    fn from(node: IfBranchNode) -> Self {
        Self::IfBranch(node)
    }
}

impl From<ForNode> for Node {
    fn from(node: ForNode) -> Self {
        Self::For(node)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RootCodegenNode {
    TemplateChild(NodeId),
    JSChild(JSChildNode),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RootNode {
    pub source: String,
    pub children: Vec<NodeId>,
    pub helpers: IndexSet<RuntimeHelper>,
    pub components: Vec<String>,
    pub directives: Vec<String>,
    pub hoists: Vec<JSChildNode>,
    pub cached: usize,
    pub temps: usize,
    pub codegen_node: Option<RootCodegenNode>,
    pub transformed: bool,
    pub loc: SourceLocation,
}

impl RootNode {
    pub fn new(children: Vec<NodeId>, source: Option<String>) -> Self {
        Self {
            source: source.unwrap_or_default(),
            children,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    pub ns: Namespace,
    pub tag: String,
    pub tag_type: ElementTypes,
    pub props: Vec<BaseElementProps>,
    pub children: Vec<NodeId>,
    pub is_self_closing: bool,
    pub codegen_node: Option<JSChildNode>,
    pub loc: SourceLocation,
}

impl ElementNode {
    pub fn new(tag: impl Into<String>, ns: Namespace, loc: SourceLocation) -> Self {
        Self {
            ns,
            tag: tag.into(),
            tag_type: ElementTypes::Element,
            props: Vec::new(),
            children: Vec::new(),
            is_self_closing: false,
            codegen_node: None,
            loc,
        }
    }

    pub fn is_component(&self) -> bool {
        self.tag_type == ElementTypes::Component
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum BaseElementProps {
    Attribute(AttributeNode),
    Directive(DirectiveNode),
}

impl BaseElementProps {
    pub fn name(&self) -> &str {
        match self {
            Self::Attribute(el) => &el.name,
            Self::Directive(el) => &el.name,
        }
    }

    pub fn loc(&self) -> &SourceLocation {
        match self {
            Self::Attribute(el) => &el.loc,
            Self::Directive(el) => &el.loc,
        }
    }

    pub fn type_(&self) -> NodeTypes {
        match self {
            Self::Attribute(_) => NodeTypes::Attribute,
            Self::Directive(_) => NodeTypes::Directive,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct TextNode {
    pub content: String,
    pub loc: SourceLocation,
}

impl TextNode {
    pub fn new(content: impl Into<String>, loc: SourceLocation) -> Self {
        Self {
            content: content.into(),
            loc,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct CommentNode {
    pub content: String,
    pub loc: SourceLocation,
}

impl CommentNode {
    pub fn new(content: impl Into<String>, loc: SourceLocation) -> Self {
        Self {
            content: content.into(),
            loc,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct AttributeNode {
    pub name: String,
    pub name_loc: SourceLocation,
    pub value: Option<TextNode>,
    pub loc: SourceLocation,
}

#[derive(Debug, PartialEq, Clone)]
pub struct DirectiveNode {
    /// the normalized name without prefix or shorthands, e.g. "bind", "on"
    pub name: String,
    /// the raw attribute name, preserving shorthand, and including arg & modifiers
    pub raw_name: String,
    pub exp: Option<ExpressionNode>,
    pub arg: Option<ExpressionNode>,
    pub modifiers: Vec<String>,
    /// optional property to cache the expression parse result for v-for
    pub for_parse_result: Option<ForParseResult>,
    pub loc: SourceLocation,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ExpressionNode {
    Simple(SimpleExpressionNode),
    Compound(CompoundExpressionNode),
}

impl ExpressionNode {
    pub fn new_simple(
        content: impl Into<String>,
        is_static: Option<bool>,
        loc: Option<SourceLocation>,
        const_type: Option<ConstantTypes>,
    ) -> Self {
        Self::Simple(SimpleExpressionNode::new(
            content, is_static, loc, const_type,
        ))
    }

    pub fn loc(&self) -> &SourceLocation {
        match self {
            Self::Simple(node) => &node.loc,
            Self::Compound(node) => &node.loc,
        }
    }

    pub fn as_simple(&self) -> Option<&SimpleExpressionNode> {
        match self {
            Self::Simple(node) => Some(node),
            Self::Compound(_) => None,
        }
    }

    /// Whether this is a static simple expression, e.g. a plain directive argument.
    pub fn is_static_exp(&self) -> bool {
        matches!(self, Self::Simple(node) if node.is_static)
    }

    pub fn identifiers(&self) -> &[String] {
        let identifiers = match self {
            Self::Simple(node) => &node.identifiers,
            Self::Compound(node) => &node.identifiers,
        };
        identifiers.as_deref().unwrap_or(&[])
    }

    pub fn set_handler_key(&mut self) {
        match self {
            Self::Simple(node) => node.is_handler_key = true,
            Self::Compound(node) => node.is_handler_key = true,
        }
    }

    pub fn is_handler_key(&self) -> bool {
        match self {
            Self::Simple(node) => node.is_handler_key,
            Self::Compound(node) => node.is_handler_key,
        }
    }

    /// The expression text as it would be generated, helpers spelled with
    /// their `_` alias.
    pub fn stringify(&self) -> String {
        match self {
            Self::Simple(node) => node.content.clone(),
            Self::Compound(node) => node.stringify(),
        }
    }
}

impl From<SimpleExpressionNode> for ExpressionNode {
    fn from(node: SimpleExpressionNode) -> Self {
        Self::Simple(node)
    }
}

impl From<CompoundExpressionNode> for ExpressionNode {
    fn from(node: CompoundExpressionNode) -> Self {
        Self::Compound(node)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct SimpleExpressionNode {
    pub content: String,
    pub is_static: bool,
    pub const_type: ConstantTypes,
    /// an expression parsed as the params of a function will track
    /// the identifiers declared inside the function body.
    pub identifiers: Option<Vec<String>>,
    pub is_handler_key: bool,
    pub loc: SourceLocation,
}

impl SimpleExpressionNode {
    pub fn new(
        content: impl Into<String>,
        is_static: Option<bool>,
        loc: Option<SourceLocation>,
        const_type: Option<ConstantTypes>,
    ) -> Self {
        let is_static = is_static.unwrap_or_default();
        Self {
            content: content.into(),
            is_static,
            // static content is always a string literal
            const_type: if is_static {
                ConstantTypes::CanStringify
            } else {
                const_type.unwrap_or_default()
            },
            identifiers: None,
            is_handler_key: false,
            loc: loc.unwrap_or_else(SourceLocation::loc_stub),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum CompoundExpressionNodeChild {
    Simple(SimpleExpressionNode),
    Compound(CompoundExpressionNode),
    Interpolation(InterpolationNode),
    Text(TextNode),
    String(String),
    Symbol(RuntimeHelper),
    JSChild(Box<JSChildNode>),
}

impl From<&str> for CompoundExpressionNodeChild {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for CompoundExpressionNodeChild {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<ExpressionNode> for CompoundExpressionNodeChild {
    fn from(value: ExpressionNode) -> Self {
        match value {
            ExpressionNode::Simple(node) => Self::Simple(node),
            ExpressionNode::Compound(node) => Self::Compound(node),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct CompoundExpressionNode {
    pub children: Vec<CompoundExpressionNodeChild>,
    /// an expression parsed as the params of a function will track
    /// the identifiers declared inside the function body.
    pub identifiers: Option<Vec<String>>,
    pub is_handler_key: bool,
    pub loc: SourceLocation,
}

impl CompoundExpressionNode {
    pub fn new(children: Vec<CompoundExpressionNodeChild>, loc: Option<SourceLocation>) -> Self {
        Self {
            children,
            identifiers: None,
            is_handler_key: false,
            loc: loc.unwrap_or_else(SourceLocation::loc_stub),
        }
    }

    pub fn stringify(&self) -> String {
        self.children
            .iter()
            .map(|child| match child {
                CompoundExpressionNodeChild::Simple(node) => node.content.clone(),
                CompoundExpressionNodeChild::Compound(node) => node.stringify(),
                CompoundExpressionNodeChild::Interpolation(node) => node.content.stringify(),
                CompoundExpressionNodeChild::Text(node) => node.content.clone(),
                CompoundExpressionNodeChild::String(s) => s.clone(),
                CompoundExpressionNodeChild::Symbol(helper) => format!("_{helper}"),
                CompoundExpressionNodeChild::JSChild(_) => String::new(),
            })
            .collect()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct InterpolationNode {
    pub content: ExpressionNode,
    pub loc: SourceLocation,
}

impl InterpolationNode {
    pub fn new(content: ExpressionNode, loc: SourceLocation) -> Self {
        Self { content, loc }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct IfNode {
    pub branches: Vec<NodeId>,
    pub codegen_node: Option<JSChildNode>,
    pub loc: SourceLocation,
}

#[derive(Debug, PartialEq, Clone)]
pub struct IfBranchNode {
    /// else
    pub condition: Option<ExpressionNode>,
    pub children: Vec<NodeId>,
    pub user_key: Option<BaseElementProps>,
    pub is_template_if: bool,
    pub loc: SourceLocation,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ForParseResult {
    pub source: ExpressionNode,
    pub value: Option<ExpressionNode>,
    pub key: Option<ExpressionNode>,
    pub index: Option<ExpressionNode>,
    pub finalized: bool,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ForNode {
    pub source: ExpressionNode,
    pub value_alias: Option<ExpressionNode>,
    pub key_alias: Option<ExpressionNode>,
    pub object_index_alias: Option<ExpressionNode>,
    pub parse_result: ForParseResult,
    pub children: Vec<NodeId>,
    pub codegen_node: Option<JSChildNode>,
    pub loc: SourceLocation,
}

#[derive(Debug, PartialEq, Clone)]
pub struct TextCallNode {
    /// a Text, Interpolation or Compound node
    pub content: NodeId,
    pub codegen_node: JSChildNode,
    pub loc: SourceLocation,
}

// JS Node Types ---------------------------------------------------------------

#[derive(Debug, PartialEq, Clone)]
pub enum JSChildNode {
    VNodeCall(Box<VNodeCall>),
    Call(CallExpression),
    Object(ObjectExpression),
    Array(ArrayExpression),
    Function(Box<FunctionExpression>),
    Conditional(Box<ConditionalExpression>),
    Cache(Box<CacheExpression>),
    Simple(SimpleExpressionNode),
    Compound(CompoundExpressionNode),
    /// Renders an arena node through its own codegen node, so later passes
    /// that rewrite that node are reflected here.
    Node(NodeId),
}

impl JSChildNode {
    pub fn simple(content: impl Into<String>) -> Self {
        Self::Simple(SimpleExpressionNode::new(content, Some(false), None, None))
    }
}

impl From<ExpressionNode> for JSChildNode {
    fn from(node: ExpressionNode) -> Self {
        match node {
            ExpressionNode::Simple(node) => Self::Simple(node),
            ExpressionNode::Compound(node) => Self::Compound(node),
        }
    }
}

impl From<SimpleExpressionNode> for JSChildNode {
    fn from(node: SimpleExpressionNode) -> Self {
        Self::Simple(node)
    }
}

impl From<CompoundExpressionNode> for JSChildNode {
    fn from(node: CompoundExpressionNode) -> Self {
        Self::Compound(node)
    }
}

impl From<VNodeCall> for JSChildNode {
    fn from(node: VNodeCall) -> Self {
        Self::VNodeCall(Box::new(node))
    }
}

impl From<CallExpression> for JSChildNode {
    fn from(node: CallExpression) -> Self {
        Self::Call(node)
    }
}

impl From<ObjectExpression> for JSChildNode {
    fn from(node: ObjectExpression) -> Self {
        Self::Object(node)
    }
}

impl From<ArrayExpression> for JSChildNode {
    fn from(node: ArrayExpression) -> Self {
        Self::Array(node)
    }
}

impl From<FunctionExpression> for JSChildNode {
    fn from(node: FunctionExpression) -> Self {
        Self::Function(Box::new(node))
    }
}

impl From<ConditionalExpression> for JSChildNode {
    fn from(node: ConditionalExpression) -> Self {
        Self::Conditional(Box::new(node))
    }
}

impl From<CacheExpression> for JSChildNode {
    fn from(node: CacheExpression) -> Self {
        Self::Cache(Box::new(node))
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum VNodeCallTag {
    String(String),
    Symbol(RuntimeHelper),
    Call(CallExpression),
}

#[derive(Debug, PartialEq, Clone)]
pub enum VNodeCallChildren {
    /// multiple children
    TemplateChildNodeList(Vec<NodeId>),
    /// single text child
    TemplateTextChildNode(NodeId),
    /// component slots, v-for render list or a hoisted reference
    JSChild(JSChildNode),
}

#[derive(Debug, PartialEq, Clone)]
pub struct VNodeCall {
    pub tag: VNodeCallTag,
    pub props: Option<JSChildNode>,
    pub children: Option<VNodeCallChildren>,
    pub patch_flag: Option<PatchFlag>,
    pub dynamic_props: Option<String>,
    pub directives: Option<ArrayExpression>,
    pub is_block: bool,
    pub disable_tracking: bool,
    pub is_component: bool,
    pub loc: SourceLocation,
}

impl VNodeCall {
    /// Registers the helpers the call needs when a context is given.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        context: Option<&mut TransformContext>,
        tag: VNodeCallTag,
        props: Option<JSChildNode>,
        children: Option<VNodeCallChildren>,
        patch_flag: Option<PatchFlag>,
        dynamic_props: Option<String>,
        directives: Option<ArrayExpression>,
        is_block: Option<bool>,
        disable_tracking: Option<bool>,
        is_component: Option<bool>,
        loc: Option<SourceLocation>,
    ) -> Self {
        let is_block = is_block.unwrap_or_default();
        let is_component = is_component.unwrap_or_default();
        if let Some(context) = context {
            if is_block {
                context.helper(RuntimeHelper::OpenBlock);
                context.helper(get_vnode_block_helper(is_component));
            } else {
                context.helper(get_vnode_helper(is_component));
            }
            if directives.is_some() {
                context.helper(RuntimeHelper::WithDirectives);
            }
        }

        Self {
            tag,
            props,
            children,
            patch_flag,
            dynamic_props,
            directives,
            is_block,
            disable_tracking: disable_tracking.unwrap_or_default(),
            is_component,
            loc: loc.unwrap_or_else(SourceLocation::loc_stub),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum CallCallee {
    String(String),
    Symbol(RuntimeHelper),
}

impl From<RuntimeHelper> for CallCallee {
    fn from(value: RuntimeHelper) -> Self {
        Self::Symbol(value)
    }
}

impl From<String> for CallCallee {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum CallArgument {
    String(String),
    JSChild(JSChildNode),
    TemplateChild(NodeId),
    TemplateChildren(Vec<NodeId>),
}

impl From<&str> for CallArgument {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for CallArgument {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<JSChildNode> for CallArgument {
    fn from(value: JSChildNode) -> Self {
        Self::JSChild(value)
    }
}

impl From<ExpressionNode> for CallArgument {
    fn from(value: ExpressionNode) -> Self {
        Self::JSChild(value.into())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct CallExpression {
    pub callee: CallCallee,
    pub arguments: Vec<CallArgument>,
    pub loc: SourceLocation,
}

impl CallExpression {
    pub fn new(
        callee: impl Into<CallCallee>,
        arguments: Option<Vec<CallArgument>>,
        loc: Option<SourceLocation>,
    ) -> Self {
        Self {
            callee: callee.into(),
            arguments: arguments.unwrap_or_default(),
            loc: loc.unwrap_or_else(SourceLocation::loc_stub),
        }
    }

    pub fn is_helper(&self, helper: RuntimeHelper) -> bool {
        self.callee == CallCallee::Symbol(helper)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct ObjectExpression {
    pub properties: Vec<Property>,
    pub loc: SourceLocation,
}

impl ObjectExpression {
    pub fn new(properties: Vec<Property>, loc: Option<SourceLocation>) -> Self {
        Self {
            properties,
            loc: loc.unwrap_or_else(SourceLocation::loc_stub),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Property {
    pub key: ExpressionNode,
    pub value: JSChildNode,
    pub loc: SourceLocation,
}

impl Property {
    pub fn new(key: ExpressionNode, value: JSChildNode) -> Self {
        Self {
            key,
            value,
            loc: SourceLocation::loc_stub(),
        }
    }

    /// A property with a static key, e.g. `key` or `onClick`.
    pub fn with_static_key(key: impl Into<String>, value: JSChildNode) -> Self {
        Self::new(
            ExpressionNode::new_simple(key, Some(true), None, None),
            value,
        )
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct ArrayExpression {
    pub elements: Vec<JSChildNode>,
    pub loc: SourceLocation,
}

impl ArrayExpression {
    pub fn new(elements: Vec<JSChildNode>, loc: Option<SourceLocation>) -> Self {
        Self {
            elements,
            loc: loc.unwrap_or_else(SourceLocation::loc_stub),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum FunctionReturns {
    TemplateChildren(Vec<NodeId>),
    JSChild(JSChildNode),
}

#[derive(Debug, PartialEq, Clone)]
pub struct BlockStatement {
    pub body: Vec<JSChildNode>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionExpression {
    pub params: Vec<ExpressionNode>,
    pub returns: Option<FunctionReturns>,
    pub body: Option<BlockStatement>,
    pub newline: bool,
    /// This flag is for codegen to determine whether it needs to generate the
    /// withCtx wrapper.
    pub is_slot: bool,
    pub loc: SourceLocation,
}

impl FunctionExpression {
    pub fn new(
        params: Vec<ExpressionNode>,
        returns: Option<FunctionReturns>,
        newline: Option<bool>,
        is_slot: Option<bool>,
        loc: Option<SourceLocation>,
    ) -> Self {
        Self {
            params,
            returns,
            body: None,
            newline: newline.unwrap_or_default(),
            is_slot: is_slot.unwrap_or_default(),
            loc: loc.unwrap_or_else(SourceLocation::loc_stub),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct ConditionalExpression {
    pub test: JSChildNode,
    pub consequent: JSChildNode,
    pub alternate: JSChildNode,
    pub newline: bool,
}

#[derive(Debug, PartialEq, Clone)]
pub struct CacheExpression {
    pub index: usize,
    pub value: JSChildNode,
    pub need_pause_tracking: bool,
    pub in_v_once: bool,
    pub loc: SourceLocation,
}

pub fn get_vnode_helper(is_component: bool) -> RuntimeHelper {
    if is_component {
        RuntimeHelper::CreateVNode
    } else {
        RuntimeHelper::CreateElementVNode
    }
}

pub fn get_vnode_block_helper(is_component: bool) -> RuntimeHelper {
    if is_component {
        RuntimeHelper::CreateBlock
    } else {
        RuntimeHelper::CreateElementBlock
    }
}

pub fn convert_to_block(node: &mut VNodeCall, context: &mut TransformContext) {
    if !node.is_block {
        node.is_block = true;
        context.remove_helper(get_vnode_helper(node.is_component));
        context.helper(RuntimeHelper::OpenBlock);
        context.helper(get_vnode_block_helper(node.is_component));
    }
}
