use crate::{
    ast::{
        Ast, BaseElementProps, CacheExpression, ConstantTypes, DirectiveNode, ElementTypes,
        ExpressionNode, JSChildNode, Node, NodeId, Property, RootCodegenNode,
        SimpleExpressionNode, SourceLocation, VNodeCall, VNodeCallChildren, VNodeCallTag,
        convert_to_block,
    },
    errors::{CompilerError, ErrorCodes},
    options::{BuiltInComponentResolver, ErrorHandlingOptions, TagPredicate, TransformOptions},
    runtime_helpers::RuntimeHelper,
    transforms::hoist_static::hoist_static,
    utils::is_slot_outlet,
};
use indexmap::{IndexMap, IndexSet};
use std::{collections::HashMap, fmt::Debug, rc::Rc};
use template_compiler_shared::{PatchFlag, PatchFlags};

/// Callback returned by a node transform, run after the node's children
/// have been traversed.
pub type ExitFn = Box<dyn FnOnce(&mut TransformContext) -> Result<(), CompilerError>>;

/// There are two types of transforms:
///
/// - NodeTransform:
///   Transforms that operate directly on a template node. NodeTransforms may
///   mutate, replace or remove the node being processed.
pub trait NodeTransform: Debug {
    fn transform(
        &self,
        node: NodeId,
        context: &mut TransformContext,
    ) -> Result<Option<ExitFn>, CompilerError>;
}

/// - DirectiveTransform:
///   Transforms that handles a single directive attribute on an element.
///   It translates the raw directive into actual props for the VNode.
pub trait DirectiveTransform: Debug {
    fn transform(
        &self,
        dir: &DirectiveNode,
        node: NodeId,
        context: &mut TransformContext,
    ) -> Result<DirectiveTransformResult, CompilerError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeedRuntime {
    /// resolve the directive at runtime
    Yes,
    /// use the given helper as the directive
    Helper(RuntimeHelper),
}

#[derive(Debug, Default)]
pub struct DirectiveTransformResult {
    pub props: Vec<Property>,
    pub need_runtime: Option<NeedRuntime>,
}

impl DirectiveTransformResult {
    pub fn new(props: Vec<Property>) -> Self {
        Self {
            props,
            need_runtime: None,
        }
    }
}

/// Structural directives (`v-if`, `v-for`) replace the element they sit on.
pub trait StructuralDirectiveTransform: Debug {
    fn matches(&self, name: &str) -> bool;

    fn process(
        &self,
        node: NodeId,
        dir: DirectiveNode,
        context: &mut TransformContext,
    ) -> Result<Option<ExitFn>, CompilerError>;

    /// Removes matching directives from the element and processes the first
    /// one. Structural directives are removed *before* applying so the node
    /// can be traversed again once it has been moved around.
    fn apply(
        &self,
        node: NodeId,
        context: &mut TransformContext,
    ) -> Result<Option<ExitFn>, CompilerError> {
        let Some(element) = context.ast.element_mut(node) else {
            return Ok(None);
        };
        // structural directive transforms are not concerned with slots
        // as they are handled separately in vSlot
        if element.tag_type == ElementTypes::Template
            && element.props.iter().any(|p| is_v_slot(p))
        {
            return Ok(None);
        }

        let mut matched = Vec::new();
        let mut i = 0;
        while i < element.props.len() {
            match &element.props[i] {
                BaseElementProps::Directive(dir) if self.matches(&dir.name) => {
                    let BaseElementProps::Directive(dir) = element.props.remove(i) else {
                        unreachable!();
                    };
                    matched.push(dir);
                }
                _ => i += 1,
            }
        }

        let mut matched = matched.into_iter();
        let Some(first) = matched.next() else {
            return Ok(None);
        };
        for duplicate in matched {
            context.on_error(ErrorCodes::XDuplicateStructuralDirective, Some(duplicate.loc))?;
        }
        self.process(node, first, context)
    }
}

pub fn is_v_slot(prop: &BaseElementProps) -> bool {
    matches!(prop, BaseElementProps::Directive(dir) if dir.name == "slot")
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Scopes {
    pub v_for: usize,
    pub v_slot: usize,
    pub v_pre: usize,
    pub v_once: usize,
}

pub struct TransformContext {
    pub ast: Ast,

    // options
    pub prefix_identifiers: bool,
    pub hoist_static: bool,
    pub hoist_static_threshold: usize,
    pub cache_handlers: bool,
    pub self_name: Option<String>,
    pub filename: String,
    pub dev: bool,
    pub is_built_in_component: Option<BuiltInComponentResolver>,
    pub is_custom_element: Option<TagPredicate>,
    pub error_handling_options: Rc<dyn ErrorHandlingOptions>,
    node_transforms: Rc<Vec<Box<dyn NodeTransform>>>,
    directive_transforms: Rc<HashMap<String, Box<dyn DirectiveTransform>>>,

    // state
    helpers: IndexMap<RuntimeHelper, usize>,
    pub components: IndexSet<String>,
    pub directives: IndexSet<String>,
    pub hoists: Vec<JSChildNode>,
    pub temps: usize,
    pub cached: usize,
    pub identifiers: HashMap<String, usize>,
    pub scopes: Scopes,
    pub parent: Option<NodeId>,
    // we could use a stack but in practice we've only ever needed two layers up
    // so this is more efficient
    pub grand_parent: Option<NodeId>,
    pub child_index: usize,
    pub current_node: Option<NodeId>,
    pub in_v_once: bool,
    removed_before_index: usize,
}

impl Debug for TransformContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformContext")
            .field("prefix_identifiers", &self.prefix_identifiers)
            .field("hoist_static", &self.hoist_static)
            .field("cache_handlers", &self.cache_handlers)
            .field("helpers", &self.helpers)
            .field("components", &self.components)
            .field("directives", &self.directives)
            .field("scopes", &self.scopes)
            .field("parent", &self.parent)
            .field("child_index", &self.child_index)
            .field("current_node", &self.current_node)
            .finish_non_exhaustive()
    }
}

impl TransformContext {
    pub fn new(ast: Ast, options: TransformOptions) -> Self {
        let root = ast.root();
        Self {
            ast,
            prefix_identifiers: options.prefix_identifiers,
            hoist_static: options.hoist_static,
            hoist_static_threshold: options.hoist_static_threshold,
            cache_handlers: options.cache_handlers,
            self_name: options.self_name,
            filename: options.filename,
            dev: options.dev,
            is_built_in_component: options.is_built_in_component,
            is_custom_element: options.is_custom_element,
            error_handling_options: options.error_handling_options,
            node_transforms: Rc::new(options.node_transforms),
            directive_transforms: Rc::new(options.directive_transforms),

            helpers: IndexMap::new(),
            components: IndexSet::new(),
            directives: IndexSet::new(),
            hoists: Vec::new(),
            temps: 0,
            cached: 0,
            identifiers: HashMap::new(),
            scopes: Scopes::default(),
            parent: None,
            grand_parent: None,
            child_index: 0,
            current_node: Some(root),
            in_v_once: false,
            removed_before_index: 0,
        }
    }

    pub fn helper(&mut self, name: RuntimeHelper) -> RuntimeHelper {
        *self.helpers.entry(name).or_default() += 1;
        name
    }

    pub fn remove_helper(&mut self, name: RuntimeHelper) {
        if let Some(count) = self.helpers.get_mut(&name) {
            if *count <= 1 {
                self.helpers.shift_remove(&name);
            } else {
                *count -= 1;
            }
        }
    }

    pub fn helper_string(&mut self, name: RuntimeHelper) -> String {
        self.helper(name).alias()
    }

    pub fn has_helper(&self, name: RuntimeHelper) -> bool {
        self.helpers.contains_key(&name)
    }

    pub fn on_error(
        &self,
        code: ErrorCodes,
        loc: Option<SourceLocation>,
    ) -> Result<(), CompilerError> {
        self.error_handling_options
            .on_error(CompilerError::new(code, loc))
    }

    pub fn on_warn(&self, code: ErrorCodes, loc: Option<SourceLocation>) {
        self.error_handling_options
            .on_warn(CompilerError::new(code, loc));
    }

    pub fn directive_transform(&self, name: &str) -> Option<&dyn DirectiveTransform> {
        self.directive_transforms.get(name).map(Box::as_ref)
    }

    pub fn directive_transforms(&self) -> Rc<HashMap<String, Box<dyn DirectiveTransform>>> {
        Rc::clone(&self.directive_transforms)
    }

    /// Puts `node` in place of the current node and makes it current.
    ///
    /// Returns `None` and leaves the tree untouched when the current node is
    /// the root or was already removed.
    pub fn replace_node(&mut self, node: impl Into<Node>) -> Option<NodeId> {
        let (Some(parent), Some(_)) = (self.parent, self.current_node) else {
            tracing::warn!("cannot replace the root node or an already removed node");
            return None;
        };
        let id = self.ast.alloc(node);
        if let Some(children) = self.ast.children_mut(parent) {
            children[self.child_index] = id;
        }
        self.current_node = Some(id);
        Some(id)
    }

    /// Removes `node` from the current parent, or the current node when
    /// `None`. The root node is never removed.
    pub fn remove_node(&mut self, node: Option<NodeId>) {
        let Some(parent) = self.parent else {
            tracing::warn!("cannot remove the root node");
            return;
        };
        let target = node.or(self.current_node);
        let Some(removal_index) = target.and_then(|target| {
            self.ast
                .children(parent)
                .iter()
                .position(|child| *child == target)
        }) else {
            return;
        };
        if node.is_none() || node == self.current_node {
            // current node removed
            self.current_node = None;
            self.removed_before_index += 1;
        } else if self.child_index > removal_index {
            // sibling node removed
            self.child_index -= 1;
            self.removed_before_index += 1;
        }
        if let Some(children) = self.ast.children_mut(parent) {
            children.remove(removal_index);
        }
    }

    pub fn add_identifiers(&mut self, exp: &ExpressionNode) {
        match exp {
            ExpressionNode::Simple(node) if node.identifiers.is_none() => {
                self.add_id(node.content.clone());
            }
            exp => {
                for id in exp.identifiers().to_vec() {
                    self.add_id(id);
                }
            }
        }
    }

    pub fn remove_identifiers(&mut self, exp: &ExpressionNode) {
        match exp {
            ExpressionNode::Simple(node) if node.identifiers.is_none() => {
                self.remove_id(&node.content);
            }
            exp => {
                for id in exp.identifiers().to_vec() {
                    self.remove_id(&id);
                }
            }
        }
    }

    fn add_id(&mut self, id: String) {
        *self.identifiers.entry(id).or_default() += 1;
    }

    fn remove_id(&mut self, id: &str) {
        if let Some(count) = self.identifiers.get_mut(id) {
            *count -= 1;
            if *count == 0 {
                self.identifiers.remove(id);
            }
        }
    }

    pub fn is_identifier_in_scope(&self, id: &str) -> bool {
        self.identifiers.contains_key(id)
    }

    /// Moves `exp` into the hoist list and returns the `_hoisted_N` reference.
    pub fn hoist(&mut self, exp: JSChildNode) -> SimpleExpressionNode {
        let loc = match &exp {
            JSChildNode::Simple(node) => node.loc.clone(),
            JSChildNode::VNodeCall(node) => node.loc.clone(),
            _ => SourceLocation::loc_stub(),
        };
        self.hoists.push(exp);
        tracing::trace!(index = self.hoists.len(), "hoisted static node");
        SimpleExpressionNode::new(
            format!("_hoisted_{}", self.hoists.len()),
            Some(false),
            Some(loc),
            Some(ConstantTypes::CanHoist),
        )
    }

    pub fn cache(&mut self, exp: JSChildNode, is_vnode: bool, in_v_once: bool) -> CacheExpression {
        let index = self.cached;
        self.cached += 1;
        tracing::trace!(index, is_vnode, "cached expression");
        CacheExpression {
            index,
            value: exp,
            need_pause_tracking: is_vnode,
            in_v_once,
            loc: SourceLocation::loc_stub(),
        }
    }

    pub fn traverse_node(&mut self, node: NodeId) -> Result<(), CompilerError> {
        self.current_node = Some(node);
        // apply transform plugins
        let node_transforms = Rc::clone(&self.node_transforms);
        let mut exit_fns = Vec::new();
        for transform in node_transforms.iter() {
            let Some(current) = self.current_node else {
                // node was removed
                return Ok(());
            };
            if let Some(on_exit) = transform.transform(current, self)? {
                exit_fns.push(on_exit);
            }
            if self.current_node.is_none() {
                return Ok(());
            }
        }
        // node may have been replaced
        let Some(node) = self.current_node else {
            return Ok(());
        };

        match &self.ast[node] {
            Node::Comment(_) => {
                // inject import for the Comment symbol, which is needed for creating
                // comment nodes with `createVNode`
                self.helper(RuntimeHelper::CreateComment);
            }
            Node::Interpolation(_) => {
                // no need to traverse, but we need to inject toString helper
                self.helper(RuntimeHelper::ToDisplayString);
            }
            // for container types, further traverse downwards
            Node::If(if_node) => {
                for branch in if_node.branches.clone() {
                    self.traverse_node(branch)?;
                }
            }
            Node::IfBranch(_) | Node::For(_) | Node::Element(_) | Node::Root(_) => {
                self.traverse_children(node)?;
            }
            Node::Text(_) | Node::Compound(_) | Node::TextCall(_) => {}
        }

        // exit transforms
        self.current_node = Some(node);
        while let Some(on_exit) = exit_fns.pop() {
            on_exit(self)?;
        }
        Ok(())
    }

    pub fn traverse_children(&mut self, parent: NodeId) -> Result<(), CompilerError> {
        let saved = (
            self.parent,
            self.grand_parent,
            self.child_index,
            self.removed_before_index,
        );
        let mut i = 0;
        while i < self.ast.children(parent).len() {
            let child = self.ast.children(parent)[i];
            self.grand_parent = saved.0;
            self.parent = Some(parent);
            self.child_index = i;
            self.removed_before_index = 0;
            self.traverse_node(child)?;
            i = i + 1 - self.removed_before_index.min(i + 1);
        }
        (
            self.parent,
            self.grand_parent,
            self.child_index,
            self.removed_before_index,
        ) = saved;
        Ok(())
    }
}

pub fn transform(ast: &mut Ast, options: TransformOptions) -> Result<(), CompilerError> {
    let hoist = options.hoist_static;
    let mut context = TransformContext::new(std::mem::take(ast), options);
    let root = context.ast.root();

    let result = context.traverse_node(root).and_then(|_| {
        if hoist {
            hoist_static(&mut context);
        }
        create_root_codegen(&mut context);
        Ok(())
    });

    // finalize meta information
    let TransformContext {
        ast: mut finished,
        helpers,
        components,
        directives,
        hoists,
        temps,
        cached,
        ..
    } = context;
    let root_node = finished.root_node_mut();
    root_node.helpers = helpers.into_keys().collect();
    root_node.components = components.into_iter().collect();
    root_node.directives = directives.into_iter().collect();
    root_node.hoists = hoists;
    root_node.temps = temps;
    root_node.cached = cached;
    root_node.transformed = true;
    tracing::debug!(
        helpers = root_node.helpers.len(),
        hoists = root_node.hoists.len(),
        cached = root_node.cached,
        "transform finished"
    );
    *ast = finished;
    result
}

pub(crate) fn is_single_element_root(ast: &Ast, children: &[NodeId]) -> bool {
    matches!(children, [child] if ast.element(*child).is_some() && !is_slot_outlet(ast, *child))
}

fn create_root_codegen(context: &mut TransformContext) {
    let children = context.ast.root_node().children.clone();
    let codegen_node = match children.as_slice() {
        [] => {
            // no children = noop. codegen will return null.
            None
        }
        [child] if is_single_element_root(&context.ast, &children) => {
            // if the single child is an element, turn it into a block.
            // single element root is never hoisted so codegenNode will never be
            // SimpleExpressionNode
            let mut codegen = context
                .ast
                .element_mut(*child)
                .and_then(|el| el.codegen_node.take());
            if let Some(JSChildNode::VNodeCall(vnode)) = &mut codegen {
                convert_to_block(vnode, context);
            }
            if let Some(el) = context.ast.element_mut(*child) {
                el.codegen_node = codegen;
            }
            Some(RootCodegenNode::TemplateChild(*child))
        }
        // - single <slot/>, IfNode, ForNode: already blocks.
        // - single text node: always patched.
        // root codegen falls through via genNode()
        [child] => Some(RootCodegenNode::TemplateChild(*child)),
        _ => {
            // root has multiple nodes - return a fragment block.
            let mut patch_flag = PatchFlags::StableFragment;
            // check if the fragment actually contains a single valid child with
            // the rest being comments
            if context.dev
                && children
                    .iter()
                    .filter(|c| !matches!(context.ast[**c], Node::Comment(_)))
                    .count()
                    == 1
            {
                patch_flag |= PatchFlags::DevRootFragment;
            }
            let tag = context.helper(RuntimeHelper::Fragment);
            Some(RootCodegenNode::JSChild(
                VNodeCall::new(
                    Some(context),
                    VNodeCallTag::Symbol(tag),
                    None,
                    Some(VNodeCallChildren::TemplateChildNodeList(children.clone())),
                    Some(PatchFlag::Flags(patch_flag)),
                    None,
                    None,
                    Some(true),
                    None,
                    /* isComponent */ Some(false),
                    None,
                )
                .into(),
            ))
        }
    };
    context.ast.root_node_mut().codegen_node = codegen_node;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ast::TextNode, parser::base_parse};
    use std::cell::RefCell;

    #[derive(Debug, Default)]
    struct RecordVisits(RefCell<Vec<String>>);

    #[derive(Debug)]
    struct Recorder(Rc<RecordVisits>);

    impl NodeTransform for Recorder {
        fn transform(
            &self,
            node: NodeId,
            context: &mut TransformContext,
        ) -> Result<Option<ExitFn>, CompilerError> {
            let name = match &context.ast[node] {
                Node::Root(_) => "root".to_string(),
                Node::Element(el) => el.tag.clone(),
                Node::Text(text) => format!("text:{}", text.content),
                node => format!("{:?}", node.type_()),
            };
            self.0.0.borrow_mut().push(format!("enter {name}"));
            let visits = Rc::clone(&self.0);
            Ok(Some(Box::new(move |_| {
                visits.0.borrow_mut().push(format!("exit {name}"));
                Ok(())
            })))
        }
    }

    #[test]
    fn visits_in_document_order() {
        let mut ast = base_parse("<div>hi<span/></div>", None).unwrap();
        let visits = Rc::new(RecordVisits::default());
        transform(
            &mut ast,
            TransformOptions {
                node_transforms: vec![Box::new(Recorder(Rc::clone(&visits)))],
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            *visits.0.borrow(),
            vec![
                "enter root",
                "enter div",
                "enter text:hi",
                "exit text:hi",
                "enter span",
                "exit span",
                "exit div",
                "exit root",
            ]
        );
    }

    #[derive(Debug)]
    struct RemoveText;

    impl NodeTransform for RemoveText {
        fn transform(
            &self,
            node: NodeId,
            context: &mut TransformContext,
        ) -> Result<Option<ExitFn>, CompilerError> {
            if matches!(context.ast[node], Node::Text(_)) {
                context.remove_node(None);
            }
            Ok(None)
        }
    }

    #[test]
    fn removing_current_node_keeps_siblings() {
        let mut ast = base_parse("<div>a<b/>c<i/></div>", None).unwrap();
        transform(
            &mut ast,
            TransformOptions {
                node_transforms: vec![Box::new(RemoveText)],
                ..Default::default()
            },
        )
        .unwrap();
        let div = ast.root_node().children[0];
        let tags: Vec<_> = ast
            .children(div)
            .iter()
            .filter_map(|c| ast.element(*c).map(|el| el.tag.clone()))
            .collect();
        assert_eq!(ast.children(div).len(), 2);
        assert_eq!(tags, vec!["b", "i"]);
    }

    #[derive(Debug)]
    struct ReplaceSpan;

    impl NodeTransform for ReplaceSpan {
        fn transform(
            &self,
            node: NodeId,
            context: &mut TransformContext,
        ) -> Result<Option<ExitFn>, CompilerError> {
            if context.ast.element(node).is_some_and(|el| el.tag == "span") {
                context.replace_node(TextNode::new("replaced", SourceLocation::loc_stub()));
            }
            Ok(None)
        }
    }

    #[test]
    fn replaced_node_takes_the_slot() {
        let mut ast = base_parse("<div><span/></div>", None).unwrap();
        transform(
            &mut ast,
            TransformOptions {
                node_transforms: vec![Box::new(ReplaceSpan)],
                ..Default::default()
            },
        )
        .unwrap();
        let div = ast.root_node().children[0];
        let child = ast.children(div)[0];
        assert!(matches!(&ast[child], Node::Text(t) if t.content == "replaced"));
    }

    #[derive(Debug)]
    struct ReplaceAll;

    impl NodeTransform for ReplaceAll {
        fn transform(
            &self,
            node: NodeId,
            context: &mut TransformContext,
        ) -> Result<Option<ExitFn>, CompilerError> {
            if matches!(context.ast[node], Node::Root(_)) {
                let text = TextNode::new("x", SourceLocation::loc_stub());
                assert_eq!(context.replace_node(text), None);
                context.remove_node(None);
            }
            Ok(None)
        }
    }

    #[test]
    fn root_node_cannot_be_replaced_or_removed() {
        let mut ast = base_parse("<div/>", None).unwrap();
        transform(
            &mut ast,
            TransformOptions {
                node_transforms: vec![Box::new(ReplaceAll)],
                ..Default::default()
            },
        )
        .unwrap();
        let div = ast.root_node().children[0];
        assert_eq!(ast.element(div).map(|el| el.tag.as_str()), Some("div"));
    }

    #[test]
    fn helpers_are_counted() {
        let mut context = TransformContext::new(Ast::default(), TransformOptions::default());
        context.helper(RuntimeHelper::OpenBlock);
        context.helper(RuntimeHelper::OpenBlock);
        context.remove_helper(RuntimeHelper::OpenBlock);
        assert!(context.has_helper(RuntimeHelper::OpenBlock));
        context.remove_helper(RuntimeHelper::OpenBlock);
        assert!(!context.has_helper(RuntimeHelper::OpenBlock));
        assert_eq!(context.helper_string(RuntimeHelper::Fragment), "_Fragment");
    }

    #[test]
    fn identifiers_are_reference_counted() {
        let mut context = TransformContext::new(Ast::default(), TransformOptions::default());
        let exp = ExpressionNode::new_simple("item", None, None, None);
        context.add_identifiers(&exp);
        context.add_identifiers(&exp);
        context.remove_identifiers(&exp);
        assert!(context.is_identifier_in_scope("item"));
        context.remove_identifiers(&exp);
        assert!(!context.is_identifier_in_scope("item"));
    }
}
