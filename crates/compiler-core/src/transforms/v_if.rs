use crate::{
    ast::{
        BaseElementProps, CallExpression, ConditionalExpression, ConstantTypes, DirectiveNode,
        ElementNode, ElementTypes, ExpressionNode, IfBranchNode, IfNode, JSChildNode, Node,
        NodeId, ObjectExpression, Property, SimpleExpressionNode, VNodeCall, VNodeCallChildren,
        VNodeCallTag, convert_to_block,
    },
    errors::{CompilerError, ErrorCodes},
    runtime_helpers::RuntimeHelper,
    transform::{ExitFn, NodeTransform, StructuralDirectiveTransform, TransformContext},
    transforms::transform_expression::process_expression,
    utils::{find_dir, find_prop, get_memoed_vnode_call, inject_prop},
};
use template_compiler_shared::{PatchFlag, PatchFlags};

/// `v-if`, `v-else-if` and `v-else`. The first directive of a chain replaces
/// its element with an [`IfNode`]; later ones are moved into that node as
/// extra branches.
#[derive(Debug, Default)]
pub struct TransformIf;

impl NodeTransform for TransformIf {
    fn transform(
        &self,
        node: NodeId,
        context: &mut TransformContext,
    ) -> Result<Option<ExitFn>, CompilerError> {
        self.apply(node, context)
    }
}

impl StructuralDirectiveTransform for TransformIf {
    fn matches(&self, name: &str) -> bool {
        matches!(name, "if" | "else" | "else-if")
    }

    fn process(
        &self,
        node: NodeId,
        dir: DirectiveNode,
        context: &mut TransformContext,
    ) -> Result<Option<ExitFn>, CompilerError> {
        process_if(node, dir, context)
    }
}

fn process_if(
    node: NodeId,
    mut dir: DirectiveNode,
    context: &mut TransformContext,
) -> Result<Option<ExitFn>, CompilerError> {
    let Some(el_loc) = context.ast.element(node).map(|el| el.loc.clone()) else {
        return Ok(None);
    };

    if dir.name != "else"
        && dir
            .exp
            .as_ref()
            .is_none_or(|exp| exp.stringify().trim().is_empty())
    {
        let loc = dir
            .exp
            .as_ref()
            .map_or_else(|| el_loc.clone(), |exp| exp.loc().clone());
        context.on_error(ErrorCodes::XVIfNoExpression, Some(dir.loc.clone()))?;
        dir.exp = Some(ExpressionNode::new_simple("true", Some(false), Some(loc), None));
    }

    // dir.exp can only be simple expression because vIf transform is applied
    // before expression transform.
    if context.prefix_identifiers
        && let Some(ExpressionNode::Simple(exp)) = &dir.exp
    {
        dir.exp = Some(process_expression(exp, context, false)?);
    }

    if dir.name == "if" {
        let Some(branch) = context
            .ast
            .element(node)
            .map(|el| create_if_branch(el, node, dir))
        else {
            return Ok(None);
        };
        let branch = context.ast.alloc(branch);
        let Some(if_node) = context.replace_node(IfNode {
            branches: vec![branch],
            codegen_node: None,
            loc: el_loc,
        }) else {
            return Ok(None);
        };
        let parent = context.parent;
        return Ok(Some(Box::new(move |context: &mut TransformContext| {
            let key = parent.map_or(0, |parent| branch_key_offset(parent, if_node, context));
            let codegen = create_codegen_node_for_branch(branch, key, context);
            if let Node::If(if_node) = &mut context.ast[if_node] {
                if_node.codegen_node = Some(codegen);
            }
            Ok(())
        })));
    }

    // locate the adjacent v-if
    let Some(parent) = context.parent else {
        context.on_error(ErrorCodes::XVElseNoAdjacentIf, Some(el_loc))?;
        return Ok(None);
    };
    let siblings = context.ast.children(parent).to_vec();
    let mut i = siblings.iter().position(|c| *c == node).unwrap_or(0);
    let mut comments = Vec::new();
    while let Some(prev) = i.checked_sub(1) {
        i = prev;
        let sibling = siblings[i];
        match &context.ast[sibling] {
            Node::Comment(_) => {
                context.remove_node(Some(sibling));
                if context.dev {
                    comments.insert(0, sibling);
                }
            }
            Node::Text(text) if text.content.trim().is_empty() => {
                context.remove_node(Some(sibling));
            }
            Node::If(if_node) => {
                // Check if v-else was followed by v-else-if
                let after_else = if_node
                    .branches
                    .last()
                    .is_some_and(|b| matches!(&context.ast[*b], Node::IfBranch(b) if b.condition.is_none()));
                if dir.name == "else-if" && after_else {
                    context.on_error(ErrorCodes::XVElseNoAdjacentIf, Some(el_loc.clone()))?;
                }
                let existing_keys: Vec<BaseElementProps> = if_node
                    .branches
                    .iter()
                    .filter_map(|b| match &context.ast[*b] {
                        Node::IfBranch(b) => b.user_key.clone(),
                        _ => None,
                    })
                    .collect();

                // move the node to the if node's branches
                context.remove_node(None);
                let Some(mut branch) = context
                    .ast
                    .element(node)
                    .map(|el| create_if_branch(el, node, dir))
                else {
                    return Ok(None);
                };
                let in_transition = context
                    .ast
                    .element(parent)
                    .is_some_and(|el| matches!(el.tag.as_str(), "transition" | "Transition"));
                if !comments.is_empty() && !in_transition {
                    branch.children.splice(0..0, comments);
                }

                // check if user is forcing same key on different branches
                if let Some(user_key) = &branch.user_key {
                    for existing in &existing_keys {
                        if is_same_key(existing, user_key) {
                            context.on_error(
                                ErrorCodes::XVIfSameKey,
                                Some(user_key.loc().clone()),
                            )?;
                        }
                    }
                }

                let branch = context.ast.alloc(branch);
                let branch_count = match &mut context.ast[sibling] {
                    Node::If(if_node) => {
                        if_node.branches.push(branch);
                        if_node.branches.len()
                    }
                    _ => 1,
                };

                // since the branch was removed, it will not be traversed.
                // make sure to traverse here.
                context.traverse_node(branch)?;

                // attach this branch's codegen node to the v-if root.
                let key = branch_key_offset(parent, sibling, context) + branch_count - 1;
                let codegen = create_codegen_node_for_branch(branch, key, context);
                if let Node::If(if_node) = &mut context.ast[sibling]
                    && let Some(root) = &mut if_node.codegen_node
                    && let Some(condition) = parent_condition(root)
                {
                    condition.alternate = codegen;
                }

                // make sure to reset currentNode after traversal to indicate this
                // node has been removed.
                context.current_node = None;
                return Ok(None);
            }
            _ => break,
        }
    }
    context.on_error(ErrorCodes::XVElseNoAdjacentIf, Some(el_loc))?;
    Ok(None)
}

fn create_if_branch(el: &ElementNode, node: NodeId, dir: DirectiveNode) -> IfBranchNode {
    let is_template_if = el.tag_type == ElementTypes::Template;
    IfBranchNode {
        condition: if dir.name == "else" { None } else { dir.exp },
        children: if is_template_if && find_dir(el, "for", None).is_none() {
            el.children.clone()
        } else {
            vec![node]
        },
        user_key: find_prop(el, "key", None, None).cloned(),
        is_template_if,
        loc: el.loc.clone(),
    }
}

/// Branch keys keep counting across sibling v-if chains of the same parent.
fn branch_key_offset(parent: NodeId, if_node: NodeId, context: &TransformContext) -> usize {
    context
        .ast
        .children(parent)
        .iter()
        .take_while(|c| **c != if_node)
        .map(|c| match &context.ast[*c] {
            Node::If(node) => node.branches.len(),
            _ => 0,
        })
        .sum()
}

fn create_codegen_node_for_branch(
    branch: NodeId,
    key_index: usize,
    context: &mut TransformContext,
) -> JSChildNode {
    let condition = match &context.ast[branch] {
        Node::IfBranch(branch) => branch.condition.clone(),
        _ => None,
    };
    let consequent = create_children_codegen_node(branch, key_index, context);
    match condition {
        Some(test) => {
            let create_comment = context.helper(RuntimeHelper::CreateComment);
            ConditionalExpression {
                test: test.into(),
                consequent,
                alternate: CallExpression::new(
                    create_comment,
                    Some(vec![
                        if context.dev { r#""v-if""# } else { r#""""# }.into(),
                        "true".into(),
                    ]),
                    None,
                )
                .into(),
                newline: true,
            }
            .into()
        }
        None => consequent,
    }
}

fn create_children_codegen_node(
    branch: NodeId,
    key_index: usize,
    context: &mut TransformContext,
) -> JSChildNode {
    let Node::IfBranch(branch) = &context.ast[branch] else {
        unreachable!("v-if codegen on a non-branch node");
    };
    let children = branch.children.clone();
    let is_template_if = branch.is_template_if;
    let loc = branch.loc.clone();
    let key_property = Property::with_static_key(
        "key",
        JSChildNode::Simple(SimpleExpressionNode::new(
            key_index.to_string(),
            Some(false),
            None,
            Some(ConstantTypes::CanHoist),
        )),
    );

    match children[..] {
        [child] if context.ast.element(child).is_some() => {
            let Some(mut codegen) = context
                .ast
                .element_mut(child)
                .and_then(|el| el.codegen_node.take())
            else {
                return JSChildNode::Node(child);
            };
            let vnode_call = get_memoed_vnode_call(&mut codegen);
            // Change createVNode to createBlock.
            if let JSChildNode::VNodeCall(vnode) = &mut *vnode_call {
                convert_to_block(vnode, context);
            }
            // inject branch key
            inject_prop(vnode_call, key_property, context);
            if let Some(el) = context.ast.element_mut(child) {
                el.codegen_node = Some(codegen);
            }
            JSChildNode::Node(child)
        }
        // optimize away nested fragments when child is a ForNode
        [child] if matches!(context.ast[child], Node::For(_)) => {
            let codegen = context.ast[child].codegen_node_mut().and_then(Option::take);
            if let Some(mut codegen) = codegen {
                inject_prop(&mut codegen, key_property, context);
                if let Some(slot) = context.ast[child].codegen_node_mut() {
                    *slot = Some(codegen);
                }
            }
            JSChildNode::Node(child)
        }
        _ => {
            let mut patch_flag = PatchFlags::StableFragment;
            // check if the fragment actually contains a single valid child with
            // the rest being comments
            if context.dev
                && !is_template_if
                && children
                    .iter()
                    .filter(|c| !matches!(context.ast[**c], Node::Comment(_)))
                    .count()
                    == 1
            {
                patch_flag |= PatchFlags::DevRootFragment;
            }
            let fragment = context.helper(RuntimeHelper::Fragment);
            VNodeCall::new(
                Some(context),
                VNodeCallTag::Symbol(fragment),
                Some(ObjectExpression::new(vec![key_property], None).into()),
                Some(VNodeCallChildren::TemplateChildNodeList(children)),
                Some(PatchFlag::Flags(patch_flag)),
                None,
                None,
                Some(true),
                Some(false),
                Some(false),
                Some(loc),
            )
            .into()
        }
    }
}

fn is_same_key(a: &BaseElementProps, b: &BaseElementProps) -> bool {
    match (a, b) {
        (BaseElementProps::Attribute(a), BaseElementProps::Attribute(b)) => {
            a.value.as_ref().map(|v| &v.content) == b.value.as_ref().map(|v| &v.content)
        }
        (BaseElementProps::Directive(a), BaseElementProps::Directive(b)) => {
            match (&a.exp, &b.exp) {
                (Some(ExpressionNode::Simple(a)), Some(ExpressionNode::Simple(b))) => {
                    a.is_static == b.is_static && a.content == b.content
                }
                _ => false,
            }
        }
        _ => false,
    }
}

/// The innermost conditional of a v-if chain, whose alternate receives the
/// next branch.
fn parent_condition(node: &mut JSChildNode) -> Option<&mut ConditionalExpression> {
    match node {
        JSChildNode::Conditional(condition) => {
            if matches!(condition.alternate, JSChildNode::Conditional(_)) {
                parent_condition(&mut condition.alternate)
            } else {
                Some(condition.as_mut())
            }
        }
        JSChildNode::Cache(cache) => parent_condition(&mut cache.value),
        _ => None,
    }
}
