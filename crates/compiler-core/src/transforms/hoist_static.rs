use crate::{
    ast::{
        ArrayExpression, Ast, BaseElementProps, CallArgument, CallExpression,
        CompoundExpressionNode, CompoundExpressionNodeChild, ConstantTypes, ElementTypes,
        ExpressionNode, JSChildNode, Node, NodeId, VNodeCallChildren, get_vnode_block_helper,
        get_vnode_helper,
    },
    runtime_helpers::RuntimeHelper,
    transform::{TransformContext, is_single_element_root},
};
use template_compiler_shared::{PatchFlag, PatchFlags};

/// Moves static subtrees, constant props objects and dynamic prop name
/// lists of the finished tree into the root's hoist list.
pub fn hoist_static(context: &mut TransformContext) {
    let root = context.ast.root();
    // Root node is unfortunately non-hoistable due to potential parent
    // fallthrough attributes.
    let single_element_root =
        is_single_element_root(&context.ast, &context.ast.root_node().children);
    walk(root, context, single_element_root);
}

fn walk(node: NodeId, context: &mut TransformContext, do_not_hoist_node: bool) {
    let children = context.ast.children(node).to_vec();
    let mut hoisted_count = 0;

    for &child in &children {
        // only plain elements & text calls are eligible for hoisting.
        match &context.ast[child] {
            Node::Element(el) if el.tag_type == ElementTypes::Element => {
                let constant_type = if do_not_hoist_node {
                    ConstantTypes::NotConstant
                } else {
                    get_constant_type(child, context)
                };
                if constant_type > ConstantTypes::NotConstant {
                    if constant_type >= ConstantTypes::CanHoist
                        && subtree_size(&context.ast, child) >= context.hoist_static_threshold
                    {
                        hoist_element(child, context);
                        hoisted_count += 1;
                        continue;
                    }
                } else {
                    // node may contain dynamic children, but its props may be
                    // eligible for hoisting.
                    hoist_element_props(child, context);
                }
            }
            Node::TextCall(_) => {
                let content_type = if do_not_hoist_node {
                    ConstantTypes::NotConstant
                } else {
                    get_constant_type(child, context)
                };
                if content_type >= ConstantTypes::CanHoist
                    && context.hoist_static_threshold <= 1
                    && let Node::TextCall(text_call) = &mut context.ast[child]
                {
                    let codegen =
                        std::mem::replace(&mut text_call.codegen_node, JSChildNode::simple(""));
                    let hoisted = context.hoist(codegen);
                    if let Node::TextCall(text_call) = &mut context.ast[child] {
                        text_call.codegen_node = JSChildNode::Simple(hoisted);
                    }
                    hoisted_count += 1;
                }
            }
            _ => {}
        }

        // walk further
        match &context.ast[child] {
            Node::Element(_) => walk(child, context, false),
            // Do not hoist v-for single child because it has to be a block
            Node::For(for_node) => {
                let single = for_node.children.len() == 1;
                walk(child, context, single);
            }
            Node::If(if_node) => {
                for branch in if_node.branches.clone() {
                    // Do not hoist v-if single child because it has to be a
                    // block
                    let single = context.ast.children(branch).len() == 1;
                    walk(branch, context, single);
                }
            }
            _ => {}
        }
    }

    // all children were hoisted - the entire children array is hoistable.
    if hoisted_count > 0 && hoisted_count == children.len() {
        let is_plain_element = context
            .ast
            .element(node)
            .is_some_and(|el| el.tag_type == ElementTypes::Element);
        let has_children_list = matches!(
            context.ast[node].codegen_node(),
            Some(JSChildNode::VNodeCall(vnode))
                if matches!(vnode.children, Some(VNodeCallChildren::TemplateChildNodeList(_)))
        );
        if is_plain_element && has_children_list {
            let elements = children.iter().map(|c| JSChildNode::Node(*c)).collect();
            let hoisted = context.hoist(ArrayExpression::new(elements, None).into());
            if let Some(Some(JSChildNode::VNodeCall(vnode))) = context.ast[node].codegen_node_mut()
            {
                vnode.children = Some(VNodeCallChildren::JSChild(JSChildNode::Simple(hoisted)));
            }
        }
    }
}

fn subtree_size(ast: &Ast, id: NodeId) -> usize {
    1 + ast
        .children(id)
        .iter()
        .map(|child| subtree_size(ast, *child))
        .sum::<usize>()
}

fn hoist_element(id: NodeId, context: &mut TransformContext) {
    let Some(mut codegen) = context
        .ast
        .element_mut(id)
        .and_then(|el| el.codegen_node.take())
    else {
        return;
    };
    if let JSChildNode::VNodeCall(vnode) = &mut codegen {
        vnode.patch_flag = Some(PatchFlag::Hoisted);
    }
    let hoisted = context.hoist(codegen);
    if let Some(el) = context.ast.element_mut(id) {
        el.codegen_node = Some(JSChildNode::Simple(hoisted));
    }
}

fn hoist_element_props(id: NodeId, context: &mut TransformContext) {
    let Some(JSChildNode::VNodeCall(vnode)) = context.ast[id].codegen_node() else {
        return;
    };
    let flag_allows = match vnode.patch_flag {
        None => true,
        Some(PatchFlag::Flags(flags)) => flags == PatchFlags::NeedPatch || flags == PatchFlags::Text,
        Some(PatchFlag::Hoisted) => false,
    };
    let hoist_props = flag_allows
        && vnode.props.is_some()
        && get_generated_props_constant_type(vnode.props.as_ref()) >= ConstantTypes::CanHoist;
    let has_dynamic_props = vnode.dynamic_props.is_some();

    if hoist_props
        && let Some(Some(JSChildNode::VNodeCall(vnode))) = context.ast[id].codegen_node_mut()
        && let Some(props) = vnode.props.take()
    {
        let hoisted = context.hoist(props);
        if let Some(Some(JSChildNode::VNodeCall(vnode))) = context.ast[id].codegen_node_mut() {
            vnode.props = Some(JSChildNode::Simple(hoisted));
        }
    }
    if has_dynamic_props
        && let Some(Some(JSChildNode::VNodeCall(vnode))) = context.ast[id].codegen_node_mut()
        && let Some(dynamic_props) = vnode.dynamic_props.take()
    {
        let hoisted = context.hoist(JSChildNode::simple(dynamic_props));
        if let Some(Some(JSChildNode::VNodeCall(vnode))) = context.ast[id].codegen_node_mut() {
            vnode.dynamic_props = Some(hoisted.content);
        }
    }
}

/// Static analysis of a template node, see [`ConstantTypes`].
pub fn get_constant_type(node: NodeId, context: &mut TransformContext) -> ConstantTypes {
    match &context.ast[node] {
        Node::Element(_) => get_element_constant_type(node, context),
        Node::Text(_) | Node::Comment(_) => ConstantTypes::CanStringify,
        Node::If(_) | Node::For(_) | Node::IfBranch(_) | Node::Root(_) => {
            ConstantTypes::NotConstant
        }
        Node::Interpolation(interpolation) => get_exp_constant_type(&interpolation.content),
        Node::TextCall(text_call) => {
            let content = text_call.content;
            get_constant_type(content, context)
        }
        Node::Compound(compound) => get_compound_constant_type(compound),
    }
}

fn get_element_constant_type(id: NodeId, context: &mut TransformContext) -> ConstantTypes {
    let Some(el) = context.ast.element(id) else {
        return ConstantTypes::NotConstant;
    };
    if el.tag_type != ElementTypes::Element {
        return ConstantTypes::NotConstant;
    }
    let Some(JSChildNode::VNodeCall(vnode)) = &el.codegen_node else {
        return ConstantTypes::NotConstant;
    };
    if vnode.is_block && !matches!(el.tag.as_str(), "svg" | "foreignObject" | "math") {
        return ConstantTypes::NotConstant;
    }
    if vnode.patch_flag.is_some() {
        return ConstantTypes::NotConstant;
    }

    let mut return_type = ConstantTypes::CanStringify;

    // Element itself has no patch flag. However we still need to check:
    // 1. Even for a node with no patch flag, it is possible for it to contain
    // non-hoistable expressions that refers to scope variables, e.g. compiler
    // injected keys or cached event handlers. Therefore we need to always
    // check the codegenNode's props to be sure.
    let generated_props_type = get_generated_props_constant_type(vnode.props.as_ref());
    if generated_props_type == ConstantTypes::NotConstant {
        return ConstantTypes::NotConstant;
    }
    return_type = return_type.min(generated_props_type);

    let is_block = vnode.is_block;
    let is_component = vnode.is_component;
    let children = el.children.clone();
    let has_directives = el
        .props
        .iter()
        .any(|p| matches!(p, BaseElementProps::Directive(_)));
    let bind_types: Vec<ConstantTypes> = el
        .props
        .iter()
        .filter_map(|p| match p {
            BaseElementProps::Directive(dir) if dir.name == "bind" => {
                dir.exp.as_ref().map(get_exp_constant_type)
            }
            _ => None,
        })
        .collect();

    // 2. its children.
    for child in children {
        let child_type = get_constant_type(child, context);
        if child_type == ConstantTypes::NotConstant {
            return ConstantTypes::NotConstant;
        }
        return_type = return_type.min(child_type);
    }

    // 3. if the type is not already CanSkipPatch which is the lowest non-0
    // type, check if any of the props can cause the type to be lowered
    if return_type > ConstantTypes::CanSkipPatch {
        for exp_type in bind_types {
            if exp_type == ConstantTypes::NotConstant {
                return ConstantTypes::NotConstant;
            }
            return_type = return_type.min(exp_type);
        }
    }

    // only svg/foreignObject could be block here, however if they are
    // static then they don't need to be blocks since there will be no
    // nested updates.
    if is_block {
        // except set custom directives.
        if has_directives {
            return ConstantTypes::NotConstant;
        }
        context.remove_helper(RuntimeHelper::OpenBlock);
        context.remove_helper(get_vnode_block_helper(is_component));
        if let Some(Some(JSChildNode::VNodeCall(vnode))) = context.ast[id].codegen_node_mut() {
            vnode.is_block = false;
        }
        context.helper(get_vnode_helper(is_component));
    }
    return_type
}

pub fn get_exp_constant_type(exp: &ExpressionNode) -> ConstantTypes {
    match exp {
        ExpressionNode::Simple(exp) => exp.const_type,
        ExpressionNode::Compound(exp) => get_compound_constant_type(exp),
    }
}

fn get_compound_constant_type(node: &CompoundExpressionNode) -> ConstantTypes {
    let mut return_type = ConstantTypes::CanStringify;
    for child in &node.children {
        let child_type = match child {
            CompoundExpressionNodeChild::String(_) | CompoundExpressionNodeChild::Symbol(_) => {
                continue;
            }
            CompoundExpressionNodeChild::Simple(exp) => exp.const_type,
            CompoundExpressionNodeChild::Compound(exp) => get_compound_constant_type(exp),
            CompoundExpressionNodeChild::Interpolation(node) => {
                get_exp_constant_type(&node.content)
            }
            CompoundExpressionNodeChild::Text(_) => ConstantTypes::CanStringify,
            CompoundExpressionNodeChild::JSChild(_) => ConstantTypes::NotConstant,
        };
        if child_type == ConstantTypes::NotConstant {
            return ConstantTypes::NotConstant;
        }
        return_type = return_type.min(child_type);
    }
    return_type
}

fn get_generated_props_constant_type(props: Option<&JSChildNode>) -> ConstantTypes {
    let mut return_type = ConstantTypes::CanStringify;
    let Some(JSChildNode::Object(props)) = props else {
        return return_type;
    };
    for property in &props.properties {
        let key_type = get_exp_constant_type(&property.key);
        if key_type == ConstantTypes::NotConstant {
            return key_type;
        }
        return_type = return_type.min(key_type);
        let value_type = match &property.value {
            JSChildNode::Simple(exp) => exp.const_type,
            // some helper calls can be hoisted, such as the `normalizeClass`
            // generated by the compiler for pre-normalized class; respect the
            // constant type of the helper's arguments
            JSChildNode::Call(call) => get_constant_type_of_helper_call(call),
            _ => ConstantTypes::NotConstant,
        };
        if value_type == ConstantTypes::NotConstant {
            return value_type;
        }
        return_type = return_type.min(value_type);
    }
    return_type
}

fn get_constant_type_of_helper_call(call: &CallExpression) -> ConstantTypes {
    let hoistable_helper = [
        RuntimeHelper::NormalizeClass,
        RuntimeHelper::NormalizeStyle,
        RuntimeHelper::NormalizeProps,
        RuntimeHelper::GuardReactiveProps,
    ]
    .into_iter()
    .any(|helper| call.is_helper(helper));
    if !hoistable_helper {
        return ConstantTypes::NotConstant;
    }
    match call.arguments.first() {
        Some(CallArgument::JSChild(JSChildNode::Simple(arg))) => arg.const_type,
        Some(CallArgument::JSChild(JSChildNode::Call(arg))) => get_constant_type_of_helper_call(arg),
        _ => ConstantTypes::NotConstant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{SimpleExpressionNode, TextNode};

    #[test]
    fn compound_takes_the_lowest_child() {
        let compound = CompoundExpressionNode::new(
            vec![
                CompoundExpressionNodeChild::Simple(SimpleExpressionNode::new(
                    "a",
                    Some(false),
                    None,
                    Some(ConstantTypes::CanHoist),
                )),
                " + ".into(),
                CompoundExpressionNodeChild::Text(TextNode::new(
                    "b",
                    crate::ast::SourceLocation::loc_stub(),
                )),
            ],
            None,
        );
        assert_eq!(
            get_exp_constant_type(&compound.clone().into()),
            ConstantTypes::CanHoist
        );

        let mut dynamic = compound;
        dynamic
            .children
            .push(CompoundExpressionNodeChild::Simple(SimpleExpressionNode::new(
                "_ctx.c",
                Some(false),
                None,
                None,
            )));
        assert_eq!(
            get_exp_constant_type(&dynamic.into()),
            ConstantTypes::NotConstant
        );
    }

    #[test]
    fn normalize_helpers_keep_argument_type() {
        let call = CallExpression::new(
            RuntimeHelper::NormalizeClass,
            Some(vec![
                JSChildNode::Simple(SimpleExpressionNode::new(
                    "{ foo: true }",
                    Some(false),
                    None,
                    Some(ConstantTypes::CanStringify),
                ))
                .into(),
            ]),
            None,
        );
        assert_eq!(
            get_constant_type_of_helper_call(&call),
            ConstantTypes::CanStringify
        );
        let call = CallExpression::new(RuntimeHelper::ToHandlers, None, None);
        assert_eq!(
            get_constant_type_of_helper_call(&call),
            ConstantTypes::NotConstant
        );
    }
}
