use crate::{
    ast::{
        ArrayExpression, BaseElementProps, CallExpression, ConditionalExpression, ElementTypes,
        ExpressionNode, FunctionExpression, FunctionReturns, JSChildNode, Node, NodeId,
        ObjectExpression, Property, SourceLocation,
    },
    errors::{CompilerError, ErrorCodes},
    runtime_helpers::RuntimeHelper,
    transform::{ExitFn, NodeTransform, TransformContext, is_v_slot},
    transforms::v_for::{create_for_loop_params, finalize_for_parse_result},
    utils::{find_dir, find_dir_matching, has_scope_ref, is_template_node},
};
use std::collections::HashSet;
use template_compiler_shared::SlotFlags;

/// Tracks scope identifiers of scoped slots so that the expression transform
/// does not prefix them, and counts slot nesting. Its exit runs before the
/// element transform builds the slots of the same node, so only nested slots
/// see a positive depth.
#[derive(Debug, Default)]
pub struct TrackSlotScopes;

impl NodeTransform for TrackSlotScopes {
    fn transform(
        &self,
        node: NodeId,
        context: &mut TransformContext,
    ) -> Result<Option<ExitFn>, CompilerError> {
        let Node::Element(el) = &context.ast[node] else {
            return Ok(None);
        };
        if !matches!(el.tag_type, ElementTypes::Component | ElementTypes::Template) {
            return Ok(None);
        }
        // only slots with props introduce scope variables
        let Some(v_slot) = find_dir(el, "slot", None) else {
            return Ok(None);
        };
        let slot_props = v_slot.exp.clone();
        if context.prefix_identifiers
            && let Some(props) = &slot_props
        {
            context.add_identifiers(props);
        }
        context.scopes.v_slot += 1;
        Ok(Some(Box::new(move |context: &mut TransformContext| {
            if context.prefix_identifiers
                && let Some(props) = &slot_props
            {
                context.remove_identifiers(props);
            }
            context.scopes.v_slot -= 1;
            Ok(())
        })))
    }
}

/// Puts the aliases of `<template v-slot v-for>` in scope. The template is
/// never turned into a [`ForNode`](crate::ast::ForNode), the loop is built
/// into the slots object instead.
#[derive(Debug, Default)]
pub struct TrackVForSlotScopes;

impl NodeTransform for TrackVForSlotScopes {
    fn transform(
        &self,
        node: NodeId,
        context: &mut TransformContext,
    ) -> Result<Option<ExitFn>, CompilerError> {
        if !is_template_node(&context.ast, node) {
            return Ok(None);
        }
        let Some(el) = context.ast.element(node) else {
            return Ok(None);
        };
        if !el.props.iter().any(is_v_slot) {
            return Ok(None);
        }
        let Some(for_index) = el.props.iter().position(|p| {
            matches!(p, BaseElementProps::Directive(dir)
                if dir.name == "for" && dir.exp.is_some())
        }) else {
            return Ok(None);
        };
        let BaseElementProps::Directive(v_for) = &el.props[for_index] else {
            return Ok(None);
        };
        let Some(mut result) = v_for.for_parse_result.clone() else {
            return Ok(None);
        };
        finalize_for_parse_result(&mut result, context)?;
        let aliases: Vec<ExpressionNode> = [&result.value, &result.key, &result.index]
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        if let Some(el) = context.ast.element_mut(node)
            && let BaseElementProps::Directive(v_for) = &mut el.props[for_index]
        {
            v_for.for_parse_result = Some(result);
        }
        for alias in &aliases {
            context.add_identifiers(alias);
        }
        Ok(Some(Box::new(move |context: &mut TransformContext| {
            for alias in &aliases {
                context.remove_identifiers(alias);
            }
            Ok(())
        })))
    }
}

fn build_slot_fn(
    props: Option<ExpressionNode>,
    children: Vec<NodeId>,
    loc: SourceLocation,
    context: &TransformContext,
) -> JSChildNode {
    let loc = children
        .first()
        .map_or(loc, |first| context.ast[*first].loc().clone());
    FunctionExpression::new(
        props.into_iter().collect(),
        Some(FunctionReturns::TemplateChildren(children)),
        /* newline */ Some(false),
        /* isSlot */ Some(true),
        Some(loc),
    )
    .into()
}

/// Instead of being a DirectiveTransform, v-slot processing is called during
/// the element transform to build the slots object of a component. Returns
/// the slots expression and whether the slots are dynamic.
pub fn build_slots(
    node: NodeId,
    context: &mut TransformContext,
) -> Result<(JSChildNode, bool), CompilerError> {
    context.helper(RuntimeHelper::WithCtx);
    let Some(el) = context.ast.element(node) else {
        unreachable!("slots are built for component elements");
    };
    let mut children = el.children.clone();
    let loc = el.loc.clone();
    let on_component_slot = find_dir(el, "slot", Some(true)).cloned();

    let mut slots_properties: Vec<Property> = Vec::new();
    let mut dynamic_slots: Vec<JSChildNode> = Vec::new();

    // If the slot is inside a v-for or another v-slot, force it to be dynamic
    // since it likely uses a scope variable.
    let mut has_dynamic_slots = if context.prefix_identifiers {
        // with prefixed identifiers this can be further narrowed down to slots
        // that actually use the scope variables.
        has_scope_ref(&context.ast, node, &context.identifiers)
    } else {
        context.scopes.v_slot > 0 || context.scopes.v_for > 0
    };

    // 1. Check for slot with slotProps on component itself.
    //    <Comp v-slot="{ prop }"/>
    if let Some(dir) = &on_component_slot {
        if dir.arg.as_ref().is_some_and(|arg| !arg.is_static_exp()) {
            has_dynamic_slots = true;
        }
        let name = dir
            .arg
            .clone()
            .unwrap_or_else(|| ExpressionNode::new_simple("default", Some(true), None, None));
        slots_properties.push(Property::new(
            name,
            build_slot_fn(dir.exp.clone(), children.clone(), loc.clone(), context),
        ));
    }

    // 2. Iterate through children and check for template slots
    //    <template v-slot:foo="{ prop }">
    let mut has_template_slots = false;
    let mut has_named_default_slot = false;
    let mut implicit_default_children = Vec::new();
    let mut seen_slot_names = HashSet::new();
    let mut conditional_branch_index = 0;

    let mut i = 0;
    while i < children.len() {
        let slot_element = children[i];
        let slot_dir = context
            .ast
            .element(slot_element)
            .filter(|el| el.tag_type == ElementTypes::Template)
            .and_then(|el| find_dir(el, "slot", Some(true)))
            .cloned();
        let Some(slot_dir) = slot_dir else {
            // not a <template v-slot>, skip.
            if !matches!(context.ast[slot_element], Node::Comment(_)) {
                implicit_default_children.push(slot_element);
            }
            i += 1;
            continue;
        };

        if on_component_slot.is_some() {
            // already has on-component slot - this is incorrect usage.
            context.on_error(ErrorCodes::XVSlotMixedSlotUsage, Some(slot_dir.loc))?;
            break;
        }

        has_template_slots = true;
        let Some(template) = context.ast.element(slot_element) else {
            unreachable!();
        };
        let slot_children = template.children.clone();
        let slot_loc = template.loc.clone();
        let v_if = find_dir(template, "if", None).cloned();
        let v_else =
            find_dir_matching(template, |n| n == "else" || n == "else-if", Some(true)).cloned();
        let v_for = find_dir(template, "for", None).cloned();

        let slot_name = slot_dir
            .arg
            .clone()
            .unwrap_or_else(|| ExpressionNode::new_simple("default", Some(true), None, None));
        // check if name is dynamic.
        let static_slot_name = match &slot_name {
            ExpressionNode::Simple(name) if name.is_static => Some(name.content.clone()),
            _ => {
                has_dynamic_slots = true;
                None
            }
        };

        let slot_function = build_slot_fn(slot_dir.exp.clone(), slot_children, slot_loc, context);

        // check if this slot is conditional (v-if/v-for)
        if let Some(v_if) = v_if {
            has_dynamic_slots = true;
            dynamic_slots.push(
                ConditionalExpression {
                    test: v_if.exp.map_or_else(|| JSChildNode::simple("true"), Into::into),
                    consequent: build_dynamic_slot(
                        slot_name,
                        slot_function,
                        Some(conditional_branch_index),
                    ),
                    alternate: JSChildNode::simple("undefined"),
                    newline: true,
                }
                .into(),
            );
            conditional_branch_index += 1;
        } else if let Some(v_else) = v_else {
            // find adjacent v-if
            let prev = children[..i]
                .iter()
                .rev()
                .find(|c| !matches!(context.ast[**c], Node::Comment(_)))
                .copied();
            let prev_is_if = prev.is_some_and(|prev| {
                context.ast.element(prev).is_some_and(|el| {
                    el.tag_type == ElementTypes::Template && find_dir(el, "if", None).is_some()
                })
            });
            if prev_is_if
                && let Some(JSChildNode::Conditional(conditional)) = dynamic_slots.last_mut()
            {
                // remove node
                children.remove(i);
                // attach this slot to previous conditional
                let conditional = last_conditional(conditional);
                let slot = build_dynamic_slot(
                    slot_name,
                    slot_function,
                    Some(conditional_branch_index),
                );
                conditional_branch_index += 1;
                conditional.alternate = match v_else.exp {
                    Some(test) => ConditionalExpression {
                        test: test.into(),
                        consequent: slot,
                        alternate: JSChildNode::simple("undefined"),
                        newline: true,
                    }
                    .into(),
                    None => slot,
                };
                continue;
            }
            context.on_error(ErrorCodes::XVElseNoAdjacentIf, Some(v_else.loc))?;
        } else if let Some(v_for) = v_for {
            has_dynamic_slots = true;
            if let Some(mut parse_result) = v_for.for_parse_result {
                finalize_for_parse_result(&mut parse_result, context)?;
                // Render the dynamic slots as an array and add it to the
                // createSlot() args. The runtime knows how to handle it
                // appropriately.
                let render_list = context.helper(RuntimeHelper::RenderList);
                dynamic_slots.push(
                    CallExpression::new(
                        render_list,
                        Some(vec![
                            parse_result.source.clone().into(),
                            JSChildNode::from(FunctionExpression::new(
                                create_for_loop_params(&parse_result, Vec::new()),
                                Some(FunctionReturns::JSChild(build_dynamic_slot(
                                    slot_name,
                                    slot_function,
                                    None,
                                ))),
                                /* force newline */ Some(true),
                                None,
                                None,
                            ))
                            .into(),
                        ]),
                        None,
                    )
                    .into(),
                );
            } else {
                context.on_error(ErrorCodes::XVForMalformedExpression, Some(v_for.loc))?;
            }
        } else {
            // check duplicate static names
            if let Some(name) = static_slot_name {
                if !seen_slot_names.insert(name.clone()) {
                    context.on_error(ErrorCodes::XVSlotDuplicateSlotNames, Some(slot_dir.loc))?;
                    i += 1;
                    continue;
                }
                if name == "default" {
                    has_named_default_slot = true;
                }
            }
            slots_properties.push(Property::new(slot_name, slot_function));
        }
        i += 1;
    }

    if on_component_slot.is_none() {
        if !has_template_slots {
            // implicit default slot (on component)
            slots_properties.push(Property::with_static_key(
                "default",
                build_slot_fn(None, children.clone(), loc.clone(), context),
            ));
        } else if implicit_default_children
            .iter()
            // with whitespace: 'preserve', whitespaces between slots will end up
            // in the implicit children. Ignore if all of them are whitespaces.
            .any(|c| is_non_whitespace_content(*c, context))
        {
            // implicit default slot (mixed with named slots)
            if has_named_default_slot {
                let loc = context.ast[implicit_default_children[0]].loc().clone();
                context.on_error(ErrorCodes::XVSlotExtraneousDefaultSlotChildren, Some(loc))?;
            } else {
                slots_properties.push(Property::with_static_key(
                    "default",
                    build_slot_fn(None, implicit_default_children, loc.clone(), context),
                ));
            }
        }
    }

    // v-else templates were folded into the preceding conditional
    if let Some(el) = context.ast.element_mut(node) {
        el.children = children;
    }

    let slot_flag = if has_dynamic_slots {
        SlotFlags::Dynamic
    } else if has_forwarded_slots(context.ast.children(node), context) {
        SlotFlags::Forwarded
    } else {
        SlotFlags::Stable
    };
    // 2 = compiled but dynamic = can skip normalization, but must run diff
    // 1 = compiled and static = can skip normalization AND diff as optimized
    let flag = if context.dev {
        format!("{slot_flag} /* {} */", slot_flag.as_str())
    } else {
        slot_flag.to_string()
    };
    slots_properties.push(Property::with_static_key("_", JSChildNode::simple(flag)));

    let mut slots: JSChildNode = ObjectExpression::new(slots_properties, Some(loc)).into();
    if !dynamic_slots.is_empty() {
        let create_slots = context.helper(RuntimeHelper::CreateSlots);
        slots = CallExpression::new(
            create_slots,
            Some(vec![
                slots.into(),
                JSChildNode::from(ArrayExpression::new(dynamic_slots, None)).into(),
            ]),
            None,
        )
        .into();
    }
    Ok((slots, has_dynamic_slots))
}

fn build_dynamic_slot(
    name: ExpressionNode,
    function: JSChildNode,
    index: Option<usize>,
) -> JSChildNode {
    let mut props = vec![
        Property::with_static_key("name", name.into()),
        Property::with_static_key("fn", function),
    ];
    if let Some(index) = index {
        props.push(Property::with_static_key(
            "key",
            ExpressionNode::new_simple(index.to_string(), Some(true), None, None).into(),
        ));
    }
    ObjectExpression::new(props, None).into()
}

fn last_conditional(conditional: &mut ConditionalExpression) -> &mut ConditionalExpression {
    if !matches!(conditional.alternate, JSChildNode::Conditional(_)) {
        return conditional;
    }
    match &mut conditional.alternate {
        JSChildNode::Conditional(next) => last_conditional(next),
        _ => unreachable!(),
    }
}

fn has_forwarded_slots(children: &[NodeId], context: &TransformContext) -> bool {
    children.iter().any(|child| match &context.ast[*child] {
        Node::Element(el) => {
            el.tag_type == ElementTypes::Slot || has_forwarded_slots(&el.children, context)
        }
        Node::If(node) => has_forwarded_slots(&node.branches, context),
        Node::IfBranch(node) => has_forwarded_slots(&node.children, context),
        Node::For(node) => has_forwarded_slots(&node.children, context),
        _ => false,
    })
}

fn is_non_whitespace_content(node: NodeId, context: &TransformContext) -> bool {
    match &context.ast[node] {
        Node::Text(text) => !text.content.trim().is_empty(),
        Node::TextCall(call) => is_non_whitespace_content(call.content, context),
        _ => true,
    }
}
