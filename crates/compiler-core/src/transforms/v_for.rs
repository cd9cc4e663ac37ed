use crate::{
    ast::{
        BaseElementProps, BlockStatement, CallArgument, CallExpression, CompoundExpressionNode,
        CompoundExpressionNodeChild, ConstantTypes, DirectiveNode, ExpressionNode, ForNode,
        ForParseResult, FunctionExpression, FunctionReturns, JSChildNode, Node, NodeId,
        ObjectExpression, Property, VNodeCall, VNodeCallChildren, VNodeCallTag,
        get_vnode_block_helper, get_vnode_helper,
    },
    errors::{CompilerError, ErrorCodes},
    runtime_helpers::RuntimeHelper,
    transform::{ExitFn, NodeTransform, StructuralDirectiveTransform, TransformContext},
    transforms::transform_expression::process_expression,
    utils::{find_dir, find_prop, find_prop_index, inject_prop, is_slot_outlet, is_template_node},
};
use template_compiler_shared::{PatchFlag, PatchFlags};

/// `v-for="(item, key, index) in source"` replaces its element with a
/// [`ForNode`] rendered through `renderList()`.
#[derive(Debug, Default)]
pub struct TransformFor;

impl NodeTransform for TransformFor {
    fn transform(
        &self,
        node: NodeId,
        context: &mut TransformContext,
    ) -> Result<Option<ExitFn>, CompilerError> {
        self.apply(node, context)
    }
}

impl StructuralDirectiveTransform for TransformFor {
    fn matches(&self, name: &str) -> bool {
        name == "for"
    }

    fn process(
        &self,
        node: NodeId,
        dir: DirectiveNode,
        context: &mut TransformContext,
    ) -> Result<Option<ExitFn>, CompilerError> {
        process_for(node, dir, context)
    }
}

fn process_for(
    node: NodeId,
    dir: DirectiveNode,
    context: &mut TransformContext,
) -> Result<Option<ExitFn>, CompilerError> {
    if dir.exp.is_none() {
        context.on_error(ErrorCodes::XVForNoExpression, Some(dir.loc))?;
        return Ok(None);
    }
    let Some(mut parse_result) = dir.for_parse_result else {
        context.on_error(ErrorCodes::XVForMalformedExpression, Some(dir.loc))?;
        return Ok(None);
    };
    finalize_for_parse_result(&mut parse_result, context)?;

    let is_template = is_template_node(&context.ast, node);
    let Some(el) = context.ast.element(node) else {
        return Ok(None);
    };
    let children = if is_template {
        el.children.clone()
    } else {
        vec![node]
    };
    let ForParseResult {
        source,
        value,
        key,
        index,
        ..
    } = parse_result.clone();

    let Some(for_node) = context.replace_node(ForNode {
        source: source.clone(),
        value_alias: value.clone(),
        key_alias: key.clone(),
        object_index_alias: index.clone(),
        parse_result,
        children,
        codegen_node: None,
        loc: dir.loc.clone(),
    }) else {
        return Ok(None);
    };

    // bookkeeping
    context.scopes.v_for += 1;
    if context.prefix_identifiers {
        // scope management
        // inject identifiers to context
        for alias in [&value, &key, &index].into_iter().flatten() {
            context.add_identifiers(alias);
        }
    }

    let on_exit = process_codegen(node, for_node, &source, is_template, context)?;

    Ok(Some(Box::new(move |context: &mut TransformContext| {
        context.scopes.v_for -= 1;
        if context.prefix_identifiers {
            for alias in [&value, &key, &index].into_iter().flatten() {
                context.remove_identifiers(alias);
            }
        }
        on_exit(context)
    })))
}

/// Prefixes the source and declares the aliases as params. Runs once per
/// directive, the parse result remembers it.
pub fn finalize_for_parse_result(
    result: &mut ForParseResult,
    context: &TransformContext,
) -> Result<(), CompilerError> {
    if result.finalized {
        return Ok(());
    }
    if context.prefix_identifiers {
        if let ExpressionNode::Simple(source) = &result.source {
            result.source = process_expression(source, context, false)?;
        }
        for alias in [&mut result.key, &mut result.index, &mut result.value] {
            if let Some(ExpressionNode::Simple(exp)) = alias {
                *alias = Some(process_expression(exp, context, true)?);
            }
        }
    }
    result.finalized = true;
    Ok(())
}

/// `(value, key, index)` with holes filled by `_`, `__` placeholders and
/// trailing absent aliases dropped.
pub fn create_for_loop_params(
    result: &ForParseResult,
    memo_args: Vec<ExpressionNode>,
) -> Vec<ExpressionNode> {
    let mut args = vec![result.value.clone(), result.key.clone(), result.index.clone()];
    args.extend(memo_args.into_iter().map(Some));
    while matches!(args.last(), Some(None)) {
        args.pop();
    }
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            arg.unwrap_or_else(|| {
                ExpressionNode::new_simple("_".repeat(i + 1), Some(false), None, None)
            })
        })
        .collect()
}

fn process_codegen(
    node: NodeId,
    for_node: NodeId,
    source: &ExpressionNode,
    is_template: bool,
    context: &mut TransformContext,
) -> Result<ExitFn, CompilerError> {
    // create the loop render function expression now, and add the
    // iterator on exit after all children have been traversed
    let render_list = context.helper(RuntimeHelper::RenderList);
    let render_exp = CallExpression::new(render_list, Some(vec![source.clone().into()]), None);

    let Some(el) = context.ast.element(node) else {
        unreachable!("v-for on a non-element node");
    };
    let el_loc = el.loc.clone();
    let has_memo = find_dir(el, "memo", None).is_some();
    let key_index = find_prop_index(el, "key", Some(false), Some(true));
    let mut key_exp = key_index.and_then(|i| match &el.props[i] {
        BaseElementProps::Attribute(attr) => attr
            .value
            .as_ref()
            .map(|value| ExpressionNode::new_simple(value.content.clone(), Some(true), None, None)),
        BaseElementProps::Directive(dir) => dir.exp.clone(),
    });
    let is_dir_key = key_index
        .is_some_and(|i| matches!(el.props[i], BaseElementProps::Directive(_)));

    // the key of a memoized element is compared inside the loop callback, it
    // has to see the loop aliases. A <template v-for> is discarded and never
    // traversed, so its :key and v-memo expressions are processed here.
    if is_dir_key
        && (has_memo || is_template)
        && let Some(ExpressionNode::Simple(exp)) = &key_exp
    {
        let processed = process_expression(exp, context, false)?;
        key_exp = Some(processed.clone());
        if let (Some(i), Some(el)) = (key_index, context.ast.element_mut(node))
            && let BaseElementProps::Directive(dir) = &mut el.props[i]
        {
            dir.exp = Some(processed);
        }
    }
    if is_template
        && let Some(el) = context.ast.element(node)
        && let Some(memo_index) = el
            .props
            .iter()
            .position(|p| matches!(p, BaseElementProps::Directive(dir) if dir.name == "memo"))
        && let BaseElementProps::Directive(memo) = &el.props[memo_index]
        && let Some(ExpressionNode::Simple(exp)) = &memo.exp
    {
        let processed = process_expression(exp, context, false)?;
        if let Some(el) = context.ast.element_mut(node)
            && let BaseElementProps::Directive(memo) = &mut el.props[memo_index]
        {
            memo.exp = Some(processed);
        }
    }

    let key_property = key_exp
        .clone()
        .map(|exp| Property::with_static_key("key", exp.into()));

    let is_stable_fragment = matches!(source,
        ExpressionNode::Simple(source) if source.const_type > ConstantTypes::NotConstant);
    let fragment_flag = if is_stable_fragment {
        PatchFlags::StableFragment
    } else if key_index.is_some() {
        PatchFlags::KeyedFragment
    } else {
        PatchFlags::UnkeyedFragment
    };
    let fragment = context.helper(RuntimeHelper::Fragment);
    let codegen = VNodeCall::new(
        Some(context),
        VNodeCallTag::Symbol(fragment),
        None,
        Some(VNodeCallChildren::JSChild(render_exp.into())),
        Some(PatchFlag::Flags(fragment_flag)),
        None,
        None,
        /* isBlock */ Some(true),
        /* disableTracking */ Some(!is_stable_fragment),
        /* isComponent */ Some(false),
        Some(el_loc),
    );
    if let Node::For(for_node) = &mut context.ast[for_node] {
        for_node.codegen_node = Some(codegen.into());
    }

    Ok(Box::new(move |context: &mut TransformContext| {
        // finish the codegen now that all children have been traversed
        let Node::For(for_data) = &context.ast[for_node] else {
            return Ok(());
        };
        let children = for_data.children.clone();
        let parse_result = for_data.parse_result.clone();

        // check <template v-for> key placement
        if is_template {
            let misplaced = children.iter().find_map(|c| {
                context
                    .ast
                    .element(*c)
                    .and_then(|el| find_prop(el, "key", None, None))
                    .map(|key| key.loc().clone())
            });
            if let Some(loc) = misplaced {
                context.on_error(ErrorCodes::XVForTemplateKeyPlacement, Some(loc))?;
            }
        }

        let need_fragment_wrapper =
            children.len() != 1 || context.ast.element(children[0]).is_none();
        let slot_outlet = if is_slot_outlet(&context.ast, node) {
            Some(node)
        } else if is_template && children.len() == 1 && is_slot_outlet(&context.ast, children[0]) {
            Some(children[0])
        } else {
            None
        };

        let child_block = if let Some(slot_outlet) = slot_outlet {
            // <slot v-for="..."> or <template v-for="..."><slot/></template>
            if is_template
                && let Some(key_property) = key_property.clone()
                && let Some(mut codegen) = context.ast[slot_outlet].codegen_node_mut().and_then(Option::take)
            {
                // we need to inject the key to the renderSlot() call.
                inject_prop(&mut codegen, key_property, context);
                if let Some(slot) = context.ast[slot_outlet].codegen_node_mut() {
                    *slot = Some(codegen);
                }
            }
            JSChildNode::Node(slot_outlet)
        } else if need_fragment_wrapper {
            // <template v-for="..."> with text or multi-elements
            // should generate a fragment block for each loop
            let fragment = context.helper(RuntimeHelper::Fragment);
            VNodeCall::new(
                Some(context),
                VNodeCallTag::Symbol(fragment),
                key_property
                    .clone()
                    .map(|key| ObjectExpression::new(vec![key], None).into()),
                Some(VNodeCallChildren::TemplateChildNodeList(children)),
                Some(PatchFlag::Flags(PatchFlags::StableFragment)),
                None,
                None,
                Some(true),
                None,
                Some(false),
                None,
            )
            .into()
        } else {
            // Normal element v-for. Directly use the child's codegenNode
            // but mark it as a block.
            let child = children[0];
            let codegen = context
                .ast
                .element_mut(child)
                .and_then(|el| el.codegen_node.take());
            if let Some(mut codegen) = codegen {
                if is_template && let Some(key_property) = key_property.clone() {
                    inject_prop(&mut codegen, key_property, context);
                }
                if let JSChildNode::VNodeCall(vnode) = &mut codegen {
                    let is_block = !is_stable_fragment;
                    if vnode.is_block != is_block {
                        if vnode.is_block {
                            // switch from block to vnode
                            context.remove_helper(RuntimeHelper::OpenBlock);
                            context.remove_helper(get_vnode_block_helper(vnode.is_component));
                        } else {
                            // switch from vnode to block
                            context.remove_helper(get_vnode_helper(vnode.is_component));
                        }
                    }
                    vnode.is_block = is_block;
                    if vnode.is_block {
                        context.helper(RuntimeHelper::OpenBlock);
                        context.helper(get_vnode_block_helper(vnode.is_component));
                    } else {
                        context.helper(get_vnode_helper(vnode.is_component));
                    }
                }
                if let Some(el) = context.ast.element_mut(child) {
                    el.codegen_node = Some(codegen);
                }
            }
            JSChildNode::Node(child)
        };

        let iterator: Vec<CallArgument> = if has_memo {
            let memo_exp = context
                .ast
                .element(node)
                .and_then(|el| find_dir(el, "memo", None))
                .and_then(|dir| dir.exp.clone())
                .unwrap_or_else(|| ExpressionNode::new_simple("[]", Some(false), None, None));
            let mut loop_fn = FunctionExpression::new(
                create_for_loop_params(
                    &parse_result,
                    vec![ExpressionNode::new_simple("_cached", Some(false), None, None)],
                ),
                None,
                None,
                None,
                None,
            );
            let mut check: Vec<CompoundExpressionNodeChild> = vec!["if (_cached".into()];
            if let Some(key_exp) = &key_exp {
                check.push(" && _cached.key === ".into());
                check.push(key_exp.clone().into());
            }
            check.push(
                format!(
                    " && {}(_cached, _memo)) return _cached",
                    context.helper_string(RuntimeHelper::IsMemoSame)
                )
                .into(),
            );
            loop_fn.body = Some(BlockStatement {
                body: vec![
                    CompoundExpressionNode::new(
                        vec!["const _memo = (".into(), memo_exp.into(), ")".into()],
                        None,
                    )
                    .into(),
                    CompoundExpressionNode::new(check, None).into(),
                    CompoundExpressionNode::new(
                        vec![
                            "const _item = ".into(),
                            CompoundExpressionNodeChild::JSChild(Box::new(child_block)),
                        ],
                        None,
                    )
                    .into(),
                    JSChildNode::simple("_item.memo = _memo"),
                    JSChildNode::simple("return _item"),
                ],
            });
            let index = context.cached;
            context.cached += 1;
            vec![
                JSChildNode::from(loop_fn).into(),
                "_cache".into(),
                index.to_string().into(),
            ]
        } else {
            vec![
                JSChildNode::from(FunctionExpression::new(
                    create_for_loop_params(&parse_result, Vec::new()),
                    Some(FunctionReturns::JSChild(child_block)),
                    /* force newline */ Some(true),
                    None,
                    None,
                ))
                .into(),
            ]
        };

        if let Node::For(for_data) = &mut context.ast[for_node]
            && let Some(JSChildNode::VNodeCall(vnode)) = &mut for_data.codegen_node
            && let Some(VNodeCallChildren::JSChild(JSChildNode::Call(render_exp))) =
                &mut vnode.children
        {
            render_exp.arguments.extend(iterator);
        }
        Ok(())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alias(name: &str) -> Option<ExpressionNode> {
        Some(ExpressionNode::new_simple(name, Some(false), None, None))
    }

    fn params(result: &ForParseResult) -> Vec<String> {
        create_for_loop_params(result, Vec::new())
            .iter()
            .map(ExpressionNode::stringify)
            .collect()
    }

    #[test]
    fn loop_params_fill_holes() {
        let mut result = ForParseResult {
            source: ExpressionNode::new_simple("list", Some(false), None, None),
            value: None,
            key: None,
            index: alias("i"),
            finalized: true,
        };
        assert_eq!(params(&result), vec!["_", "__", "i"]);

        result.index = None;
        result.value = alias("item");
        assert_eq!(params(&result), vec!["item"]);

        result.value = None;
        assert!(params(&result).is_empty());
    }

    #[test]
    fn memo_params_follow_aliases() {
        let result = ForParseResult {
            source: ExpressionNode::new_simple("list", Some(false), None, None),
            value: alias("item"),
            key: None,
            index: None,
            finalized: true,
        };
        let params: Vec<String> = create_for_loop_params(
            &result,
            vec![ExpressionNode::new_simple("_cached", Some(false), None, None)],
        )
        .iter()
        .map(ExpressionNode::stringify)
        .collect();
        assert_eq!(params, vec!["item", "__", "___", "_cached"]);
    }
}
