use crate::{
    ast::{
        ArrayExpression, BaseElementProps, CallArgument, CallExpression, ConstantTypes,
        DirectiveNode, ElementNode, ElementTypes, ExpressionNode, JSChildNode, Node, NodeId,
        ObjectExpression, Property, SimpleExpressionNode, SourceLocation, VNodeCall,
        VNodeCallChildren, VNodeCallTag,
    },
    errors::{CompilerError, ErrorCodes},
    runtime_helpers::RuntimeHelper,
    transform::{
        DirectiveTransformResult, ExitFn, NeedRuntime, NodeTransform, TransformContext,
    },
    transforms::{
        hoist_static::{get_constant_type, get_exp_constant_type},
        transform_expression::process_expression,
        v_slot::build_slots,
    },
    utils::{AssetType, find_prop, is_core_component, is_static_arg_of, to_valid_asset_id},
};
use template_compiler_shared::{
    PatchFlag, PatchFlags, camelize, capitalize, is_built_in_directive, is_on, is_reserved_prop,
};

/// generate a JavaScript AST for this element's codegen
#[derive(Debug, Default)]
pub struct TransformElement;

impl NodeTransform for TransformElement {
    fn transform(
        &self,
        _node: NodeId,
        _context: &mut TransformContext,
    ) -> Result<Option<ExitFn>, CompilerError> {
        // perform the work on exit, after all child expressions have been
        // processed and merged.
        Ok(Some(Box::new(post_transform_element)))
    }
}

fn post_transform_element(context: &mut TransformContext) -> Result<(), CompilerError> {
    let Some(id) = context.current_node else {
        return Ok(());
    };
    let Some(node) = context.ast.element(id) else {
        return Ok(());
    };
    if !matches!(node.tag_type, ElementTypes::Element | ElementTypes::Component) {
        return Ok(());
    }
    let node = node.clone();
    let is_component = node.tag_type == ElementTypes::Component;

    // The goal of the transform is to create a codegen node implementing the
    // VNodeCall interface.
    let vnode_tag = if is_component {
        resolve_component_type(id, &node, context)?
    } else {
        VNodeCallTag::String(format!("\"{}\"", node.tag))
    };
    let is_dynamic_component = matches!(&vnode_tag,
        VNodeCallTag::Call(call) if call.is_helper(RuntimeHelper::ResolveDynamicComponent));
    let is_builtin =
        |helper: RuntimeHelper| matches!(&vnode_tag, VNodeCallTag::Symbol(h) if *h == helper);

    let mut vnode_props = None;
    let mut vnode_children = None;
    let mut patch_flag = PatchFlags::empty();
    let mut vnode_dynamic_props = None;
    let mut vnode_directives = None;

    let mut should_use_block =
        // dynamic component may resolve to plain elements
        is_dynamic_component
            || is_builtin(RuntimeHelper::Teleport)
            || is_builtin(RuntimeHelper::Suspense)
            || (!is_component
                // <svg> and <foreignObject> must be forced into blocks so that
                // block updates inside get proper isSVG flag at runtime.
                && matches!(node.tag.as_str(), "svg" | "foreignObject" | "math"));

    // props
    if !node.props.is_empty() {
        let result = build_props(id, &node, context, is_component, is_dynamic_component)?;
        vnode_props = result.props;
        patch_flag = result.patch_flag;
        if !result.directives.is_empty() {
            let directives = result
                .directives
                .iter()
                .map(|(dir, runtime)| build_directive_args(dir, *runtime, context).into())
                .collect();
            vnode_directives = Some(ArrayExpression::new(directives, None));
        }
        if !result.dynamic_prop_names.is_empty() {
            vnode_dynamic_props = Some(stringify_dynamic_prop_names(&result.dynamic_prop_names));
        }
        if result.should_use_block {
            should_use_block = true;
        }
    }
    // directive transforms (v-html, v-text) may have dropped the children
    let node = match context.ast.element(id) {
        Some(el) => el.clone(),
        None => return Ok(()),
    };

    // children
    if !node.children.is_empty() {
        let is_keep_alive = is_builtin(RuntimeHelper::KeepAlive);
        if is_keep_alive {
            // KeepAlive is compiled with raw children instead of slot
            // functions so that it can be used inside Transition. It is
            // forced into a block and always updated.
            should_use_block = true;
            patch_flag |= PatchFlags::DynamicSlots;
            if node.children.len() > 1 {
                let first = context.ast[node.children[0]].loc().start;
                let last = context.ast[node.children[node.children.len() - 1]].loc().end;
                context.on_error(
                    ErrorCodes::XKeepAliveInvalidChildren,
                    Some(SourceLocation {
                        start: first,
                        end: last,
                        source: String::new(),
                    }),
                )?;
            }
        }

        let should_build_as_slots =
            is_component && !is_builtin(RuntimeHelper::Teleport) && !is_keep_alive;

        if should_build_as_slots {
            let (slots, has_dynamic_slots) = build_slots(id, context)?;
            vnode_children = Some(VNodeCallChildren::JSChild(slots));
            if has_dynamic_slots {
                patch_flag |= PatchFlags::DynamicSlots;
            }
        } else if let [child] = node.children[..]
            && !is_builtin(RuntimeHelper::Teleport)
        {
            // check for dynamic text children
            let has_dynamic_text_child =
                matches!(context.ast[child], Node::Interpolation(_) | Node::Compound(_));
            if has_dynamic_text_child
                && get_constant_type(child, context) == ConstantTypes::NotConstant
            {
                patch_flag |= PatchFlags::Text;
            }
            // pass directly if the only child is a text node
            // (plain / interpolation / expression)
            vnode_children = Some(
                if has_dynamic_text_child || matches!(context.ast[child], Node::Text(_)) {
                    VNodeCallChildren::TemplateTextChildNode(child)
                } else {
                    VNodeCallChildren::TemplateChildNodeList(node.children.clone())
                },
            );
        } else {
            vnode_children = Some(VNodeCallChildren::TemplateChildNodeList(
                node.children.clone(),
            ));
        }
    }

    let vnode_call = VNodeCall::new(
        Some(context),
        vnode_tag,
        vnode_props,
        vnode_children,
        (!patch_flag.is_empty()).then_some(PatchFlag::Flags(patch_flag)),
        vnode_dynamic_props,
        vnode_directives,
        Some(should_use_block),
        /* disableTracking */ Some(false),
        Some(is_component),
        Some(node.loc.clone()),
    );
    if let Some(el) = context.ast.element_mut(id) {
        el.codegen_node = Some(vnode_call.into());
    }
    Ok(())
}

fn is_component_tag(tag: &str) -> bool {
    tag == "component" || tag == "Component"
}

pub fn resolve_component_type(
    id: NodeId,
    node: &ElementNode,
    context: &mut TransformContext,
) -> Result<VNodeCallTag, CompilerError> {
    let mut tag = node.tag.clone();

    // 1. dynamic component
    let is_explicit_dynamic = is_component_tag(&tag);
    if let Some(is_prop) = find_prop(node, "is", Some(false), Some(true)) {
        if is_explicit_dynamic {
            let exp = match is_prop {
                BaseElementProps::Attribute(attr) => attr.value.as_ref().map(|value| {
                    ExpressionNode::new_simple(value.content.clone(), Some(true), None, None)
                }),
                BaseElementProps::Directive(dir) => match &dir.exp {
                    Some(exp) => Some(exp.clone()),
                    None => {
                        // `:is` shorthand
                        let loc = dir.arg.as_ref().map(|arg| arg.loc().clone());
                        let exp = SimpleExpressionNode::new("is", Some(false), loc, None);
                        let exp = process_expression(&exp, context, false)?;
                        let target = context.ast.element_mut(id).and_then(|el| {
                            el.props.iter_mut().find(|p| {
                                matches!(p, BaseElementProps::Directive(d)
                                    if d.name == "bind" && is_static_arg_of(d.arg.as_ref(), "is"))
                            })
                        });
                        if let Some(BaseElementProps::Directive(dir)) = target {
                            dir.exp = Some(exp.clone());
                        }
                        Some(exp)
                    }
                },
            };
            if let Some(exp) = exp {
                return Ok(VNodeCallTag::Call(CallExpression::new(
                    context.helper(RuntimeHelper::ResolveDynamicComponent),
                    Some(vec![exp.into()]),
                    None,
                )));
            }
        } else if let BaseElementProps::Attribute(attr) = is_prop
            && let Some(name) = attr
                .value
                .as_ref()
                .and_then(|value| value.content.strip_prefix("vue:"))
        {
            // <button is="vue:xxx">
            // if not <component>, only is value that starts with "vue:" will
            // be treated as component by the parse phase and reach here
            tag = name.to_string();
        }
    }

    // 2. built-in components (Teleport, Transition, KeepAlive, Suspense...)
    let built_in = is_core_component(&tag).or_else(|| {
        context
            .is_built_in_component
            .as_ref()
            .and_then(|resolve| resolve(&tag))
    });
    if let Some(built_in) = built_in {
        return Ok(VNodeCallTag::Symbol(context.helper(built_in)));
    }

    // 3. self referencing component (inferred from filename)
    if context
        .self_name
        .as_deref()
        .is_some_and(|name| capitalize(&camelize(&tag)) == name)
    {
        context.helper(RuntimeHelper::ResolveComponent);
        // codegen passes the `maybeSelfReference` flag to `resolveComponent`
        // for names with this postfix.
        context.components.insert(format!("{tag}__self"));
        return Ok(VNodeCallTag::String(to_valid_asset_id(
            &tag,
            AssetType::Component,
        )));
    }

    // 4. user component (resolve)
    context.helper(RuntimeHelper::ResolveComponent);
    context.components.insert(tag.clone());
    Ok(VNodeCallTag::String(to_valid_asset_id(
        &tag,
        AssetType::Component,
    )))
}

#[derive(Debug)]
pub struct PropsBuildResult {
    pub props: Option<JSChildNode>,
    pub directives: Vec<(DirectiveNode, Option<RuntimeHelper>)>,
    pub patch_flag: PatchFlags,
    pub dynamic_prop_names: Vec<String>,
    pub should_use_block: bool,
}

#[derive(Debug, Default)]
struct PatchFlagAnalysis {
    has_ref: bool,
    has_class_binding: bool,
    has_style_binding: bool,
    has_hydration_event_binding: bool,
    has_dynamic_keys: bool,
    has_vnode_hook: bool,
    dynamic_prop_names: Vec<String>,
}

impl PatchFlagAnalysis {
    fn analyze(
        &mut self,
        prop: &Property,
        is_component: bool,
        is_dynamic_component: bool,
    ) {
        let ExpressionNode::Simple(key) = &prop.key else {
            self.has_dynamic_keys = true;
            return;
        };
        if !key.is_static {
            self.has_dynamic_keys = true;
            return;
        }
        let name = key.content.as_str();
        let is_event_handler = is_on(name);
        if is_event_handler
            && (!is_component || is_dynamic_component)
            // omit the flag for click handlers because hydration gives click
            // dedicated fast path.
            && !name.eq_ignore_ascii_case("onclick")
            // omit v-model handlers
            && name != "onUpdate:modelValue"
            // omit onVnodeXXX hooks
            && !is_reserved_prop(name)
        {
            self.has_hydration_event_binding = true;
        }
        if is_event_handler && is_reserved_prop(name) {
            self.has_vnode_hook = true;
        }

        let mut value = &prop.value;
        // handler wrapped with an internal helper, e.g. withModifiers(fn)
        if is_event_handler
            && let JSChildNode::Call(call) = value
            && let Some(CallArgument::JSChild(inner)) = call.arguments.first()
        {
            value = inner;
        }
        let value_is_constant = match value {
            JSChildNode::Cache(_) => true,
            JSChildNode::Simple(exp) => exp.const_type > ConstantTypes::NotConstant,
            JSChildNode::Compound(exp) => {
                get_exp_constant_type(&ExpressionNode::Compound(exp.clone()))
                    > ConstantTypes::NotConstant
            }
            _ => false,
        };
        if value_is_constant {
            // skip if the prop is a cached handler or has constant value
            return;
        }

        match name {
            "ref" => self.has_ref = true,
            "class" => self.has_class_binding = true,
            "style" => self.has_style_binding = true,
            "key" => {}
            name => self.push_dynamic(name),
        }

        // treat the dynamic class and style binding of the component as
        // dynamic props
        if is_component && (name == "class" || name == "style") {
            self.push_dynamic(name);
        }
    }

    fn push_dynamic(&mut self, name: &str) {
        if !self.dynamic_prop_names.iter().any(|n| n == name) {
            self.dynamic_prop_names.push(name.to_string());
        }
    }
}

pub fn build_props(
    id: NodeId,
    node: &ElementNode,
    context: &mut TransformContext,
    is_component: bool,
    is_dynamic_component: bool,
) -> Result<PropsBuildResult, CompilerError> {
    let element_loc = node.loc.clone();
    let has_children = !node.children.is_empty();
    let mut properties: Vec<Property> = Vec::new();
    let mut merge_args: Vec<JSChildNode> = Vec::new();
    let mut runtime_directives = Vec::new();
    let mut should_use_block = false;

    // patchFlag analysis
    let mut patch_flag = PatchFlags::empty();
    let mut analysis = PatchFlagAnalysis::default();

    let push_merge_arg =
        |properties: &mut Vec<Property>, merge_args: &mut Vec<JSChildNode>, arg: Option<JSChildNode>| {
            if !properties.is_empty() {
                merge_args.push(
                    ObjectExpression::new(
                        dedupe_properties(std::mem::take(properties)),
                        Some(element_loc.clone()),
                    )
                    .into(),
                );
            }
            if let Some(arg) = arg {
                merge_args.push(arg);
            }
        };

    // mark template ref on v-for
    let push_ref_v_for_marker = |properties: &mut Vec<Property>, in_v_for: bool| {
        if in_v_for {
            properties.push(Property::with_static_key(
                "ref_for",
                JSChildNode::simple("true"),
            ));
        }
    };

    let directive_transforms = context.directive_transforms();
    for prop in &node.props {
        match prop {
            // static attribute
            BaseElementProps::Attribute(attr) => {
                if attr.name == "ref" {
                    analysis.has_ref = true;
                    push_ref_v_for_marker(&mut properties, context.scopes.v_for > 0);
                }
                // skip is on <component>, or is="vue:xxx"
                if attr.name == "is"
                    && (is_component_tag(&node.tag)
                        || attr
                            .value
                            .as_ref()
                            .is_some_and(|v| v.content.starts_with("vue:")))
                {
                    continue;
                }
                let (value, loc) = match &attr.value {
                    Some(value) => (value.content.clone(), value.loc.clone()),
                    None => (String::new(), attr.loc.clone()),
                };
                properties.push(Property::new(
                    ExpressionNode::new_simple(
                        attr.name.clone(),
                        Some(true),
                        Some(attr.name_loc.clone()),
                        None,
                    ),
                    ExpressionNode::new_simple(value, Some(true), Some(loc), None).into(),
                ));
            }
            // directives
            BaseElementProps::Directive(dir) => {
                let name = dir.name.as_str();
                let is_v_bind = name == "bind";
                let is_v_on = name == "on";

                // skip v-slot - it is handled by its dedicated transform.
                if name == "slot" {
                    if !is_component {
                        context.on_error(ErrorCodes::XVSlotMisplaced, Some(dir.loc.clone()))?;
                    }
                    continue;
                }
                // skip v-once/v-memo - they are handled by dedicated transforms.
                if name == "once" || name == "memo" {
                    continue;
                }
                // skip v-is and :is on <component>
                if name == "is"
                    || (is_v_bind
                        && is_static_arg_of(dir.arg.as_ref(), "is")
                        && is_component_tag(&node.tag))
                {
                    continue;
                }

                if
                // elements with dynamic keys should be forced into blocks
                (is_v_bind && is_static_arg_of(dir.arg.as_ref(), "key"))
                    // inline before-update hooks need to force block so that
                    // it is invoked before children
                    || (is_v_on
                        && has_children
                        && is_static_arg_of(dir.arg.as_ref(), "vue:before-update"))
                {
                    should_use_block = true;
                }

                if is_v_bind && is_static_arg_of(dir.arg.as_ref(), "ref") {
                    push_ref_v_for_marker(&mut properties, context.scopes.v_for > 0);
                }

                // special case for v-bind and v-on with no argument
                if dir.arg.is_none() && (is_v_bind || is_v_on) {
                    analysis.has_dynamic_keys = true;
                    match &dir.exp {
                        Some(exp) if is_v_bind => {
                            // in case a v-bind object contains ref
                            push_ref_v_for_marker(&mut properties, context.scopes.v_for > 0);
                            push_merge_arg(&mut properties, &mut merge_args, None);
                            merge_args.push(exp.clone().into());
                        }
                        Some(exp) => {
                            // v-on="obj" -> toHandlers(obj)
                            let mut arguments = vec![CallArgument::from(exp.clone())];
                            if !is_component {
                                arguments.push("true".into());
                            }
                            let call = CallExpression::new(
                                context.helper(RuntimeHelper::ToHandlers),
                                Some(arguments),
                                Some(dir.loc.clone()),
                            );
                            push_merge_arg(&mut properties, &mut merge_args, Some(call.into()));
                        }
                        None => {
                            context.on_error(
                                if is_v_bind {
                                    ErrorCodes::XVBindNoExpression
                                } else {
                                    ErrorCodes::XVOnNoExpression
                                },
                                Some(dir.loc.clone()),
                            )?;
                        }
                    }
                    continue;
                }

                // force hydration for v-bind with .prop modifier
                if is_v_bind && dir.modifiers.iter().any(|m| m == "prop") {
                    patch_flag |= PatchFlags::NeedHydration;
                }

                if let Some(transform) = directive_transforms.get(name) {
                    // has built-in directive transform.
                    let DirectiveTransformResult {
                        props,
                        need_runtime,
                    } = transform.transform(dir, id, context)?;
                    for prop in &props {
                        analysis.analyze(prop, is_component, is_dynamic_component);
                    }
                    if is_v_on && dir.arg.as_ref().is_some_and(|arg| !arg.is_static_exp()) {
                        push_merge_arg(
                            &mut properties,
                            &mut merge_args,
                            Some(ObjectExpression::new(props, Some(element_loc.clone())).into()),
                        );
                    } else {
                        properties.extend(props);
                    }
                    match need_runtime {
                        Some(NeedRuntime::Yes) => runtime_directives.push((dir.clone(), None)),
                        Some(NeedRuntime::Helper(helper)) => {
                            runtime_directives.push((dir.clone(), Some(helper)));
                        }
                        None => {}
                    }
                } else if !is_built_in_directive(name) {
                    // no built-in transform, this is a user custom directive.
                    runtime_directives.push((dir.clone(), None));
                    // custom dirs may use beforeUpdate so they need to force
                    // blocks to ensure before-update gets called before
                    // children update
                    if has_children {
                        should_use_block = true;
                    }
                }
            }
        }
    }

    // has v-bind="object" or v-on="object", wrap with mergeProps
    let mut props_expression = if !merge_args.is_empty() {
        // close up any not-yet-merged props
        push_merge_arg(&mut properties, &mut merge_args, None);
        if merge_args.len() > 1 {
            Some(
                CallExpression::new(
                    context.helper(RuntimeHelper::MergeProps),
                    Some(merge_args.into_iter().map(CallArgument::JSChild).collect()),
                    Some(element_loc.clone()),
                )
                .into(),
            )
        } else {
            // single v-bind with nothing else - no need for a mergeProps call
            merge_args.pop()
        }
    } else if !properties.is_empty() {
        Some(ObjectExpression::new(dedupe_properties(properties), Some(element_loc.clone())).into())
    } else {
        None
    };

    // patchFlag analysis. Bits only accumulate: the full-props bit is added
    // next to the fine-grained ones.
    if analysis.has_dynamic_keys {
        patch_flag |= PatchFlags::FullProps;
    }
    if analysis.has_class_binding && !is_component {
        patch_flag |= PatchFlags::Class;
    }
    if analysis.has_style_binding && !is_component {
        patch_flag |= PatchFlags::Style;
    }
    if !analysis.dynamic_prop_names.is_empty() {
        patch_flag |= PatchFlags::Props;
    }
    if analysis.has_hydration_event_binding {
        patch_flag |= PatchFlags::NeedHydration;
    }
    if !should_use_block
        && (patch_flag.is_empty() || patch_flag == PatchFlags::NeedHydration)
        && (analysis.has_ref || analysis.has_vnode_hook || !runtime_directives.is_empty())
    {
        patch_flag |= PatchFlags::NeedPatch;
    }

    // pre-normalize props
    props_expression = match props_expression {
        Some(JSChildNode::Object(mut object)) => {
            // means that there is no v-bind,
            // but still need to deal with dynamic key binding
            let mut class_key_index = None;
            let mut style_key_index = None;
            let mut has_dynamic_key = false;
            for (i, p) in object.properties.iter().enumerate() {
                match &p.key {
                    ExpressionNode::Simple(key) if key.is_static => {
                        if key.content == "class" {
                            class_key_index = Some(i);
                        } else if key.content == "style" {
                            style_key_index = Some(i);
                        }
                    }
                    key if !key.is_handler_key() => has_dynamic_key = true,
                    _ => {}
                }
            }

            if !has_dynamic_key {
                if let Some(i) = class_key_index
                    && !is_static_value(&object.properties[i].value)
                {
                    let value =
                        std::mem::replace(&mut object.properties[i].value, JSChildNode::simple(""));
                    object.properties[i].value = CallExpression::new(
                        context.helper(RuntimeHelper::NormalizeClass),
                        Some(vec![value.into()]),
                        None,
                    )
                    .into();
                }
                if let Some(i) = style_key_index {
                    let style_value = &object.properties[i].value;
                    // the static style is compiled into an object, so use
                    // `has_style_binding` to ensure that it is a dynamic
                    // style binding
                    let normalize = analysis.has_style_binding
                        || matches!(style_value, JSChildNode::Simple(exp) if exp.content.trim_start().starts_with('['))
                        // v-bind:style and style both exist,
                        // v-bind:style with static literal object
                        || matches!(style_value, JSChildNode::Array(_));
                    if normalize {
                        let value = std::mem::replace(
                            &mut object.properties[i].value,
                            JSChildNode::simple(""),
                        );
                        object.properties[i].value = CallExpression::new(
                            context.helper(RuntimeHelper::NormalizeStyle),
                            Some(vec![value.into()]),
                            None,
                        )
                        .into();
                    }
                }
                Some(JSChildNode::Object(object))
            } else {
                // dynamic key binding, wrap with `normalizeProps`
                Some(
                    CallExpression::new(
                        context.helper(RuntimeHelper::NormalizeProps),
                        Some(vec![JSChildNode::Object(object).into()]),
                        None,
                    )
                    .into(),
                )
            }
        }
        // mergeProps call, do nothing
        Some(JSChildNode::Call(call)) => Some(JSChildNode::Call(call)),
        // single v-bind
        Some(other) => {
            let guarded = CallExpression::new(
                context.helper(RuntimeHelper::GuardReactiveProps),
                Some(vec![other.into()]),
                None,
            );
            Some(
                CallExpression::new(
                    context.helper(RuntimeHelper::NormalizeProps),
                    Some(vec![JSChildNode::from(guarded).into()]),
                    None,
                )
                .into(),
            )
        }
        None => None,
    };

    Ok(PropsBuildResult {
        props: props_expression,
        directives: runtime_directives,
        patch_flag,
        dynamic_prop_names: analysis.dynamic_prop_names,
        should_use_block,
    })
}

fn is_static_value(value: &JSChildNode) -> bool {
    matches!(value, JSChildNode::Simple(exp) if exp.is_static)
}

/// Literal duplicates are handled by the parser; this merges the duplicates
/// that directives introduce, e.g. `class` next to `:class`.
fn dedupe_properties(properties: Vec<Property>) -> Vec<Property> {
    let mut deduped: Vec<Property> = Vec::with_capacity(properties.len());
    for prop in properties {
        // dynamic keys are always allowed
        let name = match &prop.key {
            ExpressionNode::Simple(key) if key.is_static => key.content.clone(),
            _ => {
                deduped.push(prop);
                continue;
            }
        };
        let existing = deduped.iter().position(|p| {
            matches!(&p.key, ExpressionNode::Simple(key) if key.is_static && key.content == name)
        });
        match existing {
            Some(i) => {
                if name == "style" || name == "class" || is_on(&name) {
                    merge_as_array(&mut deduped[i], prop);
                }
                // unexpected duplicate, should have emitted error during parse
            }
            None => deduped.push(prop),
        }
    }
    deduped
}

fn merge_as_array(existing: &mut Property, incoming: Property) {
    if let JSChildNode::Array(array) = &mut existing.value {
        array.elements.push(incoming.value);
    } else {
        let value = std::mem::replace(&mut existing.value, JSChildNode::simple(""));
        existing.value =
            ArrayExpression::new(vec![value, incoming.value], Some(existing.loc.clone())).into();
    }
}

pub fn build_directive_args(
    dir: &DirectiveNode,
    runtime: Option<RuntimeHelper>,
    context: &mut TransformContext,
) -> ArrayExpression {
    let mut dir_args: Vec<JSChildNode> = Vec::new();
    match runtime {
        // built-in directive with runtime
        Some(runtime) => dir_args.push(JSChildNode::simple(context.helper_string(runtime))),
        None => {
            // user directive.
            // inject statement for resolving directive
            context.helper(RuntimeHelper::ResolveDirective);
            context.directives.insert(dir.name.clone());
            dir_args.push(JSChildNode::simple(to_valid_asset_id(
                &dir.name,
                AssetType::Directive,
            )));
        }
    }
    if let Some(exp) = &dir.exp {
        dir_args.push(exp.clone().into());
    }
    if let Some(arg) = &dir.arg {
        if dir.exp.is_none() {
            dir_args.push(JSChildNode::simple("void 0"));
        }
        dir_args.push(arg.clone().into());
    }
    if !dir.modifiers.is_empty() {
        if dir.arg.is_none() {
            if dir.exp.is_none() {
                dir_args.push(JSChildNode::simple("void 0"));
            }
            dir_args.push(JSChildNode::simple("void 0"));
        }
        let true_expression: JSChildNode =
            ExpressionNode::new_simple("true", Some(false), Some(dir.loc.clone()), None).into();
        dir_args.push(
            ObjectExpression::new(
                dir.modifiers
                    .iter()
                    .map(|m| Property::with_static_key(m.clone(), true_expression.clone()))
                    .collect(),
                Some(dir.loc.clone()),
            )
            .into(),
        );
    }
    ArrayExpression::new(dir_args, Some(dir.loc.clone()))
}

/// `["foo", "bar"]`
pub fn stringify_dynamic_prop_names(props: &[String]) -> String {
    let names: Vec<String> = props
        .iter()
        .map(|p| serde_json::to_string(p).unwrap_or_else(|_| format!("\"{p}\"")))
        .collect();
    format!("[{}]", names.join(", "))
}
