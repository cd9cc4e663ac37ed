use crate::{
    ast::{
        BaseElementProps, CallArgument, CallExpression, ExpressionNode, FunctionExpression,
        FunctionReturns, JSChildNode, NodeId,
    },
    errors::{CompilerError, ErrorCodes},
    runtime_helpers::RuntimeHelper,
    transform::{ExitFn, NodeTransform, TransformContext},
    transforms::transform_element::build_props,
    utils::{is_slot_outlet, is_static_arg_of},
};
use template_compiler_shared::camelize;

/// `<slot>` compiles to a `renderSlot($slots, name, props, fallback)` call.
#[derive(Debug, Default)]
pub struct TransformSlotOutlet;

impl NodeTransform for TransformSlotOutlet {
    fn transform(
        &self,
        node: NodeId,
        context: &mut TransformContext,
    ) -> Result<Option<ExitFn>, CompilerError> {
        if !is_slot_outlet(&context.ast, node) {
            return Ok(None);
        }
        let Some(el) = context.ast.element(node) else {
            return Ok(None);
        };
        let children = el.children.clone();
        let loc = el.loc.clone();
        let SlotOutletProcessResult {
            slot_name,
            slot_props,
        } = process_slot_outlet(node, context)?;

        let mut slot_args: Vec<CallArgument> = vec![
            if context.prefix_identifiers {
                "_ctx.$slots"
            } else {
                "$slots"
            }
            .into(),
            slot_name.into(),
            "{}".into(),
            "undefined".into(),
        ];
        let mut expected_len = 2;
        if let Some(props) = slot_props {
            slot_args[2] = props.into();
            expected_len = 3;
        }
        if !children.is_empty() {
            slot_args[3] = JSChildNode::from(FunctionExpression::new(
                Vec::new(),
                Some(FunctionReturns::TemplateChildren(children)),
                Some(false),
                Some(false),
                Some(loc.clone()),
            ))
            .into();
            expected_len = 4;
        }
        slot_args.truncate(expected_len);

        let render_slot = context.helper(RuntimeHelper::RenderSlot);
        let call = CallExpression::new(render_slot, Some(slot_args), Some(loc));
        if let Some(el) = context.ast.element_mut(node) {
            el.codegen_node = Some(call.into());
        }
        Ok(None)
    }
}

#[derive(Debug)]
struct SlotOutletProcessResult {
    slot_name: JSChildNode,
    slot_props: Option<JSChildNode>,
}

fn process_slot_outlet(
    node: NodeId,
    context: &mut TransformContext,
) -> Result<SlotOutletProcessResult, CompilerError> {
    let Some(el) = context.ast.element(node) else {
        unreachable!("slot outlets are elements");
    };
    let mut slot_name = JSChildNode::simple(r#""default""#);
    let mut non_name_props = Vec::new();
    for prop in &el.props {
        match prop {
            BaseElementProps::Attribute(attr) => {
                let Some(value) = &attr.value else {
                    continue;
                };
                if attr.name == "name" {
                    let name = serde_json::to_string(&value.content)
                        .unwrap_or_else(|_| format!("\"{}\"", value.content));
                    slot_name = JSChildNode::simple(name);
                } else {
                    let mut attr = attr.clone();
                    attr.name = camelize(&attr.name);
                    non_name_props.push(BaseElementProps::Attribute(attr));
                }
            }
            BaseElementProps::Directive(dir)
                if dir.name == "bind" && is_static_arg_of(dir.arg.as_ref(), "name") =>
            {
                if let Some(exp) = &dir.exp {
                    slot_name = exp.clone().into();
                }
            }
            BaseElementProps::Directive(dir) => {
                let mut dir = dir.clone();
                if dir.name == "bind"
                    && let Some(ExpressionNode::Simple(arg)) = &mut dir.arg
                    && arg.is_static
                {
                    arg.content = camelize(&arg.content);
                }
                non_name_props.push(BaseElementProps::Directive(dir));
            }
        }
    }

    let mut slot_props = None;
    if !non_name_props.is_empty() {
        let mut outlet = el.clone();
        outlet.props = non_name_props;
        let result = build_props(node, &outlet, context, false, false)?;
        slot_props = result.props;
        if let Some((dir, _)) = result.directives.first() {
            context.on_error(
                ErrorCodes::XVSlotUnexpectedDirectiveOnSlotOutlet,
                Some(dir.loc.clone()),
            )?;
        }
    }
    Ok(SlotOutletProcessResult {
        slot_name,
        slot_props,
    })
}
