use crate::{
    ast::{
        CompoundExpressionNode, CompoundExpressionNodeChild, ConstantTypes, DirectiveNode,
        ElementTypes, ExpressionNode, JSChildNode, NodeId, Property,
    },
    errors::{CompilerError, ErrorCodes},
    transform::{DirectiveTransform, DirectiveTransformResult, TransformContext},
    utils::{exp_has_scope_ref, is_member_expression, is_simple_identifier},
};
use template_compiler_shared::camelize;

/// `v-model="foo"` expands to a `modelValue` prop plus an
/// `onUpdate:modelValue` listener assigning back to `foo`.
#[derive(Debug, Default)]
pub struct TransformModel;

impl DirectiveTransform for TransformModel {
    fn transform(
        &self,
        dir: &DirectiveNode,
        node: NodeId,
        context: &mut TransformContext,
    ) -> Result<DirectiveTransformResult, CompilerError> {
        let Some(exp) = &dir.exp else {
            context.on_error(ErrorCodes::XVModelNoExpression, Some(dir.loc.clone()))?;
            return Ok(DirectiveTransformResult::default());
        };

        // v-model directives are always parsed, never created by a transform
        let raw_exp = exp.loc().source.trim();
        let exp_string = match exp {
            ExpressionNode::Simple(exp) => exp.content.as_str(),
            ExpressionNode::Compound(_) => raw_exp,
        };

        if exp_string.trim().is_empty() || !is_member_expression(exp_string) {
            context.on_error(ErrorCodes::XVModelMalformedExpression, Some(exp.loc().clone()))?;
            return Ok(DirectiveTransformResult::default());
        }

        if context.prefix_identifiers
            && is_simple_identifier(exp_string)
            && context.is_identifier_in_scope(exp_string)
        {
            context.on_error(ErrorCodes::XVModelOnScopeVariable, Some(exp.loc().clone()))?;
            return Ok(DirectiveTransformResult::default());
        }

        let arg = dir.arg.as_ref();
        let prop_name = arg
            .cloned()
            .unwrap_or_else(|| ExpressionNode::new_simple("modelValue", Some(true), None, None));
        let event_name = match arg {
            Some(ExpressionNode::Simple(arg)) if arg.is_static => ExpressionNode::new_simple(
                format!("onUpdate:{}", camelize(&arg.content)),
                Some(true),
                None,
                None,
            ),
            Some(arg) => CompoundExpressionNode::new(
                vec![r#""onUpdate:" + "#.into(), arg.clone().into()],
                None,
            )
            .into(),
            None => ExpressionNode::new_simple("onUpdate:modelValue", Some(true), None, None),
        };

        let assignment_exp: JSChildNode = CompoundExpressionNode::new(
            vec![
                "$event => ((".into(),
                CompoundExpressionNodeChild::from(exp.clone()),
                ") = $event)".into(),
            ],
            None,
        )
        .into();

        // cache the handler when it doesn't refer to any scope variable
        let assignment_exp = if context.prefix_identifiers
            && !context.in_v_once
            && context.cache_handlers
            && !exp_has_scope_ref(exp, &context.identifiers)
        {
            context.cache(assignment_exp, false, false).into()
        } else {
            assignment_exp
        };

        let mut props = vec![
            // modelValue: foo
            Property::new(prop_name, exp.clone().into()),
            // "onUpdate:modelValue": $event => (foo = $event)
            Property::new(event_name, assignment_exp),
        ];

        // modelModifiers: { foo: true, "bar-baz": true }
        let is_component = context
            .ast
            .element(node)
            .is_some_and(|el| el.tag_type == ElementTypes::Component);
        if !dir.modifiers.is_empty() && is_component {
            let modifiers = dir
                .modifiers
                .iter()
                .map(|m| {
                    let key = if is_simple_identifier(m) {
                        m.clone()
                    } else {
                        serde_json::to_string(m).unwrap_or_else(|_| format!("\"{m}\""))
                    };
                    format!("{key}: true")
                })
                .collect::<Vec<_>>()
                .join(", ");
            let modifiers_key = match arg {
                Some(ExpressionNode::Simple(arg)) if arg.is_static => {
                    ExpressionNode::new_simple(format!("{}Modifiers", arg.content), Some(true), None, None)
                }
                Some(arg) => CompoundExpressionNode::new(
                    vec![arg.clone().into(), r#" + "Modifiers""#.into()],
                    None,
                )
                .into(),
                None => ExpressionNode::new_simple("modelModifiers", Some(true), None, None),
            };
            props.push(Property::new(
                modifiers_key,
                ExpressionNode::new_simple(
                    format!("{{ {modifiers} }}"),
                    Some(false),
                    Some(dir.loc.clone()),
                    Some(ConstantTypes::CanHoist),
                )
                .into(),
            ));
        }

        Ok(DirectiveTransformResult::new(props))
    }
}
