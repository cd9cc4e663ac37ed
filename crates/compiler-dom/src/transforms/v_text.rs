use template_compiler_core::{
    CallExpression, CompilerError, ConstantTypes, DirectiveNode, DirectiveTransform,
    DirectiveTransformResult, ErrorCodes, ExpressionNode, JSChildNode, NodeId, Property,
    RuntimeHelper, TransformContext, transforms::hoist_static::get_exp_constant_type,
};

use crate::transforms::v_html::clear_children;

#[derive(Debug, Default)]
pub struct TransformVText;

impl DirectiveTransform for TransformVText {
    fn transform(
        &self,
        dir: &DirectiveNode,
        node: NodeId,
        context: &mut TransformContext,
    ) -> Result<DirectiveTransformResult, CompilerError> {
        if dir.exp.is_none() {
            context.on_error(ErrorCodes::XVTextNoExpression, Some(dir.loc.clone()))?;
        }
        clear_children(node, ErrorCodes::XVTextWithChildren, dir, context)?;
        let value = match &dir.exp {
            Some(exp) if get_exp_constant_type(exp) > ConstantTypes::NotConstant => {
                exp.clone().into()
            }
            Some(exp) => JSChildNode::from(CallExpression::new(
                context.helper(RuntimeHelper::ToDisplayString),
                Some(vec![exp.clone().into()]),
                Some(dir.loc.clone()),
            )),
            None => ExpressionNode::new_simple("", Some(true), None, None).into(),
        };
        let mut prop = Property::with_static_key("textContent", value);
        prop.loc = dir.loc.clone();
        Ok(DirectiveTransformResult::new(vec![prop]))
    }
}
