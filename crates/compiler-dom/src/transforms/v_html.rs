use template_compiler_core::{
    CompilerError, DirectiveNode, DirectiveTransform, DirectiveTransformResult, ErrorCodes,
    ExpressionNode, NodeId, Property, TransformContext,
};

#[derive(Debug, Default)]
pub struct TransformVHtml;

impl DirectiveTransform for TransformVHtml {
    fn transform(
        &self,
        dir: &DirectiveNode,
        node: NodeId,
        context: &mut TransformContext,
    ) -> Result<DirectiveTransformResult, CompilerError> {
        if dir.exp.is_none() {
            context.on_error(ErrorCodes::XVHtmlNoExpression, Some(dir.loc.clone()))?;
        }
        clear_children(node, ErrorCodes::XVHtmlWithChildren, dir, context)?;
        let value = dir
            .exp
            .clone()
            .unwrap_or_else(|| ExpressionNode::new_simple("", Some(true), None, None));
        let mut prop = Property::with_static_key("innerHTML", value.into());
        prop.loc = dir.loc.clone();
        Ok(DirectiveTransformResult::new(vec![prop]))
    }
}

/// Drops the element's children, reporting `code` if there were any.
pub(crate) fn clear_children(
    node: NodeId,
    code: ErrorCodes,
    dir: &DirectiveNode,
    context: &mut TransformContext,
) -> Result<(), CompilerError> {
    let has_children = context
        .ast
        .element(node)
        .is_some_and(|el| !el.children.is_empty());
    if has_children {
        context.on_error(code, Some(dir.loc.clone()))?;
        if let Some(el) = context.ast.element_mut(node) {
            el.children.clear();
        }
    }
    Ok(())
}
