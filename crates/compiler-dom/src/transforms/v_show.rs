use template_compiler_core::{
    CompilerError, DirectiveNode, DirectiveTransform, DirectiveTransformResult, ErrorCodes,
    NeedRuntime, NodeId, RuntimeHelper, TransformContext,
};

/// `v-show` produces no props, the element is wrapped with the `vShow`
/// runtime directive instead.
#[derive(Debug, Default)]
pub struct TransformShow;

impl DirectiveTransform for TransformShow {
    fn transform(
        &self,
        dir: &DirectiveNode,
        _node: NodeId,
        context: &mut TransformContext,
    ) -> Result<DirectiveTransformResult, CompilerError> {
        if dir.exp.is_none() {
            context.on_error(ErrorCodes::XVShowNoExpression, Some(dir.loc.clone()))?;
        }
        Ok(DirectiveTransformResult {
            props: Vec::new(),
            need_runtime: Some(NeedRuntime::Helper(context.helper(RuntimeHelper::VShow))),
        })
    }
}
