use template_compiler_core::{
    CompilerError, ElementTypes, ErrorCodes, ExitFn, NodeId, NodeTransform, TransformContext,
};

/// `<script>` and `<style>` in a client template are reported and dropped.
#[derive(Debug, Default)]
pub struct IgnoreSideEffectTags;

impl NodeTransform for IgnoreSideEffectTags {
    fn transform(
        &self,
        node: NodeId,
        context: &mut TransformContext,
    ) -> Result<Option<ExitFn>, CompilerError> {
        let Some(el) = context.ast.element(node) else {
            return Ok(None);
        };
        if el.tag_type == ElementTypes::Element && (el.tag == "script" || el.tag == "style") {
            let loc = el.loc.clone();
            context.on_error(ErrorCodes::XIgnoredSideEffectTag, Some(loc))?;
            context.remove_node(None);
        }
        Ok(None)
    }
}
