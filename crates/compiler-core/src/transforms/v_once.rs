use crate::{
    ast::{Node, NodeId},
    errors::CompilerError,
    runtime_helpers::RuntimeHelper,
    transform::{ExitFn, NodeTransform, TransformContext},
    utils::find_dir,
};

/// `v-once` renders the subtree once and serves it from `_cache` afterwards.
#[derive(Debug, Default)]
pub struct TransformOnce;

impl NodeTransform for TransformOnce {
    fn transform(
        &self,
        node: NodeId,
        context: &mut TransformContext,
    ) -> Result<Option<ExitFn>, CompilerError> {
        let Node::Element(el) = &context.ast[node] else {
            return Ok(None);
        };
        // nested v-once regions are already covered by the outer cache
        if find_dir(el, "once", Some(true)).is_none() || context.in_v_once {
            return Ok(None);
        }
        context.in_v_once = true;
        context.helper(RuntimeHelper::SetBlockTracking);
        Ok(Some(Box::new(|context: &mut TransformContext| {
            context.in_v_once = false;
            // the element may have been replaced by a v-if/v-for wrapper
            let Some(current) = context.current_node else {
                return Ok(());
            };
            let Some(codegen) = context.ast[current].codegen_node_mut().and_then(Option::take)
            else {
                return Ok(());
            };
            let cached = context.cache(codegen, true, true);
            if let Some(slot) = context.ast[current].codegen_node_mut() {
                *slot = Some(cached.into());
            }
            Ok(())
        })))
    }
}
