use crate::{
    ast::{
        CallExpression, ElementTypes, FunctionExpression, FunctionReturns, JSChildNode, Node,
        NodeId, convert_to_block,
    },
    errors::CompilerError,
    runtime_helpers::RuntimeHelper,
    transform::{ExitFn, NodeTransform, TransformContext},
    utils::find_dir,
};
use std::{cell::RefCell, collections::HashSet};

/// `v-memo="[deps]"` wraps the element's vnode in `withMemo()` so the
/// subtree is reused while the dependency array is unchanged.
#[derive(Debug, Default)]
pub struct TransformMemo {
    // an element is visited again once a v-for has wrapped it
    seen: RefCell<HashSet<NodeId>>,
}

impl NodeTransform for TransformMemo {
    fn transform(
        &self,
        node: NodeId,
        context: &mut TransformContext,
    ) -> Result<Option<ExitFn>, CompilerError> {
        let Node::Element(el) = &context.ast[node] else {
            return Ok(None);
        };
        if find_dir(el, "memo", None).is_none() || !self.seen.borrow_mut().insert(node) {
            return Ok(None);
        }
        Ok(Some(Box::new(move |context: &mut TransformContext| {
            // a v-for on the same element builds the memo check into its
            // render list callback
            if context.current_node != Some(node) {
                return Ok(());
            }
            let Some(el) = context.ast.element_mut(node) else {
                return Ok(());
            };
            let is_component = el.tag_type == ElementTypes::Component;
            let Some(exp) = find_dir(el, "memo", None).and_then(|dir| dir.exp.clone()) else {
                return Ok(());
            };
            if !matches!(el.codegen_node, Some(JSChildNode::VNodeCall(_))) {
                return Ok(());
            }
            let Some(JSChildNode::VNodeCall(mut vnode)) = el.codegen_node.take() else {
                return Ok(());
            };
            // non-component sub tree should be turned into a block
            if !is_component {
                convert_to_block(&mut vnode, context);
            }
            let index = context.cached;
            context.cached += 1;
            let with_memo = context.helper(RuntimeHelper::WithMemo);
            let memo = CallExpression::new(
                with_memo,
                Some(vec![
                    exp.into(),
                    JSChildNode::from(FunctionExpression::new(
                        Vec::new(),
                        Some(FunctionReturns::JSChild(JSChildNode::VNodeCall(vnode))),
                        None,
                        None,
                        None,
                    ))
                    .into(),
                    "_cache".into(),
                    index.to_string().into(),
                ]),
                None,
            );
            if let Some(el) = context.ast.element_mut(node) {
                el.codegen_node = Some(memo.into());
            }
            Ok(())
        })))
    }
}
