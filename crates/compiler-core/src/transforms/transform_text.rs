use crate::{
    ast::{
        BaseElementProps, CallArgument, CallExpression, CompoundExpressionNode,
        CompoundExpressionNodeChild, ConstantTypes, ElementTypes, Node, NodeId, TextCallNode,
    },
    errors::CompilerError,
    runtime_helpers::RuntimeHelper,
    transform::{ExitFn, NodeTransform, TransformContext},
    transforms::hoist_static::get_constant_type,
};
use template_compiler_shared::PatchFlags;

/// Merge adjacent text nodes and expressions into a single expression
/// e.g. <div>abc {{ d }} {{ e }}</div> should have a single expression node as child.
#[derive(Debug, Default)]
pub struct TransformText;

impl NodeTransform for TransformText {
    fn transform(
        &self,
        node: NodeId,
        _context: &mut TransformContext,
    ) -> Result<Option<ExitFn>, CompilerError> {
        // perform the transform on node exit so that all expressions have
        // already been processed.
        Ok(Some(Box::new(move |context: &mut TransformContext| {
            if matches!(
                context.ast[node],
                Node::Root(_) | Node::Element(_) | Node::For(_) | Node::IfBranch(_)
            ) {
                transform_text(node, context);
            }
            Ok(())
        })))
    }
}

fn transform_text(node: NodeId, context: &mut TransformContext) {
    let has_text = merge_adjacent_text(node, context);
    if !has_text {
        return;
    }

    let children = context.ast.children(node).to_vec();
    // if this is a plain element with a single text child, leave it
    // as-is since the runtime has dedicated fast path for this by directly
    // setting textContent of the element.
    // for component root it's always normalized anyway.
    if children.len() == 1 {
        let single_text_fast_path = match &context.ast[node] {
            Node::Root(_) => true,
            // custom directives can potentially add DOM elements arbitrarily,
            // we need to avoid setting textContent of the element at runtime
            // to avoid accidentally overwriting the DOM elements added
            // by the user through custom directives.
            Node::Element(el) => {
                el.tag_type == ElementTypes::Element
                    && !el.props.iter().any(|p| {
                        matches!(p, BaseElementProps::Directive(dir)
                            if context.directive_transform(&dir.name).is_none())
                    })
            }
            _ => false,
        };
        if single_text_fast_path {
            return;
        }
    }

    // pre-convert text nodes into createTextVNode(text) calls to avoid
    // runtime normalization.
    for (i, child) in children.into_iter().enumerate() {
        let is_single_space = match &context.ast[child] {
            Node::Text(text) => text.content == " ",
            Node::Interpolation(_) | Node::Compound(_) => false,
            _ => continue,
        };
        let mut call_args = Vec::new();
        // createTextVNode defaults to single whitespace, so if it is a
        // single space the code could be an empty call to save bytes.
        if !is_single_space {
            call_args.push(CallArgument::TemplateChild(child));
        }
        // mark dynamic text with flag so it gets patched inside a block
        if get_constant_type(child, context) == ConstantTypes::NotConstant {
            call_args.push(if context.dev {
                format!("{} /* {} */", PatchFlags::Text, PatchFlags::Text.as_str())
            } else {
                PatchFlags::Text.to_string()
            }
            .into());
        }
        let create_text = context.helper(RuntimeHelper::CreateText);
        let loc = context.ast[child].loc().clone();
        let text_call = context.ast.alloc(Node::TextCall(TextCallNode {
            content: child,
            codegen_node: CallExpression::new(create_text, Some(call_args), None).into(),
            loc,
        }));
        if let Some(children) = context.ast.children_mut(node) {
            children[i] = text_call;
        }
    }
}

/// Folds runs of text and interpolation children into compound expression
/// nodes. Returns whether any text child was found.
fn merge_adjacent_text(node: NodeId, context: &mut TransformContext) -> bool {
    let mut children = context.ast.children(node).to_vec();
    let mut has_text = false;
    let mut i = 0;
    while i < children.len() {
        if !context.ast[children[i]].is_text() {
            i += 1;
            continue;
        }
        has_text = true;
        let mut merged: Option<CompoundExpressionNode> = None;
        while i + 1 < children.len() && context.ast[children[i + 1]].is_text() {
            let compound = merged.get_or_insert_with(|| {
                let current = &context.ast[children[i]];
                CompoundExpressionNode::new(
                    vec![compound_child(current)],
                    Some(current.loc().clone()),
                )
            });
            // merge adjacent text node into current
            let next = children.remove(i + 1);
            compound.children.push(" + ".into());
            compound.children.push(compound_child(&context.ast[next]));
        }
        if let Some(compound) = merged {
            children[i] = context.ast.alloc(Node::Compound(compound));
        }
        i += 1;
    }
    if let Some(slot) = context.ast.children_mut(node) {
        *slot = children;
    }
    has_text
}

fn compound_child(node: &Node) -> CompoundExpressionNodeChild {
    match node {
        Node::Text(text) => CompoundExpressionNodeChild::Text(text.clone()),
        Node::Interpolation(interpolation) => {
            CompoundExpressionNodeChild::Interpolation(interpolation.clone())
        }
        _ => unreachable!("only text and interpolation nodes are merged"),
    }
}
