use crate::{
    ast::{BaseElementProps, ExpressionNode, NodeId},
    errors::{CompilerError, ErrorCodes},
    transform::{ExitFn, NodeTransform, TransformContext},
    utils::is_identifier_start,
};
use template_compiler_shared::camelize;

/// Expands same-name shorthand: `:arg` becomes `:arg="arg"`.
#[derive(Debug, Default)]
pub struct TransformVBindShorthand;

impl NodeTransform for TransformVBindShorthand {
    fn transform(
        &self,
        node: NodeId,
        context: &mut TransformContext,
    ) -> Result<Option<ExitFn>, CompilerError> {
        let Some(element) = context.ast.element_mut(node) else {
            return Ok(None);
        };

        let mut errors = Vec::new();
        for prop in element.props.iter_mut() {
            let BaseElementProps::Directive(dir) = prop else {
                continue;
            };
            let empty_exp = match &dir.exp {
                None => true,
                Some(ExpressionNode::Simple(exp)) => exp.content.trim().is_empty(),
                Some(ExpressionNode::Compound(_)) => false,
            };
            if dir.name != "bind" || !empty_exp {
                continue;
            }
            let Some(arg) = &dir.arg else {
                continue;
            };
            match arg {
                ExpressionNode::Simple(arg) if arg.is_static => {
                    let prop_name = camelize(&arg.content);
                    if prop_name
                        .chars()
                        .next()
                        .is_some_and(|c| is_identifier_start(c) || c == '-')
                    {
                        dir.exp = Some(ExpressionNode::new_simple(
                            prop_name,
                            Some(false),
                            Some(arg.loc.clone()),
                            None,
                        ));
                    }
                }
                arg => {
                    let loc = arg.loc().clone();
                    errors.push(loc.clone());
                    dir.exp = Some(ExpressionNode::new_simple("", Some(true), Some(loc), None));
                }
            }
        }

        for loc in errors {
            context.on_error(ErrorCodes::XVBindInvalidSameNameArgument, Some(loc))?;
        }
        Ok(None)
    }
}
