// - Parse expressions in templates into compound expressions so that each
//   identifier gets more accurate source-map locations.
//
// - Prefix identifiers with `_ctx.` so that they are accessed from the render
//   context
//
// - This transform is only applied with `prefix_identifiers`, otherwise the
//   render function body is wrapped in `with (_ctx)`.
use crate::{
    ast::{
        BaseElementProps, CompoundExpressionNode, CompoundExpressionNodeChild, ConstantTypes,
        ExpressionNode, Node, NodeId, SimpleExpressionNode, SourceLocation,
    },
    errors::{CompilerError, ErrorCodes},
    expression::{ExpressionKind, IdentifierRef, ScannedExpression, scan},
    scanner::advance_position_with_clone,
    transform::{ExitFn, NodeTransform, TransformContext},
    utils::{find_dir, is_simple_identifier},
};
use template_compiler_shared::is_globally_allowed;

fn is_literal_whitelisted(exp: &str) -> bool {
    matches!(exp, "true" | "false" | "null" | "this")
}

#[derive(Debug, Default)]
pub struct TransformExpression;

impl NodeTransform for TransformExpression {
    fn transform(
        &self,
        node: NodeId,
        context: &mut TransformContext,
    ) -> Result<Option<ExitFn>, CompilerError> {
        match &context.ast[node] {
            Node::Interpolation(interpolation) => {
                if let ExpressionNode::Simple(content) = &interpolation.content {
                    let content = process_expression(content, context, false)?;
                    if let Node::Interpolation(interpolation) = &mut context.ast[node] {
                        interpolation.content = content;
                    }
                }
            }
            Node::Element(el) => {
                let memo = find_dir(el, "memo", None).is_some();
                for i in 0..el.props.len() {
                    let Some(BaseElementProps::Directive(dir)) =
                        context.ast.element(node).map(|el| &el.props[i])
                    else {
                        continue;
                    };
                    // do not process for v-for since it is handled by transformFor
                    if dir.name == "for" {
                        continue;
                    }
                    let arg_is_key = matches!(&dir.arg, Some(ExpressionNode::Simple(arg)) if arg.content == "key");
                    // do not process exp if this is v-on:arg - we need special
                    // handling for wrapping inline statements.
                    let exp = match &dir.exp {
                        Some(ExpressionNode::Simple(exp))
                            if !(dir.name == "on" && dir.arg.is_some())
                                // key has been processed in transformFor(vMemo + vFor)
                                && !(memo && arg_is_key) =>
                        {
                            Some(process_expression(exp, context, dir.name == "slot")?)
                        }
                        _ => None,
                    };
                    let arg = match &dir.arg {
                        Some(ExpressionNode::Simple(arg)) if !arg.is_static => {
                            Some(process_expression(arg, context, false)?)
                        }
                        _ => None,
                    };
                    if let Some(BaseElementProps::Directive(dir)) = context
                        .ast
                        .element_mut(node)
                        .and_then(|el| el.props.get_mut(i))
                    {
                        if exp.is_some() {
                            dir.exp = exp;
                        }
                        if arg.is_some() {
                            dir.arg = arg;
                        }
                    }
                }
            }
            _ => {}
        }
        Ok(None)
    }
}

/// Rewrites identifiers of `node` that do not refer to a template scope
/// variable or an allowed global into `_ctx.` accesses.
///
/// With `as_params` the expression is treated as a function parameter list,
/// e.g. a `v-for` alias or `v-slot` props, and the declared names are
/// recorded in `identifiers`.
pub fn process_expression(
    node: &SimpleExpressionNode,
    context: &TransformContext,
    as_params: bool,
) -> Result<ExpressionNode, CompilerError> {
    let kind = if as_params {
        ExpressionKind::Params
    } else {
        ExpressionKind::Expression
    };
    process_source(node, context, kind)
}

/// Like [`process_expression`] for `v-on` handlers holding several
/// statements, e.g. `@click="a(); b = 1"`.
pub fn process_statements(
    node: &SimpleExpressionNode,
    context: &TransformContext,
) -> Result<ExpressionNode, CompilerError> {
    process_source(node, context, ExpressionKind::Statements)
}

fn process_source(
    node: &SimpleExpressionNode,
    context: &TransformContext,
    kind: ExpressionKind,
) -> Result<ExpressionNode, CompilerError> {
    if !context.prefix_identifiers || node.content.trim().is_empty() {
        return Ok(node.clone().into());
    }

    let as_params = kind == ExpressionKind::Params;
    let raw_exp = node.content.as_str();
    // fast path if expression is a simple identifier.
    if is_simple_identifier(raw_exp) {
        let mut node = node.clone();
        let is_scope_var_reference = context.is_identifier_in_scope(raw_exp);
        let is_allowed_global = is_globally_allowed(raw_exp);
        let is_literal = is_literal_whitelisted(raw_exp);
        if !as_params && !is_scope_var_reference && !is_literal && !is_allowed_global {
            node.content = rewrite_identifier(raw_exp);
        } else if !is_scope_var_reference {
            node.const_type = if is_literal {
                ConstantTypes::CanStringify
            } else {
                ConstantTypes::CanHoist
            };
        }
        return Ok(node.into());
    }

    let ScannedExpression {
        references: refs,
        params,
        bail_constant,
    } = match scan(raw_exp, kind) {
        Ok(scanned) => scanned,
        Err(err) => {
            context.error_handling_options.on_error(CompilerError::with_message(
                ErrorCodes::XInvalidExpression,
                Some(node.loc.clone()),
                err.to_string(),
            ))?;
            return Ok(node.clone().into());
        }
    };

    let mut children: Vec<CompoundExpressionNodeChild> = Vec::new();
    let mut last_end = 0;
    let count = refs.len();
    for (i, id) in refs.into_iter().enumerate() {
        let IdentifierRef {
            name,
            start,
            end,
            shorthand,
            local,
        } = id;
        let is_local = local || context.is_identifier_in_scope(&name);
        let need_prefix = !is_globally_allowed(&name) && name != "require";

        let mut leading = raw_exp[last_end..start].to_string();
        let prefixed = need_prefix && !is_local;
        let content = if prefixed {
            if shorthand {
                leading.push_str(&format!("{name}: "));
            }
            rewrite_identifier(&name)
        } else {
            name
        };
        // The identifier is considered constant unless it's pointing to a
        // local scope variable (a v-for alias, or a v-slot prop)
        let const_type = if !prefixed && !(need_prefix && is_local) && !bail_constant {
            ConstantTypes::CanStringify
        } else {
            ConstantTypes::NotConstant
        };
        if !leading.is_empty() {
            children.push(leading.into());
        }
        let loc = if node.loc.is_stub() {
            SourceLocation::loc_stub()
        } else {
            SourceLocation {
                start: advance_position_with_clone(&node.loc.start, raw_exp, start),
                end: advance_position_with_clone(&node.loc.start, raw_exp, end),
                source: raw_exp[start..end].to_string(),
            }
        };
        children.push(CompoundExpressionNodeChild::Simple(SimpleExpressionNode::new(
            content,
            Some(false),
            Some(loc),
            Some(const_type),
        )));
        if i == count - 1 && end < raw_exp.len() {
            children.push(raw_exp[end..].to_string().into());
        }
        last_end = end;
    }

    let mut ret: ExpressionNode = if children.is_empty() {
        let mut node = node.clone();
        node.const_type = if bail_constant {
            ConstantTypes::NotConstant
        } else {
            ConstantTypes::CanStringify
        };
        node.into()
    } else {
        CompoundExpressionNode::new(children, Some(node.loc.clone())).into()
    };
    let identifiers = Some(params);
    match &mut ret {
        ExpressionNode::Simple(node) => node.identifiers = identifiers,
        ExpressionNode::Compound(node) => node.identifiers = identifiers,
    }
    Ok(ret)
}

fn rewrite_identifier(raw: &str) -> String {
    format!("_ctx.{raw}")
}
