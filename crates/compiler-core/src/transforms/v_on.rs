use crate::{
    ast::{
        BaseElementProps, CompoundExpressionNode, CompoundExpressionNodeChild, ConstantTypes,
        DirectiveNode, ElementTypes, ExpressionNode, JSChildNode, NodeId, Property,
    },
    errors::{CompilerError, ErrorCodes},
    runtime_helpers::RuntimeHelper,
    transform::{DirectiveTransform, DirectiveTransformResult, TransformContext},
    transforms::transform_expression::{process_expression, process_statements},
    utils::{exp_has_scope_ref, is_member_expression},
};
use template_compiler_shared::{camelize, to_handler_key};

/// `v-on:event="handler"`. Modifiers stay on the directive; platform layers
/// turn them into guards.
#[derive(Debug, Default)]
pub struct TransformOn;

impl DirectiveTransform for TransformOn {
    fn transform(
        &self,
        dir: &DirectiveNode,
        node: NodeId,
        context: &mut TransformContext,
    ) -> Result<DirectiveTransformResult, CompilerError> {
        if dir.exp.is_none() && dir.modifiers.is_empty() {
            context.on_error(ErrorCodes::XVOnNoExpression, Some(dir.loc.clone()))?;
        }
        let Some(arg) = dir.arg.clone() else {
            return Ok(DirectiveTransformResult::default());
        };
        let tag_type = context
            .ast
            .element(node)
            .map_or(ElementTypes::Element, |el| el.tag_type);

        let mut event_name = match arg {
            ExpressionNode::Simple(arg) if arg.is_static => {
                let mut raw_name = arg.content.clone();
                if raw_name.starts_with("vnode") {
                    context.on_warn(ErrorCodes::XVnodeHooks, Some(arg.loc.clone()));
                }
                if let Some(hook) = raw_name.strip_prefix("vue:") {
                    raw_name = format!("vnode-{hook}");
                }
                let event_string = if tag_type != ElementTypes::Element
                    || raw_name.starts_with("vnode")
                    || !raw_name.chars().any(|c| c.is_ascii_uppercase())
                {
                    // for non-element and vnode lifecycle event listeners,
                    // auto convert it to camelCase
                    to_handler_key(&camelize(&raw_name))
                } else {
                    // preserve case for plain element listeners that have
                    // uppercase letters, as these may be custom elements'
                    // custom events
                    format!("on:{raw_name}")
                };
                ExpressionNode::new_simple(event_string, Some(true), Some(arg.loc), None)
            }
            ExpressionNode::Simple(arg) => CompoundExpressionNode::new(
                vec![
                    format!("{}(", context.helper_string(RuntimeHelper::ToHandlerKey)).into(),
                    CompoundExpressionNodeChild::Simple(arg),
                    ")".into(),
                ],
                None,
            )
            .into(),
            ExpressionNode::Compound(mut arg) => {
                // already a compound expression.
                arg.children.insert(
                    0,
                    format!("{}(", context.helper_string(RuntimeHelper::ToHandlerKey)).into(),
                );
                arg.children.push(")".into());
                arg.into()
            }
        };

        // handler processing
        let exp = dir
            .exp
            .clone()
            .filter(|exp| !matches!(exp, ExpressionNode::Simple(s) if s.content.trim().is_empty()));
        let mut should_cache = context.cache_handlers && exp.is_none() && !context.in_v_once;
        let exp = match exp {
            Some(mut exp) => {
                let source = match &exp {
                    ExpressionNode::Simple(exp) => exp.content.clone(),
                    ExpressionNode::Compound(exp) => exp.loc.source.clone(),
                };
                let is_member_exp = is_member_expression(&source);
                let is_inline_statement = !(is_member_exp || is_fn_expression(&source));
                let has_multiple_statements = source.contains(';');

                // process the expression since it's been skipped
                if context.prefix_identifiers
                    && let ExpressionNode::Simple(simple) = &exp
                {
                    let event = ExpressionNode::new_simple("$event", None, None, None);
                    if is_inline_statement {
                        context.add_identifiers(&event);
                    }
                    let processed = if has_multiple_statements {
                        process_statements(simple, context)
                    } else {
                        process_expression(simple, context, false)
                    };
                    if is_inline_statement {
                        context.remove_identifiers(&event);
                    }
                    exp = processed?;
                    // keep the processed expression on the directive for
                    // later scope analysis
                    if let Some(BaseElementProps::Directive(target)) =
                        context.ast.element_mut(node).and_then(|el| {
                            el.props.iter_mut().find(|p| {
                                matches!(p, BaseElementProps::Directive(d) if d.loc == dir.loc)
                            })
                        })
                    {
                        target.exp = Some(exp.clone());
                    }

                    // with scope analysis, the function is hoistable if it has
                    // no reference to scope variables.
                    should_cache = context.cache_handlers
                        // unnecessary to cache inside v-once
                        && !context.in_v_once
                        // runtime constants don't need to be cached
                        && !matches!(&exp, ExpressionNode::Simple(s) if s.const_type > ConstantTypes::NotConstant)
                        // a member exp handler passed to a component keeps
                        // the original function to preserve arity
                        && !(is_member_exp && tag_type == ElementTypes::Component)
                        // closures over v-for / v-slot variables must be
                        // passed fresh to avoid stale values.
                        && !exp_has_scope_ref(&exp, &context.identifiers);

                    // turn a cached member expression into an invocation so
                    // that it always accesses the latest value when called
                    if should_cache && is_member_exp {
                        match &mut exp {
                            ExpressionNode::Simple(exp) => {
                                exp.content = format!("{0} && {0}(...args)", exp.content);
                            }
                            ExpressionNode::Compound(exp) => {
                                let mut children = exp.children.clone();
                                children.push(" && ".into());
                                children.extend(exp.children.iter().cloned());
                                children.push("(...args)".into());
                                exp.children = children;
                            }
                        }
                    }
                }

                if is_inline_statement || (should_cache && is_member_exp) {
                    // wrap inline statement in a function expression
                    let params = if is_inline_statement {
                        "$event"
                    } else {
                        "(...args)"
                    };
                    let (open, close) = if has_multiple_statements {
                        ("{", "}")
                    } else {
                        ("(", ")")
                    };
                    exp = CompoundExpressionNode::new(
                        vec![format!("{params} => {open}").into(), exp.into(), close.into()],
                        None,
                    )
                    .into();
                }
                exp
            }
            None => ExpressionNode::new_simple("() => {}", Some(false), Some(dir.loc.clone()), None),
        };

        event_name.set_handler_key();
        let value: JSChildNode = if should_cache {
            // cache handlers so that it's always the same handler being
            // passed down.
            context.cache(exp.into(), false, false).into()
        } else {
            exp.into()
        };
        Ok(DirectiveTransformResult::new(vec![Property::new(
            event_name, value,
        )]))
    }
}

/// `foo => ...`, `(a, b) => ...`, `async () => ...`, `function (e) {...}`
fn is_fn_expression(exp: &str) -> bool {
    let exp = exp.trim_start();
    is_arrow_function(exp)
        || exp
            .strip_prefix("async")
            .is_some_and(|rest| is_arrow_function(rest.trim_start()))
        || is_function_keyword(exp)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn is_arrow_function(exp: &str) -> bool {
    let rest = if let Some(params) = exp.strip_prefix('(') {
        match params.find(')') {
            Some(end) => &params[end + 1..],
            None => return false,
        }
    } else {
        let end = exp.find(|c| !is_word_char(c)).unwrap_or(exp.len());
        if end == 0 {
            return false;
        }
        &exp[end..]
    };
    let rest = rest.trim_start();
    // optional return type annotation
    let rest = match rest.strip_prefix(':') {
        Some(annotation) => match annotation.find('=') {
            Some(end) if end > 0 => &annotation[end..],
            _ => return false,
        },
        None => rest,
    };
    rest.starts_with("=>")
}

fn is_function_keyword(exp: &str) -> bool {
    let exp = match exp.strip_prefix("async") {
        Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
        _ => exp,
    };
    let Some(rest) = exp.strip_prefix("function") else {
        return false;
    };
    let trimmed = rest.trim_start();
    let rest = if trimmed.len() < rest.len() {
        trimmed.trim_start_matches(is_word_char)
    } else {
        rest
    };
    rest.trim_start().starts_with('(')
}
