use crate::{
    ast::{DirectiveNode, ExpressionNode, NodeId, Property},
    errors::{CompilerError, ErrorCodes},
    runtime_helpers::RuntimeHelper,
    transform::{DirectiveTransform, DirectiveTransformResult, TransformContext},
};
use template_compiler_shared::camelize;

/// `v-bind:arg="exp"`. The argument-less object form is merged by the
/// element transform.
#[derive(Debug, Default)]
pub struct TransformBind;

impl DirectiveTransform for TransformBind {
    fn transform(
        &self,
        dir: &DirectiveNode,
        _node: NodeId,
        context: &mut TransformContext,
    ) -> Result<DirectiveTransformResult, CompilerError> {
        let Some(mut arg) = dir.arg.clone() else {
            return Ok(DirectiveTransformResult::default());
        };

        // handle missing or empty expression
        let exp = match &dir.exp {
            Some(ExpressionNode::Simple(exp)) if exp.content.trim().is_empty() => {
                // a rejected same-name shorthand has already been reported
                if !exp.is_static {
                    context.on_error(ErrorCodes::XVBindNoExpression, Some(dir.loc.clone()))?;
                }
                None
            }
            None => {
                context.on_error(ErrorCodes::XVBindNoExpression, Some(dir.loc.clone()))?;
                None
            }
            Some(exp) => Some(exp.clone()),
        };
        let Some(exp) = exp else {
            return Ok(DirectiveTransformResult::new(vec![Property::new(
                arg,
                ExpressionNode::new_simple("", Some(true), Some(dir.loc.clone()), None).into(),
            )]));
        };

        match &mut arg {
            ExpressionNode::Compound(arg) => {
                arg.children.insert(0, "(".into());
                arg.children.push(r#") || """#.into());
            }
            ExpressionNode::Simple(arg) if !arg.is_static => {
                arg.content = if arg.content.is_empty() {
                    r#""""#.to_string()
                } else {
                    format!(r#"{} || """#, arg.content)
                };
            }
            ExpressionNode::Simple(_) => {}
        }

        if dir.modifiers.iter().any(|m| m == "camel") {
            match &mut arg {
                ExpressionNode::Simple(arg) if arg.is_static => {
                    arg.content = camelize(&arg.content);
                }
                ExpressionNode::Simple(arg) => {
                    arg.content = format!(
                        "{}({})",
                        context.helper_string(RuntimeHelper::Camelize),
                        arg.content
                    );
                }
                ExpressionNode::Compound(arg) => {
                    arg.children.insert(
                        0,
                        format!("{}(", context.helper_string(RuntimeHelper::Camelize)).into(),
                    );
                    arg.children.push(")".into());
                }
            }
        }

        if dir.modifiers.iter().any(|m| m == "prop") {
            inject_prefix(&mut arg, '.');
        }
        if dir.modifiers.iter().any(|m| m == "attr") {
            inject_prefix(&mut arg, '^');
        }

        Ok(DirectiveTransformResult::new(vec![Property::new(
            arg,
            exp.into(),
        )]))
    }
}

fn inject_prefix(arg: &mut ExpressionNode, prefix: char) {
    match arg {
        ExpressionNode::Simple(arg) if arg.is_static => {
            arg.content.insert(0, prefix);
        }
        ExpressionNode::Simple(arg) => {
            arg.content = format!("`{prefix}${{{}}}`", arg.content);
        }
        ExpressionNode::Compound(arg) => {
            arg.children.insert(0, format!("'{prefix}' + (").into());
            arg.children.push(")".into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{Ast, BaseElementProps},
        errors::CollectErrors,
        options::TransformOptions,
        parser::base_parse,
    };
    use rstest::rstest;
    use std::rc::Rc;

    fn bind(source: &str) -> (Vec<Property>, Vec<ErrorCodes>) {
        let ast: Ast = base_parse(source, None).unwrap();
        let errors = Rc::new(CollectErrors::default());
        let mut context = TransformContext::new(
            ast,
            TransformOptions {
                error_handling_options: errors.clone(),
                ..Default::default()
            },
        );
        let div = context.ast.root_node().children[0];
        let Some(BaseElementProps::Directive(dir)) =
            context.ast.element(div).map(|el| el.props[0].clone())
        else {
            panic!("expected a directive");
        };
        let result = TransformBind.transform(&dir, div, &mut context).unwrap();
        (result.props, errors.codes())
    }

    #[rstest]
    #[case(r#"<div v-bind:id="id"/>"#, "id", "id")]
    #[case(r#"<div :[id]="id"/>"#, r#"id || """#, "id")]
    #[case(r#"<div :foo-bar.camel="id"/>"#, "fooBar", "id")]
    #[case(r#"<div :[foo].camel="id"/>"#, r#"_camelize(foo || "")"#, "id")]
    #[case(r#"<div :fooBar.prop="id"/>"#, ".fooBar", "id")]
    #[case(r#"<div .fooBar="id"/>"#, ".fooBar", "id")]
    #[case(r#"<div :[fooBar].prop="id"/>"#, r#"`.${fooBar || ""}`"#, "id")]
    #[case(r#"<div :foo.attr="id"/>"#, "^foo", "id")]
    fn binds(#[case] source: &str, #[case] key: &str, #[case] value: &str) {
        let (props, errors) = bind(source);
        assert!(errors.is_empty());
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].key.stringify(), key);
        let crate::ast::JSChildNode::Simple(exp) = &props[0].value else {
            panic!("expected a simple expression");
        };
        assert_eq!(exp.content, value);
    }

    #[test]
    fn empty_expression() {
        let (props, errors) = bind(r#"<div v-bind:arg="" />"#);
        assert_eq!(errors, vec![ErrorCodes::XVBindNoExpression]);
        assert_eq!(props[0].key.stringify(), "arg");
        assert!(
            matches!(&props[0].value, crate::ast::JSChildNode::Simple(exp) if exp.is_static && exp.content.is_empty())
        );
    }
}
