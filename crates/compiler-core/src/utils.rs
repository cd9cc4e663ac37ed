use crate::{
    ast::{
        Ast, BaseElementProps, CallArgument, CallExpression, CompoundExpressionNodeChild,
        DirectiveNode, ElementNode, ElementTypes, ExpressionNode, FunctionReturns, JSChildNode,
        Node, NodeId, ObjectExpression, Property,
    },
    runtime_helpers::RuntimeHelper,
    scanner::is_whitespace,
    transform::TransformContext,
};
use std::collections::HashMap;

pub fn is_core_component(tag: &str) -> Option<RuntimeHelper> {
    match tag {
        "Teleport" | "teleport" => Some(RuntimeHelper::Teleport),
        "Suspense" | "suspense" => Some(RuntimeHelper::Suspense),
        "KeepAlive" | "keep-alive" => Some(RuntimeHelper::KeepAlive),
        "BaseTransition" | "base-transition" => Some(RuntimeHelper::BaseTransition),
        _ => None,
    }
}

pub fn is_simple_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_identifier_start(c) => chars.all(is_identifier_char),
        _ => false,
    }
}

pub(crate) fn is_identifier_start(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_' | '$') || c as u32 >= 0xA0
}

pub(crate) fn is_identifier_char(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemberExpLexState {
    InMemberExpression,
    InBrackets,
    InParens,
    InString,
}

/// Lexer-based check for assignable member expressions such as `a.b`,
/// `a[b].c` or `foo.bar(baz).qux`. Accepts a subset of valid JS.
pub fn is_member_expression(exp: &str) -> bool {
    // remove whitespaces around . or [ first
    let path = strip_member_whitespace(exp.trim());

    let mut state = MemberExpLexState::InMemberExpression;
    let mut state_stack = Vec::new();
    let mut current_open_bracket_count = 0usize;
    let mut current_open_parens_count = 0usize;
    let mut current_string_type = None;

    let len = path.chars().count();
    for (i, c) in path.chars().enumerate() {
        match state {
            MemberExpLexState::InMemberExpression => {
                if c == '[' {
                    state_stack.push(state);
                    state = MemberExpLexState::InBrackets;
                    current_open_bracket_count += 1;
                } else if c == '(' {
                    state_stack.push(state);
                    state = MemberExpLexState::InParens;
                    current_open_parens_count += 1;
                } else if !(if i == 0 {
                    is_identifier_start(c)
                } else {
                    is_identifier_char(c) || c == '.' || c == '?'
                }) {
                    return false;
                }
            }
            MemberExpLexState::InBrackets => {
                if matches!(c, '\'' | '"' | '`') {
                    state_stack.push(state);
                    state = MemberExpLexState::InString;
                    current_string_type = Some(c);
                } else if c == '[' {
                    current_open_bracket_count += 1;
                } else if c == ']' {
                    current_open_bracket_count -= 1;
                    if current_open_bracket_count == 0 {
                        state = state_stack
                            .pop()
                            .unwrap_or(MemberExpLexState::InMemberExpression);
                    }
                }
            }
            MemberExpLexState::InParens => {
                if matches!(c, '\'' | '"' | '`') {
                    state_stack.push(state);
                    state = MemberExpLexState::InString;
                    current_string_type = Some(c);
                } else if c == '(' {
                    current_open_parens_count += 1;
                } else if c == ')' {
                    // if the exp ends as a call then it should not be considered valid
                    if i == len - 1 {
                        return false;
                    }
                    current_open_parens_count -= 1;
                    if current_open_parens_count == 0 {
                        state = state_stack
                            .pop()
                            .unwrap_or(MemberExpLexState::InMemberExpression);
                    }
                }
            }
            MemberExpLexState::InString => {
                if Some(c) == current_string_type {
                    state = state_stack
                        .pop()
                        .unwrap_or(MemberExpLexState::InMemberExpression);
                    current_string_type = None;
                }
            }
        }
    }
    len > 0 && current_open_bracket_count == 0 && current_open_parens_count == 0
}

fn strip_member_whitespace(path: &str) -> String {
    let chars: Vec<char> = path.chars().collect();
    let mut out = String::with_capacity(path.len());
    for (i, &c) in chars.iter().enumerate() {
        if is_whitespace(c) {
            let prev = chars[..i].iter().rev().find(|c| !is_whitespace(**c));
            let next = chars[i + 1..].iter().find(|c| !is_whitespace(**c));
            if matches!(prev, Some('.' | '[')) || matches!(next, Some('.' | '[')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

pub fn find_dir<'a>(
    node: &'a ElementNode,
    name: &str,
    allow_empty: Option<bool>,
) -> Option<&'a DirectiveNode> {
    find_dir_matching(node, |n| n == name, allow_empty)
}

pub fn find_dir_matching<'a>(
    node: &'a ElementNode,
    matches: impl Fn(&str) -> bool,
    allow_empty: Option<bool>,
) -> Option<&'a DirectiveNode> {
    let allow_empty = allow_empty.unwrap_or_default();
    node.props.iter().find_map(|prop| match prop {
        BaseElementProps::Directive(p) if (allow_empty || p.exp.is_some()) && matches(&p.name) => {
            Some(p)
        }
        _ => None,
    })
}

pub fn find_prop<'a>(
    node: &'a ElementNode,
    name: &str,
    dynamic_only: Option<bool>,
    allow_empty: Option<bool>,
) -> Option<&'a BaseElementProps> {
    find_prop_index(node, name, dynamic_only, allow_empty).map(|i| &node.props[i])
}

pub fn find_prop_index(
    node: &ElementNode,
    name: &str,
    dynamic_only: Option<bool>,
    allow_empty: Option<bool>,
) -> Option<usize> {
    let dynamic_only = dynamic_only.unwrap_or_default();
    let allow_empty = allow_empty.unwrap_or_default();
    node.props.iter().position(|prop| match prop {
        BaseElementProps::Attribute(prop) => {
            !dynamic_only && prop.name == name && (prop.value.is_some() || allow_empty)
        }
        BaseElementProps::Directive(prop) => {
            prop.name == "bind"
                && (prop.exp.is_some() || allow_empty)
                && is_static_arg_of(prop.arg.as_ref(), name)
        }
    })
}

pub fn is_static_arg_of(arg: Option<&ExpressionNode>, name: &str) -> bool {
    matches!(arg, Some(ExpressionNode::Simple(arg)) if arg.is_static && arg.content == name)
}

pub fn is_template_node(ast: &Ast, id: NodeId) -> bool {
    ast.element(id)
        .is_some_and(|el| el.tag_type == ElementTypes::Template)
}

pub fn is_slot_outlet(ast: &Ast, id: NodeId) -> bool {
    ast.element(id)
        .is_some_and(|el| el.tag_type == ElementTypes::Slot)
}

/// The `VNodeCall` or `renderSlot()` call, looking through a `withMemo()`
/// wrapper.
pub fn get_memoed_vnode_call(node: &mut JSChildNode) -> &mut JSChildNode {
    if let JSChildNode::Call(call) = node
        && call.is_helper(RuntimeHelper::WithMemo)
        && let Some(CallArgument::JSChild(JSChildNode::Function(func))) = call.arguments.get(1)
        && matches!(func.returns, Some(FunctionReturns::JSChild(_)))
    {
        let JSChildNode::Call(call) = node else {
            unreachable!();
        };
        let Some(CallArgument::JSChild(JSChildNode::Function(func))) = call.arguments.get_mut(1)
        else {
            unreachable!();
        };
        let Some(FunctionReturns::JSChild(returns)) = &mut func.returns else {
            unreachable!();
        };
        return returns;
    }
    node
}

/// Injects `prop` into the props of a `VNodeCall` or the props argument of a
/// `renderSlot()` call. The prop is skipped if a static key of the same name
/// is already present.
pub fn inject_prop(node: &mut JSChildNode, prop: Property, context: &mut TransformContext) {
    match node {
        JSChildNode::VNodeCall(vnode) => {
            vnode.props = Some(inject_into_props(vnode.props.take(), prop, context));
        }
        JSChildNode::Call(call) => {
            // the props for renderSlot is passed as the 3rd argument.
            while call.arguments.len() < 3 {
                call.arguments.push(CallArgument::String("{}".to_string()));
            }
            let props = match std::mem::replace(&mut call.arguments[2], CallArgument::from("{}")) {
                CallArgument::JSChild(props) => Some(props),
                _ => None,
            };
            call.arguments[2] = CallArgument::JSChild(inject_into_props(props, prop, context));
        }
        _ => {}
    }
}

/// Handles the shapes a props expression takes:
///
/// 1. mergeProps(...)
/// 2. toHandlers(...)
/// 3. normalizeProps(...)
/// 4. normalizeProps(guardReactiveProps(...))
///
/// we need to get the real props before normalization
fn inject_into_props(
    props: Option<JSChildNode>,
    prop: Property,
    context: &mut TransformContext,
) -> JSChildNode {
    match props {
        None => ObjectExpression::new(vec![prop], None).into(),
        Some(JSChildNode::Call(mut call))
            if call.is_helper(RuntimeHelper::NormalizeProps)
                || call.is_helper(RuntimeHelper::GuardReactiveProps) =>
        {
            let inner = match call.arguments.first_mut() {
                Some(CallArgument::JSChild(inner)) => {
                    Some(std::mem::replace(inner, JSChildNode::simple("")))
                }
                _ => None,
            };
            let is_expression = matches!(
                inner,
                Some(JSChildNode::Simple(_) | JSChildNode::Compound(_))
            );
            let injected = inject_into_props(inner, prop, context);
            if is_expression && call.is_helper(RuntimeHelper::GuardReactiveProps) {
                // the merged object is already a fresh one
                return injected;
            }
            match call.arguments.first_mut() {
                Some(first) => *first = CallArgument::JSChild(injected),
                None => call.arguments.push(CallArgument::JSChild(injected)),
            }
            JSChildNode::Call(call)
        }
        Some(JSChildNode::Call(mut call)) => {
            let is_to_handlers = call.is_helper(RuntimeHelper::ToHandlers);
            // merged props
            match call.arguments.first_mut() {
                Some(CallArgument::JSChild(JSChildNode::Object(first))) => {
                    if !has_prop(&prop, first) {
                        first.properties.insert(0, prop);
                    }
                    JSChildNode::Call(call)
                }
                _ if is_to_handlers => {
                    // v-on="obj" object, keep it after the explicit prop
                    merge_props(
                        vec![
                            ObjectExpression::new(vec![prop], None).into(),
                            JSChildNode::Call(call),
                        ],
                        context,
                    )
                }
                _ => {
                    call.arguments.insert(
                        0,
                        CallArgument::JSChild(ObjectExpression::new(vec![prop], None).into()),
                    );
                    JSChildNode::Call(call)
                }
            }
        }
        Some(JSChildNode::Object(mut object)) => {
            if !has_prop(&prop, &object) {
                object.properties.insert(0, prop);
            }
            JSChildNode::Object(object)
        }
        Some(JSChildNode::Simple(node)) if node.content == "{}" => {
            ObjectExpression::new(vec![prop], None).into()
        }
        Some(other) => {
            // single v-bind with expression, return a merged replacement
            merge_props(
                vec![ObjectExpression::new(vec![prop], None).into(), other],
                context,
            )
        }
    }
}

fn merge_props(args: Vec<JSChildNode>, context: &mut TransformContext) -> JSChildNode {
    CallExpression::new(
        context.helper(RuntimeHelper::MergeProps),
        Some(args.into_iter().map(CallArgument::JSChild).collect()),
        None,
    )
    .into()
}

// check existing key to avoid overriding user provided keys
fn has_prop(prop: &Property, props: &ObjectExpression) -> bool {
    let ExpressionNode::Simple(key) = &prop.key else {
        return false;
    };
    key.is_static
        && props.properties.iter().any(|p| {
            matches!(&p.key, ExpressionNode::Simple(existing)
                if existing.is_static && existing.content == key.content)
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetType {
    Component,
    Directive,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Component => "component",
            Self::Directive => "directive",
        }
    }
}

pub fn to_valid_asset_id(name: &str, asset_type: AssetType) -> String {
    let name: String = name
        .chars()
        .map(|c| {
            if c == '-' {
                "_".to_string()
            } else if c.is_ascii_alphanumeric() || c == '_' {
                c.to_string()
            } else {
                (c as u32).to_string()
            }
        })
        .collect();
    format!("_{}_{}", asset_type.as_str(), name)
}

/// Whether the subtree references any of the given scope identifiers.
pub fn has_scope_ref(ast: &Ast, id: NodeId, ids: &HashMap<String, usize>) -> bool {
    if ids.is_empty() {
        return false;
    }
    match &ast[id] {
        Node::Element(el) => {
            el.props.iter().any(|p| {
                matches!(p, BaseElementProps::Directive(dir)
                    if dir.arg.as_ref().is_some_and(|arg| exp_has_scope_ref(arg, ids))
                        || dir.exp.as_ref().is_some_and(|exp| exp_has_scope_ref(exp, ids)))
            }) || el.children.iter().any(|c| has_scope_ref(ast, *c, ids))
        }
        Node::For(node) => {
            exp_has_scope_ref(&node.source, ids)
                || node.children.iter().any(|c| has_scope_ref(ast, *c, ids))
        }
        Node::If(node) => node.branches.iter().any(|b| has_scope_ref(ast, *b, ids)),
        Node::IfBranch(node) => {
            node.condition
                .as_ref()
                .is_some_and(|c| exp_has_scope_ref(c, ids))
                || node.children.iter().any(|c| has_scope_ref(ast, *c, ids))
        }
        Node::Interpolation(node) => exp_has_scope_ref(&node.content, ids),
        Node::TextCall(node) => has_scope_ref(ast, node.content, ids),
        Node::Compound(node) => compound_children_have_scope_ref(&node.children, ids),
        Node::Root(_) | Node::Text(_) | Node::Comment(_) => false,
    }
}

pub fn exp_has_scope_ref(exp: &ExpressionNode, ids: &HashMap<String, usize>) -> bool {
    match exp {
        ExpressionNode::Simple(exp) => {
            !exp.is_static && is_simple_identifier(&exp.content) && ids.contains_key(&exp.content)
        }
        ExpressionNode::Compound(exp) => compound_children_have_scope_ref(&exp.children, ids),
    }
}

fn compound_children_have_scope_ref(
    children: &[CompoundExpressionNodeChild],
    ids: &HashMap<String, usize>,
) -> bool {
    children.iter().any(|child| match child {
        CompoundExpressionNodeChild::Simple(exp) => {
            exp_has_scope_ref(&ExpressionNode::Simple(exp.clone()), ids)
        }
        CompoundExpressionNodeChild::Compound(exp) => {
            compound_children_have_scope_ref(&exp.children, ids)
        }
        CompoundExpressionNodeChild::Interpolation(node) => exp_has_scope_ref(&node.content, ids),
        _ => false,
    })
}

/// Splits a `v-for` expression at its first ` in ` or ` of ` separator
/// into the alias part and the source part.
pub fn match_for_alias(exp: &str) -> Option<(String, String)> {
    let bytes = exp.as_bytes();
    for (p, _) in exp.char_indices() {
        if p == 0 {
            continue;
        }
        // ([\s\S]*?)\s+(?:in|of)\s+(\S[\s\S]*)
        let ws_len = exp[p..].len() - exp[p..].trim_start_matches(is_whitespace).len();
        if ws_len == 0 || !exp[..p].chars().next_back().is_some_and(|c| !is_whitespace(c)) {
            continue;
        }
        let after_ws = p + ws_len;
        let keyword = &bytes[after_ws..];
        if !(keyword.starts_with(b"in") || keyword.starts_with(b"of")) {
            continue;
        }
        let rest = &exp[after_ws + 2..];
        let rest_trimmed = rest.trim_start_matches(is_whitespace);
        if rest_trimmed.len() == rest.len() || rest_trimmed.is_empty() {
            continue;
        }
        return Some((exp[..p].to_string(), rest_trimmed.to_string()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("foo", true)]
    #[case("$foo_1", true)]
    #[case("_", true)]
    #[case("1foo", false)]
    #[case("foo.bar", false)]
    #[case("", false)]
    fn simple_identifiers(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_simple_identifier(name), expected);
    }

    #[rstest]
    #[case("obj.foo", true)]
    #[case("obj[foo]", true)]
    #[case("obj [ 'foo' ] . bar", true)]
    #[case("foo.bar(baz).qux", true)]
    #[case("obj?.foo", true)]
    #[case("foo()", false)]
    #[case("a + b", false)]
    #[case("123", false)]
    #[case("obj[foo", false)]
    fn member_expressions(#[case] exp: &str, #[case] expected: bool) {
        assert_eq!(is_member_expression(exp), expected);
    }

    #[rstest]
    #[case("item in items", Some(("item", "items")))]
    #[case("(item, index) of list", Some(("(item, index)", "list")))]
    #[case("{ a, b }   in  rows.slice(1)", Some(("{ a, b }", "rows.slice(1)")))]
    #[case("index in 5", Some(("index", "5")))]
    #[case("items", None)]
    #[case("item in ", None)]
    fn for_alias(#[case] exp: &str, #[case] expected: Option<(&str, &str)>) {
        assert_eq!(
            match_for_alias(exp),
            expected.map(|(a, b)| (a.to_string(), b.to_string()))
        );
    }

    #[test]
    fn asset_ids() {
        assert_eq!(
            to_valid_asset_id("my-comp", AssetType::Component),
            "_component_my_comp"
        );
        assert_eq!(
            to_valid_asset_id("Foo.Bar", AssetType::Component),
            "_component_Foo46Bar"
        );
        assert_eq!(
            to_valid_asset_id("focus", AssetType::Directive),
            "_directive_focus"
        );
    }

    #[test]
    fn core_components() {
        assert_eq!(is_core_component("keep-alive"), Some(RuntimeHelper::KeepAlive));
        assert_eq!(is_core_component("div"), None);
    }
}
