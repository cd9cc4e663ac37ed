use std::rc::Rc;

use crate::test_utils::{compile, compile_errors, compile_prefixed, compile_with};
use template_compiler_core::{CollectErrors, CompilerOptions, ErrorCodes, RuntimeHelper};

#[test]
fn import_resolve_component() {
    let result = compile_with("<Foo/>", CompilerOptions::default());
    let root = result.ast.root_node();
    assert!(root.helpers.contains(&RuntimeHelper::ResolveComponent));
    assert_eq!(root.components, ["Foo"]);
}

#[test]
fn resolve_component_from_dash_case() {
    let code = compile("<foo-bar/>");
    assert!(code.contains(r#"const _component_foo_bar = _resolveComponent("foo-bar")"#));
}

#[test]
fn self_reference_component() {
    let code = compile_with(
        "<Root/>",
        CompilerOptions {
            self_name: Some("Root".to_string()),
            ..Default::default()
        },
    )
    .code;
    assert!(code.contains(r#"const _component_Root = _resolveComponent("Root", true)"#));
}

#[test]
fn static_props() {
    let code = compile(r#"<div id="foo" class="bar"/>"#);
    assert!(code.contains("id: \"foo\",\n"));
    assert!(code.contains("class: \"bar\"\n"));
}

#[test]
fn props_with_children() {
    let code = compile(r#"<div id="foo"><span/></div>"#);
    assert!(code.contains(r#"_createElementBlock("div", { id: "foo" }, ["#));
    assert!(code.contains(r#"_createElementVNode("span")"#));
}

#[test]
fn merged_class_and_style() {
    let code = compile(r#"<div class="a" :class="b" style="color: red" :style="c"/>"#);
    assert!(code.contains(r#"class: _normalizeClass(["a", b]),"#));
    assert!(code.contains(r#"style: _normalizeStyle(["color: red", c])"#));
}

#[test]
fn event_handlers_are_merged() {
    let code = compile_prefixed(r#"<div @click="a" v-on:click="b"/>"#);
    assert!(code.contains("onClick: [_ctx.a, _ctx.b]"));
}

#[test]
fn dynamic_component() {
    let code = compile_prefixed(r#"<component :is="foo"/>"#);
    assert!(code.contains("(_openBlock(), _createBlock(_resolveDynamicComponent(_ctx.foo)))"));

    let code = compile(r#"<component is="foo"/>"#);
    assert!(code.contains(r#"_resolveDynamicComponent("foo")"#));
}

#[test]
fn vue_prefixed_is_on_plain_element() {
    let code = compile(r#"<div is="vue:foo"/>"#);
    assert!(code.contains(r#"const _component_foo = _resolveComponent("foo")"#));
    assert!(code.contains("_createBlock(_component_foo)"));
}

#[test]
fn teleport_keeps_raw_children() {
    let code = compile(r##"<Teleport to="#x"><div/></Teleport>"##);
    assert!(code.contains(r##"(_openBlock(), _createBlock(_Teleport, { to: "#x" }, ["##));
    assert!(!code.contains("_withCtx"));
}

#[test]
fn keep_alive_keeps_raw_children() {
    let code = compile("<KeepAlive><Comp/></KeepAlive>");
    assert!(code.contains("_createBlock(_KeepAlive, null, ["));
    assert!(code.contains("], 1024))"));
}

#[test]
fn keep_alive_with_multiple_children() {
    let errors = compile_errors("<KeepAlive><Comp/><Comp/></KeepAlive>", CompilerOptions::default());
    assert_eq!(errors, vec![ErrorCodes::XKeepAliveInvalidChildren]);
}

#[test]
fn svg_is_a_block() {
    let code = compile("<div><svg/></div>");
    assert!(code.contains(r#"(_openBlock(), _createElementBlock("svg"))"#));
}

#[test]
fn ref_needs_patch() {
    let code = compile(r#"<div><span ref="el"/></div>"#);
    assert!(code.contains(r#"_createElementVNode("span", { ref: "el" }, null, 512)"#));
}

#[test]
fn vnode_hooks_warn() {
    let errors = Rc::new(CollectErrors::default());
    compile_with(
        r#"<div @vnode-mounted="foo"/>"#,
        CompilerOptions {
            error_handling_options: errors.clone(),
            ..Default::default()
        },
    );
    let warnings = errors.warnings.borrow();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, ErrorCodes::XVnodeHooks);
}

#[test]
fn directive_without_expression() {
    let errors = compile_errors("<div v-bind/>", CompilerOptions::default());
    assert_eq!(errors, vec![ErrorCodes::XVBindNoExpression]);
    let errors = compile_errors("<div v-on/>", CompilerOptions::default());
    assert_eq!(errors, vec![ErrorCodes::XVOnNoExpression]);
}
