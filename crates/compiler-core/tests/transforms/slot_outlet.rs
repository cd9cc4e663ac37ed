use crate::test_utils::{compile, compile_errors, compile_prefixed};
use template_compiler_core::{CompilerOptions, ErrorCodes};

#[test]
fn default_slot_outlet() {
    let code = compile_prefixed("<slot/>");
    assert!(code.contains(r#"return _renderSlot(_ctx.$slots, "default")"#));
}

#[test]
fn statically_named_slot_outlet() {
    let code = compile(r#"<slot name="foo" />"#);
    assert!(code.contains(r#"return _renderSlot($slots, "foo")"#));
}

#[test]
fn dynamically_named_slot_outlet() {
    let code = compile_prefixed(r#"<slot :name="foo + bar" />"#);
    assert!(code.contains(r#"return _renderSlot(_ctx.$slots, _ctx.foo + _ctx.bar)"#));
}

#[test]
fn slot_outlet_with_props() {
    let code = compile_prefixed(r#"<slot foo="bar" :baz="qux" :foo-bar="foo-bar" />"#);
    assert!(code.contains(r#"_renderSlot(_ctx.$slots, "default", {"#));
    assert!(code.contains(r#"foo: "bar","#));
    assert!(code.contains("baz: _ctx.qux,"));
    assert!(code.contains("fooBar: _ctx.foo-_ctx.bar"));
}

#[test]
fn slot_outlet_with_fallback() {
    let code = compile(r#"<slot><div/></slot>"#);
    assert!(code.contains(r#"_renderSlot($slots, "default", {}, () => ["#));
    assert!(code.contains(r#"_createElementVNode("div")"#));
}

#[test]
fn name_and_props_with_fallback() {
    let code = compile(r#"<slot name="foo" :p="1">fallback</slot>"#);
    assert!(code.contains(r#"_renderSlot($slots, "foo", { p: 1 }, () => ["#));
    assert!(code.contains(r#"_createTextVNode("fallback")"#));
}

#[test]
fn custom_directive_on_outlet() {
    let errors = compile_errors("<slot v-foo />", CompilerOptions::default());
    assert_eq!(errors, vec![ErrorCodes::XVSlotUnexpectedDirectiveOnSlotOutlet]);
}
