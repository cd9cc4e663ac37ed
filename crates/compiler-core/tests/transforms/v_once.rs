use crate::test_utils::{compile_prefixed, compile_with};
use template_compiler_core::{CompilerOptions, RuntimeHelper};

#[test]
fn as_root_node() {
    let result = compile_with(
        r#"<div :id="foo" v-once />"#,
        CompilerOptions {
            prefix_identifiers: Some(true),
            ..Default::default()
        },
    );
    let root = result.ast.root_node();
    assert_eq!(root.cached, 1);
    assert!(root.helpers.contains(&RuntimeHelper::SetBlockTracking));
    let code = result.code;
    assert!(code.contains("return _cache[0] || ("));
    assert!(code.contains("_setBlockTracking(-1, true),"));
    assert!(code.contains(r#"_cache[0] = _createElementVNode("div", { id: _ctx.foo }, null, 8, ["id"]),"#));
    assert!(code.contains("_setBlockTracking(1),"));
    assert!(code.contains("_cache[0]\n"));
}

#[test]
fn on_nested_element() {
    let code = compile_prefixed(r#"<div><div :id="foo" v-once /></div>"#);
    assert!(code.contains("_cache[0] || ("));
    assert!(code.contains(r#"_cache[0] = _createElementVNode("div", { id: _ctx.foo }, null, 8, ["id"]),"#));
}

#[test]
fn on_component() {
    let code = compile_prefixed(r#"<div><Comp :id="foo" v-once /></div>"#);
    assert!(code.contains(r#"_cache[0] = _createVNode(_component_Comp, { id: _ctx.foo }, null, 8, ["id"]),"#));
}

#[test]
fn nested_once_is_cached_once() {
    let result = compile_with(
        r#"<div v-once><p v-once>{{ a }}</p></div>"#,
        CompilerOptions::default(),
    );
    assert_eq!(result.ast.root_node().cached, 1);
}

#[test]
fn with_v_if() {
    let code = compile_prefixed(r#"<div v-if="BOOLEAN" v-once />"#);
    assert!(code.contains("_cache[0] || ("));
    assert!(code.contains("? (_openBlock(), _createElementBlock(\"div\", { key: 0 }))"));
}
