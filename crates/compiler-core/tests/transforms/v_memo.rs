use crate::test_utils::{compile, compile_prefixed, compile_with};
use template_compiler_core::{CompilerOptions, RuntimeHelper};

#[test]
fn on_root_element() {
    let result = compile_with(r#"<div v-memo="[x]"/>"#, CompilerOptions::default());
    assert!(result.ast.root_node().helpers.contains(&RuntimeHelper::WithMemo));
    assert!(result.code.contains(
        r#"return _withMemo([x], () => (_openBlock(), _createElementBlock("div")), _cache, 0)"#
    ));
}

#[test]
fn on_nested_element() {
    let code = compile_prefixed(r#"<div><span v-memo="[x]">{{ x }}</span></div>"#);
    assert!(code.contains(
        r#"_withMemo([_ctx.x], () => (_openBlock(), _createElementBlock("span", null, _toDisplayString(_ctx.x), 1)), _cache, 0)"#
    ));
}

#[test]
fn on_component() {
    let code = compile(r#"<div><Comp v-memo="[x]"/></div>"#);
    assert!(code.contains("_withMemo([x], () => _createVNode(_component_Comp), _cache, 0)"));
}

#[test]
fn with_v_for() {
    let code = compile_prefixed(r#"<div v-for="item in list" :key="item.id" v-memo="[item.ok]"/>"#);
    assert!(code.contains("_renderList(_ctx.list, (item, __, ___, _cached) => {"));
    assert!(code.contains("const _memo = ([item.ok])"));
    assert!(code.contains("if (_cached && _cached.key === item.id && _isMemoSame(_cached, _memo)) return _cached"));
    assert!(code.contains("_item.memo = _memo"));
    assert!(code.contains("return _item"));
    assert!(code.contains("}, _cache, 0), 128))"));
}
