use crate::test_utils::compile_with;
use template_compiler_core::{CodegenResult, CompilerOptions};

fn compile_hoisted(template: &str) -> CodegenResult {
    compile_with(
        template,
        CompilerOptions {
            hoist_static: true,
            ..Default::default()
        },
    )
}

#[test]
fn root_is_never_hoisted() {
    let result = compile_hoisted("<div/>");
    assert!(result.ast.root_node().hoists.is_empty());
    assert!(result.code.contains(r#"(_openBlock(), _createElementBlock("div"))"#));
}

#[test]
fn static_child_element() {
    let result = compile_hoisted("<div><span>a</span><p>{{ b }}</p></div>");
    assert_eq!(result.ast.root_node().hoists.len(), 1);
    assert!(result.code.contains(
        r#"const _hoisted_1 = /*#__PURE__*/_createElementVNode("span", null, "a", -1)"#
    ));
    assert!(result.code.contains("    _hoisted_1,\n"));
}

#[test]
fn whole_children_array() {
    let result = compile_hoisted(r#"<div><span class="a">x</span><b/></div>"#);
    let code = result.code;
    assert!(code.contains(
        r#"const _hoisted_1 = /*#__PURE__*/_createElementVNode("span", { class: "a" }, "x", -1)"#
    ));
    assert!(code.contains(r#"const _hoisted_2 = /*#__PURE__*/_createElementVNode("b", null, null, -1)"#));
    assert!(code.contains("const _hoisted_3 = [\n  _hoisted_1,\n  _hoisted_2\n]"));
    assert!(code.contains(r#"_createElementBlock("div", null, _hoisted_3)"#));
}

#[test]
fn props_of_dynamic_element() {
    let result = compile_hoisted(r#"<div><p id="x">{{ a }}</p></div>"#);
    let code = result.code;
    assert!(code.contains(r#"const _hoisted_1 = { id: "x" }"#));
    assert!(code.contains(r#"_createElementVNode("p", _hoisted_1, _toDisplayString(a), 1)"#));
}

#[test]
fn dynamic_prop_names_are_hoisted() {
    let result = compile_hoisted(r#"<div><p :id="a"/></div>"#);
    let code = result.code;
    assert!(code.contains(r#"const _hoisted_1 = ["id"]"#));
    assert!(code.contains(r#"_createElementVNode("p", { id: a }, null, 8, _hoisted_1)"#));
}

#[test]
fn bindings_are_not_hoisted() {
    let result = compile_hoisted(r#"<div><span :class="cls">x</span></div>"#);
    assert!(result.ast.root_node().hoists.is_empty());
}

#[test]
fn v_if_and_v_for_children_stay_blocks() {
    let result = compile_hoisted(r#"<div><span v-if="ok">a</span><p v-for="i in list">b</p></div>"#);
    let code = result.code;
    // only the injected branch key is hoisted
    assert_eq!(result.ast.root_node().hoists.len(), 1);
    assert!(code.contains("const _hoisted_1 = { key: 0 }"));
    assert!(code.contains(r#"(_openBlock(), _createElementBlock("span", _hoisted_1, "a"))"#));
    assert!(code.contains(r#"return (_openBlock(), _createElementBlock("p", null, "b"))"#));
}

#[test]
fn component_is_not_hoisted() {
    let result = compile_hoisted("<div><Comp/></div>");
    assert!(result.ast.root_node().hoists.is_empty());
}

#[test]
fn threshold_keeps_small_subtrees() {
    let result = compile_with(
        "<div><span>a</span><p>{{ b }}</p></div>",
        CompilerOptions {
            hoist_static: true,
            hoist_static_threshold: 5,
            ..Default::default()
        },
    );
    assert!(result.ast.root_node().hoists.is_empty());
    assert!(!result.code.contains("_hoisted_"));
}

#[test]
fn static_text_call() {
    let result = compile_hoisted("<div>hello<span/>{{ a }}</div>");
    assert!(result.code.contains(r#"const _hoisted_1 = /*#__PURE__*/_createTextVNode("hello")"#));
}

#[test]
fn hoisted_flag_in_dev() {
    let result = compile_with(
        "<div><span/></div>",
        CompilerOptions {
            hoist_static: true,
            dev: true,
            ..Default::default()
        },
    );
    assert!(result.code.contains("-1 /* HOISTED */"));
}
