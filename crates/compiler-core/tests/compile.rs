mod test_utils;

#[cfg(test)]
mod compiler_integration_tests {
    use crate::test_utils::{compile, compile_errors, compile_prefixed, compile_with};
    use template_compiler_core::{CodegenMode, CompilerOptions, ErrorCodes, Node};

    const SOURCE: &str = r#"
  <div id="foo" :class="bar.baz">
    {{ world.burn() }}
    <div v-if="ok">yes</div>
    <template v-else>no</template>
    <div v-for="(value, index) in list"><span>{{ value + index }}</span></div>
  </div>
  "#;

    #[test]
    fn function_mode() {
        let code = compile(SOURCE.trim());
        assert!(code.starts_with("const _Vue = Vue\n"));
        assert!(code.contains("return function render(_ctx, _cache) {"));
        assert!(code.contains("with (_ctx) {"));
        assert!(code.contains("_toDisplayString(world.burn())"));
        assert!(code.contains("ok\n"));
        assert!(code.contains("_renderList(list, (value, index) => {"));
        assert!(code.contains("_toDisplayString(value + index)"));
        assert!(code.contains("class: _normalizeClass(bar.baz)"));
    }

    #[test]
    fn function_mode_with_prefix_identifiers() {
        let code = compile_prefixed(SOURCE.trim());
        assert!(!code.contains("with (_ctx)"));
        assert!(code.starts_with("const { "));
        assert!(code.contains("_toDisplayString(_ctx.world.burn())"));
        assert!(code.contains("(_ctx.ok)\n"));
        assert!(code.contains("_renderList(_ctx.list, (value, index) => {"));
        // loop aliases are locals of the render callback
        assert!(code.contains("_toDisplayString(value + index)"));
        assert!(code.contains("class: _normalizeClass(_ctx.bar.baz)"));
    }

    #[test]
    fn locals_of_inline_functions_are_not_prefixed() {
        let code = compile_prefixed(r#"<div :a="x => { let y = x; return y + z }"/>"#);
        assert!(code.contains("a: x => { let y = x; return y + _ctx.z }"));
    }

    #[test]
    fn module_mode() {
        let result = compile_with(
            SOURCE.trim(),
            CompilerOptions {
                mode: CodegenMode::Module,
                ..Default::default()
            },
        );
        let code = result.code;
        assert!(code.starts_with("import { "));
        assert!(code.contains(r#" } from "vue""#));
        assert!(code.contains("toDisplayString as _toDisplayString"));
        assert!(code.contains("export function render(_ctx, _cache) {"));
        // module mode always prefixes
        assert!(code.contains("_ctx.world.burn()"));
        assert!(result.preamble.is_empty());
    }

    #[test]
    fn single_element_root() {
        insta::assert_snapshot!(compile("<div>hello</div>"), @r#"
const _Vue = Vue

return function render(_ctx, _cache) {
  with (_ctx) {
    const { openBlock: _openBlock, createElementBlock: _createElementBlock } = _Vue

    return (_openBlock(), _createElementBlock("div", null, "hello"))
  }
}
"#);
    }

    #[test]
    fn module_mode_single_element() {
        let code = compile_with(
            "<div>hello</div>",
            CompilerOptions {
                mode: CodegenMode::Module,
                ..Default::default()
            },
        )
        .code;
        assert_eq!(
            code,
            "import { openBlock as _openBlock, createElementBlock as _createElementBlock } from \"vue\"\n\n\
             export function render(_ctx, _cache) {\n  \
             return (_openBlock(), _createElementBlock(\"div\", null, \"hello\"))\n\
             }"
        );
    }

    #[test]
    fn inline_mode_splits_preamble() {
        let result = compile_with(
            "<div>{{ msg }}</div>",
            CompilerOptions {
                mode: CodegenMode::Module,
                inline: true,
                ..Default::default()
            },
        );
        assert!(result.preamble.starts_with("import { "));
        assert!(!result.preamble.contains("export"));
        assert!(result.code.starts_with("(_ctx, _cache) => {"));
        assert!(!result.code.contains("import"));
        assert!(result.code.contains("_toDisplayString(_ctx.msg), 1))"));
    }

    #[test]
    fn text_only_template() {
        let code = compile("hello");
        assert!(code.contains(r#"return "hello""#));
        assert!(!code.contains("_Vue"));
    }

    #[test]
    fn empty_template() {
        let code = compile("");
        assert!(code.contains("return null"));
    }

    #[test]
    fn multiple_roots_become_a_fragment() {
        let code = compile("<div/><p/>");
        assert!(code.contains("(_openBlock(), _createElementBlock(_Fragment, null, ["));
        assert!(code.contains(r#"_createElementVNode("div")"#));
        assert!(code.contains(r#"_createElementVNode("p")"#));
        assert!(code.contains("], 64))"));
    }

    #[test]
    fn mixed_text_and_interpolation() {
        let code = compile("<p>Hello {{ name }}!</p>");
        assert!(code.contains(
            r#"_createElementBlock("p", null, "Hello " + _toDisplayString(name) + "!", 1)"#
        ));
    }

    #[test]
    fn dev_patch_flag_names() {
        let code = compile_with(
            "<div>{{ a }}</div>",
            CompilerOptions {
                dev: true,
                ..Default::default()
            },
        )
        .code;
        assert!(code.contains("_toDisplayString(a), 1 /* TEXT */))"));
    }

    mod props {
        use super::*;

        #[test]
        fn static_props_need_no_patch_flag() {
            let code = compile(r#"<div id="foo"/>"#);
            assert!(code.contains(r#"_createElementBlock("div", { id: "foo" }))"#));
        }

        #[test]
        fn dynamic_prop_names() {
            let code = compile(r#"<div :id="foo" class="bar">{{ msg }}</div>"#);
            assert!(code.contains("id: foo,"));
            assert!(code.contains(r#"class: "bar""#));
            assert!(code.contains(r#"_toDisplayString(msg), 9, ["id"]))"#));
        }

        #[test]
        fn full_props_for_object_spread() {
            let code = compile(r#"<div v-bind="obj"/>"#);
            assert!(code.contains(
                r#"_createElementBlock("div", _normalizeProps(_guardReactiveProps(obj)), null, 16))"#
            ));
        }

        #[test]
        fn full_props_for_dynamic_key() {
            let code = compile(r#"<div :[key]="value"/>"#);
            assert!(code.contains(r#"_normalizeProps({ [key || ""]: value }), null, 16))"#));
        }

        #[test]
        fn no_full_props_without_spread_or_dynamic_key() {
            let code = compile(r#"<div :id="a" :title="b"/>"#);
            assert!(code.contains(r#"8, ["id", "title"]))"#));
            assert!(!code.contains("16"));
        }

        #[test]
        fn merge_props_with_spread() {
            let code = compile(r#"<div id="a" v-bind="obj" class="b"/>"#);
            assert!(code.contains("_mergeProps({ id: \"a\" }, obj, { class: \"b\" })"));
        }

        #[test]
        fn class_and_style_bindings() {
            let code = compile(r#"<div :class="cls" :style="st"/>"#);
            assert!(code.contains("class: _normalizeClass(cls),"));
            assert!(code.contains("style: _normalizeStyle(st)"));
            // CLASS | STYLE
            assert!(code.contains("}, null, 6))"));
        }
    }

    mod structure {
        use super::*;

        #[test]
        fn if_else_if_else_is_one_node() {
            let result = compile_with(
                r#"<div v-if="a"/><p v-else-if="b"/><span v-else/>"#,
                CompilerOptions::default(),
            );
            let ast = &result.ast;
            let children = &ast.root_node().children;
            assert_eq!(children.len(), 1);
            let Node::If(if_node) = &ast[children[0]] else {
                panic!("expected an if node");
            };
            assert_eq!(if_node.branches.len(), 3);
        }

        #[test]
        fn if_else_codegen() {
            let code = compile(r#"<div v-if="a">A</div><div v-else>B</div>"#);
            assert!(code.contains(
                "a\n      ? (_openBlock(), _createElementBlock(\"div\", { key: 0 }, \"A\"))\n      : (_openBlock(), _createElementBlock(\"div\", { key: 1 }, \"B\"))"
            ));
        }

        #[test]
        fn if_without_else_renders_a_comment() {
            let code = compile(r#"<div v-if="a"/>"#);
            assert!(code.contains(r#": _createCommentVNode("", true)"#));
            let dev = compile_with(
                r#"<div v-if="a"/>"#,
                CompilerOptions {
                    dev: true,
                    ..Default::default()
                },
            )
            .code;
            assert!(dev.contains(r#": _createCommentVNode("v-if", true)"#));
        }

        #[test]
        fn v_for_alias_scope() {
            let code = compile_prefixed(
                r#"<div v-for="item in items">{{ item }}</div><p>{{ item }}</p>"#,
            );
            assert!(code.contains("_renderList(_ctx.items, (item) => {"));
            assert!(code.contains("_toDisplayString(item), 1))"));
            // outside the loop the same name is a context property
            assert!(code.contains(r#"_createElementVNode("p", null, _toDisplayString(_ctx.item), 1)"#));
        }

        #[test]
        fn v_for_fragment_flags() {
            let code = compile(r#"<div v-for="item in items"/>"#);
            assert!(code.contains("(_openBlock(true), _createElementBlock(_Fragment, null, _renderList(items, (item) => {"));
            assert!(code.contains("}), 256))"));

            let keyed = compile(r#"<div v-for="item in items" :key="item.id"/>"#);
            assert!(keyed.contains("}), 128))"));
            assert!(keyed.contains("{ key: item.id }"));
        }

        #[test]
        fn components_are_resolved() {
            let code = compile("<Comp/>");
            assert!(code.contains(r#"const _component_Comp = _resolveComponent("Comp")"#));
            assert!(code.contains("return (_openBlock(), _createBlock(_component_Comp))"));
        }

        #[test]
        fn custom_directives_are_resolved() {
            let code = compile(r#"<div v-foo:bar.baz="x"/>"#);
            assert!(code.contains(r#"const _directive_foo = _resolveDirective("foo")"#));
            assert!(code.contains("_withDirectives((_openBlock(), _createElementBlock(\"div\", null, null, 512)), ["));
            assert!(code.contains("_directive_foo,"));
            assert!(code.contains("\"bar\","));
            assert!(code.contains("{ baz: true }"));
        }
    }

    mod options {
        use super::*;

        #[test]
        fn source_map() {
            let result = compile_with(
                "<div>{{ msg }}</div>",
                CompilerOptions {
                    source_map: true,
                    filename: "foo.vue".to_string(),
                    prefix_identifiers: Some(true),
                    ..Default::default()
                },
            );
            let map = result.map.expect("source map requested");
            assert_eq!(map.version, 3);
            assert_eq!(map.file.as_deref(), Some("foo.vue"));
            assert_eq!(map.sources, ["foo.vue"]);
            assert_eq!(map.sources_content, ["<div>{{ msg }}</div>"]);
            assert_eq!(map.names, ["msg"]);
            assert!(!map.mappings.is_empty());
        }

        #[test]
        fn no_source_map_by_default() {
            let result = compile_with("<div/>", CompilerOptions::default());
            assert!(result.map.is_none());
        }

        #[test]
        fn module_mode_requires_prefixing() {
            let errors = compile_errors(
                "<div/>",
                CompilerOptions {
                    mode: CodegenMode::Module,
                    prefix_identifiers: Some(false),
                    ..Default::default()
                },
            );
            assert_eq!(errors, vec![ErrorCodes::XModuleModeNotSupported]);
        }

        #[test]
        fn cache_handlers_require_prefixing() {
            let errors = compile_errors(
                r#"<div @click="foo"/>"#,
                CompilerOptions {
                    cache_handlers: true,
                    ..Default::default()
                },
            );
            assert_eq!(errors, vec![ErrorCodes::XCacheHandlerNotSupported]);
        }

        #[test]
        fn parse_errors_surface_from_compile() {
            let errors = compile_errors("<div>", CompilerOptions::default());
            assert_eq!(errors, vec![ErrorCodes::XMissingEndTag]);
        }

        #[test]
        fn custom_runtime_global_name() {
            let code = compile_with(
                "<div/>",
                CompilerOptions {
                    runtime_global_name: "MyVue".to_string(),
                    ..Default::default()
                },
            )
            .code;
            assert!(code.starts_with("const _Vue = MyVue\n"));
        }
    }
}
