#[cfg(test)]
mod codegen_tests {
    use template_compiler_core::{
        Ast, CodegenMode, CodegenOptions, TransformOptions, base_parse, generate,
        get_base_transform_preset, transform,
    };

    fn transformed(template: &str, prefix_identifiers: bool) -> Ast {
        let mut ast = base_parse(template, None).expect("template should parse");
        let (node_transforms, directive_transforms) =
            get_base_transform_preset(prefix_identifiers);
        transform(
            &mut ast,
            TransformOptions {
                node_transforms,
                directive_transforms,
                prefix_identifiers,
                self_name: Some("Foo".to_string()),
                ..Default::default()
            },
        )
        .expect("template should transform");
        ast
    }

    fn module_options() -> CodegenOptions {
        CodegenOptions {
            mode: CodegenMode::Module,
            prefix_identifiers: true,
            ..Default::default()
        }
    }

    #[test]
    fn optimized_imports() {
        let ast = transformed("<div/>", true);
        let code = generate(
            ast,
            CodegenOptions {
                optimize_imports: true,
                ..module_options()
            },
        )
        .code;
        assert!(code.starts_with(
            "import { openBlock, createElementBlock } from \"vue\"\n\n\
             // Binding optimization for webpack code-split\n\
             const _openBlock = openBlock, _createElementBlock = createElementBlock\n"
        ));
    }

    #[test]
    fn custom_runtime_module() {
        let ast = transformed("<div/>", true);
        let code = generate(
            ast,
            CodegenOptions {
                runtime_module_name: "@vue/runtime-dom".to_string(),
                ..module_options()
            },
        )
        .code;
        assert!(code.contains(r#" } from "@vue/runtime-dom""#));
    }

    #[test]
    fn prefixed_function_mode_declares_helpers_once() {
        let ast = transformed("<div/>", true);
        let code = generate(
            ast,
            CodegenOptions {
                prefix_identifiers: true,
                ..Default::default()
            },
        )
        .code;
        assert_eq!(
            code,
            "const { openBlock: _openBlock, createElementBlock: _createElementBlock } = Vue\n\n\
             return function render(_ctx, _cache) {\n  \
             return (_openBlock(), _createElementBlock(\"div\"))\n\
             }"
        );
    }

    #[test]
    fn typescript_signature() {
        let ast = transformed("<div/>", true);
        let code = generate(
            ast,
            CodegenOptions {
                is_ts: true,
                ..module_options()
            },
        )
        .code;
        assert!(code.contains("export function render(_ctx: any,_cache: any) {"));
    }

    #[test]
    fn assets_and_temps() {
        let mut ast = transformed(r#"<div v-foo><Bar/><Foo/></div>"#, true);
        ast.root_node_mut().temps = 2;
        let code = generate(ast, module_options()).code;
        assert!(code.contains(
            "  const _component_Bar = _resolveComponent(\"Bar\")\n  \
             const _component_Foo = _resolveComponent(\"Foo\", true)\n  \
             const _directive_foo = _resolveDirective(\"foo\")\n  \
             let _temp0, _temp1\n\n  \
             return "
        ));
    }

    #[test]
    fn typescript_asset_assertions() {
        let ast = transformed("<Bar/>", true);
        let code = generate(
            ast,
            CodegenOptions {
                is_ts: true,
                ..module_options()
            },
        )
        .code;
        assert!(code.contains(r#"const _component_Bar = _resolveComponent("Bar")!"#));
    }

    #[test]
    fn inline_preamble_carries_hoists() {
        let mut ast = base_parse("<div><span>a</span>{{ b }}</div>", None)
            .expect("template should parse");
        let (node_transforms, directive_transforms) = get_base_transform_preset(true);
        transform(
            &mut ast,
            TransformOptions {
                node_transforms,
                directive_transforms,
                prefix_identifiers: true,
                hoist_static: true,
                ..Default::default()
            },
        )
        .expect("template should transform");
        let result = generate(
            ast,
            CodegenOptions {
                inline: true,
                ..module_options()
            },
        );
        assert!(result.preamble.contains(
            r#"const _hoisted_1 = /*#__PURE__*/_createElementVNode("span", null, "a", -1)"#
        ));
        assert!(!result.code.contains("_hoisted_1 ="));
        assert!(result.code.contains("_hoisted_1,"));
        assert!(result.code.starts_with("(_ctx, _cache) => {"));
    }

    #[test]
    fn root_without_codegen_node() {
        let ast = base_parse("", None).expect("template should parse");
        let code = generate(ast, module_options()).code;
        assert_eq!(code, "\nexport function render(_ctx, _cache) {\n  return null\n}");
    }
}
