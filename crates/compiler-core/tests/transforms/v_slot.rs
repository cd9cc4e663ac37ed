use crate::test_utils::{compile_errors, compile_prefixed, compile_with};
use template_compiler_core::{CompilerOptions, ErrorCodes};

fn prefixed() -> CompilerOptions {
    CompilerOptions {
        prefix_identifiers: Some(true),
        ..Default::default()
    }
}

#[test]
fn implicit_default_slot() {
    let code = compile_prefixed("<Comp><div/></Comp>");
    assert!(code.contains("_createBlock(_component_Comp, null, {"));
    assert!(code.contains("default: _withCtx(() => ["));
    assert!(code.contains(r#"_createElementVNode("div")"#));
    assert!(code.contains("_: 1"));
}

#[test]
fn on_component_slot_props() {
    let code = compile_prefixed(r#"<Comp v-slot="{ foo }">{{ foo }}{{ bar }}</Comp>"#);
    assert!(code.contains("default: _withCtx(({ foo }) => ["));
    // slot props are locals, everything else reads from the context
    assert!(code.contains("_toDisplayString(foo) + _toDisplayString(_ctx.bar)"));
}

#[test]
fn named_template_slots() {
    let code = compile_prefixed(
        r#"<Comp><template #one="{ a }">{{ a }}</template><template v-slot:two>two</template></Comp>"#,
    );
    assert!(code.contains("one: _withCtx(({ a }) => ["));
    assert!(code.contains("_toDisplayString(a)"));
    assert!(code.contains("two: _withCtx(() => ["));
    assert!(code.contains(r#"_createTextVNode("two")"#));
    assert!(!code.contains("default:"));
}

#[test]
fn stable_flag_in_dev() {
    let code = compile_with(
        "<Comp>x</Comp>",
        CompilerOptions {
            dev: true,
            ..prefixed()
        },
    )
    .code;
    assert!(code.contains("_: 1 /* STABLE */"));
}

#[test]
fn dynamic_slot_name() {
    let code = compile_prefixed(r#"<Comp><template #[name]>x</template></Comp>"#);
    assert!(code.contains("[_ctx.name]: _withCtx(() => ["));
    assert!(code.contains("_: 2"));
    assert!(code.contains("}, 1024))"));
}

#[test]
fn conditional_slots() {
    let code = compile_prefixed(
        r#"<Comp><template v-if="ok" #one>1</template><template v-else #two>2</template></Comp>"#,
    );
    assert!(code.contains("_createSlots({ _: 2 }, ["));
    assert!(code.contains(r#"name: "one","#));
    assert!(code.contains(r#"key: "0""#));
    assert!(code.contains(r#"name: "two","#));
    assert!(code.contains(r#"key: "1""#));
}

#[test]
fn looped_slots() {
    let code = compile_prefixed(
        r#"<Comp><template v-for="name in list" #[name]>{{ name }}</template></Comp>"#,
    );
    assert!(code.contains("_createSlots({ _: 2 }, ["));
    assert!(code.contains("_renderList(_ctx.list, (name) => {"));
    assert!(code.contains("name: name,"));
    assert!(code.contains("_toDisplayString(name)"));
}

#[test]
fn slot_using_loop_alias_is_dynamic() {
    let code = compile_prefixed(r#"<div v-for="i in list"><Comp>{{ i }}</Comp></div>"#);
    assert!(code.contains("_: 2"));

    let code = compile_prefixed(r#"<div v-for="i in list"><Comp>{{ other }}</Comp></div>"#);
    assert!(code.contains("_: 1"));
}

#[test]
fn forwarded_slots() {
    let code = compile_prefixed("<Comp><slot/></Comp>");
    assert!(code.contains("_: 3"));
}

mod errors {
    use super::*;

    #[test]
    fn mixed_slot_usage() {
        let errors = compile_errors(r#"<Comp v-slot="p"><template #foo/></Comp>"#, prefixed());
        assert_eq!(errors, vec![ErrorCodes::XVSlotMixedSlotUsage]);
    }

    #[test]
    fn duplicate_slot_names() {
        let errors = compile_errors("<Comp><template #foo/><template #foo/></Comp>", prefixed());
        assert_eq!(errors, vec![ErrorCodes::XVSlotDuplicateSlotNames]);
    }

    #[test]
    fn extraneous_default_children() {
        let errors = compile_errors("<Comp><template #default/>text</Comp>", prefixed());
        assert_eq!(errors, vec![ErrorCodes::XVSlotExtraneousDefaultSlotChildren]);
    }

    #[test]
    fn misplaced_slot() {
        let errors = compile_errors("<div v-slot/>", prefixed());
        assert_eq!(errors, vec![ErrorCodes::XVSlotMisplaced]);
    }
}
