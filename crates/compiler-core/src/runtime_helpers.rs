macro_rules! runtime_helpers {
    ($(pub $Variant:ident : $lit:literal;)*) => {
        /// Runtime functions a generated render function may import.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum RuntimeHelper {
            $($Variant,)*
        }

        impl RuntimeHelper {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$Variant => $lit,)*
                }
            }
        }
    };
}

runtime_helpers! {
    pub Fragment: "Fragment";
    pub Teleport: "Teleport";
    pub Suspense: "Suspense";
    pub KeepAlive: "KeepAlive";
    pub BaseTransition: "BaseTransition";
    pub OpenBlock: "openBlock";
    pub CreateBlock: "createBlock";
    pub CreateElementBlock: "createElementBlock";
    pub CreateVNode: "createVNode";
    pub CreateElementVNode: "createElementVNode";
    pub CreateComment: "createCommentVNode";
    pub CreateText: "createTextVNode";
    pub ResolveComponent: "resolveComponent";
    pub ResolveDynamicComponent: "resolveDynamicComponent";
    pub ResolveDirective: "resolveDirective";
    pub WithDirectives: "withDirectives";
    pub RenderList: "renderList";
    pub RenderSlot: "renderSlot";
    pub CreateSlots: "createSlots";
    pub ToDisplayString: "toDisplayString";
    pub MergeProps: "mergeProps";
    pub NormalizeClass: "normalizeClass";
    pub NormalizeStyle: "normalizeStyle";
    pub NormalizeProps: "normalizeProps";
    pub GuardReactiveProps: "guardReactiveProps";
    pub ToHandlers: "toHandlers";
    pub Camelize: "camelize";
    pub Capitalize: "capitalize";
    pub ToHandlerKey: "toHandlerKey";
    pub SetBlockTracking: "setBlockTracking";
    pub WithCtx: "withCtx";
    pub WithMemo: "withMemo";
    pub IsMemoSame: "isMemoSame";
    // platform (dom) helpers
    pub VShow: "vShow";
    pub Transition: "Transition";
    pub TransitionGroup: "TransitionGroup";
}

impl std::fmt::Display for RuntimeHelper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RuntimeHelper {
    /// The local alias used in generated code, e.g. `_openBlock`.
    pub fn alias(&self) -> String {
        format!("_{}", self.as_str())
    }
}
