mod dom_tag_config;
mod patch_flags;
mod slot_flags;

use phf::{Set, phf_set};

pub use crate::dom_tag_config::{is_html_tag, is_math_ml_tag, is_svg_tag, is_void_tag};
pub use crate::patch_flags::{PatchFlag, PatchFlags};
pub use crate::slot_flags::SlotFlags;

/// Globals an expression may reference without a context prefix.
static GLOBALLY_ALLOWED: Set<&'static str> = phf_set! {
    "Infinity", "undefined", "NaN", "isFinite", "isNaN", "parseFloat", "parseInt",
    "decodeURI", "decodeURIComponent", "encodeURI", "encodeURIComponent", "Math",
    "Number", "Date", "Array", "Object", "Boolean", "String", "RegExp", "Map", "Set",
    "JSON", "Intl", "BigInt", "console", "Error", "Symbol",
};

static RESERVED_PROPS: Set<&'static str> = phf_set! {
    "", "key", "ref", "ref_for", "ref_key", "onVnodeBeforeMount", "onVnodeMounted",
    "onVnodeBeforeUpdate", "onVnodeUpdated", "onVnodeBeforeUnmount",
    "onVnodeUnmounted",
};

static BUILT_IN_DIRECTIVES: Set<&'static str> = phf_set! {
    "bind", "cloak", "else-if", "else", "for", "html", "if", "model", "on", "once",
    "pre", "show", "slot", "text", "memo",
};

pub fn is_globally_allowed(name: &str) -> bool {
    GLOBALLY_ALLOWED.contains(name)
}

pub fn is_reserved_prop(name: &str) -> bool {
    RESERVED_PROPS.contains(name)
}

pub fn is_built_in_directive(name: &str) -> bool {
    BUILT_IN_DIRECTIVES.contains(name)
}

/// `onClick`, `onUpdate:modelValue`, but not `once`.
pub fn is_on(key: &str) -> bool {
    let bytes = key.as_bytes();
    bytes.len() > 2
        && bytes[0] == b'o'
        && bytes[1] == b'n'
        && (bytes[2] > b'z' || bytes[2] < b'a')
}

/// `foo-bar` -> `fooBar`
pub fn camelize(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '-'
            && let Some(next) = chars.peek()
            && next.is_ascii_alphanumeric()
        {
            result.extend(next.to_uppercase());
            chars.next();
        } else {
            result.push(c);
        }
    }
    result
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `click` -> `onClick`
pub fn to_handler_key(s: &str) -> String {
    if s.is_empty() {
        String::new()
    } else {
        format!("on{}", capitalize(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("foo-bar", "fooBar")]
    #[case("foo-bar-baz", "fooBarBaz")]
    #[case("foo", "foo")]
    #[case("update:model-value", "update:modelValue")]
    #[case("foo-", "foo-")]
    fn camelize_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(camelize(input), expected);
    }

    #[test]
    fn handler_keys() {
        assert_eq!(to_handler_key("click"), "onClick");
        assert_eq!(to_handler_key(""), "");
        assert!(is_on("onClick"));
        assert!(is_on("onUpdate:modelValue"));
        assert!(!is_on("once"));
        assert!(!is_on("on"));
    }

    #[test]
    fn allow_lists() {
        assert!(is_globally_allowed("Math"));
        assert!(!is_globally_allowed("foo"));
        assert!(is_reserved_prop("onVnodeMounted"));
        assert!(is_built_in_directive("memo"));
        assert!(!is_built_in_directive("focus"));
        assert!(is_void_tag("img"));
        assert!(is_svg_tag("foreignObject"));
        assert!(is_math_ml_tag("mi"));
        assert!(is_html_tag("div"));
    }
}
