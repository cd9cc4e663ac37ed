use std::rc::Rc;

use template_compiler_core::{
    BaseElementProps, ElementNode, Namespaces, ParserOptions, RuntimeHelper, TextModes,
};
use template_compiler_shared::{is_html_tag, is_math_ml_tag, is_svg_tag, is_void_tag};

pub fn parser_options() -> ParserOptions {
    ParserOptions {
        is_native_tag: Some(Rc::new(is_native_tag)),
        is_void_tag: Rc::new(is_void_tag),
        is_pre_tag: Rc::new(|tag| tag == "pre"),
        is_built_in_component: Some(Rc::new(is_built_in_component)),
        get_namespace: Rc::new(get_namespace),
        get_text_mode: Rc::new(get_text_mode),
        ..Default::default()
    }
}

pub fn is_native_tag(tag: &str) -> bool {
    is_html_tag(tag) || is_svg_tag(tag) || is_math_ml_tag(tag)
}

pub fn is_built_in_component(tag: &str) -> Option<RuntimeHelper> {
    match tag {
        "Transition" | "transition" => Some(RuntimeHelper::Transition),
        "TransitionGroup" | "transition-group" => Some(RuntimeHelper::TransitionGroup),
        _ => None,
    }
}

// https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher
pub fn get_namespace(tag: &str, parent: Option<&ElementNode>, root_namespace: Namespaces) -> Namespaces {
    let mut ns = parent.map_or(root_namespace, |parent| parent.ns);
    if let Some(parent) = parent {
        if ns == Namespaces::MathML {
            if parent.tag == "annotation-xml" {
                if tag == "svg" {
                    return Namespaces::SVG;
                }
                if parent.props.iter().any(|p| {
                    matches!(p, BaseElementProps::Attribute(a)
                        if a.name == "encoding"
                            && a.value.as_ref().is_some_and(|value| {
                                value.content == "text/html"
                                    || value.content == "application/xhtml+xml"
                            }))
                }) {
                    ns = Namespaces::HTML;
                }
            } else if is_math_ml_text_integration_point(&parent.tag)
                && tag != "mglyph"
                && tag != "malignmark"
            {
                ns = Namespaces::HTML;
            }
        } else if ns == Namespaces::SVG
            && matches!(parent.tag.as_str(), "foreignObject" | "desc" | "title")
        {
            ns = Namespaces::HTML;
        }
    }

    if ns == Namespaces::HTML {
        if tag == "svg" {
            return Namespaces::SVG;
        }
        if tag == "math" {
            return Namespaces::MathML;
        }
    }
    ns
}

// https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments
pub fn get_text_mode(tag: &str, ns: Namespaces, _parent: Option<&ElementNode>) -> TextModes {
    if ns == Namespaces::HTML {
        match tag {
            "textarea" | "title" => return TextModes::RcData,
            "style" | "xmp" | "iframe" | "noembed" | "noframes" | "script" | "noscript" => {
                return TextModes::RawText;
            }
            _ => {}
        }
    }
    TextModes::Data
}

fn is_math_ml_text_integration_point(tag: &str) -> bool {
    matches!(tag, "mi" | "mo" | "mn" | "ms" | "mtext")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("textarea", Namespaces::HTML, TextModes::RcData)]
    #[case("title", Namespaces::HTML, TextModes::RcData)]
    #[case("style", Namespaces::HTML, TextModes::RawText)]
    #[case("script", Namespaces::HTML, TextModes::RawText)]
    #[case("div", Namespaces::HTML, TextModes::Data)]
    #[case("title", Namespaces::SVG, TextModes::Data)]
    fn text_modes(#[case] tag: &str, #[case] ns: Namespaces, #[case] expected: TextModes) {
        assert_eq!(get_text_mode(tag, ns, None), expected);
    }

    #[rstest]
    #[case("div", true)]
    #[case("circle", true)]
    #[case("mfrac", true)]
    #[case("Comp", false)]
    #[case("my-element", false)]
    fn native_tags(#[case] tag: &str, #[case] expected: bool) {
        assert_eq!(is_native_tag(tag), expected);
    }
}
