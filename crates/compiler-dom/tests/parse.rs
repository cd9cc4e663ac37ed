#[cfg(test)]
mod dom_parser_tests {
    use std::rc::Rc;

    use template_compiler_core::{
        Ast, CollectErrors, ElementNode, ElementTypes, ErrorCodes, Namespaces, Node, NodeId,
        ParserOptions,
    };
    use template_compiler_dom::{parse, parser_options};

    fn parse_dom(template: &str) -> Ast {
        parse(template, None).expect("template should parse")
    }

    fn element(ast: &Ast, id: NodeId) -> &ElementNode {
        match &ast[id] {
            Node::Element(el) => el,
            node => panic!("expected an element, got {:?}", node.type_()),
        }
    }

    fn first(ast: &Ast) -> &ElementNode {
        element(ast, ast.root_node().children[0])
    }

    mod text {
        use super::*;

        #[test]
        fn textarea_handles_comments_and_elements_as_text() {
            let ast = parse_dom("<textarea>some<div>text</div>and<!--comment--></textarea>");
            let textarea = first(&ast);
            assert_eq!(textarea.children.len(), 1);
            let Node::Text(text) = &ast[textarea.children[0]] else {
                panic!("expected a text node");
            };
            assert_eq!(text.content, "some<div>text</div>and<!--comment-->");
            assert_eq!(text.loc.start.offset, 10);
            assert_eq!(text.loc.start.column, 11);
            assert_eq!(text.loc.end.offset, 46);
            assert_eq!(text.loc.source, "some<div>text</div>and<!--comment-->");
        }

        #[test]
        fn textarea_decodes_entities() {
            let ast = parse_dom("<textarea>&amp;&lt;</textarea>");
            let Node::Text(text) = &ast[first(&ast).children[0]] else {
                panic!("expected a text node");
            };
            assert_eq!(text.content, "&<");
        }

        #[test]
        fn textarea_keeps_interpolation() {
            let ast = parse_dom("<textarea>some{{ foo + bar }}text</textarea>");
            let children = &first(&ast).children;
            assert_eq!(children.len(), 3);
            assert!(matches!(ast[children[1]], Node::Interpolation(_)));
        }

        #[test]
        fn style_is_raw_text() {
            let ast = parse_dom("<style>some<div>text</div>&amp;{{ foo }}</style>");
            let style = first(&ast);
            assert_eq!(style.children.len(), 1);
            let Node::Text(text) = &ast[style.children[0]] else {
                panic!("expected a text node");
            };
            assert_eq!(text.content, "some<div>text</div>&amp;{{ foo }}");
        }

        #[test]
        fn pre_drops_the_leading_newline() {
            let ast = parse_dom("<pre>\nfoo  bar</pre>");
            let Node::Text(text) = &ast[first(&ast).children[0]] else {
                panic!("expected a text node");
            };
            assert_eq!(text.content, "foo  bar");
        }
    }

    mod element {
        use super::*;

        #[test]
        fn void_elements() {
            let errors = Rc::new(CollectErrors::default());
            let ast = parse(
                "<img>after",
                Some(ParserOptions {
                    error_handling_options: errors.clone(),
                    ..parser_options()
                }),
            )
            .expect("collecting sink never raises");
            assert!(errors.codes().is_empty());
            let img = first(&ast);
            assert_eq!(img.tag, "img");
            assert!(img.children.is_empty());
            assert_eq!(ast.root_node().children.len(), 2);
        }

        #[test]
        fn native_and_custom_tags() {
            let ast = parse_dom("<div/><my-element/><Comp/><circle/>");
            let tags: Vec<_> = ast
                .root_node()
                .children
                .iter()
                .map(|id| element(&ast, *id).tag_type)
                .collect();
            assert_eq!(
                tags,
                [
                    ElementTypes::Element,
                    ElementTypes::Component,
                    ElementTypes::Component,
                    ElementTypes::Element,
                ]
            );
        }

        #[test]
        fn built_in_transition() {
            let ast = parse_dom("<Transition/><transition-group/>");
            let children = &ast.root_node().children;
            assert_eq!(element(&ast, children[0]).tag_type, ElementTypes::Component);
            assert_eq!(element(&ast, children[1]).tag_type, ElementTypes::Component);
        }

        #[test]
        fn unexpected_end_tag_in_raw_text() {
            let errors = Rc::new(CollectErrors::default());
            parse(
                "<script>",
                Some(ParserOptions {
                    error_handling_options: errors.clone(),
                    ..parser_options()
                }),
            )
            .expect("collecting sink never raises");
            assert_eq!(errors.codes(), vec![ErrorCodes::XMissingEndTag]);
        }
    }

    mod namespaces {
        use super::*;

        #[test]
        fn html() {
            let ast = parse_dom("<html>test</html>");
            assert_eq!(first(&ast).ns, Namespaces::HTML);
        }

        #[test]
        fn svg_and_its_children() {
            let ast = parse_dom("<svg><circle/></svg>");
            let svg = first(&ast);
            assert_eq!(svg.ns, Namespaces::SVG);
            assert_eq!(element(&ast, svg.children[0]).ns, Namespaces::SVG);
        }

        #[test]
        fn foreign_object_switches_back_to_html() {
            let ast = parse_dom("<svg><foreignObject><div/></foreignObject></svg>");
            let svg = first(&ast);
            let foreign = element(&ast, svg.children[0]);
            assert_eq!(foreign.ns, Namespaces::SVG);
            assert_eq!(element(&ast, foreign.children[0]).ns, Namespaces::HTML);
        }

        #[test]
        fn math_ml() {
            let ast = parse_dom("<math><mi><span/></mi></math>");
            let math = first(&ast);
            assert_eq!(math.ns, Namespaces::MathML);
            let mi = element(&ast, math.children[0]);
            assert_eq!(mi.ns, Namespaces::MathML);
            assert_eq!(element(&ast, mi.children[0]).ns, Namespaces::HTML);
        }

        #[test]
        fn annotation_xml_with_html_encoding() {
            let ast = parse_dom(
                r#"<math><annotation-xml encoding="text/html"><div/></annotation-xml></math>"#,
            );
            let annotation = element(&ast, first(&ast).children[0]);
            assert_eq!(element(&ast, annotation.children[0]).ns, Namespaces::HTML);
        }

        #[test]
        fn svg_title_is_data_text() {
            let ast = parse_dom("<svg><title><g/></title></svg>");
            let title = element(&ast, first(&ast).children[0]);
            assert_eq!(title.ns, Namespaces::SVG);
            assert!(matches!(ast[title.children[0]], Node::Element(_)));
        }
    }
}
