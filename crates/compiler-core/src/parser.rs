use crate::{
    ast::{
        AttributeNode, Ast, BaseElementProps, CommentNode, ConstantTypes, DirectiveNode,
        ElementNode, ElementTypes, ExpressionNode, ForParseResult, InterpolationNode, Namespaces,
        Node, NodeId, NodeTypes, Position, RootNode, SimpleExpressionNode, SourceLocation,
        TextNode,
    },
    errors::{CompilerError, ErrorCodes},
    options::{BetweenElements, ParserOptions, WhitespaceStrategy},
    scanner::{
        Cursor, advance_position_with_clone, advance_position_with_mutation, has_newline_char,
        is_all_whitespace, is_end_of_tag_section, is_whitespace,
    },
    utils::{is_core_component, match_for_alias},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextModes {
    /// ```text
    ///          | Elements | Entities | End sign              | Inside of
    #[default]
    /// DATA     | ✔        | ✔        | End tags of ancestors |
    /// ```
    Data,
    /// RCDATA   | ✘        | ✔        | End tag of the parent | <textarea>
    RcData,
    /// RAWTEXT  | ✘        | ✘        | End tag of the parent | <style>,<script>
    RawText,
    /// CDATA    | ✘        | ✘        | ]]>                   | CDATA section
    CData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagType {
    Start,
    End,
}

const SPECIAL_TEMPLATE_DIR: [&str; 5] = ["if", "else", "else-if", "for", "slot"];

struct AttributeValue {
    content: String,
    is_quoted: bool,
    loc: SourceLocation,
}

struct ParserContext<'a> {
    options: ParserOptions,
    cursor: Cursor<'a>,
    ast: Ast,
    in_pre: bool,
    in_v_pre: bool,
}

impl<'a> ParserContext<'a> {
    fn emit_error(&self, code: ErrorCodes, offset: usize) -> Result<(), CompilerError> {
        self.emit_error_at(code, self.cursor.position_ahead(offset))
    }

    fn emit_error_at(&self, code: ErrorCodes, pos: Position) -> Result<(), CompilerError> {
        let loc = SourceLocation {
            start: pos,
            end: pos,
            source: String::new(),
        };
        self.options
            .error_handling_options
            .on_error(CompilerError::new(code, Some(loc)))
    }

    fn push_node(&mut self, nodes: &mut Vec<NodeId>, id: NodeId) {
        if let Node::Text(text) = &self.ast[id]
            && let Some(prev_id) = nodes.last().copied()
            && let Node::Text(prev) = &self.ast[prev_id]
            && prev.loc.end.offset == text.loc.start.offset
        {
            let text = text.clone();
            let Node::Text(prev) = &mut self.ast[prev_id] else {
                unreachable!();
            };
            // merge adjacent text nodes
            prev.content.push_str(&text.content);
            prev.loc.end = text.loc.end;
            prev.loc.source.push_str(&text.loc.source);
            return;
        }
        nodes.push(id);
    }

    fn parse_children(
        &mut self,
        mode: TextModes,
        ancestors: &mut Vec<ElementNode>,
    ) -> Result<Vec<NodeId>, CompilerError> {
        let ns = ancestors.last().map(|p| p.ns).unwrap_or(self.options.ns);
        let mut nodes: Vec<NodeId> = Vec::new();

        while !self.is_end(mode, ancestors) {
            let mut node: Option<Node> = None;

            if matches!(mode, TextModes::Data | TextModes::RcData) {
                if !self.in_v_pre && self.cursor.starts_with(&self.options.delimiters.0) {
                    // '{{'
                    node = Some(self.parse_interpolation(mode)?);
                } else if mode == TextModes::Data && self.cursor.starts_with("<") {
                    match self.cursor.peek_nth(1) {
                        None => {
                            self.emit_error(ErrorCodes::EOFBeforeTagName, 1)?;
                        }
                        Some('!') => {
                            if self.cursor.starts_with("<!--") {
                                node = Some(self.parse_comment()?);
                            } else if self.cursor.starts_with("<!DOCTYPE") {
                                // Ignore DOCTYPE by a limitation.
                                node = Some(self.parse_bogus_comment());
                            } else if self.cursor.starts_with("<![CDATA[") {
                                if ns != Namespaces::HTML {
                                    for id in self.parse_cdata(ancestors)? {
                                        self.push_node(&mut nodes, id);
                                    }
                                    continue;
                                }
                                self.emit_error(ErrorCodes::CdataInHtmlContent, 0)?;
                                node = Some(self.parse_bogus_comment());
                            } else {
                                self.emit_error(ErrorCodes::IncorrectlyOpenedComment, 0)?;
                                node = Some(self.parse_bogus_comment());
                            }
                        }
                        Some('/') => match self.cursor.peek_nth(2) {
                            // https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state
                            None => {
                                self.emit_error(ErrorCodes::EOFBeforeTagName, 2)?;
                            }
                            Some('>') => {
                                self.emit_error(ErrorCodes::MissingEndTagName, 2)?;
                                self.cursor.advance_by(3);
                                continue;
                            }
                            Some(c) if c.is_ascii_alphabetic() => {
                                self.emit_error(ErrorCodes::XInvalidEndTag, 0)?;
                                let parent = ancestors.last();
                                self.parse_tag(TagType::End, parent)?;
                                continue;
                            }
                            Some(_) => {
                                self.emit_error(ErrorCodes::InvalidFirstCharacterOfTagName, 2)?;
                                node = Some(self.parse_bogus_comment());
                            }
                        },
                        Some(c) if c.is_ascii_alphabetic() => {
                            node = Some(self.parse_element(ancestors)?);
                        }
                        Some('?') => {
                            self.emit_error(ErrorCodes::UnexpectedQuestionMarkInsteadOfTagName, 1)?;
                            node = Some(self.parse_bogus_comment());
                        }
                        Some(_) => {
                            self.emit_error(ErrorCodes::InvalidFirstCharacterOfTagName, 1)?;
                        }
                    }
                }
            }

            let node = match node {
                Some(node) => node,
                None => self.parse_text(mode),
            };
            if matches!(node, Node::Comment(_)) && !self.options.comments {
                continue;
            }
            let id = self.ast.alloc(node);
            self.push_node(&mut nodes, id);
        }

        // whitespace management for more efficient output
        if mode != TextModes::RawText && mode != TextModes::RcData {
            if self.in_pre {
                for id in &nodes {
                    // normalize windows newlines in <pre>
                    if let Node::Text(text) = &mut self.ast[*id] {
                        text.content = text.content.replace("\r\n", "\n");
                    }
                }
            } else {
                nodes = condense_whitespace(
                    &mut self.ast,
                    nodes,
                    self.options.whitespace,
                    self.options.drop_whitespace_between_elements,
                );
            }

            if self.in_pre
                && let Some(parent) = ancestors.last()
                && (self.options.is_pre_tag)(&parent.tag)
                && let Some(first) = nodes.first()
                && let Node::Text(text) = &mut self.ast[*first]
            {
                // remove leading newline per html spec
                // https://html.spec.whatwg.org/multipage/grouping-content.html#the-pre-element
                if let Some(stripped) = text.content.strip_prefix('\n') {
                    text.content = stripped.to_string();
                }
            }
        }

        Ok(nodes)
    }

    fn parse_cdata(
        &mut self,
        ancestors: &mut Vec<ElementNode>,
    ) -> Result<Vec<NodeId>, CompilerError> {
        self.cursor.advance_by(9);
        let nodes = self.parse_children(TextModes::CData, ancestors)?;
        if self.cursor.is_eof() {
            self.emit_error(ErrorCodes::EOFInCdata, 0)?;
        } else {
            self.cursor.advance_by(3);
        }
        Ok(nodes)
    }

    fn parse_comment(&mut self) -> Result<Node, CompilerError> {
        let start = self.cursor.position();
        let rest = self.cursor.rest();

        // Regular comment.
        let close = find_comment_close(rest);
        let content = match close {
            None => {
                let content = rest[4..].to_string();
                self.cursor.advance_by(rest.len());
                self.emit_error(ErrorCodes::EOFInComment, 0)?;
                content
            }
            Some((index, close_len)) => {
                if index <= 3 {
                    self.emit_error(ErrorCodes::AbruptClosingOfEmptyComment, 0)?;
                }
                if close_len == 4 {
                    self.emit_error(ErrorCodes::IncorrectlyClosedComment, 0)?;
                }
                let content = rest.get(4..index).unwrap_or_default().to_string();

                // Advancing with reporting nested comments.
                let s = &rest[..index];
                let mut prev_index = 1;
                while let Some(found) = s.get(prev_index..).and_then(|t| t.find("<!--")) {
                    let nested_index = prev_index + found;
                    self.cursor.advance_by(nested_index - prev_index + 1);
                    if nested_index + 4 < s.len() {
                        self.emit_error(ErrorCodes::NestedComment, 0)?;
                    }
                    prev_index = nested_index + 1;
                }
                self.cursor.advance_by(index + close_len - prev_index + 1);
                content
            }
        };

        Ok(Node::Comment(CommentNode::new(
            content,
            self.cursor.selection(start, None),
        )))
    }

    fn parse_bogus_comment(&mut self) -> Node {
        let start = self.cursor.position();
        let rest = self.cursor.rest();
        let content_start = if rest.as_bytes().get(1) == Some(&b'?') {
            1
        } else {
            2
        };
        let content = match rest.find('>') {
            None => {
                let content = rest.get(content_start..).unwrap_or_default().to_string();
                self.cursor.advance_by(rest.len());
                content
            }
            Some(close_index) => {
                let content = rest
                    .get(content_start..close_index)
                    .unwrap_or_default()
                    .to_string();
                self.cursor.advance_by(close_index + 1);
                content
            }
        };

        Node::Comment(CommentNode::new(content, self.cursor.selection(start, None)))
    }

    fn parse_element(&mut self, ancestors: &mut Vec<ElementNode>) -> Result<Node, CompilerError> {
        // Start tag.
        let was_in_pre = self.in_pre;
        let was_in_v_pre = self.in_v_pre;
        let Some(mut element) = self.parse_tag(TagType::Start, ancestors.last())? else {
            unreachable!();
        };
        let is_pre_boundary = self.in_pre && !was_in_pre;
        let is_v_pre_boundary = self.in_v_pre && !was_in_v_pre;

        if element.is_self_closing || (self.options.is_void_tag)(&element.tag) {
            // self-closing <pre> tag
            if is_pre_boundary {
                self.in_pre = false;
            }
            if is_v_pre_boundary {
                self.in_v_pre = false;
            }
            return Ok(Node::Element(element));
        }

        // Children.
        let mode = (self.options.get_text_mode)(&element.tag, element.ns, ancestors.last());
        let tag = element.tag.clone();
        let start = element.loc.start;
        ancestors.push(element);
        let children = self.parse_children(mode, ancestors)?;
        let Some(popped) = ancestors.pop() else {
            unreachable!();
        };
        element = popped;
        element.children = children;

        // End tag.
        if self.starts_with_end_tag_open(&tag) {
            self.parse_tag(TagType::End, ancestors.last())?;
        } else {
            self.emit_error_at(ErrorCodes::XMissingEndTag, start)?;
            if self.cursor.is_eof()
                && tag.eq_ignore_ascii_case("script")
                && let Some(first) = element.children.first()
                && self.ast[*first].loc().source.starts_with("<!--")
            {
                self.emit_error(ErrorCodes::EOFInScriptHtmlCommentLikeText, 0)?;
            }
        }

        element.loc = self.cursor.selection(start, None);

        if is_pre_boundary {
            self.in_pre = false;
        }
        if is_v_pre_boundary {
            self.in_v_pre = false;
        }
        Ok(Node::Element(element))
    }

    /// Parse a tag (E.g. `<div id=a>`) with that type (start tag or end tag).
    fn parse_tag(
        &mut self,
        type_: TagType,
        parent: Option<&ElementNode>,
    ) -> Result<Option<ElementNode>, CompilerError> {
        // Tag open.
        let start = self.cursor.position();
        let rest = self.cursor.rest();
        let name_start = if type_ == TagType::End { 2 } else { 1 };
        let name_end = rest[name_start..]
            .find(is_end_of_tag_section)
            .map(|i| i + name_start)
            .unwrap_or(rest.len());
        let tag = rest[name_start..name_end].to_string();
        let ns = (self.options.get_namespace)(&tag, parent, self.options.ns);

        self.cursor.advance_by(name_end);
        self.cursor.advance_spaces();

        // save current state in case we need to re-parse attributes with v-pre
        let saved_cursor = self.cursor;

        // check <pre> tag
        if (self.options.is_pre_tag)(&tag) {
            self.in_pre = true;
        }

        // Attributes.
        let mut props = self.parse_attributes(type_)?;

        // check v-pre
        if type_ == TagType::Start
            && !self.in_v_pre
            && props
                .iter()
                .any(|p| matches!(p, BaseElementProps::Directive(dir) if dir.name == "pre"))
        {
            self.in_v_pre = true;
            // reset context
            self.cursor = saved_cursor;
            // re-parse attrs and filter out v-pre itself
            props = self
                .parse_attributes(type_)?
                .into_iter()
                .filter(|p| p.name() != "v-pre")
                .collect();
        }

        // Tag close.
        let mut is_self_closing = false;
        if self.cursor.is_eof() {
            self.emit_error(ErrorCodes::EOFInTag, 0)?;
        } else {
            is_self_closing = self.cursor.starts_with("/>");
            if type_ == TagType::End && is_self_closing {
                self.emit_error(ErrorCodes::EndTagWithTrailingSolidus, 0)?;
            }
            self.cursor.advance_by(if is_self_closing { 2 } else { 1 });
        }

        if type_ == TagType::End {
            return Ok(None);
        }

        let mut element = ElementNode::new(tag, ns, self.cursor.selection(start, None));
        element.props = props;
        element.is_self_closing = is_self_closing;
        if !self.in_v_pre {
            element.tag_type = if element.tag == "slot" {
                ElementTypes::Slot
            } else if element.tag == "template" {
                if element.props.iter().any(|p| {
                    matches!(p, BaseElementProps::Directive(dir) if SPECIAL_TEMPLATE_DIR.contains(&dir.name.as_str()))
                }) {
                    ElementTypes::Template
                } else {
                    ElementTypes::Element
                }
            } else if self.is_component(&element) {
                ElementTypes::Component
            } else {
                ElementTypes::Element
            };
        }

        Ok(Some(element))
    }

    fn is_component(&self, el: &ElementNode) -> bool {
        let tag = el.tag.as_str();
        if let Some(is_custom_element) = &self.options.is_custom_element
            && is_custom_element(tag)
        {
            return false;
        }

        if tag == "component"
            || tag.starts_with(|c: char| c.is_ascii_uppercase())
            || is_core_component(tag).is_some()
            || self
                .options
                .is_built_in_component
                .as_ref()
                .is_some_and(|f| f(tag).is_some())
            || self.options.is_native_tag.as_ref().is_some_and(|f| !f(tag))
        {
            return true;
        }

        // at this point the tag should be a native tag, but check for potential "is"
        // casting
        el.props.iter().any(|prop| {
            matches!(prop, BaseElementProps::Attribute(attr)
                if attr.name == "is"
                    && attr.value.as_ref().is_some_and(|v| v.content.starts_with("vue:")))
        })
    }

    fn parse_attributes(&mut self, type_: TagType) -> Result<Vec<BaseElementProps>, CompilerError> {
        let mut props = Vec::new();
        let mut attribute_names: Vec<String> = Vec::new();
        while !self.cursor.is_eof() && !self.cursor.starts_with(">") && !self.cursor.starts_with("/>")
        {
            if self.cursor.starts_with("/") {
                self.emit_error(ErrorCodes::UnexpectedSolidusInTag, 0)?;
                self.cursor.advance_by(1);
                self.cursor.advance_spaces();
                continue;
            }
            if type_ == TagType::End {
                self.emit_error(ErrorCodes::EndTagWithAttributes, 0)?;
            }

            let mut attr = self.parse_attribute(&mut attribute_names)?;

            // condense whitespaces in class
            if let BaseElementProps::Attribute(attr) = &mut attr
                && attr.name == "class"
                && let Some(value) = &mut attr.value
            {
                value.content = value.content.split_whitespace().collect::<Vec<_>>().join(" ");
            }

            if type_ == TagType::Start {
                props.push(attr);
            }

            if self
                .cursor
                .peek()
                .is_some_and(|c| !is_whitespace(c) && c != '/' && c != '>')
            {
                self.emit_error(ErrorCodes::MissingWhitespaceBetweenAttributes, 0)?;
            }
            self.cursor.advance_spaces();
        }
        Ok(props)
    }

    fn parse_attribute(
        &mut self,
        name_set: &mut Vec<String>,
    ) -> Result<BaseElementProps, CompilerError> {
        // Name.
        let start = self.cursor.position();
        let rest = self.cursor.rest();
        let first_len = rest.chars().next().map(char::len_utf8).unwrap_or(0);
        let name_len = rest[first_len..]
            .find(|c: char| is_whitespace(c) || c == '/' || c == '>' || c == '=')
            .map(|i| i + first_len)
            .unwrap_or(rest.len());
        let name = rest[..name_len].to_string();

        if name_set.contains(&name) {
            self.emit_error(ErrorCodes::DuplicateAttribute, 0)?;
        }
        name_set.push(name.clone());

        if name.starts_with('=') {
            self.emit_error(ErrorCodes::UnexpectedEqualsSignBeforeAttributeName, 0)?;
        }
        for (index, _) in name.match_indices(['"', '\'', '<']) {
            self.emit_error(ErrorCodes::UnexpectedCharacterInAttributeName, index)?;
        }

        self.cursor.advance_by(name_len);

        // Value
        let mut value = None;
        if self
            .cursor
            .rest()
            .trim_start_matches(is_whitespace)
            .starts_with('=')
        {
            self.cursor.advance_spaces();
            self.cursor.advance_by(1);
            self.cursor.advance_spaces();
            value = self.parse_attribute_value()?;
            if value.is_none() {
                self.emit_error(ErrorCodes::MissingAttributeValue, 0)?;
            }
        }
        let loc = self.cursor.selection(start, None);

        if !self.in_v_pre && is_directive_name(&name) {
            return Ok(BaseElementProps::Directive(
                self.create_directive(name, start, value, loc)?,
            ));
        }

        // missing directive name or illegal directive name
        if !self.in_v_pre && name.starts_with("v-") {
            self.emit_error(ErrorCodes::XMissingDirectiveName, 0)?;
        }

        Ok(BaseElementProps::Attribute(AttributeNode {
            name_loc: SourceLocation {
                start,
                end: advance_position_with_clone(&start, &name, name.len()),
                source: name.clone(),
            },
            name,
            value: value.map(|value| TextNode::new(value.content, value.loc)),
            loc,
        }))
    }

    fn create_directive(
        &mut self,
        name: String,
        start: Position,
        value: Option<AttributeValue>,
        loc: SourceLocation,
    ) -> Result<DirectiveNode, CompilerError> {
        let parts = split_directive_name(&name);
        let is_prop_shorthand = name.starts_with('.');
        let dir_name = match parts.name {
            Some(dir_name) => dir_name.to_string(),
            None if is_prop_shorthand || name.starts_with(':') => "bind".to_string(),
            None if name.starts_with('@') => "on".to_string(),
            None => "slot".to_string(),
        };

        let mut arg = None;
        if let Some(raw_arg) = parts.arg {
            let is_slot = dir_name == "slot";
            let start_offset = name.rfind(raw_arg).unwrap_or(0);
            let arg_len = raw_arg.len() + if is_slot { parts.modifiers.len() } else { 0 };
            let arg_start = advance_position_with_clone(&start, &name, start_offset);
            let arg_end = advance_position_with_clone(&start, &name, start_offset + arg_len);
            let arg_loc = self.cursor.selection(arg_start, Some(arg_end));

            let mut content = raw_arg.to_string();
            let mut is_static = true;

            if let Some(dynamic) = content.strip_prefix('[') {
                is_static = false;
                content = match dynamic.strip_suffix(']') {
                    Some(inner) => inner.to_string(),
                    None => {
                        self.emit_error(ErrorCodes::XMissingDynamicDirectiveArgumentEnd, 0)?;
                        dynamic.to_string()
                    }
                };
            } else if is_slot {
                // v-slot takes no modifiers, dots belong to the slot name
                content.push_str(parts.modifiers);
            }

            arg = Some(ExpressionNode::Simple(SimpleExpressionNode::new(
                content,
                Some(is_static),
                Some(arg_loc),
                Some(if is_static {
                    ConstantTypes::CanStringify
                } else {
                    ConstantTypes::NotConstant
                }),
            )));
        }

        let exp = value.map(|value| {
            let mut value_loc = value.loc;
            if value.is_quoted {
                value_loc.start.offset += 1;
                value_loc.start.column += 1;
                value_loc.end =
                    advance_position_with_clone(&value_loc.start, &value.content, value.content.len());
                value_loc.source = value_loc
                    .source
                    .get(1..value_loc.source.len().saturating_sub(1))
                    .unwrap_or_default()
                    .to_string();
            }
            SimpleExpressionNode::new(
                value.content,
                Some(false),
                Some(value_loc),
                Some(ConstantTypes::NotConstant),
            )
        });

        let mut modifiers: Vec<String> = match parts.modifiers.strip_prefix('.') {
            _ if dir_name == "slot" || parts.modifiers.is_empty() => Vec::new(),
            Some(list) => list.split('.').map(str::to_string).collect(),
            None => {
                // e.g. `@[name]x`, nothing legal follows a dynamic argument
                self.emit_error(ErrorCodes::XMissingDirectiveName, 0)?;
                Vec::new()
            }
        };
        if is_prop_shorthand {
            modifiers.push("prop".to_string());
        }

        let for_parse_result = match (&exp, dir_name.as_str()) {
            (Some(exp), "for") => self.parse_for_expression(exp),
            _ => None,
        };

        Ok(DirectiveNode {
            name: dir_name,
            raw_name: name,
            exp: exp.map(ExpressionNode::Simple),
            arg,
            modifiers,
            for_parse_result,
            loc,
        })
    }

    fn parse_attribute_value(&mut self) -> Result<Option<AttributeValue>, CompilerError> {
        let start = self.cursor.position();
        let quote = self.cursor.peek();
        let is_quoted = matches!(quote, Some('"' | '\''));

        let content = if let Some(quote @ ('"' | '\'')) = quote {
            // Quoted value.
            self.cursor.advance_by(1);
            match self.cursor.rest().find(quote) {
                None => self.parse_text_data(self.cursor.rest().len(), TextModes::Data, true),
                Some(end_index) => {
                    let content = self.parse_text_data(end_index, TextModes::Data, true);
                    self.cursor.advance_by(1);
                    content
                }
            }
        } else {
            // Unquoted
            let rest = self.cursor.rest();
            let len = rest
                .find(|c: char| is_whitespace(c) || c == '>')
                .unwrap_or(rest.len());
            if len == 0 {
                return Ok(None);
            }
            for (index, _) in rest[..len].match_indices(['"', '\'', '<', '=', '`']) {
                self.emit_error(ErrorCodes::UnexpectedCharacterInUnquotedAttributeValue, index)?;
            }
            self.parse_text_data(len, TextModes::Data, true)
        };

        Ok(Some(AttributeValue {
            content,
            is_quoted,
            loc: self.cursor.selection(start, None),
        }))
    }

    fn parse_interpolation(&mut self, mode: TextModes) -> Result<Node, CompilerError> {
        let (open, close) = self.options.delimiters.clone();
        let Some(close_index) = self.cursor.find_from(&close, open.len()) else {
            self.emit_error(ErrorCodes::XMissingInterpolationEnd, 0)?;
            // the rest of the input is plain text
            let start = self.cursor.position();
            let content = self.parse_text_data(self.cursor.rest().len(), mode, false);
            return Ok(Node::Text(TextNode::new(
                content,
                self.cursor.selection(start, None),
            )));
        };

        let start = self.cursor.position();
        self.cursor.advance_by(open.len());
        let mut inner_start = self.cursor.position();
        let mut inner_end = self.cursor.position();
        let raw_content_length = close_index - open.len();
        let raw_content = self.cursor.rest()[..raw_content_length].to_string();
        let pre_trim_content = self.parse_text_data(raw_content_length, mode, false);
        let content = pre_trim_content.trim_matches(is_whitespace).to_string();
        let start_offset = pre_trim_content.find(&content).unwrap_or(0);
        if start_offset > 0 {
            advance_position_with_mutation(&mut inner_start, &raw_content, start_offset);
        }
        let end_offset = raw_content_length
            .saturating_sub(pre_trim_content.len() - content.len() - start_offset);
        advance_position_with_mutation(&mut inner_end, &raw_content, end_offset);
        self.cursor.advance_by(close.len());

        let inner_loc = self.cursor.selection(inner_start, Some(inner_end));
        Ok(Node::Interpolation(InterpolationNode::new(
            ExpressionNode::Simple(SimpleExpressionNode::new(
                content,
                Some(false),
                Some(inner_loc),
                Some(ConstantTypes::NotConstant),
            )),
            self.cursor.selection(start, None),
        )))
    }

    fn parse_text(&mut self, mode: TextModes) -> Node {
        let end_tokens: Vec<&str> = if mode == TextModes::CData {
            vec!["]]>"]
        } else {
            vec!["<", self.options.delimiters.0.as_str()]
        };

        let rest = self.cursor.rest();
        let first_len = rest.chars().next().map(char::len_utf8).unwrap_or(1);
        let end_index = end_tokens
            .iter()
            .filter_map(|token| self.cursor.find_from(token, first_len))
            .min()
            .unwrap_or(rest.len());

        let start = self.cursor.position();
        let content = self.parse_text_data(end_index, mode, false);

        Node::Text(TextNode::new(content, self.cursor.selection(start, None)))
    }

    /// Get text data with a given length from the current location.
    /// This translates HTML entities in the text data.
    fn parse_text_data(&mut self, length: usize, mode: TextModes, in_attribute: bool) -> String {
        let raw_text = &self.cursor.rest()[..length];
        self.cursor.advance_by(length);
        if mode == TextModes::RawText || mode == TextModes::CData || !raw_text.contains('&') {
            raw_text.to_string()
        } else if in_attribute {
            htmlize::unescape_attribute(raw_text).into_owned()
        } else {
            htmlize::unescape(raw_text).into_owned()
        }
    }

    fn is_end(&self, mode: TextModes, ancestors: &[ElementNode]) -> bool {
        match mode {
            TextModes::Data => {
                if self.cursor.starts_with("</") {
                    if ancestors
                        .iter()
                        .rev()
                        .any(|a| self.starts_with_end_tag_open(&a.tag))
                    {
                        return true;
                    }
                }
            }
            TextModes::RcData | TextModes::RawText => {
                if let Some(parent) = ancestors.last()
                    && self.starts_with_end_tag_open(&parent.tag)
                {
                    return true;
                }
            }
            TextModes::CData => {
                if self.cursor.starts_with("]]>") {
                    return true;
                }
            }
        }
        self.cursor.is_eof()
    }

    fn starts_with_end_tag_open(&self, tag: &str) -> bool {
        let rest = self.cursor.rest().as_bytes();
        rest.starts_with(b"</")
            && rest.len() >= 2 + tag.len()
            && rest[2..2 + tag.len()].eq_ignore_ascii_case(tag.as_bytes())
            && rest
                .get(2 + tag.len())
                .is_none_or(|c| is_whitespace(*c as char) || *c == b'/' || *c == b'>')
    }

    fn create_alias_expression(
        &self,
        exp_loc: &SourceLocation,
        content: &str,
        offset: usize,
    ) -> ExpressionNode {
        let start = advance_position_with_clone(&exp_loc.start, &exp_loc.source, offset);
        let end = advance_position_with_clone(&start, content, content.len());
        ExpressionNode::Simple(SimpleExpressionNode::new(
            content,
            Some(false),
            Some(SourceLocation {
                start,
                end,
                source: content.to_string(),
            }),
            Some(ConstantTypes::NotConstant),
        ))
    }

    fn parse_for_expression(&self, input: &SimpleExpressionNode) -> Option<ForParseResult> {
        let loc = &input.loc;
        let exp = input.content.as_str();
        let (lhs, rhs) = match_for_alias(exp)?;

        let rhs_offset = exp[lhs.len()..]
            .find(rhs.as_str())
            .map(|i| i + lhs.len())
            .unwrap_or(0);
        let mut result = ForParseResult {
            source: self.create_alias_expression(loc, rhs.trim(), rhs_offset),
            value: None,
            key: None,
            index: None,
            finalized: false,
        };

        let trimmed = lhs.trim();
        let trimmed = trimmed.strip_prefix('(').unwrap_or(trimmed);
        let trimmed = trimmed.strip_suffix(')').unwrap_or(trimmed);
        let mut value_content = trimmed.trim().to_string();
        let trimmed_offset = lhs.find(value_content.as_str()).unwrap_or(0);

        if let Some((iterator_start, key, index)) = match_for_iterator(&value_content) {
            let key_content = key.trim().to_string();
            let index_content = index.map(|index| index.trim().to_string());
            value_content = value_content[..iterator_start].trim().to_string();

            let mut key_offset = 0;
            if !key_content.is_empty() {
                key_offset = find_from(exp, &key_content, trimmed_offset + value_content.len());
                result.key = Some(self.create_alias_expression(loc, &key_content, key_offset));
            }

            if let Some(index_content) = index_content
                && !index_content.is_empty()
            {
                let from = if result.key.is_some() {
                    key_offset + key_content.len()
                } else {
                    trimmed_offset + value_content.len()
                };
                let index_offset = find_from(exp, &index_content, from);
                result.index = Some(self.create_alias_expression(loc, &index_content, index_offset));
            }
        }

        if !value_content.is_empty() {
            result.value = Some(self.create_alias_expression(loc, &value_content, trimmed_offset));
        }

        Some(result)
    }
}

fn find_from(haystack: &str, needle: &str, from: usize) -> usize {
    haystack
        .get(from..)
        .and_then(|s| s.find(needle))
        .map(|i| i + from)
        .unwrap_or(0)
}

/// `--!>` or `-->`; returns the index and the length of the close sequence.
fn find_comment_close(source: &str) -> Option<(usize, usize)> {
    let index = source.find("--")?;
    let mut from = index;
    loop {
        let rest = &source[from..];
        if rest.starts_with("-->") {
            return Some((from, 3));
        }
        if rest.starts_with("--!>") {
            return Some((from, 4));
        }
        from += source[from + 1..].find("--")? + 1;
    }
}

/// `/,([^,\}\]]*)(?:,([^,\}\]]*))?$/` over the v-for left hand side. Returns the
/// match start, the key part and the optional index part.
fn match_for_iterator(s: &str) -> Option<(usize, &str, Option<&str>)> {
    let is_plain = |segment: &str| !segment.contains([',', '}', ']']);
    let last = s.rfind(',')?;
    if let Some(second_last) = s[..last].rfind(',') {
        let key = &s[second_last + 1..last];
        let index = &s[last + 1..];
        if is_plain(key) && is_plain(index) {
            return Some((second_last, key, Some(index)));
        }
    }
    let key = &s[last + 1..];
    is_plain(key).then_some((last, key, None))
}

fn is_directive_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(':' | '.' | '@' | '#') => true,
        Some('v') if chars.next() == Some('-') => {
            let rest = &name[2..];
            let len = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
                .unwrap_or(rest.len());
            len > 0 && (rest[len..].is_empty() || rest[len..].starts_with([':', '.']))
        }
        _ => false,
    }
}

struct DirectiveNameParts<'n> {
    name: Option<&'n str>,
    arg: Option<&'n str>,
    /// leading `.` included
    modifiers: &'n str,
}

/// `/(?:^v-([a-z0-9-]+))?(?:(?::|^\.|^@|^#)(\[[^\]]+\]|[^\.]+))?(.+)?$/i`
fn split_directive_name(raw: &str) -> DirectiveNameParts<'_> {
    let mut rest = raw;
    let mut name = None;
    if let Some(after) = raw.strip_prefix("v-") {
        let len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
            .unwrap_or(after.len());
        name = Some(&after[..len]);
        rest = &after[len..];
    }

    let arg_source = if name.is_some() {
        rest.strip_prefix(':')
    } else {
        rest.strip_prefix([':', '.', '@', '#'])
    };

    let mut arg = None;
    if let Some(arg_source) = arg_source {
        let dynamic_len = arg_source
            .strip_prefix('[')
            .and_then(|inner| inner.find(']').filter(|i| *i > 0).map(|i| i + 2));
        let len = dynamic_len.unwrap_or_else(|| arg_source.find('.').unwrap_or(arg_source.len()));
        if len > 0 {
            arg = Some(&arg_source[..len]);
            rest = &arg_source[len..];
        }
    }

    DirectiveNameParts {
        name,
        arg,
        modifiers: rest,
    }
}

/// Whitespace management over a finished child list. Running it again over
/// its own output changes nothing.
pub fn condense_whitespace(
    ast: &mut Ast,
    nodes: Vec<NodeId>,
    whitespace: WhitespaceStrategy,
    between_elements: BetweenElements,
) -> Vec<NodeId> {
    let should_condense = whitespace == WhitespaceStrategy::Condense;
    let mut kept = vec![true; nodes.len()];
    for (i, id) in nodes.iter().enumerate() {
        let Node::Text(node) = &ast[*id] else {
            continue;
        };
        if is_all_whitespace(&node.content) {
            let prev = i.checked_sub(1).map(|p| ast[nodes[p]].type_());
            let next = nodes.get(i + 1).map(|n| ast[*n].type_());
            let drop_between_elements = match between_elements {
                BetweenElements::WithNewline => has_newline_char(&node.content),
                BetweenElements::Always => true,
                BetweenElements::Never => false,
            };
            // Remove if:
            // - the whitespace is the first or last node, or:
            // - (condense mode) the whitespace is between two comments, or:
            // - (condense mode) the whitespace is between comment and element, or:
            // - (condense mode) the whitespace is between two elements AND contains newline
            let remove = match (prev, next) {
                (None, _) | (_, None) => true,
                (Some(prev), Some(next)) => {
                    should_condense
                        && ((prev == NodeTypes::Comment
                            && (next == NodeTypes::Comment || next == NodeTypes::Element))
                            || (prev == NodeTypes::Element
                                && (next == NodeTypes::Comment
                                    || (next == NodeTypes::Element && drop_between_elements))))
                }
            };
            if remove {
                kept[i] = false;
            } else if let Node::Text(node) = &mut ast[*id] {
                // Otherwise, the whitespace is condensed into a single space
                node.content = " ".to_string();
            }
        } else if should_condense {
            let condensed = condense(&node.content);
            if let Node::Text(node) = &mut ast[*id] {
                node.content = condensed;
            }
        }
    }

    nodes
        .into_iter()
        .zip(kept)
        .filter_map(|(id, kept)| kept.then_some(id))
        .collect()
}

/// In condense mode, consecutive whitespaces in text are condensed down to a
/// single space.
fn condense(s: &str) -> String {
    let mut ret = String::with_capacity(s.len());
    let mut prev_char_is_whitespace = false;
    for c in s.chars() {
        if is_whitespace(c) {
            if !prev_char_is_whitespace {
                ret.push(' ');
                prev_char_is_whitespace = true;
            }
        } else {
            ret.push(c);
            prev_char_is_whitespace = false;
        }
    }
    ret
}

pub fn base_parse(input: &str, options: Option<ParserOptions>) -> Result<Ast, CompilerError> {
    let options = options.unwrap_or_default();
    let mut context = ParserContext {
        options,
        cursor: Cursor::new(input),
        ast: Ast::new(RootNode::new(Vec::new(), Some(input.to_string()))),
        in_pre: false,
        in_v_pre: false,
    };

    let start = context.cursor.position();
    let children = context.parse_children(TextModes::Data, &mut Vec::new())?;
    let loc = context.cursor.selection(start, None);

    let ParserContext { mut ast, .. } = context;
    let root = ast.root_node_mut();
    root.children = children;
    root.loc = loc;

    tracing::debug!(nodes = ast.reachable_count(), "parse finished");
    Ok(ast)
}
