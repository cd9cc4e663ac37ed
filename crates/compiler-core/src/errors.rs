use crate::{ast::SourceLocation, options::ErrorHandlingOptions};
use std::cell::RefCell;

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct CompilerError {
    pub message: String,
    pub code: ErrorCodes,
    pub loc: Option<SourceLocation>,
}

impl PartialEq for CompilerError {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.loc == other.loc
    }
}

impl CompilerError {
    pub fn new(code: ErrorCodes, loc: Option<SourceLocation>) -> Self {
        Self {
            code,
            loc,
            message: code.message().to_string(),
        }
    }

    pub fn with_message(
        code: ErrorCodes,
        loc: Option<SourceLocation>,
        additional_message: impl AsRef<str>,
    ) -> Self {
        Self {
            code,
            loc,
            message: format!("{}{}", code.message(), additional_message.as_ref()),
        }
    }
}

/// Raises on the first error and logs warnings.
#[derive(Debug, Default)]
pub struct DefaultErrorHandlingOptions;

impl ErrorHandlingOptions for DefaultErrorHandlingOptions {}

/// Records every diagnostic and lets the compile run to the end.
#[derive(Debug, Default)]
pub struct CollectErrors {
    pub errors: RefCell<Vec<CompilerError>>,
    pub warnings: RefCell<Vec<CompilerError>>,
}

impl CollectErrors {
    pub fn codes(&self) -> Vec<ErrorCodes> {
        self.errors.borrow().iter().map(|e| e.code).collect()
    }

    pub fn take(&self) -> Vec<CompilerError> {
        self.errors.take()
    }
}

impl ErrorHandlingOptions for CollectErrors {
    fn on_error(&self, error: CompilerError) -> Result<(), CompilerError> {
        self.errors.borrow_mut().push(error);
        Ok(())
    }

    fn on_warn(&self, warning: CompilerError) {
        self.warnings.borrow_mut().push(warning);
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ErrorCodes {
    // parse errors
    AbruptClosingOfEmptyComment,
    CdataInHtmlContent,
    DuplicateAttribute,
    EndTagWithAttributes,
    EndTagWithTrailingSolidus,
    EOFBeforeTagName,
    EOFInCdata,
    EOFInComment,
    EOFInScriptHtmlCommentLikeText,
    EOFInTag,
    IncorrectlyClosedComment,
    IncorrectlyOpenedComment,
    InvalidFirstCharacterOfTagName,
    MissingAttributeValue,
    MissingEndTagName,
    MissingWhitespaceBetweenAttributes,
    NestedComment,
    UnexpectedCharacterInAttributeName,
    UnexpectedCharacterInUnquotedAttributeValue,
    UnexpectedEqualsSignBeforeAttributeName,
    UnexpectedNullCharacter,
    UnexpectedQuestionMarkInsteadOfTagName,
    UnexpectedSolidusInTag,

    // Vue-specific parse errors
    XInvalidEndTag,
    XMissingEndTag,
    XMissingInterpolationEnd,
    XMissingDirectiveName,
    XMissingDynamicDirectiveArgumentEnd,

    // transform errors
    XVIfNoExpression,
    XVIfSameKey,
    XVElseNoAdjacentIf,
    XVForNoExpression,
    XVForMalformedExpression,
    XVForTemplateKeyPlacement,
    XVBindNoExpression,
    XVOnNoExpression,
    XVSlotUnexpectedDirectiveOnSlotOutlet,
    XVSlotMixedSlotUsage,
    XVSlotDuplicateSlotNames,
    XVSlotExtraneousDefaultSlotChildren,
    XVSlotMisplaced,
    XVModelNoExpression,
    XVModelMalformedExpression,
    XVModelOnScopeVariable,
    XInvalidExpression,
    XKeepAliveInvalidChildren,
    XDuplicateStructuralDirective,

    // generic errors
    XPrefixIdNotSupported,
    XModuleModeNotSupported,
    XCacheHandlerNotSupported,
    XVnodeHooks,
    XVBindInvalidSameNameArgument,

    // DOM errors
    XVHtmlNoExpression,
    XVHtmlWithChildren,
    XVTextNoExpression,
    XVTextWithChildren,
    XVShowNoExpression,
    XIgnoredSideEffectTag,
}

impl ErrorCodes {
    pub fn message(&self) -> &'static str {
        match self {
            // parse errors
            Self::AbruptClosingOfEmptyComment => "Illegal comment.",
            Self::CdataInHtmlContent => "CDATA section is allowed only in XML context.",
            Self::DuplicateAttribute => "Duplicate attribute.",
            Self::EndTagWithAttributes => "End tag cannot have attributes.",
            Self::EndTagWithTrailingSolidus => r#"Illegal "/" in tags."#,
            Self::EOFBeforeTagName => "Unexpected EOF in tag.",
            Self::EOFInCdata => "Unexpected EOF in CDATA section.",
            Self::EOFInComment => "Unexpected EOF in comment.",
            Self::EOFInScriptHtmlCommentLikeText => "Unexpected EOF in script.",
            Self::EOFInTag => "Unexpected EOF in tag.",
            Self::IncorrectlyClosedComment => "Incorrectly closed comment.",
            Self::IncorrectlyOpenedComment => "Incorrectly opened comment.",
            Self::InvalidFirstCharacterOfTagName => "Illegal tag name. Use '&lt;' to print '<'.",
            Self::MissingAttributeValue => "Attribute value was expected.",
            Self::MissingEndTagName => "End tag name was expected.",
            Self::MissingWhitespaceBetweenAttributes => "Whitespace was expected.",
            Self::NestedComment => "Unexpected '<!--' in comment.",
            Self::UnexpectedCharacterInAttributeName => {
                r#"Attribute name cannot contain U+0022 ("), U+0027 ('), and U+003C (<)."#
            }
            Self::UnexpectedCharacterInUnquotedAttributeValue => {
                r#"Unquoted attribute value cannot contain U+0022 ("), U+0027 ('), U+003C (<), U+003D (=), and U+0060 (`)."#
            }
            Self::UnexpectedEqualsSignBeforeAttributeName => {
                "Attribute name cannot start with '='."
            }
            Self::UnexpectedNullCharacter => "Unexpected null character.",
            Self::UnexpectedQuestionMarkInsteadOfTagName => "'<?' is allowed only in XML context.",
            Self::UnexpectedSolidusInTag => r#"Illegal "/" in tags."#,

            // Vue-specific parse errors
            Self::XInvalidEndTag => "Invalid end tag.",
            Self::XMissingEndTag => "Element is missing end tag.",
            Self::XMissingInterpolationEnd => "Interpolation end sign was not found.",
            Self::XMissingDirectiveName => "Legal directive name was expected.",
            Self::XMissingDynamicDirectiveArgumentEnd => {
                "End bracket for dynamic directive argument was not found. Note that dynamic directive argument cannot contain spaces."
            }

            // transform errors
            Self::XVIfNoExpression => "v-if/v-else-if is missing expression.",
            Self::XVIfSameKey => "v-if/else branches must use unique keys.",
            Self::XVElseNoAdjacentIf => "v-else/v-else-if has no adjacent v-if or v-else-if.",
            Self::XVForNoExpression => "v-for is missing expression.",
            Self::XVForMalformedExpression => "v-for has invalid expression.",
            Self::XVForTemplateKeyPlacement => {
                "<template v-for> key should be placed on the <template> tag."
            }
            Self::XVBindNoExpression => "v-bind is missing expression.",
            Self::XVOnNoExpression => "v-on is missing expression.",
            Self::XVSlotUnexpectedDirectiveOnSlotOutlet => {
                "Unexpected custom directive on <slot> outlet."
            }
            Self::XVSlotMixedSlotUsage => {
                "Mixed v-slot usage on both the component and nested <template>. When there are multiple named slots, all slots should use <template> syntax to avoid scope ambiguity."
            }
            Self::XVSlotDuplicateSlotNames => "Duplicate slot names found. ",
            Self::XVSlotExtraneousDefaultSlotChildren => {
                "Extraneous children found when component already has explicitly named default slot. These children will be ignored."
            }
            Self::XVSlotMisplaced => "v-slot can only be used on components or <template> tags.",
            Self::XVModelNoExpression => "v-model is missing expression.",
            Self::XVModelMalformedExpression => {
                "v-model value must be a valid JavaScript member expression."
            }
            Self::XVModelOnScopeVariable => {
                "v-model cannot be used on v-for or v-slot scope variables because they are not writable."
            }
            Self::XInvalidExpression => "Error parsing JavaScript expression: ",
            Self::XKeepAliveInvalidChildren => "<KeepAlive> expects exactly one child component.",
            Self::XDuplicateStructuralDirective => {
                "Element carries the same structural directive more than once; only the first is applied."
            }

            // generic errors
            Self::XPrefixIdNotSupported => {
                r#""prefixIdentifiers" option is not supported in this build of compiler."#
            }
            Self::XModuleModeNotSupported => "ES module mode is not supported in this build of compiler.",
            Self::XCacheHandlerNotSupported => {
                r#""cacheHandlers" option is only supported when the "prefixIdentifiers" option is enabled."#
            }
            Self::XVnodeHooks => "@vnode-* hooks in templates are no longer supported. Use the vue: prefix instead. For example, @vnode-mounted should be changed to @vue:mounted. @vnode-* hooks support has been removed in 3.4.",
            Self::XVBindInvalidSameNameArgument => {
                "v-bind with same-name shorthand only allows static argument."
            }

            // DOM errors
            Self::XVHtmlNoExpression => "v-html is missing expression.",
            Self::XVHtmlWithChildren => "v-html will override element children.",
            Self::XVTextNoExpression => "v-text is missing expression.",
            Self::XVTextWithChildren => "v-text will override element children.",
            Self::XVShowNoExpression => "v-show is missing expression.",
            Self::XIgnoredSideEffectTag => {
                "Tags with side effect (<script> and <style>) are ignored in client component templates."
            }
        }
    }
}
