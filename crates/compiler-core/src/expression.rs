//! JavaScript analysis of template expressions.
//!
//! The source is parsed with oxc and resolved with its semantic builder, so a
//! reference is local exactly when the expression itself declares the name
//! (arrow parameters, `let` inside a function body, catch clauses...).

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    AssignmentTargetPropertyIdentifier, CallExpression, ComputedMemberExpression, Expression,
    IdentifierReference, NewExpression, ObjectProperty, PrivateFieldExpression, Program,
    Statement, StaticMemberExpression,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser;
use oxc_semantic::{Scoping, SemanticBuilder};
use oxc_span::SourceType;

/// How a template source is wrapped before it is handed to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionKind {
    /// `{{ exp }}`, `:prop="exp"`, `v-if="exp"`
    Expression,
    /// `v-for` aliases and `v-slot` props, parsed as a parameter list
    Params,
    /// `@click="a(); b = 1"`
    Statements,
}

impl ExpressionKind {
    /// Every wrapper puts exactly one byte in front of the source.
    fn wrap(self, source: &str) -> String {
        match self {
            Self::Expression => format!("({source})"),
            Self::Params => format!("({source}) => {{}}"),
            Self::Statements => format!(" {source} "),
        }
    }
}

/// One identifier occurrence inside a scanned expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierRef {
    pub name: String,
    /// byte range inside the scanned source
    pub start: usize,
    pub end: usize,
    /// `{ foo }` object shorthand; rewriting needs to keep the key
    pub shorthand: bool,
    /// declared by a function inside the expression itself
    pub local: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScannedExpression {
    /// identifier references, in source order
    pub references: Vec<IdentifierRef>,
    /// names bound by a parameter list
    pub params: Vec<String>,
    /// calls a function or reads a member, so it can never be constant
    pub bail_constant: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ScanError(String);

pub fn scan(source: &str, kind: ExpressionKind) -> Result<ScannedExpression, ScanError> {
    let wrapped = kind.wrap(source);
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, &wrapped, SourceType::mjs()).parse();
    if let Some(err) = parsed.errors.first() {
        return Err(ScanError(err.to_string()));
    }
    let program = parsed.program;
    let semantic = SemanticBuilder::new().build(&program).semantic;

    let mut collector = ReferenceCollector {
        scoping: semantic.scoping(),
        shorthand: false,
        references: Vec::new(),
        bail_constant: false,
    };
    collector.visit_program(&program);

    let mut references: Vec<IdentifierRef> = collector
        .references
        .into_iter()
        .filter_map(|r| {
            let start = r.start.checked_sub(1)?;
            let end = r.end.checked_sub(1)?;
            (end <= source.len()).then_some(IdentifierRef { start, end, ..r })
        })
        .collect();
    references.sort_by_key(|r| r.start);

    let params = match kind {
        ExpressionKind::Params => declared_params(&program),
        _ => Vec::new(),
    };
    Ok(ScannedExpression {
        references,
        params,
        bail_constant: collector.bail_constant,
    })
}

fn declared_params(program: &Program) -> Vec<String> {
    let Some(Statement::ExpressionStatement(statement)) = program.body.first() else {
        return Vec::new();
    };
    let Expression::ArrowFunctionExpression(arrow) = &statement.expression else {
        return Vec::new();
    };
    arrow
        .params
        .iter_bindings()
        .flat_map(|pattern| pattern.get_binding_identifiers())
        .map(|id| id.name.to_string())
        .collect()
}

struct ReferenceCollector<'s> {
    scoping: &'s Scoping,
    shorthand: bool,
    references: Vec<IdentifierRef>,
    bail_constant: bool,
}

impl<'a> Visit<'a> for ReferenceCollector<'_> {
    fn visit_identifier_reference(&mut self, it: &IdentifierReference<'a>) {
        let local = it
            .reference_id
            .get()
            .is_some_and(|id| self.scoping.get_reference(id).symbol_id().is_some());
        self.references.push(IdentifierRef {
            name: it.name.to_string(),
            start: it.span.start as usize,
            end: it.span.end as usize,
            shorthand: std::mem::take(&mut self.shorthand),
            local,
        });
    }

    fn visit_object_property(&mut self, it: &ObjectProperty<'a>) {
        self.shorthand = it.shorthand;
        walk::walk_object_property(self, it);
        self.shorthand = false;
    }

    fn visit_assignment_target_property_identifier(
        &mut self,
        it: &AssignmentTargetPropertyIdentifier<'a>,
    ) {
        self.shorthand = true;
        walk::walk_assignment_target_property_identifier(self, it);
        self.shorthand = false;
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        self.bail_constant = true;
        walk::walk_call_expression(self, it);
    }

    fn visit_new_expression(&mut self, it: &NewExpression<'a>) {
        self.bail_constant = true;
        walk::walk_new_expression(self, it);
    }

    fn visit_static_member_expression(&mut self, it: &StaticMemberExpression<'a>) {
        self.bail_constant = true;
        walk::walk_static_member_expression(self, it);
    }

    fn visit_computed_member_expression(&mut self, it: &ComputedMemberExpression<'a>) {
        self.bail_constant = true;
        walk::walk_computed_member_expression(self, it);
    }

    fn visit_private_field_expression(&mut self, it: &PrivateFieldExpression<'a>) {
        self.bail_constant = true;
        walk::walk_private_field_expression(self, it);
    }
}
