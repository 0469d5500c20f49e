//! Expression parser built on `winnow`.
//!
//! ```text
//! expression := and_expr (("OR" | "||") and_expr)*
//! and_expr   := term (("AND" | "&&") term)*
//! term       := "(" expression ")" | condition
//! condition  := variable operator literal
//! variable   := ident ("." key | "[" index "]")*
//! literal    := quoted | true | false | number | bare_word
//! ```
//!
//! `AND` binds tighter than `OR`; keywords are case-insensitive.

use winnow::{
	ascii::{digit1, multispace0, multispace1, Caseless},
	combinator::{alt, delimited, not, opt, peek, preceded, repeat, terminated},
	prelude::*,
	token::{one_of, take_while},
	ModalResult,
};

use super::{
	ast::{
		Accessor, ComparisonOperator, Condition, Expression, LiteralValue, LogicalOperator,
		VariablePath,
	},
	error::EvaluationError,
};

/// Deepest parenthesis nesting accepted
pub const MAX_NESTING_DEPTH: usize = 64;

fn is_word_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}

fn ws<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
	multispace0.parse_next(input)
}

/// Succeeds when the next character cannot continue a word
fn word_boundary(input: &mut &str) -> ModalResult<()> {
	not(one_of(is_word_char)).parse_next(input)
}

fn identifier<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
	(
		one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
		take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
	)
		.take()
		.parse_next(input)
}

fn accessor<'i>(input: &mut &'i str) -> ModalResult<Accessor<'i>> {
	alt((
		preceded(
			'.',
			take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
		)
		.map(Accessor::Key),
		delimited('[', digit1.try_map(str::parse::<usize>), ']').map(Accessor::Index),
	))
	.parse_next(input)
}

fn variable<'i>(input: &mut &'i str) -> ModalResult<VariablePath<'i>> {
	(identifier, repeat(0.., accessor))
		.map(|(base, accessors): (&str, Vec<Accessor<'_>>)| VariablePath { base, accessors })
		.parse_next(input)
}

fn operator(input: &mut &str) -> ModalResult<ComparisonOperator> {
	alt((
		"==".value(ComparisonOperator::Eq),
		"!=".value(ComparisonOperator::Ne),
		">=".value(ComparisonOperator::Gte),
		"<=".value(ComparisonOperator::Lte),
		">".value(ComparisonOperator::Gt),
		"<".value(ComparisonOperator::Lt),
		terminated("contains", peek(multispace1)).value(ComparisonOperator::Contains),
		terminated("starts_with", peek(multispace1)).value(ComparisonOperator::StartsWith),
		terminated("ends_with", peek(multispace1)).value(ComparisonOperator::EndsWith),
	))
	.parse_next(input)
}

fn quoted<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
	alt((
		delimited('\'', take_while(0.., |c: char| c != '\''), '\''),
		delimited('"', take_while(0.., |c: char| c != '"'), '"'),
	))
	.parse_next(input)
}

fn boolean(input: &mut &str) -> ModalResult<bool> {
	terminated(
		alt((Caseless("true").value(true), Caseless("false").value(false))),
		word_boundary,
	)
	.parse_next(input)
}

fn number<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
	terminated(
		(opt('-'), digit1, opt(('.', digit1))).take(),
		word_boundary,
	)
	.parse_next(input)
}

fn bare_word<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
	take_while(1.., is_word_char).parse_next(input)
}

fn literal<'i>(input: &mut &'i str) -> ModalResult<LiteralValue<'i>> {
	alt((
		quoted.map(LiteralValue::Str),
		boolean.map(LiteralValue::Bool),
		number.map(LiteralValue::Number),
		bare_word.map(LiteralValue::Str),
	))
	.parse_next(input)
}

fn condition<'i>(input: &mut &'i str) -> ModalResult<Expression<'i>> {
	(variable, delimited(ws, operator, ws), literal)
		.map(|(left, operator, right)| {
			Expression::Condition(Condition {
				left,
				operator,
				right,
			})
		})
		.parse_next(input)
}

fn term<'i>(input: &mut &'i str) -> ModalResult<Expression<'i>> {
	alt((
		delimited(('(', ws), or_expression, (ws, ')')),
		condition,
	))
	.parse_next(input)
}

fn and_operator(input: &mut &str) -> ModalResult<()> {
	delimited(
		ws,
		alt((
			terminated(Caseless("and"), peek(alt((multispace1, "(")))).void(),
			"&&".void(),
		)),
		ws,
	)
	.parse_next(input)
}

fn or_operator(input: &mut &str) -> ModalResult<()> {
	delimited(
		ws,
		alt((
			terminated(Caseless("or"), peek(alt((multispace1, "(")))).void(),
			"||".void(),
		)),
		ws,
	)
	.parse_next(input)
}

fn fold_logical<'i>(
	first: Expression<'i>,
	rest: Vec<Expression<'i>>,
	operator: LogicalOperator,
) -> Expression<'i> {
	rest.into_iter().fold(first, |left, right| Expression::Logical {
		left: Box::new(left),
		operator,
		right: Box::new(right),
	})
}

fn and_expression<'i>(input: &mut &'i str) -> ModalResult<Expression<'i>> {
	let first = term.parse_next(input)?;
	let rest: Vec<Expression<'i>> = repeat(0.., preceded(and_operator, term)).parse_next(input)?;
	Ok(fold_logical(first, rest, LogicalOperator::And))
}

fn or_expression<'i>(input: &mut &'i str) -> ModalResult<Expression<'i>> {
	let first = and_expression.parse_next(input)?;
	let rest: Vec<Expression<'i>> =
		repeat(0.., preceded(or_operator, and_expression)).parse_next(input)?;
	Ok(fold_logical(first, rest, LogicalOperator::Or))
}

/// Parenthesis depth outside of quoted strings
fn nesting_depth(input: &str) -> usize {
	let mut depth = 0usize;
	let mut deepest = 0usize;
	let mut quote: Option<char> = None;

	for c in input.chars() {
		match (quote, c) {
			(Some(q), c) if c == q => quote = None,
			(Some(_), _) => {}
			(None, '\'' | '"') => quote = Some(c),
			(None, '(') => {
				depth += 1;
				deepest = deepest.max(depth);
			}
			(None, ')') => depth = depth.saturating_sub(1),
			_ => {}
		}
	}
	deepest
}

/// Parses a complete expression
pub fn parse(input: &str) -> Result<Expression<'_>, EvaluationError> {
	if nesting_depth(input) > MAX_NESTING_DEPTH {
		return Err(EvaluationError::parse_error(
			format!(
				"Expression nests parentheses deeper than {}",
				MAX_NESTING_DEPTH
			),
			None,
			None,
		));
	}

	delimited(ws, or_expression, ws)
		.parse(input)
		.map_err(|e| {
			EvaluationError::parse_error(
				format!("Invalid expression '{}': {}", input, e),
				None,
				None,
			)
		})
}
