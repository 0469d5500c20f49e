//! Syntax tree of a parsed expression. Borrowed from the source text.

use std::fmt;

/// Right-hand side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue<'a> {
	Bool(bool),
	/// Quoted string or bare word (hex, address, symbol)
	Str(&'a str),
	/// Integer or decimal as written, optionally negative
	Number(&'a str),
}

impl LiteralValue<'_> {
	/// The literal as plain text, without quotes
	pub fn as_text(&self) -> &str {
		match self {
			LiteralValue::Bool(true) => "true",
			LiteralValue::Bool(false) => "false",
			LiteralValue::Str(s) | LiteralValue::Number(s) => s,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
	Eq,
	Ne,
	Gt,
	Gte,
	Lt,
	Lte,
	Contains,
	StartsWith,
	EndsWith,
}

impl ComparisonOperator {
	pub fn is_ordering(&self) -> bool {
		matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
	}
}

impl fmt::Display for ComparisonOperator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let symbol = match self {
			Self::Eq => "==",
			Self::Ne => "!=",
			Self::Gt => ">",
			Self::Gte => ">=",
			Self::Lt => "<",
			Self::Lte => "<=",
			Self::Contains => "contains",
			Self::StartsWith => "starts_with",
			Self::EndsWith => "ends_with",
		};
		f.write_str(symbol)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
	And,
	Or,
}

/// Step into a structured value
#[derive(Debug, Clone, PartialEq)]
pub enum Accessor<'a> {
	/// `[2]`
	Index(usize),
	/// `.field`
	Key(&'a str),
}

/// A parameter name followed by accessors, e.g. `order.items[0].price`
#[derive(Debug, Clone, PartialEq)]
pub struct VariablePath<'a> {
	pub base: &'a str,
	pub accessors: Vec<Accessor<'a>>,
}

impl fmt::Display for VariablePath<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.base)?;
		for accessor in &self.accessors {
			match accessor {
				Accessor::Index(i) => write!(f, "[{}]", i)?,
				Accessor::Key(k) => write!(f, ".{}", k)?,
			}
		}
		Ok(())
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition<'a> {
	pub left: VariablePath<'a>,
	pub operator: ComparisonOperator,
	pub right: LiteralValue<'a>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression<'a> {
	Condition(Condition<'a>),
	Logical {
		left: Box<Expression<'a>>,
		operator: LogicalOperator,
		right: Box<Expression<'a>>,
	},
}

impl<'a> Expression<'a> {
	/// Every variable referenced, left to right
	pub fn variables(&self) -> Vec<&VariablePath<'a>> {
		let mut found = Vec::new();
		self.collect_variables(&mut found);
		found
	}

	fn collect_variables<'s>(&'s self, found: &mut Vec<&'s VariablePath<'a>>) {
		match self {
			Expression::Condition(condition) => found.push(&condition.left),
			Expression::Logical { left, right, .. } => {
				left.collect_variables(found);
				right.collect_variables(found);
			}
		}
	}
}
