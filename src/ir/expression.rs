//! Value expressions evaluated per tuple

use super::mapper::NodeMapper;
use super::node::{map_slots, IrNode, NodeKind, NodeRef};
use std::fmt;

/// Built-in operators over numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntrinsicOp {
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Min,
    Max,
}

impl IntrinsicOp {
    pub fn symbol(self) -> &'static str {
        match self {
            IntrinsicOp::Neg | IntrinsicOp::Sub => "-",
            IntrinsicOp::Add => "+",
            IntrinsicOp::Mul => "*",
            IntrinsicOp::Div => "/",
            IntrinsicOp::Mod => "%",
            IntrinsicOp::Min => "min",
            IntrinsicOp::Max => "max",
        }
    }

    fn is_infix(self) -> bool {
        matches!(
            self,
            IntrinsicOp::Add
                | IntrinsicOp::Sub
                | IntrinsicOp::Mul
                | IntrinsicOp::Div
                | IntrinsicOp::Mod
        )
    }

    /// Evaluate over constant arguments.
    ///
    /// Returns `None` for a wrong argument count or a zero divisor, which are
    /// left for the backend to report.
    pub fn evaluate(self, args: &[i64]) -> Option<i64> {
        match (self, args) {
            (IntrinsicOp::Neg, [x]) => Some(x.wrapping_neg()),
            (IntrinsicOp::Add, [a, b]) => Some(a.wrapping_add(*b)),
            (IntrinsicOp::Sub, [a, b]) => Some(a.wrapping_sub(*b)),
            (IntrinsicOp::Mul, [a, b]) => Some(a.wrapping_mul(*b)),
            (IntrinsicOp::Div, [a, b]) if *b != 0 => Some(a.wrapping_div(*b)),
            (IntrinsicOp::Mod, [a, b]) if *b != 0 => Some(a.wrapping_rem(*b)),
            (IntrinsicOp::Min, [first, rest @ ..]) => Some(rest.iter().fold(*first, |m, v| m.min(*v))),
            (IntrinsicOp::Max, [first, rest @ ..]) => Some(rest.iter().fold(*first, |m, v| m.max(*v))),
            _ => None,
        }
    }
}

/// Expression producing a single value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    /// Numeric constant
    Number(i64),
    /// Element `element` of the tuple bound at loop level `level`
    TupleElement { level: usize, element: usize },
    /// Built-in operator application
    Intrinsic { op: IntrinsicOp, args: Vec<Expression> },
    /// Argument passed to the enclosing subroutine
    SubroutineArgument(usize),
    /// Fresh counter value
    AutoIncrement,
}

impl Expression {
    pub fn tuple(level: usize, element: usize) -> Self {
        Expression::TupleElement { level, element }
    }

    pub fn binary(op: IntrinsicOp, lhs: Expression, rhs: Expression) -> Self {
        Expression::Intrinsic {
            op,
            args: vec![lhs, rhs],
        }
    }

    /// The value, if this is a constant
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Expression::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl IrNode for Expression {
    fn kind(&self) -> NodeKind {
        match self {
            Expression::Number(_) => NodeKind::Number,
            Expression::TupleElement { .. } => NodeKind::TupleElement,
            Expression::Intrinsic { .. } => NodeKind::Intrinsic,
            Expression::SubroutineArgument(_) => NodeKind::SubroutineArgument,
            Expression::AutoIncrement => NodeKind::AutoIncrement,
        }
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        match self {
            Expression::Intrinsic { args, .. } => args.iter().map(NodeRef::Expression).collect(),
            _ => Vec::new(),
        }
    }

    fn apply(&mut self, mapper: &mut dyn NodeMapper) {
        if let Expression::Intrinsic { args, .. } = self {
            map_slots(args, mapper);
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Number(n) => write!(f, "{n}"),
            Expression::TupleElement { level, element } => write!(f, "t{level}.{element}"),
            Expression::Intrinsic { op, args } => match args.as_slice() {
                [lhs, rhs] if op.is_infix() => write!(f, "({lhs} {} {rhs})", op.symbol()),
                [operand] if *op == IntrinsicOp::Neg => write!(f, "(-{operand})"),
                _ => write!(f, "{}({})", op.symbol(), join(args)),
            },
            Expression::SubroutineArgument(index) => write!(f, "argument({index})"),
            Expression::AutoIncrement => f.write_str("autoinc()"),
        }
    }
}

/// Comma-separate a list of expressions
pub(crate) fn join(values: &[Expression]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Comma-separate a list of partially defined values, `_` marking a hole
pub(crate) fn join_partial(values: &[Option<Expression>]) -> String {
    values
        .iter()
        .map(|v| v.as_ref().map_or_else(|| "_".to_string(), ToString::to_string))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate() {
        assert_eq!(IntrinsicOp::Add.evaluate(&[2, 3]), Some(5));
        assert_eq!(IntrinsicOp::Neg.evaluate(&[4]), Some(-4));
        assert_eq!(IntrinsicOp::Div.evaluate(&[7, 2]), Some(3));
        assert_eq!(IntrinsicOp::Div.evaluate(&[7, 0]), None);
        assert_eq!(IntrinsicOp::Mod.evaluate(&[7, 0]), None);
        assert_eq!(IntrinsicOp::Max.evaluate(&[1, 9, 4]), Some(9));
        assert_eq!(IntrinsicOp::Min.evaluate(&[]), None);
        assert_eq!(IntrinsicOp::Add.evaluate(&[1]), None);
        assert_eq!(IntrinsicOp::Add.evaluate(&[i64::MAX, 1]), Some(i64::MIN));
    }

    #[test]
    fn test_display() {
        let sum = Expression::binary(
            IntrinsicOp::Add,
            Expression::tuple(0, 1),
            Expression::Number(1),
        );
        assert_eq!(sum.to_string(), "(t0.1 + 1)");

        let neg = Expression::Intrinsic {
            op: IntrinsicOp::Neg,
            args: vec![Expression::SubroutineArgument(0)],
        };
        assert_eq!(neg.to_string(), "(-argument(0))");

        let max = Expression::Intrinsic {
            op: IntrinsicOp::Max,
            args: vec![Expression::Number(1), Expression::AutoIncrement],
        };
        assert_eq!(max.to_string(), "max(1, autoinc())");
    }

    #[test]
    fn test_children_are_arguments() {
        let sum = Expression::binary(
            IntrinsicOp::Mul,
            Expression::Number(2),
            Expression::tuple(1, 0),
        );
        let children = sum.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].kind(), NodeKind::Number);
        assert_eq!(children[1].kind(), NodeKind::TupleElement);
        assert!(Expression::AutoIncrement.children().is_empty());
    }
}
