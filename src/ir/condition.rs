//! Boolean conditions used by filters and loop exits

use super::expression::{join_partial, Expression};
use super::mapper::NodeMapper;
use super::node::{map_slot, IrNode, NodeKind, NodeRef};
use super::relation::RelationRef;
use std::fmt;

/// Binary comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ComparisonOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "!=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
        }
    }

    pub fn evaluate(self, lhs: i64, rhs: i64) -> bool {
        match self {
            ComparisonOp::Eq => lhs == rhs,
            ComparisonOp::Ne => lhs != rhs,
            ComparisonOp::Lt => lhs < rhs,
            ComparisonOp::Le => lhs <= rhs,
            ComparisonOp::Gt => lhs > rhs,
            ComparisonOp::Ge => lhs >= rhs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Condition {
    True,
    False,
    Conjunction(Box<Condition>, Box<Condition>),
    Negation(Box<Condition>),
    /// The relation holds no tuple
    Empty(RelationRef),
    /// Some tuple of the relation matches the defined values
    Exists {
        relation: RelationRef,
        values: Vec<Option<Expression>>,
    },
    Constraint {
        op: ComparisonOp,
        lhs: Expression,
        rhs: Expression,
    },
}

impl Condition {
    pub fn and(lhs: Condition, rhs: Condition) -> Self {
        Condition::Conjunction(Box::new(lhs), Box::new(rhs))
    }

    pub fn not(inner: Condition) -> Self {
        Condition::Negation(Box::new(inner))
    }

    pub fn compare(op: ComparisonOp, lhs: Expression, rhs: Expression) -> Self {
        Condition::Constraint { op, lhs, rhs }
    }
}

impl IrNode for Condition {
    fn kind(&self) -> NodeKind {
        match self {
            Condition::True => NodeKind::True,
            Condition::False => NodeKind::False,
            Condition::Conjunction(..) => NodeKind::Conjunction,
            Condition::Negation(_) => NodeKind::Negation,
            Condition::Empty(_) => NodeKind::EmptinessCheck,
            Condition::Exists { .. } => NodeKind::ExistenceCheck,
            Condition::Constraint { .. } => NodeKind::Constraint,
        }
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        match self {
            Condition::True | Condition::False => Vec::new(),
            Condition::Conjunction(lhs, rhs) => {
                vec![NodeRef::Condition(lhs), NodeRef::Condition(rhs)]
            }
            Condition::Negation(inner) => vec![NodeRef::Condition(inner)],
            Condition::Empty(relation) => vec![NodeRef::RelationRef(relation)],
            Condition::Exists { relation, values } => {
                let mut children = vec![NodeRef::RelationRef(relation)];
                children.extend(values.iter().flatten().map(NodeRef::Expression));
                children
            }
            Condition::Constraint { lhs, rhs, .. } => {
                vec![NodeRef::Expression(lhs), NodeRef::Expression(rhs)]
            }
        }
    }

    fn apply(&mut self, mapper: &mut dyn NodeMapper) {
        match self {
            Condition::True | Condition::False => {}
            Condition::Conjunction(lhs, rhs) => {
                map_slot(&mut **lhs, mapper);
                map_slot(&mut **rhs, mapper);
            }
            Condition::Negation(inner) => map_slot(&mut **inner, mapper),
            Condition::Empty(relation) => map_slot(relation, mapper),
            Condition::Exists { relation, values } => {
                map_slot(relation, mapper);
                for value in values.iter_mut().flatten() {
                    map_slot(value, mapper);
                }
            }
            Condition::Constraint { lhs, rhs, .. } => {
                map_slot(lhs, mapper);
                map_slot(rhs, mapper);
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::True => f.write_str("true"),
            Condition::False => f.write_str("false"),
            Condition::Conjunction(lhs, rhs) => write!(f, "({lhs} AND {rhs})"),
            Condition::Negation(inner) => write!(f, "(NOT {inner})"),
            Condition::Empty(relation) => write!(f, "ISEMPTY({relation})"),
            Condition::Exists { relation, values } => {
                write!(f, "({}) IN {relation}", join_partial(values))
            }
            Condition::Constraint { op, lhs, rhs } => write!(f, "({lhs} {} {rhs})", op.symbol()),
        }
    }
}
