//! Nested tuple operations forming the body of a query

use super::condition::Condition;
use super::expression::{join, join_partial, Expression};
use super::mapper::NodeMapper;
use super::node::{map_slot, map_slots, IrNode, NodeKind, NodeRef};
use super::relation::RelationRef;
use std::fmt::{self, Write};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Bind every tuple of `relation` at loop level `level`
    Scan {
        relation: RelationRef,
        level: usize,
        nested: Box<Operation>,
    },
    /// Run `nested` only when `condition` holds
    Filter {
        condition: Condition,
        nested: Box<Operation>,
    },
    /// Insert a tuple into `relation`
    Project {
        relation: RelationRef,
        values: Vec<Expression>,
    },
    /// Hand a tuple back to the subroutine caller
    Return(Vec<Option<Expression>>),
}

impl Operation {
    pub fn scan(relation: impl Into<String>, level: usize, nested: Operation) -> Self {
        Operation::Scan {
            relation: RelationRef::new(relation),
            level,
            nested: Box::new(nested),
        }
    }

    pub fn filter(condition: Condition, nested: Operation) -> Self {
        Operation::Filter {
            condition,
            nested: Box::new(nested),
        }
    }

    pub fn project(relation: impl Into<String>, values: Vec<Expression>) -> Self {
        Operation::Project {
            relation: RelationRef::new(relation),
            values,
        }
    }

    pub(crate) fn write_indented(&self, out: &mut dyn Write, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match self {
            Operation::Scan {
                relation,
                level,
                nested,
            } => {
                writeln!(out, "{prefix}FOR t{level} IN {relation}")?;
                nested.write_indented(out, indent + 1)
            }
            Operation::Filter { condition, nested } => {
                writeln!(out, "{prefix}IF {condition}")?;
                nested.write_indented(out, indent + 1)
            }
            Operation::Project { relation, values } => {
                write!(out, "{prefix}PROJECT ({}) INTO {relation}", join(values))
            }
            Operation::Return(values) => write!(out, "{prefix}RETURN ({})", join_partial(values)),
        }
    }
}

impl IrNode for Operation {
    fn kind(&self) -> NodeKind {
        match self {
            Operation::Scan { .. } => NodeKind::Scan,
            Operation::Filter { .. } => NodeKind::Filter,
            Operation::Project { .. } => NodeKind::Project,
            Operation::Return(_) => NodeKind::Return,
        }
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        match self {
            Operation::Scan {
                relation, nested, ..
            } => vec![NodeRef::RelationRef(relation), NodeRef::Operation(nested)],
            Operation::Filter { condition, nested } => {
                vec![NodeRef::Condition(condition), NodeRef::Operation(nested)]
            }
            Operation::Project { relation, values } => {
                let mut children = vec![NodeRef::RelationRef(relation)];
                children.extend(values.iter().map(NodeRef::Expression));
                children
            }
            Operation::Return(values) => values.iter().flatten().map(NodeRef::Expression).collect(),
        }
    }

    fn apply(&mut self, mapper: &mut dyn NodeMapper) {
        match self {
            Operation::Scan {
                relation, nested, ..
            } => {
                map_slot(relation, mapper);
                map_slot(&mut **nested, mapper);
            }
            Operation::Filter { condition, nested } => {
                map_slot(condition, mapper);
                map_slot(&mut **nested, mapper);
            }
            Operation::Project { relation, values } => {
                map_slot(relation, mapper);
                map_slots(values, mapper);
            }
            Operation::Return(values) => {
                for value in values.iter_mut().flatten() {
                    map_slot(value, mapper);
                }
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::condition::ComparisonOp;

    #[test]
    fn test_nested_display() {
        let op = Operation::scan(
            "edge",
            0,
            Operation::filter(
                Condition::compare(
                    ComparisonOp::Ne,
                    Expression::tuple(0, 0),
                    Expression::tuple(0, 1),
                ),
                Operation::project("path", vec![Expression::tuple(0, 0), Expression::tuple(0, 1)]),
            ),
        );
        assert_eq!(
            op.to_string(),
            "FOR t0 IN edge\n  IF (t0.0 != t0.1)\n    PROJECT (t0.0, t0.1) INTO path"
        );
    }

    #[test]
    fn test_return_display_marks_holes() {
        let op = Operation::Return(vec![Some(Expression::Number(1)), None]);
        assert_eq!(op.to_string(), "RETURN (1, _)");
    }

    #[test]
    fn test_children_order() {
        let op = Operation::scan("A", 0, Operation::project("B", vec![Expression::tuple(0, 0)]));
        let kinds: Vec<NodeKind> = op.children().into_iter().map(NodeRef::kind).collect();
        assert_eq!(kinds, vec![NodeKind::RelationRef, NodeKind::Project]);
    }
}
