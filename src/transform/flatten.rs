//! Sequence flattening

use super::Pass;
use crate::error::IrResult;
use crate::ir::{post_order, IrNode, Node, Program, Statement};

/// Inline nested sequences.
///
/// `Sequence[a, Sequence[b, c], Sequence[]]` -> `Sequence[a, b, c]`, and a
/// sequence left with a single statement is replaced by that statement.
/// Empty sequences inside a `Parallel` are dropped.
pub struct FlattenSequences;

impl Pass for FlattenSequences {
    fn name(&self) -> &'static str {
        "flatten-sequences"
    }

    fn run(&mut self, program: &mut Program) -> IrResult<()> {
        program.apply(&mut post_order(flatten_node));
        Ok(())
    }
}

fn flatten_node(node: Node) -> Node {
    match node {
        Node::Statement(Statement::Sequence(statements)) => {
            let mut flat = Vec::with_capacity(statements.len());
            for statement in statements {
                match statement {
                    Statement::Sequence(inner) => flat.extend(inner),
                    other => flat.push(other),
                }
            }
            if flat.len() == 1 {
                Node::Statement(flat.remove(0))
            } else {
                Node::Statement(Statement::Sequence(flat))
            }
        }
        Node::Statement(Statement::Parallel(statements)) => Node::Statement(Statement::Parallel(
            statements
                .into_iter()
                .filter(|s| !matches!(s, Statement::Sequence(inner) if inner.is_empty()))
                .collect(),
        )),
        other => other,
    }
}
