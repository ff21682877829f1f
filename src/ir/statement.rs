//! Statements: the control structure of a RAM program

use super::condition::Condition;
use super::mapper::NodeMapper;
use super::node::{map_slot, map_slots, IrNode, NodeKind, NodeRef};
use super::operation::Operation;
use super::relation::RelationRef;
use std::collections::BTreeMap;
use std::fmt::{self, Write};

/// IO directives of a load or store, e.g. `IO=file`, `filename=edge.facts`
pub type Directives = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Statement {
    /// Run statements one after another
    Sequence(Vec<Statement>),
    /// Statements with no ordering constraint between them
    Parallel(Vec<Statement>),
    /// Repeat the body until an `Exit` fires
    Loop(Box<Statement>),
    /// Leave the innermost loop when the condition holds
    Exit(Condition),
    Query(Operation),
    /// Remove every tuple of the relation
    Clear(RelationRef),
    /// Release the relation's storage
    Drop(RelationRef),
    /// Insert all tuples of `source` into `target`
    Merge {
        target: RelationRef,
        source: RelationRef,
    },
    /// Exchange the contents of two relations
    Swap(RelationRef, RelationRef),
    LogSize {
        relation: RelationRef,
        message: String,
    },
    Load {
        relation: RelationRef,
        directives: Directives,
    },
    Store {
        relation: RelationRef,
        directives: Directives,
    },
}

impl Statement {
    pub fn sequence(statements: impl IntoIterator<Item = Statement>) -> Self {
        Statement::Sequence(statements.into_iter().collect())
    }

    pub fn parallel(statements: impl IntoIterator<Item = Statement>) -> Self {
        Statement::Parallel(statements.into_iter().collect())
    }

    pub fn repeat(body: Statement) -> Self {
        Statement::Loop(Box::new(body))
    }

    pub fn clear(relation: impl Into<String>) -> Self {
        Statement::Clear(RelationRef::new(relation))
    }

    pub fn merge(target: impl Into<String>, source: impl Into<String>) -> Self {
        Statement::Merge {
            target: RelationRef::new(target),
            source: RelationRef::new(source),
        }
    }

    pub fn swap(first: impl Into<String>, second: impl Into<String>) -> Self {
        Statement::Swap(RelationRef::new(first), RelationRef::new(second))
    }

    pub(crate) fn write_indented(&self, out: &mut dyn Write, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match self {
            Statement::Sequence(statements) => {
                for (i, statement) in statements.iter().enumerate() {
                    if i > 0 {
                        out.write_char('\n')?;
                    }
                    statement.write_indented(out, indent)?;
                }
                Ok(())
            }
            Statement::Parallel(statements) => {
                write!(out, "{prefix}PARALLEL")?;
                for statement in statements {
                    out.write_char('\n')?;
                    statement.write_indented(out, indent + 1)?;
                }
                write!(out, "\n{prefix}END PARALLEL")
            }
            Statement::Loop(body) => {
                writeln!(out, "{prefix}LOOP")?;
                body.write_indented(out, indent + 1)?;
                write!(out, "\n{prefix}END LOOP")
            }
            Statement::Exit(condition) => write!(out, "{prefix}EXIT {condition}"),
            Statement::Query(operation) => {
                writeln!(out, "{prefix}QUERY")?;
                operation.write_indented(out, indent + 1)?;
                write!(out, "\n{prefix}END QUERY")
            }
            Statement::Clear(relation) => write!(out, "{prefix}CLEAR {relation}"),
            Statement::Drop(relation) => write!(out, "{prefix}DROP {relation}"),
            Statement::Merge { target, source } => {
                write!(out, "{prefix}MERGE {target} WITH {source}")
            }
            Statement::Swap(first, second) => write!(out, "{prefix}SWAP ({first}, {second})"),
            Statement::LogSize { relation, message } => {
                write!(out, "{prefix}LOGSIZE {relation} TEXT {message:?}")
            }
            Statement::Load {
                relation,
                directives,
            } => write!(
                out,
                "{prefix}LOAD DATA FOR {relation} FROM {}",
                format_directives(directives)
            ),
            Statement::Store {
                relation,
                directives,
            } => write!(
                out,
                "{prefix}STORE DATA FOR {relation} TO {}",
                format_directives(directives)
            ),
        }
    }
}

fn format_directives(directives: &Directives) -> String {
    let pairs: Vec<String> = directives
        .iter()
        .map(|(key, value)| format!("{key}={value:?}"))
        .collect();
    format!("{{{}}}", pairs.join(","))
}

impl IrNode for Statement {
    fn kind(&self) -> NodeKind {
        match self {
            Statement::Sequence(_) => NodeKind::Sequence,
            Statement::Parallel(_) => NodeKind::Parallel,
            Statement::Loop(_) => NodeKind::Loop,
            Statement::Exit(_) => NodeKind::Exit,
            Statement::Query(_) => NodeKind::Query,
            Statement::Clear(_) => NodeKind::Clear,
            Statement::Drop(_) => NodeKind::Drop,
            Statement::Merge { .. } => NodeKind::Merge,
            Statement::Swap(..) => NodeKind::Swap,
            Statement::LogSize { .. } => NodeKind::LogSize,
            Statement::Load { .. } => NodeKind::Load,
            Statement::Store { .. } => NodeKind::Store,
        }
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        match self {
            Statement::Sequence(statements) | Statement::Parallel(statements) => {
                statements.iter().map(NodeRef::Statement).collect()
            }
            Statement::Loop(body) => vec![NodeRef::Statement(body)],
            Statement::Exit(condition) => vec![NodeRef::Condition(condition)],
            Statement::Query(operation) => vec![NodeRef::Operation(operation)],
            Statement::Clear(relation)
            | Statement::Drop(relation)
            | Statement::LogSize { relation, .. }
            | Statement::Load { relation, .. }
            | Statement::Store { relation, .. } => vec![NodeRef::RelationRef(relation)],
            Statement::Merge { target, source } => {
                vec![NodeRef::RelationRef(target), NodeRef::RelationRef(source)]
            }
            Statement::Swap(first, second) => {
                vec![NodeRef::RelationRef(first), NodeRef::RelationRef(second)]
            }
        }
    }

    fn apply(&mut self, mapper: &mut dyn NodeMapper) {
        match self {
            Statement::Sequence(statements) | Statement::Parallel(statements) => {
                map_slots(statements, mapper);
            }
            Statement::Loop(body) => map_slot(&mut **body, mapper),
            Statement::Exit(condition) => map_slot(condition, mapper),
            Statement::Query(operation) => map_slot(operation, mapper),
            Statement::Clear(relation)
            | Statement::Drop(relation)
            | Statement::LogSize { relation, .. }
            | Statement::Load { relation, .. }
            | Statement::Store { relation, .. } => map_slot(relation, mapper),
            Statement::Merge { target, source } => {
                map_slot(target, mapper);
                map_slot(source, mapper);
            }
            Statement::Swap(first, second) => {
                map_slot(first, mapper);
                map_slot(second, mapper);
            }
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::expression::Expression;

    fn semi_naive_loop() -> Statement {
        Statement::repeat(Statement::sequence([
            Statement::Query(Operation::scan(
                "delta_path",
                0,
                Operation::project("new_path", vec![Expression::tuple(0, 0), Expression::tuple(0, 1)]),
            )),
            Statement::Exit(Condition::Empty(RelationRef::new("new_path"))),
            Statement::merge("path", "new_path"),
            Statement::swap("delta_path", "new_path"),
            Statement::clear("new_path"),
        ]))
    }

    #[test]
    fn test_loop_display() {
        let expected = "LOOP\n  QUERY\n    FOR t0 IN delta_path\n      PROJECT (t0.0, t0.1) INTO new_path\n  END QUERY\n  EXIT ISEMPTY(new_path)\n  MERGE path WITH new_path\n  SWAP (delta_path, new_path)\n  CLEAR new_path\nEND LOOP";
        assert_eq!(semi_naive_loop().to_string(), expected);
    }

    #[test]
    fn test_io_display() {
        let mut directives = Directives::new();
        directives.insert("IO".to_string(), "file".to_string());
        directives.insert("filename".to_string(), "edge.facts".to_string());
        let load = Statement::Load {
            relation: RelationRef::new("edge"),
            directives,
        };
        assert_eq!(
            load.to_string(),
            "LOAD DATA FOR edge FROM {IO=\"file\",filename=\"edge.facts\"}"
        );

        let log = Statement::LogSize {
            relation: RelationRef::new("path"),
            message: "path size".to_string(),
        };
        assert_eq!(log.to_string(), "LOGSIZE path TEXT \"path size\"");
    }

    #[test]
    fn test_parallel_display() {
        let par = Statement::parallel([Statement::clear("A"), Statement::clear("B")]);
        assert_eq!(par.to_string(), "PARALLEL\n  CLEAR A\n  CLEAR B\nEND PARALLEL");
        assert_eq!(
            Statement::parallel([]).to_string(),
            "PARALLEL\nEND PARALLEL"
        );
    }

    #[test]
    fn test_children_one_level_only() {
        let stmt = semi_naive_loop();
        let children = stmt.children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].kind(), NodeKind::Sequence);
        assert_eq!(children[0].children().len(), 5);
    }

    #[test]
    fn test_clone_is_deep_and_equal() {
        let original = semi_naive_loop();
        let mut copy = original.clone();
        assert_eq!(copy, original);
        if let Statement::Loop(body) = &mut copy {
            **body = Statement::clear("other");
        }
        assert_ne!(copy, original);
    }
}
