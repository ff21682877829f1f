//! Relation renaming

use super::Pass;
use crate::error::{IrError, IrResult};
use crate::ir::{post_order, IrNode, Node, Program, RelationRef};
use std::collections::{BTreeMap, BTreeSet};

/// Rename relations together with every reference to them.
///
/// Renames are applied simultaneously, so `{A -> B, B -> A}` swaps two
/// relations. A source name the program does not declare is skipped.
#[derive(Debug, Clone, Default)]
pub struct RenameRelations {
    renames: BTreeMap<String, String>,
}

impl RenameRelations {
    pub fn new() -> Self {
        RenameRelations::default()
    }

    #[must_use]
    pub fn with(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.insert(from.into(), to.into());
        self
    }

    fn target<'a>(&'a self, name: &'a str) -> &'a str {
        self.renames.get(name).map_or(name, String::as_str)
    }

    /// Names the program would declare after renaming; rejects collisions
    fn check_targets(&self, program: &Program) -> IrResult<()> {
        let mut seen = BTreeSet::new();
        for relation in program.relations() {
            let target = self.target(relation.name());
            if !seen.insert(target) {
                return Err(IrError::DuplicateRelation(target.to_string()));
            }
        }
        Ok(())
    }
}

impl FromIterator<(String, String)> for RenameRelations {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        RenameRelations {
            renames: iter.into_iter().collect(),
        }
    }
}

impl Pass for RenameRelations {
    fn name(&self) -> &'static str {
        "rename-relations"
    }

    fn run(&mut self, program: &mut Program) -> IrResult<()> {
        for from in self.renames.keys() {
            if program.relation(from).is_none() {
                tracing::debug!(relation = %from, "rename_source_not_declared");
            }
        }
        self.check_targets(program)?;

        program.apply(&mut post_order(|node: Node| match node {
            Node::Relation(mut relation) => {
                let target = self.target(relation.name()).to_string();
                relation.set_name(target);
                Node::Relation(relation)
            }
            Node::RelationRef(reference) => {
                Node::RelationRef(RelationRef::new(self.target(reference.name())))
            }
            other => other,
        }));
        Ok(())
    }
}
