//! # RAM Program
//!
//! Top-level container of a compiled program: the declared relations, the
//! main statement and the named subroutines used to query computed
//! relations.
//!
//! Relations live in an arena keyed by name. Statement trees only hold
//! [`RelationRef`]s, resolved through the program that owns the tree, so a
//! reference can never keep a relation alive or point into another program.
//!
//! ## Dump format
//! ```text
//! PROGRAM
//! DECLARATION
//!     A(c0:i:number,c1:i:number)
//! END DECLARATION
//! <main>
//!
//! SUBROUTINE sub0
//! <body>
//! END SUBROUTINE
//! END PROGRAM
//! ```

use super::mapper::{post_order, NodeMapper};
use super::node::{map_slot, IrNode, Node, NodeKind, NodeRef};
use super::relation::{Relation, RelationRef};
use super::statement::Statement;
use super::walk::{collect_references, NodePath};
use crate::error::{IrError, IrResult};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

#[derive(Debug, Default)]
pub struct Program {
    /// Declared relations, by name
    relations: BTreeMap<String, Relation>,

    /// Entry point
    main: Option<Statement>,

    /// Subroutines for querying computed relations, by name
    subroutines: BTreeMap<String, Statement>,
}

impl Program {
    /// Create an empty program without a main statement
    pub fn new() -> Self {
        Program::default()
    }

    pub fn with_main(main: Statement) -> Self {
        Program {
            main: Some(main),
            ..Program::default()
        }
    }

    pub fn set_main(&mut self, main: Statement) {
        self.main = Some(main);
    }

    /// The main statement.
    ///
    /// # Panics
    ///
    /// If no main statement was set: reading it early is a bug in the pass.
    pub fn main(&self) -> &Statement {
        match &self.main {
            Some(main) => main,
            None => panic!("{}", IrError::MissingMain),
        }
    }

    /// The main statement, if set
    pub fn try_main(&self) -> Option<&Statement> {
        self.main.as_ref()
    }

    /// Declare a relation. A name already in use is rejected.
    pub fn add_relation(&mut self, relation: Relation) -> IrResult<()> {
        if self.relations.contains_key(relation.name()) {
            return Err(IrError::DuplicateRelation(relation.name().to_string()));
        }
        self.relations.insert(relation.name().to_string(), relation);
        Ok(())
    }

    /// Declare a relation, replacing any relation of the same name.
    ///
    /// Returns the replaced relation so the caller can check compatibility.
    pub fn replace_relation(&mut self, relation: Relation) -> Option<Relation> {
        let previous = self.relations.insert(relation.name().to_string(), relation);
        if let Some(old) = &previous {
            tracing::debug!(relation = old.name(), "relation_replaced");
        }
        previous
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    /// Declared relations in name order
    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.values()
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    /// Register a subroutine. A name already in use is rejected.
    pub fn add_subroutine(&mut self, name: impl Into<String>, body: Statement) -> IrResult<()> {
        let name = name.into();
        if self.has_subroutine(&name) {
            return Err(IrError::DuplicateSubroutine(name));
        }
        self.subroutines.insert(name, body);
        Ok(())
    }

    /// Body of the named subroutine.
    ///
    /// # Panics
    ///
    /// If no such subroutine exists. Subroutine names are generated by the
    /// compiler, so asking for a missing one is a bug in the caller.
    pub fn subroutine(&self, name: &str) -> &Statement {
        match self.subroutines.get(name) {
            Some(body) => body,
            None => panic!("{}", IrError::UnknownSubroutine(name.to_string())),
        }
    }

    pub fn has_subroutine(&self, name: &str) -> bool {
        self.subroutines.contains_key(name)
    }

    /// Subroutines in name order
    pub fn subroutines(&self) -> impl Iterator<Item = (&str, &Statement)> {
        self.subroutines
            .iter()
            .map(|(name, body)| (name.as_str(), body))
    }

    pub fn subroutine_count(&self) -> usize {
        self.subroutines.len()
    }

    /// The relation a reference points at, looked up in this program
    pub fn resolve(&self, reference: &RelationRef) -> IrResult<&Relation> {
        self.relations.get(reference.name()).ok_or_else(|| IrError::DanglingReference {
            relation: reference.name().to_string(),
            location: self
                .locate_reference(reference.name())
                .map_or_else(|| "<detached>".to_string(), |path| path.to_string()),
        })
    }

    /// Every relation reference in main and the subroutines, with its location
    pub fn relation_references(&self) -> Vec<(NodePath, &RelationRef)> {
        collect_references(NodeRef::Program(self))
    }

    /// Check that every reference resolves in this program
    pub fn verify(&self) -> IrResult<()> {
        for (path, reference) in self.relation_references() {
            if !self.relations.contains_key(reference.name()) {
                return Err(IrError::DanglingReference {
                    relation: reference.name().to_string(),
                    location: path.to_string(),
                });
            }
        }
        Ok(())
    }

    fn locate_reference(&self, name: &str) -> Option<NodePath> {
        self.relation_references()
            .into_iter()
            .find(|(_, reference)| reference.name() == name)
            .map(|(path, _)| path)
    }

    /// Deep copy with every relation reference re-indexed into the copy.
    ///
    /// Main, relations and subroutines are cloned independently first; a
    /// single rewrite over the copy then replaces each reference through the
    /// old-to-new relation map. A reference with no entry in the map was not
    /// owned by this program and is reported as dangling.
    pub fn try_clone(&self) -> IrResult<Program> {
        let mut copy = Program {
            relations: BTreeMap::new(),
            main: self.main.clone(),
            subroutines: BTreeMap::new(),
        };

        let mut targets: HashMap<&str, String> = HashMap::with_capacity(self.relations.len());
        for (name, relation) in &self.relations {
            let cloned = relation.clone();
            targets.insert(name.as_str(), cloned.name().to_string());
            copy.relations.insert(cloned.name().to_string(), cloned);
        }

        for (name, body) in &self.subroutines {
            copy.subroutines.insert(name.clone(), body.clone());
        }

        let mut dangling: Option<String> = None;
        copy.apply(&mut post_order(|node: Node| match node {
            Node::RelationRef(reference) => match targets.get(reference.name()) {
                Some(target) => Node::RelationRef(RelationRef::new(target.clone())),
                None => {
                    dangling.get_or_insert_with(|| reference.name().to_string());
                    Node::RelationRef(reference)
                }
            },
            other => other,
        }));

        if let Some(relation) = dangling {
            let location = self
                .locate_reference(&relation)
                .map_or_else(|| "<unknown>".to_string(), |path| path.to_string());
            tracing::error!(relation = %relation, location = %location, "dangling_relation_reference");
            return Err(IrError::DanglingReference { relation, location });
        }

        tracing::trace!(
            relations = copy.relations.len(),
            subroutines = copy.subroutines.len(),
            "program_cloned"
        );
        Ok(copy)
    }

    /// Re-key relations the mapper renamed under their new names.
    ///
    /// # Panics
    ///
    /// If two relations now share a name. Every rename is rolled back first,
    /// so the arena is left complete and keyed by the previous names.
    fn rekey_relations(&mut self) {
        let mut seen = HashSet::with_capacity(self.relations.len());
        let collision = self
            .relations
            .values()
            .map(Relation::name)
            .find(|name| !seen.insert(*name))
            .map(str::to_string);

        if let Some(name) = collision {
            for (key, relation) in &mut self.relations {
                if relation.name() != key {
                    relation.set_name(key.clone());
                }
            }
            panic!("{}", IrError::DuplicateRelation(name));
        }

        if self.relations.iter().all(|(key, r)| r.name() == key) {
            return;
        }
        self.relations = std::mem::take(&mut self.relations)
            .into_iter()
            .map(|(key, relation)| {
                if relation.name() != key {
                    tracing::debug!(from = %key, to = relation.name(), "relation_renamed");
                }
                (relation.name().to_string(), relation)
            })
            .collect();
    }

    /// Field-wise copy that keeps references as they are, dangling or not.
    ///
    /// Only for comparing against later; references are names, so the copy
    /// compares equal to `self` without any re-indexing.
    pub(crate) fn snapshot(&self) -> Program {
        Program {
            relations: self.relations.clone(),
            main: self.main.clone(),
            subroutines: self.subroutines.clone(),
        }
    }
}

impl Clone for Program {
    /// # Panics
    ///
    /// On a dangling relation reference, see [`Program::try_clone`].
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(err) => panic!("{err}"),
        }
    }
}

impl IrNode for Program {
    fn kind(&self) -> NodeKind {
        NodeKind::Program
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        let mut children: Vec<NodeRef<'_>> = self.relations.values().map(NodeRef::Relation).collect();
        if let Some(main) = &self.main {
            children.push(NodeRef::Statement(main));
        }
        children.extend(self.subroutines.values().map(NodeRef::Statement));
        children
    }

    /// Map main, every relation and every subroutine body in place.
    ///
    /// A relation the mapper renames is re-keyed under its new name.
    ///
    /// # Panics
    ///
    /// If two relations end up with the same name. The relations are then
    /// all still declared under their previous names.
    fn apply(&mut self, mapper: &mut dyn NodeMapper) {
        if let Some(main) = &mut self.main {
            map_slot(main, mapper);
        }

        for relation in self.relations.values_mut() {
            map_slot(relation, mapper);
        }
        self.rekey_relations();

        for body in self.subroutines.values_mut() {
            map_slot(body, mapper);
        }
    }
}

impl PartialEq for Program {
    fn eq(&self, other: &Self) -> bool {
        if self.relations.len() != other.relations.len()
            || self.subroutines.len() != other.subroutines.len()
        {
            return false;
        }
        for (name, body) in &self.subroutines {
            if other.subroutines.get(name) != Some(body) {
                return false;
            }
        }
        for (name, relation) in &self.relations {
            if other.relations.get(name) != Some(relation) {
                return false;
            }
        }
        self.main == other.main
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PROGRAM")?;
        writeln!(f, "DECLARATION")?;
        for relation in self.relations.values() {
            writeln!(f, "\t{relation}")?;
        }
        writeln!(f, "END DECLARATION")?;
        if let Some(main) = &self.main {
            write!(f, "{main}")?;
        }
        writeln!(f)?;
        for (name, body) in &self.subroutines {
            writeln!(f)?;
            writeln!(f, "SUBROUTINE {name}")?;
            writeln!(f, "{body}")?;
            writeln!(f, "END SUBROUTINE")?;
        }
        writeln!(f, "END PROGRAM")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Expression, Operation};

    fn transitive_closure() -> Program {
        let mut program = Program::with_main(Statement::sequence([
            Statement::Query(Operation::scan(
                "edge",
                0,
                Operation::project("path", vec![Expression::tuple(0, 0), Expression::tuple(0, 1)]),
            )),
            Statement::merge("delta_path", "path"),
        ]));
        program.add_relation(Relation::with_arity("edge", 2)).unwrap();
        program.add_relation(Relation::with_arity("path", 2)).unwrap();
        program.add_relation(Relation::with_arity("delta_path", 2)).unwrap();
        program
    }

    #[test]
    fn test_add_relation_rejects_duplicate() {
        let mut program = transitive_closure();
        let err = program
            .add_relation(Relation::with_arity("edge", 3))
            .unwrap_err();
        assert_eq!(err, IrError::DuplicateRelation("edge".to_string()));
        assert_eq!(program.relation("edge").unwrap().arity(), 2);
    }

    #[test]
    fn test_replace_relation_returns_previous() {
        let mut program = transitive_closure();
        let previous = program.replace_relation(Relation::with_arity("edge", 3));
        assert_eq!(previous.map(|r| r.arity()), Some(2));
        assert_eq!(program.relation("edge").unwrap().arity(), 3);
        assert!(program.replace_relation(Relation::with_arity("fresh", 1)).is_none());
    }

    #[test]
    fn test_add_subroutine_rejects_duplicate() {
        let mut program = transitive_closure();
        program.add_subroutine("sub0", Statement::clear("path")).unwrap();
        let err = program
            .add_subroutine("sub0", Statement::clear("edge"))
            .unwrap_err();
        assert_eq!(err, IrError::DuplicateSubroutine("sub0".to_string()));
        assert_eq!(program.subroutine("sub0"), &Statement::clear("path"));
        assert!(program.has_subroutine("sub0"));
        assert!(!program.has_subroutine("sub1"));
    }

    #[test]
    #[should_panic(expected = "program has no main statement")]
    fn test_main_before_set_panics() {
        let program = Program::new();
        let _ = program.main();
    }

    #[test]
    #[should_panic(expected = "unknown subroutine 'missing'")]
    fn test_missing_subroutine_panics() {
        let program = transitive_closure();
        let _ = program.subroutine("missing");
    }

    #[test]
    fn test_relation_lookup_absent() {
        assert!(transitive_closure().relation("nope").is_none());
    }

    #[test]
    fn test_clone_equal_and_disjoint() {
        let original = transitive_closure();
        let copy = original.clone();
        assert_eq!(copy, original);
        assert!(!std::ptr::eq(
            copy.relation("edge").unwrap(),
            original.relation("edge").unwrap()
        ));
    }

    #[test]
    fn test_verify_reports_location() {
        let mut program = transitive_closure();
        program.set_main(Statement::sequence([
            Statement::clear("edge"),
            Statement::clear("ghost"),
        ]));
        let err = program.verify().unwrap_err();
        assert_eq!(
            err,
            IrError::DanglingReference {
                relation: "ghost".to_string(),
                location: "main/1/0".to_string(),
            }
        );
    }

    #[test]
    fn test_try_clone_detects_dangling() {
        let mut program = transitive_closure();
        program
            .add_subroutine("sub0", Statement::clear("ghost"))
            .unwrap();
        let err = program.try_clone().unwrap_err();
        assert_eq!(
            err,
            IrError::DanglingReference {
                relation: "ghost".to_string(),
                location: "subroutine[sub0]/0".to_string(),
            }
        );
    }

    #[test]
    #[should_panic(expected = "dangling RAM relation reference to 'ghost'")]
    fn test_clone_panics_on_dangling() {
        let mut program = transitive_closure();
        program.set_main(Statement::clear("ghost"));
        let _ = program.clone();
    }

    #[test]
    fn test_children_order() {
        let mut program = transitive_closure();
        program.add_subroutine("sub0", Statement::clear("path")).unwrap();
        let kinds: Vec<NodeKind> = program.children().into_iter().map(NodeRef::kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Relation,
                NodeKind::Relation,
                NodeKind::Relation,
                NodeKind::Sequence,
                NodeKind::Clear,
            ]
        );
    }

    #[test]
    fn test_apply_rename_collision_keeps_relations() {
        let mut program = transitive_closure();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            program.apply(&mut |node: Node| match node {
                Node::Relation(mut relation) if relation.name() == "delta_path" => {
                    relation.set_name("edge");
                    Node::Relation(relation)
                }
                other => other,
            });
        }));
        assert!(result.is_err());
        assert_eq!(program.relation_count(), 3);
        for name in ["edge", "path", "delta_path"] {
            assert_eq!(program.relation(name).unwrap().name(), name);
        }
        program.verify().unwrap();
    }

    #[test]
    fn test_apply_rename_rekeys_relation() {
        let mut program = transitive_closure();
        program.apply(&mut |node: Node| match node {
            Node::Relation(mut relation) if relation.name() == "path" => {
                relation.set_name("reach");
                Node::Relation(relation)
            }
            other => other,
        });
        assert!(program.relation("path").is_none());
        assert_eq!(program.relation("reach").unwrap().name(), "reach");
        assert_eq!(program.relation_count(), 3);
    }

    #[test]
    #[should_panic(expected = "already declared")]
    fn test_apply_rename_collision_panics() {
        let mut program = transitive_closure();
        program.apply(&mut |node: Node| match node {
            Node::Relation(mut relation) if relation.name() == "edge" => {
                relation.set_name("path");
                Node::Relation(relation)
            }
            other => other,
        });
    }
}
