//! Relations and the references that name them.
//!
//! A [`Relation`] is owned by exactly one [`Program`](super::Program). The
//! statement tree never holds a relation: it holds [`RelationRef`]s, which
//! carry only the relation's name and are resolved through the owning
//! program.

use super::mapper::NodeMapper;
use super::node::{IrNode, NodeKind, NodeRef};
use std::fmt;

/// Type qualifier used for attributes created by [`Relation::with_arity`]
pub const NUMBER_TYPE: &str = "i:number";

/// Storage representation hint for a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Representation {
    /// Let the backend decide
    #[default]
    Default,
    /// B-tree
    Btree,
    /// Trie, for dense relations
    Brie,
    /// Equivalence relation
    EqRel,
}

impl Representation {
    fn keyword(self) -> Option<&'static str> {
        match self {
            Representation::Default => None,
            Representation::Btree => Some("btree"),
            Representation::Brie => Some("brie"),
            Representation::EqRel => Some("eqrel"),
        }
    }
}

/// One column of a relation schema
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub name: String,
    /// Opaque type qualifier, e.g. `i:number` or `s:symbol`
    pub type_qualifier: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, type_qualifier: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            type_qualifier: type_qualifier.into(),
        }
    }
}

/// A declared relation: unique name plus schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    name: String,
    attributes: Vec<Attribute>,
    representation: Representation,
}

impl Relation {
    /// Create a relation with the given attributes and default representation
    pub fn new(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Relation {
            name: name.into(),
            attributes,
            representation: Representation::Default,
        }
    }

    /// Create a relation of `arity` numeric columns named `c0`, `c1`, ...
    pub fn with_arity(name: impl Into<String>, arity: usize) -> Self {
        let attributes = (0..arity)
            .map(|i| Attribute::new(format!("c{i}"), NUMBER_TYPE))
            .collect();
        Relation::new(name, attributes)
    }

    #[must_use]
    pub fn with_representation(mut self, representation: Representation) -> Self {
        self.representation = representation;
        self
    }

    pub(crate) fn vacant() -> Self {
        Relation::new(String::new(), Vec::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the relation. Only meaningful together with retargeting every
    /// reference to it, see `transform::RenameRelations`.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn arity(&self) -> usize {
        self.attributes.len()
    }

    pub fn representation(&self) -> Representation {
        self.representation
    }
}

impl IrNode for Relation {
    fn kind(&self) -> NodeKind {
        NodeKind::Relation
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        Vec::new()
    }

    fn apply(&mut self, _mapper: &mut dyn NodeMapper) {}
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<String> = self
            .attributes
            .iter()
            .map(|a| format!("{}:{}", a.name, a.type_qualifier))
            .collect();
        write!(f, "{}({})", self.name, columns.join(","))?;
        if let Some(keyword) = self.representation.keyword() {
            write!(f, " {keyword}")?;
        }
        Ok(())
    }
}

/// Non-owning handle to a relation of the enclosing program.
///
/// Two references are equal when they name the same relation, whichever
/// program they live in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationRef {
    name: String,
}

impl RelationRef {
    pub fn new(name: impl Into<String>) -> Self {
        RelationRef { name: name.into() }
    }

    /// Name of the target relation
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<&Relation> for RelationRef {
    fn from(relation: &Relation) -> Self {
        RelationRef::new(relation.name())
    }
}

impl IrNode for RelationRef {
    fn kind(&self) -> NodeKind {
        NodeKind::RelationRef
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        Vec::new()
    }

    fn apply(&mut self, _mapper: &mut dyn NodeMapper) {}
}

impl fmt::Display for RelationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_display() {
        let edge = Relation::new(
            "edge",
            vec![Attribute::new("x", "i:number"), Attribute::new("y", "s:symbol")],
        );
        assert_eq!(edge.to_string(), "edge(x:i:number,y:s:symbol)");
        assert_eq!(edge.arity(), 2);

        let eq = Relation::with_arity("same", 2).with_representation(Representation::EqRel);
        assert_eq!(eq.to_string(), "same(c0:i:number,c1:i:number) eqrel");
    }

    #[test]
    fn test_relation_equality_is_structural() {
        let a = Relation::with_arity("A", 2);
        let b = Relation::with_arity("A", 2);
        assert_eq!(a, b);
        assert_ne!(a, Relation::with_arity("A", 3));
        assert_ne!(a, Relation::with_arity("B", 2));
        assert_ne!(
            a,
            Relation::with_arity("A", 2).with_representation(Representation::Brie)
        );
    }

    #[test]
    fn test_reference_equality_by_name() {
        let rel = Relation::with_arity("path", 2);
        assert_eq!(RelationRef::from(&rel), RelationRef::new("path"));
        assert_ne!(RelationRef::new("path"), RelationRef::new("edge"));
    }

    #[test]
    fn test_leaves_have_no_children() {
        assert!(Relation::with_arity("A", 1).children().is_empty());
        assert!(RelationRef::new("A").children().is_empty());
    }
}
