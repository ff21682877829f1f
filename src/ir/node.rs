//! Node contract shared by every RAM element.
//!
//! The node set is closed: [`Node`] owns one element of any slot category,
//! [`NodeRef`] borrows one, and [`NodeKind`] names the concrete kind. Passes
//! dispatch on these variants instead of inspecting types at runtime.

use super::condition::Condition;
use super::expression::Expression;
use super::mapper::NodeMapper;
use super::operation::Operation;
use super::program::Program;
use super::relation::{Relation, RelationRef};
use super::statement::Statement;
use std::fmt;

/// Concrete kind of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    Relation,
    RelationRef,

    // Statements
    Sequence,
    Parallel,
    Loop,
    Exit,
    Query,
    Clear,
    Drop,
    Merge,
    Swap,
    LogSize,
    Load,
    Store,

    // Operations
    Scan,
    Filter,
    Project,
    Return,

    // Conditions
    True,
    False,
    Conjunction,
    Negation,
    EmptinessCheck,
    ExistenceCheck,
    Constraint,

    // Expressions
    Number,
    TupleElement,
    Intrinsic,
    SubroutineArgument,
    AutoIncrement,
}

/// Slot category a node kind belongs to.
///
/// A mapper may replace a node by any node of the same category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    Program,
    Relation,
    RelationRef,
    Statement,
    Operation,
    Condition,
    Expression,
}

impl NodeKind {
    /// Category of the slots this kind may occupy
    pub fn category(self) -> NodeCategory {
        match self {
            NodeKind::Program => NodeCategory::Program,
            NodeKind::Relation => NodeCategory::Relation,
            NodeKind::RelationRef => NodeCategory::RelationRef,
            NodeKind::Sequence
            | NodeKind::Parallel
            | NodeKind::Loop
            | NodeKind::Exit
            | NodeKind::Query
            | NodeKind::Clear
            | NodeKind::Drop
            | NodeKind::Merge
            | NodeKind::Swap
            | NodeKind::LogSize
            | NodeKind::Load
            | NodeKind::Store => NodeCategory::Statement,
            NodeKind::Scan | NodeKind::Filter | NodeKind::Project | NodeKind::Return => {
                NodeCategory::Operation
            }
            NodeKind::True
            | NodeKind::False
            | NodeKind::Conjunction
            | NodeKind::Negation
            | NodeKind::EmptinessCheck
            | NodeKind::ExistenceCheck
            | NodeKind::Constraint => NodeCategory::Condition,
            NodeKind::Number
            | NodeKind::TupleElement
            | NodeKind::Intrinsic
            | NodeKind::SubroutineArgument
            | NodeKind::AutoIncrement => NodeCategory::Expression,
        }
    }
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeCategory::Program => "program",
            NodeCategory::Relation => "relation",
            NodeCategory::RelationRef => "relation reference",
            NodeCategory::Statement => "statement",
            NodeCategory::Operation => "operation",
            NodeCategory::Condition => "condition",
            NodeCategory::Expression => "expression",
        };
        f.write_str(name)
    }
}

/// Contract implemented by every RAM element.
///
/// Structural equality is `PartialEq`, deep copy is `Clone` and the
/// structural dump is `Display`.
pub trait IrNode: fmt::Display {
    /// Concrete kind of this node
    fn kind(&self) -> NodeKind;

    /// Direct owned children, in a fixed kind-specific order. Never recurses.
    fn children(&self) -> Vec<NodeRef<'_>>;

    /// Replace every owned child with the result of `mapper` on it.
    ///
    /// Leaves do nothing. Recursion is up to the mapper.
    fn apply(&mut self, mapper: &mut dyn NodeMapper);
}

/// An owned node of any slot category, as passed through a mapper
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Relation(Relation),
    RelationRef(RelationRef),
    Statement(Statement),
    Operation(Operation),
    Condition(Condition),
    Expression(Expression),
}

impl Node {
    /// Category of the slot this node fits in
    pub fn category(&self) -> NodeCategory {
        self.kind().category()
    }

    /// Borrow this node
    pub fn as_node_ref(&self) -> NodeRef<'_> {
        match self {
            Node::Relation(n) => NodeRef::Relation(n),
            Node::RelationRef(n) => NodeRef::RelationRef(n),
            Node::Statement(n) => NodeRef::Statement(n),
            Node::Operation(n) => NodeRef::Operation(n),
            Node::Condition(n) => NodeRef::Condition(n),
            Node::Expression(n) => NodeRef::Expression(n),
        }
    }
}

impl IrNode for Node {
    fn kind(&self) -> NodeKind {
        self.as_node_ref().kind()
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        self.as_node_ref().children()
    }

    fn apply(&mut self, mapper: &mut dyn NodeMapper) {
        match self {
            Node::Relation(n) => n.apply(mapper),
            Node::RelationRef(n) => n.apply(mapper),
            Node::Statement(n) => n.apply(mapper),
            Node::Operation(n) => n.apply(mapper),
            Node::Condition(n) => n.apply(mapper),
            Node::Expression(n) => n.apply(mapper),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.as_node_ref(), f)
    }
}

/// A borrowed node of any kind, including the program itself
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Program(&'a Program),
    Relation(&'a Relation),
    RelationRef(&'a RelationRef),
    Statement(&'a Statement),
    Operation(&'a Operation),
    Condition(&'a Condition),
    Expression(&'a Expression),
}

impl<'a> NodeRef<'a> {
    pub fn kind(self) -> NodeKind {
        match self {
            NodeRef::Program(n) => n.kind(),
            NodeRef::Relation(n) => n.kind(),
            NodeRef::RelationRef(n) => n.kind(),
            NodeRef::Statement(n) => n.kind(),
            NodeRef::Operation(n) => n.kind(),
            NodeRef::Condition(n) => n.kind(),
            NodeRef::Expression(n) => n.kind(),
        }
    }

    /// Direct children of the borrowed node
    pub fn children(self) -> Vec<NodeRef<'a>> {
        match self {
            NodeRef::Program(n) => n.children(),
            NodeRef::Relation(n) => n.children(),
            NodeRef::RelationRef(n) => n.children(),
            NodeRef::Statement(n) => n.children(),
            NodeRef::Operation(n) => n.children(),
            NodeRef::Condition(n) => n.children(),
            NodeRef::Expression(n) => n.children(),
        }
    }

    /// The reference, if this node is one
    pub fn as_relation_ref(self) -> Option<&'a RelationRef> {
        match self {
            NodeRef::RelationRef(reference) => Some(reference),
            _ => None,
        }
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NodeRef::Program(a), NodeRef::Program(b)) => a == b,
            (NodeRef::Relation(a), NodeRef::Relation(b)) => a == b,
            (NodeRef::RelationRef(a), NodeRef::RelationRef(b)) => a == b,
            (NodeRef::Statement(a), NodeRef::Statement(b)) => a == b,
            (NodeRef::Operation(a), NodeRef::Operation(b)) => a == b,
            (NodeRef::Condition(a), NodeRef::Condition(b)) => a == b,
            (NodeRef::Expression(a), NodeRef::Expression(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Program(n) => fmt::Display::fmt(n, f),
            NodeRef::Relation(n) => fmt::Display::fmt(n, f),
            NodeRef::RelationRef(n) => fmt::Display::fmt(n, f),
            NodeRef::Statement(n) => fmt::Display::fmt(n, f),
            NodeRef::Operation(n) => fmt::Display::fmt(n, f),
            NodeRef::Condition(n) => fmt::Display::fmt(n, f),
            NodeRef::Expression(n) => fmt::Display::fmt(n, f),
        }
    }
}

/// A typed child slot that can be swapped through a mapper.
pub(crate) trait Slot: Sized {
    const CATEGORY: NodeCategory;

    /// Cheap placeholder held by the slot while its child is with the mapper
    fn vacant() -> Self;

    fn into_node(self) -> Node;

    fn from_node(node: Node) -> Result<Self, Node>;
}

macro_rules! impl_slot {
    ($ty:ident, $category:ident, $vacant:expr) => {
        impl Slot for $ty {
            const CATEGORY: NodeCategory = NodeCategory::$category;

            fn vacant() -> Self {
                $vacant
            }

            fn into_node(self) -> Node {
                Node::$category(self)
            }

            fn from_node(node: Node) -> Result<Self, Node> {
                match node {
                    Node::$category(inner) => Ok(inner),
                    other => Err(other),
                }
            }
        }

        impl From<$ty> for Node {
            fn from(value: $ty) -> Self {
                Node::$category(value)
            }
        }
    };
}

impl_slot!(Relation, Relation, Relation::vacant());
impl_slot!(RelationRef, RelationRef, RelationRef::new(String::new()));
impl_slot!(Statement, Statement, Statement::Sequence(Vec::new()));
impl_slot!(Operation, Operation, Operation::Return(Vec::new()));
impl_slot!(Condition, Condition, Condition::True);
impl_slot!(Expression, Expression, Expression::Number(0));

/// Pass an owned value through `mapper` and take back a value of the same
/// category.
///
/// # Panics
///
/// If the mapper answers with a node of another category.
fn map_owned<T: Slot>(value: T, mapper: &mut dyn NodeMapper) -> T {
    match T::from_node(mapper.map(value.into_node())) {
        Ok(mapped) => mapped,
        Err(node) => panic!(
            "node mapper returned a {} node ({:?}) for a slot of category {}",
            node.category(),
            node.kind(),
            T::CATEGORY
        ),
    }
}

/// Swap the child held in `slot` for the mapper's replacement
pub(crate) fn map_slot<T: Slot>(slot: &mut T, mapper: &mut dyn NodeMapper) {
    let current = std::mem::replace(slot, T::vacant());
    *slot = map_owned(current, mapper);
}

pub(crate) fn map_slots<T: Slot>(slots: &mut [T], mapper: &mut dyn NodeMapper) {
    for slot in slots {
        map_slot(slot, mapper);
    }
}
