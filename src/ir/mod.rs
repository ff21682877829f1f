//! RAM IR: the relational algebra machine tree a Datalog program compiles to.
//!
//! ```text
//! Program
//!     ├── relations   name -> Relation        (owned arena)
//!     ├── main        Statement               (entry point)
//!     └── subroutines name -> Statement
//!
//! Statement -> Operation -> Condition / Expression
//!          \_____________\__ RelationRef (resolved by name through Program)
//! ```
//!
//! Every element implements [`IrNode`]; rewriting goes through
//! [`NodeMapper`] and `IrNode::apply`.

mod condition;
mod expression;
pub mod mapper;
mod node;
mod operation;
mod program;
mod relation;
mod statement;
pub mod walk;

pub use condition::{ComparisonOp, Condition};
pub use expression::{Expression, IntrinsicOp};
pub use mapper::{post_order, pre_order, NodeMapper, PostOrder, PreOrder};
pub use node::{IrNode, Node, NodeCategory, NodeKind, NodeRef};
pub use operation::Operation;
pub use program::Program;
pub use relation::{Attribute, Relation, RelationRef, Representation, NUMBER_TYPE};
pub use statement::{Directives, Statement};
pub use walk::{collect_references, count_nodes, walk, NodePath, PathSegment};
