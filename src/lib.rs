//! # RAM IR
//!
//! Core data model of a relational algebra machine (RAM): the intermediate
//! representation a Datalog compiler lowers rules into before execution.
//!
//! ## Pipeline Architecture
//! ```text
//! Datalog rules
//!     ↓
//! [Lowering (external)]     → Program (relations, main, subroutines)
//!     ↓
//! [PassManager]             → FoldConstants, FlattenSequences, ... to fixpoint
//!     ↓                       (references verified after each pass)
//! [Interpreter / codegen]   → external
//! ```
//!
//! ## Ownership model
//! ```text
//! Program
//!     ├── relations: name → Relation       (arena, owned by the program)
//!     ├── main: Statement                  (owned tree)
//!     └── subroutines: name → Statement    (owned trees)
//!
//! Statement / Operation / Condition ──► RelationRef("A") ──lookup──► relations["A"]
//! ```
//!
//! ## Usage
//! ```rust
//! use ram_ir::{Expression, Operation, Program, Relation, Statement};
//!
//! let mut program = Program::with_main(Statement::Query(Operation::scan(
//!     "edge",
//!     0,
//!     Operation::project("path", vec![Expression::tuple(0, 0), Expression::tuple(0, 1)]),
//! )));
//! program.add_relation(Relation::with_arity("edge", 2))?;
//! program.add_relation(Relation::with_arity("path", 2))?;
//!
//! let copy = program.try_clone()?;
//! assert_eq!(copy, program);
//! # Ok::<(), ram_ir::IrError>(())
//! ```
//!
//! ## Module Organization
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `ir` | Node kinds, mapper plumbing, traversal, `Program` |
//! | `transform` | Passes and the fixpoint `PassManager` |
//! | `config` | Hierarchical configuration (figment) |
//! | `logging` | Tracing subscriber setup |
//! | `error` | `IrError` and `IrResult` |

pub mod config;
pub mod error;
pub mod ir;
pub mod logging;
pub mod transform;

// Re-export public types
pub use config::{Config, LogFormat, LoggingConfig, PassConfig};
pub use error::{IrError, IrResult};
pub use ir::{
    post_order, pre_order, ComparisonOp, Condition, Expression, IntrinsicOp, IrNode, Node,
    NodeCategory, NodeKind, NodeMapper, NodePath, NodeRef, Operation, Program, Relation,
    RelationRef, Representation, Statement,
};
pub use transform::{
    FlattenSequences, FoldConstants, Pass, PassManager, PassReport, RenameRelations,
};

/// Run the passes enabled in `config` over `program` until it stops changing
pub fn optimize(program: &mut Program, config: &PassConfig) -> IrResult<PassReport> {
    PassManager::new(config).run(program)
}
