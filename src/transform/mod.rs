//! # Pass Pipeline
//!
//! Whole-program rewrites built on the mapper plumbing, run to fixpoint:
//!
//! - Constant folding: `(1 + 2)` -> `3`, `(true AND c)` -> `c`
//! - Sequence flattening: nested and empty sequences are inlined
//! - Relation renaming: relation and every reference to it renamed together
//!
//! ```text
//! Program (from lowering) -> [PassManager: pass, verify, ...]* -> Program
//! ```
//!
//! A round runs every pass once. Rounds repeat until a round leaves the
//! program unchanged or `max_iterations` is reached; change detection clones
//! the program before each pass and compares afterwards.

mod flatten;
mod fold;
mod rename;

pub use flatten::FlattenSequences;
pub use fold::FoldConstants;
pub use rename::RenameRelations;

use crate::config::PassConfig;
use crate::error::IrResult;
use crate::ir::Program;
use std::collections::BTreeMap;

/// A whole-program rewrite
pub trait Pass {
    /// Stable name used in logs and reports
    fn name(&self) -> &'static str;

    fn run(&mut self, program: &mut Program) -> IrResult<()>;
}

/// Outcome of a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Rounds executed
    pub iterations: usize,
    /// Number of rounds in which each pass changed the program
    pub changes: BTreeMap<&'static str, usize>,
    /// Whether the last round changed nothing
    pub reached_fixpoint: bool,
}

impl PassReport {
    pub fn changes_by(&self, pass: &str) -> usize {
        self.changes.get(pass).copied().unwrap_or(0)
    }
}

/// Runs a list of passes to fixpoint
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
    max_iterations: usize,
    verify_after_each_pass: bool,
}

impl PassManager {
    /// Pipeline with the built-in passes enabled in `config`
    pub fn new(config: &PassConfig) -> Self {
        let mut manager = PassManager::empty(config);
        if config.enable_constant_folding {
            manager.add_pass(FoldConstants);
        }
        if config.enable_sequence_flattening {
            manager.add_pass(FlattenSequences);
        }
        manager
    }

    /// Pipeline without passes, using the iteration settings of `config`
    pub fn empty(config: &PassConfig) -> Self {
        PassManager {
            passes: Vec::new(),
            max_iterations: config.max_iterations,
            verify_after_each_pass: config.verify_after_each_pass,
        }
    }

    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    #[must_use]
    pub fn with_pass(mut self, pass: impl Pass + 'static) -> Self {
        self.add_pass(pass);
        self
    }

    /// Names of the passes, in run order
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run the pipeline on `program` in place
    pub fn run(&mut self, program: &mut Program) -> IrResult<PassReport> {
        let mut report = PassReport::default();

        for iteration in 0..self.max_iterations {
            let mut changed = false;

            for pass in &mut self.passes {
                let before = program.snapshot();
                pass.run(program)?;

                if *program != before {
                    changed = true;
                    *report.changes.entry(pass.name()).or_insert(0) += 1;
                    tracing::debug!(pass = pass.name(), iteration, "pass_changed_program");
                }

                if self.verify_after_each_pass {
                    program.verify().inspect_err(|e| {
                        tracing::error!(pass = pass.name(), error = %e, "verification_failed");
                    })?;
                }
            }

            report.iterations = iteration + 1;
            if !changed {
                report.reached_fixpoint = true;
                break;
            }
        }

        tracing::info!(
            iterations = report.iterations,
            fixpoint = report.reached_fixpoint,
            "pass_pipeline_finished"
        );
        Ok(report)
    }
}
