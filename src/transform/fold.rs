//! Constant folding over expressions and conditions

use super::Pass;
use crate::error::IrResult;
use crate::ir::{post_order, Condition, Expression, IrNode, Node, Operation, Program};

/// Fold intrinsics over constants and trivially decided conditions.
///
/// Rules, applied bottom-up:
/// - `op(n1, .., nk)` with constant arguments -> its value
///   (division by zero is left alone)
/// - `(n1 op n2)` comparison of constants -> `true` / `false`
/// - `(true AND c)`, `(c AND true)` -> `c`; a `false` operand -> `false`
/// - `(NOT true)` -> `false`, `(NOT false)` -> `true`, `(NOT (NOT c))` -> `c`
/// - `IF true` around an operation -> the operation
pub struct FoldConstants;

impl FoldConstants {
    /// Fold the children of a detached subtree
    pub fn fold<T: IrNode>(tree: &mut T) {
        tree.apply(&mut post_order(fold_node));
    }
}

impl Pass for FoldConstants {
    fn name(&self) -> &'static str {
        "fold-constants"
    }

    fn run(&mut self, program: &mut Program) -> IrResult<()> {
        program.apply(&mut post_order(fold_node));
        Ok(())
    }
}

fn fold_node(node: Node) -> Node {
    match node {
        Node::Expression(expr) => Node::Expression(fold_expression(expr)),
        Node::Condition(cond) => Node::Condition(fold_condition(cond)),
        Node::Operation(Operation::Filter {
            condition: Condition::True,
            nested,
        }) => Node::Operation(*nested),
        other => other,
    }
}

fn fold_expression(expr: Expression) -> Expression {
    match expr {
        Expression::Intrinsic { op, args } => {
            let constants: Option<Vec<i64>> = args.iter().map(Expression::as_number).collect();
            match constants.and_then(|values| op.evaluate(&values)) {
                Some(value) => Expression::Number(value),
                None => Expression::Intrinsic { op, args },
            }
        }
        other => other,
    }
}

fn fold_condition(cond: Condition) -> Condition {
    match cond {
        Condition::Constraint {
            op,
            lhs: Expression::Number(lhs),
            rhs: Expression::Number(rhs),
        } => {
            if op.evaluate(lhs, rhs) {
                Condition::True
            } else {
                Condition::False
            }
        }
        Condition::Conjunction(lhs, rhs) => match (*lhs, *rhs) {
            (Condition::False, _) | (_, Condition::False) => Condition::False,
            (Condition::True, other) | (other, Condition::True) => other,
            (lhs, rhs) => Condition::and(lhs, rhs),
        },
        Condition::Negation(inner) => match *inner {
            Condition::True => Condition::False,
            Condition::False => Condition::True,
            Condition::Negation(twice) => *twice,
            other => Condition::not(other),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ComparisonOp, IntrinsicOp, Relation, RelationRef, Statement};

    fn program_with(main: Statement) -> Program {
        let mut program = Program::with_main(main);
        program.add_relation(Relation::with_arity("A", 2)).unwrap();
        program
    }

    #[test]
    fn test_nested_arithmetic_folds_bottom_up() {
        // (2 * (3 + 4)) -> 14
        let expr = Expression::binary(
            IntrinsicOp::Mul,
            Expression::Number(2),
            Expression::binary(IntrinsicOp::Add, Expression::Number(3), Expression::Number(4)),
        );
        let mut program = program_with(Statement::Query(Operation::project(
            "A",
            vec![expr, Expression::tuple(0, 0)],
        )));
        FoldConstants.run(&mut program).unwrap();
        assert_eq!(
            program.main(),
            &Statement::Query(Operation::project(
                "A",
                vec![Expression::Number(14), Expression::tuple(0, 0)]
            ))
        );
    }

    #[test]
    fn test_division_by_zero_is_kept() {
        let div = Expression::binary(IntrinsicOp::Div, Expression::Number(1), Expression::Number(0));
        let mut program = program_with(Statement::Query(Operation::project(
            "A",
            vec![div.clone(), Expression::Number(0)],
        )));
        FoldConstants.run(&mut program).unwrap();
        assert_eq!(
            program.main(),
            &Statement::Query(Operation::project("A", vec![div, Expression::Number(0)]))
        );
    }

    #[test]
    fn test_true_filter_is_removed() {
        let cond = Condition::and(
            Condition::compare(ComparisonOp::Lt, Expression::Number(1), Expression::Number(2)),
            Condition::not(Condition::not(Condition::True)),
        );
        let inner = Operation::project("A", vec![Expression::tuple(0, 1), Expression::tuple(0, 0)]);
        let mut program = program_with(Statement::Query(Operation::scan(
            "A",
            0,
            Operation::filter(cond, inner.clone()),
        )));
        FoldConstants.run(&mut program).unwrap();
        assert_eq!(
            program.main(),
            &Statement::Query(Operation::scan("A", 0, inner))
        );
    }

    #[test]
    fn test_false_conjunct_decides_condition() {
        let cond = Condition::and(
            Condition::Empty(RelationRef::new("A")),
            Condition::compare(ComparisonOp::Eq, Expression::Number(1), Expression::Number(2)),
        );
        let mut program = program_with(Statement::Exit(cond));
        FoldConstants.run(&mut program).unwrap();
        assert_eq!(program.main(), &Statement::Exit(Condition::False));
    }

    #[test]
    fn test_fold_tree_on_detached_statement() {
        let mut stmt = Statement::Exit(Condition::not(Condition::False));
        FoldConstants::fold(&mut stmt);
        assert_eq!(stmt, Statement::Exit(Condition::True));
    }
}
