//! Branch-and-bound assignment on a rectangular cost matrix.
//!
//! # Algorithm
//!
//! Depth-first enumeration over rows with two prunes: a per-row minimum
//! lower bound (`current + Σ row_min[r..] ≥ best` cuts the subtree) and a
//! per-choice cut (`current + cost ≥ best`). Columns are explored in
//! ascending cost order so good solutions are found early and the bounds
//! bite. The search runs on an explicit stack, which keeps deep instances
//! off the call stack and makes the deadline check a loop condition.
//!
//! Worst case is exponential; the deadline turns that into
//! [`Error::SolverTimeout`], which the orchestrator converts into a greedy
//! fallback unless configured otherwise.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use super::{estimated_total_distance, match_score, AssignmentSolver, Scenario, SolverOutcome};
use crate::error::{Error, Result};
use crate::models::{Courier, Order};

/// Cost of a blocked courier/order pairing.
const BLOCKED: f64 = 9999.0;
/// Cost of a dummy column, allowing a courier to stay empty.
const DUMMY: f64 = 1.2;

/// Exact solver over an explicit rows × columns cost matrix.
///
/// Returns, per row, the column it was matched to. Works with rectangular
/// matrices (more columns than rows) so callers can pad with dummy columns
/// for partial assignment.
///
/// # Examples
///
/// ```
/// use lastmile::assign::CostMatrixSolver;
///
/// let solver = CostMatrixSolver::new(vec![
///     vec![0.1, 0.5],
///     vec![0.4, 0.2],
/// ]).unwrap();
/// let (assignment, cost) = solver.solve().unwrap();
/// assert_eq!(assignment, vec![Some(0), Some(1)]);
/// assert!((cost - 0.3).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct CostMatrixSolver {
    cost: Vec<Vec<f64>>,
    order: Vec<Vec<usize>>,
    suffix_min: Vec<f64>,
    deadline: Duration,
}

struct Frame {
    row: usize,
    cursor: usize,
    chosen: Option<usize>,
}

impl CostMatrixSolver {
    /// Creates a solver from a rectangular cost matrix.
    ///
    /// Non-finite entries are sanitized to the blocked cost. Fails with
    /// [`Error::InvalidInput`] on ragged rows or when a complete assignment
    /// is impossible (fewer columns than rows).
    pub fn new(mut cost: Vec<Vec<f64>>) -> Result<Self> {
        let n_rows = cost.len();
        let n_cols = cost.first().map(Vec::len).unwrap_or(0);
        if cost.iter().any(|row| row.len() != n_cols) {
            return Err(Error::InvalidInput("ragged cost matrix".into()));
        }
        if n_rows > 0 && n_cols < n_rows {
            return Err(Error::InvalidInput(format!(
                "{n_cols} columns cannot cover {n_rows} rows"
            )));
        }

        for row in &mut cost {
            for c in row.iter_mut() {
                if !c.is_finite() {
                    *c = BLOCKED;
                }
            }
        }

        // Explore columns cheapest-first; stable sort keeps low indices on ties.
        let order: Vec<Vec<usize>> = cost
            .iter()
            .map(|row| {
                let mut cols: Vec<usize> = (0..n_cols).collect();
                cols.sort_by(|&a, &b| row[a].total_cmp(&row[b]));
                cols
            })
            .collect();

        // suffix_min[r] = Σ of per-row minima from row r on: the lower bound.
        let mut suffix_min = vec![0.0; n_rows + 1];
        for r in (0..n_rows).rev() {
            let row_min = cost[r].iter().copied().fold(f64::INFINITY, f64::min);
            suffix_min[r] = suffix_min[r + 1] + if row_min.is_finite() { row_min } else { 0.0 };
        }

        Ok(Self {
            cost,
            order,
            suffix_min,
            deadline: Duration::from_secs(10),
        })
    }

    /// Sets the search deadline (default 10 s).
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Runs the search, returning the matched column per row and the total
    /// cost of the best complete assignment.
    pub fn solve(&self) -> Result<(Vec<Option<usize>>, f64)> {
        let n_rows = self.cost.len();
        if n_rows == 0 {
            return Ok((Vec::new(), 0.0));
        }
        let n_cols = self.cost[0].len();

        let started = Instant::now();
        let mut used = vec![false; n_cols];
        let mut current: Vec<Option<usize>> = vec![None; n_rows];
        let mut current_cost = 0.0;
        let mut best: Vec<Option<usize>> = vec![None; n_rows];
        let mut best_cost = f64::INFINITY;

        let mut stack = vec![Frame {
            row: 0,
            cursor: 0,
            chosen: None,
        }];

        while !stack.is_empty() {
            if started.elapsed() >= self.deadline {
                return Err(Error::SolverTimeout {
                    deadline_secs: self.deadline.as_secs(),
                });
            }

            let top = stack.len() - 1;
            let row = stack[top].row;

            // Returning to this frame: undo the choice its child explored.
            if let Some(col) = stack[top].chosen.take() {
                used[col] = false;
                current_cost -= self.cost[row][col];
                current[row] = None;
            }

            if row == n_rows {
                if current_cost < best_cost {
                    best_cost = current_cost;
                    best = current.clone();
                }
                stack.pop();
                continue;
            }

            if current_cost + self.suffix_min[row] >= best_cost {
                stack.pop();
                continue;
            }

            let mut next_col = None;
            while stack[top].cursor < n_cols {
                let col = self.order[row][stack[top].cursor];
                stack[top].cursor += 1;
                if used[col] {
                    continue;
                }
                if current_cost + self.cost[row][col] >= best_cost {
                    continue;
                }
                next_col = Some(col);
                break;
            }

            match next_col {
                Some(col) => {
                    used[col] = true;
                    current[row] = Some(col);
                    current_cost += self.cost[row][col];
                    stack[top].chosen = Some(col);
                    stack.push(Frame {
                        row: row + 1,
                        cursor: 0,
                        chosen: None,
                    });
                }
                None => {
                    stack.pop();
                }
            }
        }

        Ok((best, best_cost))
    }
}

/// Assignment solver matching each courier to at most one order through the
/// cost-matrix search.
///
/// The matrix is couriers × (orders + dummies): `max(L, C) + 3` columns,
/// dummy columns priced so that leaving a courier empty beats a blocked
/// pairing. Pair cost is `1 − score` from [`match_score`], or the blocked
/// cost when the score is zero.
#[derive(Debug, Clone)]
pub struct BranchAndBoundSolver {
    deadline: Duration,
}

impl BranchAndBoundSolver {
    /// Creates the solver with the given search deadline.
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }
}

impl AssignmentSolver for BranchAndBoundSolver {
    fn assign(
        &self,
        couriers: &[Courier],
        orders: &[Order],
        _scenario: Scenario,
    ) -> Result<SolverOutcome> {
        if couriers.is_empty() || orders.is_empty() {
            return Ok(SolverOutcome {
                assignments: BTreeMap::new(),
                unassigned: orders.to_vec(),
                total_cost: 0.0,
            });
        }

        let n_orders = orders.len();
        let n_cols = couriers.len().max(n_orders) + 3;

        let cost: Vec<Vec<f64>> = couriers
            .iter()
            .map(|courier| {
                (0..n_cols)
                    .map(|j| {
                        if j < n_orders {
                            let score = match_score(courier, &orders[j], &[]);
                            if score > 0.0 {
                                1.0 - score
                            } else {
                                BLOCKED
                            }
                        } else {
                            DUMMY
                        }
                    })
                    .collect()
            })
            .collect();

        let (matched, matrix_cost) = CostMatrixSolver::new(cost)?
            .with_deadline(self.deadline)
            .solve()?;
        tracing::debug!(
            couriers = couriers.len(),
            orders = n_orders,
            matrix_cost,
            "branch-and-bound assignment complete"
        );

        let mut outcome = SolverOutcome::default();
        let mut claimed = vec![false; n_orders];
        for (courier, col) in couriers.iter().zip(matched) {
            match col {
                Some(j) if j < n_orders => {
                    claimed[j] = true;
                    outcome
                        .assignments
                        .entry(courier.id().to_string())
                        .or_default()
                        .push(orders[j].clone());
                }
                _ => {}
            }
        }
        for (order, taken) in orders.iter().zip(claimed) {
            if !taken {
                outcome.unassigned.push(order.clone());
            }
        }
        outcome.total_cost = estimated_total_distance(couriers, &outcome.assignments);
        Ok(outcome)
    }

    fn name(&self) -> &'static str {
        "branch_and_bound"
    }
}
