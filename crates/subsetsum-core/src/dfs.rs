//! Branch-and-bound depth-first search over the include/exclude tree.
//!
//! The recursion is kept as an explicit stack of [`SearchFrame`]s so the
//! search can stop after any node and pick up again later without
//! re-deriving where it was. At sorted position `i` the include edge is
//! always tried before the exclude edge, which fixes one enumeration order
//! for every caller.

use crate::cancel::{CancelToken, Interrupted, DFS_POLL_INTERVAL};
use crate::input::Problem;
use crate::report::Combination;
use tracing::trace;

/// Where a frame stands in its own include/exclude decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    /// Pushed but not entered yet; pruning has not run
    Unvisited,
    /// About to try the include edge
    Include,
    /// About to try the exclude edge (include done or skipped)
    Exclude,
    /// Both edges handled, or the node was resolved on entry
    Exhausted,
}

/// One node of the decision tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchFrame {
    /// Sorted position this node decides
    pub pos: usize,
    /// Sum of the values chosen above this node
    pub sum: u64,
    /// Number of values chosen above this node
    pub count: usize,
    pub branch: Branch,
}

impl SearchFrame {
    fn root() -> Self {
        Self {
            pos: 0,
            sum: 0,
            count: 0,
            branch: Branch::Unvisited,
        }
    }

    fn child(&self, added: Option<u64>) -> Self {
        match added {
            Some(value) => Self {
                pos: self.pos + 1,
                sum: self.sum + value,
                count: self.count + 1,
                branch: Branch::Unvisited,
            },
            None => Self {
                pos: self.pos + 1,
                branch: Branch::Unvisited,
                ..*self
            },
        }
    }
}

/// What entering a node decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    /// The node completes a qualifying subset
    Accept,
    /// Nothing below can qualify
    Dead,
    Expand,
}

/// Result of advancing the search by one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A node was entered and produced no witness
    Visited,
    /// A node was entered and completed this witness
    Found(Combination),
    /// Nothing is left to visit
    Exhausted,
}

/// Outcome of a single-pass find-one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DfsOutcome {
    pub combination: Option<Combination>,
    pub nodes_explored: u64,
}

/// The complete state of an in-progress search; the unit of pause/resume.
#[derive(Debug, Clone, Default)]
pub struct SearchStack {
    frames: Vec<SearchFrame>,
}

impl SearchStack {
    /// A stack rooted at position 0, or an already exhausted one when the
    /// problem is infeasible up front.
    pub fn new(problem: &Problem) -> Self {
        let frames = if problem.is_infeasible() {
            Vec::new()
        } else {
            vec![SearchFrame::root()]
        };
        Self { frames }
    }

    pub fn is_exhausted(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[SearchFrame] {
        &self.frames
    }

    /// Advance until exactly one node has been entered, or the tree is exhausted.
    ///
    /// Pops and edge transitions between nodes are free; only entering a
    /// node counts as work.
    pub fn step(&mut self, problem: &Problem) -> Step {
        loop {
            let Some(top) = self.frames.last_mut() else {
                return Step::Exhausted;
            };
            let frame = *top;
            match frame.branch {
                Branch::Unvisited => {
                    return match evaluate(problem, &frame) {
                        Verdict::Accept => {
                            top.branch = Branch::Exhausted;
                            Step::Found(self.witness(problem))
                        }
                        Verdict::Dead => {
                            top.branch = Branch::Exhausted;
                            Step::Visited
                        }
                        Verdict::Expand => {
                            top.branch = Branch::Include;
                            Step::Visited
                        }
                    };
                }
                Branch::Include => {
                    top.branch = Branch::Exclude;
                    let value = problem.entry(frame.pos).value;
                    if can_include(problem, &frame, value) {
                        self.frames.push(frame.child(Some(value)));
                    }
                }
                Branch::Exclude => {
                    top.branch = Branch::Exhausted;
                    self.frames.push(frame.child(None));
                }
                Branch::Exhausted => {
                    self.frames.pop();
                }
            }
        }
    }

    /// Pop frames whose subtrees are fully resolved.
    ///
    /// After the last node of the tree has been entered this empties the
    /// stack, so exhaustion is visible without another step.
    pub fn settle(&mut self) {
        while self
            .frames
            .last()
            .is_some_and(|top| top.branch == Branch::Exhausted)
        {
            self.frames.pop();
        }
    }

    /// Share of the decision tree already resolved, in `[0, 1]`.
    ///
    /// Each node splits its weight evenly between its two edges, whether or
    /// not an edge is feasible. Pre-order traversal makes this grow
    /// monotonically; callers still keep a high-water mark against rounding.
    pub fn resolved_fraction(&self) -> f64 {
        if self.frames.is_empty() {
            return 1.0;
        }
        let last = self.frames.len() - 1;
        let mut resolved = 0.0;
        let mut weight = 1.0f64;
        // Contributions below 2^-64 are invisible next to the shallow ones
        for (depth, frame) in self.frames.iter().enumerate().take(64) {
            let half = weight / 2.0;
            resolved += match (depth == last, frame.branch) {
                // Below the top, Exhausted means the exclude child is in progress
                (false, Branch::Exhausted) => half,
                (true, Branch::Exclude) => half,
                (true, Branch::Exhausted) => weight,
                _ => 0.0,
            };
            weight = half;
        }
        resolved.min(1.0)
    }

    /// Decode the chosen entries along the current root-to-top path.
    fn witness(&self, problem: &Problem) -> Combination {
        let chosen = self
            .frames
            .windows(2)
            .filter(|pair| pair[1].count > pair[0].count)
            .map(|pair| problem.entry(pair[0].pos))
            .collect();
        Combination::from_entries(chosen).verified(problem.target())
    }
}

/// Pruning rules applied when a node is entered.
fn evaluate(problem: &Problem, frame: &SearchFrame) -> Verdict {
    let target = problem.target();
    let min_count = problem.min_count();
    let max_count = problem.max_count();

    // Target reached: the only completion excludes everything that remains
    if frame.sum == target {
        return if frame.count >= min_count {
            Verdict::Accept
        } else {
            Verdict::Dead
        };
    }

    let n = problem.len();
    if frame.pos == n || frame.count >= max_count {
        return Verdict::Dead;
    }

    let need = (target - frame.sum) as u128;

    // Suffix-sum bound
    if problem.suffix_sum()[frame.pos] < need {
        return Verdict::Dead;
    }

    // Count bound: not enough positions left to reach min_count
    let missing = min_count.saturating_sub(frame.count);
    if n - frame.pos < missing {
        return Verdict::Dead;
    }

    // Capacity bound: the largest picks still allowed fall short
    if problem.largest_from(frame.pos, max_count - frame.count) < need {
        return Verdict::Dead;
    }

    // Minimum-fill bound: the smallest picks still required overshoot
    if missing > 0 && problem.smallest(missing) > need {
        return Verdict::Dead;
    }

    Verdict::Expand
}

/// Value and count bounds on the include edge.
fn can_include(problem: &Problem, frame: &SearchFrame, value: u64) -> bool {
    frame.count < problem.max_count() && frame.sum + value <= problem.target()
}

/// Run the search from the root until the first witness or exhaustion.
pub fn find_first(problem: &Problem) -> DfsOutcome {
    search(problem, None).unwrap_or_else(|Interrupted| unreachable!("no token to raise"))
}

/// Like [`find_first`], checking `cancel` every [`DFS_POLL_INTERVAL`] nodes.
pub fn find_first_with(problem: &Problem, cancel: &CancelToken) -> Result<DfsOutcome, Interrupted> {
    search(problem, Some(cancel))
}

fn search(problem: &Problem, cancel: Option<&CancelToken>) -> Result<DfsOutcome, Interrupted> {
    let mut stack = SearchStack::new(problem);
    let mut nodes_explored = 0u64;
    loop {
        if nodes_explored % DFS_POLL_INTERVAL == 0 && cancel.is_some_and(CancelToken::is_cancelled) {
            trace!(nodes = nodes_explored, "branch-and-bound interrupted");
            return Err(Interrupted);
        }
        match stack.step(problem) {
            Step::Visited => nodes_explored += 1,
            Step::Found(combination) => {
                nodes_explored += 1;
                return Ok(DfsOutcome {
                    combination: Some(combination),
                    nodes_explored,
                });
            }
            Step::Exhausted => {
                return Ok(DfsOutcome {
                    combination: None,
                    nodes_explored,
                })
            }
        }
    }
}
