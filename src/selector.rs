//! Best-of-N start selection.
//!
//! Every start location that is not known to be isolated gets one tour from
//! the configured strategy. Candidates are ranked by cost, then complete
//! before partial, then by start index, so the outcome does not depend on
//! the order trials finish in. Per-start failures are absorbed; only a total
//! absence of candidates reaches the caller.

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::assembler::RouteAssembler;
use crate::config::AssemblyMode;
use crate::error::{Result, TripError};
use crate::matrix::CostMatrix;
use crate::reachability::{ReachabilityCache, ReachabilityStatus};
use crate::route::RouteResult;
use crate::strategy::{TourCandidate, TourStrategy};
use crate::tour::Tour;
use crate::traits::PathProvider;

/// The winning tour of one query together with its routed circuit.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateResult {
    pub start: usize,
    pub tour: Tour,
    pub route: RouteResult,
    /// Matrix cost of the edges the strategy chose.
    pub estimated_cost: u64,
}

impl CandidateResult {
    pub fn total_cost(&self) -> u64 {
        self.route.total_cost
    }

    /// Visiting position of each input location (`None` when left out).
    pub fn positions(&self) -> Vec<Option<usize>> {
        self.tour.positions()
    }
}

/// Timing and bookkeeping for one selection run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionStats {
    /// Starts whose construction ran.
    pub starts_tried: usize,
    /// Starts skipped as isolated or because the deadline had passed.
    pub starts_skipped: usize,
    /// Tried starts that produced no usable route.
    pub candidates_failed: usize,
    pub isolated: Vec<usize>,
    pub elapsed_ms: u64,
    pub timed_out: bool,
}

#[derive(Debug, Clone)]
pub struct Selection {
    pub best: CandidateResult,
    pub stats: SelectionStats,
}

pub struct Selector<'a, P: ?Sized> {
    strategy: &'a dyn TourStrategy,
    assembler: &'a RouteAssembler<'a, P>,
    timeout: Option<Duration>,
    parallel: bool,
    assembly: AssemblyMode,
}

impl<'a, P> Selector<'a, P>
where
    P: PathProvider + Sync + ?Sized,
{
    pub fn new(strategy: &'a dyn TourStrategy, assembler: &'a RouteAssembler<'a, P>) -> Self {
        Self {
            strategy,
            assembler,
            timeout: None,
            parallel: false,
            assembly: AssemblyMode::Eager,
        }
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn assembly(mut self, assembly: AssemblyMode) -> Self {
        self.assembly = assembly;
        self
    }

    pub fn select(&self, matrix: &CostMatrix) -> Result<Selection> {
        let started = Instant::now();
        let cache = ReachabilityCache::new(matrix.size());

        let (best, mut tally) = match self.assembly {
            AssemblyMode::Eager => {
                let tally = self.run_trials(matrix, &cache, started, 1, |start, candidate| {
                    self.assemble(start, candidate)
                });
                let mut tally = tally;
                let best = tally.kept.pop();
                (best, tally.without_candidates())
            }
            AssemblyMode::Deferred => {
                let tally = self.run_trials(matrix, &cache, started, usize::MAX, |start, candidate| {
                    Ok(Planned {
                        start,
                        estimate: candidate.tour.circuit_cost(matrix),
                        candidate,
                    })
                });
                self.assemble_first_routable(tally)?
            }
        };

        if let Some(err) = tally.fatal.take() {
            return Err(err);
        }

        let stats = SelectionStats {
            starts_tried: tally.tried,
            starts_skipped: tally.skipped + tally.expired,
            candidates_failed: tally.failed,
            isolated: cache.isolated(),
            elapsed_ms: started.elapsed().as_millis() as u64,
            timed_out: tally.expired > 0,
        };

        match best {
            Some(best) => {
                tracing::info!(
                    strategy = self.strategy.name(),
                    start = best.start,
                    cost = best.total_cost(),
                    stops = best.tour.len(),
                    tried = stats.starts_tried,
                    failed = stats.candidates_failed,
                    elapsed_ms = stats.elapsed_ms,
                    timed_out = stats.timed_out,
                    "selected round trip"
                );
                Ok(Selection { best, stats })
            }
            None if stats.timed_out => Err(TripError::Timeout {
                elapsed_ms: stats.elapsed_ms,
                starts_tried: stats.starts_tried,
            }),
            None => Err(TripError::NoRouteFound {
                locations: matrix.size(),
                isolated: stats.isolated,
                failed: stats.candidates_failed,
            }),
        }
    }

    /// Runs one trial per start index and folds the outcomes, keeping at
    /// most `keep` of the best-ranked items.
    fn run_trials<T, F>(
        &self,
        matrix: &CostMatrix,
        cache: &ReachabilityCache,
        started: Instant,
        keep: usize,
        finish: F,
    ) -> Tally<T>
    where
        T: Ranked + Send,
        F: Fn(usize, TourCandidate) -> Result<T> + Sync,
    {
        let step = |tally: Tally<T>, start: usize| {
            if tally.fatal.is_some() {
                return tally;
            }
            let outcome = self.trial(start, matrix, cache, started, &finish);
            tally.absorb(start, outcome, keep)
        };
        let identity = || Tally::new();

        if self.parallel {
            (0..matrix.size())
                .into_par_iter()
                .fold(identity, step)
                .reduce(identity, |a, b| a.merge(b, keep))
        } else {
            (0..matrix.size()).fold(identity(), step)
        }
    }

    fn trial<T, F>(
        &self,
        start: usize,
        matrix: &CostMatrix,
        cache: &ReachabilityCache,
        started: Instant,
        finish: &F,
    ) -> Outcome<T>
    where
        F: Fn(usize, TourCandidate) -> Result<T>,
    {
        if self.timeout.is_some_and(|timeout| started.elapsed() >= timeout) {
            return Outcome::Expired;
        }
        if cache.classify(start, matrix) == ReachabilityStatus::Isolated {
            tracing::debug!(start, "skipping isolated start");
            return Outcome::Skipped;
        }

        match self
            .strategy
            .build(start, matrix, cache)
            .and_then(|candidate| finish(start, candidate))
        {
            Ok(item) => Outcome::Found(item),
            Err(err) => Outcome::Failed(err),
        }
    }

    fn assemble(&self, start: usize, candidate: TourCandidate) -> Result<CandidateResult> {
        let route = self.assembler.assemble(&candidate.tour)?;
        tracing::debug!(start, cost = route.total_cost, stops = candidate.tour.len(), "assembled candidate");
        Ok(CandidateResult {
            start,
            tour: candidate.tour,
            route,
            estimated_cost: candidate.estimated_cost,
        })
    }

    /// Assembles planned tours cheapest-first until one routes end to end.
    fn assemble_first_routable(
        &self,
        mut tally: Tally<Planned>,
    ) -> Result<(Option<CandidateResult>, Tally<CandidateResult>)> {
        let planned = std::mem::take(&mut tally.kept);
        let mut tally = tally.without_candidates();

        if tally.fatal.is_some() {
            return Ok((None, tally));
        }

        for plan in planned {
            match self.assemble(plan.start, plan.candidate) {
                Ok(best) => return Ok((Some(best), tally)),
                Err(err) if is_local(&err) => {
                    tracing::debug!(start = plan.start, error = %err, "planned tour failed to route");
                    tally.failed += 1;
                }
                Err(err) => return Err(err),
            }
        }
        Ok((None, tally))
    }
}

/// Failures that only disqualify one candidate.
fn is_local(err: &TripError) -> bool {
    matches!(
        err,
        TripError::NoViableStart { .. } | TripError::UnreachableLeg { .. }
    )
}

/// Ordering key: cost, complete before partial, lowest start index.
trait Ranked {
    fn rank(&self) -> (u64, bool, usize);
}

impl Ranked for CandidateResult {
    fn rank(&self) -> (u64, bool, usize) {
        (self.total_cost(), !self.tour.is_complete(), self.start)
    }
}

/// A constructed but not yet routed tour (deferred assembly).
struct Planned {
    start: usize,
    estimate: u64,
    candidate: TourCandidate,
}

impl Ranked for Planned {
    fn rank(&self) -> (u64, bool, usize) {
        (self.estimate, !self.candidate.tour.is_complete(), self.start)
    }
}

enum Outcome<T> {
    Expired,
    Skipped,
    Failed(TripError),
    Found(T),
}

struct Tally<T> {
    kept: Vec<T>,
    tried: usize,
    skipped: usize,
    expired: usize,
    failed: usize,
    fatal: Option<TripError>,
}

impl<T: Ranked> Tally<T> {
    fn new() -> Self {
        Self {
            kept: Vec::new(),
            tried: 0,
            skipped: 0,
            expired: 0,
            failed: 0,
            fatal: None,
        }
    }

    fn absorb(mut self, start: usize, outcome: Outcome<T>, keep: usize) -> Self {
        match outcome {
            Outcome::Expired => self.expired += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed(err) => {
                self.tried += 1;
                if is_local(&err) {
                    tracing::debug!(start, error = %err, "discarding start");
                    self.failed += 1;
                } else {
                    self.fatal = Some(err);
                }
            }
            Outcome::Found(item) => {
                self.tried += 1;
                self.kept.push(item);
                self.retain_best(keep);
            }
        }
        self
    }

    fn merge(mut self, other: Self, keep: usize) -> Self {
        self.kept.extend(other.kept);
        self.retain_best(keep);
        self.tried += other.tried;
        self.skipped += other.skipped;
        self.expired += other.expired;
        self.failed += other.failed;
        self.fatal = match (self.fatal, other.fatal) {
            (Some(a), _) => Some(a),
            (None, b) => b,
        };
        self
    }

    fn retain_best(&mut self, keep: usize) {
        self.kept.sort_by(|a, b| compare(a, b));
        self.kept.truncate(keep);
    }

    fn without_candidates<U>(self) -> Tally<U> {
        Tally {
            kept: Vec::new(),
            tried: self.tried,
            skipped: self.skipped,
            expired: self.expired,
            failed: self.failed,
            fatal: self.fatal,
        }
    }
}

fn compare<T: Ranked>(a: &T, b: &T) -> Ordering {
    a.rank().cmp(&b.rank())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OracleError;
    use crate::nearest_neighbor::NearestNeighbor;
    use crate::polyline::Polyline;
    use crate::route::PathResult;
    use crate::traits::{Anchor, PathOptions};

    /// Routes each leg at the matrix cost; missing entries have no path.
    struct MatrixOracle(CostMatrix);

    impl PathProvider for MatrixOracle {
        fn shortest_path(
            &self,
            waypoints: &[Anchor],
            _options: &PathOptions,
        ) -> std::result::Result<PathResult, OracleError> {
            let (from, to) = (waypoints[0].node as usize, waypoints[1].node as usize);
            let cost = self.0.get(from, to).ok_or(OracleError::NoPath)?;
            Ok(PathResult {
                cost: u64::from(cost),
                distance: f64::from(cost),
                duration: f64::from(cost),
                geometry: Polyline::default(),
            })
        }
    }

    fn anchors(n: usize) -> Vec<Anchor> {
        (0..n)
            .map(|i| Anchor {
                location: (0.0, 0.0),
                node: i as u64,
                handle: None,
            })
            .collect()
    }

    fn triangle() -> CostMatrix {
        CostMatrix::from_rows(vec![
            vec![Some(0), Some(1), Some(5)],
            vec![Some(1), Some(0), Some(1)],
            vec![Some(5), Some(1), Some(0)],
        ])
        .unwrap()
    }

    #[test]
    fn test_ties_go_to_earliest_start() {
        let matrix = triangle();
        let oracle = MatrixOracle(matrix.clone());
        let anchors = anchors(3);
        let assembler = RouteAssembler::new(&oracle, &anchors, PathOptions::default());

        let selection = Selector::new(&NearestNeighbor, &assembler).select(&matrix).unwrap();
        assert_eq!(selection.best.start, 0);
        assert_eq!(selection.best.total_cost(), 7);
        assert_eq!(selection.stats.starts_tried, 3);
        assert!(!selection.stats.timed_out);
    }

    #[test]
    fn test_zero_timeout_reports_timeout() {
        let matrix = triangle();
        let oracle = MatrixOracle(matrix.clone());
        let anchors = anchors(3);
        let assembler = RouteAssembler::new(&oracle, &anchors, PathOptions::default());

        let err = Selector::new(&NearestNeighbor, &assembler)
            .timeout(Some(Duration::ZERO))
            .select(&matrix)
            .unwrap_err();
        assert!(matches!(err, TripError::Timeout { starts_tried: 0, .. }));
    }

    #[test]
    fn test_deferred_matches_eager_on_routable_matrix() {
        let matrix = triangle();
        let oracle = MatrixOracle(matrix.clone());
        let anchors = anchors(3);
        let assembler = RouteAssembler::new(&oracle, &anchors, PathOptions::default());

        let eager = Selector::new(&NearestNeighbor, &assembler).select(&matrix).unwrap();
        let deferred = Selector::new(&NearestNeighbor, &assembler)
            .assembly(AssemblyMode::Deferred)
            .select(&matrix)
            .unwrap();
        assert_eq!(eager.best, deferred.best);
    }

    #[test]
    fn test_complete_beats_partial_at_equal_cost() {
        let complete = CandidateResult {
            start: 2,
            tour: Tour::new(vec![2, 0, 1], 3).unwrap(),
            route: RouteResult::from_legs(Vec::new(), vec![2, 0, 1]),
            estimated_cost: 0,
        };
        let partial = CandidateResult {
            start: 0,
            tour: Tour::new(vec![0, 1], 3).unwrap(),
            route: RouteResult::from_legs(Vec::new(), vec![0, 1]),
            estimated_cost: 0,
        };
        assert_eq!(compare(&complete, &partial), Ordering::Less);
    }
}
