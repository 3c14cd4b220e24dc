//! Round-trip query handling.
//!
//! Validates the query, anchors every coordinate (reusing client hints),
//! fetches the cost matrix, picks the best tour and assembles, annotates and
//! reports the resulting circuit. A query may instead carry its own visiting
//! order, in which case only assembly runs.

use std::time::Instant;

use crate::annotate::WaypointAnnotator;
use crate::assembler::RouteAssembler;
use crate::config::TripOptions;
use crate::error::{OracleError, Result, Stage, TripError};
use crate::hint::{encode_hint, resolve_locations};
use crate::report::TripReport;
use crate::selector::Selector;
use crate::tour::Tour;
use crate::traits::{Anchor, InstructionAnnotator, Oracle, ResultSink};

/// Status reported for an answered query.
pub const STATUS_OK: u16 = 200;

/// HTTP-style status for a query outcome.
pub fn status_code<T>(result: &Result<T>) -> u16 {
    match result {
        Ok(_) => STATUS_OK,
        Err(err) => err.status_code(),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripQuery {
    /// Raw (lat, lng) input coordinates.
    pub coordinates: Vec<(f64, f64)>,
    /// Hint tokens from an earlier response, by coordinate index.
    pub hints: Vec<Option<String>>,
    /// Checksum of the graph the hints were issued for.
    pub checksum: Option<u32>,
    /// Visiting order to route as-is instead of searching for one.
    pub order: Option<Vec<usize>>,
}

impl TripQuery {
    pub fn new(coordinates: Vec<(f64, f64)>) -> Self {
        Self {
            coordinates,
            ..Self::default()
        }
    }

    pub fn with_hints(mut self, hints: Vec<Option<String>>, checksum: u32) -> Self {
        self.hints = hints;
        self.checksum = Some(checksum);
        self
    }

    pub fn with_order(mut self, order: Vec<usize>) -> Self {
        self.order = Some(order);
        self
    }
}

pub struct TripPlanner<'a, O: ?Sized, A = WaypointAnnotator> {
    oracle: &'a O,
    options: TripOptions,
    annotator: A,
}

impl<'a, O> TripPlanner<'a, O, WaypointAnnotator>
where
    O: Oracle + Sync + ?Sized,
{
    pub fn new(oracle: &'a O, options: TripOptions) -> Self {
        Self {
            oracle,
            options,
            annotator: WaypointAnnotator::default(),
        }
    }
}

impl<'a, O, A> TripPlanner<'a, O, A>
where
    O: Oracle + Sync + ?Sized,
    A: InstructionAnnotator,
{
    pub fn with_annotator<B: InstructionAnnotator>(self, annotator: B) -> TripPlanner<'a, O, B> {
        TripPlanner {
            oracle: self.oracle,
            options: self.options,
            annotator,
        }
    }

    pub fn options(&self) -> &TripOptions {
        &self.options
    }

    pub fn plan(&self, query: &TripQuery) -> Result<TripReport> {
        let started = Instant::now();
        let explicit = validate_query(query)?;

        let locations = resolve_locations(self.oracle, &query.coordinates, &query.hints, query.checksum)?;
        let anchors: Vec<Anchor> = locations.iter().map(|location| location.anchor.clone()).collect();
        let assembler = RouteAssembler::new(self.oracle, &anchors, self.options.path_options())
            .concurrent_legs(self.options.concurrent_legs);

        let (tour, route, stats, strategy) = match explicit {
            Some(tour) => {
                let route = assembler.assemble(&tour)?;
                (tour, route, None, None)
            }
            None => {
                let matrix = self
                    .oracle
                    .cost_matrix(&anchors)
                    .map_err(|err| TripError::oracle(Stage::Matrix, err))?;
                if matrix.size() != anchors.len() {
                    return Err(TripError::oracle(
                        Stage::Matrix,
                        OracleError::malformed(format!(
                            "{}x{} matrix for {} locations",
                            matrix.size(),
                            matrix.size(),
                            anchors.len()
                        )),
                    ));
                }

                let strategy = self.options.strategy.strategy();
                let selection = Selector::new(strategy, &assembler)
                    .timeout(self.options.timeout())
                    .parallel(self.options.parallel)
                    .assembly(self.options.assembly)
                    .select(&matrix)?;
                let best = selection.best;
                (best.tour, best.route, Some(selection.stats), Some(strategy.name().to_string()))
            }
        };

        let route = route.with_instructions(self.annotator.annotate(&route));
        let checksum = self.oracle.graph_version().checksum;
        let hints = locations
            .iter()
            .map(|location| encode_hint(&location.anchor, checksum))
            .collect();
        let runtime_ms = started.elapsed().as_millis() as u64;

        tracing::debug!(
            distance = route.total_cost,
            stops = tour.len(),
            locations = anchors.len(),
            runtime_ms,
            "trip planned"
        );

        Ok(TripReport {
            loc_permutation: tour.positions(),
            distance: route.total_cost,
            route,
            runtime_ms,
            strategy,
            hints,
            stats,
        })
    }

    /// Plans the query and hands the report to `sink` on success.
    pub fn plan_into(&self, query: &TripQuery, sink: &mut dyn ResultSink) -> Result<()> {
        let report = self.plan(query)?;
        sink.emit(&report);
        Ok(())
    }
}

/// Checks the query before any oracle call. Returns the caller's visiting
/// order as a tour when one was supplied.
fn validate_query(query: &TripQuery) -> Result<Option<Tour>> {
    if query.coordinates.len() < 2 {
        return Err(TripError::invalid_input(
            None,
            format!(
                "a round trip needs at least 2 coordinates, got {}",
                query.coordinates.len()
            ),
        ));
    }
    if query.hints.len() > query.coordinates.len() {
        return Err(TripError::invalid_input(
            None,
            format!(
                "{} hints for {} coordinates",
                query.hints.len(),
                query.coordinates.len()
            ),
        ));
    }
    for (index, &(lat, lng)) in query.coordinates.iter().enumerate() {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(TripError::invalid_input(Some(index), format!("latitude {} out of range", lat)));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(TripError::invalid_input(Some(index), format!("longitude {} out of range", lng)));
        }
    }

    let Some(order) = &query.order else {
        return Ok(None);
    };
    let tour = Tour::new(order.clone(), query.coordinates.len())?;
    if !tour.is_complete() {
        return Err(TripError::invalid_input(
            None,
            format!(
                "order visits {} of {} locations",
                tour.len(),
                query.coordinates.len()
            ),
        ));
    }
    Ok(Some(tour))
}
