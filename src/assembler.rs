//! Turns a tour into a routed circuit, one oracle request per leg.

use rayon::prelude::*;

use crate::error::{OracleError, Result, Stage, TripError};
use crate::route::{Leg, RouteResult};
use crate::tour::Tour;
use crate::traits::{Anchor, PathOptions, PathProvider};

pub struct RouteAssembler<'a, P: ?Sized> {
    oracle: &'a P,
    anchors: &'a [Anchor],
    options: PathOptions,
    concurrent_legs: bool,
}

impl<'a, P> RouteAssembler<'a, P>
where
    P: PathProvider + Sync + ?Sized,
{
    pub fn new(oracle: &'a P, anchors: &'a [Anchor], options: PathOptions) -> Self {
        Self {
            oracle,
            anchors,
            options,
            concurrent_legs: false,
        }
    }

    /// Issue leg requests in parallel. Only for oracles that accept
    /// concurrent queries.
    pub fn concurrent_legs(mut self, enabled: bool) -> Self {
        self.concurrent_legs = enabled;
        self
    }

    /// Routes every consecutive pair of the tour, including the leg back to
    /// the start, and concatenates the legs in tour order.
    ///
    /// Any leg without a path rejects the whole route.
    pub fn assemble(&self, tour: &Tour) -> Result<RouteResult> {
        if tour.size() != self.anchors.len() {
            return Err(TripError::invalid_input(
                None,
                format!(
                    "tour over {} locations but {} anchors",
                    tour.size(),
                    self.anchors.len()
                ),
            ));
        }
        if tour.is_empty() {
            return Err(TripError::invalid_input(None, "cannot assemble an empty tour"));
        }

        let legs = if self.concurrent_legs {
            let pairs: Vec<(usize, usize)> = tour.legs().collect();
            pairs
                .par_iter()
                .map(|&(from, to)| self.route_leg(from, to))
                .collect::<Result<Vec<_>>>()?
        } else {
            tour.legs()
                .map(|(from, to)| self.route_leg(from, to))
                .collect::<Result<Vec<_>>>()?
        };

        Ok(RouteResult::from_legs(legs, tour.stops().to_vec()))
    }

    fn route_leg(&self, from: usize, to: usize) -> Result<Leg> {
        let waypoints = [self.anchors[from].clone(), self.anchors[to].clone()];
        match self.oracle.shortest_path(&waypoints, &self.options) {
            Ok(path) => Ok(Leg::new(from, to, path)),
            Err(OracleError::NoPath) => {
                tracing::debug!(from, to, "oracle found no path for leg");
                Err(TripError::UnreachableLeg { from, to })
            }
            Err(err) => Err(TripError::oracle(Stage::Assembly, err)),
        }
    }
}
