//! OSRM HTTP adapter: table, route and nearest services.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::OracleError;
use crate::matrix::CostMatrix;
use crate::polyline::{PRECISION_5, Polyline};
use crate::route::PathResult;
use crate::traits::{Anchor, Anchoring, CostMatrixProvider, GraphVersion, PathOptions, PathProvider};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
    /// Checksum of the dataset the server was started with; binds client hints.
    pub data_checksum: u32,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
            data_checksum: 0,
        }
    }
}

impl OsrmConfig {
    /// Defaults overridden by `OSRM_BASE_URL`, `OSRM_PROFILE`,
    /// `OSRM_TIMEOUT_SECS` and `OSRM_CHECKSUM` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base_url) = std::env::var("OSRM_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(profile) = std::env::var("OSRM_PROFILE") {
            config.profile = profile;
        }
        if let Some(timeout) = env_number("OSRM_TIMEOUT_SECS") {
            config.timeout_secs = timeout;
        }
        if let Some(checksum) = env_number("OSRM_CHECKSUM") {
            config.data_checksum = checksum;
        }
        config
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OsrmConfig {
        &self.config
    }

    fn service_url(&self, service: &str, anchors: &[Anchor]) -> String {
        let coords = anchors
            .iter()
            .map(|anchor| format_coordinate(anchor.location))
            .collect::<Vec<_>>()
            .join(";");
        let mut url = format!(
            "{}/{}/v1/{}/{}",
            self.config.base_url, service, self.config.profile, coords
        );
        if anchors.iter().any(|anchor| anchor.handle.is_some()) {
            let hints = anchors
                .iter()
                .map(|anchor| anchor.handle.as_deref().unwrap_or(""))
                .collect::<Vec<_>>()
                .join(";");
            url.push_str("?hints=");
            url.push_str(&hints);
        }
        url
    }

    fn get<T: DeserializeOwned>(&self, url: String) -> Result<T, OracleError> {
        tracing::trace!(%url, "osrm request");
        // OSRM reports failures such as NoRoute in a JSON body with a 400
        // status, so the body is parsed regardless of status.
        Ok(self.client.get(url).send()?.json::<T>()?)
    }
}

fn format_coordinate((lat, lng): (f64, f64)) -> String {
    format!("{:.6},{:.6}", lng, lat)
}

fn append_query(url: &mut String, param: &str) {
    url.push(if url.contains('?') { '&' } else { '?' });
    url.push_str(param);
}

impl CostMatrixProvider for OsrmClient {
    fn cost_matrix(&self, anchors: &[Anchor]) -> Result<CostMatrix, OracleError> {
        if anchors.is_empty() {
            return Ok(CostMatrix::unreachable(0));
        }

        let mut url = self.service_url("table", anchors);
        append_query(&mut url, "annotations=duration");
        let body: OsrmTableResponse = self.get(url)?;
        table_to_matrix(body, anchors.len())
    }
}

impl PathProvider for OsrmClient {
    fn shortest_path(
        &self,
        waypoints: &[Anchor],
        options: &PathOptions,
    ) -> Result<PathResult, OracleError> {
        let mut url = self.service_url("route", waypoints);
        append_query(&mut url, "overview=full&geometries=polyline");
        append_query(
            &mut url,
            &format!("continue_straight={}", !options.allow_uturns),
        );
        let body: OsrmRouteResponse = self.get(url)?;
        route_to_path(body)
    }
}

impl Anchoring for OsrmClient {
    fn graph_version(&self) -> GraphVersion {
        GraphVersion {
            checksum: self.config.data_checksum,
            // The HTTP API does not expose the node count.
            node_count: u64::MAX,
        }
    }

    fn anchor(&self, coordinate: (f64, f64)) -> Result<Anchor, OracleError> {
        let url = format!(
            "{}/nearest/v1/{}/{}?number=1",
            self.config.base_url,
            self.config.profile,
            format_coordinate(coordinate)
        );
        let body: OsrmNearestResponse = self.get(url)?;
        nearest_to_anchor(body)
    }
}

#[derive(Debug, Deserialize)]
struct OsrmTableResponse {
    code: String,
    message: Option<String>,
    durations: Option<Vec<Vec<Option<f64>>>>,
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: String,
}

#[derive(Debug, Deserialize)]
struct OsrmNearestResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    waypoints: Vec<OsrmWaypoint>,
}

#[derive(Debug, Deserialize)]
struct OsrmWaypoint {
    hint: Option<String>,
    /// [lng, lat]
    location: [f64; 2],
    #[serde(default)]
    nodes: Vec<u64>,
}

fn check_code(code: &str, message: Option<String>) -> Result<(), OracleError> {
    match code {
        "Ok" => Ok(()),
        "NoRoute" => Err(OracleError::NoPath),
        "NoSegment" => Err(OracleError::InvalidAnchor {
            index: 0,
            reason: message.unwrap_or_else(|| "no road segment nearby".to_string()),
        }),
        other => Err(OracleError::Status {
            code: other.to_string(),
            message: message.unwrap_or_default(),
        }),
    }
}

/// Seconds to deciseconds, the integer cost unit shared with the matrix.
fn duration_cost(seconds: f64) -> u32 {
    (seconds * 10.0).round().clamp(0.0, f64::from(u32::MAX - 1)) as u32
}

fn table_to_matrix(body: OsrmTableResponse, size: usize) -> Result<CostMatrix, OracleError> {
    check_code(&body.code, body.message)?;
    let durations = body
        .durations
        .ok_or_else(|| OracleError::malformed("table response without durations"))?;
    if durations.len() != size {
        return Err(OracleError::malformed(format!(
            "{} table rows for {} locations",
            durations.len(),
            size
        )));
    }

    let rows = durations
        .into_iter()
        .map(|row| row.into_iter().map(|value| value.map(duration_cost)).collect())
        .collect();
    CostMatrix::from_rows(rows)
}

fn route_to_path(body: OsrmRouteResponse) -> Result<PathResult, OracleError> {
    check_code(&body.code, body.message)?;
    let route = body.routes.into_iter().next().ok_or(OracleError::NoPath)?;
    Ok(PathResult {
        cost: u64::from(duration_cost(route.duration)),
        distance: route.distance,
        duration: route.duration,
        geometry: Polyline::decode(&route.geometry, PRECISION_5)?,
    })
}

fn nearest_to_anchor(body: OsrmNearestResponse) -> Result<Anchor, OracleError> {
    check_code(&body.code, body.message)?;
    let waypoint = body
        .waypoints
        .into_iter()
        .next()
        .ok_or_else(|| OracleError::malformed("nearest response without waypoints"))?;
    let [lng, lat] = waypoint.location;
    Ok(Anchor {
        location: (lat, lng),
        node: waypoint.nodes.iter().copied().max().unwrap_or(0),
        handle: waypoint.hint,
    })
}
