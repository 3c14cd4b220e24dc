//! Real Las Vegas / Henderson stops for end-to-end fixtures.
//!
//! Coordinates sourced from OpenStreetMap via Overpass API and routable
//! against the OSRM Nevada extract.

#[derive(Debug, Clone, Copy)]
pub struct Stop {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Stop {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

// ============================================================================
// Strip
// ============================================================================

pub const STRIP_STOPS: &[Stop] = &[
    Stop::new("Wynn Las Vegas", 36.1263781, -115.1658180),
    Stop::new("Caesars Palace", 36.1162, -115.1745),
    Stop::new("Bellagio", 36.1126, -115.1767),
    Stop::new("MGM Grand", 36.1023654, -115.1688720),
    Stop::new("Hard Rock Cafe", 36.1041592, -115.1722166),
    Stop::new("Brooklyn Bowl", 36.1175388, -115.1695094),
];

// ============================================================================
// Metro area
// ============================================================================

pub const METRO_STOPS: &[Stop] = &[
    Stop::new("Rivas Mexican Grill North", 36.1450055, -115.0482587),
    Stop::new("Beers and Bets", 36.1428945, -115.1573836),
    Stop::new("Wynn Las Vegas", 36.1263781, -115.1658180),
    Stop::new("MGM Grand", 36.1023654, -115.1688720),
    Stop::new("Bootlegger Bistro", 36.0492047, -115.1715744),
    Stop::new("Green Valley Ranch Area", 36.0308, -115.0825),
    Stop::new("Sunset Station Area", 36.0614, -115.0631),
    Stop::new("Longhorn Casino", 36.1070664, -115.0591256),
    Stop::new("I Love Sushi Henderson", 35.9916660, -115.1028343),
    Stop::new("Islander's Grill", 36.0335058, -114.9856162),
];

/// Far outside the metro area; unreachable under a short reach limit.
pub const RENO: Stop = Stop::new("Reno Arch", 39.5296, -119.8138);

pub fn coordinates(stops: &[Stop]) -> Vec<(f64, f64)> {
    stops.iter().map(Stop::coords).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_in_vegas_area() {
        for stop in STRIP_STOPS.iter().chain(METRO_STOPS) {
            assert!(stop.lat > 35.9 && stop.lat < 36.3, "{} lat out of range: {}", stop.name, stop.lat);
            assert!(stop.lng > -115.4 && stop.lng < -114.8, "{} lng out of range: {}", stop.name, stop.lng);
        }
    }
}
