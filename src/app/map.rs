use crate::domain::model::{Coordinate, Trip};
use serde::Serialize;
use url::Url;

pub const DEFAULT_ZOOM: u8 = 11;

const OSM_DIRECTIONS_URL: &str = "https://www.openstreetmap.org/directions";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub label: String,
    pub coordinate: Coordinate,
}

/// The two ride endpoints as a plottable map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub points: Vec<MapPoint>,
    pub zoom: u8,
}

impl MapView {
    pub fn for_trip(trip: &Trip) -> Self {
        Self {
            points: vec![
                MapPoint {
                    label: "pickup".to_string(),
                    coordinate: trip.pickup,
                },
                MapPoint {
                    label: "dropoff".to_string(),
                    coordinate: trip.dropoff,
                },
            ],
            zoom: DEFAULT_ZOOM,
        }
    }

    /// Mean of the plotted points.
    pub fn center(&self) -> Option<Coordinate> {
        if self.points.is_empty() {
            return None;
        }
        let n = self.points.len() as f64;
        let latitude = self.points.iter().map(|p| p.coordinate.latitude).sum::<f64>() / n;
        let longitude = self.points.iter().map(|p| p.coordinate.longitude).sum::<f64>() / n;
        Some(Coordinate {
            latitude,
            longitude,
        })
    }

    pub fn osm_url(&self) -> Option<String> {
        let center = self.center()?;
        let route = self
            .points
            .iter()
            .map(|p| format!("{},{}", p.coordinate.latitude, p.coordinate.longitude))
            .collect::<Vec<_>>()
            .join(";");

        let mut url = Url::parse_with_params(
            OSM_DIRECTIONS_URL,
            &[("engine", "fossgis_osrm_car"), ("route", route.as_str())],
        )
        .ok()?;
        url.set_fragment(Some(&format!(
            "map={}/{:.4}/{:.4}",
            self.zoom, center.latitude, center.longitude
        )));
        Some(url.to_string())
    }
}
