//! Reqwest-backed implementations of the upstream contracts.

pub mod http;
pub mod nominatim;
pub mod open_elevation;
pub mod open_meteo;
pub mod osrm;
pub mod overpass;

pub use nominatim::NominatimGeocoder;
pub use open_elevation::OpenElevationSource;
pub use open_meteo::OpenMeteoSource;
pub use osrm::OsrmSource;
pub use overpass::OverpassSource;
