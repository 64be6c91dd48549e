//! Application layer for SkyAtlas
//!
//! Wires the catalog aggregator and the weather store together behind an
//! explicitly constructed [`AppContext`], and holds the state a rendering
//! surface needs: the browse table's filter/sort selection and the weather
//! detail route.

pub mod browse;
pub mod context;
pub mod routes;

pub use browse::BrowseState;
pub use context::AppContext;
pub use routes::{detail_path, parse_detail_path, DetailView, RouteError, WEATHER_ROUTE_PREFIX};
