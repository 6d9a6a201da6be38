//! External collaborators: map rasters, date display, print fulfillment.

pub mod date;
pub mod fulfillment;
pub mod mapbox;

pub use date::format_display_date;
pub use fulfillment::{Fulfillment, GelatoClient, Order};
pub use mapbox::{GeocodeResult, MapImage, MapOptions, MapProvider, MapStyle, MapboxClient};
