pub mod colors;
pub mod countries;
pub mod layout;
pub mod model;
pub mod months;
pub mod time_format;

pub use colors::{NEUTRAL_COLOR, TIER_COUNT, color_of, tier_label, tier_of};
pub use countries::{Country, country, display_name};
pub use layout::{PlacedMarker, Ring, RingLayout};
pub use model::*;
pub use months::{LegendEntry, MONTHS, MonthConfig, legend, month_of};
