//! Built-in sections
//!
//! Record types for the object sections a project file commonly carries, and
//! the registration of every built-in handler.

pub mod controls;
pub mod curves;
pub mod hydrology;
pub mod network;
pub mod quality;
pub mod tags;
pub mod transects;

use crate::inp::registry::{Handler, Registry};
use crate::inp::settings::SettingsKind;

pub const TITLE: &str = "TITLE";
pub const RAINGAGES: &str = "RAINGAGES";
pub const SYMBOLS: &str = "SYMBOLS";
pub const SUBCATCHMENTS: &str = "SUBCATCHMENTS";
pub const SUBAREAS: &str = "SUBAREAS";
pub const INFILTRATION: &str = "INFILTRATION";
pub const POLYGONS: &str = "POLYGONS";
pub const LOADINGS: &str = "LOADINGS";
pub const JUNCTIONS: &str = "JUNCTIONS";
pub const CONDUITS: &str = "CONDUITS";
pub const COORDINATES: &str = "COORDINATES";
pub const VERTICES: &str = "VERTICES";
pub const TRANSECTS: &str = "TRANSECTS";
pub const POLLUTANTS: &str = "POLLUTANTS";
pub const PATTERNS: &str = "PATTERNS";
pub const CURVES: &str = "CURVES";
pub const TIMESERIES: &str = "TIMESERIES";
pub const CONTROLS: &str = "CONTROLS";
pub const TAGS: &str = "TAGS";

pub fn register_builtins(registry: &mut Registry) {
    registry.register(TITLE, Handler::Title);
    for kind in SettingsKind::ALL {
        registry.register(kind.section_name(), Handler::Settings(kind));
    }

    registry.register_record::<hydrology::RainGage>(RAINGAGES);
    registry.register_record::<hydrology::Symbol>(SYMBOLS);
    registry.register_record::<hydrology::Subcatchment>(SUBCATCHMENTS);
    registry.register_record::<hydrology::Subarea>(SUBAREAS);
    registry.register_record::<hydrology::Infiltration>(INFILTRATION);
    registry.register_record::<hydrology::Polygon>(POLYGONS);
    registry.register_record::<hydrology::Loading>(LOADINGS);

    registry.register_record::<network::Junction>(JUNCTIONS);
    registry.register_record::<network::Conduit>(CONDUITS);
    registry.register_record::<network::Coordinate>(COORDINATES);
    registry.register_record::<network::Vertices>(VERTICES);
    registry.register_record::<transects::Transect>(TRANSECTS);

    registry.register_record::<quality::Pollutant>(POLLUTANTS);

    registry.register_record::<curves::Pattern>(PATTERNS);
    registry.register_record::<curves::Curve>(CURVES);
    registry.register_record::<curves::Timeseries>(TIMESERIES);

    registry.register_record::<controls::Control>(CONTROLS);
    registry.register_record::<tags::Tag>(TAGS);
}
