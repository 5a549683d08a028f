mod geopackage;
mod postgis;

pub use geopackage::*;
pub use postgis::*;
