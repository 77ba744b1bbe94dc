pub mod geofile;
pub mod location;
