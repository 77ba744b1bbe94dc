pub mod geofile;
