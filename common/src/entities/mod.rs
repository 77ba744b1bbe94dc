pub mod case;
pub mod evidence;
pub mod geofile;
pub mod license_plate;
pub mod ob_entry;
pub mod officer;
pub mod police_vehicle;
pub mod profile;
pub mod report;
pub mod reset_token;
pub mod role;
pub mod user;
