pub mod case;
pub mod license_plate;
pub mod ob_entry;
pub mod officer;
pub mod police_vehicle;
pub mod report;

