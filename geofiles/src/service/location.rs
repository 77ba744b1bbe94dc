const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

pub const DEFAULT_RADIUS_METERS: f64 = 1000.0;

/// Great-circle distance between two `(latitude, longitude)` points.
pub fn distance_meters(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lng2) = (to.0.to_radians(), to.1.to_radians());

    let d_lat = lat2 - lat1;
    let d_lng = lng2 - lng1;

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Whether `[longitude, latitude]` coordinates lie within `radius` metres.
pub fn within(coordinates: &[f64], center: (f64, f64), radius: f64) -> bool {
    match coordinates {
        [lng, lat, ..] => distance_meters(center, (*lat, *lng)) <= radius,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_degree_of_latitude() {
        let d = distance_meters((0.0, 36.8), (1.0, 36.8));
        assert!((d - 111_195.0).abs() < 10.0, "{}", d);
        assert_eq!(distance_meters((-1.28, 36.82), (-1.28, 36.82)), 0.0);
    }

    #[test]
    fn test_within_radius() {
        let center = (37.7749, -122.4194);
        assert!(within(&[-122.4194, 37.7749], center, 1.0));
        assert!(within(&[-122.4100, 37.7749], center, 1000.0));
        assert!(!within(&[-122.3900, 37.7749], center, 1000.0));
        assert!(!within(&[-122.4194], center, 1000.0));
    }
}
