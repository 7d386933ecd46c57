//! Cálculos geográficos puros
//!
//! Distancia de gran círculo (Haversine) y rumbo inicial entre dos puntos
//! lat/lon en grados. Sin dependencias y sin condiciones de error: las
//! coordenadas NaN o fuera de rango se propagan tal cual, la validación
//! es responsabilidad de la frontera.

/// Radio medio de la Tierra en kilómetros
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distancia de gran círculo en kilómetros entre dos puntos (grados)
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Rumbo inicial (azimut) en grados [0, 360) del punto 1 al punto 2
pub fn initial_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let dlon_rad = (lon2 - lon1).to_radians();

    let y = dlon_rad.sin() * lat2_rad.cos();
    let x = lat1_rad.cos() * lat2_rad.sin() - lat1_rad.sin() * lat2_rad.cos() * dlon_rad.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

#[cfg(test)]
mod tests {
    use super::*;

    // Centro de París y Opéra Garnier
    const PARIS: (f64, f64) = (48.8566, 2.3522);
    const OPERA: (f64, f64) = (48.8708, 2.3317);

    #[test]
    fn test_distance_identical_points_is_zero() {
        assert_eq!(distance_km(PARIS.0, PARIS.1, PARIS.0, PARIS.1), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let d1 = distance_km(PARIS.0, PARIS.1, OPERA.0, OPERA.1);
        let d2 = distance_km(OPERA.0, OPERA.1, PARIS.0, PARIS.1);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn test_distance_paris_to_opera() {
        // ~2.1 km a vuelo de pájaro; comprobamos cota, no valor exacto
        let d = distance_km(PARIS.0, PARIS.1, OPERA.0, OPERA.1);
        assert!(d > 2.0 && d < 2.3, "distance was {}", d);
    }

    #[test]
    fn test_distance_grows_with_separation() {
        let near = distance_km(PARIS.0, PARIS.1, 48.86, 2.36);
        let far = distance_km(PARIS.0, PARIS.1, 48.90, 2.40);
        assert!(far > near);
    }

    #[test]
    fn test_bearing_normalized_range() {
        let b = initial_bearing(OPERA.0, OPERA.1, PARIS.0, PARIS.1);
        assert!((0.0..360.0).contains(&b), "bearing was {}", b);
    }

    #[test]
    fn test_bearing_due_north() {
        let b = initial_bearing(48.0, 2.0, 49.0, 2.0);
        assert!(b.abs() < 1e-6, "bearing was {}", b);
    }

    #[test]
    fn test_bearing_due_east() {
        let b = initial_bearing(0.0, 0.0, 0.0, 1.0);
        assert!((b - 90.0).abs() < 1e-6, "bearing was {}", b);
    }

    #[test]
    fn test_nan_propagates() {
        assert!(distance_km(f64::NAN, 2.0, 48.0, 2.0).is_nan());
        assert!(initial_bearing(f64::NAN, 2.0, 48.0, 2.0).is_nan());
    }
}
