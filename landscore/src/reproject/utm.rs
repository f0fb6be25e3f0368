//! Projection UTM (Universal Transverse Mercator)
//!
//! Séries de Krüger à l'ordre 6 en n (Karney 2011), précises au nanomètre
//! dans la zone et largement sous le millimètre jusqu'à quelques degrés au-delà.

use super::ellipsoid::WGS84;
use super::Geographic;
use crate::crs::UtmZone;

/// Facteur d'échelle sur le méridien central
const K0: f64 = 0.9996;

/// False easting
const FALSE_EASTING: f64 = 500000.0;

/// False northing de l'hémisphère sud
const FALSE_NORTHING_SOUTH: f64 = 10000000.0;

/// Rayon rectifiant A = a / (1 + n) · (1 + n²/4 + n⁴/64 + n⁶/256)
fn rectifying_radius() -> f64 {
    let n = WGS84::N;
    let n2 = n * n;
    WGS84::A / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0 + n2 * n2 * n2 / 256.0)
}

/// Coefficients α (géographique → plan)
fn alpha() -> [f64; 6] {
    let n = WGS84::N;
    let (n2, n3, n4, n5, n6) = (n.powi(2), n.powi(3), n.powi(4), n.powi(5), n.powi(6));
    [
        n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0 - 127.0 * n5 / 288.0
            + 7891.0 * n6 / 37800.0,
        13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0 + 281.0 * n5 / 630.0
            - 1983433.0 * n6 / 1935360.0,
        61.0 * n3 / 240.0 - 103.0 * n4 / 140.0 + 15061.0 * n5 / 26880.0
            + 167603.0 * n6 / 181440.0,
        49561.0 * n4 / 161280.0 - 179.0 * n5 / 168.0 + 6601661.0 * n6 / 7257600.0,
        34729.0 * n5 / 80640.0 - 3418889.0 * n6 / 1995840.0,
        212378941.0 * n6 / 319334400.0,
    ]
}

/// Coefficients β (plan → géographique)
fn beta() -> [f64; 6] {
    let n = WGS84::N;
    let (n2, n3, n4, n5, n6) = (n.powi(2), n.powi(3), n.powi(4), n.powi(5), n.powi(6));
    [
        n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0 - 81.0 * n5 / 512.0
            + 96199.0 * n6 / 604800.0,
        n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0 + 46.0 * n5 / 105.0
            - 1118711.0 * n6 / 3870720.0,
        17.0 * n3 / 480.0 - 37.0 * n4 / 840.0 - 209.0 * n5 / 4480.0 + 5569.0 * n6 / 90720.0,
        4397.0 * n4 / 161280.0 - 11.0 * n5 / 504.0 - 830251.0 * n6 / 7257600.0,
        4583.0 * n5 / 161280.0 - 108847.0 * n6 / 3991680.0,
        20648693.0 * n6 / 638668800.0,
    ]
}

/// τ' (tangente de la latitude conforme) depuis τ = tan(φ)
fn conformal_tau(tau: f64) -> f64 {
    let e = WGS84::E;
    let sigma = (e * (e * tau / (1.0 + tau * tau).sqrt()).atanh()).sinh();
    tau * (1.0 + sigma * sigma).sqrt() - sigma * (1.0 + tau * tau).sqrt()
}

/// Convertit des coordonnées géographiques WGS84 vers UTM (x, y) en mètres
pub fn geographic_to_utm(geo: Geographic, zone: UtmZone) -> (f64, f64) {
    let lambda = geo.lon - zone.central_meridian().to_radians();
    let tau_p = conformal_tau(geo.lat.tan());

    let (sin_l, cos_l) = lambda.sin_cos();
    let xi_p = tau_p.atan2(cos_l);
    let eta_p = (sin_l / (tau_p * tau_p + cos_l * cos_l).sqrt()).asinh();

    let mut xi = xi_p;
    let mut eta = eta_p;
    for (j, a) in alpha().iter().enumerate() {
        let k = 2.0 * (j + 1) as f64;
        xi += a * (k * xi_p).sin() * (k * eta_p).cosh();
        eta += a * (k * xi_p).cos() * (k * eta_p).sinh();
    }

    let scale = K0 * rectifying_radius();
    let x = FALSE_EASTING + scale * eta;
    let y = if zone.south {
        FALSE_NORTHING_SOUTH + scale * xi
    } else {
        scale * xi
    };
    (x, y)
}

/// Convertit UTM vers coordonnées géographiques WGS84
pub fn utm_to_geographic(x: f64, y: f64, zone: UtmZone) -> Geographic {
    let e2 = WGS84::E2;
    let scale = K0 * rectifying_radius();

    let y0 = if zone.south { FALSE_NORTHING_SOUTH } else { 0.0 };
    let eta = (x - FALSE_EASTING) / scale;
    let xi = (y - y0) / scale;

    let mut xi_p = xi;
    let mut eta_p = eta;
    for (j, b) in beta().iter().enumerate() {
        let k = 2.0 * (j + 1) as f64;
        xi_p -= b * (k * xi).sin() * (k * eta).cosh();
        eta_p -= b * (k * xi).cos() * (k * eta).sinh();
    }

    let sinh_eta_p = eta_p.sinh();
    let (sin_xi_p, cos_xi_p) = xi_p.sin_cos();
    let tau_p = sin_xi_p / (sinh_eta_p * sinh_eta_p + cos_xi_p * cos_xi_p).sqrt();

    // Newton sur τ : conformal_tau(τ) = τ'
    let mut tau = tau_p;
    for _ in 0..10 {
        let tau_i_p = conformal_tau(tau);
        let delta = (tau_p - tau_i_p) / (1.0 + tau_i_p * tau_i_p).sqrt()
            * (1.0 + (1.0 - e2) * tau * tau)
            / ((1.0 - e2) * (1.0 + tau * tau).sqrt());
        tau += delta;
        if delta.abs() < 1e-12 {
            break;
        }
    }

    let lat = tau.atan();
    let lon = zone.central_meridian().to_radians() + sinh_eta_p.atan2(cos_xi_p);
    Geographic::new(lon, lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(z: u8, south: bool) -> UtmZone {
        UtmZone::new(z, south).unwrap()
    }

    #[test]
    fn test_central_meridian_equator() {
        let (x, y) = geographic_to_utm(Geographic::from_degrees(39.0, 0.0), zone(37, false));
        assert!((x - 500000.0).abs() < 1e-6, "x={}", x);
        assert!(y.abs() < 1e-6, "y={}", y);
    }

    #[test]
    fn test_martinique() {
        // Fort-de-France approximativement
        let geo = utm_to_geographic(708000.0, 1615000.0, zone(20, false));
        let (lon, lat) = geo.to_degrees();

        assert!((lon - (-61.07)).abs() < 0.2, "lon={}", lon);
        assert!((lat - 14.60).abs() < 0.2, "lat={}", lat);
    }

    #[test]
    fn test_reunion() {
        // Saint-Denis approximativement, zone 40S
        let geo = utm_to_geographic(338000.0, 7691000.0, zone(40, true));
        let (lon, lat) = geo.to_degrees();

        assert!((lon - 55.45).abs() < 0.2, "lon={}", lon);
        assert!((lat - (-20.88)).abs() < 0.2, "lat={}", lat);
    }

    #[test]
    fn test_known_point_moscow() {
        // Kremlin: 37.6176°E 55.7520°N -> 37N ≈ (413 000, 6 179 000)
        let (x, y) = geographic_to_utm(Geographic::from_degrees(37.6176, 55.7520), zone(37, false));
        assert!((x - 413_000.0).abs() < 2_000.0, "x={}", x);
        assert!((y - 6_179_000.0).abs() < 2_000.0, "y={}", y);
    }

    #[test]
    fn test_roundtrip_submillimeter() {
        let points = [
            (37.6176, 55.7520, zone(37, false)),
            (36.01, 55.0, zone(37, false)),
            (41.99, -33.5, zone(37, true)),
            (-61.07, 14.60, zone(20, false)),
            (2.35, 48.85, zone(31, false)),
        ];
        for (lon, lat, z) in points {
            let (x, y) = geographic_to_utm(Geographic::from_degrees(lon, lat), z);
            let (lon2, lat2) = utm_to_geographic(x, y, z).to_degrees();
            // 1e-9 degré ≈ 0.1 mm
            assert!((lon2 - lon).abs() < 1e-9, "lon {} -> {}", lon, lon2);
            assert!((lat2 - lat).abs() < 1e-9, "lat {} -> {}", lat, lat2);
        }
    }
}
