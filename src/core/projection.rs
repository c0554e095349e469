//! UTM-K (EPSG:5179) <-> WGS84 (EPSG:4326).
//!
//! Ellipsoidal Transverse Mercator on GRS80. GRS80 and WGS84 differ by less
//! than a millimetre at the surface, so no datum shift is applied.

const SEMI_MAJOR: f64 = 6_378_137.0;
const INV_FLATTENING: f64 = 298.257_222_101;

const LAT_ORIGIN_DEG: f64 = 38.0;
const LON_ORIGIN_DEG: f64 = 127.5;
const SCALE: f64 = 0.9996;
const FALSE_EASTING: f64 = 1_000_000.0;
const FALSE_NORTHING: f64 = 2_000_000.0;

struct Ellipsoid {
    a: f64,
    e2: f64,
    ep2: f64,
}

impl Ellipsoid {
    fn grs80() -> Self {
        let f = 1.0 / INV_FLATTENING;
        let e2 = f * (2.0 - f);
        Self {
            a: SEMI_MAJOR,
            e2,
            ep2: e2 / (1.0 - e2),
        }
    }

    /// Meridian arc length from the equator to `phi`.
    fn meridian_arc(&self, phi: f64) -> f64 {
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        self.a
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
    }
}

/// Projects WGS84 longitude/latitude (degrees) to UTM-K easting/northing (metres).
pub fn wgs84_to_utmk(lon: f64, lat: f64) -> (f64, f64) {
    let ell = Ellipsoid::grs80();
    let phi = lat.to_radians();
    let lambda = lon.to_radians();
    let lambda0 = LON_ORIGIN_DEG.to_radians();

    let (sin_phi, cos_phi) = phi.sin_cos();
    let n = ell.a / (1.0 - ell.e2 * sin_phi * sin_phi).sqrt();
    let t = phi.tan().powi(2);
    let c = ell.ep2 * cos_phi * cos_phi;
    let a = (lambda - lambda0) * cos_phi;

    let m = ell.meridian_arc(phi);
    let m0 = ell.meridian_arc(LAT_ORIGIN_DEG.to_radians());

    let x = FALSE_EASTING
        + SCALE
            * n
            * (a + (1.0 - t + c) * a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ell.ep2) * a.powi(5) / 120.0);
    let y = FALSE_NORTHING
        + SCALE
            * (m - m0
                + n * phi.tan()
                    * (a * a / 2.0
                        + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                        + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ell.ep2) * a.powi(6)
                            / 720.0));
    (x, y)
}

/// Unprojects UTM-K easting/northing (metres) to WGS84 longitude/latitude (degrees).
pub fn utmk_to_wgs84(x: f64, y: f64) -> (f64, f64) {
    let ell = Ellipsoid::grs80();
    let e2 = ell.e2;
    let e4 = e2 * e2;
    let e6 = e4 * e2;

    let m0 = ell.meridian_arc(LAT_ORIGIN_DEG.to_radians());
    let m = m0 + (y - FALSE_NORTHING) / SCALE;
    let mu = m / (ell.a * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));

    let sqrt_1_e2 = (1.0 - e2).sqrt();
    let e1 = (1.0 - sqrt_1_e2) / (1.0 + sqrt_1_e2);
    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let (sin_phi1, cos_phi1) = phi1.sin_cos();
    let tan_phi1 = phi1.tan();
    let w = 1.0 - e2 * sin_phi1 * sin_phi1;
    let n1 = ell.a / w.sqrt();
    let r1 = ell.a * (1.0 - e2) / w.powf(1.5);
    let c1 = ell.ep2 * cos_phi1 * cos_phi1;
    let t1 = tan_phi1 * tan_phi1;
    let d = (x - FALSE_EASTING) / (n1 * SCALE);

    let phi = phi1
        - (n1 * tan_phi1 / r1)
            * (d * d / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ell.ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ell.ep2
                    - 3.0 * c1 * c1)
                    * d.powi(6)
                    / 720.0);
    let lambda = LON_ORIGIN_DEG.to_radians()
        + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ell.ep2 + 24.0 * t1 * t1)
                * d.powi(5)
                / 120.0)
            / cos_phi1;

    (lambda.to_degrees(), phi.to_degrees())
}
