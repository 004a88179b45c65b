//! WGS-84 → UTM projection for metric length measurement.
//!
//! Lengths of geographic polylines are measured by projecting them into the
//! Universal Transverse Mercator zone that contains the geometry and summing
//! planar segment lengths.  The forward transform uses the Krüger series to
//! third order in `n`, which is accurate to well under a millimetre inside a
//! zone.
//!
//! Zones are the standard 6° bands.  The Norway/Svalbard exceptions are not
//! applied; a neighbouring zone only changes scale distortion by a few parts
//! in ten thousand.

use geo::{Coord, LineString};

use crate::GeoPoint;

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const K0: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// A UTM zone: number `1..=60` plus hemisphere.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UtmZone {
    pub number: u8,
    pub north:  bool,
}

impl UtmZone {
    /// The zone containing `p`.
    pub fn for_point(p: GeoPoint) -> Self {
        let raw = ((p.lon + 180.0) / 6.0).floor() as i32 + 1;
        Self {
            number: raw.clamp(1, 60) as u8,
            north:  p.lat >= 0.0,
        }
    }

    /// The zone containing the mean position of `points`, or `None` for an
    /// empty input.
    pub fn for_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let (mut lon, mut lat, mut n) = (0.0, 0.0, 0usize);
        for p in points {
            lon += p.lon;
            lat += p.lat;
            n += 1;
        }
        (n > 0).then(|| Self::for_point(GeoPoint::new(lon / n as f64, lat / n as f64)))
    }

    /// Longitude of the zone's central meridian in degrees.
    pub fn central_meridian(self) -> f64 {
        f64::from(self.number) * 6.0 - 183.0
    }

    /// EPSG code of the zone (`326xx` north, `327xx` south).
    pub fn epsg(self) -> u32 {
        if self.north { 32_600 + u32::from(self.number) } else { 32_700 + u32::from(self.number) }
    }

    /// Forward transform: `(easting, northing)` in metres.
    pub fn project(self, p: GeoPoint) -> Coord<f64> {
        let n = WGS84_F / (2.0 - WGS84_F);
        let n2 = n * n;
        let n3 = n2 * n;
        let big_a = WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0);
        let alpha = [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
            61.0 * n3 / 240.0,
        ];

        let phi = p.lat.to_radians();
        let d_lambda = (p.lon - self.central_meridian()).to_radians();

        let e2n = 2.0 * n.sqrt() / (1.0 + n);
        let sin_phi = phi.sin();
        let t = (sin_phi.atanh() - e2n * (e2n * sin_phi).atanh()).sinh();
        let xi_p = t.atan2(d_lambda.cos());
        let eta_p = (d_lambda.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, a) in alpha.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi += a * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += a * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        let easting = FALSE_EASTING + K0 * big_a * eta;
        let northing = K0 * big_a * xi + if self.north { 0.0 } else { FALSE_NORTHING_SOUTH };
        Coord { x: easting, y: northing }
    }

    /// Planar length in metres of a lon/lat polyline after projection.
    pub fn line_length_m(self, line: &LineString<f64>) -> f64 {
        let projected: Vec<Coord<f64>> = line
            .coords()
            .map(|&c| self.project(GeoPoint::from(c)))
            .collect();
        projected
            .windows(2)
            .map(|w| (w[1].x - w[0].x).hypot(w[1].y - w[0].y))
            .sum()
    }
}

impl std::fmt::Display for UtmZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UTM {}{}", self.number, if self.north { 'N' } else { 'S' })
    }
}
