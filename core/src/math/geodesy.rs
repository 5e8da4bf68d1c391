//! Flat-Earth local tangent plane used to turn degree offsets into meters.

use crate::prelude::CosineLatitude;

/// WGS-84 meridional meters per degree of latitude at mid-latitudes.
pub const METERS_PER_DEGREE_LAT: f64 = 111_132.92;
/// Meters per degree of longitude at the equator.
pub const METERS_PER_DEGREE_LON: f64 = 111_319.5;

/// Reference point plus the cosine policy for east/west scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentPlane {
    pub ref_latitude: f64,
    pub ref_longitude: f64,
    pub cosine_latitude: CosineLatitude,
}

impl TangentPlane {
    pub fn new(ref_latitude: f64, ref_longitude: f64, cosine_latitude: CosineLatitude) -> Self {
        Self {
            ref_latitude,
            ref_longitude,
            cosine_latitude,
        }
    }

    pub fn north_offset(&self, latitude: f64) -> f64 {
        (latitude - self.ref_latitude) * METERS_PER_DEGREE_LAT
    }

    pub fn east_offset(&self, latitude: f64, longitude: f64) -> f64 {
        let cosine_source = match self.cosine_latitude {
            CosineLatitude::PerRecord => latitude,
            CosineLatitude::Reference => self.ref_latitude,
        };
        (longitude - self.ref_longitude) * METERS_PER_DEGREE_LON * cosine_source.to_radians().cos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_latitude_matches_meridional_constant() {
        let plane = TangentPlane::new(45.0, 7.0, CosineLatitude::Reference);
        assert!((plane.north_offset(46.0) - METERS_PER_DEGREE_LAT).abs() < 1e-6);
        assert!((plane.north_offset(44.0) + METERS_PER_DEGREE_LAT).abs() < 1e-6);
    }

    #[test]
    fn one_degree_of_longitude_at_equator_matches_equatorial_constant() {
        for cosine in [CosineLatitude::PerRecord, CosineLatitude::Reference] {
            let plane = TangentPlane::new(0.0, 0.0, cosine);
            assert!((plane.east_offset(0.0, 1.0) - METERS_PER_DEGREE_LON).abs() < 1e-6);
        }
    }

    #[test]
    fn cosine_policy_selects_latitude_source() {
        let per_record = TangentPlane::new(0.0, 0.0, CosineLatitude::PerRecord);
        let reference = TangentPlane::new(0.0, 0.0, CosineLatitude::Reference);
        let expected = METERS_PER_DEGREE_LON * 60f64.to_radians().cos();
        assert!((per_record.east_offset(60.0, 1.0) - expected).abs() < 1e-6);
        assert!((reference.east_offset(60.0, 1.0) - METERS_PER_DEGREE_LON).abs() < 1e-6);
    }
}
