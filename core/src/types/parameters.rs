use std::fmt;

/// Parameters handed to a brain extractor
///
/// `r_min`/`r_max` bound the local radius of curvature of the surface,
/// `d1`/`d2` are the inward search depths (mm) for the minimum and maximum
/// intensity, and `bt` is the brightness threshold fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionParameters {
    pub r_min: f64,
    pub r_max: f64,
    pub d1: f64,
    pub d2: f64,
    pub bt: f64,
}

impl ExtractionParameters {
    pub const DEFAULT_R_MIN: f64 = 8.0;
    pub const DEFAULT_R_MAX: f64 = 10.0;
    pub const DEFAULT_D1: f64 = 7.0;
    pub const DEFAULT_D2: f64 = 3.0;

    /// Z spacing above which the volume counts as coarsely sampled
    pub const COARSE_Z_SPACING: f64 = 1.5;
    /// Brightness threshold for coarse axial sampling
    pub const COARSE_BT: f64 = 0.50;
    /// Brightness threshold otherwise
    pub const FINE_BT: f64 = 0.70;

    /// Tuned parameters with the brightness threshold chosen from the z spacing
    pub fn for_z_spacing(z_spacing: f64) -> Self {
        Self {
            r_min: Self::DEFAULT_R_MIN,
            r_max: Self::DEFAULT_R_MAX,
            d1: Self::DEFAULT_D1,
            d2: Self::DEFAULT_D2,
            bt: brightness_threshold(z_spacing),
        }
    }
}

/// Brightness threshold for a given z-axis voxel spacing
///
/// Strictly greater than 1.5 selects 0.50; everything else, including
/// exactly 1.5, selects 0.70.
pub fn brightness_threshold(z_spacing: f64) -> f64 {
    if z_spacing > ExtractionParameters::COARSE_Z_SPACING {
        ExtractionParameters::COARSE_BT
    } else {
        ExtractionParameters::FINE_BT
    }
}

impl fmt::Display for ExtractionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RMin={} RMax={} D1={} D2={} BT={:.2}",
            self.r_min, self.r_max, self.d1, self.d2, self.bt
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1.5, 0.70)]
    #[case(1.51, 0.50)]
    #[case(1.0, 0.70)]
    #[case(3.0, 0.50)]
    #[case(0.5, 0.70)]
    fn test_brightness_threshold(#[case] z: f64, #[case] expected: f64) {
        assert_eq!(brightness_threshold(z), expected);
    }

    #[test]
    fn test_fixed_parameters() {
        let p = ExtractionParameters::for_z_spacing(1.0);
        assert_eq!(p.r_min, 8.0);
        assert_eq!(p.r_max, 10.0);
        assert_eq!(p.d1, 7.0);
        assert_eq!(p.d2, 3.0);
        assert_eq!(p.bt, 0.70);
    }

    #[test]
    fn test_display() {
        let p = ExtractionParameters::for_z_spacing(2.0);
        assert_eq!(p.to_string(), "RMin=8 RMax=10 D1=7 D2=3 BT=0.50");
    }
}
