//! Decoding of raw u/v wind components into speed, bearing and compass text.

use std::fmt;

/// Orthogonal 10 m wind components as delivered by the weather archive.
///
/// `u` is the eastward component, `v` the northward component, both in m/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindVector {
    pub u: f64,
    pub v: f64,
}

impl WindVector {
    pub fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }

    /// Wind speed in m/s.
    pub fn speed(&self) -> f64 {
        (self.u * self.u + self.v * self.v).sqrt()
    }

    /// Meteorological wind bearing in degrees, normalized to `[0, 360)`.
    ///
    /// The bearing names the direction the wind blows *from*, with 0 = North
    /// and 90 = East. Calm air (`u == 0 && v == 0`) is defined as bearing 0
    /// rather than undefined.
    pub fn direction_deg(&self) -> f64 {
        if self.u == 0.0 && self.v == 0.0 {
            return 0.0;
        }
        (270.0 - self.v.atan2(self.u).to_degrees()).rem_euclid(360.0)
    }
}

/// One of the 8 principal compass points.
///
/// Each point owns a 45° sector of the compass rose, centered on it: North
/// covers 337.5°–360° plus 0°–22.5°, Northeast covers 22.5°–67.5°, and so on.
/// Lower sector bounds are inclusive, upper bounds exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardinalDirection {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl CardinalDirection {
    /// Maps a bearing in degrees to its compass sector.
    ///
    /// The input is first normalized to `[0, 360)`. Returns `None` only for
    /// values that fall outside every sector (non-finite input); a caller that
    /// wants a label for such values must choose one explicitly.
    pub fn from_degrees(degrees: f64) -> Option<CardinalDirection> {
        use CardinalDirection::*;

        let degrees = degrees.rem_euclid(360.0);
        let sectors = [
            (337.5, 360.0, North),
            (0.0, 22.5, North),
            (22.5, 67.5, Northeast),
            (67.5, 112.5, East),
            (112.5, 157.5, Southeast),
            (157.5, 202.5, South),
            (202.5, 247.5, Southwest),
            (247.5, 292.5, West),
            (292.5, 337.5, Northwest),
        ];

        sectors
            .iter()
            .find(|(start, end, _)| *start <= degrees && degrees < *end)
            .map(|(_, _, direction)| *direction)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CardinalDirection::North => "North",
            CardinalDirection::Northeast => "Northeast",
            CardinalDirection::East => "East",
            CardinalDirection::Southeast => "Southeast",
            CardinalDirection::South => "South",
            CardinalDirection::Southwest => "Southwest",
            CardinalDirection::West => "West",
            CardinalDirection::Northwest => "Northwest",
        }
    }
}

impl fmt::Display for CardinalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CardinalDirection::*;

    #[test]
    fn speed_is_the_vector_magnitude() {
        assert_eq!(WindVector::new(3.0, 4.0).speed(), 5.0);
        assert_eq!(WindVector::new(0.0, 0.0).speed(), 0.0);
    }

    #[test]
    fn calm_air_has_bearing_zero() {
        let calm = WindVector::new(0.0, 0.0);
        assert_eq!(calm.direction_deg(), 0.0);
        assert_eq!(CardinalDirection::from_degrees(calm.direction_deg()), Some(North));
    }

    #[test]
    fn bearing_matches_meteorological_convention() {
        // Wind blowing towards the east (u > 0) comes from the west.
        let westerly = WindVector::new(5.0, 0.0);
        assert!((westerly.direction_deg() - 270.0).abs() < 1e-9);

        // Wind blowing towards the north (v > 0) comes from the south.
        let southerly = WindVector::new(0.0, 5.0);
        assert!((southerly.direction_deg() - 180.0).abs() < 1e-9);

        // Wind blowing towards the south comes from the north.
        let northerly = WindVector::new(0.0, -5.0);
        assert!(northerly.direction_deg().abs() < 1e-9 || (northerly.direction_deg() - 360.0).abs() < 1e-9);
    }

    #[test]
    fn bearing_is_always_normalized() {
        for (u, v) in [(1.0, 1.0), (-1.0, 1.0), (1.0, -1.0), (-1.0, -1.0), (0.3, -7.2)] {
            let deg = WindVector::new(u, v).direction_deg();
            assert!((0.0..360.0).contains(&deg), "bearing {deg} out of range for u={u}, v={v}");
        }
    }

    #[test]
    fn sector_boundaries() {
        assert_eq!(CardinalDirection::from_degrees(0.0), Some(North));
        assert_eq!(CardinalDirection::from_degrees(22.4), Some(North));
        assert_eq!(CardinalDirection::from_degrees(22.5), Some(Northeast));
        assert_eq!(CardinalDirection::from_degrees(45.0), Some(Northeast));
        assert_eq!(CardinalDirection::from_degrees(67.5), Some(East));
        assert_eq!(CardinalDirection::from_degrees(90.0), Some(East));
        assert_eq!(CardinalDirection::from_degrees(135.0), Some(Southeast));
        assert_eq!(CardinalDirection::from_degrees(180.0), Some(South));
        assert_eq!(CardinalDirection::from_degrees(225.0), Some(Southwest));
        assert_eq!(CardinalDirection::from_degrees(270.0), Some(West));
        assert_eq!(CardinalDirection::from_degrees(315.0), Some(Northwest));
        assert_eq!(CardinalDirection::from_degrees(337.5), Some(North));
        assert_eq!(CardinalDirection::from_degrees(359.9), Some(North));
        assert_eq!(CardinalDirection::from_degrees(360.0), Some(North));
    }

    #[test]
    fn out_of_range_inputs_are_wrapped() {
        assert_eq!(CardinalDirection::from_degrees(-45.0), Some(Northwest));
        assert_eq!(CardinalDirection::from_degrees(450.0), Some(East));
    }

    #[test]
    fn non_finite_bearing_has_no_sector() {
        assert_eq!(CardinalDirection::from_degrees(f64::NAN), None);
    }

    #[test]
    fn display_uses_full_names() {
        assert_eq!(Northeast.to_string(), "Northeast");
        assert_eq!(South.to_string(), "South");
    }
}
