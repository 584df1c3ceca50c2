//! # Geometry
//!
//! Converts a floor's footprint, height and wall thickness into wall
//! section counts and usable floor area. Everything is whole feet and
//! integer division, matching the tabletop rules being modelled:
//!
//! - a partial 10-ft course counts as a full course
//! - π is taken as 3 for circular footprints
//! - entrances are deducted once, from the ground course only
//!
//! ```text
//! rectangle:  perimeter = (4 × size) / 10 sections per course
//! circle:     perimeter = (3 × size) / 10 sections per course
//! inner size: size − 2 × thickness (clamped at 0)
//! ```
//!
//! Callers must reject zero sizes and heights before calling; see
//! [`FloorSegment::validate`](crate::plan::FloorSegment::validate).

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{FortError, FortResult};
use crate::materials::WallThickness;

/// Plan-view shape of a floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Square footprint; size is the side length
    #[default]
    Rectangle,
    /// Round footprint; size is the diameter
    Circle,
}

impl Shape {
    pub const ALL: [Shape; 2] = [Shape::Rectangle, Shape::Circle];

    pub fn code(&self) -> &'static str {
        match self {
            Shape::Rectangle => "rectangle",
            Shape::Circle => "circle",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> FortResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "rectangle" | "rect" | "square" | "r" => Ok(Shape::Rectangle),
            "circle" | "round" | "c" => Ok(Shape::Circle),
            _ => Err(FortError::invalid_input(
                "shape",
                s,
                "Unknown shape (expected rectangle or circle)",
            )),
        }
    }
}

impl FromStr for Shape {
    type Err = FortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Shape::from_str_flexible(s)
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Number of 10-ft courses in a wall of the given height (at least one)
pub fn courses(height_ft: u32) -> u32 {
    (height_ft / 10).max(1)
}

/// Wall sections around the footprint in a single course
pub fn perimeter_sections(shape: Shape, size_ft: u32) -> u32 {
    let size = u64::from(size_ft);
    let sections = match shape {
        Shape::Rectangle => (4 * size) / 10,
        Shape::Circle => (3 * size) / 10,
    };
    // 4/10 of any u32 fits
    u32::try_from(sections).unwrap_or(u32::MAX)
}

/// Total wall sections for one floor.
///
/// For rectangles, walls 5 ft and thicker lose `2 × (thickness / 5)`
/// sections per course, and `entrance_deduction` sections are removed
/// once. Circles take neither deduction. Never negative.
///
/// # Example
///
/// ```rust
/// use fort_core::geometry::{wall_sections, Shape};
/// use fort_core::materials::WallThickness;
///
/// // 50-ft square, two courses, 10-ft walls: 20 × 2 − 2 × 2 × 2 = 32
/// assert_eq!(wall_sections(Shape::Rectangle, 50, 20, WallThickness::Ten, 0), 32);
/// ```
pub fn wall_sections(
    shape: Shape,
    size_ft: u32,
    height_ft: u32,
    thickness: WallThickness,
    entrance_deduction: u32,
) -> u32 {
    let courses = i64::from(courses(height_ft));
    let base = i64::from(perimeter_sections(shape, size_ft)) * courses;

    match shape {
        Shape::Rectangle => {
            let t = i64::from(thickness.feet());
            let mut sections = base;
            if t >= 5 {
                sections -= 2 * (t / 5) * courses;
            }
            sections -= i64::from(entrance_deduction);
            u32::try_from(sections.max(0)).unwrap_or(0)
        }
        Shape::Circle => u32::try_from(base).unwrap_or(u32::MAX),
    }
}

/// Interior size once the walls are taken out, clamped at zero
pub fn inner_size(size_ft: u32, thickness: WallThickness) -> u32 {
    size_ft.saturating_sub(2 * thickness.feet())
}

/// Usable floor area in 10×10-ft squares.
///
/// Rectangles: `(inner / 10)²`. Circles: `round(3 × inner² / 400)`.
pub fn floor_area_in_10ft_squares(shape: Shape, inner_size_ft: u32) -> u32 {
    let inner = u64::from(inner_size_ft);
    let area = match shape {
        Shape::Rectangle => (inner / 10) * (inner / 10),
        // round half up on non-negative integers
        Shape::Circle => (3 * inner * inner + 200) / 400,
    };
    u32::try_from(area).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_courses_rounds_partial_course_up_to_one() {
        assert_eq!(courses(5), 1);
        assert_eq!(courses(10), 1);
        assert_eq!(courses(25), 2);
        assert_eq!(courses(100), 10);
    }

    #[test]
    fn test_rectangle_sections_with_thick_walls() {
        // 50-ft square: 20 sections/course, 2 courses, minus 2 × 2 × 2
        assert_eq!(wall_sections(Shape::Rectangle, 50, 20, WallThickness::Ten, 0), 32);
        // 1-ft walls take no thickness deduction
        assert_eq!(wall_sections(Shape::Rectangle, 50, 20, WallThickness::One, 0), 40);
        // 5-ft walls: minus 2 × 1 per course
        assert_eq!(wall_sections(Shape::Rectangle, 50, 20, WallThickness::Five, 0), 36);
    }

    #[test]
    fn test_entrance_deducted_once_not_per_course() {
        let without = wall_sections(Shape::Rectangle, 40, 30, WallThickness::One, 0);
        let with = wall_sections(Shape::Rectangle, 40, 30, WallThickness::One, 2);
        assert_eq!(without - with, 2);
    }

    #[test]
    fn test_sections_never_negative() {
        assert_eq!(wall_sections(Shape::Rectangle, 10, 10, WallThickness::Fifteen, 5), 0);
    }

    #[test]
    fn test_circle_ignores_thickness_and_entrances() {
        // 3 × 40 / 10 = 12 per course
        assert_eq!(wall_sections(Shape::Circle, 40, 20, WallThickness::Fifteen, 3), 24);
        assert_eq!(wall_sections(Shape::Circle, 40, 20, WallThickness::One, 0), 24);
    }

    #[test]
    fn test_inner_size_clamps() {
        assert_eq!(inner_size(50, WallThickness::Ten), 30);
        assert_eq!(inner_size(20, WallThickness::Fifteen), 0);
    }

    #[test]
    fn test_floor_area() {
        assert_eq!(floor_area_in_10ft_squares(Shape::Rectangle, 30), 9);
        assert_eq!(floor_area_in_10ft_squares(Shape::Rectangle, 35), 9);
        // 3 × 30² / 400 = 6.75 → 7
        assert_eq!(floor_area_in_10ft_squares(Shape::Circle, 30), 7);
        // 3 × 10² / 400 = 0.75 → 1
        assert_eq!(floor_area_in_10ft_squares(Shape::Circle, 10), 1);
        assert_eq!(floor_area_in_10ft_squares(Shape::Circle, 0), 0);
    }

    #[test]
    fn test_shape_parsing() {
        assert_eq!(Shape::from_str_flexible("Square").unwrap(), Shape::Rectangle);
        assert_eq!("round".parse::<Shape>().unwrap(), Shape::Circle);
        assert!(Shape::from_str_flexible("hexagon").is_err());
    }

    #[test]
    fn test_perimeter_of_huge_footprint_does_not_overflow() {
        assert_eq!(perimeter_sections(Shape::Rectangle, 1_100_000_000), 440_000_000);
        assert_eq!(perimeter_sections(Shape::Circle, u32::MAX), 1_288_490_188);
    }
}
