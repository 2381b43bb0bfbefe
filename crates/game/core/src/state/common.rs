use std::fmt;

/// Unique identifier for any actor tracked by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl EntityId {
    /// Reserved identifier for world-level instigators (trigger volumes, scripts).
    pub const SYSTEM: Self = Self(u32::MAX);
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// World-space position in engine units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::splat(0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(value: f32) -> Self {
        Self::new(value, value, value)
    }
}

impl std::ops::Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Axis-aligned box described by its centre and half extent.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    pub center: Vec3,
    pub half_extent: Vec3,
}

impl Aabb {
    pub const fn new(center: Vec3, half_extent: Vec3) -> Self {
        Self {
            center,
            half_extent,
        }
    }

    /// Cube of `2 * half_extent` units per side.
    pub const fn cube(center: Vec3, half_extent: f32) -> Self {
        Self::new(center, Vec3::splat(half_extent))
    }

    /// Returns true if `point` lies inside or on the boundary of the box.
    pub fn contains(&self, point: Vec3) -> bool {
        let min = self.center - self.half_extent;
        let max = self.center + self.half_extent;
        (min.x..=max.x).contains(&point.x)
            && (min.y..=max.y).contains(&point.y)
            && (min.z..=max.z).contains(&point.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_contains_boundary_points() {
        let bounds = Aabb::cube(Vec3::ZERO, 100.0);

        assert!(bounds.contains(Vec3::ZERO));
        assert!(bounds.contains(Vec3::new(100.0, -100.0, 100.0)));
        assert!(!bounds.contains(Vec3::new(100.5, 0.0, 0.0)));
    }

    #[test]
    fn offset_cube_uses_its_center() {
        let bounds = Aabb::cube(Vec3::new(500.0, 0.0, 0.0), 100.0);

        assert!(!bounds.contains(Vec3::ZERO));
        assert!(bounds.contains(Vec3::new(450.0, 20.0, -20.0)));
    }
}
