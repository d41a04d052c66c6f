use std::fmt;

/// Unique identifier for any entity (player, NPC, object) that owns or receives skills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl EntityId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// World position reported by the host for range checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns true when `other` lies inside the square interaction area of
    /// half-size `range` centred on `self`.
    pub fn within_area(&self, other: Position, range: u32) -> bool {
        let dx = other.x.abs_diff(self.x);
        let dy = other.y.abs_diff(self.y);
        dx <= range && dy <= range
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Logical clock value in milliseconds.
///
/// Skill delays and cast times are deadlines expressed on this clock; the host
/// advances it and asks skills to resolve whatever expired.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns true once `self` reached or passed `deadline`.
    pub fn has_reached(self, deadline: Tick) -> bool {
        self >= deadline
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0.saturating_add(rhs))
    }
}

impl std::ops::Sub<u64> for Tick {
    type Output = Tick;
    fn sub(self, rhs: u64) -> Tick {
        Tick(self.0.saturating_sub(rhs))
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interaction_area_is_square() {
        let center = Position::new(10, 10);
        assert!(center.within_area(Position::new(13, 7), 3));
        assert!(!center.within_area(Position::new(14, 10), 3));
        assert!(center.within_area(center, 0));
        assert!(!center.within_area(Position::new(10, 11), 0));
    }

    #[test]
    fn interaction_area_handles_extreme_coordinates() {
        let low = Position::new(i32::MIN, i32::MIN);
        let high = Position::new(i32::MAX, i32::MAX);
        assert!(!low.within_area(high, u32::MAX - 1));
        assert!(low.within_area(high, u32::MAX));
        assert!(high.within_area(Position::new(i32::MAX - 2, i32::MAX), 2));
    }

    #[test]
    fn tick_arithmetic_saturates() {
        assert_eq!(Tick(5) - 10, Tick::ZERO);
        assert_eq!(Tick(u64::MAX) + 1, Tick(u64::MAX));
        assert!(Tick(10).has_reached(Tick(10)));
        assert!(!Tick(9).has_reached(Tick(10)));
    }
}
