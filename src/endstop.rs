//! Endstop identities and edge events.
//!
//! An endstop is a digital limit switch marking one physical end of travel.
//! At most two can be registered per axis: the first registration becomes
//! the lower endstop, the second the upper one. The raw hit/release flags
//! use `0` for "none", so ids start at 1.

/// Identity of a registered endstop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum EndstopId {
    /// The first registered endstop.
    Lower = 1,
    /// The second registered endstop.
    Upper = 2,
}

impl EndstopId {
    /// Raw flag value (1 or 2; 0 means "no endstop").
    #[inline]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Decode a raw flag value. `0` and anything above 2 map to `None`.
    #[inline]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(EndstopId::Lower),
            2 => Some(EndstopId::Upper),
            _ => None,
        }
    }
}

impl core::fmt::Display for EndstopId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EndstopId::Lower => write!(f, "lower"),
            EndstopId::Upper => write!(f, "upper"),
        }
    }
}

/// A digital edge on an endstop input line.
///
/// Edges are reported in electrical terms; the axis normalizes them against
/// its endstop inversion flag before interpreting rise as "switch engaged".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// The line went high.
    Rise,
    /// The line went low.
    Fall,
}

impl Edge {
    /// Flip the edge sense.
    #[inline]
    pub fn inverted(self) -> Self {
        match self {
            Edge::Rise => Edge::Fall,
            Edge::Fall => Edge::Rise,
        }
    }
}

/// Outcome of installing an event callback.
///
/// Each event has a single optional callback slot; installing over an
/// occupied slot replaces the previous callback and reports it here. This
/// is a warning value, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotUpdate {
    /// The slot was empty; the callback is now installed.
    Installed,
    /// A previous callback occupied the slot and was replaced.
    Replaced,
}

impl SlotUpdate {
    /// True if a previous callback was overwritten.
    #[inline]
    pub fn replaced(self) -> bool {
        matches!(self, SlotUpdate::Replaced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_round_trip() {
        assert_eq!(EndstopId::from_raw(EndstopId::Lower.raw()), Some(EndstopId::Lower));
        assert_eq!(EndstopId::from_raw(EndstopId::Upper.raw()), Some(EndstopId::Upper));
        assert_eq!(EndstopId::from_raw(0), None);
        assert_eq!(EndstopId::from_raw(3), None);
    }

    #[test]
    fn edge_inversion() {
        assert_eq!(Edge::Rise.inverted(), Edge::Fall);
        assert_eq!(Edge::Fall.inverted(), Edge::Rise);
    }
}
