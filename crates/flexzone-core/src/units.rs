//! Unit-safe power quantities.
//!
//! Line capacities and simulated flows are both active power, so they share
//! [`Megawatts`]. Keeping them wrapped stops a flow from being compared
//! against a value in some other unit by accident.
//!
//! ```
//! use flexzone_core::units::Megawatts;
//!
//! let flow = Megawatts(-130.0);
//! let capacity = Megawatts(100.0);
//! assert_eq!(flow.excess_over(capacity), Megawatts(30.0));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Active power in megawatts (MW)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Megawatts(pub f64);

impl Megawatts {
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Magnitude by which this flow exceeds `limit`, or zero when it fits.
    ///
    /// Flow direction is irrelevant: `-130 MW` over a `100 MW` line is
    /// `30 MW` of overload.
    #[inline]
    pub fn excess_over(self, limit: Megawatts) -> Megawatts {
        Megawatts((self.0.abs() - limit.0).max(0.0))
    }
}

impl Add for Megawatts {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Megawatts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|x| x.0).sum())
    }
}

impl fmt::Display for Megawatts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} MW", self.0)
    }
}
