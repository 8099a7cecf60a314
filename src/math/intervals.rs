use std::fmt::Display;

/// Closed time interval used to bracket sign changes of event functions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    lo: f64,
    hi: f64,
}

impl Interval {
    pub fn new(lo: f64, hi: f64) -> Interval {
        if lo <= hi {
            Self { lo, hi }
        } else {
            Self { lo: hi, hi: lo }
        }
    }

    fn new_unchecked(lo: f64, hi: f64) -> Interval {
        debug_assert!(lo <= hi);
        Self { lo, hi }
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    /// Keeps the part left of `mid`. Values outside the interval are clamped.
    pub fn split_left(&self, mid: f64) -> Self {
        Self::new_unchecked(self.lo, mid.max(self.lo).min(self.hi))
    }

    /// Keeps the part right of `mid`. Values outside the interval are clamped.
    pub fn split_right(&self, mid: f64) -> Self {
        Self::new_unchecked(mid.max(self.lo).min(self.hi), self.hi)
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }

    pub fn midpoint(&self) -> f64 {
        (self.lo + self.hi) / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lo <= value && value <= self.hi
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction() {
        let i = Interval::new(3.0, -1.0);
        assert_eq!(i.lo(), -1.0);
        assert_eq!(i.hi(), 3.0);
        assert_eq!(i.width(), 4.0);
        assert_eq!(i.midpoint(), 1.0);
        assert_eq!(format!("{}", i), "[-1, 3]");
    }

    #[test]
    fn test_split() {
        let i = Interval::new(0.0, 10.0);
        assert_eq!(i.split_left(4.0), Interval::new(0.0, 4.0));
        assert_eq!(i.split_right(4.0), Interval::new(4.0, 10.0));
        assert_eq!(i.split_right(12.0), Interval::new(10.0, 10.0));
        assert!(i.contains(10.0));
        assert!(!i.contains(10.5));
    }
}
