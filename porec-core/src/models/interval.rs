use num_traits::{PrimInt, Unsigned, identities::zero};
use std::cmp::Ordering;

/// A half-open range `[start, end)` carrying a value.
///
/// Inside a fragment index the value is the fragment id, so two intervals
/// with the same coordinates but different ids are different intervals.
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
pub struct Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    pub start: I,
    pub end: I,
    pub val: T,
}

impl<I, T> Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Number of bases covered. Degenerate intervals report zero.
    #[inline]
    pub fn width(&self) -> I {
        self.end.checked_sub(&self.start).unwrap_or_else(zero::<I>)
    }

    /// Length of the intersection with `[start, end)`, zero when disjoint.
    #[inline]
    pub fn intersect(&self, start: I, end: I) -> I {
        std::cmp::min(self.end, end)
            .checked_sub(&std::cmp::max(self.start, start))
            .unwrap_or_else(zero::<I>)
    }

    /// Whether `[start, end)` shares at least one base with this interval.
    #[inline]
    pub fn overlap(&self, start: I, end: I) -> bool {
        self.start < end && self.end > start && start < end
    }

    /// Whether `[start, end)` lies entirely inside this interval.
    #[inline]
    pub fn contains(&self, start: I, end: I) -> bool {
        self.start <= start && end <= self.end
    }

    /// Midpoint, rounded down.
    #[inline]
    pub fn mid_point(&self) -> I {
        let two = I::one() + I::one();
        self.start + self.width() / two
    }
}

impl<I, T> Ord for Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Ord + Clone + Send + Sync,
{
    #[inline]
    fn cmp(&self, other: &Interval<I, T>) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| self.end.cmp(&other.end))
            .then_with(|| self.val.cmp(&other.val))
    }
}

impl<I, T> PartialOrd for Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Ord + Clone + Send + Sync,
{
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn frag(start: u64, end: u64) -> Interval<u64, u32> {
        Interval { start, end, val: 0 }
    }

    #[rstest]
    #[case(15, 25, 5)]
    #[case(0, 10, 0)]
    #[case(9, 11, 1)]
    #[case(19, 40, 1)]
    #[case(20, 30, 0)]
    #[case(12, 12, 0)]
    fn test_intersect(#[case] start: u64, #[case] end: u64, #[case] expected: u64) {
        assert_eq!(frag(10, 20).intersect(start, end), expected);
    }

    #[rstest]
    #[case(10, 11, true)]
    #[case(19, 20, true)]
    #[case(20, 21, false)]
    #[case(5, 10, false)]
    #[case(15, 15, false)]
    fn test_overlap_is_half_open(#[case] start: u64, #[case] end: u64, #[case] expected: bool) {
        assert_eq!(frag(10, 20).overlap(start, end), expected);
    }

    #[rstest]
    fn test_contains_and_midpoint() {
        let iv = frag(10, 21);
        assert!(iv.contains(10, 21));
        assert!(!iv.contains(9, 15));
        assert_eq!(iv.width(), 11);
        assert_eq!(iv.mid_point(), 15);
    }

    #[rstest]
    fn test_ordering_uses_value_last() {
        let mut ivs = vec![
            Interval { start: 5u64, end: 9, val: 2u32 },
            Interval { start: 5, end: 9, val: 1 },
            Interval { start: 0, end: 20, val: 7 },
        ];
        ivs.sort();
        let vals: Vec<u32> = ivs.iter().map(|iv| iv.val).collect();
        assert_eq!(vals, vec![7, 1, 2]);
    }
}
