//! Sets of disjoint closed intervals on a line

/// Sorted, disjoint, non-empty spans
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntervalSet {
    spans: Vec<(f64, f64)>,
}

impl IntervalSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(lo: f64, hi: f64) -> Self {
        Self::from_spans(vec![(lo, hi)])
    }

    /// Normalise arbitrary spans: orders endpoints, sorts and merges overlaps
    pub fn from_spans(spans: Vec<(f64, f64)>) -> Self {
        let mut spans: Vec<(f64, f64)> = spans
            .into_iter()
            .map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
            .filter(|(a, b)| b > a)
            .collect();
        spans.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut merged: Vec<(f64, f64)> = Vec::with_capacity(spans.len());
        for (lo, hi) in spans {
            match merged.last_mut() {
                Some(last) if lo <= last.1 => last.1 = last.1.max(hi),
                _ => merged.push((lo, hi)),
            }
        }
        Self { spans: merged }
    }

    pub fn spans(&self) -> &[(f64, f64)] {
        &self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Total covered length
    pub fn length(&self) -> f64 {
        self.spans.iter().map(|(a, b)| b - a).sum()
    }

    pub fn contains(&self, t: f64) -> bool {
        self.spans.iter().any(|&(a, b)| t >= a && t <= b)
    }

    pub fn union(&self, other: &Self) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut all = self.spans.clone();
        all.extend_from_slice(&other.spans);
        Self::from_spans(all)
    }

    pub fn intersection(&self, other: &Self) -> Self {
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.spans.len() && j < other.spans.len() {
            let (a0, a1) = self.spans[i];
            let (b0, b1) = other.spans[j];
            let lo = a0.max(b0);
            let hi = a1.min(b1);
            if hi > lo {
                out.push((lo, hi));
            }
            if a1 < b1 {
                i += 1;
            } else {
                j += 1;
            }
        }
        Self { spans: out }
    }

    pub fn difference(&self, other: &Self) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        let mut out = Vec::new();
        for &(a0, a1) in &self.spans {
            let mut lo = a0;
            for &(b0, b1) in &other.spans {
                if b1 <= lo || b0 >= a1 {
                    continue;
                }
                if b0 > lo {
                    out.push((lo, b0));
                }
                lo = lo.max(b1);
                if lo >= a1 {
                    break;
                }
            }
            if a1 > lo {
                out.push((lo, a1));
            }
        }
        Self { spans: out }
    }

    /// Map every point `t` to `sign * t + offset`
    pub fn transformed(&self, sign: f64, offset: f64) -> Self {
        Self::from_spans(
            self.spans
                .iter()
                .map(|&(a, b)| (sign * a + offset, sign * b + offset))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_merge_on_build() {
        let set = IntervalSet::from_spans(vec![(3.0, 4.0), (0.0, 1.0), (0.5, 2.0), (5.0, 5.0)]);
        assert_eq!(set.spans(), &[(0.0, 2.0), (3.0, 4.0)]);
        assert_relative_eq!(set.length(), 3.0);
    }

    #[test]
    fn test_set_operations() {
        let a = IntervalSet::from_spans(vec![(0.0, 4.0), (6.0, 8.0)]);
        let b = IntervalSet::from_spans(vec![(2.0, 7.0)]);

        assert_eq!(a.union(&b).spans(), &[(0.0, 8.0)]);
        assert_eq!(a.intersection(&b).spans(), &[(2.0, 4.0), (6.0, 7.0)]);
        assert_eq!(a.difference(&b).spans(), &[(0.0, 2.0), (7.0, 8.0)]);
        assert_eq!(b.difference(&a).spans(), &[(4.0, 6.0)]);
    }

    #[test]
    fn test_touching_spans_have_no_overlap() {
        let a = IntervalSet::single(0.0, 1.0);
        let b = IntervalSet::single(1.0, 2.0);
        assert!(a.intersection(&b).is_empty());
        assert_relative_eq!(a.union(&b).length(), 2.0);
    }

    #[test]
    fn test_transformed_flips_order() {
        let set = IntervalSet::single(1.0, 3.0).transformed(-1.0, 10.0);
        assert_eq!(set.spans(), &[(7.0, 9.0)]);
        assert!(set.contains(8.0));
        assert!(!set.contains(6.0));
    }
}
