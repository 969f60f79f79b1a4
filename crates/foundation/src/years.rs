/// The distinct years present in a dataset, ascending.
///
/// Never empty: a domain is only built from at least one year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearDomain {
    years: Vec<i32>,
}

impl YearDomain {
    /// Builds a domain from arbitrary (possibly repeated, unordered) years.
    ///
    /// Returns `None` when `years` is empty.
    pub fn from_years(years: impl IntoIterator<Item = i32>) -> Option<Self> {
        let mut years: Vec<i32> = years.into_iter().collect();
        years.sort_unstable();
        years.dedup();
        if years.is_empty() {
            return None;
        }
        Some(Self { years })
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.years
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn contains(&self, year: i32) -> bool {
        self.years.binary_search(&year).is_ok()
    }

    pub fn earliest(&self) -> i32 {
        self.years[0]
    }

    pub fn latest(&self) -> i32 {
        self.years[self.years.len() - 1]
    }

    /// Nearest member by absolute difference.
    ///
    /// Years are scanned ascending and only a strictly closer candidate
    /// replaces the current one, so ties resolve to the earlier year.
    pub fn nearest(&self, year: i32) -> i32 {
        let mut best = self.years[0];
        for &candidate in &self.years[1..] {
            if (i64::from(candidate) - i64::from(year)).abs()
                < (i64::from(best) - i64::from(year)).abs()
            {
                best = candidate;
            }
        }
        best
    }

    /// The member following `year`, wrapping to the earliest after the last.
    ///
    /// A year outside the domain advances from its nearest member.
    pub fn next_after(&self, year: i32) -> i32 {
        let current = self.nearest(year);
        let idx = self.years.binary_search(&current).unwrap_or(0);
        self.years[(idx + 1) % self.years.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::YearDomain;
    use proptest::prelude::*;

    fn un_years() -> YearDomain {
        YearDomain::from_years([2024, 1990, 2000, 1995, 2020, 2015, 2010, 2005, 2020])
            .expect("non-empty")
    }

    #[test]
    fn sorts_and_dedups() {
        let d = un_years();
        assert_eq!(
            d.as_slice(),
            &[1990, 1995, 2000, 2005, 2010, 2015, 2020, 2024]
        );
        assert_eq!(d.earliest(), 1990);
        assert_eq!(d.latest(), 2024);
    }

    #[test]
    fn empty_input_has_no_domain() {
        assert!(YearDomain::from_years(Vec::new()).is_none());
    }

    #[test]
    fn nearest_prefers_earlier_on_ties() {
        let d = un_years();
        assert_eq!(d.nearest(1992), 1990);
        assert_eq!(d.nearest(1993), 1995);
        // 2022 is two years from both 2020 and 2024.
        assert_eq!(d.nearest(2022), 2020);
        assert_eq!(d.nearest(1800), 1990);
        assert_eq!(d.nearest(3000), 2024);
        assert_eq!(d.nearest(2015), 2015);
    }

    #[test]
    fn next_after_wraps() {
        let d = un_years();
        assert_eq!(d.next_after(1990), 1995);
        assert_eq!(d.next_after(2024), 1990);
    }

    proptest! {
        #[test]
        fn nearest_is_member_and_minimal(year in 1900i32..2100) {
            let d = un_years();
            let n = d.nearest(year);
            prop_assert!(d.contains(n));
            for &y in d.as_slice() {
                prop_assert!((n - year).abs() <= (y - year).abs());
            }
        }
    }
}
