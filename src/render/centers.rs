//! Current supply-center set.

use std::collections::HashSet;

/// Normalizes a province identifier to its 3-character uppercase code.
///
/// `stp/sc`, `STP`, and `_stp_nc` all become `STP`.
pub fn normalize_province(id: &str) -> String {
    id.trim()
        .trim_start_matches('_')
        .chars()
        .take(3)
        .collect::<String>()
        .to_uppercase()
}

/// Union of every power's currently owned supply centers, as normalized codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplyCenters {
    codes: HashSet<String>,
}

impl SupplyCenters {
    /// Builds the set from per-power center lists.
    pub fn from_lists<'a, L, I, S>(lists: L) -> Self
    where
        L: IntoIterator<Item = I>,
        I: IntoIterator<Item = &'a S>,
        S: AsRef<str> + ?Sized + 'a,
    {
        let codes = lists
            .into_iter()
            .flatten()
            .map(|c| normalize_province(c.as_ref()))
            .filter(|c| !c.is_empty())
            .collect();
        SupplyCenters { codes }
    }

    /// Returns true if the normalized form of `province` is a current center.
    pub fn contains(&self, province: &str) -> bool {
        self.codes.contains(&normalize_province(province))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
