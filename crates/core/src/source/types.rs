use chrono::{DateTime, Utc};

/// What one source returned for one filter.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceBatch<T> {
    pub items: Vec<T>,
    /// Most recent provenance timestamp the source observed, if any.
    pub last_modified: Option<DateTime<Utc>>,
}

impl<T> SourceBatch<T> {
    pub fn new(items: Vec<T>, last_modified: Option<DateTime<Utc>>) -> Self {
        Self {
            items,
            last_modified,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), None)
    }
}

/// A merged, filtered and sorted result with the overall provenance
/// timestamp. Replaced wholesale on every refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate<T> {
    pub items: Vec<T>,
    /// Maximum provenance across sources; the epoch when none reported one.
    pub last_modified: DateTime<Utc>,
}

impl<T> Aggregate<T> {
    pub fn new(items: Vec<T>, last_modified: DateTime<Utc>) -> Self {
        Self {
            items,
            last_modified,
        }
    }

    /// False when no source reported a provenance timestamp.
    pub fn has_provenance(&self) -> bool {
        self.last_modified != DateTime::UNIX_EPOCH
    }
}

/// Running maximum of provenance timestamps, starting at the epoch.
pub fn max_last_modified<I>(timestamps: I) -> DateTime<Utc>
where
    I: IntoIterator<Item = Option<DateTime<Utc>>>,
{
    timestamps
        .into_iter()
        .flatten()
        .fold(DateTime::UNIX_EPOCH, |acc, ts| acc.max(ts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_max_last_modified_defaults_to_epoch() {
        assert_eq!(max_last_modified([None, None]), DateTime::UNIX_EPOCH);
        assert_eq!(max_last_modified(Vec::<Option<DateTime<Utc>>>::new()), DateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_max_last_modified_picks_latest() {
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(max_last_modified([Some(late), None, Some(early)]), late);
    }

    #[test]
    fn test_has_provenance() {
        let none: Aggregate<u8> = Aggregate::new(Vec::new(), DateTime::UNIX_EPOCH);
        assert!(!none.has_provenance());

        let some: Aggregate<u8> =
            Aggregate::new(Vec::new(), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert!(some.has_provenance());
    }
}
