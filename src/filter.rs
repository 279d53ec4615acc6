use std::collections::BTreeSet;

use compact_str::CompactString;

use crate::record::Record;

/// Result of filtering: either the untouched input or the matching subsequence.
#[derive(Debug, Clone)]
pub enum Selection<'r> {
    All(&'r [Record]),
    Subset(Vec<&'r Record>),
}

impl<'r> Selection<'r> {
    pub fn len(&self) -> usize {
        match self {
            Selection::All(records) => records.len(),
            Selection::Subset(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records in input order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &'r Record> + '_> {
        match self {
            Selection::All(records) => Box::new(records.iter()),
            Selection::Subset(records) => Box::new(records.iter().copied()),
        }
    }
}

/// Keep only records whose `field`, compared as a normalized string, equals `selector`.
/// An absent or empty selector passes the input through without copying.
pub fn filter<'r>(records: &'r [Record], field: &str, selector: Option<&str>) -> Selection<'r> {
    let selector = match selector {
        Some(s) if !s.is_empty() => s,
        _ => return Selection::All(records),
    };

    let matched: Vec<&Record> = records
        .iter()
        .filter(|r| r.normalized(field).as_deref() == Some(selector))
        .collect();

    tracing::debug!(
        "Filter {}={:?}: {} of {} records kept",
        field,
        selector,
        matched.len(),
        records.len()
    );

    Selection::Subset(matched)
}

/// Distinct, sorted values of `field` across the unfiltered input; these are
/// the choices offered to a selector control.
pub fn year_options(records: &[Record], field: &str) -> Vec<CompactString> {
    records
        .iter()
        .filter_map(|r| r.normalized(field))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: &str = "programme-year";

    fn sample() -> Vec<Record> {
        vec![
            Record::new().with_text("name", "a").with_number(YEAR, 2021.0),
            Record::new().with_text("name", "b").with_text(YEAR, "2021"),
            Record::new().with_text("name", "c").with_number(YEAR, 2020.0),
            Record::new().with_text("name", "d"),
        ]
    }

    #[test]
    fn selector_matches_numbers_and_strings_alike() {
        let records = sample();
        let sel = filter(&records, YEAR, Some("2021"));
        let names: Vec<_> = sel.iter().map(|r| r.text_or_empty("name")).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn no_selector_passes_everything_through() {
        let records = sample();
        for selector in [None, Some("")] {
            let sel = filter(&records, YEAR, selector);
            assert!(matches!(sel, Selection::All(_)));
            assert_eq!(sel.len(), 4);
        }
    }

    #[test]
    fn unmatched_selector_yields_empty_selection() {
        let records = sample();
        let sel = filter(&records, YEAR, Some("1999"));
        assert!(sel.is_empty());
    }

    #[test]
    fn options_are_distinct_sorted_and_skip_missing() {
        let records = sample();
        assert_eq!(year_options(&records, YEAR), ["2020", "2021"]);
    }
}
