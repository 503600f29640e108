use crate::error::VinylError;
use crate::record::{RawRecord, Record};

/// An entry dropped during validation.
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedRecord {
    /// Position in the source array.
    pub position: usize,
    pub reason: String,
}

/// Validated records, most valuable first.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    records: Vec<Record>,
    skipped: Vec<SkippedRecord>,
}

impl Dataset {
    /// Keeps the given order; used when records are built in code.
    pub fn from_records(records: Vec<Record>) -> Self {
        Dataset {
            records,
            skipped: Vec::new(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    pub fn total(&self) -> f64 {
        self.records.iter().map(|r| r.max_amount).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parse the dataset file. Entries without a name or a usable amount are
/// skipped with a warning; everything else is sorted by amount, highest first
/// (ties keep file order).
pub fn load_records(json: &str) -> Result<Dataset, VinylError> {
    let raw: Vec<RawRecord> = serde_json::from_str(json)?;
    let mut records = Vec::with_capacity(raw.len());
    let mut skipped = Vec::new();
    for (position, entry) in raw.into_iter().enumerate() {
        match Record::try_from(entry) {
            Ok(r) => records.push(r),
            Err(reason) => {
                log::warn!("skipping dataset entry {position}: {reason}");
                skipped.push(SkippedRecord { position, reason });
            }
        }
    }
    records.sort_by(|a, b| b.max_amount.total_cmp(&a.max_amount));
    log::info!(
        "loaded {} records ({} skipped)",
        records.len(),
        skipped.len()
    );
    Ok(Dataset { records, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_descending_and_keeps_ties_in_file_order() {
        let ds = load_records(
            r#"[
                {"name":"a","max_amount":10},
                {"name":"b","max_amount":30},
                {"name":"c","max_amount":10},
                {"name":"d","max_amount":20}
            ]"#,
        )
        .unwrap();
        let names = ds.records().iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["b", "d", "a", "c"]);
        assert_eq!(ds.total(), 70.0);
    }

    #[test]
    fn invalid_entries_are_reported_not_fatal() {
        let ds = load_records(
            r#"[{"title":"no name","max_amount":5},{"name":"ok","max_amount":5},{"name":"x"}]"#,
        )
        .unwrap();
        assert_eq!(ds.records().len(), 1);
        let positions = ds.skipped().iter().map(|s| s.position).collect::<Vec<_>>();
        assert_eq!(positions, [0, 2]);
    }

    #[test]
    fn non_array_input_is_a_parse_error() {
        assert!(matches!(load_records("{}"), Err(VinylError::Parse(_))));
        assert!(matches!(load_records("not json"), Err(VinylError::Parse(_))));
        assert!(load_records("[]").unwrap().is_empty());
    }
}
