use std::collections::HashSet;

use crate::row::{DATE_LISTED, PRODUCT_CODE, Record, RowKey, record_key};

/// `true` if the header carries both natural-key columns.
pub fn has_key_columns<'a, I>(columns: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let mut code = false;
    let mut date = false;
    for column in columns {
        code |= column == PRODUCT_CODE;
        date |= column == DATE_LISTED;
    }
    code && date
}

/// Keys already present in a report, used to skip products recorded today.
pub fn existing_keys(records: &[Record]) -> HashSet<RowKey> {
    records.iter().filter_map(record_key).collect()
}

/// Removes rows sharing a (`Product Code`, `Date Listed`) key, keeping the
/// last occurrence of each key at its own position. Rows without a complete
/// key are always kept.
pub fn dedup_keep_last(records: Vec<Record>) -> Vec<Record> {
    let mut seen = HashSet::new();
    let mut kept: Vec<Record> = records
        .into_iter()
        .rev()
        .filter(|record| match record_key(record) {
            Some(key) => seen.insert(key),
            None => true,
        })
        .collect();
    kept.reverse();
    kept
}

/// Existing rows followed by new rows, deduplicated keep-last. With no
/// existing rows this only dedups the new batch.
pub fn merge(existing: Vec<Record>, new_rows: Vec<Record>) -> Vec<Record> {
    let mut all = existing;
    all.extend(new_rows);
    dedup_keep_last(all)
}
