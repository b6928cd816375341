use crate::domain::record::PlaybackRecord;

/// Orders records by timestamp, oldest first.
///
/// The sort is stable: records sharing a timestamp keep their input order.
pub fn merge_chronologically(mut records: Vec<PlaybackRecord>) -> Vec<PlaybackRecord> {
    records.sort_by_key(|record| record.ts);
    records
}
