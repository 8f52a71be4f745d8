use crate::api::Record;
use crate::app::AppState;

/// Records whose name contains `query`, ignoring case. An empty query keeps everything.
pub fn filter_records(records: &[Record], query: &str) -> Vec<Record> {
    if query.is_empty() {
        return records.to_vec();
    }
    let q = query.to_lowercase();
    records
        .iter()
        .filter(|r| r.name.to_lowercase().contains(&q))
        .cloned()
        .collect()
}

/// Recompute the visible list from the last snapshot and the current query.
pub fn apply_search(app: &mut AppState) {
    app.visible = filter_records(&app.records, &app.search_query);
    app.selected = app.selected.min(app.visible.len().saturating_sub(1));
}
