// Query Insights is open-source under the Apache License 2.0; see LICENSE for usage and contributions.
// QueryRecord models one row of the query list as shown by the dashboard table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value::Row;

pub const FIELD_ID: &str = "id";
pub const FIELD_QUERY_TYPE: &str = "queryType";
pub const FIELD_SEARCH_TYPE: &str = "searchType";
pub const FIELD_NODE: &str = "node";
pub const FIELD_INDEX: &str = "index";
pub const FIELD_WLM_GROUP: &str = "wlmGroup";
pub const FIELD_LATENCY: &str = "latency";
pub const FIELD_CPU: &str = "cpu";
pub const FIELD_MEMORY: &str = "memory";
pub const FIELD_TIMESTAMP: &str = "timestamp";

pub const COLUMNS: [(&str, &str); 9] = [
    (FIELD_ID, "ID"),
    (FIELD_QUERY_TYPE, "Query Type"),
    (FIELD_SEARCH_TYPE, "Search Type"),
    (FIELD_NODE, "Node"),
    (FIELD_INDEX, "Index"),
    (FIELD_WLM_GROUP, "WLM Group"),
    (FIELD_LATENCY, "Latency"),
    (FIELD_CPU, "CPU"),
    (FIELD_MEMORY, "Memory"),
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRecord {
    pub id: String,
    pub query_type: String,
    pub search_type: String,
    pub node: String,
    pub index: String,
    pub wlm_group: String,
    pub latency: String,
    pub cpu: String,
    pub memory: String,
    pub timestamp: DateTime<Utc>,
}

impl QueryRecord {
    pub fn into_row(self) -> Row {
        Row::new()
            .with(FIELD_ID, self.id)
            .with(FIELD_QUERY_TYPE, self.query_type)
            .with(FIELD_SEARCH_TYPE, self.search_type)
            .with(FIELD_NODE, self.node)
            .with(FIELD_INDEX, self.index)
            .with(FIELD_WLM_GROUP, self.wlm_group)
            .with(FIELD_LATENCY, self.latency)
            .with(FIELD_CPU, self.cpu)
            .with(FIELD_MEMORY, self.memory)
            .with(FIELD_TIMESTAMP, self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value::FieldValue;
    use chrono::TimeZone;

    #[test]
    fn into_row_keeps_display_strings_and_typed_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 14, 10, 30, 0).unwrap();
        let row = QueryRecord {
            id: "q1".into(),
            query_type: "Search".into(),
            search_type: "DFS".into(),
            node: "node1".into(),
            index: "index2".into(),
            wlm_group: "group3".into(),
            latency: "245.10 ms".into(),
            cpu: "1.20%".into(),
            memory: "45 MB".into(),
            timestamp: ts,
        }
        .into_row();

        assert_eq!(row.len(), COLUMNS.len() + 1);
        assert_eq!(row.get(FIELD_LATENCY), Some(&FieldValue::from("245.10 ms")));
        assert_eq!(row.get(FIELD_TIMESTAMP), Some(&FieldValue::Date(ts)));
    }
}
