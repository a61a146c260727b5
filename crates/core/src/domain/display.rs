// Display Domain Model (derived per request, never persisted)

use crate::domain::sub_queue::SubQueueId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Total number of grid columns on a display page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridColumns(pub u8);

impl GridColumns {
    pub fn get(&self) -> u8 {
        self.0
    }

    pub fn css_class(&self) -> String {
        format!("grid-cols-{}", self.0)
    }
}

impl fmt::Display for GridColumns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of grid columns a single item occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSpan(pub u8);

impl ColumnSpan {
    pub fn get(&self) -> u8 {
        self.0
    }

    pub fn css_class(&self) -> String {
        format!("col-span-{}", self.0)
    }
}

impl fmt::Display for ColumnSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structured display state of one sub-queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayItem {
    pub sub_queue_id: SubQueueId,
    pub column_span: ColumnSpan,
    pub sub_queue_name: String,
    pub resource_name: String,
    pub token_display: String,
}

/// One rendered cell of a display page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCell {
    pub sub_queue_id: SubQueueId,
    pub column_span: ColumnSpan,
    pub fragment: String,
}

/// Full display page: grid metadata plus one cell per displayable sub-queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPage {
    pub grid_columns: GridColumns,
    pub item_count: usize,
    pub refresh_interval_secs: u64,
    pub cells: Vec<PageCell>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_classes() {
        assert_eq!(GridColumns(6).css_class(), "grid-cols-6");
        assert_eq!(ColumnSpan(3).css_class(), "col-span-3");
    }
}
