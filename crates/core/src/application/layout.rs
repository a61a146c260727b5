// Layout Engine - responsive grid arithmetic for display pages
//
// Up to four items sit in a two-column grid (a lone item gets one column).
// From five items on, a six-column grid holds rows of three; a final partial
// row of one item spans the full width, one of two items splits it in half.

use crate::domain::{ColumnSpan, GridColumns};

/// Grid columns for a page showing `item_count` items
pub fn grid_columns(item_count: usize) -> GridColumns {
    match item_count {
        0 | 1 => GridColumns(1),
        2..=4 => GridColumns(2),
        _ => GridColumns(6),
    }
}

/// Column span of the item at `index` on a page showing `item_count` items
pub fn column_span(item_count: usize, index: usize) -> ColumnSpan {
    if item_count == 3 && index == 2 {
        return ColumnSpan(2);
    }
    if item_count <= 4 {
        return ColumnSpan(1);
    }

    let last = item_count - 1;
    match item_count % 3 {
        1 if index == last => ColumnSpan(6),
        2 if index + 1 >= last => ColumnSpan(3),
        _ => ColumnSpan(2),
    }
}

/// Grid metadata for a whole page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub grid_columns: GridColumns,
    pub spans: Vec<ColumnSpan>,
}

impl Layout {
    pub fn compute(item_count: usize) -> Self {
        Self {
            grid_columns: grid_columns(item_count),
            spans: (0..item_count)
                .map(|index| column_span(item_count, index))
                .collect(),
        }
    }

    pub fn item_count(&self) -> usize {
        self.spans.len()
    }
}
