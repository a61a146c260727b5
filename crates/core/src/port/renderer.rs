// Fragment Renderer Port

use crate::domain::DisplayItem;

/// Turns one sub-queue's display state into a markup fragment.
///
/// The fragment must not depend on the item's column span: the span belongs
/// to the surrounding page cell, which lets page and partial views share one
/// cache entry.
pub trait FragmentRenderer: Send + Sync {
    fn render_fragment(&self, item: &DisplayItem) -> String;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;

    /// `sub_queue|resource|token` plain-text fragments
    pub struct PlainRenderer;

    impl FragmentRenderer for PlainRenderer {
        fn render_fragment(&self, item: &DisplayItem) -> String {
            format!(
                "{}|{}|{}",
                item.sub_queue_name, item.resource_name, item.token_display
            )
        }
    }
}
