//! HTML Rendering
//!
//! Fragments are plain markup without the column span; the page wraps each
//! fragment in a grid cell that re-polls its partial endpoint.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use token_display_core::domain::{DisplayItem, DisplayPage, SubQueueId};
use token_display_core::port::FragmentRenderer;

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@1.9.12";
const TAILWIND_SRC: &str = "https://cdn.tailwindcss.com";

/// Query-value encoding, RFC 3986 unreserved characters pass through
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Escape text for HTML element content and quoted attribute values
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// URL of a sub-queue's partial, carrying the caller's auth token
pub fn partial_url(id: &SubQueueId, token: Option<&str>) -> String {
    let mut url = format!("/token_display/sub_queue/{}/partial/", id);
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        url.push_str("?token=");
        url.extend(utf8_percent_encode(token, QUERY_VALUE));
    }
    url
}

/// Tailwind/htmx markup renderer
#[derive(Debug, Default, Clone)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Full display document
    pub fn render_page(&self, page: &DisplayPage, token: Option<&str>) -> String {
        let mut cells = String::new();
        for cell in &page.cells {
            cells.push_str(&format!(
                concat!(
                    r#"<div class="{span} rounded-xl bg-white shadow p-6" "#,
                    r#"hx-get="{url}" hx-trigger="every {refresh}s" hx-swap="innerHTML">"#,
                    "{fragment}</div>\n"
                ),
                span = cell.column_span.css_class(),
                url = escape_html(&partial_url(&cell.sub_queue_id, token)),
                refresh = page.refresh_interval_secs,
                fragment = cell.fragment,
            ));
        }

        if page.cells.is_empty() {
            cells.push_str(
                r#"<div class="text-center text-2xl text-gray-500">No active sub-queues</div>"#,
            );
        }

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Token Display</title>
<script src="{htmx}"></script>
<script src="{tailwind}"></script>
</head>
<body class="bg-gray-100 min-h-screen p-6">
<div class="grid {grid} gap-6" data-item-count="{count}">
{cells}</div>
</body>
</html>
"#,
            htmx = HTMX_SRC,
            tailwind = TAILWIND_SRC,
            grid = page.grid_columns.css_class(),
            count = page.item_count,
            cells = cells,
        )
    }
}

impl FragmentRenderer for HtmlRenderer {
    fn render_fragment(&self, item: &DisplayItem) -> String {
        format!(
            concat!(
                r#"<div class="flex flex-col items-center gap-2" data-sub-queue="{id}">"#,
                r#"<div class="text-2xl font-semibold">{sub_queue}</div>"#,
                r#"<div class="text-lg text-gray-600">{resource}</div>"#,
                r#"<div class="text-6xl font-bold token-number">{token}</div>"#,
                "</div>"
            ),
            id = item.sub_queue_id,
            sub_queue = escape_html(&item.sub_queue_name),
            resource = escape_html(&item.resource_name),
            token = escape_html(&item.token_display),
        )
    }
}
