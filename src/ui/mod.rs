//! Server-rendered HTML for the playground.
//!
//! Pages are plain strings with HTMX attributes; every action endpoint answers
//! with the re-rendered `#playground` section.
//!
//! # Structure
//!
//! - [`page`]: document shell, header and bottom navigation
//! - [`playground`]: the swappable playground section

pub mod page;
pub mod playground;

pub use page::page;
pub use playground::section;

/// Escape text for use in HTML content and double-quoted attributes.
pub(crate) fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
