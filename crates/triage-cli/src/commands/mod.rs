//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared loaders plus clean and config commands
//! - `classify` - Bulk classification with Ctrl-C cancellation
//! - `scan` - Merchant rule suggestions
//! - `similar` - Similar-transaction lookup
//! - `rules` - Rule list inspection and testing

pub mod classify;
pub mod core;
pub mod rules;
pub mod scan;
pub mod similar;

// Re-export command functions for main.rs
pub use classify::*;
pub use core::*;
pub use rules::*;
pub use scan::*;
pub use similar::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
