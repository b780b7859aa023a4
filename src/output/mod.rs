//! Terminal output for the interactive commands.
//!
//! Provides:
//! - Styled status lines and the status report
//! - A batch progress bar driven by notifications
//! - End-of-batch statistics
//!
//! Nothing here writes to stdout in `serve` mode.

pub mod console;
pub mod progress;
pub mod stats;

pub use console::{
    print_banner, print_config_summary, print_error, print_info, print_status, print_success,
    print_warning,
};
pub use progress::{create_item_bar, follow_batch};
pub use stats::{print_batch_stats, BatchOutcome, BatchStats};
