// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    SummaryFormat, expand_path, load_saved_html, log_level, prepare_output_dir,
    run_options_from_args, show_banner, summary_format,
};

// Re-export run functionality from flusurver-core
pub use flusurver_core::run::{generate_json_report, generate_run_report};
pub use flusurver_core::{RunInput, RunOptions, RunSummary, execute_run};
