//! stride-audit: balance audit
//!
//! Replays every student's consumption and replenishment events and compares
//! the result with the stored balance. Exits with status 1 when any student
//! disagrees with its history, e.g. after an event append failed once its
//! balance was already written.
//!
//! ## Usage
//! ```text
//! stride-audit [CONFIG_PATH]
//! ```
//!
//! ## Configuration
//! - STRIDE_CONFIG: Path to config file (optional)
//! - STRIDE_LOG: Log filter (default: info)

use tracing::{info, warn};

use stride::config::Config;
use stride::facade::Backoffice;
use stride::utils::bootstrap::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();

    let config_path = std::env::args().nth(1);
    let config = Config::load(config_path.as_deref())?;
    let backoffice = Backoffice::open(&config).await?;

    let results = backoffice.audit().await?;
    let mismatched: Vec<_> = results.iter().filter(|r| !r.is_consistent()).collect();

    for r in &mismatched {
        warn!(
            student_id = %r.student_id,
            stored_remaining = r.stored_remaining,
            replayed_remaining = r.replayed.remaining_times,
            stored_total = r.stored_total,
            replayed_total = r.replayed.total_times,
            "Balance mismatch"
        );
    }

    info!(
        students = results.len(),
        mismatched = mismatched.len(),
        "stride-audit finished"
    );

    if !mismatched.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}
