//! Interface tests for the ledger engine and the lead pipeline using Cucumber.
//!
//! These scenarios verify the same behavior against every storage backend.
//! Select a backend via environment variable:
//!
//! ```bash
//! # In-memory (default)
//! cargo test --test interfaces
//!
//! # SQLite (in-memory database)
//! STORAGE_BACKEND=sqlite cargo test --test interfaces --features sqlite
//! ```

mod backend;
mod steps;

use cucumber::World;
use steps::lead_pipeline::LeadPipelineWorld;
use steps::ledger::LedgerWorld;

#[tokio::main]
async fn main() {
    // Run ledger tests
    println!("\n=== Running Ledger Interface Tests ===\n");
    LedgerWorld::cucumber()
        .fail_on_skipped()
        .run("tests/interfaces/features/ledger.feature")
        .await;

    // Run lead pipeline tests
    println!("\n=== Running Lead Pipeline Interface Tests ===\n");
    LeadPipelineWorld::cucumber()
        .fail_on_skipped()
        .run("tests/interfaces/features/lead_pipeline.feature")
        .await;
}
