//! # Hello Ledger Example
//!
//! A minimal narrated walk through the ledger: a scope tree emits
//! validation messages, counters track them, and tasks await settlement.
//!
//! This example shows:
//! - Attaching a ledger to the root of a scope tree
//! - Declaring counters with default and custom predicates
//! - Deep propagation: messages at child scopes count at the root
//! - Awaiting settlement while another task clears the messages
//!
//! Run with: `cargo run -p hello-ledger`

use std::time::Duration;

use anyhow::Result;
use tally_core::{Ledger, Message};
use tally_testkit::{failing, validation_error, ScopeTree};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("=== Hello Ledger: Settlement Example ===\n");

    // A form with two fields; the ledger watches from the root.
    let tree = ScopeTree::new();
    let root = tree.root();
    let email = root.child("email");
    let password = root.child("password");

    let ledger = Ledger::new();
    ledger.attach(&root);

    let blocking = ledger.declare_with("blocking", |m: &Message| m.blocking, 0);
    let errors = ledger.declare("errors", 0);
    println!("Declared counters:");
    println!(
        "  blocking (custom predicate: m.blocking) settled: {}",
        blocking.is_settled()
    );
    println!(
        "  errors   (default predicate: kind == \"errors\") settled: {}\n",
        errors.is_settled()
    );

    // === Phase 1: validation failures appear at the fields ===
    println!("Phase 1: validation failures appear at the fields");
    email.add_message(&failing("email"));
    password.add_message(&validation_error("password"));
    println!("  value(\"blocking\") = {}", ledger.value("blocking"));
    println!("  value(\"errors\")   = {}\n", ledger.value("errors"));
    assert_eq!(ledger.value("blocking"), 1, "one blocking failure counted");
    assert_eq!(ledger.value("errors"), 2, "both errors counted at the root");

    // === Phase 2: await settlement while a task clears the messages ===
    println!("Phase 2: awaiting settlement while a task clears the messages");
    let clearing = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        info!("clearing password error");
        password.remove_message(&validation_error("password"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        info!("clearing email error");
        email.remove_message(&failing("email"));
    });

    ledger.settled("blocking").wait().await;
    println!("  blocking counter settled");
    ledger.settled("errors").wait().await;
    println!("  errors counter settled\n");
    clearing.await?;

    assert_eq!(ledger.value("blocking"), 0);
    assert_eq!(ledger.value("errors"), 0);
    println!("=== Both counters settled; ledger reads {ledger:?} ===");
    Ok(())
}
