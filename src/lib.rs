//! Library root for `lab-reader-bot`.
//!
//! Lab-reader-bot is a Telegram assistant that turns photos and PDFs of
//! medical paperwork into plain-language explanations:
//! - Walks users through choosing a document type and result language
//! - Accepts image or PDF uploads, guided or out of the blue
//! - Relays documents to the Lab Reader API for interpretation
//! - Replies with the interpreted report, split to fit Telegram limits
//!
//! The bot integrates with Telegram for chat, SurrealDB for conversation
//! state, and the Lab Reader API for document interpretation. The
//! architecture is built around extensible traits that allow for different
//! implementations of each service.

#[warn(missing_docs)]
pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the lab-reader-bot runtime:
/// - Creates the runtime context with session store, lab, and chat clients
/// - Starts the main update loop for processing messages
pub async fn start(config: Config) -> Void {
    info!("Starting lab-reader-bot ...");

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
