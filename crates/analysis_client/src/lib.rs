//! Analysis service client.
//!
//! Sends the full canonical record batch as one JSON array and hands the
//! status and body back to `fieldrisk-recon` untouched. Shape acceptance and
//! error classification happen there, not here.
//!
//! No retries. No progress reporting.

mod client;

pub use client::{AnalysisClient, ClientError};
