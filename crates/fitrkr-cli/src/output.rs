//! JSON envelope printing shared by every playlist subcommand.

use std::process::ExitCode;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use fitrkr_core::envelope::Envelope;
use fitrkr_core::playlist::PlaylistResult;

/// Print the envelope for `result` on stdout. Failures exit with status 1.
pub fn emit<T: Serialize>(result: PlaylistResult<T>) -> Result<ExitCode> {
    let (status, envelope) = Envelope::from_result(result);
    let json = serde_json::to_string_pretty(&envelope).context("failed to serialize response")?;
    println!("{json}");

    if envelope.is_ok() {
        Ok(ExitCode::SUCCESS)
    } else {
        debug!(status, "command failed");
        Ok(ExitCode::FAILURE)
    }
}
