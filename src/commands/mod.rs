//! Command handlers
//!
//! Each handler borrows clients from the [`Session`](crate::session::Session),
//! runs a short fixed sequence of SDK calls and reports progress on `out`.
//! Progress lines are written as `"<step>..."` before a call and completed
//! with `" done."` after it succeeds.

pub mod enroll;
pub mod invoke;
pub mod register;
pub mod setup;

pub use enroll::{enroll, EnrollMode};
pub use invoke::{invoke, InvokeMode};
pub use register::register;
pub use setup::setup;

use crate::config::CompatConfig;
use crate::error::{CliError, Result};
use std::io::Write;
use tracing::debug;

fn begin(out: &mut dyn Write, step: &str) -> Result<()> {
    write!(out, "{}...", step)?;
    out.flush()?;
    Ok(())
}

fn done(out: &mut dyn Write) -> Result<()> {
    writeln!(out, " done.")?;
    Ok(())
}

/// Outcome for one of the steps whose failure older releases ignored.
/// With `swallow_step_errors` the handler stops and reports success.
fn tolerated(compat: &CompatConfig, step: &str, err: CliError) -> Result<()> {
    if compat.swallow_step_errors {
        debug!("Ignoring failed {}: {}", step, err);
        Ok(())
    } else {
        Err(err)
    }
}
