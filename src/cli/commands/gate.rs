//! `gate`: evaluate the trigger policy without running anything.

use crate::cli::{EventArgs, RuntimeConfig};
use crate::error::Result;
use crate::pipeline::{Settings, trigger};

/// Prints the decision. A rejected event is not an error.
pub fn execute(settings: &Settings, args: &EventArgs, json: bool, runtime: &RuntimeConfig) -> Result<i32> {
    let event = super::trigger_event(args)?;
    let decision = trigger::evaluate(settings.trigger(), settings.allow_manual_dispatch(), &event);

    if json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
    } else if decision.start {
        runtime.success(&format!("{} starts a run: {}", decision.git_ref, decision.reason))?;
    } else {
        runtime.warn(&format!("{} skipped: {}", decision.git_ref, decision.reason))?;
    }

    Ok(0)
}
