//! Script command
//!
//! Plays a session script without a window and prints every status line.

use anyhow::{Context, Result};
use roimesh_render::RenderOptions;
use roimesh_session::{SchedulerConfig, Script, Session};
use tracing::{info, trace};

use crate::ScriptArgs;

pub fn run(args: ScriptArgs, verbose: u8) -> Result<()> {
    trace!(script = %args.script.display(), "script::run");

    let script = Script::read(&args.script)
        .with_context(|| format!("Failed to load script: {}", args.script.display()))?;
    let (width, height) = super::parse_size(&args.size)?;
    let options = RenderOptions {
        width,
        height,
        ..Default::default()
    };
    let mut session = Session::new(options, SchedulerConfig::default());

    info!(steps = script.len(), "playing script");
    for status in script.run(&mut session) {
        println!("{status}");
    }
    if verbose > 0 {
        println!("{} steps, final status: {}", script.len(), session.status());
    }
    Ok(())
}
