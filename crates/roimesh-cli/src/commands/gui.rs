//! Gui command - the interactive session window.

use anyhow::Result;

use crate::GuiArgs;

/// Run the gui command.
#[cfg(feature = "viewer")]
pub fn run(args: GuiArgs, verbose: u8) -> Result<()> {
    use std::time::Duration;

    let config = roimesh_view::ViewerConfig {
        scheduler: roimesh_session::SchedulerConfig {
            quiet_period: Duration::from_millis(args.debounce_ms),
        },
        verbose,
    };

    let exit_code = roimesh_view::run_opt(args.input, config);

    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}

/// Run the gui command.
#[cfg(not(feature = "viewer"))]
pub fn run(args: GuiArgs, _verbose: u8) -> Result<()> {
    let _ = (args.input, args.debounce_ms);
    anyhow::bail!("Built without the viewer; rebuild with --features viewer")
}
