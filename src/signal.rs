//! Interrupt handling for the binary.
//!
//! An interrupted run stops at once. Staging directories that exist at that
//! moment are left behind under the temp root.

use anyhow::Result;

/// Spawns a thread that exits the process on SIGINT or SIGTERM.
#[cfg(unix)]
pub fn install_interrupt_listener() -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    std::thread::Builder::new()
        .name("courier-signals".to_string())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                log::error!("Received signal {}, aborting", signal);
                std::process::exit(1);
            }
        })?;
    Ok(())
}

#[cfg(not(unix))]
pub fn install_interrupt_listener() -> Result<()> {
    Ok(())
}
