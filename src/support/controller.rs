// External command channel and progress reporting for the planner

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};

/// Commands driving the planning state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Advance one state, or resume from a halt
    StartResume,
    /// Halt after the current state completes
    Pause,
    /// Abort the run
    Stop,
    /// Reset to the beginning, clearing the scratch workspace
    Synch,
}

/// Command source and status sink for a planning run. The planner consults
/// `next_command` exactly once per state boundary; in-flight states are
/// never interrupted.
pub trait Controller {
    /// Next pending command. `block` is true only while the planner is
    /// halted; a non-blocking call with nothing queued returns
    /// `StartResume` so the run keeps advancing.
    fn next_command(&self, block: bool) -> Command;

    /// Progress callback with the completion percentage and state label
    fn status(&self, percent: u32, label: &str);
}

/// Controller fed through a crossbeam channel, typically from a UI thread.
/// A disconnected channel reads as `Stop` so an abandoned run aborts
/// instead of spinning.
pub struct ChannelController {
    commands: Receiver<Command>,
    status_cb: Option<Box<dyn Fn(u32, &str) + Send>>,
}

impl ChannelController {
    pub fn new() -> (Self, Sender<Command>) {
        let (tx, rx) = unbounded();
        (
            Self {
                commands: rx,
                status_cb: None,
            },
            tx,
        )
    }

    /// Install a status callback; progress is logged otherwise
    pub fn on_status(mut self, cb: impl Fn(u32, &str) + Send + 'static) -> Self {
        self.status_cb = Some(Box::new(cb));
        self
    }
}

impl Controller for ChannelController {
    fn next_command(&self, block: bool) -> Command {
        if block {
            self.commands.recv().unwrap_or(Command::Stop)
        } else {
            match self.commands.try_recv() {
                Ok(cmd) => cmd,
                Err(TryRecvError::Empty) => Command::StartResume,
                Err(TryRecvError::Disconnected) => Command::Stop,
            }
        }
    }

    fn status(&self, percent: u32, label: &str) {
        match &self.status_cb {
            Some(cb) => cb(percent, label),
            None => log::debug!("support planning {percent}%: {label}"),
        }
    }
}

/// Controller for unattended batch runs: always advances, logs progress
pub struct Unattended;

impl Controller for Unattended {
    fn next_command(&self, _block: bool) -> Command {
        Command::StartResume
    }

    fn status(&self, percent: u32, label: &str) {
        if !label.is_empty() {
            log::info!("support planning {percent}%: {label}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_controller_drains_commands() {
        let (ctl, tx) = ChannelController::new();
        tx.send(Command::Pause).unwrap();

        assert_eq!(ctl.next_command(false), Command::Pause);
        // empty queue keeps the run moving
        assert_eq!(ctl.next_command(false), Command::StartResume);
    }

    #[test]
    fn test_disconnected_channel_aborts() {
        let (ctl, tx) = ChannelController::new();
        drop(tx);

        assert_eq!(ctl.next_command(false), Command::Stop);
        assert_eq!(ctl.next_command(true), Command::Stop);
    }

    #[test]
    fn test_unattended_always_advances() {
        let ctl = Unattended;
        assert_eq!(ctl.next_command(false), Command::StartResume);
        assert_eq!(ctl.next_command(true), Command::StartResume);
    }
}
