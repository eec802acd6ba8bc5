//! Terminal foreground ownership
//!
//! While an interactive client runs, its process group owns the terminal so
//! Ctrl-C reaches only the client. The parent takes the terminal back when
//! the client is gone, whatever happened to it.

use std::io::{self, IsTerminal};

/// Moves the terminal's foreground process group
pub trait TerminalControl {
    /// Make `pgid` the foreground process group
    fn hand_to(&self, pgid: u32) -> io::Result<()>;

    /// Make our own process group the foreground again
    fn reclaim(&self) -> io::Result<()>;
}

/// For non-interactive stdin and platforms without job control
pub struct NoopTerminal;

impl TerminalControl for NoopTerminal {
    fn hand_to(&self, _pgid: u32) -> io::Result<()> {
        Ok(())
    }

    fn reclaim(&self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(unix)]
pub use unix::JobControl;

#[cfg(unix)]
mod unix {
    use std::io;

    use nix::sys::signal::{SigSet, SigmaskHow, Signal, killpg, pthread_sigmask};
    use nix::unistd::{Pid, getpgrp, tcsetpgrp};

    use super::TerminalControl;

    /// Job control on the controlling terminal attached to stdin
    pub struct JobControl;

    /// Run `f` with SIGTTOU blocked on this thread, restoring the mask after.
    ///
    /// tcsetpgrp from a background group raises SIGTTOU, which stops us
    /// unless blocked.
    fn with_ttou_blocked<T>(f: impl FnOnce() -> nix::Result<T>) -> io::Result<T> {
        let mut ttou = SigSet::empty();
        ttou.add(Signal::SIGTTOU);
        let mut previous = SigSet::empty();
        pthread_sigmask(SigmaskHow::SIG_BLOCK, Some(&ttou), Some(&mut previous))?;

        let result = f();

        pthread_sigmask(SigmaskHow::SIG_SETMASK, Some(&previous), None)?;
        result.map_err(io::Error::from)
    }

    impl TerminalControl for JobControl {
        fn hand_to(&self, pgid: u32) -> io::Result<()> {
            let pgid = i32::try_from(pgid)
                .map(Pid::from_raw)
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;

            // rds itself may be a background job
            with_ttou_blocked(|| tcsetpgrp(io::stdin(), pgid))?;
            // The child may already have stopped on SIGTTIN by touching the
            // terminal before it owned it.
            killpg(pgid, Signal::SIGCONT)?;
            Ok(())
        }

        fn reclaim(&self) -> io::Result<()> {
            // We are a background group now
            with_ttou_blocked(|| tcsetpgrp(io::stdin(), getpgrp()))
        }
    }

}

/// Terminal control suited to this process: job control when stdin is an
/// interactive terminal, otherwise nothing to hand over.
pub fn for_stdin() -> Box<dyn TerminalControl> {
    if !io::stdin().is_terminal() {
        log::debug!("stdin is not a terminal, skipping foreground handoff");
        return Box::new(NoopTerminal);
    }

    #[cfg(unix)]
    {
        Box::new(JobControl)
    }
    #[cfg(not(unix))]
    {
        Box::new(NoopTerminal)
    }
}

/// Returns the terminal to the parent when dropped.
///
/// Create it before starting the child so every exit path, including a
/// failed spawn or wait, ends with the parent owning the terminal.
pub struct ForegroundGuard<'a> {
    terminal: &'a dyn TerminalControl,
}

impl<'a> ForegroundGuard<'a> {
    pub fn new(terminal: &'a dyn TerminalControl) -> Self {
        Self { terminal }
    }

    /// Give the terminal to the child's process group. Failure is logged:
    /// the client still works, it just shares Ctrl-C with us.
    pub fn hand_to(&self, pgid: u32) {
        match self.terminal.hand_to(pgid) {
            Ok(()) => log::debug!("Terminal handed to process group {}", pgid),
            Err(e) => log::warn!("Could not hand terminal to client: {}", e),
        }
    }
}

impl Drop for ForegroundGuard<'_> {
    fn drop(&mut self) {
        match self.terminal.reclaim() {
            Ok(()) => log::debug!("Terminal reclaimed"),
            Err(e) => log::warn!("Could not reclaim terminal: {}", e),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Event {
        HandTo(u32),
        Reclaim,
    }

    /// Records ownership transitions instead of touching a terminal
    #[derive(Default)]
    pub(crate) struct RecordingTerminal {
        pub(crate) events: RefCell<Vec<Event>>,
        pub(crate) fail: bool,
    }

    impl TerminalControl for RecordingTerminal {
        fn hand_to(&self, pgid: u32) -> io::Result<()> {
            self.events.borrow_mut().push(Event::HandTo(pgid));
            if self.fail {
                return Err(io::Error::other("not a tty"));
            }
            Ok(())
        }

        fn reclaim(&self) -> io::Result<()> {
            self.events.borrow_mut().push(Event::Reclaim);
            if self.fail {
                return Err(io::Error::other("not a tty"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_guard_reclaims_on_drop() {
        let terminal = RecordingTerminal::default();
        {
            let guard = ForegroundGuard::new(&terminal);
            guard.hand_to(42);
        }
        assert_eq!(
            *terminal.events.borrow(),
            vec![Event::HandTo(42), Event::Reclaim]
        );
    }

    #[test]
    fn test_guard_reclaims_without_handoff() {
        let terminal = RecordingTerminal::default();
        drop(ForegroundGuard::new(&terminal));
        assert_eq!(*terminal.events.borrow(), vec![Event::Reclaim]);
    }

    #[test]
    fn test_guard_tolerates_failures() {
        let terminal = RecordingTerminal {
            fail: true,
            ..Default::default()
        };
        {
            let guard = ForegroundGuard::new(&terminal);
            guard.hand_to(7);
        }
        assert_eq!(terminal.events.borrow().len(), 2);
    }

    #[test]
    fn test_noop_terminal() {
        assert!(NoopTerminal.hand_to(1).is_ok());
        assert!(NoopTerminal.reclaim().is_ok());
    }
}
