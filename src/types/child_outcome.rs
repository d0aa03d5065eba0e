use nix::sys::signal::Signal;
use std::fmt;

/// How the sandboxed command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildOutcome {
    Exited(i32),
    Signaled(Signal),
}

impl ChildOutcome {
    /* Shell convention for signal deaths, used only if re-raising the signal on
     * ourselves didn't terminate us. */
    pub fn exit_code(&self) -> i32 {
        match self {
            ChildOutcome::Exited(code) => *code,
            ChildOutcome::Signaled(signal) => 128 + *signal as i32,
        }
    }
}

impl fmt::Display for ChildOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildOutcome::Exited(code) => write!(f, "exited with {}", code),
            ChildOutcome::Signaled(signal) => {
                write!(f, "killed by {}", signal.as_str())
            }
        }
    }
}
