use crate::types::ChildOutcome;
use anyhow::{Context, Result, anyhow};
use log::trace;
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::signal::{SigHandler, Signal, kill, signal};
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, execvp, fork, pipe2};
use std::ffi::CString;
use std::os::fd::AsRawFd;

/**
 * Runs `command` (resolved through PATH) as a child process with our stdio and
 * environment, and waits for it.
 *
 * The child reports a failed exec back over a close-on-exec pipe, so a command
 * that never started is an error here rather than an exit status.
 */
pub fn fork_exec_wait(command: &[String]) -> Result<ChildOutcome> {
    if command.is_empty() {
        return Err(anyhow!("No command given"));
    }

    /* Build everything execvp needs before forking, the child only execs */
    let args_cstr: Vec<CString> = command
        .iter()
        .map(|s| CString::new(s.as_str()))
        .collect::<Result<_, _>>()
        .context("Command contains an interior NUL byte")?;

    let (read_fd, write_fd) =
        pipe2(OFlag::O_CLOEXEC).context("failed to create exec status pipe")?;

    let result = unsafe { fork() }.context("failed to fork")?;
    match result {
        ForkResult::Child => {
            drop(read_fd);
            let Err(e) = execvp(&args_cstr[0], &args_cstr);
            let _ = nix::unistd::write(&write_fd, &(e as i32).to_ne_bytes());
            unsafe { libc::_exit(127) }
        }
        ForkResult::Parent { child } => {
            drop(write_fd);
            trace!("Started {} as pid {}", command[0], child);

            let mut buffer = [0u8; 4];
            let read = loop {
                match nix::unistd::read(read_fd.as_raw_fd(), &mut buffer) {
                    Err(Errno::EINTR) => continue,
                    other => break other,
                }
            }
            .context("failed to read exec status pipe")?;
            drop(read_fd);

            if read == buffer.len() {
                let _ = waitpid(child, None);
                return Err(std::io::Error::from_raw_os_error(
                    i32::from_ne_bytes(buffer),
                ))
                .context(format!("Failed to execute {}", command[0]));
            }

            wait_for_child(child)
        }
    }
}

fn wait_for_child(child: Pid) -> Result<ChildOutcome> {
    loop {
        match waitpid(child, None) {
            Ok(WaitStatus::Exited(_, exit_code)) => {
                return Ok(ChildOutcome::Exited(exit_code));
            }
            Ok(WaitStatus::Signaled(_, signal, _)) => {
                return Ok(ChildOutcome::Signaled(signal));
            }
            Ok(_) | Err(Errno::EINTR) => continue,
            Err(e) => {
                return Err(e)
                    .context(format!("failed to wait for pid {}", child));
            }
        }
    }
}

/* When our child dies from a signal, we bubble that up to ourselves so that
 * our caller sees the signal as well. Only returns if the signal didn't kill
 * us. */
pub fn reraise(sig: Signal) {
    unsafe {
        let _ = signal(sig, SigHandler::SigDfl);
    }
    let _ = kill(Pid::this(), sig);
}
