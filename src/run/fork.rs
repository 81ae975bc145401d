//! Process isolation: running a test's phases in a forked child.
//!
//! The child runs the phases exactly as the in-process driver would, but
//! instead of a real logger it streams phase events to the parent as JSON
//! lines over a pipe.  The parent replays them into its own logger; if the
//! stream stops in the middle of a phase, the child's exit status says why.

use super::{driver, guard};
use crate::{
    api::abs::Test,
    logger::Logger,
    model::{Identity, Kind, Location, Phase, PhaseOutcome, Record, Verdict},
};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    os::unix::io::FromRawFd,
};

/// One message from the child to the parent.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
enum Event {
    StartPhase { phase: Phase },
    Outcome { phase: Phase, outcome: PhaseOutcome },
}

/// Runs setUp, test, and tearDown in a forked child, returning whether
/// every attempted phase succeeded.
///
/// A child that dies mid-phase fails that phase; the phases after it are
/// not attempted, since the state set up in the child died with it.
pub fn run_phases<T: Test + ?Sized, L: Logger>(test: &T, declared: &Location, logger: &mut L) -> bool {
    match spawn(test, declared) {
        Ok((pid, reader)) => replay(pid, reader, declared, logger),
        Err(e) => {
            tracing::error!(error = %e, "couldn't start test process");
            let record = Record::new(
                Kind::Exit,
                declared.clone(),
                format!("couldn't start test process: {}", e),
            );
            logger.start_phase(Phase::SetUp);
            logger.error(Phase::SetUp, &record);
            false
        }
    }
}

fn spawn<T: Test + ?Sized>(test: &T, declared: &Location) -> io::Result<(libc::pid_t, File)> {
    // Anything still buffered would otherwise be written twice.
    io::stdout().flush()?;
    io::stderr().flush()?;

    let (read_fd, write_fd) = pipe()?;

    match unsafe { libc::fork() } {
        -1 => {
            let e = io::Error::last_os_error();
            unsafe {
                libc::close(read_fd);
                libc::close(write_fd);
            }
            Err(e)
        }
        0 => {
            unsafe { libc::close(read_fd) };
            let writer = unsafe { File::from_raw_fd(write_fd) };
            child(test, declared, writer)
        }
        pid => {
            unsafe { libc::close(write_fd) };
            tracing::debug!(pid, "forked test process");
            Ok((pid, unsafe { File::from_raw_fd(read_fd) }))
        }
    }
}

/// Opens a pipe whose ends aren't inherited across `exec`.
fn pipe() -> io::Result<(libc::c_int, libc::c_int)> {
    let mut fds = [0; 2];
    if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    for fd in fds {
        if unsafe { libc::fcntl(fd, libc::F_SETFD, libc::FD_CLOEXEC) } == -1 {
            let e = io::Error::last_os_error();
            unsafe {
                libc::close(fds[0]);
                libc::close(fds[1]);
            }
            return Err(e);
        }
    }
    Ok((fds[0], fds[1]))
}

/// Logger used inside the child: forwards phase events down the pipe.
struct Channel {
    writer: File,
    broken: bool,
}

impl Channel {
    fn send(&mut self, event: &Event) {
        if self.broken {
            return;
        }
        let mut line = match serde_json::to_vec(event) {
            Ok(l) => l,
            Err(_) => {
                self.broken = true;
                return;
            }
        };
        line.push(b'\n');
        // One write per event, so a crash never leaves half a line behind.
        if self.writer.write_all(&line).is_err() {
            self.broken = true;
        }
    }
}

impl Logger for Channel {
    fn start_test(&mut self, _test: &Identity) {}

    fn start_phase(&mut self, phase: Phase) {
        self.send(&Event::StartPhase { phase })
    }

    fn success(&mut self, phase: Phase) {
        self.send(&Event::Outcome {
            phase,
            outcome: PhaseOutcome::Success,
        })
    }

    fn failure(&mut self, phase: Phase, record: &Record) {
        self.send(&Event::Outcome {
            phase,
            outcome: PhaseOutcome::Failure(record.clone()),
        })
    }

    fn error(&mut self, phase: Phase, record: &Record) {
        self.send(&Event::Outcome {
            phase,
            outcome: PhaseOutcome::Error(record.clone()),
        })
    }

    fn ignored(&mut self, _test: &Identity) {}

    fn end_test(&mut self, _test: &Identity, _verdict: Verdict) {}
}

fn child<T: Test + ?Sized>(test: &T, declared: &Location, writer: File) -> ! {
    let mut channel = Channel {
        writer,
        broken: false,
    };
    driver::run_phases(test, declared, &mut channel);
    let code = if channel.broken { 1 } else { 0 };
    drop(channel);
    // Skip destructors and atexit handlers that belong to the parent.
    unsafe { libc::_exit(code) }
}

fn replay<L: Logger>(pid: libc::pid_t, reader: File, declared: &Location, logger: &mut L) -> bool {
    let mut pass = true;
    // The phase in flight, and the phase the child should have run next.
    let mut pending: Option<Phase> = None;
    let mut next = Some(Phase::SetUp);

    for line in BufReader::new(reader).lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!(error = %e, "couldn't read from test process");
                break;
            }
        };
        match serde_json::from_str::<Event>(&line) {
            Ok(Event::StartPhase { phase }) => {
                pending = Some(phase);
                logger.start_phase(phase);
            }
            Ok(Event::Outcome { phase, outcome }) => {
                pending = None;
                next = match phase {
                    Phase::SetUp if outcome.is_success() => Some(Phase::Test),
                    Phase::Test => Some(Phase::TearDown),
                    _ => None,
                };
                pass &= outcome.is_success();
                logger.outcome(phase, &outcome);
            }
            Err(e) => tracing::warn!(error = %e, line, "ignoring malformed event from test process"),
        }
    }

    let status = match wait(pid) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(pid, error = %e, "couldn't wait for test process");
            return false;
        }
    };
    let clean = libc::WIFEXITED(status) && libc::WEXITSTATUS(status) == 0;
    let phase = match (pending, next) {
        (Some(p), _) => p,
        _ if clean => return pass,
        (None, Some(p)) => {
            logger.start_phase(p);
            p
        }
        (None, None) => {
            tracing::error!(pid, status, "test process ended abnormally after its last phase");
            return false;
        }
    };

    let record = if libc::WIFSIGNALED(status) {
        tracing::debug!(pid, signal = libc::WTERMSIG(status), "test process killed by signal");
        guard::signal_record()
    } else {
        Record::new(
            Kind::Exit,
            declared.clone(),
            format!("test process exited with status {}", libc::WEXITSTATUS(status)),
        )
    };
    logger.error(phase, &record);
    false
}

fn wait(pid: libc::pid_t) -> io::Result<libc::c_int> {
    let mut status = 0;
    loop {
        if unsafe { libc::waitpid(pid, &mut status, 0) } == pid {
            return Ok(status);
        }
        let e = io::Error::last_os_error();
        if e.kind() != io::ErrorKind::Interrupted {
            return Err(e);
        }
    }
}
