//! Interactive yes/no answers for `sync`.
//!
//! Stdin is read on a background thread and Ctrl-C is delivered through the
//! same channel, so an interrupt answers the pending prompt with "no" instead
//! of killing the run halfway through a target.

use std::io::{self, BufRead, ErrorKind, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use agentmirror_sync::Confirm;

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Line(String),
    Eof,
    Interrupt,
}

/// Asks on stderr, reads the answer from stdin. Anything but `y`/`yes` is a
/// no. After end of input or Ctrl-C every remaining prompt is a no without
/// waiting.
pub struct TerminalConfirm {
    input: Receiver<Input>,
    done: bool,
}

impl TerminalConfirm {
    /// Install the Ctrl-C handler and start reading stdin.
    pub fn install() -> Self {
        let (tx, rx) = mpsc::channel();
        let on_interrupt = tx.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            let _ = on_interrupt.send(Input::Interrupt);
        }) {
            tracing::warn!("cannot handle Ctrl-C, it will abort the run: {e}");
        }
        thread::spawn(move || read_lines(io::stdin().lock(), &tx));
        Self::from_channel(rx)
    }

    fn from_channel(input: Receiver<Input>) -> Self {
        Self { input, done: false }
    }
}

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        if self.done {
            return false;
        }
        let mut stderr = io::stderr();
        if write!(stderr, "{prompt} [y/N] ").and_then(|_| stderr.flush()).is_err() {
            return false;
        }
        match self.input.recv() {
            Ok(Input::Line(answer)) => is_yes(&answer),
            Ok(Input::Interrupt) => {
                let _ = writeln!(stderr);
                tracing::warn!("interrupted; answering no to remaining prompts");
                self.done = true;
                false
            }
            Ok(Input::Eof) | Err(_) => {
                let _ = writeln!(stderr);
                self.done = true;
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn read_lines(mut reader: impl BufRead, tx: &Sender<Input>) {
    loop {
        let mut line = String::new();
        let input = match reader.read_line(&mut line) {
            Ok(0) => Input::Eof,
            Ok(_) => Input::Line(line),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::debug!("stdin: {e}");
                Input::Eof
            }
        };
        let last = input == Input::Eof;
        if tx.send(input).is_err() || last {
            return;
        }
    }
}
