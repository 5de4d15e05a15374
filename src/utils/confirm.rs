//! Yes/no confirmation, injected into commands that need operator consent

use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Asks the operator a yes/no question
pub trait Confirm {
    fn confirm(&self, question: &str, default: bool) -> bool;
}

/// Non-interactive: always yes (`--yes`)
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _question: &str, _default: bool) -> bool {
        true
    }
}

/// Non-interactive: always no
pub struct AssumeNo;

impl Confirm for AssumeNo {
    fn confirm(&self, _question: &str, _default: bool) -> bool {
        false
    }
}

/// Terminal prompt without a deadline
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, question: &str, default: bool) -> bool {
        dialoguer::Confirm::new()
            .with_prompt(question)
            .default(default)
            .interact_opt()
            .ok()
            .flatten()
            .unwrap_or(default)
    }
}

/// Line-based prompt; falls back to the default on timeout, EOF or a blank answer
pub struct StdinConfirm {
    input: Arc<Mutex<Box<dyn BufRead + Send>>>,
    timeout: Duration,
}

impl StdinConfirm {
    pub fn new(timeout: Duration) -> Self {
        Self::with_reader(Box::new(io::BufReader::new(io::stdin())), timeout)
    }

    pub fn with_reader(input: Box<dyn BufRead + Send>, timeout: Duration) -> Self {
        Self {
            input: Arc::new(Mutex::new(input)),
            timeout,
        }
    }
}

impl Confirm for StdinConfirm {
    fn confirm(&self, question: &str, default: bool) -> bool {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        print!("{} {} ({}s) ", question, hint, self.timeout.as_secs());
        let _ = io::stdout().flush();

        // The reader thread stays blocked on the input if the timeout fires
        let (tx, rx) = mpsc::channel();
        let input = Arc::clone(&self.input);
        thread::spawn(move || {
            let mut line = String::new();
            let answer = match input.lock() {
                Ok(mut reader) => match reader.read_line(&mut line) {
                    Ok(0) | Err(_) => None,
                    Ok(_) => Some(line),
                },
                Err(_) => None,
            };
            let _ = tx.send(answer);
        });

        match rx.recv_timeout(self.timeout) {
            Ok(answer) => answer.as_deref().and_then(parse_answer).unwrap_or(default),
            Err(_) => {
                println!();
                tracing::debug!("No answer within {:?}, using default", self.timeout);
                default
            }
        }
    }
}

/// Pick the confirmation strategy for a command
///
/// A zero timeout on a terminal means wait for the operator indefinitely.
pub fn confirmer(assume_yes: bool, timeout: Duration) -> Box<dyn Confirm> {
    if assume_yes {
        Box::new(AssumeYes)
    } else if timeout.is_zero() && io::stdin().is_terminal() {
        Box::new(TerminalConfirm)
    } else {
        Box::new(StdinConfirm::new(timeout))
    }
}

/// Interpret a typed answer; `None` for blank or unrecognized input
pub fn parse_answer(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use std::time::Instant;

    /// Input that never produces a line
    struct Stalled;

    impl Read for Stalled {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            thread::sleep(Duration::from_secs(60));
            Ok(0)
        }
    }

    fn scripted(input: &str) -> StdinConfirm {
        StdinConfirm::with_reader(
            Box::new(Cursor::new(input.as_bytes().to_vec())),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("y\n"), Some(true));
        assert_eq!(parse_answer(" YES "), Some(true));
        assert_eq!(parse_answer("n"), Some(false));
        assert_eq!(parse_answer(""), None);
        assert_eq!(parse_answer("maybe"), None);
    }

    #[test]
    fn test_fixed_answers() {
        assert!(AssumeYes.confirm("Overwrite?", false));
        assert!(!AssumeNo.confirm("Overwrite?", true));
        assert!(confirmer(true, Duration::from_secs(1)).confirm("Overwrite?", false));
    }

    #[test]
    fn test_typed_answers() {
        assert!(!scripted("n\n").confirm("Overwrite?", true));
        assert!(scripted("yes\n").confirm("Overwrite?", false));
    }

    #[test]
    fn test_answers_are_read_in_sequence() {
        let prompt = scripted("y\nn\n");
        assert!(prompt.confirm("First?", false));
        assert!(!prompt.confirm("Second?", true));
    }

    #[test]
    fn test_blank_or_eof_uses_default() {
        assert!(scripted("\n").confirm("Overwrite?", true));
        assert!(!scripted("\n").confirm("Overwrite?", false));
        assert!(scripted("").confirm("Overwrite?", true));
        assert!(!scripted("").confirm("Overwrite?", false));
    }

    #[test]
    fn test_timeout_uses_default() {
        let prompt = StdinConfirm::with_reader(
            Box::new(io::BufReader::new(Stalled)),
            Duration::from_millis(50),
        );

        let started = Instant::now();
        assert!(prompt.confirm("Overwrite?", true));
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
