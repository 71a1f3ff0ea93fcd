//! Menu state machine
//!
//! A [`Program`] supplies the menu text, choice parsing and the work behind
//! each choice; the [`Dispatcher`] owns the input and output and walks
//!
//! ```text
//! Idle --valid--> Running --complete, enter--> Idle
//! Idle --exit--> Exiting
//! Idle --invalid--> Idle   (message + pause, no enter prompt)
//! ```
//!
//! End of input at any prompt moves straight to `Exiting`.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::present::Palette;

/// Pause after an invalid choice
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(1500);

pub const RETURN_PROMPT: &str = "Press Enter to return to menu...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState<C> {
    Idle,
    Running(C),
    Exiting,
}

/// What a menu-driven program shows and does
pub trait Program {
    type Choice: Copy + fmt::Debug;

    /// Full menu, ending with the input prompt
    fn menu(&self, palette: &Palette) -> String;

    fn parse_choice(&self, line: &str) -> Option<Self::Choice>;

    fn is_exit(&self, choice: Self::Choice) -> bool;

    /// Writes as it goes, so long-running choices show progress
    fn run(&self, choice: Self::Choice, palette: &Palette, out: &mut dyn Write) -> io::Result<()>;

    fn invalid_message(&self, palette: &Palette) -> String;

    fn farewell(&self, palette: &Palette) -> String;
}

/// Counters for one dispatcher session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub runs: usize,
    pub invalid: usize,
}

pub struct Dispatcher<R, W> {
    input: R,
    output: W,
    palette: Palette,
    pause: Duration,
}

impl<R: BufRead, W: Write> Dispatcher<R, W> {
    pub fn new(input: R, output: W, palette: Palette) -> Self {
        Self {
            input,
            output,
            palette,
            pause: DEFAULT_PAUSE,
        }
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Drive `program` until the user exits or input ends
    pub fn run<P: Program>(&mut self, program: &P) -> io::Result<Session> {
        let mut session = Session::default();
        let mut state = MenuState::Idle;

        loop {
            state = match state {
                MenuState::Idle => self.idle(program, &mut session)?,
                MenuState::Running(choice) => {
                    debug!(?choice, "running choice");
                    session.runs += 1;
                    program.run(choice, &self.palette, &mut self.output)?;
                    write!(self.output, "\n{}", self.palette.heading(RETURN_PROMPT))?;
                    self.output.flush()?;
                    match self.read_line() {
                        Some(_) => MenuState::Idle,
                        None => self.end_of_input()?,
                    }
                }
                MenuState::Exiting => break,
            };
        }

        debug!(runs = session.runs, invalid = session.invalid, "menu closed");
        Ok(session)
    }

    fn idle<P: Program>(
        &mut self,
        program: &P,
        session: &mut Session,
    ) -> io::Result<MenuState<P::Choice>> {
        self.output.write_all(program.menu(&self.palette).as_bytes())?;
        self.output.flush()?;

        let Some(line) = self.read_line() else {
            return self.end_of_input();
        };

        Ok(match program.parse_choice(line.trim()) {
            Some(choice) if program.is_exit(choice) => {
                self.output
                    .write_all(program.farewell(&self.palette).as_bytes())?;
                MenuState::Exiting
            }
            Some(choice) => MenuState::Running(choice),
            None => {
                debug!(input = line.trim(), "invalid menu choice");
                session.invalid += 1;
                self.output
                    .write_all(program.invalid_message(&self.palette).as_bytes())?;
                self.output.flush()?;
                if !self.pause.is_zero() {
                    thread::sleep(self.pause);
                }
                MenuState::Idle
            }
        })
    }

    fn end_of_input<C>(&mut self) -> io::Result<MenuState<C>> {
        writeln!(self.output)?;
        Ok(MenuState::Exiting)
    }

    /// One line without its terminator; `None` at end of input or on error
    fn read_line(&mut self) -> Option<String> {
        read_line(&mut self.input)
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

/// One line from `input`; a read error is logged and treated as end of input
pub fn read_line(input: &mut impl BufRead) -> Option<String> {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        Err(e) => {
            warn!(error = %e, "failed to read input");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter;

    impl Program for Counter {
        type Choice = u8;

        fn menu(&self, _: &Palette) -> String {
            "menu> ".to_string()
        }

        fn parse_choice(&self, line: &str) -> Option<u8> {
            line.parse().ok().filter(|n| *n <= 2)
        }

        fn is_exit(&self, choice: u8) -> bool {
            choice == 0
        }

        fn run(&self, choice: u8, _: &Palette, out: &mut dyn Write) -> io::Result<()> {
            writeln!(out, "ran {choice}")
        }

        fn invalid_message(&self, _: &Palette) -> String {
            "bad\n".to_string()
        }

        fn farewell(&self, _: &Palette) -> String {
            "bye\n".to_string()
        }
    }

    fn drive(input: &str) -> (Session, String) {
        let mut dispatcher = Dispatcher::new(input.as_bytes(), Vec::new(), Palette::plain())
            .with_pause(Duration::ZERO);
        let session = dispatcher.run(&Counter).unwrap();
        let out = String::from_utf8(dispatcher.into_output()).unwrap();
        (session, out)
    }

    #[test]
    fn test_run_then_exit() {
        let (session, out) = drive("1\n\n0\n");
        assert_eq!(
            session,
            Session {
                runs: 1,
                invalid: 0,
            }
        );
        assert_eq!(
            out,
            "menu> ran 1\n\nPress Enter to return to menu...menu> bye\n"
        );
    }

    #[test]
    fn test_invalid_skips_enter_prompt() {
        let (session, out) = drive("7\n0\n");
        assert_eq!(
            session,
            Session {
                runs: 0,
                invalid: 1,
            }
        );
        assert_eq!(out, "menu> bad\nmenu> bye\n");
    }

    #[test]
    fn test_eof_while_idle() {
        let (session, out) = drive("");
        assert_eq!(session, Session::default());
        assert_eq!(out, "menu> \n");
    }

    #[test]
    fn test_eof_at_return_prompt() {
        let (session, out) = drive("2\n");
        assert_eq!(session.runs, 1);
        assert!(out.ends_with("Press Enter to return to menu...\n"));
    }

    #[test]
    fn test_read_line_strips_crlf() {
        let mut input: &[u8] = b"3\r\nrest";
        assert_eq!(read_line(&mut input).as_deref(), Some("3"));
        assert_eq!(read_line(&mut input).as_deref(), Some("rest"));
        assert_eq!(read_line(&mut input), None);
    }
}
