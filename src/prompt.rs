//! Interactive questions.
//!
//! Commands ask through the [`Prompter`] trait so tests can script the answers.
//! [`ConsolePrompter`] works over any reader/writer pair; `stdio()` is the
//! terminal one.

use crate::error::{Error, Result};
use std::io::{self, BufRead, StdinLock, Stdout, Write};

/// Blocking question/answer capability.
pub trait Prompter {
    /// Free text answer, without the trailing newline.
    fn ask_text(&mut self, question: &str) -> Result<String>;

    /// Yes/no answer; asks again until it gets one.
    fn ask_bool(&mut self, question: &str) -> Result<bool>;

    /// Pick one of `options`. Returns its index.
    fn ask_select(&mut self, options: &[String], prompt: &str) -> Result<usize>;

    /// Pick one or more of `options`. Returns their indexes in list order.
    fn ask_select_multiple(&mut self, options: &[String], prompt: &str) -> Result<Vec<usize>>;
}

impl<P: Prompter + ?Sized> Prompter for &mut P {
    fn ask_text(&mut self, question: &str) -> Result<String> {
        (**self).ask_text(question)
    }

    fn ask_bool(&mut self, question: &str) -> Result<bool> {
        (**self).ask_bool(question)
    }

    fn ask_select(&mut self, options: &[String], prompt: &str) -> Result<usize> {
        (**self).ask_select(options, prompt)
    }

    fn ask_select_multiple(&mut self, options: &[String], prompt: &str) -> Result<Vec<usize>> {
        (**self).ask_select_multiple(options, prompt)
    }
}

const YES: &[&str] = &["Y", "y", "Yes", "yes"];
const NO: &[&str] = &["N", "n", "No", "no"];

/// Prompter reading answers line by line from `input`.
#[derive(Debug)]
pub struct ConsolePrompter<R, W> {
    input: R,
    output: W,
}

impl ConsolePrompter<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        ConsolePrompter::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        ConsolePrompter { input, output }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }

    fn ask_simple(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::PromptClosed);
        }
        Ok(line.trim_end_matches(|c| c == '\r' || c == '\n').to_string())
    }

    fn menu(options: &[String], prompt: &str) -> String {
        let mut text: Vec<String> = options
            .iter()
            .enumerate()
            .map(|(i, option)| format!("{}) {}", i + 1, option))
            .collect();
        text.push(prompt.to_string());
        text.join("\n")
    }
}

impl<R: BufRead, W: Write> Prompter for ConsolePrompter<R, W> {
    fn ask_text(&mut self, question: &str) -> Result<String> {
        self.ask_simple(question)
    }

    fn ask_bool(&mut self, question: &str) -> Result<bool> {
        let mut question = question.to_string();
        loop {
            let answer = self.ask_simple(&question)?;
            let answer = answer.trim();
            if YES.contains(&answer) {
                return Ok(true);
            }
            if NO.contains(&answer) {
                return Ok(false);
            }
            question = "[y/n] ".to_string();
        }
    }

    fn ask_select(&mut self, options: &[String], prompt: &str) -> Result<usize> {
        let mut message = Self::menu(options, prompt);
        loop {
            let answer = self.ask_simple(&message)?;
            match answer.trim().parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(n - 1),
                _ => message = prompt.to_string(),
            }
        }
    }

    fn ask_select_multiple(&mut self, options: &[String], prompt: &str) -> Result<Vec<usize>> {
        let mut message = Self::menu(options, prompt);
        loop {
            let answer = self.ask_simple(&message)?;
            message = prompt.to_string();

            let parts: Vec<&str> = if answer.contains(',') {
                answer.split(',').collect()
            } else {
                answer.split_whitespace().collect()
            };
            let picked: std::result::Result<Vec<usize>, _> =
                parts.iter().map(|p| p.trim().parse::<usize>()).collect();

            if let Ok(picked) = picked {
                if !picked.is_empty() && picked.iter().all(|n| (1..=options.len()).contains(n)) {
                    return Ok((0..options.len()).filter(|i| picked.contains(&(i + 1))).collect());
                }
            }
        }
    }
}
