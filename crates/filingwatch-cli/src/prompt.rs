//! Interactive fallback for values missing from the command line.

use std::io::{self, BufRead, Write};

use anyhow::{Context, bail};

pub trait Prompter {
    /// Ask `question` and return the trimmed answer.
    fn ask(&mut self, question: &str) -> anyhow::Result<String>;
}

/// Questions on stderr, answers from stdin; stdout stays reserved for records.
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask(&mut self, question: &str) -> anyhow::Result<String> {
        let mut stderr = io::stderr();
        write!(stderr, "{question}: ")?;
        stderr.flush()?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .context("reading from stdin")?;
        if read == 0 {
            bail!("stdin closed while waiting for: {question}");
        }
        Ok(line.trim().to_string())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;

    use super::Prompter;

    /// Replays canned answers and records the questions asked.
    #[derive(Default)]
    pub struct ScriptedPrompter {
        pub answers: VecDeque<String>,
        pub asked: Vec<String>,
    }

    impl ScriptedPrompter {
        pub fn new(answers: &[&str]) -> Self {
            Self {
                answers: answers.iter().map(|s| s.to_string()).collect(),
                asked: Vec::new(),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn ask(&mut self, question: &str) -> anyhow::Result<String> {
            self.asked.push(question.to_string());
            self.answers
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("no scripted answer for: {question}"))
        }
    }
}
