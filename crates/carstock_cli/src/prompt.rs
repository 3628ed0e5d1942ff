//! Terminal input seam.
//!
//! The menu talks to `Prompt` so tests can script answers.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use std::io;

pub trait Prompt {
    /// Free text; an empty answer is allowed.
    fn input(&mut self, prompt: &str) -> io::Result<String>;

    /// Index of the chosen item.
    fn select(&mut self, prompt: &str, items: &[String]) -> io::Result<usize>;
}

/// Interactive prompts on the controlling terminal.
pub struct TermPrompt {
    theme: ColorfulTheme,
}

impl TermPrompt {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TermPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for TermPrompt {
    fn input(&mut self, prompt: &str) -> io::Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(io::Error::other)
    }

    fn select(&mut self, prompt: &str, items: &[String]) -> io::Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()
            .map_err(io::Error::other)
    }
}

#[cfg(test)]
pub mod scripted {
    use super::Prompt;
    use std::collections::VecDeque;
    use std::io;

    /// Answers prompts from a fixed script; `select` answers are item indices.
    pub struct ScriptedPrompt {
        answers: VecDeque<String>,
    }

    impl ScriptedPrompt {
        pub fn new(answers: &[&str]) -> Self {
            Self {
                answers: answers.iter().map(|answer| answer.to_string()).collect(),
            }
        }

        fn next(&mut self, prompt: &str) -> io::Result<String> {
            self.answers.pop_front().ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("script exhausted at `{prompt}`"),
                )
            })
        }
    }

    impl Prompt for ScriptedPrompt {
        fn input(&mut self, prompt: &str) -> io::Result<String> {
            self.next(prompt)
        }

        fn select(&mut self, prompt: &str, items: &[String]) -> io::Result<usize> {
            let answer = self.next(prompt)?;
            answer
                .parse::<usize>()
                .ok()
                .filter(|index| *index < items.len())
                .ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("bad selection `{answer}` for `{prompt}`"),
                    )
                })
        }
    }
}
