//! Terminal prompts

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Select};
use riivo::Prompter;

/// [`Prompter`] that asks on the terminal
///
/// Escape or `q` counts as "no" for confirmations and as no selection for
/// choices.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, question: &str) -> riivo::Result<bool> {
        let answer = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(question)
            .default(true)
            .interact_opt()
            .map_err(prompt_error)?;
        Ok(answer.unwrap_or(false))
    }

    fn select(&mut self, question: &str, choices: &[String]) -> riivo::Result<Option<usize>> {
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(question)
            .items(choices)
            .default(0)
            .interact_opt()
            .map_err(prompt_error)
    }
}

fn prompt_error(err: dialoguer::Error) -> riivo::Error {
    riivo::Error::Prompt(err.to_string())
}
