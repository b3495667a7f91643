use std::fmt;

use dialoguer::{console::Term, theme::ColorfulTheme, Input, Password, Select};
use error_stack::{IntoReport, Result, ResultExt};

#[derive(Debug)]
pub struct DialoguerError;

impl fmt::Display for DialoguerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Dialoguer error")
    }
}

impl std::error::Error for DialoguerError {}

#[derive(Debug, Clone)]
pub struct Dialoguer;

impl Dialoguer {
    /// Select prompt where `Esc`/`q` returns `None`.
    pub fn select_optional<T>(
        prompt_text: String,
        items: Vec<T>,
        default: Option<usize>,
    ) -> Result<Option<usize>, DialoguerError>
    where
        T: ToString + Clone,
    {
        let colorful_theme = &ColorfulTheme::default();
        let mut select = Select::with_theme(colorful_theme);
        let dialog = select
            .with_prompt(&prompt_text)
            .items(&items)
            .default(default.unwrap_or(0));

        dialog
            .interact_on_opt(&Term::stderr())
            .into_report()
            .change_context(DialoguerError)
    }

    pub fn select_yes_or_no(prompt_text: String) -> Result<bool, DialoguerError> {
        let colorful_theme = &ColorfulTheme::default();
        let mut select = Select::with_theme(colorful_theme);
        let dialog = select
            .with_prompt(&prompt_text)
            .item("yes")
            .item("no")
            .default(0);
        let opt = dialog
            .interact_on_opt(&Term::stderr())
            .into_report()
            .change_context(DialoguerError)?
            .ok_or(DialoguerError)
            .into_report()?;

        Ok(opt == 0)
    }

    pub fn input(prompt_text: String) -> Result<String, DialoguerError> {
        Self::input_with_default(prompt_text, None)
    }

    /// Text input that accepts an empty answer, or `default` when given.
    pub fn input_with_default(
        prompt_text: String,
        default: Option<String>,
    ) -> Result<String, DialoguerError> {
        let colorful_theme = &ColorfulTheme::default();
        let mut input = Input::<String>::with_theme(colorful_theme);
        let mut dialog = input.with_prompt(&prompt_text).allow_empty(true);
        if let Some(default) = default {
            dialog = dialog.default(default);
        }
        let answer: String = dialog
            .interact_text()
            .into_report()
            .change_context(DialoguerError)?;

        Ok(answer)
    }

    pub fn password(prompt_text: String) -> Result<String, DialoguerError> {
        let colorful_theme = &ColorfulTheme::default();
        let mut input = Password::with_theme(colorful_theme);
        let dialog: String = input
            .with_prompt(&prompt_text)
            .interact()
            .into_report()
            .change_context(DialoguerError)?;

        Ok(dialog)
    }
}
