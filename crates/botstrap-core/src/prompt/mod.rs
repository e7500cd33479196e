//! Interactive prompting with a non-interactive fallback.
//!
//! When prompts are disabled every call returns the caller's fallback, or
//! fails with [`PromptError::Unavailable`] when there is none.

pub mod driver;

use std::fmt::Display;
use std::io::IsTerminal as _;

use inquire::InquireError;
use tracing::warn;

pub use driver::{InquireDriver, PromptDriver};

use crate::error::PromptError;

/// True when both stdin and stdout are attached to a terminal.
pub fn is_interactive_terminal() -> bool {
    console::user_attended() && std::io::stdin().is_terminal()
}

pub struct Prompter<D = InquireDriver> {
    driver: D,
    interactive: bool,
}

impl Prompter<InquireDriver> {
    pub fn new(interactive: bool) -> Self {
        Self::with_driver(InquireDriver, interactive)
    }
}

impl<D: PromptDriver> Prompter<D> {
    pub fn with_driver(driver: D, interactive: bool) -> Self {
        Self {
            driver,
            interactive,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn text(
        &self,
        message: &str,
        initial: Option<&str>,
        fallback: Option<String>,
    ) -> Result<String, PromptError> {
        if !self.interactive {
            return resolve_fallback(message, fallback);
        }
        self.driver
            .text(message, initial)
            .map_err(|e| map_driver_error(message, e))
    }

    /// Pick one of `choices`. The fallback also positions the cursor.
    pub fn select<T>(
        &self,
        message: &str,
        choices: &[T],
        fallback: Option<T>,
    ) -> Result<T, PromptError>
    where
        T: Clone + Display + PartialEq,
    {
        if !self.interactive {
            return resolve_fallback(message, fallback);
        }
        let starting = fallback
            .as_ref()
            .and_then(|f| choices.iter().position(|c| c == f))
            .unwrap_or(0);
        let labels = choices.iter().map(ToString::to_string).collect();
        let index = self
            .driver
            .select(message, labels, starting)
            .map_err(|e| map_driver_error(message, e))?;
        choices
            .get(index)
            .cloned()
            .ok_or_else(|| PromptError::Unavailable {
                message: message.to_string(),
            })
    }

    pub fn multi_select<T>(
        &self,
        message: &str,
        choices: &[T],
        fallback: Option<Vec<T>>,
    ) -> Result<Vec<T>, PromptError>
    where
        T: Clone + Display,
    {
        if !self.interactive {
            return resolve_fallback(message, fallback);
        }
        let labels = choices.iter().map(ToString::to_string).collect();
        let indices = self
            .driver
            .multi_select(message, labels)
            .map_err(|e| map_driver_error(message, e))?;
        Ok(indices
            .into_iter()
            .filter_map(|index| choices.get(index).cloned())
            .collect())
    }

    pub fn confirm(
        &self,
        message: &str,
        initial: Option<bool>,
        fallback: Option<bool>,
    ) -> Result<bool, PromptError> {
        if !self.interactive {
            return resolve_fallback(message, fallback);
        }
        self.driver
            .confirm(message, initial)
            .map_err(|e| map_driver_error(message, e))
    }
}

fn resolve_fallback<T>(message: &str, fallback: Option<T>) -> Result<T, PromptError> {
    fallback.ok_or_else(|| PromptError::Unavailable {
        message: message.to_string(),
    })
}

fn map_driver_error(message: &str, error: InquireError) -> PromptError {
    match error {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => {
            warn!("Prompt cancelled by user");
            PromptError::Cancelled
        }
        other => PromptError::Driver {
            message: message.to_string(),
            source: other,
        },
    }
}
