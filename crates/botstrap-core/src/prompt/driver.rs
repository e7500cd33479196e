use inquire::error::InquireResult;
use inquire::{Confirm, MultiSelect, Select, Text};

/// Terminal prompt primitives. Selections are reported as indices into `options`.
pub trait PromptDriver {
    fn text(&self, message: &str, initial: Option<&str>) -> InquireResult<String>;

    fn select(&self, message: &str, options: Vec<String>, starting: usize) -> InquireResult<usize>;

    fn multi_select(&self, message: &str, options: Vec<String>) -> InquireResult<Vec<usize>>;

    fn confirm(&self, message: &str, initial: Option<bool>) -> InquireResult<bool>;
}

/// [`PromptDriver`] backed by inquire.
#[derive(Debug, Default, Clone, Copy)]
pub struct InquireDriver;

impl PromptDriver for InquireDriver {
    fn text(&self, message: &str, initial: Option<&str>) -> InquireResult<String> {
        let mut prompt = Text::new(message);
        if let Some(initial) = initial {
            prompt = prompt.with_default(initial);
        }
        prompt.prompt()
    }

    fn select(&self, message: &str, options: Vec<String>, starting: usize) -> InquireResult<usize> {
        Select::new(message, options)
            .with_starting_cursor(starting)
            .raw_prompt()
            .map(|choice| choice.index)
    }

    fn multi_select(&self, message: &str, options: Vec<String>) -> InquireResult<Vec<usize>> {
        MultiSelect::new(message, options)
            .raw_prompt()
            .map(|choices| choices.into_iter().map(|choice| choice.index).collect())
    }

    fn confirm(&self, message: &str, initial: Option<bool>) -> InquireResult<bool> {
        let mut prompt = Confirm::new(message);
        if let Some(initial) = initial {
            prompt = prompt.with_default(initial);
        }
        prompt.prompt()
    }
}
