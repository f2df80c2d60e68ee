//! Inline keyboard markup.
//!
//! A keyboard is a list of button rows, serialized as a JSON array of arrays
//! into the `inlineKeyboardMarkup` parameter. Editing operations reject
//! out-of-range indexes with a usage error.

use serde::{Deserialize, Serialize};

use tb_core::error::{BotError, BotResult};

/// Visual emphasis of a button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    #[default]
    Base,
    Attention,
    Primary,
}

/// A single inline button. Exactly one of `url` and `callback_data` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Button {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ButtonStyle>,
}

impl Button {
    /// A button that opens a link.
    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: Some(url.into()),
            callback_data: None,
            style: None,
        }
    }

    /// A button that produces a `callbackQuery` event when pressed.
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: None,
            callback_data: Some(data.into()),
            style: None,
        }
    }

    pub fn with_style(mut self, style: ButtonStyle) -> Self {
        self.style = Some(style);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keyboard {
    rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new row of buttons.
    pub fn add_row(&mut self, buttons: impl IntoIterator<Item = Button>) {
        self.rows.push(buttons.into_iter().collect());
    }

    /// Append a button to the end of an existing row.
    pub fn add_button(&mut self, row: usize, button: Button) -> BotResult<()> {
        self.row_mut(row)?.push(button);
        Ok(())
    }

    pub fn delete_row(&mut self, row: usize) -> BotResult<()> {
        self.check_row(row)?;
        self.rows.remove(row);
        Ok(())
    }

    pub fn delete_button(&mut self, row: usize, button: usize) -> BotResult<()> {
        self.check_button(row, button)?;
        self.rows[row].remove(button);
        Ok(())
    }

    /// Replace the button at the given position.
    pub fn change_button(&mut self, row: usize, button: usize, new_button: Button) -> BotResult<()> {
        self.check_button(row, button)?;
        self.rows[row][button] = new_button;
        Ok(())
    }

    pub fn swap_rows(&mut self, first: usize, second: usize) -> BotResult<()> {
        self.check_row(first)?;
        self.check_row(second)?;
        self.rows.swap(first, second);
        Ok(())
    }

    pub fn rows_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of buttons in a row, `None` if there is no such row.
    pub fn row_size(&self, row: usize) -> Option<usize> {
        self.rows.get(row).map(Vec::len)
    }

    pub fn rows(&self) -> &[Vec<Button>] {
        &self.rows
    }

    /// Serialize into the `inlineKeyboardMarkup` parameter value.
    pub fn to_markup(&self) -> BotResult<String> {
        if self.rows.is_empty() || self.rows.iter().any(Vec::is_empty) {
            return Err(BotError::Usage(
                "inline keyboard needs at least one row and no empty rows".into(),
            ));
        }
        Ok(serde_json::to_string(&self.rows)?)
    }

    fn row_mut(&mut self, row: usize) -> BotResult<&mut Vec<Button>> {
        self.rows
            .get_mut(row)
            .ok_or_else(|| BotError::Usage(format!("no such row: {row}")))
    }

    fn check_row(&self, row: usize) -> BotResult<()> {
        if row < self.rows.len() {
            Ok(())
        } else {
            Err(BotError::Usage(format!("no such row: {row}")))
        }
    }

    fn check_button(&self, row: usize, button: usize) -> BotResult<()> {
        self.check_row(row)?;
        if button < self.rows[row].len() {
            Ok(())
        } else {
            Err(BotError::Usage(format!("no button at this index: {button}")))
        }
    }
}
