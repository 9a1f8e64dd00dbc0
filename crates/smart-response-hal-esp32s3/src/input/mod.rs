mod buttons;
mod touch;

pub use buttons::{ButtonConfig, ButtonInput, ButtonInputError};
pub use touch::{FT3168_ADDR, TouchInput};

use smart_response_core::input::{InputEvent, InputProvider};

#[derive(Debug)]
pub enum BoardInputError<ButtonErr, TouchErr> {
    Buttons(ButtonErr),
    Touch(TouchErr),
}

/// Buttons first, then the touch panel, one event per poll.
#[derive(Debug)]
pub struct BoardInput<B, T> {
    buttons: B,
    touch: Option<T>,
}

impl<B: InputProvider, T: InputProvider> BoardInput<B, T> {
    /// `touch` is `None` when the touch controller did not answer.
    pub fn new(buttons: B, touch: Option<T>) -> Self {
        Self { buttons, touch }
    }
}

impl<B: InputProvider, T: InputProvider> InputProvider for BoardInput<B, T> {
    type Error = BoardInputError<B::Error, T::Error>;

    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error> {
        if let Some(event) = self
            .buttons
            .poll_event()
            .map_err(BoardInputError::Buttons)?
        {
            return Ok(Some(event));
        }

        match self.touch.as_mut() {
            Some(touch) => touch.poll_event().map_err(BoardInputError::Touch),
            None => Ok(None),
        }
    }
}
