use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Buttons pressed during one tick.
///
/// Policies and human input produce the same encoding: one flag per control
/// channel, in the order left, right, jump. The text form lists the pressed
/// buttons as letters (`"RJ"` = run right and jump, `"-"` = nothing).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    buttons: [bool; Action::CHANNELS],
}

impl Action {
    pub const CHANNELS: usize = 3;
    pub const LEFT: usize = 0;
    pub const RIGHT: usize = 1;
    pub const JUMP: usize = 2;

    pub const NONE: Self = Self {
        buttons: [false; Self::CHANNELS],
    };

    const LETTERS: [char; Self::CHANNELS] = ['L', 'R', 'J'];

    #[must_use]
    pub const fn new(left: bool, right: bool, jump: bool) -> Self {
        Self {
            buttons: [left, right, jump],
        }
    }

    #[must_use]
    pub const fn from_buttons(buttons: [bool; Self::CHANNELS]) -> Self {
        Self { buttons }
    }

    #[must_use]
    pub const fn buttons(self) -> [bool; Self::CHANNELS] {
        self.buttons
    }

    #[must_use]
    pub const fn left(self) -> bool {
        self.buttons[Self::LEFT]
    }

    #[must_use]
    pub const fn right(self) -> bool {
        self.buttons[Self::RIGHT]
    }

    #[must_use]
    pub const fn jump(self) -> bool {
        self.buttons[Self::JUMP]
    }

    /// Horizontal input direction: -1, 0 or 1.
    #[must_use]
    pub fn direction(self) -> f32 {
        f32::from(u8::from(self.right())) - f32::from(u8::from(self.left()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.buttons.contains(&true) {
            return write!(f, "-");
        }
        for (pressed, letter) in self.buttons.iter().zip(Self::LETTERS) {
            if *pressed {
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid action {input:?}: expected letters L, R, J or '-'")]
pub struct ParseActionError {
    input: String,
}

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut buttons = [false; Self::CHANNELS];
        let trimmed = s.trim();
        if trimmed == "-" {
            return Ok(Self::NONE);
        }
        for ch in trimmed.chars() {
            let channel = Self::LETTERS
                .iter()
                .position(|l| l.eq_ignore_ascii_case(&ch))
                .ok_or_else(|| ParseActionError {
                    input: s.to_owned(),
                })?;
            buttons[channel] = true;
        }
        Ok(Self { buttons })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_letters() {
        assert_eq!("R".parse::<Action>().unwrap(), Action::new(false, true, false));
        assert_eq!("jr".parse::<Action>().unwrap(), Action::new(false, true, true));
        assert_eq!("".parse::<Action>().unwrap(), Action::NONE);
        assert_eq!("-".parse::<Action>().unwrap(), Action::NONE);
        assert!("X".parse::<Action>().is_err());
    }

    #[test]
    fn test_display_matches_parse() {
        for bits in 0..8u8 {
            let action = Action::new(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0);
            assert_eq!(action.to_string().parse::<Action>().unwrap(), action);
        }
    }

    #[test]
    fn test_direction() {
        assert!((Action::new(true, true, false).direction()).abs() < f32::EPSILON);
        assert!((Action::new(false, true, false).direction() - 1.0).abs() < f32::EPSILON);
        assert!((Action::new(true, false, true).direction() + 1.0).abs() < f32::EPSILON);
    }
}
