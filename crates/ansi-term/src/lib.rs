//! Minimal ANSI color helpers for terminal output.
//!
//! [`WithFg`] wraps any [`Display`](fmt::Display) value and paints it with a
//! bold foreground color. Whether escape sequences are emitted at all is
//! controlled by a [`Palette`], so the same rendering code can produce plain
//! text for pipes, scripts and tests.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    DarkGray,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    Default,
}

impl Color {
    fn fg(self) -> u8 {
        match self {
            Self::DarkGray => 90,
            Self::Red => 31,
            Self::Green => 32,
            Self::Yellow => 33,
            Self::Blue => 34,
            Self::Magenta => 35,
            Self::Cyan => 36,
            Self::Default => 39,
        }
    }
}

/// Switch deciding whether painted values carry escape sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Default for Palette {
    fn default() -> Self {
        Self::COLORED
    }
}

impl Palette {
    pub const COLORED: Self = Self { enabled: true };
    pub const PLAIN: Self = Self { enabled: false };

    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    #[must_use]
    pub fn is_enabled(self) -> bool {
        self.enabled
    }

    /// Paints `value` with `color`, or passes it through unchanged when the
    /// palette is disabled.
    pub fn paint<T>(self, color: Color, value: T) -> WithFg<T> {
        WithFg {
            color: self.enabled.then_some(color),
            value,
        }
    }
}

pub struct WithFg<T> {
    color: Option<Color>,
    value: T,
}

impl<T> fmt::Display for WithFg<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = &self.value;
        match self.color {
            Some(color) => {
                let fg = color.fg();
                write!(f, "\x1B[{fg};1m{value}\x1B[0m")
            }
            None => fmt::Display::fmt(value, f),
        }
    }
}

impl<T> WithFg<T> {
    pub fn new(color: Color, value: T) -> Self {
        Palette::COLORED.paint(color, value)
    }
}
