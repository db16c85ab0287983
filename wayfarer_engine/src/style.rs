//! Styling helpers for terminal output.
//!
//! The [`GameStyle`] trait provides convenience methods for applying ANSI
//! styling via the `colored` crate. Implementations for `&str` and `String`
//! are provided so string literals can be styled directly.

use crate::attributes::StatusBand;
use colored::{ColoredString, Colorize};

/// Convenience trait for applying color and style to text output.
pub trait GameStyle {
    fn title_style(&self) -> ColoredString;
    fn description_style(&self) -> ColoredString;
    fn option_key_style(&self) -> ColoredString;
    fn option_label_style(&self) -> ColoredString;
    fn npc_style(&self) -> ColoredString;
    fn monster_style(&self) -> ColoredString;
    fn stat_label_style(&self) -> ColoredString;
    fn prompt_style(&self) -> ColoredString;
    fn section_style(&self) -> ColoredString;
    fn error_style(&self) -> ColoredString;
    fn denied_style(&self) -> ColoredString;
    fn engine_style(&self) -> ColoredString;
    fn band_style(&self, band: StatusBand) -> ColoredString;
}

impl GameStyle for &str {
    fn title_style(&self) -> ColoredString {
        self.truecolor(223, 77, 10).underline()
    }
    fn description_style(&self) -> ColoredString {
        self.italic().truecolor(102, 208, 250)
    }
    fn option_key_style(&self) -> ColoredString {
        self.bold().truecolor(220, 180, 40)
    }
    fn option_label_style(&self) -> ColoredString {
        self.normal()
    }
    fn npc_style(&self) -> ColoredString {
        self.truecolor(13, 130, 60).underline()
    }
    fn monster_style(&self) -> ColoredString {
        self.bold().truecolor(230, 80, 80)
    }
    fn stat_label_style(&self) -> ColoredString {
        self.truecolor(150, 150, 160)
    }
    fn prompt_style(&self) -> ColoredString {
        self.bold().truecolor(110, 220, 110)
    }
    fn section_style(&self) -> ColoredString {
        let bracketed = format!("[{self}]");
        bracketed.truecolor(75, 80, 75)
    }
    fn error_style(&self) -> ColoredString {
        self.truecolor(230, 30, 30)
    }
    fn denied_style(&self) -> ColoredString {
        self.italic().truecolor(230, 30, 30)
    }
    fn engine_style(&self) -> ColoredString {
        self.dimmed().truecolor(80, 80, 230)
    }
    fn band_style(&self, band: StatusBand) -> ColoredString {
        match band {
            StatusBand::Buffed => self.truecolor(80, 230, 230),
            StatusBand::Good => self.truecolor(110, 220, 110),
            StatusBand::Okay => self.truecolor(230, 230, 30),
            StatusBand::Poor => self.truecolor(230, 140, 30),
            StatusBand::Hurt => self.truecolor(230, 30, 30),
        }
    }
}

impl GameStyle for String {
    fn title_style(&self) -> ColoredString {
        self.as_str().title_style()
    }
    fn description_style(&self) -> ColoredString {
        self.as_str().description_style()
    }
    fn option_key_style(&self) -> ColoredString {
        self.as_str().option_key_style()
    }
    fn option_label_style(&self) -> ColoredString {
        self.as_str().option_label_style()
    }
    fn npc_style(&self) -> ColoredString {
        self.as_str().npc_style()
    }
    fn monster_style(&self) -> ColoredString {
        self.as_str().monster_style()
    }
    fn stat_label_style(&self) -> ColoredString {
        self.as_str().stat_label_style()
    }
    fn prompt_style(&self) -> ColoredString {
        self.as_str().prompt_style()
    }
    fn section_style(&self) -> ColoredString {
        self.as_str().section_style()
    }
    fn error_style(&self) -> ColoredString {
        self.as_str().error_style()
    }
    fn denied_style(&self) -> ColoredString {
        self.as_str().denied_style()
    }
    fn engine_style(&self) -> ColoredString {
        self.as_str().engine_style()
    }
    fn band_style(&self, band: StatusBand) -> ColoredString {
        self.as_str().band_style(band)
    }
}
