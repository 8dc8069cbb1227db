//! Styling helpers for terminal output.
//!
//! The [`GameStyle`] trait applies ANSI styling via the `colored` crate. It is implemented
//! for `&str` and `String` so literals and formatted text can be styled directly.

use colored::{ColoredString, Colorize};

/// Convenience trait for applying color and style to text output.
pub trait GameStyle {
    fn scene_style(&self) -> ColoredString;
    fn scene_titlebar_style(&self) -> ColoredString;
    fn description_style(&self) -> ColoredString;
    fn npc_style(&self) -> ColoredString;
    fn letter_style(&self) -> ColoredString;
    fn mailbox_style(&self) -> ColoredString;
    fn object_style(&self) -> ColoredString;
    fn dialogue_style(&self) -> ColoredString;
    fn task_active_style(&self) -> ColoredString;
    fn task_complete_style(&self) -> ColoredString;
    fn notice_style(&self) -> ColoredString;
    fn prompt_style(&self) -> ColoredString;
    fn subheading_style(&self) -> ColoredString;
    fn error_style(&self) -> ColoredString;
    fn denied_style(&self) -> ColoredString;
}

impl GameStyle for &str {
    fn scene_style(&self) -> ColoredString {
        self.truecolor(223, 77, 10)
    }
    fn scene_titlebar_style(&self) -> ColoredString {
        self.truecolor(223, 77, 10).underline()
    }
    fn description_style(&self) -> ColoredString {
        self.italic().truecolor(102, 208, 250)
    }
    fn npc_style(&self) -> ColoredString {
        self.truecolor(13, 130, 60).underline()
    }
    fn letter_style(&self) -> ColoredString {
        self.truecolor(220, 180, 40)
    }
    fn mailbox_style(&self) -> ColoredString {
        self.truecolor(180, 140, 220)
    }
    fn object_style(&self) -> ColoredString {
        self.italic().truecolor(110, 220, 110)
    }
    fn dialogue_style(&self) -> ColoredString {
        self.truecolor(235, 235, 215)
    }
    fn task_active_style(&self) -> ColoredString {
        self.truecolor(220, 40, 220)
    }
    fn task_complete_style(&self) -> ColoredString {
        self.truecolor(220, 40, 220).strikethrough()
    }
    fn notice_style(&self) -> ColoredString {
        self.italic().truecolor(230, 230, 30)
    }
    fn prompt_style(&self) -> ColoredString {
        self.truecolor(75, 180, 255).bold()
    }
    fn subheading_style(&self) -> ColoredString {
        self.underline()
    }
    fn error_style(&self) -> ColoredString {
        self.truecolor(230, 30, 30)
    }
    fn denied_style(&self) -> ColoredString {
        self.italic().truecolor(230, 30, 30)
    }
}

impl GameStyle for String {
    fn scene_style(&self) -> ColoredString {
        self.as_str().scene_style()
    }
    fn scene_titlebar_style(&self) -> ColoredString {
        self.as_str().scene_titlebar_style()
    }
    fn description_style(&self) -> ColoredString {
        self.as_str().description_style()
    }
    fn npc_style(&self) -> ColoredString {
        self.as_str().npc_style()
    }
    fn letter_style(&self) -> ColoredString {
        self.as_str().letter_style()
    }
    fn mailbox_style(&self) -> ColoredString {
        self.as_str().mailbox_style()
    }
    fn object_style(&self) -> ColoredString {
        self.as_str().object_style()
    }
    fn dialogue_style(&self) -> ColoredString {
        self.as_str().dialogue_style()
    }
    fn task_active_style(&self) -> ColoredString {
        self.as_str().task_active_style()
    }
    fn task_complete_style(&self) -> ColoredString {
        self.as_str().task_complete_style()
    }
    fn notice_style(&self) -> ColoredString {
        self.as_str().notice_style()
    }
    fn prompt_style(&self) -> ColoredString {
        self.as_str().prompt_style()
    }
    fn subheading_style(&self) -> ColoredString {
        self.as_str().subheading_style()
    }
    fn error_style(&self) -> ColoredString {
        self.as_str().error_style()
    }
    fn denied_style(&self) -> ColoredString {
        self.as_str().denied_style()
    }
}
