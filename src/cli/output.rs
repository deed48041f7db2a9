//! Terminal output for replay reports
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use std::fmt::Display;

use colored::Colorize;

use crate::application::script::StepOutcome;
use crate::application::{EventOutcome, RenderCommand, ScriptEvent};
use crate::domain::MoveDecision;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a labeled value (green label)
pub fn labeled(label: &str, msg: &(impl Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl Display + ?Sized)) {
    println!("{}", msg);
}

/// Print the commands a step issued to the bridge (dimmed arrows)
pub fn render_commands(commands: &[RenderCommand]) {
    for command in commands {
        println!("  {} {}", "→".dimmed(), command);
    }
}

/// Print one replayed event with its outcome.
///
/// Rejections go to stdout with the rest of the report, ignored requests
/// are warnings on stderr.
pub fn step(line: usize, event: &ScriptEvent, outcome: &StepOutcome) {
    let at = format!("{line:>3}").dimmed();
    match outcome {
        StepOutcome::Event(EventOutcome::Applied) => {
            println!("{at} {} {event}", "✓".green());
        }
        StepOutcome::Event(EventOutcome::Created(id)) => {
            println!("{at} {} {event} {}", "+".green(), format!("=> {id}").green());
        }
        StepOutcome::Event(EventOutcome::Ignored) => {
            eprintln!(
                "{at} {}: {event}: action disabled, ignored",
                "Warning".yellow()
            );
        }
        StepOutcome::Event(EventOutcome::Rejected(e)) => {
            println!("{at} {} {event}: {}", "✗".red(), e.to_string().red());
        }
        StepOutcome::Decision(MoveDecision::Accept) => {
            println!("{at} {} {event}: {}", "?".cyan(), "accept".green());
        }
        StepOutcome::Decision(MoveDecision::Reject) => {
            println!("{at} {} {event}: {}", "?".cyan(), "reject".red());
        }
    }
}
