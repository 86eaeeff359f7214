// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt::Display;
use std::io::{self, IsTerminal};
use std::time::Duration;

use anyhow::{bail, Result};
use console::{style, Term};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};

/// Prints a nice looking main title into the terminal.
pub fn print_title(title: &str) {
    println!("{} {title}\n", style("ferrum:").bold().underlined());
}

/// Prints a nice looking variable value into the terminal.
pub fn print_variable(name: &str, value: impl Display) {
    println!("- {name}: {}", style(value).dim());
}

/// How a confirmation prompt gets answered.
#[derive(Debug, PartialEq)]
enum Answer {
    /// Confirmed without asking.
    Assumed,

    /// Ask the user on the terminal.
    Prompt,

    /// Input comes from a terminal but the prompt can not be shown.
    Unavailable,
}

/// Only stdin decides whether somebody can answer, redirecting stdout (for example into `tee`)
/// still asks. The prompt itself is drawn on stderr.
fn answer(assume_yes: bool, stdin_is_term: bool, stderr_is_term: bool) -> Answer {
    if assume_yes || !stdin_is_term {
        Answer::Assumed
    } else if !stderr_is_term {
        Answer::Unavailable
    } else {
        Answer::Prompt
    }
}

/// Asks the user for confirmation.
///
/// Returns `true` without asking when `assume_yes` is set or stdin is not a terminal, for example
/// when running in CI.
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    match answer(
        assume_yes,
        io::stdin().is_terminal(),
        Term::stderr().is_term(),
    ) {
        Answer::Assumed => Ok(true),
        Answer::Prompt => Ok(Confirm::new().with_prompt(prompt).interact()?),
        Answer::Unavailable => {
            bail!("Can not ask for confirmation without a terminal on stderr, pass --yes instead")
        }
    }
}

/// Returns a ticking spinner showing the given message until it gets finished.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

#[cfg(test)]
mod tests {
    use super::{answer, confirm, Answer};

    #[test]
    fn assume_yes_never_asks() {
        assert!(confirm("Deploy?", true).unwrap());
        assert_eq!(answer(true, true, true), Answer::Assumed);
    }

    #[test]
    fn stdin_decides_about_asking() {
        assert_eq!(answer(false, false, true), Answer::Assumed);
        assert_eq!(answer(false, true, true), Answer::Prompt);
        assert_eq!(answer(false, true, false), Answer::Unavailable);
    }
}
