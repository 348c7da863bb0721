//! The manual decision provider: a numbered terminal menu.

use std::io::{self, BufRead, Write};

use crossterm::style::Stylize;
use skirmish_core::ActionOption;
use skirmish_runtime::{Decision, DecisionProvider, ProviderError};

/// Prompts the player on stdin. Accepts an option number or the exact
/// action label; anything else re-prompts.
pub struct ManualProvider;

impl DecisionProvider for ManualProvider {
    fn choose(
        &mut self,
        context: &str,
        options: &[ActionOption],
    ) -> Result<Decision, ProviderError> {
        if options.is_empty() {
            return Err(ProviderError::NoOptions);
        }

        println!();
        println!("{}", context.dark_grey());
        for (index, option) in options.iter().enumerate() {
            println!("  {} - {}", index.to_string().cyan(), option.label);
        }

        let stdin = io::stdin();
        loop {
            print!("{} ", ">".green().bold());
            io::stdout().flush()?;

            let mut line = String::new();
            let read = stdin.lock().read_line(&mut line)?;
            if read == 0 {
                return Err(ProviderError::Input(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "stdin closed",
                )));
            }
            let input = line.trim();

            if let Ok(index) = input.parse::<usize>() {
                if let Some(option) = options.get(index) {
                    return Ok(Decision {
                        label: option.label.clone(),
                        comment: None,
                    });
                }
            }
            if let Some(option) = options.iter().find(|o| o.label == input) {
                return Ok(Decision {
                    label: option.label.clone(),
                    comment: None,
                });
            }

            println!(
                "{}",
                format!(
                    "Pick a number between 0 and {} or type the exact action.",
                    options.len() - 1
                )
                .yellow()
            );
        }
    }
}
