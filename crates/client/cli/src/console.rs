//! Terminal rendering of narration, banners, and the room map.

use std::io::{self, BufRead, Write};

use crossterm::style::Stylize;
use skirmish_runtime::Console;

/// Colored line-oriented console.
pub struct TerminalConsole;

impl TerminalConsole {
    fn colored_cell(symbol: char) -> String {
        match symbol {
            '@' => symbol.to_string().yellow().bold().to_string(),
            'l' => symbol.to_string().green().to_string(),
            'G' => symbol.to_string().magenta().to_string(),
            'W' | 'O' => symbol.to_string().dark_grey().to_string(),
            c if c.is_ascii_uppercase() => symbol.to_string().red().to_string(),
            _ => symbol.to_string(),
        }
    }
}

impl Console for TerminalConsole {
    fn banner(&mut self, text: &str) {
        println!();
        println!("{}", text.cyan().bold());
    }

    fn line(&mut self, text: &str) {
        println!("{text}");
    }

    fn map(&mut self, rows: &[String]) {
        for row in rows {
            let rendered: String = row.chars().map(Self::colored_cell).collect();
            println!("  {rendered}");
        }
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        print!("{} ", prompt.green());
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => false,
            Ok(_) => {
                let answer = line.trim();
                answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
            }
        }
    }
}
