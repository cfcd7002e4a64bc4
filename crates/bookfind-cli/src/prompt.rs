//! Interactive terminal prompts

use anyhow::Result;
use std::io::{self, BufRead, Write};

/// Ask a yes/no question, defaulting to no
pub fn confirm(prompt: &str) -> Result<bool> {
    let answer = ask(&format!("{} [y/N]", prompt))?;
    Ok(parse_yes(&answer))
}

/// Prompt for an optional value; blank input is `None`
pub fn prompt_optional(prompt: &str) -> Result<Option<String>> {
    let answer = ask(prompt)?;
    Ok(if answer.is_empty() { None } else { Some(answer) })
}

/// Prompt until the answer is one of `choices`; blank picks `default`
pub fn prompt_choice(prompt: &str, choices: &[&str], default: &str) -> Result<String> {
    loop {
        let answer = ask(&format!("{} [{}] ({})", prompt, choices.join("/"), default))?;
        if let Some(choice) = match_choice(&answer, choices, default) {
            return Ok(choice);
        }
        println!("Please enter one of: {}", choices.join(", "));
    }
}

fn ask(prompt: &str) -> Result<String> {
    print!("{}: ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input)? == 0 {
        anyhow::bail!("No input available (stdin closed)");
    }
    Ok(input.trim().to_string())
}

fn parse_yes(answer: &str) -> bool {
    matches!(answer.to_lowercase().as_str(), "y" | "yes")
}

fn match_choice(answer: &str, choices: &[&str], default: &str) -> Option<String> {
    let answer = answer.trim().to_lowercase();
    if answer.is_empty() {
        return Some(default.to_string());
    }
    choices
        .iter()
        .find(|c| c.eq_ignore_ascii_case(&answer))
        .map(|c| c.to_string())
}
