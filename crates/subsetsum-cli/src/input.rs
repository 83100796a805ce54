use anyhow::{bail, Context, Result};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Parse numbers separated by whitespace and/or commas.
///
/// The position of a token is its row index, which is what validation
/// errors and results refer to.
pub fn parse_numbers(text: &str) -> Result<Vec<f64>> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(row, token)| {
            token
                .parse::<f64>()
                .with_context(|| format!("row {}: '{}' is not a number", row, token))
        })
        .collect()
}

/// Read the input collection from `path`, or from stdin when `None`.
pub fn read_numbers(path: Option<&Path>) -> Result<Vec<f64>> {
    let text = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read numbers from stdin")?;
            text
        }
    };

    let numbers = parse_numbers(&text)?;
    if numbers.is_empty() {
        bail!("no numbers in input");
    }
    Ok(numbers)
}
