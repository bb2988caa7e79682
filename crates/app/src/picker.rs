//! Model selection prompt.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Outcome of the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickResult {
    Confirmed(String),
    Cancelled,
}

/// Index preselected in the picker: the last used model if it still
/// exists, otherwise the first one.
pub fn default_index(models: &[String], last_model: Option<&str>) -> usize {
    last_model
        .and_then(|last| models.iter().position(|m| m == last))
        .unwrap_or(0)
}

/// Interpret picker input: empty picks the default, a 1-based number picks
/// by position, anything else must match a model name.
pub fn resolve_choice(input: &str, models: &[String], default: usize) -> Option<usize> {
    let input = input.trim();
    if input.is_empty() {
        return (default < models.len()).then_some(default);
    }
    if let Ok(n) = input.parse::<usize>() {
        return (1..=models.len()).contains(&n).then(|| n - 1);
    }
    models.iter().position(|m| m == input)
}

pub fn print_models(models: &[String], current: Option<&str>) {
    for (i, name) in models.iter().enumerate() {
        let marker = if Some(name.as_str()) == current { "*" } else { " " };
        println!(" {} {:>2}. {}", marker, i + 1, name);
    }
}

/// Ask the user to choose a model. Ctrl-D or `q` cancels.
pub fn pick_model(
    rl: &mut DefaultEditor,
    models: &[String],
    last_model: Option<&str>,
) -> Result<PickResult> {
    let default = default_index(models, last_model);
    println!("Select a model:");
    print_models(models, None);

    loop {
        let prompt = format!("model [{}]: ", models[default]);
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                return Ok(PickResult::Cancelled)
            }
            Err(e) => return Err(e.into()),
        };
        if line.trim() == "q" {
            return Ok(PickResult::Cancelled);
        }
        match resolve_choice(&line, models, default) {
            Some(i) => return Ok(PickResult::Confirmed(models[i].clone())),
            None => println!("No such model: {}", line.trim()),
        }
    }
}
