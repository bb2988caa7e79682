//! Terminal output for the chat transcript.

use crate::thoughts::Thought;
use colored::Colorize;
use shared::ChatError;
use std::path::Path;

/// Header line above a thinking segment.
pub fn thought_header(id: u64, visible: bool) -> String {
    if visible {
        format!("[-] hide thinking #{} (/toggle {})", id, id)
    } else {
        format!("[+] show thinking #{} (/toggle {})", id, id)
    }
}

pub fn print_thought(id: u64, thought: &Thought) {
    println!("{}", thought_header(id, thought.visible).blue().underline());
    if thought.visible {
        println!("{}", thought.text.dimmed());
    }
}

pub fn print_answer(answer: &str) {
    let time = chrono::Local::now().format("%H:%M");
    println!("{} {}\n", format!("[{}] AI:", time).bold(), answer);
}

pub fn print_notice(text: &str) {
    println!("{}\n", text.italic());
}

pub fn print_error(err: &ChatError) {
    println!("{}\n", format_error_message(err).red());
}

pub fn print_no_models(models_dir: &Path) {
    eprintln!(
        "No models found!\nPut each model in its own folder under {} and restart.",
        models_dir.display()
    );
}

/// Format error message with helpful troubleshooting info
pub fn format_error_message(err: &ChatError) -> String {
    let error = err.to_string();
    if err.is_configuration() {
        return format!(
            "This model can't be used.\n\n{}\n\n\
            A model folder needs weight files and a tokenizer_config.json with a chat template.",
            error
        );
    }

    let error_lower = error.to_lowercase();

    // Checked first: a timed-out request can also mention the connection
    if error_lower.contains("timed out") || error_lower.contains("timeout") {
        return format!(
            "The model took too long to answer. Try a shorter question or a smaller model.\n\n\
            Error: {}",
            error
        );
    }

    // Server not running
    if error_lower.contains("could not reach") || error_lower.contains("connection refused") {
        return format!(
            "I couldn't reach the local inference server. Is it running?\n\n\
            Error: {}\n\n\
            Start it with `ollama serve`, or point OLLAMA_BASE_URL at the right address.",
            error
        );
    }

    // Model not registered with the server
    if error_lower.contains("404") || error_lower.contains("not found") {
        return format!(
            "The inference server doesn't know this model.\n\n\
            Error: {}\n\n\
            Import it into the server, or set `served_model` in settings.json.",
            error
        );
    }

    if error_lower.contains("out of memory") || has_word(&error_lower, "oom") {
        return format!(
            "The model ran out of memory. Try a smaller model or clear the history with /clear.\n\n\
            Error: {}",
            error
        );
    }

    // Generic error
    format!(
        "Sorry, the model ran into an issue:\n\n{}\n\n\
        Your message was not added to the history; you can send it again.",
        error
    )
}

fn has_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_ascii_alphanumeric()).any(|w| w == word)
}
