use anyhow::{Context, Result};
use chat_session::ChatSession;
use providers::LocalModel;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use services::{available_models, check_server, model_path};
use shared::settings::ChatSettings;
use shared::ChatError;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod picker;
mod render;
mod thoughts;

use commands::Command;
use picker::PickResult;
use thoughts::ReasoningTracker;

/// Open a model directory and start a fresh conversation on it.
fn open_session(
    settings: &ChatSettings,
    name: &str,
    directive: Option<String>,
) -> Result<ChatSession, ChatError> {
    let path = model_path(&settings.models_dir, name);
    let model = LocalModel::open(&path, settings)?;
    Ok(ChatSession::with_directive(Arc::new(model), directive))
}

struct ChatApp {
    settings: ChatSettings,
    session: ChatSession,
    tracker: ReasoningTracker,
    runtime: tokio::runtime::Runtime,
}

impl ChatApp {
    fn model_name(&self) -> &str {
        self.session.backend_name()
    }

    fn send(&mut self, text: &str) {
        // One request at a time: the prompt is blocked until the reply lands.
        match self.runtime.block_on(self.session.chat(text)) {
            Ok(result) => {
                if let Some(id) = self
                    .tracker
                    .record(&result, self.session.supports_reasoning())
                {
                    if let Some(thought) = self.tracker.get(id) {
                        render::print_thought(id, thought);
                    }
                }
                render::print_answer(&result.answer);
            }
            Err(e) => render::print_error(&e),
        }
    }

    fn clear(&mut self) {
        self.session.reset();
        render::print_notice("History cleared.");
    }

    fn set_directive(&mut self, text: String) {
        self.session.update_directive(text);
        render::print_notice("System prompt updated. History cleared.");
    }

    /// An empty directive is never sent, so the model runs without one.
    fn clear_directive(&mut self) {
        self.session.update_directive(String::new());
        render::print_notice("System prompt removed. History cleared.");
    }

    fn show_directive(&self) {
        match self.session.directive() {
            Some(d) if !d.is_empty() => println!("System prompt:\n{}\n", d),
            _ => render::print_notice("No system prompt set."),
        }
    }

    fn toggle(&mut self, id: u64) {
        match self.tracker.toggle(id) {
            Some(_) => {
                if let Some(thought) = self.tracker.get(id) {
                    render::print_thought(id, thought);
                }
            }
            None => render::print_notice(&format!("No thinking segment #{}.", id)),
        }
    }

    /// Replace the session with one on another model. The system prompt
    /// carries over; the history does not.
    fn switch_model(&mut self, name: &str) {
        let directive = self.session.config().directive.clone();
        match open_session(&self.settings, name, directive) {
            Ok(session) => {
                self.session = session;
                self.settings.last_model = Some(name.to_string());
                config::save_settings(&self.settings);
                render::print_notice(&format!("Switched to {}. History cleared.", name));
            }
            Err(e) => render::print_error(&e),
        }
    }

    fn pick_model(&mut self, rl: &mut DefaultEditor) -> Result<()> {
        let models = available_models(&self.settings.models_dir);
        if models.is_empty() {
            render::print_no_models(&self.settings.models_dir);
            return Ok(());
        }
        let current = self.model_name().to_string();
        if let PickResult::Confirmed(name) = picker::pick_model(rl, &models, Some(&current))? {
            self.switch_model(&name);
        }
        Ok(())
    }

    fn run(&mut self, rl: &mut DefaultEditor) -> Result<()> {
        println!(
            "Chatting with {}. Type /help for commands.\n",
            self.model_name()
        );

        loop {
            let line = match rl.readline("You: ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => return Ok(()),
                Err(e) => return Err(e.into()),
            };
            if !line.trim().is_empty() {
                let _ = rl.add_history_entry(line.as_str());
            }

            match commands::parse(&line) {
                Command::Send(text) => self.send(&text),
                Command::Clear => self.clear(),
                Command::ShowSystem => self.show_directive(),
                Command::SetSystem(text) => self.set_directive(text),
                Command::ClearSystem => self.clear_directive(),
                Command::PickModel => self.pick_model(rl)?,
                Command::SwitchModel(name) => self.switch_model(&name),
                Command::ListModels => {
                    let models = available_models(&self.settings.models_dir);
                    if models.is_empty() {
                        render::print_no_models(&self.settings.models_dir);
                    } else {
                        picker::print_models(&models, Some(self.model_name()));
                    }
                }
                Command::Toggle(id) => self.toggle(id),
                Command::Help => println!("{}\n", commands::HELP),
                Command::Quit => return Ok(()),
                Command::Empty => {}
                Command::Invalid(msg) => render::print_notice(&msg),
            }
        }
    }
}

/// Pick models until one opens, or the user gives up.
fn select_initial_session(
    rl: &mut DefaultEditor,
    settings: &mut ChatSettings,
    models: &[String],
) -> Result<Option<ChatSession>> {
    loop {
        let name = match picker::pick_model(rl, models, settings.last_model.as_deref())? {
            PickResult::Confirmed(name) => name,
            PickResult::Cancelled => return Ok(None),
        };
        match open_session(settings, &name, Some(shared::DEFAULT_DIRECTIVE.to_string())) {
            Ok(session) => {
                settings.last_model = Some(name);
                config::save_settings(settings);
                return Ok(Some(session));
            }
            Err(e) => render::print_error(&e),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<ExitCode> {
    let mut settings = config::load_settings_or_default();

    let models = available_models(&settings.models_dir);
    if models.is_empty() {
        render::print_no_models(&settings.models_dir);
        return Ok(ExitCode::FAILURE);
    }

    let base = providers::ollama::base_url(&settings.server);
    let status = check_server(&base, Duration::from_millis(500));
    if !status.is_reachable() {
        tracing::warn!(server = %base, ?status, "inference server not reachable");
        println!(
            "Warning: no inference server answering at {}. Replies will fail until it is started.\n",
            base
        );
    }

    let mut rl = DefaultEditor::new().context("failed to open the terminal")?;
    let Some(session) = select_initial_session(&mut rl, &mut settings, &models)? else {
        return Ok(ExitCode::SUCCESS);
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let mut app = ChatApp {
        settings,
        session,
        tracker: ReasoningTracker::new(),
        runtime,
    };
    app.run(&mut rl)?;
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
