//! Line-oriented conversation loop.
//!
//! Each line is either a question for the assistant or a slash command.

use std::io::{self, IsTerminal, Write};

use anyhow::{Context, Result};
use tokio::io::{BufReader, Lines, Stdin};

use lectern_core::{Config, Conversation, Role, Status};

/// One parsed input line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Command<'a> {
    /// A question for the assistant.
    Ask(&'a str),
    /// List providers.
    Providers,
    /// Switch provider.
    Provider(&'a str),
    /// List models of the current provider.
    Models,
    /// Switch model.
    Model(&'a str),
    /// Start the conversation over.
    Clear,
    /// Leave.
    Quit,
    /// Unrecognised slash command or missing argument.
    Invalid(&'a str),
}

impl<'a> Command<'a> {
    /// Parse one input line. Lines not starting with `/` are questions.
    pub(crate) fn parse(line: &'a str) -> Self {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Command::Ask(line);
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match (name, arg) {
            ("providers", "") => Command::Providers,
            ("provider", arg) if !arg.is_empty() => Command::Provider(arg),
            ("models", "") => Command::Models,
            ("model", arg) if !arg.is_empty() => Command::Model(arg),
            ("clear", "") => Command::Clear,
            ("quit", "") => Command::Quit,
            _ => Command::Invalid(line),
        }
    }
}

/// Run the loop until `/quit` or end of input.
pub(crate) async fn run(
    config: &Config,
    mut conversation: Conversation,
    mut lines: Lines<BufReader<Stdin>>,
) -> Result<()> {
    let interactive = io::stdin().is_terminal();
    if interactive {
        println!("Selected: \"{}\"", conversation.selection_preview());
        println!(
            "Provider: {} / {}. Type /quit to leave.",
            conversation.provider(),
            conversation.model()
        );
    }

    loop {
        if interactive {
            print!("> ");
            io::stdout().flush().context("Failed to flush stdout")?;
        }

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        match Command::parse(&line) {
            Command::Ask("") => {}
            Command::Ask(question) => ask(&mut conversation, question).await,
            Command::Providers => {
                for option in conversation.provider_options() {
                    let marker = if option.name == conversation.provider() {
                        "*"
                    } else {
                        " "
                    };
                    println!("{marker} {:<12} {}", option.name, option.label);
                }
            }
            Command::Provider(name) => {
                conversation.set_credential(config.credential_for(name));
                conversation.change_provider(name);
                println!("Provider: {} / {}", conversation.provider(), conversation.model());
            }
            Command::Models => {
                let options = conversation.model_options();
                if options.is_empty() {
                    println!("No models for provider '{}'.", conversation.provider());
                }
                for model in options {
                    let marker = if model.id == conversation.model() {
                        "*"
                    } else {
                        " "
                    };
                    println!("{marker} {:<28} {}", model.id, model.label);
                }
            }
            Command::Model(id) => {
                conversation.change_model(id);
                println!("Model: {}", conversation.model());
            }
            Command::Clear => {
                conversation.clear();
                println!("Conversation cleared.");
            }
            Command::Quit => break,
            Command::Invalid(input) => {
                eprintln!("Unknown command: {input}");
                eprintln!("Commands: /providers, /provider <name>, /models, /model <id>, /clear, /quit");
            }
        }
    }

    Ok(())
}

async fn ask(conversation: &mut Conversation, question: &str) {
    if let Status::Error(e) = conversation.send(question).await {
        eprintln!("[Error] {e}");
        return;
    }

    if let Some(turn) = conversation.turns().last()
        && turn.role == Role::Assistant
    {
        println!("{}", turn.content);
    }
}
