//! Line-oriented driver for a workspace.
//!
//! Slash commands operate on the file tree, the open file and the terminal
//! log; any other input is sent to the agent as a chat message.

use anyhow::Result;
use colored::{ColoredString, Colorize};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::config::Config;
use crate::file_tree::NodeKind;
use crate::relay::client::{HttpRelay, RelayTransport};
use crate::relay::protocol::Role;
use crate::workspace::{Workspace, WorkspaceEvent};

const HELP: &str = "\
Commands:
  /tree                          show the file tree
  /open <path>                   open a file
  /show                          print the open file
  /close                         close the open file
  /edit                          replace the open file (end input with a lone '.')
  /new <parent> <name> [kind]    create a file or folder (kind: file|folder)
  /run                           run the open file (execution is disabled)
  /log                           print the terminal log
  /history                       print the chat transcript
  /help                          show this help
  /quit                          leave
Anything else is sent to the agent.";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Tree,
    Open(String),
    Show,
    Close,
    Edit,
    New {
        parent_path: String,
        name: String,
        kind: NodeKind,
    },
    Run,
    Log,
    History,
    Quit,
    Chat(String),
    Invalid(String),
    Empty,
}

/// Parse one input line.
#[must_use]
pub fn parse_command(line: &str) -> ReplCommand {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ReplCommand::Empty;
    }
    let Some(rest) = trimmed.strip_prefix('/') else {
        return ReplCommand::Chat(line.to_string());
    };
    let mut parts = rest.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();
    match (command, args.as_slice()) {
        ("help" | "h" | "?", _) => ReplCommand::Help,
        ("tree" | "ls", _) => ReplCommand::Tree,
        ("open", [path]) => ReplCommand::Open((*path).to_string()),
        ("open", _) => ReplCommand::Invalid("usage: /open <path>".to_string()),
        ("show" | "cat", _) => ReplCommand::Show,
        ("close", _) => ReplCommand::Close,
        ("edit", _) => ReplCommand::Edit,
        ("new", [parent, name]) => ReplCommand::New {
            parent_path: (*parent).to_string(),
            name: (*name).to_string(),
            kind: NodeKind::File,
        },
        ("new", [parent, name, kind]) => match kind.parse::<NodeKind>() {
            Ok(kind) => ReplCommand::New {
                parent_path: (*parent).to_string(),
                name: (*name).to_string(),
                kind,
            },
            Err(err) => ReplCommand::Invalid(err),
        },
        ("new", _) => ReplCommand::Invalid("usage: /new <parent> <name> [file|folder]".to_string()),
        ("run", _) => ReplCommand::Run,
        ("log", _) => ReplCommand::Log,
        ("history", _) => ReplCommand::History,
        ("quit" | "exit" | "q", _) => ReplCommand::Quit,
        (other, _) => ReplCommand::Invalid(format!("unknown command '/{other}', try /help")),
    }
}

/// Run the interactive loop against the relay named in `config`.
pub async fn run_repl(config: &Config) -> Result<()> {
    let relay = HttpRelay::new(config.relay_url())?;
    let mut editor = DefaultEditor::new()?;
    let mut workspace = Workspace::starter();

    println!("{}", "VibeCode AI".bold());
    println!("Relay: {}", relay.url().dimmed());
    println!("{}", "Type /help for commands.".dimmed());
    print_lines(workspace.terminal().lines());
    if let Some(greeting) = workspace.chat().messages().first() {
        println!("{} {}", "agent>".cyan().bold(), greeting.content);
    }

    loop {
        let line = match editor.readline("you> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        if !line.trim().is_empty() {
            let _ = editor.add_history_entry(line.as_str());
        }

        match parse_command(&line) {
            ReplCommand::Empty => {}
            ReplCommand::Quit => break,
            ReplCommand::Edit => {
                let Some(path) = workspace.active_file().map(|file| file.path.clone()) else {
                    print_error("no file is open; use /open <path>");
                    continue;
                };
                let Some(content) = read_block(&mut editor)? else {
                    break;
                };
                workspace = workspace.apply(WorkspaceEvent::EditFile { path, content });
                println!("{}", "saved".green());
            }
            ReplCommand::Chat(text) => {
                workspace = chat_turn(workspace, &text, &relay).await;
            }
            command => workspace = run_local(workspace, command),
        }
    }
    Ok(())
}

async fn chat_turn(mut workspace: Workspace, text: &str, relay: &dyn RelayTransport) -> Workspace {
    let mark = workspace.terminal().len();
    println!("{}", "Agent is thinking...".dimmed());
    match workspace.submit_chat(text, relay).await {
        Ok(report) => {
            println!("{} {}", "agent>".cyan().bold(), report.reply);
            print_lines(workspace.terminal().since(mark));
            if !report.actions.is_empty() {
                println!(
                    "{}",
                    format!(
                        "{} action(s) applied, {} skipped",
                        report.actions.applied.len(),
                        report.actions.skipped.len()
                    )
                    .dimmed()
                );
            }
        }
        Err(err) if err.is_rejection() => {}
        Err(err) => {
            let message = match &err {
                crate::chat::ChatError::Relay(relay_err) => relay_err.notification(),
                other => other.to_string(),
            };
            print_error(&message);
        }
    }
    workspace
}

fn run_local(workspace: Workspace, command: ReplCommand) -> Workspace {
    match command {
        ReplCommand::Help => {
            println!("{HELP}");
            workspace
        }
        ReplCommand::Tree => {
            for line in tree_listing(&workspace) {
                println!("{line}");
            }
            workspace
        }
        ReplCommand::Open(path) => {
            let workspace = workspace.apply(WorkspaceEvent::SelectFile { path: path.clone() });
            match workspace.active_file() {
                Some(file) if file.path == path => println!("opened {}", file.path.yellow()),
                _ => print_error(&format!("{path} is not a file")),
            }
            workspace
        }
        ReplCommand::Show => {
            match workspace.active_file() {
                Some(file) => {
                    println!("{}", file.path.yellow().bold());
                    println!("{}", file.content);
                }
                None => print_error("no file is open"),
            }
            workspace
        }
        ReplCommand::New {
            parent_path,
            name,
            kind,
        } => match workspace.check_new_node(&parent_path, &name, kind) {
            Ok(()) => {
                let workspace = workspace.apply(WorkspaceEvent::CreateNode {
                    parent_path: parent_path.clone(),
                    name: name.trim().to_string(),
                    kind,
                });
                println!("created {} {parent_path}/{}", kind.as_str(), name.trim());
                workspace
            }
            Err(err) => {
                print_error(&err.to_string());
                workspace
            }
        },
        ReplCommand::Run => {
            if workspace.active_file().is_none() {
                print_error("no file is open");
                return workspace;
            }
            let mark = workspace.terminal().len();
            let workspace = workspace.apply(WorkspaceEvent::RunActiveFile);
            print_lines(workspace.terminal().since(mark));
            workspace
        }
        ReplCommand::Close => match workspace.active_file().map(|file| file.path.clone()) {
            Some(path) => {
                println!("closed {path}");
                workspace.apply(WorkspaceEvent::CloseFile)
            }
            None => {
                print_error("no file is open");
                workspace
            }
        },
        ReplCommand::Log => {
            if workspace.terminal().is_empty() {
                println!("{}", "(terminal is empty)".dimmed());
            }
            print_lines(workspace.terminal().lines());
            workspace
        }
        ReplCommand::History => {
            for message in workspace.chat().messages() {
                let who = match message.role {
                    Role::User => "you>".green().bold(),
                    Role::Assistant => "agent>".cyan().bold(),
                };
                println!("{who} {}", message.content);
            }
            workspace
        }
        ReplCommand::Invalid(message) => {
            print_error(&message);
            workspace
        }
        ReplCommand::Empty
        | ReplCommand::Quit
        | ReplCommand::Edit
        | ReplCommand::Chat(_) => workspace,
    }
}

/// Outline of the tree with folders and the open file highlighted.
fn tree_listing(workspace: &Workspace) -> Vec<ColoredString> {
    let active = workspace.active_file().map(|file| file.path.as_str());
    let outline = workspace.tree().outline();
    outline
        .lines()
        .zip(workspace.tree().walk())
        .map(|(line, node)| {
            if node.is_folder() {
                line.blue().bold()
            } else if Some(node.path.as_str()) == active {
                line.yellow().bold()
            } else {
                line.normal()
            }
        })
        .collect()
}

/// Read lines until a lone `.`; `None` on end of input.
fn read_block(editor: &mut DefaultEditor) -> Result<Option<String>> {
    let mut lines = Vec::new();
    loop {
        match editor.readline("... ") {
            Ok(line) if line == "." => return Ok(Some(lines.join("\n"))),
            Ok(line) => lines.push(line),
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(None),
            Err(err) => return Err(err.into()),
        }
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line.dimmed());
    }
}

fn print_error(message: &str) {
    eprintln!("{} {message}", "error:".red().bold());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_chat() {
        assert_eq!(
            parse_command("build a landing page"),
            ReplCommand::Chat("build a landing page".to_string())
        );
        assert_eq!(parse_command("   "), ReplCommand::Empty);
    }

    #[test]
    fn parses_slash_commands() {
        assert_eq!(parse_command("/tree"), ReplCommand::Tree);
        assert_eq!(
            parse_command("/open /src/index.js"),
            ReplCommand::Open("/src/index.js".to_string())
        );
        assert_eq!(
            parse_command("/new /src lib folder"),
            ReplCommand::New {
                parent_path: "/src".to_string(),
                name: "lib".to_string(),
                kind: NodeKind::Folder,
            }
        );
        assert_eq!(
            parse_command("/new /src util.js"),
            ReplCommand::New {
                parent_path: "/src".to_string(),
                name: "util.js".to_string(),
                kind: NodeKind::File,
            }
        );
        assert_eq!(parse_command("/close"), ReplCommand::Close);
        assert_eq!(parse_command("/exit"), ReplCommand::Quit);
    }

    #[test]
    fn bad_commands_are_invalid() {
        assert!(matches!(parse_command("/open"), ReplCommand::Invalid(_)));
        assert!(matches!(parse_command("/new /src"), ReplCommand::Invalid(_)));
        assert!(matches!(parse_command("/new /src a link"), ReplCommand::Invalid(_)));
        assert!(matches!(parse_command("/deploy"), ReplCommand::Invalid(_)));
    }

    #[test]
    fn local_commands_drive_the_workspace() {
        let workspace = run_local(Workspace::starter(), parse_command("/new /src util.js"));
        assert!(workspace.tree().contains("/src/util.js"));

        let workspace = run_local(workspace, parse_command("/open /src/util.js"));
        assert_eq!(
            workspace.active_file().map(|file| file.path.as_str()),
            Some("/src/util.js")
        );

        let before = workspace.terminal().len();
        let workspace = run_local(workspace, parse_command("/run"));
        assert_eq!(workspace.terminal().len(), before + 3);

        let duplicate = run_local(workspace.clone(), parse_command("/new /src util.js"));
        assert_eq!(duplicate.tree(), workspace.tree());
    }

    #[test]
    fn tree_listing_uses_outline_and_marks_open_file() {
        let workspace = Workspace::starter().apply(WorkspaceEvent::SelectFile {
            path: "/README.md".to_string(),
        });
        let listing = tree_listing(&workspace);
        let text: Vec<&str> = listing.iter().map(|line| &**line).collect();
        assert_eq!(text, vec!["src/", "  index.js", "README.md"]);
        assert_eq!(listing[2].fgcolor, Some(colored::Color::Yellow));
        assert_eq!(listing[1].fgcolor, None);
    }

    #[test]
    fn close_command_clears_open_file() {
        let workspace = run_local(Workspace::starter(), parse_command("/open /README.md"));
        assert!(workspace.active_file().is_some());
        let workspace = run_local(workspace, parse_command("/close"));
        assert!(workspace.active_file().is_none());
    }
}
