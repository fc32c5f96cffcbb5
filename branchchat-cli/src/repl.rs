//! Line-oriented interactive session

use anyhow::Result;
use branchchat_core::graph::{BranchOptions, ConversationGraph};
use branchchat_core::llm::Message;
use clap::{Parser, Subcommand};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ReplLine {
    #[command(subcommand)]
    command: ReplCommand,
}

#[derive(Subcommand, Debug)]
enum ReplCommand {
    /// Send a message to a node
    Chat {
        node: String,
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        message: Vec<String>,
    },
    /// Create a child branch
    Branch {
        parent: String,
        /// Explicit id for the new branch
        #[arg(long)]
        id: Option<String>,
        /// Do not copy the parent's messages
        #[arg(long)]
        no_carry: bool,
        /// Preset turn as ROLE:TEXT (role is user or assistant); repeatable
        #[arg(long, value_parser = parse_preset)]
        preset: Vec<Message>,
        /// First user turn, answered immediately
        #[arg(long)]
        seed: Option<String>,
    },
    /// Merge SOURCE's transcript into TARGET
    Merge { target: String, source: String },
    /// Create a summary sibling of a branch
    Summarize {
        source: String,
        #[arg(long)]
        id: Option<String>,
    },
    /// Show one node's messages
    Show {
        node: String,
        /// Include ancestors' messages
        #[arg(long)]
        context: bool,
        #[arg(long)]
        json: bool,
    },
    /// Print the conversation tree
    Tree,
    /// List all nodes
    List {
        #[arg(long)]
        json: bool,
    },
    /// End the session
    #[command(alias = "exit")]
    Quit,
}

fn parse_preset(value: &str) -> std::result::Result<Message, String> {
    let (role, content) = value
        .split_once(':')
        .ok_or_else(|| "expected ROLE:TEXT".to_string())?;
    match role.trim() {
        "user" => Ok(Message::user(content.trim())),
        "assistant" => Ok(Message::assistant(content.trim())),
        other => Err(format!("unknown role '{}', expected user or assistant", other)),
    }
}

enum Flow {
    Continue,
    Quit,
}

async fn execute(graph: &ConversationGraph, command: ReplCommand) -> Result<Flow> {
    match command {
        ReplCommand::Chat { node, message } => {
            let reply = graph.chat(&node, &message.join(" ")).await?;
            println!("{}", reply.reply);
        }
        ReplCommand::Branch {
            parent,
            id,
            no_carry,
            preset,
            seed,
        } => {
            let options = BranchOptions {
                new_id: id,
                carry_messages: !no_carry,
                preset_messages: preset,
                seed_message: seed,
            };
            let outcome = graph.branch(&parent, options).await?;
            println!(
                "Created {} under {} ({} messages)",
                outcome.id,
                parent,
                outcome.messages.len()
            );
            if let Some(last) = outcome.messages.last() {
                println!("{}: {}", last.role, last.content);
            }
        }
        ReplCommand::Merge { target, source } => {
            let outcome = graph.merge(&target, &source).await?;
            println!(
                "Merged {} into {} ({}, {} messages)",
                source,
                target,
                outcome.mode,
                outcome.messages.len()
            );
        }
        ReplCommand::Summarize { source, id } => {
            let outcome = graph.summarize_branch(&source, id.as_deref()).await?;
            println!("Created {}", outcome.id);
            for message in &outcome.messages {
                println!("{}", message.content);
            }
        }
        ReplCommand::Show {
            node,
            context,
            json,
        } => {
            let view = graph.get_node(&node).await?;
            let messages = if context {
                graph.context(&node).await?
            } else {
                view.messages.clone()
            };
            if json {
                let value = serde_json::json!({
                    "id": view.id,
                    "parent_id": view.parent_id,
                    "created_at": view.created_at,
                    "messages": messages,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!(
                    "{} (parent: {})",
                    view.id,
                    view.parent_id.as_deref().unwrap_or("-")
                );
                for message in &messages {
                    println!("  {}: {}", message.role, message.content);
                }
            }
        }
        ReplCommand::Tree => println!("{}", graph.render_tree().await),
        ReplCommand::List { json } => {
            let nodes = graph.list_nodes().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&nodes)?);
            } else {
                for node in &nodes {
                    println!(
                        "{}  parent={}  children=[{}]  messages={}",
                        node.id,
                        node.parent_id.as_deref().unwrap_or("-"),
                        node.children.join(", "),
                        node.message_count
                    );
                }
            }
        }
        ReplCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

pub async fn run(graph: &ConversationGraph) -> Result<()> {
    println!(
        "branchchat session on {} (type 'help' for commands)",
        graph.responder_name().await
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let words = match shell_words::split(&line) {
            Ok(words) if words.is_empty() => continue,
            Ok(words) => words,
            Err(e) => {
                eprintln!("error: {}", e);
                continue;
            }
        };

        let command = match ReplLine::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                // Help output is reported through the error path as well
                let _ = e.print();
                continue;
            }
        };

        match execute(graph, command).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => eprintln!("error: {}", e),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_line(line: &str) -> ReplCommand {
        let words = shell_words::split(line).unwrap();
        ReplLine::try_parse_from(words).unwrap().command
    }

    #[test]
    fn test_quoted_arguments_stay_whole() {
        match parse_line(r#"branch ROOT --preset "user:hello there" --id 'my id'"#) {
            ReplCommand::Branch { id, preset, .. } => {
                assert_eq!(id.as_deref(), Some("my id"));
                assert_eq!(preset, vec![Message::user("hello there")]);
            }
            other => panic!("unexpected {:?}", other),
        }

        match parse_line(r#"chat A "say \"hi\"" now"#) {
            ReplCommand::Chat { message, .. } => assert_eq!(message.join(" "), r#"say "hi" now"#),
            other => panic!("unexpected {:?}", other),
        }

        assert!(shell_words::split("chat \"open").is_err());
        assert!(shell_words::split("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_preset() {
        assert_eq!(parse_preset("user: hi").unwrap(), Message::user("hi"));
        assert_eq!(
            parse_preset("assistant:ok").unwrap(),
            Message::assistant("ok")
        );
        assert!(parse_preset("system:no").is_err());
        assert!(parse_preset("missing separator").is_err());
    }

    #[test]
    fn test_repl_line_parsing() {
        let line = ReplLine::try_parse_from(["chat", "ROOT", "hello", "world"]).unwrap();
        match line.command {
            ReplCommand::Chat { node, message } => {
                assert_eq!(node, "ROOT");
                assert_eq!(message.join(" "), "hello world");
            }
            other => panic!("unexpected {:?}", other),
        }

        let line = ReplLine::try_parse_from([
            "branch",
            "ROOT",
            "--no-carry",
            "--preset",
            "user:a",
            "--preset",
            "assistant:b",
        ])
        .unwrap();
        match line.command {
            ReplCommand::Branch {
                no_carry, preset, ..
            } => {
                assert!(no_carry);
                assert_eq!(preset, vec![Message::user("a"), Message::assistant("b")]);
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(matches!(
            ReplLine::try_parse_from(["exit"]).unwrap().command,
            ReplCommand::Quit
        ));
        assert!(ReplLine::try_parse_from(["merge", "A"]).is_err());
    }

    #[tokio::test]
    async fn test_execute_against_stub() {
        use branchchat_core::responder::StubResponder;
        use std::sync::Arc;

        let graph = ConversationGraph::new(Arc::new(StubResponder::default()));
        let command = ReplLine::try_parse_from(["chat", "ROOT", "hi"]).unwrap().command;
        assert!(matches!(execute(&graph, command).await.unwrap(), Flow::Continue));
        assert_eq!(graph.get_node("ROOT").await.unwrap().messages.len(), 2);

        let command = ReplLine::try_parse_from(["merge", "ROOT", "ROOT"]).unwrap().command;
        assert!(execute(&graph, command).await.is_err());
    }
}
