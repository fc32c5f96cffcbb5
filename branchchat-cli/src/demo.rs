//! Scripted walkthrough of branching, merging and summarizing

use anyhow::Result;
use branchchat_core::graph::{BranchOptions, ConversationGraph};
use branchchat_core::llm::Message;

async fn print_tree(graph: &ConversationGraph, step: &str) {
    println!("\n=== {} ===", step);
    println!("{}", graph.render_tree().await);
}

async fn chat(graph: &ConversationGraph, node_id: &str, message: &str) -> Result<()> {
    let reply = graph.chat(node_id, message).await?;
    println!("\n[{}] user: {}", node_id, message);
    println!("[{}] assistant: {}", node_id, reply.reply);
    Ok(())
}

pub async fn run(graph: &ConversationGraph) -> Result<()> {
    let root = graph.root_id().await;

    chat(graph, &root, "Explain quantum computing simply.").await?;
    print_tree(graph, "Chat on root").await;

    let b1 = graph.branch(&root, BranchOptions::new()).await?;
    chat(graph, &b1.id, "Tell me about QAOA.").await?;
    print_tree(graph, &format!("{} created", b1.id)).await;

    let b2 = graph.branch(&root, BranchOptions::new()).await?;
    chat(graph, &b2.id, "Explain Grover's algorithm.").await?;
    chat(graph, &b2.id, "Explain Shor's algorithm.").await?;
    print_tree(graph, &format!("{} created", b2.id)).await;

    let b2a = graph
        .branch(&b2.id, BranchOptions::new().with_id(format!("{}A", b2.id)))
        .await?;
    chat(
        graph,
        &b2a.id,
        "Summarize Grover vs. amplitude amplification variants.",
    )
    .await?;
    print_tree(graph, &format!("{} created", b2a.id)).await;

    let b3 = graph
        .branch(
            &b1.id,
            BranchOptions::new()
                .carry_messages(false)
                .with_preset(Message::user(
                    "Start a clean fork: briefly compare QAOA vs VQE.",
                ))
                .with_preset(Message::assistant(
                    "Sure, I'll outline similarities and differences.",
                )),
        )
        .await?;
    chat(graph, &b3.id, "Include a note on current research directions.").await?;
    print_tree(graph, &format!("{} created without carried messages", b3.id)).await;

    let merged = graph.merge(&root, &b2.id).await?;
    println!(
        "\nMerged {} into {} ({}, {} messages)",
        b2.id,
        root,
        merged.mode,
        merged.messages.len()
    );
    chat(graph, &root, "Continue from here with a combined explanation.").await?;
    print_tree(graph, &format!("{} merged into {}", b2.id, root)).await;

    let summary = graph.summarize_branch(&b2a.id, None).await?;
    if let Some(text) = summary.messages.first() {
        println!("\n[{}] {}", summary.id, text.content);
    }
    print_tree(graph, &format!("{} summarized as {}", b2a.id, summary.id)).await;

    Ok(())
}
