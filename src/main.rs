// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context};
use std::env;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use lessonflow::backends::ScriptedGenerator;
use lessonflow::boundary::{InvocationBoundary, InvocationSeed};
use lessonflow::checkpoint::InMemoryCheckpointStore;
use lessonflow::config::{load_and_validate_config, EngineConfig, TaskRegistry};
use lessonflow::tasks::{self, TutorState};

/// Canned generator replies for each demo task.
///
/// The flashcard script opens with a reply the parser cannot use, so the demo shows the
/// retry path.
fn scripted_replies(task_type: &str) -> Vec<&'static str> {
    match task_type {
        tasks::CHAT => vec![
            "Photosynthesis is how plants turn light, water and carbon dioxide into sugar and oxygen.",
        ],
        tasks::FLASHCARDS => vec![
            "Sorry, here are some ideas: light, chlorophyll, glucose",
            "```json\n[\n  {\"front\": \"Where does photosynthesis happen?\", \"back\": \"In the chloroplasts\"},\n  {\"front\": \"Which gas is released?\", \"back\": \"Oxygen\"},\n]\n```",
        ],
        tasks::QUIZ => vec![
            "Here is your quiz:\n{\"questions\": [{\"question\": \"What pigment absorbs light?\", \"options\": [\"Chlorophyll\", \"Keratin\"], \"answer\": 0}]}",
        ],
        _ => Vec::new(),
    }
}

fn load(config_path: Option<&str>) -> anyhow::Result<EngineConfig> {
    match config_path {
        Some(path) => load_and_validate_config(path)
            .with_context(|| format!("failed to load config '{}'", path)),
        None => Ok(EngineConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let (config_path, task_type, input_text) = match args.as_slice() {
        [_, task_type, input] => (None, task_type.as_str(), input.as_str()),
        [_, config, task_type, input] => (Some(config.as_str()), task_type.as_str(), input.as_str()),
        _ => {
            let program = args.first().map(String::as_str).unwrap_or("lessonflow");
            eprintln!("Usage: {} [config.yaml|config.toml] <task_type> <input_text>", program);
            eprintln!("Example: {} configs/tutor.yaml flashcards \"photosynthesis\"", program);
            bail!("expected a task type and input text");
        }
    };

    let config = load(config_path)?;
    let generator = Arc::new(ScriptedGenerator::new(scripted_replies(task_type)));
    let store = Arc::new(InMemoryCheckpointStore::<TutorState>::new());
    let registry = TaskRegistry::tutoring(generator, &config, store)
        .context("failed to build the task registry")?;

    println!("📚 lessonflow demo");
    println!("═══════════════════");
    println!("Tasks: {}", registry.task_types().join(", "));
    println!("Running '{}' on: \"{}\"", task_type, input_text);
    println!();

    let boundary = InvocationBoundary::new(Arc::new(registry), config.execution.clone());
    let envelope = boundary
        .invoke(task_type, InvocationSeed::new("demo-user", "demo-session", input_text))
        .await;

    println!("{}", serde_json::to_string_pretty(&envelope)?);

    if envelope.success {
        println!("\n✅ Completed in {}ms", envelope.elapsed_ms);
    } else {
        println!("\n❌ Failed: {}", envelope.errors.join("; "));
    }

    Ok(())
}
