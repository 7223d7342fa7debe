//! Normalize command implementation.

use triggerkit_core::{normalize_event, Environment, TriggerDescriptor};
use triggerkit_providers::{database, document, DatabaseEvent, DocumentEvent};

use crate::{input, output, EventKind, Provider};

pub struct Options {
    pub input: Option<String>,
    pub provider: Provider,
    pub event: EventKind,
    pub path: String,
    pub project: Option<String>,
    pub database_url: Option<String>,
    pub metadata: bool,
}

pub fn run(options: Options) -> Result<(), Box<dyn std::error::Error>> {
    let mut env = Environment::from_env();
    if let Some(project) = options.project {
        env = env.with_project_id(project);
    }
    if let Some(url) = options.database_url {
        env = env.with_database_url(url);
    }

    let trigger = descriptor(options.provider, options.event, &env, &options.path);
    tracing::debug!(event_type = %trigger.event_type(), "built trigger descriptor");

    if options.metadata {
        let metadata = trigger
            .metadata()
            .map_err(|e| format!("Failed to resolve trigger: {}", e))?;
        println!("{}", output::format_json(&serde_json::to_value(metadata)?));
        return Ok(());
    }

    let raw = input::read_json(options.input.as_deref())?;
    let event =
        normalize_event(raw, &trigger).map_err(|e| format!("Failed to normalize: {}", e))?;
    println!("{}", output::format_json(&serde_json::to_value(event)?));
    Ok(())
}

fn descriptor(
    provider: Provider,
    event: EventKind,
    env: &Environment,
    path: &str,
) -> TriggerDescriptor {
    match provider {
        Provider::Document => {
            let event = match event {
                EventKind::Create => DocumentEvent::Create,
                EventKind::Update => DocumentEvent::Update,
                EventKind::Delete => DocumentEvent::Delete,
                EventKind::Write => DocumentEvent::Write,
            };
            document::trigger(event, env, path)
        }
        Provider::Database => {
            let event = match event {
                EventKind::Create => DatabaseEvent::Create,
                EventKind::Update => DatabaseEvent::Update,
                EventKind::Delete => DatabaseEvent::Delete,
                EventKind::Write => DatabaseEvent::Write,
            };
            database::trigger(event, env, None, path)
        }
    }
}
