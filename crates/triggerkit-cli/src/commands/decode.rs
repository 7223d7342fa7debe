//! Decode command implementation.

use triggerkit_document::Decoder;
use triggerkit_values::RawDocument;

use crate::{input, output};

pub fn run(input: Option<String>, name: String) -> Result<(), Box<dyn std::error::Error>> {
    let raw = input::read_json(input.as_deref())?;
    let document =
        RawDocument::from_json(&raw).map_err(|e| format!("Invalid document: {}", e))?;

    let snapshot = Decoder::detached().snapshot(&document, &name)?;
    let rendered = snapshot
        .to_json()
        .map_err(|e| format!("Failed to decode document: {}", e))?;
    println!("{}", output::format_json(&rendered));
    Ok(())
}
