//! Delta command implementation.

use serde_json::{json, Value};
use triggerkit_tree::DeltaSnapshot;

use crate::{input, output};

pub fn run(
    input: Option<String>,
    child: String,
    previous: bool,
    field_mask: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = input::read_json(input.as_deref())?;
    let data = raw.get("data").cloned().unwrap_or(Value::Null);
    let delta = raw.get("delta").cloned();
    let path = raw.get("path").and_then(Value::as_str).unwrap_or("/");

    tracing::debug!(path, child = %child, previous, "evaluating delta snapshot");
    let root = DeltaSnapshot::with_field_mask(data, delta, path, field_mask.as_deref());
    let side = if previous { root.previous() } else { &root };
    let node = side.child(&child);

    let report = json!({
        "path": node.path(),
        "key": node.key(),
        "exists": node.exists(),
        "changed": node.changed(),
        "numChildren": node.num_children(),
        "val": node.val(),
    });
    println!("{}", output::format_json(&report));
    Ok(())
}
