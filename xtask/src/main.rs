use anyhow::{Context, Result, bail};
use mrx::config::{ENV_PREFIX, ExporterConfig};
use schemars::schema_for;
use serde_json::Value;
use std::fs;

fn main() -> Result<()> {
    let args: Vec<_> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("gendocs") => generate_docs()?,
        _ => {
            println!("Usage: cargo xtask <command>");
            println!("\nCommands:");
            println!("  gendocs    Write docs/schema.json and docs/configuration.md");
        }
    }

    Ok(())
}

fn generate_docs() -> Result<()> {
    let schema = serde_json::to_value(schema_for!(ExporterConfig))?;

    fs::create_dir_all("docs")?;
    fs::write("docs/schema.json", serde_json::to_string_pretty(&schema)?)?;
    println!("Generated docs/schema.json");

    let mut rows = Vec::new();
    collect_rows(&schema, &schema, &[], &mut rows)?;

    let mut md = String::from("# Configuration reference\n\n");
    md.push_str("Every key may be set in the config file or through the environment.\n\n");
    md.push_str("| key | environment | description |\n|---|---|---|\n");
    for (key, env, description) in rows {
        md.push_str(&format!("| `{key}` | `{env}` | {description} |\n"));
    }

    fs::write("docs/configuration.md", md)?;
    println!("Generated docs/configuration.md");

    Ok(())
}

/// Walks object properties depth first, following `$ref`s
/// into the root definitions, and records one row per leaf
fn collect_rows(
    root: &Value,
    node: &Value,
    path: &[String],
    rows: &mut Vec<(String, String, String)>,
) -> Result<()> {
    let node = resolve(root, node)?;

    let Some(properties) = node.get("properties").and_then(Value::as_object) else {
        let key = path.join(".");
        let env = format!("{}_{}", ENV_PREFIX, path.join("__").to_uppercase());
        let description = node
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("")
            .replace('\n', " ");
        rows.push((key, env, description));
        return Ok(());
    };

    for (name, child) in properties {
        let mut child_path = path.to_vec();
        child_path.push(name.clone());
        collect_rows(root, child, &child_path, rows)?;
    }

    Ok(())
}

fn resolve<'a>(root: &'a Value, node: &'a Value) -> Result<&'a Value> {
    // schemars wraps documented refs as {"allOf": [{"$ref": ...}]}
    let target = node
        .get("allOf")
        .and_then(|all| all.get(0))
        .unwrap_or(node);

    let Some(reference) = target.get("$ref").and_then(Value::as_str) else {
        return Ok(node);
    };

    let Some(name) = reference.strip_prefix("#/definitions/") else {
        bail!("Unsupported schema reference {reference}");
    };

    root.pointer(&format!("/definitions/{name}"))
        .with_context(|| format!("Missing schema definition {name}"))
}
