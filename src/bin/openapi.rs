use anyhow::{Context, Result};

// Print the OpenAPI document for the API so it can be published without
// running the server.
fn main() -> Result<()> {
    let spec = clipstream::api::openapi()
        .to_pretty_json()
        .context("Failed to serialize OpenAPI document")?;

    println!("{spec}");

    Ok(())
}
