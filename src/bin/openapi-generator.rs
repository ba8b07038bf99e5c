//! Print the OpenAPI document of birdify-back, for client generation.

use birdify_back::services::documentation::api_doc;

fn main() -> anyhow::Result<()> {
    println!("{}", api_doc().to_pretty_json()?);
    Ok(())
}
