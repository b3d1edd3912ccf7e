//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI document of the flashcards API to disk so front-end
//! clients can be generated from it. Usage: `openapi [output-path]`.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    let doc = ApiDoc::openapi();
    let operations: usize = doc
        .paths
        .paths
        .values()
        .map(|item| {
            [&item.get, &item.post, &item.delete]
                .iter()
                .filter(|op| op.is_some())
                .count()
        })
        .sum();

    std::fs::write(&path, doc.to_pretty_json()?)?;
    println!("Wrote {} operations to {}", operations, path);
    Ok(())
}
