//! services/api/src/bin/openapi.rs
//!
//! Dumps the OpenAPI specification as JSON to stdout, for generating
//! clients without running the server.

use api_lib::web::ApiDoc;
use utoipa::OpenApi;

fn main() {
    match ApiDoc::openapi().to_pretty_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("failed to serialize OpenAPI spec: {}", e);
            std::process::exit(1);
        }
    }
}
