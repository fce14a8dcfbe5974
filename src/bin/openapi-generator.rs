//! Print the OpenAPI document to stdout, for committing alongside frontends.

use alfavit_back::services::documentation::ApiDoc;
use utoipa::OpenApi;

fn main() {
    let doc = ApiDoc::openapi();
    println!("{}", doc.to_pretty_json().unwrap());
}
