//! Writes the built-in demo seed dataset to a JSON file so the service (and
//! any ad-hoc tooling) can start from a known fixture.
//!
//! Usage: cargo run --bin seed_demo -- [path]   (default: data/seed.json)

use sbri_risk_service::store::memory::demo_seed;

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/seed.json".to_string());

    if let Some(parent) = std::path::Path::new(&path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let doc = demo_seed();
    std::fs::write(&path, serde_json::to_string_pretty(&doc)?)?;
    println!("Demo seed written to {path}");
    Ok(())
}
