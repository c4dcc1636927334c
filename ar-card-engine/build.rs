// build.rs
use std::{env, fs, path::PathBuf};

const CARD_DIR: &str = "assets/cards";
const CARD_SUFFIX: &str = ".card.json";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed={CARD_DIR}");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let card_dir = manifest_dir.join(CARD_DIR);

    let mut scenes: Vec<String> = fs::read_dir(&card_dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter_map(|entry| {
                    let name = entry.file_name().into_string().ok()?;
                    name.strip_suffix(CARD_SUFFIX).map(str::to_string)
                })
                .collect()
        })
        .unwrap_or_default();
    scenes.sort();

    if scenes.is_empty() {
        println!("cargo:warning=No card manifests found in {CARD_DIR}");
    }

    let listing = serde_json::json!({ "scenes": scenes });
    let json_content = serde_json::to_string_pretty(&listing).unwrap();

    // Read back through include_str! in engine::assets::bundled_scenes.
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("bundled_scenes.json"), json_content)
        .expect("Failed to write bundled_scenes.json to OUT_DIR");
}
