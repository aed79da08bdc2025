use std::env;

fn main() {
    // Surfaced by `promptframe version`
    println!(
        "cargo:rustc-env=PROMPTFRAME_RUSTC_VERSION={}",
        env::var("RUSTC_VERSION").unwrap_or_else(|_| "unknown".to_string())
    );
    println!("cargo:rerun-if-env-changed=RUSTC_VERSION");
}
