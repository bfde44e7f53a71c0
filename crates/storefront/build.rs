//! Build script for the storefront crate.
//!
//! Hashes static assets so templates can append a `?v=` cache-busting query.
//! Exposes `CSS_HASH` and `ADMIN_JS_HASH` to `env!`.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Assets to hash: (path relative to the manifest dir, env var name).
const ASSETS: [(&str, &str); 2] = [
    ("static/css/main.css", "CSS_HASH"),
    ("static/js/admin.js", "ADMIN_JS_HASH"),
];

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");

    for (relative, var) in ASSETS {
        hash_asset(&Path::new(&manifest_dir).join(relative), var);
    }
}

/// Set `var` to the first 8 hex chars of the file's SHA-256.
fn hash_asset(path: &Path, var: &str) {
    println!("cargo:rerun-if-changed={}", path.display());

    let short_hash = match fs::read(path) {
        Ok(content) => {
            let hash = format!("{:x}", Sha256::digest(&content));
            hash[..8].to_string()
        }
        Err(e) => {
            println!("cargo:warning=Could not read {}: {e}", path.display());
            String::new()
        }
    };

    println!("cargo:rustc-env={var}={short_hash}");
}
