use anyhow::Context;
use apigen::{Generator, GeneratorConfig};
use std::path::{Path, PathBuf};

fn main() -> anyhow::Result<()> {
    let input = Path::new("src/api.rs");
    println!("cargo:rerun-if-changed={}", input.display());

    let out_dir = PathBuf::from(std::env::var("OUT_DIR").context("OUT_DIR is not set")?);
    let output = out_dir.join("api_handlers.rs");
    Generator::new(GeneratorConfig::default()).generate_file(input, &output)?;
    Ok(())
}
