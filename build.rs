//! Compiles the C test engines under `tests/containers` into shared
//! libraries for the integration tests.

use std::{env, error::Error, path::PathBuf};

/// Fixture engines, by file stem.
const FIXTURES: &[&str] = &["sample", "broken", "crash"];

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=include/yunit.h");
    if env::var_os("CARGO_CFG_UNIX").is_none() {
        return Ok(());
    }

    let out = PathBuf::from(env::var_os("OUT_DIR").ok_or("OUT_DIR not set")?);
    for name in FIXTURES {
        let src = format!("tests/containers/{}.t.c", name);
        println!("cargo:rerun-if-changed={}", src);

        let lib = out.join(format!("lib{}.t.so", name));
        let compiler = cc::Build::new()
            .include("include")
            .pic(true)
            .warnings(false)
            .get_compiler();
        let status = compiler
            .to_command()
            .arg("-shared")
            .arg("-o")
            .arg(&lib)
            .arg(&src)
            .status()?;
        if !status.success() {
            return Err(format!("couldn't compile {}", src).into());
        }
        println!(
            "cargo:rustc-env=YUNIT_{}_ENGINE={}",
            name.to_uppercase(),
            lib.display()
        );
    }
    Ok(())
}
