use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

// Scene files are prefetched at runtime; make them available next to the
// build output as well.
fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=assets/scenes");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let scenes = manifest_dir.join("assets").join("scenes");
    if !scenes.exists() {
        return Ok(());
    }

    let out_dir = env::var("OUT_DIR")?;
    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    copy_items(&[scenes], out_dir, &copy_options)?;

    Ok(())
}
