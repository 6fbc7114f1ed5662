//! Fetching scene files and staging them into the engine's virtual
//! filesystem.

use anyhow::{Context, anyhow};
use futures::future::try_join_all;

use crate::{
    config::ViewerConfig,
    physics::{FileContents, VirtualFs},
};

/// Extensions of files that are staged as raw bytes.
const BINARY_EXTENSIONS: [&str; 3] = [".png", ".stl", ".skn"];

pub fn is_binary(file_name: &str) -> bool {
    BINARY_EXTENSIONS.iter().any(|ext| file_name.ends_with(ext))
}

#[cfg(target_arch = "wasm32")]
fn format_url(base: &str, file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().ok_or_else(|| anyhow!("no window"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow!("no page origin: {e:?}"))?;
    let base = reqwest::Url::parse(&format!("{}/{}/", origin, base.trim_matches('/')))?;
    Ok(base.join(file_name)?)
}

#[cfg(not(target_arch = "wasm32"))]
fn format_path(base: &str, file_name: &str) -> std::path::PathBuf {
    std::path::Path::new(base).join(file_name)
}

pub async fn load_string(base: &str, file_name: &str) -> anyhow::Result<String> {
    #[cfg(target_arch = "wasm32")]
    let txt = {
        let url = format_url(base, file_name)?;
        reqwest::get(url).await?.error_for_status()?.text().await?
    };
    #[cfg(not(target_arch = "wasm32"))]
    let txt = tokio::fs::read_to_string(format_path(base, file_name)).await?;

    Ok(txt)
}

pub async fn load_binary(base: &str, file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(base, file_name)?;
        reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = tokio::fs::read(format_path(base, file_name)).await?;

    Ok(data)
}

/// Fetch `file_name` as bytes or text depending on its extension.
pub async fn fetch_asset(base: &str, file_name: &str) -> anyhow::Result<FileContents> {
    let contents = if is_binary(file_name) {
        FileContents::Binary(load_binary(base, file_name).await?)
    } else {
        FileContents::Text(load_string(base, file_name).await?)
    };
    Ok(contents)
}

/// Write `file_name` below `working_dir`, creating every missing directory
/// on the way.
pub fn stage_file(
    fs: &mut dyn VirtualFs,
    working_dir: &str,
    file_name: &str,
    contents: FileContents,
) -> anyhow::Result<()> {
    let mut dir = working_dir.trim_end_matches('/').to_string();
    if !dir.is_empty() && !fs.exists(&dir) {
        fs.mkdir(&dir)?;
    }
    let mut parts: Vec<&str> = file_name.split('/').filter(|p| !p.is_empty()).collect();
    let Some(name) = parts.pop() else {
        return Err(anyhow!("empty file name"));
    };
    for part in parts {
        dir.push('/');
        dir.push_str(part);
        if !fs.exists(&dir) {
            fs.mkdir(&dir).with_context(|| format!("creating {dir}"))?;
        }
    }
    let path = format!("{dir}/{name}");
    fs.write_file(&path, contents)
        .with_context(|| format!("writing {path}"))
}

/// Fetch every configured asset concurrently and stage it into `fs`.
/// Returns the number of files written.
pub async fn download_scene_files(
    config: &ViewerConfig,
    fs: &mut dyn VirtualFs,
) -> anyhow::Result<usize> {
    let base = config.asset_base.as_str();
    let fetched = try_join_all(config.asset_files.iter().map(|file| async move {
        fetch_asset(base, file)
            .await
            .with_context(|| format!("fetching {file}"))
    }))
    .await?;

    for (file, contents) in config.asset_files.iter().zip(fetched) {
        stage_file(fs, &config.working_dir, file, contents)?;
    }
    log::info!(
        "Staged {} scene files into {}",
        config.asset_files.len(),
        config.working_dir
    );
    Ok(config.asset_files.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::MemoryFs;

    #[test]
    fn meshes_and_images_are_binary() {
        assert!(is_binary("myo_sim/meshes/ulna.stl"));
        assert!(is_binary("myo_sim/scene/floor0.png"));
        assert!(is_binary("skin.skn"));
        assert!(!is_binary("myo_sim/hand/myo_hand.xml"));
        assert!(!is_binary("myo_sim/scene/myosuite_logo.obj"));
    }

    #[test]
    fn staging_creates_nested_directories() {
        let mut fs = MemoryFs::new();
        stage_file(&mut fs, "/working/", "a/b/c.xml", FileContents::Text("<c/>".into())).unwrap();
        stage_file(&mut fs, "/working/", "a/b/d.stl", FileContents::Binary(vec![1, 2])).unwrap();
        assert!(fs.exists("/working/a"));
        assert!(fs.exists("/working/a/b"));
        assert_eq!(
            fs.read("/working/a/b/d.stl"),
            Some(&FileContents::Binary(vec![1, 2]))
        );
    }

    #[test]
    fn empty_names_are_rejected() {
        let mut fs = MemoryFs::new();
        assert!(stage_file(&mut fs, "/working/", "", FileContents::Text(String::new())).is_err());
    }
}
