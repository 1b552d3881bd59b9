//! Loading of external files: textures, the config file and their procedural stand-ins.
//!
//! Natively every path is resolved under `./assets`; on the web it is fetched relative to
//! `<origin>/assets/`.

pub mod fallback;
pub mod texture;

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("page origin unavailable"))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
    Ok(base.join(file_name)?)
}

pub async fn load_string(file_name: &str) -> anyhow::Result<String> {
    #[cfg(target_arch = "wasm32")]
    let txt = {
        let url = format_url(file_name)?;
        reqwest::get(url).await?.error_for_status()?.text().await?
    };
    #[cfg(not(target_arch = "wasm32"))]
    let txt = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        std::fs::read_to_string(path)?
    };

    Ok(txt)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        std::fs::read(path)?
    };

    Ok(data)
}
