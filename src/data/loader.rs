use bevy::asset::{io::Reader, AssetLoader, LoadContext};
use std::future::Future;
use thiserror::Error;

use super::schema::ItemList;

/// 读取规范化后的 JSON 物品表
#[derive(Default)]
pub struct JsonItemLoader;

#[derive(Debug, Error)]
pub enum ItemLoaderError {
    #[error("Could not load asset: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Could not interpret bytes as UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

impl AssetLoader for JsonItemLoader {
    type Asset = ItemList;
    type Settings = ();
    type Error = ItemLoaderError;

    fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext,
    ) -> impl Future<Output = Result<Self::Asset, Self::Error>> + Send {
        async move {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes).await?;

            let s = std::str::from_utf8(&bytes)?;
            let list: ItemList = serde_json::from_str(s)?;

            Ok(list)
        }
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }
}
