use std::path::Path;

use anyhow::Context;
use bevy::prelude::*;
use serde::Deserialize;

pub const CONFIG_PATH: &str = "assets/config/planner.toml";

/// 规划器配置（assets/config/planner.toml）
#[derive(Resource, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PlannerConfig {
    /// 相对 assets/ 的物品表路径
    pub items_path: String,
    /// 本地持久化文件
    pub save_path: String,
    pub drag: DragConfig,
    pub layout: LayoutConfig,
    pub autoscroll: AutoScrollConfig,
    pub materials: MaterialsConfig,
    pub loadout: LoadoutConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DragConfig {
    /// 鼠标拖拽时，候选槽位中心的最大距离
    pub pointer_threshold: f32,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    pub cell_size: f32,
    pub gap: f32,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AutoScrollConfig {
    pub edge_margin: f32,
    pub step: f32,
    pub interval_secs: f32,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MaterialsConfig {
    pub recycle_limit: usize,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct LoadoutConfig {
    pub overflow_policy: OverflowPolicy,
}

/// 背包类容器缩容时，放不下的物品如何处理
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    #[default]
    ReturnToInventory,
    Discard,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            items_path: "data/items.json".into(),
            save_path: "saves/loadout.json".into(),
            drag: DragConfig::default(),
            layout: LayoutConfig::default(),
            autoscroll: AutoScrollConfig::default(),
            materials: MaterialsConfig::default(),
            loadout: LoadoutConfig::default(),
        }
    }
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            pointer_threshold: 80.0,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cell_size: 64.0,
            gap: 8.0,
        }
    }
}

impl Default for AutoScrollConfig {
    fn default() -> Self {
        Self {
            edge_margin: 40.0,
            step: 12.0,
            interval_secs: 0.05,
        }
    }
}

impl Default for MaterialsConfig {
    fn default() -> Self {
        Self { recycle_limit: 10 }
    }
}

impl PlannerConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("配置文件格式错误")
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置 {}", path.display()))?;
        Self::from_toml(&text)
    }

    /// 读取失败时退回默认配置（文件缺失不算错误）
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("未找到配置 {}，使用默认值", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!("配置加载失败，使用默认值: {err:#}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = PlannerConfig::from_toml(
            r#"
            save_path = "tmp/x.json"

            [drag]
            pointer_threshold = 120.0

            [loadout]
            overflow_policy = "discard"
            "#,
        )
        .unwrap();

        assert_eq!(config.save_path, "tmp/x.json");
        assert_eq!(config.drag.pointer_threshold, 120.0);
        assert_eq!(config.loadout.overflow_policy, OverflowPolicy::Discard);
        assert_eq!(config.materials.recycle_limit, 10);
        assert_eq!(config.items_path, "data/items.json");
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(PlannerConfig::from_toml("drag = 3").is_err());
    }
}
