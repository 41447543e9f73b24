use std::collections::BTreeMap;

use bevy::asset::Asset;
use bevy::reflect::TypePath;
use serde::Deserialize;

use super::catalog::Rarity;

/// 外部物品表中的一条原始记录（已由抓取端规范化为该形状）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemEntry {
    pub id: String,
    pub name: String,
    /// 分类标签，同一物品可以同时属于多个分类（如 Weapon + Gun）
    #[serde(default, alias = "type")]
    pub categories: Vec<String>,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub stack_size: Option<u32>,
    #[serde(default)]
    pub recipe: Option<BTreeMap<String, u32>>,
    #[serde(default)]
    pub craft_quantity: Option<u32>,
    /// 从上一级升到本级的花费（仅 II 级及以上有意义）
    #[serde(default)]
    pub upgrade_cost: Option<BTreeMap<String, u32>>,
    #[serde(default)]
    pub supported_modifications: Vec<String>,
    #[serde(default)]
    pub shield_compatibility: Vec<String>,
    #[serde(default)]
    pub slots: Option<SlotEntry>,
    #[serde(default)]
    pub recycles_into: Option<BTreeMap<String, u32>>,
    #[serde(default)]
    pub recyclable: Option<bool>,
}

/// 增幅器声明的容器容量
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotEntry {
    #[serde(default)]
    pub backpack: usize,
    #[serde(default)]
    pub quick_use: usize,
    #[serde(default)]
    pub safe_pocket: usize,
    /// 有序：声明顺序即额外槽位的下标顺序
    #[serde(default)]
    pub extra: Vec<ExtraSlotEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraSlotEntry {
    pub kind: String,
    #[serde(default = "one")]
    pub count: usize,
    /// 固定内置物品 id；存在时该类槽位不可拖放
    #[serde(default)]
    pub integrated: Option<String>,
}

fn one() -> usize {
    1
}

#[derive(Asset, TypePath, Deserialize, Debug)]
pub struct ItemList {
    pub items: Vec<ItemEntry>,
}
