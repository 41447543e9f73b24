//! 只读物品目录：由外部物品表一次性构建，会话期间不再改变。
//!
//! 构建时完成两件事：
//! - 分级物品（`xxx_i`, `xxx_ii` ...）的配方展开为从 I 级做到本级的累计花费
//! - 标记被增幅器声明为"内置"的物品，这类物品只能由容量逻辑注入

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use bevy::prelude::*;
use serde::Deserialize;

use super::schema::{ItemEntry, SlotEntry};

/// 材料 id -> 数量
pub type Materials = BTreeMap<String, u32>;

/// 稀有度（有序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
pub enum Rarity {
    #[default]
    #[serde(alias = "common")]
    Common,
    #[serde(alias = "uncommon")]
    Uncommon,
    #[serde(alias = "rare")]
    Rare,
    #[serde(alias = "epic")]
    Epic,
    #[serde(alias = "legendary")]
    Legendary,
}

impl Rarity {
    /// 回收评分权重：每升一级翻倍
    pub fn weight(self) -> u32 {
        match self {
            Rarity::Common => 1,
            Rarity::Uncommon => 2,
            Rarity::Rare => 4,
            Rarity::Epic => 8,
            Rarity::Legendary => 16,
        }
    }
}

/// 额外槽位的类型声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraSlotType {
    pub kind: String,
    pub integrated: Option<String>,
}

impl ExtraSlotType {
    pub fn is_integrated(&self) -> bool {
        self.integrated.is_some()
    }
}

/// 各容器容量；没有增幅器时使用 [`Capacity::default`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capacity {
    pub backpack: usize,
    pub quick_use: usize,
    pub safe_pocket: usize,
    pub extra: Vec<ExtraSlotType>,
}

impl Default for Capacity {
    fn default() -> Self {
        Self {
            backpack: 16,
            quick_use: 3,
            safe_pocket: 0,
            extra: Vec::new(),
        }
    }
}

impl From<&SlotEntry> for Capacity {
    fn from(entry: &SlotEntry) -> Self {
        let extra = entry
            .extra
            .iter()
            .flat_map(|e| {
                std::iter::repeat_n(
                    ExtraSlotType {
                        kind: e.kind.clone(),
                        integrated: e.integrated.clone(),
                    },
                    e.count,
                )
            })
            .collect();
        Self {
            backpack: entry.backpack,
            quick_use: entry.quick_use,
            safe_pocket: entry.safe_pocket,
            extra,
        }
    }
}

/// 规范化后的物品定义
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub categories: Vec<String>,
    pub rarity: Rarity,
    pub icon: String,
    pub stack_size: Option<u32>,
    /// 已展开为累计花费
    pub recipe: Option<Materials>,
    pub craft_quantity: u32,
    pub supported_modifications: Vec<String>,
    pub shield_compatibility: Vec<String>,
    pub capacity: Option<Capacity>,
    pub recycles_into: Option<Materials>,
    pub recyclable: bool,
    pub integrated: bool,
}

impl Item {
    /// 分类比较不区分大小写
    pub fn has_category(&self, category: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
    }

    pub fn max_stack(&self) -> u32 {
        self.stack_size.unwrap_or(1).max(1)
    }

    pub fn is_stackable(&self) -> bool {
        self.max_stack() > 1
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<Arc<Item>>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn from_entries(entries: &[ItemEntry]) -> Self {
        let mut seen = HashSet::new();
        let entries: Vec<&ItemEntry> = entries
            .iter()
            .filter(|e| {
                let fresh = seen.insert(e.id.as_str());
                if !fresh {
                    warn!("重复的物品 id {}，忽略后出现的条目", e.id);
                }
                fresh
            })
            .collect();

        let integrated: HashSet<&str> = entries
            .iter()
            .filter_map(|e| e.slots.as_ref())
            .flat_map(|s| s.extra.iter())
            .filter_map(|x| x.integrated.as_deref())
            .collect();

        // base id -> tier -> entry
        let mut chains: HashMap<&str, BTreeMap<u8, &ItemEntry>> = HashMap::new();
        for &entry in &entries {
            if let Some((base, tier)) = split_tier(&entry.id) {
                chains.entry(base).or_default().insert(tier, entry);
            }
        }

        let mut catalog = Catalog::default();
        for entry in entries {
            let recipe = match split_tier(&entry.id) {
                Some((base, tier)) if tier > 1 => chains
                    .get(base)
                    .map(|chain| cumulative_recipe(chain, tier))
                    .filter(|r| !r.is_empty())
                    .or_else(|| entry.recipe.clone()),
                _ => entry.recipe.clone(),
            }
            .filter(|r| !r.is_empty());

            let recycles_into = entry.recycles_into.clone().filter(|r| !r.is_empty());
            let item = Item {
                id: entry.id.clone(),
                name: entry.name.clone(),
                categories: entry.categories.clone(),
                rarity: entry.rarity,
                icon: entry.icon.clone(),
                stack_size: entry.stack_size,
                recipe,
                craft_quantity: entry.craft_quantity.unwrap_or(1).max(1),
                supported_modifications: entry.supported_modifications.clone(),
                shield_compatibility: entry.shield_compatibility.clone(),
                capacity: entry.slots.as_ref().map(Capacity::from),
                recyclable: entry.recyclable.unwrap_or(recycles_into.is_some()),
                recycles_into,
                integrated: integrated.contains(entry.id.as_str()),
            };
            catalog.index.insert(item.id.clone(), catalog.items.len());
            catalog.items.push(Arc::new(item));
        }
        catalog
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Item>> {
        self.index.get(id).and_then(|&i| self.items.get(i))
    }

    /// 按 id 或名称查询（不区分大小写）
    pub fn find(&self, token: &str) -> Option<&Arc<Item>> {
        self.get(token).or_else(|| {
            self.items
                .iter()
                .find(|i| i.id.eq_ignore_ascii_case(token) || i.name.eq_ignore_ascii_case(token))
        })
    }

    pub fn items(&self) -> impl Iterator<Item = &Arc<Item>> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

const TIER_MARKERS: [&str; 5] = ["i", "ii", "iii", "iv", "v"];

/// `anvil_iii` -> (`anvil`, 3)
pub fn split_tier(id: &str) -> Option<(&str, u8)> {
    let (base, suffix) = id.rsplit_once('_')?;
    if base.is_empty() {
        return None;
    }
    let pos = TIER_MARKERS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(suffix))?;
    Some((base, pos as u8 + 1))
}

/// I 级配方 + 第 2..=tier 级各自的升级花费
fn cumulative_recipe(chain: &BTreeMap<u8, &ItemEntry>, tier: u8) -> Materials {
    let mut total = Materials::new();
    for (&t, entry) in chain.range(1..=tier) {
        let part = if t == 1 {
            entry.recipe.as_ref()
        } else {
            entry.upgrade_cost.as_ref()
        };
        for (material, qty) in part.into_iter().flatten() {
            *total.entry(material.clone()).or_default() += qty;
        }
    }
    total
}
