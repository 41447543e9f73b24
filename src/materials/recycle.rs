//! 回收推荐：哪些可回收物品最能补上当前缺口。

use std::sync::Arc;

use crate::data::catalog::{Catalog, Item, Materials};

#[derive(Debug, Clone, PartialEq)]
pub struct RecycleCandidate {
    pub item: Arc<Item>,
    pub score: u32,
}

/// 评分 = Σ min(产出, 缺口) × 材料稀有度权重；零分丢弃，按分数降序（同分保持目录顺序）
pub fn rank_recycle_candidates(
    required: &Materials,
    catalog: &Catalog,
    limit: usize,
) -> Vec<RecycleCandidate> {
    let mut ranked: Vec<RecycleCandidate> = catalog
        .items()
        .filter(|item| item.recyclable)
        .filter_map(|item| {
            let yields = item.recycles_into.as_ref()?;
            let score = yields
                .iter()
                .map(|(material, qty)| {
                    let outstanding = required.get(material).copied().unwrap_or(0);
                    (*qty).min(outstanding) * material_weight(catalog, material)
                })
                .sum();
            (score > 0).then(|| RecycleCandidate {
                item: Arc::clone(item),
                score,
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(limit);
    ranked
}

/// 目录里查不到的材料按 Common 计
fn material_weight(catalog: &Catalog, material: &str) -> u32 {
    catalog.get(material).map_or(1, |m| m.rarity.weight())
}
