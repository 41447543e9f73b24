//! 配装的字符串编码，用于本地保存与分享链接。
//!
//! 编码只记录物品 id 与数量；容器容量不写入，解码时由增幅器重新推导。
//! 每个容器末尾的空格子会被省略。

use serde::{Deserialize, Serialize};
use thiserror::Error;
use bevy::prelude::*;

use crate::data::catalog::Catalog;
use crate::equipment::rules::{can_equip, fits_modification};
use crate::loadout::capacity::{apply_capacity, capacity_for};
use crate::loadout::components::{Loadout, SlotAddress, StackInstance};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("配装数据格式错误: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
struct EncodedLoadout {
    #[serde(skip_serializing_if = "String::is_empty")]
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    augment: Option<EncodedStack>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shield: Option<EncodedStack>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    weapons: Vec<Option<EncodedStack>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    backpack: Vec<Option<EncodedStack>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    quick_use: Vec<Option<EncodedStack>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    extra: Vec<Option<EncodedStack>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    safe_pocket: Vec<Option<EncodedStack>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct EncodedStack {
    item_id: String,
    count: u32,
    #[serde(default)]
    modifications: Vec<Option<EncodedMod>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct EncodedMod {
    item_id: String,
    count: u32,
}

impl EncodedStack {
    fn from_stack(stack: &StackInstance) -> Self {
        let modifications = trim(stack.modifications.iter().map(|m| {
            m.as_ref().map(|m| EncodedMod {
                item_id: m.id().to_string(),
                count: m.count,
            })
        }));
        Self {
            item_id: stack.id().to_string(),
            count: stack.count,
            modifications,
        }
    }

    /// 未知 id 解析为空格子
    fn resolve(&self, catalog: &Catalog) -> Option<StackInstance> {
        let Some(item) = catalog.get(&self.item_id) else {
            warn!("未知物品 {}，该格置空", self.item_id);
            return None;
        };
        let mut stack = StackInstance::new(item.clone(), self.count);
        for (slot, encoded) in stack.modifications.iter_mut().zip(&self.modifications) {
            *slot = encoded
                .as_ref()
                .and_then(|m| catalog.get(&m.item_id))
                .map(|m| StackInstance::single(m.clone()));
        }
        Some(stack)
    }
}

/// 去掉末尾的 None
fn trim<T>(cells: impl Iterator<Item = Option<T>>) -> Vec<Option<T>> {
    let mut out: Vec<Option<T>> = cells.collect();
    while matches!(out.last(), Some(None)) {
        out.pop();
    }
    out
}

fn encode_cells(cells: &[Option<StackInstance>]) -> Vec<Option<EncodedStack>> {
    trim(cells.iter().map(|c| {
        // 内置物品由增幅器决定，无需记录
        c.as_ref()
            .filter(|s| !s.item.integrated)
            .map(EncodedStack::from_stack)
    }))
}

fn decode_cells(cells: &[Option<EncodedStack>], catalog: &Catalog) -> Vec<Option<StackInstance>> {
    cells
        .iter()
        .map(|c| c.as_ref().and_then(|s| s.resolve(catalog)))
        .collect()
}

pub fn serialize(loadout: &Loadout) -> String {
    let encoded = EncodedLoadout {
        title: loadout.title.clone(),
        augment: loadout.augment.as_ref().map(EncodedStack::from_stack),
        shield: loadout.shield.as_ref().map(EncodedStack::from_stack),
        weapons: encode_cells(&loadout.weapons),
        backpack: encode_cells(&loadout.backpack),
        quick_use: encode_cells(&loadout.quick_use),
        extra: encode_cells(&loadout.extra),
        safe_pocket: encode_cells(&loadout.safe_pocket),
    };
    serde_json::to_string(&encoded).unwrap_or_default()
}

/// 还原配装。容量按增幅器重新推导，放不下或不再合法的物品被丢弃
pub fn deserialize(text: &str, catalog: &Catalog) -> Result<Loadout, CodecError> {
    let encoded: EncodedLoadout = serde_json::from_str(text)?;

    let mut loadout = Loadout {
        title: encoded.title,
        augment: encoded.augment.as_ref().and_then(|s| s.resolve(catalog)),
        shield: encoded.shield.as_ref().and_then(|s| s.resolve(catalog)),
        backpack: decode_cells(&encoded.backpack, catalog),
        quick_use: decode_cells(&encoded.quick_use, catalog),
        extra: decode_cells(&encoded.extra, catalog),
        safe_pocket: decode_cells(&encoded.safe_pocket, catalog),
        ..Default::default()
    };
    for (slot, stack) in loadout.weapons.iter_mut().zip(decode_cells(&encoded.weapons, catalog)) {
        *slot = stack;
    }

    let capacity = capacity_for(loadout.augment.as_ref());
    let dropped = apply_capacity(&mut loadout, capacity, catalog);
    if !dropped.is_empty() {
        warn!("还原时有 {} 堆物品超出容量，已丢弃", dropped.len());
    }
    drop_illegal(&mut loadout);
    Ok(loadout)
}

/// 物品表更新后，旧数据里的物品可能不再允许放在原处
fn drop_illegal(loadout: &mut Loadout) {
    let mut illegal: Vec<SlotAddress> = Vec::new();
    let mut occupied: Vec<SlotAddress> = Vec::new();
    for (addr, stack) in loadout.occupied() {
        if loadout.is_integrated_slot(&addr) {
            continue;
        }
        if can_equip(loadout, &stack.item, &addr) {
            occupied.push(addr);
        } else {
            illegal.push(addr);
        }
    }
    for addr in illegal {
        warn!("{addr} 中的物品不再合法，已移除");
        if let Some(cell) = loadout.cell_mut(&addr) {
            *cell = None;
        }
    }
    // 配件按所属武器自身的配件分类校验，武器放在背包里也一样
    for addr in occupied {
        let Some(Some(stack)) = loadout.cell_mut(&addr) else {
            continue;
        };
        let weapon = stack.item.clone();
        for (m, cell) in stack.modifications.iter_mut().enumerate() {
            if cell.as_ref().is_some_and(|x| !fits_modification(&weapon, m, &x.item)) {
                warn!("{addr} 的第 {m} 个配件不再合法，已移除");
                *cell = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::catalog::tests::sample_catalog;
    use crate::loadout::components::Section;

    fn stack(catalog: &Catalog, id: &str, count: u32) -> StackInstance {
        StackInstance::new(catalog.get(id).unwrap().clone(), count)
    }

    fn assembled(catalog: &Catalog) -> Loadout {
        let mut loadout = Loadout {
            title: "night raid".into(),
            augment: Some(stack(catalog, "looting_mk1", 1)),
            ..Default::default()
        };
        let cap = capacity_for(loadout.augment.as_ref());
        apply_capacity(&mut loadout, cap, catalog);

        let mut rifle = stack(catalog, "ferro_ii", 1);
        rifle.modifications[1] = Some(stack(catalog, "grip", 1));
        loadout.weapons[1] = Some(rifle);
        loadout.backpack[1] = Some(stack(catalog, "light_ammo", 80));
        loadout.quick_use[0] = Some(stack(catalog, "bandage", 4));
        loadout.extra[1] = Some(stack(catalog, "grenade", 2));
        loadout.safe_pocket[0] = Some(stack(catalog, "storage_key", 1));
        loadout
    }

    #[test]
    fn round_trip_preserves_loadout() {
        let catalog = sample_catalog();
        let loadout = assembled(&catalog);
        let restored = deserialize(&serialize(&loadout), &catalog).unwrap();
        assert_eq!(restored, loadout);
    }

    #[test]
    fn trailing_empty_entries_are_omitted() {
        let catalog = sample_catalog();
        let text = serialize(&assembled(&catalog));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert!(value.get("shield").is_none());
        assert_eq!(value["weapons"].as_array().unwrap().len(), 2);
        assert!(value["weapons"][0].is_null());
        assert_eq!(value["backpack"].as_array().unwrap().len(), 2);
        assert!(value["backpack"][0].is_null());
        assert_eq!(value["backpack"][1]["item_id"], "light_ammo");
        assert_eq!(value["backpack"][1]["count"], 80);

        let mods = value["weapons"][1]["modifications"].as_array().unwrap();
        assert_eq!(mods.len(), 2);
        assert!(mods[0].is_null());
        assert_eq!(mods[1]["item_id"], "grip");

        assert_eq!(serialize(&Loadout::default()), "{}");
    }

    #[test]
    fn capacity_is_rederived_from_augment() {
        let catalog = sample_catalog();
        // 伪造一个超长背包：looting_mk1 只有 4 格
        let text = r#"{
            "augment": {"item_id": "looting_mk1", "count": 1},
            "backpack": [null, null, null, null, null, null,
                         {"item_id": "bandage", "count": 2}]
        }"#;
        let loadout = deserialize(text, &catalog).unwrap();
        assert_eq!(loadout.backpack.len(), 4);
        assert_eq!(loadout.quick_use.len(), 2);
        assert_eq!(loadout.extra.len(), 2);
        // 截掉的物品被移进空位
        assert_eq!(loadout.backpack[0].as_ref().unwrap().id(), "bandage");
    }

    #[test]
    fn integrated_items_are_restored_by_capacity() {
        let catalog = sample_catalog();
        let mut loadout = Loadout {
            augment: Some(stack(&catalog, "combat_mk1", 1)),
            ..Default::default()
        };
        let cap = capacity_for(loadout.augment.as_ref());
        apply_capacity(&mut loadout, cap, &catalog);

        let text = serialize(&loadout);
        assert!(!text.contains("integrated_binoculars"));
        let restored = deserialize(&text, &catalog).unwrap();
        assert_eq!(restored.extra[0].as_ref().unwrap().id(), "integrated_binoculars");
    }

    #[test]
    fn unknown_ids_become_empty_slots() {
        let catalog = sample_catalog();
        let text = r#"{
            "shield": {"item_id": "retired_shield", "count": 1},
            "backpack": [{"item_id": "bandage", "count": 1}, {"item_id": "gone", "count": 3}],
            "weapons": [{"item_id": "ferro_i", "count": 1,
                         "modifications": [{"item_id": "missing_mod", "count": 1}]}]
        }"#;
        let loadout = deserialize(text, &catalog).unwrap();
        assert!(loadout.shield.is_none());
        assert!(loadout.backpack[0].is_some());
        assert!(loadout.backpack[1].is_none());
        let rifle = loadout.weapons[0].as_ref().unwrap();
        assert!(rifle.modifications.iter().all(Option::is_none));
    }

    #[test]
    fn illegal_placements_are_dropped() {
        let catalog = sample_catalog();
        // 没有增幅器时不能装中型护盾；子弹不能放进快捷栏
        let text = r#"{
            "shield": {"item_id": "medium_shield", "count": 1},
            "quick_use": [{"item_id": "light_ammo", "count": 10}]
        }"#;
        let loadout = deserialize(text, &catalog).unwrap();
        assert!(loadout.shield.is_none());
        assert!(loadout.quick_use[0].is_none());
    }

    #[test]
    fn modded_weapon_in_backpack_keeps_equipped_weapon_mods() {
        let catalog = sample_catalog();
        let mut loadout = Loadout::default();
        let mut pistol = stack(&catalog, "hairpin_i", 1);
        pistol.modifications[0] = Some(stack(&catalog, "compensator", 1));
        loadout.weapons[0] = Some(pistol);
        // 背包里的冲锋枪第 0 槽是握把槽，与手枪的枪口槽分类不同
        let mut smg = stack(&catalog, "stitcher", 1);
        smg.modifications[0] = Some(stack(&catalog, "grip", 1));
        loadout.backpack[0] = Some(smg);

        let restored = deserialize(&serialize(&loadout), &catalog).unwrap();
        assert_eq!(restored, loadout);
        let mounted = restored.weapons[0].as_ref().unwrap().modifications[0].as_ref();
        assert_eq!(mounted.map(StackInstance::id), Some("compensator"));
    }

    #[test]
    fn stale_mod_on_backpack_weapon_is_cleared() {
        let catalog = sample_catalog();
        // 握把装进了枪口槽
        let text = r#"{
            "backpack": [{"item_id": "ferro_i", "count": 1,
                          "modifications": [{"item_id": "grip", "count": 1}]}]
        }"#;
        let loadout = deserialize(text, &catalog).unwrap();
        let rifle = loadout.backpack[0].as_ref().unwrap();
        assert!(rifle.modifications.iter().all(Option::is_none));
    }

    #[test]
    fn malformed_text_is_an_error() {
        let catalog = sample_catalog();
        assert!(matches!(deserialize("not json", &catalog), Err(CodecError::Json(_))));
    }
}
