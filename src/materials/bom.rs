//! 材料清单：把整套配装展开成制作所需的基础材料总量。

use crate::data::catalog::Materials;
use crate::loadout::components::{Loadout, StackInstance};

/// 遍历所有已占用的格子（含武器配件）累加配方。
///
/// 分级物品的配方在构建目录时已经展开为累计花费，这里按普通配方处理。
/// 内置物品随增幅器一起出现，不单独计入。
pub fn compute_required_materials(loadout: &Loadout) -> Materials {
    let mut total = Materials::new();
    for (_, stack) in loadout.occupied() {
        if stack.item.integrated {
            continue;
        }
        add_stack(&mut total, stack);
    }
    total
}

fn add_stack(total: &mut Materials, stack: &StackInstance) {
    if let Some(recipe) = &stack.item.recipe {
        let crafts = stack.count.div_ceil(stack.item.craft_quantity.max(1));
        for (material, qty) in recipe {
            let sum = total.entry(material.clone()).or_default();
            *sum = sum.saturating_add(qty.saturating_mul(crafts));
        }
    }
    for modification in stack.mounted() {
        add_stack(total, modification);
    }
}

/// 只读分享用的 `{材料 id: 数量}` 字符串
pub fn share_string(materials: &Materials) -> String {
    serde_json::to_string(materials).unwrap_or_default()
}

pub fn parse_shared(text: &str) -> Result<Materials, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::catalog::tests::sample_catalog;
    use crate::data::catalog::Catalog;
    use crate::loadout::capacity::apply_capacity;
    use crate::loadout::components::{Section, SlotAddress};

    fn stack(catalog: &Catalog, id: &str, count: u32) -> StackInstance {
        StackInstance::new(catalog.get(id).unwrap().clone(), count)
    }

    fn put(loadout: &mut Loadout, addr: SlotAddress, s: StackInstance) {
        *loadout.cell_mut(&addr).unwrap() = Some(s);
    }

    #[test]
    fn empty_loadout_needs_nothing() {
        assert!(compute_required_materials(&Loadout::default()).is_empty());
    }

    #[test]
    fn stacks_in_different_slots_add_up() {
        let catalog = sample_catalog();
        let mut loadout = Loadout::default();
        put(&mut loadout, SlotAddress::new(Section::Backpack, 0), stack(&catalog, "bandage", 3));
        put(&mut loadout, SlotAddress::new(Section::QuickUse, 1), stack(&catalog, "bandage", 5));

        let required = compute_required_materials(&loadout);
        assert_eq!(required.get("rubber"), Some(&16));
        assert_eq!(required.len(), 1);
    }

    #[test]
    fn craft_quantity_rounds_up() {
        let catalog = sample_catalog();
        let mut loadout = Loadout::default();
        put(&mut loadout, SlotAddress::new(Section::Backpack, 0), stack(&catalog, "light_ammo", 25));
        put(&mut loadout, SlotAddress::new(Section::Backpack, 1), stack(&catalog, "light_ammo", 10));

        // ceil(25/10) + ceil(10/10)
        assert_eq!(compute_required_materials(&loadout).get("metal_parts"), Some(&4));
    }

    #[test]
    fn tiered_weapon_with_modification() {
        let catalog = sample_catalog();
        let mut loadout = Loadout::default();
        let mut rifle = stack(&catalog, "ferro_iii", 1);
        rifle.modifications[0] = Some(stack(&catalog, "compensator", 1));
        put(&mut loadout, SlotAddress::new(Section::Weapons, 0), rifle);

        let required = compute_required_materials(&loadout);
        assert_eq!(required.get("metal_parts"), Some(&14));
        assert_eq!(required.get("rubber"), Some(&2));
        assert_eq!(required.get("advanced_circuit"), Some(&1));
    }

    #[test]
    fn integrated_items_are_not_counted() {
        let catalog = sample_catalog();
        let mut loadout = Loadout::default();
        loadout.augment = Some(stack(&catalog, "combat_mk1", 1));
        let cap = catalog.get("combat_mk1").unwrap().capacity.clone().unwrap();
        apply_capacity(&mut loadout, cap, &catalog);
        assert!(loadout.extra[0].is_some());
        assert!(compute_required_materials(&loadout).is_empty());
    }

    #[test]
    fn huge_recipes_saturate() {
        let catalog = sample_catalog();
        let mut costly = (**catalog.get("bandage").unwrap()).clone();
        costly.recipe = Some(Materials::from([("rubber".to_string(), u32::MAX / 2)]));
        let costly = std::sync::Arc::new(costly);
        let mut loadout = Loadout::default();
        put(&mut loadout, SlotAddress::new(Section::Backpack, 0), StackInstance::new(costly.clone(), 3));
        put(&mut loadout, SlotAddress::new(Section::Backpack, 1), StackInstance::new(costly, 1));

        assert_eq!(compute_required_materials(&loadout).get("rubber"), Some(&u32::MAX));
    }

    #[test]
    fn shared_string_is_plain_mapping() {
        let mut materials = Materials::new();
        materials.insert("rubber".into(), 6);
        materials.insert("metal_parts".into(), 2);
        let text = share_string(&materials);
        assert_eq!(text, r#"{"metal_parts":2,"rubber":6}"#);
        assert_eq!(parse_shared(&text).unwrap(), materials);
        assert!(parse_shared("[1,2]").is_err());
    }
}
