use bevy::math::{Rect, Vec2};
use bevy::prelude::*;

use crate::inventory::components::InventoryPool;
use crate::loadout::components::{Loadout, Section, SlotAddress};

use super::targeting::{hit_test, SlotRect};

/// 当前界面上各槽位的几何信息。
///
/// 宿主界面可以直接写入；未接管时由 [`SlotLayout::grid`] 按配装生成一份网格布局，
/// 让 CLI 与测试也能走完整的拖拽路径。
#[derive(Resource, Debug, Clone, Default)]
pub struct SlotLayout {
    pub slots: Vec<SlotRect>,
    /// 物品池中各堆的矩形：(池内下标, 矩形)
    pub inventory_cells: Vec<(usize, Rect)>,
    /// 物品池容器区域，拖到这里松手即卸下
    pub inventory_zone: Option<Rect>,
    /// 触摸时不参与槽位匹配的区域（保持可滚动）
    pub scroll_zones: Vec<Rect>,
    /// 由宿主接管时不再自动重建
    pub locked: bool,
}

impl SlotLayout {
    /// 每个区域一行；武器格宽两格，配件槽嵌在武器格下半部分
    pub fn grid(loadout: &Loadout, inventory: &InventoryPool, cell: f32, gap: f32) -> Self {
        let pitch = cell + gap;
        let mut slots = Vec::new();
        let mut widest = 0.0_f32;

        for (row, section) in Section::ALL.into_iter().enumerate() {
            let y = row as f32 * pitch;
            let width = if section == Section::Weapons { cell * 2.0 + gap } else { cell };
            for i in 0..loadout.section_len(section) {
                let x = i as f32 * (width + gap);
                let rect = Rect::new(x, y, x + width, y + cell);
                slots.push(SlotRect::new(SlotAddress::new(section, i), rect));
                widest = widest.max(rect.max.x);

                if section != Section::Weapons {
                    continue;
                }
                let mods = loadout.weapons[i]
                    .as_ref()
                    .map_or(0, |w| w.modifications.len());
                let sub = cell / 2.0;
                for m in 0..mods {
                    let mx = x + m as f32 * sub;
                    let sub_rect = Rect::new(mx, y + sub, mx + sub, y + cell);
                    slots.push(SlotRect::new(SlotAddress::modification(i, m), sub_rect));
                }
            }
        }

        // 物品池放在右侧一列，底部留出一行按钮区
        let rows = Section::ALL.len() as f32;
        let left = widest + gap * 4.0;
        let zone = Rect::new(left, 0.0, left + cell * 4.0, rows * pitch);
        let inventory_cells = inventory
            .sorted()
            .into_iter()
            .enumerate()
            .map(|(n, (index, _))| {
                let y = n as f32 * pitch;
                (index, Rect::new(left, y, left + cell * 4.0, y + cell))
            })
            .collect();
        let footer = Rect::new(0.0, rows * pitch, left + cell * 4.0, rows * pitch + cell);

        Self {
            slots,
            inventory_cells,
            inventory_zone: Some(zone),
            scroll_zones: vec![zone, footer],
            locked: false,
        }
    }

    pub fn center_of(&self, slot: &SlotAddress) -> Option<Vec2> {
        self.slots
            .iter()
            .find(|s| &s.slot == slot)
            .map(SlotRect::center)
    }

    pub fn slot_at(&self, point: Vec2) -> Option<SlotAddress> {
        hit_test(&self.slots, point)
    }

    pub fn inventory_at(&self, point: Vec2) -> Option<usize> {
        self.inventory_cells
            .iter()
            .find(|(_, r)| r.contains(point))
            .map(|(i, _)| *i)
    }

    pub fn inventory_center(&self, index: usize) -> Option<Vec2> {
        self.inventory_cells
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, r)| r.center())
    }

    pub fn in_inventory_zone(&self, point: Vec2) -> bool {
        self.inventory_zone.is_some_and(|z| z.contains(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::catalog::tests::sample_catalog;
    use crate::loadout::components::StackInstance;

    #[test]
    fn grid_covers_every_slot_and_nests_modifications() {
        let catalog = sample_catalog();
        let mut loadout = Loadout::default();
        loadout.weapons[0] = Some(StackInstance::single(catalog.get("ferro_i").unwrap().clone()));
        let layout = SlotLayout::grid(&loadout, &InventoryPool::default(), 64.0, 8.0);

        for addr in loadout.addresses() {
            assert!(layout.center_of(&addr).is_some(), "missing {addr}");
        }
        let muzzle = SlotAddress::modification(0, 0);
        let center = layout.center_of(&muzzle).unwrap();
        assert_eq!(layout.slot_at(center), Some(muzzle));

        let weapon = layout
            .slots
            .iter()
            .find(|s| s.slot == SlotAddress::new(Section::Weapons, 0))
            .unwrap();
        assert!(weapon.rect.contains(center));
    }

    #[test]
    fn inventory_zone_is_disjoint_from_slots() {
        let catalog = sample_catalog();
        let mut pool = InventoryPool::default();
        pool.give(catalog.get("bandage").unwrap(), 1);
        let layout = SlotLayout::grid(&Loadout::default(), &pool, 64.0, 8.0);

        let center = layout.inventory_center(0).unwrap();
        assert!(layout.in_inventory_zone(center));
        assert_eq!(layout.inventory_at(center), Some(0));
        assert_eq!(layout.slot_at(center), None);
    }
}
