//! 配装修改：移动、交换、合并、拆分、卸下。
//!
//! 每个操作要么完整生效，要么什么都不改（返回 [`EquipOutcome::Rejected`]）。
//! 修改原地进行，只触碰真正变化的区域，并在 [`Changes`] 中记录下来。

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::resources::OverflowPolicy;
use crate::data::catalog::Catalog;
use crate::loadout::capacity::{apply_capacity, capacity_for};
use crate::loadout::components::{Loadout, Planner, Section, SlotAddress, StackInstance};

use super::rules::{can_equip, shield_compatible};

/// 被拖动物品的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "from", rename_all = "snake_case")]
pub enum DragSource {
    /// 未装备物品池中的第 `index` 堆
    Inventory { index: usize },
    /// 配装中的某个格子；`split` 表示只拖走一半
    Slot {
        slot: SlotAddress,
        #[serde(default)]
        split: bool,
    },
}

impl DragSource {
    pub fn slot(&self) -> Option<&SlotAddress> {
        match self {
            DragSource::Slot { slot, .. } => Some(slot),
            DragSource::Inventory { .. } => None,
        }
    }

    pub fn is_split(&self) -> bool {
        matches!(self, DragSource::Slot { split: true, .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    SameSlot,
    IntegratedSlot,
    NotAllowed,
    StackFull,
    SplitOccupied,
    SourceMissing,
}

/// 一次修改触碰到的区域
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    pub sections: BTreeSet<Section>,
    pub inventory: bool,
}

impl Changes {
    pub fn touch(&mut self, section: Section) {
        self.sections.insert(section);
    }

    fn touch_source(&mut self, source: &DragSource) {
        match source {
            DragSource::Inventory { .. } => self.inventory = true,
            DragSource::Slot { slot, .. } => self.touch(slot.section),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && !self.inventory
    }

    pub fn merge(&mut self, other: Changes) {
        self.sections.extend(other.sections);
        self.inventory |= other.inventory;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquipOutcome {
    Applied(Changes),
    Rejected(RejectReason),
}

impl EquipOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EquipOutcome::Applied(_))
    }
}

/// 计算从 `requested` 处拿起的物品：
/// - 物品池总是整堆
/// - 格子在请求拆分且数量大于 1 时拿走 `floor(count / 2)`，否则整堆
///
/// 返回规范化后的来源（数量为 1 时 `split` 被清除）。内置物品不能被拿起。
pub fn pick_up(planner: &Planner, requested: DragSource) -> Option<(DragSource, StackInstance)> {
    match requested {
        DragSource::Inventory { index } => {
            let stack = planner.inventory.get(index)?;
            Some((requested, stack.clone()))
        }
        DragSource::Slot { slot, split } => {
            if planner.loadout.is_integrated_slot(&slot) {
                return None;
            }
            let stack = planner.loadout.slot(&slot)?;
            if split && stack.count > 1 {
                let dragged = stack.with_count(stack.count / 2);
                Some((DragSource::Slot { slot, split: true }, dragged))
            } else {
                Some((DragSource::Slot { slot, split: false }, stack.clone()))
            }
        }
    }
}

/// 修改所需的只读上下文
#[derive(Clone, Copy)]
pub struct EquipContext<'a> {
    pub catalog: &'a Catalog,
    pub overflow: OverflowPolicy,
}

impl<'a> EquipContext<'a> {
    pub fn new(catalog: &'a Catalog, overflow: OverflowPolicy) -> Self {
        Self { catalog, overflow }
    }

    /// 把 `dragged`（来自 `source`）放到 `target`
    pub fn equip(
        &self,
        planner: &mut Planner,
        dragged: &StackInstance,
        source: &DragSource,
        target: SlotAddress,
    ) -> EquipOutcome {
        if source.slot() == Some(&target) {
            return EquipOutcome::Rejected(RejectReason::SameSlot);
        }
        if planner.loadout.is_integrated_slot(&target)
            || source
                .slot()
                .is_some_and(|s| planner.loadout.is_integrated_slot(s))
        {
            return EquipOutcome::Rejected(RejectReason::IntegratedSlot);
        }
        if !can_equip(&planner.loadout, &dragged.item, &target) {
            return EquipOutcome::Rejected(RejectReason::NotAllowed);
        }
        if !source_holds(planner, source, dragged) {
            return EquipOutcome::Rejected(RejectReason::SourceMissing);
        }

        let outcome = if target.modification.is_some() {
            mount_modification(planner, source, target)
        } else {
            place(planner, dragged, source, target)
        };

        match outcome {
            EquipOutcome::Applied(mut changes) => {
                let touches_augment = target.section == Section::Augment
                    || source.slot().is_some_and(|s| s.section == Section::Augment);
                if touches_augment {
                    changes.merge(self.refresh_augment(planner));
                }
                EquipOutcome::Applied(changes)
            }
            rejected => rejected,
        }
    }

    /// 把格子里的物品整堆放回物品池
    pub fn unequip(&self, planner: &mut Planner, slot: SlotAddress) -> EquipOutcome {
        if planner.loadout.is_integrated_slot(&slot) {
            return EquipOutcome::Rejected(RejectReason::IntegratedSlot);
        }
        let Some(stack) = planner.loadout.cell_mut(&slot).and_then(Option::take) else {
            return EquipOutcome::Rejected(RejectReason::SourceMissing);
        };
        planner.inventory.add(stack);

        let mut changes = Changes {
            inventory: true,
            ..Default::default()
        };
        changes.touch(slot.section);
        if slot.section == Section::Augment {
            changes.merge(self.refresh_augment(planner));
        }
        EquipOutcome::Applied(changes)
    }

    /// 清空配装，所有物品（内置物品除外）回到物品池
    pub fn reset(&self, planner: &mut Planner) -> Changes {
        let title = std::mem::take(&mut planner.loadout.title);
        let old = std::mem::take(&mut planner.loadout);
        planner.loadout.title = title;

        let singles = [old.augment, old.shield].into_iter().flatten();
        let weapons = old.weapons.into_iter().flatten();
        let pooled = [old.backpack, old.quick_use, old.extra, old.safe_pocket]
            .into_iter()
            .flatten()
            .flatten();
        for stack in singles.chain(weapons).chain(pooled) {
            planner.inventory.add(stack);
        }

        Changes {
            sections: Section::ALL.into_iter().collect(),
            inventory: true,
        }
    }

    /// 增幅器变化后的连锁反应：重算容量、重排容器、检查护盾兼容性
    pub fn refresh_augment(&self, planner: &mut Planner) -> Changes {
        let mut changes = Changes::default();
        let before: Vec<_> = Section::ALL
            .into_iter()
            .filter(|s| s.is_pooled())
            .map(|s| (s, planner.loadout.pool(s).cloned()))
            .collect();

        let capacity = capacity_for(planner.loadout.augment.as_ref());
        let displaced = apply_capacity(&mut planner.loadout, capacity, self.catalog);

        for (section, old) in before {
            if planner.loadout.pool(section) != old.as_ref() {
                changes.touch(section);
            }
        }

        for stack in displaced {
            match self.overflow {
                OverflowPolicy::ReturnToInventory => {
                    planner.inventory.add(stack);
                    changes.inventory = true;
                }
                OverflowPolicy::Discard => {}
            }
        }

        let evict = planner
            .loadout
            .shield
            .as_ref()
            .is_some_and(|s| !shield_compatible(&s.item, planner.loadout.augment.as_ref()));
        if evict {
            if let Some(shield) = planner.loadout.shield.take() {
                planner.inventory.add(shield);
                changes.touch(Section::Shield);
                changes.inventory = true;
            }
        }
        changes
    }
}

/// 来源处仍然存在足量的同一物品
fn source_holds(planner: &Planner, source: &DragSource, dragged: &StackInstance) -> bool {
    let current = match source {
        DragSource::Inventory { index } => planner.inventory.get(*index),
        DragSource::Slot { slot, .. } => planner.loadout.slot(slot),
    };
    current.is_some_and(|s| s.same_item(dragged) && s.count >= dragged.count)
}

/// 从来源取走 `count` 个单位；整堆取走时保留配件
fn take_from_source(planner: &mut Planner, source: &DragSource, count: u32) -> Option<StackInstance> {
    match source {
        DragSource::Inventory { index } => planner.inventory.take(*index, count),
        DragSource::Slot { slot, .. } => take_from_cell(&mut planner.loadout, slot, count),
    }
}

fn take_from_cell(loadout: &mut Loadout, slot: &SlotAddress, count: u32) -> Option<StackInstance> {
    let cell = loadout.cell_mut(slot)?;
    let stack = cell.as_mut()?;
    if count == 0 || stack.count < count {
        return None;
    }
    if stack.count == count {
        return cell.take();
    }
    stack.count -= count;
    Some(stack.with_count(count))
}

/// 配件槽：放入一个单位，原有配件直接丢弃
fn mount_modification(planner: &mut Planner, source: &DragSource, target: SlotAddress) -> EquipOutcome {
    let Some(mut placed) = take_from_source(planner, source, 1) else {
        return EquipOutcome::Rejected(RejectReason::SourceMissing);
    };
    placed.count = 1;
    let Some(cell) = planner.loadout.cell_mut(&target) else {
        return EquipOutcome::Rejected(RejectReason::NotAllowed);
    };
    *cell = Some(placed);

    let mut changes = Changes::default();
    changes.touch(target.section);
    changes.touch_source(source);
    EquipOutcome::Applied(changes)
}

/// 普通格子：同类合并 / 拆分落地 / 交换
fn place(
    planner: &mut Planner,
    dragged: &StackInstance,
    source: &DragSource,
    target: SlotAddress,
) -> EquipOutcome {
    let mut changes = Changes::default();
    changes.touch(target.section);
    changes.touch_source(source);

    let occupant = planner.loadout.slot(&target);
    let mergeable = occupant.is_some_and(|o| o.same_item(dragged) && o.item.is_stackable());
    let occupied = occupant.is_some();

    if mergeable {
        let headroom = occupant.map_or(0, StackInstance::headroom);
        if headroom == 0 {
            return EquipOutcome::Rejected(RejectReason::StackFull);
        }
        let moved = dragged.count.min(headroom);
        if take_from_source(planner, source, moved).is_none() {
            return EquipOutcome::Rejected(RejectReason::SourceMissing);
        }
        if let Some(stack) = planner.loadout.cell_mut(&target).and_then(Option::as_mut) {
            stack.count += moved;
        }
        return EquipOutcome::Applied(changes);
    }

    // 拆分出来的物品只能落在空格或同类堆叠上
    if source.is_split() && occupied {
        return EquipOutcome::Rejected(RejectReason::SplitOccupied);
    }

    let Some(incoming) = take_from_source(planner, source, dragged.count) else {
        return EquipOutcome::Rejected(RejectReason::SourceMissing);
    };
    let displaced = planner
        .loadout
        .cell_mut(&target)
        .and_then(|cell| cell.replace(incoming));

    if let Some(displaced) = displaced {
        match source.slot() {
            Some(slot) if fits_back(&planner.loadout, &displaced, slot) => {
                if let Some(cell) = planner.loadout.cell_mut(slot) {
                    *cell = Some(displaced);
                }
            }
            // 来源是物品池，或者被换出的物品放不回来源格
            _ => {
                planner.inventory.add(displaced);
                changes.inventory = true;
            }
        }
    }
    EquipOutcome::Applied(changes)
}

fn fits_back(loadout: &Loadout, displaced: &StackInstance, slot: &SlotAddress) -> bool {
    loadout.cell(slot).is_some_and(Option::is_none) && can_equip(loadout, &displaced.item, slot)
}
