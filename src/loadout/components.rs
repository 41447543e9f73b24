use std::fmt;
use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::catalog::{Capacity, ExtraSlotType, Item};
use crate::inventory::components::InventoryPool;

/// 配装中的区域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Augment,
    Shield,
    Weapons,
    Backpack,
    QuickUse,
    Extra,
    SafePocket,
}

pub const WEAPON_SLOTS: usize = 2;

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Augment,
        Section::Shield,
        Section::Weapons,
        Section::Backpack,
        Section::QuickUse,
        Section::Extra,
        Section::SafePocket,
    ];

    /// 只有一格的区域（增幅器、护盾）
    pub fn is_single(self) -> bool {
        matches!(self, Section::Augment | Section::Shield)
    }

    /// 容量由增幅器决定的区域
    pub fn is_pooled(self) -> bool {
        matches!(
            self,
            Section::Backpack | Section::QuickUse | Section::Extra | Section::SafePocket
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Section::Augment => "augment",
            Section::Shield => "shield",
            Section::Weapons => "weapons",
            Section::Backpack => "backpack",
            Section::QuickUse => "quick_use",
            Section::Extra => "extra",
            Section::SafePocket => "safe_pocket",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|sec| {
            sec.name() == s
                || matches!(
                    (sec, s.as_str()),
                    (Section::Weapons, "weapon")
                        | (Section::QuickUse, "quickuse" | "quick")
                        | (Section::SafePocket, "safepocket" | "safe")
                        | (Section::Backpack, "bag")
                )
        })
    }
}

/// 槽位地址：区域 + 下标 + 可选的配件下标
///
/// 单格区域的下标固定为 0；`modification` 只对武器槽有意义。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotAddress {
    pub section: Section,
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification: Option<usize>,
}

impl SlotAddress {
    pub const fn new(section: Section, index: usize) -> Self {
        Self {
            section,
            index,
            modification: None,
        }
    }

    pub const fn single(section: Section) -> Self {
        Self::new(section, 0)
    }

    pub const fn modification(weapon: usize, modification: usize) -> Self {
        Self {
            section: Section::Weapons,
            index: weapon,
            modification: Some(modification),
        }
    }

    /// 地址的"具体程度"：组成部分越多越具体，触摸命中重叠时优先更具体的槽
    pub fn depth(&self) -> usize {
        let base = if self.section.is_single() { 1 } else { 2 };
        base + usize::from(self.modification.is_some())
    }

    /// 解析 `backpack:3`、`weapons:0:1`、`augment`
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split(':');
        let section = Section::parse(parts.next()?)?;
        let index = match parts.next() {
            Some(p) => p.parse().ok()?,
            None if section.is_single() => 0,
            None => return None,
        };
        let modification = match parts.next() {
            Some(p) if section == Section::Weapons => Some(p.parse().ok()?),
            Some(_) => return None,
            None => None,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            section,
            index,
            modification,
        })
    }
}

impl fmt::Display for SlotAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.section.is_single() {
            return write!(f, "{}", self.section.name());
        }
        write!(f, "{}:{}", self.section.name(), self.index)?;
        if let Some(m) = self.modification {
            write!(f, ":{m}")?;
        }
        Ok(())
    }
}

/// 放入槽位的物品实例
#[derive(Debug, Clone, PartialEq)]
pub struct StackInstance {
    pub item: Arc<Item>,
    pub count: u32,
    /// 与 `item.supported_modifications` 一一对应
    pub modifications: Vec<Option<StackInstance>>,
}

impl StackInstance {
    /// 数量被限制在 `1..=max_stack`
    pub fn new(item: Arc<Item>, count: u32) -> Self {
        let count = count.clamp(1, item.max_stack());
        let modifications = vec![None; item.supported_modifications.len()];
        Self {
            item,
            count,
            modifications,
        }
    }

    pub fn single(item: Arc<Item>) -> Self {
        Self::new(item, 1)
    }

    pub fn id(&self) -> &str {
        &self.item.id
    }

    pub fn same_item(&self, other: &StackInstance) -> bool {
        self.item.id == other.item.id
    }

    /// 还能叠加多少
    pub fn headroom(&self) -> u32 {
        self.item.max_stack().saturating_sub(self.count)
    }

    /// 复制出 `count` 个单位（不带配件）
    pub fn with_count(&self, count: u32) -> Self {
        Self {
            item: self.item.clone(),
            count,
            modifications: vec![None; self.modifications.len()],
        }
    }

    pub fn mounted(&self) -> impl Iterator<Item = &StackInstance> {
        self.modifications.iter().flatten()
    }
}

/// 当前配装
#[derive(Debug, Clone, PartialEq)]
pub struct Loadout {
    pub title: String,
    pub augment: Option<StackInstance>,
    pub shield: Option<StackInstance>,
    pub weapons: [Option<StackInstance>; WEAPON_SLOTS],
    pub backpack: Vec<Option<StackInstance>>,
    pub quick_use: Vec<Option<StackInstance>>,
    pub extra: Vec<Option<StackInstance>>,
    pub safe_pocket: Vec<Option<StackInstance>>,
    /// 由增幅器推导出的容量，四个容器的长度始终与之一致
    pub capacity: Capacity,
}

impl Default for Loadout {
    fn default() -> Self {
        let capacity = Capacity::default();
        Self {
            title: String::new(),
            augment: None,
            shield: None,
            weapons: [None, None],
            backpack: vec![None; capacity.backpack],
            quick_use: vec![None; capacity.quick_use],
            extra: vec![None; capacity.extra.len()],
            safe_pocket: vec![None; capacity.safe_pocket],
            capacity,
        }
    }
}

impl Loadout {
    pub fn section_len(&self, section: Section) -> usize {
        match section {
            Section::Augment | Section::Shield => 1,
            Section::Weapons => WEAPON_SLOTS,
            Section::Backpack => self.backpack.len(),
            Section::QuickUse => self.quick_use.len(),
            Section::Extra => self.extra.len(),
            Section::SafePocket => self.safe_pocket.len(),
        }
    }

    pub fn pool(&self, section: Section) -> Option<&Vec<Option<StackInstance>>> {
        match section {
            Section::Backpack => Some(&self.backpack),
            Section::QuickUse => Some(&self.quick_use),
            Section::Extra => Some(&self.extra),
            Section::SafePocket => Some(&self.safe_pocket),
            _ => None,
        }
    }

    pub fn pool_mut(&mut self, section: Section) -> Option<&mut Vec<Option<StackInstance>>> {
        match section {
            Section::Backpack => Some(&mut self.backpack),
            Section::QuickUse => Some(&mut self.quick_use),
            Section::Extra => Some(&mut self.extra),
            Section::SafePocket => Some(&mut self.safe_pocket),
            _ => None,
        }
    }

    fn top_cell(&self, section: Section, index: usize) -> Option<&Option<StackInstance>> {
        match section {
            Section::Augment if index == 0 => Some(&self.augment),
            Section::Shield if index == 0 => Some(&self.shield),
            Section::Augment | Section::Shield => None,
            Section::Weapons => self.weapons.get(index),
            _ => self.pool(section)?.get(index),
        }
    }

    fn top_cell_mut(&mut self, section: Section, index: usize) -> Option<&mut Option<StackInstance>> {
        match section {
            Section::Augment if index == 0 => Some(&mut self.augment),
            Section::Shield if index == 0 => Some(&mut self.shield),
            Section::Augment | Section::Shield => None,
            Section::Weapons => self.weapons.get_mut(index),
            _ => self.pool_mut(section)?.get_mut(index),
        }
    }

    /// 地址对应的格子；地址不存在时为 None
    pub fn cell(&self, addr: &SlotAddress) -> Option<&Option<StackInstance>> {
        let top = self.top_cell(addr.section, addr.index)?;
        match addr.modification {
            None => Some(top),
            Some(m) if addr.section == Section::Weapons => top.as_ref()?.modifications.get(m),
            Some(_) => None,
        }
    }

    pub fn cell_mut(&mut self, addr: &SlotAddress) -> Option<&mut Option<StackInstance>> {
        let section = addr.section;
        let top = self.top_cell_mut(section, addr.index)?;
        match addr.modification {
            None => Some(top),
            Some(m) if section == Section::Weapons => top.as_mut()?.modifications.get_mut(m),
            Some(_) => None,
        }
    }

    pub fn slot(&self, addr: &SlotAddress) -> Option<&StackInstance> {
        self.cell(addr)?.as_ref()
    }

    pub fn has_slot(&self, addr: &SlotAddress) -> bool {
        self.cell(addr).is_some()
    }

    pub fn extra_type(&self, index: usize) -> Option<&ExtraSlotType> {
        self.capacity.extra.get(index)
    }

    /// 固定内置的额外槽位
    pub fn is_integrated_slot(&self, addr: &SlotAddress) -> bool {
        addr.section == Section::Extra
            && addr.modification.is_none()
            && self
                .extra_type(addr.index)
                .is_some_and(ExtraSlotType::is_integrated)
    }

    /// 按区域顺序列出所有顶层格子的地址
    pub fn addresses(&self) -> Vec<SlotAddress> {
        Section::ALL
            .into_iter()
            .flat_map(|s| (0..self.section_len(s)).map(move |i| SlotAddress::new(s, i)))
            .collect()
    }

    /// 所有已占用的顶层格子
    pub fn occupied(&self) -> impl Iterator<Item = (SlotAddress, &StackInstance)> {
        self.addresses()
            .into_iter()
            .filter_map(|addr| self.slot(&addr).map(|s| (addr, s)))
    }
}

/// 会话聚合：配装 + 未装备物品池。只有拖放引擎与卸下/重置操作会修改它。
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct Planner {
    pub loadout: Loadout,
    pub inventory: InventoryPool,
}
