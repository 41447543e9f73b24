use bevy::prelude::*;

use crate::loadout::components::SlotAddress;
use super::mutation::DragSource;

/// 不经过拖拽、直接把来源物品放到目标格
#[derive(Event, Debug, Clone)]
pub struct EquipEvent {
    pub source: DragSource,
    pub target: SlotAddress,
}

/// 卸下到物品池（修饰键点击 / CLI）
#[derive(Event, Debug, Clone)]
pub struct UnequipEvent {
    pub slot: SlotAddress,
}

#[derive(Event)]
pub struct ResetLoadoutEvent;
