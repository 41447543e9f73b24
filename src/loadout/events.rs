use bevy::prelude::*;

use crate::equipment::mutation::Changes;

/// 配装或物品池发生了变化（持久化、界面刷新监听它）
#[derive(Event, Debug, Clone)]
pub struct LoadoutChanged {
    pub changes: Changes,
}

#[derive(Event)]
pub struct SetTitleEvent(pub String);

#[derive(Event)]
pub struct ShowLoadoutEvent;
