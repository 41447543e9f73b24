use bevy::prelude::*;

/// 打印当前配装与材料清单的分享字符串
#[derive(Event)]
pub struct ShareLoadoutEvent;

/// 用分享字符串替换当前配装
#[derive(Event, Debug, Clone)]
pub struct LoadSharedEvent(pub String);
