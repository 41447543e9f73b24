use bevy::prelude::*;

#[derive(Event)]
pub struct ShowMaterialsEvent;

/// 列出回收推荐；`limit` 为空时使用配置值
#[derive(Event)]
pub struct ShowRecycleEvent {
    pub limit: Option<usize>,
}

/// 查看别人分享的 `{材料 id: 数量}` 字符串（只读，不影响当前配装）
#[derive(Event)]
pub struct ShowSharedMaterialsEvent(pub String);
