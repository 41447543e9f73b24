use bevy::math::Vec2;
use bevy::prelude::*;

use crate::equipment::mutation::DragSource;
use crate::loadout::components::SlotAddress;

use super::session::{InputKind, Verdict};

/// 拖拽输入。鼠标 / 触摸系统与 CLI 都通过它驱动 [`super::session::DragEngine`]
#[derive(Event, Debug, Clone)]
pub enum DragInput {
    Start { source: DragSource, input: InputKind },
    Move { point: Vec2 },
    End { point: Option<Vec2> },
    Cancel,
    /// 来自其他界面元素的放置（附带 JSON 数据），由宿主或 CLI `drop` 命令发出
    ExternalDrop { payload: Option<String>, target: SlotAddress },
}

/// 候选目标变化，界面据此高亮
#[derive(Event, Debug, Clone, PartialEq)]
pub struct DragFeedback {
    pub session: u64,
    pub target: Option<SlotAddress>,
    pub verdict: Verdict,
}

/// 自动滚动的增量
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ScrollNudge(pub f32);
