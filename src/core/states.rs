use bevy::prelude::*;

/// 规划器生命周期：启动 → 读取物品表 → 编辑配装 → 退出
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    #[default]
    Startup,
    /// 等待物品表资产就绪
    Loading,
    /// 目录可用，接受拖拽与 CLI 命令
    InGame,
    Shutdown,
}
