use bevy::prelude::*;

pub mod states;
pub mod events;
pub mod resources;

/// 核心插件：注册全局资源 / 事件 / 状态
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        use states::AppState;

        // 配置在插件载入时读取，其余插件在 build 阶段即可使用
        let config = resources::PlannerConfig::load_or_default(resources::CONFIG_PATH);

        app
            .init_state::<AppState>()
            .add_event::<events::LogEvent>()
            .insert_resource(config);
    }
}
