pub mod autoscroll;
pub mod events;
pub mod layout;
pub mod session;
mod systems;
pub mod targeting;

use crate::core::states::AppState;
use bevy::prelude::*;
use events::*;
use systems::*;

/// 拖拽放置：输入 → 状态机 → 配装修改
pub struct DragDropPlugin;
impl Plugin for DragDropPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<session::DragEngine>()
            .init_resource::<layout::SlotLayout>()
            .init_resource::<autoscroll::AutoScroll>()
            .add_event::<DragInput>()
            .add_event::<DragFeedback>()
            .add_event::<ScrollNudge>()
            .add_systems(
                Update,
                (sync_layout, mouse_input, touch_input, apply_drag_input, auto_scroll)
                    .chain()
                    .run_if(in_state(AppState::InGame)),
            )
            .add_systems(OnExit(AppState::InGame), |mut engine: ResMut<session::DragEngine>| {
                engine.cancel();
            });
    }
}
