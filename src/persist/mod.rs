pub mod codec;
pub mod events;
pub mod storage;
mod systems;

use crate::core::states::AppState;
use bevy::prelude::*;
use events::*;
use systems::*;

/// 配装的本地保存、恢复与分享
pub struct PersistPlugin;
impl Plugin for PersistPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ShareLoadoutEvent>()
            .add_event::<LoadSharedEvent>()
            .add_systems(OnEnter(AppState::InGame), restore_saved)
            .add_systems(
                Update,
                (load_shared, share_loadout, save_on_change)
                    .chain()
                    .run_if(in_state(AppState::InGame)),
            );
    }
}
