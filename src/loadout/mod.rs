pub mod capacity;
pub mod components;
pub mod events;
mod systems;

use crate::core::states::AppState;
use bevy::prelude::*;
use components::*;
use events::*;
use systems::*;

pub struct LoadoutPlugin;
impl Plugin for LoadoutPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Planner>()
            .add_event::<LoadoutChanged>()
            .add_event::<SetTitleEvent>()
            .add_event::<ShowLoadoutEvent>()
            .add_systems(
                Update,
                (set_title, print_loadout).run_if(in_state(AppState::InGame)),
            );
    }
}
