pub mod bom;
pub mod events;
pub mod recycle;
mod systems;

use crate::core::states::AppState;
use bevy::prelude::*;
use events::*;
use systems::*;

pub use systems::RequiredMaterials;

pub struct MaterialsPlugin;
impl Plugin for MaterialsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RequiredMaterials>()
            .add_event::<ShowMaterialsEvent>()
            .add_event::<ShowRecycleEvent>()
            .add_event::<ShowSharedMaterialsEvent>()
            .add_systems(
                Update,
                (
                    refresh_required,
                    print_materials,
                    print_recycle,
                    print_shared_materials,
                )
                    .chain()
                    .run_if(in_state(AppState::InGame)),
            );
    }
}
