use bevy::prelude::*;

mod core;
mod data;
mod dragdrop;
mod equipment;
mod interface;
mod inventory;
mod loadout;
mod materials;
mod persist;

use core::CorePlugin;
use interface::debug_cli::DebugCliPlugin;
use crate::core::states;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Loadout Planner".into(),
                visible: false,
                ..default()
            }),   // 不可见窗口，仅保留输入与计时
            ..default()
        }))
        .add_plugins(CorePlugin)
        .add_plugins(data::DataPlugin)
        .add_plugins(loadout::LoadoutPlugin)
        .add_plugins(inventory::InventoryPlugin)
        .add_plugins(equipment::EquipmentPlugin)
        .add_plugins(dragdrop::DragDropPlugin)
        .add_plugins(materials::MaterialsPlugin)
        .add_plugins(persist::PersistPlugin)
        .add_plugins(DebugCliPlugin)
        .add_systems(Update, forward_log_event) // 简单打印
        .add_systems(Startup, |mut next: ResMut<NextState<states::AppState>>| {
            next.set(states::AppState::Loading);
        })
        .run();
}

fn forward_log_event(mut reader: EventReader<core::events::LogEvent>) {
    for e in reader.read() {
        println!("> {}", e.0);
    }
}
