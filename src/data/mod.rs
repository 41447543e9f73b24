pub mod catalog;
pub mod loader;
pub mod schema;

use bevy::asset::LoadState;
use bevy::prelude::*;
use catalog::Catalog;
use schema::ItemList;
use crate::core::{resources::PlannerConfig, states::AppState};

// --------------------------- 资源 ---------------------------
#[derive(Resource, Default)]
pub struct ItemAssets {
    handle: Option<Handle<ItemList>>,
}

// --------------------------- 插件 ---------------------------
pub struct DataPlugin;
impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app
            // 注册资产类型 & Loader
            .init_asset::<ItemList>()
            .register_asset_loader(loader::JsonItemLoader)
            .init_resource::<ItemAssets>()
            .init_resource::<Catalog>()
            // Loading 流程
            .add_systems(OnEnter(AppState::Loading), start_loading)
            .add_systems(
                Update,
                check_loaded.run_if(in_state(AppState::Loading)),
            );
    }
}

// --------------------------- 系统 ---------------------------
fn start_loading(
    mut item_assets: ResMut<ItemAssets>,
    asset_server: Res<AssetServer>,
    config: Res<PlannerConfig>,
) {
    let handle: Handle<ItemList> = asset_server.load(config.items_path.clone());
    item_assets.handle = Some(handle);
}

/// 物品表就绪后构建目录并进入 InGame
fn check_loaded(
    mut next: ResMut<NextState<AppState>>,
    mut catalog: ResMut<Catalog>,
    item_assets: Res<ItemAssets>,
    lists: Res<Assets<ItemList>>,
    asset_server: Res<AssetServer>,
) {
    let Some(h) = &item_assets.handle else {
        return;
    };
    if let Some(list) = lists.get(h) {
        *catalog = Catalog::from_entries(&list.items);
        info!("✔ Items loaded: {}", catalog.len());
        next.set(AppState::InGame);
    } else if let Some(LoadState::Failed(err)) = asset_server.get_load_state(h) {
        // 物品表不可用时仍进入 InGame，目录为空
        error!("物品表加载失败: {err}");
        next.set(AppState::InGame);
    }
}
