use super::codec::{deserialize, serialize};
use super::events::*;
use super::storage;
use crate::core::events::LogEvent;
use crate::core::resources::PlannerConfig;
use crate::data::catalog::Catalog;
use crate::equipment::mutation::Changes;
use crate::loadout::components::{Planner, Section};
use crate::loadout::events::LoadoutChanged;
use crate::materials::bom::{compute_required_materials, share_string};
use bevy::prelude::*;

/// 配装变化后写入本地存储；只动了物品池的变化不触发保存
pub fn save_on_change(
    mut ev_changed: EventReader<LoadoutChanged>,
    planner: Res<Planner>,
    config: Res<PlannerConfig>,
) {
    // 标题修改不带任何区域，也需要保存
    let touched = ev_changed
        .read()
        .filter(|ev| !ev.changes.sections.is_empty() || !ev.changes.inventory)
        .count()
        > 0;
    if !touched {
        return;
    }
    match storage::save(&config.save_path, &serialize(&planner.loadout)) {
        Ok(()) => debug!("配装已保存到 {}", config.save_path),
        Err(err) => warn!("保存配装失败: {err:#}"),
    }
}

/// 进入 InGame 时从本地存储恢复
pub fn restore_saved(
    mut planner: ResMut<Planner>,
    catalog: Res<Catalog>,
    config: Res<PlannerConfig>,
    mut log: EventWriter<LogEvent>,
) {
    let text = match storage::load(&config.save_path) {
        Ok(Some(text)) => text,
        Ok(None) => return,
        Err(err) => {
            warn!("读取存档失败: {err:#}");
            return;
        }
    };
    match deserialize(&text, &catalog) {
        Ok(loadout) => {
            info!("已恢复配装 \"{}\"", loadout.title);
            planner.loadout = loadout;
            log.write(LogEvent("已恢复上次的配装".into()));
        }
        Err(err) => warn!("存档无法解析: {err}"),
    }
}

pub fn share_loadout(
    mut ev: EventReader<ShareLoadoutEvent>,
    planner: Res<Planner>,
    mut log: EventWriter<LogEvent>,
) {
    if ev.is_empty() {
        return;
    }
    ev.clear();
    let materials = compute_required_materials(&planner.loadout);
    log.write(LogEvent(format!(
        "loadout: {}\nmaterials: {}",
        serialize(&planner.loadout),
        share_string(&materials)
    )));
}

pub fn load_shared(
    mut ev: EventReader<LoadSharedEvent>,
    mut planner: ResMut<Planner>,
    catalog: Res<Catalog>,
    mut changed: EventWriter<LoadoutChanged>,
    mut log: EventWriter<LogEvent>,
) {
    for LoadSharedEvent(text) in ev.read() {
        match deserialize(text, &catalog) {
            Ok(loadout) => {
                planner.loadout = loadout;
                log.write(LogEvent("已载入分享的配装".into()));
                changed.write(LoadoutChanged {
                    changes: Changes {
                        sections: Section::ALL.into_iter().collect(),
                        inventory: false,
                    },
                });
            }
            Err(err) => {
                log.write(LogEvent(format!("无法载入: {err}")));
            }
        }
    }
}
