use super::bom::{compute_required_materials, parse_shared};
use super::events::*;
use super::recycle::rank_recycle_candidates;
use crate::core::events::LogEvent;
use crate::core::resources::PlannerConfig;
use crate::data::catalog::{Catalog, Materials};
use crate::loadout::components::Planner;
use bevy::prelude::*;

/// 当前配装的材料总量，随 `Planner` 变化重算
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct RequiredMaterials(pub Materials);

pub fn refresh_required(planner: Res<Planner>, mut required: ResMut<RequiredMaterials>) {
    if !planner.is_changed() {
        return;
    }
    let next = compute_required_materials(&planner.loadout);
    if required.0 != next {
        debug!("材料清单更新: {} 种", next.len());
        required.0 = next;
    }
}

pub fn print_materials(
    mut ev: EventReader<ShowMaterialsEvent>,
    required: Res<RequiredMaterials>,
    catalog: Res<Catalog>,
    mut log: EventWriter<LogEvent>,
) {
    if ev.is_empty() {
        return;
    }
    ev.clear();

    if required.0.is_empty() {
        log.write(LogEvent("无需任何材料".into()));
        return;
    }
    log.write(LogEvent(format!("所需材料:\n{}", material_lines(&catalog, &required.0))));
}

pub fn print_shared_materials(
    mut ev: EventReader<ShowSharedMaterialsEvent>,
    catalog: Res<Catalog>,
    mut log: EventWriter<LogEvent>,
) {
    for ShowSharedMaterialsEvent(text) in ev.read() {
        match parse_shared(text) {
            Ok(materials) if materials.is_empty() => {
                log.write(LogEvent("分享的材料清单为空".into()));
            }
            Ok(materials) => {
                log.write(LogEvent(format!(
                    "分享的材料清单:\n{}",
                    material_lines(&catalog, &materials)
                )));
            }
            Err(e) => {
                warn!("材料清单解析失败: {e}");
                log.write(LogEvent("无法识别的材料清单".into()));
            }
        }
    }
}

fn material_lines(catalog: &Catalog, materials: &Materials) -> String {
    materials
        .iter()
        .map(|(id, qty)| format!("  {} ×{qty}", display_name(catalog, id)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn print_recycle(
    mut ev: EventReader<ShowRecycleEvent>,
    required: Res<RequiredMaterials>,
    catalog: Res<Catalog>,
    config: Res<PlannerConfig>,
    mut log: EventWriter<LogEvent>,
) {
    for ShowRecycleEvent { limit } in ev.read() {
        let limit = limit.unwrap_or(config.materials.recycle_limit);
        let ranked = rank_recycle_candidates(&required.0, &catalog, limit);
        if ranked.is_empty() {
            log.write(LogEvent("没有值得回收的物品".into()));
            continue;
        }
        let lines: Vec<String> = ranked
            .iter()
            .enumerate()
            .map(|(n, c)| format!("  {}. {} (score {})", n + 1, c.item.name, c.score))
            .collect();
        log.write(LogEvent(format!("回收推荐:\n{}", lines.join("\n"))));
    }
}

fn display_name<'a>(catalog: &'a Catalog, id: &'a str) -> &'a str {
    catalog.get(id).map_or(id, |item| item.name.as_str())
}
