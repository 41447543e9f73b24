use super::events::*;
use super::mutation::{pick_up, EquipContext, EquipOutcome};
use crate::core::events::LogEvent;
use crate::core::resources::PlannerConfig;
use crate::data::catalog::Catalog;
use crate::loadout::{components::Planner, events::LoadoutChanged};
use bevy::prelude::*;

pub fn equip_item(
    mut ev_equip: EventReader<EquipEvent>,
    mut planner: ResMut<Planner>,
    catalog: Res<Catalog>,
    config: Res<PlannerConfig>,
    mut changed: EventWriter<LoadoutChanged>,
    mut log_event: EventWriter<LogEvent>,
) {
    let ctx = EquipContext::new(&catalog, config.loadout.overflow_policy);
    for ev in ev_equip.read() {
        let Some((source, dragged)) = pick_up(&planner, ev.source) else {
            log_event.write(LogEvent("来源格为空".to_string()));
            continue;
        };
        let name = dragged.item.name.clone();
        match ctx.equip(&mut planner, &dragged, &source, ev.target) {
            EquipOutcome::Applied(changes) => {
                log_event.write(LogEvent(format!("已放置 {name} → {}", ev.target)));
                changed.write(LoadoutChanged { changes });
            }
            EquipOutcome::Rejected(reason) => {
                debug!("放置被拒绝: {name} → {} ({reason:?})", ev.target);
                log_event.write(LogEvent(format!("无法把 {name} 放到 {}", ev.target)));
            }
        }
    }
}

/// 卸下装备
pub fn unequip_item(
    mut ev_unequip: EventReader<UnequipEvent>,
    mut planner: ResMut<Planner>,
    catalog: Res<Catalog>,
    config: Res<PlannerConfig>,
    mut changed: EventWriter<LoadoutChanged>,
    mut log_event: EventWriter<LogEvent>,
) {
    let ctx = EquipContext::new(&catalog, config.loadout.overflow_policy);
    for ev in ev_unequip.read() {
        match ctx.unequip(&mut planner, ev.slot) {
            EquipOutcome::Applied(changes) => {
                log_event.write(LogEvent(format!("已卸下 {}", ev.slot)));
                changed.write(LoadoutChanged { changes });
            }
            EquipOutcome::Rejected(reason) => {
                debug!("卸下被拒绝: {} ({reason:?})", ev.slot);
                log_event.write(LogEvent(format!("{} 槽位为空或不可卸下", ev.slot)));
            }
        }
    }
}

pub fn reset_loadout(
    mut ev_reset: EventReader<ResetLoadoutEvent>,
    mut planner: ResMut<Planner>,
    catalog: Res<Catalog>,
    config: Res<PlannerConfig>,
    mut changed: EventWriter<LoadoutChanged>,
    mut log_event: EventWriter<LogEvent>,
) {
    if ev_reset.is_empty() {
        return;
    }
    ev_reset.clear();
    let ctx = EquipContext::new(&catalog, config.loadout.overflow_policy);
    let changes = ctx.reset(&mut planner);
    log_event.write(LogEvent("配装已重置".to_string()));
    changed.write(LoadoutChanged { changes });
}
