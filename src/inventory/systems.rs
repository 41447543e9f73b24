use super::events::*;
use crate::core::events::LogEvent;
use crate::data::catalog::Catalog;
use crate::equipment::mutation::Changes;
use crate::loadout::{components::Planner, events::LoadoutChanged};
use bevy::prelude::*;

/// 处理 give 命令：往物品池里塞物品
pub fn give_item(
    mut ev_give: EventReader<GiveItemEvent>,
    mut planner: ResMut<Planner>,
    catalog: Res<Catalog>,
    mut changed: EventWriter<LoadoutChanged>,
    mut log: EventWriter<LogEvent>,
) {
    for ev in ev_give.read() {
        let Some(item) = catalog.find(&ev.id) else {
            warn!("不存在物品 ID {}", ev.id);
            log.write(LogEvent(format!("不存在物品 ID {}", ev.id)));
            continue;
        };
        if item.integrated {
            log.write(LogEvent(format!("{} 是内置物品，无法单独获得", item.name)));
            continue;
        }
        planner.inventory.give(item, ev.count);
        info!("获得 {} ×{}", item.name, ev.count);
        changed.write(LoadoutChanged {
            changes: Changes {
                inventory: true,
                ..Default::default()
            },
        });
    }
}

/// 打印物品池内容（按名称排序，方括号内是拖拽用的池内下标）
pub fn print_inventory(
    mut ev_list: EventReader<ListInventoryEvent>,
    planner: Res<Planner>,
    mut log: EventWriter<LogEvent>,
) {
    if ev_list.is_empty() {
        return;
    }
    ev_list.clear();

    let sorted = planner.inventory.sorted();
    if sorted.is_empty() {
        log.write(LogEvent("  (empty)".into()));
        return;
    }
    let lines: Vec<String> = sorted
        .iter()
        .map(|(idx, stack)| {
            format!(
                "[{idx}] {} ×{} (id={})",
                stack.item.name,
                stack.count,
                stack.id()
            )
        })
        .collect();
    log.write(LogEvent(lines.join("\n")));
}
