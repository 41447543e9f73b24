use super::{components::*, events::*};
use crate::core::events::LogEvent;
use crate::equipment::mutation::Changes;
use bevy::prelude::*;

pub fn set_title(
    mut ev_title: EventReader<SetTitleEvent>,
    mut planner: ResMut<Planner>,
    mut changed: EventWriter<LoadoutChanged>,
) {
    for SetTitleEvent(title) in ev_title.read() {
        planner.loadout.title = title.trim().to_string();
        changed.write(LoadoutChanged {
            changes: Changes::default(),
        });
    }
}

/// 打印配装内容
pub fn print_loadout(
    mut ev_show: EventReader<ShowLoadoutEvent>,
    planner: Res<Planner>,
    mut log: EventWriter<LogEvent>,
) {
    if ev_show.is_empty() {
        return;
    }
    ev_show.clear();
    log.write(LogEvent(describe(&planner.loadout)));
}

fn describe(loadout: &Loadout) -> String {
    let mut out = String::new();
    let title = if loadout.title.is_empty() {
        "(未命名)"
    } else {
        loadout.title.as_str()
    };
    out.push_str(&format!("=== {title} ===\n"));
    for addr in loadout.addresses() {
        let text = match loadout.slot(&addr) {
            Some(stack) => {
                let mut line = format!("{} ×{}", stack.item.name, stack.count);
                for (m, kind) in stack.item.supported_modifications.iter().enumerate() {
                    let mounted = stack.modifications.get(m).and_then(Option::as_ref);
                    let name = mounted.map_or("-", |s| s.item.name.as_str());
                    // 只有装备中的武器配件可以直接寻址
                    if addr.section == Section::Weapons {
                        let sub = SlotAddress::modification(addr.index, m);
                        line.push_str(&format!("\n      [{sub}] {kind}: {name}"));
                    } else {
                        line.push_str(&format!("\n      - {kind}: {name}"));
                    }
                }
                line
            }
            None => match loadout.extra_type(addr.index) {
                Some(ty) if addr.section == Section::Extra => format!("({})", ty.kind),
                _ => "-".to_string(),
            },
        };
        out.push_str(&format!("  [{addr}] {text}\n"));
    }
    out
}
