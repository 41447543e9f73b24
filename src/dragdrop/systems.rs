use bevy::math::Vec2;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use super::autoscroll::AutoScroll;
use super::events::*;
use super::layout::SlotLayout;
use super::session::{DragEngine, DropOutcome, InputKind};
use crate::core::events::LogEvent;
use crate::core::resources::PlannerConfig;
use crate::data::catalog::Catalog;
use crate::equipment::events::UnequipEvent;
use crate::equipment::mutation::{DragSource, EquipContext};
use crate::loadout::components::{Planner, SlotAddress};
use crate::loadout::events::LoadoutChanged;

/// 按下时命中的动作
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Press {
    Drag(DragSource),
    Unequip(SlotAddress),
}

/// 物品池格子会随滚动偏移，槽位不会
pub(crate) fn resolve_press(
    layout: &SlotLayout,
    point: Vec2,
    split: bool,
    unequip: bool,
    scroll_offset: f32,
) -> Option<Press> {
    if let Some(slot) = layout.slot_at(point) {
        return Some(if unequip {
            Press::Unequip(slot)
        } else {
            Press::Drag(DragSource::Slot { slot, split })
        });
    }
    if unequip {
        return None;
    }
    layout
        .inventory_at(point + Vec2::Y * scroll_offset)
        .map(|index| Press::Drag(DragSource::Inventory { index }))
}

/// 配装或物品池变化后重建默认网格布局；宿主接管（`locked`）时不动
pub fn sync_layout(
    planner: Res<Planner>,
    config: Res<PlannerConfig>,
    mut layout: ResMut<SlotLayout>,
) {
    if layout.locked || !planner.is_changed() {
        return;
    }
    *layout = SlotLayout::grid(
        &planner.loadout,
        &planner.inventory,
        config.layout.cell_size,
        config.layout.gap,
    );
}

/// 鼠标：左键拖拽，Shift 拆分，右键或 Ctrl+左键卸下，Esc 取消
pub fn mouse_input(
    windows: Query<&Window, With<PrimaryWindow>>,
    buttons: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    layout: Res<SlotLayout>,
    scroll: Res<AutoScroll>,
    engine: Res<DragEngine>,
    mut last_cursor: Local<Option<Vec2>>,
    mut drag: EventWriter<DragInput>,
    mut unequip: EventWriter<UnequipEvent>,
) {
    if keys.just_pressed(KeyCode::Escape) && engine.is_dragging() {
        drag.write(DragInput::Cancel);
    }
    let Ok(window) = windows.single() else {
        return;
    };
    let cursor = window.cursor_position();
    let pointer_drag = engine
        .session()
        .is_some_and(|s| s.input == InputKind::Pointer);

    if let Some(point) = cursor {
        let right = buttons.just_pressed(MouseButton::Right);
        if buttons.just_pressed(MouseButton::Left) || right {
            let split = keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);
            let ctrl = keys.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]);
            match resolve_press(&layout, point, split, right || ctrl, scroll.offset) {
                Some(Press::Drag(source)) => {
                    drag.write(DragInput::Start {
                        source,
                        input: InputKind::Pointer,
                    });
                }
                Some(Press::Unequip(slot)) => {
                    unequip.write(UnequipEvent { slot });
                }
                None => {}
            }
        }
        if pointer_drag && *last_cursor != Some(point) {
            drag.write(DragInput::Move { point });
        }
    }

    if pointer_drag && buttons.just_released(MouseButton::Left) {
        drag.write(DragInput::End { point: cursor });
    }
    *last_cursor = cursor;
}

/// 触摸：按下开始（不拆分），移动更新目标，抬起放置，系统中断则取消
pub fn touch_input(
    touches: Res<Touches>,
    layout: Res<SlotLayout>,
    scroll: Res<AutoScroll>,
    engine: Res<DragEngine>,
    mut drag: EventWriter<DragInput>,
) {
    for touch in touches.iter_just_pressed() {
        if let Some(Press::Drag(source)) =
            resolve_press(&layout, touch.position(), false, false, scroll.offset)
        {
            drag.write(DragInput::Start {
                source,
                input: InputKind::Touch,
            });
        }
    }

    if !engine.session().is_some_and(|s| s.input == InputKind::Touch) {
        return;
    }
    for touch in touches.iter().filter(|t| t.delta() != Vec2::ZERO) {
        drag.write(DragInput::Move {
            point: touch.position(),
        });
    }
    for touch in touches.iter_just_released() {
        drag.write(DragInput::End {
            point: Some(touch.position()),
        });
    }
    if touches.iter_just_canceled().next().is_some() {
        drag.write(DragInput::Cancel);
    }
}

/// 把拖拽输入交给状态机；只有真正生效的放置才标记 `Planner` 变化
pub fn apply_drag_input(
    mut inputs: EventReader<DragInput>,
    mut engine: ResMut<DragEngine>,
    mut planner: ResMut<Planner>,
    layout: Res<SlotLayout>,
    catalog: Res<Catalog>,
    config: Res<PlannerConfig>,
    mut feedback: EventWriter<DragFeedback>,
    mut changed: EventWriter<LoadoutChanged>,
    mut log: EventWriter<LogEvent>,
) {
    let ctx = EquipContext::new(&catalog, config.loadout.overflow_policy);
    for input in inputs.read() {
        match input {
            DragInput::Start { source, input } => {
                match engine.begin(&planner, *source, *input, &layout) {
                    Ok(session) => debug!(
                        "开始拖拽 #{}: {} ×{}，数据 {}",
                        session.id,
                        session.item.item.name,
                        session.item.count,
                        session.payload().encode()
                    ),
                    Err(err) => {
                        warn!("无法开始拖拽: {err}");
                        continue;
                    }
                }
                if let Some(left) = engine.source_remaining(&planner) {
                    debug!("来源格剩余 {left}");
                }
            }
            DragInput::Move { point } => {
                let Some(verdict) = engine.track(&planner, *point, config.drag.pointer_threshold)
                else {
                    continue;
                };
                if let Some(session) = engine.session() {
                    feedback.write(DragFeedback {
                        session: session.id,
                        target: session.target,
                        verdict,
                    });
                }
            }
            DragInput::End { point } => {
                match engine.drop(planner.bypass_change_detection(), &ctx, *point, &layout) {
                    Ok(outcome) => report(outcome, &mut planner, &mut changed, &mut log),
                    Err(err) => debug!("{err}"),
                }
            }
            DragInput::Cancel => {
                if engine.cancel() {
                    debug!("拖拽已取消");
                }
            }
            DragInput::ExternalDrop { payload, target } => {
                let outcome = engine.drop_payload(
                    planner.bypass_change_detection(),
                    &ctx,
                    payload.as_deref(),
                    *target,
                );
                report(outcome, &mut planner, &mut changed, &mut log);
            }
        }
    }
}

fn report(
    outcome: DropOutcome,
    planner: &mut ResMut<Planner>,
    changed: &mut EventWriter<LoadoutChanged>,
    log: &mut EventWriter<LogEvent>,
) {
    match outcome {
        DropOutcome::Placed { target, changes } => {
            planner.set_changed();
            log.write(LogEvent(format!("已放置到 {target}")));
            changed.write(LoadoutChanged { changes });
        }
        DropOutcome::Unequipped { changes } => {
            planner.set_changed();
            log.write(LogEvent("已放回物品池".to_string()));
            changed.write(LoadoutChanged { changes });
        }
        DropOutcome::Rejected { target, reason } => {
            debug!("放置被拒绝: {target} ({reason:?})");
            log.write(LogEvent(format!("无法放到 {target}")));
        }
        DropOutcome::Cancelled => debug!("拖拽结束，未放置"),
    }
}

/// 拖拽中指针靠近物品池边缘时推动滚动
pub fn auto_scroll(
    time: Res<Time>,
    engine: Res<DragEngine>,
    layout: Res<SlotLayout>,
    config: Res<PlannerConfig>,
    mut scroll: ResMut<AutoScroll>,
    mut nudges: EventWriter<ScrollNudge>,
) {
    let (session, pointer) = match (engine.session(), layout.inventory_zone) {
        (Some(s), Some(_)) => (Some(s.id), s.last_point),
        _ => (None, None),
    };
    let container = layout.inventory_zone.unwrap_or_default();
    if let Some(nudge) = scroll.update(session, pointer, container, &config.autoscroll, time.delta()) {
        nudges.write(ScrollNudge(nudge));
    }
}
