//! 拖拽状态机：`Idle` → `Dragging` → `Idle`。
//!
//! 同一时刻最多一个拖拽会话。会话期间不修改配装，只在松手时一次性提交；
//! 取消或松手都会无条件清空会话。

use bevy::math::Vec2;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::equipment::mutation::{pick_up, Changes, DragSource, EquipContext, EquipOutcome, RejectReason};
use crate::equipment::rules::can_equip;
use crate::loadout::components::{Planner, SlotAddress, StackInstance};

use super::layout::SlotLayout;
use super::targeting::{hit_test, in_any, nearest_slot, SlotRect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    Pointer,
    Touch,
}

/// 当前候选目标的合法性提示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verdict {
    #[default]
    None,
    Valid,
    Invalid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub id: u64,
    pub item: StackInstance,
    pub source: DragSource,
    pub input: InputKind,
    pub target: Option<SlotAddress>,
    pub verdict: Verdict,
    pub last_point: Option<Vec2>,
    /// 开始拖拽时各槽位的几何快照
    snapshot: Vec<SlotRect>,
    scroll_zones: Vec<bevy::math::Rect>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DragError {
    #[error("已有拖拽进行中")]
    AlreadyDragging,
    #[error("来源为空或不可拖动")]
    NothingToDrag,
    #[error("当前没有拖拽")]
    NotDragging,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Placed { target: SlotAddress, changes: Changes },
    Unequipped { changes: Changes },
    Rejected { target: SlotAddress, reason: RejectReason },
    /// 没有目标，什么都不做
    Cancelled,
}

/// 跨目标拖拽时附带的数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DragPayload {
    pub source: DragSource,
}

impl DragPayload {
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn decode(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

#[derive(Debug, Clone, Default)]
enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

#[derive(Resource, Debug, Clone, Default)]
pub struct DragEngine {
    state: DragState,
    next_id: u64,
}

impl DragEngine {
    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(s) => Some(s),
            DragState::Idle => None,
        }
    }

    fn session_mut(&mut self) -> Option<&mut DragSession> {
        match &mut self.state {
            DragState::Dragging(s) => Some(s),
            DragState::Idle => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.session().is_some()
    }

    /// 开始拖拽；已有会话时拒绝
    pub fn begin(
        &mut self,
        planner: &Planner,
        requested: DragSource,
        input: InputKind,
        layout: &SlotLayout,
    ) -> Result<&DragSession, DragError> {
        if self.is_dragging() {
            return Err(DragError::AlreadyDragging);
        }
        let (source, item) = pick_up(planner, requested).ok_or(DragError::NothingToDrag)?;
        self.next_id += 1;
        self.state = DragState::Dragging(DragSession {
            id: self.next_id,
            item,
            source,
            input,
            target: None,
            verdict: Verdict::None,
            last_point: None,
            snapshot: layout.slots.clone(),
            scroll_zones: layout.scroll_zones.clone(),
        });
        self.session().ok_or(DragError::NotDragging)
    }

    /// 鼠标移动。候选槽位变化时返回新的提示
    pub fn pointer_move(&mut self, planner: &Planner, point: Vec2, threshold: f32) -> Option<Verdict> {
        let session = self.session_mut()?;
        session.last_point = Some(point);
        let candidate = nearest_slot(&session.snapshot, point, threshold);
        session.retarget(planner, candidate)
    }

    /// 触摸移动。处于滚动区域时不匹配任何槽位
    pub fn touch_move(&mut self, planner: &Planner, point: Vec2) -> Option<Verdict> {
        let session = self.session_mut()?;
        session.last_point = Some(point);
        let candidate = if in_any(&session.scroll_zones, point) {
            None
        } else {
            hit_test(&session.snapshot, point)
        };
        session.retarget(planner, candidate)
    }

    /// 按输入类型分派
    pub fn track(&mut self, planner: &Planner, point: Vec2, threshold: f32) -> Option<Verdict> {
        match self.session()?.input {
            InputKind::Pointer => self.pointer_move(planner, point, threshold),
            InputKind::Touch => self.touch_move(planner, point),
        }
    }

    /// 松手：有候选目标则提交，落在物品池区域则卸下，否则放弃
    pub fn drop(
        &mut self,
        planner: &mut Planner,
        ctx: &EquipContext<'_>,
        point: Option<Vec2>,
        layout: &SlotLayout,
    ) -> Result<DropOutcome, DragError> {
        let DragState::Dragging(session) = std::mem::take(&mut self.state) else {
            return Err(DragError::NotDragging);
        };

        if let Some(target) = session.target {
            return Ok(commit(planner, ctx, &session.item, &session.source, target));
        }

        let point = point.or(session.last_point);
        let over_pool = point.is_some_and(|p| layout.in_inventory_zone(p));
        match session.source {
            DragSource::Slot { slot, .. } if over_pool => Ok(match ctx.unequip(planner, slot) {
                EquipOutcome::Applied(changes) => DropOutcome::Unequipped { changes },
                EquipOutcome::Rejected(_) => DropOutcome::Cancelled,
            }),
            _ => Ok(DropOutcome::Cancelled),
        }
    }

    /// 外部放置事件：优先使用附带数据，数据损坏时退回当前会话，两者都没有则不做任何事
    pub fn drop_payload(
        &mut self,
        planner: &mut Planner,
        ctx: &EquipContext<'_>,
        payload: Option<&str>,
        target: SlotAddress,
    ) -> DropOutcome {
        let session = match std::mem::take(&mut self.state) {
            DragState::Dragging(s) => Some(s),
            DragState::Idle => None,
        };
        let from_payload = payload
            .and_then(DragPayload::decode)
            .and_then(|p| pick_up(planner, p.source));
        let picked = from_payload.or_else(|| session.map(|s| (s.source, s.item)));
        match picked {
            Some((source, item)) => commit(planner, ctx, &item, &source, target),
            None => DropOutcome::Cancelled,
        }
    }

    /// 取消（Esc / 触摸中断）。返回是否确实结束了一个会话
    pub fn cancel(&mut self) -> bool {
        matches!(std::mem::take(&mut self.state), DragState::Dragging(_))
    }

    /// 拖拽期间来源格应显示的数量
    pub fn source_remaining(&self, planner: &Planner) -> Option<u32> {
        let session = self.session()?;
        let original = match &session.source {
            DragSource::Inventory { index } => planner.inventory.get(*index)?.count,
            DragSource::Slot { slot, .. } => planner.loadout.slot(slot)?.count,
        };
        Some(original.saturating_sub(session.item.count))
    }
}

impl DragSession {
    /// 候选槽位变化时才重新判定
    fn retarget(&mut self, planner: &Planner, candidate: Option<SlotAddress>) -> Option<Verdict> {
        if candidate == self.target {
            return None;
        }
        self.target = candidate;
        self.verdict = match candidate {
            None => Verdict::None,
            Some(slot) => {
                let legal = !planner.loadout.is_integrated_slot(&slot)
                    && can_equip(&planner.loadout, &self.item.item, &slot);
                if legal { Verdict::Valid } else { Verdict::Invalid }
            }
        };
        Some(self.verdict)
    }

    pub fn payload(&self) -> DragPayload {
        DragPayload { source: self.source }
    }
}

fn commit(
    planner: &mut Planner,
    ctx: &EquipContext<'_>,
    item: &StackInstance,
    source: &DragSource,
    target: SlotAddress,
) -> DropOutcome {
    match ctx.equip(planner, item, source, target) {
        EquipOutcome::Applied(changes) => DropOutcome::Placed { target, changes },
        EquipOutcome::Rejected(reason) => DropOutcome::Rejected { target, reason },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resources::OverflowPolicy;
    use crate::data::catalog::tests::sample_catalog;
    use crate::data::catalog::Catalog;
    use crate::loadout::components::Section;

    const THRESHOLD: f32 = 80.0;

    struct Fixture {
        catalog: Catalog,
        planner: Planner,
        engine: DragEngine,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                catalog: sample_catalog(),
                planner: Planner::default(),
                engine: DragEngine::default(),
            }
        }

        fn put(&mut self, addr: SlotAddress, id: &str, count: u32) {
            let item = self.catalog.get(id).unwrap().clone();
            *self.planner.loadout.cell_mut(&addr).unwrap() = Some(StackInstance::new(item, count));
        }

        fn layout(&self) -> SlotLayout {
            SlotLayout::grid(&self.planner.loadout, &self.planner.inventory, 64.0, 8.0)
        }

        fn drop_at(&mut self, point: Option<Vec2>) -> DropOutcome {
            let layout = self.layout();
            let ctx = EquipContext::new(&self.catalog, OverflowPolicy::ReturnToInventory);
            self.engine.drop(&mut self.planner, &ctx, point, &layout).unwrap()
        }
    }

    fn bp(i: usize) -> SlotAddress {
        SlotAddress::new(Section::Backpack, i)
    }

    #[test]
    fn second_drag_start_is_rejected() {
        let mut f = Fixture::new();
        f.put(bp(0), "bandage", 2);
        f.put(bp(1), "bandage", 2);
        let layout = f.layout();
        let src = |i| DragSource::Slot { slot: bp(i), split: false };

        assert!(f.engine.begin(&f.planner, src(0), InputKind::Pointer, &layout).is_ok());
        assert_eq!(
            f.engine.begin(&f.planner, src(1), InputKind::Pointer, &layout).unwrap_err(),
            DragError::AlreadyDragging
        );
        assert_eq!(f.engine.session().unwrap().source.slot(), Some(&bp(0)));
    }

    #[test]
    fn empty_source_cannot_start() {
        let mut f = Fixture::new();
        let layout = f.layout();
        let src = DragSource::Slot { slot: bp(0), split: false };
        assert_eq!(
            f.engine.begin(&f.planner, src, InputKind::Pointer, &layout).unwrap_err(),
            DragError::NothingToDrag
        );
        assert!(!f.engine.is_dragging());
    }

    #[test]
    fn split_drag_shows_remainder_at_source() {
        let mut f = Fixture::new();
        f.put(bp(0), "light_ammo", 60);
        let layout = f.layout();
        let src = DragSource::Slot { slot: bp(0), split: true };
        let session = f.engine.begin(&f.planner, src, InputKind::Pointer, &layout).unwrap();
        assert_eq!(session.item.count, 30);
        assert_eq!(f.engine.source_remaining(&f.planner), Some(30));

        // 放到空格
        let target = layout.center_of(&bp(3)).unwrap();
        f.engine.pointer_move(&f.planner, target, THRESHOLD);
        let out = f.drop_at(Some(target));
        assert!(matches!(out, DropOutcome::Placed { target, .. } if target == bp(3)));
        assert_eq!(f.planner.loadout.slot(&bp(0)).unwrap().count, 30);
        assert_eq!(f.planner.loadout.slot(&bp(3)).unwrap().count, 30);
        assert!(!f.engine.is_dragging());
    }

    #[test]
    fn verdict_updates_only_when_candidate_changes() {
        let mut f = Fixture::new();
        f.put(bp(0), "light_ammo", 10);
        let layout = f.layout();
        let src = DragSource::Slot { slot: bp(0), split: false };
        f.engine.begin(&f.planner, src, InputKind::Pointer, &layout).unwrap();

        let bp2 = layout.center_of(&bp(2)).unwrap();
        assert_eq!(f.engine.pointer_move(&f.planner, bp2, THRESHOLD), Some(Verdict::Valid));
        assert_eq!(f.engine.pointer_move(&f.planner, bp2 + Vec2::new(2.0, 1.0), THRESHOLD), None);

        let shield = layout.center_of(&SlotAddress::single(Section::Shield)).unwrap();
        assert_eq!(f.engine.pointer_move(&f.planner, shield, THRESHOLD), Some(Verdict::Invalid));

        // 远离所有槽位：清除候选
        let far = Vec2::new(-500.0, -500.0);
        assert_eq!(f.engine.pointer_move(&f.planner, far, THRESHOLD), Some(Verdict::None));
        assert_eq!(f.engine.session().unwrap().target, None);
    }

    #[test]
    fn drop_without_target_is_a_noop() {
        let mut f = Fixture::new();
        f.put(bp(0), "bandage", 2);
        let before = f.planner.clone();
        let layout = f.layout();
        let src = DragSource::Slot { slot: bp(0), split: false };
        f.engine.begin(&f.planner, src, InputKind::Pointer, &layout).unwrap();
        f.engine.pointer_move(&f.planner, Vec2::new(-500.0, -500.0), THRESHOLD);

        assert_eq!(f.drop_at(None), DropOutcome::Cancelled);
        assert_eq!(f.planner, before);
        assert!(!f.engine.is_dragging());
    }

    #[test]
    fn drop_over_inventory_zone_unequips_whole_stack() {
        let mut f = Fixture::new();
        f.put(bp(0), "light_ammo", 60);
        let layout = f.layout();
        let src = DragSource::Slot { slot: bp(0), split: true };
        f.engine.begin(&f.planner, src, InputKind::Touch, &layout).unwrap();

        let zone = layout.inventory_zone.unwrap().center();
        assert_eq!(f.engine.touch_move(&f.planner, zone), None);
        let out = f.drop_at(Some(zone));
        assert!(matches!(out, DropOutcome::Unequipped { .. }));
        assert!(f.planner.loadout.backpack[0].is_none());
        assert_eq!(f.planner.inventory.count_of("light_ammo"), 60);
    }

    #[test]
    fn inventory_source_dropped_on_pool_does_nothing() {
        let mut f = Fixture::new();
        f.planner.inventory.give(f.catalog.get("bandage").unwrap(), 2);
        let before = f.planner.clone();
        let layout = f.layout();
        f.engine
            .begin(&f.planner, DragSource::Inventory { index: 0 }, InputKind::Pointer, &layout)
            .unwrap();
        let zone = layout.inventory_zone.unwrap().center();
        assert_eq!(f.drop_at(Some(zone)), DropOutcome::Cancelled);
        assert_eq!(f.planner, before);
    }

    #[test]
    fn touch_prefers_modification_slot_and_ignores_scroll_zones() {
        let mut f = Fixture::new();
        f.put(SlotAddress::new(Section::Weapons, 0), "ferro_i", 1);
        f.planner.inventory.give(f.catalog.get("compensator").unwrap(), 1);
        let layout = f.layout();
        f.engine
            .begin(&f.planner, DragSource::Inventory { index: 0 }, InputKind::Touch, &layout)
            .unwrap();

        let muzzle = SlotAddress::modification(0, 0);
        let point = layout.center_of(&muzzle).unwrap();
        assert_eq!(f.engine.touch_move(&f.planner, point), Some(Verdict::Valid));
        assert_eq!(f.engine.session().unwrap().target, Some(muzzle));

        let footer = layout.scroll_zones[1].center();
        f.engine.touch_move(&f.planner, footer);
        assert_eq!(f.engine.session().unwrap().target, None);

        f.engine.touch_move(&f.planner, point);
        assert!(matches!(f.drop_at(Some(point)), DropOutcome::Placed { .. }));
        assert!(f.planner.loadout.slot(&muzzle).is_some());
        assert!(f.planner.inventory.is_empty());
    }

    #[test]
    fn rejected_commit_leaves_state_untouched() {
        let mut f = Fixture::new();
        f.put(bp(0), "bandage", 2);
        let before = f.planner.clone();
        let layout = f.layout();
        let src = DragSource::Slot { slot: bp(0), split: false };
        f.engine.begin(&f.planner, src, InputKind::Pointer, &layout).unwrap();
        let shield = layout.center_of(&SlotAddress::single(Section::Shield)).unwrap();
        f.engine.pointer_move(&f.planner, shield, THRESHOLD);

        let out = f.drop_at(Some(shield));
        assert!(matches!(out, DropOutcome::Rejected { reason: RejectReason::NotAllowed, .. }));
        assert_eq!(f.planner, before);
        assert!(!f.engine.is_dragging());
    }

    #[test]
    fn cancel_clears_session() {
        let mut f = Fixture::new();
        f.put(bp(0), "bandage", 2);
        let layout = f.layout();
        let src = DragSource::Slot { slot: bp(0), split: false };
        f.engine.begin(&f.planner, src, InputKind::Pointer, &layout).unwrap();
        assert!(f.engine.cancel());
        assert!(!f.engine.cancel());
        assert!(f.engine.begin(&f.planner, src, InputKind::Pointer, &layout).is_ok());
    }

    #[test]
    fn external_payload_falls_back_to_live_session() {
        let mut f = Fixture::new();
        f.put(bp(0), "bandage", 2);
        let layout = f.layout();
        let ctx = EquipContext::new(&f.catalog, OverflowPolicy::ReturnToInventory);

        // 损坏的数据 + 活动会话
        let src = DragSource::Slot { slot: bp(0), split: false };
        f.engine.begin(&f.planner, src, InputKind::Pointer, &layout).unwrap();
        let out = f.engine.drop_payload(&mut f.planner, &ctx, Some("{garbage"), bp(1));
        assert!(matches!(out, DropOutcome::Placed { .. }));
        assert!(!f.engine.is_dragging());

        // 有效数据，无会话
        let payload = DragPayload { source: DragSource::Slot { slot: bp(1), split: false } }.encode();
        let out = f.engine.drop_payload(&mut f.planner, &ctx, Some(&payload), bp(2));
        assert!(matches!(out, DropOutcome::Placed { .. }));
        assert_eq!(f.planner.loadout.slot(&bp(2)).unwrap().count, 2);

        // 两者都没有
        let before = f.planner.clone();
        assert_eq!(f.engine.drop_payload(&mut f.planner, &ctx, None, bp(3)), DropOutcome::Cancelled);
        assert_eq!(f.planner, before);
    }
}
