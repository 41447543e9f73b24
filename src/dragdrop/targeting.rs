//! 拖拽目标判定。
//!
//! 鼠标：取距离最近、且在阈值以内的槽位中心；距离相同取先登记的槽位。
//! 触摸：直接命中测试，多个矩形重叠时取地址最具体的槽位（配件槽优先于武器槽）。

use bevy::math::{Rect, Vec2};

use crate::loadout::components::SlotAddress;

/// 槽位在屏幕上的矩形
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotRect {
    pub slot: SlotAddress,
    pub rect: Rect,
}

impl SlotRect {
    pub fn new(slot: SlotAddress, rect: Rect) -> Self {
        Self { slot, rect }
    }

    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }
}

pub fn nearest_slot(slots: &[SlotRect], point: Vec2, threshold: f32) -> Option<SlotAddress> {
    let mut best: Option<(SlotAddress, f32)> = None;
    for slot in slots {
        let distance = slot.center().distance(point);
        if distance > threshold {
            continue;
        }
        // 严格小于：距离相同时保留先出现的槽位
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((slot.slot, distance));
        }
    }
    best.map(|(slot, _)| slot)
}

pub fn hit_test(slots: &[SlotRect], point: Vec2) -> Option<SlotAddress> {
    let mut best: Option<SlotAddress> = None;
    for slot in slots.iter().filter(|s| s.rect.contains(point)) {
        if best.is_none_or(|b| slot.slot.depth() > b.depth()) {
            best = Some(slot.slot);
        }
    }
    best
}

pub fn in_any(zones: &[Rect], point: Vec2) -> bool {
    zones.iter().any(|z| z.contains(point))
}
