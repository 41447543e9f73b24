use std::time::Duration;

use bevy::math::{Rect, Vec2};
use bevy::prelude::*;

use crate::core::resources::AutoScrollConfig;

/// 拖拽时指针停在容器边缘附近，按固定间隔推动滚动。
///
/// 计时器绑定到会话 id：会话结束或换成新会话时立即丢弃。
#[derive(Resource, Debug, Default)]
pub struct AutoScroll {
    active: Option<(u64, Timer)>,
    /// 容器当前滚动量
    pub offset: f32,
}

impl AutoScroll {
    pub fn session(&self) -> Option<u64> {
        self.active.as_ref().map(|(id, _)| *id)
    }

    /// 每帧调用。返回本帧的滚动增量（没有滚动时为 `None`）
    pub fn update(
        &mut self,
        session: Option<u64>,
        pointer: Option<Vec2>,
        container: Rect,
        config: &AutoScrollConfig,
        delta: Duration,
    ) -> Option<f32> {
        let Some(id) = session else {
            self.active = None;
            return None;
        };
        if self.session() != Some(id) {
            let interval = config.interval_secs.max(f32::EPSILON);
            self.active = Some((id, Timer::from_seconds(interval, TimerMode::Repeating)));
        }
        let (_, timer) = self.active.as_mut()?;

        let direction = pointer.map_or(0.0, |p| edge_direction(container, p, config.edge_margin));
        if direction == 0.0 {
            timer.reset();
            return None;
        }

        timer.tick(delta);
        let ticks = timer.times_finished_this_tick();
        if ticks == 0 {
            return None;
        }
        let before = self.offset;
        self.offset = (self.offset + direction * config.step * ticks as f32).max(0.0);
        let nudge = self.offset - before;
        (nudge != 0.0).then_some(nudge)
    }
}

/// 上边缘 -1，下边缘 +1，其余 0
fn edge_direction(container: Rect, point: Vec2, margin: f32) -> f32 {
    if point.x < container.min.x || point.x > container.max.x {
        return 0.0;
    }
    if point.y >= container.min.y && point.y < container.min.y + margin {
        -1.0
    } else if point.y <= container.max.y && point.y > container.max.y - margin {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AutoScrollConfig {
        AutoScrollConfig {
            edge_margin: 20.0,
            step: 10.0,
            interval_secs: 0.1,
        }
    }

    fn container() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 400.0)
    }

    const FRAME: Duration = Duration::from_millis(60);

    #[test]
    fn lingering_near_bottom_edge_scrolls_on_interval() {
        let mut scroll = AutoScroll::default();
        let bottom = Some(Vec2::new(50.0, 395.0));

        assert_eq!(scroll.update(Some(1), bottom, container(), &config(), FRAME), None);
        assert_eq!(scroll.update(Some(1), bottom, container(), &config(), FRAME), Some(10.0));
        assert_eq!(scroll.update(Some(1), bottom, container(), &config(), FRAME * 4), Some(20.0));
        assert_eq!(scroll.offset, 30.0);
    }

    #[test]
    fn top_edge_never_scrolls_past_zero() {
        let mut scroll = AutoScroll {
            offset: 5.0,
            ..default()
        };
        let top = Some(Vec2::new(50.0, 2.0));
        let step = Duration::from_millis(150);

        assert_eq!(scroll.update(Some(1), top, container(), &config(), step), Some(-5.0));
        assert_eq!(scroll.update(Some(1), top, container(), &config(), step), None);
        assert_eq!(scroll.offset, 0.0);
    }

    #[test]
    fn middle_of_container_does_nothing() {
        let mut scroll = AutoScroll::default();
        let middle = Some(Vec2::new(50.0, 200.0));
        for _ in 0..10 {
            assert_eq!(scroll.update(Some(1), middle, container(), &config(), FRAME), None);
        }
        assert_eq!(scroll.offset, 0.0);
    }

    #[test]
    fn timer_is_dropped_when_session_ends_or_changes() {
        let mut scroll = AutoScroll::default();
        let bottom = Some(Vec2::new(50.0, 395.0));

        scroll.update(Some(1), bottom, container(), &config(), FRAME);
        assert_eq!(scroll.session(), Some(1));

        // 新会话：计时从头开始
        assert_eq!(scroll.update(Some(2), bottom, container(), &config(), FRAME), None);
        assert_eq!(scroll.session(), Some(2));

        assert_eq!(scroll.update(None, bottom, container(), &config(), FRAME), None);
        assert_eq!(scroll.session(), None);
    }
}
