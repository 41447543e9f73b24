use bevy::prelude::*;

/// 面向用户的输出（CLI 打印）
#[derive(Event, Debug, Clone)]
pub struct LogEvent(pub String);
