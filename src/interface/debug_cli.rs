//! 文字 CLI：读取 stdin → 解析命令 → 转成各插件的事件

use bevy::app::AppExit;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use once_cell::sync::Lazy;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::core::{events::LogEvent, states::AppState};
use crate::data::catalog::{Catalog, Item};
use crate::dragdrop::events::DragInput;
use crate::dragdrop::layout::SlotLayout;
use crate::dragdrop::session::{DragEngine, InputKind};
use crate::equipment::events::{EquipEvent, ResetLoadoutEvent, UnequipEvent};
use crate::equipment::mutation::DragSource;
use crate::inventory::events::{GiveItemEvent, ListInventoryEvent};
use crate::loadout::components::{Planner, SlotAddress};
use crate::loadout::events::{SetTitleEvent, ShowLoadoutEvent};
use crate::materials::events::{ShowMaterialsEvent, ShowRecycleEvent, ShowSharedMaterialsEvent};
use crate::persist::events::{LoadSharedEvent, ShareLoadoutEvent};

static CLI_BUFFER: Lazy<Arc<Mutex<VecDeque<String>>>> =
    Lazy::new(|| Arc::new(Mutex::new(VecDeque::new())));

const HELP: &str = "命令列表:
  help                        查看帮助
  status                      查看当前状态
  exit / quit                 退出程序
  items [token]               列出物品 / 用 id、uuid、名称查询单个物品
  give <id> [count]           放入物品池
  inv                         查看物品池（方括号内为池内下标）
  loadout                     查看配装
  equip <from> <to>           直接放置；from 为槽位或 inv:<下标>
  drag <from> <to> [split]    模拟鼠标拖拽；to 可以是 inv（放回物品池）
  touch <from> <to>           模拟触摸拖拽
  drop <to> [payload]         外部放置；payload 损坏或缺省时使用当前拖拽
  unequip <slot>              卸下到物品池
  reset                       清空配装
  title <text>                设置配装名称
  materials                   所需材料
  bom <text>                  查看分享的材料清单（只读）
  recycle [limit]             回收推荐
  share                       打印分享字符串
  load <text>                 载入分享字符串
槽位写法: augment, shield, weapons:0, weapons:0:1, backpack:3, quick_use:0, extra:1, safe_pocket:0";

/// 插件入口
pub struct DebugCliPlugin;
impl Plugin for DebugCliPlugin {
    fn build(&self, app: &mut App) {
        {
            let buffer = CLI_BUFFER.clone();
            std::thread::spawn(move || {
                use std::io::{self, BufRead};
                let stdin = io::stdin();
                for line in stdin.lock().lines().map_while(Result::ok) {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if let Ok(mut buf) = buffer.lock() {
                        buf.push_back(line.to_string());
                    }
                }
            });
        }
        app
            // 事件：原始输入行
            .add_event::<CliLine>()
            // 每帧从 buffer 取出所有命令行写入事件
            .add_systems(Update, read_stdin)
            // 仅在 InGame 处理命令
            .add_systems(
                Update,
                execute_cli_commands.run_if(in_state(AppState::InGame)),
            );
    }
}

/* ---------------------------- 事件与枚举 ---------------------------- */

/// 终端敲的一整行
#[derive(Event)]
struct CliLine(String);

/// 拖拽终点
#[derive(Debug, Clone, Copy, PartialEq)]
enum DropPoint {
    Slot(SlotAddress),
    Inventory,
}

/// 我们支持的命令
#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Status,
    Exit,
    Items(Option<String>), // None=全部；Some(token)=按 id/uuid/name 查询
    Give { id: String, count: u32 },
    Inventory,
    Loadout,
    Equip { source: DragSource, target: SlotAddress },
    Drag { source: DragSource, to: DropPoint, input: InputKind },
    ExternalDrop { target: SlotAddress, payload: Option<String> },
    Unequip(SlotAddress),
    Reset,
    Title(String),
    Materials,
    SharedMaterials(String),
    Recycle(Option<usize>),
    Share,
    Load(String),
    Invalid(String),
    Unsupported(String),
}

/// 命令要发出的所有事件
#[derive(SystemParam)]
struct CliWriters<'w> {
    log: EventWriter<'w, LogEvent>,
    exit: EventWriter<'w, AppExit>,
    give: EventWriter<'w, GiveItemEvent>,
    list: EventWriter<'w, ListInventoryEvent>,
    show: EventWriter<'w, ShowLoadoutEvent>,
    equip: EventWriter<'w, EquipEvent>,
    unequip: EventWriter<'w, UnequipEvent>,
    reset: EventWriter<'w, ResetLoadoutEvent>,
    title: EventWriter<'w, SetTitleEvent>,
    drag: EventWriter<'w, DragInput>,
    materials: EventWriter<'w, ShowMaterialsEvent>,
    shared: EventWriter<'w, ShowSharedMaterialsEvent>,
    recycle: EventWriter<'w, ShowRecycleEvent>,
    share: EventWriter<'w, ShareLoadoutEvent>,
    load: EventWriter<'w, LoadSharedEvent>,
}

/* ---------------------------- 读取 stdin ---------------------------- */

fn read_stdin(mut writer: EventWriter<CliLine>) {
    let Ok(mut buffer) = CLI_BUFFER.lock() else {
        return;
    };
    while let Some(line) = buffer.pop_front() {
        writer.write(CliLine(line));
    }
}

/* ---------------------------- 命令执行 ---------------------------- */

fn execute_cli_commands(
    mut line_reader: EventReader<CliLine>,
    mut out: CliWriters,
    mut next_state: ResMut<NextState<AppState>>,
    state: Res<State<AppState>>,
    catalog: Res<Catalog>,
    planner: Res<Planner>,
    layout: Res<SlotLayout>,
    engine: Res<DragEngine>,
) {
    for CliLine(input) in line_reader.read() {
        match parse_command(input) {
            Command::Help => {
                out.log.write(LogEvent(HELP.into()));
            }

            Command::Status => {
                out.log.write(LogEvent(format!(
                    "State: {:?}, Items Loaded: {}, Equipped: {}, Pool: {}, Dragging: {}",
                    state.get(),
                    catalog.len(),
                    planner.loadout.occupied().count(),
                    planner.inventory.len(),
                    engine.is_dragging()
                )));
            }

            Command::Exit => {
                out.log.write(LogEvent("Bye~".into()));
                next_state.set(AppState::Shutdown);
                out.exit.write(AppExit::Success);
            }

            Command::Items(None) => {
                for item in catalog.items() {
                    out.log.write(LogEvent(format!(
                        "{} | {} | {} | {}",
                        uuid_from_id(&item.id),
                        item.id,
                        item.name,
                        item.categories.join(", ")
                    )));
                }
            }

            Command::Items(Some(token)) => {
                // id / 名称 / uuid 三种方式
                let found = catalog.find(&token).or_else(|| {
                    catalog
                        .items()
                        .find(|i| uuid_from_id(&i.id).to_string().eq_ignore_ascii_case(&token))
                });
                match found {
                    Some(item) => {
                        out.log.write(LogEvent(item_card(item)));
                    }
                    None => {
                        out.log.write(LogEvent("未找到匹配物品".into()));
                    }
                }
            }

            Command::Give { id, count } => {
                out.give.write(GiveItemEvent { id, count });
            }

            Command::Inventory => {
                out.list.write(ListInventoryEvent);
            }

            Command::Loadout => {
                out.show.write(ShowLoadoutEvent);
            }

            Command::Equip { source, target } => {
                out.equip.write(EquipEvent { source, target });
            }

            Command::Drag { source, to, input } => {
                let point = match to {
                    DropPoint::Slot(slot) => layout.center_of(&slot),
                    DropPoint::Inventory => layout.inventory_zone.map(|z| z.center()),
                };
                let Some(point) = point else {
                    out.log.write(LogEvent("目标不在当前布局中".into()));
                    continue;
                };
                out.drag.write(DragInput::Start { source, input });
                out.drag.write(DragInput::Move { point });
                out.drag.write(DragInput::End { point: Some(point) });
            }

            Command::ExternalDrop { target, payload } => {
                out.drag.write(DragInput::ExternalDrop { payload, target });
            }

            Command::Unequip(slot) => {
                out.unequip.write(UnequipEvent { slot });
            }

            Command::Reset => {
                out.reset.write(ResetLoadoutEvent);
            }

            Command::Title(title) => {
                out.title.write(SetTitleEvent(title));
            }

            Command::Materials => {
                out.materials.write(ShowMaterialsEvent);
            }

            Command::SharedMaterials(text) => {
                out.shared.write(ShowSharedMaterialsEvent(text));
            }

            Command::Recycle(limit) => {
                out.recycle.write(ShowRecycleEvent { limit });
            }

            Command::Share => {
                out.share.write(ShareLoadoutEvent);
            }

            Command::Load(text) => {
                out.load.write(LoadSharedEvent(text));
            }

            Command::Invalid(usage) => {
                out.log.write(LogEvent(format!("用法: {usage}")));
            }

            Command::Unsupported(cmd) => {
                out.log.write(LogEvent(format!("不支持的命令: {cmd}")));
            }
        }
    }
}

/* ---------------------------- 工具函数 ---------------------------- */

fn parse_command(input: &str) -> Command {
    let mut parts = input.split_whitespace();
    let cmd = parts.next().unwrap_or("").to_lowercase();
    let rest = input
        .trim()
        .split_once(char::is_whitespace)
        .map_or("", |(_, r)| r.trim());
    match cmd.as_str() {
        "help" | "h" | "?" => Command::Help,
        "status" | "s" => Command::Status,
        "exit" | "quit" | "q" => Command::Exit,
        "items" | "item" | "i" => {
            let token = (!rest.is_empty()).then(|| rest.to_string());
            Command::Items(token)
        }
        "give" => {
            let Some(id) = parts.next() else {
                return Command::Invalid("give <id> [count]".into());
            };
            let count = parts.next().and_then(|c| c.parse().ok()).unwrap_or(1);
            Command::Give { id: id.to_string(), count }
        }
        "inventory" | "inv" => Command::Inventory,
        "loadout" | "show" | "l" => Command::Loadout,
        "equip" | "move" => {
            let source = parts.next().and_then(|s| parse_source(s, false));
            let target = parts.next().and_then(SlotAddress::parse);
            match (source, target) {
                (Some(source), Some(target)) => Command::Equip { source, target },
                _ => Command::Invalid("equip <from> <to>".into()),
            }
        }
        "drag" | "touch" => {
            let input = if cmd == "touch" { InputKind::Touch } else { InputKind::Pointer };
            let from = parts.next();
            let to = parts.next().and_then(parse_drop_point);
            let split = parts.next().is_some_and(|f| f.trim_start_matches('-') == "split");
            match (from.and_then(|s| parse_source(s, split)), to) {
                (Some(source), Some(to)) => Command::Drag { source, to, input },
                _ => Command::Invalid(format!("{cmd} <from> <to> [split]")),
            }
        }
        "drop" => {
            let (slot, payload) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            match SlotAddress::parse(slot) {
                Some(target) => Command::ExternalDrop {
                    target,
                    payload: Some(payload.trim())
                        .filter(|p| !p.is_empty())
                        .map(str::to_string),
                },
                None => Command::Invalid("drop <to> [payload]".into()),
            }
        }
        "unequip" => match parts.next().and_then(SlotAddress::parse) {
            Some(slot) => Command::Unequip(slot),
            None => Command::Invalid("unequip <slot>".into()),
        },
        "reset" => Command::Reset,
        "title" => Command::Title(rest.to_string()),
        "bom" if !rest.is_empty() => Command::SharedMaterials(rest.to_string()),
        "materials" | "mats" | "bom" => Command::Materials,
        "recycle" => Command::Recycle(parts.next().and_then(|n| n.parse().ok())),
        "share" => Command::Share,
        "load" if !rest.is_empty() => Command::Load(rest.to_string()),
        "load" => Command::Invalid("load <text>".into()),
        other => Command::Unsupported(other.into()),
    }
}

/// `inv:3` / `pool:3` 表示物品池，其余按槽位解析
fn parse_source(token: &str, split: bool) -> Option<DragSource> {
    if let Some(index) = token
        .strip_prefix("inv:")
        .or_else(|| token.strip_prefix("pool:"))
    {
        return index.parse().ok().map(|index| DragSource::Inventory { index });
    }
    SlotAddress::parse(token).map(|slot| DragSource::Slot { slot, split })
}

fn parse_drop_point(token: &str) -> Option<DropPoint> {
    match token {
        "inv" | "pool" | "inventory" => Some(DropPoint::Inventory),
        _ => SlotAddress::parse(token).map(DropPoint::Slot),
    }
}

fn item_card(item: &Item) -> String {
    let recipe = item.recipe.as_ref().map_or_else(
        || "-".to_string(),
        |r| {
            r.iter()
                .map(|(id, qty)| format!("{id}×{qty}"))
                .collect::<Vec<_>>()
                .join(", ")
        },
    );
    format!(
        "==================================================
UUID   : {}
ID     : {}
Name   : {}
Type   : {}
Rarity : {:?}
Stack  : {}
Recipe : {} (每次产出 {})
Mods   : {}
==================================================",
        uuid_from_id(&item.id),
        item.id,
        item.name,
        item.categories.join(", "),
        item.rarity,
        item.max_stack(),
        recipe,
        item.craft_quantity,
        item.supported_modifications.join(", "),
    )
}

fn uuid_from_id(id: &str) -> Uuid {
    // 用固定 namespace + id 字节生成版本 5 UUID，保证可重复得到同一值
    Uuid::new_v5(&Uuid::NAMESPACE_OID, id.as_bytes())
}
