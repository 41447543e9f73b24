//! 由增幅器推导容器容量，并在容量变化时重排四个容器。

use crate::data::catalog::{Capacity, Catalog, ExtraSlotType};

use super::components::{Loadout, StackInstance};

/// 当前增幅器给出的容量；没有增幅器或增幅器未声明时用默认容量
pub fn capacity_for(augment: Option<&StackInstance>) -> Capacity {
    augment
        .and_then(|a| a.item.capacity.clone())
        .unwrap_or_default()
}

/// 把容器调整到 `len`：保留前面的物品，被截掉的物品依次填进空位，
/// 填不下的作为溢出返回
pub fn resize_pool(cells: &mut Vec<Option<StackInstance>>, len: usize) -> Vec<StackInstance> {
    if cells.len() <= len {
        cells.resize(len, None);
        return Vec::new();
    }
    let cut: Vec<StackInstance> = cells.drain(len..).flatten().collect();
    let mut overflow = Vec::new();
    for stack in cut {
        match cells.iter_mut().find(|c| c.is_none()) {
            Some(gap) => *gap = Some(stack),
            None => overflow.push(stack),
        }
    }
    overflow
}

/// 按类型序列重建额外槽位：
/// - 内置槽位注入固定物品
/// - 其余槽位只保留分类匹配的物品，不匹配的先尝试挪到同类型空位
fn rebuild_extra(
    cells: &mut Vec<Option<StackInstance>>,
    types: &[ExtraSlotType],
    catalog: &Catalog,
) -> Vec<StackInstance> {
    let old = std::mem::take(cells);
    *cells = vec![None; types.len()];

    let mut pending = Vec::new();
    for (i, stack) in old.into_iter().enumerate() {
        let Some(stack) = stack else { continue };
        // 内置物品只由容量逻辑管理
        if stack.item.integrated {
            continue;
        }
        match types.get(i) {
            Some(ty) if !ty.is_integrated() && stack.item.has_category(&ty.kind) => {
                cells[i] = Some(stack);
            }
            _ => pending.push(stack),
        }
    }

    for (cell, ty) in cells.iter_mut().zip(types) {
        if let Some(id) = &ty.integrated {
            *cell = catalog.get(id).map(|item| StackInstance::single(item.clone()));
        }
    }

    let mut ejected = Vec::new();
    for stack in pending {
        let gap = cells
            .iter_mut()
            .zip(types)
            .find(|(cell, ty)| {
                cell.is_none() && !ty.is_integrated() && stack.item.has_category(&ty.kind)
            })
            .map(|(cell, _)| cell);
        match gap {
            Some(cell) => *cell = Some(stack),
            None => ejected.push(stack),
        }
    }
    ejected
}

/// 套用新容量，返回所有被挤出的物品（由调用方决定放回物品池或丢弃）
pub fn apply_capacity(loadout: &mut Loadout, capacity: Capacity, catalog: &Catalog) -> Vec<StackInstance> {
    let mut displaced = resize_pool(&mut loadout.backpack, capacity.backpack);
    displaced.extend(resize_pool(&mut loadout.quick_use, capacity.quick_use));
    displaced.extend(resize_pool(&mut loadout.safe_pocket, capacity.safe_pocket));
    displaced.extend(rebuild_extra(&mut loadout.extra, &capacity.extra, catalog));
    loadout.capacity = capacity;
    displaced
}
