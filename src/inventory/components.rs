use std::sync::Arc;

use crate::data::catalog::Item;
use crate::loadout::components::StackInstance;

/// 未装备物品池：没有固定格位的多重集合，显示时按名称排序
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryPool {
    stacks: Vec<StackInstance>,
}

impl InventoryPool {
    /// 放回一个实例；可叠加的同类物品会先合并进已有堆叠
    pub fn add(&mut self, mut stack: StackInstance) {
        if stack.item.integrated {
            return;
        }
        if stack.item.is_stackable() {
            let item = stack.item.clone();
            for existing in self.stacks.iter_mut().filter(|s| s.item.id == item.id) {
                let moved = existing.headroom().min(stack.count);
                existing.count += moved;
                stack.count -= moved;
                if stack.count == 0 {
                    return;
                }
            }
        }
        self.stacks.push(stack);
    }

    /// 按 id 发放 `count` 个物品，超出堆叠上限时拆成多堆
    pub fn give(&mut self, item: &Arc<Item>, count: u32) {
        let mut left = count;
        while left > 0 {
            let take = left.min(item.max_stack());
            self.add(StackInstance::new(item.clone(), take));
            left -= take;
        }
    }

    pub fn get(&self, index: usize) -> Option<&StackInstance> {
        self.stacks.get(index)
    }

    /// 取走 `count` 个单位；数量不足时不做任何修改
    pub fn take(&mut self, index: usize, count: u32) -> Option<StackInstance> {
        let stack = self.stacks.get_mut(index)?;
        if count == 0 || stack.count < count {
            return None;
        }
        if stack.count == count {
            return Some(self.stacks.remove(index));
        }
        stack.count -= count;
        Some(stack.with_count(count))
    }

    /// (池内下标, 实例)，按名称排序
    pub fn sorted(&self) -> Vec<(usize, &StackInstance)> {
        let mut out: Vec<_> = self.stacks.iter().enumerate().collect();
        out.sort_by(|a, b| a.1.item.name.cmp(&b.1.item.name).then(a.0.cmp(&b.0)));
        out
    }

    pub fn count_of(&self, id: &str) -> u32 {
        self.stacks
            .iter()
            .filter(|s| s.id() == id)
            .map(|s| s.count)
            .sum()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.stacks.iter().position(|s| s.id() == id)
    }

    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }
}
