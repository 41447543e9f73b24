//! 装备规则：判定某个物品能否放进某个槽位。
//!
//! 判定是纯函数，只取决于物品分类、目标地址以及当前配装推导出的槽位类型。

use crate::data::catalog::Item;
use crate::loadout::components::{Loadout, Section, SlotAddress, StackInstance};

pub const AUGMENT: &str = "Augment";
pub const SHIELD: &str = "Shield";
pub const WEAPON: &str = "Weapon";
pub const AMMUNITION: &str = "Ammunition";
pub const MODIFICATION: &str = "Modification";
pub const QUICK_USE: &str = "Quick Use";
pub const KEY: &str = "Key";

/// 护盾等级，由 id 推导
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ShieldTier {
    Light,
    Medium,
    Heavy,
}

impl ShieldTier {
    /// 无法识别的 id 按最低级处理
    pub fn of(id: &str) -> Self {
        let id = id.to_ascii_lowercase();
        if id.contains("heavy") {
            ShieldTier::Heavy
        } else if id.contains("medium") {
            ShieldTier::Medium
        } else {
            ShieldTier::Light
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShieldTier::Light => "light",
            ShieldTier::Medium => "medium",
            ShieldTier::Heavy => "heavy",
        }
    }
}

/// 护盾与当前增幅器是否兼容
pub fn shield_compatible(shield: &Item, augment: Option<&StackInstance>) -> bool {
    let tier = ShieldTier::of(&shield.id);
    if tier == ShieldTier::Light {
        return true;
    }
    augment.is_some_and(|a| {
        a.item
            .shield_compatibility
            .iter()
            .any(|t| t.eq_ignore_ascii_case(tier.name()))
    })
}

/// 配件能否装在该武器的第 `m` 个配件槽，与武器所在位置无关
pub fn fits_modification(weapon: &Item, m: usize, item: &Item) -> bool {
    weapon
        .supported_modifications
        .get(m)
        .is_some_and(|kind| item.has_category(kind))
}

/// 按优先级依次判定
pub fn can_equip(loadout: &Loadout, item: &Item, target: &SlotAddress) -> bool {
    // 1. 配件槽：只看武器声明的配件分类
    if let Some(m) = target.modification {
        if target.section != Section::Weapons {
            return false;
        }
        let Some(weapon) = loadout.weapons.get(target.index).and_then(Option::as_ref) else {
            return false;
        };
        return fits_modification(&weapon.item, m, item);
    }

    if !loadout.has_slot(target) {
        return false;
    }
    let section = target.section;

    if item.has_category(AUGMENT) {
        return section == Section::Augment;
    }

    if item.has_category(SHIELD) {
        return match section {
            Section::Shield => shield_compatible(item, loadout.augment.as_ref()),
            Section::Backpack | Section::SafePocket => true,
            _ => false,
        };
    }

    if item.has_category(WEAPON) {
        return matches!(section, Section::Weapons | Section::Backpack);
    }

    if section == Section::Extra {
        return loadout
            .extra_type(target.index)
            .is_some_and(|ty| !ty.is_integrated() && item.has_category(&ty.kind));
    }

    if item.has_category(QUICK_USE) && section == Section::QuickUse {
        return true;
    }

    if [AMMUNITION, MODIFICATION, QUICK_USE, KEY]
        .iter()
        .any(|c| item.has_category(c))
    {
        return matches!(section, Section::Backpack | Section::SafePocket);
    }

    false
}
