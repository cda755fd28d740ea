//! Zone grouping and the DR target menu.

use crate::models::inventory::VirtualMachine;
use std::collections::BTreeMap;

/// Inventory partitioned by availability zone.
///
/// Groups hold indices into the inventory. A VM listed in several zones
/// appears in each of those groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneGroups {
    pub zones: BTreeMap<String, Vec<usize>>,
    pub non_zonal: Vec<usize>,
}

impl ZoneGroups {
    /// Number of VMs with at least one zone.
    pub fn zonal_count(&self, vms: &[VirtualMachine]) -> usize {
        vms.iter().filter(|vm| vm.is_zonal()).count()
    }
}

/// Partition `vms` into per-zone groups and a non-zonal group.
pub fn group_by_zone(vms: &[VirtualMachine]) -> ZoneGroups {
    let mut groups = ZoneGroups::default();

    for (idx, vm) in vms.iter().enumerate() {
        if !vm.is_zonal() {
            groups.non_zonal.push(idx);
            continue;
        }
        for zone in &vm.zones {
            let members = groups.zones.entry(zone.clone()).or_default();
            // Guard against a zone listed twice on the same VM.
            if members.last() != Some(&idx) {
                members.push(idx);
            }
        }
    }

    groups
}

/// What a menu entry targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    Zone(String),
    NonZonal,
    All,
    Specific,
    None,
}

/// One line of the DR menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: String,
    pub choice: MenuChoice,
}

/// Build the menu: one entry per zone (sorted), then non-zonal, all,
/// specific VM, and none.
pub fn build_menu(vms: &[VirtualMachine], groups: &ZoneGroups) -> Vec<MenuEntry> {
    let mut entries: Vec<MenuEntry> = groups
        .zones
        .iter()
        .map(|(zone, members)| MenuEntry {
            label: format!("Zone {} ({} VMs)", zone, members.len()),
            choice: MenuChoice::Zone(zone.clone()),
        })
        .collect();

    entries.push(MenuEntry {
        label: format!("Non-zonal VMs ({} VMs)", groups.non_zonal.len()),
        choice: MenuChoice::NonZonal,
    });
    entries.push(MenuEntry {
        label: format!("All VMs ({} VMs)", vms.len()),
        choice: MenuChoice::All,
    });
    entries.push(MenuEntry {
        label: "Specific VM (by name)".to_string(),
        choice: MenuChoice::Specific,
    });
    entries.push(MenuEntry {
        label: "None (exit without changes)".to_string(),
        choice: MenuChoice::None,
    });

    entries
}

/// Resolve a group choice to its VMs in inventory order.
///
/// `Specific` and `None` resolve to nothing here; specific VMs are looked
/// up by name with [`find_by_name`].
pub fn resolve_targets(
    choice: &MenuChoice,
    vms: &[VirtualMachine],
    groups: &ZoneGroups,
) -> Vec<VirtualMachine> {
    fn pick(vms: &[VirtualMachine], indices: &[usize]) -> Vec<VirtualMachine> {
        indices.iter().map(|&i| vms[i].clone()).collect()
    }

    match choice {
        MenuChoice::Zone(zone) => groups
            .zones
            .get(zone)
            .map(|members| pick(vms, members))
            .unwrap_or_default(),
        MenuChoice::NonZonal => pick(vms, &groups.non_zonal),
        MenuChoice::All => vms.to_vec(),
        MenuChoice::Specific | MenuChoice::None => Vec::new(),
    }
}

/// Exact, case-insensitive name lookup.
pub fn find_by_name<'a>(vms: &'a [VirtualMachine], name: &str) -> Option<&'a VirtualMachine> {
    let wanted = name.trim().to_lowercase();
    vms.iter().find(|vm| vm.name.to_lowercase() == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vm(name: &str, zones: &[&str]) -> VirtualMachine {
        VirtualMachine {
            id: format!("/vm/{}", name),
            name: name.to_string(),
            resource_group: "rg".to_string(),
            zones: zones.iter().map(|z| z.to_string()).collect(),
        }
    }

    fn inventory() -> Vec<VirtualMachine> {
        vec![
            vm("web1", &["1"]),
            vm("multi", &["1", "2"]),
            vm("db", &["3"]),
            vm("legacy", &[]),
        ]
    }

    #[test]
    fn test_multi_zone_vm_in_each_zone_once_in_all() {
        let vms = inventory();
        let groups = group_by_zone(&vms);

        assert_eq!(groups.zones["1"], vec![0, 1]);
        assert_eq!(groups.zones["2"], vec![1]);
        assert_eq!(groups.zones["3"], vec![2]);
        assert_eq!(groups.non_zonal, vec![3]);
        assert_eq!(groups.zonal_count(&vms), 3);

        let all = resolve_targets(&MenuChoice::All, &vms, &groups);
        assert_eq!(all.iter().filter(|v| v.name == "multi").count(), 1);
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_duplicate_zone_label_counted_once() {
        let vms = vec![vm("dup", &["1", "1"])];
        let groups = group_by_zone(&vms);
        assert_eq!(groups.zones["1"], vec![0]);
    }

    #[test]
    fn test_menu_layout() {
        let vms = inventory();
        let groups = group_by_zone(&vms);
        let menu = build_menu(&vms, &groups);

        let choices: Vec<_> = menu.iter().map(|e| e.choice.clone()).collect();
        assert_eq!(
            choices,
            vec![
                MenuChoice::Zone("1".to_string()),
                MenuChoice::Zone("2".to_string()),
                MenuChoice::Zone("3".to_string()),
                MenuChoice::NonZonal,
                MenuChoice::All,
                MenuChoice::Specific,
                MenuChoice::None,
            ]
        );
        assert_eq!(menu[0].label, "Zone 1 (2 VMs)");
        assert_eq!(menu[3].label, "Non-zonal VMs (1 VMs)");
    }

    #[test]
    fn test_resolve_zone_and_non_zonal() {
        let vms = inventory();
        let groups = group_by_zone(&vms);

        let zone2 = resolve_targets(&MenuChoice::Zone("2".to_string()), &vms, &groups);
        assert_eq!(zone2.len(), 1);
        assert_eq!(zone2[0].name, "multi");

        let non_zonal = resolve_targets(&MenuChoice::NonZonal, &vms, &groups);
        assert_eq!(non_zonal[0].name, "legacy");

        assert!(resolve_targets(&MenuChoice::None, &vms, &groups).is_empty());
        assert!(resolve_targets(&MenuChoice::Zone("9".to_string()), &vms, &groups).is_empty());
    }

    #[test]
    fn test_find_by_name_case_insensitive_exact() {
        let vms = inventory();
        assert_eq!(find_by_name(&vms, "WEB1").map(|v| v.id.as_str()), Some("/vm/web1"));
        assert_eq!(find_by_name(&vms, " db ").map(|v| v.id.as_str()), Some("/vm/db"));
        assert!(find_by_name(&vms, "web").is_none());
    }
}
