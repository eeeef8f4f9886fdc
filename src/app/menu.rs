//! Connect menu model
//!
//! Host entries in registry order, then the fixed actions. Rebuilt from the
//! host registry after every change to it.

use std::fmt;

use crate::models::Host;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    /// Connect to the host at this registry position
    Host { index: usize, label: String },
    NewHost,
    Disconnect,
    OrganizeFavourites,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuItem::Host { label, .. } => f.write_str(label),
            MenuItem::NewHost => f.write_str("New ..."),
            MenuItem::Disconnect => f.write_str("Disconnect"),
            MenuItem::OrganizeFavourites => f.write_str("Organize Favourites"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostMenu {
    items: Vec<MenuItem>,
}

impl HostMenu {
    pub fn build(hosts: &[Host]) -> Self {
        let mut items: Vec<MenuItem> = hosts
            .iter()
            .enumerate()
            .map(|(index, host)| MenuItem::Host {
                index,
                label: host.to_string(),
            })
            .collect();
        items.extend([
            MenuItem::NewHost,
            MenuItem::Disconnect,
            MenuItem::OrganizeFavourites,
        ]);
        Self { items }
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn host_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item, MenuItem::Host { .. }))
            .count()
    }

    /// One line per item, host entries numbered from 1
    pub fn render(&self) -> String {
        self.items
            .iter()
            .map(|item| match item {
                MenuItem::Host { index, label } => format!("  {}. {}", index + 1, label),
                other => format!("     {}", other),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
