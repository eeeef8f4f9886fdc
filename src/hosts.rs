//! Host Registry
//!
//! Ordered list of the hosts offered in the Connect menu. Order is
//! insertion order. The list changes in three ways only: the initial load,
//! appending a newly saved favourite, and wholesale replacement.

use crate::models::Host;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostRegistry {
    hosts: Vec<Host>,
}

impl HostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_hosts(hosts: Vec<Host>) -> Self {
        Self { hosts }
    }

    /// Append `host` if it is marked favourite. Duplicates are not filtered.
    ///
    /// Returns whether the host was added.
    pub fn add_favourite(&mut self, host: Host) -> bool {
        if !host.is_favourite() {
            return false;
        }
        debug!("Adding favourite host {}", host);
        self.hosts.push(host);
        true
    }

    /// Append a host regardless of its favourite flag (startup host)
    pub fn push(&mut self, host: Host) {
        self.hosts.push(host);
    }

    /// Replace the whole list
    pub fn replace_all(&mut self, hosts: Vec<Host>) {
        debug!("Replacing {} hosts with {}", self.hosts.len(), hosts.len());
        self.hosts = hosts;
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    pub fn get(&self, index: usize) -> Option<&Host> {
        self.hosts.get(index)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Host> {
        self.hosts.iter()
    }
}
