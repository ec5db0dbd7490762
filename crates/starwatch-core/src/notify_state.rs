//! Hierarchical notify state.
//!
//! Every event and every grouping level (category, subgroup) has a boolean
//! "enabled" flag keyed by a stable [`NotifyId`]. Changing a grouping flag
//! cascades down to every member; changing a member never touches its
//! grouping flags. The tree is a plain identifier graph with no knowledge of
//! how it is rendered.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

const EVENT_PREFIX: &str = "event:";
const CATEGORY_PREFIX: &str = "category:";
const SUBGROUP_PREFIX: &str = "subgroup:";

/// Stable identifier of a notify toggle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotifyId(String);

impl NotifyId {
    pub fn event(id: &str) -> Self {
        Self(format!("{EVENT_PREFIX}{id}"))
    }

    pub fn category(id: &str) -> Self {
        Self(format!("{CATEGORY_PREFIX}{id}"))
    }

    pub fn subgroup(category: &str, subgroup: &str) -> Self {
        Self(format!("{SUBGROUP_PREFIX}{category}/{subgroup}"))
    }

    /// Parse a prefixed identifier such as `event:tequatl`.
    pub fn parse(raw: &str) -> Option<Self> {
        let known = [EVENT_PREFIX, CATEGORY_PREFIX, SUBGROUP_PREFIX]
            .iter()
            .any(|p| raw.strip_prefix(p).is_some_and(|rest| !rest.is_empty()));
        known.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotifyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One flag written by `set` or `cascade`. Each change is persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub id: NotifyId,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NotifyStateTree {
    states: BTreeMap<NotifyId, bool>,
    children: BTreeMap<NotifyId, Vec<NotifyId>>,
    parents: BTreeMap<NotifyId, NotifyId>,
    toggles: BTreeSet<NotifyId>,
}

impl NotifyStateTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the hierarchy for a catalog: category -> subgroup -> event, plus
    /// festival category -> festival members. All states start enabled.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut tree = Self::new();

        for category in catalog.categories() {
            if category.toggle {
                tree.toggles.insert(NotifyId::category(&category.id));
            }
        }

        for event in catalog.events() {
            let event_id = event.notify_id();
            let category_id = NotifyId::category(&event.category);
            match &event.subgroup {
                Some(subgroup) => {
                    let subgroup_id = NotifyId::subgroup(&event.category, subgroup);
                    tree.link(&category_id, &subgroup_id);
                    tree.link(&subgroup_id, &event_id);
                    tree.toggles.insert(subgroup_id);
                }
                None => tree.link(&category_id, &event_id),
            }
            tree.toggles.insert(event_id);
        }

        for festival in catalog.festivals() {
            let category_id = NotifyId::category(&festival.category);
            for member in &festival.members {
                tree.link(&category_id, &NotifyId::event(member));
            }
        }

        tree
    }

    fn link(&mut self, parent: &NotifyId, child: &NotifyId) {
        let members = self.children.entry(parent.clone()).or_default();
        if !members.contains(child) {
            members.push(child.clone());
        }
        self.parents.entry(child.clone()).or_insert_with(|| parent.clone());
    }

    /// Unknown identifiers read as enabled: label-only categories are legal
    /// and always on.
    pub fn get(&self, id: &NotifyId) -> bool {
        self.states.get(id).copied().unwrap_or(true)
    }

    /// Set a single flag without cascading.
    pub fn set(&mut self, id: &NotifyId, enabled: bool) -> StateChange {
        self.states.insert(id.clone(), enabled);
        StateChange {
            id: id.clone(),
            enabled,
        }
    }

    /// Set a grouping flag and every descendant to the same value.
    ///
    /// Returns every flag written, the grouping flag first, so each can be
    /// persisted independently.
    pub fn cascade(&mut self, group: &NotifyId, enabled: bool) -> Vec<StateChange> {
        let mut changes = vec![self.set(group, enabled)];
        let mut pending: Vec<NotifyId> = self.children(group).to_vec();
        let mut seen = BTreeSet::new();
        seen.insert(group.clone());

        while let Some(id) = pending.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            pending.extend(self.children(&id).iter().cloned());
            changes.push(self.set(&id, enabled));
        }
        changes
    }

    /// UI entry point: cascades for grouping identifiers, sets otherwise.
    pub fn toggle(&mut self, id: &NotifyId, enabled: bool) -> Vec<StateChange> {
        if self.is_grouping(id) {
            self.cascade(id, enabled)
        } else {
            vec![self.set(id, enabled)]
        }
    }

    /// Load a stored value without emitting a change.
    pub fn restore(&mut self, id: &NotifyId, enabled: bool) {
        self.states.insert(id.clone(), enabled);
    }

    pub fn is_grouping(&self, id: &NotifyId) -> bool {
        self.children.get(id).is_some_and(|c| !c.is_empty())
    }

    pub fn children(&self, id: &NotifyId) -> &[NotifyId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parent(&self, id: &NotifyId) -> Option<&NotifyId> {
        self.parents.get(id)
    }

    pub fn contains(&self, id: &NotifyId) -> bool {
        self.toggles.contains(id) || self.children.contains_key(id) || self.parents.contains_key(id)
    }

    /// Whether `id` carries a user-facing toggle.
    pub fn has_toggle(&self, id: &NotifyId) -> bool {
        self.toggles.contains(id)
    }

    /// Every identifier that carries a user-facing toggle.
    pub fn toggles(&self) -> impl Iterator<Item = &NotifyId> {
        self.toggles.iter()
    }

    /// Every node depth-first from the roots, each with its depth.
    ///
    /// A node reachable from two groups is listed once, under the first.
    pub fn walk(&self) -> Vec<(usize, &NotifyId)> {
        let roots: BTreeSet<&NotifyId> = self
            .toggles
            .iter()
            .chain(self.children.keys())
            .filter(|id| !self.parents.contains_key(*id))
            .collect();

        let mut out = Vec::new();
        let mut seen = BTreeSet::new();
        let mut stack: Vec<(usize, &NotifyId)> =
            roots.into_iter().rev().map(|id| (0, id)).collect();
        while let Some((depth, id)) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            out.push((depth, id));
            stack.extend(self.children(id).iter().rev().map(|c| (depth + 1, c)));
        }
        out
    }
}
