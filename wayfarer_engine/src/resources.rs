//! Resource registry.
//!
//! All game content — locations, dialogs, items, monsters, callbacks and
//! recipes — lives in a [`ResourceSet`], keyed by kind and id. Packages each
//! build their own set, which is then merged into the engine's master set in
//! dependency order. A merge only overrides an entry when the entry's current
//! owner is named in the incoming package's dependency list; anything else is
//! reported as a conflict and the existing entry wins.

use crate::actor::MonsterTemplate;
use crate::item::Item;
use crate::recipe::Recipe;
use crate::resource::{Callback, Dialog, Location, Resource, ResourceKind};
use std::collections::HashMap;
use std::fmt;

/// A resource plus the package that contributed it.
#[derive(Debug, Clone)]
pub struct RegisteredResource {
    pub package: Option<String>,
    pub resource: Resource,
}

/// Returned by [`ResourceSet::add`] when the id is already taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateResource {
    pub kind: ResourceKind,
    pub id: String,
}

impl fmt::Display for DuplicateResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "duplicate {} '{}'", self.kind.label(), self.id)
    }
}

impl std::error::Error for DuplicateResource {}

/// A merge collision where the existing owner was not a master of the
/// incoming package. The existing entry is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConflict {
    pub kind: ResourceKind,
    pub id: String,
    pub owner: Option<String>,
    pub incoming: Option<String>,
}

impl fmt::Display for MergeConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let owner = self.owner.as_deref().unwrap_or("<unowned>");
        let incoming = self.incoming.as_deref().unwrap_or("<unowned>");
        write!(
            f,
            "{} '{}' from {incoming} collides with {owner}'s entry",
            self.kind.label(),
            self.id
        )
    }
}

/// Registry of all loaded game resources, by kind and id.
#[derive(Debug, Clone, Default)]
pub struct ResourceSet {
    maps: HashMap<ResourceKind, HashMap<String, RegisteredResource>>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource. Fails if an entry of the same kind already holds
    /// the id.
    pub fn add(&mut self, resource: Resource) -> Result<(), DuplicateResource> {
        let kind = resource.kind();
        let id = resource.id().to_string();
        let map = self.maps.entry(kind).or_default();
        if map.contains_key(&id) {
            return Err(DuplicateResource { kind, id });
        }
        map.insert(
            id,
            RegisteredResource {
                package: None,
                resource,
            },
        );
        Ok(())
    }

    pub fn get(&self, kind: ResourceKind, id: &str) -> Option<&Resource> {
        self.maps.get(&kind)?.get(id).map(|r| &r.resource)
    }

    /// Package that contributed the entry, if stamped.
    pub fn owner(&self, kind: ResourceKind, id: &str) -> Option<&str> {
        self.maps.get(&kind)?.get(id)?.package.as_deref()
    }

    pub fn location(&self, id: &str) -> Option<&Location> {
        self.get(ResourceKind::Location, id)?.location_ref()
    }

    pub fn dialog(&self, id: &str) -> Option<&Dialog> {
        self.get(ResourceKind::Dialog, id)?.dialog_ref()
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.get(ResourceKind::Item, id)?.item_ref()
    }

    pub fn monster(&self, id: &str) -> Option<&MonsterTemplate> {
        self.get(ResourceKind::Monster, id)?.monster_ref()
    }

    pub fn callback(&self, id: &str) -> Option<&Callback> {
        self.get(ResourceKind::Callback, id)?.callback_ref()
    }

    pub fn recipe(&self, id: &str) -> Option<&Recipe> {
        self.get(ResourceKind::Recipe, id)?.recipe_ref()
    }

    pub fn iter(&self, kind: ResourceKind) -> impl Iterator<Item = &Resource> {
        self.maps
            .get(&kind)
            .into_iter()
            .flat_map(|m| m.values().map(|r| &r.resource))
    }

    pub fn count(&self, kind: ResourceKind) -> usize {
        self.maps.get(&kind).map_or(0, HashMap::len)
    }

    pub fn total(&self) -> usize {
        self.maps.values().map(HashMap::len).sum()
    }

    pub fn clear(&mut self) {
        self.maps.clear();
    }

    /// Stamp every entry as belonging to the named package.
    pub fn set_package(&mut self, package: &str) {
        for map in self.maps.values_mut() {
            for entry in map.values_mut() {
                entry.package = Some(package.to_string());
            }
        }
    }

    /// Merge another set into this one.
    ///
    /// New ids are taken as-is. When an id already exists, the incoming entry
    /// replaces it only if the current owner is listed in `masters` (the
    /// incoming package's declared dependencies); otherwise the existing entry
    /// is kept and a conflict recorded.
    pub fn merge(&mut self, other: ResourceSet, masters: &[String]) -> Vec<MergeConflict> {
        let mut conflicts = Vec::new();
        for (kind, incoming) in other.maps {
            let map = self.maps.entry(kind).or_default();
            for (id, entry) in incoming {
                match map.get(&id) {
                    None => {
                        map.insert(id, entry);
                    },
                    Some(existing) => {
                        let replaceable = existing
                            .package
                            .as_ref()
                            .is_some_and(|owner| masters.contains(owner));
                        if replaceable {
                            map.insert(id, entry);
                        } else {
                            conflicts.push(MergeConflict {
                                kind,
                                id,
                                owner: existing.package.clone(),
                                incoming: entry.package.clone(),
                            });
                        }
                    },
                }
            }
        }
        conflicts
    }

    /// Check that every cross-resource reference resolves. Run after all
    /// packages have merged; individual packages may legitimately point at
    /// content from their dependencies.
    pub fn dangling_references(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for res in self.iter(ResourceKind::Location) {
            let Some(loc) = res.location_ref() else { continue };
            for link in &loc.travel {
                if self.location(&link.dest).is_none() {
                    problems.push(format!(
                        "location '{}' travel link to unknown location '{}'",
                        loc.id, link.dest
                    ));
                }
            }
            for npc in &loc.npcs {
                if self.dialog(&npc.dialog).is_none() {
                    problems.push(format!(
                        "location '{}' npc '{}' points at unknown dialog '{}'",
                        loc.id, npc.label, npc.dialog
                    ));
                }
            }
            self.check_events(&loc.on_enter, &format!("location '{}'", loc.id), &mut problems);
        }

        for res in self.iter(ResourceKind::Dialog) {
            let Some(dialog) = res.dialog_ref() else { continue };
            for option in &dialog.options {
                self.check_events(
                    &option.events,
                    &format!("dialog '{}' option '{}'", dialog.id, option.label),
                    &mut problems,
                );
            }
        }

        for res in self.iter(ResourceKind::Callback) {
            let Some(cb) = res.callback_ref() else { continue };
            self.check_events(&cb.events, &format!("callback '{}'", cb.id), &mut problems);
        }

        for res in self.iter(ResourceKind::Recipe) {
            let Some(recipe) = res.recipe_ref() else { continue };
            for io in recipe.inputs.iter().chain(&recipe.outputs) {
                if self.item(&io.item).is_none() {
                    problems.push(format!(
                        "recipe '{}' references unknown item '{}'",
                        recipe.id, io.item
                    ));
                }
            }
        }

        problems
    }

    fn check_events(&self, events: &[crate::event::GameEvent], context: &str, out: &mut Vec<String>) {
        use crate::event::GameEvent;
        for event in events {
            match event {
                GameEvent::GoTo { dest, .. } => {
                    if self.location(dest).is_none() {
                        out.push(format!("{context}: GoTo unknown location '{dest}'"));
                    }
                },
                GameEvent::OpenDialog { dialog } => {
                    if self.dialog(dialog).is_none() {
                        out.push(format!("{context}: OpenDialog unknown dialog '{dialog}'"));
                    }
                },
                GameEvent::StartFight { monster } => {
                    if self.monster(monster).is_none() {
                        out.push(format!("{context}: StartFight unknown monster '{monster}'"));
                    }
                },
                GameEvent::GiveItem { item, .. } | GameEvent::TakeItem { item, .. } => {
                    if self.item(item).is_none() {
                        out.push(format!("{context}: unknown item '{item}'"));
                    }
                },
                GameEvent::Compound(inner) => self.check_events(inner, context, out),
                _ => {},
            }
        }
    }
}
