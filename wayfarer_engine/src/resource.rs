//! Resource Module
//!
//! A resource is any content entity loadable from a package: locations,
//! dialogs, items, monster templates, callbacks, recipes. Every resource has
//! a kind tag and a unique string id within that kind; after registration it
//! also knows which package contributed it.

use crate::actor::MonsterTemplate;
use crate::event::GameEvent;
use crate::item::Item;
use crate::options::{MenuOption, OptionList};
use crate::recipe::Recipe;
use variantly::Variantly;

/// Tag denoting the type of a resource. The registry keeps one id map per
/// kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Location,
    Dialog,
    Item,
    Monster,
    Callback,
    Recipe,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Location,
        ResourceKind::Dialog,
        ResourceKind::Item,
        ResourceKind::Monster,
        ResourceKind::Callback,
        ResourceKind::Recipe,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Location => "location",
            ResourceKind::Dialog => "dialog",
            ResourceKind::Item => "item",
            ResourceKind::Monster => "monster",
            ResourceKind::Callback => "callback",
            ResourceKind::Recipe => "recipe",
        }
    }
}

/// A labeled travel link to another location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub label: String,
    pub dest: String,
    pub minutes: u32,
}

/// A labeled link from a location to an NPC dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpcLink {
    pub label: String,
    pub dialog: String,
}

/// A place the player can be.
///
/// Travel links cost in-game minutes; features are sub-locations reachable
/// at little or no cost; NPC links open dialogs. `on_enter` events run every
/// arrival before display, and may redirect elsewhere (the original use is
/// forcing an introduction dialog on first visit).
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub id: String,
    pub title: String,
    pub text: String,
    pub travel: Vec<Link>,
    pub features: Vec<Link>,
    pub npcs: Vec<NpcLink>,
    pub on_enter: Vec<GameEvent>,
}

impl Location {
    /// Build the standard option menu for this location: a Travel submenu,
    /// a Visit submenu for features, and a Talk submenu for NPCs. Link
    /// groups that are empty contribute no entry.
    pub fn options(&self) -> OptionList {
        let mut entries = Vec::new();
        if !self.travel.is_empty() {
            entries.push(MenuOption::new(
                "Travel",
                GameEvent::SetOptions(link_menu(&self.travel)),
            ));
        }
        if !self.features.is_empty() {
            entries.push(MenuOption::new(
                "Visit",
                GameEvent::SetOptions(link_menu(&self.features)),
            ));
        }
        if !self.npcs.is_empty() {
            let npc_entries = self
                .npcs
                .iter()
                .map(|npc| {
                    MenuOption::new(
                        npc.label.clone(),
                        GameEvent::OpenDialog {
                            dialog: npc.dialog.clone(),
                        },
                    )
                })
                .collect();
            entries.push(MenuOption::new(
                "Talk",
                GameEvent::SetOptions(OptionList::paged(npc_entries)),
            ));
        }
        OptionList::new(entries)
    }
}

fn link_menu(links: &[Link]) -> OptionList {
    let entries = links
        .iter()
        .map(|link| {
            MenuOption::new(
                link.label.clone(),
                GameEvent::GoTo {
                    dest: link.dest.clone(),
                    minutes: link.minutes,
                },
            )
        })
        .collect();
    OptionList::paged(entries)
}

/// One selectable choice within a dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogOption {
    pub label: String,
    pub events: Vec<GameEvent>,
}

/// Narration or conversation displayed in place of a location.
#[derive(Debug, Clone, PartialEq)]
pub struct Dialog {
    pub id: String,
    pub title: String,
    pub text: String,
    pub options: Vec<DialogOption>,
}

impl Dialog {
    pub fn options(&self) -> OptionList {
        let entries = self
            .options
            .iter()
            .map(|opt| {
                let event = match opt.events.len() {
                    0 => GameEvent::EndDialog,
                    1 => opt.events[0].clone(),
                    _ => GameEvent::Compound(opt.events.clone()),
                };
                MenuOption::new(opt.label.clone(), event)
            })
            .collect();
        OptionList::paged(entries)
    }
}

/// Events applied when a new game starts. Some start callback must set the
/// initial location.
#[derive(Debug, Clone, PartialEq)]
pub struct Callback {
    pub id: String,
    pub events: Vec<GameEvent>,
}

/// Any content entity loadable from a package.
#[derive(Debug, Clone, Variantly)]
pub enum Resource {
    Location(Location),
    Dialog(Dialog),
    Item(Item),
    Monster(MonsterTemplate),
    Callback(Callback),
    Recipe(Recipe),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Location(_) => ResourceKind::Location,
            Resource::Dialog(_) => ResourceKind::Dialog,
            Resource::Item(_) => ResourceKind::Item,
            Resource::Monster(_) => ResourceKind::Monster,
            Resource::Callback(_) => ResourceKind::Callback,
            Resource::Recipe(_) => ResourceKind::Recipe,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Resource::Location(l) => &l.id,
            Resource::Dialog(d) => &d.id,
            Resource::Item(i) => &i.id,
            Resource::Monster(m) => &m.id,
            Resource::Callback(c) => &c.id,
            Resource::Recipe(r) => &r.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn town() -> Location {
        Location {
            id: "prologue.town_square".into(),
            title: "Town Square".into(),
            text: "This is the Town Square".into(),
            travel: vec![Link {
                label: "Market".into(),
                dest: "prologue.market".into(),
                minutes: 5,
            }],
            features: Vec::new(),
            npcs: vec![NpcLink {
                label: "Old Man".into(),
                dialog: "prologue.old_man".into(),
            }],
            on_enter: Vec::new(),
        }
    }

    #[test]
    fn location_options_have_travel_and_talk() {
        let opts = town().options();
        let labels: Vec<_> = opts.selectable().iter().map(|o| o.label.clone()).collect();
        assert_eq!(labels, vec!["Travel", "Talk"]);
    }

    #[test]
    fn travel_submenu_holds_goto_events() {
        let opts = town().options();
        let travel = opts.selectable()[0].event.clone();
        let GameEvent::SetOptions(submenu) = travel else {
            panic!("expected SetOptions, got {travel:?}");
        };
        assert_eq!(
            submenu.selectable()[0].event,
            GameEvent::GoTo {
                dest: "prologue.market".into(),
                minutes: 5,
            }
        );
    }

    #[test]
    fn empty_link_groups_make_no_entries() {
        let mut loc = town();
        loc.travel.clear();
        loc.npcs.clear();
        assert!(loc.options().is_empty());
    }

    #[test]
    fn dialog_options_wrap_event_lists() {
        let dialog = Dialog {
            id: "prologue.old_man".into(),
            title: "Old Man".into(),
            text: "\"Hello there.\"".into(),
            options: vec![
                DialogOption {
                    label: "Goodbye".into(),
                    events: Vec::new(),
                },
                DialogOption {
                    label: "Take the sword".into(),
                    events: vec![
                        GameEvent::GiveItem {
                            item: "weapon.short_sword_bronze".into(),
                            count: 1,
                        },
                        GameEvent::EndDialog,
                    ],
                },
            ],
        };
        let opts = dialog.options();
        assert_eq!(opts.selectable()[0].event, GameEvent::EndDialog);
        assert!(matches!(opts.selectable()[1].event, GameEvent::Compound(ref evs) if evs.len() == 2));
    }

    #[test]
    fn resource_kind_and_id() {
        let res = Resource::Location(town());
        assert_eq!(res.kind(), ResourceKind::Location);
        assert_eq!(res.id(), "prologue.town_square");
        assert!(res.is_location());
        assert!(res.location_ref().is_some());
        assert!(res.dialog_ref().is_none());
    }
}
