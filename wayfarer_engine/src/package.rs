//! Package loader and conversion helpers.
//!
//! A content package is one RON file, or a directory of RON files merged
//! into a single [`PackageDef`]. Packages are discovered under the data
//! root's `packages/` directory, converted into runtime resources, and
//! merged into one master [`ResourceSet`] in dependency order. A package's
//! declared dependencies are the only packages whose resources it may
//! replace.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

use wayfarer_data::{
    CallbackDef, ConsumeEffectDef, DialogDef, EquipSlotDef, ItemDef, ItemKindDef, LocationDef,
    PackageDef, PackageMeta, WeaponTypeDef, validate_package,
};

use crate::actor::MonsterTemplate;
use crate::event::events_from_defs;
use crate::item::{Attack, ConsumeEffect, EquipSlot, Item, ItemPayload, WeaponType};
use crate::recipe::Recipe;
use crate::resource::{Callback, Dialog, DialogOption, Link, Location, NpcLink, Resource};
use crate::resources::{MergeConflict, ResourceSet};

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("reading package '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing package RON '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("package '{name}' failed validation:\n{details}")]
    Invalid { name: String, details: String },
    #[error("package '{name}' has duplicate resources:\n{details}")]
    Duplicates { name: String, details: String },
}

/// A loaded package: its metadata plus the resources it contributes, each
/// already stamped with the package name. `include` controls whether
/// `build_resources` merges it; everything loads as included.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub author: Option<String>,
    pub version: Option<String>,
    pub dependencies: Vec<String>,
    pub include: bool,
    pub resources: ResourceSet,
}

/// Load one package from a `.ron` file or a directory of `.ron` files.
pub fn load_package(path: &Path) -> Result<Package, PackageError> {
    let name = path
        .file_stem()
        .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().to_string());
    let def = if path.is_dir() {
        load_package_dir(path)?
    } else {
        load_package_def(path)?
    };
    build_package(&name, &def)
}

/// Discover and load every package under `root`. Entries whose name starts
/// with an underscore are skipped; a package that fails to load is reported
/// and skipped rather than aborting the rest.
pub fn load_packages(root: &Path) -> Vec<Package> {
    let mut entries: Vec<PathBuf> = match fs::read_dir(root) {
        Ok(dir) => dir.filter_map(Result::ok).map(|e| e.path()).collect(),
        Err(err) => {
            warn!("cannot read package directory '{}': {err}", root.display());
            return Vec::new();
        },
    };
    entries.sort();

    let mut packages = Vec::new();
    for path in entries {
        let file_name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        if file_name.starts_with('_') {
            continue;
        }
        if !path.is_dir() && path.extension().is_none_or(|ext| ext != "ron") {
            continue;
        }
        match load_package(&path) {
            Ok(package) => {
                info!(
                    "loaded package '{}' v{} ({} resources)",
                    package.name,
                    package.version.as_deref().unwrap_or("?"),
                    package.resources.total()
                );
                packages.push(package);
            },
            Err(err) => warn!("skipping package '{}': {err}", path.display()),
        }
    }
    packages
}

/// Merge every included package into one master set, dependencies first.
/// Each package may only replace resources owned by its declared
/// dependencies; other collisions are returned as conflicts (first owner
/// wins). Excluded packages are skipped entirely.
pub fn build_resources(packages: &[Package]) -> (ResourceSet, Vec<MergeConflict>) {
    let included: Vec<&Package> = packages.iter().filter(|p| p.include).collect();
    for package in packages {
        if !package.include {
            info!("package '{}' is excluded, not merging", package.name);
        }
    }
    let mut master = ResourceSet::new();
    let mut conflicts = Vec::new();
    for package in dependency_order(&included) {
        let merged = master.merge(package.resources.clone(), &package.dependencies);
        for conflict in &merged {
            warn!("package '{}': {conflict}", package.name);
        }
        conflicts.extend(merged);
    }
    for problem in master.dangling_references() {
        warn!("unresolved reference after merge: {problem}");
    }
    (master, conflicts)
}

/// Topological order by declared dependencies. Unknown dependencies are
/// reported and otherwise ignored; a cycle gets a warning and the whole
/// list falls back to its given order.
fn dependency_order<'a>(packages: &[&'a Package]) -> Vec<&'a Package> {
    let by_name: HashMap<&str, &Package> = packages.iter().map(|p| (p.name.as_str(), *p)).collect();
    let mut ordered = Vec::new();
    let mut done: HashSet<&str> = HashSet::new();
    let mut in_progress: HashSet<&str> = HashSet::new();

    fn visit<'a>(
        package: &'a Package,
        by_name: &HashMap<&str, &'a Package>,
        done: &mut HashSet<&'a str>,
        in_progress: &mut HashSet<&'a str>,
        ordered: &mut Vec<&'a Package>,
    ) -> bool {
        if done.contains(package.name.as_str()) {
            return true;
        }
        if !in_progress.insert(&package.name) {
            return false;
        }
        for dep in &package.dependencies {
            match by_name.get(dep.as_str()) {
                Some(dep_package) => {
                    if !visit(dep_package, by_name, done, in_progress, ordered) {
                        return false;
                    }
                },
                None => warn!("package '{}' depends on missing package '{dep}'", package.name),
            }
        }
        in_progress.remove(package.name.as_str());
        done.insert(&package.name);
        ordered.push(package);
        true
    }

    for package in packages {
        if !visit(package, &by_name, &mut done, &mut in_progress, &mut ordered) {
            warn!("dependency cycle involving '{}', merging packages in listed order", package.name);
            return packages.to_vec();
        }
    }
    ordered
}

fn load_package_def(path: &Path) -> Result<PackageDef, PackageError> {
    let text = fs::read_to_string(path).map_err(|source| PackageError::Io {
        path: path.display().to_string(),
        source,
    })?;
    ron::from_str(&text).map_err(|source| PackageError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Merge every non-underscore `.ron` file under the directory, recursively,
/// into one def. Dependencies are unioned; a later author/version wins over
/// an earlier one, with a warning on conflict.
fn load_package_dir(dir: &Path) -> Result<PackageDef, PackageError> {
    let mut files = Vec::new();
    collect_ron_files(dir, &mut files)?;
    files.sort();

    let mut merged = PackageDef::default();
    for file in files {
        let def = load_package_def(&file)?;
        merge_meta(&mut merged.meta, def.meta, &file);
        merged.locations.extend(def.locations);
        merged.dialogs.extend(def.dialogs);
        merged.items.extend(def.items);
        merged.monsters.extend(def.monsters);
        merged.callbacks.extend(def.callbacks);
        merged.recipes.extend(def.recipes);
    }
    Ok(merged)
}

/// Walk a package directory tree, gathering `.ron` files. Entries whose name
/// starts with an underscore are private and skipped, subdirectories included.
fn collect_ron_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), PackageError> {
    let entries = fs::read_dir(dir).map_err(|source| PackageError::Io {
        path: dir.display().to_string(),
        source,
    })?;
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        if path.file_name().is_some_and(|n| n.to_string_lossy().starts_with('_')) {
            continue;
        }
        if path.is_dir() {
            collect_ron_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "ron") {
            files.push(path);
        }
    }
    Ok(())
}

fn merge_meta(into: &mut PackageMeta, from: PackageMeta, file: &Path) {
    if let Some(author) = from.author {
        if into.author.as_ref().is_some_and(|prev| *prev != author) {
            warn!(
                "'{}' redeclares the package author ('{}' replaces '{}')",
                file.display(),
                author,
                into.author.as_deref().unwrap_or_default()
            );
        }
        into.author = Some(author);
    }
    if let Some(version) = from.version {
        if into.version.as_ref().is_some_and(|prev| *prev != version) {
            warn!(
                "'{}' redeclares the package version ('{}' replaces '{}')",
                file.display(),
                version,
                into.version.as_deref().unwrap_or_default()
            );
        }
        into.version = Some(version);
    }
    for dep in from.dependencies {
        if !into.dependencies.contains(&dep) {
            into.dependencies.push(dep);
        }
    }
}

fn build_package(name: &str, def: &PackageDef) -> Result<Package, PackageError> {
    let errors = validate_package(def);
    if !errors.is_empty() {
        let details = errors
            .into_iter()
            .map(|err| format!("- {err}"))
            .collect::<Vec<_>>()
            .join("\n");
        return Err(PackageError::Invalid {
            name: name.to_string(),
            details,
        });
    }

    let mut resources = ResourceSet::new();
    let mut duplicates = Vec::new();
    let all = def
        .locations
        .iter()
        .map(location_from_def)
        .chain(def.dialogs.iter().map(dialog_from_def))
        .chain(def.items.iter().map(|d| Resource::Item(item_from_def(d))))
        .chain(def.monsters.iter().map(|d| Resource::Monster(MonsterTemplate::from_def(d))))
        .chain(def.callbacks.iter().map(callback_from_def))
        .chain(def.recipes.iter().map(|d| Resource::Recipe(Recipe::from_def(d))));
    for resource in all {
        if let Err(dup) = resources.add(resource) {
            duplicates.push(format!("- {dup}"));
        }
    }
    if !duplicates.is_empty() {
        return Err(PackageError::Duplicates {
            name: name.to_string(),
            details: duplicates.join("\n"),
        });
    }
    resources.set_package(name);

    Ok(Package {
        name: name.to_string(),
        author: def.meta.author.clone(),
        version: def.meta.version.clone(),
        dependencies: def.meta.dependencies.clone(),
        include: true,
        resources,
    })
}

// def -> runtime conversions ------------------------------------------------

fn location_from_def(def: &LocationDef) -> Resource {
    let links = |defs: &[wayfarer_data::LinkDef]| {
        defs.iter()
            .map(|l| Link {
                label: l.label.clone(),
                dest: l.dest.clone(),
                minutes: l.minutes,
            })
            .collect()
    };
    Resource::Location(Location {
        id: def.id.clone(),
        title: def.title.clone(),
        text: def.text.clone(),
        travel: links(&def.travel),
        features: links(&def.features),
        npcs: def
            .npcs
            .iter()
            .map(|n| NpcLink {
                label: n.label.clone(),
                dialog: n.dialog.clone(),
            })
            .collect(),
        on_enter: events_from_defs(&def.on_enter),
    })
}

fn dialog_from_def(def: &DialogDef) -> Resource {
    Resource::Dialog(Dialog {
        id: def.id.clone(),
        title: def.title.clone(),
        text: def.text.clone(),
        options: def
            .options
            .iter()
            .map(|o| DialogOption {
                label: o.label.clone(),
                events: events_from_defs(&o.events),
            })
            .collect(),
    })
}

fn callback_from_def(def: &CallbackDef) -> Resource {
    Resource::Callback(Callback {
        id: def.id.clone(),
        events: events_from_defs(&def.events),
    })
}

pub fn item_from_def(def: &ItemDef) -> Item {
    Item {
        id: def.id.clone(),
        name: def.name.clone(),
        value: def.value,
        weight: def.weight,
        stackable: def.stackable,
        payload: payload_from_def(&def.kind),
    }
}

fn payload_from_def(def: &ItemKindDef) -> ItemPayload {
    match def {
        ItemKindDef::Misc => ItemPayload::Misc,
        ItemKindDef::Consumable { effects } => ItemPayload::Consumable {
            effects: effects.iter().map(effect_from_def).collect(),
        },
        ItemKindDef::Weapon {
            weapon_type,
            hand_slots,
            attacks,
            parry,
        } => ItemPayload::Weapon {
            weapon_type: weapon_type_from_def(*weapon_type),
            hand_slots: *hand_slots,
            attacks: attacks.iter().map(attack_from_def).collect(),
            parry: *parry,
        },
        ItemKindDef::Shield {
            hand_slots,
            block,
            attacks,
        } => ItemPayload::Shield {
            hand_slots: *hand_slots,
            block: *block,
            attacks: attacks.iter().map(attack_from_def).collect(),
        },
        ItemKindDef::Armor { slot, damage_reduce } => ItemPayload::Armor {
            slot: slot_from_def(*slot),
            damage_reduce: *damage_reduce,
        },
    }
}

pub fn attack_from_def(def: &wayfarer_data::AttackDef) -> Attack {
    Attack {
        name: def.name.clone(),
        damage: def.damage,
        accuracy: def.accuracy,
    }
}

fn effect_from_def(def: &ConsumeEffectDef) -> ConsumeEffect {
    match def {
        ConsumeEffectDef::Heal(n) => ConsumeEffect::Heal(*n),
        ConsumeEffectDef::RestoreMana(n) => ConsumeEffect::RestoreMana(*n),
        ConsumeEffectDef::RestoreStamina(n) => ConsumeEffect::RestoreStamina(*n),
        ConsumeEffectDef::Damage(n) => ConsumeEffect::Damage(*n),
    }
}

fn weapon_type_from_def(def: WeaponTypeDef) -> WeaponType {
    match def {
        WeaponTypeDef::Dagger => WeaponType::Dagger,
        WeaponTypeDef::ShortSword => WeaponType::ShortSword,
        WeaponTypeDef::LongSword => WeaponType::LongSword,
        WeaponTypeDef::GreatSword => WeaponType::GreatSword,
        WeaponTypeDef::Scimitar => WeaponType::Scimitar,
        WeaponTypeDef::LongBow => WeaponType::LongBow,
        WeaponTypeDef::ShortBow => WeaponType::ShortBow,
        WeaponTypeDef::Spear => WeaponType::Spear,
        WeaponTypeDef::Halberd => WeaponType::Halberd,
        WeaponTypeDef::Whip => WeaponType::Whip,
        WeaponTypeDef::Staff => WeaponType::Staff,
    }
}

fn slot_from_def(def: EquipSlotDef) -> EquipSlot {
    match def {
        EquipSlotDef::Helmet => EquipSlot::Helmet,
        EquipSlotDef::Eyes => EquipSlot::Eyes,
        EquipSlotDef::Neck => EquipSlot::Neck,
        EquipSlotDef::Chest => EquipSlot::Chest,
        EquipSlotDef::Coat => EquipSlot::Coat,
        EquipSlotDef::Undershirt => EquipSlot::Undershirt,
        EquipSlotDef::Waist => EquipSlot::Waist,
        EquipSlotDef::Legs => EquipSlot::Legs,
        EquipSlotDef::Pants => EquipSlot::Pants,
        EquipSlotDef::Skirt => EquipSlot::Skirt,
        EquipSlotDef::Feet => EquipSlot::Feet,
        EquipSlotDef::Hands => EquipSlot::Hands,
        EquipSlotDef::Back => EquipSlot::Back,
        EquipSlotDef::Quiver => EquipSlot::Quiver,
        EquipSlotDef::Ring => EquipSlot::Ring,
        EquipSlotDef::Held => EquipSlot::Held,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceKind;
    use std::io::Write;
    use tempfile::tempdir;

    const MINI_PACKAGE: &str = r#"(
        meta: (version: Some("0.1"), dependencies: []),
        locations: [
            (
                id: "town",
                title: "Town Square",
                text: "Cobblestones and noise.",
                travel: [(label: "Market", dest: "market", minutes: 5)],
            ),
            (id: "market", title: "Market", text: "Stalls everywhere."),
        ],
        items: [
            (id: "misc.ore.copper", name: "Copper Ore", value: 2, weight: 3.0),
        ],
        callbacks: [
            (id: "start", events: [GoTo(dest: "town")]),
        ],
    )"#;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn load_single_file_package() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "base.ron", MINI_PACKAGE);
        let package = load_package(&path).unwrap();
        assert_eq!(package.name, "base");
        assert_eq!(package.version.as_deref(), Some("0.1"));
        assert_eq!(package.resources.count(ResourceKind::Location), 2);
        assert_eq!(package.resources.owner(ResourceKind::Location, "town"), Some("base"));
    }

    #[test]
    fn load_directory_package_merges_files() {
        let dir = tempdir().unwrap();
        let pkg_dir = dir.path().join("base");
        fs::create_dir(&pkg_dir).unwrap();
        write_file(
            &pkg_dir,
            "places.ron",
            r#"(locations: [(id: "town", title: "Town", text: "")])"#,
        );
        write_file(
            &pkg_dir,
            "wares.ron",
            r#"(
                meta: (version: Some("0.2")),
                items: [(id: "misc.ore.tin", name: "Tin Ore", value: 3, weight: 3.0)],
            )"#,
        );
        write_file(&pkg_dir, "_notes.ron", "this is not even RON");

        let package = load_package(&pkg_dir).unwrap();
        assert_eq!(package.version.as_deref(), Some("0.2"));
        assert_eq!(package.resources.count(ResourceKind::Location), 1);
        assert_eq!(package.resources.count(ResourceKind::Item), 1);
    }

    #[test]
    fn broken_packages_are_skipped_not_fatal() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "base.ron", MINI_PACKAGE);
        write_file(dir.path(), "broken.ron", "(locations: [(id: ");
        write_file(dir.path(), "_disabled.ron", MINI_PACKAGE);

        let packages = load_packages(dir.path());
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "base");
    }

    #[test]
    fn invalid_package_reports_all_errors() {
        let dir = tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "bad.ron",
            r#"(
                locations: [
                    (id: "town", title: "A", text: ""),
                    (id: "town", title: "B", text: ""),
                ],
            )"#,
        );
        let err = load_package(&path).unwrap_err();
        assert!(matches!(err, PackageError::Invalid { .. }));
    }

    #[test]
    fn build_resources_respects_dependency_order_and_masters() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "base.ron", MINI_PACKAGE);
        write_file(
            dir.path(),
            "expansion.ron",
            r#"(
                meta: (dependencies: ["base"]),
                locations: [(id: "town", title: "Grand Town Square", text: "Rebuilt.")],
            )"#,
        );
        write_file(
            dir.path(),
            "rogue.ron",
            r#"(
                locations: [(id: "market", title: "Counterfeit Market", text: "")],
            )"#,
        );

        let packages = load_packages(dir.path());
        assert_eq!(packages.len(), 3);
        let (master, conflicts) = build_resources(&packages);

        // expansion declared base as a dependency, so its override lands
        assert_eq!(master.location("town").unwrap().title, "Grand Town Square");
        // rogue declared nothing, so base's market survives and conflicts
        assert_eq!(master.location("market").unwrap().title, "Market");
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].id, "market");
    }

    #[test]
    fn nested_directories_contribute_resources() {
        let dir = tempdir().unwrap();
        let pkg_dir = dir.path().join("base");
        let sub_dir = pkg_dir.join("region_two");
        fs::create_dir_all(&sub_dir).unwrap();
        write_file(
            &pkg_dir,
            "top.ron",
            r#"(locations: [(id: "town", title: "Town", text: "")])"#,
        );
        write_file(
            &sub_dir,
            "extra.ron",
            r#"(locations: [(id: "cavern", title: "Cavern", text: "")])"#,
        );
        write_file(&sub_dir, "_draft.ron", "not ron at all");

        let package = load_package(&pkg_dir).unwrap();
        assert_eq!(package.resources.count(ResourceKind::Location), 2);
        assert!(package.resources.location("cavern").is_some());
    }

    #[test]
    fn later_file_wins_on_meta_conflict() {
        let dir = tempdir().unwrap();
        let pkg_dir = dir.path().join("base");
        fs::create_dir(&pkg_dir).unwrap();
        write_file(
            &pkg_dir,
            "a.ron",
            r#"(meta: (author: Some("Early"), version: Some("0.1")))"#,
        );
        write_file(
            &pkg_dir,
            "b.ron",
            r#"(meta: (author: Some("Late"), version: Some("0.2")))"#,
        );

        let package = load_package(&pkg_dir).unwrap();
        assert_eq!(package.author.as_deref(), Some("Late"));
        assert_eq!(package.version.as_deref(), Some("0.2"));
    }

    #[test]
    fn dependency_cycle_falls_back_to_listed_order() {
        let def = |dep: &str, loc_title: &str| -> PackageDef {
            ron::from_str(&format!(
                r#"(
                    meta: (dependencies: ["{dep}"]),
                    locations: [(id: "town", title: "{loc_title}", text: "")],
                )"#
            ))
            .unwrap()
        };
        let a = build_package("a", &def("b", "Town of A")).unwrap();
        let b = build_package("b", &def("a", "Town of B")).unwrap();

        let (master, _) = build_resources(&[a, b]);
        // listed order: a merges first, b replaces it (a is b's dependency)
        assert_eq!(master.location("town").unwrap().title, "Town of B");
    }

    #[test]
    fn excluded_packages_are_not_merged() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "base.ron", MINI_PACKAGE);
        write_file(
            dir.path(),
            "extra.ron",
            r#"(locations: [(id: "dock", title: "Dock", text: "")])"#,
        );

        let mut packages = load_packages(dir.path());
        packages
            .iter_mut()
            .find(|p| p.name == "extra")
            .unwrap()
            .include = false;

        let (master, _) = build_resources(&packages);
        assert!(master.location("town").is_some());
        assert!(master.location("dock").is_none());
    }
}
