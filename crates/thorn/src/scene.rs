//! # Scene: JSON Save and Load
//!
//! A scene document is a list of entity nodes. Each node carries the entity's
//! [`Guid`], an optional local transform with the parent's guid, and any
//! registered components keyed by short type name:
//!
//! ```json
//! { "entities": [
//!     { "guid": 7,
//!       "transform": { "position": [1.0, 2.0], "scale": [1.0, 1.0], "rotation": 0.0, "parent": 3 },
//!       "components": { "Label": "door" } } ] }
//! ```
//!
//! Parents are always written as guids, never as handles, because handles do
//! not survive a reload.
//!
//! ## Loading
//!
//! Loading is split in two so a bad document never half-populates a world:
//!
//! 1. [`SceneRegistry::decode`] validates the whole document and deserializes
//!    every component without touching the world.
//! 2. [`DecodedScene::commit`] creates the entities, binds their guids, and
//!    only then resolves parent guids. Document order does not need to be
//!    topological. A parent guid that resolves to nothing leaves the entity
//!    as a root.
//!
//! Transform fields are read leniently: a missing field takes its default,
//! a malformed one takes its default and logs a warning.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::ecs::component::Component;
use crate::ecs::world::short_type_name;
use crate::ecs::{Entity, Guid, World};
use crate::math::{Transform, Vec2};

pub const DEFAULT_POSITION: [f32; 2] = [0.0, 0.0];
pub const DEFAULT_SCALE: [f32; 2] = [1.0, 1.0];
pub const DEFAULT_ROTATION: f32 = 0.0;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("scene file i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("scene document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("guid {0} appears more than once in the scene")]
    DuplicateGuid(Guid),

    #[error("guid {0} is above the largest usable guid {max}", max = Guid::MAX)]
    GuidOutOfRange(Guid),
}

// ── SceneRegistry ────────────────────────────────────────────────────────

type SerializeFn = fn(&World, Entity) -> Option<Value>;
type DeserializeFn = fn(Value) -> Option<Box<dyn Any + Send + Sync>>;
type InsertFn = fn(&mut World, Entity, Box<dyn Any + Send + Sync>);

struct ComponentFns {
    serialize: SerializeFn,
    deserialize: DeserializeFn,
    insert: InsertFn,
    default_fn: Option<Box<dyn Fn() -> Value>>,
    short_name: &'static str,
}

/// The set of component types that take part in save and load.
///
/// [`Transform`] and the hierarchy links are always handled by the scene
/// itself and cannot be registered.
pub struct SceneRegistry {
    by_type_id: HashMap<TypeId, ComponentFns>,
    by_name: HashMap<&'static str, TypeId>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self {
            by_type_id: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn register<T>(&mut self)
    where
        T: Component + Serialize + DeserializeOwned,
    {
        self.register_fns::<T>(None);
    }

    /// Registers `T` and remembers `default` for [`default_value`](Self::default_value).
    pub fn register_with_default<T>(&mut self, default: T)
    where
        T: Component + Serialize + DeserializeOwned,
    {
        let default_fn: Box<dyn Fn() -> Value> =
            Box::new(move || serde_json::to_value(&default).unwrap_or(Value::Null));
        self.register_fns::<T>(Some(default_fn));
    }

    fn register_fns<T>(&mut self, default_fn: Option<Box<dyn Fn() -> Value>>)
    where
        T: Component + Serialize + DeserializeOwned,
    {
        let type_id = TypeId::of::<T>();
        if type_id == TypeId::of::<Transform>() {
            log::warn!("Transform is saved by the scene itself; registration ignored");
            return;
        }
        let short_name = short_type_name(std::any::type_name::<T>());
        let fns = ComponentFns {
            serialize: |world, entity| {
                let value = world.get::<T>(entity)?;
                serde_json::to_value(value).ok()
            },
            deserialize: |json| {
                let value: T = serde_json::from_value(json).ok()?;
                Some(Box::new(value))
            },
            insert: |world, entity, boxed| {
                if let Ok(value) = boxed.downcast::<T>() {
                    world.insert_unchecked(entity, *value);
                }
            },
            default_fn,
            short_name,
        };
        if let Some(previous) = self.by_name.insert(short_name, type_id)
            && previous != type_id
        {
            self.by_type_id.remove(&previous);
            log::warn!("component name `{short_name}` registered twice; the later type wins");
        }
        self.by_type_id.insert(type_id, fns);
    }

    /// Registered component names, sorted.
    pub fn component_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn default_value(&self, name: &str) -> Option<Value> {
        let type_id = self.by_name.get(name)?;
        let default_fn = self.by_type_id.get(type_id)?.default_fn.as_ref()?;
        Some(default_fn())
    }

    fn serialize_components(&self, world: &World, entity: Entity) -> BTreeMap<String, Value> {
        self.by_type_id
            .values()
            .filter_map(|fns| {
                let value = (fns.serialize)(world, entity)?;
                Some((fns.short_name.to_string(), value))
            })
            .collect()
    }

    /// First load phase: validates `data` and deserializes every component.
    /// The world is not touched.
    pub fn decode(&self, data: &SceneData) -> Result<DecodedScene, SceneError> {
        let mut seen = HashSet::with_capacity(data.entities.len());
        let mut entities = Vec::with_capacity(data.entities.len());
        for node in &data.entities {
            if node.guid > Guid::MAX {
                return Err(SceneError::GuidOutOfRange(node.guid));
            }
            if !seen.insert(node.guid) {
                return Err(SceneError::DuplicateGuid(node.guid));
            }
            let mut components = Vec::with_capacity(node.components.len());
            for (name, json) in &node.components {
                let Some(fns) = self
                    .by_name
                    .get(name.as_str())
                    .and_then(|type_id| self.by_type_id.get(type_id))
                else {
                    log::debug!("skipping unknown component `{name}` on {}", node.guid);
                    continue;
                };
                match (fns.deserialize)(json.clone()) {
                    Some(value) => components.push(DecodedComponent {
                        value,
                        insert: fns.insert,
                    }),
                    None => log::warn!("component `{name}` on {} is malformed; skipped", node.guid),
                }
            }
            entities.push(DecodedEntity {
                guid: node.guid,
                transform: node.transform.as_ref().map(TransformNode::to_transform),
                parent: node.transform.as_ref().and_then(|transform| transform.parent),
                components,
            });
        }
        Ok(DecodedScene { entities })
    }

    pub fn save(&self, world: &World) -> SceneData {
        save_scene(world, self)
    }

    pub fn load(&self, world: &mut World, data: &SceneData) -> Result<Vec<Entity>, SceneError> {
        load_scene(world, self, data)
    }

    pub fn save_to_file(&self, world: &World, path: impl AsRef<Path>) -> Result<(), SceneError> {
        save_scene_to_file(world, self, path)
    }

    pub fn load_from_file(
        &self,
        world: &mut World,
        path: impl AsRef<Path>,
    ) -> Result<Vec<Entity>, SceneError> {
        load_scene_from_file(world, self, path)
    }
}

impl Default for SceneRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ── Document ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneData {
    pub entities: Vec<SceneEntity>,
}

impl SceneData {
    pub fn from_json(text: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEntity {
    pub guid: Guid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<TransformNode>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub components: BTreeMap<String, Value>,
}

/// On-disk form of a local transform plus its parent's guid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransformNode {
    pub position: [f32; 2],
    pub scale: [f32; 2],
    pub rotation: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Guid>,
}

impl TransformNode {
    pub fn from_transform(transform: &Transform, parent: Option<Guid>) -> Self {
        Self {
            position: transform.position.to_array(),
            scale: transform.scale.to_array(),
            rotation: transform.rotation,
            parent,
        }
    }

    pub fn to_transform(&self) -> Transform {
        Transform::new(
            Vec2::from(self.position),
            Vec2::from(self.scale),
            self.rotation,
        )
    }

    fn from_value(value: &Value) -> Self {
        let Some(node) = value.as_object() else {
            log::warn!("transform block is not an object; using defaults");
            return Self::default();
        };
        Self {
            position: read_pair(node.get("position"), DEFAULT_POSITION, "position"),
            scale: read_pair(node.get("scale"), DEFAULT_SCALE, "scale"),
            rotation: read_number(node.get("rotation"), DEFAULT_ROTATION, "rotation"),
            parent: read_guid(node.get("parent")),
        }
    }
}

impl Default for TransformNode {
    fn default() -> Self {
        Self {
            position: DEFAULT_POSITION,
            scale: DEFAULT_SCALE,
            rotation: DEFAULT_ROTATION,
            parent: None,
        }
    }
}

impl<'de> Deserialize<'de> for TransformNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

fn read_pair(field: Option<&Value>, default: [f32; 2], name: &str) -> [f32; 2] {
    let Some(value) = field else {
        return default;
    };
    if let Some([x, y]) = value.as_array().map(Vec::as_slice)
        && let (Some(x), Some(y)) = (x.as_f64(), y.as_f64())
    {
        return [x as f32, y as f32];
    }
    log::warn!("malformed transform field `{name}`: {value}; using {default:?}");
    default
}

fn read_number(field: Option<&Value>, default: f32, name: &str) -> f32 {
    let Some(value) = field else {
        return default;
    };
    match value.as_f64() {
        Some(number) => number as f32,
        None => {
            log::warn!("malformed transform field `{name}`: {value}; using {default}");
            default
        }
    }
}

/// Parent ids are accepted as integers or as strings holding an integer.
fn read_guid(field: Option<&Value>) -> Option<Guid> {
    let value = field?;
    let parsed = match value {
        Value::Null => return None,
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    if parsed.is_none() {
        log::warn!("malformed parent id {value}; entity loads as a root");
    }
    parsed.map(Guid)
}

// ── Decoded scene ────────────────────────────────────────────────────────

struct DecodedComponent {
    value: Box<dyn Any + Send + Sync>,
    insert: InsertFn,
}

struct DecodedEntity {
    guid: Guid,
    transform: Option<Transform>,
    parent: Option<Guid>,
    components: Vec<DecodedComponent>,
}

/// A fully validated scene, ready to be committed to a world.
pub struct DecodedScene {
    entities: Vec<DecodedEntity>,
}

impl DecodedScene {
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Second load phase: creates every entity, then resolves parents.
    ///
    /// Returns the created entities in document order.
    pub fn commit(self, world: &mut World) -> Vec<Entity> {
        let mut created = Vec::with_capacity(self.entities.len());
        let mut pending_parents = Vec::new();

        for decoded in self.entities {
            let entity = world.create_entity();
            world.bind_guid(entity, decoded.guid);
            if let Some(transform) = decoded.transform {
                world.insert_unchecked(entity, transform);
            }
            for component in decoded.components {
                (component.insert)(world, entity, component.value);
            }
            if let Some(parent) = decoded.parent {
                pending_parents.push((entity, decoded.guid, parent));
            }
            created.push(entity);
        }

        let mut orphans = 0;
        for (entity, guid, parent_guid) in pending_parents {
            let linked = world
                .resolve(parent_guid)
                .and_then(|parent| world.set_parent(entity, Some(parent)));
            if let Err(err) = linked {
                orphans += 1;
                log::warn!("entity {guid} loaded as a root: parent {parent_guid} unusable ({err})");
            }
        }
        log::debug!("committed {} entities ({orphans} orphaned)", created.len());
        created
    }
}

// ── Save / load ──────────────────────────────────────────────────────────

/// Snapshot of every live entity, ordered by guid.
pub fn save_scene(world: &World, registry: &SceneRegistry) -> SceneData {
    let mut live: Vec<(Guid, Entity)> = world
        .entities()
        .into_iter()
        .filter_map(|entity| world.guid_of(entity).map(|guid| (guid, entity)))
        .collect();
    live.sort_unstable_by_key(|&(guid, _)| guid);

    let entities = live
        .into_iter()
        .map(|(guid, entity)| SceneEntity {
            guid,
            transform: world.get::<Transform>(entity).map(|transform| {
                let parent = world.parent_of(entity).and_then(|parent| world.guid_of(parent));
                TransformNode::from_transform(transform, parent)
            }),
            components: registry.serialize_components(world, entity),
        })
        .collect();
    SceneData { entities }
}

/// Adds the entities of `data` to `world`. Nothing is created if the
/// document fails validation.
pub fn load_scene(
    world: &mut World,
    registry: &SceneRegistry,
    data: &SceneData,
) -> Result<Vec<Entity>, SceneError> {
    Ok(registry.decode(data)?.commit(world))
}

pub fn read_scene_file(path: impl AsRef<Path>) -> Result<SceneData, SceneError> {
    let text = fs::read_to_string(path)?;
    SceneData::from_json(&text)
}

/// Writes the scene next to `path` first and renames it into place, so a
/// failed save never truncates the previous file.
pub fn save_scene_to_file(
    world: &World,
    registry: &SceneRegistry,
    path: impl AsRef<Path>,
) -> Result<(), SceneError> {
    let path = path.as_ref();
    let json = save_scene(world, registry).to_json()?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut staging = NamedTempFile::new_in(dir)?;
    staging.write_all(json.as_bytes())?;
    staging.as_file().sync_all()?;
    staging.persist(path).map_err(|err| err.error)?;
    Ok(())
}

pub fn load_scene_from_file(
    world: &mut World,
    registry: &SceneRegistry,
    path: impl AsRef<Path>,
) -> Result<Vec<Entity>, SceneError> {
    let data = read_scene_file(path)?;
    load_scene(world, registry, &data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Label(String);

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Speed {
        value: f32,
    }

    fn registry() -> SceneRegistry {
        let mut registry = SceneRegistry::new();
        registry.register::<Label>();
        registry.register_with_default(Speed { value: 1.0 });
        registry
    }

    fn assert_same_transform(a: Transform, b: Transform) {
        assert_abs_diff_eq!(a.position.x, b.position.x, epsilon = 1e-6);
        assert_abs_diff_eq!(a.position.y, b.position.y, epsilon = 1e-6);
        assert_abs_diff_eq!(a.scale.x, b.scale.x, epsilon = 1e-6);
        assert_abs_diff_eq!(a.scale.y, b.scale.y, epsilon = 1e-6);
        assert_abs_diff_eq!(a.rotation, b.rotation, epsilon = 1e-6);
    }

    fn parent_guid(world: &World, entity: Entity) -> Option<Guid> {
        world.parent_of(entity).and_then(|parent| world.guid_of(parent))
    }

    #[test]
    fn round_trip_preserves_forest_and_locals() {
        let registry = registry();
        let mut source = World::new();
        let a = source.spawn((
            Transform::new(Vec2::new(1.5, -2.25), Vec2::new(2.0, 0.5), 33.0),
            Label("a".into()),
        ));
        let b = source.spawn((Transform::from_xy(0.1, 0.2).with_rotation(-170.0),));
        let c = source.spawn((Transform::from_xy(-7.0, 3.0), Speed { value: 4.5 }));
        let d = source.spawn((Transform::IDENTITY,));
        let bare = source.spawn((Label("no transform".into()),));
        source.set_parent(b, Some(a)).unwrap();
        source.set_parent(c, Some(b)).unwrap();

        let text = registry.save(&source).to_json().unwrap();
        let mut target = World::new();
        let loaded = registry.load(&mut target, &SceneData::from_json(&text).unwrap()).unwrap();
        assert_eq!(loaded.len(), 5);

        for original in [a, b, c, d] {
            let guid = source.guid_of(original).unwrap();
            let copy = target.resolve(guid).unwrap();
            assert_same_transform(
                target.local_transform(copy).unwrap(),
                source.local_transform(original).unwrap(),
            );
            assert_eq!(parent_guid(&target, copy), parent_guid(&source, original));
            assert_eq!(target.level_of(copy), source.level_of(original));
        }
        let bare_copy = target.resolve(source.guid_of(bare).unwrap()).unwrap();
        assert_eq!(target.get::<Label>(bare_copy), Some(&Label("no transform".into())));
        assert!(!target.has::<Transform>(bare_copy));
        let c_copy = target.resolve(source.guid_of(c).unwrap()).unwrap();
        assert_eq!(target.get::<Speed>(c_copy), Some(&Speed { value: 4.5 }));
    }

    #[test]
    fn roots_omit_parent_field() {
        let registry = registry();
        let mut world = World::new();
        let root = world.spawn((Transform::IDENTITY,));
        let child = world.spawn((Transform::IDENTITY,));
        world.set_parent(child, Some(root)).unwrap();

        let json: Value = serde_json::from_str(&registry.save(&world).to_json().unwrap()).unwrap();
        let nodes = json["entities"].as_array().unwrap();
        assert!(nodes[0]["transform"].get("parent").is_none());
        assert_eq!(
            nodes[1]["transform"]["parent"],
            serde_json::json!(world.guid_of(root).unwrap().value())
        );
    }

    #[test]
    fn destroyed_parent_is_not_saved() {
        let mut world = World::new();
        let root = world.spawn((Transform::IDENTITY,));
        let child = world.spawn((Transform::IDENTITY,));
        world.set_parent(child, Some(root)).unwrap();
        world.destroy_entity(root);

        let data = save_scene(&world, &SceneRegistry::new());
        assert_eq!(data.entities.len(), 1);
        assert_eq!(data.entities[0].transform.unwrap().parent, None);
    }

    #[test]
    fn missing_parent_loads_as_root() {
        let text = r#"{ "entities": [
            { "guid": 1, "transform": { "position": [4.0, 0.0], "parent": 999 } }
        ] }"#;
        let mut world = World::new();
        let loaded = load_scene(&mut world, &registry(), &SceneData::from_json(text).unwrap()).unwrap();
        assert_eq!(world.parent_of(loaded[0]), None);
        assert_eq!(world.level_of(loaded[0]), Ok(0));
        assert_eq!(world.guid_of(loaded[0]), Some(Guid(1)));
    }

    #[test]
    fn children_may_precede_parents() {
        let text = r#"{ "entities": [
            { "guid": 3, "transform": { "parent": 2 } },
            { "guid": 2, "transform": { "parent": "1" } },
            { "guid": 1, "transform": { "position": [0.0, 5.0] } }
        ] }"#;
        let mut world = World::new();
        load_scene(&mut world, &registry(), &SceneData::from_json(text).unwrap()).unwrap();
        let leaf = world.resolve(Guid(3)).unwrap();
        assert_eq!(parent_guid(&world, leaf), Some(Guid(2)));
        assert_eq!(world.level_of(leaf), Ok(2));
        assert_eq!(world.level_of(world.resolve(Guid(1)).unwrap()), Ok(0));
    }

    #[test]
    fn missing_and_malformed_fields_take_defaults() {
        let text = r#"{ "entities": [
            { "guid": 1, "transform": {} },
            { "guid": 2, "transform": { "position": "left", "scale": [3.0], "rotation": "half", "parent": [1] } }
        ] }"#;
        let mut world = World::new();
        let loaded = load_scene(&mut world, &registry(), &SceneData::from_json(text).unwrap()).unwrap();
        for entity in loaded {
            assert_eq!(world.local_transform(entity), Ok(Transform::IDENTITY));
            assert_eq!(world.parent_of(entity), None);
        }
    }

    #[test]
    fn duplicate_guid_leaves_world_untouched() {
        let text = r#"{ "entities": [ { "guid": 4 }, { "guid": 4 } ] }"#;
        let mut world = World::new();
        let existing = world.create_entity();
        let result = load_scene(&mut world, &registry(), &SceneData::from_json(text).unwrap());
        assert!(matches!(result, Err(SceneError::DuplicateGuid(Guid(4)))));
        assert_eq!(world.entities(), vec![existing]);
    }

    #[test]
    fn guid_at_the_counter_ceiling_is_rejected() {
        let text = r#"{ "entities": [
            { "guid": 18446744073709551615, "transform": {} },
            { "guid": 1, "transform": { "parent": 18446744073709551615 } }
        ] }"#;
        let mut world = World::new();
        let existing = world.create_entity();
        let result = load_scene(&mut world, &registry(), &SceneData::from_json(text).unwrap());
        assert!(matches!(result, Err(SceneError::GuidOutOfRange(Guid(u64::MAX)))));
        assert_eq!(world.entities(), vec![existing]);
    }

    #[test]
    fn largest_usable_guid_loads_and_later_entities_still_spawn() {
        let text = format!(
            r#"{{ "entities": [
                {{ "guid": {max}, "transform": {{}} }},
                {{ "guid": 1, "transform": {{ "parent": {max} }} }}
            ] }}"#,
            max = Guid::MAX.value()
        );
        let mut world = World::new();
        load_scene(&mut world, &registry(), &SceneData::from_json(&text).unwrap()).unwrap();
        let top = world.resolve(Guid::MAX).unwrap();
        let child = world.resolve(Guid(1)).unwrap();
        assert_eq!(world.parent_of(child), Some(top));

        let late = world.create_entity();
        assert!(world.is_alive(late));
        assert_eq!(world.guid_of(late), None);
        assert_eq!(world.resolve(Guid::MAX), Ok(top));
    }

    #[test]
    fn unknown_and_malformed_components_are_skipped() {
        let text = r#"{ "entities": [
            { "guid": 1, "components": { "Label": "ok", "Mystery": 12, "Speed": "fast" } }
        ] }"#;
        let mut world = World::new();
        let loaded = load_scene(&mut world, &registry(), &SceneData::from_json(text).unwrap()).unwrap();
        assert_eq!(world.get::<Label>(loaded[0]), Some(&Label("ok".into())));
        assert!(!world.has::<Speed>(loaded[0]));
    }

    #[test]
    fn cyclic_document_still_loads_as_forest() {
        let text = r#"{ "entities": [
            { "guid": 1, "transform": { "parent": 2 } },
            { "guid": 2, "transform": { "parent": 1 } }
        ] }"#;
        let mut world = World::new();
        let loaded = load_scene(&mut world, &registry(), &SceneData::from_json(text).unwrap()).unwrap();
        let roots = loaded.iter().filter(|&&e| world.parent_of(e).is_none()).count();
        assert_eq!(roots, 1);
    }

    #[test]
    fn loaded_guids_push_the_counter_forward() {
        let text = r#"{ "entities": [ { "guid": 41 } ] }"#;
        let mut world = World::new();
        load_scene(&mut world, &registry(), &SceneData::from_json(text).unwrap()).unwrap();
        let fresh = world.create_entity();
        assert!(world.guid_of(fresh).unwrap() > Guid(41));
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(SceneData::from_json("{ nope"), Err(SceneError::Json(_))));
    }

    #[test]
    fn file_round_trip() {
        let registry = registry();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.json");

        let mut world = World::new();
        let parent = world.spawn((Transform::from_xy(0.0, 5.0), Label("parent".into())));
        let child = world.spawn((Transform::from_xy(2.0, 0.0),));
        world.set_parent(child, Some(parent)).unwrap();
        registry.save_to_file(&world, &path).unwrap();

        let mut reloaded = World::new();
        let loaded = registry.load_from_file(&mut reloaded, &path).unwrap();
        assert_eq!(loaded.len(), 2);
        let child_copy = reloaded.resolve(world.guid_of(child).unwrap()).unwrap();
        assert_eq!(parent_guid(&reloaded, child_copy), world.guid_of(parent));

        assert!(matches!(
            load_scene_from_file(&mut reloaded, &registry, dir.path().join("missing.json")),
            Err(SceneError::Io(_))
        ));
    }

    #[test]
    fn failed_save_keeps_previous_file() {
        let registry = registry();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.json");

        let mut world = World::new();
        world.spawn((Transform::from_xy(1.0, 2.0), Label("kept".into())));
        save_scene_to_file(&world, &registry, &path).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let occupied = dir.path().join("occupied");
        fs::create_dir(&occupied).unwrap();
        fs::write(occupied.join("inner.txt"), "x").unwrap();
        world.spawn((Label("second".into()),));
        assert!(matches!(
            save_scene_to_file(&world, &registry, &occupied),
            Err(SceneError::Io(_))
        ));
        assert!(occupied.is_dir());

        save_scene_to_file(&world, &registry, &path).unwrap();
        let after = fs::read_to_string(&path).unwrap();
        assert_ne!(before, after);
        assert_eq!(SceneData::from_json(&after).unwrap().entities.len(), 2);

        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["level.json", "occupied"]);
    }

    #[test]
    fn registry_lists_names_and_defaults() {
        let mut registry = registry();
        registry.register::<Transform>();
        assert_eq!(registry.component_names(), vec!["Label", "Speed"]);
        assert_eq!(registry.default_value("Speed"), Some(serde_json::json!({ "value": 1.0 })));
        assert_eq!(registry.default_value("Label"), None);
        assert_eq!(registry.default_value("Nope"), None);
    }
}
