//! # Hierarchy: Parent Links and the Transform Pass
//!
//! An entity with a [`Transform`] may point at a parent through a [`Parent`]
//! component. The parent link is the only stored edge: children are found by
//! scanning the `Parent` table, so destroying or copying an entity never
//! leaves a child list out of sync.
//!
//! ## Levels
//!
//! Every transform entity has a level: `0` for roots, parent level + 1 for
//! children. [`World::set_parent`] rewrites the level of the moved subtree
//! immediately and refuses any link that would close a cycle.
//! [`World::level_of`] walks the live parent chain; the level cached in
//! [`GlobalTransform`] is only the sort key for the next pass.
//!
//! ## Design: Parent Links Only
//!
//! Two layouts are common:
//!
//! ```text
//! parent link only           parent + children
//! ┌───────┐                  ┌───────┐
//! │ child │──Parent──▶ p     │ child │──Parent──▶ p ──Children──▶ [child, ..]
//! └───────┘                  └───────┘
//! ```
//!
//! Keeping both directions makes `children_of` a lookup but means every
//! structural change has to patch two components. With the parent
//! link alone there is a single source of truth and nothing to patch, at the
//! cost of a scan of the `Parent` table when children are asked for. The
//! transform pass never needs children at all: it walks *up* from each
//! entity and memoizes the chains it has resolved.
//!
//! ## Comparison
//!
//! - **bevy_hierarchy**: `Parent` + `Children`, kept in sync by commands and
//!   propagated top down from the roots.
//! - **Unity**: each transform owns its child list.
//!
//! Walking up with a memo also reaches entities whose parent has been
//! destroyed, which a top-down walk from the roots would silently skip.
//!
//! ## The transform pass
//!
//! [`propagate_transforms`] recomputes every [`GlobalTransform`] once per
//! frame:
//!
//! ```text
//! world(root)  = local(root)
//! world(child) = local(child) * world(parent)
//! ```
//!
//! Entities are visited in level order and each parent chain is resolved at
//! most once. A parent that has been destroyed is treated as absent for the
//! frame, and the dangling link is removed once the pass is over. A cycle
//! that slipped in anyway is logged and its subtree keeps last frame's values.
//!
//! ## Usage
//!
//! ```ignore
//! let parent = world.spawn((Transform::from_xy(0.0, 5.0),));
//! let child = world.spawn((Transform::from_xy(2.0, 0.0),));
//! world.set_parent(child, Some(parent))?;
//! propagate_transforms(&mut world);
//! assert_eq!(world.global_position(child)?, Vec2::new(2.0, 5.0));
//! ```

use std::collections::{HashMap, HashSet, VecDeque};

use crate::ecs::entity::Entity;
use crate::ecs::error::EcsError;
use crate::ecs::world::World;
use crate::math::{self, Mat3, Transform, Vec2};

/// Links an entity to its parent. Created only through [`World::set_parent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub(crate) Entity);

impl Parent {
    pub fn entity(self) -> Entity {
        self.0
    }
}

/// World-space placement cached by [`propagate_transforms`].
///
/// Values are only as fresh as the last pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalTransform {
    matrix: Mat3,
    position: Vec2,
    scale: Vec2,
    rotation: f32,
    level: u32,
}

impl GlobalTransform {
    pub(crate) fn from_matrix(matrix: Mat3, level: u32) -> Self {
        Self {
            matrix,
            position: math::matrix_position(&matrix),
            scale: math::matrix_scale(&matrix),
            rotation: math::matrix_rotation(&matrix),
            level,
        }
    }

    pub fn matrix(&self) -> Mat3 {
        self.matrix
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Degrees, in `(-180, 180]`.
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn level(&self) -> u32 {
        self.level
    }
}

impl Default for GlobalTransform {
    fn default() -> Self {
        Self::from_matrix(Mat3::IDENTITY, 0)
    }
}

/// What one run of [`propagate_transforms`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationStats {
    pub resolved: usize,
    pub orphans_detached: usize,
    pub cycles: usize,
}

impl World {
    // ── Local transform ─────────────────────────────────────────────────

    fn require_transform(&self, entity: Entity) -> Result<&Transform, EcsError> {
        if !self.is_alive(entity) {
            return Err(EcsError::InvalidHandle(entity));
        }
        self.get::<Transform>(entity)
            .ok_or(EcsError::MissingTransform(entity))
    }

    fn transform_mut(&mut self, entity: Entity) -> Result<&mut Transform, EcsError> {
        if !self.is_alive(entity) {
            return Err(EcsError::InvalidHandle(entity));
        }
        self.get_mut::<Transform>(entity)
            .ok_or(EcsError::MissingTransform(entity))
    }

    pub fn local_transform(&self, entity: Entity) -> Result<Transform, EcsError> {
        self.require_transform(entity).copied()
    }

    pub fn set_local_position(&mut self, entity: Entity, position: Vec2) -> Result<(), EcsError> {
        self.transform_mut(entity)?.position = position;
        Ok(())
    }

    pub fn set_local_scale(&mut self, entity: Entity, scale: Vec2) -> Result<(), EcsError> {
        self.transform_mut(entity)?.scale = scale;
        Ok(())
    }

    /// Sets the local rotation in degrees.
    pub fn set_local_rotation(&mut self, entity: Entity, degrees: f32) -> Result<(), EcsError> {
        self.transform_mut(entity)?.rotation = degrees;
        Ok(())
    }

    // ── Structure ───────────────────────────────────────────────────────

    /// The live parent of `entity`. A link to a destroyed parent reads as
    /// `None`.
    pub fn parent_of(&self, entity: Entity) -> Option<Entity> {
        self.get::<Parent>(entity)
            .map(|parent| parent.0)
            .filter(|&parent| self.is_alive(parent))
    }

    /// Depth of `entity` along its live parent chain. Unlike the level cached
    /// in [`GlobalTransform`], this is correct as soon as an ancestor is
    /// destroyed.
    pub fn level_of(&self, entity: Entity) -> Result<u32, EcsError> {
        self.require_transform(entity)?;
        let mut level = 0;
        let mut current = entity;
        for _ in 0..self.entity_count() {
            match self.parent_of(current) {
                Some(parent) if self.has::<Transform>(parent) => {
                    level += 1;
                    current = parent;
                }
                _ => break,
            }
        }
        Ok(level)
    }

    /// Direct children of `entity`, in slot order.
    pub fn children_of(&self, entity: Entity) -> Vec<Entity> {
        let mut children = Vec::new();
        self.for_each::<Parent>(|child, parent| {
            if parent.0 == entity {
                children.push(child);
            }
        });
        children
    }

    /// Every entity below `entity`, breadth first. `entity` itself is not
    /// included.
    pub fn descendants_of(&self, entity: Entity) -> Vec<Entity> {
        let index = self.child_index();
        let mut out = Vec::new();
        let mut seen = HashSet::from([entity]);
        let mut queue = VecDeque::from([entity]);
        while let Some(current) = queue.pop_front() {
            for &child in index.get(&current).into_iter().flatten() {
                if seen.insert(child) {
                    out.push(child);
                    queue.push_back(child);
                }
            }
        }
        out
    }

    /// True if `ancestor` appears on the parent chain above `entity`.
    pub fn is_ancestor(&self, ancestor: Entity, entity: Entity) -> bool {
        let mut current = entity;
        for _ in 0..self.entity_count() {
            match self.parent_of(current) {
                Some(parent) if parent == ancestor => return true,
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }

    /// Re-parents `child`, or makes it a root when `parent` is `None`.
    ///
    /// Both entities must be alive and carry a [`Transform`]. A parent that
    /// is `child` itself or one of its descendants is rejected with
    /// [`EcsError::CycleRejected`] and nothing changes. On success the level
    /// of `child` and its whole subtree is updated before returning.
    pub fn set_parent(&mut self, child: Entity, parent: Option<Entity>) -> Result<(), EcsError> {
        self.require_transform(child)?;
        let level = match parent {
            Some(parent) => {
                self.require_transform(parent)?;
                if parent == child || self.is_ancestor(child, parent) {
                    return Err(EcsError::CycleRejected { child, parent });
                }
                let level = self.level_of(parent)? + 1;
                self.insert_unchecked(child, Parent(parent));
                level
            }
            None => {
                self.remove::<Parent>(child);
                0
            }
        };
        self.cascade_levels(child, level);
        log::trace!("parent of {child} set to {parent:?} (level {level})");
        Ok(())
    }

    /// Writes `level` on `root` and increasing levels down its subtree.
    fn cascade_levels(&mut self, root: Entity, level: u32) {
        let index = self.child_index();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([(root, level)]);
        while let Some((entity, level)) = queue.pop_front() {
            if !seen.insert(entity) {
                continue;
            }
            if let Some(global) = self.get_mut::<GlobalTransform>(entity) {
                global.level = level;
            } else {
                let matrix = self.compute_world_matrix(entity).unwrap_or(Mat3::IDENTITY);
                self.insert_unchecked(entity, GlobalTransform::from_matrix(matrix, level));
            }
            for &child in index.get(&entity).into_iter().flatten() {
                queue.push_back((child, level + 1));
            }
        }
    }

    fn child_index(&self) -> HashMap<Entity, Vec<Entity>> {
        let mut index: HashMap<Entity, Vec<Entity>> = HashMap::new();
        self.for_each::<Parent>(|child, parent| index.entry(parent.0).or_default().push(child));
        index
    }

    // ── World-space queries ─────────────────────────────────────────────

    /// Walks the parent chain and multiplies local matrices without
    /// touching any cache.
    fn compute_world_matrix(&self, entity: Entity) -> Result<Mat3, EcsError> {
        let mut matrix = self.require_transform(entity)?.matrix();
        let mut seen = HashSet::from([entity]);
        let mut current = entity;
        while let Some(parent) = self.parent_of(current) {
            let Some(transform) = self.get::<Transform>(parent) else {
                break;
            };
            if !seen.insert(parent) {
                return Err(EcsError::CycleDetected(parent));
            }
            matrix = matrix * transform.matrix();
            current = parent;
        }
        Ok(matrix)
    }

    /// The cached world placement. An entity the pass has not reached yet
    /// is computed on the spot.
    pub fn global_transform(&self, entity: Entity) -> Result<GlobalTransform, EcsError> {
        self.require_transform(entity)?;
        if let Some(global) = self.get::<GlobalTransform>(entity) {
            return Ok(*global);
        }
        let matrix = self.compute_world_matrix(entity)?;
        Ok(GlobalTransform::from_matrix(matrix, 0))
    }

    pub fn world_matrix(&self, entity: Entity) -> Result<Mat3, EcsError> {
        self.global_transform(entity).map(|global| global.matrix)
    }

    pub fn global_position(&self, entity: Entity) -> Result<Vec2, EcsError> {
        self.global_transform(entity).map(|global| global.position)
    }

    pub fn global_scale(&self, entity: Entity) -> Result<Vec2, EcsError> {
        self.global_transform(entity).map(|global| global.scale)
    }

    pub fn global_rotation(&self, entity: Entity) -> Result<f32, EcsError> {
        self.global_transform(entity).map(|global| global.rotation)
    }

    /// Maps a point from `entity`'s local space to world space.
    pub fn transform_point(&self, entity: Entity, point: Vec2) -> Result<Vec2, EcsError> {
        Ok(math::transform_point(&self.world_matrix(entity)?, point))
    }

    /// Maps a direction to world space and normalizes it.
    pub fn transform_direction(&self, entity: Entity, direction: Vec2) -> Result<Vec2, EcsError> {
        Ok(math::transform_vector(&self.world_matrix(entity)?, direction).normalize_or_zero())
    }

    // ── Subtree operations ──────────────────────────────────────────────

    /// Destroys `entity` and everything below it.
    pub fn destroy_recursive(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let descendants = self.descendants_of(entity);
        for &descendant in &descendants {
            self.destroy_entity(descendant);
        }
        self.destroy_entity(entity);
        log::debug!("destroyed {entity} and {} descendants", descendants.len());
        true
    }

    /// Copies `root` and its whole subtree.
    ///
    /// The copied root keeps the original's parent. Links inside the subtree
    /// point at the new copies.
    pub fn duplicate_recursive(&mut self, root: Entity) -> Result<Entity, EcsError> {
        if !self.is_alive(root) {
            return Err(EcsError::InvalidHandle(root));
        }
        let originals: Vec<Entity> = std::iter::once(root)
            .chain(self.descendants_of(root))
            .collect();
        let mut remap = HashMap::with_capacity(originals.len());
        for &original in &originals {
            remap.insert(original, self.copy(original)?);
        }
        for &original in &originals[1..] {
            if let Some(parent) = self.parent_of(original)
                && let (Some(&copy), Some(&new_parent)) = (remap.get(&original), remap.get(&parent))
            {
                self.insert_unchecked(copy, Parent(new_parent));
            }
        }
        let copy = remap.get(&root).copied().ok_or(EcsError::InvalidHandle(root))?;
        log::debug!("duplicated subtree of {root} ({} entities) as {copy}", originals.len());
        Ok(copy)
    }
}

/// Recomputes the [`GlobalTransform`] of every entity with a [`Transform`].
///
/// Links to destroyed parents are treated as roots for this frame and removed
/// afterwards.
pub fn propagate_transforms(world: &mut World) -> PropagationStats {
    let mut stats = PropagationStats::default();
    let mut order = world.entities_with::<Transform>();
    order.sort_by_key(|&entity| {
        world
            .get::<GlobalTransform>(entity)
            .map_or(0, |global| global.level)
    });

    let mut resolved: HashMap<Entity, (Mat3, u32)> = HashMap::with_capacity(order.len());
    let mut failed: HashSet<Entity> = HashSet::new();
    let mut dangling: Vec<Entity> = Vec::new();

    for &entity in &order {
        if resolved.contains_key(&entity) || failed.contains(&entity) {
            continue;
        }
        if let Err(err) = resolve_chain(world, entity, &mut resolved, &mut failed, &mut dangling) {
            stats.cycles += 1;
            log::error!("transform pass skipped a subtree: {err}");
        }
    }

    for (&entity, &(matrix, level)) in &resolved {
        world.insert_unchecked(entity, GlobalTransform::from_matrix(matrix, level));
    }
    stats.resolved = resolved.len();

    for child in dangling {
        if world.remove::<Parent>(child).is_some() {
            world.cascade_levels(child, 0);
            stats.orphans_detached += 1;
            log::debug!("detached {child} from a destroyed parent");
        }
    }
    stats
}

/// Resolves `entity` and every unresolved ancestor above it, top down.
fn resolve_chain(
    world: &World,
    entity: Entity,
    resolved: &mut HashMap<Entity, (Mat3, u32)>,
    failed: &mut HashSet<Entity>,
    dangling: &mut Vec<Entity>,
) -> Result<(), EcsError> {
    let mut chain = vec![entity];
    let mut on_chain = HashSet::from([entity]);
    let mut base: Option<(Mat3, u32)> = None;
    let mut current = entity;

    while let Some(parent) = world.get::<Parent>(current).map(|parent| parent.0) {
        if !world.is_alive(parent) || !world.has::<Transform>(parent) {
            dangling.push(current);
            break;
        }
        if let Some(&known) = resolved.get(&parent) {
            base = Some(known);
            break;
        }
        if failed.contains(&parent) {
            failed.extend(chain);
            return Ok(());
        }
        if !on_chain.insert(parent) {
            failed.extend(chain);
            return Err(EcsError::CycleDetected(parent));
        }
        chain.push(parent);
        current = parent;
    }

    for &node in chain.iter().rev() {
        let local = world
            .get::<Transform>(node)
            .map_or(Mat3::IDENTITY, Transform::matrix);
        let (matrix, level) = match base {
            Some((parent_matrix, parent_level)) => (local * parent_matrix, parent_level + 1),
            None => (local, 0),
        };
        resolved.insert(node, (matrix, level));
        base = Some((matrix, level));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const EPS: f32 = 1e-4;

    fn assert_vec2(actual: Vec2, expected: Vec2) {
        assert_abs_diff_eq!(actual.x, expected.x, epsilon = EPS);
        assert_abs_diff_eq!(actual.y, expected.y, epsilon = EPS);
    }

    fn at(world: &mut World, x: f32, y: f32) -> Entity {
        world.spawn((Transform::from_xy(x, y),))
    }

    /// Every transform entity's level is its parent's level + 1, or 0.
    fn assert_levels_consistent(world: &World) {
        for entity in world.entities_with::<Transform>() {
            let expected = match world.parent_of(entity) {
                Some(parent) => world.level_of(parent).unwrap() + 1,
                None => 0,
            };
            assert_eq!(world.level_of(entity).unwrap(), expected, "level of {entity}");
        }
    }

    #[test]
    fn reparenting_moves_child_into_parent_space() {
        let mut world = World::new();
        let parent = at(&mut world, 0.0, 5.0);
        let child = at(&mut world, 2.0, 0.0);

        propagate_transforms(&mut world);
        assert_vec2(world.global_position(child).unwrap(), Vec2::new(2.0, 0.0));

        world.set_parent(child, Some(parent)).unwrap();
        propagate_transforms(&mut world);
        assert_vec2(world.global_position(child).unwrap(), Vec2::new(2.0, 5.0));
    }

    #[test]
    fn rotation_and_scale_compose_through_parent() {
        let mut world = World::new();
        let parent = world.spawn((Transform::new(Vec2::new(10.0, 0.0), Vec2::splat(2.0), 30.0),));
        let child = world.spawn((Transform::from_xy(1.0, 0.0).with_rotation(60.0),));
        world.set_parent(child, Some(parent)).unwrap();
        propagate_transforms(&mut world);

        let global = world.global_transform(child).unwrap();
        let angle = 30f32.to_radians();
        assert_vec2(global.position(), Vec2::new(10.0 + 2.0 * angle.cos(), 2.0 * angle.sin()));
        assert_vec2(global.scale(), Vec2::splat(2.0));
        assert_abs_diff_eq!(global.rotation(), 90.0, epsilon = EPS);
        assert_eq!(global.level(), 1);
    }

    #[test]
    fn levels_follow_every_reparent() {
        let mut world = World::new();
        let a = at(&mut world, 0.0, 0.0);
        let b = at(&mut world, 0.0, 0.0);
        let c = at(&mut world, 0.0, 0.0);

        world.set_parent(b, Some(a)).unwrap();
        world.set_parent(c, Some(b)).unwrap();
        assert_eq!(world.level_of(c), Ok(2));
        assert_levels_consistent(&world);

        world.set_parent(b, None).unwrap();
        assert_eq!(world.level_of(b), Ok(0));
        assert_eq!(world.level_of(c), Ok(1));
        assert_levels_consistent(&world);

        world.set_parent(a, Some(c)).unwrap();
        assert_eq!(world.level_of(a), Ok(2));
        assert_levels_consistent(&world);
    }

    #[test]
    fn cycles_are_rejected_without_change() {
        let mut world = World::new();
        let a = at(&mut world, 0.0, 0.0);
        let b = at(&mut world, 0.0, 0.0);
        let c = at(&mut world, 0.0, 0.0);
        world.set_parent(b, Some(a)).unwrap();
        world.set_parent(c, Some(b)).unwrap();

        assert_eq!(
            world.set_parent(a, Some(c)),
            Err(EcsError::CycleRejected { child: a, parent: c })
        );
        assert_eq!(
            world.set_parent(a, Some(a)),
            Err(EcsError::CycleRejected { child: a, parent: a })
        );
        assert_eq!(world.parent_of(a), None);
        assert_eq!(world.level_of(a), Ok(0));
        assert_eq!(world.level_of(c), Ok(2));
    }

    #[test]
    fn set_parent_validates_both_ends() {
        let mut world = World::new();
        let a = at(&mut world, 0.0, 0.0);
        let bare = world.create_entity();
        let dead = at(&mut world, 0.0, 0.0);
        world.destroy_entity(dead);

        assert_eq!(world.set_parent(bare, Some(a)), Err(EcsError::MissingTransform(bare)));
        assert_eq!(world.set_parent(a, Some(bare)), Err(EcsError::MissingTransform(bare)));
        assert_eq!(world.set_parent(a, Some(dead)), Err(EcsError::InvalidHandle(dead)));
        assert_eq!(world.set_parent(dead, None), Err(EcsError::InvalidHandle(dead)));
        assert_eq!(world.global_position(dead), Err(EcsError::InvalidHandle(dead)));
        assert_eq!(world.set_local_position(bare, Vec2::ONE), Err(EcsError::MissingTransform(bare)));
    }

    #[test]
    fn destroyed_parent_leaves_a_root_then_detaches() {
        let mut world = World::new();
        let parent = at(&mut world, 10.0, 0.0);
        let child = at(&mut world, 1.0, 0.0);
        world.set_parent(child, Some(parent)).unwrap();
        propagate_transforms(&mut world);
        assert_vec2(world.global_position(child).unwrap(), Vec2::new(11.0, 0.0));

        world.destroy_entity(parent);
        assert_eq!(world.parent_of(child), None);

        let stats = propagate_transforms(&mut world);
        assert_eq!(stats.orphans_detached, 1);
        assert_vec2(world.global_position(child).unwrap(), Vec2::new(1.0, 0.0));
        assert!(!world.has::<Parent>(child));
        assert_eq!(world.level_of(child), Ok(0));

        let stats = propagate_transforms(&mut world);
        assert_eq!(stats.orphans_detached, 0);
    }

    #[test]
    fn reparenting_under_an_orphaned_chain_uses_live_depth() {
        let mut world = World::new();
        let a = at(&mut world, 0.0, 0.0);
        let b = at(&mut world, 0.0, 0.0);
        let c = at(&mut world, 0.0, 0.0);
        let d = at(&mut world, 0.0, 0.0);
        world.set_parent(b, Some(a)).unwrap();
        world.set_parent(c, Some(b)).unwrap();

        world.destroy_entity(a);
        assert_eq!(world.parent_of(b), None);
        assert_eq!(world.level_of(b), Ok(0));
        assert_eq!(world.level_of(c), Ok(1));

        world.set_parent(d, Some(c)).unwrap();
        assert_eq!(world.level_of(d), Ok(2));
        assert_eq!(world.get::<GlobalTransform>(d).map(|g| g.level()), Some(2));
        assert_levels_consistent(&world);

        propagate_transforms(&mut world);
        assert_eq!(world.get::<GlobalTransform>(d).map(|g| g.level()), Some(2));
        assert_levels_consistent(&world);
    }

    #[test]
    fn zero_and_mirrored_parent_scale_stay_finite() {
        let mut world = World::new();
        let flat = world.spawn((Transform::new(Vec2::new(10.0, 0.0), Vec2::new(0.0, 1.0), 0.0),));
        let mirror = world.spawn((Transform::new(Vec2::new(10.0, 0.0), Vec2::new(-1.0, 1.0), 0.0),));
        let on_flat = at(&mut world, 2.0, 3.0);
        let on_mirror = at(&mut world, 2.0, 3.0);
        world.set_parent(on_flat, Some(flat)).unwrap();
        world.set_parent(on_mirror, Some(mirror)).unwrap();
        propagate_transforms(&mut world);

        let squashed = world.global_transform(on_flat).unwrap();
        assert_vec2(squashed.position(), Vec2::new(10.0, 3.0));
        assert_vec2(squashed.scale(), Vec2::new(0.0, 1.0));
        assert!(squashed.rotation().is_finite());
        assert_abs_diff_eq!(squashed.rotation(), 0.0, epsilon = EPS);
        assert_eq!(world.transform_direction(on_flat, Vec2::X), Ok(Vec2::ZERO));
        assert_vec2(world.transform_direction(on_flat, Vec2::Y).unwrap(), Vec2::Y);

        let mirrored = world.global_transform(on_mirror).unwrap();
        assert_vec2(mirrored.position(), Vec2::new(8.0, 3.0));
        assert_vec2(mirrored.scale(), Vec2::ONE);
        assert!(mirrored.rotation().is_finite());
        assert_abs_diff_eq!(mirrored.rotation().abs(), 180.0, epsilon = 1e-3);
        assert_vec2(world.transform_point(on_mirror, Vec2::X).unwrap(), Vec2::new(7.0, 3.0));
    }

    #[test]
    fn cycle_in_storage_is_skipped_and_reported() {
        let mut world = World::new();
        let a = at(&mut world, 1.0, 0.0);
        let b = at(&mut world, 2.0, 0.0);
        let below = at(&mut world, 3.0, 0.0);
        let bystander = at(&mut world, 4.0, 4.0);
        world.set_parent(b, Some(a)).unwrap();
        world.set_parent(below, Some(b)).unwrap();
        world.remove::<GlobalTransform>(below);
        // Bypass set_parent to corrupt the hierarchy.
        world.insert(a, Parent(b)).unwrap();

        let stats = propagate_transforms(&mut world);
        assert_eq!(stats.cycles, 1);
        assert_eq!(stats.resolved, 1);
        assert!(world.get::<GlobalTransform>(a).is_none());
        assert!(world.get::<GlobalTransform>(below).is_none());
        assert_vec2(world.global_position(bystander).unwrap(), Vec2::new(4.0, 4.0));
        assert_eq!(world.get::<GlobalTransform>(b).map(|g| g.level()), Some(1));
    }

    #[test]
    fn children_and_descendants_are_derived() {
        let mut world = World::new();
        let root = at(&mut world, 0.0, 0.0);
        let a = at(&mut world, 0.0, 0.0);
        let b = at(&mut world, 0.0, 0.0);
        let grandchild = at(&mut world, 0.0, 0.0);
        world.set_parent(a, Some(root)).unwrap();
        world.set_parent(b, Some(root)).unwrap();
        world.set_parent(grandchild, Some(a)).unwrap();

        assert_eq!(world.children_of(root), vec![a, b]);
        assert_eq!(world.descendants_of(root), vec![a, b, grandchild]);
        assert!(world.is_ancestor(root, grandchild));
        assert!(!world.is_ancestor(b, grandchild));
    }

    #[test]
    fn copy_keeps_parent_and_is_independent() {
        let mut world = World::new();
        let parent = at(&mut world, 0.0, 5.0);
        let child = at(&mut world, 1.0, 0.0);
        world.set_parent(child, Some(parent)).unwrap();

        let copy = world.copy(child).unwrap();
        assert_eq!(world.parent_of(copy), Some(parent));
        assert_eq!(world.level_of(copy), Ok(1));

        world.set_local_position(copy, Vec2::new(-3.0, 0.0)).unwrap();
        propagate_transforms(&mut world);
        assert_vec2(world.global_position(child).unwrap(), Vec2::new(1.0, 5.0));
        assert_vec2(world.global_position(copy).unwrap(), Vec2::new(-3.0, 5.0));

        world.destroy_entity(child);
        propagate_transforms(&mut world);
        assert_vec2(world.global_position(copy).unwrap(), Vec2::new(-3.0, 5.0));
    }

    #[test]
    fn duplicate_recursive_remaps_internal_links() {
        let mut world = World::new();
        let anchor = at(&mut world, 100.0, 0.0);
        let root = at(&mut world, 1.0, 0.0);
        let mid = at(&mut world, 1.0, 0.0);
        let leaf = at(&mut world, 1.0, 0.0);
        world.set_parent(root, Some(anchor)).unwrap();
        world.set_parent(mid, Some(root)).unwrap();
        world.set_parent(leaf, Some(mid)).unwrap();

        let root_copy = world.duplicate_recursive(root).unwrap();
        assert_eq!(world.parent_of(root_copy), Some(anchor));
        let mid_copy = world.children_of(root_copy);
        assert_eq!(mid_copy.len(), 1);
        assert_ne!(mid_copy[0], mid);
        let leaf_copy = world.children_of(mid_copy[0]);
        assert_eq!(leaf_copy.len(), 1);
        assert_ne!(leaf_copy[0], leaf);
        assert_eq!(world.children_of(mid), vec![leaf]);
        assert_eq!(world.entity_count(), 7);

        propagate_transforms(&mut world);
        assert_vec2(world.global_position(leaf_copy[0]).unwrap(), Vec2::new(103.0, 0.0));
        assert_eq!(world.level_of(leaf_copy[0]), Ok(3));
    }

    #[test]
    fn destroy_recursive_removes_subtree_only() {
        let mut world = World::new();
        let root = at(&mut world, 0.0, 0.0);
        let child = at(&mut world, 0.0, 0.0);
        let grandchild = at(&mut world, 0.0, 0.0);
        let other = at(&mut world, 0.0, 0.0);
        world.set_parent(child, Some(root)).unwrap();
        world.set_parent(grandchild, Some(child)).unwrap();

        assert!(world.destroy_recursive(child));
        assert!(world.is_alive(root));
        assert!(!world.is_alive(child));
        assert!(!world.is_alive(grandchild));
        assert!(world.is_alive(other));
        assert!(!world.destroy_recursive(child));
    }

    #[test]
    fn transform_point_and_direction() {
        let mut world = World::new();
        let e = world.spawn((Transform::from_xy(5.0, 5.0).with_rotation(90.0),));
        propagate_transforms(&mut world);
        assert_vec2(world.transform_point(e, Vec2::new(1.0, 0.0)).unwrap(), Vec2::new(5.0, 6.0));
        assert_vec2(world.transform_direction(e, Vec2::new(3.0, 0.0)).unwrap(), Vec2::Y);
    }

    #[test]
    fn unresolved_entity_is_computed_on_demand() {
        let mut world = World::new();
        let e = at(&mut world, 3.0, 4.0);
        assert!(world.get::<GlobalTransform>(e).is_none());
        assert_vec2(world.global_position(e).unwrap(), Vec2::new(3.0, 4.0));
        assert_eq!(world.world_matrix(e).unwrap(), Transform::from_xy(3.0, 4.0).matrix());
    }
}
