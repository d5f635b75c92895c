//! Static collision world with Rapier3D.

use crate::collision::ColliderTag;
use engine_core::Vec3;
use rapier3d::prelude::*;

/// Collider storage plus the query pipeline used for ray casts.
pub struct CollisionWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub query_pipeline: QueryPipeline,
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionWorld {
    /// Create an empty collision world.
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Rebuild the query acceleration structure. Call after adding colliders.
    pub fn update_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.collider_set);
        log::debug!("Query pipeline rebuilt over {} colliders", self.collider_set.len());
    }

    /// Add a fixed sphere collider (asteroids, mines).
    pub fn add_sphere(&mut self, center: Vec3, radius: f32, tag: ColliderTag) -> ColliderHandle {
        let collider = ColliderBuilder::ball(radius)
            .translation(vector![center.x, center.y, center.z])
            .collision_groups(tag.interaction_groups())
            .user_data(tag.user_data())
            .build();
        self.collider_set.insert(collider)
    }

    /// Add a fixed axis-aligned cuboid collider (outposts, hull sections).
    pub fn add_cuboid(&mut self, center: Vec3, half_extents: Vec3, tag: ColliderTag) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(vector![center.x, center.y, center.z])
            .collision_groups(tag.interaction_groups())
            .user_data(tag.user_data())
            .build();
        self.collider_set.insert(collider)
    }

    /// Tag of a collider, if it carries one.
    pub fn tag_of(&self, handle: ColliderHandle) -> Option<ColliderTag> {
        self.collider_set
            .get(handle)
            .and_then(|collider| ColliderTag::from_user_data(collider.user_data))
    }

    /// Number of colliders in the world.
    pub fn len(&self) -> usize {
        self.collider_set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
