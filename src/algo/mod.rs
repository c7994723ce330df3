//! Mesh processing algorithms.
//!
//! Every algorithm operates on a [`TriangleMesh`](crate::mesh::TriangleMesh)
//! in place and recomputes derived data (adjacency, normals) from scratch
//! each time it needs them:
//!
//! - **Adjacency**: triangle incidence and distance neighbourhoods
//! - **Normals**: triangle frames, area-weighted and render normals
//! - **Subdivision**: linear 1-to-4 split, Loop subdivision
//! - **Noise**: isotropic and normal-direction perturbation
//! - **Denoising**: bilateral filtering along vertex normals
//! - **Error metric**: distance to the ground-truth snapshot

pub mod adjacency;
pub mod denoise;
pub mod error_metric;
pub mod noise;
pub mod normals;
pub mod subdivide;
