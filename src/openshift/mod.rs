//! OpenShift API objects managed by the reconciler.
//!
//! Only the fields the reconciler writes are modelled. The structs are
//! declared through `kube::CustomResource` so that they can be addressed with
//! a typed `kube::Api`, the same way as the `Component` resource.

pub mod apps;
pub mod build;
pub mod image;

pub use apps::{DeploymentConfig, DeploymentConfigSpec};
pub use build::{BuildConfig, BuildConfigSpec};
pub use image::{ImageStream, ImageStreamSpec};
