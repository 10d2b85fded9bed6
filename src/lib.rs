//! Component reconciler.
//!
//! Turns a `Component` (a name, a git codebase and a build type) into the
//! OpenShift objects needed to build and run it:
//!
//! 1. a builder image stream, taken from the shared namespace or declared from
//!    the runtime image table,
//! 2. an output image stream,
//! 3. a source-to-image build config,
//! 4. a deployment config redeploying on every new image.
//!
//! Objects are created if missing and never updated or deleted.

pub mod component;
pub mod config;
pub mod controller;
pub mod manifest;
pub mod naming;
pub mod oci;
pub mod openshift;
pub mod reconciler;
pub mod store;
pub mod template;
