//! Data-driven progression content and its loaders.
//!
//! This crate houses the on-disk formats for authored skill-tree data and
//! the loaders that turn them into engine types:
//! - value descriptors (data-driven via RON)
//! - progression graphs with nodes and connections (data-driven via RON)
//! - engine settings (data-driven via TOML)
//!
//! Loaders resolve descriptor references through a
//! [`skilltree_core::DescriptorRegistry`] and validate everything the
//! engine's constructors do not.

pub mod loaders;
pub mod specs;

pub use loaders::{ContentFactory, DescriptorLoader, GraphLoader, SettingsLoader};
pub use specs::{ConnectionSpec, DescriptorSpec, GraphSpec, NodeSpec, StatSpec};
