// Copyright (c) 2024 Mike Tsao

//! Canvas entities and the two stores every editor keeps them in: the
//! [EntityCache] and the [SelectionManager].

/// The most commonly used imports.
pub mod prelude {
    pub use super::{EntityCache, GridEntity, SelectionManager, Tracked};
}

pub use {
    cache::EntityCache,
    entity::{GridEntity, Tracked},
    selection::SelectionManager,
};

mod cache;
mod entity;
mod selection;
