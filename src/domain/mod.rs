//! Domain layer: content records served by the site.

pub mod entities;
