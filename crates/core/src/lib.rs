//! Core of inkfield: the freehand signature engine, the animated particle
//! field, and the controllers that bind them to a host surface.
//!
//! Everything here is host-agnostic. Drawing is expressed as
//! [`RenderCommand`](inkfield_protocol::RenderCommand) lists and host
//! interaction as [`HostRequest`](inkfield_protocol::HostRequest) lists.

pub mod constants;
pub mod contract;
pub mod field;
pub mod host;
pub mod palette;
pub mod raster;
pub mod signature;
pub mod surface;
pub mod svg;
