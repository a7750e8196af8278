//! Airfoil profiles and the profile library.
//!
//! A profile is a closed 2D outline normalized to chord length 1 with the
//! leading edge at the origin, stored trailing edge over the upper surface
//! to the leading edge and back along the lower surface.

pub mod library;
pub mod profile;

pub use library::AirfoilLibrary;
pub use profile::Airfoil;
