//! Fragments: the physically real sub-region of a cut element.
//!
//! A [`Fragment2D`] is a closed edge loop, a [`Fragment3D`] a closed shell
//! of faces. Fragments own their boundary pieces but never their nodes.

pub mod planar;
pub mod solid;

pub use planar::Fragment2D;
pub use solid::Fragment3D;
