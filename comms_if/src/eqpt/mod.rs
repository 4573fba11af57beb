//! # Equipment Interface
//!
//! This module defines the interface structures which are exchanged with the plant.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod plant;
