//! GastroGenie server library (used by the `gastrogenie` binary and
//! integration tests).

pub mod gateway;
