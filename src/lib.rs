//! Runtime core of a Yars' Revenge style arcade game.
//!
//! Everything here is presentation-free: actors expose rects, masks and
//! frame handles, and a [`canvas::Canvas`] implementation supplied by the
//! caller does the actual drawing.

pub mod body;
pub mod cannon;
pub mod canvas;
pub mod config;
pub mod enemy_base;
pub mod error;
pub mod game;
pub mod ion_field;
pub mod level;
pub mod screens;
pub mod session;
pub mod shield;
pub mod ship;
pub mod sprite;
pub mod statemachine;
pub mod vector;

pub use error::{Error, Result};
