#![allow(dead_code)]

pub mod env;
pub mod fixtures;
pub mod wav;
