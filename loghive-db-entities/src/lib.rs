#![allow(non_snake_case)]

pub mod Severity;
pub mod User;
