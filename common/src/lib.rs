#![allow(clippy::module_inception)]

pub mod access_control;
pub mod checkpoint;
pub mod config;
pub mod context;
pub mod crypto;
pub mod event;
pub mod serializer;
pub mod storage;
pub mod token;
