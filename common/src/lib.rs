#![allow(clippy::module_inception)]
#![allow(clippy::too_many_arguments)]

pub mod config;
pub mod crypto;
pub mod governance;
pub mod serializer;
pub mod time;
pub mod vault;
