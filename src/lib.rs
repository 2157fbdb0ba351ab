#[macro_use]
mod macros;

pub mod config;
pub mod directory;
pub mod logger;

pub mod buffer {
    pub mod entity;
    pub mod guard;
    pub mod manager;
}

pub mod storage {
    pub mod entity;
    pub mod manager;
    pub mod memory;
}

pub mod rdbms;
