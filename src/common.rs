// src/common.rs

pub mod datas;
pub mod error;
pub mod logging;
