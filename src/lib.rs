pub mod board;
pub mod classify;
pub mod config;
pub mod data;
pub mod dispatch;
pub mod docker;
pub mod event;
pub mod message;
pub mod sample;
pub mod sink;
pub mod track;

#[cfg(test)]
mod testing;
