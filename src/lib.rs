//! flowerboard — realtime flower stock relay.
//!
//! Clients connect over a websocket, send signed quantity deltas for flower
//! items, and every other connected client receives the item's new running
//! total. Totals live in memory for the life of the process.

pub mod config;
pub mod message;
pub mod routes;
pub mod services;
pub mod state;
