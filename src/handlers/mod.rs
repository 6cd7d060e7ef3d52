// handlers/mod.rs - Handler tiers
//
// Public (no auth) → one gated tier per role under /api/<role>/*. Each gated
// tier accepts only tokens for exactly that role; there is no fallthrough
// between tiers.

pub mod admin;
pub mod availability;
pub mod manager;
pub mod provider;
pub mod public;
pub mod superuser;
pub mod user;
