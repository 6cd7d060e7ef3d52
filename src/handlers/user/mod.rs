// handlers/user/mod.rs - /api/user/* (role: user)
//
// Profile management, browsing companies and providers, and booking slots.

pub mod booking;
pub mod browse;
pub mod profile;

pub use booking::{appointments_list, slot_book, slots_list};
pub use browse::{companies_list, company_providers, provider_services};
pub use profile::{profile_get, profile_patch, verification_status};
