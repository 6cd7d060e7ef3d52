// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, self-registration and email verification. Everything
// else lives behind a role gate.

pub mod health;
pub mod login;
pub mod register;
pub mod verification;

pub use health::{health, root};
pub use login::{admin_login, manager_login, provider_login, superuser_login, user_login};
pub use register::user_register;
pub use verification::{verification_send, verification_verify};
