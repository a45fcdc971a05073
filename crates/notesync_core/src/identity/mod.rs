//! Identity boundary: who is signed in, and session wiring.
//!
//! # Responsibility
//! - Define the reactive identity provider contract the core consumes.
//! - Ship an in-process provider and the session binding that drives the
//!   sync store from sign-in/sign-out transitions.

pub mod binding;
pub mod provider;

pub use binding::SessionBinding;
pub use provider::{
    IdentityEvent, IdentityListener, IdentityProvider, MemoryIdentityProvider, Principal,
};
