//! TCP connect side of the knock probe

mod guard;

pub use guard::TcpGuard;
