//! The `utils` module provides the pieces shared by every other module of
//! the relay: the startup error type and logging initialisation.

pub mod error;
pub mod logging;

pub use error::{RelayError, Result};

#[cfg(test)]
mod tests {
    use super::logging;

    #[test]
    fn logging_init_accepts_levels() {
        logging::init("info", false);
        logging::init("debug", true);
        logging::init("not-a-level", false);
    }
}
