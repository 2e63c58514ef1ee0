//! Fuzz test for session configuration parsing
//!
//! Arbitrary TOML must either parse into a validated config or return an
//! error, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use veil_session::SessionConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _: Result<toml::Value, _> = toml::from_str(s);

        if let Ok(config) = SessionConfig::from_toml_str(s) {
            assert!(config.validate().is_ok());
            assert!(config.max_buffer_size > 0);
        }
    }
});
