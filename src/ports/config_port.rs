//! Configuration access port.
//!
//! Lookups are by INI section and key. Values come back as raw strings and
//! the settings layer parses them, so a malformed value is an error rather
//! than a silent default.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    /// `Ok(None)` when the key is absent, `Err` for an unrecognised spelling.
    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, String>;
}
