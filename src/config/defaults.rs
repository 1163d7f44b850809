//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use std::path::PathBuf;

// =============================================================================
// Server / Listen Defaults
// =============================================================================

pub fn default_server_name() -> String {
    "relayd".to_string()
}

pub fn default_listen_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_listen_port() -> u16 {
    relay_proto::cli::DEFAULT_PORT
}

pub fn default_fallback_ports() -> Vec<u16> {
    relay_proto::cli::PORT_POOL.to_vec()
}

pub fn default_max_line_length() -> usize {
    relay_proto::line::DEFAULT_MAX_LINE_LEN
}

pub fn default_send_queue() -> usize {
    1024
}

// =============================================================================
// Moderation Defaults
// =============================================================================

pub fn default_word_list() -> PathBuf {
    PathBuf::from("bad_words.txt")
}

pub fn default_section_marker() -> String {
    "-----------".to_string()
}

pub fn default_min_word_length() -> usize {
    3
}

pub fn default_warning_threshold() -> u32 {
    3
}

// =============================================================================
// Name Defaults
// =============================================================================

pub fn default_min_name_length() -> usize {
    2
}

pub fn default_max_name_length() -> usize {
    20
}

pub fn default_reserved_names() -> Vec<String> {
    vec!["admin".to_string(), "server".to_string()]
}
