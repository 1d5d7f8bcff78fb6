use std::path::PathBuf;

/// Default TCP port the host push socket listens on.
pub const HOST_PUSH_PORT: u16 = 9430;

/// Default HTTP port the host command endpoint listens on.
pub const HOST_COMMAND_PORT: u16 = 9431;

const HOST_ADDRESS: &str = "127.0.0.1";

pub fn default_push_address() -> String {
    format!("{}:{}", HOST_ADDRESS, HOST_PUSH_PORT)
}

pub fn default_command_base_url() -> String {
    format!("http://{}:{}", HOST_ADDRESS, HOST_COMMAND_PORT)
}

pub fn data_dir() -> PathBuf {
    // XDG layout on unix for consistency across macOS and Linux.
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".local")
            .join("share")
            .join("vgarage")
    }
    #[cfg(windows)]
    {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vgarage")
    }
}

pub fn config_dir() -> PathBuf {
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".config")
            .join("vgarage")
    }
    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vgarage")
    }
}
