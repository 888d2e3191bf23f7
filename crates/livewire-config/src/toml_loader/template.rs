//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Livewire Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[endpoints]
# broadcast_url = "ws://localhost:8000/ws/broadcast/"
# user_url = "ws://localhost:8000/ws/notifications/"
# token_param = "token"

[reconnect]
# max_attempts = 10          # 0-1000, 0 never reconnects
# base_interval_ms = 1000    # 100-60000, doubled per attempt
# max_interval_ms = 30000    # 1000-600000, ceiling for the doubled delay

[heartbeat]
# ping_interval_ms = 30000   # 1000-600000

[transport]
# connect_timeout_ms = 15000 # 1000-120000

[auth]
# refresh_url = "https://api.example.com/auth/token/refresh/"
# refresh_token = ""

[logging]
# level = "info"             # trace, debug, info, warn, error
# log_targets = false        # log user targets including the credential
"##
    .to_string()
}
