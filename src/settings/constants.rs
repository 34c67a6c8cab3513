/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "PDNS_PROVIDER_CONFIG_PATH";

/// Directory under the user's configuration directory.
pub const CONFIG_DIR_NAME: &str = "pdns-provider";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Example configuration
pub const DEFAULT_CONFIG: &str = r#"
# Logging configuration
[log]
# Level can be "error", "warn", "info", "debug", or "trace"
level = "info"

# Reconcile interval in seconds, 0 runs a single pass and exits
[reconcile]
interval = 0

# PowerDNS connection. Empty values fall back to the PDNS_* environment
# variables (PDNS_SERVER_URL, PDNS_API_KEY, ...).
[powerdns]
server_url = "http://127.0.0.1:8081"
recursor_server_url = "http://127.0.0.1:8082"
api_key = "change-me"
insecure_https = false
# PEM content or path
ca_certificate = ""
client_cert_file = ""
client_cert_key_file = ""
cache_requests = false
# Megabytes
cache_mem_size = "100"
# Seconds
cache_ttl = 30

# Declared resources. Each entry accepts ensure = "present" (default) or
# ensure = "absent".

# [[zones]]
# name = "example.com."
# kind = "Native"
# nameservers = ["ns1.example.com.", "ns2.example.com."]

# [[reverse_zones]]
# cidr = "192.168.1.0/24"
# kind = "Native"
# nameservers = ["ns1.example.com."]

# [[records]]
# zone = "example.com."
# name = "www.example.com."
# type = "A"
# ttl = 300
# records = ["192.168.1.10"]

# [[ptr_records]]
# ip_address = "192.168.1.10"
# hostname = "www.example.com."
# ttl = 300
# reverse_zone = "1.168.192.in-addr.arpa."

# [[recursor_configs]]
# name = "allow-from"
# value = "10.0.0.0/8"

# [[recursor_forward_zones]]
# zone = "corp.example."
# servers = ["10.0.0.53"]
# recursion_desired = true

# Lookups reported after every pass
[lookups]
reverse_zones = []
zones = []

# Existing objects to read and print by import ID
# [[imports]]
# type = "powerdns_record"
# id = '{"zone": "example.com.", "id": "www.example.com.:::A"}'
"#;
