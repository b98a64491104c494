/// Fixed identity key for deployments with exactly one caller per store
/// (a device-local persistent store has no per-user identity to resolve).
pub const LOCAL_IDENTITY: &str = "local";

/// Derive a stable rate-limit key from the caller's network address and
/// user-agent. Two callers sharing both values collide into one record; that
/// imprecision is accepted, this is a soft limit and not a security boundary.
pub fn resolve(ip: Option<&str>, user_agent: Option<&str>) -> String {
    let ip = match ip {
        Some(v) if !v.is_empty() => v,
        _ => "unknown",
    };
    let ua = match user_agent {
        Some(v) if !v.is_empty() => v,
        _ => "unknown",
    };
    format!("{}|{}", ip, ua)
}
