/// Admin token verification for the message inbox endpoint.
use axum::http::StatusCode;

/// Check the X-Admin-Token header against the FOLIO_ADMIN_TOKEN env var.
/// An unset or empty token disables admin access entirely.
pub fn verify_admin_token(token: Option<&str>) -> bool {
    let expected = match std::env::var("FOLIO_ADMIN_TOKEN") {
        Ok(t) if !t.is_empty() => t,
        _ => {
            tracing::warn!("FOLIO_ADMIN_TOKEN not configured, rejecting admin request");
            return false;
        }
    };

    match token {
        Some(t) if t == expected => true,
        _ => false,
    }
}

pub fn require_admin(token: Option<&str>) -> Result<(), (StatusCode, &'static str)> {
    if !verify_admin_token(token) {
        return Err((
            StatusCode::UNAUTHORIZED,
            "Access denied: invalid admin token",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_without_configured_token() {
        std::env::remove_var("FOLIO_ADMIN_TOKEN");
        assert!(!verify_admin_token(Some("anything")));
        assert!(!verify_admin_token(None));
    }
}
