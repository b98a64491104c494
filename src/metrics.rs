use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

pub static PROM_REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

pub static CONTACT_CHECKS: Lazy<IntCounter> = Lazy::new(|| {
    let c = IntCounter::new(
        "folio_contact_checks_total",
        "Contact submissions evaluated by the spam guard",
    )
    .expect("create counter");
    let _ = PROM_REGISTRY.register(Box::new(c.clone()));
    c
});

pub static CONTACT_ACCEPTED: Lazy<IntCounter> = Lazy::new(|| {
    let c = IntCounter::new(
        "folio_contact_accepted_total",
        "Contact submissions accepted and stored",
    )
    .expect("create counter");
    let _ = PROM_REGISTRY.register(Box::new(c.clone()));
    c
});

pub static CONTACT_REJECTED: Lazy<IntCounter> = Lazy::new(|| {
    let c = IntCounter::new(
        "folio_contact_rejected_total",
        "Contact submissions rejected by the rate limit",
    )
    .expect("create counter");
    let _ = PROM_REGISTRY.register(Box::new(c.clone()));
    c
});

pub static GUARD_RECORDS: Lazy<IntGauge> = Lazy::new(|| {
    let g = IntGauge::new(
        "folio_guard_records",
        "Live submission records in the guard store",
    )
    .expect("create gauge");
    let _ = PROM_REGISTRY.register(Box::new(g.clone()));
    g
});

/// Prometheus text exposition of all registered collectors.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buf = Vec::new();
    if let Err(err) = encoder.encode(&PROM_REGISTRY.gather(), &mut buf) {
        tracing::warn!(error = %err, "metrics encoding failed");
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_render_in_exposition() {
        CONTACT_CHECKS.inc();
        CONTACT_REJECTED.inc();
        GUARD_RECORDS.set(3);
        let text = render();
        assert!(text.contains("folio_contact_checks_total"));
        assert!(text.contains("folio_guard_records"));
    }
}
