/// Classification for retry policy.
///
/// Used by the paginated fetcher to decide how to respond to a provider
/// error without matching on individual error variants.
///
/// # Behavior Summary
///
/// | Class | Retry? | Wait Before Retrying |
/// |-------|--------|----------------------|
/// | `Fatal` | No | - |
/// | `Cooldown` | Yes, up to `max_attempts` | Provider-specific fixed cooldown |
/// | `Backoff` | Yes, up to `max_attempts` | Linear backoff (`attempt * base_delay`) |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - the request is fundamentally invalid and retrying
    /// won't help. Aborts the entire acquisition, not just the current range.
    Fatal,

    /// Retry after a fixed provider-specific cooldown.
    ///
    /// Used when the provider explicitly asks us to slow down (HTTP 429)
    /// or has temporarily banned the client (HTTP 418). The cooldown length
    /// comes from [`ProviderConfig`](crate::provider::ProviderConfig), since
    /// it differs between a plain rate limit and a ban.
    Cooldown,

    /// Retry with linear backoff.
    ///
    /// Used for transient failures (network errors, undecodable responses)
    /// where an immediate retry is likely to fail the same way but a short
    /// growing delay often recovers.
    Backoff,
}
