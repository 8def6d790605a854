//! Lifetime clamping and expiry computation shared by every adapter.

/// Current Unix timestamp, in seconds.
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Bounds applied to record lifetimes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifetimePolicy {
    min_lifetime: Option<i64>,
    max_lifetime: Option<i64>,
}

impl LifetimePolicy {
    /// Create a policy. `None` leaves a side unbounded.
    pub fn new(min_lifetime: Option<i64>, max_lifetime: Option<i64>) -> Self {
        Self {
            min_lifetime,
            max_lifetime,
        }
    }

    /// The lower bound.
    pub fn min_lifetime(&self) -> Option<i64> {
        self.min_lifetime
    }

    /// The upper bound.
    pub fn max_lifetime(&self) -> Option<i64> {
        self.max_lifetime
    }

    /// Apply the bounds to `lifetime`, in seconds.
    ///
    /// `None` and `0` mean "infinite" and become `max_lifetime` when one is
    /// set. Negative lifetimes are left alone so callers can store
    /// pre-expired records.
    pub fn clamp(&self, lifetime: Option<i64>) -> Option<i64> {
        match lifetime {
            None | Some(0) => self.max_lifetime,
            Some(l) if l < 0 => Some(l),
            Some(l) => {
                let l = self.min_lifetime.map_or(l, |min| l.max(min));
                Some(self.max_lifetime.map_or(l, |max| l.min(max)))
            }
        }
    }

    /// Absolute expiry for a record saved now, `None` meaning never.
    pub fn expire_time(&self, lifetime: Option<i64>, bypass_control: bool) -> Option<i64> {
        self.expire_time_at(now(), lifetime, bypass_control)
    }

    /// Absolute expiry for a record saved at `now`.
    pub fn expire_time_at(&self, now: i64, lifetime: Option<i64>, bypass_control: bool) -> Option<i64> {
        let lifetime = if bypass_control {
            lifetime
        } else {
            self.clamp(lifetime)
        };
        match lifetime {
            None | Some(0) => None,
            Some(l) => Some(now.saturating_add(l)),
        }
    }
}
