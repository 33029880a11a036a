//! Login throttling
//!
//! Attempts are counted per (client IP, email). Past `MAX_ATTEMPTS` inside
//! the window the key is locked out: 30 s, doubled for each further attempt,
//! capped at 15 minutes. A successful login forgets the key.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

pub const MAX_ATTEMPTS: u32 = 5;
pub const WINDOW: Duration = Duration::from_secs(5 * 60);
const BASE_COOLDOWN_SECS: u64 = 30;
const MAX_COOLDOWN_SECS: u64 = 15 * 60;

struct AttemptEntry {
    count: u32,
    window_start: Instant,
    blocked_until: Option<Instant>,
}

impl AttemptEntry {
    /// Last moment the key was active: window start or end of lockout
    fn idle_since(&self) -> Instant {
        self.blocked_until
            .map_or(self.window_start, |until| until.max(self.window_start))
    }
}

#[derive(Clone, Default)]
pub struct LoginThrottle {
    inner: Arc<Mutex<HashMap<String, AttemptEntry>>>,
}

fn cooldown_for(count: u32) -> Duration {
    let over = count.saturating_sub(MAX_ATTEMPTS + 1).min(16);
    let secs = BASE_COOLDOWN_SECS.saturating_mul(1 << over);
    Duration::from_secs(secs.min(MAX_COOLDOWN_SECS))
}

fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}

impl LoginThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(ip: &str, email: &str) -> String {
        format!("{ip}|{}", email.trim().to_lowercase())
    }

    /// Record an attempt. `Err(retry_after_secs)` when the key is locked out.
    pub async fn attempt(&self, key: &str) -> Result<(), u64> {
        self.attempt_at(key, Instant::now()).await
    }

    async fn attempt_at(&self, key: &str, now: Instant) -> Result<(), u64> {
        let mut map = self.inner.lock().await;
        let entry = map.entry(key.to_owned()).or_insert_with(|| AttemptEntry {
            count: 0,
            window_start: now,
            blocked_until: None,
        });

        if let Some(until) = entry.blocked_until
            && until > now
        {
            return Err(ceil_secs(until - now));
        }

        if now.duration_since(entry.idle_since()) >= WINDOW {
            entry.count = 0;
            entry.window_start = now;
            entry.blocked_until = None;
        }

        entry.count += 1;
        if entry.count > MAX_ATTEMPTS {
            let cooldown = cooldown_for(entry.count);
            entry.blocked_until = Some(now + cooldown);
            return Err(ceil_secs(cooldown));
        }
        Ok(())
    }

    /// Forget a key after a successful login
    pub async fn succeed(&self, key: &str) {
        self.inner.lock().await.remove(key);
    }

    /// Drop entries whose window and lockout have both lapsed
    pub async fn cleanup(&self) {
        self.cleanup_at(Instant::now()).await;
    }

    async fn cleanup_at(&self, now: Instant) {
        let mut map = self.inner.lock().await;
        map.retain(|_, entry| {
            let locked = entry.blocked_until.is_some_and(|until| until > now);
            locked || now.duration_since(entry.idle_since()) < WINDOW
        });
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

/// Extract client IP: X-Forwarded-For header first, then peer address.
pub fn extract_ip(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
    {
        // First entry is the original client
        if let Some(first) = val.split(',').next() {
            let ip = first.trim();
            if !ip.is_empty() {
                return ip.to_owned();
            }
        }
    }

    request
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

/// Client address as seen by the login throttle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

/// Middleware: resolve the client address once and store it in extensions
pub async fn client_ip(mut request: Request, next: Next) -> Response {
    let ip = extract_ip(&request);
    request.extensions_mut().insert(ClientIp(ip));
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_doubles_and_caps() {
        assert_eq!(cooldown_for(6), Duration::from_secs(30));
        assert_eq!(cooldown_for(7), Duration::from_secs(60));
        assert_eq!(cooldown_for(8), Duration::from_secs(120));
        assert_eq!(cooldown_for(11), Duration::from_secs(900));
        assert_eq!(cooldown_for(40), Duration::from_secs(900));
    }

    #[tokio::test]
    async fn sixth_attempt_locks_out() {
        let throttle = LoginThrottle::new();
        let key = LoginThrottle::key("1.2.3.4", "a@b.co");
        let t0 = Instant::now();
        for _ in 0..MAX_ATTEMPTS {
            assert!(throttle.attempt_at(&key, t0).await.is_ok());
        }
        assert_eq!(throttle.attempt_at(&key, t0).await, Err(30));
        // still locked 10 s later
        assert_eq!(
            throttle.attempt_at(&key, t0 + Duration::from_secs(10)).await,
            Err(20)
        );
    }

    #[tokio::test]
    async fn next_attempt_after_cooldown_doubles() {
        let throttle = LoginThrottle::new();
        let key = LoginThrottle::key("1.2.3.4", "a@b.co");
        let t0 = Instant::now();
        for _ in 0..=MAX_ATTEMPTS {
            let _ = throttle.attempt_at(&key, t0).await;
        }
        let later = t0 + Duration::from_secs(31);
        assert_eq!(throttle.attempt_at(&key, later).await, Err(60));
    }

    #[tokio::test]
    async fn success_resets() {
        let throttle = LoginThrottle::new();
        let key = LoginThrottle::key("1.2.3.4", "a@b.co");
        let t0 = Instant::now();
        for _ in 0..MAX_ATTEMPTS {
            throttle.attempt_at(&key, t0).await.unwrap();
        }
        throttle.succeed(&key).await;
        assert!(throttle.attempt_at(&key, t0).await.is_ok());
    }

    #[tokio::test]
    async fn keys_are_independent_and_case_insensitive() {
        let throttle = LoginThrottle::new();
        let t0 = Instant::now();
        let a = LoginThrottle::key("1.1.1.1", "A@B.co");
        assert_eq!(a, LoginThrottle::key("1.1.1.1", "a@b.co"));
        for _ in 0..=MAX_ATTEMPTS {
            let _ = throttle.attempt_at(&a, t0).await;
        }
        let b = LoginThrottle::key("2.2.2.2", "a@b.co");
        assert!(throttle.attempt_at(&b, t0).await.is_ok());
    }

    #[tokio::test]
    async fn window_expiry_resets_count() {
        let throttle = LoginThrottle::new();
        let key = LoginThrottle::key("1.2.3.4", "a@b.co");
        let t0 = Instant::now();
        for _ in 0..MAX_ATTEMPTS {
            throttle.attempt_at(&key, t0).await.unwrap();
        }
        let later = t0 + WINDOW;
        assert!(throttle.attempt_at(&key, later).await.is_ok());
    }

    #[tokio::test]
    async fn cleanup_removes_stale_entries() {
        let throttle = LoginThrottle::new();
        let t0 = Instant::now();
        throttle.attempt_at("stale", t0).await.unwrap();
        throttle
            .attempt_at("fresh", t0 + Duration::from_secs(200))
            .await
            .unwrap();
        throttle.cleanup_at(t0 + WINDOW + Duration::from_secs(1)).await;
        assert_eq!(throttle.len().await, 1);
    }
}
