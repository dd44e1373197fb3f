//! In-memory rate limiting with captcha escalation
//!
//! Three fixed-window counters (IP burst, IP daily, device daily) plus a
//! global sliding-window spike detector. State lives in process memory only;
//! counters reset when the service restarts.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// User-agent fragments that force captcha verification
const SUSPICIOUS_USER_AGENTS: [&str; 9] = [
    "curl", "wget", "python", "httpie", "postman", "insomnia", "bot", "crawler", "spider",
];

/// Counter maps are pruned once they grow past this many entries
const MAX_TRACKED_KEYS: usize = 10_000;

/// Limits and windows. Tests shrink the windows to keep runs fast.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub ip_burst_limit: u32,
    pub ip_burst_window: Duration,
    pub ip_daily_limit: u32,
    pub ip_daily_window: Duration,
    pub device_daily_limit: u32,
    pub device_daily_window: Duration,
    /// Daily IP count beyond which captcha becomes mandatory
    pub captcha_ip_threshold: u32,
    pub spike_window: Duration,
    pub spike_threshold: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            ip_burst_limit: 1,
            ip_burst_window: Duration::from_secs(60),
            ip_daily_limit: 10,
            ip_daily_window: Duration::from_secs(24 * 60 * 60),
            device_daily_limit: 10,
            device_daily_window: Duration::from_secs(24 * 60 * 60),
            captcha_ip_threshold: 5,
            spike_window: Duration::from_secs(5 * 60),
            spike_threshold: 100,
        }
    }
}

/// Outcome of a rate-limit check
#[derive(Debug, Clone)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub require_captcha: bool,
    pub message: Option<String>,
}

impl RateLimitDecision {
    fn denied(message: String) -> Self {
        Self {
            allowed: false,
            require_captcha: false,
            message: Some(message),
        }
    }
}

struct WindowCounter {
    count: u32,
    reset_at: Instant,
}

#[derive(Default)]
struct Counters {
    ip_burst: HashMap<String, WindowCounter>,
    ip_daily: HashMap<String, WindowCounter>,
    device_daily: HashMap<String, WindowCounter>,
    recent_requests: VecDeque<Instant>,
}

/// Shared limiter held in application state
pub struct RateLimiter {
    config: RateLimitConfig,
    counters: Mutex<Counters>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            counters: Mutex::new(Counters::default()),
        }
    }

    /// Record one request in the global sliding window and report whether
    /// overall traffic currently looks like a spike.
    pub fn observe_traffic_spike(&self) -> bool {
        let now = Instant::now();
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());

        let window = self.config.spike_window;
        while counters
            .recent_requests
            .front()
            .is_some_and(|t| now.duration_since(*t) > window)
        {
            counters.recent_requests.pop_front();
        }
        counters.recent_requests.push_back(now);

        counters.recent_requests.len() > self.config.spike_threshold
    }

    /// Count this request against the caller's windows and decide admission.
    /// Burst denial messages tell the caller how long to wait.
    pub fn check(&self, ip: &str, device_id: Option<&str>) -> RateLimitDecision {
        let now = Instant::now();
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());

        prune(&mut counters.ip_burst, now);
        prune(&mut counters.ip_daily, now);
        prune(&mut counters.device_daily, now);

        if let Some(burst) = counters.ip_burst.get(ip) {
            if now < burst.reset_at && burst.count >= self.config.ip_burst_limit {
                let wait_secs = (burst.reset_at - now).as_secs() + 1;
                return RateLimitDecision::denied(format!(
                    "Please wait {} seconds before generating another forecast.",
                    wait_secs
                ));
            }
        }
        bump(&mut counters.ip_burst, ip, now, self.config.ip_burst_window);

        if let Some(daily) = counters.ip_daily.get(ip) {
            if now < daily.reset_at && daily.count >= self.config.ip_daily_limit {
                return RateLimitDecision::denied(
                    "Daily limit reached. Please try again tomorrow.".to_string(),
                );
            }
        }
        bump(&mut counters.ip_daily, ip, now, self.config.ip_daily_window);

        if let Some(device) = device_id {
            if let Some(counter) = counters.device_daily.get(device) {
                if now < counter.reset_at && counter.count >= self.config.device_daily_limit {
                    return RateLimitDecision::denied(
                        "You've reached the maximum free previews for today. \
                         Please try again tomorrow."
                            .to_string(),
                    );
                }
            }
            bump(
                &mut counters.device_daily,
                device,
                now,
                self.config.device_daily_window,
            );
        }

        let daily_count = counters.ip_daily.get(ip).map(|c| c.count).unwrap_or(0);

        RateLimitDecision {
            allowed: true,
            require_captcha: daily_count > self.config.captcha_ip_threshold,
            message: None,
        }
    }
}

fn bump(map: &mut HashMap<String, WindowCounter>, key: &str, now: Instant, window: Duration) {
    if let Some(counter) = map.get_mut(key) {
        if now < counter.reset_at {
            counter.count += 1;
            return;
        }
    }
    map.insert(
        key.to_string(),
        WindowCounter {
            count: 1,
            reset_at: now + window,
        },
    );
}

fn prune(map: &mut HashMap<String, WindowCounter>, now: Instant) {
    if map.len() > MAX_TRACKED_KEYS {
        map.retain(|_, counter| now < counter.reset_at);
    }
}

/// True for automation-flavored user agents (case-insensitive substring match)
pub fn is_suspicious_user_agent(user_agent: &str) -> bool {
    let lower = user_agent.to_lowercase();
    SUSPICIOUS_USER_AGENTS.iter().any(|p| lower.contains(p))
}
