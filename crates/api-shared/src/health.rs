use crate::dto::HealthRes;

/// Health reporting for the REST API and the boot binary.
///
/// Load balancers and monitors only need a cheap liveness answer; nothing
/// here touches the conversation store.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }

    /// Reports the service as alive.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Solace is alive".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_is_ok() {
        let res = HealthService::check_health();
        assert!(res.ok);
        assert!(!res.message.is_empty());
    }
}
