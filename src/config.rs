use std::{str::FromStr, sync::Arc};

use crate::{
    Error,
    bandwidth::FilterType,
    congestion::{
        CongestionController, adaptive_reno::AdaptiveReno, new_reno::NewReno,
        westwood::WestwoodPlus,
    },
    observer::{CongestionObserver, FanoutObserver, TracingObserver},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CongestionControllerKind {
    #[default]
    AdaptiveReno,
    WestwoodPlus,
    NewReno,
}

impl CongestionControllerKind {
    pub const ALL: [CongestionControllerKind; 3] = [
        CongestionControllerKind::AdaptiveReno,
        CongestionControllerKind::WestwoodPlus,
        CongestionControllerKind::NewReno,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CongestionControllerKind::AdaptiveReno => crate::congestion::adaptive_reno::NAME,
            CongestionControllerKind::WestwoodPlus => crate::congestion::westwood::NAME,
            CongestionControllerKind::NewReno => crate::congestion::new_reno::NAME,
        }
    }
}

impl std::fmt::Display for CongestionControllerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CongestionControllerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| Error::UnknownController(s.to_owned()))
    }
}

#[derive(Debug, Default, Clone)]
pub struct CongestionConfig {
    pub kind: CongestionControllerKind,

    /// Log congestion control decisions with `tracing`.
    pub tracing: bool,

    /// Export congestion control decisions to the `metrics` crate.
    #[cfg(feature = "export-metrics")]
    pub metrics: bool,

    /// Smoothing of Westwood+ bandwidth samples.
    pub bandwidth_filter: FilterType,

    /// A custom event sink. Gets events in addition to `tracing` and `metrics`.
    pub observer: Option<Arc<dyn CongestionObserver>>,
}

impl CongestionConfig {
    pub fn create(&self) -> Box<dyn CongestionController> {
        match self.kind {
            CongestionControllerKind::AdaptiveReno => Box::new(AdaptiveReno::from_config(self)),
            CongestionControllerKind::WestwoodPlus => Box::new(WestwoodPlus::from_config(self)),
            CongestionControllerKind::NewReno => Box::new(NewReno::from_config(self)),
        }
    }

    /// The observer controllers built from this config report to, if any.
    pub fn observer(&self) -> Option<Arc<dyn CongestionObserver>> {
        let mut observers: Vec<Arc<dyn CongestionObserver>> = Vec::new();

        if self.tracing {
            observers.push(Arc::new(TracingObserver));
        }

        #[cfg(feature = "export-metrics")]
        if self.metrics {
            observers.push(Arc::new(crate::metrics::MetricsObserver));
        }

        if let Some(observer) = self.observer.as_ref() {
            observers.push(observer.clone());
        }

        match observers.len() {
            0 => None,
            1 => observers.pop(),
            _ => Some(Arc::new(FanoutObserver::new(observers))),
        }
    }
}
