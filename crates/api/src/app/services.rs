//! State shared by all handlers.

use fxsignal_infra::InferenceService;
use fxsignal_observability::ServiceMetrics;

pub struct AppServices {
    pub inference: InferenceService,
    pub metrics: ServiceMetrics,
}

impl AppServices {
    pub fn new(inference: InferenceService) -> Self {
        Self {
            inference,
            metrics: ServiceMetrics::new(),
        }
    }
}
