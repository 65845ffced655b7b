// ==========================================
// 植物养护记录系统 - API 层
// ==========================================
// 职责: HTTP 客户端、资源 API、组合 API，供应用层命令调用
// ==========================================

pub mod abort;
pub mod client;
pub mod error;
pub mod transport;
pub mod validator;

pub mod calibration_api;
pub mod location_api;
pub mod measurement_api;
pub mod plant_api;

pub mod bulk_api;
pub mod dashboard_api;

// 重导出核心类型
pub use abort::{AbortController, AbortSignal};
pub use client::{ApiClient, RequestBody, RequestOptions, ResponseBody, RetryPolicy};
pub use error::{ApiError, ApiResult};
pub use transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError,
};

pub use bulk_api::{BulkApi, BulkEntry, BulkReport, BulkRowOutcome};
pub use calibration_api::CalibrationApi;
pub use dashboard_api::{Dashboard, DashboardApi, DashboardOptions, PlantCard};
pub use location_api::LocationApi;
pub use measurement_api::MeasurementApi;
pub use plant_api::PlantApi;
