// ==========================================
// 植物养护记录系统 - 领域模型层
// ==========================================
// 职责: 后端资源的透传 DTO 与基础类型
// 红线: 不含网络访问逻辑,不含引擎逻辑
// ==========================================

pub mod calibration;
pub mod location;
pub mod measurement;
pub mod plant;
pub mod timestamp;
pub mod types;

// 重导出核心类型
pub use calibration::{
    CalibratingPlant, CalibrationEntry, CorrectionRequest, CorrectionResult, PlantCalibration,
};
pub use location::{
    normalize_location_name, Location, LocationCreateRequest, LocationMutationResponse,
    LocationRenameRequest,
};
pub use measurement::{
    LastMeasurement, MeasurementCreateRequest, MeasurementDetail, MeasurementItem,
    MeasurementMutationResponse, MeasurementUpdateRequest, RepottingCreateRequest,
    RepottingResponse, RepottingUpdateRequest,
};
pub use plant::{
    OkResponse, OrderRequest, PlantCreateRequest, PlantCreatedResponse, PlantDetail,
    PlantListItem, PlantUpdateRequest,
};
pub use timestamp::{parse_timestamp, to_backend_format};
pub use types::{CorrectionCapMode, HexId, HexIdError, MeasurementKind};
