// ==========================================
// 植物养护记录系统 - 表单层
// ==========================================
// 职责: 受控表单状态、字段校验器、预置表单与请求体转换
// ==========================================

pub mod forms;
pub mod state;
pub mod validators;

pub use forms::{
    location_form, plant_form, repotting_form, to_location_create, to_plant_create,
    to_plant_update, to_repotting_request, to_watering_request, to_weight_request, watering_form,
    weight_form,
};
pub use state::{missing_field_name, FormError, FormState, FormValues};
pub use validators::Validator;
