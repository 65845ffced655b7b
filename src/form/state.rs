// ==========================================
// 植物养护记录系统 - 表单状态
// ==========================================
// 职责: 字段值、初始值、touched、字段错误、横幅错误、dirty/valid 聚合
// 规则:
// - set_value 只在字段已 touched 时重新校验
// - blur 标记 touched 并校验
// - submit 先全量校验，通过才调用处理函数
// - 服务端错误从不清空字段值
// ==========================================

use std::collections::BTreeMap;
use std::future::Future;
use thiserror::Error;

use crate::api::error::ApiError;
use crate::form::validators::Validator;
use crate::i18n;

/// 字段值快照
pub type FormValues = BTreeMap<String, String>;

// ==========================================
// FormError
// ==========================================
#[derive(Error, Debug)]
pub enum FormError {
    #[error("表单校验未通过: {0:?}")]
    Invalid(BTreeMap<String, String>),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("未知字段: {0}")]
    UnknownField(String),
}

// ==========================================
// 字段定义
// ==========================================
struct Field {
    label_key: String,
    initial: String,
    value: String,
    touched: bool,
    validators: Vec<Validator>,
}

impl Field {
    fn label(&self) -> String {
        i18n::t(&self.label_key)
    }

    fn check(&self) -> Option<String> {
        let label = self.label();
        self.validators
            .iter()
            .find_map(|validate| validate(&label, &self.value))
    }
}

// ==========================================
// FormState
// ==========================================
#[derive(Default)]
pub struct FormState {
    order: Vec<String>,
    fields: BTreeMap<String, Field>,
    errors: BTreeMap<String, String>,
    general_error: Option<String>,
    conflict_field: Option<String>,
    submitting: bool,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 声明字段（构造用）
    ///
    /// # 参数
    /// - name: 字段名（与请求体字段一致）
    /// - label_key: 显示名的 i18n 键
    /// - initial: 初始值
    /// - validators: 按顺序执行，返回第一个错误
    pub fn field(
        mut self,
        name: &str,
        label_key: &str,
        initial: impl Into<String>,
        validators: Vec<Validator>,
    ) -> Self {
        let initial = initial.into();
        if !self.fields.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.fields.insert(
            name.to_string(),
            Field {
                label_key: label_key.to_string(),
                value: initial.clone(),
                initial,
                touched: false,
                validators,
            },
        );
        self
    }

    /// 提交时 400/409/422 默认落到的字段
    pub fn conflict_field(mut self, name: &str) -> Self {
        self.conflict_field = Some(name.to_string());
        self
    }

    pub fn field_names(&self) -> &[String] {
        &self.order
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|f| f.value.as_str())
    }

    /// 当前值快照
    pub fn values(&self) -> FormValues {
        self.fields
            .iter()
            .map(|(k, f)| (k.clone(), f.value.clone()))
            .collect()
    }

    /// 修改字段值；已 touched 的字段立即重新校验
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> Result<(), FormError> {
        let field = self
            .fields
            .get_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        field.value = value.into();
        if field.touched {
            self.validate_field(name);
        }
        Ok(())
    }

    /// 失焦：标记 touched 并校验
    pub fn blur(&mut self, name: &str) -> Result<(), FormError> {
        let field = self
            .fields
            .get_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        field.touched = true;
        self.validate_field(name);
        Ok(())
    }

    /// 校验单个字段，返回是否通过
    pub fn validate_field(&mut self, name: &str) -> bool {
        let result = match self.fields.get(name) {
            Some(field) => field.check(),
            None => return false,
        };
        match result {
            Some(msg) => {
                self.errors.insert(name.to_string(), msg);
                false
            }
            None => {
                self.errors.remove(name);
                true
            }
        }
    }

    /// 全部字段标记 touched 并校验
    pub fn validate_all(&mut self) -> bool {
        let names = self.order.clone();
        let mut ok = true;
        for name in &names {
            if let Some(field) = self.fields.get_mut(name) {
                field.touched = true;
            }
            ok &= self.validate_field(name);
        }
        ok
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.fields.get(name).map_or(false, |f| f.touched)
    }

    /// 任一字段与初始值不同
    pub fn is_dirty(&self) -> bool {
        self.fields.values().any(|f| f.value != f.initial)
    }

    /// 所有校验器都通过且没有服务端字段错误
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.fields.values().all(|f| f.check().is_none())
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn general_error(&self) -> Option<&str> {
        self.general_error.as_deref()
    }

    /// 提交
    ///
    /// 校验失败不调用 handler；handler 失败时把错误落到字段或横幅上，
    /// 字段值保持不变；成功后表单回到 pristine。
    pub async fn submit<F, Fut, T>(&mut self, handler: F) -> Result<T, FormError>
    where
        F: FnOnce(FormValues) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if !self.validate_all() {
            self.general_error = Some(i18n::t("form.invalid"));
            return Err(FormError::Invalid(self.errors.clone()));
        }

        self.general_error = None;
        self.submitting = true;
        let result = handler(self.values()).await;
        self.submitting = false;

        match result {
            Ok(value) => {
                self.mark_pristine();
                Ok(value)
            }
            Err(err) => {
                let fallback = self.conflict_field.clone();
                self.apply_api_error(&err, fallback.as_deref());
                Err(FormError::Api(err))
            }
        }
    }

    /// 把服务端错误落到表单上
    ///
    /// - 取消: 忽略
    /// - 400/409/422: 字段级错误。字段取 "Missing required field: X" 中的 X，
    ///   否则取 fallback_field；都不是本表单字段时退化为横幅
    /// - 其他: 横幅
    pub fn apply_api_error(&mut self, err: &ApiError, fallback_field: Option<&str>) {
        if err.is_aborted() {
            return;
        }

        if err.is_validation_conflict() {
            let detail = err.detail();
            let target = missing_field_name(&detail)
                .filter(|f| self.has_field(f))
                .or_else(|| fallback_field.filter(|f| self.has_field(f)).map(str::to_string));

            if let Some(name) = target {
                if let Some(field) = self.fields.get_mut(&name) {
                    field.touched = true;
                }
                self.errors.insert(name, detail);
                return;
            }
        }

        self.general_error = Some(err.localized_message());
    }

    /// 恢复初始值并清空所有状态
    pub fn reset(&mut self) {
        for field in self.fields.values_mut() {
            field.value = field.initial.clone();
            field.touched = false;
        }
        self.errors.clear();
        self.general_error = None;
        self.submitting = false;
    }

    /// 保存成功后以当前值为新的初始值
    pub fn mark_pristine(&mut self) {
        for field in self.fields.values_mut() {
            field.initial = field.value.clone();
            field.touched = false;
        }
        self.errors.clear();
        self.general_error = None;
    }
}

/// 从 "Missing required field: X" 中取出字段名
pub fn missing_field_name(detail: &str) -> Option<String> {
    let rest = detail.trim().strip_prefix("Missing required field:")?;
    let name = rest.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
