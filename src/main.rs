// ==========================================
// 植物养护记录系统 - 终端主入口
// ==========================================
// 输出约定: 成功结果（JSON 或文本）写 stdout；
// 失败写 ErrorResponse JSON 到 stderr 并以非零码退出
// Ctrl-C 取消当前命令的在途请求
// ==========================================

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use plant_care_client::api::{AbortController, AbortSignal};
use plant_care_client::app::{commands, AppState, ErrorResponse};
use plant_care_client::config::SettingsManager;
use plant_care_client::domain::{CorrectionRequest, MeasurementUpdateRequest};
use plant_care_client::form::FormValues;
use plant_care_client::{i18n, logging, CorrectionCapMode, HexId, MeasurementKind};

#[derive(Parser)]
#[command(name = "plant-care", version, about = "植物养护记录系统 - 终端前端")]
struct Cli {
    /// 以 JSON 行输出日志
    #[arg(long, global = true)]
    json_logs: bool,

    /// 界面语言（覆盖设置）
    #[arg(long, global = true)]
    locale: Option<String>,

    /// 设置文件路径（默认取 PLANT_CARE_SETTINGS_PATH 或系统配置目录）
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 植物
    Plants {
        #[command(subcommand)]
        action: PlantCommand,
    },
    /// 位置
    Locations {
        #[command(subcommand)]
        action: LocationCommand,
    },
    /// 测量录入与维护
    Measure {
        #[command(subcommand)]
        action: MeasureCommand,
    },
    /// 校准
    Calibration {
        #[command(subcommand)]
        action: CalibrationCommand,
    },
    /// 驾驶舱
    Dashboard {
        /// 迷你图点数
        #[arg(long)]
        points: Option<usize>,
        /// 以文本输出
        #[arg(long)]
        text: bool,
    },
    /// 从 CSV 批量录入称重/浇水
    Bulk {
        file: PathBuf,
        /// 只解析不提交
        #[arg(long)]
        dry_run: bool,
    },
    /// 用户设置
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
}

#[derive(Args)]
struct PlantFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    species: Option<String>,
    #[arg(long)]
    location_id: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    min_dry_g: Option<String>,
    #[arg(long)]
    max_water_g: Option<String>,
    /// 仅新建时可用
    #[arg(long)]
    threshold_pct: Option<String>,
    #[arg(long)]
    ec_ms: Option<String>,
}

impl PlantFields {
    fn into_values(self) -> FormValues {
        form_values([
            ("name", self.name),
            ("species_name", self.species),
            ("location_id", self.location_id),
            ("description", self.description),
            ("min_dry_weight_g", self.min_dry_g),
            ("max_water_weight_g", self.max_water_g),
            ("recommended_water_threshold_pct", self.threshold_pct),
            ("fertilizer_ec_ms", self.ec_ms),
        ])
    }
}

#[derive(Subcommand)]
enum PlantCommand {
    List,
    Get { id: String },
    Create(PlantFields),
    Update {
        id: String,
        #[command(flatten)]
        fields: PlantFields,
    },
    Delete { id: String },
    /// 按给出的顺序排列植物
    Reorder { ids: Vec<String> },
    /// 测量历史
    History { id: String },
}

#[derive(Subcommand)]
enum LocationCommand {
    List,
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        sort_order: Option<String>,
    },
    Rename { from: String, to: String },
    Reorder { ids: Vec<String> },
    Delete { id: String },
}

#[derive(Subcommand)]
enum MeasureCommand {
    /// 称重
    Weight {
        plant_id: String,
        weight_g: String,
        #[arg(long)]
        at: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// 浇水
    Water {
        plant_id: String,
        water_added_g: String,
        #[arg(long)]
        at: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// 换盆（换盆前重量、换盆后重量）
    Repot {
        plant_id: String,
        before_g: String,
        after_g: String,
        #[arg(long)]
        at: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// 更新称重/浇水记录
    Update {
        #[arg(value_parser = parse_kind)]
        kind: MeasurementKind,
        id: String,
        #[arg(long)]
        at: Option<String>,
        #[arg(long)]
        weight_g: Option<i64>,
        #[arg(long)]
        water_added_g: Option<i64>,
        #[arg(long)]
        last_wet_g: Option<i64>,
        #[arg(long)]
        last_dry_g: Option<i64>,
        #[arg(long)]
        note: Option<String>,
    },
    /// 更新换盆记录
    UpdateRepot {
        id: String,
        plant_id: String,
        before_g: String,
        after_g: String,
        #[arg(long)]
        at: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    Get { id: String },
    Delete { id: String },
    /// 植物最近一次测量
    Last { plant_id: String },
}

#[derive(Args)]
struct CorrectionFlags {
    /// 上限模式: capacity | retained_ratio
    #[arg(long, default_value = "capacity", value_parser = parse_cap)]
    cap: CorrectionCapMode,
    /// 不改写最后一次湿重
    #[arg(long)]
    keep_last_wet: bool,
}

#[derive(Subcommand)]
enum CalibrationCommand {
    /// 待校准植物概览
    List,
    /// 校正单株植物
    Correct {
        plant_id: String,
        #[command(flatten)]
        flags: CorrectionFlags,
    },
    /// 校正所有需要校正的植物
    CorrectAll {
        #[command(flatten)]
        flags: CorrectionFlags,
    },
    /// 按显式时间窗口校正
    Window {
        plant_id: String,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[command(flatten)]
        flags: CorrectionFlags,
    },
}

#[derive(Subcommand)]
enum SettingsCommand {
    Show,
    Get { key: String },
    Set { key: String, value: String },
    /// 导出快照到 stdout
    Snapshot,
    /// 从快照文件恢复
    Restore { file: PathBuf },
    /// 可选语言
    Locales,
}

fn parse_kind(raw: &str) -> Result<MeasurementKind, String> {
    MeasurementKind::parse(raw).ok_or_else(|| format!("未知测量类型: {}", raw))
}

fn parse_cap(raw: &str) -> Result<CorrectionCapMode, String> {
    CorrectionCapMode::parse(raw).ok_or_else(|| format!("未知上限模式: {}", raw))
}

fn form_values<const N: usize>(pairs: [(&str, Option<String>); N]) -> FormValues {
    pairs
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k.to_string(), v)))
        .collect::<BTreeMap<_, _>>()
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.json_logs);

    let result = match bootstrap(&cli) {
        Ok((state, runtime)) => runtime.block_on(run(&state, cli.command)),
        Err(e) => Err(ErrorResponse::new("STARTUP_ERROR", format!("{:#}", e)).into_json()),
    };

    match result {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(envelope) => {
            eprintln!("{}", envelope);
            ExitCode::FAILURE
        }
    }
}

fn bootstrap(cli: &Cli) -> anyhow::Result<(AppState, tokio::runtime::Runtime)> {
    let settings = match &cli.settings {
        Some(path) => SettingsManager::load(path.clone()),
        None => SettingsManager::load_default(),
    }
    .context("加载用户设置失败")?;

    let locale = match &cli.locale {
        Some(locale) => locale.clone(),
        None => settings.current().map(|s| s.locale).unwrap_or_default(),
    };
    if !i18n::set_locale(&locale) {
        tracing::warn!("不支持的语言 {}，使用 {}", locale, i18n::current_locale());
    }

    tracing::info!(
        "{} v{} 设置文件: {}",
        plant_care_client::APP_NAME,
        plant_care_client::VERSION,
        settings.path().display()
    );

    let state = AppState::new(settings).map_err(anyhow::Error::msg)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("创建异步运行时失败")?;
    Ok((state, runtime))
}

async fn run(state: &AppState, command: Command) -> Result<String, String> {
    let controller = AbortController::new();
    let watcher = controller.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("收到 Ctrl-C，取消当前命令");
            watcher.abort();
        }
    });

    dispatch(state, command, Some(controller.signal())).await
}

async fn dispatch(
    state: &AppState,
    command: Command,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    match command {
        Command::Plants { action } => match action {
            PlantCommand::List => commands::list_plants(state, signal).await,
            PlantCommand::Get { id } => commands::get_plant(state, &id, signal).await,
            PlantCommand::Create(fields) => {
                commands::create_plant(state, fields.into_values(), signal).await
            }
            PlantCommand::Update { id, fields } => {
                commands::update_plant(state, &id, fields.into_values(), signal).await
            }
            PlantCommand::Delete { id } => commands::delete_plant(state, &id, signal).await,
            PlantCommand::Reorder { ids } => commands::reorder_plants(state, ids, signal).await,
            PlantCommand::History { id } => commands::plant_history(state, &id, signal).await,
        },

        Command::Locations { action } => match action {
            LocationCommand::List => commands::list_locations(state, signal).await,
            LocationCommand::Create {
                name,
                description,
                sort_order,
            } => {
                let values = form_values([
                    ("name", Some(name)),
                    ("description", description),
                    ("sort_order", sort_order),
                ]);
                commands::create_location(state, values, signal).await
            }
            LocationCommand::Rename { from, to } => {
                commands::rename_location(state, &from, &to, signal).await
            }
            LocationCommand::Reorder { ids } => {
                commands::reorder_locations(state, ids, signal).await
            }
            LocationCommand::Delete { id } => commands::delete_location(state, &id, signal).await,
        },

        Command::Measure { action } => dispatch_measure(state, action, signal).await,

        Command::Calibration { action } => match action {
            CalibrationCommand::List => commands::calibration_overview(state, signal).await,
            CalibrationCommand::Correct { plant_id, flags } => {
                commands::correct_plant(state, &plant_id, flags.cap, !flags.keep_last_wet, signal)
                    .await
            }
            CalibrationCommand::CorrectAll { flags } => {
                commands::correct_all(state, flags.cap, !flags.keep_last_wet, signal).await
            }
            CalibrationCommand::Window {
                plant_id,
                from,
                to,
                flags,
            } => {
                let plant_id = HexId::parse(&plant_id).map_err(|e| {
                    commands::map_api_error(plant_care_client::ApiError::invalid_id("植物ID", e))
                })?;
                let mut request = CorrectionRequest::new(plant_id);
                request.cap = flags.cap;
                request.edit_last_wet = !flags.keep_last_wet;
                request.from_ts = from;
                request.to_ts = to;
                commands::apply_correction_window(state, request, signal).await
            }
        },

        Command::Dashboard { points, text } => {
            if text {
                commands::load_dashboard_text(state, points, signal).await
            } else {
                commands::load_dashboard(state, points, signal).await
            }
        }

        Command::Bulk { file, dry_run } => {
            commands::bulk_import(state, &file, dry_run, signal).await
        }

        Command::Settings { action } => match action {
            SettingsCommand::Show => commands::get_settings(state),
            SettingsCommand::Get { key } => commands::get_setting(state, &key),
            SettingsCommand::Set { key, value } => commands::set_setting(state, &key, &value),
            SettingsCommand::Snapshot => commands::snapshot_settings(state),
            SettingsCommand::Restore { file } => {
                let snapshot = std::fs::read_to_string(&file).map_err(|e| {
                    ErrorResponse::new(
                        "SETTINGS_ERROR",
                        format!("读取快照失败 {}: {}", file.display(), e),
                    )
                    .into_json()
                })?;
                commands::restore_settings(state, &snapshot)
            }
            SettingsCommand::Locales => commands::list_locales(),
        },
    }
}

async fn dispatch_measure(
    state: &AppState,
    action: MeasureCommand,
    signal: Option<AbortSignal>,
) -> Result<String, String> {
    match action {
        MeasureCommand::Weight {
            plant_id,
            weight_g,
            at,
            note,
        } => {
            let values = form_values([
                ("plant_id", Some(plant_id)),
                ("measured_weight_g", Some(weight_g)),
                ("measured_at", at),
                ("note", note),
            ]);
            commands::record_measurement(state, MeasurementKind::Weight, values, signal).await
        }
        MeasureCommand::Water {
            plant_id,
            water_added_g,
            at,
            note,
        } => {
            let values = form_values([
                ("plant_id", Some(plant_id)),
                ("water_added_g", Some(water_added_g)),
                ("measured_at", at),
                ("note", note),
            ]);
            commands::record_measurement(state, MeasurementKind::Watering, values, signal).await
        }
        MeasureCommand::Repot {
            plant_id,
            before_g,
            after_g,
            at,
            note,
        } => {
            let values = form_values([
                ("plant_id", Some(plant_id)),
                ("measured_weight_g", Some(before_g)),
                ("last_wet_weight_g", Some(after_g)),
                ("measured_at", at),
                ("note", note),
            ]);
            commands::record_measurement(state, MeasurementKind::Repotting, values, signal).await
        }
        MeasureCommand::Update {
            kind,
            id,
            at,
            weight_g,
            water_added_g,
            last_wet_g,
            last_dry_g,
            note,
        } => {
            let request = MeasurementUpdateRequest {
                measured_at: at,
                measured_weight_g: weight_g,
                water_added_g,
                last_wet_weight_g: last_wet_g,
                last_dry_weight_g: last_dry_g,
                note,
                ..Default::default()
            };
            commands::update_measurement(state, kind, &id, request, signal).await
        }
        MeasureCommand::UpdateRepot {
            id,
            plant_id,
            before_g,
            after_g,
            at,
            note,
        } => {
            let values = form_values([
                ("plant_id", Some(plant_id)),
                ("measured_weight_g", Some(before_g)),
                ("last_wet_weight_g", Some(after_g)),
                ("measured_at", at),
                ("note", note),
            ]);
            commands::update_repotting(state, &id, values, signal).await
        }
        MeasureCommand::Get { id } => commands::get_measurement(state, &id, signal).await,
        MeasureCommand::Delete { id } => commands::delete_measurement(state, &id, signal).await,
        MeasureCommand::Last { plant_id } => {
            commands::last_measurement(state, &plant_id, signal).await
        }
    }
}
