use anyhow::{Context, Result};
use clap::Parser;
use multiminer_core::DeviceIdentity;
use multiminer_rs::config::{Args, Config};
use multiminer_rs::fleet::{FleetConfiguration, FleetManager, PollCycle};
use multiminer_rs::logging::{init_logging, LogConfig, LogRotation};
use multiminer_rs::market::CoinWarzClient;
use multiminer_rs::report::{export_snapshot_json, item_count_label, DeviceDetails};
use multiminer_rs::FleetError;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // 解析命令行参数
    let args = Args::parse();

    // 加载配置
    let config = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            std::process::exit(1);
        }
    };

    // 初始化日志系统，guard 需要保留到程序退出
    let _log_guard = match init_logging(log_config(&args, &config)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    info!("🚀 Starting MultiMiner-RS v{}", multiminer_rs::VERSION);
    info!("📋 Configuration loaded from: {}", args.config);

    if let Err(e) = run(&args, &config).await {
        error!("❌ {:#}", e);
        std::process::exit(1);
    }
}

fn log_config(args: &Args, config: &Config) -> LogConfig {
    let level = if args.debug {
        "debug".to_string()
    } else {
        args.log_level
            .clone()
            .unwrap_or_else(|| config.general.log_level.clone())
    };

    LogConfig {
        level,
        file_path: config
            .general
            .log_file
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned()),
        pretty: config.general.pretty_logs,
        rotation: LogRotation::Daily,
        ..Default::default()
    }
}

async fn run(args: &Args, config: &Config) -> Result<()> {
    let fleet = FleetManager::new(FleetConfiguration::from(config));

    // 用配置的网络矿机建立设备群，本地枚举由后端提供
    let summary = fleet
        .apply_cycle(PollCycle {
            network_devices: Some(config.network_devices.clone()),
            ..Default::default()
        })
        .await;
    info!("设备群共 {}", item_count_label(summary.reconcile.total));

    if config.market.enabled && !args.no_market {
        let client = CoinWarzClient::new(&config.market).context("Failed to create market client")?;
        match fleet.refresh_market_data(&client).await {
            Ok(affected) => info!("行情数据已更新到 {} 台设备", affected),
            Err(FleetError::Market(e)) if e.is_transient() => warn!("行情数据暂时不可用: {}", e),
            Err(e) => return Err(e).context("Failed to refresh market data"),
        }
    }

    if let Some(inspect) = &args.inspect {
        let identity: DeviceIdentity = inspect.parse().map_err(FleetError::from)?;
        let record = fleet
            .get(&identity)
            .await
            .with_context(|| format!("Device {} is not part of the fleet", identity))?;

        if args.json {
            println!("{}", serde_json::to_string_pretty(&DeviceDetails::from_record(&record, config.general.show_work_utility))?);
        } else {
            print!("{}", DeviceDetails::from_record(&record, config.general.show_work_utility));
        }
        return Ok(());
    }

    let snapshot = fleet.snapshot().await;
    if args.json {
        println!("{}", export_snapshot_json(&snapshot)?);
    } else {
        println!("{}", item_count_label(snapshot.len()));
        for record in &snapshot {
            print!("{}", DeviceDetails::from_record(record, config.general.show_work_utility));
        }
    }

    Ok(())
}
