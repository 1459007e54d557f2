use anyhow::Result;
use clap::Parser;
use gesture_recognizer::config::Config;
use gesture_recognizer::recognizer::{GestureListener, GestureRegistry, GestureTrigger, ManipulationSurface, TouchSurface};
use gesture_recognizer::services::{build_actions, create_touch_source};
use gesture_recognizer::utils;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "gesture-recognizer")]
#[command(about = "Распознавание жестов (tap и свайпы) на мультитач-устройствах")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "gesture.toml")]
    config: String,

    /// Режим сухого запуска (эмуляция касаний, команды не выполняются)
    #[arg(long)]
    dry_run: bool,

    /// Воспроизвести записанную трассу событий вместо чтения устройства
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Уровень логирования (по умолчанию берётся из конфигурации)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let config = Arc::new(Config::load(&args.config)?);

    // Инициализация системы логирования
    let level = args.log_level.as_deref().unwrap_or(config.logging.level.as_str());
    init_tracing(level, &config.logging.format)?;

    info!("Запуск gesture-recognizer v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - команды не выполняются");
    }

    // Права на /dev/input нужны только для реального устройства
    if !args.dry_run && args.replay.is_none() {
        utils::permissions::check_permissions()?;
    }

    // Инициализация компонентов
    let registry = GestureRegistry::new();
    let touch_surface = Arc::new(TouchSurface::new("touch"));
    let surface: Arc<dyn ManipulationSurface> = touch_surface.clone();

    let listeners: Vec<Arc<dyn GestureListener>> = config
        .listeners
        .iter()
        .map(|spec| {
            info!(
                "Слушатель '{}': жест {}, модификатор {}, порог tap {}px{}",
                spec.name,
                spec.gesture,
                spec.modifier,
                spec.tap_threshold_px,
                if spec.use_velocity_for_tap { " (по скорости)" } else { "" }
            );
            Arc::new(GestureTrigger::new(
                spec.name.clone(),
                spec.listener_config(),
                build_actions(spec, args.dry_run),
            )) as Arc<dyn GestureListener>
        })
        .collect();

    for listener in &listeners {
        registry.add_listener(listener.clone(), &surface);
    }

    let touch_source = create_touch_source(
        config.clone(),
        touch_surface.clone(),
        args.dry_run,
        args.replay.as_deref(),
    )?;

    info!("Все компоненты инициализированы");

    // Запуск источника касаний
    let mut source_handle = tokio::spawn(async move {
        if let Err(e) = touch_source.run().await {
            error!("Ошибка в TouchSource: {}", e);
        }
    });

    info!("Источник касаний запущен");

    // Ожидание сигнала завершения или окончания источника (реплей)
    tokio::select! {
        result = signal::ctrl_c() => match result {
            Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
            Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
        },
        _ = &mut source_handle => {
            info!("Источник касаний завершил работу");
        }
    }

    info!("Завершение работы...");

    // Прерываем задачу, чтобы освободить устройство в Drop
    if !source_handle.is_finished() {
        source_handle.abort();

        let shutdown_timeout = tokio::time::Duration::from_secs(5);
        if tokio::time::timeout(shutdown_timeout, source_handle).await.is_err() {
            warn!("Таймаут при завершении источника касаний");
        }
    }

    // Последний слушатель снимает подписку с поверхности
    for listener in &listeners {
        registry.remove_listener(listener, &surface);
    }

    if registry.is_subscribed(surface.id()) {
        warn!("Поверхность {} осталась с подпиской после снятия слушателей", surface.id());
    }

    info!("gesture-recognizer завершил работу");
    Ok(())
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        "pretty" => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
        "full" => registry.with(tracing_subscriber::fmt::layer()).init(),
        _ => registry.with(tracing_subscriber::fmt::layer().compact()).init(),
    }

    Ok(())
}
