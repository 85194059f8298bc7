use std::sync::Arc;

use tracing::{debug, info, warn};

use wardrobe_scan::capture::DirectoryCapture;
use wardrobe_scan::client::HttpScanClient;
use wardrobe_scan::controller::ScanController;
use wardrobe_scan::profile::JsonLineSink;
use wardrobe_scan::settings::Settings;
use wardrobe_scan::utils;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::new()?;

    utils::init_tracing(&settings.log.level);

    debug!("{:?}", settings);

    let Some(height_cm) = settings.scan.height_cm else {
        return Err("scan.height_cm must be set to calibrate the scan".into());
    };

    let client = Arc::new(HttpScanClient::new(settings.service.url.clone()));
    let capture = Arc::new(DirectoryCapture::new(&settings.scan.capture_dir));

    let mut controller = ScanController::new(client, capture, Arc::new(JsonLineSink))
        .with_interval(settings.scan.interval());

    let mut status = controller.start_scan(height_cm).await?.status();

    let watcher = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let snapshot = status.borrow_and_update().clone();
            info!(state = ?snapshot.state, attempt = snapshot.attempts, "{}", snapshot.status);
            if snapshot.state.is_terminal() {
                break;
            }
        }
    });

    let interrupted = tokio::select! {
        result = controller.finish_scan() => {
            if result?.is_none() {
                warn!("scan ended without measurements");
            }
            false
        }
        _ = tokio::signal::ctrl_c() => true,
    };

    if interrupted {
        info!("interrupted, cancelling scan");
        controller.cancel_scan().await;
    }

    watcher.abort();
    Ok(())
}
